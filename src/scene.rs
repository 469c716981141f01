// scene.rs - File-backed scene document implementing SceneHost
use anyhow::{Context, Result};
use glam::Mat4;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::{SceneError, SceneResult};
use crate::traits::SceneHost;

/// What a scene node holds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Transform,
    /// Proxy shape; `dso` is its file-path attribute
    Standin { dso: String },
    /// Root of a referenced scene file
    Reference { path: String, namespace: String },
}

fn identity_matrix() -> [f32; 16] {
    Mat4::IDENTITY.to_cols_array()
}

fn visible_default() -> bool {
    true
}

fn transform_kind() -> NodeKind {
    NodeKind::Transform
}

/// One node of the scene document. `matrix` is local, column-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default = "identity_matrix")]
    pub matrix: [f32; 16],
    #[serde(default = "visible_default")]
    pub visible: bool,
    #[serde(default = "transform_kind")]
    pub kind: NodeKind,
}

impl SceneNode {
    pub fn transform(name: &str, parent: Option<&str>, local: Mat4) -> Self {
        Self {
            name: name.to_string(),
            parent: parent.map(str::to_string),
            matrix: local.to_cols_array(),
            visible: true,
            kind: NodeKind::Transform,
        }
    }

    pub fn standin(name: &str, parent: &str, dso: &str) -> Self {
        Self {
            name: name.to_string(),
            parent: Some(parent.to_string()),
            matrix: identity_matrix(),
            visible: true,
            kind: NodeKind::Standin { dso: dso.to_string() },
        }
    }

    pub fn local(&self) -> Mat4 {
        Mat4::from_cols_array(&self.matrix)
    }
}

/// Serialized form of a scene
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    pub nodes: Vec<SceneNode>,
    #[serde(default)]
    pub selection: Vec<String>,
}

/// In-memory scene loaded from a [`SceneDocument`]. Node ids are indices.
#[derive(Debug, Clone)]
pub struct JsonScene {
    nodes: Vec<SceneNode>,
    index: HashMap<String, usize>,
    selection: Vec<usize>,
}

impl JsonScene {
    pub fn from_document(document: SceneDocument) -> SceneResult<Self> {
        let mut index = HashMap::with_capacity(document.nodes.len());
        for (id, node) in document.nodes.iter().enumerate() {
            if index.insert(node.name.clone(), id).is_some() {
                return Err(SceneError::DuplicateNode(node.name.clone()));
            }
        }

        let mut scene = Self {
            nodes: document.nodes,
            index,
            selection: Vec::new(),
        };

        for id in 0..scene.nodes.len() {
            if let Some(parent) = scene.nodes[id].parent.clone() {
                let parent_id = scene.find(&parent).ok_or(SceneError::NodeNotFound(parent))?;
                scene.check_cycle(id, parent_id)?;
            }
        }

        for name in document.selection {
            let id = scene.find(&name).ok_or(SceneError::NodeNotFound(name))?;
            scene.selection.push(id);
        }

        Ok(scene)
    }

    pub fn from_json(text: &str) -> SceneResult<Self> {
        Self::from_document(serde_json::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scene file: {:?}", path))?;
        let scene = Self::from_json(&text)
            .with_context(|| format!("Failed to load scene file: {:?}", path))?;
        log::debug!("Loaded scene {:?}: {} nodes", path, scene.nodes.len());
        Ok(scene)
    }

    pub fn to_document(&self) -> SceneDocument {
        SceneDocument {
            nodes: self.nodes.clone(),
            selection: self
                .selection
                .iter()
                .map(|&id| self.nodes[id].name.clone())
                .collect(),
        }
    }

    pub fn to_json_pretty(&self) -> SceneResult<String> {
        Ok(serde_json::to_string_pretty(&self.to_document())?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text = self.to_json_pretty()?;
        std::fs::write(path, text).with_context(|| format!("Failed to write scene file: {:?}", path))?;
        log::debug!("Saved scene {:?}", path);
        Ok(())
    }

    pub fn find(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn node(&self, id: usize) -> Option<&SceneNode> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    pub fn selection(&self) -> &[usize] {
        &self.selection
    }

    pub fn children(&self, id: usize) -> Vec<usize> {
        let Some(name) = self.nodes.get(id).map(|node| node.name.as_str()) else {
            return Vec::new();
        };
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.parent.as_deref() == Some(name))
            .map(|(child, _)| child)
            .collect()
    }

    fn node_mut(&mut self, id: usize) -> SceneResult<&mut SceneNode> {
        self.nodes
            .get_mut(id)
            .ok_or_else(|| SceneError::NodeNotFound(format!("#{}", id)))
    }

    fn is_standin(&self, id: usize) -> bool {
        matches!(
            self.nodes.get(id).map(|node| &node.kind),
            Some(NodeKind::Standin { .. })
        )
    }

    /// Fails when `parent` is `child` or one of its descendants
    fn check_cycle(&self, child: usize, parent: usize) -> SceneResult<()> {
        let mut current = Some(parent);
        let mut steps = 0;
        while let Some(id) = current {
            if id == child || steps > self.nodes.len() {
                return Err(SceneError::ParentCycle {
                    child: self.nodes[child].name.clone(),
                    parent: self.nodes[parent].name.clone(),
                });
            }
            current = self.parent(id);
            steps += 1;
        }
        Ok(())
    }
}

impl SceneHost for JsonScene {
    type Node = usize;

    fn selected_standins(&self) -> Vec<usize> {
        let mut standins = Vec::new();
        for &id in &self.selection {
            let candidates = if self.is_standin(id) {
                vec![id]
            } else {
                self.children(id)
                    .into_iter()
                    .filter(|&child| self.is_standin(child))
                    .collect()
            };
            for candidate in candidates {
                if !standins.contains(&candidate) {
                    standins.push(candidate);
                }
            }
        }
        standins
    }

    fn all_standins(&self) -> Vec<usize> {
        (0..self.nodes.len()).filter(|&id| self.is_standin(id)).collect()
    }

    fn node_name(&self, node: usize) -> String {
        self.nodes
            .get(node)
            .map(|node| node.name.clone())
            .unwrap_or_default()
    }

    fn parent(&self, node: usize) -> Option<usize> {
        let parent = self.nodes.get(node)?.parent.as_deref()?;
        self.find(parent)
    }

    fn standin_file(&self, node: usize) -> Option<String> {
        match &self.nodes.get(node)?.kind {
            NodeKind::Standin { dso } => Some(dso.clone()),
            _ => None,
        }
    }

    fn set_standin_file(&mut self, node: usize, path: &str) -> SceneResult<()> {
        let entry = self.node_mut(node)?;
        match &mut entry.kind {
            NodeKind::Standin { dso } => {
                *dso = path.to_string();
                Ok(())
            }
            _ => Err(SceneError::NotAStandin(entry.name.clone())),
        }
    }

    /// Local matrices composed from the root down
    fn world_transform(&self, node: usize) -> Mat4 {
        let mut world = Mat4::IDENTITY;
        let mut current = Some(node);
        let mut steps = 0;
        while let Some(id) = current {
            let Some(entry) = self.nodes.get(id) else {
                break;
            };
            world = entry.local() * world;
            current = self.parent(id);
            steps += 1;
            if steps > self.nodes.len() {
                break;
            }
        }
        world
    }

    fn set_world_transform(&mut self, node: usize, matrix: Mat4) -> SceneResult<()> {
        let parent_world = match self.parent(node) {
            Some(parent) => self.world_transform(parent),
            None => Mat4::IDENTITY,
        };
        if parent_world.determinant().abs() <= f32::EPSILON {
            return Err(SceneError::SingularTransform(self.node_name(node)));
        }
        let local = parent_world.inverse() * matrix;
        self.node_mut(node)?.matrix = local.to_cols_array();
        Ok(())
    }

    fn create_reference(&mut self, path: &Path, namespace: &str) -> SceneResult<usize> {
        if !path.is_file() {
            return Err(SceneError::MissingFile(path.to_path_buf()));
        }
        if self.namespace_exists(namespace) {
            return Err(SceneError::NamespaceTaken(namespace.to_string()));
        }

        let stem = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = format!("{}:{}", namespace, stem);
        if self.index.contains_key(&name) {
            return Err(SceneError::DuplicateNode(name));
        }

        let id = self.nodes.len();
        self.nodes.push(SceneNode {
            name: name.clone(),
            parent: None,
            matrix: identity_matrix(),
            visible: true,
            kind: NodeKind::Reference {
                path: path.to_string_lossy().into_owned(),
                namespace: namespace.to_string(),
            },
        });
        self.index.insert(name, id);
        Ok(id)
    }

    /// Keeps the local matrix; callers set the world matrix afterwards if needed
    fn reparent(&mut self, node: usize, parent: Option<usize>) -> SceneResult<()> {
        self.node_mut(node)?;
        let parent_name = match parent {
            Some(parent) => {
                let name = self
                    .nodes
                    .get(parent)
                    .map(|entry| entry.name.clone())
                    .ok_or_else(|| SceneError::NodeNotFound(format!("#{}", parent)))?;
                self.check_cycle(node, parent)?;
                Some(name)
            }
            None => None,
        };
        self.node_mut(node)?.parent = parent_name;
        Ok(())
    }

    fn set_visible(&mut self, node: usize, visible: bool) -> SceneResult<()> {
        self.node_mut(node)?.visible = visible;
        Ok(())
    }

    fn namespace_exists(&self, namespace: &str) -> bool {
        self.nodes.iter().any(|node| {
            matches!(&node.kind, NodeKind::Reference { namespace: taken, .. } if taken == namespace)
        })
    }

    fn select(&mut self, nodes: &[usize]) {
        self.selection = nodes
            .iter()
            .copied()
            .filter(|&id| id < self.nodes.len())
            .collect();
    }
}
