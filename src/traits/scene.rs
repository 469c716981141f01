use glam::Mat4;
use std::fmt::Debug;
use std::hash::Hash;
use std::path::Path;

use crate::error::SceneResult;

/// Host application scene binding.
///
/// Standins are shape nodes parented under a transform; the transform is
/// what the artist selects and what gets hidden on conversion.
pub trait SceneHost {
    type Node: Copy + Eq + Hash + Debug;

    /// Standin shapes in the current selection, in selection order
    fn selected_standins(&self) -> Vec<Self::Node>;

    /// Every standin shape in the scene
    fn all_standins(&self) -> Vec<Self::Node>;

    fn node_name(&self, node: Self::Node) -> String;

    fn parent(&self, node: Self::Node) -> Option<Self::Node>;

    /// File attribute of a standin, `None` for other node kinds
    fn standin_file(&self, node: Self::Node) -> Option<String>;

    fn set_standin_file(&mut self, node: Self::Node, path: &str) -> SceneResult<()>;

    fn world_transform(&self, node: Self::Node) -> Mat4;

    fn set_world_transform(&mut self, node: Self::Node, matrix: Mat4) -> SceneResult<()>;

    /// Load a scene file as a reference under `namespace`, returning its root node
    fn create_reference(&mut self, path: &Path, namespace: &str) -> SceneResult<Self::Node>;

    /// Move a node under `parent`, or to the scene root when `None`
    fn reparent(&mut self, node: Self::Node, parent: Option<Self::Node>) -> SceneResult<()>;

    fn set_visible(&mut self, node: Self::Node, visible: bool) -> SceneResult<()>;

    fn namespace_exists(&self, namespace: &str) -> bool;

    /// Replace the current selection
    fn select(&mut self, nodes: &[Self::Node]);
}
