// selection.rs - Standins resolved for one refresh of the scene selection
use anyhow::{Context, Result};
use indexmap::IndexMap;
use log::warn;
use serde::Serialize;

use crate::config::Convention;
use crate::convert::convert_to_native;
use crate::error::{SceneError, SceneResult};
use crate::layout::InvalidPath;
use crate::proxy::HostProxy;
use crate::standin::{Standin, SwitchOutcome};
use crate::traits::{ProxyHandle, SceneHost};

/// Display fields of one resolved standin
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StandinRow {
    pub object: String,
    pub standin: String,
    pub variant: String,
    pub version: String,
    pub latest: Option<String>,
    pub up_to_date: bool,
    pub has_sd: bool,
    pub has_hd: bool,
}

impl From<&Standin> for StandinRow {
    fn from(standin: &Standin) -> Self {
        Self {
            object: standin.object_name().to_string(),
            standin: standin.standin_name().to_string(),
            variant: standin.active_variant().to_string(),
            version: standin.active_version().to_string(),
            latest: standin.last_version().map(str::to_string),
            up_to_date: standin.is_up_to_date(),
            has_sd: standin.has_version_in_sd(),
            has_hd: standin.has_version_in_hd(),
        }
    }
}

/// A standin whose file path does not follow the asset layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidStandin {
    pub object: String,
    pub file: String,
    pub reason: InvalidPath,
}

#[derive(Debug, Clone)]
struct Entry<N> {
    node: N,
    standin: Standin,
}

/// Resolved standins keyed by object name, in selection order.
///
/// Built fresh for each selection change and handed to every action, so no
/// state survives between refreshes.
#[derive(Debug, Clone)]
pub struct Selection<N> {
    entries: IndexMap<String, Entry<N>>,
    invalid: Vec<InvalidStandin>,
}

impl<N: Copy + Eq + std::hash::Hash + std::fmt::Debug> Selection<N> {
    /// Resolve the standins of the current host selection
    pub fn refresh<H: SceneHost<Node = N>>(host: &mut H, convention: &Convention) -> Self {
        let nodes = host.selected_standins();
        Self::from_nodes(host, &nodes, convention)
    }

    /// Resolve every standin in the scene
    pub fn refresh_all<H: SceneHost<Node = N>>(host: &mut H, convention: &Convention) -> Self {
        let nodes = host.all_standins();
        Self::from_nodes(host, &nodes, convention)
    }

    pub fn from_nodes<H: SceneHost<Node = N>>(host: &mut H, nodes: &[N], convention: &Convention) -> Self {
        let mut entries = IndexMap::new();
        let mut invalid = Vec::new();

        for &node in nodes {
            let proxy = match HostProxy::new(host, node) {
                Ok(proxy) => proxy,
                Err(err) => {
                    warn!("Skipping {:?}: {}", node, err);
                    continue;
                }
            };

            match Standin::parse(&proxy, convention) {
                Ok(standin) => {
                    let object = standin.object_name().to_string();
                    if entries.contains_key(&object) {
                        warn!("{}: more than one standin shape, keeping the first", object);
                        continue;
                    }
                    entries.insert(object, Entry { node, standin });
                }
                Err(reason) => {
                    let object = proxy.parent_transform_name().trim_matches('|').to_string();
                    warn!("{}: {}", object, reason);
                    invalid.push(InvalidStandin {
                        object,
                        file: proxy.file_path(),
                        reason,
                    });
                }
            }
        }

        Self { entries, invalid }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn objects(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn get(&self, object: &str) -> Option<&Standin> {
        self.entries.get(object).map(|entry| &entry.standin)
    }

    pub fn node(&self, object: &str) -> Option<N> {
        self.entries.get(object).map(|entry| entry.node)
    }

    pub fn invalid(&self) -> &[InvalidStandin] {
        &self.invalid
    }

    pub fn rows(&self) -> Vec<StandinRow> {
        self.entries
            .values()
            .map(|entry| StandinRow::from(&entry.standin))
            .collect()
    }

    pub fn out_of_date(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, entry)| !entry.standin.is_up_to_date())
            .map(|(object, _)| object.as_str())
            .collect()
    }

    /// Select the transforms of every out-of-date standin in the host
    pub fn select_out_of_date<H: SceneHost<Node = N>>(&self, host: &mut H) -> Vec<String> {
        let objects: Vec<String> = self.out_of_date().into_iter().map(str::to_string).collect();
        let transforms: Vec<N> = objects
            .iter()
            .filter_map(|object| self.node(object))
            .map(|node| host.parent(node).unwrap_or(node))
            .collect();
        host.select(&transforms);
        objects
    }

    pub fn set_version<H: SceneHost<Node = N>>(
        &mut self,
        host: &mut H,
        object: &str,
        variant: &str,
        version: &str,
    ) -> SceneResult<SwitchOutcome> {
        let entry = self
            .entries
            .get_mut(object)
            .ok_or_else(|| SceneError::NodeNotFound(object.to_string()))?;
        let mut proxy = HostProxy::new(host, entry.node)?;
        entry.standin.set_active_variant_version(&mut proxy, variant, version)
    }

    pub fn update_to_last<H: SceneHost<Node = N>>(
        &mut self,
        host: &mut H,
        objects: &[String],
    ) -> SceneResult<Vec<(String, SwitchOutcome)>> {
        self.apply(host, objects, |standin, proxy| standin.update_to_last(proxy))
    }

    pub fn switch_to_sd<H: SceneHost<Node = N>>(
        &mut self,
        host: &mut H,
        objects: &[String],
    ) -> SceneResult<Vec<(String, SwitchOutcome)>> {
        self.apply(host, objects, |standin, proxy| standin.switch_to_sd(proxy))
    }

    pub fn switch_to_hd<H: SceneHost<Node = N>>(
        &mut self,
        host: &mut H,
        objects: &[String],
    ) -> SceneResult<Vec<(String, SwitchOutcome)>> {
        self.apply(host, objects, |standin, proxy| standin.switch_to_hd(proxy))
    }

    /// Convert each object in turn, stopping at the first failure
    pub fn convert<H: SceneHost<Node = N>>(&self, host: &mut H, objects: &[String]) -> Result<Vec<(String, N)>> {
        let mut converted = Vec::new();
        for object in self.targets(objects)? {
            let entry = &self.entries[&object];
            let mut proxy = HostProxy::new(host, entry.node)?;
            let reference = convert_to_native(&mut proxy, &entry.standin)
                .with_context(|| format!("Failed to convert {}", object))?;
            converted.push((object, reference));
        }
        Ok(converted)
    }

    /// Named objects, or every object when none are named
    fn targets(&self, objects: &[String]) -> SceneResult<Vec<String>> {
        if objects.is_empty() {
            return Ok(self.entries.keys().cloned().collect());
        }
        for object in objects {
            if !self.entries.contains_key(object) {
                return Err(SceneError::NodeNotFound(object.clone()));
            }
        }
        Ok(objects.to_vec())
    }

    fn apply<H, F>(&mut self, host: &mut H, objects: &[String], mut action: F) -> SceneResult<Vec<(String, SwitchOutcome)>>
    where
        H: SceneHost<Node = N>,
        F: for<'a> FnMut(&mut Standin, &mut HostProxy<'a, H>) -> SceneResult<SwitchOutcome>,
    {
        let mut outcomes = Vec::new();
        for object in self.targets(objects)? {
            let entry = &mut self.entries[&object];
            let mut proxy = HostProxy::new(host, entry.node)?;
            let outcome = action(&mut entry.standin, &mut proxy)?;
            outcomes.push((object, outcome));
        }
        Ok(outcomes)
    }
}
