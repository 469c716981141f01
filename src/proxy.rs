// proxy.rs - ProxyHandle adapter over a SceneHost standin node
use glam::Mat4;

use crate::error::{SceneError, SceneResult};
use crate::traits::{ProxyHandle, SceneHost};

/// A standin shape node of a host scene, seen through [`ProxyHandle`]
pub struct HostProxy<'a, H: SceneHost> {
    host: &'a mut H,
    node: H::Node,
}

impl<'a, H: SceneHost> HostProxy<'a, H> {
    /// Wrap a node, failing when it is not a standin
    pub fn new(host: &'a mut H, node: H::Node) -> SceneResult<Self> {
        if host.standin_file(node).is_none() {
            return Err(SceneError::NotAStandin(host.node_name(node)));
        }
        Ok(Self { host, node })
    }

    pub fn node(&self) -> H::Node {
        self.node
    }

    /// The transform containing the standin shape, or the shape itself at root
    pub fn transform_node(&self) -> H::Node {
        self.host.parent(self.node).unwrap_or(self.node)
    }

    pub fn host(&mut self) -> &mut H {
        &mut *self.host
    }
}

impl<H: SceneHost> ProxyHandle for HostProxy<'_, H> {
    fn parent_transform_name(&self) -> String {
        self.host.node_name(self.transform_node())
    }

    fn file_path(&self) -> String {
        self.host.standin_file(self.node).unwrap_or_default()
    }

    fn set_file_path(&mut self, path: &str) -> SceneResult<()> {
        self.host.set_standin_file(self.node, path)
    }

    fn world_transform(&self) -> Mat4 {
        self.host.world_transform(self.transform_node())
    }
}
