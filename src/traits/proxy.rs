use glam::Mat4;

use crate::error::SceneResult;

/// One standin proxy object in the host scene.
///
/// The resolver only ever reads the proxy's container name, its file-path
/// attribute and its world matrix, and writes the file-path attribute.
pub trait ProxyHandle {
    /// Display name of the transform that contains the proxy shape
    fn parent_transform_name(&self) -> String;

    /// Current value of the proxy's file-path attribute
    fn file_path(&self) -> String;

    /// Repoint the proxy at another file
    fn set_file_path(&mut self, path: &str) -> SceneResult<()>;

    /// World matrix of the containing transform
    fn world_transform(&self) -> Mat4;
}
