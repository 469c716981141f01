//! Fixtures for tests and benches: throwaway asset trees and an in-memory proxy.

use glam::Mat4;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::SceneResult;
use crate::traits::ProxyHandle;

static TREE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Asset directory under the system temp dir, removed on drop
pub struct AssetTree {
    root: PathBuf,
}

impl AssetTree {
    pub fn new(label: &str) -> io::Result<Self> {
        let id = TREE_COUNTER.fetch_add(1, Ordering::SeqCst);
        let root = std::env::temp_dir().join(format!(
            "asset-loader-{}-{}-{}",
            label,
            std::process::id(),
            id
        ));
        let _ = fs::remove_dir_all(&root);
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create `<root>/<name>_<variant>/<version>/<name>_<variant>.<ext>`
    pub fn add(&self, name: &str, variant: &str, version: &str, extension: &str) -> io::Result<PathBuf> {
        let stem = format!("{}_{}", name, variant);
        let dir = self.root.join(&stem).join(version);
        fs::create_dir_all(&dir)?;
        let file = dir.join(format!("{}.{}", stem, extension));
        fs::write(&file, b"")?;
        Ok(file)
    }

    /// Proxy and native file for one version
    pub fn add_version(&self, name: &str, variant: &str, version: &str) -> io::Result<PathBuf> {
        self.add(name, variant, version, "ma")?;
        self.add(name, variant, version, "ass")
    }

    /// Create an empty directory relative to the root
    pub fn add_dir(&self, relative: &str) -> io::Result<PathBuf> {
        let dir = self.root.join(relative);
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }
}

impl Drop for AssetTree {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.root);
    }
}

/// Proxy held entirely in memory
#[derive(Debug, Clone)]
pub struct MockProxy {
    pub transform_name: String,
    pub file_path: String,
    pub world: Mat4,
    pub writes: usize,
}

impl MockProxy {
    pub fn new(transform_name: &str, file_path: impl AsRef<Path>) -> Self {
        Self {
            transform_name: transform_name.to_string(),
            file_path: file_path.as_ref().to_string_lossy().into_owned(),
            world: Mat4::IDENTITY,
            writes: 0,
        }
    }
}

impl ProxyHandle for MockProxy {
    fn parent_transform_name(&self) -> String {
        self.transform_name.clone()
    }

    fn file_path(&self) -> String {
        self.file_path.clone()
    }

    fn set_file_path(&mut self, path: &str) -> SceneResult<()> {
        self.file_path = path.to_string();
        self.writes += 1;
        Ok(())
    }

    fn world_transform(&self) -> Mat4 {
        self.world
    }
}
