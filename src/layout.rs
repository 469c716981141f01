// layout.rs - Asset directory naming convention
//
// <asset_dir>/<name>_<VARIANT>/<version>/<name>_<VARIANT>.<ext>
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::Convention;

/// Why a proxy file path does not follow the asset layout
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidPath {
    #[error("expected a .{expected} file, found {path}")]
    WrongExtension { expected: String, path: String },
    #[error("file name {0} has no _<variant> suffix")]
    MissingSuffix(String),
    #[error("variant directory {found} does not match file name {expected}")]
    VariantDirMismatch { expected: String, found: String },
    #[error("path {0} is too shallow for <asset>/<variant>/<version>/<file>")]
    TooShallow(String),
    #[error("path {0} is not valid UTF-8")]
    NotUtf8(String),
    #[error("cannot list asset directory {path}: {reason}")]
    Unreadable { path: String, reason: String },
}

/// Components of a proxy path that follows the asset layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandinPath {
    pub asset_dir: PathBuf,
    pub standin_name: String,
    pub variant: String,
    pub version: String,
    pub extension: String,
}

impl StandinPath {
    pub fn variant_dir_name(&self) -> String {
        variant_dir_name(&self.standin_name, &self.variant)
    }

    pub fn variant_dir(&self) -> PathBuf {
        self.asset_dir.join(self.variant_dir_name())
    }

    pub fn version_dir(&self) -> PathBuf {
        self.variant_dir().join(&self.version)
    }

    /// Rebuild the file path with its own extension
    pub fn file_path(&self) -> PathBuf {
        self.file_path_with_extension(&self.extension)
    }

    /// Same asset file under another extension (e.g. the native scene file)
    pub fn file_path_with_extension(&self, extension: &str) -> PathBuf {
        self.version_dir()
            .join(format!("{}.{}", self.variant_dir_name(), extension))
    }

    /// Same asset, another variant/version
    pub fn with_variant_version(&self, variant: &str, version: &str) -> StandinPath {
        StandinPath {
            asset_dir: self.asset_dir.clone(),
            standin_name: self.standin_name.clone(),
            variant: variant.to_string(),
            version: version.to_string(),
            extension: self.extension.clone(),
        }
    }
}

pub fn variant_dir_name(standin_name: &str, variant: &str) -> String {
    format!("{}_{}", standin_name, variant)
}

/// Trailing `_` token of a directory name, or the whole name without one
pub fn variant_token(dir_name: &str) -> &str {
    dir_name
        .rsplit_once('_')
        .map(|(_, token)| token)
        .unwrap_or(dir_name)
}

/// Replace `from_token` with `to_token` in a variant name
pub fn sibling_variant(variant: &str, from_token: &str, to_token: &str) -> Option<String> {
    if from_token.is_empty() || !variant.contains(from_token) {
        return None;
    }
    Some(variant.replace(from_token, to_token))
}

pub fn swap_extension(path: &Path, extension: &str) -> PathBuf {
    path.with_extension(extension)
}

fn component_str<'a>(path: &'a Path, component: Option<&'a std::ffi::OsStr>) -> Result<&'a str, InvalidPath> {
    let component = component.ok_or_else(|| InvalidPath::TooShallow(display(path)))?;
    component
        .to_str()
        .ok_or_else(|| InvalidPath::NotUtf8(display(path)))
}

fn display(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Parse a proxy file path into its asset layout components.
///
/// The result always recombines into the input: `parsed.file_path() == path`
/// for any path accepted here.
pub fn parse_standin_path(path: &Path, convention: &Convention) -> Result<StandinPath, InvalidPath> {
    let file_name = component_str(path, path.file_name())?;

    let wrong_extension = || InvalidPath::WrongExtension {
        expected: convention.proxy_extension.clone(),
        path: display(path),
    };
    let (stem, extension) = file_name.rsplit_once('.').ok_or_else(wrong_extension)?;
    if extension != convention.proxy_extension {
        return Err(wrong_extension());
    }

    let (standin_name, variant) = stem
        .rsplit_once('_')
        .filter(|(name, token)| !name.is_empty() && !token.is_empty())
        .ok_or_else(|| InvalidPath::MissingSuffix(file_name.to_string()))?;

    let version_dir = path
        .parent()
        .ok_or_else(|| InvalidPath::TooShallow(display(path)))?;
    let version = component_str(path, version_dir.file_name())?;

    let variant_dir = version_dir
        .parent()
        .ok_or_else(|| InvalidPath::TooShallow(display(path)))?;
    let variant_dir_name = component_str(path, variant_dir.file_name())?;
    if variant_dir_name != stem {
        return Err(InvalidPath::VariantDirMismatch {
            expected: stem.to_string(),
            found: variant_dir_name.to_string(),
        });
    }

    let asset_dir = variant_dir
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .ok_or_else(|| InvalidPath::TooShallow(display(path)))?;

    Ok(StandinPath {
        asset_dir: asset_dir.to_path_buf(),
        standin_name: standin_name.to_string(),
        variant: variant.to_string(),
        version: version.to_string(),
        extension: extension.to_string(),
    })
}
