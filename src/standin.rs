// standin.rs - Asset identity and variant/version resolution for one proxy
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::Convention;
use crate::error::SceneResult;
use crate::layout::{
    parse_standin_path, sibling_variant, swap_extension, variant_token, InvalidPath, StandinPath,
};
use crate::traits::ProxyHandle;

/// One version directory of a variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionEntry {
    pub name: String,
    pub path: PathBuf,
}

/// Variant token -> versions, latest first
pub type VersionMap = BTreeMap<String, Vec<VersionEntry>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Variant or version was empty
    EmptyArgument,
    /// Variant or version would leave this asset's directories
    InvalidArgument,
    /// Already on the requested variant and version
    Unchanged,
    /// Target file is not on disk
    MissingFile(PathBuf),
    /// Active variant has no listed versions
    NoVersions,
    /// No sibling variant carries the active version
    NoSibling,
}

/// Result of a request to repoint a proxy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchOutcome {
    Applied { path: PathBuf },
    Skipped(SkipReason),
}

impl SwitchOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, SwitchOutcome::Applied { .. })
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::EmptyArgument => write!(f, "variant and version are required"),
            SkipReason::InvalidArgument => write!(f, "variant or version is not a plain name"),
            SkipReason::Unchanged => write!(f, "already current"),
            SkipReason::MissingFile(path) => write!(f, "no file at {}", path.display()),
            SkipReason::NoVersions => write!(f, "no versions on disk"),
            SkipReason::NoSibling => write!(f, "no sibling variant at this version"),
        }
    }
}

impl fmt::Display for SwitchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwitchOutcome::Applied { path } => write!(f, "-> {}", path.display()),
            SwitchOutcome::Skipped(reason) => write!(f, "skipped: {}", reason),
        }
    }
}

/// Parsed state of one standin proxy
#[derive(Debug, Clone)]
pub struct Standin {
    object_name: String,
    layout: StandinPath,
    file_path: PathBuf,
    versions: VersionMap,
    convention: Convention,
}

impl Standin {
    /// Resolve a proxy's asset, active variant/version and every sibling version on disk
    pub fn parse<P: ProxyHandle + ?Sized>(proxy: &P, convention: &Convention) -> Result<Self, InvalidPath> {
        let object_name = proxy.parent_transform_name().trim_matches('|').to_string();
        let file_path = PathBuf::from(proxy.file_path());
        let layout = parse_standin_path(&file_path, convention)?;
        let versions = list_versions(&layout.asset_dir, &layout.standin_name)?;

        debug!(
            "Resolved {}: {} {}/{} ({} variants)",
            object_name,
            layout.standin_name,
            layout.variant,
            layout.version,
            versions.len()
        );

        Ok(Self {
            object_name,
            layout,
            file_path,
            versions,
            convention: convention.clone(),
        })
    }

    pub fn object_name(&self) -> &str {
        &self.object_name
    }

    pub fn standin_name(&self) -> &str {
        &self.layout.standin_name
    }

    pub fn active_variant(&self) -> &str {
        &self.layout.variant
    }

    pub fn active_version(&self) -> &str {
        &self.layout.version
    }

    /// File the proxy currently references
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn layout(&self) -> &StandinPath {
        &self.layout
    }

    pub fn versions(&self) -> &VersionMap {
        &self.versions
    }

    pub fn versions_of(&self, variant: &str) -> &[VersionEntry] {
        self.versions.get(variant).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First entry of the active variant after the descending sort.
    ///
    /// Lexicographic on directory names: `v9` ranks above `v10`.
    pub fn last_version(&self) -> Option<&str> {
        self.versions_of(self.active_variant())
            .first()
            .map(|entry| entry.name.as_str())
    }

    pub fn is_up_to_date(&self) -> bool {
        self.last_version() == Some(self.active_version())
    }

    /// Native scene file next to the proxy file
    pub fn native_path(&self) -> PathBuf {
        swap_extension(&self.file_path, &self.convention.native_extension)
    }

    /// Repoint the proxy at `<variant>/<version>` when that file exists.
    ///
    /// Nothing changes for empty arguments, the current state, or a missing
    /// file. Errors only come from the host writing the attribute.
    pub fn set_active_variant_version<P: ProxyHandle + ?Sized>(
        &mut self,
        proxy: &mut P,
        variant: &str,
        version: &str,
    ) -> SceneResult<SwitchOutcome> {
        if variant.is_empty() || version.is_empty() {
            return Ok(SwitchOutcome::Skipped(SkipReason::EmptyArgument));
        }
        if !is_plain_component(version) || !is_plain_component(variant) || variant.contains('_') {
            warn!("{}: rejected variant {:?} version {:?}", self.object_name, variant, version);
            return Ok(SwitchOutcome::Skipped(SkipReason::InvalidArgument));
        }
        if variant == self.active_variant() && version == self.active_version() {
            return Ok(SwitchOutcome::Skipped(SkipReason::Unchanged));
        }

        let target = self.layout.with_variant_version(variant, version);
        let path = target.file_path();
        if !path.is_file() {
            warn!(
                "{}: no file for {} {}, expected {:?}",
                self.object_name, variant, version, path
            );
            return Ok(SwitchOutcome::Skipped(SkipReason::MissingFile(path)));
        }

        proxy.set_file_path(&path.to_string_lossy())?;
        info!(
            "{}: {} {}/{} -> {}/{}",
            self.object_name,
            self.layout.standin_name,
            self.layout.variant,
            self.layout.version,
            variant,
            version
        );

        self.layout = target;
        self.file_path = path.clone();
        Ok(SwitchOutcome::Applied { path })
    }

    /// Move to the latest version of the active variant
    pub fn update_to_last<P: ProxyHandle + ?Sized>(&mut self, proxy: &mut P) -> SceneResult<SwitchOutcome> {
        let Some(last) = self.last_version().map(str::to_owned) else {
            return Ok(SwitchOutcome::Skipped(SkipReason::NoVersions));
        };
        let variant = self.active_variant().to_owned();
        self.set_active_variant_version(proxy, &variant, &last)
    }

    /// Sibling variant holding the active version, found by swapping `from_token` for `to_token`
    pub fn version_replaced(&self, from_token: &str, to_token: &str) -> Option<(String, String)> {
        let sibling = sibling_variant(self.active_variant(), from_token, to_token)?;
        let version = self.active_version();
        self.versions_of(&sibling)
            .iter()
            .any(|entry| entry.name == version)
            .then(|| (sibling, version.to_owned()))
    }

    pub fn has_version_in_sd(&self) -> bool {
        self.version_replaced(&self.convention.high_token, &self.convention.low_token)
            .is_some()
    }

    pub fn has_version_in_hd(&self) -> bool {
        self.version_replaced(&self.convention.low_token, &self.convention.high_token)
            .is_some()
    }

    /// Same version, low detail variant
    pub fn switch_to_sd<P: ProxyHandle + ?Sized>(&mut self, proxy: &mut P) -> SceneResult<SwitchOutcome> {
        let (from, to) = (self.convention.high_token.clone(), self.convention.low_token.clone());
        self.switch_sibling(proxy, &from, &to)
    }

    /// Same version, high detail variant
    pub fn switch_to_hd<P: ProxyHandle + ?Sized>(&mut self, proxy: &mut P) -> SceneResult<SwitchOutcome> {
        let (from, to) = (self.convention.low_token.clone(), self.convention.high_token.clone());
        self.switch_sibling(proxy, &from, &to)
    }

    fn switch_sibling<P: ProxyHandle + ?Sized>(
        &mut self,
        proxy: &mut P,
        from_token: &str,
        to_token: &str,
    ) -> SceneResult<SwitchOutcome> {
        match self.version_replaced(from_token, to_token) {
            Some((variant, version)) => self.set_active_variant_version(proxy, &variant, &version),
            None => Ok(SwitchOutcome::Skipped(SkipReason::NoSibling)),
        }
    }
}

/// A single directory name: no separators, not `.` or `..`
fn is_plain_component(name: &str) -> bool {
    name != "." && name != ".." && !name.chars().any(std::path::is_separator)
}

/// List `<standin_name>_<variant>/<version>` directories under an asset directory
pub fn list_versions(asset_dir: &Path, standin_name: &str) -> Result<VersionMap, InvalidPath> {
    let unreadable = |dir: &Path, err: io::Error| InvalidPath::Unreadable {
        path: dir.to_string_lossy().into_owned(),
        reason: err.to_string(),
    };

    let prefix = format!("{}_", standin_name);
    let mut versions = VersionMap::new();

    for entry in fs::read_dir(asset_dir).map_err(|e| unreadable(asset_dir, e))? {
        let entry = entry.map_err(|e| unreadable(asset_dir, e))?;
        let variant_dir = entry.path();
        if !variant_dir.is_dir() {
            continue;
        }
        let Some(dir_name) = entry.file_name().to_str().map(str::to_owned) else {
            continue;
        };
        let Some(variant) = dir_name.strip_prefix(&prefix) else {
            continue;
        };
        // another asset sharing the prefix, e.g. Rock_big_SD next to Rock_SD
        if variant.is_empty() || variant_token(&dir_name) != variant {
            continue;
        }

        let mut entries = Vec::new();
        for version in fs::read_dir(&variant_dir).map_err(|e| unreadable(&variant_dir, e))? {
            let version = version.map_err(|e| unreadable(&variant_dir, e))?;
            let version_dir = version.path();
            if !version_dir.is_dir() {
                continue;
            }
            if let Some(name) = version.file_name().to_str() {
                entries.push(VersionEntry {
                    name: name.to_owned(),
                    path: version_dir,
                });
            }
        }
        entries.sort_by(|a, b| b.name.cmp(&a.name));
        versions.insert(variant.to_owned(), entries);
    }

    Ok(versions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{AssetTree, MockProxy};

    /// Rock_SD/v003, Rock_HD/v002, Rock_HD/v003
    fn rock_tree() -> AssetTree {
        let tree = AssetTree::new("standin").unwrap();
        tree.add_version("Rock", "SD", "v003").unwrap();
        tree.add_version("Rock", "HD", "v002").unwrap();
        tree.add_version("Rock", "HD", "v003").unwrap();
        tree
    }

    fn rock_hd_v002(tree: &AssetTree) -> MockProxy {
        MockProxy::new("|grp|rock01|", tree.path("Rock_HD/v002/Rock_HD.ass"))
    }

    #[test]
    fn parse_reads_identity() {
        let tree = rock_tree();
        let standin = Standin::parse(&rock_hd_v002(&tree), &Convention::default()).unwrap();

        assert_eq!(standin.object_name(), "grp|rock01");
        assert_eq!(standin.standin_name(), "Rock");
        assert_eq!(standin.active_variant(), "HD");
        assert_eq!(standin.active_version(), "v002");
    }

    #[test]
    fn parse_lists_versions_descending() {
        let tree = rock_tree();
        let standin = Standin::parse(&rock_hd_v002(&tree), &Convention::default()).unwrap();

        let hd: Vec<_> = standin.versions_of("HD").iter().map(|v| v.name.as_str()).collect();
        assert_eq!(hd, vec!["v003", "v002"]);
        assert_eq!(standin.versions_of("HD")[0].path, tree.path("Rock_HD/v003"));
        assert_eq!(standin.versions().keys().collect::<Vec<_>>(), vec!["HD", "SD"]);
    }

    #[test]
    fn reference_example() {
        let tree = rock_tree();
        let standin = Standin::parse(&rock_hd_v002(&tree), &Convention::default()).unwrap();

        assert!(!standin.is_up_to_date());
        assert_eq!(standin.last_version(), Some("v003"));
        assert!(!standin.has_version_in_sd());
        assert!(!standin.has_version_in_hd());
    }

    #[test]
    fn parse_rejects_malformed_path() {
        let tree = rock_tree();
        let proxy = MockProxy::new("rock01", tree.path("Rock_HD/v002/Rock_HD.ma"));
        assert!(matches!(
            Standin::parse(&proxy, &Convention::default()),
            Err(InvalidPath::WrongExtension { .. })
        ));
    }

    #[test]
    fn parse_missing_asset_dir_is_unreadable() {
        let proxy = MockProxy::new("rock01", "/nonexistent/asset-loader/Rock/Rock_HD/v1/Rock_HD.ass");
        assert!(matches!(
            Standin::parse(&proxy, &Convention::default()),
            Err(InvalidPath::Unreadable { .. })
        ));
    }

    #[test]
    fn listing_skips_unrelated_entries() {
        let tree = rock_tree();
        tree.add_version("Rock_big", "SD", "v001").unwrap();
        tree.add_version("Tree", "HD", "v009").unwrap();
        tree.add_dir("Rock_HD/v004/nested").unwrap();
        std::fs::write(tree.path("Rock_HD/notes.txt"), b"").unwrap();
        std::fs::write(tree.path("Rock_LD"), b"").unwrap();

        let standin = Standin::parse(&rock_hd_v002(&tree), &Convention::default()).unwrap();
        assert_eq!(standin.versions().keys().collect::<Vec<_>>(), vec!["HD", "SD"]);
        let hd: Vec<_> = standin.versions_of("HD").iter().map(|v| v.name.as_str()).collect();
        assert_eq!(hd, vec!["v004", "v003", "v002"]);
    }

    #[test]
    fn last_version_is_lexicographic() {
        let tree = AssetTree::new("lexi").unwrap();
        tree.add_version("Rock", "HD", "v9").unwrap();
        tree.add_version("Rock", "HD", "v10").unwrap();
        let proxy = MockProxy::new("rock01", tree.path("Rock_HD/v9/Rock_HD.ass"));

        let standin = Standin::parse(&proxy, &Convention::default()).unwrap();
        assert_eq!(standin.last_version(), Some("v9"));
        assert!(standin.is_up_to_date());
    }

    #[test]
    fn set_version_repoints_proxy() {
        let tree = rock_tree();
        let mut proxy = rock_hd_v002(&tree);
        let mut standin = Standin::parse(&proxy, &Convention::default()).unwrap();

        let outcome = standin.set_active_variant_version(&mut proxy, "SD", "v003").unwrap();
        let expected = tree.path("Rock_SD/v003/Rock_SD.ass");
        assert_eq!(outcome, SwitchOutcome::Applied { path: expected.clone() });
        assert_eq!(proxy.file_path, expected.to_string_lossy());
        assert_eq!(standin.active_variant(), "SD");
        assert_eq!(standin.active_version(), "v003");
        assert_eq!(standin.file_path(), expected.as_path());
    }

    #[test]
    fn set_version_missing_file_is_noop() {
        let tree = rock_tree();
        let mut proxy = rock_hd_v002(&tree);
        let original = proxy.file_path.clone();
        let mut standin = Standin::parse(&proxy, &Convention::default()).unwrap();

        let outcome = standin.set_active_variant_version(&mut proxy, "SD", "v002").unwrap();
        assert_eq!(
            outcome,
            SwitchOutcome::Skipped(SkipReason::MissingFile(tree.path("Rock_SD/v002/Rock_SD.ass")))
        );
        assert_eq!(proxy.file_path, original);
        assert_eq!(proxy.writes, 0);
        assert_eq!(standin.active_variant(), "HD");
        assert_eq!(standin.active_version(), "v002");
    }

    #[test]
    fn set_version_directory_without_file_is_noop() {
        let tree = rock_tree();
        tree.add_dir("Rock_HD/v005").unwrap();
        let mut proxy = rock_hd_v002(&tree);
        let mut standin = Standin::parse(&proxy, &Convention::default()).unwrap();

        let outcome = standin.set_active_variant_version(&mut proxy, "HD", "v005").unwrap();
        assert!(!outcome.is_applied());
        assert_eq!(standin.active_version(), "v002");
    }

    #[test]
    fn set_version_empty_or_same_is_noop() {
        let tree = rock_tree();
        let mut proxy = rock_hd_v002(&tree);
        let mut standin = Standin::parse(&proxy, &Convention::default()).unwrap();

        assert_eq!(
            standin.set_active_variant_version(&mut proxy, "", "v003").unwrap(),
            SwitchOutcome::Skipped(SkipReason::EmptyArgument)
        );
        assert_eq!(
            standin.set_active_variant_version(&mut proxy, "HD", "").unwrap(),
            SwitchOutcome::Skipped(SkipReason::EmptyArgument)
        );
        assert_eq!(
            standin.set_active_variant_version(&mut proxy, "HD", "v002").unwrap(),
            SwitchOutcome::Skipped(SkipReason::Unchanged)
        );
        assert_eq!(proxy.writes, 0);
    }

    #[test]
    fn set_version_rejects_other_asset_and_traversal() {
        let tree = AssetTree::new("foreign").unwrap();
        tree.add_version("Rock", "HD", "v001").unwrap();
        tree.add_version("Rock_big", "SD", "v001").unwrap();
        let mut proxy = MockProxy::new("rock01", tree.path("Rock_HD/v001/Rock_HD.ass"));
        let original = proxy.file_path.clone();
        let mut standin = Standin::parse(&proxy, &Convention::default()).unwrap();

        for (variant, version) in [
            ("big_SD", "v001"),
            ("HD/../Rock_big_SD", "v001"),
            ("HD", "../../Rock_HD/v001"),
            ("HD", ".."),
            ("..", "v001"),
        ] {
            assert_eq!(
                standin.set_active_variant_version(&mut proxy, variant, version).unwrap(),
                SwitchOutcome::Skipped(SkipReason::InvalidArgument),
                "{} {}",
                variant,
                version
            );
        }
        assert_eq!(proxy.file_path, original);
        assert_eq!(proxy.writes, 0);

        let reparsed = Standin::parse(&proxy, &Convention::default()).unwrap();
        assert_eq!(reparsed.standin_name(), standin.standin_name());
        assert_eq!(reparsed.active_variant(), standin.active_variant());
    }

    #[test]
    fn update_to_last_then_up_to_date() {
        let tree = rock_tree();
        let mut proxy = rock_hd_v002(&tree);
        let mut standin = Standin::parse(&proxy, &Convention::default()).unwrap();

        assert!(standin.update_to_last(&mut proxy).unwrap().is_applied());
        assert!(standin.is_up_to_date());
        assert_eq!(standin.active_version(), "v003");

        assert_eq!(
            standin.update_to_last(&mut proxy).unwrap(),
            SwitchOutcome::Skipped(SkipReason::Unchanged)
        );
    }

    #[test]
    fn sd_hd_availability_is_exclusive() {
        let tree = rock_tree();
        let mut proxy = MockProxy::new("rock01", tree.path("Rock_HD/v003/Rock_HD.ass"));
        let mut standin = Standin::parse(&proxy, &Convention::default()).unwrap();

        assert!(standin.has_version_in_sd());
        assert!(!standin.has_version_in_hd());
        assert_eq!(
            standin.version_replaced("HD", "SD"),
            Some(("SD".to_string(), "v003".to_string()))
        );

        assert!(standin.switch_to_sd(&mut proxy).unwrap().is_applied());
        assert_eq!(standin.active_variant(), "SD");
        assert!(!standin.has_version_in_sd());
        assert!(standin.has_version_in_hd());

        assert!(standin.switch_to_hd(&mut proxy).unwrap().is_applied());
        assert_eq!(standin.active_variant(), "HD");
        assert_eq!(standin.active_version(), "v003");
    }

    #[test]
    fn neither_token_means_no_sibling() {
        let tree = AssetTree::new("mid").unwrap();
        tree.add_version("Rock", "MID", "v001").unwrap();
        tree.add_version("Rock", "SD", "v001").unwrap();
        let mut proxy = MockProxy::new("rock01", tree.path("Rock_MID/v001/Rock_MID.ass"));
        let mut standin = Standin::parse(&proxy, &Convention::default()).unwrap();

        assert!(!standin.has_version_in_sd());
        assert!(!standin.has_version_in_hd());
        assert_eq!(
            standin.switch_to_sd(&mut proxy).unwrap(),
            SwitchOutcome::Skipped(SkipReason::NoSibling)
        );
    }

    #[test]
    fn native_path_swaps_extension() {
        let tree = rock_tree();
        let standin = Standin::parse(&rock_hd_v002(&tree), &Convention::default()).unwrap();
        assert_eq!(standin.native_path(), tree.path("Rock_HD/v002/Rock_HD.ma"));
    }

    #[test]
    fn missing_active_variant_has_no_last_version() {
        let tree = rock_tree();
        let mut proxy = MockProxy::new("rock01", tree.path("Rock_XD/v001/Rock_XD.ass"));
        let mut standin = Standin::parse(&proxy, &Convention::default()).unwrap();

        assert_eq!(standin.last_version(), None);
        assert!(!standin.is_up_to_date());
        assert_eq!(
            standin.update_to_last(&mut proxy).unwrap(),
            SwitchOutcome::Skipped(SkipReason::NoVersions)
        );
    }
}
