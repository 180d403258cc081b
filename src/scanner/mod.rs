//! # Scanner Module
//!
//! Walks an evidence root and classifies browser databases by file name.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::constants::{CHROMIUM_COOKIES_FILE, CHROMIUM_HISTORY_FILE, FIREFOX_PLACES_FILE};
use crate::error::{Result, WebBeaverError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtefactCategory {
    History,
    Cookies,
    Downloads,
    Cache,
}

#[derive(Debug, Clone, Copy)]
pub struct ScanOptions {
    /// Follow symbolic links; cycles are detected and skipped either way
    pub follow_symlinks: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            follow_symlinks: true,
        }
    }
}

/// Candidate databases per category, in walk order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileFileSet {
    pub history: Vec<PathBuf>,
    pub cookies: Vec<PathBuf>,
    pub downloads: Vec<PathBuf>,
    pub cache: Vec<PathBuf>,
    /// Entries the walk could not read (permissions, vanished files)
    pub walk_errors: u64,
    /// Symlinks skipped because they lead back into an ancestor
    pub symlink_cycles: u64,
}

impl ProfileFileSet {
    pub fn files(&self, category: ArtefactCategory) -> &[PathBuf] {
        match category {
            ArtefactCategory::History => &self.history,
            ArtefactCategory::Cookies => &self.cookies,
            ArtefactCategory::Downloads => &self.downloads,
            ArtefactCategory::Cache => &self.cache,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
            && self.cookies.is_empty()
            && self.downloads.is_empty()
            && self.cache.is_empty()
    }
}

/// Check that `root` exists and is a directory, returning it as an absolute path.
pub fn validate_root(root: &Path) -> Result<PathBuf> {
    let meta = fs::metadata(root)
        .map_err(|err| WebBeaverError::invalid_root(root, format!("cannot stat: {err}")))?;
    if !meta.is_dir() {
        return Err(WebBeaverError::invalid_root(root, "not a directory"));
    }
    if root.is_absolute() {
        Ok(root.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(root))
    }
}

/// Walk `root` and collect browser databases.
///
/// `History` files are Chromium history and also the download candidates,
/// `Cookies` files are Chromium cookies and `places.sqlite` is Firefox history.
/// An empty result is not an error.
pub fn scan(root: &Path, opts: &ScanOptions) -> Result<ProfileFileSet> {
    let root = validate_root(root)?;
    let mut set = ProfileFileSet::default();

    let walker = WalkDir::new(&root)
        .follow_links(opts.follow_symlinks)
        .sort_by_file_name();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                if let Some(ancestor) = err.loop_ancestor() {
                    set.symlink_cycles += 1;
                    warn!(
                        "symlink cycle skipped path={} ancestor={}",
                        err.path().map(|p| p.display().to_string()).unwrap_or_default(),
                        ancestor.display()
                    );
                } else {
                    set.walk_errors += 1;
                    warn!("walk error err={}", err);
                }
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
            continue;
        };
        let path = entry.into_path();
        match name.as_str() {
            CHROMIUM_HISTORY_FILE => {
                debug!("found chromium history path={}", path.display());
                set.downloads.push(path.clone());
                set.history.push(path);
            }
            CHROMIUM_COOKIES_FILE => {
                debug!("found chromium cookies path={}", path.display());
                set.cookies.push(path);
            }
            FIREFOX_PLACES_FILE => {
                debug!("found firefox places path={}", path.display());
                set.history.push(path);
            }
            _ => {}
        }
    }

    info!(
        "scan complete root={} history={} cookies={} downloads={} walk_errors={} symlink_cycles={}",
        root.display(),
        set.history.len(),
        set.cookies.len(),
        set.downloads.len(),
        set.walk_errors,
        set.symlink_cycles
    );
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(path, b"").expect("write");
    }

    #[test]
    fn classifies_by_exact_file_name() {
        let dir = tempdir().expect("tempdir");
        let root = dir.path();
        touch(&root.join("Google/Chrome/User Data/Default/History"));
        touch(&root.join("Google/Chrome/User Data/Default/Cookies"));
        touch(&root.join("Mozilla/Firefox/Profiles/abc.default/places.sqlite"));
        touch(&root.join("Google/Chrome/User Data/Default/History-journal"));
        touch(&root.join("Google/Chrome/User Data/Default/history"));
        touch(&root.join("Mozilla/Firefox/Profiles/abc.default/cookies.sqlite"));

        let set = scan(root, &ScanOptions::default()).expect("scan");
        assert_eq!(set.history.len(), 2);
        assert_eq!(set.cookies.len(), 1);
        assert_eq!(set.downloads, vec![root.join("Google/Chrome/User Data/Default/History")]);
        assert!(set.cache.is_empty());
        assert!(set.history.iter().any(|p| p.ends_with("places.sqlite")));
        assert_eq!(set.files(ArtefactCategory::Cookies), set.cookies.as_slice());
    }

    #[test]
    fn walk_order_is_stable() {
        let dir = tempdir().expect("tempdir");
        let root = dir.path();
        for profile in ["Profile 2", "Default", "Profile 1"] {
            touch(&root.join(profile).join("History"));
        }
        let first = scan(root, &ScanOptions::default()).expect("scan");
        let second = scan(root, &ScanOptions::default()).expect("scan");
        assert_eq!(first, second);
        let names: Vec<_> = first
            .history
            .iter()
            .map(|p| p.parent().unwrap().file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["Default", "Profile 1", "Profile 2"]);
    }

    #[test]
    fn empty_root_is_not_an_error() {
        let dir = tempdir().expect("tempdir");
        touch(&dir.path().join("notes.txt"));
        let set = scan(dir.path(), &ScanOptions::default()).expect("scan");
        assert!(set.is_empty());
    }

    #[test]
    fn missing_root_is_invalid() {
        let dir = tempdir().expect("tempdir");
        let err = scan(&dir.path().join("absent"), &ScanOptions::default()).unwrap_err();
        assert!(matches!(err, WebBeaverError::InvalidRoot { .. }));
    }

    #[test]
    fn file_root_is_invalid() {
        let dir = tempdir().expect("tempdir");
        let file = dir.path().join("History");
        touch(&file);
        let err = scan(&file, &ScanOptions::default()).unwrap_err();
        assert!(matches!(err, WebBeaverError::InvalidRoot { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn symlink_cycles_are_skipped() {
        let dir = tempdir().expect("tempdir");
        let root = dir.path();
        touch(&root.join("Default/History"));
        std::os::unix::fs::symlink(root, root.join("Default/loop")).expect("symlink");

        let set = scan(root, &ScanOptions { follow_symlinks: true }).expect("scan");
        assert_eq!(set.history.len(), 1);
        assert_eq!(set.symlink_cycles, 1);
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_followed_only_when_enabled() {
        let dir = tempdir().expect("tempdir");
        let evidence = dir.path().join("evidence");
        touch(&dir.path().join("elsewhere/Default/Cookies"));
        fs::create_dir_all(&evidence).expect("mkdir");
        std::os::unix::fs::symlink(dir.path().join("elsewhere"), evidence.join("linked"))
            .expect("symlink");

        let followed = scan(&evidence, &ScanOptions { follow_symlinks: true }).expect("scan");
        assert_eq!(followed.cookies.len(), 1);
        let not_followed = scan(&evidence, &ScanOptions { follow_symlinks: false }).expect("scan");
        assert!(not_followed.cookies.is_empty());
    }
}
