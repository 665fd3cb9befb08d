//! Purpose: Assemble and walk the metadata search path used to find the library.
//! Exports: `SearchPath` and `PATH_ENV`.
//! Role: Keep flag, environment, and built-in location semantics in one place.
//! Invariants: An explicit override replaces the defaults and disables the system fallback.
//! Invariants: Probing only reads the filesystem.

use std::ffi::OsStr;
use std::path::PathBuf;

use tracing::debug;

pub const PATH_ENV: &str = "XFCE4UTIL_PROBE_PATH";

// Where a sibling source build of the library lands, relative to the
// working directory of the canonical run.
const DEFAULT_PREPEND_DIRS: [&str; 2] = ["../libxfce4util", "../libxfce4util/.libs"];

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SearchPath {
    dirs: Vec<PathBuf>,
    system_fallback: bool,
}

impl SearchPath {
    /// Built-in prepend locations, with the system loader as the last resort.
    pub fn default_locations() -> Self {
        Self {
            dirs: DEFAULT_PREPEND_DIRS.iter().map(PathBuf::from).collect(),
            system_fallback: true,
        }
    }

    /// Explicit locations only; the system loader is never consulted.
    pub fn explicit(dirs: Vec<PathBuf>) -> Self {
        Self {
            dirs,
            system_fallback: false,
        }
    }

    /// Resolution order for one invocation: `--search-path` flags win over
    /// the environment variable; either one is an explicit override, and
    /// without both the defaults apply.
    pub fn from_invocation(flag_dirs: &[PathBuf]) -> Self {
        if !flag_dirs.is_empty() {
            return Self::explicit(flag_dirs.to_vec());
        }
        if let Some(raw) = std::env::var_os(PATH_ENV) {
            let dirs = split_search_env(&raw);
            if !dirs.is_empty() {
                return Self::explicit(dirs);
            }
        }
        Self::default_locations()
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    pub fn system_fallback(&self) -> bool {
        self.system_fallback
    }

    /// First existing `dir/name` across the path, candidate names tried in
    /// order within each directory. On a miss the error carries every
    /// location that was tried.
    pub fn locate(&self, names: &[&str]) -> Result<PathBuf, Vec<PathBuf>> {
        let mut tried = Vec::new();
        for dir in &self.dirs {
            for name in names {
                let candidate = dir.join(name);
                if candidate.is_file() {
                    debug!(path = %candidate.display(), "search hit");
                    return Ok(candidate);
                }
                debug!(path = %candidate.display(), "search miss");
                tried.push(candidate);
            }
        }
        Err(tried)
    }
}

fn split_search_env(raw: &OsStr) -> Vec<PathBuf> {
    std::env::split_paths(raw)
        .filter(|dir| !dir.as_os_str().is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    #[test]
    fn default_locations_keep_prepend_order_and_fallback() {
        let search = SearchPath::default_locations();
        assert_eq!(
            search.dirs(),
            [
                Path::new("../libxfce4util"),
                Path::new("../libxfce4util/.libs")
            ]
        );
        assert!(search.system_fallback());
    }

    #[test]
    fn explicit_override_disables_system_fallback() {
        let search = SearchPath::explicit(vec![PathBuf::from("/opt/xfce/lib")]);
        assert_eq!(search.dirs(), [Path::new("/opt/xfce/lib")]);
        assert!(!search.system_fallback());
    }

    #[test]
    fn flags_win_over_environment() {
        let flags = vec![PathBuf::from("/from/flag")];
        let search = SearchPath::from_invocation(&flags);
        assert_eq!(search.dirs(), [Path::new("/from/flag")]);
        assert!(!search.system_fallback());
    }

    #[test]
    fn env_splitting_skips_empty_segments() {
        let dirs = split_search_env(OsStr::new("/a::/b:"));
        assert_eq!(dirs, [PathBuf::from("/a"), PathBuf::from("/b")]);
    }

    #[test]
    fn locate_walks_dirs_then_names_in_order() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        let hit = second.path().join("libdemo.so.7");
        fs::write(&hit, b"not really elf").unwrap();

        let search = SearchPath::explicit(vec![
            first.path().to_path_buf(),
            second.path().to_path_buf(),
        ]);
        let found = search
            .locate(&["libdemo.so.7", "libdemo.so"])
            .expect("candidate present");
        assert_eq!(found, hit);
    }

    #[test]
    fn locate_miss_reports_every_candidate_tried() {
        let empty = tempfile::tempdir().unwrap();
        let search = SearchPath::explicit(vec![empty.path().to_path_buf()]);
        let tried = search
            .locate(&["libdemo.so.7", "libdemo.so"])
            .expect_err("nothing to find");
        assert_eq!(
            tried,
            [
                empty.path().join("libdemo.so.7"),
                empty.path().join("libdemo.so")
            ]
        );
    }
}
