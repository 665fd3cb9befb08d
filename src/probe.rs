//! Purpose: The smoke sequence run against a loaded copy of the library.
//! Exports: `Probe`, `ProbeReport`, and the stdout label constants.
//! Role: Tie requirement selection, loading, and the three queries together.
//! Invariants: Queries run in the fixed order homedir, localized dir, version.
//! Invariants: The localized-directory query consumes the homedir result.

use serde::Serialize;
use tracing::debug;

use crate::bridge::error::Error;
use crate::bridge::library::UtilBindings;
use crate::bridge::namespace::{BRIDGE_NAMESPACE, BRIDGE_VERSION, Requirement};
use crate::bridge::search::SearchPath;

pub const LABEL_HOMEDIR: &str = "homedir: ";
pub const LABEL_DIR_LOCALIZED: &str = "get_dir_localized: ";
pub const LABEL_VERSION: &str = "version: ";

pub struct Probe {
    bindings: UtilBindings,
}

impl Probe {
    /// Select the namespace requirements and load the library. The binding
    /// layer's own requirement is settled at build time, so it is only
    /// logged; the library requirement resolves through the search path.
    pub fn open(search: &SearchPath) -> Result<Self, Error> {
        debug!(
            namespace = BRIDGE_NAMESPACE,
            version = BRIDGE_VERSION,
            "binding layer pinned at build time"
        );
        let requirement = Requirement::util();
        debug!(requirement = %requirement, "runtime requirement selected");
        let bindings = UtilBindings::resolve(search, &requirement)?;
        Ok(Self { bindings })
    }

    pub fn homedir(&self) -> Result<String, Error> {
        self.bindings.homedir()
    }

    pub fn dir_localized(&self, dir: &str) -> Result<String, Error> {
        self.bindings.dir_localized(dir)
    }

    pub fn version_string(&self) -> Result<String, Error> {
        self.bindings.version_string()
    }
}

#[derive(Debug, Serialize)]
pub struct ProbeReport {
    pub homedir: String,
    pub dir_localized: String,
    pub version: String,
}

impl ProbeReport {
    /// Run all three queries before reporting anything, for output modes
    /// that emit a single document.
    pub fn collect(probe: &Probe) -> Result<Self, Error> {
        let homedir = probe.homedir()?;
        let dir_localized = probe.dir_localized(&homedir)?;
        let version = probe.version_string()?;
        Ok(Self {
            homedir,
            dir_localized,
            version,
        })
    }
}
