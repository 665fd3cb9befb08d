//! Purpose: Namespace requirements and the registry mapping them to shared objects.
//! Exports: `Requirement` plus the compile-time binding-layer pin.
//! Role: Translate a name/version pair into exact candidate file names.
//! Invariants: Candidate names are exact file names, never patterns.
//! Invariants: The versioned soname precedes the unversioned dev name.

use std::fmt;

use crate::bridge::error::{Error, ErrorKind};

/// The binding layer itself; its requirement is satisfied when this crate
/// compiles, so a run only logs it.
pub const BRIDGE_NAMESPACE: &str = env!("CARGO_PKG_NAME");
pub const BRIDGE_VERSION: &str = env!("CARGO_PKG_VERSION");

struct RegistryEntry {
    namespace: &'static str,
    version: &'static str,
    names: &'static [&'static str],
}

// API 1.0 ships as soname major 7.
#[cfg(target_os = "macos")]
const UTIL_CANDIDATES: &[&str] = &["libxfce4util.7.dylib", "libxfce4util.dylib"];
#[cfg(not(target_os = "macos"))]
const UTIL_CANDIDATES: &[&str] = &["libxfce4util.so.7", "libxfce4util.so"];

const REGISTRY: &[RegistryEntry] = &[RegistryEntry {
    namespace: "Libxfce4util",
    version: "1.0",
    names: UTIL_CANDIDATES,
}];

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Requirement {
    namespace: String,
    version: String,
}

impl Requirement {
    pub fn new(namespace: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            version: version.into(),
        }
    }

    /// The library under test.
    pub fn util() -> Self {
        Self::new("Libxfce4util", "1.0")
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Exact file names that can satisfy this requirement, in probe order.
    pub fn candidate_names(&self) -> Result<&'static [&'static str], Error> {
        let mut known_versions = Vec::new();
        for entry in REGISTRY {
            if entry.namespace != self.namespace {
                continue;
            }
            if entry.version == self.version {
                return Ok(entry.names);
            }
            known_versions.push(entry.version);
        }

        if known_versions.is_empty() {
            return Err(Error::new(ErrorKind::NotFound)
                .with_message(format!("namespace {} is not known to this probe", self)));
        }
        Err(Error::new(ErrorKind::Version)
            .with_message(format!(
                "namespace {} has no API version {}",
                self.namespace, self.version
            ))
            .with_hint(format!("known versions: {}", known_versions.join(", "))))
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.namespace, self.version)
    }
}
