//! Purpose: Library crate behind the `xfce4util-probe` binary and its tests.
//! Exports: `bridge` (search, namespaces, loading, errors), `probe`, `abi`.
//! Role: Stable surface for the CLI and the integration suite.
//! Invariants: All FFI is confined to `bridge::library`, `bridge::sys`, and `abi`.
//! Invariants: Bridge modules prefer explicit inputs/outputs over hidden state.
pub mod abi;
pub mod bridge;
pub mod probe;

#[doc(hidden)]
pub use bridge::error::to_exit_code;
pub use bridge::error::{Error, ErrorKind};
pub use bridge::library::UtilBindings;
pub use bridge::namespace::Requirement;
pub use bridge::search::{PATH_ENV, SearchPath};
pub use probe::{LABEL_DIR_LOCALIZED, LABEL_HOMEDIR, LABEL_VERSION, Probe, ProbeReport};
