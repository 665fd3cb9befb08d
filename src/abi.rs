//! Purpose: C ABI reference provider exporting the probed entry points.
//! Exports: `xfce_get_homedir`, `xfce_get_dir_localized`, `xfce_version_string`, `g_free`.
//! Role: Conformance stand-in for a built library; the cdylib is staged under
//! the real soname by the integration suite and probed like the real thing.
//! Invariants: Borrowed returns stay owned here for the process lifetime.
//! Invariants: Transfer-full returns are released only through this `g_free`.
//! Notes: Behavior matches the library entry points the probe exercises.

use std::env;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_void};
use std::path::Path;
use std::ptr;
use std::sync::OnceLock;

static HOMEDIR: OnceLock<CString> = OnceLock::new();
static VERSION: OnceLock<CString> = OnceLock::new();

#[unsafe(no_mangle)]
pub extern "C" fn xfce_get_homedir() -> *const c_char {
    let homedir = HOMEDIR.get_or_init(|| {
        let home = env::var("HOME")
            .ok()
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| "/".to_string());
        CString::new(home).unwrap_or_else(|_| c"/".to_owned())
    });
    homedir.as_ptr()
}

#[unsafe(no_mangle)]
pub extern "C" fn xfce_get_dir_localized(directory: *const c_char) -> *mut c_char {
    if directory.is_null() {
        return ptr::null_mut();
    }
    let bytes = unsafe { CStr::from_ptr(directory) }.to_bytes().to_vec();
    let localized = message_language().and_then(|lang| localized_variant(&bytes, &lang));
    match localized {
        Some(path) => to_c_string_bytes(path.into_bytes()),
        None => to_c_string_bytes(bytes),
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn xfce_version_string() -> *const c_char {
    let version = VERSION.get_or_init(|| {
        CString::new(env!("CARGO_PKG_VERSION")).unwrap_or_else(|_| c"0.0.0".to_owned())
    });
    version.as_ptr()
}

#[unsafe(no_mangle)]
pub extern "C" fn g_free(mem: *mut c_void) {
    if mem.is_null() {
        return;
    }
    unsafe {
        drop(CString::from_raw(mem as *mut c_char));
    }
}

// First set, non-empty message locale variable; a value with a path
// separator disables localization outright.
fn message_language() -> Option<String> {
    let lang = ["LC_ALL", "LC_MESSAGES", "LANG"]
        .iter()
        .find_map(|key| env::var(key).ok().filter(|value| !value.is_empty()))?;
    if lang.contains('/') {
        return None;
    }
    Some(lang)
}

// Single probe: `<dir>.<lang>` when it exists as a directory.
fn localized_variant(dir: &[u8], lang: &str) -> Option<String> {
    let dir = std::str::from_utf8(dir).ok()?;
    let candidate = format!("{dir}.{lang}");
    Path::new(&candidate).is_dir().then_some(candidate)
}

fn to_c_string_bytes(bytes: Vec<u8>) -> *mut c_char {
    CString::new(bytes)
        .map(CString::into_raw)
        .unwrap_or(ptr::null_mut())
}
