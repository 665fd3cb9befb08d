//! Purpose: Load the shared object for a requirement and expose its calls safely.
//! Exports: `UtilBindings`.
//! Role: Owns the library handle and the resolved vtable for the process run.
//! Invariants: Symbols are resolved once at load, never per call.
//! Invariants: Transfer-full returns are released with the library's own free.
//! Invariants: All loading and calling FFI is confined to this module + `sys`.

use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_void};
use std::path::Path;

use libloading::Library;
use tracing::debug;

use crate::bridge::error::{Error, ErrorKind};
use crate::bridge::namespace::Requirement;
use crate::bridge::search::SearchPath;
use crate::bridge::sys;

struct UtilVtable {
    get_homedir: sys::GetHomedirFn,
    get_dir_localized: sys::GetDirLocalizedFn,
    version_string: sys::VersionStringFn,
    g_free: sys::GFreeFn,
}

impl UtilVtable {
    fn resolve(library: &Library) -> Result<Self, Error> {
        unsafe {
            Ok(Self {
                get_homedir: resolve_symbol::<sys::GetHomedirFn>(library, sys::SYM_GET_HOMEDIR)?,
                get_dir_localized: resolve_symbol::<sys::GetDirLocalizedFn>(
                    library,
                    sys::SYM_GET_DIR_LOCALIZED,
                )?,
                version_string: resolve_symbol::<sys::VersionStringFn>(
                    library,
                    sys::SYM_VERSION_STRING,
                )?,
                g_free: resolve_symbol::<sys::GFreeFn>(library, sys::SYM_G_FREE)?,
            })
        }
    }
}

pub struct UtilBindings {
    vtable: UtilVtable,
    // Unmapping the library would invalidate every vtable pointer.
    _library: Library,
}

impl UtilBindings {
    /// Walk the search path for the requirement's candidate names and load
    /// the first hit. Without an explicit override the system loader is the
    /// last resort.
    pub fn resolve(search: &SearchPath, requirement: &Requirement) -> Result<Self, Error> {
        let names = requirement.candidate_names()?;
        match search.locate(names) {
            Ok(path) => Self::load_from_path(&path),
            Err(tried) => {
                if search.system_fallback() {
                    if let Some(bindings) = Self::load_from_system(names)? {
                        return Ok(bindings);
                    }
                }
                Err(Error::new(ErrorKind::NotFound).with_message(format!(
                    "no loadable library satisfies {requirement} ({} locations tried)",
                    tried.len()
                )))
            }
        }
    }

    fn load_from_path(path: &Path) -> Result<Self, Error> {
        let library = unsafe { Library::new(path) }.map_err(|err| {
            Error::new(ErrorKind::NotFound)
                .with_message("failed to load library")
                .with_path(path)
                .with_source(err)
        })?;
        let vtable = UtilVtable::resolve(&library).map_err(|err| err.with_path(path))?;
        debug!(path = %path.display(), "library loaded");
        Ok(Self {
            vtable,
            _library: library,
        })
    }

    fn load_from_system(names: &[&str]) -> Result<Option<Self>, Error> {
        for name in names {
            match unsafe { Library::new(name) } {
                Ok(library) => {
                    let vtable = UtilVtable::resolve(&library).map_err(|err| err.with_path(name))?;
                    debug!(name, "library loaded from system paths");
                    return Ok(Some(Self {
                        vtable,
                        _library: library,
                    }));
                }
                Err(err) => {
                    debug!(name, error = %err, "system load miss");
                }
            }
        }
        Ok(None)
    }

    pub fn homedir(&self) -> Result<String, Error> {
        let ptr = unsafe { (self.vtable.get_homedir)() };
        copy_borrowed_str(ptr, "xfce_get_homedir")
    }

    pub fn dir_localized(&self, dir: &str) -> Result<String, Error> {
        let dir_c = CString::new(dir).map_err(|err| {
            Error::new(ErrorKind::Usage)
                .with_message("path contains null")
                .with_source(err)
        })?;
        let ptr = unsafe { (self.vtable.get_dir_localized)(dir_c.as_ptr()) };
        copy_transfer_full(ptr, self.vtable.g_free, "xfce_get_dir_localized")
    }

    pub fn version_string(&self) -> Result<String, Error> {
        let ptr = unsafe { (self.vtable.version_string)() };
        copy_borrowed_str(ptr, "xfce_version_string")
    }
}

// Caller asserts that `T` matches the symbol's actual signature.
unsafe fn resolve_symbol<T: Copy>(library: &Library, name: &'static [u8]) -> Result<T, Error> {
    let symbol = unsafe { library.get::<T>(name) }.map_err(|err| {
        Error::new(ErrorKind::Symbol)
            .with_message(format!("missing symbol {}", display_symbol(name)))
            .with_source(err)
    })?;
    Ok(*symbol)
}

fn display_symbol(name: &[u8]) -> String {
    let trimmed = name.strip_suffix(b"\0").unwrap_or(name);
    String::from_utf8_lossy(trimmed).into_owned()
}

fn copy_borrowed_str(ptr: *const c_char, symbol: &str) -> Result<String, Error> {
    if ptr.is_null() {
        return Err(Error::new(ErrorKind::Call).with_message(format!("{symbol} returned null")));
    }
    let text = unsafe { CStr::from_ptr(ptr) }.to_str().map_err(|err| {
        Error::new(ErrorKind::Call)
            .with_message(format!("{symbol} returned invalid utf-8"))
            .with_source(err)
    })?;
    Ok(text.to_owned())
}

// The bytes are copied and released before UTF-8 validation, so the
// foreign buffer never outlives a validation failure.
fn copy_transfer_full(ptr: *mut c_char, free: sys::GFreeFn, symbol: &str) -> Result<String, Error> {
    if ptr.is_null() {
        return Err(Error::new(ErrorKind::Call).with_message(format!("{symbol} returned null")));
    }
    let bytes = unsafe { CStr::from_ptr(ptr) }.to_bytes().to_vec();
    unsafe { free(ptr as *mut c_void) };
    String::from_utf8(bytes).map_err(|err| {
        Error::new(ErrorKind::Call)
            .with_message(format!("{symbol} returned invalid utf-8"))
            .with_source(err)
    })
}
