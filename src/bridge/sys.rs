// Raw C surface of libxfce4util as resolved at runtime.
use std::os::raw::{c_char, c_void};

pub const SYM_GET_HOMEDIR: &[u8] = b"xfce_get_homedir\0";
pub const SYM_GET_DIR_LOCALIZED: &[u8] = b"xfce_get_dir_localized\0";
pub const SYM_VERSION_STRING: &[u8] = b"xfce_version_string\0";
pub const SYM_G_FREE: &[u8] = b"g_free\0";

// Borrowed return, owned by the library.
pub type GetHomedirFn = unsafe extern "C" fn() -> *const c_char;

// Transfer-full return, released through the library's own free.
pub type GetDirLocalizedFn = unsafe extern "C" fn(*const c_char) -> *mut c_char;

// Borrowed return, static storage.
pub type VersionStringFn = unsafe extern "C" fn() -> *const c_char;

pub type GFreeFn = unsafe extern "C" fn(*mut c_void);
