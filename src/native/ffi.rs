//! Runtime-loaded bindings for the libmp4 demuxer.
//!
//! Only the entry points needed to open a file, read its metadata and cover,
//! and close it are resolved. The library is opened with `libloading`, so
//! building this crate does not require libmp4 to be installed.

use std::ffi::{c_char, c_int, c_uint, c_void};
use std::path::Path;

use libloading::Library;
use log::{debug, info};

use crate::errors::LibraryError;

/// Opaque `struct mp4_demux *`.
pub type Mp4DemuxPtr = *mut c_void;

/// `enum mp4_metadata_cover_type`.
pub type Mp4MetadataCoverType = c_int;

/// Environment variable overriding the library location.
pub const LIBMP4_LIBRARY_ENV: &str = "LIBMP4_LIBRARY";

pub type Mp4DemuxOpenFn = unsafe extern "C" fn(filename: *const c_char) -> Mp4DemuxPtr;

pub type Mp4DemuxCloseFn = unsafe extern "C" fn(demux: Mp4DemuxPtr) -> c_int;

pub type Mp4DemuxGetMetadataStringsFn = unsafe extern "C" fn(
    demux: Mp4DemuxPtr,
    count: *mut c_uint,
    keys: *mut *mut *mut c_char,
    values: *mut *mut *mut c_char,
) -> c_int;

pub type Mp4DemuxGetMetadataCoverFn = unsafe extern "C" fn(
    demux: Mp4DemuxPtr,
    cover_buffer: *mut u8,
    cover_buffer_size: c_uint,
    cover_size: *mut c_uint,
    cover_type: *mut Mp4MetadataCoverType,
) -> c_int;

/// Dynamically loaded libmp4 with the demuxer entry points.
pub struct Libmp4Library {
    /// Keeps the shared object mapped while the function pointers are in use.
    _lib: Library,
    pub demux_open: Mp4DemuxOpenFn,
    pub demux_close: Mp4DemuxCloseFn,
    pub demux_get_metadata_strings: Mp4DemuxGetMetadataStringsFn,
    pub demux_get_metadata_cover: Mp4DemuxGetMetadataCoverFn,
}

impl std::fmt::Debug for Libmp4Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Libmp4Library")
            .field("loaded", &true)
            .finish()
    }
}

impl Libmp4Library {
    /// Load libmp4 from `$LIBMP4_LIBRARY`, or the platform default name.
    pub fn load() -> Result<Self, LibraryError> {
        match std::env::var_os(LIBMP4_LIBRARY_ENV) {
            Some(path) => Self::load_from(Path::new(&path)),
            None => {
                let lib_name = Self::library_name();
                info!("Loading libmp4 as {}", lib_name);
                // SAFETY: libmp4 has no load-time initialisers with preconditions.
                let lib = unsafe { Library::new(lib_name) }.map_err(|e| {
                    LibraryError::new(format!("Failed to load {}: {}", lib_name, e))
                })?;
                Self::load_functions(lib)
            }
        }
    }

    /// Load libmp4 from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, LibraryError> {
        info!("Loading libmp4 from {}", path.display());
        // SAFETY: the caller names a libmp4 build; see `load`.
        let lib = unsafe { Library::new(path) }.map_err(|e| {
            LibraryError::new(format!("Failed to load {}: {}", path.display(), e))
        })?;
        Self::load_functions(lib)
    }

    pub fn library_name() -> &'static str {
        if cfg!(target_os = "windows") {
            "mp4.dll"
        } else if cfg!(target_os = "macos") {
            "libmp4.dylib"
        } else {
            "libmp4.so"
        }
    }

    fn load_functions(lib: Library) -> Result<Self, LibraryError> {
        // SAFETY: the signatures below match libmp4.h. Each symbol is copied
        // out as a plain function pointer; `_lib` keeps it valid.
        unsafe {
            let demux_open = *lib
                .get::<Mp4DemuxOpenFn>(b"mp4_demux_open\0")
                .map_err(|e| LibraryError::new(format!("mp4_demux_open: {}", e)))?;
            let demux_close = *lib
                .get::<Mp4DemuxCloseFn>(b"mp4_demux_close\0")
                .map_err(|e| LibraryError::new(format!("mp4_demux_close: {}", e)))?;
            let demux_get_metadata_strings = *lib
                .get::<Mp4DemuxGetMetadataStringsFn>(b"mp4_demux_get_metadata_strings\0")
                .map_err(|e| {
                    LibraryError::new(format!("mp4_demux_get_metadata_strings: {}", e))
                })?;
            let demux_get_metadata_cover = *lib
                .get::<Mp4DemuxGetMetadataCoverFn>(b"mp4_demux_get_metadata_cover\0")
                .map_err(|e| LibraryError::new(format!("mp4_demux_get_metadata_cover: {}", e)))?;

            debug!("All libmp4 symbols loaded");

            Ok(Self {
                _lib: lib,
                demux_open,
                demux_close,
                demux_get_metadata_strings,
                demux_get_metadata_cover,
            })
        }
    }
}
