use super::ffi::{Libmp4Library, Mp4DemuxPtr, Mp4MetadataCoverType};
use crate::demux::{DemuxBackend, SessionToken};
use crate::errors::DemuxResult;
use crate::metadata::{decode_latin1, Cover, CoverType, RawMetadata};
use log::{debug, trace, warn};
use std::ffi::{c_char, c_int, c_uint, CStr, CString};
use std::path::Path;
use std::ptr;

/// [`DemuxBackend`] backed by the native libmp4 demuxer.
///
/// Tokens are the `struct mp4_demux *` values returned by `mp4_demux_open`,
/// so passing a dead or foreign token to the backend calls is undefined behaviour.
#[derive(Debug)]
pub struct NativeDemuxer {
    lib: Libmp4Library,
}

impl NativeDemuxer {
    /// Load libmp4 from `$LIBMP4_LIBRARY` or the platform default name.
    pub fn load() -> DemuxResult<Self> {
        Ok(Self {
            lib: Libmp4Library::load()?,
        })
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> DemuxResult<Self> {
        Ok(Self {
            lib: Libmp4Library::load_from(path.as_ref())?,
        })
    }

    fn demux_ptr(token: SessionToken) -> Mp4DemuxPtr {
        token.get() as Mp4DemuxPtr
    }
}

/// Copy a NUL-terminated C string array entry, `None` for NULL entries.
///
/// # Safety
/// `array` must point to at least `index + 1` readable pointers, each NULL or
/// pointing to a NUL-terminated string.
unsafe fn entry_bytes(array: *mut *mut c_char, index: usize) -> Option<Vec<u8>> {
    let entry = *array.add(index);
    if entry.is_null() {
        None
    } else {
        Some(CStr::from_ptr(entry).to_bytes().to_vec())
    }
}

/// Convert the result of `mp4_demux_get_metadata_strings` into raw pairs.
///
/// A non-zero `ret`, a zero `count` or a NULL array means no metadata.
/// Pairs where either string is NULL are skipped.
///
/// # Safety
/// When `ret` is 0 and both arrays are non-NULL, each must hold `count`
/// entries that are NULL or point to NUL-terminated strings.
pub(crate) unsafe fn metadata_from_strings(
    ret: c_int,
    count: c_uint,
    keys: *mut *mut c_char,
    values: *mut *mut c_char,
) -> Option<RawMetadata> {
    if ret != 0 {
        warn!("mp4_demux_get_metadata_strings returned {}", ret);
        return None;
    }
    if count == 0 || keys.is_null() || values.is_null() {
        return None;
    }

    let mut raw = RawMetadata::with_capacity(count as usize);
    for i in 0..count as usize {
        if let (Some(key), Some(value)) = (entry_bytes(keys, i), entry_bytes(values, i)) {
            trace!("  {}: {}", decode_latin1(&key), decode_latin1(&value));
            raw.push((key, value));
        }
    }
    Some(raw)
}

impl DemuxBackend for NativeDemuxer {
    fn allocate(&self, path: &Path) -> Option<SessionToken> {
        let Ok(filename) = CString::new(path.as_os_str().as_encoded_bytes()) else {
            warn!("path {} contains a NUL byte", path.display());
            return None;
        };
        // SAFETY: `filename` is a valid NUL-terminated string for the call.
        let demux = unsafe { (self.lib.demux_open)(filename.as_ptr()) };
        SessionToken::new(demux as usize)
    }

    unsafe fn release(&self, token: SessionToken) -> i32 {
        // SAFETY: the caller guarantees the token came from `mp4_demux_open` and is live.
        (self.lib.demux_close)(Self::demux_ptr(token))
    }

    unsafe fn fetch_metadata(&self, token: SessionToken) -> Option<RawMetadata> {
        let mut count: c_uint = 0;
        let mut keys: *mut *mut c_char = ptr::null_mut();
        let mut values: *mut *mut c_char = ptr::null_mut();

        // SAFETY: the out-pointers are valid locals; the arrays stay owned by libmp4.
        let ret = (self.lib.demux_get_metadata_strings)(
            Self::demux_ptr(token),
            &mut count,
            &mut keys,
            &mut values,
        );
        debug!("session {} reports {} metadata strings", token, count);
        // SAFETY: on success libmp4 fills both arrays with `count` entries.
        metadata_from_strings(ret, count, keys, values)
    }

    unsafe fn fetch_cover(&self, token: SessionToken) -> Option<Cover> {
        let demux = Self::demux_ptr(token);
        let mut cover_size: c_uint = 0;
        let mut cover_type: Mp4MetadataCoverType = 0;

        // SAFETY: a NULL buffer only queries the size and type.
        let ret = (self.lib.demux_get_metadata_cover)(
            demux,
            ptr::null_mut(),
            0,
            &mut cover_size,
            &mut cover_type,
        );
        if ret != 0 {
            warn!("mp4_demux_get_metadata_cover returned {}", ret);
            return None;
        }
        if cover_size == 0 {
            return None;
        }

        let mut data = vec![0u8; cover_size as usize];
        // SAFETY: `data` holds `cover_size` writable bytes.
        let ret = (self.lib.demux_get_metadata_cover)(
            demux,
            data.as_mut_ptr(),
            cover_size,
            &mut cover_size,
            &mut cover_type,
        );
        if ret != 0 {
            warn!("mp4_demux_get_metadata_cover returned {}", ret);
            return None;
        }
        data.truncate(cover_size as usize);

        let Some(kind) = CoverType::from_raw(cover_type) else {
            warn!("unknown cover type {}", cover_type);
            return None;
        };
        Some(Cover { kind, data })
    }
}
