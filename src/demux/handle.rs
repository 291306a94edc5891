use super::backend::{DemuxBackend, SessionToken};
use crate::errors::{DemuxResult, OpenError};
use crate::metadata::{to_string_mapping, Cover, MetadataMap, ThermalMetadata};
use log::{debug, warn};
use std::path::Path;

/// One open demuxer session.
///
/// The handle owns its session token and never hands it out. The session is
/// released by [`Demux::close`] or, failing that, when the handle is dropped.
/// Closing needs `&mut self`, so a handle cannot be torn down while another
/// borrow is still reading metadata from it.
///
/// Dropping is a leak guard, not a replacement for `close`: it does not run
/// after `std::mem::forget`, for handles caught in an `Rc` cycle, or when the
/// process exits without unwinding. Call `close` once the metadata is read.
pub struct Demux<B: DemuxBackend> {
    backend: B,
    token: Option<SessionToken>,
}

impl<B: DemuxBackend> Demux<B> {
    /// Open `path` through `backend`.
    ///
    /// Fails with [`OpenError`] carrying the path when the backend refuses
    /// the file. No session is retained in that case.
    pub fn open<P: AsRef<Path>>(backend: B, path: P) -> DemuxResult<Self> {
        let path = path.as_ref();
        match backend.allocate(path) {
            Some(token) => {
                debug!("opened {} as session {}", path.display(), token);
                Ok(Demux {
                    backend,
                    token: Some(token),
                })
            }
            None => {
                debug!("backend refused {}", path.display());
                Err(OpenError::new(path).into())
            }
        }
    }

    pub fn is_open(&self) -> bool {
        self.token.is_some()
    }

    #[cfg(test)]
    pub(crate) fn token(&self) -> Option<SessionToken> {
        self.token
    }

    /// Custom metadata of the file decoded as Latin-1.
    ///
    /// Empty when the handle is closed or the file carries no metadata.
    pub fn metadata(&self) -> MetadataMap {
        match self.token {
            // SAFETY: the token came from `allocate` on this backend and is
            // only released by `close`, which clears it.
            Some(token) => to_string_mapping(unsafe { self.backend.fetch_metadata(token) }),
            None => MetadataMap::new(),
        }
    }

    pub fn thermal_metadata(&self) -> ThermalMetadata {
        ThermalMetadata::from_map(&self.metadata())
    }

    /// Cover picture embedded in the file metadata.
    pub fn cover(&self) -> Option<Cover> {
        let token = self.token?;
        // SAFETY: see `metadata`.
        unsafe { self.backend.fetch_cover(token) }
    }

    /// Release the session. Calling it again is a no-op.
    pub fn close(&mut self) {
        if let Some(token) = self.token.take() {
            // SAFETY: `take` guarantees the live token is released once.
            let status = unsafe { self.backend.release(token) };
            if status != 0 {
                warn!("release of session {} returned {}", token, status);
            } else {
                debug!("released session {}", token);
            }
        }
    }
}

impl<B: DemuxBackend> Drop for Demux<B> {
    fn drop(&mut self) {
        if let Some(token) = self.token {
            warn!("session {} dropped without close, releasing", token);
            self.close();
        }
    }
}

impl<B: DemuxBackend> std::fmt::Debug for Demux<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Demux").field("token", &self.token).finish()
    }
}
