use crate::metadata::{Cover, RawMetadata};
use std::fmt;
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::Arc;

/// Opaque identifier of a live session held by a demuxer backend.
///
/// The zero sentinel is not representable: a failed allocation is `None`.
/// A token only carries identity. Building one is safe, but every backend
/// call that consumes a token is `unsafe` and requires it to be live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionToken(NonZeroUsize);

impl SessionToken {
    /// Wrap a raw backend value, `None` for the zero sentinel.
    pub fn new(raw: usize) -> Option<Self> {
        NonZeroUsize::new(raw).map(SessionToken)
    }

    pub fn get(self) -> usize {
        self.0.get()
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0.get())
    }
}

/// Entry points of an external MP4 demuxer.
///
/// Implementations own the parsing; callers only ever see tokens and raw
/// metadata bytes. [`Demux`](super::Demux) is the safe way to drive a
/// backend: it keeps its token private and releases it exactly once.
///
/// # Safety
/// `release`, `fetch_metadata` and `fetch_cover` may only be called with a
/// token returned by `allocate` on the same backend and not yet passed to
/// `release`. Native backends dereference the token as a pointer.
#[cfg_attr(test, mockall::automock)]
pub trait DemuxBackend {
    /// Open a session on `path`, `None` if the file cannot be demuxed.
    fn allocate(&self, path: &Path) -> Option<SessionToken>;

    /// Release every resource held for `token` and return the native status.
    ///
    /// # Safety
    /// `token` must be live on this backend; it is dead afterwards.
    unsafe fn release(&self, token: SessionToken) -> i32;

    /// Metadata pairs of the session, `None` when the file has none.
    ///
    /// # Safety
    /// `token` must be live on this backend.
    unsafe fn fetch_metadata(&self, token: SessionToken) -> Option<RawMetadata>;

    /// Cover picture of the session, if any.
    ///
    /// # Safety
    /// `token` must be live on this backend.
    unsafe fn fetch_cover(&self, _token: SessionToken) -> Option<Cover> {
        None
    }
}

impl<T: DemuxBackend + ?Sized> DemuxBackend for &T {
    fn allocate(&self, path: &Path) -> Option<SessionToken> {
        (**self).allocate(path)
    }
    unsafe fn release(&self, token: SessionToken) -> i32 {
        (**self).release(token)
    }
    unsafe fn fetch_metadata(&self, token: SessionToken) -> Option<RawMetadata> {
        (**self).fetch_metadata(token)
    }
    unsafe fn fetch_cover(&self, token: SessionToken) -> Option<Cover> {
        (**self).fetch_cover(token)
    }
}

impl<T: DemuxBackend + ?Sized> DemuxBackend for Box<T> {
    fn allocate(&self, path: &Path) -> Option<SessionToken> {
        (**self).allocate(path)
    }
    unsafe fn release(&self, token: SessionToken) -> i32 {
        (**self).release(token)
    }
    unsafe fn fetch_metadata(&self, token: SessionToken) -> Option<RawMetadata> {
        (**self).fetch_metadata(token)
    }
    unsafe fn fetch_cover(&self, token: SessionToken) -> Option<Cover> {
        (**self).fetch_cover(token)
    }
}

impl<T: DemuxBackend + ?Sized> DemuxBackend for Arc<T> {
    fn allocate(&self, path: &Path) -> Option<SessionToken> {
        (**self).allocate(path)
    }
    unsafe fn release(&self, token: SessionToken) -> i32 {
        (**self).release(token)
    }
    unsafe fn fetch_metadata(&self, token: SessionToken) -> Option<RawMetadata> {
        (**self).fetch_metadata(token)
    }
    unsafe fn fetch_cover(&self, token: SessionToken) -> Option<Cover> {
        (**self).fetch_cover(token)
    }
}
