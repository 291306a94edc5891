mod demuxer;
pub mod ffi;

pub use demuxer::NativeDemuxer;
pub use ffi::{Libmp4Library, LIBMP4_LIBRARY_ENV};
