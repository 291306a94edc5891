use std::error::Error;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Enumeration of all possible errors that can occur while demuxing
#[derive(Debug)]
pub enum DemuxError {
    Open(OpenError),
    Library(LibraryError),
    Other(io::Error),
}

/// The external demuxer could not establish a session for a file
#[derive(Debug)]
pub struct OpenError {
    pub path: PathBuf,
}

impl OpenError {
    /// Create a new error for the requested path.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

/// The native demuxer library or one of its entry points could not be loaded
#[derive(Debug)]
pub struct LibraryError {
    pub message: String,
}

impl LibraryError {
    /// Create a new error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for DemuxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DemuxError::Open(err) => write!(f, "Open error: {}", err),
            DemuxError::Library(err) => write!(f, "Library error: {}", err),
            DemuxError::Other(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl fmt::Display for OpenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot open file {}", self.path.display())
    }
}

impl fmt::Display for LibraryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for DemuxError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DemuxError::Open(err) => Some(err),
            DemuxError::Library(err) => Some(err),
            DemuxError::Other(err) => Some(err),
        }
    }
}
impl Error for OpenError {}
impl Error for LibraryError {}

impl DemuxError {
    /// Path of the file that failed to open, if this is an open failure.
    pub fn open_path(&self) -> Option<&Path> {
        match self {
            DemuxError::Open(err) => Some(&err.path),
            _ => None,
        }
    }
}

// Conversion implementations
impl From<io::Error> for DemuxError {
    fn from(err: io::Error) -> Self {
        DemuxError::Other(err)
    }
}

impl From<OpenError> for DemuxError {
    fn from(err: OpenError) -> Self {
        DemuxError::Open(err)
    }
}

impl From<LibraryError> for DemuxError {
    fn from(err: LibraryError) -> Self {
        DemuxError::Library(err)
    }
}

// Conversion to io::Error for callers working with std I/O results
impl From<DemuxError> for io::Error {
    fn from(err: DemuxError) -> Self {
        match err {
            DemuxError::Open(err) => io::Error::new(io::ErrorKind::NotFound, err),
            DemuxError::Library(err) => io::Error::other(err),
            DemuxError::Other(err) => err,
        }
    }
}

impl From<OpenError> for io::Error {
    fn from(err: OpenError) -> Self {
        io::Error::new(io::ErrorKind::NotFound, err)
    }
}

impl From<LibraryError> for io::Error {
    fn from(err: LibraryError) -> Self {
        io::Error::other(err)
    }
}

// Type alias for Result with DemuxError
pub type DemuxResult<T> = Result<T, DemuxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_error_display_carries_path() {
        let err = DemuxError::from(OpenError::new("/data/flight.mp4"));
        assert_eq!(
            err.to_string(),
            "Open error: cannot open file /data/flight.mp4"
        );
        assert_eq!(err.open_path(), Some(Path::new("/data/flight.mp4")));
    }

    #[test]
    fn test_library_error_is_not_open_failure() {
        let err = DemuxError::from(LibraryError::new("missing symbol"));
        assert!(err.open_path().is_none());
        assert_eq!(err.to_string(), "Library error: missing symbol");
    }

    #[test]
    fn test_conversion_to_io_error() {
        let io_err: io::Error = DemuxError::from(OpenError::new("")).into();
        assert_eq!(io_err.kind(), io::ErrorKind::NotFound);

        let io_err: io::Error = DemuxError::from(LibraryError::new("x")).into();
        assert_eq!(io_err.kind(), io::ErrorKind::Other);
    }
}
