use super::backend::{DemuxBackend, SessionToken};
use crate::metadata::{Cover, RawMetadata};
use log::debug;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// Status returned when releasing a token the registry does not know.
pub const EINVAL_STATUS: i32 = -22;

#[derive(Debug, Clone, Default)]
struct MemoryFile {
    metadata: Option<RawMetadata>,
    cover: Option<Cover>,
}

#[derive(Debug, Default)]
struct Registry {
    files: HashMap<PathBuf, MemoryFile>,
    // Slot `i` backs token `i + 1`; freed slots are reused.
    sessions: Vec<Option<PathBuf>>,
}

/// Demuxer backend serving registered files from memory.
///
/// Sessions live in a slab, so tokens are small integers and a released
/// token can be handed out again by a later `allocate`.
#[derive(Debug, Default)]
pub struct MemoryDemuxer {
    registry: Mutex<Registry>,
}

impl MemoryDemuxer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file without custom metadata.
    pub fn insert_empty<P: Into<PathBuf>>(&self, path: P) {
        self.registry()
            .files
            .insert(path.into(), MemoryFile::default());
    }

    /// Register a file carrying `metadata`.
    pub fn insert<P: Into<PathBuf>>(&self, path: P, metadata: RawMetadata) {
        self.registry().files.insert(
            path.into(),
            MemoryFile {
                metadata: Some(metadata),
                cover: None,
            },
        );
    }

    /// Attach a cover picture to a registered file. Returns false if the path is unknown.
    pub fn set_cover<P: AsRef<Path>>(&self, path: P, cover: Cover) -> bool {
        match self.registry().files.get_mut(path.as_ref()) {
            Some(file) => {
                file.cover = Some(cover);
                true
            }
            None => false,
        }
    }

    /// Number of sessions allocated and not yet released.
    pub fn live_sessions(&self) -> usize {
        self.registry()
            .sessions
            .iter()
            .filter(|slot| slot.is_some())
            .count()
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        // A poisoned registry still holds consistent data: every mutation is a single insert or take.
        self.registry
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn with_session<T>(
        &self,
        token: SessionToken,
        f: impl FnOnce(&MemoryFile) -> Option<T>,
    ) -> Option<T> {
        let registry = self.registry();
        let path = registry.sessions.get(token.get() - 1)?.as_ref()?;
        registry.files.get(path).and_then(f)
    }
}

impl DemuxBackend for MemoryDemuxer {
    fn allocate(&self, path: &Path) -> Option<SessionToken> {
        let mut registry = self.registry();
        if !registry.files.contains_key(path) {
            return None;
        }

        let slot = match registry.sessions.iter().position(Option::is_none) {
            Some(free) => {
                registry.sessions[free] = Some(path.to_path_buf());
                free
            }
            None => {
                registry.sessions.push(Some(path.to_path_buf()));
                registry.sessions.len() - 1
            }
        };
        debug!("memory session {} -> {}", slot + 1, path.display());
        SessionToken::new(slot + 1)
    }

    // Unknown or released tokens are reported, never dereferenced.
    unsafe fn release(&self, token: SessionToken) -> i32 {
        let mut registry = self.registry();
        match registry.sessions.get_mut(token.get() - 1) {
            Some(slot) if slot.is_some() => {
                *slot = None;
                0
            }
            _ => EINVAL_STATUS,
        }
    }

    unsafe fn fetch_metadata(&self, token: SessionToken) -> Option<RawMetadata> {
        self.with_session(token, |file| file.metadata.clone())
    }

    unsafe fn fetch_cover(&self, token: SessionToken) -> Option<Cover> {
        self.with_session(token, |file| file.cover.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_token_reports_einval() {
        let backend = MemoryDemuxer::new();
        backend.insert_empty("/media/plain.mp4");
        let token = SessionToken::new(99).unwrap();

        // SAFETY: the registry checks every token against its slab.
        unsafe {
            assert_eq!(backend.release(token), EINVAL_STATUS);
            assert!(backend.fetch_metadata(token).is_none());
            assert!(backend.fetch_cover(token).is_none());
        }
    }

    #[test]
    fn test_double_release_reports_einval() {
        let backend = MemoryDemuxer::new();
        backend.insert_empty("/media/plain.mp4");
        let token = backend.allocate(Path::new("/media/plain.mp4")).unwrap();

        // SAFETY: see `test_unknown_token_reports_einval`.
        unsafe {
            assert_eq!(backend.release(token), 0);
            assert_eq!(backend.release(token), EINVAL_STATUS);
        }
        assert_eq!(backend.live_sessions(), 0);
    }

    #[test]
    fn test_released_slot_is_reused() {
        let backend = MemoryDemuxer::new();
        backend.insert_empty("/media/a.mp4");
        backend.insert_empty("/media/b.mp4");

        let first = backend.allocate(Path::new("/media/a.mp4")).unwrap();
        // SAFETY: `first` is live.
        assert_eq!(unsafe { backend.release(first) }, 0);
        let second = backend.allocate(Path::new("/media/b.mp4")).unwrap();
        assert_eq!(first, second);
        assert_eq!(backend.live_sessions(), 1);
    }
}
