use crate::demux::{Demux, MockDemuxBackend, SessionToken};
use crate::errors::DemuxError;
use crate::metadata::{Cover, CoverType, THERMAL_METADATA_METAVERSION};
use mockall::predicate::eq;
use std::path::Path;

#[cfg(test)]
mod test_helpers {
    use crate::demux::{MockDemuxBackend, SessionToken};
    use std::path::Path;

    pub const FLIGHT_PATH: &str = "/media/flight_0001.mp4";

    pub fn token() -> SessionToken {
        SessionToken::new(0x5eed).unwrap()
    }

    /// Backend that opens `FLIGHT_PATH` and expects exactly one release.
    pub fn mock_opening_backend() -> MockDemuxBackend {
        let mut backend = MockDemuxBackend::new();
        backend
            .expect_allocate()
            .withf(|path: &Path| path == Path::new(FLIGHT_PATH))
            .times(1)
            .return_const(Some(token()));
        backend
            .expect_release()
            .with(mockall::predicate::eq(token()))
            .times(1)
            .return_const(0i32);
        backend
    }
}

#[test]
fn test_open_failure_carries_path() {
    let mut backend = MockDemuxBackend::new();
    backend.expect_allocate().times(1).return_const(None::<SessionToken>);
    backend.expect_release().times(0);

    let err = Demux::open(backend, "/missing/file.mp4").unwrap_err();
    assert!(matches!(err, DemuxError::Open(_)));
    assert_eq!(err.open_path(), Some(Path::new("/missing/file.mp4")));
}

#[test]
fn test_open_failure_on_empty_path() {
    let mut backend = MockDemuxBackend::new();
    backend
        .expect_allocate()
        .withf(|path: &Path| path.as_os_str().is_empty())
        .return_const(None::<SessionToken>);

    let err = Demux::open(backend, "").unwrap_err();
    assert_eq!(err.open_path(), Some(Path::new("")));
}

#[test]
fn test_close_twice_releases_once() {
    use test_helpers::*;
    let mut demux = Demux::open(mock_opening_backend(), FLIGHT_PATH).unwrap();
    assert!(demux.is_open());
    assert_eq!(demux.token(), Some(token()));

    demux.close();
    assert!(!demux.is_open());
    demux.close();
    assert!(!demux.is_open());
    assert_eq!(demux.token(), None);
}

#[test]
fn test_drop_releases_open_session() {
    use test_helpers::*;
    let demux = Demux::open(mock_opening_backend(), FLIGHT_PATH).unwrap();
    drop(demux);
}

#[test]
fn test_drop_after_close_does_not_release_again() {
    use test_helpers::*;
    let mut demux = Demux::open(mock_opening_backend(), FLIGHT_PATH).unwrap();
    demux.close();
    drop(demux);
}

#[test]
fn test_release_failure_still_closes() {
    use test_helpers::*;
    let mut backend = MockDemuxBackend::new();
    backend.expect_allocate().return_const(Some(token()));
    backend.expect_release().times(1).return_const(-5i32);

    let mut demux = Demux::open(backend, FLIGHT_PATH).unwrap();
    demux.close();
    assert!(!demux.is_open());
    assert!(demux.metadata().is_empty());
}

#[test]
fn test_metadata_decodes_raw_pairs() {
    use test_helpers::*;
    let mut backend = mock_opening_backend();
    backend
        .expect_fetch_metadata()
        .with(eq(token()))
        .times(1)
        .returning(|_| Some(vec![(b"com.parrot.thermal.metaversion".to_vec(), b"1".to_vec())]));

    let demux = Demux::open(backend, FLIGHT_PATH).unwrap();
    let metadata = demux.metadata();
    assert_eq!(metadata.len(), 1);
    assert_eq!(metadata[THERMAL_METADATA_METAVERSION], "1");
}

#[test]
fn test_absent_metadata_is_empty() {
    use test_helpers::*;
    let mut backend = mock_opening_backend();
    backend.expect_fetch_metadata().returning(|_| None);

    let demux = Demux::open(backend, FLIGHT_PATH).unwrap();
    assert!(demux.metadata().is_empty());
    assert!(!demux.thermal_metadata().is_thermal());
}

#[test]
fn test_closed_handle_never_queries_backend() {
    use test_helpers::*;
    let mut backend = mock_opening_backend();
    backend.expect_fetch_metadata().times(0);
    backend.expect_fetch_cover().times(0);

    let mut demux = Demux::open(backend, FLIGHT_PATH).unwrap();
    demux.close();
    assert!(demux.metadata().is_empty());
    assert!(demux.cover().is_none());
}

#[test]
fn test_metadata_does_not_change_session() {
    use test_helpers::*;
    let mut backend = mock_opening_backend();
    backend.expect_fetch_metadata().times(2).returning(|_| None);

    let demux = Demux::open(backend, FLIGHT_PATH).unwrap();
    demux.metadata();
    demux.metadata();
    assert_eq!(demux.token(), Some(token()));
}

#[test]
fn test_cover_is_forwarded() {
    use test_helpers::*;
    let mut backend = mock_opening_backend();
    backend.expect_fetch_cover().with(eq(token())).returning(|_| {
        Some(Cover {
            kind: CoverType::Jpeg,
            data: vec![0xff, 0xd8, 0xff, 0xd9],
        })
    });

    let demux = Demux::open(backend, FLIGHT_PATH).unwrap();
    let cover = demux.cover().unwrap();
    assert_eq!(cover.kind, CoverType::Jpeg);
    assert_eq!(cover.data.len(), 4);
}

#[test]
fn test_borrowed_backend_serves_handle() {
    use test_helpers::*;
    let backend = mock_opening_backend();
    {
        let mut demux = Demux::open(&backend, FLIGHT_PATH).unwrap();
        demux.close();
    }
}

#[test]
fn test_session_token_rejects_sentinel() {
    assert!(SessionToken::new(0).is_none());
    assert_eq!(SessionToken::new(42).map(SessionToken::get), Some(42));
    assert_eq!(SessionToken::new(255).unwrap().to_string(), "0xff");
}
