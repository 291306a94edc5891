pub mod metadata;
pub use metadata::{
    decode_latin1, encode_latin1, to_string_mapping, Cover, CoverType, MetadataMap, RawMetadata,
    ThermalMetadata, THERMAL_METADATA_ALIGNMENT, THERMAL_METADATA_METAVERSION,
};

pub mod demux;
pub use demux::{Demux, DemuxBackend, MemoryDemuxer, SessionToken};

pub mod native;
pub use native::NativeDemuxer;

pub mod errors;
pub use errors::{DemuxError, DemuxResult, LibraryError, OpenError};

/// Open `path` with the native libmp4 demuxer and return its custom metadata.
///
/// The session is closed before returning.
pub fn read_local_metadata<P: AsRef<std::path::Path>>(path: P) -> DemuxResult<MetadataMap> {
    let backend = NativeDemuxer::load()?;
    let mut demux = Demux::open(&backend, path)?;
    let metadata = demux.metadata();
    demux.close();
    Ok(metadata)
}
