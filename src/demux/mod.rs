mod backend;
mod handle;
mod memory;

#[cfg(test)]
pub use backend::MockDemuxBackend;
pub use backend::{DemuxBackend, SessionToken};
pub use handle::Demux;
pub use memory::{MemoryDemuxer, EINVAL_STATUS};

#[cfg(test)]
pub mod unit_test;
