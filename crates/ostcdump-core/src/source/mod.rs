//! Dump sources.
//!
//! This is the only place the crate touches the filesystem; the codec works
//! on byte buffers handed over by a `DumpSource`.

mod file;

pub use file::DumpFileSource;

use thiserror::Error;

pub trait DumpSource {
    fn read_dump(&mut self) -> Result<Vec<u8>, SourceError>;
}

impl DumpSource for &[u8] {
    fn read_dump(&mut self) -> Result<Vec<u8>, SourceError> {
        Ok(self.to_vec())
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("dump file is empty: {path}")]
    Empty { path: String },
}
