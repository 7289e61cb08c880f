use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use super::{DumpSource, SourceError};

/// `DumpSource` backed by a raw dump file.
pub struct DumpFileSource {
    path: PathBuf,
    file: File,
}

impl DumpFileSource {
    /// # Errors
    /// Returns `SourceError::Io` when the file cannot be opened.
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let file = File::open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DumpSource for DumpFileSource {
    fn read_dump(&mut self) -> Result<Vec<u8>, SourceError> {
        let mut dump = Vec::new();
        self.file.read_to_end(&mut dump)?;
        if dump.is_empty() {
            return Err(SourceError::Empty {
                path: self.path.display().to_string(),
            });
        }
        log::debug!("read {} bytes from {}", dump.len(), self.path.display());
        Ok(dump)
    }
}
