use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory unusable: {0}")]
    OutputDir(String),
    #[error("write failed: {0}")]
    Io(#[from] io::Error),
}

/// Where finished downloads end up. Implementations must not leave a partial
/// file under `suggested_name` when they fail.
pub trait Persister: Send + Sync {
    fn persist(&self, bytes: &[u8], suggested_name: &str) -> Result<PathBuf, PersistError>;
}

/// Creates `dir` when missing and checks that a file can be created in it.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    let unusable = |err: io::Error| PersistError::OutputDir(format!("{}: {err}", dir.display()));
    fs::create_dir_all(dir).map_err(unusable)?;
    if !fs::metadata(dir).map_err(unusable)?.is_dir() {
        return Err(PersistError::OutputDir(format!("{} is not a directory", dir.display())));
    }
    NamedTempFile::new_in(dir).map_err(unusable)?;
    Ok(())
}

/// Writes whole files into one directory. Content goes to a temp file first and
/// is renamed over the target only once fully synced.
#[derive(Debug, Clone)]
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn write(&self, filename: &str, content: &[u8]) -> Result<PathBuf, PersistError> {
        ensure_output_dir(&self.dir)?;

        let target = self.dir.join(filename);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(content)?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;

        // The temp file is removed on drop if any step above failed.
        tmp.persist(&target).map_err(|e| PersistError::Io(e.error))?;
        Ok(target)
    }
}

/// Saves downloads into a fixed directory, replacing same-named files.
#[derive(Debug, Clone)]
pub struct DirectoryPersister {
    writer: AtomicFileWriter,
}

impl DirectoryPersister {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            writer: AtomicFileWriter::new(dir.into()),
        }
    }

    pub fn dir(&self) -> &Path {
        self.writer.dir()
    }
}

impl Persister for DirectoryPersister {
    fn persist(&self, bytes: &[u8], suggested_name: &str) -> Result<PathBuf, PersistError> {
        self.writer.write(suggested_name, bytes)
    }
}
