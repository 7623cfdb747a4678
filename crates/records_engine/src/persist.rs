use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("no free file name for {0} in the output directory")]
    NameExhausted(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Ensure output directory exists; create if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::OutputDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Collision {
    /// Replace an existing file of the same name.
    Replace,
    /// Keep existing files and save as `name (1).ext`, `name (2).ext`, ...
    #[default]
    KeepBoth,
}

const MAX_SUFFIX: u32 = 999;

/// Writes downloads into a directory through a temp file, so a reader never
/// sees a half-written document.
pub struct AtomicFileWriter {
    dir: PathBuf,
    collision: Collision,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf, collision: Collision) -> Self {
        Self { dir, collision }
    }

    pub fn write(&self, filename: &str, content: &[u8]) -> Result<PathBuf, PersistError> {
        ensure_output_dir(&self.dir)?;

        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(content)?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;

        if self.collision == Collision::Replace {
            let target = self.dir.join(filename);
            tmp.persist(&target).map_err(|e| PersistError::Io(e.error))?;
            return Ok(target);
        }

        // Claim a name without overwriting; another writer may take the same
        // candidate between our attempts, so an existing name moves us on.
        for candidate in self.candidates(filename) {
            match tmp.persist_noclobber(&candidate) {
                Ok(_) => return Ok(candidate),
                Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => tmp = e.file,
                Err(e) => return Err(PersistError::Io(e.error)),
            }
        }
        Err(PersistError::NameExhausted(filename.to_string()))
    }

    /// `name.ext`, then `name (1).ext` up to `name (999).ext`.
    fn candidates<'a>(&'a self, filename: &'a str) -> impl Iterator<Item = PathBuf> + 'a {
        let path = Path::new(filename);
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| filename.to_string());
        let extension = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        std::iter::once(self.dir.join(filename)).chain(
            (1..=MAX_SUFFIX).map(move |n| self.dir.join(format!("{stem} ({n}){extension}"))),
        )
    }
}
