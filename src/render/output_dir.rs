/// Output directory lifecycle for file-based chart sinks.

use std::fs;
use std::path::{Path, PathBuf};

use crate::model::QuakeError;

#[derive(Debug, Clone, PartialEq)]
pub struct OutputDir {
    path: PathBuf,
}

impl OutputDir {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        OutputDir { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Removes files left over from a previous run, creating the directory
    /// if it does not exist yet.
    ///
    /// Only regular files directly inside the directory are deleted;
    /// subdirectories and symlinks are left alone, and a symlinked output
    /// directory stays a symlink. Refuses to touch a path that exists but is
    /// not a directory.
    pub fn reset(&self) -> Result<(), QuakeError> {
        if !self.path.exists() {
            fs::create_dir_all(&self.path)?;
            return Ok(());
        }
        if !self.path.is_dir() {
            return Err(QuakeError::Config(format!(
                "output path {} exists and is not a directory",
                self.path.display()
            )));
        }
        for entry in fs::read_dir(&self.path)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                fs::remove_file(entry.path())?;
            }
        }
        Ok(())
    }

    /// Writes `contents` to `<dir>/<name>.<extension>`.
    pub fn write(&self, name: &str, extension: &str, contents: &str) -> Result<PathBuf, QuakeError> {
        let file = self.path.join(format!("{}.{}", name, extension));
        fs::write(&file, contents)?;
        Ok(file)
    }
}
