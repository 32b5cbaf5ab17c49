//! Destinations for generated files.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error as ThisError;

///
/// WriteError
///

#[derive(Debug, ThisError)]
pub enum WriteError {
    #[error("cannot write '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("output path '{}' escapes the output directory", path.display())]
    OutsideRoot { path: PathBuf },
}

///
/// SourceWriter
///

pub trait SourceWriter {
    /// Write `contents` to `relative`, replacing any previous file.
    fn write(&mut self, relative: &Path, contents: &str) -> Result<(), WriteError>;
}

///
/// FileWriter
/// writes below a root directory, creating parents as needed
///

#[derive(Clone, Debug)]
pub struct FileWriter {
    root: PathBuf,
}

impl FileWriter {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl SourceWriter for FileWriter {
    fn write(&mut self, relative: &Path, contents: &str) -> Result<(), WriteError> {
        if relative.is_absolute()
            || relative
                .components()
                .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            return Err(WriteError::OutsideRoot {
                path: relative.to_path_buf(),
            });
        }

        let path = self.root.join(relative);
        let io = |source| WriteError::Io {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io)?;
        }
        fs::write(&path, contents).map_err(io)?;

        tracing::debug!(target: "msgtools", stage = "write", path = %path.display());

        Ok(())
    }
}

///
/// MemoryWriter
///

#[derive(Clone, Debug, Default)]
pub struct MemoryWriter {
    pub files: BTreeMap<PathBuf, String>,
}

impl MemoryWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, relative: impl AsRef<Path>) -> Option<&str> {
        self.files.get(relative.as_ref()).map(String::as_str)
    }
}

impl SourceWriter for MemoryWriter {
    fn write(&mut self, relative: &Path, contents: &str) -> Result<(), WriteError> {
        self.files.insert(relative.to_path_buf(), contents.to_string());

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_writer_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = FileWriter::new(dir.path());

        writer.write(Path::new("net/NetLogger_logger.rs"), "// one").unwrap();
        writer.write(Path::new("net/NetLogger_logger.rs"), "// two").unwrap();

        let written = fs::read_to_string(dir.path().join("net/NetLogger_logger.rs")).unwrap();
        assert_eq!(written, "// two");
    }

    #[test]
    fn file_writer_stays_below_its_root() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = FileWriter::new(dir.path());

        let err = writer.write(Path::new("../escape.rs"), "").unwrap_err();
        assert!(matches!(err, WriteError::OutsideRoot { .. }));
    }

    #[test]
    fn memory_writer_keeps_the_last_contents() {
        let mut writer = MemoryWriter::new();
        writer.write(Path::new("a.rs"), "1").unwrap();
        writer.write(Path::new("a.rs"), "2").unwrap();

        assert_eq!(writer.get("a.rs"), Some("2"));
        assert_eq!(writer.files.len(), 1);
    }
}
