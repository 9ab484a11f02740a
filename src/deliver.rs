use crate::error::{Result, TableExportError};
use crate::export::ExportedFile;
use std::path::{Path, PathBuf};

/// Where finished exports go.
pub trait Delivery {
    /// Hands `file` over and returns where it ended up.
    fn deliver(&mut self, file: &ExportedFile) -> Result<PathBuf>;
}

/// Writes exports as files inside one directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Delivery for DirectorySink {
    fn deliver(&mut self, file: &ExportedFile) -> Result<PathBuf> {
        validate_file_name(&file.name)?;
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(&file.name);
        std::fs::write(&path, &file.bytes)?;
        log::debug!("wrote {} ({} bytes)", path.display(), file.len());
        Ok(path)
    }
}

/// Keeps delivered files in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    files: Vec<ExportedFile>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files(&self) -> &[ExportedFile] {
        &self.files
    }

    pub fn into_files(self) -> Vec<ExportedFile> {
        self.files
    }
}

impl Delivery for MemorySink {
    fn deliver(&mut self, file: &ExportedFile) -> Result<PathBuf> {
        self.files.push(file.clone());
        Ok(PathBuf::from(&file.name))
    }
}

fn validate_file_name(name: &str) -> Result<()> {
    // With separators rejected the name is a single path component.
    let bad = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);
    if bad {
        return Err(TableExportError::InvalidFileName(name.to_string()));
    }
    Ok(())
}
