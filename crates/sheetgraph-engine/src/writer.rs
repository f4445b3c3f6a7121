//! Diagram files on disk

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Writes rendered diagrams as `<dir>/<label>.<extension>`
#[derive(Debug, Clone)]
pub struct DiagramWriter {
    dir: PathBuf,
}

impl DiagramWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the output directory if needed
    pub fn prepare(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.dir)
    }

    /// Target path for a label; path separators in labels become `_`
    pub fn path_for(&self, label: &str, extension: &str) -> PathBuf {
        let file_stem: String = label
            .chars()
            .map(|c| if c == '/' || c == '\\' { '_' } else { c })
            .collect();
        self.dir.join(format!("{}.{}", file_stem, extension))
    }

    /// Write (or overwrite) one diagram, readable by the owner only on Unix
    pub fn write(&self, label: &str, extension: &str, bytes: &[u8]) -> std::io::Result<PathBuf> {
        let path = self.path_for(label, extension);

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&path)?;
        file.write_all(bytes)?;
        Ok(path)
    }
}
