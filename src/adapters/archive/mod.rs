//! Class archive adapters: jar files and exploded class directories.

mod directory;
mod jar;

pub use directory::DirectoryArchive;
pub use jar::JarArchive;

use crate::domain::error::LinkageError;
use crate::domain::ports::{ArchiveOpener, ClassArchive};
use std::path::Path;

/// Opens a filesystem path as a jar or, for directories, an exploded class tree.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsArchiveOpener;

impl FsArchiveOpener {
    pub fn new() -> Self {
        Self
    }
}

impl ArchiveOpener for FsArchiveOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn ClassArchive>, LinkageError> {
        let metadata = std::fs::metadata(path).map_err(|source| LinkageError::UnreadableInput {
            path: path.to_path_buf(),
            source,
        })?;
        if metadata.is_dir() {
            Ok(Box::new(DirectoryArchive::open(path)?))
        } else {
            Ok(Box::new(JarArchive::open(path)?))
        }
    }
}
