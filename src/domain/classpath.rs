use crate::classfile::ClassFile;
use crate::domain::error::LinkageError;
use crate::domain::ports::{ArchiveOpener, ClassArchive, ClassRepository};
use std::path::{Path, PathBuf};

/// Outcome of looking a class up by name.
#[derive(Debug)]
pub enum ClassLookup {
    Found(Box<ClassFile>),
    NotFound,
}

/// One archive on a classpath.
pub struct ClasspathEntry {
    archive: Box<dyn ClassArchive>,
}

impl ClasspathEntry {
    pub fn new(archive: Box<dyn ClassArchive>) -> Self {
        Self { archive }
    }

    pub fn path(&self) -> &Path {
        self.archive.location()
    }

    pub fn archive(&self) -> &dyn ClassArchive {
        self.archive.as_ref()
    }
}

/// Ordered archives; earlier entries shadow later ones for the same class name.
#[derive(Default)]
pub struct Classpath {
    entries: Vec<ClasspathEntry>,
}

impl Classpath {
    pub fn new(archives: Vec<Box<dyn ClassArchive>>) -> Self {
        Self {
            entries: archives.into_iter().map(ClasspathEntry::new).collect(),
        }
    }

    pub fn open(opener: &dyn ArchiveOpener, paths: &[PathBuf]) -> Result<Self, LinkageError> {
        let archives = paths
            .iter()
            .map(|p| opener.open(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(archives))
    }

    pub fn entries(&self) -> &[ClasspathEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bytes of the first entry that contains `binary_name`, with the entry's position.
    pub fn locate(&self, binary_name: &str) -> Result<Option<(usize, Vec<u8>)>, LinkageError> {
        for (position, entry) in self.entries.iter().enumerate() {
            if let Some(bytes) = entry.archive.read_class(binary_name)? {
                return Ok(Some((position, bytes)));
            }
        }
        Ok(None)
    }
}

impl ClassRepository for Classpath {
    fn find_class(&self, binary_name: &str) -> Result<ClassLookup, LinkageError> {
        let Some((position, bytes)) = self.locate(binary_name)? else {
            return Ok(ClassLookup::NotFound);
        };
        match ClassFile::parse(&bytes) {
            Ok(class) => Ok(ClassLookup::Found(Box::new(class))),
            Err(e) => {
                tracing::warn!(
                    class = binary_name,
                    entry = %self.entries[position].path().display(),
                    error = %e,
                    "undecodable class treated as missing"
                );
                Ok(ClassLookup::NotFound)
            }
        }
    }
}
