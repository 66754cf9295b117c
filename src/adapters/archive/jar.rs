use crate::classfile::class_file_path;
use crate::domain::error::LinkageError;
use crate::domain::ports::ClassArchive;
use memmap2::Mmap;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use zip::ZipArchive;
use zip::result::ZipError;

/// Memory-mapped jar (zip) archive.
pub struct JarArchive {
    path: PathBuf,
    /// Binary names in central-directory order.
    class_names: Vec<String>,
    zip: Mutex<ZipArchive<Cursor<Mmap>>>,
}

/// Upper bound on the preallocation taken from an entry's declared size.
const MAX_SIZE_HINT: u64 = 64 << 20;

impl JarArchive {
    pub fn open(path: &Path) -> Result<Self, LinkageError> {
        let file = File::open(path).map_err(|source| LinkageError::UnreadableInput {
            path: path.to_path_buf(),
            source,
        })?;
        let mmap = unsafe { Mmap::map(&file) }.map_err(|source| LinkageError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let zip = ZipArchive::new(Cursor::new(mmap)).map_err(|e| LinkageError::Archive {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let class_names = zip.file_names().filter_map(entry_class_name).collect();

        Ok(Self {
            path: path.to_path_buf(),
            class_names,
            zip: Mutex::new(zip),
        })
    }
}

/// Binary class name of a zip entry, if the entry is a loadable class file.
/// Versioned (`META-INF/versions/..`) entries and module descriptors are skipped.
pub(crate) fn entry_class_name(entry: &str) -> Option<String> {
    let stem = entry.strip_suffix(".class")?;
    if stem.starts_with("META-INF/") || stem == "module-info" || stem.ends_with("/module-info") {
        return None;
    }
    Some(stem.replace('/', "."))
}

impl ClassArchive for JarArchive {
    fn location(&self) -> &Path {
        &self.path
    }

    fn class_names(&self) -> Box<dyn Iterator<Item = String> + '_> {
        Box::new(self.class_names.iter().cloned())
    }

    fn read_class(&self, binary_name: &str) -> Result<Option<Vec<u8>>, LinkageError> {
        let mut zip = self.zip.lock().unwrap_or_else(|e| e.into_inner());
        let mut entry = match zip.by_name(&class_file_path(binary_name)) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => {
                return Err(LinkageError::Archive {
                    path: self.path.clone(),
                    reason: e.to_string(),
                });
            }
        };
        let mut bytes = Vec::with_capacity(entry.size().min(MAX_SIZE_HINT) as usize);
        entry
            .read_to_end(&mut bytes)
            .map_err(|source| LinkageError::Io {
                path: self.path.clone(),
                source,
            })?;
        Ok(Some(bytes))
    }
}
