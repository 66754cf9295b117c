use crate::classfile::class_file_path;
use crate::domain::error::LinkageError;
use crate::domain::ports::ClassArchive;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Exploded class directory (e.g. `target/classes`).
pub struct DirectoryArchive {
    root: PathBuf,
}

impl DirectoryArchive {
    pub fn open(root: &Path) -> Result<Self, LinkageError> {
        std::fs::read_dir(root).map_err(|source| LinkageError::UnreadableInput {
            path: root.to_path_buf(),
            source,
        })?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }
}

fn relative_class_name(root: &Path, file: &Path) -> Option<String> {
    let relative = file.strip_prefix(root).ok()?;
    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?),
            _ => return None,
        }
    }
    let joined = parts.join("/");
    super::jar::entry_class_name(&joined)
}

impl ClassArchive for DirectoryArchive {
    fn location(&self) -> &Path {
        &self.root
    }

    fn class_names(&self) -> Box<dyn Iterator<Item = String> + '_> {
        Box::new(
            WalkDir::new(&self.root)
                .sort_by_file_name()
                .into_iter()
                .filter_map(Result::ok)
                .filter(|e| e.file_type().is_file())
                .filter_map(move |e| relative_class_name(&self.root, e.path())),
        )
    }

    fn read_class(&self, binary_name: &str) -> Result<Option<Vec<u8>>, LinkageError> {
        let path = self.root.join(class_file_path(binary_name));
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(LinkageError::Io { path, source }),
        }
    }
}
