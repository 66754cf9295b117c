use crate::domain::artifact::{Artifact, ArtifactDescriptor};
use crate::domain::classpath::ClassLookup;
use crate::domain::error::{LinkageError, ResolutionError};
use std::path::{Path, PathBuf};

/// One archive of compiled classes (jar, exploded directory, ...).
pub trait ClassArchive: Send + Sync {
    fn location(&self) -> &Path;

    /// Binary names of every class file in the archive, in entry order.
    /// Each call starts a fresh, finite iteration.
    fn class_names(&self) -> Box<dyn Iterator<Item = String> + '_>;

    /// Raw bytes of a class by binary name; `None` when the archive has no such entry.
    fn read_class(&self, binary_name: &str) -> Result<Option<Vec<u8>>, LinkageError>;
}

/// Opens archives by filesystem location (implemented by infrastructure).
pub trait ArchiveOpener: Send + Sync {
    fn open(&self, path: &Path) -> Result<Box<dyn ClassArchive>, LinkageError>;
}

/// By-name class lookup with first-match precedence.
pub trait ClassRepository {
    fn find_class(&self, binary_name: &str) -> Result<ClassLookup, LinkageError>;
}

/// Artifact metadata port (implemented by a repository adapter).
pub trait ArtifactDescriptorReader: Send + Sync {
    /// Effective declaration of an artifact: its dependencies with the
    /// artifact's own dependency management applied.
    fn read_descriptor(&self, artifact: &Artifact) -> Result<ArtifactDescriptor, ResolutionError>;

    /// Location of the artifact's file, failing when the repository lacks it.
    fn locate_artifact(&self, artifact: &Artifact) -> Result<PathBuf, ResolutionError>;
}
