//! Typed failures of the two analysis halves.
//!
//! "Class not found" during classpath resolution is not an error; it is
//! reported as [`crate::domain::classpath::ClassLookup::NotFound`].

use crate::classfile::ClassFormatError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LinkageError {
    #[error("the file is not readable: {}", path.display())]
    UnreadableInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot read archive {}: {reason}", path.display())]
    Archive { path: PathBuf, reason: String },
    #[error("cannot decode class {class_name}")]
    ClassDecode {
        class_name: String,
        #[source]
        source: ClassFormatError,
    },
    #[error("I/O error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("invalid artifact coordinate '{coordinate}': {reason}")]
    InvalidCoordinate { coordinate: String, reason: String },
    #[error("artifact {artifact} not found at {}", location.display())]
    ArtifactNotFound { artifact: String, location: PathBuf },
    #[error("malformed descriptor for {artifact}: {reason}")]
    MalformedDescriptor { artifact: String, reason: String },
    #[error("unsupported version '{version}' for {artifact}: version ranges are not resolved")]
    UnsupportedVersion { artifact: String, version: String },
    #[error("parent cycle while building model of {artifact}")]
    ParentCycle { artifact: String },
    #[error("I/O error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to collect dependencies at {path}")]
    Collection {
        path: String,
        #[source]
        source: Box<ResolutionError>,
    },
}

impl ResolutionError {
    /// Innermost failure, skipping `Collection` wrappers.
    pub fn root_cause(&self) -> &ResolutionError {
        match self {
            ResolutionError::Collection { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
