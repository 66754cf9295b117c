//! Mock implementations for integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use dependency_linkage::domain::artifact::{Artifact, ArtifactDescriptor, Dependency, Scope};
use dependency_linkage::domain::classpath::ClassLookup;
use dependency_linkage::domain::error::{LinkageError, ResolutionError};
use dependency_linkage::domain::ports::{
    ArchiveOpener, ArtifactDescriptorReader, ClassArchive, ClassRepository,
};

/// Per-class read counters shared between an opener and the archives it hands out.
#[derive(Debug, Default)]
pub struct ReadLog {
    reads: Mutex<HashMap<String, usize>>,
}

impl ReadLog {
    pub fn record(&self, binary_name: &str) {
        *self
            .reads
            .lock()
            .unwrap()
            .entry(binary_name.to_string())
            .or_default() += 1;
    }

    pub fn count(&self, binary_name: &str) -> usize {
        self.reads
            .lock()
            .unwrap()
            .get(binary_name)
            .copied()
            .unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.reads.lock().unwrap().values().sum()
    }
}

/// Archive held in memory; entries keep insertion order.
pub struct InMemoryArchive {
    location: PathBuf,
    classes: Vec<(String, Vec<u8>)>,
    log: Arc<ReadLog>,
}

impl InMemoryArchive {
    pub fn new(location: impl Into<PathBuf>, classes: Vec<(String, Vec<u8>)>) -> Self {
        Self {
            location: location.into(),
            classes,
            log: Arc::new(ReadLog::default()),
        }
    }

    pub fn with_log(mut self, log: Arc<ReadLog>) -> Self {
        self.log = log;
        self
    }
}

impl ClassArchive for InMemoryArchive {
    fn location(&self) -> &Path {
        &self.location
    }

    fn class_names(&self) -> Box<dyn Iterator<Item = String> + '_> {
        Box::new(self.classes.iter().map(|(name, _)| name.clone()))
    }

    fn read_class(&self, binary_name: &str) -> Result<Option<Vec<u8>>, LinkageError> {
        self.log.record(binary_name);
        Ok(self
            .classes
            .iter()
            .find(|(name, _)| name == binary_name)
            .map(|(_, bytes)| bytes.clone()))
    }
}

/// Opener over in-memory archives keyed by path. Unknown paths are unreadable.
#[derive(Default)]
pub struct InMemoryOpener {
    archives: HashMap<PathBuf, Vec<(String, Vec<u8>)>>,
    pub log: Arc<ReadLog>,
}

impl InMemoryOpener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn archive(mut self, path: &str, classes: Vec<(&str, Vec<u8>)>) -> Self {
        self.archives.insert(
            PathBuf::from(path),
            classes
                .into_iter()
                .map(|(name, bytes)| (name.to_string(), bytes))
                .collect(),
        );
        self
    }
}

impl ArchiveOpener for InMemoryOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn ClassArchive>, LinkageError> {
        let classes = self
            .archives
            .get(path)
            .cloned()
            .ok_or_else(|| LinkageError::UnreadableInput {
                path: path.to_path_buf(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })?;
        Ok(Box::new(
            InMemoryArchive::new(path, classes).with_log(Arc::clone(&self.log)),
        ))
    }
}

/// Wraps a repository and counts `find_class` calls per name.
pub struct CountingRepository<R> {
    inner: R,
    lookups: Mutex<HashMap<String, usize>>,
}

impl<R: ClassRepository> CountingRepository<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            lookups: Mutex::new(HashMap::new()),
        }
    }

    pub fn lookups(&self, binary_name: &str) -> usize {
        self.lookups
            .lock()
            .unwrap()
            .get(binary_name)
            .copied()
            .unwrap_or(0)
    }
}

impl<R: ClassRepository> ClassRepository for CountingRepository<R> {
    fn find_class(&self, binary_name: &str) -> Result<ClassLookup, LinkageError> {
        *self
            .lookups
            .lock()
            .unwrap()
            .entry(binary_name.to_string())
            .or_default() += 1;
        self.inner.find_class(binary_name)
    }
}

fn gav(artifact: &Artifact) -> String {
    format!(
        "{}:{}:{}",
        artifact.group_id, artifact.artifact_id, artifact.version
    )
}

/// Descriptor reader over a fixed table of artifacts.
///
/// Coordinates are `group:artifact:version`; dependencies default to compile scope.
#[derive(Default)]
pub struct MockDescriptorReader {
    descriptors: HashMap<String, ArtifactDescriptor>,
    files: HashMap<String, PathBuf>,
    reads: Mutex<Vec<String>>,
}

impl MockDescriptorReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `coordinate` with compile-scope dependencies on `dependencies`.
    pub fn artifact(self, coordinate: &str, dependencies: &[&str]) -> Self {
        let deps = dependencies
            .iter()
            .map(|c| Dependency::new(c.parse().unwrap(), Scope::Compile))
            .collect();
        self.artifact_with(coordinate, deps)
    }

    pub fn artifact_with(mut self, coordinate: &str, dependencies: Vec<Dependency>) -> Self {
        let artifact: Artifact = coordinate.parse().unwrap();
        let entry = self
            .descriptors
            .entry(gav(&artifact))
            .or_insert_with(|| ArtifactDescriptor {
                artifact: Some(artifact.clone()),
                ..Default::default()
            });
        entry.dependencies = dependencies;
        self
    }

    pub fn managed(mut self, coordinate: &str, managed: &[&str]) -> Self {
        let artifact: Artifact = coordinate.parse().unwrap();
        let entry = self
            .descriptors
            .entry(gav(&artifact))
            .or_insert_with(|| ArtifactDescriptor {
                artifact: Some(artifact.clone()),
                ..Default::default()
            });
        entry.managed_dependencies = managed
            .iter()
            .map(|c| Dependency::new(c.parse().unwrap(), Scope::Compile))
            .collect();
        self
    }

    pub fn file(mut self, coordinate: &str, path: impl Into<PathBuf>) -> Self {
        let artifact: Artifact = coordinate.parse().unwrap();
        self.files.insert(gav(&artifact), path.into());
        self
    }

    /// Every artifact without an explicit file gets `/repo/<artifact>-<version>.jar`.
    pub fn with_default_files(mut self) -> Self {
        for key in self.descriptors.keys() {
            let mut parts = key.split(':');
            let (_, a, v) = (parts.next(), parts.next(), parts.next());
            if let (Some(a), Some(v)) = (a, v) {
                self.files
                    .entry(key.clone())
                    .or_insert_with(|| PathBuf::from(format!("/repo/{a}-{v}.jar")));
            }
        }
        self
    }

    /// `group:artifact:version` of every descriptor read, in order.
    pub fn reads(&self) -> Vec<String> {
        self.reads.lock().unwrap().clone()
    }
}

impl ArtifactDescriptorReader for MockDescriptorReader {
    fn read_descriptor(&self, artifact: &Artifact) -> Result<ArtifactDescriptor, ResolutionError> {
        let key = gav(artifact);
        self.reads.lock().unwrap().push(key.clone());
        self.descriptors
            .get(&key)
            .cloned()
            .ok_or_else(|| ResolutionError::ArtifactNotFound {
                artifact: artifact.to_string(),
                location: PathBuf::from(format!("/repo/{key}.pom")),
            })
    }

    fn locate_artifact(&self, artifact: &Artifact) -> Result<PathBuf, ResolutionError> {
        let key = gav(artifact);
        self.files
            .get(&key)
            .cloned()
            .ok_or_else(|| ResolutionError::ArtifactNotFound {
                artifact: artifact.to_string(),
                location: PathBuf::from(format!("/repo/{key}.jar")),
            })
    }
}
