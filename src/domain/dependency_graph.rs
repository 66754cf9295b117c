use crate::domain::artifact::Artifact;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

/// Artifacts from a root (first) to a node (last).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DependencyPath {
    artifacts: Vec<Artifact>,
}

impl DependencyPath {
    pub fn new(artifacts: Vec<Artifact>) -> Self {
        Self { artifacts }
    }

    pub fn root(artifact: Artifact) -> Self {
        Self {
            artifacts: vec![artifact],
        }
    }

    /// A new path extended by `artifact`.
    pub fn child(&self, artifact: Artifact) -> Self {
        let mut artifacts = Vec::with_capacity(self.artifacts.len() + 1);
        artifacts.extend(self.artifacts.iter().cloned());
        artifacts.push(artifact);
        Self { artifacts }
    }

    pub fn leaf(&self) -> Option<&Artifact> {
        self.artifacts.last()
    }

    pub fn artifacts(&self) -> &[Artifact] {
        &self.artifacts
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// Whether an artifact with the same `group:artifact` key already occurs on this path.
    pub fn contains_key(&self, key: &str) -> bool {
        self.artifacts.iter().any(|a| a.key() == key)
    }
}

impl fmt::Display for DependencyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, artifact) in self.artifacts.iter().enumerate() {
            if i > 0 {
                f.write_str(" / ")?;
            }
            write!(f, "{}", artifact)?;
        }
        Ok(())
    }
}

/// Paths in discovery order, without duplicates.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DependencyGraph {
    paths: Vec<DependencyPath>,
    #[serde(skip)]
    index: HashSet<DependencyPath>,
}

/// A `group:artifact` reached at more than one version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionConflict {
    pub key: String,
    pub versions: Vec<String>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `path` unless an identical path is already recorded.
    pub fn add_path(&mut self, path: DependencyPath) -> bool {
        if self.index.contains(&path) {
            return false;
        }
        self.index.insert(path.clone());
        self.paths.push(path);
        true
    }

    pub fn list(&self) -> &[DependencyPath] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Paths whose leaf is `group:artifact`.
    pub fn paths_to<'a>(
        &'a self,
        group_id: &'a str,
        artifact_id: &'a str,
    ) -> impl Iterator<Item = &'a DependencyPath> + 'a {
        self.paths.iter().filter(move |p| {
            p.leaf()
                .is_some_and(|a| a.group_id == group_id && a.artifact_id == artifact_id)
        })
    }

    /// Distinct versions reached for `group:artifact`, sorted.
    pub fn versions_of(&self, key: &str) -> Vec<String> {
        self.paths
            .iter()
            .filter_map(|p| p.leaf())
            .filter(|a| a.key() == key)
            .map(|a| a.version.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Every `group:artifact` reached at more than one version, sorted by key.
    pub fn conflicts(&self) -> Vec<VersionConflict> {
        let mut versions: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for leaf in self.paths.iter().filter_map(|p| p.leaf()) {
            versions
                .entry(leaf.key())
                .or_default()
                .insert(leaf.version.clone());
        }
        versions
            .into_iter()
            .filter(|(_, v)| v.len() > 1)
            .map(|(key, v)| VersionConflict {
                key,
                versions: v.into_iter().collect(),
            })
            .collect()
    }
}
