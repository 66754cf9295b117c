use crate::domain::artifact::{Artifact, Dependency, Scope};
use crate::domain::collector::{CollectOptions, DependencyCollector};
use crate::domain::dependency_graph::DependencyGraph;
use crate::domain::dependency_tree::DependencyTree;
use crate::domain::error::ResolutionError;
use crate::domain::ports::ArtifactDescriptorReader;
use std::sync::Arc;

/// Dependency graph builder - Domain Service over an artifact metadata source.
pub struct DependencyGraphBuilder {
    reader: Arc<dyn ArtifactDescriptorReader>,
}

impl DependencyGraphBuilder {
    pub fn new(reader: Arc<dyn ArtifactDescriptorReader>) -> Self {
        Self { reader }
    }

    /// Declared dependencies of `artifact`, in declaration order, with the
    /// artifact's own dependency management applied.
    pub fn get_direct_dependencies(
        &self,
        artifact: &Artifact,
    ) -> Result<Vec<Artifact>, ResolutionError> {
        let descriptor = self.reader.read_descriptor(artifact)?;
        Ok(descriptor
            .dependencies
            .into_iter()
            .map(|d| d.artifact)
            .collect())
    }

    /// Breadth-first graph with nearest-wins mediation: one path per
    /// `group:artifact`. Optional dependencies are expanded.
    pub fn get_transitive_dependencies(
        &self,
        artifacts: &[Artifact],
    ) -> Result<DependencyGraph, ResolutionError> {
        self.collect(artifacts, CollectOptions::mediated())
            .map(|tree| tree.to_graph())
    }

    /// Breadth-first graph without mediation: every path to every occurrence.
    pub fn get_complete_dependencies(
        &self,
        artifacts: &[Artifact],
    ) -> Result<DependencyGraph, ResolutionError> {
        self.collect(artifacts, CollectOptions::complete())
            .map(|tree| tree.to_graph())
    }

    /// Mediated compile-scope tree of one artifact with every node's file located.
    ///
    /// The root's dependency management overrides transitive versions.
    /// Missing descriptors or files fail the resolution.
    pub fn resolve_compile_time_root_dependencies(
        &self,
        artifact: &Artifact,
    ) -> Result<DependencyTree, ResolutionError> {
        let root_descriptor = self.reader.read_descriptor(artifact)?;
        let mut options = CollectOptions::mediated();
        options.compile_scope_only = true;
        options.managed_versions = root_descriptor
            .managed_dependencies
            .iter()
            .map(|d| (d.artifact.key(), d.artifact.version.clone()))
            .collect();

        let mut tree = DependencyCollector::new(self.reader.as_ref(), options)
            .collect(vec![Dependency::new(artifact.clone(), Scope::Compile)])?;

        let indices: Vec<_> = tree.graph.node_indices().collect();
        for idx in indices {
            let located = self
                .reader
                .locate_artifact(tree.node(idx).artifact())
                .map_err(|source| ResolutionError::Collection {
                    path: tree.path_to(idx).to_string(),
                    source: Box::new(source),
                })?;
            tree.node_mut(idx).file = Some(located);
        }
        Ok(tree)
    }

    fn collect(
        &self,
        artifacts: &[Artifact],
        options: CollectOptions,
    ) -> Result<DependencyTree, ResolutionError> {
        let roots = artifacts
            .iter()
            .map(|a| Dependency::new(a.clone(), Scope::Compile))
            .collect();
        DependencyCollector::new(self.reader.as_ref(), options).collect(roots)
    }
}
