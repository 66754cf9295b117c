use crate::adapters::archive::FsArchiveOpener;
use crate::adapters::maven::LocalRepository;
use crate::app::dto::*;
use crate::app::report::render_linkage_report;
use crate::app::settings::Settings;
use crate::domain::artifact::Artifact;
use crate::domain::dependency_graph::DependencyGraph;
use crate::domain::dependency_tree::DependencyTree;
use crate::domain::graph_builder::DependencyGraphBuilder;
use crate::domain::linkage::LinkageChecker;
use crate::domain::ports::{ArchiveOpener, ArtifactDescriptorReader};
use crate::domain::signature::FullyQualifiedMethodSignature;
use anyhow::{Context as _, Result};
use std::path::PathBuf;
use std::sync::Arc;

/// Application façade over the linkage checker and the dependency graph builder.
///
/// Cheap to clone; every call builds fresh caches.
#[derive(Clone)]
pub struct LinkageEngine {
    inner: Arc<EngineData>,
}

struct EngineData {
    settings: Settings,
    checker: LinkageChecker,
    graph_builder: DependencyGraphBuilder,
}

impl LinkageEngine {
    /// Engine over the filesystem and the configured local repository.
    pub fn new(settings: Settings) -> Self {
        let reader = Arc::new(LocalRepository::new(settings.repository.clone()));
        Self::with_components(settings, Arc::new(FsArchiveOpener::new()), reader)
    }

    /// Construct an engine from explicit collaborators.
    ///
    /// Used for testing with in-memory archives or descriptor readers.
    pub fn with_components(
        settings: Settings,
        opener: Arc<dyn ArchiveOpener>,
        reader: Arc<dyn ArtifactDescriptorReader>,
    ) -> Self {
        Self {
            inner: Arc::new(EngineData {
                settings,
                checker: LinkageChecker::new(opener),
                graph_builder: DependencyGraphBuilder::new(reader),
            }),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub fn health(&self) -> HealthResponse {
        let settings = &self.inner.settings;
        HealthResponse {
            repository: settings.repository.display().to_string(),
            extra_classpath: settings
                .extra_classpath
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Unresolved method references of `jars`, resolved against `jars`
    /// followed by `resolve_against` and the configured extra classpath.
    pub fn unresolved_references(
        &self,
        jars: &[PathBuf],
        resolve_against: &[PathBuf],
    ) -> Result<Vec<FullyQualifiedMethodSignature>> {
        let mut extra = resolve_against.to_vec();
        extra.extend(self.inner.settings.extra_classpath.iter().cloned());
        self.inner
            .checker
            .check(jars, &extra)
            .context("Static linkage check failed")
    }

    pub fn linkage(&self, req: LinkageRequest) -> Result<LinkageResponse> {
        let unresolved = self.unresolved_references(&req.jars, &req.resolve_against)?;
        let checked: Vec<String> = req.jars.iter().map(|p| p.display().to_string()).collect();
        Ok(LinkageResponse {
            report: render_linkage_report(&checked, &unresolved),
            unresolved: unresolved.iter().map(MethodReferenceDto::from).collect(),
            checked,
        })
    }

    pub fn dependency_graph(&self, coordinates: &[String], complete: bool) -> Result<DependencyGraph> {
        let artifacts = parse_coordinates(coordinates)?;
        let builder = &self.inner.graph_builder;
        let graph = if complete {
            builder.get_complete_dependencies(&artifacts)
        } else {
            builder.get_transitive_dependencies(&artifacts)
        };
        graph.with_context(|| format!("Failed to resolve dependencies of {}", coordinates.join(", ")))
    }

    pub fn graph(&self, req: GraphRequest) -> Result<GraphResponse> {
        let graph = self.dependency_graph(&req.artifacts, req.complete)?;
        Ok(GraphResponse::from(&graph))
    }

    pub fn direct(&self, req: ArtifactRequest) -> Result<DirectResponse> {
        let artifact = parse_coordinate(&req.artifact)?;
        let dependencies = self
            .inner
            .graph_builder
            .get_direct_dependencies(&artifact)
            .with_context(|| format!("Failed to read dependencies of {}", artifact))?;
        Ok(DirectResponse {
            artifact: artifact.to_string(),
            dependencies: dependencies.iter().map(|a| a.to_string()).collect(),
        })
    }

    pub fn compile_tree(&self, coordinate: &str) -> Result<DependencyTree> {
        let artifact = parse_coordinate(coordinate)?;
        self.inner
            .graph_builder
            .resolve_compile_time_root_dependencies(&artifact)
            .with_context(|| format!("Failed to resolve compile-time dependencies of {}", artifact))
    }

    pub fn tree(&self, req: ArtifactRequest) -> Result<TreeResponse> {
        let tree = self.compile_tree(&req.artifact)?;
        Ok(TreeResponse::from(&tree))
    }

    /// Resolves the compile-time tree of `coordinate` and checks linkage
    /// across all of its artifact files.
    pub fn check_artifact(&self, coordinate: &str) -> Result<LinkageResponse> {
        let tree = self.compile_tree(coordinate)?;
        let jars = tree.artifact_paths();
        tracing::info!(artifact = coordinate, jars = jars.len(), "checking resolved classpath");
        self.linkage(LinkageRequest {
            jars,
            resolve_against: Vec::new(),
        })
    }
}

fn parse_coordinate(coordinate: &str) -> Result<Artifact> {
    coordinate
        .parse::<Artifact>()
        .with_context(|| format!("Invalid artifact: {}", coordinate))
}

fn parse_coordinates(coordinates: &[String]) -> Result<Vec<Artifact>> {
    coordinates.iter().map(|c| parse_coordinate(c)).collect()
}
