use crate::domain::dependency_graph::{DependencyGraph, VersionConflict};
use crate::domain::dependency_tree::DependencyTree;
use crate::domain::signature::FullyQualifiedMethodSignature;
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub repository: String,
    pub extra_classpath: Vec<String>,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkageRequest {
    /// Archives to scan; they also form the resolution classpath, in order.
    pub jars: Vec<PathBuf>,
    /// Resolution-only entries appended after `jars`.
    #[serde(default)]
    pub resolve_against: Vec<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkageResponse {
    pub checked: Vec<String>,
    pub unresolved: Vec<MethodReferenceDto>,
    pub report: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodReferenceDto {
    pub class_name: String,
    pub method_name: String,
    pub descriptor: String,
}

impl From<&FullyQualifiedMethodSignature> for MethodReferenceDto {
    fn from(reference: &FullyQualifiedMethodSignature) -> Self {
        Self {
            class_name: reference.class_name.clone(),
            method_name: reference.method_name().to_string(),
            descriptor: reference.descriptor().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphRequest {
    /// Coordinates `group:artifact[:extension[:classifier]]:version`.
    pub artifacts: Vec<String>,
    /// Keep every path instead of nearest-wins mediation.
    #[serde(default)]
    pub complete: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphResponse {
    /// Each path lists coordinates from a root to a node.
    pub paths: Vec<Vec<String>>,
    pub conflicts: Vec<ConflictDto>,
}

impl From<&DependencyGraph> for GraphResponse {
    fn from(graph: &DependencyGraph) -> Self {
        Self {
            paths: graph
                .list()
                .iter()
                .map(|p| p.artifacts().iter().map(|a| a.to_string()).collect())
                .collect(),
            conflicts: graph.conflicts().into_iter().map(ConflictDto::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictDto {
    pub key: String,
    pub versions: Vec<String>,
}

impl From<VersionConflict> for ConflictDto {
    fn from(conflict: VersionConflict) -> Self {
        Self {
            key: conflict.key,
            versions: conflict.versions,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactRequest {
    pub artifact: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectResponse {
    pub artifact: String,
    pub dependencies: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeNodeDto {
    pub artifact: String,
    pub scope: String,
    pub optional: bool,
    pub file: Option<String>,
    pub children: Vec<TreeNodeDto>,
}

impl TreeNodeDto {
    pub fn from_tree(tree: &DependencyTree, idx: NodeIndex) -> Self {
        let node = tree.node(idx);
        Self {
            artifact: node.artifact().to_string(),
            scope: node.dependency.scope.to_string(),
            optional: node.dependency.optional,
            file: node.file.as_ref().map(|p| p.display().to_string()),
            children: tree
                .children(idx)
                .into_iter()
                .map(|child| Self::from_tree(tree, child))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeResponse {
    pub root: Option<TreeNodeDto>,
    pub node_count: usize,
}

impl From<&DependencyTree> for TreeResponse {
    fn from(tree: &DependencyTree) -> Self {
        Self {
            root: tree.root().map(|idx| TreeNodeDto::from_tree(tree, idx)),
            node_count: tree.len(),
        }
    }
}
