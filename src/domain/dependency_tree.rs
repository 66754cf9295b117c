use crate::domain::artifact::{Artifact, Dependency};
use crate::domain::dependency_graph::{DependencyGraph, DependencyPath};
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use std::path::PathBuf;

/// One artifact occurrence within a resolution.
#[derive(Debug, Clone)]
pub struct DependencyNode {
    /// Declared dependency with its version after management and its derived scope.
    pub dependency: Dependency,
    pub depth: usize,
    pub parent: Option<NodeIndex>,
    /// Located artifact file, when the resolution located files.
    pub file: Option<PathBuf>,
}

impl DependencyNode {
    pub fn artifact(&self) -> &Artifact {
        &self.dependency.artifact
    }
}

/// A resolved dependency forest. Node indices follow discovery (breadth-first) order.
#[derive(Debug, Clone, Default)]
pub struct DependencyTree {
    pub graph: DiGraph<DependencyNode, ()>,
    roots: Vec<NodeIndex>,
}

impl DependencyTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add_node(&mut self, node: DependencyNode) -> NodeIndex {
        let parent = node.parent;
        let idx = self.graph.add_node(node);
        match parent {
            Some(parent) => {
                self.graph.add_edge(parent, idx, ());
            }
            None => self.roots.push(idx),
        }
        idx
    }

    pub fn roots(&self) -> &[NodeIndex] {
        &self.roots
    }

    /// The first root; single-root resolutions have exactly one.
    pub fn root(&self) -> Option<NodeIndex> {
        self.roots.first().copied()
    }

    pub fn node(&self, idx: NodeIndex) -> &DependencyNode {
        &self.graph[idx]
    }

    pub fn node_mut(&mut self, idx: NodeIndex) -> &mut DependencyNode {
        &mut self.graph[idx]
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Children in declaration order.
    pub fn children(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        // petgraph yields the most recently added edge first
        let mut children: Vec<_> = self
            .graph
            .neighbors_directed(idx, Direction::Outgoing)
            .collect();
        children.reverse();
        children
    }

    pub fn path_to(&self, idx: NodeIndex) -> DependencyPath {
        let mut artifacts = Vec::with_capacity(self.graph[idx].depth + 1);
        let mut current = Some(idx);
        while let Some(i) = current {
            artifacts.push(self.graph[i].artifact().clone());
            current = self.graph[i].parent;
        }
        artifacts.reverse();
        DependencyPath::new(artifacts)
    }

    /// Whether `key` occurs on the path from a root to `idx`, `idx` excluded.
    pub fn has_ancestor_with_key(&self, idx: NodeIndex, key: &str) -> bool {
        let mut current = self.graph[idx].parent;
        while let Some(i) = current {
            if self.graph[i].artifact().key() == key {
                return true;
            }
            current = self.graph[i].parent;
        }
        false
    }

    /// Nodes in discovery order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, &DependencyNode)> {
        self.graph
            .node_indices()
            .map(move |idx| (idx, &self.graph[idx]))
    }

    /// Flattens into one root-to-node path per node, in discovery order.
    pub fn to_graph(&self) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        for idx in self.graph.node_indices() {
            graph.add_path(self.path_to(idx));
        }
        graph
    }

    /// Located files in discovery order, without repeats.
    pub fn artifact_paths(&self) -> Vec<PathBuf> {
        let mut seen = std::collections::HashSet::new();
        self.graph
            .node_weights()
            .filter_map(|n| n.file.clone())
            .filter(|p| seen.insert(p.clone()))
            .collect()
    }
}
