//! Breadth-first dependency collection.
//!
//! Roots are level 0. A node's children come from its descriptor in
//! declaration order, so discovery order is level by level, ties broken by
//! root order and then by declaration order.

use crate::domain::artifact::{Dependency, Exclusion, Scope};
use crate::domain::dependency_tree::{DependencyNode, DependencyTree};
use crate::domain::error::ResolutionError;
use crate::domain::ports::ArtifactDescriptorReader;
use petgraph::graph::NodeIndex;
use std::collections::{HashMap, HashSet, VecDeque};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mediation {
    /// One node per `group:artifact`: the first reached in breadth-first order.
    NearestWins,
    /// Every occurrence is kept; a key repeated among a node's ancestors is
    /// recorded but not expanded.
    Disabled,
}

#[derive(Debug, Clone)]
pub struct CollectOptions {
    pub mediation: Mediation,
    /// Keep only children whose derived scope is compile.
    pub compile_scope_only: bool,
    /// Version overrides by `group:artifact`, applied from depth 2 down.
    pub managed_versions: HashMap<String, String>,
}

impl CollectOptions {
    pub fn mediated() -> Self {
        Self {
            mediation: Mediation::NearestWins,
            compile_scope_only: false,
            managed_versions: HashMap::new(),
        }
    }

    pub fn complete() -> Self {
        Self {
            mediation: Mediation::Disabled,
            ..Self::mediated()
        }
    }
}

struct Pending {
    dependency: Dependency,
    parent: Option<NodeIndex>,
    depth: usize,
    exclusions: Vec<Exclusion>,
}

pub struct DependencyCollector<'a> {
    reader: &'a dyn ArtifactDescriptorReader,
    options: CollectOptions,
}

impl<'a> DependencyCollector<'a> {
    pub fn new(reader: &'a dyn ArtifactDescriptorReader, options: CollectOptions) -> Self {
        Self { reader, options }
    }

    pub fn collect(&self, roots: Vec<Dependency>) -> Result<DependencyTree, ResolutionError> {
        let mut tree = DependencyTree::new();
        let mut selected: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<Pending> = roots
            .into_iter()
            .map(|dependency| Pending {
                exclusions: dependency.exclusions.clone(),
                dependency,
                parent: None,
                depth: 0,
            })
            .collect();

        while let Some(pending) = queue.pop_front() {
            let key = pending.dependency.artifact.key();
            if self.options.mediation == Mediation::NearestWins && !selected.insert(key.clone()) {
                tracing::trace!(
                    artifact = %pending.dependency.artifact,
                    "omitted for conflict with nearer occurrence"
                );
                continue;
            }

            let scope = pending.dependency.scope;
            let node = tree.add_node(DependencyNode {
                dependency: pending.dependency,
                depth: pending.depth,
                parent: pending.parent,
                file: None,
            });

            if scope == Scope::System {
                continue;
            }
            if self.options.mediation == Mediation::Disabled && tree.has_ancestor_with_key(node, &key)
            {
                continue;
            }

            let artifact = tree.node(node).artifact().clone();
            let descriptor = self
                .reader
                .read_descriptor(&artifact)
                .map_err(|source| collection_error(&tree, node, source))?;

            for declared in descriptor.dependencies {
                if let Some(child) = self.child_of(&pending.exclusions, scope, pending.depth + 1, declared)
                {
                    if !child.dependency.artifact.has_concrete_version() {
                        return Err(collection_error(
                            &tree,
                            node,
                            ResolutionError::UnsupportedVersion {
                                artifact: child.dependency.artifact.key(),
                                version: child.dependency.artifact.version.clone(),
                            },
                        ));
                    }
                    queue.push_back(Pending {
                        parent: Some(node),
                        ..child
                    });
                }
            }
        }

        tracing::debug!(
            nodes = tree.len(),
            mediation = ?self.options.mediation,
            "collected dependency tree"
        );
        Ok(tree)
    }

    /// Applies selection (scope, exclusions) and management to one declared dependency.
    fn child_of(
        &self,
        inherited_exclusions: &[Exclusion],
        parent_scope: Scope,
        depth: usize,
        mut declared: Dependency,
    ) -> Option<Pending> {
        if matches!(declared.scope, Scope::Test | Scope::Provided | Scope::Import) {
            return None;
        }
        if inherited_exclusions
            .iter()
            .any(|e| e.matches(&declared.artifact))
        {
            return None;
        }

        if depth >= 2
            && let Some(version) = self.options.managed_versions.get(&declared.artifact.key())
        {
            declared.artifact.version = version.clone();
        }

        declared.scope = Scope::derive(parent_scope, declared.scope);
        if self.options.compile_scope_only && declared.scope != Scope::Compile {
            return None;
        }

        let mut exclusions = inherited_exclusions.to_vec();
        exclusions.extend(declared.exclusions.iter().cloned());
        Some(Pending {
            dependency: declared,
            parent: None,
            depth,
            exclusions,
        })
    }
}

fn collection_error(tree: &DependencyTree, node: NodeIndex, source: ResolutionError) -> ResolutionError {
    ResolutionError::Collection {
        path: tree.path_to(node).to_string(),
        source: Box::new(source),
    }
}
