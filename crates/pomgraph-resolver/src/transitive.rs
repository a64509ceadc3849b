//! Transitive closure of an artifact's dependencies.

use crate::resolver::Resolver;
use pomgraph_core::{Artifact, ArtifactIdent, Dependency, RepositoryClient, Result};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, warn};

/// One artifact in the dependency tree, with the subtrees it pulled in.
///
/// Subtrees reached twice are shared, so the tree is a DAG in memory.
#[derive(Debug)]
pub struct TransitiveNode {
    pub artifact: Arc<Artifact>,
    pub dependencies: Vec<Arc<TransitiveNode>>,
}

impl TransitiveNode {
    pub fn ident(&self) -> &ArtifactIdent {
        &self.artifact.ident
    }

    /// This subtree with every node whose `groupId:artifactId` is in
    /// `exclusions` removed, together with everything below it.
    pub fn without(self: &Arc<Self>, exclusions: &BTreeSet<String>) -> Arc<Self> {
        if exclusions.is_empty() {
            return Arc::clone(self);
        }
        prune(self, exclusions, &mut HashMap::new())
    }

    /// Visits every node below this one, depth first, once per edge.
    pub fn visit(&self, f: &mut impl FnMut(&Self)) {
        for child in &self.dependencies {
            f(child);
            child.visit(f);
        }
    }
}

fn prune(
    node: &Arc<TransitiveNode>,
    exclusions: &BTreeSet<String>,
    done: &mut HashMap<*const TransitiveNode, Arc<TransitiveNode>>,
) -> Arc<TransitiveNode> {
    if let Some(pruned) = done.get(&Arc::as_ptr(node)) {
        return Arc::clone(pruned);
    }

    let mut changed = false;
    let mut dependencies = Vec::with_capacity(node.dependencies.len());
    for child in &node.dependencies {
        if exclusions.contains(&child.ident().ga()) {
            changed = true;
            continue;
        }
        let pruned = prune(child, exclusions, done);
        changed |= !Arc::ptr_eq(&pruned, child);
        dependencies.push(pruned);
    }

    let result = if changed {
        Arc::new(TransitiveNode {
            artifact: Arc::clone(&node.artifact),
            dependencies,
        })
    } else {
        Arc::clone(node)
    };
    done.insert(Arc::as_ptr(node), Arc::clone(&result));
    result
}

/// Only compile and runtime dependencies that are not optional and fully
/// resolved are followed.
pub fn is_followed(dependency: &Dependency) -> bool {
    matches!(dependency.scope_or_default(), "compile" | "runtime")
        && !dependency.optional
        && dependency.resolved
}

enum Slot {
    /// Resolution in progress further up the current path.
    Pending,
    Done(Arc<TransitiveNode>),
}

/// Builds the tree for one top-level request.
///
/// The memo is private to the request: concurrent requests each build their
/// own and only share the artifact cache.
pub(crate) struct ClosureBuilder<'r, R> {
    resolver: &'r Resolver<R>,
    memo: HashMap<ArtifactIdent, Slot>,
}

impl<'r, R: RepositoryClient> ClosureBuilder<'r, R> {
    pub(crate) fn new(resolver: &'r Resolver<R>) -> Self {
        Self {
            resolver,
            memo: HashMap::new(),
        }
    }

    pub(crate) fn build(mut self, root: &Arc<Artifact>) -> Vec<Arc<TransitiveNode>> {
        self.memo.insert(root.ident.clone(), Slot::Pending);
        if let Some(target) = root.relocation() {
            self.memo.insert(target.clone(), Slot::Pending);
        }
        self.children(root, &BTreeSet::new())
    }

    fn children(
        &mut self,
        artifact: &Arc<Artifact>,
        exclusions: &BTreeSet<String>,
    ) -> Vec<Arc<TransitiveNode>> {
        let Some(pom) = artifact.pom_information() else {
            return Vec::new();
        };
        let repositories = &pom.raw.repositories;
        let mut nodes = Vec::new();

        for dependency in self.resolver.dependencies_of(pom) {
            let Some(ident) = dependency.ident() else {
                continue;
            };
            if exclusions.contains(&ident.ga()) || !is_followed(dependency) {
                continue;
            }

            let mut edge_exclusions = exclusions.clone();
            edge_exclusions.extend(dependency.exclusions.iter().cloned());

            match self.memo.get(&ident) {
                Some(Slot::Pending) => continue,
                Some(Slot::Done(node)) => {
                    nodes.push(node.without(&edge_exclusions));
                    continue;
                }
                None => {}
            }

            self.memo.insert(ident.clone(), Slot::Pending);

            let Some(node) = self.descend(&ident, &edge_exclusions, repositories) else {
                continue;
            };

            let key = match node.artifact.relocation() {
                Some(target) => {
                    self.memo.remove(&ident);
                    target.clone()
                }
                None => ident,
            };
            self.memo.insert(key, Slot::Done(Arc::clone(&node)));
            nodes.push(node);
        }

        nodes
    }

    /// Resolves `ident` and its subtree, retrying the whole subtree against
    /// each declared secondary repository when the default one lacks it.
    fn descend(
        &mut self,
        ident: &ArtifactIdent,
        exclusions: &BTreeSet<String>,
        repositories: &[String],
    ) -> Option<Arc<TransitiveNode>> {
        let err = match self.subtree(ident, exclusions) {
            Ok(node) => return Some(node),
            Err(err) => err,
        };

        if !err.is_not_found() {
            warn!("dropping {} from the dependency tree: {}", ident, err);
            return None;
        }

        for repository in repositories {
            let candidate = ident.with_repository(Some(repository.clone()));
            debug!("retrying {} from {}", ident, repository);
            match self.subtree(&candidate, exclusions) {
                Ok(node) => return Some(node),
                Err(err) if err.is_not_found() => {}
                Err(err) => warn!("{} from {} failed: {}", ident, repository, err),
            }
        }

        debug!("{} not found: {}", ident, err);
        None
    }

    fn subtree(
        &mut self,
        ident: &ArtifactIdent,
        exclusions: &BTreeSet<String>,
    ) -> Result<Arc<TransitiveNode>> {
        let artifact = self.resolver.resolve_pom(ident)?;
        let dependencies = self.children(&artifact, exclusions);
        Ok(Arc::new(TransitiveNode {
            artifact,
            dependencies,
        }))
    }
}
