//! Flattening of a dependency tree into one version per library.

use crate::transitive::TransitiveNode;
use indexmap::IndexMap;
use pomgraph_core::{Artifact, ArtifactIdent};
use std::collections::VecDeque;
use std::sync::Arc;

/// The effective dependency set of one artifact.
#[derive(Debug, Default)]
pub struct EffectiveSet {
    /// One artifact per `groupId:artifactId`, in breadth-first discovery order.
    pub dependencies: Vec<Arc<Artifact>>,
    /// For each `groupId:artifactId` met more than once, every identity that
    /// lost to the first one, in encounter order.
    pub conflicts: IndexMap<String, Vec<ArtifactIdent>>,
}

/// Walks the tree breadth first. The first occurrence of a library wins and
/// is expanded; later occurrences are recorded as conflicts and not expanded.
pub fn effective_dependencies(roots: &[Arc<TransitiveNode>]) -> EffectiveSet {
    let mut winners: IndexMap<String, Arc<Artifact>> = IndexMap::new();
    let mut conflicts: IndexMap<String, Vec<ArtifactIdent>> = IndexMap::new();
    let mut queue: VecDeque<&Arc<TransitiveNode>> = roots.iter().collect();

    while let Some(node) = queue.pop_front() {
        let key = node.ident().ga();
        if winners.contains_key(&key) {
            conflicts
                .entry(key)
                .or_default()
                .push(node.ident().clone());
            continue;
        }
        winners.insert(key, Arc::clone(&node.artifact));
        queue.extend(node.dependencies.iter());
    }

    EffectiveSet {
        dependencies: winners.into_values().collect(),
        conflicts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(coordinates: &str, dependencies: Vec<Arc<TransitiveNode>>) -> Arc<TransitiveNode> {
        Arc::new(TransitiveNode {
            artifact: Arc::new(Artifact::new(coordinates.parse().unwrap())),
            dependencies,
        })
    }

    fn idents(set: &EffectiveSet) -> Vec<String> {
        set.dependencies.iter().map(|a| a.ident.to_string()).collect()
    }

    #[test]
    fn test_nearest_occurrence_wins() {
        // root -> a -> c:2, root -> c:1 (shallower, discovered first)
        let roots = vec![
            node("x:a:1", vec![node("x:c:2", vec![])]),
            node("x:c:1", vec![]),
        ];
        let set = effective_dependencies(&roots);
        assert_eq!(idents(&set), vec!["x:a:1", "x:c:1"]);
        assert_eq!(set.conflicts["x:c"], vec!["x:c:2".parse::<ArtifactIdent>().unwrap()]);
    }

    #[test]
    fn test_conflicting_subtree_not_expanded() {
        let roots = vec![
            node("x:lib:1", vec![]),
            node("x:b:1", vec![node("x:lib:2", vec![node("x:only-below:1", vec![])])]),
        ];
        let set = effective_dependencies(&roots);
        assert_eq!(idents(&set), vec!["x:lib:1", "x:b:1"]);
        assert!(!set.conflicts.contains_key("x:only-below"));
    }

    #[test]
    fn test_repeated_version_is_recorded() {
        let shared = node("x:shared:1", vec![]);
        let roots = vec![
            node("x:a:1", vec![Arc::clone(&shared)]),
            node("x:b:1", vec![shared]),
        ];
        let set = effective_dependencies(&roots);
        assert_eq!(set.dependencies.len(), 3);
        assert_eq!(set.conflicts["x:shared"].len(), 1);
    }

    #[test]
    fn test_conflicts_keep_encounter_order() {
        let roots = vec![
            node("x:z:1", vec![]),
            node("x:a:1", vec![node("x:z:3", vec![])]),
            node("x:b:1", vec![node("x:z:2", vec![])]),
        ];
        let set = effective_dependencies(&roots);
        let versions: Vec<&str> = set.conflicts["x:z"]
            .iter()
            .map(|i| i.version.as_str())
            .collect();
        assert_eq!(versions, vec!["3", "2"]);
    }

    #[test]
    fn test_empty_tree() {
        let set = effective_dependencies(&[]);
        assert!(set.dependencies.is_empty());
        assert!(set.conflicts.is_empty());
    }
}
