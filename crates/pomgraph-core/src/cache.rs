//! Process-wide artifact store shared by concurrent resolution calls.

use crate::artifact::Artifact;
use crate::ident::ArtifactIdent;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;

/// Concurrent identity → artifact map.
///
/// Entries are created on the first insert for an identity and never removed.
/// Inserting for an identity that already exists merges the new bundles into
/// the existing artifact under the entry lock, so a reader never observes a
/// half-merged artifact and no update is lost.
#[derive(Debug, Default)]
pub struct ArtifactCache {
    entries: DashMap<ArtifactIdent, Arc<Artifact>>,
}

impl ArtifactCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, ident: &ArtifactIdent) -> Option<Arc<Artifact>> {
        self.entries.get(ident).map(|entry| Arc::clone(entry.value()))
    }

    /// Stores `artifact`, or merges its bundles into the cached one.
    ///
    /// Returns the artifact that is now cached for the identity.
    pub fn insert_or_merge(&self, artifact: Artifact) -> Arc<Artifact> {
        match self.entries.entry(artifact.ident.clone()) {
            Entry::Occupied(entry) => {
                let existing = Arc::clone(entry.get());
                existing.absorb(artifact);
                existing
            }
            Entry::Vacant(entry) => {
                let artifact = Arc::new(artifact);
                entry.insert(Arc::clone(&artifact));
                artifact
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::{IndexInformation, JarInformation, PomInformation};
    use crate::model::RawPomFeatures;
    use std::thread;

    fn ident() -> ArtifactIdent {
        ArtifactIdent::new("org.example", "lib", "1.0")
    }

    #[test]
    fn test_lookup_miss() {
        let cache = ArtifactCache::new();
        assert!(cache.lookup(&ident()).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_insert_then_lookup() {
        let cache = ArtifactCache::new();
        let stored = cache.insert_or_merge(Artifact::with_pom(
            ident(),
            PomInformation::new(ident(), RawPomFeatures::default()),
        ));
        let found = cache.lookup(&ident()).unwrap();
        assert!(Arc::ptr_eq(&stored, &found));
        assert!(found.has_pom_information());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_merge_keeps_single_entry() {
        let cache = ArtifactCache::new();
        let first = cache.insert_or_merge(Artifact::with_index(ident(), IndexInformation::default()));
        let second = cache.insert_or_merge(Artifact::with_jar(ident(), JarInformation::default()));

        assert!(Arc::ptr_eq(&first, &second));
        assert!(second.index_information().is_some());
        assert!(second.jar_information().is_some());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_lookup_ignores_repository() {
        let cache = ArtifactCache::new();
        cache.insert_or_merge(Artifact::new(ident()));
        let elsewhere = ident().with_repository(Some("https://repo.example.org/".into()));
        assert!(cache.lookup(&elsewhere).is_some());
    }

    #[test]
    fn test_concurrent_inserts_converge() {
        let cache = Arc::new(ArtifactCache::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    let pom = PomInformation::new(
                        ident(),
                        RawPomFeatures {
                            name: Some(format!("writer-{i}")),
                            ..Default::default()
                        },
                    );
                    cache.insert_or_merge(Artifact::with_pom(ident(), pom))
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(cache.len(), 1);
        let winner = results[0].pom_information().unwrap().raw.name.clone();
        for artifact in &results {
            assert!(Arc::ptr_eq(artifact, &results[0]));
            assert_eq!(artifact.pom_information().unwrap().raw.name, winner);
        }
    }
}
