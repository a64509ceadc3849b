//! Repository access used by the resolver.

use crate::error::{PomGraphError, Result};
use crate::ident::ArtifactIdent;
use crate::layout;
use bytes::Bytes;
use dashmap::{DashMap, DashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Source of POM documents and release lists.
///
/// Calls block the current thread. Timeouts, retries, and redirects are the
/// implementation's business.
pub trait RepositoryClient: Send + Sync {
    /// Fetches the POM for `ident`, from its own repository when one is set.
    ///
    /// A missing document is reported as [`PomGraphError::NotFound`].
    fn fetch_pom(&self, ident: &ArtifactIdent) -> Result<Bytes>;

    /// Published versions of `group_id:artifact_id`, oldest first.
    fn fetch_release_list(&self, group_id: &str, artifact_id: &str) -> Result<Vec<String>>;
}

impl<T: RepositoryClient + ?Sized> RepositoryClient for Arc<T> {
    fn fetch_pom(&self, ident: &ArtifactIdent) -> Result<Bytes> {
        (**self).fetch_pom(ident)
    }

    fn fetch_release_list(&self, group_id: &str, artifact_id: &str) -> Result<Vec<String>> {
        (**self).fetch_release_list(group_id, artifact_id)
    }
}

type PomKey = (String, Option<String>);

/// Repository held entirely in memory.
///
/// POMs are keyed by coordinates and repository URL, so the same GAV can be
/// absent from the default repository and present in a secondary one.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    poms: DashMap<PomKey, Bytes>,
    releases: DashMap<String, Vec<String>>,
    broken: DashSet<PomKey>,
    pom_fetches: AtomicUsize,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(ident: &ArtifactIdent) -> PomKey {
        (ident.coordinates(), ident.repository.clone())
    }

    pub fn insert_pom(&self, ident: &ArtifactIdent, document: impl Into<Bytes>) {
        self.poms.insert(Self::key(ident), document.into());
    }

    pub fn insert_releases<I, S>(&self, group_id: &str, artifact_id: &str, versions: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.releases.insert(
            format!("{group_id}:{artifact_id}"),
            versions.into_iter().map(Into::into).collect(),
        );
    }

    /// Makes every fetch of `ident` fail with a transport error.
    pub fn insert_failure(&self, ident: &ArtifactIdent) {
        self.broken.insert(Self::key(ident));
    }

    #[must_use]
    pub fn with_pom(self, coordinates: &str, document: &str) -> Self {
        match coordinates.parse::<ArtifactIdent>() {
            Ok(ident) => self.insert_pom(&ident, document.to_owned()),
            Err(e) => tracing::warn!("ignoring in-memory POM: {}", e),
        }
        self
    }

    #[must_use]
    pub fn with_releases(self, group_id: &str, artifact_id: &str, versions: &[&str]) -> Self {
        self.insert_releases(group_id, artifact_id, versions.iter().copied());
        self
    }

    /// Number of `fetch_pom` calls served so far, hits and misses alike.
    pub fn pom_fetches(&self) -> usize {
        self.pom_fetches.load(Ordering::Relaxed)
    }
}

impl RepositoryClient for InMemoryRepository {
    fn fetch_pom(&self, ident: &ArtifactIdent) -> Result<Bytes> {
        self.pom_fetches.fetch_add(1, Ordering::Relaxed);
        let key = Self::key(ident);
        let url = layout::pom_url(ident, "memory://");

        if self.broken.contains(&key) {
            return Err(PomGraphError::Transport {
                url,
                source: Box::new(std::io::Error::from(std::io::ErrorKind::ConnectionReset)),
            });
        }

        self.poms
            .get(&key)
            .map(|entry| entry.value().clone())
            .ok_or(PomGraphError::NotFound { url })
    }

    fn fetch_release_list(&self, group_id: &str, artifact_id: &str) -> Result<Vec<String>> {
        self.releases
            .get(&format!("{group_id}:{artifact_id}"))
            .map(|entry| entry.value().clone())
            .ok_or_else(|| PomGraphError::NotFound {
                url: layout::metadata_url("memory://", group_id, artifact_id),
            })
    }
}
