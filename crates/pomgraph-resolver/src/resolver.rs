//! The resolution pipeline: POM loading with relocation, parents and imports,
//! dependency completion, transitive closure and the effective set.

use crate::dependencies;
use crate::effective::{EffectiveSet, effective_dependencies};
use crate::interpolate::{LookupChain, has_placeholder};
use crate::parser::{parse_local_pom, parse_pom};
use crate::range::solve_range;
use crate::transitive::{ClosureBuilder, TransitiveNode};
use dashmap::DashMap;
use indexmap::IndexMap;
use pomgraph_core::{
    Artifact, ArtifactCache, ArtifactIdent, Dependency, PomGraphError, PomInformation,
    RawPomFeatures, RepositoryClient, ResolverConfig, Result,
};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Batch runs report progress every this many identities.
const PROGRESS_INTERVAL: usize = 10_000;

/// Outcome of one top-level resolution request.
///
/// `artifact` is the shared cached artifact. The tree, effective set and
/// conflicts belong to this request only.
#[derive(Debug)]
pub struct ResolvedArtifact {
    pub artifact: Arc<Artifact>,
    pub all_transitive_dependencies: Vec<Arc<TransitiveNode>>,
    pub effective_transitive_dependencies: Vec<Arc<Artifact>>,
    pub transitive_conflicts: IndexMap<String, Vec<ArtifactIdent>>,
}

impl ResolvedArtifact {
    fn direct(artifact: Arc<Artifact>) -> Self {
        Self {
            artifact,
            all_transitive_dependencies: Vec::new(),
            effective_transitive_dependencies: Vec::new(),
            transitive_conflicts: IndexMap::new(),
        }
    }

    pub fn ident(&self) -> &ArtifactIdent {
        &self.artifact.ident
    }

    pub fn pom(&self) -> Option<&PomInformation> {
        self.artifact.pom_information()
    }

    pub fn resolved_dependencies(&self) -> &[Dependency] {
        self.pom()
            .and_then(PomInformation::resolved_dependencies)
            .unwrap_or_default()
    }

    pub fn relocation(&self) -> Option<&ArtifactIdent> {
        self.artifact.relocation()
    }
}

/// Resolves artifacts against a repository, sharing parsed POMs through an
/// [`ArtifactCache`].
///
/// A `Resolver` is `Sync` and meant to be shared by worker threads, one
/// top-level request per thread.
#[derive(Debug)]
pub struct Resolver<R> {
    repository: R,
    cache: Arc<ArtifactCache>,
    config: ResolverConfig,
    releases: DashMap<String, Arc<Vec<String>>>,
}

impl<R: RepositoryClient> Resolver<R> {
    pub fn new(repository: R, cache: Arc<ArtifactCache>, config: ResolverConfig) -> Self {
        Self {
            repository,
            cache,
            config,
            releases: DashMap::new(),
        }
    }

    pub fn with_defaults(repository: R) -> Self {
        Self::new(
            repository,
            Arc::new(ArtifactCache::new()),
            ResolverConfig::default(),
        )
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn cache(&self) -> &Arc<ArtifactCache> {
        &self.cache
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Runs the full pipeline for `ident`.
    ///
    /// Only failures loading the requested POM itself are returned; missing
    /// parents, imports and transitive dependencies degrade the result.
    pub fn resolve_artifact(&self, ident: &ArtifactIdent) -> Result<ResolvedArtifact> {
        let artifact = self.resolve_pom(ident)?;
        Ok(self.complete(artifact))
    }

    /// Resolves many identities one after another, skipping failures.
    pub fn resolve_artifacts(&self, idents: &[ArtifactIdent]) -> Vec<ResolvedArtifact> {
        let mut collected = Vec::with_capacity(idents.len());

        for (index, ident) in idents.iter().enumerate() {
            match self.resolve_artifact(ident) {
                Ok(resolved) => collected.push(resolved),
                Err(e) if e.is_not_found() => debug!("skipping {}: {}", ident, e),
                Err(e) => error!("failed to resolve {}: {}", ident, e),
            }
            let processed = index + 1;
            if processed % PROGRESS_INTERVAL == 0 {
                info!("processed {} artifacts, {} resolved", processed, collected.len());
            }
        }

        info!(
            "processed {} artifacts, collected {}",
            idents.len(),
            collected.len()
        );
        collected
    }

    /// Resolves a project's own POM document, which is not published anywhere.
    ///
    /// The project identity falls back to the parent's groupId and version.
    /// The result is not cached.
    pub fn resolve_local_pom(&self, data: &[u8], source: &str) -> Result<ResolvedArtifact> {
        let raw = parse_local_pom(data, source)?;
        let ident = local_ident(&raw).ok_or_else(|| PomGraphError::InvalidCoordinates {
            coordinates: source.to_string(),
        })?;
        debug!("resolving local project {} from {}", ident, source);

        let mut in_progress = HashSet::from([ident.clone()]);
        let info = self.assemble(ident.clone(), raw, None, &mut in_progress);
        Ok(self.complete(Arc::new(Artifact::with_pom(ident, info))))
    }

    pub fn resolve_local_pom_file(&self, path: &Path) -> Result<ResolvedArtifact> {
        let data = std::fs::read(path)?;
        self.resolve_local_pom(&data, &path.display().to_string())
    }

    /// Loads the POM of `ident` with its relocation, parent and import chains
    /// resolved, going through the cache.
    pub fn resolve_pom(&self, ident: &ArtifactIdent) -> Result<Arc<Artifact>> {
        self.load(ident, &mut HashSet::new())
    }

    /// Completes the declared dependencies of `pom` without touching its
    /// stored list.
    pub fn resolve_dependencies(&self, pom: &PomInformation) -> Vec<Dependency> {
        dependencies::resolve_dependencies(pom, |dep| self.resolve_version_range(dep))
    }

    /// The resolved dependency list stored on `pom`, computed on first use.
    pub fn dependencies_of<'p>(&self, pom: &'p PomInformation) -> &'p [Dependency] {
        pom.resolved_dependencies_or_init(|| self.resolve_dependencies(pom))
    }

    /// Picks the release satisfying the range in `dependency.version`.
    ///
    /// Release lists always come from the default repository.
    pub fn resolve_version_range(&self, dependency: &Dependency) -> Option<String> {
        let (Some(group_id), Some(artifact_id), Some(range)) = (
            dependency.group_id.as_deref(),
            dependency.artifact_id.as_deref(),
            dependency.version.as_deref(),
        ) else {
            return None;
        };

        let releases = self.release_list(group_id, artifact_id)?;
        solve_range(range, &releases)
    }

    fn release_list(&self, group_id: &str, artifact_id: &str) -> Option<Arc<Vec<String>>> {
        let key = format!("{group_id}:{artifact_id}");
        if let Some(cached) = self.releases.get(&key) {
            return Some(Arc::clone(cached.value()));
        }

        match self.repository.fetch_release_list(group_id, artifact_id) {
            Ok(list) => {
                let list = Arc::new(list);
                self.releases.insert(key, Arc::clone(&list));
                Some(list)
            }
            Err(e) => {
                debug!("no release list for {}: {}", key, e);
                None
            }
        }
    }

    fn complete(&self, artifact: Arc<Artifact>) -> ResolvedArtifact {
        if let Some(pom) = artifact.pom_information() {
            self.dependencies_of(pom);
        }
        if !self.config.resolve_transitives {
            return ResolvedArtifact::direct(artifact);
        }

        let tree = ClosureBuilder::new(self).build(&artifact);
        let EffectiveSet {
            dependencies,
            conflicts,
        } = effective_dependencies(&tree);

        ResolvedArtifact {
            artifact,
            all_transitive_dependencies: tree,
            effective_transitive_dependencies: dependencies,
            transitive_conflicts: conflicts,
        }
    }

    fn load(
        &self,
        ident: &ArtifactIdent,
        in_progress: &mut HashSet<ArtifactIdent>,
    ) -> Result<Arc<Artifact>> {
        if let Some(cached) = self.cache.lookup(ident)
            && cached.has_pom_information()
        {
            return Ok(cached);
        }
        if !in_progress.insert(ident.clone()) {
            return Err(PomGraphError::InheritanceCycle {
                coordinates: ident.coordinates(),
            });
        }

        let loaded = self.fetch_features(ident).map(|(terminal, raw, relocation)| {
            self.assemble(terminal, raw, relocation, in_progress)
        });
        in_progress.remove(ident);

        let info = loaded?;
        Ok(self
            .cache
            .insert_or_merge(Artifact::with_pom(ident.clone(), info)))
    }

    /// Fetches and parses `ident`, following relocations to the terminal
    /// document.
    fn fetch_features(
        &self,
        ident: &ArtifactIdent,
    ) -> Result<(ArtifactIdent, RawPomFeatures, Option<ArtifactIdent>)> {
        let mut current = ident.clone();
        let mut visited = HashSet::new();
        let mut relocation = None;

        loop {
            if !visited.insert(current.clone()) {
                return Err(PomGraphError::RelocationCycle {
                    coordinates: current.coordinates(),
                });
            }

            let data = self.repository.fetch_pom(&current)?;
            let raw = parse_pom(&data, &current)?;
            match raw.relocation {
                Some(target) => {
                    debug!("{} relocated to {}", current, target);
                    relocation = Some(target.clone());
                    current = target;
                }
                None => return Ok((current, raw, relocation)),
            }
        }
    }

    /// Builds the POM information for parsed features, attaching the parent
    /// and imported POMs. Their failures are logged and leave them out.
    fn assemble(
        &self,
        ident: ArtifactIdent,
        raw: RawPomFeatures,
        relocation: Option<ArtifactIdent>,
        in_progress: &mut HashSet<ArtifactIdent>,
    ) -> PomInformation {
        let mut info = PomInformation::new(ident, raw);
        info.relocation = relocation;

        if let Some(reference) = info.raw.parent.clone() {
            let parent = self.parent_ident(&info, &reference);
            info.parent = self.load_optional(&parent, "parent", &info.ident, in_progress);
        }

        let imports = self.import_idents(&info);
        for import in imports {
            if let Some(artifact) = self.load_optional(&import, "import", &info.ident, in_progress)
            {
                info.imports.push(artifact);
            }
        }

        info
    }

    fn parent_ident(&self, child: &PomInformation, reference: &ArtifactIdent) -> ArtifactIdent {
        let mut parent = reference.with_repository(child.ident.repository.clone());
        if has_placeholder(&parent.version) {
            // CI-friendly versions such as ${revision} are defined by the child.
            parent.version = LookupChain::new(child).interpolate(&parent.version);
        }
        parent
    }

    /// Identities of the `import`-scoped management entries, in declaration
    /// order. Only their versions are interpolated.
    fn import_idents(&self, info: &PomInformation) -> Vec<ArtifactIdent> {
        let chain = LookupChain::new(info);
        info.raw
            .dependency_management
            .iter()
            .filter(|entry| entry.scope.as_deref() == Some("import"))
            .filter_map(|entry| {
                let group_id = entry.group_id.as_deref()?;
                let artifact_id = entry.artifact_id.as_deref()?;
                let version = chain.interpolate(entry.version.as_deref()?);
                if has_placeholder(&version) {
                    debug!(
                        "{}: unresolved import {}:{}:{}",
                        info.ident, group_id, artifact_id, version
                    );
                    return None;
                }
                Some(
                    ArtifactIdent::new(group_id, artifact_id, version)
                        .with_repository(info.ident.repository.clone()),
                )
            })
            .collect()
    }

    fn load_optional(
        &self,
        ident: &ArtifactIdent,
        role: &str,
        owner: &ArtifactIdent,
        in_progress: &mut HashSet<ArtifactIdent>,
    ) -> Option<Arc<Artifact>> {
        match self.load(ident, in_progress) {
            Ok(artifact) => Some(artifact),
            Err(e) if e.is_not_found() => {
                debug!("{} of {} not found: {}", role, owner, e);
                None
            }
            Err(e) => {
                warn!("ignoring {} {} of {}: {}", role, ident, owner, e);
                None
            }
        }
    }
}

fn local_ident(raw: &RawPomFeatures) -> Option<ArtifactIdent> {
    let parent = raw.parent.as_ref();
    let group_id = raw
        .group_id
        .clone()
        .or_else(|| parent.map(|p| p.group_id.clone()))?;
    let artifact_id = raw.artifact_id.clone()?;
    let version = raw
        .version
        .clone()
        .or_else(|| parent.map(|p| p.version.clone()))?;
    Some(ArtifactIdent::new(group_id, artifact_id, version))
}
