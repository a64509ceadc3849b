//! Artifacts and the information bundles attached to them.

use crate::ident::ArtifactIdent;
use crate::model::{Dependency, RawPomFeatures};
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

/// Resolved POM metadata for one artifact.
#[derive(Debug)]
pub struct PomInformation {
    /// Identity whose document produced `raw`; the relocation target when the
    /// requested identity was relocated.
    pub ident: ArtifactIdent,
    pub raw: RawPomFeatures,
    pub parent: Option<Arc<Artifact>>,
    pub imports: Vec<Arc<Artifact>>,
    pub relocation: Option<ArtifactIdent>,
    resolved_dependencies: OnceLock<Vec<Dependency>>,
}

impl PomInformation {
    pub fn new(ident: ArtifactIdent, raw: RawPomFeatures) -> Self {
        Self {
            ident,
            raw,
            parent: None,
            imports: Vec::new(),
            relocation: None,
            resolved_dependencies: OnceLock::new(),
        }
    }

    /// Parent POM information, when the parent resolved.
    pub fn parent_pom(&self) -> Option<&Self> {
        self.parent.as_deref().and_then(Artifact::pom_information)
    }

    pub fn resolved_dependencies(&self) -> Option<&[Dependency]> {
        self.resolved_dependencies.get().map(Vec::as_slice)
    }

    /// Returns the resolved dependency list, computing it on first access.
    pub fn resolved_dependencies_or_init(
        &self,
        init: impl FnOnce() -> Vec<Dependency>,
    ) -> &[Dependency] {
        self.resolved_dependencies.get_or_init(init)
    }
}

/// Entry of the central index describing one published file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexPackage {
    pub packaging: String,
    pub classifier: Option<String>,
    pub size: u64,
    pub sha1: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexInformation {
    pub name: Option<String>,
    pub last_modified: i64,
    pub packages: Vec<IndexPackage>,
}

/// Bytecode summary of the artifact's jar.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JarInformation {
    pub code_size: u64,
    pub class_count: usize,
    pub method_count: usize,
    pub field_count: usize,
    /// Package name to class names.
    pub packages: BTreeMap<String, Vec<String>>,
}

/// An identity plus up to three independently filled information bundles.
///
/// Each bundle can be set once; later writers never replace it.
#[derive(Debug)]
pub struct Artifact {
    pub ident: ArtifactIdent,
    index: OnceLock<IndexInformation>,
    pom: OnceLock<PomInformation>,
    jar: OnceLock<JarInformation>,
}

impl Artifact {
    pub fn new(ident: ArtifactIdent) -> Self {
        Self {
            ident,
            index: OnceLock::new(),
            pom: OnceLock::new(),
            jar: OnceLock::new(),
        }
    }

    pub fn with_pom(ident: ArtifactIdent, pom: PomInformation) -> Self {
        let artifact = Self::new(ident);
        let _ = artifact.pom.set(pom);
        artifact
    }

    pub fn with_index(ident: ArtifactIdent, index: IndexInformation) -> Self {
        let artifact = Self::new(ident);
        let _ = artifact.index.set(index);
        artifact
    }

    pub fn with_jar(ident: ArtifactIdent, jar: JarInformation) -> Self {
        let artifact = Self::new(ident);
        let _ = artifact.jar.set(jar);
        artifact
    }

    pub fn pom_information(&self) -> Option<&PomInformation> {
        self.pom.get()
    }

    pub fn index_information(&self) -> Option<&IndexInformation> {
        self.index.get()
    }

    pub fn jar_information(&self) -> Option<&JarInformation> {
        self.jar.get()
    }

    pub fn has_pom_information(&self) -> bool {
        self.pom.get().is_some()
    }

    pub fn relocation(&self) -> Option<&ArtifactIdent> {
        self.pom_information().and_then(|p| p.relocation.as_ref())
    }

    /// Moves every bundle of `other` that is still missing here into `self`.
    pub fn absorb(&self, other: Self) {
        if let Some(index) = other.index.into_inner() {
            let _ = self.index.set(index);
        }
        if let Some(pom) = other.pom.into_inner() {
            let _ = self.pom.set(pom);
        }
        if let Some(jar) = other.jar.into_inner() {
            let _ = self.jar.set(jar);
        }
    }
}
