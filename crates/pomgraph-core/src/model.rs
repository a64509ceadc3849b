//! Declared POM content: dependencies, licenses, and the raw feature set.

use crate::ident::ArtifactIdent;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// Scope applied when neither the declaration nor any management entry has one.
pub const DEFAULT_SCOPE: &str = "compile";

/// Returns true when a version string is a Maven range expression.
pub fn is_version_range(version: &str) -> bool {
    version.contains(['[', ']', '(', ')', ','])
}

/// One dependency declaration, at some stage of resolution.
///
/// Values are never mutated in place; each resolution step produces a new,
/// more complete copy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Dependency {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
    pub scope: Option<String>,
    /// `groupId:artifactId` keys excluded below this edge.
    pub exclusions: BTreeSet<String>,
    pub optional: bool,
    pub resolved: bool,
    pub version_range: bool,
}

impl Dependency {
    pub fn new(group_id: impl Into<String>, artifact_id: impl Into<String>) -> Self {
        Self {
            group_id: Some(group_id.into()),
            artifact_id: Some(artifact_id.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_group_id(self, group_id: Option<String>) -> Self {
        Self { group_id, ..self }
    }

    #[must_use]
    pub fn with_artifact_id(self, artifact_id: Option<String>) -> Self {
        Self {
            artifact_id,
            ..self
        }
    }

    #[must_use]
    pub fn with_version(self, version: impl Into<String>) -> Self {
        Self {
            version: Some(version.into()),
            ..self
        }
    }

    #[must_use]
    pub fn with_scope(self, scope: impl Into<String>) -> Self {
        Self {
            scope: Some(scope.into()),
            ..self
        }
    }

    #[must_use]
    pub fn with_optional(self, optional: bool) -> Self {
        Self { optional, ..self }
    }

    #[must_use]
    pub fn with_exclusion(mut self, ga: impl Into<String>) -> Self {
        self.exclusions.insert(ga.into());
        self
    }

    #[must_use]
    pub fn with_resolution(self, resolved: bool, version_range: bool) -> Self {
        Self {
            resolved,
            version_range,
            ..self
        }
    }

    /// Applies the declaration-time classification: a dependency is resolved
    /// when it has a placeholder-free version and an explicit scope.
    #[must_use]
    pub fn classified(self) -> Self {
        let resolved = self.scope.is_some()
            && self
                .version
                .as_deref()
                .is_some_and(|v| !v.contains("${"));
        let version_range = resolved && self.version.as_deref().is_some_and(is_version_range);
        self.with_resolution(resolved, version_range)
    }

    pub fn ga(&self) -> Option<String> {
        match (&self.group_id, &self.artifact_id) {
            (Some(g), Some(a)) => Some(format!("{g}:{a}")),
            _ => None,
        }
    }

    /// The concrete identity, once group, artifact, and version are known.
    pub fn ident(&self) -> Option<ArtifactIdent> {
        match (&self.group_id, &self.artifact_id, &self.version) {
            (Some(g), Some(a), Some(v)) => Some(ArtifactIdent::new(g, a, v)),
            _ => None,
        }
    }

    pub fn scope_or_default(&self) -> &str {
        self.scope.as_deref().unwrap_or(DEFAULT_SCOPE)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct License {
    pub name: Option<String>,
    pub url: Option<String>,
}

/// Literal, uninterpolated content of one POM document.
///
/// When `relocation` is set the document is a redirect and every other field
/// is left empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RawPomFeatures {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
    pub parent: Option<ArtifactIdent>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub packaging: Option<String>,
    pub inception_year: Option<String>,
    pub properties: HashMap<String, String>,
    pub dependencies: Vec<Dependency>,
    pub dependency_management: Vec<Dependency>,
    pub licenses: Vec<License>,
    pub repositories: Vec<String>,
    pub relocation: Option<ArtifactIdent>,
}

impl RawPomFeatures {
    pub fn relocated(target: ArtifactIdent) -> Self {
        Self {
            relocation: Some(target),
            ..Self::default()
        }
    }
}
