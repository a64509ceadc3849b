//! Artifact identities (GAV coordinates plus an optional repository).

use crate::error::{PomGraphError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Base URL of Maven Central.
pub const CENTRAL_URL: &str = "https://repo1.maven.org/maven2/";

/// A `groupId:artifactId:version` identity.
///
/// The repository the artifact is fetched from is carried along but does not
/// take part in equality or hashing: the same GAV served by two repositories
/// is the same artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactIdent {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
}

impl ArtifactIdent {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
            repository: None,
        }
    }

    /// `groupId:artifactId` key identifying the library across versions.
    pub fn ga(&self) -> String {
        format!("{}:{}", self.group_id, self.artifact_id)
    }

    pub fn coordinates(&self) -> String {
        format!("{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }

    /// The repository to fetch from, falling back to `default`.
    pub fn repository_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.repository.as_deref().unwrap_or(default)
    }

    #[must_use]
    pub fn with_group_id(&self, group_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_artifact_id(&self, artifact_id: impl Into<String>) -> Self {
        Self {
            artifact_id: artifact_id.into(),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_version(&self, version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_repository(&self, repository: Option<String>) -> Self {
        Self {
            repository,
            ..self.clone()
        }
    }
}

impl PartialEq for ArtifactIdent {
    fn eq(&self, other: &Self) -> bool {
        self.group_id == other.group_id
            && self.artifact_id == other.artifact_id
            && self.version == other.version
    }
}

impl Eq for ArtifactIdent {}

impl Hash for ArtifactIdent {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.group_id.hash(state);
        self.artifact_id.hash(state);
        self.version.hash(state);
    }
}

impl fmt::Display for ArtifactIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }
}

impl FromStr for ArtifactIdent {
    type Err = PomGraphError;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        match parts.as_slice() {
            [group, artifact, version]
                if !group.is_empty() && !artifact.is_empty() && !version.is_empty() =>
            {
                Ok(Self::new(*group, *artifact, *version))
            }
            _ => Err(PomGraphError::InvalidCoordinates {
                coordinates: s.to_string(),
            }),
        }
    }
}
