//! JSON summaries printed for resolved artifacts.

use indexmap::IndexMap;
use pomgraph_core::{Dependency, Result};
use pomgraph_resolver::ResolvedArtifact;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub(crate) struct DependencySummary {
    pub(crate) coordinates: String,
    pub(crate) scope: String,
    pub(crate) resolved: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub(crate) optional: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub(crate) version_range: bool,
}

impl From<&Dependency> for DependencySummary {
    fn from(dep: &Dependency) -> Self {
        let coordinates = match &dep.version {
            Some(version) => format!("{}:{}", dep.ga().unwrap_or_default(), version),
            None => dep.ga().unwrap_or_default(),
        };
        Self {
            coordinates,
            scope: dep.scope_or_default().to_string(),
            resolved: dep.resolved,
            optional: dep.optional,
            version_range: dep.version_range,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ArtifactSummary {
    pub(crate) coordinates: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) relocation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) name: Option<String>,
    pub(crate) dependencies: Vec<DependencySummary>,
    pub(crate) effective: Vec<String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub(crate) conflicts: IndexMap<String, Vec<String>>,
}

impl From<&ResolvedArtifact> for ArtifactSummary {
    fn from(resolved: &ResolvedArtifact) -> Self {
        Self {
            coordinates: resolved.ident().coordinates(),
            relocation: resolved.relocation().map(|r| r.coordinates()),
            name: resolved.pom().and_then(|p| p.raw.name.clone()),
            dependencies: resolved
                .resolved_dependencies()
                .iter()
                .map(DependencySummary::from)
                .collect(),
            effective: resolved
                .effective_transitive_dependencies
                .iter()
                .map(|a| a.ident.coordinates())
                .collect(),
            conflicts: resolved
                .transitive_conflicts
                .iter()
                .map(|(ga, idents)| {
                    (
                        ga.clone(),
                        idents.iter().map(|i| i.version.clone()).collect(),
                    )
                })
                .collect(),
        }
    }
}

impl ArtifactSummary {
    pub(crate) fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pomgraph_core::{ArtifactIdent, InMemoryRepository};
    use pomgraph_resolver::Resolver;

    fn resolved() -> ResolvedArtifact {
        let repo = InMemoryRepository::new()
            .with_pom(
                "org.example:app:1.0",
                "<project><name>App</name><dependencies>\
                 <dependency><groupId>org.example</groupId><artifactId>a</artifactId><version>1</version></dependency>\
                 <dependency><groupId>org.example</groupId><artifactId>b</artifactId><version>1</version></dependency>\
                 <dependency><groupId>org.example</groupId><artifactId>gone</artifactId><version>${nope}</version></dependency>\
                 </dependencies></project>",
            )
            .with_pom(
                "org.example:a:1",
                "<project><dependencies>\
                 <dependency><groupId>org.example</groupId><artifactId>b</artifactId><version>2</version></dependency>\
                 </dependencies></project>",
            )
            .with_pom("org.example:b:1", "<project/>")
            .with_pom("org.example:b:2", "<project/>");
        Resolver::with_defaults(repo)
            .resolve_artifact(&ArtifactIdent::new("org.example", "app", "1.0"))
            .unwrap()
    }

    #[test]
    fn test_summary_fields() {
        let summary = ArtifactSummary::from(&resolved());
        assert_eq!(summary.coordinates, "org.example:app:1.0");
        assert_eq!(summary.name.as_deref(), Some("App"));
        assert_eq!(summary.dependencies.len(), 3);
        assert!(!summary.dependencies[2].resolved);
        assert_eq!(summary.dependencies[2].coordinates, "org.example:gone:${nope}");
        assert_eq!(summary.effective, vec!["org.example:a:1", "org.example:b:1"]);
        assert_eq!(summary.conflicts["org.example:b"], vec!["2"]);
    }

    #[test]
    fn test_json_shape() {
        let json = ArtifactSummary::from(&resolved()).to_json(false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["coordinates"], "org.example:app:1.0");
        assert!(value.get("relocation").is_none());
        assert_eq!(value["dependencies"][0]["scope"], "compile");
        assert!(value["dependencies"][0].get("optional").is_none());
        assert_eq!(value["conflicts"]["org.example:b"][0], "2");
    }
}
