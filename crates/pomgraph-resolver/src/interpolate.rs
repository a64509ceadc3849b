//! `${...}` placeholder interpolation.
//!
//! Placeholders are looked up along an ordered chain of POMs: the owning POM,
//! then its parents (nearest first), then the `import`-scoped POMs declared
//! along that line, the owning POM's first and each in declaration order. In each POM the well-known Maven synonyms (`project.version`,
//! `parent.groupId`, ...) are tried before its `<properties>`. The first hit
//! wins; unknown placeholders are left in place.

use pomgraph_core::{ArtifactIdent, PomInformation};
use std::collections::HashSet;

/// Extra substitution passes allowed for properties defined in terms of
/// other properties.
const MAX_NESTED_PROPERTIES: usize = 8;

/// One POM in a lookup chain.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    pub pom: &'a PomInformation,
    /// Reached through an `import` rather than through inheritance.
    pub imported: bool,
}

impl Scope<'_> {
    /// Value of a built-in Maven synonym evaluated against this POM.
    pub fn synonym(&self, key: &str) -> Option<String> {
        let pom = self.pom;
        let parent = pom.raw.parent.as_ref();
        match key {
            "project.version" | "pom.version" | "version" | "pom.currentVersion" => {
                Some(pom.ident.version.clone())
            }
            "project.groupId" | "pom.groupId" | "groupId" => Some(pom.ident.group_id.clone()),
            "project.artifactId" | "pom.artifactId" | "artifactId" => {
                Some(pom.ident.artifact_id.clone())
            }
            "parent.version" | "project.parent.version" | "pom.parent.version" => {
                parent.map(|p| p.version.clone())
            }
            "parent.groupId" | "project.parent.groupId" | "pom.parent.groupId" => {
                parent.map(|p| p.group_id.clone())
            }
            "parent.artifactId" | "project.parent.artifactId" | "pom.parent.artifactId" => {
                parent.map(|p| p.artifact_id.clone())
            }
            "project.name" | "pom.name" => pom.raw.name.clone(),
            "project.packaging" | "pom.packaging" => pom.raw.packaging.clone(),
            "project.url" | "pom.url" => pom.raw.url.clone(),
            _ => None,
        }
    }

    pub fn property(&self, key: &str) -> Option<String> {
        self.pom.raw.properties.get(key).cloned()
    }

    fn lookup(&self, key: &str) -> Option<String> {
        self.synonym(key).or_else(|| self.property(key))
    }
}

/// The ordered list of POMs consulted for placeholders and managed versions.
#[derive(Debug, Clone)]
pub struct LookupChain<'a> {
    scopes: Vec<Scope<'a>>,
}

impl<'a> LookupChain<'a> {
    pub fn new(root: &'a PomInformation) -> Self {
        let mut scopes = Vec::new();
        let mut visited = HashSet::new();
        collect(root, false, &mut visited, &mut scopes);
        Self { scopes }
    }

    pub fn scopes(&self) -> &[Scope<'a>] {
        &self.scopes
    }

    /// Resolves a single placeholder key, without the surrounding `${}`.
    pub fn lookup(&self, key: &str) -> Option<String> {
        self.scopes.iter().find_map(|scope| scope.lookup(key))
    }

    /// Replaces every resolvable placeholder in `value`.
    ///
    /// Substituted values are scanned again, a bounded number of times.
    pub fn interpolate(&self, value: &str) -> String {
        let mut current = value.to_string();
        for _ in 0..self.scopes.len() + MAX_NESTED_PROPERTIES {
            if !has_placeholder(&current) {
                break;
            }
            let next = self.substitute(&current);
            if next == current {
                break;
            }
            current = next;
        }
        current
    }

    fn substitute(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(start) = rest.find("${") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let Some(end) = after.find('}') else {
                out.push_str(&rest[start..]);
                return out;
            };

            let key = &after[..end];
            match self.lookup(key) {
                Some(value) => out.push_str(&value),
                None => {
                    out.push_str("${");
                    out.push_str(key);
                    out.push('}');
                }
            }
            rest = &after[end + 1..];
        }

        out.push_str(rest);
        out
    }
}

/// Pushes `pom` and its whole parent line, then the imports declared along
/// that line (nearest POM first), each expanded the same way.
fn collect<'a>(
    pom: &'a PomInformation,
    imported: bool,
    visited: &mut HashSet<&'a ArtifactIdent>,
    scopes: &mut Vec<Scope<'a>>,
) {
    let mut lineage = Vec::new();
    let mut current = Some(pom);
    while let Some(pom) = current {
        if !visited.insert(&pom.ident) {
            break;
        }
        scopes.push(Scope { pom, imported });
        lineage.push(pom);
        current = pom.parent_pom();
    }

    for pom in lineage {
        for import in &pom.imports {
            if let Some(imported_pom) = import.pom_information() {
                collect(imported_pom, true, visited, scopes);
            }
        }
    }
}

pub fn has_placeholder(value: &str) -> bool {
    value.contains("${")
}
