//! Completion of one artifact's declared dependencies.
//!
//! Missing versions and scopes come from `<dependencyManagement>` entries
//! along the lookup chain (own list first, then parents, then imports);
//! coordinates are interpolated; version ranges are solved through the
//! supplied solver.

use crate::interpolate::{LookupChain, Scope, has_placeholder};
use pomgraph_core::{DEFAULT_SCOPE, Dependency, PomInformation, is_version_range};
use tracing::debug;

/// A management entry together with the POM that declares it.
struct Managed<'a> {
    entry: &'a Dependency,
    owner: Scope<'a>,
}

impl Managed<'_> {
    /// Interpolates a field of the entry. Entries inherited from parents see
    /// the requesting POM's properties; imported entries see their own POM's
    /// first.
    fn interpolate(&self, chain: &LookupChain<'_>, value: &str) -> String {
        if !has_placeholder(value) {
            return value.to_string();
        }
        if self.owner.imported {
            let own = LookupChain::new(self.owner.pom).interpolate(value);
            if !has_placeholder(&own) {
                return own;
            }
        }
        chain.interpolate(value)
    }

    fn matches(&self, chain: &LookupChain<'_>, group_id: &str, artifact_id: &str) -> bool {
        if self.entry.scope.as_deref() == Some("import") {
            return false;
        }
        match (&self.entry.group_id, &self.entry.artifact_id) {
            (Some(g), Some(a)) => {
                self.interpolate(chain, g) == group_id && self.interpolate(chain, a) == artifact_id
            }
            _ => false,
        }
    }
}

fn managed_entries<'a>(
    chain: &LookupChain<'a>,
    group_id: &str,
    artifact_id: &str,
) -> Vec<Managed<'a>> {
    chain
        .scopes()
        .iter()
        .flat_map(|owner| {
            owner
                .pom
                .raw
                .dependency_management
                .iter()
                .map(move |entry| Managed {
                    entry,
                    owner: *owner,
                })
        })
        .filter(|managed| managed.matches(chain, group_id, artifact_id))
        .collect()
}

/// Resolves every declared dependency of `pom`.
///
/// `solve_range` maps a dependency whose version is a range expression to a
/// concrete release. Dependencies without a groupId or artifactId are dropped.
pub fn resolve_dependencies<F>(pom: &PomInformation, solve_range: F) -> Vec<Dependency>
where
    F: Fn(&Dependency) -> Option<String>,
{
    let chain = LookupChain::new(pom);
    pom.raw
        .dependencies
        .iter()
        .filter_map(|declared| resolve_dependency(declared, &chain, &solve_range))
        .collect()
}

fn resolve_dependency<F>(
    declared: &Dependency,
    chain: &LookupChain<'_>,
    solve_range: &F,
) -> Option<Dependency>
where
    F: Fn(&Dependency) -> Option<String>,
{
    let (Some(group_id), Some(artifact_id)) = (&declared.group_id, &declared.artifact_id) else {
        debug!(
            "dropping dependency without coordinates in {}",
            chain.scopes()[0].pom.ident
        );
        return None;
    };

    if declared.resolved && !has_placeholder(group_id) && !has_placeholder(artifact_id) {
        return Some(if declared.version_range {
            apply_range(declared.clone(), solve_range)
        } else {
            declared.clone()
        });
    }

    let group_id = chain.interpolate(group_id);
    let artifact_id = chain.interpolate(artifact_id);
    let managed = managed_entries(chain, &group_id, &artifact_id);

    let mut dep = declared
        .clone()
        .with_group_id(Some(group_id))
        .with_artifact_id(Some(artifact_id));

    // The entry that supplies a missing version also supplies the scope.
    let supplier = match dep.version {
        Some(_) => None,
        None => managed.iter().find(|m| m.entry.version.is_some()),
    };

    let version = match (dep.version.as_deref(), supplier) {
        (Some(version), _) => Some(chain.interpolate(version)),
        (None, Some(m)) => m
            .entry
            .version
            .as_deref()
            .map(|version| m.interpolate(chain, version)),
        (None, None) => None,
    };
    if let Some(version) = version {
        dep = dep.with_version(version);
    }

    if dep.scope.is_none() {
        let scope = supplier
            .and_then(|m| m.entry.scope.clone())
            .or_else(|| managed.iter().find_map(|m| m.entry.scope.clone()))
            .unwrap_or_else(|| DEFAULT_SCOPE.to_string());
        dep = dep.with_scope(scope);
    }

    Some(finalize(dep, solve_range))
}

fn finalize<F>(dep: Dependency, solve_range: &F) -> Dependency
where
    F: Fn(&Dependency) -> Option<String>,
{
    let complete = [&dep.group_id, &dep.artifact_id, &dep.version]
        .iter()
        .all(|field| field.as_deref().is_some_and(|v| !has_placeholder(v)));

    match dep.version.as_deref() {
        Some(version) if complete && is_version_range(version) => apply_range(dep, solve_range),
        _ => dep.with_resolution(complete, false),
    }
}

fn apply_range<F>(dep: Dependency, solve_range: &F) -> Dependency
where
    F: Fn(&Dependency) -> Option<String>,
{
    match solve_range(&dep) {
        Some(version) => dep.with_version(version).with_resolution(true, true),
        None => {
            debug!(
                "no release satisfies {}:{}",
                dep.ga().unwrap_or_default(),
                dep.version.as_deref().unwrap_or_default()
            );
            dep.with_resolution(false, true)
        }
    }
}
