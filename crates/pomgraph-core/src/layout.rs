//! Maven repository path layout.

use crate::ident::ArtifactIdent;

/// `org.example` + `lib` → `org/example/lib`
pub fn artifact_base_path(group_id: &str, artifact_id: &str) -> String {
    let mut path = group_id
        .split('.')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/");
    path.push('/');
    path.push_str(&urlencoding::encode(artifact_id));
    path
}

/// `org/example/lib/1.0/lib-1.0.pom`
pub fn pom_path(ident: &ArtifactIdent) -> String {
    let artifact = urlencoding::encode(&ident.artifact_id);
    let version = urlencoding::encode(&ident.version);
    format!(
        "{}/{version}/{artifact}-{version}.pom",
        artifact_base_path(&ident.group_id, &ident.artifact_id)
    )
}

/// `org/example/lib/maven-metadata.xml`
pub fn metadata_path(group_id: &str, artifact_id: &str) -> String {
    format!(
        "{}/maven-metadata.xml",
        artifact_base_path(group_id, artifact_id)
    )
}

/// POM URL in the identity's own repository, or in `default_base`.
pub fn pom_url(ident: &ArtifactIdent, default_base: &str) -> String {
    join(ident.repository_or(default_base), &pom_path(ident))
}

pub fn metadata_url(base: &str, group_id: &str, artifact_id: &str) -> String {
    join(base, &metadata_path(group_id, artifact_id))
}

fn join(base: &str, path: &str) -> String {
    format!("{}/{path}", base.trim_end_matches('/'))
}
