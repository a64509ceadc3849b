//! Repository clients exercised against a local HTTP server and fixture files.

use pomgraph_core::{
    Artifact, ArtifactCache, ArtifactIdent, HttpRepository, PomInformation, RawPomFeatures,
    RepositoryClient, ResolverConfig, parse_release_list,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn load_fixture(name: &str) -> Vec<u8> {
    std::fs::read(fixture_path(name)).unwrap_or_else(|e| panic!("failed to read {name}: {e}"))
}

fn repository(server: &mockito::Server) -> HttpRepository {
    let config = ResolverConfig {
        central_url: format!("{}/maven2/", server.url()),
        ..Default::default()
    };
    HttpRepository::new(&config).unwrap()
}

#[test]
fn test_release_list_fixture() {
    let versions =
        parse_release_list(&load_fixture("maven-metadata.xml"), "com.google.guava:guava").unwrap();
    assert_eq!(versions.len(), 5);
    assert_eq!(versions.first().map(String::as_str), Some("31.1-jre"));
    assert_eq!(versions.last().map(String::as_str), Some("33.0.0-jre"));
}

#[test]
fn test_release_list_over_http() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/maven2/com/google/guava/guava/maven-metadata.xml")
        .with_status(200)
        .with_body(load_fixture("maven-metadata.xml"))
        .create();

    let versions = repository(&server)
        .fetch_release_list("com.google.guava", "guava")
        .unwrap();
    assert_eq!(versions[2], "32.0.0-jre");
    mock.assert();
}

#[test]
fn test_malformed_metadata_over_http() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("GET", "/maven2/org/example/lib/maven-metadata.xml")
        .with_status(200)
        .with_body("<metadata><versioning></metadata>")
        .create();

    let err = repository(&server)
        .fetch_release_list("org.example", "lib")
        .unwrap_err();
    assert!(!err.is_not_found());
    assert!(err.to_string().contains("org.example:lib"));
}

#[test]
fn test_redirects_are_followed() {
    let mut server = mockito::Server::new();
    let target = format!("{}/mirror/org/example/lib/1.0/lib-1.0.pom", server.url());
    let _redirect = server
        .mock("GET", "/maven2/org/example/lib/1.0/lib-1.0.pom")
        .with_status(301)
        .with_header("location", &target)
        .create();
    let moved = server
        .mock("GET", "/mirror/org/example/lib/1.0/lib-1.0.pom")
        .with_status(200)
        .with_body("<project/>")
        .create();

    let body = repository(&server)
        .fetch_pom(&ArtifactIdent::new("org.example", "lib", "1.0"))
        .unwrap();
    assert_eq!(&body[..], b"<project/>");
    moved.assert();
}

#[test]
fn test_unreachable_host_is_transport_error() {
    let config = ResolverConfig {
        central_url: "http://127.0.0.1:1/maven2/".into(),
        connect_timeout_ms: 200,
        ..Default::default()
    };
    let err = HttpRepository::new(&config)
        .unwrap()
        .fetch_pom(&ArtifactIdent::new("org.example", "lib", "1.0"))
        .unwrap_err();
    assert!(matches!(err, pomgraph_core::PomGraphError::Transport { .. }));
}

#[test]
fn test_config_fixture() {
    let config = ResolverConfig::load(&fixture_path("pomgraph.json")).unwrap();
    assert_eq!(config.central_url, "https://mirror.example.org/maven2/");
    assert!(!config.resolve_transitives);
    assert_eq!(config.read_timeout_ms, 10_000);
    assert_eq!(config.connect_timeout_ms, 2_000);

    let repo = HttpRepository::new(&config).unwrap();
    assert_eq!(repo.base_url(), "https://mirror.example.org/maven2/");
}

#[test]
fn test_cache_shared_between_threads() {
    let cache = Arc::new(ArtifactCache::new());
    std::thread::scope(|scope| {
        for i in 0..4 {
            let cache = Arc::clone(&cache);
            scope.spawn(move || {
                for v in 0..50 {
                    let ident = ArtifactIdent::new("org.example", "lib", format!("{}", v % 10));
                    let info = PomInformation::new(
                        ident.clone(),
                        RawPomFeatures {
                            name: Some(format!("writer-{i}")),
                            ..Default::default()
                        },
                    );
                    let stored = cache.insert_or_merge(Artifact::with_pom(ident, info));
                    assert!(stored.has_pom_information());
                }
            });
        }
    });
    assert_eq!(cache.len(), 10);
}
