//! Blocking HTTP access to Maven repositories.

use crate::config::ResolverConfig;
use crate::error::{PomGraphError, Result};
use crate::ident::ArtifactIdent;
use crate::layout;
use crate::metadata::parse_release_list;
use crate::repository::RepositoryClient;
use bytes::Bytes;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use std::time::Duration;

/// Repository client backed by `reqwest`'s blocking client.
///
/// Redirects are followed by the client. Release lists always come from the
/// configured default repository.
#[derive(Debug, Clone)]
pub struct HttpRepository {
    client: Client,
    base_url: String,
}

impl HttpRepository {
    pub fn new(config: &ResolverConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .timeout(Duration::from_millis(config.read_timeout_ms))
            .build()
            .map_err(|e| PomGraphError::Transport {
                url: config.central_url.clone(),
                source: Box::new(e),
            })?;

        Ok(Self {
            client,
            base_url: config.central_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get(&self, url: &str) -> Result<Bytes> {
        tracing::trace!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| transport_error(url, e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(PomGraphError::NotFound {
                url: url.to_string(),
            });
        }
        if !status.is_success() {
            return Err(PomGraphError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.bytes().map_err(|e| transport_error(url, e))
    }
}

fn transport_error(url: &str, err: reqwest::Error) -> PomGraphError {
    PomGraphError::Transport {
        url: url.to_string(),
        source: Box::new(err),
    }
}

impl RepositoryClient for HttpRepository {
    fn fetch_pom(&self, ident: &ArtifactIdent) -> Result<Bytes> {
        self.get(&layout::pom_url(ident, &self.base_url))
    }

    fn fetch_release_list(&self, group_id: &str, artifact_id: &str) -> Result<Vec<String>> {
        let url = layout::metadata_url(&self.base_url, group_id, artifact_id);
        let data = self.get(&url)?;
        parse_release_list(&data, &format!("{group_id}:{artifact_id}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repository(server: &mockito::Server) -> HttpRepository {
        let config = ResolverConfig {
            central_url: format!("{}/maven2/", server.url()),
            ..Default::default()
        };
        HttpRepository::new(&config).unwrap()
    }

    #[test]
    fn test_fetch_pom() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/maven2/org/example/lib/1.0/lib-1.0.pom")
            .with_status(200)
            .with_body("<project/>")
            .create();

        let repo = repository(&server);
        let body = repo
            .fetch_pom(&ArtifactIdent::new("org.example", "lib", "1.0"))
            .unwrap();
        assert_eq!(&body[..], b"<project/>");
        mock.assert();
    }

    #[test]
    fn test_fetch_pom_not_found() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/maven2/org/example/missing/1.0/missing-1.0.pom")
            .with_status(404)
            .create();

        let err = repository(&server)
            .fetch_pom(&ArtifactIdent::new("org.example", "missing", "1.0"))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_fetch_pom_server_error() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/maven2/org/example/lib/1.0/lib-1.0.pom")
            .with_status(503)
            .create();

        let err = repository(&server)
            .fetch_pom(&ArtifactIdent::new("org.example", "lib", "1.0"))
            .unwrap_err();
        assert!(matches!(err, PomGraphError::HttpStatus { status: 503, .. }));
    }

    #[test]
    fn test_fetch_pom_from_identity_repository() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/releases/org/example/lib/1.0/lib-1.0.pom")
            .with_status(200)
            .with_body("<project/>")
            .create();

        let config = ResolverConfig {
            central_url: "http://127.0.0.1:1/unused/".into(),
            ..Default::default()
        };
        let repo = HttpRepository::new(&config).unwrap();
        let ident = ArtifactIdent::new("org.example", "lib", "1.0")
            .with_repository(Some(format!("{}/releases/", server.url())));

        assert!(repo.fetch_pom(&ident).is_ok());
        mock.assert();
    }

    #[test]
    fn test_fetch_release_list() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/maven2/org/example/lib/maven-metadata.xml")
            .with_status(200)
            .with_header("content-type", "application/xml")
            .with_body(
                "<metadata><versioning><versions>\
                 <version>1.0</version><version>1.1</version>\
                 </versions></versioning></metadata>",
            )
            .create();

        let versions = repository(&server)
            .fetch_release_list("org.example", "lib")
            .unwrap();
        assert_eq!(versions, vec!["1.0", "1.1"]);
    }

    #[test]
    fn test_sends_user_agent() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/maven2/org/example/lib/1.0/lib-1.0.pom")
            .match_header(
                "user-agent",
                mockito::Matcher::Regex("^pomgraph/".to_string()),
            )
            .with_status(200)
            .with_body("<project/>")
            .create();

        repository(&server)
            .fetch_pom(&ArtifactIdent::new("org.example", "lib", "1.0"))
            .unwrap();
        mock.assert();
    }
}
