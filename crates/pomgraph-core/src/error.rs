//! Error types shared by every pomgraph crate.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PomGraphError {
    /// The requested POM or metadata document does not exist.
    #[error("Resource not found: {url}")]
    NotFound { url: String },

    #[error("Request to '{url}' failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Request to '{url}' returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Malformed document for '{coordinates}': {message}")]
    MalformedDocument {
        coordinates: String,
        message: String,
    },

    #[error("Relocation cycle detected at '{coordinates}'")]
    RelocationCycle { coordinates: String },

    #[error("Parent cycle detected at '{coordinates}'")]
    InheritanceCycle { coordinates: String },

    #[error("Invalid Maven coordinates '{coordinates}': expected 'groupId:artifactId:version'")]
    InvalidCoordinates { coordinates: String },

    #[error("Invalid configuration: {message}")]
    Config { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PomGraphError {
    /// Returns true for failures that mean "this document does not exist"
    /// rather than "something went wrong while getting it".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn malformed(coordinates: impl Into<String>, message: impl ToString) -> Self {
        Self::MalformedDocument {
            coordinates: coordinates.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PomGraphError>;
