//! Core abstractions for pomgraph.
//!
//! This crate holds the vocabulary shared by the resolver and its callers:
//! artifact identities, declared POM content, the concurrent artifact cache,
//! and the repository clients (HTTP and in-memory) that supply POM documents
//! and release lists.

pub mod artifact;
pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod ident;
pub mod layout;
pub mod metadata;
pub mod model;
pub mod repository;

pub use artifact::{Artifact, IndexInformation, IndexPackage, JarInformation, PomInformation};
pub use cache::ArtifactCache;
pub use config::ResolverConfig;
pub use error::{PomGraphError, Result};
pub use http::HttpRepository;
pub use ident::{ArtifactIdent, CENTRAL_URL};
pub use metadata::parse_release_list;
pub use model::{DEFAULT_SCOPE, Dependency, License, RawPomFeatures, is_version_range};
pub use repository::{InMemoryRepository, RepositoryClient};
