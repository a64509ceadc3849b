//! Maven POM dependency resolution.
//!
//! Given an artifact identity, [`Resolver`] fetches its POM, follows
//! relocations, attaches parent and `import`-scoped POMs, completes every
//! declared dependency (managed versions and scopes, `${...}` placeholders,
//! version ranges), then builds the transitive dependency tree and flattens
//! it into one version per library.
//!
//! # Examples
//!
//! ```
//! use pomgraph_core::{ArtifactIdent, InMemoryRepository};
//! use pomgraph_resolver::Resolver;
//!
//! let repo = InMemoryRepository::new().with_pom(
//!     "org.example:lib:1.0",
//!     "<project><dependencies><dependency>\
//!      <groupId>org.example</groupId><artifactId>util</artifactId><version>${project.version}</version>\
//!      </dependency></dependencies></project>",
//! );
//! let resolver = Resolver::with_defaults(repo);
//! let resolved = resolver
//!     .resolve_artifact(&ArtifactIdent::new("org.example", "lib", "1.0"))
//!     .unwrap();
//!
//! let dep = &resolved.resolved_dependencies()[0];
//! assert_eq!(dep.version.as_deref(), Some("1.0"));
//! assert!(dep.resolved);
//! ```

pub mod dependencies;
pub mod effective;
pub mod interpolate;
pub mod parser;
pub mod range;
pub mod resolver;
pub mod transitive;
pub mod version;

pub use effective::{EffectiveSet, effective_dependencies};
pub use interpolate::LookupChain;
pub use parser::{parse_local_pom, parse_pom};
pub use range::solve_range;
pub use resolver::{ResolvedArtifact, Resolver};
pub use transitive::TransitiveNode;
pub use version::compare_versions;
