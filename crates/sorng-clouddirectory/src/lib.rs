//! # sorng-clouddirectory – Amazon Cloud Directory REST client
//!
//! Talks to the Cloud Directory REST action layer: a tree of objects linked
//! by parent/child links and typed links, with schema-defined facets. Every
//! request is authenticated with AWS Signature Version 4.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │  bootstrap.rs / pagination.rs                    │
//! │  ├── ensure_facet · ensure_object_path · …       │
//! │  └── list_all_* walkers over NextToken           │
//! ├──────────────────────────────────────────────────┤
//! │  DirectoryClient  (client.rs)                    │
//! │  ├── one async fn per REST action                │
//! │  ├── routing: method / path / partition          │
//! │  │            (operation.rs)                     │
//! │  └── JSON documents  (payload.rs, model.rs)      │
//! ├──────────────────────────────────────────────────┤
//! │  SigV4Signer  (signing.rs)                       │
//! │  └── hmac-sha256 / canonical request / signing   │
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! ## Request headers
//!
//! | Header                    | Value                                    |
//! |---------------------------|------------------------------------------|
//! | `host`                    | service host (signed)                    |
//! | `x-amz-date`              | request timestamp (signed)               |
//! | `x-amz-data-partition`    | directory ARN or schema ARN (signed)     |
//! | `x-amz-consistency-level` | `SERIALIZABLE` on read-after-write reads |
//! | `Authorization`           | SigV4 credential, signed headers, signature |
//!
//! ## Example
//!
//! ```no_run
//! use sorng_clouddirectory::{DirectoryClient, DirectoryConfig, ObjectSelector};
//!
//! # async fn run() -> sorng_clouddirectory::DirectoryResult<()> {
//! let config = DirectoryConfig::new(
//!     "AKIAEXAMPLE",
//!     "secret",
//!     "us-west-2",
//!     "arn:aws:clouddirectory:us-west-2:123456789012:directory/AXQX",
//!     "arn:aws:clouddirectory:us-west-2:123456789012:directory/AXQX/schema/people/1.0",
//! );
//! let client = DirectoryClient::new(config)?;
//! let users = ObjectSelector::from("/users");
//! for child in client.list_all_object_children(&users, None).await? {
//!     println!("{} -> {}", child.link_name, child.object_identifier);
//! }
//! # Ok(())
//! # }
//! ```

// ── Sub-modules ─────────────────────────────────────────────────────────

pub mod error;
pub mod config;
pub mod signing;
pub mod model;
pub mod payload;
pub mod operation;
pub mod client;
pub mod pagination;
pub mod bootstrap;

// ── Re-exports for ergonomic access ─────────────────────────────────────

pub use client::{DirectoryClient, DirectoryResponse};
pub use config::DirectoryConfig;
pub use error::{DirectoryError, DirectoryResult};
pub use model::{
    AttributeAction, AttributeKey, AttributeKeyAndValue, AttributeType, AttributeUpdate,
    BatchOperation, CreatedObject, DetachedObject, DirectoryDescription, Facet, FacetAttribute,
    ObjectChild, ObjectInformation, ObjectSelector, RequiredBehavior, TypedLinkFacet,
    TypedLinkSpecifier,
};
pub use operation::Operation;
pub use pagination::{paginate, Page};
pub use signing::{Credential, SigV4Signer, SignatureHeaders};
