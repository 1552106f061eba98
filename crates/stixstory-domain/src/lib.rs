//! Stixstory Domain Layer
//!
//! Core vocabulary shared by every other crate in the workspace. It defines the
//! typed intelligence objects that flow through the pipeline, the directed
//! relationship edges inferred between them, the static compatibility table
//! that decides which edges may exist at all, and the trait seam for the
//! external reasoning service.
//!
//! ## Key Concepts
//!
//! - **Typed Object**: a record with a stable `id` and a `type` tag
//! - **Object Kind**: the closed vocabulary of CTI object tags
//! - **Relationship**: an accepted, labeled, directed edge between two ids
//! - **Compatibility Table**: (source type, target type) → permitted labels
//!
//! ## Architecture
//!
//! - Pure data and lookups, no I/O
//! - Infrastructure implementations (LLM backends, HTTP) live in other crates
//! - Trait definitions for all external interactions

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod compatibility;
pub mod object;
pub mod relationship;
pub mod traits;

// Re-exports for convenience
pub use compatibility::CompatibilityTable;
pub use object::{ObjectKind, StixObject};
pub use relationship::Relationship;
