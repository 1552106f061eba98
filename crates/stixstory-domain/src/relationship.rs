//! Relationship module - accepted directed edges between objects

use serde::{Deserialize, Serialize};
use std::fmt;

/// An accepted, labeled, directed relationship between two objects
///
/// Edges are only ever created for a label the compatibility table permits
/// for the (source type, target type) pair. Duplicates are allowed: two
/// edges between the same pair with different labels may coexist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    /// Relationship label (e.g. "attributed-to")
    pub relationship_type: String,

    /// Source object ID
    pub source_ref: String,

    /// Target object ID
    pub target_ref: String,

    /// Justification supplied by the oracle
    pub description: String,
}

impl Relationship {
    /// Create a new relationship
    pub fn new(
        relationship_type: impl Into<String>,
        source_ref: impl Into<String>,
        target_ref: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            relationship_type: relationship_type.into(),
            source_ref: source_ref.into(),
            target_ref: target_ref.into(),
            description: description.into(),
        }
    }
}

/// Renders as `"{source_ref} {relationship_type} {target_ref}: {description}"`,
/// the line format fed to the narrative and evaluation prompts.
impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}: {}",
            self.source_ref, self.relationship_type, self.target_ref, self.description
        )
    }
}
