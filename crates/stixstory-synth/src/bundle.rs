//! STIX bundle assembly

use crate::generator::{stix_timestamp, SPEC_VERSION};
use serde::Serialize;
use stixstory_domain::{Relationship, StixObject};
use uuid::Uuid;

/// A relationship edge rendered as a STIX relationship object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelationshipObject {
    /// Always "relationship"
    #[serde(rename = "type")]
    pub object_type: &'static str,
    /// STIX version
    pub spec_version: &'static str,
    /// "relationship--<uuid>"
    pub id: String,
    /// Creation time
    pub created: String,
    /// Last modification time; equals `created`
    pub modified: String,
    /// Edge label
    pub relationship_type: String,
    /// Source object id
    pub source_ref: String,
    /// Target object id
    pub target_ref: String,
    /// Justification from the oracle
    pub description: String,
}

impl From<&Relationship> for RelationshipObject {
    fn from(edge: &Relationship) -> Self {
        let now = stix_timestamp();
        Self {
            object_type: "relationship",
            spec_version: SPEC_VERSION,
            id: format!("relationship--{}", Uuid::new_v4()),
            created: now.clone(),
            modified: now,
            relationship_type: edge.relationship_type.clone(),
            source_ref: edge.source_ref.clone(),
            target_ref: edge.target_ref.clone(),
            description: edge.description.clone(),
        }
    }
}

/// One entry of a bundle's `objects` array
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BundleEntry {
    /// A domain object
    Object(StixObject),
    /// A relationship object
    Relationship(RelationshipObject),
}

/// STIX bundle of objects followed by their relationships
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bundle {
    /// Always "bundle"
    #[serde(rename = "type")]
    pub object_type: &'static str,
    /// "bundle--<uuid>"
    pub id: String,
    /// Objects, then relationship objects
    pub objects: Vec<BundleEntry>,
}

impl Bundle {
    /// Assemble a bundle; objects keep their order, edges follow
    pub fn assemble(objects: &[StixObject], edges: &[Relationship]) -> Self {
        let entries = objects
            .iter()
            .cloned()
            .map(BundleEntry::Object)
            .chain(edges.iter().map(|e| BundleEntry::Relationship(e.into())))
            .collect();

        Self {
            object_type: "bundle",
            id: format!("bundle--{}", Uuid::new_v4()),
            objects: entries,
        }
    }

    /// Number of relationship objects
    pub fn relationship_count(&self) -> usize {
        self.objects
            .iter()
            .filter(|entry| matches!(entry, BundleEntry::Relationship(_)))
            .count()
    }
}
