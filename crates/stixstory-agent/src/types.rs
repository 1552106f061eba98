//! Request and result types for the agent pipeline

use serde::{Deserialize, Serialize};
use stixstory_domain::{Relationship, StixObject};

/// Fallback narrative when the story call fails
pub const STORY_FALLBACK: &str = "Unable to generate story due to an error.";

/// Fallback justification when the evaluation call fails
pub const EVALUATION_FALLBACK: &str = "Unable to evaluate due to an error.";

/// The fields of an object the oracle gets to see
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectSummary {
    /// Object ID
    pub id: String,

    /// Type tag
    #[serde(rename = "type")]
    pub object_type: String,

    /// Name, or "Unknown"
    pub name: String,

    /// Description, or "No description available"
    pub description: String,
}

impl From<&StixObject> for ObjectSummary {
    fn from(obj: &StixObject) -> Self {
        Self {
            id: obj.id.clone(),
            object_type: obj.object_type.clone(),
            name: obj.display_name().to_string(),
            description: obj.display_description().to_string(),
        }
    }
}

/// An ordered (source, target) pair eligible for inference
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Position in enumeration order
    pub index: usize,

    /// Source object
    pub source: ObjectSummary,

    /// Target object
    pub target: ObjectSummary,

    /// Labels the compatibility table permits, never empty
    pub permitted: Vec<String>,
}

/// Self-assessed quality of the inferred story
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Coherence score in [0, 10]
    pub score: f64,

    /// Why the score was given
    pub justification: String,
}

impl Evaluation {
    /// Zero score with the standard failure justification
    pub fn fallback() -> Self {
        Self {
            score: 0.0,
            justification: EVALUATION_FALLBACK.to_string(),
        }
    }
}

/// Counters describing one run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Objects with both an id and a type
    pub objects_considered: usize,

    /// Candidate pairs sent to the oracle
    pub candidates_evaluated: usize,

    /// Pairs whose oracle call failed (transport, timeout, parse)
    pub oracle_failures: usize,

    /// Pairs where the oracle named a label outside the permitted list
    pub rejected_labels: usize,

    /// Pairs where the oracle declined to relate the objects
    pub no_relationship: usize,

    /// Wall-clock time of the whole run
    pub processing_time_ms: u64,

    /// Model behind the oracle
    pub model_name: String,
}

/// Everything one pipeline invocation produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    /// Accepted edges, in candidate-enumeration order
    pub edges: Vec<Relationship>,

    /// Free-text threat narrative
    pub narrative: String,

    /// Self-evaluation of edges and narrative
    pub evaluation: Evaluation,

    /// Run counters
    pub metadata: RunMetadata,
}
