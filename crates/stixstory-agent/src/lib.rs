//! Stixstory Relationship Agent
//!
//! Infers plausible relationships between synthetic CTI objects, narrates the
//! threat story they tell, and scores its own coherence.
//!
//! # Architecture
//!
//! ```text
//! Objects → Candidate Enumerator → Oracle (per pair) → Edges
//!         → Narrative Generator → Evaluator → RunResult
//! ```
//!
//! # Key Features
//!
//! - **Table-gated inference**: a pair is only ever sent to the oracle when the
//!   compatibility table permits a label for its ordered type pair, and only a
//!   permitted label can become an edge
//! - **Failure isolation**: one pair's failed call never affects another; the
//!   pipeline always returns a result
//! - **Bounded concurrency**: oracle calls fan out under a semaphore and are
//!   re-linearized into enumeration order
//! - **Tolerant parsing**: code-fenced or prose-wrapped JSON is accepted
//!
//! # Example Usage
//!
//! ```no_run
//! use stixstory_agent::{AgentConfig, RelationshipAgent};
//! use stixstory_domain::{CompatibilityTable, StixObject};
//! use stixstory_llm::MockProvider;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = MockProvider::new(r#"{"relationship_type": "attributed-to", "justification": "x"}"#);
//! let agent = RelationshipAgent::new(llm, CompatibilityTable::stix_default(), AgentConfig::default())?;
//!
//! let objects = vec![
//!     StixObject::new("threat-actor--1", "threat-actor"),
//!     StixObject::new("identity--2", "identity"),
//! ];
//! let result = agent.run(&objects).await;
//!
//! println!("Edges: {}", result.edges.len());
//! println!("Story: {}", result.narrative);
//! println!("Score: {}", result.evaluation.score);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod agent;
mod candidates;
mod config;
mod engine;
mod error;
mod evaluation;
mod invoke;
mod narrative;
mod oracle;
mod parser;
mod prompt;
mod types;


pub use agent::RelationshipAgent;
pub use candidates::enumerate_candidates;
pub use config::{compatibility_from_toml, load_compatibility_table, AgentConfig};
pub use engine::{InferenceEngine, InferenceReport};
pub use error::AgentError;
pub use evaluation::Evaluator;
pub use narrative::{render_edges, NarrativeGenerator};
pub use oracle::{classify, PairOutcome, RelationshipOracle};
pub use parser::{
    parse_evaluation, parse_relationship, strip_code_fences, ParseOutcome, RelationshipAnswer,
    NO_RELATIONSHIP,
};
pub use types::{
    Candidate, Evaluation, ObjectSummary, RunMetadata, RunResult, EVALUATION_FALLBACK,
    STORY_FALLBACK,
};
