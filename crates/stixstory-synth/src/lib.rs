//! Stixstory Synthetic Generation
//!
//! Produces synthetic CTI objects per kind and packages objects plus
//! inferred relationships as a STIX bundle.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use stixstory_domain::ObjectKind;
//! use stixstory_llm::MockProvider;
//! use stixstory_synth::{Bundle, GenerationRequest, GeneratorRegistry, SynthConfig, Synthesizer};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = Arc::new(MockProvider::new(r#"[{"name": "Silent Griffin", "description": "..."}]"#));
//! let synth = Synthesizer::new(GeneratorRegistry::with_llm(llm), SynthConfig::default())?;
//!
//! let report = synth
//!     .generate_all(&[GenerationRequest::new(ObjectKind::ThreatActor, 1)])
//!     .await?;
//! let bundle = Bundle::assemble(&report.objects, &[]);
//! println!("{}", serde_json::to_string_pretty(&bundle)?);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod bundle;
mod config;
mod error;
mod generator;
mod pool;
mod registry;

pub use bundle::{Bundle, BundleEntry, RelationshipObject};
pub use config::SynthConfig;
pub use error::SynthError;
pub use generator::{
    mint_id, parse_records, stix_timestamp, LlmObjectGenerator, ObjectGenerator, SPEC_VERSION,
};
pub use pool::{
    GenerationFailure, GenerationOutcome, GenerationReport, GenerationRequest, Synthesizer,
};
pub use registry::GeneratorRegistry;
