//! Per-kind object generators

use crate::error::SynthError;
use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use stixstory_agent::strip_code_fences;
use stixstory_domain::traits::LlmProvider;
use stixstory_domain::{ObjectKind, StixObject};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// STIX version stamped on every generated object
pub const SPEC_VERSION: &str = "2.1";

/// Strategy that produces synthetic objects of one kind
///
/// Implementations are blocking; the pool runs them off the async runtime.
pub trait ObjectGenerator: Send + Sync {
    /// The kind this generator produces
    fn kind(&self) -> ObjectKind;

    /// Produce up to `count` objects
    fn generate(&self, count: usize) -> Result<Vec<StixObject>, SynthError>;
}

/// Current UTC time as a STIX timestamp, e.g. `2024-05-01T12:00:00.000Z`
pub fn stix_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Mint a fresh `"{kind}--{uuid}"` identifier
pub fn mint_id(kind: ObjectKind) -> String {
    format!("{}--{}", kind, Uuid::new_v4())
}

/// Generator that asks the LLM for a JSON array of records
pub struct LlmObjectGenerator<L> {
    llm: Arc<L>,
    kind: ObjectKind,
}

impl<L> LlmObjectGenerator<L>
where
    L: LlmProvider,
    L::Error: std::fmt::Display,
{
    /// Create a generator for `kind` over a shared provider
    pub fn new(llm: Arc<L>, kind: ObjectKind) -> Self {
        Self { llm, kind }
    }

    fn build_prompt(&self, count: usize) -> String {
        let mut prompt = String::new();

        prompt.push_str("You are generating synthetic cyber threat intelligence data for testing.\n\n");
        prompt.push_str(&format!(
            "Generate {} distinct, realistic STIX 2.1 {} objects: {}.\n\n",
            count,
            self.kind,
            subject_hint(self.kind)
        ));
        prompt.push_str("Each object must have a \"name\" and a one-to-three sentence \"description\". ");
        prompt.push_str("You may add other STIX properties appropriate for the object type.\n\n");
        prompt.push_str("Return ONLY a JSON array of objects, for example:\n");
        prompt.push_str(r#"[{"name": "...", "description": "..."}]"#);
        prompt.push_str("\n\nNo markdown code blocks, no explanations.");

        prompt
    }
}

impl<L> ObjectGenerator for LlmObjectGenerator<L>
where
    L: LlmProvider + Send + Sync,
    L::Error: std::fmt::Display,
{
    fn kind(&self) -> ObjectKind {
        self.kind
    }

    fn generate(&self, count: usize) -> Result<Vec<StixObject>, SynthError> {
        if count == 0 {
            return Ok(Vec::new());
        }

        let response = self
            .llm
            .generate_structured(&self.build_prompt(count), RECORDS_SCHEMA)
            .map_err(|e| SynthError::Llm(e.to_string()))?;
        debug!("LLM response for {}: {}", self.kind, response);

        let records = parse_records(&response)?;
        if records.len() < count {
            warn!(
                "Requested {} {} objects, LLM returned {}",
                count,
                self.kind,
                records.len()
            );
        }

        Ok(records
            .into_iter()
            .take(count)
            .map(|record| record_to_object(self.kind, record))
            .collect())
    }
}

const RECORDS_SCHEMA: &str = r#"[{"name": "string", "description": "string"}]"#;

/// Keys the generator always sets itself
const RESERVED_KEYS: [&str; 6] = ["id", "type", "spec_version", "name", "created", "modified"];

/// Parse the LLM output into object records
///
/// Accepts a bare array or an object wrapping one array. Records that are not
/// objects, or that carry neither a name nor a description, are skipped.
pub fn parse_records(response: &str) -> Result<Vec<Map<String, Value>>, SynthError> {
    let cleaned = strip_code_fences(response);
    let value: Value = serde_json::from_str(cleaned)
        .map_err(|e| SynthError::InvalidFormat(format!("JSON parse error: {}", e)))?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(map) => map
            .into_iter()
            .find_map(|(_, v)| match v {
                Value::Array(items) => Some(items),
                _ => None,
            })
            .ok_or_else(|| SynthError::InvalidFormat("Expected a JSON array".to_string()))?,
        _ => return Err(SynthError::InvalidFormat("Expected a JSON array".to_string())),
    };

    let records: Vec<_> = items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(map) if has_text(&map, "name") || has_text(&map, "description") => {
                Some(map)
            }
            other => {
                warn!("Skipping unusable generated record: {}", other);
                None
            }
        })
        .collect();

    if records.is_empty() {
        return Err(SynthError::InvalidFormat("No usable records".to_string()));
    }
    Ok(records)
}

fn has_text(map: &Map<String, Value>, key: &str) -> bool {
    map.get(key)
        .and_then(Value::as_str)
        .is_some_and(|s| !s.trim().is_empty())
}

fn record_to_object(kind: ObjectKind, mut record: Map<String, Value>) -> StixObject {
    let name = record
        .get("name")
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    let description = record
        .remove("description")
        .and_then(|v| v.as_str().map(|s| s.trim().to_string()))
        .filter(|s| !s.is_empty());

    for key in RESERVED_KEYS {
        record.remove(key);
    }

    let now = stix_timestamp();
    let mut object = StixObject::new(mint_id(kind), kind.as_str())
        .with_property("spec_version", Value::String(SPEC_VERSION.to_string()))
        .with_property("created", Value::String(now.clone()))
        .with_property("modified", Value::String(now));
    object.properties.extend(record);
    object.name = name;
    object.description = description;
    object
}

/// Short subject description per kind, used to steer generation
fn subject_hint(kind: ObjectKind) -> &'static str {
    match kind {
        ObjectKind::AttackPattern => "adversary techniques such as spear phishing or credential dumping",
        ObjectKind::Campaign => "grouped adversarial operations with an objective",
        ObjectKind::CourseOfAction => "defensive actions that prevent or respond to attacks",
        ObjectKind::Grouping => "analyst groupings of related context",
        ObjectKind::Identity => "organizations, sectors or individuals that can be targeted or attributed",
        ObjectKind::Incident => "security incidents affecting an organization",
        ObjectKind::Indicator => "detection patterns for suspicious activity",
        ObjectKind::Infrastructure => "command and control servers, botnets or hosting used by adversaries",
        ObjectKind::IntrusionSet => "sets of adversarial behavior attributed to a common owner",
        ObjectKind::Location => "countries, regions or cities",
        ObjectKind::Malware => "ransomware, trojans, backdoors or other malicious code",
        ObjectKind::MalwareAnalysis => "results of static or dynamic malware analysis",
        ObjectKind::Note => "analyst notes adding context",
        ObjectKind::ObservedData => "observed network or host activity",
        ObjectKind::Opinion => "analyst assessments of other intelligence",
        ObjectKind::Report => "threat reports covering actors and campaigns",
        ObjectKind::ThreatActor => "nation-state, crime syndicate, hacktivist or insider threat actors",
        ObjectKind::Tool => "legitimate software abused by adversaries",
        ObjectKind::Vulnerability => "software weaknesses with CVE-style names",
    }
}
