//! Object module - typed intelligence records and their kind vocabulary

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Placeholder used in prompts when an object carries no name
pub const UNKNOWN_NAME: &str = "Unknown";

/// Placeholder used in prompts when an object carries no description
pub const NO_DESCRIPTION: &str = "No description available";

/// Closed vocabulary of CTI object kinds
///
/// Every kind the generator can produce or the compatibility table can
/// reference. Tags follow the STIX 2.1 spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObjectKind {
    /// Adversary tactics, techniques and procedures
    AttackPattern,
    /// Grouping of adversarial behaviours over time
    Campaign,
    /// Recommendation to prevent or respond to an attack
    CourseOfAction,
    /// Shared-context collection of objects
    Grouping,
    /// Individual, organization or group
    Identity,
    /// Security incident
    Incident,
    /// Detection pattern
    Indicator,
    /// Systems and services used by an adversary or defender
    Infrastructure,
    /// Grouped adversarial behaviours attributed to a single organization
    IntrusionSet,
    /// Geographic location
    Location,
    /// Malicious code
    Malware,
    /// Result of analysing a malware instance
    MalwareAnalysis,
    /// Analyst annotation
    Note,
    /// Raw observed cyber data
    ObservedData,
    /// Assessment of correctness of another object
    Opinion,
    /// Collection of threat intelligence on a topic
    Report,
    /// Adversary acting with malicious intent
    ThreatActor,
    /// Legitimate software usable by adversaries
    Tool,
    /// Software flaw
    Vulnerability,
}

impl ObjectKind {
    /// All kinds, in tag order
    pub const ALL: [ObjectKind; 19] = [
        ObjectKind::AttackPattern,
        ObjectKind::Campaign,
        ObjectKind::CourseOfAction,
        ObjectKind::Grouping,
        ObjectKind::Identity,
        ObjectKind::Incident,
        ObjectKind::Indicator,
        ObjectKind::Infrastructure,
        ObjectKind::IntrusionSet,
        ObjectKind::Location,
        ObjectKind::Malware,
        ObjectKind::MalwareAnalysis,
        ObjectKind::Note,
        ObjectKind::ObservedData,
        ObjectKind::Opinion,
        ObjectKind::Report,
        ObjectKind::ThreatActor,
        ObjectKind::Tool,
        ObjectKind::Vulnerability,
    ];

    /// Get the STIX type tag
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::AttackPattern => "attack-pattern",
            ObjectKind::Campaign => "campaign",
            ObjectKind::CourseOfAction => "course-of-action",
            ObjectKind::Grouping => "grouping",
            ObjectKind::Identity => "identity",
            ObjectKind::Incident => "incident",
            ObjectKind::Indicator => "indicator",
            ObjectKind::Infrastructure => "infrastructure",
            ObjectKind::IntrusionSet => "intrusion-set",
            ObjectKind::Location => "location",
            ObjectKind::Malware => "malware",
            ObjectKind::MalwareAnalysis => "malware-analysis",
            ObjectKind::Note => "note",
            ObjectKind::ObservedData => "observed-data",
            ObjectKind::Opinion => "opinion",
            ObjectKind::Report => "report",
            ObjectKind::ThreatActor => "threat-actor",
            ObjectKind::Tool => "tool",
            ObjectKind::Vulnerability => "vulnerability",
        }
    }

    /// Parse a kind from its STIX type tag
    ///
    /// Returns `None` for tags outside the vocabulary.
    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.as_str() == tag)
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed intelligence object
///
/// The pipeline only reads `id`, `object_type`, `name` and `description`.
/// Any other field is carried through untouched in `properties` so the
/// exporting layer can emit the full record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StixObject {
    /// Stable unique identifier (e.g. "threat-actor--<uuid>")
    #[serde(default)]
    pub id: String,

    /// Type tag, normally one of [`ObjectKind`]'s tags
    #[serde(rename = "type", default)]
    pub object_type: String,

    /// Human-readable name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Free-text description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Remaining fields, opaque to the pipeline
    #[serde(flatten)]
    pub properties: Map<String, Value>,
}

impl StixObject {
    /// Create an object with only an id and type
    pub fn new(id: impl Into<String>, object_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            object_type: object_type.into(),
            name: None,
            description: None,
            properties: Map::new(),
        }
    }

    /// Set the name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attach an opaque property
    pub fn with_property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    /// Whether the object carries both an id and a type tag
    pub fn is_identifiable(&self) -> bool {
        !self.id.trim().is_empty() && !self.object_type.trim().is_empty()
    }

    /// The kind, if the type tag is in the vocabulary
    pub fn kind(&self) -> Option<ObjectKind> {
        ObjectKind::parse(&self.object_type)
    }

    /// Name, or the "Unknown" placeholder
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(UNKNOWN_NAME)
    }

    /// Description, or the "No description available" placeholder
    pub fn display_description(&self) -> &str {
        self.description.as_deref().unwrap_or(NO_DESCRIPTION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_round_trip_tags() {
        for kind in ObjectKind::ALL {
            assert_eq!(ObjectKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(ObjectKind::parse("sighting"), None);
        assert_eq!(ObjectKind::parse("Threat-Actor"), None);
    }

    #[test]
    fn test_kind_serde_uses_tag() {
        let json = serde_json::to_string(&ObjectKind::MalwareAnalysis).unwrap();
        assert_eq!(json, "\"malware-analysis\"");
        let kind: ObjectKind = serde_json::from_str("\"intrusion-set\"").unwrap();
        assert_eq!(kind, ObjectKind::IntrusionSet);
    }

    #[test]
    fn test_placeholders() {
        let obj = StixObject::new("a", "threat-actor");
        assert_eq!(obj.display_name(), "Unknown");
        assert_eq!(obj.display_description(), "No description available");

        let obj = obj.with_name("Silent Griffin").with_description("Espionage");
        assert_eq!(obj.display_name(), "Silent Griffin");
        assert_eq!(obj.display_description(), "Espionage");
    }

    #[test]
    fn test_identifiable() {
        assert!(StixObject::new("a", "tool").is_identifiable());
        assert!(!StixObject::new("", "tool").is_identifiable());
        assert!(!StixObject::new("a", "  ").is_identifiable());
    }

    #[test]
    fn test_extra_fields_survive_deserialization() {
        let value = json!({
            "id": "malware--1",
            "type": "malware",
            "name": "Venom",
            "is_family": true,
            "aliases": ["V1"]
        });

        let obj: StixObject = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(obj.id, "malware--1");
        assert_eq!(obj.object_type, "malware");
        assert_eq!(obj.kind(), Some(ObjectKind::Malware));
        assert_eq!(obj.description, None);
        assert_eq!(obj.properties.get("is_family"), Some(&json!(true)));

        let back = serde_json::to_value(&obj).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn test_missing_id_deserializes_empty() {
        let obj: StixObject = serde_json::from_value(json!({"type": "tool"})).unwrap();
        assert!(!obj.is_identifiable());
    }
}
