//! Relationship compatibility table
//!
//! Maps an ordered (source type, target type) pair to the relationship
//! labels that may connect them. The table is directional: an entry for
//! (A, B) says nothing about (B, A). A missing entry and an empty label
//! list both mean no relationship is structurally permitted.
//!
//! The table is built once at startup and passed explicitly to whatever
//! needs it. It has no mutating methods after construction.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Immutable (source type, target type) → permitted labels lookup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompatibilityTable {
    entries: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

impl CompatibilityTable {
    /// Create an empty table
    ///
    /// An empty table permits nothing. The agent refuses to start with one.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the labels permitted from `source_type` to `target_type`
    ///
    /// Builder-style; used while assembling a table before it is shared.
    pub fn with_entry<I, S>(mut self, source_type: &str, target_type: &str, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries
            .entry(source_type.to_string())
            .or_default()
            .insert(
                target_type.to_string(),
                labels.into_iter().map(Into::into).collect(),
            );
        self
    }

    /// Labels permitted for the ordered pair, in table order
    ///
    /// Returns an empty slice when the pair has no entry.
    pub fn permitted(&self, source_type: &str, target_type: &str) -> &[String] {
        self.entries
            .get(source_type)
            .and_then(|targets| targets.get(target_type))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether at least one label is permitted for the ordered pair
    pub fn allows(&self, source_type: &str, target_type: &str) -> bool {
        !self.permitted(source_type, target_type).is_empty()
    }

    /// Number of ordered type pairs with at least one permitted label
    pub fn pair_count(&self) -> usize {
        self.entries
            .values()
            .flat_map(|targets| targets.values())
            .filter(|labels| !labels.is_empty())
            .count()
    }

    /// True when no type pair permits any label
    pub fn is_empty(&self) -> bool {
        self.pair_count() == 0
    }

    /// The built-in STIX 2.1 relationship map
    pub fn stix_default() -> Self {
        let rows: &[(&str, &[(&str, &[&str])])] = &[
            (
                "threat-actor",
                &[
                    ("identity", &["attributed-to", "impersonates", "compromises", "targets"]),
                    ("attack-pattern", &["uses", "creates", "modifies"]),
                    ("malware", &["uses", "creates", "modifies"]),
                    ("tool", &["uses", "creates", "modifies"]),
                    ("vulnerability", &["targets", "discovers", "exploits"]),
                    ("infrastructure", &["uses", "controls", "maintains"]),
                    ("campaign", &["initiates", "leads", "participates-in"]),
                    ("intrusion-set", &["associated-with", "part-of"]),
                ],
            ),
            (
                "identity",
                &[
                    ("threat-actor", &["targets", "mitigates"]),
                    ("campaign", &["targets", "mitigates"]),
                    ("vulnerability", &["owns", "mitigates"]),
                    ("infrastructure", &["owns", "uses"]),
                ],
            ),
            (
                "malware",
                &[
                    ("vulnerability", &["exploits", "targets"]),
                    ("tool", &["uses", "drops"]),
                    ("attack-pattern", &["uses", "implements"]),
                    ("campaign", &["used-by", "associated-with"]),
                    ("threat-actor", &["created-by", "used-by"]),
                    ("infrastructure", &["uses", "hosted-on", "communicates-with"]),
                ],
            ),
            (
                "indicator",
                &[
                    ("campaign", &["indicates", "attributed-to"]),
                    ("malware", &["indicates", "attributed-to"]),
                    ("threat-actor", &["indicates", "attributed-to"]),
                    ("tool", &["indicates", "attributed-to"]),
                    ("intrusion-set", &["indicates", "attributed-to"]),
                    ("attack-pattern", &["indicates"]),
                ],
            ),
            (
                "campaign",
                &[
                    ("threat-actor", &["attributed-to", "targets"]),
                    ("intrusion-set", &["attributed-to", "uses"]),
                    ("identity", &["targets"]),
                    ("vulnerability", &["targets", "exploits"]),
                    ("tool", &["uses"]),
                    ("malware", &["uses", "delivers"]),
                ],
            ),
            (
                "intrusion-set",
                &[
                    ("campaign", &["consists-of", "attributed-to"]),
                    ("threat-actor", &["attributed-to", "compromises"]),
                    ("attack-pattern", &["uses"]),
                    ("malware", &["uses"]),
                    ("tool", &["uses"]),
                    ("infrastructure", &["uses", "compromises"]),
                ],
            ),
            (
                "attack-pattern",
                &[
                    ("malware", &["delivers", "uses"]),
                    ("identity", &["targets"]),
                    ("vulnerability", &["exploits", "targets"]),
                    ("tool", &["uses"]),
                ],
            ),
            (
                "tool",
                &[
                    ("threat-actor", &["used-by"]),
                    ("malware", &["delivers", "drops"]),
                    ("vulnerability", &["exploits", "targets"]),
                ],
            ),
            (
                "course-of-action",
                &[
                    ("indicator", &["investigates", "mitigates"]),
                    ("observed-data", &["based-on"]),
                    ("attack-pattern", &["mitigates"]),
                    ("malware", &["remediates", "prevents"]),
                    ("vulnerability", &["remediates", "mitigates"]),
                    ("tool", &["mitigates"]),
                ],
            ),
            (
                "location",
                &[
                    ("identity", &["located-at"]),
                    ("threat-actor", &["located-at"]),
                    ("campaign", &["originates-from"]),
                    ("malware", &["originates-from"]),
                    ("intrusion-set", &["originates-from"]),
                    ("attack-pattern", &["targets"]),
                    ("tool", &["targets"]),
                    ("infrastructure", &["located-at"]),
                ],
            ),
            (
                "malware-analysis",
                &[(
                    "malware",
                    &["characterizes", "analysis-of", "static-analysis-of", "dynamic-analysis-of"],
                )],
            ),
            (
                "vulnerability",
                &[
                    ("malware", &["targeted-by"]),
                    ("tool", &["targeted-by"]),
                    ("attack-pattern", &["targeted-by"]),
                    ("campaign", &["targeted-by"]),
                    ("intrusion-set", &["targeted-by"]),
                    ("threat-actor", &["targeted-by"]),
                ],
            ),
            (
                "infrastructure",
                &[
                    ("threat-actor", &["used-by", "compromised-by"]),
                    ("campaign", &["used-by"]),
                    ("intrusion-set", &["used-by"]),
                    ("malware", &["hosts", "communicates-with"]),
                    ("tool", &["hosts"]),
                    ("vulnerability", &["has"]),
                ],
            ),
            (
                "note",
                &[
                    ("malware", &["related-to"]),
                    ("indicator", &["related-to"]),
                    ("threat-actor", &["related-to"]),
                    ("tool", &["related-to"]),
                    ("intrusion-set", &["related-to"]),
                    ("attack-pattern", &["related-to"]),
                ],
            ),
            (
                "observed-data",
                &[
                    ("indicator", &["based-on"]),
                    ("threat-actor", &["based-on"]),
                    ("tool", &["based-on"]),
                    ("malware", &["based-on"]),
                    ("attack-pattern", &["based-on"]),
                ],
            ),
            (
                "report",
                &[
                    ("threat-actor", &["reports-on"]),
                    ("campaign", &["reports-on"]),
                    ("vulnerability", &["reports-on"]),
                    ("malware", &["reports-on"]),
                    ("tool", &["reports-on"]),
                    ("incident", &["reports-on"]),
                ],
            ),
            (
                "grouping",
                &[
                    ("threat-actor", &["groups"]),
                    ("campaign", &["groups"]),
                    ("vulnerability", &["groups"]),
                    ("malware", &["groups"]),
                    ("tool", &["groups"]),
                    ("incident", &["groups"]),
                ],
            ),
            (
                "opinion",
                &[
                    ("threat-actor", &["opinion-on"]),
                    ("campaign", &["opinion-on"]),
                    ("vulnerability", &["opinion-on"]),
                    ("malware", &["opinion-on"]),
                    ("tool", &["opinion-on"]),
                    ("incident", &["opinion-on"]),
                ],
            ),
        ];

        rows.iter().fold(Self::new(), |table, (source, targets)| {
            targets.iter().fold(table, |table, (target, labels)| {
                table.with_entry(source, target, labels.iter().copied())
            })
        })
    }
}
