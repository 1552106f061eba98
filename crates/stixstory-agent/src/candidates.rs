//! Candidate pair enumeration
//!
//! For each source object, in input order, the first K other objects (by
//! input order, skipping any with the source's id) are taken as potential
//! targets. Only then is the compatibility table consulted, so a skipped
//! pair still uses up one of the K slots. Pure function of its inputs.

use crate::types::{Candidate, ObjectSummary};
use stixstory_domain::{CompatibilityTable, StixObject};
use tracing::debug;

/// Drop objects without an id or type tag
pub fn identifiable_objects(objects: &[StixObject]) -> Vec<&StixObject> {
    objects
        .iter()
        .filter(|obj| {
            let keep = obj.is_identifiable();
            if !keep {
                debug!("Skipping object without id/type: {:?}", obj.name);
            }
            keep
        })
        .collect()
}

/// Enumerate candidate pairs in deterministic order
///
/// `max_targets` is K. Each returned candidate carries its non-empty
/// permitted-label list and its position in the sequence.
pub fn enumerate_candidates(
    objects: &[StixObject],
    table: &CompatibilityTable,
    max_targets: usize,
) -> Vec<Candidate> {
    let valid = identifiable_objects(objects);
    let mut candidates = Vec::new();

    for source in &valid {
        let potential_targets = valid
            .iter()
            .filter(|target| target.id != source.id)
            .take(max_targets);

        for target in potential_targets {
            let permitted = table.permitted(&source.object_type, &target.object_type);
            if permitted.is_empty() {
                continue;
            }

            candidates.push(Candidate {
                index: candidates.len(),
                source: ObjectSummary::from(*source),
                target: ObjectSummary::from(*target),
                permitted: permitted.to_vec(),
            });
        }
    }

    debug!(
        "Enumerated {} candidate pairs from {} objects (K = {})",
        candidates.len(),
        valid.len(),
        max_targets
    );

    candidates
}
