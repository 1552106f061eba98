//! Integration tests for generation, custom generators and bundling

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use stixstory_agent::{AgentConfig, RelationshipAgent};
use stixstory_domain::{CompatibilityTable, ObjectKind, StixObject};
use stixstory_llm::MockProvider;
use stixstory_synth::{
    mint_id, Bundle, GenerationRequest, GeneratorRegistry, ObjectGenerator, SynthConfig,
    SynthError, Synthesizer,
};

/// Deterministic generator producing numbered objects
struct FixedGenerator {
    kind: ObjectKind,
}

impl ObjectGenerator for FixedGenerator {
    fn kind(&self) -> ObjectKind {
        self.kind
    }

    fn generate(&self, count: usize) -> Result<Vec<StixObject>, SynthError> {
        Ok((0..count)
            .map(|i| {
                StixObject::new(mint_id(self.kind), self.kind.as_str())
                    .with_name(format!("{} {}", self.kind, i))
            })
            .collect())
    }
}

/// Generator that outlives any reasonable deadline
struct SlowGenerator;

impl ObjectGenerator for SlowGenerator {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Malware
    }

    fn generate(&self, _count: usize) -> Result<Vec<StixObject>, SynthError> {
        std::thread::sleep(Duration::from_millis(2500));
        Ok(Vec::new())
    }
}

/// Generator that overruns its deadline and records how many runs overlap
struct TrackingGenerator {
    kind: ObjectKind,
    in_flight: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl ObjectGenerator for TrackingGenerator {
    fn kind(&self) -> ObjectKind {
        self.kind
    }

    fn generate(&self, _count: usize) -> Result<Vec<StixObject>, SynthError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(1300));
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn test_custom_generators() {
    let registry = GeneratorRegistry::new()
        .with_generator(Arc::new(FixedGenerator { kind: ObjectKind::ThreatActor }))
        .with_generator(Arc::new(FixedGenerator { kind: ObjectKind::Identity }));
    let synth = Synthesizer::new(registry, SynthConfig::default()).unwrap();

    let requests = synth.plan([("threat-actor", 2), ("identity", 3)]).unwrap();
    let report = synth.generate_all(&requests).await.unwrap();

    assert_eq!(report.objects.len(), 5);
    assert_eq!(report.objects[0].name.as_deref(), Some("threat-actor 0"));
    assert_eq!(report.objects[4].name.as_deref(), Some("identity 2"));
    assert!(matches!(synth.plan([("malware", 1)]), Err(SynthError::UnknownKind(_))));
}

#[tokio::test]
async fn test_timed_out_kind_is_a_failure() {
    let registry = GeneratorRegistry::new()
        .with_generator(Arc::new(SlowGenerator))
        .with_generator(Arc::new(FixedGenerator { kind: ObjectKind::Tool }));
    let config = SynthConfig {
        generation_timeout_secs: 1,
        ..SynthConfig::default()
    };
    let synth = Synthesizer::new(registry, config).unwrap();

    let report = synth
        .generate_all(&[
            GenerationRequest::new(ObjectKind::Malware, 1),
            GenerationRequest::new(ObjectKind::Tool, 1),
        ])
        .await
        .unwrap();

    assert_eq!(report.objects.len(), 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].kind, "malware");
    assert!(report.failures[0].error.contains("timed out"));
}

#[tokio::test]
async fn test_worker_bound_survives_timeouts() {
    let in_flight = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let kinds = [ObjectKind::Malware, ObjectKind::Tool, ObjectKind::Identity];

    let registry = kinds.iter().fold(GeneratorRegistry::new(), |registry, &kind| {
        registry.with_generator(Arc::new(TrackingGenerator {
            kind,
            in_flight: Arc::clone(&in_flight),
            peak: Arc::clone(&peak),
        }))
    });
    let config = SynthConfig {
        max_workers: 1,
        generation_timeout_secs: 1,
        ..SynthConfig::default()
    };
    let synth = Synthesizer::new(registry, config).unwrap();

    let requests: Vec<_> = kinds.iter().map(|&kind| GenerationRequest::new(kind, 1)).collect();
    let report = synth.generate_all(&requests).await.unwrap();

    assert_eq!(report.failures.len(), 3);
    assert!(report.failures.iter().all(|f| f.error.contains("timed out")));
    assert_eq!(peak.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_generate_infer_and_bundle() {
    let registry = GeneratorRegistry::new()
        .with_generator(Arc::new(FixedGenerator { kind: ObjectKind::ThreatActor }))
        .with_generator(Arc::new(FixedGenerator { kind: ObjectKind::Identity }));
    let synth = Synthesizer::new(registry, SynthConfig::default()).unwrap();
    let report = synth
        .generate_all(&[
            GenerationRequest::new(ObjectKind::ThreatActor, 1),
            GenerationRequest::new(ObjectKind::Identity, 1),
        ])
        .await
        .unwrap();

    let mut llm = MockProvider::new(r#"{"relationship_type": "targets", "justification": "x"}"#);
    llm.add_response("Given the following STIX relationships", "A story.");
    llm.add_response("\nStory:\n", r#"{"score": 6, "justification": "ok"}"#);
    let agent =
        RelationshipAgent::new(llm, CompatibilityTable::stix_default(), AgentConfig::default())
            .unwrap();

    let result = agent.run(&report.objects).await;
    // identity -> threat-actor permits "targets" too
    assert_eq!(result.edges.len(), 2);

    let bundle = Bundle::assemble(&report.objects, &result.edges);
    assert_eq!(bundle.objects.len(), 4);
    assert_eq!(bundle.relationship_count(), 2);
}
