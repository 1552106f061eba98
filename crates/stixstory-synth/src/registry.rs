//! Registry mapping object kinds to their generators

use crate::error::SynthError;
use crate::generator::{LlmObjectGenerator, ObjectGenerator};
use stixstory_domain::traits::LlmProvider;
use stixstory_domain::ObjectKind;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Lookup table from kind to generator, fixed after construction
#[derive(Clone, Default)]
pub struct GeneratorRegistry {
    generators: BTreeMap<ObjectKind, Arc<dyn ObjectGenerator>>,
}

impl GeneratorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an LLM-backed generator for every known kind
    pub fn with_llm<L>(llm: Arc<L>) -> Self
    where
        L: LlmProvider + Send + Sync + 'static,
        L::Error: std::fmt::Display,
    {
        ObjectKind::ALL.iter().fold(Self::new(), |registry, &kind| {
            registry.with_generator(Arc::new(LlmObjectGenerator::new(Arc::clone(&llm), kind)))
        })
    }

    /// Add or replace the generator for its kind
    pub fn with_generator(mut self, generator: Arc<dyn ObjectGenerator>) -> Self {
        self.generators.insert(generator.kind(), generator);
        self
    }

    /// Generator for `kind`
    pub fn get(&self, kind: ObjectKind) -> Result<Arc<dyn ObjectGenerator>, SynthError> {
        self.generators
            .get(&kind)
            .cloned()
            .ok_or_else(|| SynthError::UnknownKind(kind.to_string()))
    }

    /// Resolve a type tag to a kind that has a generator
    pub fn resolve(&self, tag: &str) -> Result<ObjectKind, SynthError> {
        ObjectKind::parse(tag)
            .filter(|kind| self.generators.contains_key(kind))
            .ok_or_else(|| SynthError::UnknownKind(tag.to_string()))
    }

    /// Registered kinds, in tag order
    pub fn kinds(&self) -> impl Iterator<Item = ObjectKind> + '_ {
        self.generators.keys().copied()
    }
}

impl std::fmt::Debug for GeneratorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.kinds()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stixstory_llm::MockProvider;

    #[test]
    fn test_with_llm_covers_every_kind() {
        let registry = GeneratorRegistry::with_llm(Arc::new(MockProvider::default()));
        assert_eq!(registry.kinds().count(), ObjectKind::ALL.len());
        for kind in ObjectKind::ALL {
            assert_eq!(registry.get(kind).unwrap().kind(), kind);
        }
    }

    #[test]
    fn test_resolve_unknown_tag() {
        let registry = GeneratorRegistry::with_llm(Arc::new(MockProvider::default()));
        assert_eq!(registry.resolve("malware").unwrap(), ObjectKind::Malware);
        assert_eq!(
            registry.resolve("spaceship"),
            Err(SynthError::UnknownKind("spaceship".to_string()))
        );
    }

    #[test]
    fn test_unregistered_kind() {
        let registry = GeneratorRegistry::new();
        assert!(matches!(registry.resolve("malware"), Err(SynthError::UnknownKind(_))));
        assert!(matches!(registry.get(ObjectKind::Tool), Err(SynthError::UnknownKind(_))));
    }
}
