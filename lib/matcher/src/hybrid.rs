//! Hybrid matching engine
//!
//! Lexical rules run first. A strong lexical score is accepted immediately;
//! otherwise the semantic matcher gets a chance to beat it, provided its
//! embedding provider is loaded and enabled. An unavailable provider means
//! rules only, silently. Semantic failures never surface as errors here: the
//! engine falls back to the lexical pick and reports what went wrong in
//! [`FieldMatch::degraded`].

use crate::lexical::LexicalMatcher;
use crate::provider::ProviderHandle;
use crate::semantic::{KeyEmbeddingCache, SemanticMatcher};
use formfill_core::{Error, FieldDescriptor, MatchCandidate, MatcherConfig, UserDataRecord};
use std::sync::Arc;

/// Outcome of matching one field
#[derive(Debug)]
pub struct FieldMatch {
    pub candidate: Option<MatchCandidate>,
    /// Set when a semantic pass was started but could not complete
    pub degraded: Option<Error>,
}

impl FieldMatch {
    fn accepted(candidate: Option<MatchCandidate>) -> Self {
        Self {
            candidate,
            degraded: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HybridMatcher {
    lexical: LexicalMatcher,
    semantic: Option<SemanticMatcher>,
    short_circuit: f32,
}

impl HybridMatcher {
    pub const DEFAULT_SHORT_CIRCUIT: f32 = 0.7;

    pub fn new(lexical: LexicalMatcher, semantic: Option<SemanticMatcher>) -> Self {
        Self {
            lexical,
            semantic,
            short_circuit: Self::DEFAULT_SHORT_CIRCUIT,
        }
    }

    /// Lexical matching only
    pub fn rules_only() -> Self {
        Self::new(LexicalMatcher::new(), None)
    }

    /// Build the engine from configuration. `handle` is ignored when semantic
    /// matching is disabled.
    pub fn from_config(config: &MatcherConfig, handle: Option<Arc<ProviderHandle>>) -> Self {
        let lexical = LexicalMatcher::new().with_threshold(config.lexical_threshold);
        let semantic = handle.filter(|_| config.semantic_enabled).map(|handle| {
            SemanticMatcher::new(handle)
                .with_threshold(config.semantic_threshold)
                .with_type_bonus(config.type_bonus)
        });
        Self::new(lexical, semantic).with_short_circuit(config.short_circuit)
    }

    pub fn with_short_circuit(mut self, short_circuit: f32) -> Self {
        self.short_circuit = short_circuit;
        self
    }

    pub fn lexical(&self) -> &LexicalMatcher {
        &self.lexical
    }

    pub fn semantic(&self) -> Option<&SemanticMatcher> {
        self.semantic.as_ref()
    }

    /// Whether semantic escalation can currently produce results
    pub fn semantic_available(&self) -> bool {
        self.semantic.as_ref().is_some_and(|s| s.is_available())
    }

    /// Load the embedding provider if one is configured. Returns whether
    /// semantic matching is available afterwards.
    pub async fn warm_up(&self) -> bool {
        match &self.semantic {
            Some(semantic) => semantic.handle().load().await && semantic.is_available(),
            None => false,
        }
    }

    /// The semantic matcher, when its provider is loaded and enabled. A
    /// provider that is unloaded, still loading, failed or disabled is
    /// skipped without an error.
    fn escalation(&self) -> Option<&SemanticMatcher> {
        self.semantic.as_ref().filter(|s| s.is_available())
    }

    pub async fn match_field(&self, field: &FieldDescriptor, data: &UserDataRecord) -> FieldMatch {
        let mut cache = KeyEmbeddingCache::new();
        self.match_field_cached(field, data, &mut cache).await
    }

    /// Match fields in order, sharing key embeddings across the batch
    pub async fn match_fields(
        &self,
        fields: &[FieldDescriptor],
        data: &UserDataRecord,
    ) -> Vec<FieldMatch> {
        let mut cache = KeyEmbeddingCache::new();
        let mut results = Vec::with_capacity(fields.len());
        for field in fields {
            results.push(self.match_field_cached(field, data, &mut cache).await);
        }
        results
    }

    async fn match_field_cached(
        &self,
        field: &FieldDescriptor,
        data: &UserDataRecord,
        cache: &mut KeyEmbeddingCache,
    ) -> FieldMatch {
        let rule = self.lexical.match_field(field, data);

        if rule.as_ref().is_some_and(|r| r.score >= self.short_circuit) {
            return FieldMatch::accepted(rule);
        }

        let Some(semantic) = self.escalation() else {
            return FieldMatch::accepted(rule);
        };

        match semantic.match_field_cached(field, data, cache).await {
            Ok(Some(ai)) if rule.as_ref().map_or(true, |r| ai.score > r.score) => {
                FieldMatch::accepted(Some(ai))
            }
            Ok(_) => FieldMatch::accepted(rule),
            Err(e) => FieldMatch {
                candidate: rule,
                degraded: Some(e),
            },
        }
    }
}

impl Default for HybridMatcher {
    fn default() -> Self {
        Self::from_config(&MatcherConfig::default(), Some(ProviderHandle::global()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::LexicalRule;
    use crate::provider::{EmbeddingProvider, ProviderLoader};
    use async_trait::async_trait;
    use formfill_core::{MatchMethod, Result, Vector};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Field text always embeds to [1, 0]; every key embeds to `key_vector`
    struct FixedProvider {
        key_vector: [f32; 2],
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EmbeddingProvider for FixedProvider {
        async fn embed(&self, text: &str) -> Result<Vector> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if text.starts_with("field") {
                Ok(Vector::new(vec![1.0, 0.0]))
            } else {
                Ok(Vector::new(self.key_vector.to_vec()))
            }
        }

        fn dimension(&self) -> usize {
            2
        }
    }

    struct FixedLoader {
        provider: Arc<FixedProvider>,
        fail: bool,
    }

    #[async_trait]
    impl ProviderLoader for FixedLoader {
        async fn load(&self) -> Result<Arc<dyn EmbeddingProvider>> {
            if self.fail {
                return Err(Error::ProviderLoad("no bundle".to_string()));
            }
            Ok(self.provider.clone())
        }
    }

    fn handle_with(key_vector: [f32; 2], fail: bool) -> (Arc<ProviderHandle>, Arc<FixedProvider>) {
        let provider = Arc::new(FixedProvider {
            key_vector,
            calls: AtomicUsize::new(0),
        });
        let loader = FixedLoader {
            provider: provider.clone(),
            fail,
        };
        (Arc::new(ProviderHandle::new(Arc::new(loader))), provider)
    }

    fn lexical_at(score: f32) -> LexicalMatcher {
        LexicalMatcher::with_rules(vec![LexicalRule::new("fixed", score, |_| true)])
    }

    fn field() -> FieldDescriptor {
        FieldDescriptor::new("#f", "text").with_label("field label")
    }

    fn record() -> UserDataRecord {
        [("nickname", "JD")].into_iter().collect()
    }

    #[tokio::test]
    async fn test_strong_lexical_skips_semantic() {
        let (handle, provider) = handle_with([1.0, 0.0], false);
        assert!(handle.load().await);
        let engine = HybridMatcher::new(lexical_at(0.7), Some(SemanticMatcher::new(handle)));

        let result = engine.match_field(&field(), &record()).await;
        let candidate = result.candidate.unwrap();
        assert_eq!(candidate.method, MatchMethod::Rules);
        assert_eq!(candidate.score, 0.7);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_semantic_beats_weak_lexical() {
        let (handle, _) = handle_with([0.6, 0.8], false);
        assert!(handle.load().await);
        let engine = HybridMatcher::new(lexical_at(0.4), Some(SemanticMatcher::new(handle)));

        let candidate = engine.match_field(&field(), &record()).await.candidate.unwrap();
        assert_eq!(candidate.method, MatchMethod::Ai);
        assert!((candidate.score - 0.6).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_weak_semantic_keeps_lexical() {
        let (handle, _) = handle_with([0.3, 0.953_939_2], false);
        assert!(handle.load().await);
        let engine = HybridMatcher::new(lexical_at(0.4), Some(SemanticMatcher::new(handle)));

        let result = engine.match_field(&field(), &record()).await;
        let candidate = result.candidate.unwrap();
        assert_eq!(candidate.method, MatchMethod::Rules);
        assert_eq!(candidate.score, 0.4);
        assert!(result.degraded.is_none());
    }

    #[tokio::test]
    async fn test_semantic_fills_gap_without_lexical() {
        let (handle, _) = handle_with([1.0, 0.0], false);
        assert!(handle.load().await);
        let engine = HybridMatcher::new(lexical_at(0.1), Some(SemanticMatcher::new(handle)));

        let candidate = engine.match_field(&field(), &record()).await.candidate.unwrap();
        assert_eq!(candidate.method, MatchMethod::Ai);
        assert_eq!(candidate.key, "nickname");
    }

    #[tokio::test]
    async fn test_failed_provider_means_rules_only() {
        let (handle, provider) = handle_with([1.0, 0.0], true);
        assert!(!handle.load().await);
        let engine = HybridMatcher::new(lexical_at(0.4), Some(SemanticMatcher::new(handle)));

        assert!(!engine.semantic_available());
        let result = engine.match_field(&field(), &record()).await;
        assert_eq!(result.candidate.unwrap().method, MatchMethod::Rules);
        assert!(result.degraded.is_none());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unloaded_provider_means_rules_only() {
        let (handle, provider) = handle_with([1.0, 0.0], false);
        let engine = HybridMatcher::new(lexical_at(0.4), Some(SemanticMatcher::new(handle)));

        let result = engine.match_field(&field(), &record()).await;
        assert_eq!(result.candidate.unwrap().method, MatchMethod::Rules);
        assert!(result.degraded.is_none());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unloaded_provider_without_rule_match() {
        let (handle, _) = handle_with([1.0, 0.0], false);
        let engine = HybridMatcher::from_config(&MatcherConfig::default(), Some(handle.clone()));
        let field = FieldDescriptor::new("#alias", "text").with_label("Alias");

        let result = engine.match_field(&field, &record()).await;
        assert_eq!(handle.status(), crate::provider::ProviderStatus::Unloaded);
        assert!(result.candidate.is_none());
        assert!(result.degraded.is_none());
    }

    #[tokio::test]
    async fn test_disabled_semantic_is_skipped() {
        let (handle, provider) = handle_with([1.0, 0.0], false);
        assert!(handle.load().await);
        handle.set_enabled(false);
        let engine = HybridMatcher::new(lexical_at(0.4), Some(SemanticMatcher::new(handle)));

        let result = engine.match_field(&field(), &record()).await;
        assert_eq!(result.candidate.unwrap().method, MatchMethod::Rules);
        assert!(result.degraded.is_none());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_match_fields_shares_key_cache() {
        let (handle, provider) = handle_with([1.0, 0.0], false);
        let engine = HybridMatcher::new(lexical_at(0.1), Some(SemanticMatcher::new(handle)));
        assert!(engine.warm_up().await);

        let fields = vec![field(), field().with_placeholder("other")];
        let results = engine.match_fields(&fields, &record()).await;
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.candidate.is_some()));
        // two field embeddings, one key embedding
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_from_config_respects_semantic_switch() {
        let (handle, _) = handle_with([1.0, 0.0], false);
        let config = MatcherConfig {
            semantic_enabled: false,
            ..MatcherConfig::default()
        };
        let engine = HybridMatcher::from_config(&config, Some(handle));
        assert!(engine.semantic().is_none());
        assert!(!engine.warm_up().await);
    }

    #[tokio::test]
    async fn test_rules_only_engine() {
        let engine = HybridMatcher::rules_only();
        let field = FieldDescriptor::new("#email", "email").with_label("Email Address");
        let data: UserDataRecord = [("email", "a@b.com")].into_iter().collect();

        let result = engine.match_field(&field, &data).await;
        assert_eq!(result.candidate.unwrap().key, "email");
    }
}
