//! Semantic matcher
//!
//! Scores data keys by cosine similarity between the embedding of the field
//! text and the embedding of each key rendered as text, with a bonus when the
//! declared input type agrees with the key.

use crate::key_text::format_key_as_text;
use crate::lexical::declared_type_matches;
use crate::provider::{EmbeddingProvider, ProviderHandle};
use ahash::AHashMap;
use formfill_core::{
    Error, FieldDescriptor, MatchCandidate, MatchMethod, Result, UserDataRecord, Vector,
};
use std::sync::Arc;

/// Key embeddings reused across the fields of one matching batch.
///
/// Only successful embeddings are cached, so a key whose embedding failed is
/// retried for the next field. A cache must only be used with one provider.
#[derive(Debug, Default)]
pub struct KeyEmbeddingCache {
    entries: AHashMap<String, Vector>,
}

impl KeyEmbeddingCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    async fn get_or_embed(&mut self, provider: &dyn EmbeddingProvider, key: &str) -> Option<Vector> {
        if let Some(vector) = self.entries.get(key) {
            return Some(vector.clone());
        }
        match provider.embed(&format_key_as_text(key)).await {
            Ok(vector) => {
                self.entries.insert(key.to_string(), vector.clone());
                Some(vector)
            }
            Err(e) => {
                tracing::debug!(key, error = %e, "skipping key, embedding failed");
                None
            }
        }
    }
}

/// Embedding-similarity matcher over a shared provider handle
#[derive(Debug, Clone)]
pub struct SemanticMatcher {
    handle: Arc<ProviderHandle>,
    threshold: f32,
    type_bonus: f32,
}

impl SemanticMatcher {
    pub const DEFAULT_THRESHOLD: f32 = 0.5;
    pub const DEFAULT_TYPE_BONUS: f32 = 0.15;

    pub fn new(handle: Arc<ProviderHandle>) -> Self {
        Self {
            handle,
            threshold: Self::DEFAULT_THRESHOLD,
            type_bonus: Self::DEFAULT_TYPE_BONUS,
        }
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_type_bonus(mut self, type_bonus: f32) -> Self {
        self.type_bonus = type_bonus;
        self
    }

    pub fn handle(&self) -> &Arc<ProviderHandle> {
        &self.handle
    }

    pub fn is_available(&self) -> bool {
        self.handle.is_available()
    }

    /// Find the best key for a field by embedding similarity.
    ///
    /// Returns `Ok(None)` when no key reaches the threshold or when the field
    /// text itself cannot be embedded. Fails only when no provider is loaded.
    pub async fn match_field(
        &self,
        field: &FieldDescriptor,
        data: &UserDataRecord,
    ) -> Result<Option<MatchCandidate>> {
        let mut cache = KeyEmbeddingCache::new();
        self.match_field_cached(field, data, &mut cache).await
    }

    /// Same as [`SemanticMatcher::match_field`], reusing key embeddings from `cache`
    pub async fn match_field_cached(
        &self,
        field: &FieldDescriptor,
        data: &UserDataRecord,
        cache: &mut KeyEmbeddingCache,
    ) -> Result<Option<MatchCandidate>> {
        let provider = self.handle.provider().ok_or(Error::ProviderUnavailable)?;

        let field_text = field.match_text();
        if field_text.is_empty() {
            return Ok(None);
        }

        let field_embedding = match provider.embed(&field_text).await {
            Ok(vector) => vector,
            Err(e) => {
                tracing::debug!(selector = %field.selector, error = %e, "field embedding failed");
                return Ok(None);
            }
        };

        let mut best: Option<MatchCandidate> = None;
        let mut best_score = 0.0f32;

        for (key, value) in data.iter() {
            let Some(key_embedding) = cache.get_or_embed(provider.as_ref(), key).await else {
                continue;
            };

            let similarity = field_embedding.cosine_similarity(&key_embedding);
            let score = if declared_type_matches(&field.field_type, &key.to_lowercase()) {
                (similarity + self.type_bonus).min(1.0)
            } else {
                similarity
            };

            if score > best_score && score >= self.threshold {
                best_score = score;
                best = Some(MatchCandidate::new(key, value, score, MatchMethod::Ai));
            }
        }

        if let Some(candidate) = &best {
            tracing::debug!(
                selector = %field.selector,
                key = %candidate.key,
                score = candidate.score,
                "semantic match"
            );
        }
        Ok(best)
    }
}
