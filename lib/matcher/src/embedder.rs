//! Local hash embedder
//!
//! A deterministic feature-hashing embedder that ships with the crate, so
//! semantic matching works without fetching a model. Character trigrams and
//! whole words are hashed into a fixed number of buckets and the result is
//! L2-normalized.

use crate::provider::{EmbeddingProvider, ProviderLoader};
use async_trait::async_trait;
use formfill_core::{Error, Result, Vector};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Default dimension for hashed text embeddings
pub const DEFAULT_EMBEDDING_DIM: usize = 256;

/// Words contribute more than individual trigrams
const WORD_WEIGHT: f32 = 2.0;

/// Feature-hashing text embedder
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dim: usize,
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_EMBEDDING_DIM)
    }
}

impl HashEmbedder {
    /// A zero dimension is raised to one
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(1) }
    }

    /// Embed text synchronously. Empty text yields the zero vector.
    pub fn embed_text(&self, text: &str) -> Vector {
        let mut components = vec![0.0f32; self.dim];
        let normalized = text.to_lowercase();

        for trigram in generate_trigrams(&normalized) {
            components[self.bucket(&trigram)] += 1.0;
        }
        for word in normalized.split_whitespace() {
            components[self.bucket(word)] += WORD_WEIGHT;
        }

        let mut vector = Vector::new(components);
        vector.normalize();
        vector
    }

    fn bucket<T: Hash + ?Sized>(&self, item: &T) -> usize {
        let mut hasher = DefaultHasher::new();
        item.hash(&mut hasher);
        (hasher.finish() as usize) % self.dim
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vector> {
        Ok(self.embed_text(text))
    }

    fn dimension(&self) -> usize {
        self.dim
    }
}

/// Loads the bundled [`HashEmbedder`]
#[derive(Debug, Clone)]
pub struct HashEmbedderLoader {
    dim: usize,
}

impl Default for HashEmbedderLoader {
    fn default() -> Self {
        Self::new(DEFAULT_EMBEDDING_DIM)
    }
}

impl HashEmbedderLoader {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

#[async_trait]
impl ProviderLoader for HashEmbedderLoader {
    async fn load(&self) -> Result<Arc<dyn EmbeddingProvider>> {
        if self.dim == 0 {
            return Err(Error::ProviderLoad(
                "embedding dimension must be positive".to_string(),
            ));
        }
        Ok(Arc::new(HashEmbedder::new(self.dim)))
    }
}

/// Character trigrams of the whitespace-padded text
fn generate_trigrams(s: &str) -> HashSet<String> {
    if s.trim().is_empty() {
        return HashSet::new();
    }
    let padded = format!("  {}  ", s);
    let chars: Vec<char> = padded.chars().collect();

    chars
        .windows(3)
        .map(|w| w.iter().collect::<String>())
        .collect()
}
