//! # formfill Matcher
//!
//! Hybrid field-to-data matching for form autofill.
//!
//! Each detected field is scored against every key of a user data record.
//! Cheap lexical rules run first; when they are not confident, an embedding
//! provider is consulted and may override the lexical pick.
//!
//! ## Features
//!
//! - **Lexical rules**: an ordered, data-driven table of scoring heuristics
//! - **Semantic fallback**: cosine similarity over text embeddings, with a
//!   bonus when the declared input type agrees with the key
//! - **Lazy provider**: loaded at most once, shared by all callers, and a
//!   failed load silently leaves the engine in rules-only mode
//! - **Provenance**: every match records whether rules, embeddings or the
//!   user chose it
//!
//! ## Example
//!
//! ```rust
//! use formfill_core::{FieldDescriptor, MatchMethod, UserDataRecord};
//! use formfill_matcher::LexicalMatcher;
//!
//! let field = FieldDescriptor::new("#email", "email").with_label("Email Address");
//! let data: UserDataRecord = [("email", "a@b.com"), ("full_name", "X")]
//!     .into_iter()
//!     .collect();
//!
//! let candidate = LexicalMatcher::new().match_field(&field, &data).unwrap();
//! assert_eq!(candidate.key, "email");
//! assert_eq!(candidate.method, MatchMethod::Rules);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐  score < 0.7  ┌─────────────┐
//! │   Fields    │────>│   Lexical   │──────────────>│  Semantic   │
//! │  + record   │     │   (rules)   │               │ (embedding) │
//! └─────────────┘     └─────────────┘               └─────────────┘
//!                            │                             │
//!                            │       ┌─────────────┐       │
//!                            └──────>│   Hybrid    │<──────┘
//!                                    │  (best of)  │
//!                                    └─────────────┘
//!                                           │
//!                                    ┌─────────────┐
//!                                    │   Session   │
//!                                    │ (mappings)  │
//!                                    └─────────────┘
//! ```

pub mod embedder;
pub mod hybrid;
pub mod key_text;
pub mod lexical;
pub mod provider;
pub mod semantic;
pub mod session;

// Re-export main types for convenience
pub use embedder::{HashEmbedder, HashEmbedderLoader, DEFAULT_EMBEDDING_DIM};
pub use hybrid::{FieldMatch, HybridMatcher};
pub use key_text::format_key_as_text;
pub use lexical::{default_rules, LexicalMatcher, LexicalRule, RuleContext};
pub use provider::{EmbeddingProvider, ProviderHandle, ProviderLoader, ProviderStatus};
pub use semantic::{KeyEmbeddingCache, SemanticMatcher};
pub use session::{MappingSession, MatchSummary};
