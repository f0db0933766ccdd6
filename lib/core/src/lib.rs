//! # formfill Core
//!
//! Core data model for the formfill engine.
//!
//! This crate provides the types shared by matching, planning and filling:
//!
//! - [`FieldDescriptor`] - One detected form field, produced by a page scanner
//! - [`UserDataRecord`] - Ordered key/value profile data to fill with
//! - [`MatchCandidate`] / [`FieldMapping`] - Match results and their provenance
//! - [`Vector`] - Embedding vectors and cosine similarity
//! - [`MatcherConfig`] - Thresholds for the matching engine
//!
//! ## Example
//!
//! ```rust
//! use formfill_core::{cosine_similarity, FieldDescriptor, UserDataRecord};
//!
//! let field = FieldDescriptor::new("#email", "email").with_label("Email Address");
//! assert_eq!(field.match_text(), "email address");
//!
//! let mut data = UserDataRecord::new();
//! data.insert("email", "a@b.com");
//! assert_eq!(data.get("email"), Some("a@b.com"));
//!
//! let a = [1.0, 0.0];
//! assert_eq!(cosine_similarity(Some(&a[..]), Some(&a[..])), 1.0);
//! ```

pub mod config;
pub mod error;
pub mod field;
pub mod mapping;
pub mod record;
pub mod vector;

pub use config::MatcherConfig;
pub use error::{Error, Result};
pub use field::{FieldDescriptor, SelectOption};
pub use mapping::{FieldMapping, MappingTable, MatchCandidate, MatchMethod};
pub use record::UserDataRecord;
pub use vector::{cosine_similarity, Vector};
