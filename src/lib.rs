//! # formfill
//!
//! The matching and filling engine behind a form-filling assistant.
//!
//! formfill takes the fields detected on a web form and a record of user
//! data, infers which value belongs in each field, and fills the form in a
//! human-like order through a page host abstraction.
//!
//! ## Quick Start
//!
//! ### As a CLI
//!
//! ```bash
//! cargo install formfill
//! formfill map --fields fields.json --data profile.json
//! formfill fill --fields fields.json --data profile.json --page page.json --out filled.json
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use formfill::prelude::*;
//!
//! # async fn run() -> Result<()> {
//! let fields: Vec<FieldDescriptor> = serde_json::from_str(r##"[
//!     {"selector": "#email", "type": "email", "label": "Email Address"}
//! ]"##)?;
//! let data: UserDataRecord = serde_json::from_str(r#"{"email": "jane@example.com"}"#)?;
//!
//! let matcher = HybridMatcher::from_config(&MatcherConfig::default(), Some(ProviderHandle::global()));
//! matcher.warm_up().await;
//!
//! let mut session = MappingSession::new();
//! session.set_fields(fields);
//! session.set_user_data(data);
//! let summary = session.auto_map(&matcher).await?;
//! println!("{}", summary.describe());
//!
//! let mut page = VirtualPage::from_json(&std::fs::read_to_string("page.json")?)?;
//! let report = FillExecutor::default().fill_form(&mut page, session.mappings()).await;
//! println!("filled {} fields", report.filled);
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Structure
//!
//! formfill is composed of several crates:
//!
//! - [`formfill-core`](https://docs.rs/formfill-core) - Data model (fields, user data, mappings, vectors, errors)
//! - [`formfill-matcher`](https://docs.rs/formfill-matcher) - Lexical, semantic and hybrid matching, mapping sessions
//! - [`formfill-fill`](https://docs.rs/formfill-fill) - Fill-order planning and fill execution
//! - [`formfill-storage`](https://docs.rs/formfill-storage) - Saved profiles and last-session state
//!
//! ## Features
//!
//! - **Hybrid Matching**: Rule table first, embedding similarity when rules are unsure
//! - **Graceful Degradation**: No embedding provider means rules only, never an error
//! - **Human-like Filling**: Visual row ordering, per-character typing, real input events
//! - **Profiles**: Named user data records persisted with atomic writes

// Re-export core types
pub use formfill_core::{
    cosine_similarity, Error, FieldDescriptor, FieldMapping, MappingTable, MatchCandidate,
    MatchMethod, MatcherConfig, Result, SelectOption, UserDataRecord, Vector,
};

// Re-export matching
pub use formfill_matcher::{
    EmbeddingProvider, FieldMatch, HashEmbedder, HashEmbedderLoader, HybridMatcher,
    LexicalMatcher, MappingSession, MatchSummary, ProviderHandle, ProviderLoader, ProviderStatus,
    SemanticMatcher,
};

// Re-export filling
pub use formfill_fill::{
    plan_order, preview, ElementKind, Event, FillConfig, FillExecutor, FillReport, HostError,
    LayoutSource, PageElement, PageHost, Position, PreviewEntry, VirtualElement, VirtualPage,
};

// Re-export storage
pub use formfill_storage::{Profile, ProfileStore, SessionState};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Error, FieldDescriptor, FieldMapping, FillConfig, FillExecutor, FillReport,
        HybridMatcher, MappingSession, MappingTable, MatchMethod, MatcherConfig, PageHost,
        ProfileStore, ProviderHandle, Result, UserDataRecord, VirtualPage,
    };
}
