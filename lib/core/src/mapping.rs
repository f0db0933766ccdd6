use crate::field::FieldDescriptor;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Provenance of a match
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum MatchMethod {
    /// Lexical heuristics
    #[serde(rename = "rules")]
    Rules,
    /// Embedding similarity
    #[serde(rename = "AI")]
    Ai,
    /// Chosen by the user
    #[serde(rename = "manual")]
    Manual,
}

impl fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchMethod::Rules => write!(f, "rules"),
            MatchMethod::Ai => write!(f, "AI"),
            MatchMethod::Manual => write!(f, "manual"),
        }
    }
}

/// Best data key found for a single field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchCandidate {
    pub key: String,
    pub value: String,
    /// Score in `[0, 1]`
    pub score: f32,
    pub method: MatchMethod,
}

impl MatchCandidate {
    pub fn new(key: impl Into<String>, value: impl Into<String>, score: f32, method: MatchMethod) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            score,
            method,
        }
    }
}

/// The recorded result of matching one field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FieldMapping {
    pub selector: String,
    pub data_key: String,
    pub value: String,
    pub method: MatchMethod,
    pub score: f32,
    pub field: FieldDescriptor,
}

impl FieldMapping {
    /// Build a mapping from an engine candidate. A zero score is recorded as 1.0.
    pub fn from_candidate(field: &FieldDescriptor, candidate: MatchCandidate) -> Self {
        let score = if candidate.score == 0.0 { 1.0 } else { candidate.score };
        Self {
            selector: field.selector.clone(),
            data_key: candidate.key,
            value: candidate.value,
            method: candidate.method,
            score,
            field: field.clone(),
        }
    }

    /// Build a user-selected mapping
    pub fn manual(field: &FieldDescriptor, key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            selector: field.selector.clone(),
            data_key: key.into(),
            value: value.into(),
            method: MatchMethod::Manual,
            score: 1.0,
            field: field.clone(),
        }
    }
}

/// Selector → mapping table, kept in field scan order
pub type MappingTable = IndexMap<String, FieldMapping>;
