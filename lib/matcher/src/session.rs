//! Mapping session
//!
//! Holds one scan's fields, the active user data and the resulting mapping
//! table, and drives auto-mapping and manual overrides on top of the
//! [`HybridMatcher`].

use crate::hybrid::HybridMatcher;
use formfill_core::{
    Error, FieldDescriptor, FieldMapping, MappingTable, MatchMethod, Result, UserDataRecord,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Counts from one auto-mapping pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSummary {
    /// Fields mapped by lexical rules
    pub rules: usize,
    /// Fields mapped by semantic similarity
    pub ai: usize,
    /// Fields left without a mapping
    pub unmatched: usize,
    /// Size of the mapping table after the pass
    pub mapped: usize,
}

impl MatchSummary {
    /// One-line status message; zero counts are left out
    pub fn describe(&self) -> String {
        let parts: Vec<String> = [
            (self.rules, "rule-based"),
            (self.ai, "AI-powered"),
            (self.unmatched, "unmatched"),
        ]
        .iter()
        .filter(|(count, _)| *count > 0)
        .map(|(count, label)| format!("{} {}", count, label))
        .collect();

        if parts.is_empty() {
            format!("Mapped {} fields", self.mapped)
        } else {
            format!("Mapped {} fields ({})", self.mapped, parts.join(", "))
        }
    }

    pub fn total(&self) -> usize {
        self.rules + self.ai + self.unmatched
    }
}

impl fmt::Display for MatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MappingSession {
    fields: Vec<FieldDescriptor>,
    user_data: UserDataRecord,
    mappings: MappingTable,
}

impl MappingSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the scanned fields. Mappings from the previous scan are discarded.
    pub fn set_fields(&mut self, fields: Vec<FieldDescriptor>) {
        self.fields = fields;
        self.mappings.clear();
    }

    pub fn set_user_data(&mut self, user_data: UserDataRecord) {
        self.user_data = user_data;
    }

    /// Reinstate a previously saved session
    pub fn restore(&mut self, user_data: UserDataRecord, mappings: MappingTable) {
        self.user_data = user_data;
        self.mappings = mappings;
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn user_data(&self) -> &UserDataRecord {
        &self.user_data
    }

    pub fn mappings(&self) -> &MappingTable {
        &self.mappings
    }

    /// Match every field against the user data, replacing all mappings
    pub async fn auto_map(&mut self, matcher: &HybridMatcher) -> Result<MatchSummary> {
        if self.fields.is_empty() {
            return Err(Error::NoFields);
        }
        if self.user_data.is_empty() {
            return Err(Error::NoUserData);
        }

        self.mappings.clear();
        let mut summary = MatchSummary::default();

        let results = matcher.match_fields(&self.fields, &self.user_data).await;
        for (field, result) in self.fields.iter().zip(results) {
            if let Some(error) = &result.degraded {
                tracing::warn!(
                    selector = %field.selector,
                    %error,
                    "semantic matching failed, using rule match"
                );
            }

            match result.candidate {
                Some(candidate) => {
                    match candidate.method {
                        MatchMethod::Ai => summary.ai += 1,
                        _ => summary.rules += 1,
                    }
                    self.mappings.insert(
                        field.selector.clone(),
                        FieldMapping::from_candidate(field, candidate),
                    );
                }
                None => summary.unmatched += 1,
            }
        }

        summary.mapped = self.mappings.len();
        tracing::info!(
            rules = summary.rules,
            ai = summary.ai,
            unmatched = summary.unmatched,
            "auto-mapping complete"
        );
        Ok(summary)
    }

    /// Map a field to a data key chosen by the user
    pub fn assign_manual(&mut self, selector: &str, key: &str) -> Result<&FieldMapping> {
        let field = self
            .fields
            .iter()
            .find(|f| f.selector == selector)
            .ok_or_else(|| Error::UnknownField(selector.to_string()))?;
        let value = self
            .user_data
            .get(key)
            .ok_or_else(|| Error::UnknownKey(key.to_string()))?;

        let mapping = FieldMapping::manual(field, key, value);
        self.mappings.insert(selector.to_string(), mapping);
        self.sort_by_scan_order();

        self.mappings
            .get(selector)
            .ok_or_else(|| Error::UnknownField(selector.to_string()))
    }

    /// Remove the mapping of one field. Returns the removed mapping, if any.
    pub fn clear_mapping(&mut self, selector: &str) -> Result<Option<FieldMapping>> {
        if !self.fields.iter().any(|f| f.selector == selector) {
            return Err(Error::UnknownField(selector.to_string()));
        }
        Ok(self.mappings.shift_remove(selector))
    }

    /// Drop the user data and all mappings; the scanned fields stay
    pub fn clear(&mut self) {
        self.user_data = UserDataRecord::new();
        self.mappings.clear();
    }

    fn sort_by_scan_order(&mut self) {
        let fields = &self.fields;
        let position = |selector: &str| {
            fields
                .iter()
                .position(|f| f.selector == selector)
                .unwrap_or(usize::MAX)
        };
        self.mappings.sort_by(|a, _, b, _| position(a.as_str()).cmp(&position(b.as_str())));
    }
}
