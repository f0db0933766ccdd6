//! Lexical matcher
//!
//! Scores a field against every key of a user data record with an ordered table
//! of `(name, score, predicate)` rules. A key's score is the maximum over the
//! rules it satisfies; rules are not additive.

use formfill_core::{FieldDescriptor, MatchCandidate, MatchMethod, UserDataRecord};
use std::fmt;

/// Keywords per category, checked against both the key and the field text
const TYPE_KEYWORDS: &[(&str, &[&str])] = &[
    ("email", &["email", "e-mail", "mail"]),
    ("phone", &["phone", "tel", "mobile", "cell"]),
    ("date", &["date", "birth", "dob", "birthday"]),
    ("number", &["number", "zip", "postal", "code"]),
    (
        "text",
        &["name", "address", "company", "city", "country", "website", "title"],
    ),
];

/// Known spellings of common data keys as they appear in labels
const KEY_VARIANTS: &[(&str, &[&str])] = &[
    ("full_name", &["name", "fullname", "full name"]),
    ("email", &["email", "e-mail", "mail"]),
    ("phone", &["phone", "telephone", "tel", "mobile"]),
    ("address", &["address", "street", "location"]),
    ("company", &["company", "organization", "org", "employer"]),
    ("date_of_birth", &["dob", "birthdate", "birth date", "date of birth"]),
    ("zip_code", &["zip", "postal", "postcode", "zipcode"]),
];

/// Everything a rule may look at for one `(field, key)` pair
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub field_type: &'a str,
    /// Lowercased, trimmed label/placeholder/name/id text
    pub field_text: &'a str,
    pub key: &'a str,
    pub key_lower: &'a str,
}

pub type RulePredicate = fn(&RuleContext<'_>) -> bool;

/// A single scoring rule
#[derive(Clone, Copy)]
pub struct LexicalRule {
    pub name: &'static str,
    pub score: f32,
    pub predicate: RulePredicate,
}

impl LexicalRule {
    pub const fn new(name: &'static str, score: f32, predicate: RulePredicate) -> Self {
        Self {
            name,
            score,
            predicate,
        }
    }

    #[inline]
    pub fn applies(&self, ctx: &RuleContext<'_>) -> bool {
        (self.predicate)(ctx)
    }
}

impl fmt::Debug for LexicalRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LexicalRule")
            .field("name", &self.name)
            .field("score", &self.score)
            .finish()
    }
}

/// Field text contains the key, or the key contains a non-empty field text
pub fn key_in_text(ctx: &RuleContext<'_>) -> bool {
    ctx.field_text.contains(ctx.key_lower)
        || (!ctx.field_text.is_empty() && ctx.key_lower.contains(ctx.field_text))
}

/// An underscore-delimited key token longer than two characters appears in the field text
pub fn key_token(ctx: &RuleContext<'_>) -> bool {
    ctx.key_lower
        .split('_')
        .any(|word| word.chars().count() > 2 && ctx.field_text.contains(word))
}

/// The declared input type agrees with the key
pub fn declared_type(ctx: &RuleContext<'_>) -> bool {
    declared_type_matches(ctx.field_type, ctx.key_lower)
}

/// Key and field text share a keyword from a category matching the field type.
/// `text` fields are checked against every category.
pub fn type_keyword(ctx: &RuleContext<'_>) -> bool {
    TYPE_KEYWORDS
        .iter()
        .filter(|(category, _)| ctx.field_type == *category || ctx.field_type == "text")
        .flat_map(|(_, keywords)| keywords.iter())
        .any(|keyword| ctx.key_lower.contains(keyword) && ctx.field_text.contains(keyword))
}

/// The field text contains a known variant spelling of the key
pub fn known_variant(ctx: &RuleContext<'_>) -> bool {
    KEY_VARIANTS
        .iter()
        .find(|(key, _)| *key == ctx.key)
        .map_or(false, |(_, variants)| {
            variants.iter().any(|variant| ctx.field_text.contains(variant))
        })
}

/// Email, phone and date inputs agree with keys mentioning the same concept.
/// Shared with the semantic matcher's type bonus.
pub fn declared_type_matches(field_type: &str, key_lower: &str) -> bool {
    match field_type {
        "email" => key_lower.contains("email") || key_lower.contains("mail"),
        "tel" => key_lower.contains("phone") || key_lower.contains("tel"),
        "date" => key_lower.contains("date") || key_lower.contains("birth"),
        _ => false,
    }
}

/// The built-in rule table
pub fn default_rules() -> Vec<LexicalRule> {
    vec![
        LexicalRule::new("key_in_text", 0.9, key_in_text),
        LexicalRule::new("key_token", 0.6, key_token),
        LexicalRule::new("declared_type", 0.8, declared_type),
        LexicalRule::new("type_keyword", 0.7, type_keyword),
        LexicalRule::new("known_variant", 0.85, known_variant),
    ]
}

/// Rule-based matcher. Always available and cheap.
#[derive(Debug, Clone)]
pub struct LexicalMatcher {
    rules: Vec<LexicalRule>,
    threshold: f32,
}

impl Default for LexicalMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl LexicalMatcher {
    pub const DEFAULT_THRESHOLD: f32 = 0.3;

    pub fn new() -> Self {
        Self::with_rules(default_rules())
    }

    /// Create a matcher over a custom rule table
    pub fn with_rules(rules: Vec<LexicalRule>) -> Self {
        Self {
            rules,
            threshold: Self::DEFAULT_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn rules(&self) -> &[LexicalRule] {
        &self.rules
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Score one key against prepared field text: the best satisfied rule, or 0
    pub fn score(&self, field_type: &str, field_text: &str, key: &str) -> f32 {
        let key_lower = key.to_lowercase();
        let ctx = RuleContext {
            field_type,
            field_text,
            key,
            key_lower: &key_lower,
        };
        self.rules
            .iter()
            .filter(|rule| rule.applies(&ctx))
            .map(|rule| rule.score)
            .fold(0.0, f32::max)
    }

    /// Score one key against a field
    pub fn score_key(&self, field: &FieldDescriptor, key: &str) -> f32 {
        self.score(&field.field_type, &field.match_text(), key)
    }

    /// Find the best key for a field.
    ///
    /// A key replaces the running best only when its score is strictly greater
    /// and reaches the threshold, so on exact ties the first key in record
    /// order wins.
    pub fn match_field(
        &self,
        field: &FieldDescriptor,
        data: &UserDataRecord,
    ) -> Option<MatchCandidate> {
        let field_text = field.match_text();
        let mut best: Option<MatchCandidate> = None;
        let mut best_score = 0.0f32;

        for (key, value) in data.iter() {
            let score = self.score(&field.field_type, &field_text, key);
            if score > best_score && score >= self.threshold {
                best_score = score;
                best = Some(MatchCandidate::new(key, value, score, MatchMethod::Rules));
            }
        }

        if let Some(candidate) = &best {
            tracing::debug!(
                selector = %field.selector,
                key = %candidate.key,
                score = candidate.score,
                "lexical match"
            );
        }
        best
    }
}
