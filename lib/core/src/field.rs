//! Field description model
//!
//! A [`FieldDescriptor`] describes one input control detected on a page. It is
//! produced by an external scanner and treated as read-only by matching,
//! planning and filling.

use serde::{Deserialize, Serialize};

/// One `{value, text}` entry of a choice field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SelectOption {
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub text: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            text: text.into(),
        }
    }
}

/// Description of a single detected form field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct FieldDescriptor {
    /// Locator that resolves to exactly one element at scan time
    pub selector: String,
    /// Semantic input kind (`email`, `tel`, `date`, `text`, `select-one`, ...)
    #[serde(rename = "type", default)]
    pub field_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub placeholder: String,
    #[serde(default)]
    pub required: bool,
    /// Current content of the control
    #[serde(default)]
    pub value: String,
    /// Non-empty only for choice fields
    #[serde(default)]
    pub options: Vec<SelectOption>,
    /// Page order, used as a tiebreak
    #[serde(default)]
    pub index: usize,
}

impl FieldDescriptor {
    pub fn new(selector: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            field_type: field_type.into(),
            ..Default::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_options(mut self, options: Vec<SelectOption>) -> Self {
        self.options = options;
        self
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Text used by both matchers: label, placeholder, name and id joined by
    /// spaces, lowercased and trimmed.
    pub fn match_text(&self) -> String {
        format!(
            "{} {} {} {}",
            self.label, self.placeholder, self.name, self.id
        )
        .to_lowercase()
        .trim()
        .to_string()
    }

    /// Human-facing name for listings: label, then placeholder, then a fallback
    pub fn display_label(&self) -> &str {
        if !self.label.is_empty() {
            &self.label
        } else if !self.placeholder.is_empty() {
            &self.placeholder
        } else {
            "Unlabeled Field"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_text_joins_and_lowercases() {
        let field = FieldDescriptor::new("#email", "email")
            .with_label("Email Address")
            .with_placeholder("you@example.com")
            .with_name("userEmail")
            .with_id("email");
        assert_eq!(
            field.match_text(),
            "email address you@example.com useremail email"
        );
    }

    #[test]
    fn test_match_text_empty_field() {
        let field = FieldDescriptor::new("input:nth-of-type(1)", "text");
        assert_eq!(field.match_text(), "");
    }

    #[test]
    fn test_deserialize_scanner_json() {
        let json = r#"{
            "selector": "[name=\"country\"]",
            "type": "select-one",
            "name": "country",
            "label": "Country",
            "required": true,
            "options": [{"value": "us", "text": "United States"}],
            "index": 4
        }"#;
        let field: FieldDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(field.field_type, "select-one");
        assert_eq!(field.id, "");
        assert!(field.required);
        assert_eq!(field.options[0], SelectOption::new("us", "United States"));
        assert_eq!(field.index, 4);
    }

    #[test]
    fn test_display_label_fallbacks() {
        let field = FieldDescriptor::new("#a", "text").with_placeholder("Your city");
        assert_eq!(field.display_label(), "Your city");
        assert_eq!(FieldDescriptor::new("#b", "text").display_label(), "Unlabeled Field");
    }
}
