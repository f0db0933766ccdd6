//! Page host abstraction
//!
//! The executor never touches a document directly. A [`PageHost`] resolves
//! selectors to live elements and reports their geometry; a [`PageElement`]
//! exposes the handful of operations a user could perform on a control.

use crate::planner::LayoutSource;
use formfill_core::SelectOption;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Faults raised by a page host while operating on an element
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("Element detached from page: {0}")]
    Detached(String),

    #[error("Operation '{operation}' not supported by {kind} element")]
    Unsupported {
        kind: ElementKind,
        operation: &'static str,
    },

    #[error("Host fault: {0}")]
    Fault(String),
}

pub type HostResult<T> = std::result::Result<T, HostError>;

/// Tag of a page element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Input,
    Textarea,
    Select,
    Other,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementKind::Input => "input",
            ElementKind::Textarea => "textarea",
            ElementKind::Select => "select",
            ElementKind::Other => "other",
        };
        f.write_str(name)
    }
}

/// Events dispatched the way a browser would after user interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Event {
    Focus,
    Blur,
    Input,
    Change,
}

/// A live form control
pub trait PageElement: Send {
    fn kind(&self) -> ElementKind;

    /// Lowercased `type` attribute for inputs, empty for other kinds
    fn input_type(&self) -> &str;

    fn value(&self) -> &str;

    fn set_value(&mut self, value: &str) -> HostResult<()>;

    fn set_checked(&mut self, checked: bool) -> HostResult<()>;

    /// Choices of a select element, empty otherwise
    fn options(&self) -> &[SelectOption];

    fn focus(&mut self) -> HostResult<()>;

    fn blur(&mut self) -> HostResult<()>;

    fn dispatch(&mut self, event: Event) -> HostResult<()>;
}

/// A page that resolves selectors to elements
pub trait PageHost: LayoutSource + Send {
    fn element(&self, selector: &str) -> Option<&dyn PageElement>;

    fn element_mut(&mut self, selector: &str) -> Option<&mut dyn PageElement>;
}
