//! In-memory page host
//!
//! A [`VirtualPage`] is a JSON-loadable snapshot of a form: each element has a
//! selector, a kind, its current value and its position. Every interaction is
//! recorded in the element's event log, which makes fills observable without
//! a browser.

use crate::host::{ElementKind, Event, HostError, HostResult, PageElement, PageHost};
use crate::planner::{LayoutSource, Position};
use formfill_core::{Result, SelectOption};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VirtualElement {
    pub selector: String,
    pub kind: ElementKind,
    #[serde(rename = "type", default)]
    pub input_type: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub checked: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    /// Removed from the document after layout was captured
    #[serde(default)]
    pub detached: bool,
    /// When set, every mutating operation fails with this message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fault: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<Event>,
    #[serde(skip)]
    focused: bool,
}

impl VirtualElement {
    pub fn new(selector: impl Into<String>, kind: ElementKind) -> Self {
        Self {
            selector: selector.into(),
            kind,
            input_type: String::new(),
            value: String::new(),
            checked: false,
            options: Vec::new(),
            position: None,
            detached: false,
            fault: None,
            events: Vec::new(),
            focused: false,
        }
    }

    pub fn input(selector: impl Into<String>, input_type: impl Into<String>) -> Self {
        let mut element = Self::new(selector, ElementKind::Input);
        element.input_type = input_type.into();
        element
    }

    pub fn textarea(selector: impl Into<String>) -> Self {
        Self::new(selector, ElementKind::Textarea)
    }

    pub fn select(selector: impl Into<String>, options: Vec<SelectOption>) -> Self {
        let mut element = Self::new(selector, ElementKind::Select);
        element.options = options;
        element
    }

    pub fn at(mut self, top: f64, left: f64) -> Self {
        self.position = Some(Position::new(top, left));
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn detached(mut self) -> Self {
        self.detached = true;
        self
    }

    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.fault = Some(message.into());
        self
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    fn check_fault(&self) -> HostResult<()> {
        match &self.fault {
            Some(message) => Err(HostError::Fault(message.clone())),
            None => Ok(()),
        }
    }
}

impl PageElement for VirtualElement {
    fn kind(&self) -> ElementKind {
        self.kind
    }

    fn input_type(&self) -> &str {
        &self.input_type
    }

    fn value(&self) -> &str {
        &self.value
    }

    fn set_value(&mut self, value: &str) -> HostResult<()> {
        self.check_fault()?;
        if self.kind == ElementKind::Other {
            return Err(HostError::Unsupported {
                kind: self.kind,
                operation: "set_value",
            });
        }
        self.value = value.to_string();
        Ok(())
    }

    fn set_checked(&mut self, checked: bool) -> HostResult<()> {
        self.check_fault()?;
        let checkable = self.kind == ElementKind::Input
            && matches!(self.input_type.to_ascii_lowercase().as_str(), "checkbox" | "radio");
        if !checkable {
            return Err(HostError::Unsupported {
                kind: self.kind,
                operation: "set_checked",
            });
        }
        self.checked = checked;
        Ok(())
    }

    fn options(&self) -> &[SelectOption] {
        &self.options
    }

    fn focus(&mut self) -> HostResult<()> {
        self.check_fault()?;
        self.focused = true;
        self.events.push(Event::Focus);
        Ok(())
    }

    fn blur(&mut self) -> HostResult<()> {
        self.focused = false;
        self.events.push(Event::Blur);
        Ok(())
    }

    fn dispatch(&mut self, event: Event) -> HostResult<()> {
        self.events.push(event);
        Ok(())
    }
}

/// A JSON-loadable form snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VirtualPage {
    pub elements: Vec<VirtualElement>,
}

impl VirtualPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, element: VirtualElement) -> Self {
        self.elements.push(element);
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Look up an element regardless of whether it is still attached
    pub fn get(&self, selector: &str) -> Option<&VirtualElement> {
        self.elements.iter().find(|e| e.selector == selector)
    }

    fn attached_mut(&mut self, selector: &str) -> Option<&mut VirtualElement> {
        self.elements
            .iter_mut()
            .find(|e| e.selector == selector && !e.detached)
    }
}

impl LayoutSource for VirtualPage {
    fn position(&self, selector: &str) -> Option<Position> {
        self.get(selector).and_then(|e| e.position)
    }
}

impl PageHost for VirtualPage {
    fn element(&self, selector: &str) -> Option<&dyn PageElement> {
        self.get(selector)
            .filter(|e| !e.detached)
            .map(|e| e as &dyn PageElement)
    }

    fn element_mut(&mut self, selector: &str) -> Option<&mut dyn PageElement> {
        self.attached_mut(selector)
            .map(|e| e as &mut dyn PageElement)
    }
}
