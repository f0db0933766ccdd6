//! Fill executor
//!
//! Writes mapped values into a page in planned order, one field at a time.
//! Text is typed character by character with randomized pauses and the same
//! events a browser fires for real input; choice, checkbox, radio and date
//! controls are set directly.

use crate::config::FillConfig;
use crate::host::{ElementKind, Event, HostResult, PageElement, PageHost};
use crate::planner::plan_order;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use formfill_core::{MappingTable, SelectOption};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

/// Values a checkbox treats as "unchecked"
const FALSY_VALUES: &[&str] = &["", "0", "false", "no", "off"];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%B %d, %Y", "%d %B %Y"];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];

const PREVIEW_CHARS: usize = 50;

/// A field whose fill raised a host fault
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldFailure {
    pub selector: String,
    pub error: String,
}

/// Outcome of one [`FillExecutor::fill_form`] run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FillReport {
    /// Fields written successfully
    pub filled: usize,
    /// Selectors that no longer resolve to an element
    pub skipped: Vec<String>,
    /// Selectors left untouched: empty value, unsupported element or no matching option
    pub unfilled: Vec<String>,
    pub failed: Vec<FieldFailure>,
}

#[derive(Debug, Clone, Default)]
pub struct FillExecutor {
    config: FillConfig,
}

impl FillExecutor {
    pub fn new(config: FillConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FillConfig {
        &self.config
    }

    /// Fill every mapped field the layout can place, in planned order.
    ///
    /// Mappings whose selector has no layout are reported as skipped after the
    /// planned ones. A fault on one field is recorded and the run continues
    /// with the next.
    pub async fn fill_form<H>(&self, host: &mut H, mappings: &MappingTable) -> FillReport
    where
        H: PageHost + ?Sized,
    {
        let order = plan_order(mappings, &*host, self.config.row_tolerance);
        let planned: HashSet<&str> = order.iter().map(String::as_str).collect();
        let unplaced: Vec<String> = mappings
            .keys()
            .filter(|selector| !planned.contains(selector.as_str()))
            .cloned()
            .collect();
        let mut report = FillReport::default();

        for selector in order {
            let Some(mapping) = mappings.get(&selector) else {
                continue;
            };
            let Some(element) = host.element_mut(&selector) else {
                tracing::warn!(%selector, "field not found, skipping");
                report.skipped.push(selector);
                continue;
            };

            match self.fill_field(element, &mapping.value).await {
                Ok(true) => report.filled += 1,
                Ok(false) => {
                    tracing::debug!(%selector, "field left unfilled");
                    report.unfilled.push(selector);
                }
                Err(e) => {
                    tracing::warn!(%selector, error = %e, "error filling field");
                    report.failed.push(FieldFailure {
                        selector,
                        error: e.to_string(),
                    });
                }
            }

            pause(self.config.field_delay()).await;
        }

        for selector in unplaced {
            tracing::warn!(%selector, "field not found, skipping");
            report.skipped.push(selector);
        }

        tracing::info!(
            filled = report.filled,
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "fill complete"
        );
        report
    }

    /// Write one value into an element. Returns whether the element was filled.
    pub async fn fill_field(&self, element: &mut dyn PageElement, value: &str) -> HostResult<bool> {
        if value.is_empty() {
            return Ok(false);
        }

        match element.kind() {
            ElementKind::Input => self.fill_input(element, value).await,
            ElementKind::Textarea => {
                self.type_into(element, value).await?;
                Ok(true)
            }
            ElementKind::Select => fill_select(element, value),
            ElementKind::Other => Ok(false),
        }
    }

    /// Checkboxes follow [`is_truthy`], so `no`, `false`, `0` and `off` uncheck
    /// the box instead of checking it for any non-empty value.
    async fn fill_input(&self, element: &mut dyn PageElement, value: &str) -> HostResult<bool> {
        let input_type = element.input_type().to_ascii_lowercase();
        match input_type.as_str() {
            "checkbox" => {
                element.set_checked(is_truthy(value))?;
                element.dispatch(Event::Change)?;
            }
            "radio" => {
                element.set_checked(true)?;
                element.dispatch(Event::Change)?;
            }
            "date" | "datetime-local" => {
                element.set_value(&normalize_date(value))?;
                element.dispatch(Event::Change)?;
            }
            _ => self.type_into(element, value).await?,
        }
        Ok(true)
    }

    /// Focus, clear, type each character, blur, then fire `input` and `change`
    async fn type_into(&self, element: &mut dyn PageElement, text: &str) -> HostResult<()> {
        element.focus()?;
        element.set_value("")?;

        let mut typed = String::with_capacity(text.len());
        for ch in text.chars() {
            typed.push(ch);
            element.set_value(&typed)?;
            element.dispatch(Event::Input)?;
            pause(self.keystroke_delay()).await;
        }

        element.blur()?;
        element.dispatch(Event::Input)?;
        element.dispatch(Event::Change)?;
        Ok(())
    }

    fn keystroke_delay(&self) -> Duration {
        let min = self.config.typing_delay_min_ms;
        let max = self.config.typing_delay_max_ms.max(min);
        if max == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::rng().random_range(min..=max))
    }
}

fn fill_select(element: &mut dyn PageElement, value: &str) -> HostResult<bool> {
    let Some(option_value) = resolve_option(element.options(), value).map(|o| o.value.clone())
    else {
        return Ok(false);
    };
    element.set_value(&option_value)?;
    element.dispatch(Event::Change)?;
    Ok(true)
}

async fn pause(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}

/// Checkbox truthiness: anything except an empty string, `0`, `false`, `no`
/// or `off` (case-insensitive) checks the box.
pub fn is_truthy(value: &str) -> bool {
    let normalized = value.trim().to_lowercase();
    !FALSY_VALUES.contains(&normalized.as_str())
}

/// Render a date as `YYYY-MM-DD` when it can be parsed, else return it unchanged
pub fn normalize_date(value: &str) -> String {
    let trimmed = value.trim();
    parse_date(trimmed)
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| value.to_string())
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        })
}

/// Pick the option a value refers to.
///
/// Priority: exact value, exact text, containment of text in value or value
/// in text, then a shared three-character prefix. Comparisons ignore case;
/// options with empty text never match by containment or prefix.
pub fn resolve_option<'a>(options: &'a [SelectOption], value: &str) -> Option<&'a SelectOption> {
    let wanted = value.trim().to_lowercase();
    if wanted.is_empty() {
        return None;
    }

    if let Some(option) = options.iter().find(|o| o.value.to_lowercase() == wanted) {
        return Some(option);
    }
    if let Some(option) = options
        .iter()
        .find(|o| o.text.trim().to_lowercase() == wanted)
    {
        return Some(option);
    }

    let texts: Vec<String> = options.iter().map(|o| o.text.trim().to_lowercase()).collect();

    let contained = texts
        .iter()
        .position(|text| !text.is_empty() && (text.contains(&wanted) || wanted.contains(text.as_str())));
    if let Some(index) = contained {
        return Some(&options[index]);
    }

    let wanted_prefix = prefix(&wanted);
    texts
        .iter()
        .position(|text| {
            !text.is_empty() && (text.contains(&wanted_prefix) || wanted.contains(&prefix(text)))
        })
        .map(|index| &options[index])
}

fn prefix(text: &str) -> String {
    text.chars().take(3).collect()
}

/// A field that would be filled, and what with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewEntry {
    pub selector: String,
    pub label: String,
}

/// Describe what a fill would write, for every mapping whose element resolves
pub fn preview<H>(host: &H, mappings: &MappingTable) -> Vec<PreviewEntry>
where
    H: PageHost + ?Sized,
{
    mappings
        .iter()
        .filter(|(selector, _)| host.element(selector).is_some())
        .map(|(selector, mapping)| PreviewEntry {
            selector: selector.clone(),
            label: format!(
                "Will fill: \"{}\"",
                mapping.value.chars().take(PREVIEW_CHARS).collect::<String>()
            ),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::virtual_page::{VirtualElement, VirtualPage};
    use formfill_core::{FieldDescriptor, FieldMapping};

    fn executor() -> FillExecutor {
        FillExecutor::new(FillConfig::default().without_delays())
    }

    fn mappings(pairs: &[(&str, &str)]) -> MappingTable {
        pairs
            .iter()
            .map(|(selector, value)| {
                let field = FieldDescriptor::new(*selector, "text");
                (selector.to_string(), FieldMapping::manual(&field, "key", *value))
            })
            .collect()
    }

    fn options() -> Vec<SelectOption> {
        vec![
            SelectOption::new("", "Select a country"),
            SelectOption::new("us", "United States"),
            SelectOption::new("gb", "United Kingdom"),
            SelectOption::new("de", "Germany"),
        ]
    }

    #[test]
    fn test_truthiness() {
        for falsy in ["", "0", "false", "No", " OFF "] {
            assert!(!is_truthy(falsy), "{:?}", falsy);
        }
        for truthy in ["1", "true", "yes", "on", "checked"] {
            assert!(is_truthy(truthy), "{:?}", truthy);
        }
    }

    #[test]
    fn test_normalize_date_formats() {
        assert_eq!(normalize_date("1990-03-05"), "1990-03-05");
        assert_eq!(normalize_date("1990/03/05"), "1990-03-05");
        assert_eq!(normalize_date("03/05/1990"), "1990-03-05");
        assert_eq!(normalize_date("March 5, 1990"), "1990-03-05");
        assert_eq!(normalize_date("5 March 1990"), "1990-03-05");
        assert_eq!(normalize_date("1990-03-05T10:30:00Z"), "1990-03-05");
        assert_eq!(normalize_date("1990-03-05T10:30"), "1990-03-05");
    }

    #[test]
    fn test_unparseable_date_is_kept() {
        assert_eq!(normalize_date("sometime in spring"), "sometime in spring");
    }

    #[test]
    fn test_resolve_option_priority() {
        let options = options();
        assert_eq!(resolve_option(&options, "GB").unwrap().value, "gb");
        assert_eq!(resolve_option(&options, "germany").unwrap().value, "de");
        assert_eq!(resolve_option(&options, "United States of America").unwrap().value, "us");
        // "kingdom" is contained in one option text only
        assert_eq!(resolve_option(&options, "Kingdom").unwrap().value, "gb");
        // prefix stage: "ger" appears in "germany"
        assert_eq!(resolve_option(&options, "Germania").unwrap().value, "de");
        assert!(resolve_option(&options, "Japan").is_none());
        assert!(resolve_option(&options, "").is_none());
    }

    #[test]
    fn test_empty_option_text_never_contains() {
        let options = vec![SelectOption::new("x", ""), SelectOption::new("fr", "France")];
        assert_eq!(resolve_option(&options, "fra").unwrap().value, "fr");
    }

    #[tokio::test]
    async fn test_typing_fires_events_per_character() {
        let mut page = VirtualPage::new().with(
            VirtualElement::input("#name", "text")
                .at(0.0, 0.0)
                .with_value("old"),
        );
        let report = executor().fill_form(&mut page, &mappings(&[("#name", "Ann")])).await;

        assert_eq!(report.filled, 1);
        let element = page.get("#name").unwrap();
        assert_eq!(element.value, "Ann");
        assert_eq!(
            element.events,
            [
                Event::Focus,
                Event::Input,
                Event::Input,
                Event::Input,
                Event::Blur,
                Event::Input,
                Event::Change
            ]
        );
    }

    #[tokio::test]
    async fn test_per_type_strategies() {
        let mut page = VirtualPage::new()
            .with(VirtualElement::input("#news", "checkbox").at(0.0, 0.0))
            .with(VirtualElement::input("#terms", "CHECKBOX").at(10.0, 0.0))
            .with(VirtualElement::input("#plan", "radio").at(100.0, 0.0))
            .with(VirtualElement::input("#dob", "date").at(200.0, 0.0))
            .with(VirtualElement::select("#country", options()).at(300.0, 0.0))
            .with(VirtualElement::textarea("#bio").at(400.0, 0.0));
        let table = mappings(&[
            ("#news", "no"),
            ("#terms", "yes"),
            ("#plan", "pro"),
            ("#dob", "March 5, 1990"),
            ("#country", "United Kingdom"),
            ("#bio", "Hi"),
        ]);

        let report = executor().fill_form(&mut page, &table).await;
        assert_eq!(report.filled, 6);
        assert!(!page.get("#news").unwrap().checked);
        assert!(page.get("#terms").unwrap().checked);
        assert!(page.get("#plan").unwrap().checked);
        assert_eq!(page.get("#dob").unwrap().value, "1990-03-05");
        assert_eq!(page.get("#country").unwrap().value, "gb");
        assert_eq!(page.get("#country").unwrap().events, [Event::Change]);
        assert_eq!(page.get("#bio").unwrap().value, "Hi");
    }

    #[tokio::test]
    async fn test_unfilled_skipped_and_failed() {
        let mut page = VirtualPage::new()
            .with(VirtualElement::input("#empty", "text").at(0.0, 0.0))
            .with(VirtualElement::select("#country", options()).at(100.0, 0.0))
            .with(VirtualElement::input("#stale", "text").at(200.0, 0.0).detached())
            .with(VirtualElement::input("#broken", "text").at(300.0, 0.0).failing("frozen"))
            .with(VirtualElement::input("#ok", "text").at(400.0, 0.0));
        let table = mappings(&[
            ("#empty", ""),
            ("#country", "Japan"),
            ("#stale", "x"),
            ("#broken", "x"),
            ("#ok", "fine"),
            ("#nowhere", "y"),
        ]);

        let report = executor().fill_form(&mut page, &table).await;
        assert_eq!(report.filled, 1);
        assert_eq!(report.unfilled, ["#empty", "#country"]);
        assert_eq!(report.skipped, ["#stale", "#nowhere"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].selector, "#broken");
        assert!(report.failed[0].error.contains("frozen"));
        assert_eq!(page.get("#ok").unwrap().value, "fine");
    }

    #[tokio::test]
    async fn test_removed_element_is_skipped() {
        let mut page = VirtualPage::new().with(VirtualElement::input("#ok", "text").at(0.0, 0.0));
        let table = mappings(&[("#removed", "gone"), ("#ok", "fine")]);

        let report = executor().fill_form(&mut page, &table).await;
        assert_eq!(report.filled, 1);
        assert_eq!(report.skipped, ["#removed"]);
        assert!(report.unfilled.is_empty());
        assert!(report.failed.is_empty());
        assert_eq!(
            report.filled + report.skipped.len() + report.unfilled.len() + report.failed.len(),
            table.len()
        );
    }

    #[tokio::test]
    async fn test_fill_follows_visual_order() {
        let mut page = VirtualPage::new()
            .with(VirtualElement::input("#right", "text").at(100.0, 50.0))
            .with(VirtualElement::input("#left", "text").at(120.0, 10.0))
            .with(VirtualElement::input("#below", "text").at(400.0, 0.0));
        let table = mappings(&[("#below", "c"), ("#right", "b"), ("#left", "a")]);

        let report = executor().fill_form(&mut page, &table).await;
        assert_eq!(report.filled, 3);
        assert_eq!(
            plan_order(&table, &page, executor().config().row_tolerance),
            ["#left", "#right", "#below"]
        );
    }

    #[tokio::test]
    async fn test_other_elements_are_not_filled() {
        let mut page = VirtualPage::new()
            .with(VirtualElement::new("#button", ElementKind::Other).at(0.0, 0.0));
        let report = executor().fill_form(&mut page, &mappings(&[("#button", "x")])).await;
        assert_eq!(report.filled, 0);
        assert_eq!(report.unfilled, ["#button"]);
        assert!(report.failed.is_empty());
    }

    #[test]
    fn test_preview_labels() {
        let page = VirtualPage::new()
            .with(VirtualElement::input("#a", "text"))
            .with(VirtualElement::input("#gone", "text").detached());
        let long = "x".repeat(80);
        let entries = preview(&page, &mappings(&[("#a", long.as_str()), ("#gone", "y")]));

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].selector, "#a");
        assert_eq!(entries[0].label, format!("Will fill: \"{}\"", "x".repeat(50)));
    }
}
