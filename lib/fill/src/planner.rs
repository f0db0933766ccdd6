//! Fill-order planner
//!
//! Orders mapped fields the way a person reads a form: top to bottom, and
//! left to right within a visual row. Rows are formed by sweeping the fields
//! sorted by `top` and opening a new row whenever a field sits more than the
//! tolerance below the first field of the current row. This keeps the order
//! total even when row membership would not be transitive pairwise.

use formfill_core::MappingTable;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// Document coordinates of an element's top-left corner, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub top: f64,
    pub left: f64,
}

impl Position {
    pub fn new(top: f64, left: f64) -> Self {
        Self { top, left }
    }
}

/// Answers where a selector currently renders
pub trait LayoutSource {
    /// `None` when the selector no longer resolves
    fn position(&self, selector: &str) -> Option<Position>;
}

/// Visiting order for the mapped selectors.
///
/// Selectors without a position are dropped. Fields that tie on both axes
/// keep their mapping-table order.
pub fn plan_order<L>(mappings: &MappingTable, layout: &L, row_tolerance: f64) -> Vec<String>
where
    L: LayoutSource + ?Sized,
{
    let mut placed: Vec<(&str, Position)> = mappings
        .keys()
        .filter_map(|selector| {
            let position = layout.position(selector);
            if position.is_none() {
                tracing::debug!(%selector, "dropping selector without layout");
            }
            position.map(|p| (selector.as_str(), p))
        })
        .collect();

    placed.sort_by_key(|(_, p)| OrderedFloat(p.top));

    let mut order = Vec::with_capacity(placed.len());
    let mut start = 0;
    while start < placed.len() {
        let anchor = placed[start].1.top;
        let end = placed[start..]
            .iter()
            .position(|(_, p)| p.top - anchor > row_tolerance)
            .map_or(placed.len(), |offset| start + offset);

        let row = &mut placed[start..end];
        row.sort_by_key(|(_, p)| OrderedFloat(p.left));
        order.extend(row.iter().map(|(selector, _)| selector.to_string()));
        start = end;
    }
    order
}
