//! # formfill Fill
//!
//! Fill-order planning and fill execution for formfill.
//!
//! Given a mapping table from the matcher, this crate decides the order in
//! which to visit fields and writes each value into the page through the
//! [`PageHost`] abstraction, simulating user input.
//!
//! ## Example
//!
//! ```rust
//! use formfill_core::{FieldDescriptor, FieldMapping, MappingTable};
//! use formfill_fill::{FillConfig, FillExecutor, VirtualElement, VirtualPage};
//!
//! # tokio_test_block(async {
//! let field = FieldDescriptor::new("#email", "email");
//! let mut mappings = MappingTable::new();
//! mappings.insert("#email".to_string(), FieldMapping::manual(&field, "email", "a@b.com"));
//!
//! let mut page = VirtualPage::new().with(VirtualElement::input("#email", "email").at(10.0, 10.0));
//! let executor = FillExecutor::new(FillConfig::default().without_delays());
//! let report = executor.fill_form(&mut page, &mappings).await;
//! assert_eq!(report.filled, 1);
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(f)
//! # }
//! ```

pub mod config;
pub mod executor;
pub mod host;
pub mod planner;
pub mod virtual_page;

pub use config::FillConfig;
pub use executor::{
    is_truthy, normalize_date, preview, resolve_option, FieldFailure, FillExecutor, FillReport,
    PreviewEntry,
};
pub use host::{ElementKind, Event, HostError, HostResult, PageElement, PageHost};
pub use planner::{plan_order, LayoutSource, Position};
pub use virtual_page::{VirtualElement, VirtualPage};
