//! Balanced hierarchical column headers for ratatui, with drag reordering,
//! placeholder depth balancing, and sort correlation.
//!
//! Feature flags:
//! - `pointer`: crossterm-based mouse translation via `pointer::resolve`.
//! - `serde`: serde support for `HeaderGridSnapshot`.

mod balance;
mod catalog;
mod depth;
mod drag;
mod order;
#[cfg(feature = "pointer")]
pub mod pointer;
pub mod prelude;
mod sort;
mod style;
mod tree;
mod widget;

pub use balance::{PLACEHOLDER_SUFFIX, balance};
pub use catalog::{
    ColumnDescriptor, PathCatalog, ValueKind, ValueSummary, render_value, resolve_value,
    scan_revisions,
};
pub use depth::{resizer_height_percent, upper_levels};
pub use drag::{DragAxis, DragController, DragEvent, DragOutcome, DragState, DropSide};
pub use order::{ColumnOrder, reorder_ids};
pub use sort::{SortDefinition, SortState, is_sortable, sort_state};
pub use style::HeaderGridStyle;
pub use tree::{ColumnNode, HeaderForest, NodeKind, OrphanPolicy, TreeConfig, build_roots};
pub use widget::{
    ColumnWidth, HeaderGrid, HeaderGridSnapshot, HeaderGridState, distribute_widths,
};
