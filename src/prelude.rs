pub use crate::{
    ColumnDescriptor, ColumnNode, ColumnOrder, ColumnWidth, DragAxis, DragController, DragEvent,
    DragOutcome, DragState, DropSide, HeaderForest, HeaderGrid, HeaderGridSnapshot,
    HeaderGridState, HeaderGridStyle, NodeKind, OrphanPolicy, PathCatalog, SortDefinition,
    SortState, TreeConfig, ValueKind, balance, build_roots, distribute_widths, reorder_ids,
    resizer_height_percent, sort_state, upper_levels,
};

#[cfg(feature = "pointer")]
pub use crate::pointer;
