use ratatui::layout::{Position, Rect};
use ratatui::prelude::Buffer;
use ratatui::widgets::StatefulWidget;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::drag::{DragController, DragEvent, DragOutcome, DragState};
use crate::order::ColumnOrder;
use crate::sort::{SortDefinition, SortState, sort_state};
use crate::style::HeaderGridStyle;
use crate::tree::{ColumnNode, HeaderForest, NodeKind};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Width constraints for one leaf cell.
#[derive(Clone, Copy, Debug)]
pub struct ColumnWidth {
    /// Minimum width.
    pub min: u16,
    /// Ideal width (used before expanding toward max).
    pub ideal: u16,
    /// Maximum width.
    pub max: u16,
}

impl ColumnWidth {
    /// Creates a fixed width (min = ideal = max).
    pub const fn fixed(width: u16) -> Self {
        Self {
            min: width,
            ideal: width,
            max: width,
        }
    }
}

/// Distributes `total` width across columns respecting `min`/`ideal`/`max`.
///
/// If `total` is outside the feasible range (`sum(min)`..=`sum(max)`), the
/// returned widths are clamped to `min` or `max` respectively (so the sum may
/// differ from `total`).
pub fn distribute_widths(total: u16, columns: &[ColumnWidth]) -> SmallVec<[u16; 8]> {
    let mut widths = SmallVec::<[u16; 8]>::with_capacity(columns.len());
    let mut min_sum: u16 = 0;
    for col in columns {
        min_sum = min_sum.saturating_add(col.min);
        widths.push(col.min);
    }

    let mut remaining = total.saturating_sub(min_sum);
    if remaining == 0 {
        return widths;
    }

    // First grow toward ideal widths.
    for (idx, col) in columns.iter().enumerate() {
        if remaining == 0 {
            break;
        }
        let target = col.ideal.max(col.min);
        let add = target.saturating_sub(widths[idx]).min(remaining);
        widths[idx] = widths[idx].saturating_add(add);
        remaining = remaining.saturating_sub(add);
    }

    // Then expand toward max widths if space remains.
    for (idx, col) in columns.iter().enumerate() {
        if remaining == 0 {
            break;
        }
        let add = col.max.saturating_sub(widths[idx]).min(remaining);
        widths[idx] = widths[idx].saturating_add(add);
        remaining = remaining.saturating_sub(add);
    }

    widths
}

/// Snapshot of the persistable widget state (order, column widths).
///
/// With the `serde` feature enabled, this type derives `Serialize`/`Deserialize`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default)]
pub struct HeaderGridSnapshot {
    /// Flat left-to-right order of leaf column ids.
    pub order: Vec<String>,
    /// Explicit per-column widths, as `(id, width)` pairs.
    pub column_widths: Vec<(String, u16)>,
}

/// Widget state: display order, drag machine, explicit column widths, and
/// the cell rectangles recorded at render time for pointer hit-testing.
#[derive(Clone, Debug, Default)]
pub struct HeaderGridState {
    order: ColumnOrder,
    drag: DragController,
    column_widths: FxHashMap<String, u16>,
    cell_areas: Vec<(String, Rect)>,
}

impl HeaderGridState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconciles the order against the forest: ids no longer present are
    /// dropped, unseen leaf ids appended. Called on every render.
    pub fn sync(&mut self, forest: &HeaderForest) {
        let persisted = self.order.ids().to_vec();
        self.order = ColumnOrder::reconcile(&persisted, forest);
    }

    pub const fn order(&self) -> &ColumnOrder {
        &self.order
    }

    /// Returns a mutable reference to the drag controller (for pinning and
    /// drop exclusions).
    pub const fn drag_mut(&mut self) -> &mut DragController {
        &mut self.drag
    }

    pub const fn drag(&self) -> &DragController {
        &self.drag
    }

    /// Feeds one drag event through the state machine against this state's
    /// order.
    pub fn handle_drag(&mut self, forest: &HeaderForest, event: DragEvent) -> DragOutcome {
        self.drag.handle(forest, &mut self.order, event)
    }

    /// Sets an explicit width for a column, overriding content sizing.
    pub fn set_column_width(&mut self, id: impl Into<String>, width: u16) {
        self.column_widths.insert(id.into(), width);
    }

    pub fn column_width(&self, id: &str) -> Option<u16> {
        self.column_widths.get(id).copied()
    }

    /// Captures a snapshot of the persistable state.
    pub fn snapshot(&self) -> HeaderGridSnapshot {
        let mut column_widths: Vec<(String, u16)> = self
            .column_widths
            .iter()
            .map(|(id, width)| (id.clone(), *width))
            .collect();
        column_widths.sort();
        HeaderGridSnapshot {
            order: self.order.ids().to_vec(),
            column_widths,
        }
    }

    /// Restores persisted state. The order is reconciled against the forest
    /// on the next render.
    pub fn restore(&mut self, snapshot: HeaderGridSnapshot) {
        self.order = ColumnOrder::from_ids(snapshot.order);
        self.column_widths = snapshot.column_widths.into_iter().collect();
    }

    /// The header cell containing the position, if any.
    pub fn cell_at(&self, position: Position) -> Option<&str> {
        self.cell_areas
            .iter()
            .find(|(_, area)| area.contains(position))
            .map(|(id, _)| id.as_str())
    }

    /// The rectangle a header cell was last rendered into.
    pub fn cell_area(&self, id: &str) -> Option<Rect> {
        self.cell_areas
            .iter()
            .find(|(cell_id, _)| cell_id == id)
            .map(|(_, area)| *area)
    }
}

/// Renders a balanced header forest as stacked header rows.
///
/// Sibling groups are arranged by the minimum order index of their leaf
/// descendants, so the flat order drives left-to-right layout without
/// splitting groups. Subtrees shallower than the deepest one are padded with
/// blank placeholder rows on top so every leaf lands on the bottom row.
pub struct HeaderGrid<'a> {
    forest: &'a HeaderForest,
    style: HeaderGridStyle<'a>,
    sorts: &'a [SortDefinition],
}

impl<'a> HeaderGrid<'a> {
    pub const fn new(forest: &'a HeaderForest, style: HeaderGridStyle<'a>) -> Self {
        Self {
            forest,
            style,
            sorts: &[],
        }
    }

    #[must_use]
    pub const fn sorts(mut self, sorts: &'a [SortDefinition]) -> Self {
        self.sorts = sorts;
        self
    }

    fn min_order_index(node: &ColumnNode, order_index: &FxHashMap<String, usize>) -> usize {
        node.leaf_ids()
            .iter()
            .filter_map(|id| order_index.get(id).copied())
            .min()
            .unwrap_or(usize::MAX)
    }

    fn arrange<'n>(
        children: &'n [ColumnNode],
        order_index: &FxHashMap<String, usize>,
    ) -> Vec<&'n ColumnNode> {
        let mut arranged: Vec<&ColumnNode> = children.iter().collect();
        arranged.sort_by_key(|child| Self::min_order_index(child, order_index));
        arranged
    }

    fn collect_leaves<'n>(
        node: &'n ColumnNode,
        order_index: &FxHashMap<String, usize>,
        out: &mut Vec<&'n ColumnNode>,
    ) {
        if node.children.is_empty() {
            out.push(node);
            return;
        }
        for child in Self::arrange(&node.children, order_index) {
            Self::collect_leaves(child, order_index, out);
        }
    }

    fn leaf_width_spec(&self, leaf: &ColumnNode, state: &HeaderGridState) -> ColumnWidth {
        if let Some(width) = state.column_width(&leaf.id) {
            return ColumnWidth::fixed(width);
        }
        let content = leaf
            .label
            .chars()
            .count()
            .max(leaf.max_string_length)
            .min(u16::MAX as usize) as u16;
        ColumnWidth {
            min: self.style.min_cell_width,
            // Room for the sort indicator next to the label.
            ideal: content.saturating_add(2).max(self.style.min_cell_width),
            max: self.style.max_cell_width.max(self.style.min_cell_width),
        }
    }

    fn cell_style(&self, node: &ColumnNode, state: &HeaderGridState) -> ratatui::style::Style {
        let base = match node.kind {
            NodeKind::Placeholder => self.style.placeholder_style,
            NodeKind::Leaf => self.style.leaf_style,
            _ => self.style.group_style,
        };
        if let DragState::Dragging { source } | DragState::HoveringTarget { source, .. } =
            state.drag.state()
            && source == &node.id
        {
            return self.style.drag_source_style;
        }
        if state
            .drag
            .drop_target()
            .is_some_and(|(target, _)| target == node.id)
        {
            return self.style.drop_target_style;
        }
        base
    }

    fn render_node(
        &self,
        node: &ColumnNode,
        order_index: &FxHashMap<String, usize>,
        leaf_layout: &FxHashMap<String, (u16, u16)>,
        shift: u16,
        area: Rect,
        buf: &mut Buffer,
        cells: &mut Vec<(String, Rect)>,
        state: &HeaderGridState,
    ) {
        let leaves = node.leaf_ids();
        let span_x = leaves
            .iter()
            .filter_map(|id| leaf_layout.get(id).map(|(x, _)| *x))
            .min();
        let span_width: u16 = leaves
            .iter()
            .filter_map(|id| leaf_layout.get(id).map(|(_, w)| *w))
            .sum();
        let (Some(span_x), Some(depth)) = (span_x, self.forest.depth(&node.id)) else {
            return;
        };
        let y = area.y + shift + (depth as u16).saturating_sub(1);
        if y >= area.bottom() || span_x >= area.right() || span_width == 0 {
            return;
        }
        let width = span_width.min(area.right() - span_x);
        let cell_area = Rect::new(span_x, y, width, 1);

        let style = self.cell_style(node, state);
        buf.set_style(cell_area, style);
        let text = if node.kind == NodeKind::Leaf {
            match sort_state(self.forest, &node.id, self.sorts) {
                SortState::Ascending => format!("{} {}", node.label, self.style.ascending_symbol),
                SortState::Descending => format!("{} {}", node.label, self.style.descending_symbol),
                SortState::None => node.label.clone(),
            }
        } else {
            node.label.clone()
        };
        buf.set_stringn(cell_area.x, cell_area.y, text, width as usize, style);
        cells.push((node.id.clone(), cell_area));

        for child in Self::arrange(&node.children, order_index) {
            self.render_node(
                child,
                order_index,
                leaf_layout,
                shift,
                area,
                buf,
                cells,
                state,
            );
        }
    }
}

impl StatefulWidget for HeaderGrid<'_> {
    type State = HeaderGridState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        state.cell_areas.clear();
        state.sync(self.forest);
        if self.forest.is_empty() || area.is_empty() {
            return;
        }

        let order_index: FxHashMap<String, usize> = state
            .order
            .ids()
            .iter()
            .enumerate()
            .map(|(idx, id)| (id.clone(), idx))
            .collect();

        // Top-level headers across every root; categories are containers.
        let mut tops: Vec<&ColumnNode> = Vec::new();
        for root in self.forest.roots() {
            if root.kind == NodeKind::Category {
                tops.extend(root.children.iter());
            } else {
                tops.push(root);
            }
        }
        tops.sort_by_key(|top| Self::min_order_index(top, &order_index));

        let mut leaves: Vec<&ColumnNode> = Vec::new();
        for top in &tops {
            Self::collect_leaves(top, &order_index, &mut leaves);
        }

        let specs: Vec<ColumnWidth> = leaves
            .iter()
            .map(|leaf| self.leaf_width_spec(leaf, state))
            .collect();
        let widths = distribute_widths(area.width, &specs);

        let mut leaf_layout: FxHashMap<String, (u16, u16)> = FxHashMap::default();
        let mut x = area.x;
        for (leaf, width) in leaves.iter().zip(widths.iter()) {
            leaf_layout.insert(leaf.id.clone(), (x, *width));
            x = x.saturating_add(*width);
        }

        let total_depth = self.forest.max_depth() as u16;
        let mut cells: Vec<(String, Rect)> = Vec::new();
        for top in &tops {
            let leaf_depth = top
                .leaf_ids()
                .first()
                .and_then(|id| self.forest.depth(id))
                .unwrap_or(1) as u16;
            let shift = total_depth.saturating_sub(leaf_depth);

            // Blank filler rows above subtrees shallower than the deepest.
            if shift > 0 {
                let leaves = top.leaf_ids();
                let span_x = leaves
                    .iter()
                    .filter_map(|id| leaf_layout.get(id).map(|(x, _)| *x))
                    .min();
                let span_width: u16 = leaves
                    .iter()
                    .filter_map(|id| leaf_layout.get(id).map(|(_, w)| *w))
                    .sum();
                if let Some(span_x) = span_x
                    && span_x < area.right()
                {
                    let width = span_width.min(area.right() - span_x);
                    for row in 0..shift.min(area.height) {
                        let filler = Rect::new(span_x, area.y + row, width, 1);
                        buf.set_style(filler, self.style.placeholder_style);
                    }
                }
            }

            self.render_node(
                top,
                &order_index,
                &leaf_layout,
                shift,
                area,
                buf,
                &mut cells,
                state,
            );
        }
        state.cell_areas = cells;
    }
}
