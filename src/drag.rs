use ratatui::layout::{Position, Rect};
use rustc_hash::FxHashSet;

use crate::order::ColumnOrder;
use crate::tree::{HeaderForest, NodeKind};

/// Which side of the hovered header the dragged block would land on.
/// Feedback for the drop indicator; the reorder itself derives the side
/// from the original positions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropSide {
    Before,
    After,
}

/// Axis the drag moves along: horizontal for columns, vertical for rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DragAxis {
    #[default]
    Horizontal,
    Vertical,
}

/// Pointer phases as delivered by the host plumbing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DragEvent {
    Start {
        source: String,
    },
    Enter {
        target: String,
    },
    /// Motion over a header; `area` is the hovered cell's rectangle.
    Over {
        target: String,
        area: Rect,
        cursor: Position,
    },
    Drop,
    End,
}

/// Ephemeral drag interaction state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        source: String,
    },
    HoveringTarget {
        source: String,
        target: String,
        side: DropSide,
    },
}

/// Result of feeding one event through the controller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DragOutcome {
    /// The event updated drag state.
    Handled,
    /// The event was ignored (disabled header, foreign group, no active drag).
    Ignored,
    /// A drop changed the order; carries the new sequence for the
    /// persistence and messaging collaborators.
    Reordered(Vec<String>),
}

/// Drives the drag state machine against a forest and an order.
///
/// The controller owns only the ephemeral state; the order is passed in by
/// the caller on each event and mutated exclusively through
/// [`ColumnOrder::reorder`].
#[derive(Clone, Debug, Default)]
pub struct DragController {
    state: DragState,
    axis: DragAxis,
    pinned_ids: FxHashSet<String>,
    disabled_drop_ids: FxHashSet<String>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn axis(mut self, axis: DragAxis) -> Self {
        self.axis = axis;
        self
    }

    pub fn set_axis(&mut self, axis: DragAxis) {
        self.axis = axis;
    }

    /// Marks a column as pinned: it can neither be dragged nor displaced.
    pub fn pin(&mut self, id: impl Into<String>) {
        self.pinned_ids.insert(id.into());
    }

    /// Excludes a column as a drop target without pinning it.
    pub fn disable_drop(&mut self, id: impl Into<String>) {
        self.disabled_drop_ids.insert(id.into());
    }

    pub const fn state(&self) -> &DragState {
        &self.state
    }

    /// Current hover target and side, for the drop indicator.
    pub fn drop_target(&self) -> Option<(&str, DropSide)> {
        match &self.state {
            DragState::HoveringTarget { target, side, .. } => Some((target, *side)),
            _ => None,
        }
    }

    fn is_disabled(&self, id: &str) -> bool {
        self.pinned_ids.contains(id) || self.disabled_drop_ids.contains(id)
    }

    fn is_draggable(&self, forest: &HeaderForest, id: &str) -> bool {
        !self.is_disabled(id)
            && matches!(
                forest.kind(id),
                Some(NodeKind::FileGroup | NodeKind::KeyGroup | NodeKind::Leaf)
            )
    }

    fn same_group(forest: &HeaderForest, a: &str, b: &str) -> bool {
        match (forest.root_of(a), forest.root_of(b)) {
            (Some(ra), Some(rb)) => strip_index_suffix(ra) == strip_index_suffix(rb),
            _ => false,
        }
    }

    fn can_hover(&self, forest: &HeaderForest, source: &str, target: &str) -> bool {
        forest.contains(target)
            && forest.kind(target) != Some(NodeKind::Category)
            && Self::same_group(forest, source, target)
    }

    /// Feeds one pointer event through the machine.
    pub fn handle(
        &mut self,
        forest: &HeaderForest,
        order: &mut ColumnOrder,
        event: DragEvent,
    ) -> DragOutcome {
        match event {
            DragEvent::Start { source } => {
                if !self.is_draggable(forest, &source) {
                    self.state = DragState::Idle;
                    return DragOutcome::Ignored;
                }
                self.state = DragState::Dragging { source };
                DragOutcome::Handled
            }
            DragEvent::Enter { target } => {
                let source = match &self.state {
                    DragState::Dragging { source }
                    | DragState::HoveringTarget { source, .. } => source.clone(),
                    DragState::Idle => return DragOutcome::Ignored,
                };
                if !self.can_hover(forest, &source, &target) {
                    return DragOutcome::Ignored;
                }
                self.state = DragState::HoveringTarget {
                    source,
                    target,
                    side: DropSide::After,
                };
                DragOutcome::Handled
            }
            DragEvent::Over {
                target,
                area,
                cursor,
            } => {
                let source = match &self.state {
                    DragState::Dragging { source }
                    | DragState::HoveringTarget { source, .. } => source.clone(),
                    DragState::Idle => return DragOutcome::Ignored,
                };
                if !self.can_hover(forest, &source, &target) {
                    return DragOutcome::Ignored;
                }
                let side = self.side_of(area, cursor);
                self.state = DragState::HoveringTarget {
                    source,
                    target,
                    side,
                };
                DragOutcome::Handled
            }
            DragEvent::Drop => {
                let state = std::mem::take(&mut self.state);
                let DragState::HoveringTarget { source, target, .. } = state else {
                    return DragOutcome::Ignored;
                };
                if source == target || self.is_disabled(&target) {
                    return DragOutcome::Ignored;
                }
                let displacer = forest.leaf_ids_under(&source);
                let displaced = forest.leaf_ids_under(&target);
                if order.reorder(&displacer, &displaced) {
                    DragOutcome::Reordered(order.ids().to_vec())
                } else {
                    DragOutcome::Handled
                }
            }
            DragEvent::End => {
                if self.state == DragState::Idle {
                    return DragOutcome::Ignored;
                }
                self.state = DragState::Idle;
                DragOutcome::Handled
            }
        }
    }

    fn side_of(&self, area: Rect, cursor: Position) -> DropSide {
        let before = match self.axis {
            DragAxis::Horizontal => u32::from(cursor.x) * 2 < u32::from(area.x) * 2 + u32::from(area.width),
            DragAxis::Vertical => u32::from(cursor.y) * 2 < u32::from(area.y) * 2 + u32::from(area.height),
        };
        if before { DropSide::Before } else { DropSide::After }
    }
}

/// Strips a trailing numeric disambiguation suffix (`_<digits>`), so
/// repeated group instances compare as one group.
fn strip_index_suffix(id: &str) -> &str {
    match id.rsplit_once('_') {
        Some((head, tail)) if !tail.is_empty() && tail.bytes().all(|b| b.is_ascii_digit()) => head,
        _ => id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ColumnDescriptor, PathCatalog};
    use crate::tree::TreeConfig;

    fn forest() -> HeaderForest {
        let catalog = PathCatalog::from_descriptors(vec![
            ColumnDescriptor::new("params:p.yaml", Some("params"), "p.yaml", &[]),
            ColumnDescriptor::new("params:p.yaml:a", Some("params:p.yaml"), "a", &[]),
            ColumnDescriptor::new("params:p.yaml:c", Some("params:p.yaml"), "c", &[]),
            ColumnDescriptor::new("params:p.yaml:c.d", Some("params:p.yaml:c"), "d", &[]),
            ColumnDescriptor::new("metrics:m.json", Some("metrics"), "m.json", &[]),
            ColumnDescriptor::new("metrics:m.json:acc", Some("metrics:m.json"), "acc", &[]),
        ]);
        HeaderForest::build(&catalog, &[], &TreeConfig::default())
    }

    fn initial_order(forest: &HeaderForest) -> ColumnOrder {
        ColumnOrder::reconcile(&[], forest)
    }

    #[test]
    fn drop_reorders_leaf_block() {
        let forest = forest();
        let mut order = initial_order(&forest);
        let mut drag = DragController::new();

        drag.handle(&forest, &mut order, DragEvent::Start {
            source: "params:p.yaml:c.d".to_string(),
        });
        drag.handle(&forest, &mut order, DragEvent::Enter {
            target: "params:p.yaml:a".to_string(),
        });
        let outcome = drag.handle(&forest, &mut order, DragEvent::Drop);

        let expected = vec![
            "params:p.yaml:c.d".to_string(),
            "params:p.yaml:a".to_string(),
            "metrics:m.json:acc".to_string(),
        ];
        assert_eq!(outcome, DragOutcome::Reordered(expected.clone()));
        assert_eq!(order.ids(), expected.as_slice());
        assert_eq!(*drag.state(), DragState::Idle);
    }

    #[test]
    fn group_drag_moves_all_descendant_leaves() {
        let forest = forest();
        let mut order = initial_order(&forest);
        let mut drag = DragController::new();

        // Drag the whole file group onto... itself has only one file; drag
        // the key group c onto leaf a instead.
        drag.handle(&forest, &mut order, DragEvent::Start {
            source: "params:p.yaml:c".to_string(),
        });
        drag.handle(&forest, &mut order, DragEvent::Enter {
            target: "params:p.yaml:a".to_string(),
        });
        let outcome = drag.handle(&forest, &mut order, DragEvent::Drop);

        assert!(matches!(outcome, DragOutcome::Reordered(_)));
        assert_eq!(order.ids()[0], "params:p.yaml:c.d");
    }

    #[test]
    fn pinned_columns_cannot_start_a_drag() {
        let forest = forest();
        let mut order = initial_order(&forest);
        let mut drag = DragController::new();
        drag.pin("params:p.yaml:a");

        let outcome = drag.handle(&forest, &mut order, DragEvent::Start {
            source: "params:p.yaml:a".to_string(),
        });
        assert_eq!(outcome, DragOutcome::Ignored);
        assert_eq!(*drag.state(), DragState::Idle);
    }

    #[test]
    fn entering_a_foreign_group_is_a_noop() {
        let forest = forest();
        let mut order = initial_order(&forest);
        let mut drag = DragController::new();

        drag.handle(&forest, &mut order, DragEvent::Start {
            source: "params:p.yaml:a".to_string(),
        });
        let outcome = drag.handle(&forest, &mut order, DragEvent::Enter {
            target: "metrics:m.json:acc".to_string(),
        });

        assert_eq!(outcome, DragOutcome::Ignored);
        assert_eq!(*drag.state(), DragState::Dragging {
            source: "params:p.yaml:a".to_string(),
        });
    }

    #[test]
    fn over_recomputes_side_from_cursor() {
        let forest = forest();
        let mut order = initial_order(&forest);
        let mut drag = DragController::new();

        drag.handle(&forest, &mut order, DragEvent::Start {
            source: "params:p.yaml:c.d".to_string(),
        });
        let area = Rect::new(10, 0, 8, 1);
        drag.handle(&forest, &mut order, DragEvent::Over {
            target: "params:p.yaml:a".to_string(),
            area,
            cursor: Position::new(11, 0),
        });
        assert_eq!(drag.drop_target(), Some(("params:p.yaml:a", DropSide::Before)));

        drag.handle(&forest, &mut order, DragEvent::Over {
            target: "params:p.yaml:a".to_string(),
            area,
            cursor: Position::new(16, 0),
        });
        assert_eq!(drag.drop_target(), Some(("params:p.yaml:a", DropSide::After)));
    }

    #[test]
    fn drop_on_self_returns_to_idle_without_change() {
        let forest = forest();
        let mut order = initial_order(&forest);
        let before = order.clone();
        let mut drag = DragController::new();

        drag.handle(&forest, &mut order, DragEvent::Start {
            source: "params:p.yaml:a".to_string(),
        });
        drag.handle(&forest, &mut order, DragEvent::Enter {
            target: "params:p.yaml:a".to_string(),
        });
        let outcome = drag.handle(&forest, &mut order, DragEvent::Drop);

        assert_eq!(outcome, DragOutcome::Ignored);
        assert_eq!(order, before);
        assert_eq!(*drag.state(), DragState::Idle);
    }

    #[test]
    fn drop_on_disabled_target_is_a_noop() {
        let forest = forest();
        let mut order = initial_order(&forest);
        let before = order.clone();
        let mut drag = DragController::new();
        drag.disable_drop("params:p.yaml:a");

        drag.handle(&forest, &mut order, DragEvent::Start {
            source: "params:p.yaml:c.d".to_string(),
        });
        drag.handle(&forest, &mut order, DragEvent::Enter {
            target: "params:p.yaml:a".to_string(),
        });
        let outcome = drag.handle(&forest, &mut order, DragEvent::Drop);

        assert_eq!(outcome, DragOutcome::Ignored);
        assert_eq!(order, before);
    }

    #[test]
    fn cancellation_leaves_the_order_untouched() {
        let forest = forest();
        let mut order = initial_order(&forest);
        let before = order.clone();
        let mut drag = DragController::new();

        drag.handle(&forest, &mut order, DragEvent::Start {
            source: "params:p.yaml:a".to_string(),
        });
        let outcome = drag.handle(&forest, &mut order, DragEvent::End);

        assert_eq!(outcome, DragOutcome::Handled);
        assert_eq!(*drag.state(), DragState::Idle);
        assert_eq!(order, before);
    }

    #[test]
    fn placeholders_are_not_draggable() {
        let forest = forest();
        let mut order = initial_order(&forest);
        let mut drag = DragController::new();

        let outcome = drag.handle(&forest, &mut order, DragEvent::Start {
            source: "params:p.yaml:a_previous_placeholder".to_string(),
        });
        assert_eq!(outcome, DragOutcome::Ignored);
    }

    #[test]
    fn index_suffixes_compare_as_one_group() {
        assert_eq!(strip_index_suffix("params_1"), "params");
        assert_eq!(strip_index_suffix("params"), "params");
        assert_eq!(strip_index_suffix("m_json"), "m_json");
    }
}
