use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Position;

use crate::drag::DragEvent;
use crate::widget::HeaderGridState;

/// Translates a terminal mouse event into a drag event, using the cell
/// rectangles the widget recorded at render time.
///
/// Returns `None` for events the drag machine has no use for (motion outside
/// any header, scroll, other buttons). A left-button release outside every
/// cell cancels the drag rather than dropping.
pub fn resolve(state: &HeaderGridState, mouse: &MouseEvent) -> Option<DragEvent> {
    let position = Position::new(mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let source = state.cell_at(position)?;
            Some(DragEvent::Start {
                source: source.to_string(),
            })
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            let target = state.cell_at(position)?;
            let area = state.cell_area(target)?;
            Some(DragEvent::Over {
                target: target.to_string(),
                area,
                cursor: position,
            })
        }
        MouseEventKind::Up(MouseButton::Left) => {
            if state.cell_at(position).is_some() {
                Some(DragEvent::Drop)
            } else {
                Some(DragEvent::End)
            }
        }
        _ => None,
    }
}
