// Reorder example: drive the drag state machine with synthesized mouse
// events through the pointer translation (requires the `pointer` feature).
use crossterm::event::{KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use ratatui::prelude::Buffer;
use ratatui::widgets::StatefulWidget;

use tui_headergrid::{
    ColumnDescriptor, DragOutcome, HeaderForest, HeaderGrid, HeaderGridState, HeaderGridStyle,
    PathCatalog, TreeConfig, pointer,
};

fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
    MouseEvent {
        kind,
        column,
        row,
        modifiers: KeyModifiers::NONE,
    }
}

fn main() {
    let catalog = PathCatalog::from_descriptors(vec![
        ColumnDescriptor::new("params:params.yaml", Some("params"), "params.yaml", &[]),
        ColumnDescriptor::new("params:params.yaml:a", Some("params:params.yaml"), "a", &[]),
        ColumnDescriptor::new("params:params.yaml:b", Some("params:params.yaml"), "b", &[]),
        ColumnDescriptor::new("params:params.yaml:c", Some("params:params.yaml"), "c", &[]),
    ]);
    let forest = HeaderForest::build(&catalog, &[], &TreeConfig::default());

    let mut state = HeaderGridState::new();
    let area = Rect::new(0, 0, 36, 2);
    let mut buffer = Buffer::empty(area);
    HeaderGrid::new(&forest, HeaderGridStyle::default()).render(area, &mut buffer, &mut state);
    println!("before: {:?}", state.order().ids());

    // Pick up `c` and drop it onto `a`.
    let source = state.cell_area("params:params.yaml:c").unwrap();
    let target = state.cell_area("params:params.yaml:a").unwrap();
    let gestures = [
        mouse(MouseEventKind::Down(MouseButton::Left), source.x, source.y),
        mouse(MouseEventKind::Drag(MouseButton::Left), target.x, target.y),
        mouse(MouseEventKind::Up(MouseButton::Left), target.x, target.y),
    ];

    for gesture in &gestures {
        let Some(event) = pointer::resolve(&state, gesture) else {
            continue;
        };
        if let DragOutcome::Reordered(order) = state.handle_drag(&forest, event) {
            println!("reordered: {order:?}");
        }
    }

    println!("after: {:?}", state.order().ids());
}
