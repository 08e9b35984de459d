// Minimal example: build a catalog from two revisions, balance it, and
// render the header grid into an in-memory buffer.
use ratatui::layout::Rect;
use ratatui::prelude::Buffer;
use ratatui::widgets::StatefulWidget;
use serde_json::json;

use tui_headergrid::{
    ColumnDescriptor, HeaderForest, HeaderGrid, HeaderGridState, HeaderGridStyle, PathCatalog,
    TreeConfig,
};

fn main() {
    // Flat descriptors, as collected from revision files.
    let catalog = PathCatalog::from_descriptors(vec![
        ColumnDescriptor::new("params:params.yaml", Some("params"), "params.yaml", &[]),
        ColumnDescriptor::new(
            "params:params.yaml:lr",
            Some("params:params.yaml"),
            "lr",
            &["params", "params.yaml", "lr"],
        ),
        ColumnDescriptor::new(
            "params:params.yaml:opt",
            Some("params:params.yaml"),
            "opt",
            &["params", "params.yaml", "opt"],
        ),
        ColumnDescriptor::new(
            "params:params.yaml:opt.beta",
            Some("params:params.yaml:opt"),
            "beta",
            &["params", "params.yaml", "opt", "beta"],
        ),
    ]);

    // Per-revision records the value accessors resolve into.
    let revisions = vec![
        json!({ "params": { "params.yaml": { "lr": 0.01, "opt": { "beta": 0.9 } } } }),
        json!({ "params": { "params.yaml": { "lr": 0.1 } } }),
    ];

    // Build + balance + index in one pass; `lr` gains a placeholder so both
    // leaves land on the same row.
    let forest = HeaderForest::build(&catalog, &revisions, &TreeConfig::default());

    // State holds the display order and must live across frames.
    let mut state = HeaderGridState::new();

    let area = Rect::new(0, 0, 40, 3);
    let mut buffer = Buffer::empty(area);
    HeaderGrid::new(&forest, HeaderGridStyle::default()).render(area, &mut buffer, &mut state);

    println!("order: {:?}", state.order().ids());
}
