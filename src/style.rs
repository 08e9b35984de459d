use ratatui::style::Style;

/// Visual settings for the header grid.
#[derive(Clone)]
pub struct HeaderGridStyle<'a> {
    pub group_style: Style,
    pub leaf_style: Style,
    pub placeholder_style: Style,
    pub drag_source_style: Style,
    pub drop_target_style: Style,
    pub ascending_symbol: &'a str,
    pub descending_symbol: &'a str,
    /// Narrowest a leaf cell may shrink to.
    pub min_cell_width: u16,
    /// Widest a leaf cell may grow to when distributing free space.
    pub max_cell_width: u16,
}

impl Default for HeaderGridStyle<'_> {
    fn default() -> Self {
        Self {
            group_style: Style::default(),
            leaf_style: Style::default(),
            placeholder_style: Style::default(),
            drag_source_style: Style::default(),
            drop_target_style: Style::default(),
            ascending_symbol: "▲",
            descending_symbol: "▼",
            min_cell_width: 4,
            max_cell_width: 24,
        }
    }
}
