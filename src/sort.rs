use crate::tree::{HeaderForest, NodeKind};

/// One sort request, keyed by a real column id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortDefinition {
    pub path: String,
    pub descending: bool,
}

impl SortDefinition {
    pub fn new(path: impl Into<String>, descending: bool) -> Self {
        Self {
            path: path.into(),
            descending,
        }
    }
}

/// Tri-state sort indicator for a displayed header cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SortState {
    Ascending,
    Descending,
    #[default]
    None,
}

/// Resolves the sort state of a displayed, possibly placeholder-wrapped,
/// header node. Groups are never sortable; placeholders inherit from the
/// real node they stand in for.
pub fn sort_state(forest: &HeaderForest, display_id: &str, sorts: &[SortDefinition]) -> SortState {
    let Some(base) = base_id(forest, display_id) else {
        return SortState::None;
    };
    if !forest.children_of(&base).is_empty() {
        return SortState::None;
    }
    match sorts.iter().find(|sort| sort.path == base) {
        Some(sort) if sort.descending => SortState::Descending,
        Some(_) => SortState::Ascending,
        None => SortState::None,
    }
}

/// True for nodes a sort request can target directly.
pub fn is_sortable(forest: &HeaderForest, id: &str) -> bool {
    forest.kind(id) == Some(NodeKind::Leaf)
}

/// Walks placeholder targets, then the parent chain, to the nearest
/// non-placeholder id.
fn base_id(forest: &HeaderForest, id: &str) -> Option<String> {
    if !forest.contains(id) {
        return None;
    }
    let mut current = id.to_string();
    loop {
        if forest.kind(&current) != Some(NodeKind::Placeholder) {
            return Some(current);
        }
        if let Some(target) = forest.placeholder_target(&current) {
            current = target.to_string();
            continue;
        }
        current = forest.parent(&current)?.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ColumnDescriptor, PathCatalog};
    use crate::tree::TreeConfig;

    fn forest() -> HeaderForest {
        // file > [a_previous_placeholder > a, c > c.d]
        let catalog = PathCatalog::from_descriptors(vec![
            ColumnDescriptor::new("params:p.yaml", Some("params"), "p.yaml", &[]),
            ColumnDescriptor::new("params:p.yaml:a", Some("params:p.yaml"), "a", &[]),
            ColumnDescriptor::new("params:p.yaml:c", Some("params:p.yaml"), "c", &[]),
            ColumnDescriptor::new("params:p.yaml:c.d", Some("params:p.yaml:c"), "d", &[]),
        ]);
        HeaderForest::build(&catalog, &[], &TreeConfig::default())
    }

    #[test]
    fn leaf_maps_presence_and_direction() {
        let forest = forest();
        let sorts = vec![SortDefinition::new("params:p.yaml:c.d", true)];

        assert_eq!(
            sort_state(&forest, "params:p.yaml:c.d", &sorts),
            SortState::Descending
        );
        assert_eq!(
            sort_state(&forest, "params:p.yaml:a", &sorts),
            SortState::None
        );

        let sorts = vec![SortDefinition::new("params:p.yaml:a", false)];
        assert_eq!(
            sort_state(&forest, "params:p.yaml:a", &sorts),
            SortState::Ascending
        );
    }

    #[test]
    fn placeholder_inherits_from_its_target() {
        let forest = forest();
        let sorts = vec![SortDefinition::new("params:p.yaml:a", true)];

        assert_eq!(
            sort_state(&forest, "params:p.yaml:a_previous_placeholder", &sorts),
            SortState::Descending
        );
    }

    #[test]
    fn groups_are_never_sortable() {
        let forest = forest();
        let sorts = vec![SortDefinition::new("params:p.yaml:c", false)];

        assert_eq!(sort_state(&forest, "params:p.yaml:c", &sorts), SortState::None);
        assert!(!is_sortable(&forest, "params:p.yaml:c"));
        assert!(is_sortable(&forest, "params:p.yaml:a"));
    }

    #[test]
    fn unknown_display_id_is_unsorted() {
        let forest = forest();
        let sorts = vec![SortDefinition::new("params:p.yaml:a", false)];
        assert_eq!(sort_state(&forest, "nope", &sorts), SortState::None);
    }
}
