use rustc_hash::FxHashSet;

use crate::tree::HeaderForest;

/// Computes a new flat order after a drag displacement.
///
/// `displacer` is the block of ids being moved, `displaced` the block it was
/// dropped relative to. The displacer ids are extracted as one contiguous run
/// (keeping their relative order) and re-inserted against the surviving
/// displaced ids: a block that sat after them lands immediately before, a
/// block that sat before lands immediately after. The result is always a
/// permutation of the input; unknown ids and degenerate inputs fall back to
/// the input unchanged.
pub fn reorder_ids(order: &[String], displacer: &[String], displaced: &[String]) -> Vec<String> {
    if displacer.is_empty() {
        return order.to_vec();
    }
    let displacer_set: FxHashSet<&str> = displacer.iter().map(String::as_str).collect();
    let displaced_set: FxHashSet<&str> = displaced.iter().map(String::as_str).collect();
    if displacer_set == displaced_set {
        return order.to_vec();
    }

    let first_displacer = order
        .iter()
        .position(|id| displacer_set.contains(id.as_str()));
    let last_displaced = order
        .iter()
        .rposition(|id| displaced_set.contains(id.as_str()));
    let (Some(first_displacer), Some(last_displaced)) = (first_displacer, last_displaced) else {
        return order.to_vec();
    };
    let was_after = first_displacer > last_displaced;

    let block: Vec<String> = order
        .iter()
        .filter(|id| displacer_set.contains(id.as_str()))
        .cloned()
        .collect();
    let mut remaining: Vec<String> = order
        .iter()
        .filter(|id| !displacer_set.contains(id.as_str()))
        .cloned()
        .collect();

    let insert_at = if was_after {
        remaining
            .iter()
            .position(|id| displaced_set.contains(id.as_str()))
    } else {
        remaining
            .iter()
            .rposition(|id| displaced_set.contains(id.as_str()))
            .map(|idx| idx + 1)
    };
    // No displaced id survived the extraction: nothing to anchor against.
    let Some(insert_at) = insert_at else {
        return order.to_vec();
    };

    remaining.splice(insert_at..insert_at, block);
    remaining
}

/// Flat left-to-right display order of orderable column ids.
///
/// Mutable only through [`ColumnOrder::reorder`]; rebuilt via
/// [`ColumnOrder::reconcile`] whenever the catalog changes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ColumnOrder {
    ids: Vec<String>,
}

impl ColumnOrder {
    pub const fn new() -> Self {
        Self { ids: Vec::new() }
    }

    pub fn from_ids(ids: Vec<String>) -> Self {
        Self { ids }
    }

    /// Reconciles a possibly stale persisted order against the current
    /// forest: ids no longer present are dropped, unseen leaf ids are
    /// appended at the end in display traversal order.
    pub fn reconcile(persisted: &[String], forest: &HeaderForest) -> Self {
        let current = forest.leaf_ids();
        let current_set: FxHashSet<&str> = current.iter().map(String::as_str).collect();
        let mut ids: Vec<String> = persisted
            .iter()
            .filter(|id| current_set.contains(id.as_str()))
            .cloned()
            .collect();
        let seen: FxHashSet<&str> = ids.iter().map(String::as_str).collect();
        let appended: Vec<String> = current
            .iter()
            .filter(|id| !seen.contains(id.as_str()))
            .cloned()
            .collect();
        ids.extend(appended);
        Self { ids }
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.ids.iter().position(|i| i == id)
    }

    /// Applies a displacement; returns whether the order changed.
    pub fn reorder(&mut self, displacer: &[String], displaced: &[String]) -> bool {
        let next = reorder_ids(&self.ids, displacer, displaced);
        if next == self.ids {
            return false;
        }
        self.ids = next;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| (*s).to_string()).collect()
    }

    fn assert_permutation(original: &[String], result: &[String]) {
        let mut a = original.to_vec();
        let mut b = result.to_vec();
        a.sort();
        b.sort();
        assert_eq!(a, b);
    }

    #[test]
    fn two_columns_swap() {
        let order = ids(&["id_1", "id_2"]);
        let result = reorder_ids(&order, &ids(&["id_2"]), &ids(&["id_1"]));
        assert_eq!(result, ids(&["id_2", "id_1"]));
    }

    #[test]
    fn forward_drag_lands_after_target() {
        let order = ids(&["id_1", "id_2", "id_3"]);
        let result = reorder_ids(&order, &ids(&["id_2"]), &ids(&["id_3"]));
        assert_eq!(result, ids(&["id_1", "id_3", "id_2"]));
    }

    #[test]
    fn empty_displacer_is_noop() {
        let order = ids(&["a", "b", "c"]);
        assert_eq!(reorder_ids(&order, &[], &ids(&["b"])), order);
    }

    #[test]
    fn equal_sets_are_noop() {
        let order = ids(&["a", "b", "c"]);
        assert_eq!(reorder_ids(&order, &ids(&["b"]), &ids(&["b"])), order);
    }

    #[test]
    fn unknown_ids_are_noop() {
        let order = ids(&["a", "b"]);
        assert_eq!(reorder_ids(&order, &ids(&["zz"]), &ids(&["a"])), order);
        assert_eq!(reorder_ids(&order, &ids(&["a"]), &ids(&["zz"])), order);
    }

    #[test]
    fn group_block_moves_contiguously() {
        // Dragging the [c, d] block from after [a, b] lands before it.
        let order = ids(&["a", "b", "c", "d", "e"]);
        let result = reorder_ids(&order, &ids(&["c", "d"]), &ids(&["a", "b"]));
        assert_eq!(result, ids(&["c", "d", "a", "b", "e"]));
        assert_permutation(&order, &result);
    }

    #[test]
    fn bystanders_keep_relative_order() {
        let order = ids(&["a", "b", "c", "d", "e", "f"]);
        let result = reorder_ids(&order, &ids(&["b"]), &ids(&["e"]));
        assert_eq!(result, ids(&["a", "c", "d", "e", "b", "f"]));
        assert_permutation(&order, &result);
    }

    #[test]
    fn scattered_displacer_extracts_as_one_block() {
        let order = ids(&["a", "x", "b", "y", "c"]);
        let result = reorder_ids(&order, &ids(&["x", "y"]), &ids(&["a"]));
        assert_eq!(result, ids(&["x", "y", "a", "b", "c"]));
        assert_permutation(&order, &result);
    }

    #[test]
    fn reconcile_tolerates_stale_persisted_order() {
        use crate::catalog::{ColumnDescriptor, PathCatalog};
        use crate::tree::TreeConfig;

        let catalog = PathCatalog::from_descriptors(vec![
            ColumnDescriptor::new("params:p.yaml", Some("params"), "p.yaml", &[]),
            ColumnDescriptor::new("params:p.yaml:a", Some("params:p.yaml"), "a", &[]),
            ColumnDescriptor::new("params:p.yaml:b", Some("params:p.yaml"), "b", &[]),
            ColumnDescriptor::new("params:p.yaml:c", Some("params:p.yaml"), "c", &[]),
        ]);
        let forest = HeaderForest::build(&catalog, &[], &TreeConfig::default());

        // "b" kept first per persisted order, removed "gone" dropped, "a"
        // and "c" appended in display order.
        let persisted = ids(&["params:p.yaml:b", "params:gone.yaml:x"]);
        let order = ColumnOrder::reconcile(&persisted, &forest);
        assert_eq!(
            order.ids(),
            ids(&["params:p.yaml:b", "params:p.yaml:a", "params:p.yaml:c"]).as_slice()
        );
    }

    #[test]
    fn reorder_mutation_reports_change() {
        let mut order = ColumnOrder::from_ids(ids(&["a", "b"]));
        assert!(order.reorder(&ids(&["b"]), &ids(&["a"])));
        assert_eq!(order.ids(), ids(&["b", "a"]).as_slice());
        assert!(!order.reorder(&ids(&["b"]), &ids(&["b"])));
    }
}
