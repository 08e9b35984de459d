use crate::tree::{HeaderForest, NodeKind};

/// Counts how many ancestor/placeholder levels a resize control must span
/// above a header cell so that it visually runs through the transparent
/// rows stacked over the node.
pub fn upper_levels(forest: &HeaderForest, id: &str) -> usize {
    count(forest, id, 0)
}

fn count(forest: &HeaderForest, id: &str, carried: usize) -> usize {
    match forest.parent(id) {
        None => {
            // Topmost in its chain: span through any placeholder standing in
            // for this node elsewhere in the tree.
            let placeholders = forest.placeholders_targeting(id);
            placeholders
                .iter()
                .map(|p| count(forest, p, carried + 1))
                .max()
                .unwrap_or(carried)
        }
        Some(parent) => {
            let siblings = forest.children_of(parent);
            let is_last = siblings
                .last()
                .is_some_and(|last| cleaned_position(last) == cleaned_position(id));
            if is_last || forest.kind(parent) == Some(NodeKind::Placeholder) {
                count(forest, parent, carried + 1)
            } else {
                carried
            }
        }
    }
}

/// Strips the synthetic leading disambiguation segment (`<digits>_`) that
/// repeated header instances carry, leaving the hierarchical position.
fn cleaned_position(id: &str) -> &str {
    match id.split_once('_') {
        Some((prefix, rest)) if !prefix.is_empty() && prefix.bytes().all(|b| b.is_ascii_digit()) => {
            rest
        }
        _ => id,
    }
}

/// Height of a header cell's resize handle, in percent of the cell height.
/// Placeholder cells keep a flat handle.
pub fn resizer_height_percent(forest: &HeaderForest, id: &str) -> usize {
    if forest.kind(id) == Some(NodeKind::Placeholder) {
        return 100;
    }
    100 + upper_levels(forest, id) * 92
}
