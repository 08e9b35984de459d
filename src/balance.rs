use rustc_hash::FxHashSet;

use crate::tree::{ColumnNode, NodeKind};

/// Suffix appended to a wrapped node's id for each placeholder level.
pub const PLACEHOLDER_SUFFIX: &str = "_previous_placeholder";

/// Equalizes sibling subtree depths by wrapping shallower siblings in
/// placeholder chains. Depth-first, one sibling group at a time; idempotent.
pub fn balance(mut root: ColumnNode) -> ColumnNode {
    balance_children(&mut root);
    root
}

fn balance_children(node: &mut ColumnNode) {
    if node.children.is_empty() {
        return;
    }
    // Each sibling group balances against its own max, not an ancestor's.
    let max_depth = node
        .children
        .iter()
        .map(ColumnNode::subtree_depth)
        .max()
        .unwrap_or(0);
    let children = std::mem::take(&mut node.children);
    node.children = children
        .into_iter()
        .map(|child| balance_to(child, max_depth))
        .collect();
}

fn balance_to(mut node: ColumnNode, target_depth: usize) -> ColumnNode {
    let depth = node.subtree_depth();
    balance_children(&mut node);
    if depth < target_depth {
        wrap_in_placeholders(node, target_depth - depth)
    } else {
        node
    }
}

/// Stacks `levels` placeholders above the node. The chain is unbranching and
/// every placeholder records the real node it stands in for; repeating the
/// suffix per level keeps ids unique through multi-level chains.
fn wrap_in_placeholders(node: ColumnNode, levels: usize) -> ColumnNode {
    let target = node
        .placeholder_target
        .clone()
        .unwrap_or_else(|| node.id.clone());
    let mut wrapped = node;
    for _ in 0..levels {
        let id = format!("{}{PLACEHOLDER_SUFFIX}", wrapped.id);
        wrapped = ColumnNode {
            id,
            label: String::new(),
            kind: NodeKind::Placeholder,
            children: vec![wrapped],
            value_types: FxHashSet::default(),
            max_string_length: 0,
            placeholder_target: Some(target.clone()),
        };
    }
    wrapped
}
