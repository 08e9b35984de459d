use rustc_hash::{FxHashMap, FxHashSet};
use serde_json::Value;
use smallvec::SmallVec;

use crate::balance::balance;
use crate::catalog::{ColumnDescriptor, PathCatalog, ValueKind, scan_revisions};

/// Discriminates every node of the header hierarchy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// Synthetic root for one top-level category (e.g. "params").
    Category,
    /// Group directly under a category, one per source file.
    FileGroup,
    /// Group for a nested key inside a file.
    KeyGroup,
    /// Column bound to a concrete value accessor.
    Leaf,
    /// Zero-content filler inserted to equalize sibling depths.
    Placeholder,
}

/// One node of the header tree. Children are owned by value; every
/// back-reference (parent, placeholder target) lives in the id-keyed
/// metadata table on [`HeaderForest`], never as an ownership edge.
#[derive(Clone, Debug)]
pub struct ColumnNode {
    pub id: String,
    pub label: String,
    pub kind: NodeKind,
    pub children: Vec<ColumnNode>,
    pub value_types: FxHashSet<ValueKind>,
    pub max_string_length: usize,
    /// For [`NodeKind::Placeholder`] only: id of the real node it stands in for.
    pub placeholder_target: Option<String>,
}

impl ColumnNode {
    pub(crate) fn category(id: &str, children: Vec<Self>) -> Self {
        Self {
            id: id.to_string(),
            label: id.to_string(),
            kind: NodeKind::Category,
            children,
            value_types: FxHashSet::default(),
            max_string_length: 0,
            placeholder_target: None,
        }
    }

    pub(crate) fn group(descriptor: &ColumnDescriptor, kind: NodeKind, children: Vec<Self>) -> Self {
        Self {
            id: descriptor.path.clone(),
            label: descriptor.label.clone(),
            kind,
            children,
            value_types: FxHashSet::default(),
            max_string_length: 0,
            placeholder_target: None,
        }
    }

    pub(crate) fn leaf(
        descriptor: &ColumnDescriptor,
        value_types: FxHashSet<ValueKind>,
        max_string_length: usize,
    ) -> Self {
        Self {
            id: descriptor.path.clone(),
            label: descriptor.label.clone(),
            kind: NodeKind::Leaf,
            children: Vec::new(),
            value_types,
            max_string_length,
            placeholder_target: None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_placeholder(&self) -> bool {
        self.kind == NodeKind::Placeholder
    }

    /// Root-to-leaf depth of the subtree; a childless node has depth 0.
    pub fn subtree_depth(&self) -> usize {
        self.children
            .iter()
            .map(|child| child.subtree_depth() + 1)
            .max()
            .unwrap_or(0)
    }

    /// Collects every leaf id in the subtree, in display order.
    pub fn leaf_ids(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_leaf_ids(&mut out);
        out
    }

    fn collect_leaf_ids(&self, out: &mut Vec<String>) {
        if self.children.is_empty() {
            out.push(self.id.clone());
            return;
        }
        for child in &self.children {
            child.collect_leaf_ids(out);
        }
    }
}

/// What to do with a descriptor whose parent path matches no node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum OrphanPolicy {
    /// Attach the descriptor's subtree at root level.
    #[default]
    AttachAtRoot,
    /// Drop the descriptor and its descendants.
    Discard,
}

/// Build configuration: the category vocabulary and the orphan policy.
#[derive(Clone, Debug)]
pub struct TreeConfig {
    /// Top-level category ids, in display order.
    pub categories: Vec<String>,
    pub orphan_policy: OrphanPolicy,
}

impl TreeConfig {
    pub fn new(categories: &[&str]) -> Self {
        Self {
            categories: categories.iter().map(|s| (*s).to_string()).collect(),
            orphan_policy: OrphanPolicy::default(),
        }
    }

    #[must_use]
    pub fn orphan_policy(mut self, policy: OrphanPolicy) -> Self {
        self.orphan_policy = policy;
        self
    }
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self::new(&["params", "metrics"])
    }
}

/// Builds one unbalanced tree root per category present in the catalog,
/// plus root-level orphans when the policy keeps them.
///
/// Descriptor order within each parent bucket is preserved, never sorted.
pub fn build_roots(
    catalog: &PathCatalog,
    revisions: &[Value],
    config: &TreeConfig,
) -> Vec<ColumnNode> {
    let mut roots = Vec::new();
    for category in &config.categories {
        let children = build_children(catalog, revisions, category, true);
        // A group with zero children is never materialized.
        if !children.is_empty() {
            roots.push(ColumnNode::category(category, children));
        }
    }

    if config.orphan_policy == OrphanPolicy::AttachAtRoot {
        for descriptor in catalog.descriptors() {
            if is_orphan(catalog, config, descriptor) {
                roots.push(build_node(catalog, revisions, descriptor, true));
            }
        }
    }

    roots
}

fn is_orphan(catalog: &PathCatalog, config: &TreeConfig, descriptor: &ColumnDescriptor) -> bool {
    match descriptor.parent_path.as_deref() {
        None => true,
        Some(parent) => {
            !config.categories.iter().any(|c| c == parent) && !catalog.contains_path(parent)
        }
    }
}

fn build_children(
    catalog: &PathCatalog,
    revisions: &[Value],
    parent_path: &str,
    under_category: bool,
) -> Vec<ColumnNode> {
    catalog
        .descriptors()
        .iter()
        .filter(|d| d.parent_path.as_deref() == Some(parent_path))
        .map(|d| build_node(catalog, revisions, d, under_category))
        .collect()
}

fn build_node(
    catalog: &PathCatalog,
    revisions: &[Value],
    descriptor: &ColumnDescriptor,
    under_category: bool,
) -> ColumnNode {
    let children = build_children(catalog, revisions, &descriptor.path, false);
    if children.is_empty() {
        let summary = scan_revisions(descriptor, revisions);
        ColumnNode::leaf(descriptor, summary.value_types, summary.max_string_length)
    } else {
        let kind = if under_category {
            NodeKind::FileGroup
        } else {
            NodeKind::KeyGroup
        };
        ColumnNode::group(descriptor, kind, children)
    }
}

/// Per-node metadata, populated once after build + balance.
#[derive(Clone, Debug)]
pub(crate) struct NodeMeta {
    /// Structural parent id. `None` for category roots and for the nodes
    /// directly under them (categories are containers, not headers).
    pub parent: Option<String>,
    pub kind: NodeKind,
    /// Explicit level: 0 for category roots, 1 for top-level headers.
    pub depth: usize,
    pub children: SmallVec<[String; 4]>,
    pub placeholder_target: Option<String>,
    /// Id of the root subtree containing the node (the category id, or the
    /// orphan's own id).
    pub root: String,
}

/// Balanced header forest plus the id-keyed lookup tables every query runs
/// against. Rebuilt from scratch on every upstream change.
#[derive(Clone, Debug, Default)]
pub struct HeaderForest {
    roots: Vec<ColumnNode>,
    meta: FxHashMap<String, NodeMeta>,
    ids: Vec<String>,
    placeholders_by_target: FxHashMap<String, SmallVec<[String; 2]>>,
    max_depth: usize,
}

impl HeaderForest {
    /// Builds, balances, and indexes the forest in one pass.
    pub fn build(catalog: &PathCatalog, revisions: &[Value], config: &TreeConfig) -> Self {
        let roots = build_roots(catalog, revisions, config)
            .into_iter()
            .map(balance)
            .collect();
        Self::from_roots(roots)
    }

    /// Indexes already-built (typically balanced) roots.
    pub fn from_roots(roots: Vec<ColumnNode>) -> Self {
        let mut forest = Self {
            roots,
            ..Self::default()
        };
        let roots = std::mem::take(&mut forest.roots);
        for root in &roots {
            let depth = if root.kind == NodeKind::Category { 0 } else { 1 };
            forest.index_node(root, None, depth, &root.id);
        }
        forest.roots = roots;
        forest
    }

    fn index_node(&mut self, node: &ColumnNode, parent: Option<&str>, depth: usize, root: &str) {
        self.ids.push(node.id.clone());
        self.meta.insert(node.id.clone(), NodeMeta {
            parent: parent.map(str::to_string),
            kind: node.kind,
            depth,
            children: node.children.iter().map(|c| c.id.clone()).collect(),
            placeholder_target: node.placeholder_target.clone(),
            root: root.to_string(),
        });
        if let Some(target) = &node.placeholder_target {
            self.placeholders_by_target
                .entry(target.clone())
                .or_default()
                .push(node.id.clone());
        }
        self.max_depth = self.max_depth.max(depth);

        // Categories are transparent to the parent chain.
        let child_parent = (node.kind != NodeKind::Category).then_some(node.id.as_str());
        for child in &node.children {
            self.index_node(child, child_parent, depth + 1, root);
        }
    }

    pub fn roots(&self) -> &[ColumnNode] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.meta.contains_key(id)
    }

    /// Every node id in pre-order traversal order.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn kind(&self, id: &str) -> Option<NodeKind> {
        self.meta.get(id).map(|m| m.kind)
    }

    pub fn parent(&self, id: &str) -> Option<&str> {
        self.meta.get(id)?.parent.as_deref()
    }

    pub fn depth(&self, id: &str) -> Option<usize> {
        self.meta.get(id).map(|m| m.depth)
    }

    pub fn placeholder_target(&self, id: &str) -> Option<&str> {
        self.meta.get(id)?.placeholder_target.as_deref()
    }

    /// Id of the root subtree containing the node.
    pub fn root_of(&self, id: &str) -> Option<&str> {
        self.meta.get(id).map(|m| m.root.as_str())
    }

    pub(crate) fn children_of(&self, id: &str) -> &[String] {
        self.meta.get(id).map_or(&[], |m| m.children.as_slice())
    }

    /// Placeholder node ids standing in for `id`, in traversal order.
    pub fn placeholders_targeting(&self, id: &str) -> &[String] {
        self.placeholders_by_target
            .get(id)
            .map_or(&[], SmallVec::as_slice)
    }

    /// Deepest level in the forest (0 when empty).
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// The leaf ids transitively under a header: the id itself for a leaf,
    /// every descendant leaf id for a group.
    pub fn leaf_ids_under(&self, id: &str) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_leaves(id, &mut out);
        out
    }

    fn collect_leaves(&self, id: &str, out: &mut Vec<String>) {
        let Some(meta) = self.meta.get(id) else {
            return;
        };
        if meta.children.is_empty() {
            out.push(id.to_string());
            return;
        }
        for child in &meta.children {
            self.collect_leaves(child, out);
        }
    }

    /// Every leaf id across the forest, in display traversal order.
    pub fn leaf_ids(&self) -> Vec<String> {
        self.ids
            .iter()
            .filter(|id| {
                self.meta
                    .get(id.as_str())
                    .is_some_and(|m| m.children.is_empty())
            })
            .cloned()
            .collect()
    }

    /// Finds a node by id (linear walk; the forest is small).
    pub fn find(&self, id: &str) -> Option<&ColumnNode> {
        fn search<'a>(nodes: &'a [ColumnNode], id: &str) -> Option<&'a ColumnNode> {
            for node in nodes {
                if node.id == id {
                    return Some(node);
                }
                if let Some(found) = search(&node.children, id) {
                    return Some(found);
                }
            }
            None
        }
        search(&self.roots, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog_two_files() -> PathCatalog {
        // params/params.yaml: { a: 'b', c: { d: 'e' } }
        PathCatalog::from_descriptors(vec![
            ColumnDescriptor::new("params:params.yaml", Some("params"), "params.yaml", &[]),
            ColumnDescriptor::new(
                "params:params.yaml:a",
                Some("params:params.yaml"),
                "a",
                &["params", "params.yaml", "a"],
            ),
            ColumnDescriptor::new(
                "params:params.yaml:c",
                Some("params:params.yaml"),
                "c",
                &["params", "params.yaml", "c"],
            ),
            ColumnDescriptor::new(
                "params:params.yaml:c.d",
                Some("params:params.yaml:c"),
                "d",
                &["params", "params.yaml", "c", "d"],
            ),
        ])
    }

    #[test]
    fn groups_by_parent_path_preserving_order() {
        let roots = build_roots(&catalog_two_files(), &[], &TreeConfig::default());

        assert_eq!(roots.len(), 1);
        let category = &roots[0];
        assert_eq!(category.kind, NodeKind::Category);
        assert_eq!(category.id, "params");

        let file = &category.children[0];
        assert_eq!(file.kind, NodeKind::FileGroup);
        let child_ids: Vec<_> = file.children.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(child_ids, vec!["params:params.yaml:a", "params:params.yaml:c"]);

        assert_eq!(file.children[0].kind, NodeKind::Leaf);
        assert_eq!(file.children[1].kind, NodeKind::KeyGroup);
        assert_eq!(file.children[1].children[0].kind, NodeKind::Leaf);
    }

    #[test]
    fn empty_categories_are_not_materialized() {
        let roots = build_roots(&catalog_two_files(), &[], &TreeConfig::default());
        assert!(!roots.iter().any(|r| r.id == "metrics"));
    }

    #[test]
    fn orphans_attach_at_root_by_default() {
        let mut catalog = catalog_two_files();
        catalog.push(ColumnDescriptor::new(
            "params:missing.yaml:x",
            Some("params:missing.yaml"),
            "x",
            &["params", "missing.yaml", "x"],
        ));

        let roots = build_roots(&catalog, &[], &TreeConfig::default());
        let orphan = roots.last().unwrap();
        assert_eq!(orphan.id, "params:missing.yaml:x");
        assert_eq!(orphan.kind, NodeKind::Leaf);
    }

    #[test]
    fn orphans_can_be_discarded() {
        let mut catalog = catalog_two_files();
        catalog.push(ColumnDescriptor::new(
            "params:missing.yaml:x",
            Some("params:missing.yaml"),
            "x",
            &["params", "missing.yaml", "x"],
        ));

        let config = TreeConfig::default().orphan_policy(OrphanPolicy::Discard);
        let roots = build_roots(&catalog, &[], &config);
        assert_eq!(roots.len(), 1);
        assert!(roots[0].leaf_ids().iter().all(|id| !id.contains("missing")));
    }

    #[test]
    fn forest_meta_records_parents_and_depths() {
        let forest = HeaderForest::build(&catalog_two_files(), &[], &TreeConfig::default());

        assert_eq!(forest.depth("params"), Some(0));
        assert_eq!(forest.depth("params:params.yaml"), Some(1));
        // The file group sits directly under a category: no parent in the chain.
        assert_eq!(forest.parent("params:params.yaml"), None);
        assert_eq!(
            forest.parent("params:params.yaml:c.d"),
            Some("params:params.yaml:c")
        );
    }

    #[test]
    fn leaf_ids_under_group_are_transitive() {
        let forest = HeaderForest::build(&catalog_two_files(), &[], &TreeConfig::default());

        assert_eq!(
            forest.leaf_ids_under("params:params.yaml"),
            vec!["params:params.yaml:a", "params:params.yaml:c.d"]
        );
        assert_eq!(
            forest.leaf_ids_under("params:params.yaml:a"),
            vec!["params:params.yaml:a"]
        );
    }
}
