//! Phylogenetic tree records and the bound tree model.
//!
//! [`TreeNode`] is the plain nested record the Newick parser produces
//! (`name`, `length`, `branchset`). Binding it with [`TreeModel::bind`]
//! flattens it into arena-style storage: nodes live in a flat `Vec<Node>`,
//! are referenced by `NodeId` (a `usize` index), and carry a parent link,
//! a stable [`NodeKey`] and their cumulative distance from the root.

use std::collections::{HashMap, HashSet};

use epeek_core::{EpeekError, Result, Summarizable};

/// Index into the tree's node arena.
pub type NodeId = usize;

/// Stable node identifier, kept across rebinds and subtree extraction.
pub type NodeKey = u32;

/// A nested tree record, as produced by the Newick parser.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TreeNode {
    /// Taxon or clade label.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub name: Option<String>,
    /// Branch length to the parent.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub length: Option<f64>,
    /// Child records; `None` marks a leaf.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub branchset: Option<Vec<TreeNode>>,
    /// Stable key, assigned on first bind.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub id: Option<NodeKey>,
}

impl TreeNode {
    /// A leaf record.
    pub fn leaf(name: &str, length: Option<f64>) -> Self {
        Self {
            name: Some(name.to_string()),
            length,
            branchset: None,
            id: None,
        }
    }

    /// An internal record with the given children.
    pub fn internal(name: Option<&str>, length: Option<f64>, children: Vec<TreeNode>) -> Self {
        Self {
            name: name.map(str::to_string),
            length,
            branchset: Some(children),
            id: None,
        }
    }

    /// True if this record has no child list.
    pub fn is_leaf(&self) -> bool {
        self.branchset.is_none()
    }

    /// Child records (empty for leaves).
    pub fn children(&self) -> &[TreeNode] {
        self.branchset.as_deref().unwrap_or(&[])
    }

    /// Number of records in this subtree, including `self`.
    pub fn count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children());
        }
        count
    }
}

// Records can nest as deep as the input does; unlink them level by level.
impl Drop for TreeNode {
    fn drop(&mut self) {
        let mut stack = self.branchset.take().unwrap_or_default();
        while let Some(mut node) = stack.pop() {
            if let Some(children) = node.branchset.take() {
                stack.extend(children);
            }
        }
    }
}

/// A single node of a bound tree.
#[derive(Debug, Clone)]
pub struct Node {
    /// Index of this node in the arena.
    pub id: NodeId,
    /// Stable key of this node.
    pub key: NodeKey,
    /// Parent node (None for root).
    pub parent: Option<NodeId>,
    /// Child nodes, in input order.
    pub children: Vec<NodeId>,
    /// Taxon or clade label.
    pub name: Option<String>,
    /// Branch length from this node to its parent.
    pub length: Option<f64>,
    /// Sum of branch lengths from the root to this node.
    pub root_distance: f64,
}

impl Node {
    /// True if this node has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// True if this node has no parent.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// A rooted tree bound from a [`TreeNode`] record.
#[derive(Debug, Clone)]
pub struct TreeModel {
    nodes: Vec<Node>,
    root: NodeId,
}

/// Hands out keys from 1 upwards, skipping keys the input already carries.
struct KeyGen {
    next: NodeKey,
    used: HashSet<NodeKey>,
}

impl KeyGen {
    fn fresh(&mut self) -> NodeKey {
        while self.used.contains(&self.next) {
            self.next += 1;
        }
        let key = self.next;
        self.used.insert(key);
        self.next += 1;
        key
    }
}

impl TreeModel {
    /// Bind a nested record into a navigable tree.
    ///
    /// Nodes without a key get one (pre-order, starting at 1); existing keys
    /// are kept. Parent links and root distances are recomputed.
    pub fn bind(root: TreeNode) -> Result<Self> {
        let used = collect_keys(&root)?;
        let mut keys = KeyGen { next: 1, used };
        let nodes = flatten(root, &mut keys);
        Ok(Self { nodes, root: 0 })
    }

    /// Replace the tree with new data, keeping any keys the data carries.
    pub fn rebind(&mut self, root: TreeNode) -> Result<()> {
        *self = Self::bind(root)?;
        Ok(())
    }

    /// Export the tree as a nested record, keys included.
    pub fn data(&self) -> TreeNode {
        self.subtree_data(self.root)
    }

    /// Export the subtree rooted at `id` as a nested record.
    ///
    /// Records are assembled bottom-up; an unknown id yields an empty record.
    pub fn subtree_data(&self, id: NodeId) -> TreeNode {
        let mut built: Vec<Option<TreeNode>> = (0..self.nodes.len()).map(|_| None).collect();
        for n in self.postorder_from(id) {
            let node = &self.nodes[n];
            let branchset = (!node.is_leaf()).then(|| {
                node.children
                    .iter()
                    .filter_map(|&c| built[c].take())
                    .collect()
            });
            built[n] = Some(TreeNode {
                name: node.name.clone(),
                length: node.length,
                branchset,
                id: Some(node.key),
            });
        }
        built.get_mut(id).and_then(Option::take).unwrap_or_default()
    }

    /// Access a node by id.
    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// All nodes, indexed by `NodeId`.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// The root node id.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Total number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of leaf nodes.
    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// All leaf node ids, left to right.
    pub fn leaves(&self) -> Vec<NodeId> {
        self.iter_preorder()
            .filter(|&id| self.nodes[id].is_leaf())
            .collect()
    }

    /// Sorted list of leaf names (leaves without names are excluded).
    pub fn leaf_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .leaves()
            .into_iter()
            .filter_map(|id| self.nodes[id].name.clone())
            .collect();
        names.sort_unstable();
        names
    }

    /// Parent of `id`, if any.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    /// Children of `id` (empty for leaves and unknown ids).
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Maximum number of edges from the root to any leaf.
    pub fn depth(&self) -> usize {
        let mut levels = vec![0usize; self.nodes.len()];
        let mut deepest = 0;
        for id in self.iter_preorder() {
            if let Some(p) = self.nodes[id].parent {
                levels[id] = levels[p] + 1;
                deepest = deepest.max(levels[id]);
            }
        }
        deepest
    }

    /// Largest root distance over all nodes.
    pub fn max_root_distance(&self) -> f64 {
        self.nodes
            .iter()
            .map(|n| n.root_distance)
            .fold(0.0, f64::max)
    }

    /// First node (depth-first, pre-order) whose name equals `name`.
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.iter_preorder()
            .find(|&id| self.nodes[id].name.as_deref() == Some(name))
    }

    /// Node carrying the stable key `key`.
    pub fn find_by_key(&self, key: NodeKey) -> Option<NodeId> {
        self.nodes.iter().find(|n| n.key == key).map(|n| n.id)
    }

    /// True if `ancestor` is a strict ancestor of `node`.
    pub fn is_ancestor(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut cur = self.parent(node);
        while let Some(p) = cur {
            if p == ancestor {
                return true;
            }
            cur = self.nodes[p].parent;
        }
        false
    }

    /// `id` followed by each of its ancestors up to the root.
    pub fn upstream(&self, id: NodeId) -> Upstream<'_> {
        Upstream {
            tree: self,
            next: self.nodes.get(id).map(|n| n.id),
        }
    }

    /// Lowest common ancestor of a set of nodes.
    ///
    /// Reduces pairwise: for each next node `b`, walks `b` up its ancestor
    /// chain until it reaches the current candidate or one of its ancestors.
    pub fn lowest_common_ancestor(&self, nodes: &[NodeId]) -> Result<NodeId> {
        let (&first, rest) = nodes
            .split_first()
            .ok_or_else(|| EpeekError::InvalidInput("no nodes given".into()))?;
        self.check(first)?;
        rest.iter().try_fold(first, |acc, &b| self.lca_pair(acc, b))
    }

    fn lca_pair(&self, a: NodeId, b: NodeId) -> Result<NodeId> {
        self.check(b)?;
        let above_a: HashSet<NodeId> = self.upstream(a).collect();
        self.upstream(b)
            .find(|up| above_a.contains(up))
            .ok_or_else(|| EpeekError::InvalidInput("nodes do not share an ancestor".into()))
    }

    /// Pruned copy spanning the root-to-node paths of `nodes`.
    ///
    /// A node is copied if at least two targets sit at or below it and more
    /// than one of its children leads to a target, or if it is a leaf target.
    /// Nodes with a single surviving child are elided, so the copy has no
    /// single-child chains. Copies keep their keys and branch lengths.
    pub fn extract_subtree(&self, nodes: &[NodeId]) -> Result<TreeModel> {
        let mut counts: HashMap<NodeId, usize> = HashMap::new();
        for &id in nodes {
            self.check(id)?;
            for up in self.upstream(id) {
                *counts.entry(up).or_insert(0) += 1;
            }
        }

        let is_singleton = |id: NodeId| {
            let node = &self.nodes[id];
            !node.is_leaf()
                && node
                    .children
                    .iter()
                    .filter(|&&c| counts.get(&c).copied().unwrap_or(0) > 0)
                    .count()
                    == 1
        };
        let keep = |id: NodeId| match counts.get(&id).copied() {
            None => false,
            Some(n) if n > 1 && !is_singleton(id) => true,
            Some(n) => n > 0 && self.nodes[id].is_leaf(),
        };

        // Bottom-up: each node hands its parent the copies made in its subtree.
        let mut copies: Vec<Vec<TreeNode>> = (0..self.nodes.len()).map(|_| Vec::new()).collect();
        for id in self.iter_postorder() {
            let node = &self.nodes[id];
            let mut kids = Vec::new();
            for &c in &node.children {
                kids.append(&mut copies[c]);
            }
            copies[id] = if keep(id) {
                vec![TreeNode {
                    name: node.name.clone(),
                    length: node.length,
                    branchset: (!kids.is_empty()).then_some(kids),
                    id: Some(node.key),
                }]
            } else {
                kids
            };
        }
        let root = std::mem::take(&mut copies[self.root])
            .into_iter()
            .next()
            .ok_or_else(|| EpeekError::InvalidInput("subtree selection is empty".into()))?;
        TreeModel::bind(root)
    }

    /// Pre-order (parent before children) traversal yielding node ids.
    pub fn iter_preorder(&self) -> PreorderIter<'_> {
        PreorderIter {
            tree: self,
            stack: vec![self.root],
        }
    }

    /// Visit every node once, parent before children, left to right.
    pub fn for_each_preorder<F: FnMut(&Node)>(&self, mut f: F) {
        for id in self.iter_preorder() {
            f(&self.nodes[id]);
        }
    }

    /// Post-order (children before parent) traversal yielding node ids.
    pub fn iter_postorder(&self) -> std::vec::IntoIter<NodeId> {
        self.postorder_from(self.root)
    }

    fn postorder_from(&self, start: NodeId) -> std::vec::IntoIter<NodeId> {
        // A right-to-left pre-order, reversed.
        let mut order = Vec::new();
        let mut stack: Vec<NodeId> = self.nodes.get(start).map(|n| n.id).into_iter().collect();
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(&self.nodes[id].children);
        }
        order.reverse();
        order.into_iter()
    }

    /// Parse a Newick string and bind it.
    pub fn from_newick(input: &str) -> Result<Self> {
        Self::bind(crate::newick::parse(input)?)
    }

    /// Serialize the tree to a Newick string.
    pub fn to_newick(&self) -> String {
        crate::newick::write(&self.data())
    }

    fn check(&self, id: NodeId) -> Result<()> {
        if id < self.nodes.len() {
            Ok(())
        } else {
            Err(EpeekError::InvalidInput(format!(
                "node id {} out of range ({})",
                id,
                self.nodes.len()
            )))
        }
    }
}

impl Summarizable for TreeModel {
    fn summary(&self) -> String {
        let leaves = self.leaf_count();
        format!(
            "TreeModel: {} nodes ({} leaves, {} internal)",
            self.node_count(),
            leaves,
            self.node_count() - leaves
        )
    }
}

fn collect_keys(root: &TreeNode) -> Result<HashSet<NodeKey>> {
    let mut used = HashSet::new();
    let mut stack = vec![root];
    while let Some(data) = stack.pop() {
        if let Some(key) = data.id {
            if !used.insert(key) {
                return Err(EpeekError::InvalidInput(format!("duplicate node key {key}")));
            }
        }
        stack.extend(data.children());
    }
    Ok(used)
}

/// Move the records into arena order (pre-order), consuming them as it goes.
fn flatten(root: TreeNode, keys: &mut KeyGen) -> Vec<Node> {
    let mut nodes: Vec<Node> = Vec::with_capacity(root.count());
    let mut stack: Vec<(TreeNode, Option<NodeId>)> = vec![(root, None)];
    while let Some((mut data, parent)) = stack.pop() {
        let id = nodes.len();
        let key = data.id.unwrap_or_else(|| keys.fresh());
        let root_distance = match parent {
            Some(p) => nodes[p].root_distance + data.length.unwrap_or(0.0),
            None => 0.0,
        };
        if let Some(p) = parent {
            nodes[p].children.push(id);
        }
        nodes.push(Node {
            id,
            key,
            parent,
            children: Vec::new(),
            name: data.name.take(),
            length: data.length,
            root_distance,
        });
        if let Some(children) = data.branchset.take() {
            stack.extend(children.into_iter().rev().map(|c| (c, Some(id))));
        }
    }
    nodes
}

/// Iterator over a node and its ancestors.
pub struct Upstream<'a> {
    tree: &'a TreeModel,
    next: Option<NodeId>,
}

impl<'a> Iterator for Upstream<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        self.next = self.tree.nodes[id].parent;
        Some(id)
    }
}

/// Pre-order iterator over node ids.
pub struct PreorderIter<'a> {
    tree: &'a TreeModel,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for PreorderIter<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.nodes[id].children.iter().rev());
        Some(id)
    }
}
