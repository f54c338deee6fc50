//! Render planning for the tree view.
//!
//! [`TreeView`] turns a laid-out tree into a [`Scene`] of node and link
//! glyphs. The first render creates everything; later renders are diffed
//! against the previous scene by node key, so a renderer can fade entering
//! glyphs in, move persisting ones, and drop the ones that left.

use std::collections::{BTreeMap, HashMap};

use epeek_core::Result;

use crate::diagonal::SweepCache;
use crate::layout::TreeLayout;
use crate::tree::{NodeKey, TreeModel};

/// Radius of a node circle once fully shown.
pub const NODE_RADIUS: f64 = 4.5;

/// Starting radius of a node entering during an update.
pub const ENTER_RADIUS: f64 = 1e-6;

/// Whether a scene creates the view or updates an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPhase {
    Initial,
    Update,
}

/// What happens to a glyph in this scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// Newly created; updates fade it in from zero radius and empty text.
    Enter,
    /// Present before and now; moves to its new position.
    Update,
    /// Present before, gone now; removed.
    Exit,
}

/// Role of a node, used as its CSS class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeClass {
    Root,
    Inner,
    Leaf,
}

impl NodeClass {
    pub fn css(&self) -> &'static str {
        match self {
            Self::Root => "root ePeek_tree_node",
            Self::Inner => "inner ePeek_tree_node",
            Self::Leaf => "leaf ePeek_tree_node",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeGlyph {
    pub key: NodeKey,
    pub class: NodeClass,
    pub transform: String,
    /// Label text; `None` when labels are skipped.
    pub label: Option<String>,
    pub label_fill: String,
    /// Radius to animate from.
    pub radius_from: f64,
    pub radius: f64,
    pub change: Change,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkGlyph {
    /// Key of the link's child node.
    pub key: NodeKey,
    pub path: String,
    pub change: Change,
}

/// Everything a renderer needs to draw one frame of the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub phase: RenderPhase,
    pub width: f64,
    pub height: f64,
    pub translate: (f64, f64),
    pub duration_ms: u64,
    pub stroke: String,
    pub nodes: Vec<NodeGlyph>,
    pub links: Vec<LinkGlyph>,
}

impl Scene {
    /// Glyphs that remain on screen once the transition ends.
    pub fn visible_nodes(&self) -> impl Iterator<Item = &NodeGlyph> {
        self.nodes.iter().filter(|n| n.change != Change::Exit)
    }

    pub fn visible_links(&self) -> impl Iterator<Item = &LinkGlyph> {
        self.links.iter().filter(|l| l.change != Change::Exit)
    }
}

/// Presentation options for the tree view.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewStyle {
    pub foreground: String,
    pub background: String,
    pub skip_labels: bool,
    pub duration_ms: u64,
    /// Leaf whose label is drawn in `highlight`.
    pub species: Option<String>,
    pub highlight: String,
    /// Per-species counts appended to leaf labels as ` [n]`.
    pub counts: HashMap<String, usize>,
}

impl Default for ViewStyle {
    fn default() -> Self {
        Self {
            foreground: "steelblue".into(),
            background: "#ccc".into(),
            skip_labels: false,
            duration_ms: 500,
            species: Some("Homo_sapiens".into()),
            highlight: "red".into(),
            counts: HashMap::new(),
        }
    }
}

impl ViewStyle {
    /// Display label: underscores become spaces, plus the species count.
    pub fn label(&self, name: &str) -> String {
        let mut label = name.replace('_', " ");
        let mut chars = name.chars();
        let species: String = match chars.next() {
            Some(first) => first.to_lowercase().chain(chars).collect(),
            None => String::new(),
        };
        if let Some(n) = self.counts.get(&species) {
            label.push_str(&format!(" [{n}]"));
        }
        label
    }
}

#[derive(Debug, Clone, Default)]
struct Snapshot {
    nodes: BTreeMap<NodeKey, NodeGlyph>,
    links: BTreeMap<NodeKey, LinkGlyph>,
}

/// Render state of the view.
#[derive(Debug, Clone, Default)]
enum ViewState {
    #[default]
    Unrendered,
    Rendered(Snapshot),
}

/// Tree view render state machine.
#[derive(Debug, Clone, Default)]
pub struct TreeView {
    state: ViewState,
    sweeps: SweepCache,
}

impl TreeView {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once an initial render has happened.
    pub fn is_rendered(&self) -> bool {
        matches!(self.state, ViewState::Rendered(_))
    }

    /// Forget the previous scene; the next render is an initial one.
    pub fn reset(&mut self) {
        self.state = ViewState::Unrendered;
        self.sweeps = SweepCache::new();
    }

    /// Plan the next frame for `tree`.
    pub fn render(&mut self, tree: &TreeModel, layout: &TreeLayout, style: &ViewStyle) -> Result<Scene> {
        let positions = layout.cluster_positions(tree)?;
        let phase = if self.is_rendered() {
            RenderPhase::Update
        } else {
            RenderPhase::Initial
        };

        let mut next = Snapshot::default();
        let mut order = Vec::with_capacity(tree.node_count());
        for id in tree.iter_preorder() {
            let Some(node) = tree.get_node(id) else { continue };
            let pos = &positions[id];
            let class = if node.is_leaf() {
                NodeClass::Leaf
            } else if node.is_root() {
                NodeClass::Root
            } else {
                NodeClass::Inner
            };
            let fill = if node.is_leaf() && node.name.is_some() && node.name == style.species {
                &style.highlight
            } else if node.is_leaf() {
                &style.foreground
            } else {
                &style.background
            };
            next.nodes.insert(
                node.key,
                NodeGlyph {
                    key: node.key,
                    class,
                    transform: layout.node_transform(pos),
                    label: (!style.skip_labels)
                        .then(|| style.label(node.name.as_deref().unwrap_or(""))),
                    label_fill: fill.clone(),
                    radius_from: NODE_RADIUS,
                    radius: NODE_RADIUS,
                    change: Change::Enter,
                },
            );
            if let Some(parent) = node.parent {
                let path = layout.path_between(&positions[parent], pos, &mut self.sweeps);
                next.links.insert(
                    node.key,
                    LinkGlyph {
                        key: node.key,
                        path,
                        change: Change::Enter,
                    },
                );
            }
            order.push(node.key);
        }

        let mut nodes = Vec::with_capacity(order.len());
        let mut links = Vec::with_capacity(order.len());
        let previous = std::mem::take(&mut self.state);
        let prev = match &previous {
            ViewState::Rendered(snapshot) => Some(snapshot),
            ViewState::Unrendered => None,
        };
        for key in &order {
            if let Some(glyph) = next.nodes.get_mut(key) {
                match prev {
                    Some(p) if p.nodes.contains_key(key) => glyph.change = Change::Update,
                    Some(_) => glyph.radius_from = ENTER_RADIUS,
                    None => {}
                }
                nodes.push(glyph.clone());
            }
            if let Some(link) = next.links.get_mut(key) {
                if prev.is_some_and(|p| p.links.contains_key(key)) {
                    link.change = Change::Update;
                }
                links.push(link.clone());
            }
        }
        if let Some(p) = prev {
            for (key, glyph) in p.nodes.iter().filter(|(k, _)| !next.nodes.contains_key(*k)) {
                nodes.push(NodeGlyph {
                    change: Change::Exit,
                    ..glyph.clone()
                });
                log::trace!("node {key} leaves the view");
            }
            for (key, link) in p.links.iter().filter(|(k, _)| !next.links.contains_key(*k)) {
                self.sweeps.forget(*key);
                links.push(LinkGlyph {
                    change: Change::Exit,
                    ..link.clone()
                });
            }
        }
        self.state = ViewState::Rendered(next);

        let (width, height) = layout.canvas_size();
        Ok(Scene {
            phase,
            width,
            height,
            translate: layout.translate_vis(),
            duration_ms: style.duration_ms,
            stroke: style.foreground.clone(),
            nodes,
            links,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIKI: &str = "(A:0.1,B:0.2,(C:0.3,D:0.4)E:0.5)F;";

    fn changes<'a>(scene: &'a Scene, change: Change) -> Vec<NodeKey> {
        scene
            .nodes
            .iter()
            .filter(|n| n.change == change)
            .map(|n| n.key)
            .collect()
    }

    #[test]
    fn initial_render_creates_everything() {
        let tree = TreeModel::from_newick(WIKI).unwrap();
        let mut view = TreeView::new();
        let scene = view
            .render(&tree, &TreeLayout::vertical(), &ViewStyle::default())
            .unwrap();
        assert_eq!(scene.phase, RenderPhase::Initial);
        assert_eq!(scene.nodes.len(), 6);
        assert_eq!(scene.links.len(), 5);
        assert!(scene.nodes.iter().all(|n| n.change == Change::Enter));
        assert!(scene.nodes.iter().all(|n| n.radius_from == NODE_RADIUS));
        assert_eq!(scene.nodes[0].class, NodeClass::Root);
        assert_eq!(scene.nodes[1].label.as_deref(), Some("A"));
        assert_eq!(scene.nodes[1].label_fill, "steelblue");
        assert_eq!(scene.nodes[0].label_fill, "#ccc");
        assert!(view.is_rendered());
    }

    #[test]
    fn update_diffs_by_key() {
        let tree = TreeModel::from_newick(WIKI).unwrap();
        let layout = TreeLayout::vertical();
        let style = ViewStyle::default();
        let mut view = TreeView::new();
        view.render(&tree, &layout, &style).unwrap();

        let sub = tree
            .extract_subtree(&[tree.find_by_name("A").unwrap(), tree.find_by_name("C").unwrap()])
            .unwrap();
        let scene = view.render(&sub, &layout, &style).unwrap();
        assert_eq!(scene.phase, RenderPhase::Update);
        // F(1), A(2), C(5) persist; B(3), E(4), D(6) leave.
        assert_eq!(changes(&scene, Change::Update), vec![1, 2, 5]);
        assert_eq!(changes(&scene, Change::Exit), vec![3, 4, 6]);
        assert!(changes(&scene, Change::Enter).is_empty());
        assert_eq!(scene.visible_links().count(), 2);

        // Back to the full tree: the removed nodes enter again.
        let scene = view.render(&tree, &layout, &style).unwrap();
        assert_eq!(changes(&scene, Change::Enter), vec![3, 4, 6]);
        let entering = scene.nodes.iter().find(|n| n.key == 4).unwrap();
        assert_eq!(entering.radius_from, ENTER_RADIUS);
    }

    #[test]
    fn skip_labels_and_counts() {
        let tree = TreeModel::from_newick("(Homo_sapiens,Mus_musculus);").unwrap();
        let mut style = ViewStyle::default();
        style.counts.insert("homo_sapiens".into(), 3);
        let scene = TreeView::new()
            .render(&tree, &TreeLayout::radial(), &style)
            .unwrap();
        assert_eq!(scene.nodes[1].label.as_deref(), Some("Homo sapiens [3]"));
        assert_eq!(scene.nodes[2].label.as_deref(), Some("Mus musculus"));

        style.skip_labels = true;
        let scene = TreeView::new()
            .render(&tree, &TreeLayout::radial(), &style)
            .unwrap();
        assert!(scene.nodes.iter().all(|n| n.label.is_none()));
    }

    #[test]
    fn current_species_label_is_highlighted() {
        let tree = TreeModel::from_newick("(Homo_sapiens,Mus_musculus);").unwrap();
        let mut style = ViewStyle::default();
        let scene = TreeView::new()
            .render(&tree, &TreeLayout::vertical(), &style)
            .unwrap();
        assert_eq!(scene.nodes[1].label_fill, "red");
        assert_eq!(scene.nodes[2].label_fill, "steelblue");

        style.species = Some("Mus_musculus".into());
        let scene = TreeView::new()
            .render(&tree, &TreeLayout::vertical(), &style)
            .unwrap();
        assert_eq!(scene.nodes[1].label_fill, "steelblue");
        assert_eq!(scene.nodes[2].label_fill, "red");
    }

    #[test]
    fn reset_returns_to_initial() {
        let tree = TreeModel::from_newick(WIKI).unwrap();
        let mut view = TreeView::new();
        let layout = TreeLayout::vertical();
        view.render(&tree, &layout, &ViewStyle::default()).unwrap();
        view.reset();
        assert!(!view.is_rendered());
        let scene = view.render(&tree, &layout, &ViewStyle::default()).unwrap();
        assert_eq!(scene.phase, RenderPhase::Initial);
    }
}
