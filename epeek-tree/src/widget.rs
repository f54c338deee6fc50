//! The tree widget: a full tree, the part of it on display, and the view.

use log::{debug, warn};

use epeek_core::{EpeekError, Result, Summarizable};

use crate::layout::TreeLayout;
use crate::newick;
use crate::tree::{TreeModel, TreeNode};
use crate::view::{Scene, TreeView, ViewStyle};

/// A mounted tree widget.
///
/// `subtree` narrows the display to part of the full tree; the next
/// [`render`](TreeWidget::render) then updates the view in place.
#[derive(Debug, Clone)]
pub struct TreeWidget {
    target: String,
    base: Option<TreeModel>,
    curr: Option<TreeModel>,
    layout: TreeLayout,
    style: ViewStyle,
    view: TreeView,
}

impl TreeWidget {
    /// A widget drawing into the container with id `target`.
    pub fn new(target: &str) -> Self {
        Self {
            target: target.to_string(),
            base: None,
            curr: None,
            layout: TreeLayout::vertical(),
            style: ViewStyle::default(),
            view: TreeView::new(),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Bind new data as the full tree and display all of it.
    pub fn set_data(&mut self, data: TreeNode) -> Result<()> {
        let tree = TreeModel::bind(data)?;
        debug!("tree widget {}: bound {}", self.target, tree.summary());
        self.curr = Some(tree.clone());
        self.base = Some(tree);
        Ok(())
    }

    /// Parse and bind a Newick string.
    pub fn set_newick(&mut self, text: &str) -> Result<()> {
        self.set_data(newick::parse(text)?)
    }

    /// The full tree's data, keys included.
    pub fn data(&self) -> Option<TreeNode> {
        self.base.as_ref().map(TreeModel::data)
    }

    /// The full tree.
    pub fn tree(&self) -> Option<&TreeModel> {
        self.base.as_ref()
    }

    /// The tree currently on display.
    pub fn current(&self) -> Option<&TreeModel> {
        self.curr.as_ref()
    }

    /// Display the subtree spanning the named nodes of the full tree.
    ///
    /// Unknown names are skipped; it is an error if none is found.
    pub fn subtree(&mut self, names: &[&str]) -> Result<()> {
        let base = self
            .base
            .as_ref()
            .ok_or_else(|| EpeekError::InvalidInput("tree widget has no data".into()))?;
        let mut ids = Vec::with_capacity(names.len());
        for name in names {
            match base.find_by_name(name) {
                Some(id) => ids.push(id),
                None => warn!("tree widget {}: no node named {name:?}", self.target),
            }
        }
        if ids.is_empty() {
            return Err(EpeekError::InvalidInput(format!(
                "none of {names:?} is in the tree"
            )));
        }
        self.curr = Some(base.extract_subtree(&ids)?);
        Ok(())
    }

    /// Display the full tree again.
    pub fn show_full_tree(&mut self) {
        self.curr = self.base.clone();
    }

    /// Plan the next frame: an initial render the first time, then updates.
    pub fn render(&mut self) -> Result<Scene> {
        let curr = self
            .curr
            .as_ref()
            .ok_or_else(|| EpeekError::InvalidInput("tree widget has no data".into()))?;
        let scene = self.view.render(curr, &self.layout, &self.style)?;
        debug!(
            "tree widget {}: {:?} with {} nodes",
            self.target,
            scene.phase,
            curr.node_count()
        );
        Ok(scene)
    }

    /// Render the current frame as an SVG string.
    pub fn render_svg(&mut self) -> Result<String> {
        let scene = self.render()?;
        Ok(crate::svg::scene_to_svg(&scene, &self.target))
    }

    pub fn layout(&self) -> &TreeLayout {
        &self.layout
    }

    /// Switch layouts; the view starts over with an initial render.
    pub fn set_layout(&mut self, layout: TreeLayout) {
        if layout.style != self.layout.style {
            self.view.reset();
        }
        self.layout = layout;
    }

    pub fn duration(&self) -> u64 {
        self.style.duration_ms
    }

    pub fn set_duration(&mut self, ms: u64) {
        self.style.duration_ms = ms;
    }

    pub fn skip_labels(&self) -> bool {
        self.style.skip_labels
    }

    pub fn set_skip_labels(&mut self, skip: bool) {
        self.style.skip_labels = skip;
    }

    pub fn background_color(&self) -> &str {
        &self.style.background
    }

    pub fn set_background_color(&mut self, color: &str) {
        self.style.background = color.to_string();
    }

    pub fn foreground_color(&self) -> &str {
        &self.style.foreground
    }

    pub fn set_foreground_color(&mut self, color: &str) {
        self.style.foreground = color.to_string();
    }

    /// The species whose leaf label is highlighted.
    pub fn species(&self) -> Option<&str> {
        self.style.species.as_deref()
    }

    pub fn set_species(&mut self, species: &str) {
        self.style.species = Some(species.to_string());
    }

    /// Set the count shown next to a species' leaf label.
    pub fn set_count(&mut self, species: &str, count: usize) {
        self.style.counts.insert(species.to_lowercase(), count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::{Change, RenderPhase};

    #[test]
    fn render_requires_data() {
        let mut w = TreeWidget::new("t");
        assert!(w.render().is_err());
        assert!(w.subtree(&["A"]).is_err());
    }

    #[test]
    fn subtree_then_full_tree() {
        let mut w = TreeWidget::new("t");
        w.set_newick("(A:0.1,B:0.2,(C:0.3,D:0.4)E:0.5)F;").unwrap();
        assert_eq!(w.render().unwrap().phase, RenderPhase::Initial);

        w.subtree(&["C", "D", "nope"]).unwrap();
        assert_eq!(w.current().unwrap().node_count(), 3);
        assert_eq!(w.tree().unwrap().node_count(), 6);
        let scene = w.render().unwrap();
        assert_eq!(scene.phase, RenderPhase::Update);
        assert_eq!(scene.visible_nodes().count(), 3);

        w.show_full_tree();
        let scene = w.render().unwrap();
        assert_eq!(scene.nodes.iter().filter(|n| n.change == Change::Enter).count(), 3);
    }

    #[test]
    fn subtree_with_only_unknown_names_fails() {
        let mut w = TreeWidget::new("t");
        w.set_newick("(A,B);").unwrap();
        assert!(w.subtree(&["X", "Y"]).is_err());
    }

    #[test]
    fn switching_layout_restarts_view() {
        let mut w = TreeWidget::new("t");
        w.set_newick("(A,B);").unwrap();
        w.render().unwrap();
        w.set_layout(TreeLayout::radial().with_width(500.0));
        assert_eq!(w.render().unwrap().phase, RenderPhase::Initial);
    }

    #[test]
    fn data_keeps_keys() {
        let mut w = TreeWidget::new("t");
        w.set_newick("(A,B);").unwrap();
        let data = w.data().unwrap();
        assert_eq!(data.id, Some(1));
        assert_eq!(data.children()[1].id, Some(3));
    }

    #[test]
    fn species_label_is_highlighted() {
        let mut w = TreeWidget::new("t");
        w.set_newick("(Homo_sapiens,Mus_musculus);").unwrap();
        assert_eq!(w.species(), Some("Homo_sapiens"));
        w.set_species("Mus_musculus");
        let scene = w.render().unwrap();
        let fills: Vec<&str> = scene.nodes.iter().map(|n| n.label_fill.as_str()).collect();
        assert_eq!(fills, vec!["#ccc", "steelblue", "red"]);
    }

    #[test]
    fn render_svg_uses_target() {
        let mut w = TreeWidget::new("SimpleTree");
        w.set_newick("((human, chimp),mouse)").unwrap();
        w.set_count("Human", 2);
        let svg = w.render_svg().unwrap();
        assert!(svg.contains("ePeek_tree_node_SimpleTree_"));
        assert!(svg.contains("human [2]"));
    }
}
