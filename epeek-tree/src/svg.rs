//! SVG export of a planned [`Scene`].
//!
//! Only glyphs that stay on screen are written; exiting glyphs are dropped.

use ::svg::node::element::{Circle, Group, Path, Text};
use ::svg::node::Text as SvgText;
use ::svg::Document;

use crate::view::Scene;

/// Build an SVG document for `scene`, with element ids scoped by `target`.
pub fn scene_to_svg_document(scene: &Scene, target: &str) -> Document {
    let mut vis = Group::new()
        .set("id", format!("ePeek_st_{target}"))
        .set(
            "transform",
            format!("translate({},{})", scene.translate.0, scene.translate.1),
        );

    for link in scene.visible_links() {
        vis = vis.add(
            Path::new()
                .set("class", "ePeek_tree_link")
                .set("id", format!("ePeek_tree_link_{target}_{}", link.key))
                .set("fill", "none")
                .set("stroke", scene.stroke.as_str())
                .set("d", link.path.as_str()),
        );
    }

    for node in scene.visible_nodes() {
        let mut g = Group::new()
            .set("class", node.class.css())
            .set("id", format!("ePeek_tree_node_{target}_{}", node.key))
            .set("transform", node.transform.as_str())
            .add(
                Circle::new()
                    .set("r", node.radius)
                    .set("fill", scene.stroke.as_str())
                    .set("stroke", "#369")
                    .set("stroke-width", "2px"),
            );
        if let Some(label) = &node.label {
            g = g.add(
                Text::new("")
                    .set("class", "ePeek_tree_label")
                    .set("fill", node.label_fill.as_str())
                    .set("transform", "translate(10 5)")
                    .add(SvgText::new(label.clone())),
            );
        }
        vis = vis.add(g);
    }

    Document::new()
        .set("width", scene.width)
        .set("height", scene.height)
        .set("fill", "none")
        .set("xmlns", "http://www.w3.org/2000/svg")
        .add(vis)
}

/// Render `scene` to an SVG string.
pub fn scene_to_svg(scene: &Scene, target: &str) -> String {
    scene_to_svg_document(scene, target).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::TreeLayout;
    use crate::tree::TreeModel;
    use crate::view::{TreeView, ViewStyle};

    #[test]
    fn svg_contains_links_nodes_and_labels() {
        let tree = TreeModel::from_newick("((human,chimp),mouse);").unwrap();
        let scene = TreeView::new()
            .render(&tree, &TreeLayout::vertical().with_width(500.0), &ViewStyle::default())
            .unwrap();
        let svg = scene_to_svg(&scene, "SimpleTree");
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("ePeek_st_SimpleTree"));
        assert_eq!(svg.matches("class=\"ePeek_tree_link\"").count(), 4);
        assert_eq!(svg.matches("<circle").count(), 5);
        assert!(svg.contains("ePeek_tree_node_SimpleTree_1"));
        assert!(svg.contains(">chimp<"));
        assert!(svg.contains("translate(20,20)"));
    }

    #[test]
    fn exiting_glyphs_are_not_written() {
        let tree = TreeModel::from_newick("((human,chimp),mouse);").unwrap();
        let layout = TreeLayout::vertical();
        let style = ViewStyle::default();
        let mut view = TreeView::new();
        view.render(&tree, &layout, &style).unwrap();
        let sub = tree
            .extract_subtree(&[tree.find_by_name("human").unwrap(), tree.find_by_name("chimp").unwrap()])
            .unwrap();
        let scene = view.render(&sub, &layout, &style).unwrap();
        let svg = scene_to_svg(&scene, "t");
        assert_eq!(svg.matches("<circle").count(), 3);
        assert!(!svg.contains(">mouse<"));
    }
}
