//! Tree bindings: Newick parsing, layout, SVG, LCA and subtree extraction.

use serde::Serialize;

use epeek_core::{EpeekError, Result, Summarizable};
use epeek_tree::svg::scene_to_svg;
use epeek_tree::{
    newick, LayoutStyle, NodeId, TreeLayout, TreeModel, TreeNode, TreeView, ViewStyle,
};

use crate::error::{from_json, wasm_result};

#[cfg(feature = "wasm")]
use wasm_bindgen::prelude::*;

// ── Wrapper types ────────────────────────────────────────────────────────

/// Serializable tree summary.
#[derive(Debug, Serialize)]
pub struct JsTreeInfo {
    pub node_count: usize,
    pub leaf_count: usize,
    pub leaf_names: Vec<String>,
    pub newick: String,
    pub summary: String,
}

/// Serializable node.
#[derive(Debug, Serialize)]
pub struct JsNode {
    pub key: u32,
    pub name: Option<String>,
    pub root_distance: f64,
}

/// Serializable node glyph of a rendered scene.
#[derive(Debug, Serialize)]
pub struct JsNodeGlyph {
    pub key: u32,
    pub class: &'static str,
    pub transform: String,
    pub label: Option<String>,
    pub radius: f64,
}

/// Serializable link glyph.
#[derive(Debug, Serialize)]
pub struct JsLinkGlyph {
    pub key: u32,
    pub path: String,
}

/// Serializable rendered tree.
#[derive(Debug, Serialize)]
pub struct JsTreeScene {
    pub width: f64,
    pub height: f64,
    pub translate: (f64, f64),
    pub nodes: Vec<JsNodeGlyph>,
    pub links: Vec<JsLinkGlyph>,
}

// ── Helpers ──────────────────────────────────────────────────────────────

pub(crate) fn tree_layout(style: LayoutStyle, width: f64, scale: bool) -> TreeLayout {
    let base = match style {
        LayoutStyle::Vertical => TreeLayout::vertical(),
        LayoutStyle::Radial => TreeLayout::radial(),
    };
    base.with_width(width).with_scale(scale)
}

pub(crate) fn tree_layout_for(layout: &str, width: f64, scale: bool) -> Result<TreeLayout> {
    Ok(tree_layout(layout.parse()?, width, scale))
}

fn nodes_by_name(tree: &TreeModel, names_json: &str) -> Result<Vec<NodeId>> {
    let names: Vec<String> = from_json("names", names_json)?;
    names
        .iter()
        .map(|name| {
            tree.find_by_name(name)
                .ok_or_else(|| EpeekError::InvalidInput(format!("no node named {name:?}")))
        })
        .collect()
}

fn js_node(tree: &TreeModel, id: NodeId) -> Result<JsNode> {
    let node = tree
        .get_node(id)
        .ok_or_else(|| EpeekError::Other(format!("node {id} out of range")))?;
    Ok(JsNode {
        key: node.key,
        name: node.name.clone(),
        root_distance: node.root_distance,
    })
}

fn scene_for(newick: &str, layout: &str, width: f64, scale: bool) -> Result<JsTreeScene> {
    let tree = TreeModel::from_newick(newick)?;
    let layout = tree_layout_for(layout, width, scale)?;
    let scene = TreeView::new().render(&tree, &layout, &ViewStyle::default())?;
    Ok(JsTreeScene {
        width: scene.width,
        height: scene.height,
        translate: scene.translate,
        nodes: scene
            .visible_nodes()
            .map(|n| JsNodeGlyph {
                key: n.key,
                class: n.class.css(),
                transform: n.transform.clone(),
                label: n.label.clone(),
                radius: n.radius,
            })
            .collect(),
        links: scene
            .visible_links()
            .map(|l| JsLinkGlyph {
                key: l.key,
                path: l.path.clone(),
            })
            .collect(),
    })
}

// ── JSON boundary functions ──────────────────────────────────────────────

/// Deepest tree whose records [`write_newick`] can read back: serde_json
/// stops at 128 nested arrays and objects, and each level adds one of each.
pub const MAX_RECORD_DEPTH: usize = 63;

/// Parse a Newick string into its nested record form, keys assigned.
#[cfg_attr(feature = "wasm", wasm_bindgen)]
pub fn parse_newick(newick: &str) -> String {
    wasm_result(TreeModel::from_newick(newick).and_then(|tree| {
        let depth = tree.depth();
        if depth > MAX_RECORD_DEPTH {
            return Err(EpeekError::InvalidInput(format!(
                "tree is {depth} levels deep, records nest at most {MAX_RECORD_DEPTH}"
            )));
        }
        Ok(tree.data())
    }))
}

/// Summary of a Newick tree.
#[cfg_attr(feature = "wasm", wasm_bindgen)]
pub fn tree_info(newick: &str) -> String {
    wasm_result(TreeModel::from_newick(newick).map(|tree| JsTreeInfo {
        node_count: tree.node_count(),
        leaf_count: tree.leaf_count(),
        leaf_names: tree.leaf_names(),
        newick: tree.to_newick(),
        summary: tree.summary(),
    }))
}

/// Write nested record JSON (as produced by [`parse_newick`]) back to Newick.
#[cfg_attr(feature = "wasm", wasm_bindgen)]
pub fn write_newick(tree_json: &str) -> String {
    wasm_result(from_json::<TreeNode>("tree", tree_json).map(|node| newick::write(&node)))
}

/// Lowest common ancestor of the named nodes. `names_json` is a JSON array.
#[cfg_attr(feature = "wasm", wasm_bindgen)]
pub fn tree_lca(newick: &str, names_json: &str) -> String {
    wasm_result(TreeModel::from_newick(newick).and_then(|tree| {
        let nodes = nodes_by_name(&tree, names_json)?;
        let lca = tree.lowest_common_ancestor(&nodes)?;
        js_node(&tree, lca)
    }))
}

/// Subtree spanning the named nodes, as Newick.
#[cfg_attr(feature = "wasm", wasm_bindgen)]
pub fn tree_subtree(newick: &str, names_json: &str) -> String {
    wasm_result(TreeModel::from_newick(newick).and_then(|tree| {
        let nodes = nodes_by_name(&tree, names_json)?;
        Ok(tree.extract_subtree(&nodes)?.to_newick())
    }))
}

/// Node and link glyphs of a rendered tree.
#[cfg_attr(feature = "wasm", wasm_bindgen)]
pub fn tree_scene(newick: &str, layout: &str, width: f64, scale: bool) -> String {
    wasm_result(scene_for(newick, layout, width, scale))
}

/// Standalone SVG document of a rendered tree.
#[cfg_attr(feature = "wasm", wasm_bindgen)]
pub fn tree_svg(newick: &str, layout: &str, width: f64, scale: bool, target: &str) -> String {
    wasm_result(TreeModel::from_newick(newick).and_then(|tree| {
        let layout = tree_layout_for(layout, width, scale)?;
        let scene = TreeView::new().render(&tree, &layout, &ViewStyle::default())?;
        Ok(scene_to_svg(&scene, target))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIKI: &str = "(A:0.1,B:0.2,(C:0.3,D:0.4)E:0.5)F;";

    fn ok(json: &str) -> serde_json::Value {
        let v: serde_json::Value = serde_json::from_str(json).unwrap();
        assert!(v.get("error").is_none(), "unexpected error: {json}");
        v["ok"].clone()
    }

    #[test]
    fn parse_returns_nested_records() {
        let v = ok(&parse_newick(WIKI));
        assert_eq!(v["name"], "F");
        assert_eq!(v["id"], 1);
        let kids = v["branchset"].as_array().unwrap();
        assert_eq!(kids.len(), 3);
        assert_eq!(kids[2]["name"], "E");
        assert_eq!(kids[2]["branchset"][1]["length"], 0.4);
    }

    #[test]
    fn parse_error_is_enveloped() {
        let v: serde_json::Value = serde_json::from_str(&parse_newick("(A,B")).unwrap();
        assert!(v["error"].as_str().unwrap().starts_with("parse error at byte"));
    }

    #[test]
    fn records_stop_at_json_nesting_limit() {
        let chain = |depth: usize| format!("{}A{};", "(".repeat(depth), ")".repeat(depth));
        // The envelope adds a level, so take the record out as text.
        let out = parse_newick(&chain(MAX_RECORD_DEPTH));
        let data = out
            .strip_prefix(r#"{"ok":"#)
            .and_then(|rest| rest.strip_suffix('}'))
            .unwrap();
        let v = ok(&write_newick(data));
        assert_eq!(v, chain(MAX_RECORD_DEPTH).as_str());

        let v: serde_json::Value =
            serde_json::from_str(&parse_newick(&chain(MAX_RECORD_DEPTH + 1))).unwrap();
        assert!(v["error"].as_str().unwrap().contains("levels deep"));

        let deep = ok(&tree_info(&chain(10_000)));
        assert_eq!(deep["node_count"], 10_001);
    }

    #[test]
    fn info_counts() {
        let v = ok(&tree_info(WIKI));
        assert_eq!(v["node_count"], 6);
        assert_eq!(v["leaf_count"], 4);
        assert_eq!(v["leaf_names"], serde_json::json!(["A", "B", "C", "D"]));
        assert_eq!(v["summary"], "TreeModel: 6 nodes (4 leaves, 2 internal)");
    }

    #[test]
    fn write_round_trips_records() {
        let data = ok(&parse_newick(WIKI));
        let v = ok(&write_newick(&data.to_string()));
        assert_eq!(v, "(A:0.1,B:0.2,(C:0.3,D:0.4)E:0.5)F;");
    }

    #[test]
    fn lca_by_names() {
        let v = ok(&tree_lca(WIKI, r#"["C","D"]"#));
        assert_eq!(v["name"], "E");
        let v = ok(&tree_lca(WIKI, r#"["A","D"]"#));
        assert_eq!(v["name"], "F");
        assert_eq!(v["root_distance"], 0.0);
    }

    #[test]
    fn lca_unknown_name() {
        let v: serde_json::Value =
            serde_json::from_str(&tree_lca(WIKI, r#"["C","Z"]"#)).unwrap();
        assert!(v["error"].as_str().unwrap().contains("\"Z\""));
    }

    #[test]
    fn subtree_by_names() {
        let v = ok(&tree_subtree(WIKI, r#"["A","C"]"#));
        let text = v.as_str().unwrap();
        assert!(text.ends_with("F;"));
        assert!(!text.contains('B') && !text.contains('D') && !text.contains('E'));
    }

    #[test]
    fn scene_glyphs() {
        let v = ok(&tree_scene(WIKI, "radial", 500.0, false));
        assert_eq!(v["nodes"].as_array().unwrap().len(), 6);
        assert_eq!(v["links"].as_array().unwrap().len(), 5);
        assert_eq!(v["translate"], serde_json::json!([250.0, 325.0]));
    }

    #[test]
    fn bad_layout_name() {
        let v: serde_json::Value =
            serde_json::from_str(&tree_scene(WIKI, "circular", 500.0, false)).unwrap();
        assert!(v["error"].as_str().unwrap().contains("unknown layout"));
    }

    #[test]
    fn svg_document() {
        let v = ok(&tree_svg(WIKI, "vertical", 400.0, true, "demo"));
        let svg = v.as_str().unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("ePeek_st_demo"));
    }
}
