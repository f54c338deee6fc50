//! Browser bindings for the ePeek genome and tree widgets.
//!
//! Every exported function accepts simple types (`&str`, `f64`, `u32`) and
//! returns a JSON `String`:
//!
//! - Success: `{"ok": <value>}`
//! - Failure: `{"error": "<message>"}`
//!
//! `#[wasm_bindgen]` exports are added with the `wasm` feature, which also
//! routes `log` output to the browser console.
//!
//! # Modules
//!
//! - [`tree`] — Newick parsing, tree layout and SVG, LCA, subtrees
//! - [`genome`] — Gene slotting, Ensembl URLs, tooltips, homologues
//! - [`widget`] — Widget configuration and the mounted widget
//! - [`logging`] — Console logger setup
//!
//! # Example
//!
//! ```
//! let json = epeek_wasm::tree_lca("(A:0.1,B:0.2,(C:0.3,D:0.4)E:0.5)F;", r#"["C","D"]"#);
//! let v: serde_json::Value = serde_json::from_str(&json).unwrap();
//! assert_eq!(v["ok"]["name"], "E");
//! ```

pub mod error;
pub mod genome;
pub mod logging;
pub mod tree;
pub mod widget;

/// Crate version (set from Cargo.toml at compile time).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ── Re-exports ───────────────────────────────────────────────────────────

pub use error::{wasm_err, wasm_ok, wasm_result};
pub use genome::{ensembl_url, gene_layout, gene_tooltip, split_homologues, JsGeneLayout};
pub use logging::init_logging;
pub use tree::{
    parse_newick, tree_info, tree_lca, tree_scene, tree_subtree, tree_svg, write_newick,
    JsLinkGlyph, JsNode, JsNodeGlyph, JsTreeInfo, JsTreeScene,
};
pub use widget::{mount, EpeekWidget, JsGenomeView, WidgetConfig};
