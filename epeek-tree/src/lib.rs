//! Phylogenetic trees for the ePeek tree widget.
//!
//! - [`newick`] — Parse and write Newick strings as nested [`TreeNode`] records
//! - [`tree`] — Bound [`TreeModel`]: stable keys, parent links, root distances,
//!   lowest common ancestor and subtree extraction
//! - [`layout`] — Vertical and radial cluster coordinates
//! - [`diagonal`] — Link path geometry with cached arc sweeps
//! - [`view`] — Initial/update render planning diffed by node key
//! - [`svg`] — SVG export of a planned scene
//! - [`widget`] — The tree widget tying data, layout and view together
//!
//! # Example
//!
//! ```
//! use epeek_tree::TreeModel;
//!
//! let tree = TreeModel::from_newick("(A:0.1,B:0.2,(C:0.3,D:0.4)E:0.5)F;").unwrap();
//! let c = tree.find_by_name("C").unwrap();
//! let d = tree.find_by_name("D").unwrap();
//! let e = tree.lowest_common_ancestor(&[c, d]).unwrap();
//! assert_eq!(tree.get_node(e).unwrap().name.as_deref(), Some("E"));
//! ```

pub mod diagonal;
pub mod layout;
pub mod newick;
pub mod svg;
pub mod tree;
pub mod view;
pub mod widget;

pub use diagonal::SweepCache;
pub use layout::{LayoutStyle, NodePosition, TreeLayout};
pub use tree::{Node, NodeId, NodeKey, TreeModel, TreeNode};
pub use view::{Change, RenderPhase, Scene, TreeView, ViewStyle};
pub use widget::TreeWidget;
