//! Tree layout coordinates for the vertical and radial views.
//!
//! Positions follow the dendrogram ("cluster") convention: `x` runs across
//! the leaves and `y` runs from the root towards the leaves. Leaves are
//! evenly spaced along `x` and aligned at the far end of `y`; an internal
//! node sits at the mean `x` of its children. With branch-length scaling on,
//! `y` is the node's root distance mapped linearly onto the layout range.
//!
//! The radial layout reads `x` as an angle in degrees and `y` as a radius.

use std::fmt;
use std::str::FromStr;

use epeek_core::{EpeekError, Result};

use crate::tree::{NodeId, NodeKey, TreeModel};

/// Layout style for tree drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LayoutStyle {
    /// Root on the left, leaves stacked top to bottom.
    #[default]
    Vertical,
    /// Root in the centre, leaves around a circle.
    Radial,
}

impl FromStr for LayoutStyle {
    type Err = EpeekError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "vertical" => Ok(Self::Vertical),
            "radial" => Ok(Self::Radial),
            _ => Err(EpeekError::InvalidInput(format!(
                "unknown layout: {s:?} (expected \"vertical\" or \"radial\")"
            ))),
        }
    }
}

impl fmt::Display for LayoutStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vertical => f.write_str("vertical"),
            Self::Radial => f.write_str("radial"),
        }
    }
}

/// Cluster coordinates of a single node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodePosition {
    /// Node index in the tree.
    pub node_id: NodeId,
    /// Stable key of the node.
    pub key: NodeKey,
    /// Breadth coordinate (pixels, or degrees for radial).
    pub x: f64,
    /// Depth coordinate (pixels, or radius for radial).
    pub y: f64,
}

/// A tree layout: style, width and whether branch lengths drive depth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeLayout {
    pub style: LayoutStyle,
    pub width: f64,
    pub scale: bool,
}

impl Default for TreeLayout {
    fn default() -> Self {
        Self::vertical()
    }
}

impl TreeLayout {
    const DEFAULT_WIDTH: f64 = 360.0;

    /// Vertical layout, 360px wide, no branch-length scaling.
    pub fn vertical() -> Self {
        Self {
            style: LayoutStyle::Vertical,
            width: Self::DEFAULT_WIDTH,
            scale: false,
        }
    }

    /// Radial layout, 360px wide, no branch-length scaling.
    pub fn radial() -> Self {
        Self {
            style: LayoutStyle::Radial,
            ..Self::vertical()
        }
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = width;
        self
    }

    pub fn with_scale(mut self, scale: bool) -> Self {
        self.scale = scale;
        self
    }

    /// Extent of the cluster coordinates: `(x span, y span)`.
    pub fn cluster_size(&self) -> (f64, f64) {
        match self.style {
            LayoutStyle::Vertical => (self.width, self.width / 1.3),
            LayoutStyle::Radial => (360.0, (self.width / 2.0 - 120.0).max(0.0)),
        }
    }

    /// Upper bound of the depth range when branch lengths are scaled.
    fn depth_range(&self) -> f64 {
        match self.style {
            LayoutStyle::Vertical => self.width - 20.0,
            LayoutStyle::Radial => self.width / 2.0,
        }
    }

    /// Offset applied to the drawing group.
    pub fn translate_vis(&self) -> (f64, f64) {
        match self.style {
            LayoutStyle::Vertical => (20.0, 20.0),
            LayoutStyle::Radial => {
                let r = self.width / 2.0;
                (r, r * 1.3)
            }
        }
    }

    /// Size of the drawing canvas.
    pub fn canvas_size(&self) -> (f64, f64) {
        (self.width, self.width * 1.3)
    }

    /// Compute cluster positions for every node, indexed by `NodeId`.
    pub fn cluster_positions(&self, tree: &TreeModel) -> Result<Vec<NodePosition>> {
        let n = tree.node_count();
        if n == 0 {
            return Err(EpeekError::InvalidInput("empty tree".into()));
        }
        if !(self.width.is_finite() && self.width > 0.0) {
            return Err(EpeekError::InvalidInput(format!(
                "layout width must be positive, got {}",
                self.width
            )));
        }

        // Raw breadth (leaf ordinal) and height above the deepest leaf.
        let mut x_raw = vec![0.0f64; n];
        let mut height = vec![0.0f64; n];
        let mut leaf_counter = 0.0;
        for id in tree.iter_postorder() {
            let children = tree.children(id);
            if children.is_empty() {
                x_raw[id] = leaf_counter;
                leaf_counter += 1.0;
            } else {
                x_raw[id] =
                    children.iter().map(|&c| x_raw[c]).sum::<f64>() / children.len() as f64;
                height[id] = 1.0 + children.iter().map(|&c| height[c]).fold(0.0, f64::max);
            }
        }

        let (size_x, size_y) = self.cluster_size();
        // Half a leaf spacing of padding on both ends.
        let x0 = -0.5;
        let x1 = (leaf_counter - 1.0) + 0.5;
        let root_height = height[tree.root()];
        let max_dist = tree.max_root_distance();
        let range = self.depth_range();

        let positions = tree
            .nodes()
            .iter()
            .map(|node| {
                let id = node.id;
                let y = if self.scale {
                    if max_dist > 0.0 {
                        node.root_distance / max_dist * range
                    } else {
                        0.0
                    }
                } else if root_height > 0.0 {
                    (1.0 - height[id] / root_height) * size_y
                } else {
                    0.0
                };
                NodePosition {
                    node_id: id,
                    key: node.key,
                    x: (x_raw[id] - x0) / (x1 - x0) * size_x,
                    y,
                }
            })
            .collect();
        Ok(positions)
    }

    /// Map cluster coordinates to drawing coordinates.
    pub fn project(&self, x: f64, y: f64) -> (f64, f64) {
        match self.style {
            LayoutStyle::Vertical => (y, x),
            LayoutStyle::Radial => {
                let a = (x - 90.0) / 180.0 * std::f64::consts::PI;
                (y * a.cos(), y * a.sin())
            }
        }
    }

    /// SVG transform placing a node glyph.
    pub fn node_transform(&self, pos: &NodePosition) -> String {
        match self.style {
            LayoutStyle::Vertical => format!("translate({},{})", num(pos.y), num(pos.x)),
            LayoutStyle::Radial => format!("rotate({})translate({})", num(pos.x - 90.0), num(pos.y)),
        }
    }
}

/// Format a coordinate without a negative zero.
pub(crate) fn num(v: f64) -> f64 {
    if v == 0.0 {
        0.0
    } else {
        v
    }
}
