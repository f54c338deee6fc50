//! Link ("diagonal") path geometry between a parent and a child node.
//!
//! Every link runs through an elbow point at the child's breadth and the
//! parent's depth. The vertical layout draws it as two straight segments;
//! the radial layout draws an arc along the parent's radius to the elbow,
//! then a radial line out to the child.
//!
//! The arc sweep flag is decided the first time a link is drawn and reused
//! afterwards, so an arc does not flip direction across re-renders.

use std::collections::HashMap;
use std::f64::consts::PI;

use crate::layout::{num, LayoutStyle, NodePosition, TreeLayout};
use crate::tree::NodeKey;

/// Sweep flags remembered per link, keyed by the link's target node.
#[derive(Debug, Clone, Default)]
pub struct SweepCache {
    flags: HashMap<NodeKey, u8>,
}

impl SweepCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached flag for the link ending at `key`.
    pub fn get(&self, key: NodeKey) -> Option<u8> {
        self.flags.get(&key).copied()
    }

    /// Forget the flag of a link that left the view.
    pub fn forget(&mut self, key: NodeKey) {
        self.flags.remove(&key);
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    fn get_or_insert_with(&mut self, key: NodeKey, f: impl FnOnce() -> u8) -> u8 {
        *self.flags.entry(key).or_insert_with(f)
    }
}

/// Angle of a projected point, clockwise from 12 o'clock, in `[0, 2π)`.
pub fn coordinate_to_angle(coord: (f64, f64), radius: f64) -> f64 {
    let quarter = PI / 2.0;
    let (x, y) = coord;
    let base = if radius > 0.0 {
        (y / radius).clamp(-1.0, 1.0).asin().abs()
    } else {
        0.0
    };
    match (x >= 0.0, y >= 0.0) {
        (true, true) => quarter - base,
        (true, false) => quarter + base,
        (false, false) => 3.0 * quarter - base,
        (false, true) => 3.0 * quarter + base,
    }
}

/// Sweep flag for an arc from `src` to `mid` on a circle of `radius`.
fn sweep_flag(src: (f64, f64), mid: (f64, f64), radius: f64) -> u8 {
    let src_angle = coordinate_to_angle(src, radius);
    let mid_angle = coordinate_to_angle(mid, radius);
    let clockwise = if (mid_angle - src_angle).abs() > PI {
        mid_angle <= src_angle
    } else {
        mid_angle > src_angle
    };
    if clockwise {
        0
    } else {
        1
    }
}

fn pt(p: (f64, f64)) -> String {
    format!("{},{}", num(p.0), num(p.1))
}

impl TreeLayout {
    /// SVG path data for the link from `parent` to `child`.
    pub fn path_between(
        &self,
        parent: &NodePosition,
        child: &NodePosition,
        sweeps: &mut SweepCache,
    ) -> String {
        let src = self.project(parent.x, parent.y);
        let mid = self.project(child.x, parent.y);
        let dst = self.project(child.x, child.y);
        let radius = src.0.hypot(src.1);
        let sweep = sweeps.get_or_insert_with(child.key, || sweep_flag(src, mid, radius));

        match self.style {
            LayoutStyle::Vertical => format!(
                "M{s} A{s} 0 0,{sweep} {s}L{m} L{d}",
                s = pt(src),
                m = pt(mid),
                d = pt(dst),
            ),
            LayoutStyle::Radial => format!(
                "M{s} A{r},{r} 0 0,{sweep} {m}L{d}L{d}",
                s = pt(src),
                r = num(radius),
                m = pt(mid),
                d = pt(dst),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(key: NodeKey, x: f64, y: f64) -> NodePosition {
        NodePosition { node_id: key as usize, key, x, y }
    }

    #[test]
    fn angles_by_quadrant() {
        let eps = 1e-12;
        assert!((coordinate_to_angle((0.0, 1.0), 1.0) - 0.0).abs() < eps);
        assert!((coordinate_to_angle((1.0, 0.0), 1.0) - PI / 2.0).abs() < eps);
        assert!((coordinate_to_angle((0.0, -1.0), 1.0) - PI).abs() < eps);
        assert!((coordinate_to_angle((-1.0, 0.0), 1.0) - 1.5 * PI).abs() < eps);
        assert_eq!(coordinate_to_angle((0.0, 0.0), 0.0), PI / 2.0);
    }

    #[test]
    fn vertical_path_is_an_elbow() {
        let layout = TreeLayout::vertical();
        let mut sweeps = SweepCache::new();
        let d = layout.path_between(&at(1, 100.0, 0.0), &at(2, 50.0, 80.0), &mut sweeps);
        // Projected (y, x): source (0,100), elbow (0,50), target (80,50).
        assert_eq!(d, "M0,100 A0,100 0 0,0 0,100L0,50 L80,50");
    }

    #[test]
    fn radial_path_arcs_then_runs_out() {
        let layout = TreeLayout::radial();
        let mut sweeps = SweepCache::new();
        // Parent at 90 degrees (3 o'clock in drawing space), radius 10;
        // child at 180 degrees, radius 20.
        let d = layout.path_between(&at(1, 90.0, 10.0), &at(2, 180.0, 20.0), &mut sweeps);
        assert!(d.starts_with("M10,0 A10,10 0 0,"));
        assert_eq!(d.matches('L').count(), 2, "{d}");
        assert!(d.ends_with(",20"), "{d}");
        assert_eq!(sweeps.len(), 1);
    }

    #[test]
    fn sweep_is_cached_per_link() {
        let layout = TreeLayout::radial();
        let mut sweeps = SweepCache::new();
        let first = layout.path_between(&at(1, 90.0, 10.0), &at(2, 180.0, 20.0), &mut sweeps);
        let flag = sweeps.get(2).unwrap();
        // Moving the child to the other side would flip a fresh computation.
        let moved = layout.path_between(&at(1, 90.0, 10.0), &at(2, 10.0, 20.0), &mut sweeps);
        assert_eq!(sweeps.get(2), Some(flag));
        assert!(first.contains(&format!("0 0,{flag} ")));
        assert!(moved.contains(&format!("0 0,{flag} ")));
        sweeps.forget(2);
        assert!(sweeps.is_empty());
    }

    #[test]
    fn opposite_directions_get_opposite_sweeps() {
        let layout = TreeLayout::radial();
        let src = layout.project(90.0, 10.0);
        let r = 10.0;
        let cw = sweep_flag(src, layout.project(120.0, 10.0), r);
        let ccw = sweep_flag(src, layout.project(60.0, 10.0), r);
        assert_ne!(cw, ccw);
    }
}
