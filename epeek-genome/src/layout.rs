//! Gene slotting: assigns each gene a display lane so that features sharing
//! a lane never overlap on screen, labels included.
//!
//! Slots are sticky. A gene seen in the previous call keeps its lane when
//! that lane still has room, so panning does not reshuffle the view.

use std::collections::HashMap;

use log::debug;
use serde::Serialize;

use crate::gene::Gene;
use crate::scale::Scale;

/// Default pane height in pixels.
pub const DEFAULT_HEIGHT: u32 = 150;

/// Pixels reserved per label character.
pub const CHAR_WIDTH: f64 = 8.0;

/// Row geometry for one display mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SlotType {
    pub slot_height: u32,
    pub gene_height: u32,
    pub show_label: bool,
}

/// Global display mode of a render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotMode {
    #[default]
    Expanded,
    Collapsed,
}

impl SlotMode {
    pub fn slot_type(self) -> SlotType {
        match self {
            SlotMode::Expanded => SlotType {
                slot_height: 30,
                gene_height: 10,
                show_label: true,
            },
            SlotMode::Collapsed => SlotType {
                slot_height: 10,
                gene_height: 7,
                show_label: false,
            },
        }
    }
}

/// Stateful gene layout engine.
#[derive(Debug, Clone)]
pub struct GeneLayout {
    height: u32,
    char_width: f64,
    mode: SlotMode,
    genes: Vec<Gene>,
}

impl Default for GeneLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl GeneLayout {
    pub fn new() -> Self {
        Self {
            height: DEFAULT_HEIGHT,
            char_width: CHAR_WIDTH,
            mode: SlotMode::Expanded,
            genes: Vec::new(),
        }
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn set_height(&mut self, height: u32) {
        self.height = height;
    }

    pub fn char_width(&self) -> f64 {
        self.char_width
    }

    pub fn set_char_width(&mut self, width: f64) {
        self.char_width = width;
    }

    /// Genes placed by the last call to [`layout`](Self::layout).
    pub fn genes(&self) -> &[Gene] {
        &self.genes
    }

    pub fn mode(&self) -> SlotMode {
        self.mode
    }

    /// Row geometry of the current mode.
    pub fn slot_type(&self) -> SlotType {
        self.mode.slot_type()
    }

    /// Lanes that fit in the pane at expanded row height.
    pub fn max_slots(&self) -> usize {
        let rows = self.height / SlotMode::Expanded.slot_type().slot_height;
        rows.saturating_sub(1) as usize
    }

    /// Assign a slot to every gene, in input order, and keep the result as
    /// the previous generation for the next call.
    ///
    /// Returns the number of slots in use.
    pub fn layout<S: Scale + ?Sized>(&mut self, genes: &mut [Gene], scale: &S) -> usize {
        let max_slots = self.max_slots();

        let previous: HashMap<&str, usize> = self
            .genes
            .iter()
            .filter_map(|g| g.slot.map(|s| (g.id.as_str(), s)))
            .collect();
        for gene in genes.iter_mut() {
            if gene.display_label.is_empty() {
                gene.set_display_label();
            }
            if let Some(&slot) = previous.get(gene.id.as_str()) {
                gene.slot = Some(slot);
            }
        }

        // Screen extents of placed genes, per slot.
        let mut lanes: Vec<Vec<(&str, f64, f64)>> = Vec::new();
        let mut placed: Vec<usize> = Vec::with_capacity(genes.len());
        for gene in genes.iter() {
            let extent = self.extent(gene, scale);
            let hint = gene.slot.filter(|&s| s < max_slots);
            let slot = match hint {
                Some(s) if has_space(&gene.id, extent, lanes.get(s)) => s,
                _ => (0..)
                    .find(|&s| has_space(&gene.id, extent, lanes.get(s)))
                    .unwrap_or(lanes.len()),
            };
            if lanes.len() <= slot {
                lanes.resize_with(slot + 1, Vec::new);
            }
            lanes[slot].push((gene.id.as_str(), extent.0, extent.1));
            placed.push(slot);
        }
        for (gene, slot) in genes.iter_mut().zip(placed) {
            gene.slot = Some(slot);
        }

        let needed = genes.iter().filter_map(|g| g.slot).max().map_or(0, |s| s + 1);
        self.mode = if needed > max_slots {
            SlotMode::Collapsed
        } else {
            SlotMode::Expanded
        };
        debug!(
            "gene layout: {} genes in {} slots (max {}), {:?}",
            genes.len(),
            needed,
            max_slots,
            self.mode
        );

        self.genes = genes.to_vec();
        needed
    }

    /// Horizontal screen extent of a gene, label included.
    pub fn extent<S: Scale + ?Sized>(&self, gene: &Gene, scale: &S) -> (f64, f64) {
        let start = scale.apply(gene.start as f64);
        let end = scale.apply(gene.end as f64);
        let label_end = start + gene.display_label.chars().count() as f64 * self.char_width;
        (start, end.max(label_end))
    }
}

/// Whether two extents overlap. Touching endpoints do not.
pub fn overlaps(a: (f64, f64), b: (f64, f64)) -> bool {
    a.0 < b.1 && b.0 < a.1
}

fn has_space(id: &str, extent: (f64, f64), lane: Option<&Vec<(&str, f64, f64)>>) -> bool {
    lane.map_or(true, |occupants| {
        occupants
            .iter()
            .all(|&(other, s, e)| other == id || !overlaps(extent, (s, e)))
    })
}
