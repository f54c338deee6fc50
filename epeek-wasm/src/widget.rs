//! The mountable widget: a configuration record and the instance it builds.
//!
//! A configuration with a `location` mounts a genome browser; anything else
//! mounts a tree widget drawing `newick`.

use log::info;
use serde::{Deserialize, Serialize};

use epeek_core::{EpeekError, Result};
use epeek_genome::browser::{GenomeLocation, Where};
use epeek_genome::pins::Pin;
use epeek_genome::{Gene, GenomeBrowser, SlotType, Step};
use epeek_tree::{LayoutStyle, TreeWidget};

use crate::error::{from_json, wasm_err, wasm_ok, wasm_result};
use crate::tree::{tree_layout, tree_layout_for};

#[cfg(feature = "wasm")]
use wasm_bindgen::prelude::*;

pub const DEFAULT_TITLE: &str = "A simple tree";
pub const DEFAULT_TARGET: &str = "SimpleTree";
pub const DEFAULT_NEWICK: &str = "((human, chimp),mouse)";

/// Widget configuration, as passed to [`mount`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    pub title: String,
    /// Id of the container element.
    pub target: String,
    pub newick: String,
    /// Genomic location; takes precedence over `newick`.
    pub location: Option<Where>,
    pub layout: LayoutStyle,
    pub width: u32,
    pub height: u32,
    /// Scale tree depth by branch length.
    pub scale: bool,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.into(),
            target: DEFAULT_TARGET.into(),
            newick: DEFAULT_NEWICK.into(),
            location: None,
            layout: LayoutStyle::Vertical,
            width: 500,
            height: 150,
            scale: false,
        }
    }
}

#[derive(Debug, Clone)]
enum Mounted {
    Tree(TreeWidget),
    Genome(GenomeBrowser),
}

/// Serializable genome view.
#[derive(Debug, Serialize)]
pub struct JsGenomeView<'a> {
    pub location: &'a GenomeLocation,
    pub width: u32,
    pub height: u32,
    pub background: &'a str,
    pub foreground: &'a str,
    pub slot_type: SlotType,
    pub genes: &'a [Gene],
    pub pins: Vec<&'a Pin>,
    pub degraded: bool,
    pub busy: bool,
}

/// A mounted widget.
#[cfg_attr(feature = "wasm", wasm_bindgen)]
#[derive(Debug, Clone)]
pub struct EpeekWidget {
    config: WidgetConfig,
    mounted: Mounted,
}

impl EpeekWidget {
    pub fn from_config(config: WidgetConfig) -> Result<Self> {
        let mounted = if config.location.is_some() {
            let mut browser = GenomeBrowser::new();
            browser.set_width(config.width);
            browser.set_height(config.height);
            Mounted::Genome(browser)
        } else {
            let mut widget = TreeWidget::new(&config.target);
            widget.set_layout(tree_layout(config.layout, config.width as f64, config.scale));
            widget.set_newick(&config.newick)?;
            Mounted::Tree(widget)
        };
        info!("mounted {} widget in #{}", kind(&mounted), config.target);
        Ok(Self { config, mounted })
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    fn tree(&mut self) -> Result<&mut TreeWidget> {
        match &mut self.mounted {
            Mounted::Tree(widget) => Ok(widget),
            Mounted::Genome(_) => Err(EpeekError::InvalidInput("not a tree widget".into())),
        }
    }

    fn browser(&mut self) -> Result<&mut GenomeBrowser> {
        match &mut self.mounted {
            Mounted::Genome(browser) => Ok(browser),
            Mounted::Tree(_) => Err(EpeekError::InvalidInput("not a genome widget".into())),
        }
    }

    fn step(&mut self, f: impl FnOnce(&mut GenomeBrowser) -> Result<Step>) -> String {
        wasm_result(self.browser().and_then(f))
    }
}

fn kind(mounted: &Mounted) -> &'static str {
    match mounted {
        Mounted::Tree(_) => "tree",
        Mounted::Genome(_) => "genome",
    }
}

#[cfg_attr(feature = "wasm", wasm_bindgen)]
impl EpeekWidget {
    pub fn title(&self) -> String {
        self.config.title.clone()
    }

    pub fn target(&self) -> String {
        self.config.target.clone()
    }

    /// `"tree"` or `"genome"`.
    pub fn kind(&self) -> String {
        kind(&self.mounted).into()
    }

    /// Tree widgets: the SVG of the next frame. Genome widgets: the view.
    pub fn render(&mut self) -> String {
        match &mut self.mounted {
            Mounted::Tree(widget) => wasm_result(widget.render_svg()),
            Mounted::Genome(browser) => wasm_ok(&JsGenomeView {
                location: browser.location(),
                width: browser.width(),
                height: browser.height(),
                background: browser.background_color(),
                foreground: browser.foreground_color(),
                slot_type: browser.slot_type(),
                genes: browser.genes(),
                pins: browser.visible_pins(),
                degraded: browser.is_degraded(),
                busy: browser.is_busy(),
            }),
        }
    }

    /// Show the subtree spanning the named leaves (`names_json`, a JSON array).
    pub fn subtree(&mut self, names_json: &str) -> String {
        wasm_result(self.tree().and_then(|widget| {
            let names: Vec<String> = from_json("names", names_json)?;
            let names: Vec<&str> = names.iter().map(String::as_str).collect();
            widget.subtree(&names)?;
            widget.render_svg()
        }))
    }

    pub fn show_full_tree(&mut self) -> String {
        wasm_result(self.tree().and_then(|widget| {
            widget.show_full_tree();
            widget.render_svg()
        }))
    }

    /// Switch between `vertical` and `radial`.
    pub fn set_layout(&mut self, layout: &str) -> String {
        let (width, scale) = (self.config.width as f64, self.config.scale);
        wasm_result(self.tree().and_then(|widget| {
            widget.set_layout(tree_layout_for(layout, width, scale)?);
            widget.render_svg()
        }))
    }

    /// Start the genome browser at the configured location.
    pub fn start(&mut self) -> String {
        let target = self.config.location.clone();
        self.step(|browser| Ok(browser.start(target)))
    }

    /// Answer request `seq` with a response body.
    pub fn on_response(&mut self, seq: u64, body: &str) -> String {
        self.step(|browser| Ok(browser.on_response(seq, Ok(body))))
    }

    /// Report that request `seq` failed.
    pub fn on_error(&mut self, seq: u64, message: &str) -> String {
        let error = EpeekError::Fetch(message.to_string());
        self.step(|browser| Ok(browser.on_response(seq, Err(error))))
    }

    /// Advance a pan or zoom animation by one frame.
    pub fn tick(&mut self) -> String {
        self.step(|browser| Ok(browser.tick()))
    }

    pub fn left(&mut self, factor: f64) -> String {
        self.step(|browser| browser.left(factor).map(|_| Step::default()))
    }

    pub fn right(&mut self, factor: f64) -> String {
        self.step(|browser| browser.right(factor).map(|_| Step::default()))
    }

    pub fn zoom(&mut self, factor: f64) -> String {
        self.step(|browser| browser.zoom(factor).map(|_| Step::default()))
    }

    /// Pin the positions in `positions_json`; returns the icon used.
    pub fn pin(&mut self, positions_json: &str) -> String {
        wasm_result(self.browser().and_then(|browser| {
            let positions: Vec<u64> = from_json("positions", positions_json)?;
            Ok(browser.pin(&positions, None))
        }))
    }
}

/// Mount a widget from a JSON configuration.
#[cfg_attr(feature = "wasm", wasm_bindgen)]
pub fn mount(config_json: &str) -> std::result::Result<EpeekWidget, String> {
    from_json::<WidgetConfig>("config", config_json)
        .and_then(EpeekWidget::from_config)
        .map_err(wasm_err)
}
