//! Genome browser state and its REST conversation.
//!
//! The browser never blocks. Operations return a [`Step`] holding the
//! requests the host must perform and the events it should render. The host
//! answers every request with [`GenomeBrowser::on_response`], quoting the
//! request's sequence number. Region responses older than the newest region
//! request are dropped, so the last request always wins.

use std::collections::{BTreeMap, VecDeque};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use epeek_core::{EpeekError, Result};

use crate::animation::{target_domain, DomainAnimation, Ease, Motion};
use crate::gene::{ChromosomeInfo, Gene, GeneRecord, Homologue, Homologues, Xref};
use crate::layout::{GeneLayout, SlotType};
use crate::pins::{Pin, Pins};
use crate::rest::{decode, EnsemblRest, RestClient, Transport, LIMIT_REGION};
use crate::scale::LinearScale;

pub const DEFAULT_WIDTH: u32 = 600;
pub const MIN_WIDTH: u32 = 300;
pub const DEFAULT_HEIGHT: u32 = 150;
/// Narrowest span (bp) the view zooms into.
pub const ZOOM_IN_LIMIT: u64 = 200;

/// The region being shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenomeLocation {
    pub species: String,
    pub chr: String,
    pub from: u64,
    pub to: u64,
}

impl Default for GenomeLocation {
    fn default() -> Self {
        Self {
            species: "human".into(),
            chr: "7".into(),
            from: 139_424_940,
            to: 141_784_100,
        }
    }
}

impl GenomeLocation {
    pub fn span(&self) -> u64 {
        self.to.saturating_sub(self.from)
    }
}

/// Where to start. Unset fields fall back to the current location; a gene
/// takes precedence over coordinates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Where {
    pub species: Option<String>,
    pub chr: Option<String>,
    pub from: Option<u64>,
    pub to: Option<u64>,
    pub gene: Option<String>,
}

/// Pan and zoom bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Limits {
    pub left: u64,
    /// Chromosome length, once known.
    pub right: Option<u64>,
    pub zoom_out: u64,
    pub zoom_in: u64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            left: 0,
            right: None,
            zoom_out: LIMIT_REGION,
            zoom_in: ZOOM_IN_LIMIT,
        }
    }
}

/// What a request is for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Purpose {
    Xref { species: String, name: String },
    Gene { id: String },
    ChrInfo { target: GenomeLocation },
    Region,
    Homologues { id: String },
}

/// A GET the host should perform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestRequest {
    pub seq: u64,
    pub url: String,
    pub purpose: Purpose,
}

/// Something the host should show.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum BrowserEvent {
    XrefFound(Vec<Xref>),
    GeneFound(GeneRecord),
    ChromosomeLength(u64),
    LocationChanged(GenomeLocation),
    /// The visible domain moved during an animation.
    Moved { from: f64, to: f64 },
    /// Genes were fetched and laid out.
    GenesUpdated(usize),
    Homologues(Homologues),
    /// Dark pane plus the "region too wide" banner.
    Degraded(String),
    Recovered,
}

/// Output of a browser operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Step {
    pub requests: Vec<RestRequest>,
    pub events: Vec<BrowserEvent>,
}

impl Step {
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty() && self.events.is_empty()
    }

    fn merge(&mut self, other: Step) {
        self.requests.extend(other.requests);
        self.events.extend(other.events);
    }

    fn event(event: BrowserEvent) -> Self {
        Self {
            requests: Vec::new(),
            events: vec![event],
        }
    }
}

#[derive(Debug, Deserialize)]
struct HomologyResponse {
    data: Vec<HomologyEntry>,
}

#[derive(Debug, Deserialize)]
struct HomologyEntry {
    #[serde(default)]
    homologies: Vec<Homologue>,
}

/// `^ENS\w+\d+$`
pub fn is_ensembl_id(term: &str) -> bool {
    let Some(rest) = term.strip_prefix("ENS") else {
        return false;
    };
    rest.len() >= 2
        && rest.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && rest.ends_with(|c: char| c.is_ascii_digit())
}

/// One genome browser instance.
#[derive(Debug, Clone)]
pub struct GenomeBrowser {
    rest: EnsemblRest,
    loc: GenomeLocation,
    gene: Option<String>,
    limits: Limits,
    width: u32,
    height: u32,
    background: String,
    foreground: String,
    drag_allowed: bool,
    ease: Ease,
    layout: GeneLayout,
    scale: LinearScale,
    pins: Pins,
    pending: BTreeMap<u64, Purpose>,
    next_seq: u64,
    latest_region: Option<u64>,
    degraded: bool,
    animation: Option<DomainAnimation>,
}

impl Default for GenomeBrowser {
    fn default() -> Self {
        Self::new()
    }
}

impl GenomeBrowser {
    pub fn new() -> Self {
        Self::with_rest(EnsemblRest::new())
    }

    pub fn with_rest(rest: EnsemblRest) -> Self {
        let loc = GenomeLocation::default();
        let scale = LinearScale::new(
            (loc.from as f64, loc.to as f64),
            (0.0, DEFAULT_WIDTH as f64),
        );
        let mut layout = GeneLayout::new();
        layout.set_height(DEFAULT_HEIGHT);
        Self {
            rest,
            loc,
            gene: None,
            limits: Limits::default(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            background: "#DDDDDD".into(),
            foreground: "#000000".into(),
            drag_allowed: true,
            ease: Ease::CubicInOut,
            layout,
            scale,
            pins: Pins::new(),
            pending: BTreeMap::new(),
            next_seq: 0,
            latest_region: None,
            degraded: false,
            animation: None,
        }
    }

    /// Send every request to a local REST server.
    pub fn local_rest(&mut self) {
        self.rest = EnsemblRest::local();
    }

    pub fn rest(&self) -> &EnsemblRest {
        &self.rest
    }

    // -----------------------------------------------------------------------
    // Requests
    // -----------------------------------------------------------------------

    fn request(&mut self, url: String, purpose: Purpose) -> Step {
        self.next_seq += 1;
        let seq = self.next_seq;
        debug!("request #{seq}: {url}");
        self.pending.insert(seq, purpose.clone());
        Step {
            requests: vec![RestRequest { seq, url, purpose }],
            events: Vec::new(),
        }
    }

    /// Start showing `target`, or the configured gene, or the current location.
    pub fn start(&mut self, target: Option<Where>) -> Step {
        let target = match target {
            Some(Where {
                gene: Some(gene),
                species,
                ..
            }) => {
                let species = species.unwrap_or_else(|| self.loc.species.clone());
                return self.find_gene(&species, &gene);
            }
            Some(w) => {
                if let Some(species) = w.species {
                    self.loc.species = species;
                }
                if let Some(chr) = w.chr {
                    self.loc.chr = chr;
                }
                if let Some(from) = w.from {
                    self.loc.from = from;
                }
                if let Some(to) = w.to {
                    self.loc.to = to;
                }
                self.loc.clone()
            }
            None => match self.gene.clone() {
                Some(gene) => {
                    let species = self.loc.species.clone();
                    return self.find_gene(&species, &gene);
                }
                None => self.loc.clone(),
            },
        };
        info!(
            "starting at {} {}:{}-{}",
            target.species, target.chr, target.from, target.to
        );
        let url = self.rest.chr_info(&target.species, &target.chr);
        self.request(url, Purpose::ChrInfo { target })
    }

    fn find_gene(&mut self, species: &str, gene: &str) -> Step {
        if is_ensembl_id(gene) {
            self.lookup_gene(gene)
        } else {
            let url = self.rest.xref(species, gene);
            self.request(
                url,
                Purpose::Xref {
                    species: species.to_string(),
                    name: gene.to_string(),
                },
            )
        }
    }

    fn lookup_gene(&mut self, id: &str) -> Step {
        let url = self.rest.gene(id);
        self.request(url, Purpose::Gene { id: id.to_string() })
    }

    /// Fetch the homologues of an Ensembl gene.
    pub fn homologues(&mut self, id: &str) -> Step {
        let url = self.rest.homologues(id);
        self.request(url, Purpose::Homologues { id: id.to_string() })
    }

    fn fetch_region(&mut self) -> Step {
        let span = self.loc.span();
        if span > self.limits.zoom_out {
            warn!("region of {span} bp exceeds the {} bp limit", self.limits.zoom_out);
            self.degraded = true;
            // Region answers still in flight belong to an earlier location.
            self.latest_region = Some(self.next_seq + 1);
            return Step::event(BrowserEvent::Degraded(format!(
                "region too wide ({span} bp)"
            )));
        }
        let url = self
            .rest
            .region(&self.loc.species, &self.loc.chr, self.loc.from, self.loc.to);
        let step = self.request(url, Purpose::Region);
        self.latest_region = Some(self.next_seq);
        step
    }

    /// Feed the answer to request `seq` back into the browser.
    pub fn on_response(&mut self, seq: u64, body: Result<&str>) -> Step {
        let Some(purpose) = self.pending.remove(&seq) else {
            warn!("response to unknown request #{seq}");
            return Step::default();
        };
        if purpose == Purpose::Region && self.latest_region.is_some_and(|latest| seq < latest) {
            warn!("dropping stale region response #{seq}");
            return Step::default();
        }
        match body.and_then(|body| self.handle(purpose, body)) {
            Ok(step) => step,
            Err(e) => {
                warn!("request #{seq} failed: {e}");
                self.degraded = true;
                Step::event(BrowserEvent::Degraded(e.to_string()))
            }
        }
    }

    fn handle(&mut self, purpose: Purpose, body: &str) -> Result<Step> {
        match purpose {
            Purpose::Xref { species, name } => {
                let hits: Vec<Xref> = decode(body)?;
                let hits: Vec<Xref> = hits
                    .into_iter()
                    .filter(|x| x.id.starts_with("ENS"))
                    .collect();
                match hits.first().map(|x| x.id.clone()) {
                    Some(id) => {
                        let mut step = Step::event(BrowserEvent::XrefFound(hits));
                        step.merge(self.lookup_gene(&id));
                        Ok(step)
                    }
                    None => {
                        info!("no Ensembl gene for {name} in {species}, using coordinates");
                        self.gene = None;
                        Ok(self.start(None))
                    }
                }
            }
            Purpose::Gene { .. } => {
                let record: GeneRecord = decode(body)?;
                self.loc = GenomeLocation {
                    species: record.species.clone(),
                    chr: record.seq_region_name.clone(),
                    from: record.start,
                    to: record.end,
                };
                let mut step = Step::event(BrowserEvent::GeneFound(record));
                step.merge(self.start(Some(Where::default())));
                Ok(step)
            }
            Purpose::ChrInfo { target } => {
                let info: ChromosomeInfo = decode(body)?;
                self.limits.right = Some(info.length);
                self.loc = self.fit_start(target, info.length);
                self.scale
                    .set_domain((self.loc.from as f64, self.loc.to as f64));
                let mut step = Step::event(BrowserEvent::ChromosomeLength(info.length));
                step.events
                    .push(BrowserEvent::LocationChanged(self.loc.clone()));
                step.merge(self.fetch_region());
                Ok(step)
            }
            Purpose::Region => {
                let mut genes: Vec<Gene> = decode(body)?;
                for gene in &mut genes {
                    gene.set_display_label();
                }
                self.scale
                    .set_domain((self.loc.from as f64, self.loc.to as f64));
                self.layout.layout(&mut genes, &self.scale);
                let mut step = Step::default();
                if self.degraded {
                    self.degraded = false;
                    step.events.push(BrowserEvent::Recovered);
                }
                step.events.push(BrowserEvent::GenesUpdated(genes.len()));
                Ok(step)
            }
            Purpose::Homologues { .. } => {
                let resp: HomologyResponse = decode(body)?;
                let all = resp
                    .data
                    .into_iter()
                    .next()
                    .map(|entry| entry.homologies)
                    .unwrap_or_default();
                Ok(Step::event(BrowserEvent::Homologues(Homologues::split(all))))
            }
        }
    }

    /// Keep a start target on the chromosome, widening it to at least the
    /// zoom-in limit. Spans above the region limit are left for
    /// `fetch_region` to refuse.
    fn fit_start(&self, mut target: GenomeLocation, length: u64) -> GenomeLocation {
        let left = self.limits.left.min(length);
        let min_span = self.limits.zoom_in.min(length - left);
        target.to = target.to.clamp(left, length);
        target.from = target.from.clamp(left, target.to);
        if target.span() < min_span {
            target.from = target.from.min(length - min_span);
            target.to = target.from + min_span;
        }
        target
    }

    /// Perform every request of `step` (and of the steps they lead to)
    /// through `client`, returning all events in order.
    pub fn drive<T: Transport>(
        &mut self,
        client: &mut RestClient<T>,
        step: Step,
    ) -> Vec<BrowserEvent> {
        let mut events = step.events;
        let mut queue: VecDeque<RestRequest> = step.requests.into();
        while let Some(req) = queue.pop_front() {
            let next = match client.get_text(&req.url) {
                Ok(body) => self.on_response(req.seq, Ok(&body)),
                Err(e) => self.on_response(req.seq, Err(e)),
            };
            events.extend(next.events);
            queue.extend(next.requests);
        }
        events
    }

    /// Requests awaiting an answer.
    pub fn connections(&self) -> usize {
        self.pending.len()
    }

    /// Whether the activity indicator should show.
    pub fn is_busy(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    // -----------------------------------------------------------------------
    // Pan and zoom
    // -----------------------------------------------------------------------

    /// Pan right by `factor` (1.2 moves 20% of the span).
    pub fn right(&mut self, factor: f64) -> Result<()> {
        self.move_by(factor, Motion::Right)
    }

    /// Pan left by `factor`.
    pub fn left(&mut self, factor: f64) -> Result<()> {
        self.move_by(factor, Motion::Left)
    }

    /// Zoom by `factor`: above 1 zooms in, below 1 zooms out.
    pub fn zoom(&mut self, factor: f64) -> Result<()> {
        self.move_by(factor, Motion::Zoom)
    }

    fn move_by(&mut self, factor: f64, motion: Motion) -> Result<()> {
        if !(factor.is_finite() && factor > 0.0) {
            return Err(EpeekError::InvalidInput(format!(
                "move factor must be positive, got {factor}"
            )));
        }
        let current = self.scale.domain();
        let target = self.clamp_domain(target_domain(current, factor, motion));
        debug!("{motion:?} x{factor}: {current:?} -> {target:?}");
        self.animation = Some(DomainAnimation::new(current, target, self.ease));
        Ok(())
    }

    /// Fit a domain inside the chromosome and the zoom limits.
    pub fn clamp_domain(&self, (start, end): (f64, f64)) -> (f64, f64) {
        let left = self.limits.left as f64;
        let right = self.limits.right.map(|r| r as f64);
        let mut max_span = self.limits.zoom_out as f64;
        if let Some(right) = right {
            max_span = max_span.min(right - left);
        }
        let min_span = (self.limits.zoom_in as f64).min(max_span);
        let span = (end - start).clamp(min_span, max_span);
        let centre = (start + end) / 2.0;
        let mut start = centre - span / 2.0;
        if let Some(right) = right {
            start = start.min(right - span);
        }
        start = start.max(left);
        (start, start + span)
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Advance the running animation one step. When it completes the
    /// location is updated and the new region requested.
    pub fn tick(&mut self) -> Step {
        let Some(anim) = self.animation.as_mut() else {
            return Step::default();
        };
        let (from, to) = anim.tick();
        let done = anim.is_done();
        let target = anim.target();
        self.scale.set_domain((from, to));
        let mut step = Step::event(BrowserEvent::Moved { from, to });
        if done {
            self.animation = None;
            self.scale.set_domain(target);
            self.loc.from = target.0.round() as u64;
            self.loc.to = target.1.round() as u64;
            info!("moved to {}:{}-{}", self.loc.chr, self.loc.from, self.loc.to);
            step.events
                .push(BrowserEvent::LocationChanged(self.loc.clone()));
            step.merge(self.fetch_region());
        }
        step
    }

    // -----------------------------------------------------------------------
    // Pins
    // -----------------------------------------------------------------------

    /// Pin positions with `icon`, or the next palette icon. Returns the icon.
    pub fn pin(&mut self, positions: &[u64], icon: Option<&str>) -> String {
        self.pins.pin(positions, icon)
    }

    /// Pins inside the current location.
    pub fn visible_pins(&self) -> Vec<&Pin> {
        self.pins.visible(self.loc.from, self.loc.to).collect()
    }

    // -----------------------------------------------------------------------
    // Getters and setters
    // -----------------------------------------------------------------------

    pub fn location(&self) -> &GenomeLocation {
        &self.loc
    }

    pub fn species(&self) -> &str {
        &self.loc.species
    }

    pub fn set_species(&mut self, species: &str) {
        self.loc.species = species.to_string();
    }

    pub fn chr(&self) -> &str {
        &self.loc.chr
    }

    pub fn set_chr(&mut self, chr: &str) {
        self.loc.chr = chr.to_string();
    }

    pub fn from(&self) -> u64 {
        self.loc.from
    }

    pub fn set_from(&mut self, from: u64) {
        self.loc.from = from;
    }

    pub fn to(&self) -> u64 {
        self.loc.to
    }

    pub fn set_to(&mut self, to: u64) {
        self.loc.to = to;
    }

    pub fn gene(&self) -> Option<&str> {
        self.gene.as_deref()
    }

    /// Gene name or Ensembl id for the next [`start`](Self::start).
    pub fn set_gene(&mut self, gene: &str) {
        self.gene = Some(gene.to_string());
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    /// Set the width in pixels, never below [`MIN_WIDTH`].
    pub fn set_width(&mut self, width: u32) {
        self.width = width.max(MIN_WIDTH);
        self.scale.set_range((0.0, self.width as f64));
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Set the height and re-slot the current genes for it.
    pub fn set_height(&mut self, height: u32) {
        self.height = height;
        self.layout.set_height(height);
        let mut genes = self.layout.genes().to_vec();
        if !genes.is_empty() {
            self.layout.layout(&mut genes, &self.scale);
        }
    }

    pub fn background_color(&self) -> &str {
        &self.background
    }

    pub fn set_background_color(&mut self, color: &str) {
        self.background = color.to_string();
    }

    pub fn foreground_color(&self) -> &str {
        &self.foreground
    }

    pub fn set_foreground_color(&mut self, color: &str) {
        self.foreground = color.to_string();
    }

    pub fn drag_allowed(&self) -> bool {
        self.drag_allowed
    }

    pub fn set_drag_allowed(&mut self, allowed: bool) {
        self.drag_allowed = allowed;
    }

    pub fn ease(&self) -> Ease {
        self.ease
    }

    pub fn set_ease(&mut self, ease: Ease) {
        self.ease = ease;
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    pub fn set_zoom_in_limit(&mut self, bp: u64) {
        self.limits.zoom_in = bp;
    }

    pub fn chr_length(&self) -> Option<u64> {
        self.limits.right
    }

    pub fn scale(&self) -> &LinearScale {
        &self.scale
    }

    /// Genes of the last region fetch, with slots.
    pub fn genes(&self) -> &[Gene] {
        self.layout.genes()
    }

    pub fn slot_type(&self) -> SlotType {
        self.layout.slot_type()
    }
}
