//! Genome region view for the ePeek widget.
//!
//! - [`gene`] — Genes, cross-references, homologues and gene tooltips
//! - [`scale`] — Genomic coordinate to pixel mapping
//! - [`layout`] — Gene slotting with sticky lanes and expanded/collapsed modes
//! - [`rest`] — Ensembl REST URL builders and the `call` abstraction
//! - [`animation`] — Eased pan/zoom interpolation
//! - [`pins`] — Position markers with a rotating icon palette
//! - [`browser`] — The genome browser: location, fetch lifecycle, pan/zoom
//!
//! # Example
//!
//! ```
//! use epeek_genome::{Gene, GeneLayout, LinearScale, Strand};
//!
//! let scale = LinearScale::new((0.0, 1000.0), (0.0, 600.0));
//! let mut genes = vec![
//!     Gene::new("ENSG1", "BRCA2", 100, 400, Strand::Forward),
//!     Gene::new("ENSG2", "ZAR1L", 200, 300, Strand::Reverse),
//! ];
//! let mut layout = GeneLayout::new();
//! layout.layout(&mut genes, &scale);
//! assert_ne!(genes[0].slot, genes[1].slot);
//! ```

pub mod animation;
pub mod browser;
pub mod gene;
pub mod layout;
pub mod pins;
pub mod rest;
pub mod scale;

pub use animation::Ease;
pub use browser::{BrowserEvent, GenomeBrowser, GenomeLocation, RestRequest, Step, Where};
pub use gene::{Gene, Homologues, Strand};
pub use layout::{GeneLayout, SlotMode, SlotType};
pub use pins::Pin;
pub use rest::{EnsemblRest, RestClient, Transport};
pub use scale::{LinearScale, Scale};
