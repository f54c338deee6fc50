//! Genome bindings: gene slotting, Ensembl URLs, tooltips and homologues.

use serde::{Deserialize, Serialize};

use epeek_core::{EpeekError, Result};
use epeek_genome::gene::Homologue;
use epeek_genome::{EnsemblRest, Gene, GeneLayout, Homologues, LinearScale, SlotMode, SlotType};

use crate::error::{from_json, wasm_result};

#[cfg(feature = "wasm")]
use wasm_bindgen::prelude::*;

// ── Wrapper types ────────────────────────────────────────────────────────

/// Serializable gene layout.
#[derive(Debug, Serialize)]
pub struct JsGeneLayout {
    pub mode: SlotMode,
    pub slot_type: SlotType,
    pub slots: usize,
    pub genes: Vec<Gene>,
}

/// Parameters of an Ensembl URL. Which fields are required depends on the
/// endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UrlParams {
    pub species: Option<String>,
    pub chr: Option<String>,
    pub from: Option<u64>,
    pub to: Option<u64>,
    pub id: Option<String>,
    pub name: Option<String>,
    pub method: Option<String>,
    pub species_set: Vec<String>,
    pub local: bool,
}

fn required<'a>(endpoint: &str, field: &str, value: &'a Option<String>) -> Result<&'a str> {
    value
        .as_deref()
        .ok_or_else(|| EpeekError::InvalidInput(format!("{endpoint} needs `{field}`")))
}

fn required_pos(endpoint: &str, field: &str, value: Option<u64>) -> Result<u64> {
    value.ok_or_else(|| EpeekError::InvalidInput(format!("{endpoint} needs `{field}`")))
}

fn build_url(endpoint: &str, p: &UrlParams) -> Result<String> {
    let rest = if p.local {
        EnsemblRest::local()
    } else {
        EnsemblRest::new()
    };
    let url = match endpoint {
        "region" => rest.region(
            required(endpoint, "species", &p.species)?,
            required(endpoint, "chr", &p.chr)?,
            required_pos(endpoint, "from", p.from)?,
            required_pos(endpoint, "to", p.to)?,
        ),
        "xref" => rest.xref(
            required(endpoint, "species", &p.species)?,
            required(endpoint, "name", &p.name)?,
        ),
        "gene" => rest.gene(required(endpoint, "id", &p.id)?),
        "homologues" => rest.homologues(required(endpoint, "id", &p.id)?),
        "chr_info" => rest.chr_info(
            required(endpoint, "species", &p.species)?,
            required(endpoint, "chr", &p.chr)?,
        ),
        "aln_block" => {
            let set: Vec<&str> = p.species_set.iter().map(String::as_str).collect();
            rest.aln_block(
                required(endpoint, "species", &p.species)?,
                required(endpoint, "chr", &p.chr)?,
                required_pos(endpoint, "from", p.from)?,
                required_pos(endpoint, "to", p.to)?,
                required(endpoint, "method", &p.method)?,
                &set,
            )
        }
        other => {
            return Err(EpeekError::InvalidInput(format!(
                "unknown endpoint: {other:?}"
            )))
        }
    };
    Ok(url)
}

fn layout_genes(genes_json: &str, from: f64, to: f64, width: f64, height: u32) -> Result<JsGeneLayout> {
    let mut genes: Vec<Gene> = from_json("genes", genes_json)?;
    for gene in &mut genes {
        gene.set_display_label();
    }
    let scale = LinearScale::new((from, to), (0.0, width));
    let mut layout = GeneLayout::new();
    layout.set_height(height);
    let slots = layout.layout(&mut genes, &scale);
    Ok(JsGeneLayout {
        mode: layout.mode(),
        slot_type: layout.slot_type(),
        slots,
        genes,
    })
}

// ── JSON boundary functions ──────────────────────────────────────────────

/// Slot a region response (`genes_json`, a JSON array of Ensembl genes)
/// for a `width`×`height` pane showing `from..to`.
#[cfg_attr(feature = "wasm", wasm_bindgen)]
pub fn gene_layout(genes_json: &str, from: f64, to: f64, width: f64, height: u32) -> String {
    wasm_result(layout_genes(genes_json, from, to, width, height))
}

/// Ensembl REST URL for `endpoint` (`region`, `xref`, `gene`, `homologues`,
/// `chr_info` or `aln_block`).
#[cfg_attr(feature = "wasm", wasm_bindgen)]
pub fn ensembl_url(endpoint: &str, params_json: &str) -> String {
    wasm_result(
        from_json::<UrlParams>("params", params_json).and_then(|p| build_url(endpoint, &p)),
    )
}

/// Tooltip table for one gene.
#[cfg_attr(feature = "wasm", wasm_bindgen)]
pub fn gene_tooltip(gene_json: &str) -> String {
    wasm_result(from_json::<Gene>("gene", gene_json).map(|gene| gene.tooltip()))
}

/// Split a homology list into orthologues and paralogues.
#[cfg_attr(feature = "wasm", wasm_bindgen)]
pub fn split_homologues(homologues_json: &str) -> String {
    wasm_result(from_json::<Vec<Homologue>>("homologues", homologues_json).map(Homologues::split))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(json: &str) -> serde_json::Value {
        let v: serde_json::Value = serde_json::from_str(json).unwrap();
        assert!(v.get("error").is_none(), "unexpected error: {json}");
        v["ok"].clone()
    }

    #[test]
    fn layout_stacks_overlaps() {
        let genes = r#"[
            {"ID":"a","external_name":"AAA","start":100,"end":400,"strand":1},
            {"ID":"b","external_name":"BBB","start":200,"end":300,"strand":-1},
            {"ID":"c","external_name":"CCC","start":800,"end":900,"strand":1}
        ]"#;
        let v = ok(&gene_layout(genes, 0.0, 1000.0, 600.0, 150));
        assert_eq!(v["mode"], "expanded");
        assert_eq!(v["slots"], 2);
        assert_eq!(v["slot_type"]["slot_height"], 30);
        let slots: Vec<_> = v["genes"].as_array().unwrap().iter().map(|g| g["slot"].clone()).collect();
        assert_eq!(slots, vec![serde_json::json!(0), serde_json::json!(1), serde_json::json!(0)]);
        assert_eq!(v["genes"][1]["display_label"], "<BBB");
    }

    #[test]
    fn layout_rejects_bad_json() {
        let v: serde_json::Value =
            serde_json::from_str(&gene_layout("[{}]", 0.0, 1.0, 600.0, 150)).unwrap();
        assert!(v["error"].as_str().unwrap().starts_with("invalid input: genes"));
    }

    #[test]
    fn urls() {
        let v = ok(&ensembl_url("region", r#"{"species":"human","chr":"13","from":1,"to":2}"#));
        assert_eq!(
            v,
            "http://beta.rest.ensembl.org/feature/region/human/13:1-2.json?feature=gene"
        );
        let v = ok(&ensembl_url("gene", r#"{"id":"ENSG1","local":true}"#));
        assert_eq!(v, "http://127.0.0.1:3000/lookup/id/ENSG1.json?format=full");
        let v = ok(&ensembl_url(
            "aln_block",
            r#"{"species":"human","chr":"2","from":1,"to":9,"method":"EPO","species_set":["human","chimp"]}"#,
        ));
        assert!(v.as_str().unwrap().ends_with("&species_set=human&species_set=chimp"));
    }

    #[test]
    fn url_missing_param() {
        let v: serde_json::Value =
            serde_json::from_str(&ensembl_url("xref", r#"{"species":"human"}"#)).unwrap();
        assert_eq!(v["error"], "invalid input: xref needs `name`");
        let v: serde_json::Value = serde_json::from_str(&ensembl_url("nope", "{}")).unwrap();
        assert!(v["error"].as_str().unwrap().contains("unknown endpoint"));
    }

    #[test]
    fn tooltip_table() {
        let v = ok(&gene_tooltip(
            r#"{"ID":"ENSG1","external_name":"BRCA2","start":1,"end":2,"strand":1,"seq_region_name":"13"}"#,
        ));
        assert_eq!(v["header"]["label"], "HGNC Symbol");
        assert_eq!(v["rows"][3]["value"], "Forward");
    }

    #[test]
    fn homologue_split() {
        let v = ok(&split_homologues(
            r#"[{"id":"x","type":"ortholog_one2one"},{"id":"y","type":"other_paralog"}]"#,
        ));
        assert_eq!(v["orthologues"].as_array().unwrap().len(), 1);
        assert_eq!(v["paralogues"][0]["id"], "y");
    }
}
