//! Genomic features and the REST records that describe them.

use serde::{Deserialize, Serialize};

use epeek_core::Annotated;

/// Strand of a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum Strand {
    Forward,
    Reverse,
}

impl TryFrom<i8> for Strand {
    type Error = String;

    fn try_from(v: i8) -> Result<Self, Self::Error> {
        match v {
            1 => Ok(Self::Forward),
            -1 => Ok(Self::Reverse),
            _ => Err(format!("invalid strand {v} (expected 1 or -1)")),
        }
    }
}

impl From<Strand> for i8 {
    fn from(s: Strand) -> i8 {
        match s {
            Strand::Forward => 1,
            Strand::Reverse => -1,
        }
    }
}

/// A gene as returned by the region-features endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gene {
    /// Stable identifier (Ensembl gene id).
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(default)]
    pub external_name: Option<String>,
    pub start: i64,
    pub end: i64,
    pub strand: Strand,
    #[serde(default)]
    pub biotype: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub logic_name: Option<String>,
    #[serde(default)]
    pub seq_region_name: Option<String>,
    /// `<name` on the reverse strand, `name>` on the forward strand.
    #[serde(default)]
    pub display_label: String,
    /// Display lane assigned by the gene layout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<usize>,
}

impl Gene {
    pub fn new(id: &str, name: &str, start: i64, end: i64, strand: Strand) -> Self {
        let mut gene = Self {
            id: id.to_string(),
            external_name: Some(name.to_string()),
            start,
            end,
            strand,
            biotype: None,
            description: None,
            logic_name: None,
            seq_region_name: None,
            display_label: String::new(),
            slot: None,
        };
        gene.set_display_label();
        gene
    }

    /// Derive the display label from the name and strand.
    pub fn set_display_label(&mut self) {
        let name = self.external_name.as_deref().unwrap_or("");
        self.display_label = match self.strand {
            Strand::Reverse => format!("<{name}"),
            Strand::Forward => format!("{name}>"),
        };
    }

    /// Rows for the gene tooltip.
    pub fn tooltip(&self) -> Tooltip {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        Tooltip {
            header: TooltipRow {
                label: "HGNC Symbol".into(),
                value: self.name().to_string(),
            },
            rows: vec![
                TooltipRow {
                    label: "Name".into(),
                    value: self.id.clone(),
                },
                TooltipRow {
                    label: "Gene Type".into(),
                    value: text(&self.biotype),
                },
                TooltipRow {
                    label: "Location".into(),
                    value: format!(
                        "{}:{}-{}",
                        text(&self.seq_region_name),
                        self.start,
                        self.end
                    ),
                },
                TooltipRow {
                    label: "Strand".into(),
                    value: match self.strand {
                        Strand::Forward => "Forward".into(),
                        Strand::Reverse => "Reverse".into(),
                    },
                },
                TooltipRow {
                    label: "Description".into(),
                    value: self.description().unwrap_or_default().to_string(),
                },
            ],
        }
    }
}

impl Annotated for Gene {
    fn name(&self) -> &str {
        self.external_name.as_deref().unwrap_or(&self.id)
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// One `label: value` row of a tooltip table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TooltipRow {
    pub label: String,
    pub value: String,
}

/// Tooltip table content for a gene.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tooltip {
    pub header: TooltipRow,
    pub rows: Vec<TooltipRow>,
}

/// A cross-reference hit from the xref-by-symbol endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Xref {
    pub id: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// A gene record from the lookup-by-id endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneRecord {
    pub id: String,
    pub species: String,
    pub seq_region_name: String,
    pub start: u64,
    pub end: u64,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Chromosome (seq region) information from the assembly endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChromosomeInfo {
    pub length: u64,
    #[serde(default)]
    pub assembly_name: Option<String>,
}

/// A homology relationship from the homology endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Homologue {
    pub id: String,
    #[serde(default)]
    pub protein_id: Option<String>,
    #[serde(default)]
    pub species: Option<String>,
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Homologues split by relationship type.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Homologues {
    pub orthologues: Vec<Homologue>,
    pub paralogues: Vec<Homologue>,
}

impl Homologues {
    /// Split on whether the type mentions `ortholog` or `paralog`.
    pub fn split(all: Vec<Homologue>) -> Self {
        let mut out = Self::default();
        for h in all {
            if h.kind.contains("ortholog") {
                out.orthologues.push(h);
            } else if h.kind.contains("paralog") {
                out.paralogues.push(h);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_label_follows_strand() {
        let fwd = Gene::new("ENSG1", "BRCA2", 10, 20, Strand::Forward);
        let rev = Gene::new("ENSG2", "TP53", 10, 20, Strand::Reverse);
        assert_eq!(fwd.display_label, "BRCA2>");
        assert_eq!(rev.display_label, "<TP53");
    }

    #[test]
    fn deserialize_region_feature() {
        let json = r#"{"ID":"ENSG00000139618","external_name":"BRCA2","start":32889611,
            "end":32973805,"strand":1,"biotype":"protein_coding","feature_type":"gene",
            "seq_region_name":"13","description":null}"#;
        let mut gene: Gene = serde_json::from_str(json).unwrap();
        gene.set_display_label();
        assert_eq!(gene.id, "ENSG00000139618");
        assert_eq!(gene.strand, Strand::Forward);
        assert_eq!(gene.display_label, "BRCA2>");
        assert_eq!(gene.slot, None);
    }

    #[test]
    fn null_name_gives_bare_arrow() {
        let json = r#"{"ID":"X","external_name":null,"start":1,"end":2,"strand":-1}"#;
        let mut gene: Gene = serde_json::from_str(json).unwrap();
        gene.set_display_label();
        assert_eq!(gene.display_label, "<");
    }

    #[test]
    fn bad_strand_rejected() {
        let json = r#"{"ID":"X","start":1,"end":2,"strand":0}"#;
        assert!(serde_json::from_str::<Gene>(json).is_err());
    }

    #[test]
    fn tooltip_rows() {
        let mut gene = Gene::new("ENSG1", "BRCA2", 10, 20, Strand::Reverse);
        gene.seq_region_name = Some("13".into());
        let t = gene.tooltip();
        assert_eq!(t.header.value, "BRCA2");
        assert_eq!(t.rows[2].value, "13:10-20");
        assert_eq!(t.rows[3].value, "Reverse");
    }

    #[test]
    fn name_falls_back_to_id() {
        let mut gene = Gene::new("ENSG1", "BRCA2", 1, 2, Strand::Forward);
        assert_eq!(gene.name(), "BRCA2");
        gene.external_name = None;
        assert_eq!(gene.name(), "ENSG1");
        assert_eq!(gene.description(), None);
        let t = gene.tooltip();
        assert_eq!(t.header.value, "ENSG1");
        assert_eq!(t.rows[4].value, "");
    }

    #[test]
    fn split_homologues() {
        let h = |kind: &str| Homologue {
            id: kind.into(),
            protein_id: None,
            species: None,
            subtype: None,
            kind: kind.into(),
        };
        let split = Homologues::split(vec![
            h("ortholog_one2one"),
            h("within_species_paralog"),
            h("ortholog_one2many"),
            h("other"),
        ]);
        assert_eq!(split.orthologues.len(), 2);
        assert_eq!(split.paralogues.len(), 1);
    }
}
