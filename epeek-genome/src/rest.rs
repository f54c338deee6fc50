//! Ensembl REST URL builders and the `call` abstraction.
//!
//! URL construction is pure. Fetching goes through a [`Transport`], so the
//! browser can be driven by a blocking HTTP client, a JavaScript `fetch`
//! shim, or canned responses in tests.

use serde::de::DeserializeOwned;

use epeek_core::{EpeekError, Result};

/// Widest region (in bp) the region endpoint serves.
pub const LIMIT_REGION: u64 = 5_000_000;

// ---------------------------------------------------------------------------
// Percent-encoding helper
// ---------------------------------------------------------------------------

fn percent_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len() * 2);
    for b in input.bytes() {
        match b {
            b' ' => out.push_str("%20"),
            b'&' => out.push_str("%26"),
            b'=' => out.push_str("%3D"),
            b'+' => out.push_str("%2B"),
            b'#' => out.push_str("%23"),
            b'?' => out.push_str("%3F"),
            b'/' => out.push_str("%2F"),
            _ => out.push(b as char),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// URL builders
// ---------------------------------------------------------------------------

/// URL builder for the Ensembl REST API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnsemblRest {
    prefix: String,
}

impl Default for EnsemblRest {
    fn default() -> Self {
        Self::new()
    }
}

impl EnsemblRest {
    pub const PREFIX: &'static str = "http://beta.rest.ensembl.org";
    pub const LOCAL_PREFIX: &'static str = "http://127.0.0.1:3000";

    pub fn new() -> Self {
        Self::with_prefix(Self::PREFIX)
    }

    /// Point every endpoint at a local REST server for debugging.
    pub fn local() -> Self {
        Self::with_prefix(Self::LOCAL_PREFIX)
    }

    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            prefix: prefix.trim_end_matches('/').to_string(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Genes overlapping `chr:from-to`.
    ///
    /// ```
    /// use epeek_genome::rest::EnsemblRest;
    /// let url = EnsemblRest::new().region("homo_sapiens", "13", 32889611, 32973805);
    /// assert!(url.ends_with("/feature/region/homo_sapiens/13:32889611-32973805.json?feature=gene"));
    /// ```
    pub fn region(&self, species: &str, chr: &str, from: u64, to: u64) -> String {
        format!(
            "{}/feature/region/{}/{}:{}-{}.json?feature=gene",
            self.prefix,
            percent_encode(species),
            percent_encode(chr),
            from,
            to,
        )
    }

    /// Ensembl genes cross-referenced by an external symbol.
    pub fn xref(&self, species: &str, name: &str) -> String {
        format!(
            "{}/xrefs/symbol/{}/{}.json?object_type=gene",
            self.prefix,
            percent_encode(species),
            percent_encode(name),
        )
    }

    /// Orthologues and paralogues of an Ensembl gene.
    pub fn homologues(&self, id: &str) -> String {
        format!(
            "{}/homology/id/{}.json?format=condensed;sequence=none;type=all",
            self.prefix,
            percent_encode(id),
        )
    }

    /// Lookup of an Ensembl gene by stable id.
    pub fn gene(&self, id: &str) -> String {
        format!("{}/lookup/id/{}.json?format=full", self.prefix, percent_encode(id))
    }

    /// Seq region (chromosome) information.
    pub fn chr_info(&self, species: &str, chr: &str) -> String {
        format!(
            "{}/assembly/info/{}/{}.json?format=full",
            self.prefix,
            percent_encode(species),
            percent_encode(chr),
        )
    }

    /// Alignment block over a region, restricted to a species set.
    pub fn aln_block(
        &self,
        species: &str,
        chr: &str,
        from: u64,
        to: u64,
        method: &str,
        species_set: &[&str],
    ) -> String {
        let mut url = format!(
            "{}/alignment/block/region/{}/{}:{}-{}.json?method={}",
            self.prefix,
            percent_encode(species),
            percent_encode(chr),
            from,
            to,
            percent_encode(method),
        );
        for sp in species_set {
            url.push_str("&species_set=");
            url.push_str(&percent_encode(sp));
        }
        url
    }
}

// ---------------------------------------------------------------------------
// Calls
// ---------------------------------------------------------------------------

/// Something that can GET a URL and return the body.
pub trait Transport {
    fn get(&mut self, url: &str) -> Result<String>;
}

/// Decode a JSON response body.
pub fn decode<R: DeserializeOwned>(body: &str) -> Result<R> {
    serde_json::from_str(body).map_err(|e| EpeekError::Json(e.to_string()))
}

/// REST client: URL builders plus a transport and an in-flight counter.
#[derive(Debug)]
pub struct RestClient<T> {
    urls: EnsemblRest,
    transport: T,
    connections: usize,
}

impl<T: Transport> RestClient<T> {
    pub fn new(transport: T) -> Self {
        Self::with_urls(EnsemblRest::new(), transport)
    }

    pub fn with_urls(urls: EnsemblRest, transport: T) -> Self {
        Self {
            urls,
            transport,
            connections: 0,
        }
    }

    pub fn urls(&self) -> &EnsemblRest {
        &self.urls
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Requests currently in flight.
    pub fn connections(&self) -> usize {
        self.connections
    }

    /// Fetch the raw body of `url`.
    pub fn get_text(&mut self, url: &str) -> Result<String> {
        self.connections += 1;
        log::debug!("GET {url}");
        let body = self.transport.get(url);
        self.connections -= 1;
        body
    }

    /// Fetch and decode `url`.
    pub fn fetch<R: DeserializeOwned>(&mut self, url: &str) -> Result<R> {
        decode(&self.get_text(url)?)
    }

    /// Fetch `url` and hand the decoded response to `on_success`, or the
    /// failure to `on_error`.
    pub fn call<R, S, E>(&mut self, url: &str, on_success: S, on_error: E)
    where
        R: DeserializeOwned,
        S: FnOnce(R),
        E: FnOnce(EpeekError),
    {
        match self.fetch(url) {
            Ok(resp) => on_success(resp),
            Err(e) => {
                log::warn!("request failed: {url}: {e}");
                on_error(e)
            }
        }
    }
}

/// Blocking HTTP transport.
#[cfg(feature = "http")]
#[derive(Debug, Clone)]
pub struct HttpTransport {
    agent: ureq::Agent,
}

#[cfg(feature = "http")]
impl Default for HttpTransport {
    fn default() -> Self {
        Self {
            agent: ureq::Agent::new_with_defaults(),
        }
    }
}

#[cfg(feature = "http")]
impl Transport for HttpTransport {
    fn get(&mut self, url: &str) -> Result<String> {
        self.agent
            .get(url)
            .header("Content-Type", "application/json")
            .call()
            .map_err(|e| EpeekError::Fetch(format!("{url}: {e}")))?
            .into_body()
            .read_to_string()
            .map_err(|e| EpeekError::Fetch(format!("failed to read response: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gene::ChromosomeInfo;
    use std::collections::HashMap;

    struct Canned(HashMap<String, String>);

    impl Transport for Canned {
        fn get(&mut self, url: &str) -> Result<String> {
            self.0
                .get(url)
                .cloned()
                .ok_or_else(|| EpeekError::Fetch(format!("404 {url}")))
        }
    }

    #[test]
    fn endpoint_urls() {
        let rest = EnsemblRest::new();
        assert_eq!(
            rest.xref("human", "BRCA2"),
            "http://beta.rest.ensembl.org/xrefs/symbol/human/BRCA2.json?object_type=gene"
        );
        assert_eq!(
            rest.gene("ENSG00000139618"),
            "http://beta.rest.ensembl.org/lookup/id/ENSG00000139618.json?format=full"
        );
        assert_eq!(
            rest.homologues("ENSG00000139618"),
            "http://beta.rest.ensembl.org/homology/id/ENSG00000139618.json?format=condensed;sequence=none;type=all"
        );
        assert_eq!(
            rest.chr_info("homo_sapiens", "13"),
            "http://beta.rest.ensembl.org/assembly/info/homo_sapiens/13.json?format=full"
        );
    }

    #[test]
    fn aln_block_lists_species_set() {
        let url = EnsemblRest::new().aln_block("human", "2", 10, 20, "EPO", &["human", "mouse"]);
        assert!(url.contains("/alignment/block/region/human/2:10-20.json?method=EPO"));
        assert!(url.ends_with("&species_set=human&species_set=mouse"));
    }

    #[test]
    fn local_prefix() {
        let url = EnsemblRest::local().gene("X");
        assert!(url.starts_with("http://127.0.0.1:3000/lookup/id/"));
    }

    #[test]
    fn species_names_are_encoded() {
        let url = EnsemblRest::new().xref("mus musculus", "A&B");
        assert!(url.contains("/mus%20musculus/A%26B.json"));
    }

    #[test]
    fn call_decodes_success() {
        let url = EnsemblRest::new().chr_info("human", "7");
        let mut canned = HashMap::new();
        canned.insert(url.clone(), r#"{"length": 159138663}"#.to_string());
        let mut client = RestClient::new(Canned(canned));

        let mut got = None;
        client.call(&url, |info: ChromosomeInfo| got = Some(info.length), |_| {});
        assert_eq!(got, Some(159138663));
        assert_eq!(client.connections(), 0);
    }

    #[test]
    fn call_reports_errors() {
        let mut client = RestClient::new(Canned(HashMap::new()));
        let mut err = None;
        client.call::<ChromosomeInfo, _, _>("http://nowhere", |_| {}, |e| err = Some(e));
        assert!(matches!(err, Some(EpeekError::Fetch(_))));
    }

    #[test]
    fn bad_json_is_json_error() {
        let r: Result<ChromosomeInfo> = decode("{not json");
        assert!(matches!(r, Err(EpeekError::Json(_))));
    }
}
