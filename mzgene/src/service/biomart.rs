//! Resolve identifiers with an Ensembl [BioMart](https://www.ensembl.org/biomart) server.

use context_error::{BoxedError, Context, CreateError};
use indexmap::IndexSet;
use itertools::Itertools;
use quick_xml::escape::escape;
use reqwest::{Url, blocking::Client};

use crate::{MappingError, MappingService, Provenance};

/// A connection to a BioMart server for one dataset
#[derive(Clone, Debug)]
pub struct BioMart {
    endpoint: Url,
    mart: String,
    dataset: String,
    client: Client,
}

impl BioMart {
    /// Connect to a BioMart server. The dataset is derived from the species
    /// (`hsapiens` → `hsapiens_gene_ensembl`). No request is made yet.
    /// # Errors
    /// If the host is not a valid http(s) URL, or the http client could not be built.
    pub fn connect(
        species: &str,
        host: &str,
        mart: &str,
    ) -> Result<Self, BoxedError<'static, MappingError>> {
        let endpoint = format!("{}/biomart/martservice", host.trim_end_matches('/'));
        let endpoint = Url::parse(&endpoint).map_err(|e| {
            BoxedError::new(
                MappingError::InvalidUrl,
                "Invalid BioMart host",
                e.to_string(),
                Context::none().source(host.to_string()),
            )
        })?;
        if !endpoint.scheme().starts_with("http") {
            return Err(BoxedError::new(
                MappingError::InvalidUrl,
                "Invalid BioMart host",
                "Only HTTP(s) hosts are supported",
                Context::none().source(host.to_string()),
            ));
        }
        let client = Client::builder().build().map_err(|e| {
            BoxedError::new(
                MappingError::ServiceUnavailable,
                "Could not create http client",
                e.to_string(),
                Context::none(),
            )
        })?;
        Ok(Self {
            endpoint,
            mart: mart.to_string(),
            dataset: format!("{species}_gene_ensembl"),
            client,
        })
    }

    /// The dataset used
    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    /// Get the description of the dataset as listed by the mart. This generally contains the
    /// version of the genome assembly.
    fn dataset_description(&self) -> Result<Option<String>, BoxedError<'static, MappingError>> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("type", "datasets")
            .append_pair("mart", &self.mart);
        let body = self
            .client
            .get(url)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .and_then(reqwest::blocking::Response::text)
            .map_err(|e| self.unavailable(&e))?;
        Ok(body.lines().find_map(|line| {
            let mut fields = line.split('\t');
            (fields.nth(1) == Some(self.dataset.as_str()))
                .then(|| fields.next().map(ToString::to_string))
                .flatten()
        }))
    }

    fn unavailable(&self, error: &reqwest::Error) -> BoxedError<'static, MappingError> {
        BoxedError::new(
            MappingError::ServiceUnavailable,
            "Could not reach BioMart",
            error.to_string(),
            Context::none().source(self.endpoint.to_string()),
        )
    }
}

impl MappingService for BioMart {
    fn lookup(
        &self,
        source_attribute: &str,
        target_attribute: &str,
        keys: &IndexSet<String>,
    ) -> Result<Vec<(String, String)>, BoxedError<'static, MappingError>> {
        let query = query_xml(&self.dataset, source_attribute, target_attribute, keys);
        tracing::debug!(
            "Sending BioMart query to {} for {} keys",
            self.endpoint,
            keys.len()
        );
        let body = self
            .client
            .post(self.endpoint.clone())
            .form(&[("query", query.as_str())])
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .and_then(reqwest::blocking::Response::text)
            .map_err(|e| self.unavailable(&e))?;
        parse_response(&body)
            .map_err(|e| e.add_contexts([Context::none().source(self.endpoint.to_string())]))
    }

    fn provenance(&self) -> Option<Provenance> {
        let description = self
            .dataset_description()
            .inspect_err(|e| tracing::debug!("Could not retrieve the dataset description: {e}"))
            .ok()
            .flatten();
        Some(Provenance {
            service: format!("BioMart ({})", self.mart),
            location: self.endpoint.to_string(),
            dataset: Some(self.dataset.clone()),
            description,
        })
    }
}

/// Build the XML query for BioMart, empty keys are left out.
fn query_xml(
    dataset: &str,
    source_attribute: &str,
    target_attribute: &str,
    keys: &IndexSet<String>,
) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><!DOCTYPE Query><Query virtualSchemaName="default" formatter="TSV" header="0" uniqueRows="1" count="" datasetConfigVersion="0.6"><Dataset name="{}" interface="default"><Filter name="{}" value="{}"/><Attribute name="{}"/><Attribute name="{}"/></Dataset></Query>"#,
        escape(dataset),
        escape(source_attribute),
        keys.iter()
            .filter(|k| !k.is_empty())
            .map(|k| escape(k.as_str()))
            .join(","),
        escape(source_attribute),
        escape(target_attribute),
    )
}

/// Parse the TSV response of BioMart, every line is a (key, value) pair. Lines without value are
/// skipped, these are keys that are known but have no value for the target attribute.
fn parse_response(body: &str) -> Result<Vec<(String, String)>, BoxedError<'static, MappingError>> {
    if body.trim_start().starts_with("Query ERROR") {
        return Err(BoxedError::new(
            MappingError::ServiceResponseInvalid,
            "BioMart query failed",
            body.trim().to_string(),
            Context::none(),
        ));
    }
    let mut pairs = Vec::new();
    for (index, line) in body.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }
        let Some((key, value)) = line.split_once('\t') else {
            return Err(BoxedError::new(
                MappingError::ServiceResponseInvalid,
                "Invalid BioMart response",
                "Every line should contain a key and a value separated by a tab",
                Context::full_line(index as u32, line.to_string()),
            ));
        };
        if !value.is_empty() {
            pairs.push((key.to_string(), value.to_string()));
        }
    }
    Ok(pairs)
}

#[cfg(test)]
#[expect(clippy::missing_panics_doc)]
mod tests {
    use context_error::{FullErrorContent, StaticErrorContent};

    use super::*;

    #[test]
    fn connect() {
        let mart = BioMart::connect("mmusculus", "https://www.ensembl.org/", "ENSEMBL_MART_ENSEMBL")
            .unwrap();
        assert_eq!(mart.dataset(), "mmusculus_gene_ensembl");
        assert_eq!(
            mart.endpoint.as_str(),
            "https://www.ensembl.org/biomart/martservice"
        );
        let error = BioMart::connect("hsapiens", "ftp://ensembl.org", "mart").unwrap_err();
        assert!(matches!(error.get_kind(), MappingError::InvalidUrl));
        let error = BioMart::connect("hsapiens", "ensembl", "mart").unwrap_err();
        assert!(matches!(error.get_kind(), MappingError::InvalidUrl));
    }

    #[test]
    fn query() {
        let keys: IndexSet<String> = ["P60709", "", "Q&1", "Q<2"]
            .into_iter()
            .map(ToString::to_string)
            .collect();
        let query = query_xml("hsapiens_gene_ensembl", "uniprotswissprot", "hgnc_symbol", &keys);
        assert!(query.contains(r#"<Dataset name="hsapiens_gene_ensembl" interface="default">"#));
        assert!(query.contains(r#"<Filter name="uniprotswissprot" value="P60709,Q&amp;1,Q&lt;2"/>"#));
        assert!(query.ends_with(
            r#"<Attribute name="uniprotswissprot"/><Attribute name="hgnc_symbol"/></Dataset></Query>"#
        ));
    }

    #[test]
    fn response() {
        let pairs = parse_response("P60709\tACTB\r\nP63261\t\nQ1\tA1\nQ1\tA2\n\n").unwrap();
        assert_eq!(
            pairs,
            [("P60709", "ACTB"), ("Q1", "A1"), ("Q1", "A2")]
                .map(|(a, b)| (a.to_string(), b.to_string()))
        );
        assert!(parse_response("").unwrap().is_empty());
    }

    #[test]
    fn response_errors() {
        let error = parse_response(
            "Query ERROR: caught BioMart::Exception::Usage: Filter uniprot NOT FOUND",
        )
        .unwrap_err();
        assert!(matches!(
            error.get_kind(),
            MappingError::ServiceResponseInvalid
        ));
        assert!(error.get_kind().is_service_error());
        let error = parse_response("<html>Service unavailable</html>").unwrap_err();
        assert!(matches!(
            error.get_kind(),
            MappingError::ServiceResponseInvalid
        ));
    }
}
