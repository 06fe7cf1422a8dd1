use std::time::Duration;

use rdfkb_api::{Error, Prefixes, Result, ResultTable};
use rdfkb_loader::{check_host, network_error, status_error, DEFAULT_USER_AGENT};
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use reqwest::{StatusCode, Url};
use serde::Deserialize;

use crate::results::parse_table;
use crate::{prologue_prefixes, QueryExecutor};

/// Configuration of a [`SparqlEndpoint`].
///
/// Can be built with [`EndpointConfig::new`] and the `with_*` methods,
/// or deserialized from any serde format (missing fields take their default value).
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EndpointConfig {
    timeout_ms: u64,
    accept: String,
    user_agent: String,
    prefixes: Vec<(String, String)>,
}

impl EndpointConfig {
    /// The default query timeout, in milliseconds.
    pub const DEFAULT_TIMEOUT_MS: u64 = 30000;
    /// The default `Accept` header.
    pub const DEFAULT_ACCEPT: &'static str = "application/sparql-results+xml";

    /// Build a default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Maximum time for a query, in milliseconds.
    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// The `Accept` header sent with every query.
    pub fn accept(&self) -> &str {
        &self.accept
    }

    /// The `User-Agent` header sent with every query.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Prefixes known to the endpoint, used to compact IRIs
    /// that the query's own prologue does not cover.
    pub fn prefixes(&self) -> Prefixes {
        self.prefixes.iter().cloned().collect()
    }

    /// Set the query timeout.
    pub fn with_timeout_ms(mut self, ms: u64) -> Self {
        self.timeout_ms = ms;
        self
    }

    /// Set the `Accept` header.
    pub fn with_accept<T: Into<String>>(mut self, accept: T) -> Self {
        self.accept = accept.into();
        self
    }

    /// Set the `User-Agent` header.
    pub fn with_user_agent<T: Into<String>>(mut self, user_agent: T) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Declare a prefix known to the endpoint.
    pub fn with_prefix<P: Into<String>, N: Into<String>>(mut self, prefix: P, namespace: N) -> Self {
        self.prefixes.push((prefix.into(), namespace.into()));
        self
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        EndpointConfig {
            timeout_ms: Self::DEFAULT_TIMEOUT_MS,
            accept: Self::DEFAULT_ACCEPT.into(),
            user_agent: DEFAULT_USER_AGENT.into(),
            prefixes: vec![],
        }
    }
}

/// A remote SPARQL endpoint, queried with the SPARQL 1.1 protocol
/// (POST with a `query` form parameter).
#[derive(Clone, Debug)]
pub struct SparqlEndpoint {
    url: Url,
    client: Client,
    timeout: Duration,
    accept: String,
    prefixes: Prefixes,
}

impl SparqlEndpoint {
    /// An endpoint at `url` with the default [`EndpointConfig`].
    pub fn new(url: &str) -> Result<Self> {
        Self::with_config(url, &EndpointConfig::default())
    }

    /// An endpoint at `url` with the given config.
    pub fn with_config(url: &str, config: &EndpointConfig) -> Result<Self> {
        let url = Url::parse(url)
            .map_err(|e| Error::parse_with(format!("invalid endpoint URL {url:?}"), e))?;
        let client = Client::builder()
            .user_agent(config.user_agent())
            .build()
            .map_err(|e| network_error(url.as_str(), e))?;
        Ok(SparqlEndpoint {
            url,
            client,
            timeout: Duration::from_millis(config.timeout_ms()),
            accept: config.accept().to_string(),
            prefixes: config.prefixes(),
        })
    }

    /// The URL of this endpoint.
    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Run a SELECT query on this endpoint.
    ///
    /// IRIs in the result are compacted with the prefixes declared in the query,
    /// then with the prefixes of the endpoint's config.
    /// Any status other than 200 is reported as [`NetworkError::Status`](rdfkb_api::NetworkError::Status).
    pub fn select(&self, sparql: &str) -> Result<ResultTable> {
        let mut prefixes = prologue_prefixes(sparql);
        prefixes.extend_missing(&self.prefixes);
        let body = self.post(sparql)?;
        parse_table(&body[..], &prefixes)
    }

    /// Send `sparql` to this endpoint and return the raw response body.
    pub fn post(&self, sparql: &str) -> Result<Vec<u8>> {
        check_host(&self.url)?;
        log::debug!("POST {}", self.url);
        log::trace!("query:\n{sparql}");
        let resp = self
            .client
            .post(self.url.clone())
            .timeout(self.timeout)
            .header(ACCEPT, &self.accept)
            .form(&[("query", sparql)])
            .send()
            .map_err(|e| network_error(self.url.as_str(), e))?;
        let status = resp.status();
        if status != StatusCode::OK {
            return Err(status_error(self.url.as_str(), status).into());
        }
        Ok(resp
            .bytes()
            .map_err(|e| network_error(self.url.as_str(), e))?
            .to_vec())
    }
}

impl QueryExecutor for SparqlEndpoint {
    fn select(&self, sparql: &str) -> Result<ResultTable> {
        SparqlEndpoint::select(self, sparql)
    }

    fn prefixes(&self) -> &Prefixes {
        &self.prefixes
    }
}

/// Run a SELECT query on the endpoint at `url`, with the given timeout.
///
/// See [`SparqlEndpoint::select`].
pub fn query_remote(url: &str, sparql: &str, timeout_ms: u64) -> Result<ResultTable> {
    let config = EndpointConfig::new().with_timeout_ms(timeout_ms);
    SparqlEndpoint::with_config(url, &config)?.select(sparql)
}

/// Convert an already fetched SPARQL XML results document into a table.
///
/// If the text of the query that produced `xml` is provided,
/// the prefixes it declares are used to compact IRIs;
/// otherwise IRIs are kept in full.
pub fn convert_raw_xml(xml: &[u8], query: Option<&str>) -> Result<ResultTable> {
    let prefixes = query.map(prologue_prefixes).unwrap_or_default();
    parse_table(xml, &prefixes)
}
