use rdfkb_api::Result;
use rdfkb_loader::{FetchConfig, HttpLoader, Loader};
use rdfkb_sparql::{EndpointConfig, SparqlEndpoint};
use rdfkb_store::Store;

/// The network-facing services of an application.
///
/// A toolkit is meant to be built once, when the application starts,
/// and then passed by reference to whatever needs to fetch documents
/// or to query remote endpoints.
/// It holds a single HTTP client for imports, so that connections are reused.
#[derive(Clone, Debug)]
pub struct Toolkit {
    loader: HttpLoader,
    endpoint_config: EndpointConfig,
}

impl Toolkit {
    /// Build a toolkit with the default configurations.
    pub fn new() -> Result<Self> {
        Self::with_configs(FetchConfig::default(), EndpointConfig::default())
    }

    /// Build a toolkit with the given configurations.
    pub fn with_configs(fetch: FetchConfig, endpoint_config: EndpointConfig) -> Result<Self> {
        log::debug!("toolkit with {fetch:?} and {endpoint_config:?}");
        Ok(Toolkit {
            loader: HttpLoader::with_config(fetch)?,
            endpoint_config,
        })
    }

    /// The loader used by [`Toolkit::import_url`].
    pub fn loader(&self) -> &HttpLoader {
        &self.loader
    }

    /// The configuration given to the endpoints built by [`Toolkit::endpoint`].
    pub fn endpoint_config(&self) -> &EndpointConfig {
        &self.endpoint_config
    }

    /// A SPARQL endpoint at `url`, configured with this toolkit's [`EndpointConfig`].
    pub fn endpoint(&self, url: &str) -> Result<SparqlEndpoint> {
        SparqlEndpoint::with_config(url, &self.endpoint_config)
    }

    /// Fetch the RDF/XML document at `url` and import it into `store`.
    ///
    /// See [`HttpLoader`] for how redirections are handled.
    pub fn import_url<'s>(
        &self,
        store: &'s mut Store,
        url: &str,
        headers: &[(&str, &str)],
    ) -> Result<&'s mut Store> {
        self.loader.import_url(store, url, headers)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn endpoints_share_the_toolkit_config() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let toolkit = Toolkit::with_configs(
            FetchConfig::new().with_timeout_ms(1000),
            EndpointConfig::new().with_prefix("ex", "http://example.org/"),
        )?;
        assert_eq!(toolkit.loader().config().timeout_ms(), 1000);
        let endpoint = toolkit.endpoint("http://example.org/sparql")?;
        assert_eq!(endpoint.url(), "http://example.org/sparql");
        assert_eq!(
            rdfkb_sparql::QueryExecutor::prefixes(&endpoint).get("ex"),
            Some("http://example.org/")
        );
        Ok(())
    }
}
