use rdfkb_api::Result;
use rdfkb_store::Store;

/// The representation of a resource, as returned by a [`Loader`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fetched {
    /// The URL from which the content was actually obtained
    /// (differs from the requested one after a redirection).
    pub url: String,
    /// The media type announced by the server, without parameters.
    pub content_type: Option<String>,
    /// The content.
    pub body: Vec<u8>,
}

/// A loader fetches the representation of resources identified by URLs.
pub trait Loader {
    /// Fetch the representation of the resource at `url`,
    /// sending `headers` in addition to those of the loader's configuration.
    fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<Fetched>;

    /// Fetch the resource at `url` and import it into `store`.
    ///
    /// The content is imported with the default format of [`Store::import`] (RDF/XML).
    fn import_url<'s>(
        &self,
        store: &'s mut Store,
        url: &str,
        headers: &[(&str, &str)],
    ) -> Result<&'s mut Store> {
        let fetched = self.get(url, headers)?;
        log::debug!(
            "importing {} bytes from {} ({})",
            fetched.body.len(),
            fetched.url,
            fetched.content_type.as_deref().unwrap_or("no content-type")
        );
        store.import(&fetched.body[..], None)
    }
}
