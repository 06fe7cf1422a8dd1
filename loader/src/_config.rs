use serde::Deserialize;

/// The `User-Agent` sent by rdfkb.
pub const DEFAULT_USER_AGENT: &str = concat!("rdfkb/", env!("CARGO_PKG_VERSION"));

/// Configuration of an [`HttpLoader`](crate::HttpLoader).
///
/// Can be built with [`FetchConfig::new`] and the `with_*` methods,
/// or deserialized from any serde format (missing fields take their default value).
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FetchConfig {
    connect_timeout_ms: u64,
    timeout_ms: u64,
    accept: String,
    user_agent: String,
    headers: Vec<(String, String)>,
}

impl FetchConfig {
    /// The default connect timeout, in milliseconds.
    pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5000;
    /// The default request timeout, in milliseconds.
    pub const DEFAULT_TIMEOUT_MS: u64 = 30000;
    /// The default `Accept` header.
    pub const DEFAULT_ACCEPT: &'static str = "application/xml, application/rdf+xml";

    /// Build a default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Maximum time to establish a connection, in milliseconds.
    pub fn connect_timeout_ms(&self) -> u64 {
        self.connect_timeout_ms
    }

    /// Maximum time for a whole request, in milliseconds.
    ///
    /// It covers the whole exchange and stands in for a read timeout:
    /// a download still making progress is cut off once it expires.
    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// The `Accept` header sent with every request.
    pub fn accept(&self) -> &str {
        &self.accept
    }

    /// The `User-Agent` header sent with every request.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Additional headers sent with every request.
    pub fn headers(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Set the connect timeout.
    pub fn with_connect_timeout_ms(mut self, ms: u64) -> Self {
        self.connect_timeout_ms = ms;
        self
    }

    /// Set the request timeout. See [`FetchConfig::timeout_ms`].
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

    /// Add a header sent with every request.
    pub fn with_header<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        FetchConfig {
            connect_timeout_ms: Self::DEFAULT_CONNECT_TIMEOUT_MS,
            timeout_ms: Self::DEFAULT_TIMEOUT_MS,
            accept: Self::DEFAULT_ACCEPT.into(),
            user_agent: DEFAULT_USER_AGENT.into(),
            headers: vec![],
        }
    }
}
