use std::net::ToSocketAddrs;
use std::time::Duration;

use rdfkb_api::{Error, NetworkError, Result};
use reqwest::blocking::{Client, Response};
use reqwest::header::{ACCEPT, CONTENT_TYPE, LOCATION};
use reqwest::redirect::Policy;
use reqwest::{StatusCode, Url};

use crate::{FetchConfig, Fetched, Loader};

/// A [`Loader`] fetching resources over HTTP(S).
///
/// Redirections (301, 302, 303) are followed at most once:
/// a redirection answered by another redirection is reported as a
/// [`NetworkError::Status`] carrying the second 3xx status.
#[derive(Clone, Debug)]
pub struct HttpLoader {
    client: Client,
    config: FetchConfig,
}

impl HttpLoader {
    /// Build a loader with the default [`FetchConfig`].
    pub fn new() -> Result<Self> {
        Self::with_config(FetchConfig::default())
    }

    /// Build a loader with the given config.
    ///
    /// The blocking client of reqwest has no per-read timeout,
    /// so [`FetchConfig::timeout_ms`] bounds each request as a whole.
    pub fn with_config(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms()))
            .timeout(Duration::from_millis(config.timeout_ms()))
            .user_agent(config.user_agent())
            .redirect(Policy::none())
            .build()
            .map_err(|e| network_error("", e))?;
        Ok(HttpLoader { client, config })
    }

    /// The configuration of this loader.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    fn send(&self, url: &Url, headers: &[(&str, &str)]) -> Result<Response> {
        check_host(url)?;
        log::debug!("GET {url}");
        let mut req = self
            .client
            .get(url.clone())
            .header(ACCEPT, self.config.accept());
        for (name, value) in self.config.headers().chain(headers.iter().copied()) {
            req = req.header(name, value);
        }
        Ok(req.send().map_err(|e| network_error(url.as_str(), e))?)
    }
}

impl Loader for HttpLoader {
    fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<Fetched> {
        let url = Url::parse(url).map_err(|e| Error::parse_with(format!("invalid URL {url:?}"), e))?;
        let mut resp = self.send(&url, headers)?;
        if is_redirect(resp.status()) {
            let target = location(&url, &resp)?;
            log::debug!("{url} redirected ({}) to {target}", resp.status());
            resp = self.send(&target, headers)?;
        }
        let status = resp.status();
        let final_url = resp.url().to_string();
        if !status.is_success() {
            return Err(status_error(&final_url, status).into());
        }
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(|v| v.trim().to_string());
        let body = resp
            .bytes()
            .map_err(|e| network_error(&final_url, e))?
            .to_vec();
        Ok(Fetched {
            url: final_url,
            content_type,
            body,
        })
    }
}

fn is_redirect(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND | StatusCode::SEE_OTHER
    )
}

fn location(base: &Url, resp: &Response) -> Result<Url, NetworkError> {
    resp.headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|loc| base.join(loc).ok())
        .ok_or_else(|| NetworkError::Redirect {
            url: base.to_string(),
        })
}

/// Check that the host of `url` can be resolved.
///
/// Host-resolution failures are reported as [`NetworkError::UnknownHost`],
/// which the HTTP client would otherwise hide inside a generic connection error.
pub fn check_host(url: &Url) -> Result<(), NetworkError> {
    let Some(host) = url.host_str() else {
        return Ok(());
    };
    let port = url.port_or_known_default().unwrap_or(80);
    let bare = host.trim_start_matches('[').trim_end_matches(']');
    let resolved = match (bare, port).to_socket_addrs() {
        Ok(mut addrs) => addrs.next().is_some(),
        Err(_) => false,
    };
    if resolved {
        Ok(())
    } else {
        Err(NetworkError::UnknownHost {
            host: host.to_string(),
        })
    }
}

/// Convert an error of the HTTP client into a [`NetworkError`].
pub fn network_error(url: &str, err: reqwest::Error) -> NetworkError {
    if err.is_timeout() {
        NetworkError::Timeout { url: url.into() }
    } else {
        NetworkError::Transport {
            url: url.into(),
            source: Box::new(err),
        }
    }
}

/// Build the [`NetworkError`] reporting an unexpected HTTP status.
pub fn status_error(url: &str, status: StatusCode) -> NetworkError {
    NetworkError::Status {
        url: url.into(),
        code: status.as_u16(),
        reason: status.canonical_reason().unwrap_or_default().into(),
    }
}
