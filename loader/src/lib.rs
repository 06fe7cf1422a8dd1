//! This crate is part of [rdfkb],
//! a toolkit for querying and navigating RDF knowledge bases.
//!
//! It provides [`Loader`]s, fetching RDF documents identified by URLs
//! and importing them into [`Store`](rdfkb_store::Store)s.
//! [`HttpLoader`] implements content negotiation, timeouts
//! and single-hop redirections on top of a blocking HTTP client.
//!
//! [rdfkb]: https://docs.rs/rdfkb/latest/rdfkb/
#![deny(missing_docs)]

mod _config;
pub use _config::*;
mod _http;
pub use _http::*;
mod _trait;
pub use _trait::*;


#[cfg(test)]
fn test_setup() {
    TEST_SETUP.call_once(|| {
        env_logger::init();
    });
}

#[cfg(test)]
static TEST_SETUP: std::sync::Once = std::sync::Once::new();
