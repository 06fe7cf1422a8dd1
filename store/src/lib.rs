//! This crate is part of [rdfkb],
//! a toolkit for querying and navigating RDF knowledge bases.
//!
//! It provides [`Store`], a handle over one of three backings
//! (see [`BackingKind`]):
//! * a plain in-memory graph,
//! * an in-memory [`OntologyGraph`],
//! * a persistent, transactional [`DiskDataset`].
//!
//! Stores can be fed with triples one by one ([`Store::add_triple`])
//! or in bulk ([`Store::import`]), and serialized back ([`Store::serialize`]).
//!
//! ```
//! # fn main() -> rdfkb_api::Result<()> {
//! use rdfkb_api::{ObjectKind, RdfFormat};
//! use rdfkb_store::Store;
//!
//! let mut store = Store::in_memory(false);
//! store.register_prefix("ex", "http://example.org/")?;
//! store.add_triple("ex:alice", "ex:knows", "ex:bob", &ObjectKind::Reference)?;
//! store.import_str("<http://example.org/bob> <http://example.org/name> \"Bob\" .", Some("nt"))?;
//! assert_eq!(store.size()?, 2);
//! let ttl = String::from_utf8(store.serialize(RdfFormat::Turtle)?).unwrap();
//! assert!(ttl.contains("ex:alice"));
//! # Ok(()) }
//! ```
//!
//! [rdfkb]: https://docs.rs/rdfkb/latest/rdfkb/
#![deny(missing_docs)]

mod _disk;
pub use _disk::*;
mod _ontology;
pub use _ontology::OntologyGraph;
mod _store;
pub use _store::*;
mod _validate;
pub use _validate::*;

#[cfg(test)]
mod test;

#[cfg(test)]
fn test_setup() {
    TEST_SETUP.call_once(|| {
        env_logger::init();
    });
}

#[cfg(test)]
static TEST_SETUP: std::sync::Once = std::sync::Once::new();
