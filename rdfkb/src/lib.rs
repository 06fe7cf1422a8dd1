//! This crate gathers the rdfkb crates into a single toolkit
//! for building and querying small RDF knowledge bases.
//!
//! A knowledge base is a [`Store`](store::Store),
//! backed either by an in-memory graph (optionally augmented with ontology helpers)
//! or by a persistent dataset on disk.
//! Stores can be filled from local data or from remote documents,
//! serialized in the usual RDF formats,
//! and queried with SPARQL SELECT, as can remote SPARQL endpoints.
//! Query results are returned as [`ResultTable`](api::ResultTable)s,
//! where IRIs are compacted with the prefixes declared by the query.
//!
//! # Getting Started
//!
//! ```
//! use rdfkb::api::ObjectKind;
//! use rdfkb::sparql::same_as;
//! use rdfkb::store::Store;
//!
//! # fn main() -> rdfkb::api::Result<()> {
//! let mut store = Store::in_memory(true);
//! store.register_prefix("ex", "http://example.org/")?;
//! store.add_triple("ex:alice", "owl:sameAs", "ex:alice2", &ObjectKind::Reference)?;
//! store.add_triple("ex:alice2", "owl:sameAs", "ex:a", &ObjectKind::Reference)?;
//! store.add_triple("ex:alice", "rdfs:label", "Alice", &ObjectKind::PlainLiteral)?;
//!
//! let equivalents = same_as(&store, "ex:alice")?;
//! assert_eq!(equivalents.into_iter().collect::<Vec<_>>(), ["ex:a", "ex:alice2"]);
//!
//! let turtle = store.serialize(rdfkb::api::RdfFormat::Turtle)?;
//! println!("{}", String::from_utf8_lossy(&turtle));
//! # Ok(())
//! # }
//! ```
#![deny(missing_docs)]

pub use rdfkb_api as api;
pub use rdfkb_loader as loader;
pub use rdfkb_sparql as sparql;
pub use rdfkb_store as store;

mod toolkit;
pub use toolkit::*;
