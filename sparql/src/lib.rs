//! This crate is part of [rdfkb],
//! a toolkit for querying and navigating RDF knowledge bases.
//!
//! It runs SPARQL SELECT queries and materializes their results as
//! [`ResultTable`](rdfkb_api::ResultTable)s:
//! * locally, against a [`Store`](rdfkb_store::Store), with [`query_local`];
//! * remotely, against a [`SparqlEndpoint`], with [`query_remote`];
//! * from an already fetched SPARQL XML document, with [`convert_raw_xml`].
//!
//! On top of any [`QueryExecutor`], it computes [closures](closure::closure)
//! of equivalence relations and performs [exactly-one lookups](select_one).
//!
//! ```
//! # fn main() -> rdfkb_api::Result<()> {
//! use rdfkb_sparql::query_local;
//! use rdfkb_store::Store;
//!
//! let mut store = Store::in_memory(false);
//! store.import_str("<http://example.org/a> <http://example.org/p> \"hello\" .", Some("nt"))?;
//! let table = query_local(
//!     &store,
//!     "PREFIX ex: <http://example.org/> SELECT ?s ?o { ?s ex:p ?o }",
//! )?;
//! assert_eq!(table.get_by_name(1, "s"), Some("ex:a"));
//! assert_eq!(table.get_by_name(1, "o"), Some("hello"));
//! # Ok(()) }
//! ```
//!
//! [rdfkb]: https://docs.rs/rdfkb/latest/rdfkb/
#![deny(missing_docs)]

mod _executor;
pub use _executor::*;
mod _local;
pub use _local::*;
mod _remote;
pub use _remote::*;
pub mod closure;
pub use closure::{closure, equivalent_classes, same_as};
mod lookup;
pub use lookup::*;
mod prologue;
pub use prologue::*;
pub mod results;


#[cfg(test)]
fn test_setup() {
    TEST_SETUP.call_once(|| {
        env_logger::init();
    });
}

#[cfg(test)]
static TEST_SETUP: std::sync::Once = std::sync::Once::new();
