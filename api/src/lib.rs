//! This crate is part of [rdfkb],
//! a toolkit for querying and navigating RDF knowledge bases.
//!
//! It provides the types shared by all rdfkb crates:
//! * the [`Error`] taxonomy;
//! * ordered namespace [`Prefixes`] and the [`compact`] function
//!   turning RDF terms into display strings;
//! * [`ResultTable`], the sparse table in which SPARQL results are materialized;
//! * [`RdfFormat`] and [`ObjectKind`], describing the data fed to stores.
//!
//! [rdfkb]: https://docs.rs/rdfkb/latest/rdfkb/
#![deny(missing_docs)]

mod compact;
pub use compact::compact;
mod error;
pub use error::*;
mod format;
pub use format::RdfFormat;
pub mod ns;
pub mod object;
pub use object::{ObjectKind, OwnedTerm};
mod prefixes;
pub use prefixes::Prefixes;
mod table;
pub use table::{convert, ResultTable, TableBuilder};
