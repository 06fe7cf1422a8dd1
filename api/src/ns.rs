//! IRIs of the vocabulary terms that rdfkb relies on.
//!
//! Namespaces are re-exported from [`sophia_api::ns`];
//! the few OWL terms missing from [`owl`] are defined here.

use sophia_api::ns::{IriRef, NsTerm};
pub use sophia_api::ns::{owl, rdf, rdfs, xsd};

const OWL: IriRef<&str> = IriRef::new_unchecked_const("http://www.w3.org/2002/07/owl#");

/// `owl:Ontology`
#[allow(non_upper_case_globals)]
pub static owl_Ontology: NsTerm = NsTerm::new_unchecked(OWL, "Ontology");
/// `owl:imports`
#[allow(non_upper_case_globals)]
pub static owl_imports: NsTerm = NsTerm::new_unchecked(OWL, "imports");
