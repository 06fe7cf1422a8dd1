//! Building owned terms from plain strings.
use sophia_api::term::{BnodeId, LanguageTag, SimpleTerm, Term};
use sophia_api::MownStr;
use sophia_iri::{Iri, IriRef};

use crate::Error;

/// Owned term type used throughout rdfkb.
pub type OwnedTerm = SimpleTerm<'static>;

/// How the object of a triple given as a string must be interpreted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ObjectKind {
    /// The object is a resource: an IRI, or a blank node if it starts with `_:`.
    Reference,
    /// The object is a simple literal (`xsd:string`).
    PlainLiteral,
    /// The object is a literal with the given datatype IRI.
    TypedLiteral(String),
    /// The object is a literal with the given language tag.
    LanguageLiteral(String),
}

/// Build the term identified by `id`:
/// a blank node if `id` starts with `_:`, an absolute IRI otherwise.
pub fn node(id: &str) -> Result<OwnedTerm, Error> {
    match id.strip_prefix("_:") {
        Some(label) => BnodeId::new(label)
            .map(|b| b.into_term())
            .map_err(|e| Error::parse_with(format!("invalid blank node {id:?}"), e)),
        None => iri(id),
    }
}

/// Build the IRI term `id`, which must be an absolute IRI.
pub fn iri(id: &str) -> Result<OwnedTerm, Error> {
    Iri::new(id)
        .map_err(|e| Error::parse_with(format!("invalid IRI {id:?}"), e))?;
    Ok(SimpleTerm::Iri(IriRef::new_unchecked(MownStr::from(
        id.to_string(),
    ))))
}

/// Build the object term described by `value` and `kind`.
pub fn object(value: &str, kind: &ObjectKind) -> Result<OwnedTerm, Error> {
    match kind {
        ObjectKind::Reference => node(value),
        ObjectKind::PlainLiteral => Ok(value.into_term()),
        ObjectKind::TypedLiteral(datatype) => {
            Iri::new(datatype.as_str())
                .map_err(|e| Error::parse_with(format!("invalid datatype {datatype:?}"), e))?;
            Ok(SimpleTerm::LiteralDatatype(
                MownStr::from(value.to_string()),
                IriRef::new_unchecked(MownStr::from(datatype.clone())),
            ))
        }
        ObjectKind::LanguageLiteral(tag) => {
            let tag = LanguageTag::new(tag.as_str())
                .map_err(|e| Error::parse_with(format!("invalid language tag {tag:?}"), e))?;
            Ok((value * tag).into_term())
        }
    }
}
