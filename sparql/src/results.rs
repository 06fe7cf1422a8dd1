//! SPARQL query results in the XML format, and their conversion to [`ResultTable`]s.
use std::collections::HashMap;
use std::io::BufRead;

use rdfkb_api::{Error, OwnedTerm, Prefixes, ResultTable, TableBuilder};
use sophia_api::term::{BnodeId, LanguageTag, Term as _};
use sophia_api::MownStr;
use sophia_iri::IriRef;

mod xml_parser;

/// Error raised while reading a SPARQL results document.
#[derive(Debug, thiserror::Error)]
pub enum ResultsError {
    /// The document is not well-formed XML.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
    /// The document is well-formed XML, but not a valid results document.
    #[error("invalid SPARQL results: {0}")]
    Syntax(String),
    /// A term in the document is invalid.
    #[error("invalid term in SPARQL results: {0}")]
    Term(String),
}

impl From<quick_xml::events::attributes::AttrError> for ResultsError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        ResultsError::Xml(err.into())
    }
}

/// A SPARQL results document.
#[derive(Debug, PartialEq)]
pub enum ResultsDocument {
    /// The result of an ASK query.
    Boolean(bool),
    /// The result of a SELECT query.
    Bindings(BindingsDocument),
}

/// The result of a SELECT query.
#[derive(Debug, PartialEq)]
pub struct BindingsDocument {
    /// The projected variables, in the order of the document head.
    pub variables: Vec<Box<str>>,
    /// One map per solution; unbound variables are absent from the map.
    pub solutions: Vec<HashMap<Box<str>, ResultValue>>,
}

/// A term as it appears in a results document.
#[derive(Clone, Debug, PartialEq)]
pub enum ResultValue {
    /// `<uri>`
    Uri(Box<str>),
    /// `<bnode>`
    Bnode(Box<str>),
    /// `<literal>` without attribute
    Simple(Box<str>),
    /// `<literal datatype="...">`
    Typed(Box<str>, Box<str>),
    /// `<literal xml:lang="...">`
    Lang(Box<str>, Box<str>),
}

impl TryFrom<ResultValue> for OwnedTerm {
    type Error = ResultsError;

    fn try_from(value: ResultValue) -> Result<OwnedTerm, ResultsError> {
        let invalid = |e: &dyn std::fmt::Display| ResultsError::Term(e.to_string());
        match value {
            ResultValue::Uri(iri) => {
                IriRef::new(&*iri).map_err(|e| invalid(&e))?;
                Ok(OwnedTerm::Iri(IriRef::new_unchecked(MownStr::from(
                    iri.into_string(),
                ))))
            }
            ResultValue::Bnode(id) => Ok(BnodeId::new(&*id)
                .map_err(|e| invalid(&e))?
                .into_term()),
            ResultValue::Simple(lex) => Ok((&*lex).into_term()),
            ResultValue::Typed(lex, datatype) => {
                IriRef::new(&*datatype).map_err(|e| invalid(&e))?;
                Ok(OwnedTerm::LiteralDatatype(
                    MownStr::from(lex.into_string()),
                    IriRef::new_unchecked(MownStr::from(datatype.into_string())),
                ))
            }
            ResultValue::Lang(lex, tag) => {
                let tag = LanguageTag::new(&*tag).map_err(|e| invalid(&e))?;
                Ok((&*lex * tag).into_term())
            }
        }
    }
}

impl ResultsDocument {
    /// Parse a results document in the SPARQL XML format.
    pub fn from_xml<R: BufRead>(data: R) -> Result<ResultsDocument, ResultsError> {
        xml_parser::parse_results_document(data)
    }
}

impl BindingsDocument {
    /// Convert these bindings into a table, compacting IRIs with `prefixes`.
    ///
    /// Within each solution, variables are visited in the order of the document head.
    pub fn into_table(self, prefixes: &Prefixes) -> Result<ResultTable, ResultsError> {
        let mut builder = TableBuilder::new(prefixes);
        for mut solution in self.solutions {
            let mut row = Vec::with_capacity(self.variables.len());
            for var in &self.variables {
                let term = solution.remove(var).map(OwnedTerm::try_from).transpose()?;
                row.push((var, term));
            }
            builder.push_row(row);
        }
        Ok(builder.finish())
    }
}

/// Parse a SPARQL XML results document into a table.
///
/// Fails with [`Error::Parse`] if the document is malformed,
/// and with [`Error::Configuration`] if it holds the result of an ASK query.
pub fn parse_table<R: BufRead>(data: R, prefixes: &Prefixes) -> Result<ResultTable, Error> {
    match ResultsDocument::from_xml(data) {
        Ok(ResultsDocument::Bindings(doc)) => doc
            .into_table(prefixes)
            .map_err(|e| Error::parse_with("invalid SPARQL results", e)),
        Ok(ResultsDocument::Boolean(_)) => Err(Error::Configuration(
            "boolean results can not be converted to a table".into(),
        )),
        Err(e) => Err(Error::parse_with("invalid SPARQL results", e)),
    }
}
