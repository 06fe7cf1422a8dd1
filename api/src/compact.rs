//! Turn RDF terms into display strings.
use std::collections::hash_map::DefaultHasher;
use std::hash::Hasher;

use sophia_api::term::{Term, TermKind};

use crate::Prefixes;

/// Render `term` as a display string.
///
/// * blank nodes are rendered as their local label;
/// * IRIs are compacted with the first matching entry of `prefixes`,
///   or rendered verbatim if none matches;
/// * literals are rendered as their lexical form,
///   without language tag nor datatype;
/// * any other term (quoted triple, variable) gets a label derived from its hash,
///   which is only stable within the current process.
pub fn compact<T: Term>(term: T, prefixes: &Prefixes) -> String {
    match term.kind() {
        TermKind::BlankNode => match term.bnode_id() {
            Some(id) => id.as_str().to_string(),
            None => hash_label(&term),
        },
        TermKind::Iri => match term.iri() {
            Some(iri) => prefixes
                .compact_iri(iri.as_str())
                .unwrap_or_else(|| iri.as_str().to_string()),
            None => hash_label(&term),
        },
        TermKind::Literal => match term.lexical_form() {
            Some(lex) => lex.to_string(),
            None => hash_label(&term),
        },
        _ => hash_label(&term),
    }
}

fn hash_label<T: Term>(term: &T) -> String {
    let mut hasher = DefaultHasher::new();
    Term::hash(term, &mut hasher);
    format!("_:h{:016x}", hasher.finish())
}
