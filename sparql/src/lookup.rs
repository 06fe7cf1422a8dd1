//! Lookups expecting exactly one result.
use rdfkb_api::{Error, Result};

use crate::QueryExecutor;

/// Run `sparql` and return the single value bound to `variable`.
///
/// Duplicate values count once.
/// Fails with [`Error::NotFound`] if `variable` is never bound,
/// and with [`Error::MultipleMatch`] if it is bound to several distinct values.
pub fn select_one<E>(executor: &E, sparql: &str, variable: &str) -> Result<String>
where
    E: QueryExecutor + ?Sized,
{
    let table = executor.select(sparql)?;
    let mut values: Vec<&str> = table.column(variable).into_iter().flatten().collect();
    values.sort_unstable();
    values.dedup();
    match values.as_slice() {
        [] => Err(Error::NotFound(format!("?{variable}"))),
        [value] => Ok(value.to_string()),
        _ => Err(Error::MultipleMatch {
            what: format!("?{variable}"),
            count: values.len(),
        }),
    }
}

/// Find the single resource having `literal` as the (lexical) value of `predicate`.
///
/// `predicate` is an IRI or a prefixed name known to `executor`.
/// Language tags and datatypes of the stored literals are ignored.
pub fn find_by_literal<E>(executor: &E, predicate: &str, literal: &str) -> Result<String>
where
    E: QueryExecutor + ?Sized,
{
    let prefixes = executor.prefixes();
    let predicate = prefixes.expand(predicate).unwrap_or_else(|| predicate.to_string());
    let query = format!(
        "{}SELECT ?s WHERE {{ ?s <{predicate}> ?o . FILTER(STR(?o) = \"{}\") }}",
        prefixes.to_sparql_prologue(),
        escape_literal(literal),
    );
    select_one(executor, &query, "s").map_err(|err| match err {
        Error::NotFound(_) => Error::NotFound(format!("<{predicate}> {literal:?}")),
        Error::MultipleMatch { count, .. } => Error::MultipleMatch {
            what: format!("<{predicate}> {literal:?}"),
            count,
        },
        other => other,
    })
}

fn escape_literal(txt: &str) -> String {
    let mut ret = String::with_capacity(txt.len());
    for c in txt.chars() {
        match c {
            '\\' => ret.push_str("\\\\"),
            '"' => ret.push_str("\\\""),
            '\n' => ret.push_str("\\n"),
            '\r' => ret.push_str("\\r"),
            '\t' => ret.push_str("\\t"),
            c => ret.push(c),
        }
    }
    ret
}
