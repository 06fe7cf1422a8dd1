//! Transitive closure of equivalence relations, computed with plain SELECT queries.
//!
//! No reasoner is involved: the relation is navigated in both directions,
//! one hop at a time, until no new resource is discovered.
//! Each newly discovered resource costs two queries,
//! so the number of queries grows linearly with the size of the equivalence class.
use std::collections::BTreeSet;

use rdfkb_api::ns::owl;
use rdfkb_api::{Error, Prefixes, Result};

use crate::QueryExecutor;

/// The resources reachable from `seed` through `predicate`, in either direction.
///
/// `seed` and `predicate` are IRIs or prefixed names
/// (with a prefix known to `executor`, or one of `rdf`, `rdfs`, `owl`, `xsd`).
/// Resources are returned as compacted by the executor;
/// only IRIs are followed, and `seed` itself is never part of the result.
pub fn closure<E>(executor: &E, seed: &str, predicate: &str) -> Result<BTreeSet<String>>
where
    E: QueryExecutor + ?Sized,
{
    let mut declared = executor.prefixes().clone();
    declared.extend_missing(&Prefixes::well_known());
    // the prologue keeps one declaration per prefix, and so must compaction of the seed
    let prefixes: Prefixes = declared.effective().into_iter().collect();
    let predicate = iri_ref(&prefixes, predicate)?;
    let seed = canonical(&prefixes, seed)?;
    log::debug!("closure of {seed} through {predicate}");

    let mut visited = BTreeSet::from([seed.clone()]);
    let mut frontier: BTreeSet<String> = one_hop(executor, &prefixes, &seed, &predicate)?
        .difference(&visited)
        .cloned()
        .collect();
    while !frontier.is_empty() {
        let mut discovered = BTreeSet::new();
        for node in &frontier {
            discovered.extend(one_hop(executor, &prefixes, node, &predicate)?);
        }
        visited.extend(frontier);
        frontier = discovered.difference(&visited).cloned().collect();
        log::trace!("closure of {seed}: {} visited, {} new", visited.len(), frontier.len());
    }
    visited.remove(&seed);
    Ok(visited)
}

/// The closure of `seed` through `owl:sameAs`.
pub fn same_as<E: QueryExecutor + ?Sized>(executor: &E, seed: &str) -> Result<BTreeSet<String>> {
    closure(executor, seed, &owl::sameAs.to_string())
}

/// The closure of `seed` through `owl:equivalentClass`, navigated in both directions.
pub fn equivalent_classes<E: QueryExecutor + ?Sized>(
    executor: &E,
    seed: &str,
) -> Result<BTreeSet<String>> {
    closure(executor, seed, &owl::equivalentClass.to_string())
}

fn one_hop<E>(executor: &E, prefixes: &Prefixes, node: &str, predicate: &str) -> Result<BTreeSet<String>>
where
    E: QueryExecutor + ?Sized,
{
    let node = iri_ref(prefixes, node)?;
    let prologue = prefixes.to_sparql_prologue();
    let mut ret = BTreeSet::new();
    for pattern in [
        format!("{node} {predicate} ?x"),
        format!("?x {predicate} {node}"),
    ] {
        let query = format!("{prologue}SELECT ?x WHERE {{ {pattern} . FILTER(isIRI(?x)) }}");
        let table = executor.select(&query)?;
        ret.extend(table.column("x").into_iter().flatten().map(str::to_string));
    }
    Ok(ret)
}

/// The SPARQL syntax of the IRI `id`, expanding it if it is a known prefixed name.
fn iri_ref(prefixes: &Prefixes, id: &str) -> Result<String> {
    if id.starts_with("_:") {
        return Err(Error::Configuration(format!(
            "closures can only start from IRIs, not from blank node {id}"
        )));
    }
    let iri = prefixes.expand(id).unwrap_or_else(|| id.to_string());
    if iri.contains(|c: char| c == '>' || c == '<' || c.is_whitespace()) {
        return Err(Error::parse(format!("invalid IRI {iri:?}")));
    }
    Ok(format!("<{iri}>"))
}

/// `id` in the form in which the executor will return it.
fn canonical(prefixes: &Prefixes, id: &str) -> Result<String> {
    let expanded = iri_ref(prefixes, id)?;
    let iri = &expanded[1..expanded.len() - 1];
    Ok(prefixes.compact_iri(iri).unwrap_or_else(|| iri.to_string()))
}
