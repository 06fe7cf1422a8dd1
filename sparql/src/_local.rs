use std::error::Error as StdError;

use rdfkb_api::{Error, Prefixes, Result, ResultTable, TableBuilder};
use rdfkb_store::{Backend, Store};
use sophia_api::dataset::Dataset;
use sophia_api::graph::Graph;
use sophia_api::sparql::{SparqlDataset, SparqlResult};
use sophia_sparql::{SparqlWrapper, SparqlWrapperError};

use crate::{prologue_prefixes, QueryExecutor};

/// Run a SELECT query against `store`.
///
/// The query is evaluated by the SPARQL engine of sophia,
/// which covers basic graph patterns with FILTER, BIND, projection, LIMIT and OFFSET.
/// Other operators (OPTIONAL, UNION, DISTINCT, ORDER BY, GRAPH, VALUES, MINUS, property paths)
/// fail with [`Error::Unsupported`].
/// IRIs in the result are compacted with the prefixes declared in the query prologue.
/// On disk datasets, the query runs inside the open transaction if any,
/// or inside a read transaction ended before returning, whatever the outcome.
pub fn query_local(store: &Store, sparql: &str) -> Result<ResultTable> {
    let prefixes = prologue_prefixes(sparql);
    log::trace!("query on {}:\n{sparql}", store.name());
    let _scope = store.read_scope()?;
    match store.backend() {
        Backend::Graph(g) => select(&g.as_dataset(), sparql, &prefixes),
        Backend::Dataset(d) => select(d, sparql, &prefixes),
    }
}

fn select<D>(dataset: &D, sparql: &str, prefixes: &Prefixes) -> Result<ResultTable>
where
    D: Dataset,
    D::Error: Send + Sync,
{
    let wrapper = SparqlWrapper(dataset);
    let SparqlResult::Bindings(bindings) = wrapper.query(sparql).map_err(query_error)? else {
        return Err(Error::Configuration(
            "only SELECT queries can be converted to a table".into(),
        ));
    };
    let variables: Vec<String> = bindings.variables().into_iter().map(String::from).collect();
    let mut builder = TableBuilder::new(prefixes);
    for row in bindings {
        let row = row.map_err(query_error)?;
        builder.push_row(variables.iter().zip(row));
    }
    let table = builder.finish();
    log::debug!("query returned {} rows", table.row_count());
    Ok(table)
}

fn query_error<E>(err: SparqlWrapperError<E>) -> Error
where
    E: StdError + Send + Sync + 'static,
{
    match err {
        SparqlWrapperError::Parse(e) => Error::parse_with("malformed SPARQL query", e),
        SparqlWrapperError::Override(msg) => Error::parse(format!("invalid SPARQL query: {msg}")),
        SparqlWrapperError::Dataset(e) => Error::storage("can not read store", e),
        SparqlWrapperError::NotImplemented(feature) => Error::Unsupported(feature.to_string()),
    }
}

impl QueryExecutor for Store {
    fn select(&self, sparql: &str) -> Result<ResultTable> {
        query_local(self, sparql)
    }

    fn prefixes(&self) -> &Prefixes {
        Store::prefixes(self)
    }
}
