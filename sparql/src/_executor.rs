use rdfkb_api::{Prefixes, ResultTable, Result};

/// Anything able to answer SPARQL SELECT queries with a [`ResultTable`].
///
/// Implemented by [`Store`](rdfkb_store::Store) (local evaluation)
/// and [`SparqlEndpoint`](crate::SparqlEndpoint) (remote evaluation),
/// so that [closures](crate::closure) and [lookups](crate::select_one)
/// work the same on both.
pub trait QueryExecutor {
    /// Run a SELECT query.
    ///
    /// IRIs in the table are compacted with the prefixes declared by the query.
    fn select(&self, sparql: &str) -> Result<ResultTable>;

    /// The namespace prefixes known to this executor,
    /// which callers may declare in the queries they build.
    fn prefixes(&self) -> &Prefixes;
}

impl<T: QueryExecutor + ?Sized> QueryExecutor for &T {
    fn select(&self, sparql: &str) -> Result<ResultTable> {
        (**self).select(sparql)
    }

    fn prefixes(&self) -> &Prefixes {
        (**self).prefixes()
    }
}
