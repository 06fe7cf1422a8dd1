//! The ontology-augmented in-memory backing.
use rdfkb_api::ns::{owl, owl_Ontology, owl_imports, rdf, rdfs};
use rdfkb_api::{Error, Result};
use sophia_api::graph::Graph;
use sophia_api::ns::NsTerm;
use sophia_api::term::matcher::Any;
use sophia_api::term::{Term, TermKind};
use sophia_api::triple::Triple;
use sophia_inmem::graph::LightGraph;

/// An in-memory graph holding one or several ontologies.
///
/// It behaves like a plain [`LightGraph`],
/// with a few lookups of ontology-level statements.
/// These lookups only consider asserted triples: no inference is performed.
#[derive(Clone, Debug, Default)]
pub struct OntologyGraph {
    graph: LightGraph,
}

impl OntologyGraph {
    /// An empty ontology graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// The underlying graph.
    pub fn graph(&self) -> &LightGraph {
        &self.graph
    }

    /// The underlying graph, mutably.
    pub fn graph_mut(&mut self) -> &mut LightGraph {
        &mut self.graph
    }

    /// Identifiers of the resources typed as `owl:Ontology`.
    pub fn ontologies(&self) -> Result<Vec<String>> {
        self.subjects_of_type(&[owl_Ontology])
    }

    /// Targets of the `owl:imports` statements of this graph.
    pub fn imports(&self) -> Result<Vec<String>> {
        let mut ret = Vec::new();
        for t in self.graph.triples_matching(Any, [owl_imports], Any) {
            let t = t.map_err(|e| Error::storage("can not read ontology graph", e))?;
            push_unique(&mut ret, t.o());
        }
        Ok(ret)
    }

    /// Identifiers of the resources typed as `owl:Class` or `rdfs:Class`.
    pub fn classes(&self) -> Result<Vec<String>> {
        self.subjects_of_type(&[owl::Class, rdfs::Class])
    }

    fn subjects_of_type(&self, types: &[NsTerm<'static>]) -> Result<Vec<String>> {
        let mut ret = Vec::new();
        for t in self.graph.triples_matching(Any, [rdf::type_], types) {
            let t = t.map_err(|e| Error::storage("can not read ontology graph", e))?;
            push_unique(&mut ret, t.s());
        }
        Ok(ret)
    }
}

impl From<LightGraph> for OntologyGraph {
    fn from(graph: LightGraph) -> Self {
        OntologyGraph { graph }
    }
}

/// The identifier of a node: its IRI, or `_:` followed by its blank node label.
pub(crate) fn node_id<T: Term>(t: T) -> Option<String> {
    match t.kind() {
        TermKind::Iri => t.iri().map(|iri| iri.as_str().to_string()),
        TermKind::BlankNode => t.bnode_id().map(|b| format!("_:{}", b.as_str())),
        _ => None,
    }
}

fn push_unique<T: Term>(ids: &mut Vec<String>, t: T) {
    if let Some(id) = node_id(t) {
        if !ids.iter().any(|known| known == &id) {
            ids.push(id);
        }
    }
}
