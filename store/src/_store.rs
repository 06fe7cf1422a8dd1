//! The [`Store`] handle, polymorphic over its backing.
use std::error::Error as StdError;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use rdfkb_api::object::{iri, node, object};
use rdfkb_api::{Error, ObjectKind, OwnedTerm, Prefixes, RdfFormat, Result};
use sophia_api::dataset::Dataset;
use sophia_api::graph::{Graph, MutableGraph};
use sophia_api::prefix::{Prefix, PrefixMapPair};
use sophia_api::serializer::{QuadSerializer, Stringifier, TripleSerializer};
use sophia_api::source::{QuadSource, StreamError, TripleSource};
use sophia_api::term::matcher::{Any, TermMatcher};
use sophia_api::term::{BnodeId, SimpleTerm, Term};
use sophia_api::MownStr;
use sophia_api::triple::Triple;
use sophia_api::quad::Quad;
use sophia_inmem::graph::LightGraph;
use sophia_iri::Iri;
use sophia_turtle::serializer::nt::NtSerializer;
use sophia_turtle::serializer::trig::{TrigConfig, TrigSerializer};
use sophia_turtle::serializer::turtle::{TurtleConfig, TurtleSerializer};
use sophia_xml::serializer::RdfXmlSerializer;

use crate::_ontology::node_id;
use crate::{DiskDataset, DiskError, OntologyGraph, TxMode};

/// The kinds of backing a [`Store`] can have.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BackingKind {
    /// A plain in-memory graph.
    Memory,
    /// An in-memory graph with ontology-level helpers (see [`OntologyGraph`]).
    MemoryOntology,
    /// A persistent, transactional dataset (see [`DiskDataset`]).
    DiskDataset,
}

impl BackingKind {
    /// Whether triples can be added one by one to this kind of backing.
    pub fn supports_mutation(self) -> bool {
        match self {
            BackingKind::Memory | BackingKind::MemoryOntology | BackingKind::DiskDataset => true,
        }
    }

    /// Whether this kind of backing requires transactions around reads and writes.
    pub fn is_transactional(self) -> bool {
        self == BackingKind::DiskDataset
    }
}

#[derive(Debug)]
enum Backing {
    Memory(LightGraph),
    Ontology(OntologyGraph),
    Disk(DiskDataset),
}

/// A borrowed view on the data structure backing a [`Store`],
/// for consumers (such as query engines) that work on sophia traits.
#[derive(Clone, Copy, Debug)]
pub enum Backend<'a> {
    /// The store is backed by an in-memory graph.
    Graph(&'a LightGraph),
    /// The store is backed by a disk dataset.
    ///
    /// Reads must happen inside a transaction, see [`Store::read_scope`].
    Dataset(&'a DiskDataset),
}

/// A named collection of triples, with its namespace prefixes.
///
/// A store is owned by its creator; it is `Send` but not `Sync`.
#[derive(Debug)]
pub struct Store {
    name: String,
    backing: Backing,
    prefixes: Prefixes,
    imports: u64,
}

impl Store {
    /// Create an empty in-memory store.
    ///
    /// If `ontology` is true, the store is backed by an [`OntologyGraph`]
    /// and the `rdf`, `rdfs`, `owl` and `xsd` prefixes are pre-registered.
    pub fn in_memory(ontology: bool) -> Self {
        if ontology {
            Store {
                name: "ontology".into(),
                backing: Backing::Ontology(OntologyGraph::new()),
                prefixes: Prefixes::well_known(),
                imports: 0,
            }
        } else {
            Store {
                name: "memory".into(),
                backing: Backing::Memory(LightGraph::new()),
                prefixes: Prefixes::new(),
                imports: 0,
            }
        }
    }

    /// Open, or create, the disk dataset stored at `path`.
    pub fn on_disk<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let dataset = DiskDataset::open(path)
            .map_err(|e| Error::storage(format!("can not open {}", path.display()), e))?;
        Ok(Store {
            name: path.display().to_string(),
            backing: Backing::Disk(dataset),
            prefixes: Prefixes::new(),
            imports: 0,
        })
    }

    /// A human-readable name for this store.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The kind of backing of this store.
    pub fn kind(&self) -> BackingKind {
        match self.backing {
            Backing::Memory(_) => BackingKind::Memory,
            Backing::Ontology(_) => BackingKind::MemoryOntology,
            Backing::Disk(_) => BackingKind::DiskDataset,
        }
    }

    /// The data structure backing this store.
    pub fn backend(&self) -> Backend<'_> {
        match &self.backing {
            Backing::Memory(g) => Backend::Graph(g),
            Backing::Ontology(o) => Backend::Graph(o.graph()),
            Backing::Disk(d) => Backend::Dataset(d),
        }
    }

    /// The ontology graph backing this store, if it is of kind [`BackingKind::MemoryOntology`].
    pub fn ontology(&self) -> Option<&OntologyGraph> {
        match &self.backing {
            Backing::Ontology(o) => Some(o),
            _ => None,
        }
    }

    /// Declare a namespace prefix.
    ///
    /// A prefix registered several times keeps all its declarations:
    /// the latest one is used for expansion and serialization.
    pub fn register_prefix(&mut self, prefix: &str, namespace: &str) -> Result<&mut Self> {
        Prefix::new(prefix)
            .map_err(|e| Error::parse_with(format!("invalid prefix {prefix:?}"), e))?;
        Iri::new(namespace)
            .map_err(|e| Error::parse_with(format!("invalid namespace {namespace:?}"), e))?;
        self.prefixes.push(prefix, namespace);
        Ok(self)
    }

    /// The namespace prefixes registered in this store, in registration order.
    pub fn prefixes(&self) -> &Prefixes {
        &self.prefixes
    }

    /// Expand `id` if it is a prefixed name whose prefix is registered in this store;
    /// return it unchanged otherwise.
    pub fn expand(&self, id: &str) -> String {
        self.prefixes
            .expand(id)
            .unwrap_or_else(|| id.to_string())
    }

    fn check_mutable(&self) -> Result<()> {
        let kind = self.kind();
        if kind.supports_mutation() {
            Ok(())
        } else {
            Err(Error::Configuration(format!(
                "store {} ({kind:?}) does not support adding triples",
                self.name
            )))
        }
    }

    fn triple_terms(
        &self,
        subject: &str,
        predicate: &str,
        obj: &str,
        kind: &ObjectKind,
    ) -> Result<[OwnedTerm; 3]> {
        let s = node(&self.expand(subject))?;
        let p = iri(&self.expand(predicate))?;
        let o = match kind {
            ObjectKind::Reference => node(&self.expand(obj))?,
            _ => object(obj, kind)?,
        };
        Ok([s, p, o])
    }

    /// Add a triple to this store, returning whether it was not already present.
    ///
    /// `subject`, `predicate` and (for [`ObjectKind::Reference`]) `obj`
    /// are IRIs, prefixed names with a registered prefix,
    /// or (except for the predicate) blank node labels starting with `_:`.
    pub fn add_triple(
        &mut self,
        subject: &str,
        predicate: &str,
        obj: &str,
        kind: &ObjectKind,
    ) -> Result<bool> {
        self.check_mutable()?;
        let [s, p, o] = self.triple_terms(subject, predicate, obj, kind)?;
        match &mut self.backing {
            Backing::Memory(g) => insert_in_graph(g, s, p, o),
            Backing::Ontology(og) => insert_in_graph(og.graph_mut(), s, p, o),
            Backing::Disk(d) => in_write_transaction(d, |d| {
                d.insert_quad(s, p, o, None::<SimpleTerm>)
                    .map_err(|e| Error::storage("can not insert triple", e))
            }),
        }
    }

    /// Whether this store contains the given triple.
    ///
    /// Arguments are interpreted as in [`Store::add_triple`].
    pub fn contains_triple(
        &self,
        subject: &str,
        predicate: &str,
        obj: &str,
        kind: &ObjectKind,
    ) -> Result<bool> {
        let [s, p, o] = self.triple_terms(subject, predicate, obj, kind)?;
        match self.backend() {
            Backend::Graph(g) => g
                .contains(s, p, o)
                .map_err(|e| Error::storage("can not read graph", e)),
            Backend::Dataset(d) => {
                let _scope = self.read_scope()?;
                d.contains_triple(s, p, o)
                    .map_err(|e| Error::storage("can not read dataset", e))
            }
        }
    }

    /// Identifiers of the subjects having `predicate` with the resource `obj`.
    pub fn subjects(&self, predicate: &str, obj: &str) -> Result<Vec<String>> {
        let p = iri(&self.expand(predicate))?;
        let o = node(&self.expand(obj))?;
        let _scope = self.read_scope()?;
        let mut ret = vec![];
        for [s, _, _] in matching_triples(self.backend(), Any, [p], [o])? {
            if let Some(id) = node_id(&s) {
                if !ret.iter().any(|known| known == &id) {
                    ret.push(id);
                }
            }
        }
        Ok(ret)
    }

    /// Values of `predicate` for the resource `subject`.
    pub fn objects(&self, subject: &str, predicate: &str) -> Result<Vec<OwnedTerm>> {
        let s = node(&self.expand(subject))?;
        let p = iri(&self.expand(predicate))?;
        let _scope = self.read_scope()?;
        let mut ret: Vec<OwnedTerm> = vec![];
        for [_, _, o] in matching_triples(self.backend(), [s], [p], Any)? {
            if !ret.iter().any(|known| Term::eq(known, &o)) {
                ret.push(o);
            }
        }
        Ok(ret)
    }

    /// Number of triples in this store.
    ///
    /// For disk datasets, this counts quads, so a triple asserted in several graphs
    /// counts once per graph.
    ///
    /// For disk datasets, any open transaction is ended (committed) first,
    /// and the count is made inside its own read transaction.
    pub fn size(&self) -> Result<usize> {
        match &self.backing {
            Backing::Memory(g) => graph_len(g),
            Backing::Ontology(og) => graph_len(og.graph()),
            Backing::Disk(d) => {
                d.end().map_err(tx_error)?;
                d.begin(TxMode::Read).map_err(tx_error)?;
                let res = d.len();
                d.commit().map_err(tx_error)?;
                res.map_err(|e| Error::storage("can not count quads", e))
            }
        }
    }

    /// Serialize the content of this store in the given format.
    ///
    /// Turtle and N3 use the prefixes registered in this store.
    /// TriG is only supported by disk datasets;
    /// other formats serialize the union of all the graphs of a disk dataset.
    pub fn serialize(&self, format: RdfFormat) -> Result<Vec<u8>> {
        log::debug!("serializing {} as {format}", self.name);
        match (&self.backing, format) {
            (Backing::Disk(d), RdfFormat::TriG) => {
                let _scope = self.read_scope()?;
                let mut ser = TrigSerializer::new_stringifier_with_config(
                    TrigConfig::new()
                        .with_pretty(true)
                        .with_own_prefix_map(self.prefix_map()),
                );
                ser.serialize_dataset(d).map_err(serialize_error)?;
                Ok(ser.as_utf8().to_vec())
            }
            (_, RdfFormat::TriG) => Err(Error::Configuration(format!(
                "{format} serialization is only supported by disk datasets, not by {:?} stores",
                self.kind()
            ))),
            (Backing::Memory(g), _) => self.serialize_graph(g, format),
            (Backing::Ontology(og), _) => self.serialize_graph(og.graph(), format),
            (Backing::Disk(d), _) => {
                let _scope = self.read_scope()?;
                self.serialize_graph(&d.union_graph(), format)
            }
        }
    }

    fn serialize_graph<G>(&self, graph: &G, format: RdfFormat) -> Result<Vec<u8>>
    where
        G: Graph,
        G::Error: Send + Sync,
    {
        match format {
            RdfFormat::Turtle | RdfFormat::N3 => {
                let config = TurtleConfig::new()
                    .with_pretty(true)
                    .with_own_prefix_map(self.prefix_map());
                let mut ser = TurtleSerializer::new_stringifier_with_config(config);
                ser.serialize_graph(graph).map_err(serialize_error)?;
                if format == RdfFormat::N3 {
                    Ok(n3_directives(ser.as_str()).into_bytes())
                } else {
                    Ok(ser.as_utf8().to_vec())
                }
            }
            RdfFormat::NTriples => {
                let mut ser = NtSerializer::new_stringifier();
                ser.serialize_graph(graph).map_err(serialize_error)?;
                Ok(ser.as_utf8().to_vec())
            }
            RdfFormat::RdfXml => {
                let mut ser = RdfXmlSerializer::new_stringifier();
                ser.serialize_graph(graph).map_err(serialize_error)?;
                Ok(ser.as_utf8().to_vec())
            }
            RdfFormat::TriG => Err(Error::Configuration(format!(
                "{format} can not serialize a single graph"
            ))),
        }
    }

    fn prefix_map(&self) -> Vec<PrefixMapPair> {
        self.prefixes
            .effective()
            .into_iter()
            .filter_map(|(p, ns)| {
                let pair = Prefix::new(Box::<str>::from(p))
                    .ok()
                    .zip(Iri::new(Box::<str>::from(ns)).ok());
                if pair.is_none() {
                    log::warn!("ignoring invalid prefix declaration {p}: <{ns}>");
                }
                pair
            })
            .collect()
    }

    /// Import RDF data read from `source` into this store.
    ///
    /// `format` is the name or media type of an [`RdfFormat`],
    /// and defaults to RDF/XML.
    /// TriG is only accepted by disk datasets.
    /// The data is fully parsed before the store is modified,
    /// so that malformed data leaves the store unchanged.
    /// Blank nodes are local to each import:
    /// importing the same document twice yields two copies of its blank nodes.
    /// On disk datasets, the import happens inside a write transaction
    /// committed on success and rolled back on failure,
    /// unless a transaction is already open, in which case the import joins it.
    pub fn import<R: BufRead>(&mut self, source: R, format: Option<&str>) -> Result<&mut Self> {
        let format = RdfFormat::parse_or_default(format)?;
        self.import_as(source, format)
    }

    /// Import RDF data from a string. See [`Store::import`].
    pub fn import_str(&mut self, text: &str, format: Option<&str>) -> Result<&mut Self> {
        self.import(text.as_bytes(), format)
    }

    /// Import RDF data from a local file. See [`Store::import`].
    ///
    /// If `format` is `None`, it is guessed from the file extension,
    /// falling back to RDF/XML.
    pub fn import_file<P: AsRef<Path>>(&mut self, path: P, format: Option<&str>) -> Result<&mut Self> {
        let path = path.as_ref();
        let format = match format {
            Some(name) => name.parse()?,
            None => RdfFormat::from_extension(path).unwrap_or(RdfFormat::RdfXml),
        };
        let file = File::open(path).map_err(|source| Error::Io {
            path: path.display().to_string(),
            source,
        })?;
        self.import_as(BufReader::new(file), format)
    }

    fn import_as<R: BufRead>(&mut self, source: R, format: RdfFormat) -> Result<&mut Self> {
        self.check_mutable()?;
        log::debug!("importing {format} into {}", self.name);
        let kind = self.kind();
        let count = match (&mut self.backing, format) {
            (Backing::Disk(d), _) => in_write_transaction(d, |d| add_to_dataset(d, source, format)),
            (_, RdfFormat::TriG) => Err(Error::Configuration(format!(
                "{format} import is only supported by disk datasets, not by {kind:?} stores"
            ))),
            (Backing::Memory(g), _) => {
                let staged = stage(source, format, self.imports + 1)?;
                self.imports += 1;
                add_to_graph(g, staged)
            }
            (Backing::Ontology(og), _) => {
                let staged = stage(source, format, self.imports + 1)?;
                self.imports += 1;
                add_to_graph(og.graph_mut(), staged)
            }
        }?;
        log::debug!("imported {count} new statements into {}", self.name);
        Ok(self)
    }

    /// Open a transaction on this store.
    ///
    /// Fails with [`Error::Configuration`] on in-memory stores.
    /// Beginning a transaction while one is already open is a caller error:
    /// it currently fails with [`Error::Storage`], leaving the first transaction open.
    pub fn begin(&self, mode: TxMode) -> Result<()> {
        self.dataset("begin a transaction")?
            .begin(mode)
            .map_err(tx_error)
    }

    /// Commit the current transaction of this store.
    pub fn commit(&self) -> Result<()> {
        self.dataset("commit")?.commit().map_err(tx_error)
    }

    /// Roll back the current transaction of this store.
    pub fn rollback(&self) -> Result<()> {
        self.dataset("roll back")?.abort().map_err(tx_error)
    }

    /// Whether a transaction is currently open on this store.
    ///
    /// Always false for in-memory stores.
    pub fn in_transaction(&self) -> bool {
        match &self.backing {
            Backing::Disk(d) => d.in_transaction(),
            _ => false,
        }
    }

    /// Ensure that reads can happen on this store until the returned guard is dropped.
    ///
    /// For disk datasets with no open transaction,
    /// this opens a read transaction, ended when the guard is dropped.
    /// In all other cases, this is a no-op.
    pub fn read_scope(&self) -> Result<ReadScope<'_>> {
        match &self.backing {
            Backing::Disk(d) if !d.in_transaction() => {
                d.begin(TxMode::Read).map_err(tx_error)?;
                Ok(ReadScope(Some(d)))
            }
            _ => Ok(ReadScope(None)),
        }
    }

    fn dataset(&self, action: &str) -> Result<&DiskDataset> {
        match &self.backing {
            Backing::Disk(d) => Ok(d),
            _ => Err(Error::Configuration(format!(
                "can not {action} on {:?} store {}: only disk datasets are transactional",
                self.kind(),
                self.name
            ))),
        }
    }
}

/// Guard returned by [`Store::read_scope`].
#[derive(Debug)]
pub struct ReadScope<'a>(Option<&'a DiskDataset>);

impl Drop for ReadScope<'_> {
    fn drop(&mut self) {
        if let Some(d) = self.0 {
            if let Err(e) = d.end() {
                log::warn!("could not end read transaction on {}: {e}", d.path().display());
            }
        }
    }
}

fn tx_error(e: DiskError) -> Error {
    Error::storage("transaction failure", e)
}

fn in_write_transaction<T, F>(d: &DiskDataset, f: F) -> Result<T>
where
    F: FnOnce(&DiskDataset) -> Result<T>,
{
    if d.in_transaction() {
        return f(d);
    }
    d.begin(TxMode::Write).map_err(tx_error)?;
    match f(d) {
        Ok(ret) => {
            d.commit().map_err(tx_error)?;
            Ok(ret)
        }
        Err(err) => {
            if let Err(e) = d.abort() {
                log::warn!("could not roll back {}: {e}", d.path().display());
            }
            Err(err)
        }
    }
}

fn insert_in_graph(g: &mut LightGraph, s: OwnedTerm, p: OwnedTerm, o: OwnedTerm) -> Result<bool> {
    g.insert(s, p, o)
        .map_err(|e| Error::storage("can not insert triple", e))
}

fn graph_len<G: Graph>(g: &G) -> Result<usize>
where
    G::Error: Send + Sync,
{
    let mut n = 0;
    for t in g.triples() {
        t.map_err(|e| Error::storage("can not read graph", e))?;
        n += 1;
    }
    Ok(n)
}

fn matching_triples<S, P, O>(backend: Backend, s: S, p: P, o: O) -> Result<Vec<[OwnedTerm; 3]>>
where
    S: TermMatcher + 'static,
    P: TermMatcher + 'static,
    O: TermMatcher + 'static,
{
    let mut ret = vec![];
    match backend {
        Backend::Graph(g) => {
            for t in g.triples_matching(s, p, o) {
                let t = t.map_err(|e| Error::storage("can not read graph", e))?;
                ret.push(t.spo().map(|x| x.into_term()));
            }
        }
        Backend::Dataset(d) => {
            let union = d.union_graph();
            for t in union.triples_matching(s, p, o) {
                let t = t.map_err(|e| Error::storage("can not read dataset", e))?;
                ret.push(t.spo().map(|x| x.into_term()));
            }
        }
    }
    Ok(ret)
}

/// Rewrite the `PREFIX` directives heading `turtle` in the `@prefix` syntax,
/// the only one understood by N3 parsers.
fn n3_directives(turtle: &str) -> String {
    let mut ret = String::with_capacity(turtle.len() + 16);
    let mut header = true;
    for line in turtle.split_inclusive('\n') {
        match line.strip_prefix("PREFIX ").filter(|_| header) {
            Some(decl) => {
                ret.push_str("@prefix ");
                ret.push_str(decl.trim_end());
                ret.push_str(" .\n");
            }
            None => {
                header = false;
                ret.push_str(line);
            }
        }
    }
    ret
}

/// A statement read from an import, with its graph name if any.
type StagedQuad = ([OwnedTerm; 3], Option<OwnedTerm>);

/// Parse the whole of `source` before anything is written to a store,
/// so that a syntax error leaves the store untouched.
///
/// Blank node labels are prefixed with `i<scope>_`,
/// so that the blank nodes of distinct imports are never merged.
fn stage<R: BufRead>(source: R, format: RdfFormat, scope: u64) -> Result<Vec<StagedQuad>> {
    let prefix = format!("i{scope}_");
    match format {
        RdfFormat::Turtle | RdfFormat::N3 => {
            stage_triples(sophia_turtle::parser::turtle::parse_bufread(source), &prefix)
        }
        RdfFormat::NTriples => stage_triples(sophia_turtle::parser::nt::parse_bufread(source), &prefix),
        RdfFormat::RdfXml => stage_triples(sophia_xml::parser::parse_bufread(source), &prefix),
        RdfFormat::TriG => stage_quads(sophia_turtle::parser::trig::parse_bufread(source), &prefix),
    }
}

fn stage_triples<TS: TripleSource>(mut source: TS, prefix: &str) -> Result<Vec<StagedQuad>> {
    let mut staged = Vec::new();
    source
        .for_each_triple(|t| {
            staged.push(([scoped(t.s(), prefix), scoped(t.p(), prefix), scoped(t.o(), prefix)], None));
        })
        .map_err(|e| Error::parse_with("malformed RDF data", e))?;
    Ok(staged)
}

fn stage_quads<QS: QuadSource>(mut source: QS, prefix: &str) -> Result<Vec<StagedQuad>> {
    let mut staged = Vec::new();
    source
        .for_each_quad(|q| {
            staged.push((
                [scoped(q.s(), prefix), scoped(q.p(), prefix), scoped(q.o(), prefix)],
                q.g().map(|g| scoped(g, prefix)),
            ));
        })
        .map_err(|e| Error::parse_with("malformed RDF data", e))?;
    Ok(staged)
}

fn scoped<T: Term>(t: T, prefix: &str) -> OwnedTerm {
    if let Some(b) = t.bnode_id() {
        let label = format!("{prefix}{}", b.as_str());
        return SimpleTerm::BlankNode(BnodeId::new_unchecked(MownStr::from(label)));
    }
    t.into_term()
}

fn add_to_graph(g: &mut LightGraph, staged: Vec<StagedQuad>) -> Result<usize> {
    let mut count = 0;
    for ([s, p, o], _) in staged {
        if insert_in_graph(g, s, p, o)? {
            count += 1;
        }
    }
    Ok(count)
}

fn add_to_dataset<R: BufRead>(d: &DiskDataset, source: R, format: RdfFormat) -> Result<usize> {
    let scope = d
        .next_import_scope()
        .map_err(|e| Error::storage("can not allocate import scope", e))?;
    let mut count = 0;
    for ([s, p, o], g) in stage(source, format, scope)? {
        let inserted = d
            .insert_quad(s, p, o, g)
            .map_err(|e| Error::storage("can not store imported data", e))?;
        if inserted {
            count += 1;
        }
    }
    Ok(count)
}

fn serialize_error<E1, E2>(err: StreamError<E1, E2>) -> Error
where
    E1: StdError + Send + Sync + 'static,
    E2: StdError + Send + Sync + 'static,
{
    match err {
        StreamError::SourceError(e) => Error::storage("can not read store", e),
        StreamError::SinkError(e) => Error::storage("can not write serialization", e),
    }
}
