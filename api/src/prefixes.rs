//! An ordered list of namespace prefixes, used for display compaction.
use std::fmt;

/// An ordered mapping from prefixes to namespaces.
///
/// Entries are kept in the order in which they were declared,
/// and the same prefix may appear several times.
/// Compaction ([`Prefixes::compact_iri`]) picks the *first* entry
/// whose namespace is a prefix of the IRI,
/// while [`Prefixes::get`] resolves a prefix to its *latest* declaration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Prefixes {
    entries: Vec<(String, String)>,
}

impl Prefixes {
    /// Build an empty prefix list.
    pub fn new() -> Self {
        Self::default()
    }

    /// The `rdf:`, `rdfs:`, `owl:` and `xsd:` prefixes.
    pub fn well_known() -> Self {
        [
            ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
            ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
            ("owl", "http://www.w3.org/2002/07/owl#"),
            ("xsd", "http://www.w3.org/2001/XMLSchema#"),
        ]
        .into_iter()
        .collect()
    }

    /// Append a declaration at the end of this list.
    pub fn push<P: Into<String>, N: Into<String>>(&mut self, prefix: P, namespace: N) {
        self.entries.push((prefix.into(), namespace.into()));
    }

    /// Append all entries of `other` that are not already declared here.
    pub fn extend_missing(&mut self, other: &Prefixes) {
        for (prefix, ns) in other.iter() {
            if self.get(prefix).is_none() {
                self.push(prefix, ns);
            }
        }
    }

    /// The namespace currently bound to `prefix`, if any.
    pub fn get(&self, prefix: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(p, _)| p == prefix)
            .map(|(_, ns)| ns.as_str())
    }

    /// Iterate over the (prefix, namespace) declarations, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.entries.iter().map(|(p, ns)| (p.as_str(), ns.as_str()))
    }

    /// The declarations with shadowed entries removed,
    /// each prefix keeping the position of its first declaration
    /// and the namespace of its last one.
    pub fn effective(&self) -> Vec<(&str, &str)> {
        let mut ret: Vec<(&str, &str)> = Vec::with_capacity(self.entries.len());
        for (p, ns) in self.iter() {
            match ret.iter_mut().find(|(q, _)| *q == p) {
                Some(entry) => entry.1 = ns,
                None => ret.push((p, ns)),
            }
        }
        ret
    }

    /// Number of declarations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there is no declaration at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Compact `iri` with the first declaration whose namespace is a prefix of it.
    pub fn compact_iri(&self, iri: &str) -> Option<String> {
        self.iter()
            .find(|(_, ns)| !ns.is_empty() && iri.starts_with(ns))
            .map(|(p, ns)| format!("{p}:{}", &iri[ns.len()..]))
    }

    /// Expand a prefixed name `p:local` into a full IRI,
    /// if `p` is declared.
    pub fn expand(&self, pname: &str) -> Option<String> {
        let (prefix, local) = pname.split_once(':')?;
        self.get(prefix).map(|ns| format!("{ns}{local}"))
    }

    /// Render these declarations as a SPARQL prologue.
    pub fn to_sparql_prologue(&self) -> String {
        self.effective()
            .into_iter()
            .map(|(p, ns)| format!("PREFIX {p}: <{ns}>\n"))
            .collect()
    }
}

impl<P: Into<String>, N: Into<String>> FromIterator<(P, N)> for Prefixes {
    fn from_iter<I: IntoIterator<Item = (P, N)>>(iter: I) -> Self {
        let mut ret = Prefixes::new();
        for (p, ns) in iter {
            ret.push(p, ns);
        }
        ret
    }
}

impl fmt::Display for Prefixes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sparql_prologue())
    }
}
