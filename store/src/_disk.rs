//! A persistent, transactional dataset stored in an SQLite file.
use std::cell::Cell;
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};
use sophia_api::dataset::{DResult, Dataset, SetDataset};
use sophia_api::quad::Spog;
use sophia_api::term::{BnodeId, LanguageTag, SimpleTerm, Term, TermKind};
use sophia_api::MownStr;
use sophia_iri::IriRef;

/// Kind of transaction opened on a [`DiskDataset`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TxMode {
    /// A transaction that only reads.
    Read,
    /// A transaction that may write; other writers are locked out until it ends.
    Write,
}

/// Error raised by a [`DiskDataset`].
#[derive(Debug, thiserror::Error)]
pub enum DiskError {
    /// The SQLite engine failed.
    #[error("sqlite error: {0}")]
    Sqlite(
        #[source]
        #[from]
        rusqlite::Error,
    ),
    /// A term can not be stored (quoted triples and variables are not supported).
    #[error("unsupported term: {0}")]
    UnsupportedTerm(String),
    /// A row of the database does not decode to a valid quad.
    #[error("corrupted row: {0}")]
    Corrupted(String),
    /// A write was attempted inside a read transaction.
    #[error("can not write inside a read transaction")]
    ReadOnly,
}

const SCHEMA: &str = r"
    CREATE TABLE IF NOT EXISTS quad (
        s_kind INTEGER NOT NULL,
        s TEXT NOT NULL,
        p TEXT NOT NULL,
        o_kind INTEGER NOT NULL,
        o TEXT NOT NULL,
        o_datatype TEXT NOT NULL,
        o_lang TEXT NOT NULL,
        g_kind INTEGER NOT NULL,
        g TEXT NOT NULL,
        UNIQUE (s_kind, s, p, o_kind, o, o_datatype, o_lang, g_kind, g)
    );
    CREATE INDEX IF NOT EXISTS quad_p ON quad (p);
    CREATE INDEX IF NOT EXISTS quad_o ON quad (o);
    CREATE TABLE IF NOT EXISTS counter (
        name TEXT PRIMARY KEY,
        value INTEGER NOT NULL
    );
";

// term kinds, as stored in the *_kind columns
const NONE: i64 = 0;
const IRI: i64 = 1;
const BNODE: i64 = 2;
const LITERAL: i64 = 3;

/// A term flattened into its four storage columns: kind, value, datatype, language.
type Row4 = (i64, String, String, String);

/// A disk-backed RDF dataset.
///
/// Quads are stored in a single SQLite table with a uniqueness constraint,
/// so that the dataset is a set of quads.
///
/// Every read and write must happen inside a transaction,
/// opened with [`begin`](DiskDataset::begin) and closed with
/// [`commit`](DiskDataset::commit) or [`abort`](DiskDataset::abort).
/// Beginning a transaction while another one is open on the same dataset
/// is a caller error: the outcome is whatever SQLite decides
/// (currently an error, leaving the first transaction open).
///
/// A `DiskDataset` is not `Sync`: callers must serialize access to it.
#[derive(Debug)]
pub struct DiskDataset {
    path: PathBuf,
    conn: Connection,
    tx: Cell<Option<TxMode>>,
}

impl DiskDataset {
    /// Open the dataset stored at `path`, creating it if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DiskError> {
        let path = path.as_ref().to_path_buf();
        let conn = Connection::open(&path)?;
        conn.execute_batch(SCHEMA)?;
        log::debug!("opened disk dataset {}", path.display());
        Ok(DiskDataset {
            path,
            conn,
            tx: Cell::new(None),
        })
    }

    /// The file in which this dataset is stored.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The currently open transaction, if any.
    pub fn transaction(&self) -> Option<TxMode> {
        self.tx.get()
    }

    /// Open a transaction.
    ///
    /// See the [type documentation](DiskDataset) about nested transactions.
    pub fn begin(&self, mode: TxMode) -> Result<(), DiskError> {
        let sql = match mode {
            TxMode::Read => "BEGIN DEFERRED",
            TxMode::Write => "BEGIN IMMEDIATE",
        };
        log::debug!("{sql} on {}", self.path.display());
        let res = self.conn.execute_batch(sql);
        self.sync_state(mode);
        Ok(res?)
    }

    /// Close the current transaction, making its writes durable.
    pub fn commit(&self) -> Result<(), DiskError> {
        log::debug!("COMMIT on {}", self.path.display());
        let mode = self.tx.get().unwrap_or(TxMode::Read);
        let res = self.conn.execute_batch("COMMIT");
        self.sync_state(mode);
        Ok(res?)
    }

    /// Close the current transaction, discarding its writes.
    pub fn abort(&self) -> Result<(), DiskError> {
        log::debug!("ROLLBACK on {}", self.path.display());
        let mode = self.tx.get().unwrap_or(TxMode::Read);
        let res = self.conn.execute_batch("ROLLBACK");
        self.sync_state(mode);
        Ok(res?)
    }

    /// Close the current transaction if there is one.
    pub fn end(&self) -> Result<(), DiskError> {
        if self.in_transaction() {
            self.commit()
        } else {
            Ok(())
        }
    }

    /// Whether a transaction is currently open.
    pub fn in_transaction(&self) -> bool {
        !self.conn.is_autocommit()
    }

    fn sync_state(&self, mode: TxMode) {
        self.tx.set(if self.conn.is_autocommit() {
            None
        } else {
            Some(self.tx.get().unwrap_or(mode))
        });
    }

    /// Number of quads in this dataset.
    pub fn len(&self) -> Result<usize, DiskError> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM quad", [], |row| row.get(0))?;
        usize::try_from(n).map_err(|_| DiskError::Corrupted(format!("negative count {n}")))
    }

    /// Whether this dataset contains no quad.
    pub fn is_empty(&self) -> Result<bool, DiskError> {
        Ok(self.len()? == 0)
    }

    /// Insert a quad, returning whether it was new.
    pub fn insert_quad<S, P, O, G>(&self, s: S, p: P, o: O, g: Option<G>) -> Result<bool, DiskError>
    where
        S: Term,
        P: Term,
        O: Term,
        G: Term,
    {
        if self.tx.get() == Some(TxMode::Read) {
            return Err(DiskError::ReadOnly);
        }
        let (s_kind, s, _, _) = encode(s)?;
        let (_, p, _, _) = encode(p)?;
        let (o_kind, o, o_datatype, o_lang) = encode(o)?;
        let (g_kind, g) = match g {
            Some(g) => {
                let (k, v, _, _) = encode(g)?;
                (k, v)
            }
            None => (NONE, String::new()),
        };
        let changed = self.conn.execute(
            "INSERT OR IGNORE INTO quad VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![s_kind, s, p, o_kind, o, o_datatype, o_lang, g_kind, g],
        )?;
        Ok(changed > 0)
    }

    /// Allocate a fresh import scope, distinct from all those allocated before on this file.
    ///
    /// Must be called inside a write transaction; the allocation is undone by [`abort`](DiskDataset::abort).
    pub fn next_import_scope(&self) -> Result<u64, DiskError> {
        if self.tx.get() == Some(TxMode::Read) {
            return Err(DiskError::ReadOnly);
        }
        self.conn.execute(
            "INSERT INTO counter VALUES ('import', 1) \
             ON CONFLICT (name) DO UPDATE SET value = value + 1",
            [],
        )?;
        let n: i64 = self.conn.query_row(
            "SELECT value FROM counter WHERE name = 'import'",
            [],
            |row| row.get(0),
        )?;
        u64::try_from(n).map_err(|_| DiskError::Corrupted(format!("negative import scope {n}")))
    }

    /// Whether the given triple is present in any graph of this dataset.
    pub fn contains_triple<S, P, O>(&self, s: S, p: P, o: O) -> Result<bool, DiskError>
    where
        S: Term,
        P: Term,
        O: Term,
    {
        let (s_kind, s, _, _) = encode(s)?;
        let (_, p, _, _) = encode(p)?;
        let (o_kind, o, o_datatype, o_lang) = encode(o)?;
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM quad WHERE s_kind = ?1 AND s = ?2 AND p = ?3 \
                 AND o_kind = ?4 AND o = ?5 AND o_datatype = ?6 AND o_lang = ?7 LIMIT 1",
                params![s_kind, s, p, o_kind, o, o_datatype, o_lang],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn load_quads(&self) -> Result<Vec<Spog<SimpleTerm<'static>>>, DiskError> {
        let mut stmt = self.conn.prepare(
            "SELECT s_kind, s, p, o_kind, o, o_datatype, o_lang, g_kind, g FROM quad",
        )?;
        let rows = stmt.query_map([], read_row)?;
        let mut quads = Vec::new();
        for row in rows {
            let (s, p, o, g) = row?;
            let g = if g.0 == NONE { None } else { Some(decode(g)?) };
            quads.push((
                [decode(s)?, decode((IRI, p, String::new(), String::new()))?, decode(o)?],
                g,
            ));
        }
        Ok(quads)
    }
}

impl Dataset for DiskDataset {
    type Quad<'x> = Spog<SimpleTerm<'static>> where Self: 'x;
    type Error = DiskError;

    fn quads(&self) -> impl Iterator<Item = DResult<Self, Self::Quad<'_>>> + '_ {
        let (quads, err) = match self.load_quads() {
            Ok(quads) => (quads, None),
            Err(err) => (vec![], Some(err)),
        };
        err.into_iter().map(Err).chain(quads.into_iter().map(Ok))
    }
}

impl SetDataset for DiskDataset {}

fn read_row(row: &rusqlite::Row) -> rusqlite::Result<(Row4, String, Row4, Row4)> {
    let s = (row.get(0)?, row.get(1)?, String::new(), String::new());
    let p = row.get(2)?;
    let o = (row.get(3)?, row.get(4)?, row.get(5)?, row.get(6)?);
    let g = (row.get(7)?, row.get(8)?, String::new(), String::new());
    Ok((s, p, o, g))
}

fn encode<T: Term>(t: T) -> Result<Row4, DiskError> {
    match t.kind() {
        TermKind::Iri => {
            let iri = t.iri().ok_or_else(|| DiskError::UnsupportedTerm(format!("{t:?}")))?;
            Ok((IRI, iri.as_str().to_string(), String::new(), String::new()))
        }
        TermKind::BlankNode => {
            let id = t
                .bnode_id()
                .ok_or_else(|| DiskError::UnsupportedTerm(format!("{t:?}")))?;
            Ok((BNODE, id.as_str().to_string(), String::new(), String::new()))
        }
        TermKind::Literal => {
            let lex = t
                .lexical_form()
                .ok_or_else(|| DiskError::UnsupportedTerm(format!("{t:?}")))?;
            let lang = t
                .language_tag()
                .map(|tag| tag.as_str().to_string())
                .unwrap_or_default();
            let datatype = if lang.is_empty() {
                t.datatype()
                    .map(|dt| dt.as_str().to_string())
                    .unwrap_or_default()
            } else {
                String::new()
            };
            Ok((LITERAL, lex.to_string(), datatype, lang))
        }
        _ => Err(DiskError::UnsupportedTerm(format!("{t:?}"))),
    }
}

fn decode((kind, value, datatype, lang): Row4) -> Result<SimpleTerm<'static>, DiskError> {
    match kind {
        IRI => Ok(SimpleTerm::Iri(IriRef::new_unchecked(MownStr::from(value)))),
        BNODE => Ok(SimpleTerm::BlankNode(BnodeId::new_unchecked(MownStr::from(
            value,
        )))),
        LITERAL if !lang.is_empty() => {
            let tag = LanguageTag::new(lang.as_str())
                .map_err(|e| DiskError::Corrupted(e.to_string()))?;
            Ok((value.as_str() * tag).into_term())
        }
        LITERAL => Ok(SimpleTerm::LiteralDatatype(
            MownStr::from(value),
            IriRef::new_unchecked(MownStr::from(datatype)),
        )),
        other => Err(DiskError::Corrupted(format!("unknown term kind {other}"))),
    }
}
