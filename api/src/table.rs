//! Sparse tables materializing SPARQL bindings.
use std::collections::{BTreeMap, HashMap};

use sophia_api::term::Term;

use crate::{compact, Prefixes};

/// A sparse table of strings, with named columns.
///
/// Rows and columns are numbered from 1.
/// Columns are ordered by the first row in which their variable was bound.
/// A cell that was never assigned is absent ([`None`]),
/// which is distinct from a cell containing the empty string.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResultTable {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    cells: BTreeMap<(usize, usize), String>,
    rows: usize,
}

impl ResultTable {
    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Whether this table has no row.
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Column names, in column order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// The 1-based index of the column named `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// The name of the column at 1-based index `col`.
    pub fn column_name(&self, col: usize) -> Option<&str> {
        col.checked_sub(1)
            .and_then(|i| self.columns.get(i))
            .map(String::as_str)
    }

    /// The cell at 1-based `row` and `col`, if it was assigned.
    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.cells.get(&(row, col)).map(String::as_str)
    }

    /// The cell at 1-based `row` in column `name`, if it was assigned.
    pub fn get_by_name(&self, row: usize, name: &str) -> Option<&str> {
        self.column_index(name).and_then(|col| self.get(row, col))
    }

    /// All cells of column `name`, top to bottom (one item per row).
    pub fn column(&self, name: &str) -> Vec<Option<&str>> {
        match self.column_index(name) {
            Some(col) => (1..=self.rows).map(|row| self.get(row, col)).collect(),
            None => vec![None; self.rows],
        }
    }

    /// All rows, each with one item per column.
    pub fn rows(&self) -> impl Iterator<Item = Vec<Option<&str>>> + '_ {
        (1..=self.rows).map(move |row| {
            (1..=self.columns.len())
                .map(|col| self.get(row, col))
                .collect()
        })
    }
}

/// Incrementally builds a [`ResultTable`] from binding rows.
#[derive(Debug)]
pub struct TableBuilder<'p> {
    prefixes: &'p Prefixes,
    table: ResultTable,
}

impl<'p> TableBuilder<'p> {
    /// Start an empty table whose IRIs will be compacted with `prefixes`.
    pub fn new(prefixes: &'p Prefixes) -> Self {
        TableBuilder {
            prefixes,
            table: ResultTable::default(),
        }
    }

    /// Append a row. Variables bound to `None` leave their cell unassigned.
    pub fn push_row<I, V, T>(&mut self, row: I)
    where
        I: IntoIterator<Item = (V, Option<T>)>,
        V: AsRef<str>,
        T: Term,
    {
        self.table.rows += 1;
        let row_index = self.table.rows;
        for (var, term) in row {
            let Some(term) = term else { continue };
            let col = self.column_for(var.as_ref());
            let value = compact(term, self.prefixes);
            self.table.cells.insert((row_index, col), value);
        }
    }

    fn column_for(&mut self, var: &str) -> usize {
        if let Some(col) = self.table.index.get(var) {
            return *col;
        }
        self.table.columns.push(var.to_string());
        let col = self.table.columns.len();
        self.table.index.insert(var.to_string(), col);
        col
    }

    /// Complete the table.
    pub fn finish(self) -> ResultTable {
        self.table
    }
}

/// Convert a sequence of binding rows into a [`ResultTable`],
/// compacting IRIs with `prefixes`.
pub fn convert<B, I, V, T>(bindings: B, prefixes: &Prefixes) -> ResultTable
where
    B: IntoIterator<Item = I>,
    I: IntoIterator<Item = (V, Option<T>)>,
    V: AsRef<str>,
    T: Term,
{
    let mut builder = TableBuilder::new(prefixes);
    for row in bindings {
        builder.push_row(row);
    }
    builder.finish()
}
