//! FILENAME: core/pivot-result/src/row.rs
//! PURPOSE: A row-group of a pivot result.
//! CONTEXT: Leaf rows hold one fully-specified combination of row dimension
//! values. Non-leaf rows aggregate several of them; the one with an empty key
//! is the grand total of the whole result.

use serde::{Deserialize, Serialize};
use crate::cell::{CellOrigin, PivotCell};
use crate::key::PivotKey;

/// Whether a row is a fully-specified combination or an aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RowKind {
    #[serde(rename = "leaf")]
    Leaf,
    #[serde(rename = "non-leaf")]
    NonLeaf,
}

/// One row-group of a pivot result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotResultRow {
    /// Row dimension values from outer to inner. Empty for the grand total.
    #[serde(rename = "key")]
    pub row_key: PivotKey,

    /// Column values and rollups, in backend order.
    #[serde(rename = "values", default)]
    pub cells: Vec<PivotCell>,

    #[serde(rename = "source")]
    pub kind: RowKind,
}

impl PivotResultRow {
    pub fn new(row_key: PivotKey, cells: Vec<PivotCell>, kind: RowKind) -> Self {
        PivotResultRow { row_key, cells, kind }
    }

    pub fn leaf(row_key: PivotKey, cells: Vec<PivotCell>) -> Self {
        PivotResultRow::new(row_key, cells, RowKind::Leaf)
    }

    pub fn non_leaf(row_key: PivotKey, cells: Vec<PivotCell>) -> Self {
        PivotResultRow::new(row_key, cells, RowKind::NonLeaf)
    }

    /// The grand-total row: empty key, single `row-inner` cell.
    pub fn grand_total(metric: &str, value: f64) -> Self {
        PivotResultRow::non_leaf(PivotKey::new(), vec![PivotCell::grand_total(metric, value)])
    }

    pub fn is_leaf(&self) -> bool {
        self.kind == RowKind::Leaf
    }

    /// Number of row dimensions in the key.
    pub fn depth(&self) -> usize {
        self.row_key.len()
    }

    /// The row's own subtotal cell, if present.
    pub fn rollup_cell(&self) -> Option<&PivotCell> {
        self.cells.iter().find(|c| c.origin == CellOrigin::RowLeafRollup)
    }

    /// Cells holding per-column values.
    pub fn column_cells(&self) -> impl Iterator<Item = &PivotCell> {
        self.cells.iter().filter(|c| c.origin == CellOrigin::ColumnLeaf)
    }
}
