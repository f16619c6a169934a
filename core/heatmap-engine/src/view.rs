//! FILENAME: core/heatmap-engine/src/view.rs
//! Heatmap View - Renderable output for the grid renderer.
//!
//! The matrix is dense: every (row, column) pair has a cell, and a pair the
//! backend did not report is `NoData`, never zero. Subtotals and the grand
//! total stay outside the grid so they cannot skew the color scale.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use crate::diagnostics::Diagnostic;

// ============================================================================
// CELLS
// ============================================================================

/// One grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum HeatmapCell {
    /// No value for this combination.
    NoData,
    /// A finite aggregated value.
    Value(f64),
}

impl Default for HeatmapCell {
    fn default() -> Self {
        HeatmapCell::NoData
    }
}

impl HeatmapCell {
    /// Absent and non-finite values both become `NoData`.
    pub fn from_value(value: Option<f64>) -> Self {
        match value {
            Some(v) if v.is_finite() => HeatmapCell::Value(v),
            _ => HeatmapCell::NoData,
        }
    }

    pub fn value(self) -> Option<f64> {
        match self {
            HeatmapCell::Value(v) => Some(v),
            HeatmapCell::NoData => None,
        }
    }

    pub fn is_no_data(self) -> bool {
        matches!(self, HeatmapCell::NoData)
    }
}

// ============================================================================
// VALUE RANGE
// ============================================================================

/// Min/max over populated cells. Drives color-scale normalization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl Default for ValueRange {
    fn default() -> Self {
        ValueRange { min: 0.0, max: 0.0 }
    }
}

impl ValueRange {
    /// Range over the finite values; `{0, 0}` when there are none.
    pub fn from_values<I: IntoIterator<Item = f64>>(values: I) -> Self {
        let mut range: Option<ValueRange> = None;
        for v in values.into_iter().filter(|v| v.is_finite()) {
            range = Some(match range {
                None => ValueRange { min: v, max: v },
                Some(r) => ValueRange { min: r.min.min(v), max: r.max.max(v) },
            });
        }
        range.unwrap_or_default()
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Maps `value` into `[0, 1]`. A degenerate range maps everything to 0.
    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.span();
        if span <= 0.0 || !value.is_finite() {
            return 0.0;
        }
        ((value - self.min) / span).clamp(0.0, 1.0)
    }
}

// ============================================================================
// MATRIX
// ============================================================================

/// The normalized heatmap matrix.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeatmapMatrix {
    /// Sorted, de-duplicated labels of leaf rows.
    pub row_labels: Vec<String>,

    /// Sorted, de-duplicated labels of leaf columns.
    pub column_labels: Vec<String>,

    /// `cells[row][column]`, aligned with the label vectors.
    pub cells: Vec<Vec<HeatmapCell>>,

    pub value_range: ValueRange,

    /// Each leaf row's own subtotal, keyed by row label.
    pub row_subtotals: BTreeMap<String, f64>,

    /// Rollup of the whole result, if the backend sent one.
    pub grand_total: Option<f64>,

    /// Anomalies handled while building.
    pub diagnostics: Vec<Diagnostic>,
}

impl HeatmapMatrix {
    /// The matrix for "no data yet".
    pub fn empty() -> Self {
        HeatmapMatrix::default()
    }

    /// True when there is nothing to lay out.
    pub fn is_empty(&self) -> bool {
        self.row_labels.is_empty() || self.column_labels.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.row_labels.len()
    }

    pub fn column_count(&self) -> usize {
        self.column_labels.len()
    }

    /// Cell by position; out of bounds reads as `NoData`.
    pub fn get(&self, row: usize, column: usize) -> HeatmapCell {
        self.cells
            .get(row)
            .and_then(|r| r.get(column))
            .copied()
            .unwrap_or_default()
    }

    /// Cell by labels. `None` when either label is unknown.
    pub fn cell(&self, row_label: &str, column_label: &str) -> Option<HeatmapCell> {
        let row = self.row_labels.iter().position(|l| l == row_label)?;
        let column = self.column_labels.iter().position(|l| l == column_label)?;
        Some(self.get(row, column))
    }

    pub fn row_subtotal(&self, row_label: &str) -> Option<f64> {
        self.row_subtotals.get(row_label).copied()
    }

    /// Number of cells holding a value.
    pub fn populated_count(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|c| !c.is_no_data())
            .count()
    }
}
