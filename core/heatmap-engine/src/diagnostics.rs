//! FILENAME: core/heatmap-engine/src/diagnostics.rs
//! Non-fatal anomalies found while building a matrix.
//!
//! A partially rendered heatmap beats no heatmap, so shape problems in the
//! pivot result never abort a build. Each one is recorded here, returned with
//! the matrix and logged at warn level.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a row was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MalformedReason {
    /// Leaf row key depth differs from the first leaf row.
    DepthMismatch { expected: usize, actual: usize },
    /// Leaf row carrying a `row-inner` rollup.
    InnerRollupInLeafRow,
    /// Non-leaf row with more than one cell.
    TooManyCells { count: usize },
    /// Non-leaf row whose cell is not a `row-inner` rollup.
    UnexpectedCellInNonLeafRow,
}

/// A data-shape anomaly handled during a build.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Diagnostic {
    #[error("Dropped malformed row #{index} ({label:?}): {reason:?}")]
    MalformedRow {
        /// Position of the row in the input.
        index: usize,
        label: String,
        reason: MalformedReason,
    },

    #[error("Dropped duplicate row #{index} ({label:?}); first occurrence kept")]
    DuplicateRow { index: usize, label: String },

    #[error("Row {row:?} has column {column:?} more than once; first value kept")]
    DuplicateCell { row: String, column: String },

    #[error("Skipped cell without a column key in row {row:?}")]
    MalformedCell { row: String },

    #[error("Column {column:?} exists for metrics {metrics:?}; labels are metric-qualified")]
    AmbiguousColumnKey { column: String, metrics: Vec<String> },

    #[error("Non-finite value in row {row:?}, column {column:?} treated as no data")]
    NonFiniteValue { row: String, column: String },

    /// Two distinct keys joined to the same label; the later one was renamed.
    #[error("Label {label:?} already used by another key; shown as {assigned:?}")]
    LabelCollision { label: String, assigned: String },

    /// A cell's `rollup` flag contradicts its `source`; the source wins.
    #[error("Cell {column:?} in row {row:?} has a rollup flag contradicting its source")]
    RollupFlagMismatch { row: String, column: String },
}

impl Diagnostic {
    /// Whether the anomaly caused input to be discarded.
    pub fn drops_data(&self) -> bool {
        matches!(
            self,
            Diagnostic::MalformedRow { .. }
                | Diagnostic::DuplicateRow { .. }
                | Diagnostic::DuplicateCell { .. }
                | Diagnostic::MalformedCell { .. }
        )
    }
}
