//! FILENAME: core/heatmap-engine/src/engine.rs
//! Heatmap Engine - Turns a pivot result tree into a dense, sorted matrix.
//!
//! The backend hands over a flat list of row-groups. Each leaf row carries its
//! per-column values and its own subtotal in one list; a non-leaf row with an
//! empty key carries the grand total.
//!
//! Algorithm:
//! 1. Partition rows into leaf rows and non-leaf rows, dropping malformed
//!    rows and duplicate row keys (first occurrence wins). The expected leaf
//!    depth is the most common one, so a single stray row cannot reject the rest
//! 2. Walk each leaf row's cells once, interning columns by key and splitting
//!    per-column values from the row subtotal
//!
//! Keys are the identity; labels are only for display. Distinct keys whose
//! joined labels coincide get a numbered suffix instead of being merged.
//! 3. Sort row and column labels (natural order by default)
//! 4. Lay out the dense grid; missing pairs become `NoData`
//! 5. Compute the value range over populated cells

use std::collections::BTreeMap;

use log::{debug, warn};
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use pivot_result::{CellOrigin, PivotCell, PivotKey, PivotResultRow, RowKind};

use crate::definition::{MatrixOptions, OptionsError, SortOrder};
use crate::diagnostics::{Diagnostic, MalformedReason};
use crate::natural::natural_cmp;
use crate::view::{HeatmapCell, HeatmapMatrix, ValueRange};

// ============================================================================
// INTERMEDIATE STRUCTURES
// ============================================================================

/// A leaf row that survived partitioning.
#[derive(Debug)]
struct LeafRow<'a> {
    label: String,
    row: &'a PivotResultRow,
}

/// A leaf row's cells, keyed by interned column index.
#[derive(Debug)]
struct RowValues {
    label: String,
    values: FxHashMap<usize, HeatmapCell>,
    subtotal: Option<f64>,
}

/// Hands out display labels, unique within one axis.
#[derive(Debug, Default)]
struct LabelAllocator {
    used: FxHashSet<String>,
}

impl LabelAllocator {
    /// Returns `label`, or `"label (n)"` with the smallest free `n >= 2`.
    fn assign(&mut self, label: &str) -> String {
        if self.used.insert(label.to_string()) {
            return label.to_string();
        }
        let mut n = 2usize;
        loop {
            let candidate = format!("{} ({})", label, n);
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}

/// Columns in order of first appearance, keyed by full column key.
#[derive(Debug, Default)]
struct ColumnIndex<'a> {
    labels: Vec<String>,
    positions: FxHashMap<&'a PivotKey, usize>,
    allocator: LabelAllocator,
}

impl<'a> ColumnIndex<'a> {
    fn position(&self, key: &PivotKey) -> Option<usize> {
        self.positions.get(key).copied()
    }

    /// Adds a new column. Returns its index and its (possibly renamed) label.
    fn insert(&mut self, key: &'a PivotKey, label: &str) -> (usize, &str) {
        let idx = self.labels.len();
        self.positions.insert(key, idx);
        self.labels.push(self.allocator.assign(label));
        (idx, self.labels[idx].as_str())
    }
}

// ============================================================================
// MATRIX BUILDER
// ============================================================================

/// Builds one matrix from one pivot result. Holds no state across builds.
pub struct MatrixBuilder<'a> {
    options: &'a MatrixOptions,
    rows: &'a [PivotResultRow],

    /// Leaf rows in input order, malformed rows and duplicates removed.
    leaf_rows: Vec<LeafRow<'a>>,

    grand_total: Option<f64>,

    diagnostics: Vec<Diagnostic>,
}

impl<'a> MatrixBuilder<'a> {
    /// Creates a builder. Fails on an options contract violation.
    pub fn new(rows: &'a [PivotResultRow], options: &'a MatrixOptions) -> Result<Self, OptionsError> {
        options.validate()?;
        Ok(MatrixBuilder {
            options,
            rows,
            leaf_rows: Vec::new(),
            grand_total: None,
            diagnostics: Vec::new(),
        })
    }

    /// Runs the full transform.
    pub fn build(mut self) -> HeatmapMatrix {
        if self.rows.is_empty() {
            debug!("No pivot rows yet, returning empty heatmap matrix");
            return HeatmapMatrix::empty();
        }

        // Step 1: Partition
        self.partition_rows();

        // Step 2: Single pass over each row's cells
        let multi_metric = self.distinct_metric_count() > 1;
        if multi_metric {
            self.report_ambiguous_columns();
        }
        let mut columns = ColumnIndex::default();
        let row_values: Vec<RowValues> = std::mem::take(&mut self.leaf_rows)
            .into_iter()
            .map(|leaf| self.collect_row_values(leaf, multi_metric, &mut columns))
            .collect();

        // Step 3: Ordering
        let row_order = sort_positions(
            row_values.iter().map(|r| r.label.as_str()),
            self.options.row_sort,
        );
        let column_order = sort_positions(
            columns.labels.iter().map(String::as_str),
            self.options.column_sort,
        );

        // Old column index -> position in the sorted output
        let mut column_slot = vec![0usize; column_order.len()];
        for (slot, &old) in column_order.iter().enumerate() {
            column_slot[old] = slot;
        }

        // Step 4: Dense grid
        let mut row_labels = Vec::with_capacity(row_order.len());
        let mut cells = Vec::with_capacity(row_order.len());
        let mut row_subtotals = BTreeMap::new();
        for &r in &row_order {
            let values = &row_values[r];
            let mut grid_row = vec![HeatmapCell::NoData; column_order.len()];
            for (&col, &cell) in &values.values {
                grid_row[column_slot[col]] = cell;
            }
            if let Some(subtotal) = values.subtotal {
                row_subtotals.insert(values.label.clone(), subtotal);
            }
            row_labels.push(values.label.clone());
            cells.push(grid_row);
        }
        let column_labels: Vec<String> = column_order
            .iter()
            .map(|&c| columns.labels[c].clone())
            .collect();

        // Step 5: Range
        let value_range = ValueRange::from_values(
            cells.iter().flatten().filter_map(|c: &HeatmapCell| c.value()),
        );

        debug!(
            "Built heatmap matrix: {} rows x {} columns from {} pivot rows ({} diagnostics)",
            row_labels.len(),
            column_labels.len(),
            self.rows.len(),
            self.diagnostics.len()
        );

        HeatmapMatrix {
            row_labels,
            column_labels,
            cells,
            value_range,
            row_subtotals,
            grand_total: self.grand_total,
            diagnostics: self.diagnostics,
        }
    }

    fn record(&mut self, diagnostic: Diagnostic) {
        warn!("{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }

    // ========================================================================
    // PARTITIONING
    // ========================================================================

    /// Splits leaf rows from non-leaf rows and takes the grand total.
    fn partition_rows(&mut self) {
        let rows = self.rows;
        let reference_depth = dominant_leaf_depth(rows);
        let mut seen: FxHashSet<&'a PivotKey> = FxHashSet::default();
        let mut labels = LabelAllocator::default();
        let mut grand_total_seen = false;

        for (index, row) in rows.iter().enumerate() {
            let label = self.options.join_key(row.row_key.as_slice());

            if let Some(reason) = check_row_shape(row, reference_depth) {
                self.record(Diagnostic::MalformedRow { index, label, reason });
                continue;
            }

            match row.kind {
                RowKind::Leaf => {
                    if !seen.insert(&row.row_key) {
                        self.record(Diagnostic::DuplicateRow { index, label });
                        continue;
                    }
                    let assigned = labels.assign(&label);
                    if assigned != label {
                        self.record(Diagnostic::LabelCollision {
                            label,
                            assigned: assigned.clone(),
                        });
                    }
                    self.leaf_rows.push(LeafRow { label: assigned, row });
                }
                RowKind::NonLeaf => {
                    if !row.row_key.is_empty() {
                        // Intermediate group rollup of a multi-level row pivot.
                        debug!("Skipping non-leaf row {:?} (group rollup)", label);
                        continue;
                    }
                    if grand_total_seen {
                        self.record(Diagnostic::DuplicateRow { index, label });
                        continue;
                    }
                    grand_total_seen = true;
                    self.grand_total = row
                        .cells
                        .first()
                        .and_then(|c| c.value)
                        .filter(|v| v.is_finite());
                }
            }
        }
    }

    // ========================================================================
    // CELLS
    // ========================================================================

    /// Number of distinct metrics across per-column cells of kept rows.
    fn distinct_metric_count(&self) -> usize {
        let mut metrics: SmallVec<[&str; 4]> = SmallVec::new();
        for leaf in &self.leaf_rows {
            for metric in leaf.row.column_cells().filter_map(PivotCell::metric) {
                if !metrics.contains(&metric) {
                    metrics.push(metric);
                }
            }
        }
        metrics.len()
    }

    /// Display label for a per-column cell, or `None` if it has no key at all.
    fn column_label(&self, cell: &PivotCell, multi_metric: bool) -> Option<String> {
        let metric = cell.metric()?;
        let path = cell.column_path();
        if path.is_empty() {
            return Some(metric.to_string());
        }
        let base = self.options.join_key(path);
        if multi_metric {
            Some(self.options.join_key(&[base.as_str(), metric]))
        } else {
            Some(base)
        }
    }

    /// One pass over a row's cells.
    fn collect_row_values(
        &mut self,
        leaf: LeafRow<'a>,
        multi_metric: bool,
        columns: &mut ColumnIndex<'a>,
    ) -> RowValues {
        let mut values: FxHashMap<usize, HeatmapCell> = FxHashMap::default();
        let mut subtotal: Option<Option<f64>> = None;

        let row: &'a PivotResultRow = leaf.row;
        for cell in &row.cells {
            match cell.origin {
                CellOrigin::ColumnLeaf => {
                    let (idx, column) = match columns.position(&cell.column_key) {
                        Some(idx) => (idx, columns.labels[idx].clone()),
                        None => {
                            let Some(label) = self.column_label(cell, multi_metric) else {
                                self.record(Diagnostic::MalformedCell { row: leaf.label.clone() });
                                continue;
                            };
                            let (idx, assigned) = columns.insert(&cell.column_key, &label);
                            let assigned = assigned.to_string();
                            if assigned != label {
                                self.record(Diagnostic::LabelCollision {
                                    label,
                                    assigned: assigned.clone(),
                                });
                            }
                            (idx, assigned)
                        }
                    };
                    if values.contains_key(&idx) {
                        self.record(Diagnostic::DuplicateCell { row: leaf.label.clone(), column });
                        continue;
                    }
                    if !cell.rollup_flag_matches_origin() {
                        self.record(Diagnostic::RollupFlagMismatch {
                            row: leaf.label.clone(),
                            column: column.clone(),
                        });
                    }
                    if matches!(cell.value, Some(v) if !v.is_finite()) {
                        self.record(Diagnostic::NonFiniteValue {
                            row: leaf.label.clone(),
                            column,
                        });
                    }
                    values.insert(idx, HeatmapCell::from_value(cell.value));
                }
                CellOrigin::RowLeafRollup => {
                    let column = self.options.join_key(cell.column_key.as_slice());
                    if subtotal.is_some() {
                        self.record(Diagnostic::DuplicateCell { row: leaf.label.clone(), column });
                        continue;
                    }
                    if !cell.rollup_flag_matches_origin() {
                        self.record(Diagnostic::RollupFlagMismatch { row: leaf.label.clone(), column });
                    }
                    subtotal = Some(cell.value.filter(|v| v.is_finite()));
                }
                // Leaf rows holding these are rejected during partitioning.
                CellOrigin::RowInnerRollup => {}
            }
        }

        RowValues {
            label: leaf.label,
            values,
            subtotal: subtotal.flatten(),
        }
    }

    /// Records each column path that exists under more than one metric.
    fn report_ambiguous_columns(&mut self) {
        let mut metrics_by_path: FxHashMap<&'a [String], SmallVec<[&'a str; 2]>> =
            FxHashMap::default();
        let mut order: Vec<&'a [String]> = Vec::new();

        let kept: Vec<&'a PivotResultRow> = self.leaf_rows.iter().map(|leaf| leaf.row).collect();
        for row in kept {
            for cell in row.column_cells() {
                let path = cell.column_path();
                let Some(metric) = cell.metric() else { continue };
                if path.is_empty() {
                    continue;
                }
                let metrics = metrics_by_path.entry(path).or_insert_with(|| {
                    order.push(path);
                    SmallVec::new()
                });
                if !metrics.contains(&metric) {
                    metrics.push(metric);
                }
            }
        }

        let mut ambiguous: Vec<(String, Vec<String>)> = order
            .into_iter()
            .filter_map(|path| {
                let metrics = metrics_by_path.remove(path)?;
                (metrics.len() > 1).then(|| {
                    (
                        self.options.join_key(path),
                        metrics.iter().map(|m| m.to_string()).collect(),
                    )
                })
            })
            .collect();
        ambiguous.sort_by(|a, b| natural_cmp(&a.0, &b.0));
        for (column, metrics) in ambiguous {
            self.record(Diagnostic::AmbiguousColumnKey { column, metrics });
        }
    }
}

// ============================================================================
// HELPERS
// ============================================================================

/// Checks kind/depth invariants. `None` means the row is well-formed.
fn check_row_shape(row: &PivotResultRow, reference_depth: Option<usize>) -> Option<MalformedReason> {
    match row.kind {
        RowKind::Leaf => {
            if row.cells.iter().any(|c| c.origin == CellOrigin::RowInnerRollup) {
                return Some(MalformedReason::InnerRollupInLeafRow);
            }
            match reference_depth {
                Some(expected) if expected != row.depth() => Some(MalformedReason::DepthMismatch {
                    expected,
                    actual: row.depth(),
                }),
                _ => None,
            }
        }
        RowKind::NonLeaf => {
            if row.cells.len() > 1 {
                return Some(MalformedReason::TooManyCells { count: row.cells.len() });
            }
            match row.cells.first() {
                Some(cell) if cell.origin != CellOrigin::RowInnerRollup => {
                    Some(MalformedReason::UnexpectedCellInNonLeafRow)
                }
                _ => None,
            }
        }
    }
}

/// Most common depth among leaf rows that could be well-formed, ties going to
/// the depth seen first. `None` when there are no such rows.
fn dominant_leaf_depth(rows: &[PivotResultRow]) -> Option<usize> {
    // depth -> (count, index of first row with that depth)
    let mut tally: FxHashMap<usize, (usize, usize)> = FxHashMap::default();
    for (index, row) in rows.iter().enumerate() {
        if row.kind != RowKind::Leaf || row.cells.iter().any(|c| c.origin == CellOrigin::RowInnerRollup) {
            continue;
        }
        tally.entry(row.depth()).or_insert((0, index)).0 += 1;
    }
    tally
        .into_iter()
        .max_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
            count_a.cmp(count_b).then(first_b.cmp(first_a))
        })
        .map(|(depth, _)| depth)
}

/// Returns label positions in output order. Sorts are stable.
fn sort_positions<'s, I>(labels: I, order: SortOrder) -> Vec<usize>
where
    I: Iterator<Item = &'s str>,
{
    let labels: Vec<&str> = labels.collect();
    let mut positions: Vec<usize> = (0..labels.len()).collect();
    match order {
        SortOrder::Ascending => {
            positions.sort_by(|&a, &b| natural_cmp(labels[a], labels[b]));
        }
        SortOrder::Descending => {
            positions.sort_by(|&a, &b| natural_cmp(labels[b], labels[a]));
        }
        SortOrder::DataSourceOrder => {
            // Keep order of first appearance
        }
    }
    positions
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Builds a heatmap matrix from a pivot result.
/// This is the main entry point for the engine.
///
/// Only invalid `options` produce an error. Shape problems in `rows` are
/// reported through `HeatmapMatrix::diagnostics`.
pub fn build_matrix(
    rows: &[PivotResultRow],
    options: &MatrixOptions,
) -> Result<HeatmapMatrix, OptionsError> {
    Ok(MatrixBuilder::new(rows, options)?.build())
}
