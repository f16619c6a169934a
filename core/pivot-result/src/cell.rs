//! FILENAME: core/pivot-result/src/cell.rs
//! PURPOSE: A single aggregated value inside a pivot result row.
//! CONTEXT: One row holds its per-column values and its own subtotal in the
//! same list. `CellOrigin` tells them apart, so consumers can walk a row once
//! and match on the origin instead of comparing free-form tags.

use serde::{Deserialize, Serialize};
use crate::key::PivotKey;

/// Where an aggregated value comes from in the pivot tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellOrigin {
    /// A value for one fully-specified column combination.
    #[serde(rename = "col-leaf")]
    ColumnLeaf,
    /// A leaf row's own subtotal across all of its columns.
    #[serde(rename = "row-leaf")]
    RowLeafRollup,
    /// The rollup carried by a non-leaf row (the grand total for the empty key).
    #[serde(rename = "row-inner")]
    RowInnerRollup,
}

impl CellOrigin {
    /// Whether this origin aggregates over several column combinations.
    pub fn is_rollup(self) -> bool {
        !matches!(self, CellOrigin::ColumnLeaf)
    }
}

/// One aggregated value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotCell {
    /// Column path followed by the metric name. `["400", "count()"]`
    #[serde(rename = "key")]
    pub column_key: PivotKey,

    /// The aggregated value. `None` when the backend reports no value.
    #[serde(default)]
    pub value: Option<f64>,

    /// True for subtotals spanning several column combinations. Redundant
    /// with `origin`, which is authoritative when the two disagree.
    #[serde(rename = "rollup", default)]
    pub is_rollup: bool,

    #[serde(rename = "source")]
    pub origin: CellOrigin,
}

impl PivotCell {
    pub fn new(column_key: PivotKey, value: Option<f64>, origin: CellOrigin) -> Self {
        PivotCell {
            column_key,
            value,
            is_rollup: origin.is_rollup(),
            origin,
        }
    }

    /// A per-column value.
    pub fn column_leaf(column_key: PivotKey, value: f64) -> Self {
        PivotCell::new(column_key, Some(value), CellOrigin::ColumnLeaf)
    }

    /// A leaf row's subtotal for `metric`.
    pub fn row_rollup(metric: &str, value: f64) -> Self {
        PivotCell::new(crate::pivot_key(&[metric]), Some(value), CellOrigin::RowLeafRollup)
    }

    /// The grand total for `metric`, carried by the empty-key non-leaf row.
    pub fn grand_total(metric: &str, value: f64) -> Self {
        PivotCell::new(crate::pivot_key(&[metric]), Some(value), CellOrigin::RowInnerRollup)
    }

    /// Whether `is_rollup` agrees with `origin`.
    pub fn rollup_flag_matches_origin(&self) -> bool {
        self.is_rollup == self.origin.is_rollup()
    }

    /// The metric name (last element of the column key).
    pub fn metric(&self) -> Option<&str> {
        self.column_key.last().map(String::as_str)
    }

    /// The column path without the trailing metric name.
    pub fn column_path(&self) -> &[String] {
        match self.column_key.split_last() {
            Some((_, path)) => path,
            None => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pivot_key;

    #[test]
    fn test_metric_and_column_path() {
        let cell = PivotCell::column_leaf(pivot_key(&["GET", "200", "count()"]), 12.0);
        assert_eq!(cell.metric(), Some("count()"));
        assert_eq!(cell.column_path(), &["GET".to_string(), "200".to_string()]);
    }

    #[test]
    fn test_empty_key_has_no_metric() {
        let cell = PivotCell::new(pivot_key(&[]), Some(1.0), CellOrigin::ColumnLeaf);
        assert_eq!(cell.metric(), None);
        assert!(cell.column_path().is_empty());
    }

    #[test]
    fn test_rollup_flag_follows_origin() {
        assert!(!PivotCell::column_leaf(pivot_key(&["a", "count()"]), 1.0).is_rollup);
        assert!(PivotCell::row_rollup("count()", 1.0).is_rollup);
        assert!(PivotCell::grand_total("count()", 1.0).is_rollup);
        assert!(PivotCell::row_rollup("count()", 1.0).rollup_flag_matches_origin());
    }

    #[test]
    fn test_contradicting_rollup_flag_is_detected() {
        let json = r#"{ "key": ["400", "count()"], "value": 1, "rollup": true, "source": "col-leaf" }"#;
        let cell: PivotCell = serde_json::from_str(json).unwrap();
        assert_eq!(cell.origin, CellOrigin::ColumnLeaf);
        assert!(!cell.rollup_flag_matches_origin());
    }

    #[test]
    fn test_deserialize_backend_shape() {
        let json = r#"{ "key": ["400", "count()"], "value": 244, "rollup": false, "source": "col-leaf" }"#;
        let cell: PivotCell = serde_json::from_str(json).unwrap();
        assert_eq!(cell.origin, CellOrigin::ColumnLeaf);
        assert_eq!(cell.value, Some(244.0));
        assert_eq!(cell.metric(), Some("count()"));
    }

    #[test]
    fn test_null_value_is_absent() {
        let json = r#"{ "key": ["count()"], "value": null, "rollup": true, "source": "row-leaf" }"#;
        let cell: PivotCell = serde_json::from_str(json).unwrap();
        assert_eq!(cell.value, None);
        assert_eq!(cell.origin, CellOrigin::RowLeafRollup);
    }

    #[test]
    fn test_unknown_source_tag_is_rejected() {
        let json = r#"{ "key": ["count()"], "value": 1, "rollup": true, "source": "col-inner" }"#;
        assert!(serde_json::from_str::<PivotCell>(json).is_err());
    }
}
