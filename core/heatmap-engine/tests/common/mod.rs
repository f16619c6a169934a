//! FILENAME: tests/common/mod.rs
//! Fixtures for heatmap engine integration tests.

#![allow(dead_code)]

use pivot_result::{pivot_key, PivotCell, PivotResultRow};

/// Backend response for "count() by hour, split by HTTP status".
pub const STATUS_CODES_BY_HOUR_JSON: &str = include_str!("../fixtures/status_codes_by_hour.json");

/// Status code fixture: five hours, four status codes each.
pub struct StatusFixture;

impl StatusFixture {
    pub const METRIC: &'static str = "count()";
    pub const GRAND_TOTAL: f64 = 100000.0;
    pub const ROW_SUBTOTAL: f64 = 4140.0;

    /// (hour, [(status, count)])
    pub fn data() -> Vec<(&'static str, Vec<(&'static str, f64)>)> {
        vec![
            ("00", vec![("100", 217.0), ("304", 213.0), ("203", 206.0), ("204", 195.0)]),
            ("01", vec![("405", 230.0), ("201", 217.0), ("500", 215.0), ("406", 205.0)]),
            ("02", vec![("416", 218.0), ("203", 210.0), ("201", 203.0), ("503", 202.0)]),
            ("03", vec![("400", 244.0), ("205", 221.0), ("401", 220.0), ("200", 212.0)]),
            ("04", vec![("503", 227.0), ("203", 220.0), ("500", 220.0), ("201", 212.0)]),
        ]
    }

    /// A leaf row in the backend's shape: column cells then the row rollup.
    pub fn leaf_row(hour: &str, cells: &[(&str, f64)]) -> PivotResultRow {
        let mut values: Vec<PivotCell> = cells
            .iter()
            .map(|&(status, count)| PivotCell::column_leaf(pivot_key(&[status, Self::METRIC]), count))
            .collect();
        values.push(PivotCell::row_rollup(Self::METRIC, Self::ROW_SUBTOTAL));
        PivotResultRow::leaf(pivot_key(&[hour]), values)
    }

    /// All leaf rows plus the grand-total row.
    pub fn rows() -> Vec<PivotResultRow> {
        let mut rows: Vec<PivotResultRow> = Self::data()
            .iter()
            .map(|(hour, cells)| Self::leaf_row(hour, cells))
            .collect();
        rows.push(PivotResultRow::grand_total(Self::METRIC, Self::GRAND_TOTAL));
        rows
    }

    /// Distinct status codes in natural order.
    pub fn sorted_statuses() -> Vec<&'static str> {
        vec![
            "100", "200", "201", "203", "204", "205", "304", "400", "401", "405", "406", "416",
            "500", "503",
        ]
    }
}

/// One leaf row with a single column cell.
pub fn single_cell_row(row: &str, column: &str, value: f64) -> PivotResultRow {
    PivotResultRow::leaf(
        pivot_key(&[row]),
        vec![PivotCell::column_leaf(pivot_key(&[column, "count()"]), value)],
    )
}
