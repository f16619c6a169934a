//! FILENAME: core/pivot-result/src/lib.rs
//! PURPOSE: Data contract for pivot aggregation results.
//! CONTEXT: The search backend answers a pivot query with a flat list of
//! row-groups, each carrying its column values and roll-ups. These types
//! describe that tree. They are shared by the heatmap engine and anything
//! else that consumes the backend's pivot output.

pub mod cell;
pub mod key;
pub mod row;

pub use cell::{CellOrigin, PivotCell};
pub use key::{pivot_key, PivotKey};
pub use row::{PivotResultRow, RowKind};
