//! FILENAME: core/heatmap-engine/src/lib.rs
//! Heatmap subsystem: pivot result tree -> color-scalable matrix.
//!
//! This crate turns the backend's pivot aggregation result into a dense,
//! sorted matrix for the heatmap grid renderer. It depends on `pivot-result`
//! only for the shared result tree types.
//!
//! Layers:
//! - `definition`: Render options (HOW the matrix is laid out)
//! - `engine`: The transform (rows -> matrix)
//! - `view`: Renderable output (WHAT the renderer draws)
//! - `diagnostics`: Non-fatal anomalies found while building
//! - `natural`: Natural label ordering
//! - `memo`: Fingerprinting and memoized builds

pub mod definition;
pub mod diagnostics;
pub mod engine;
pub mod memo;
pub mod natural;
pub mod view;

pub use definition::*;
pub use diagnostics::{Diagnostic, MalformedReason};
pub use engine::{build_matrix, MatrixBuilder};
pub use memo::{fingerprint, MemoizedMatrixBuilder};
pub use natural::natural_cmp;
pub use view::*;
