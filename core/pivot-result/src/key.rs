//! FILENAME: core/pivot-result/src/key.rs
//! PURPOSE: Hierarchical keys used to address rows and columns of a pivot result.
//! CONTEXT: A key is the ordered list of dimension values from the outermost
//! grouping to the innermost. Column keys additionally end with the metric
//! name (e.g. "count()"). Hierarchies are shallow, so keys live inline.

use smallvec::SmallVec;

/// An ordered path of dimension values.
pub type PivotKey = SmallVec<[String; 4]>;

/// Builds a key from string slices.
/// `pivot_key(&["03", "GET"])` -> `["03", "GET"]`
pub fn pivot_key(parts: &[&str]) -> PivotKey {
    parts.iter().map(|p| p.to_string()).collect()
}
