//! FILENAME: core/heatmap-engine/src/definition.rs
//! Heatmap Definition - The render options for a matrix build.
//!
//! These structures describe HOW a pivot result should be laid out:
//! - Serializable (stored with the widget configuration)
//! - Every field defaulted, so `{}` is a valid configuration
//! - Validated once, before any row is read

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

/// Misconfigured render options. These are caller bugs, not data problems,
/// so they abort the build instead of degrading it.
#[derive(Error, Debug)]
pub enum OptionsError {
    #[error("Invalid sort mode: {0:?} (expected \"asc\", \"desc\" or \"source\")")]
    InvalidSortMode(String),

    #[error("Key separator must not be empty")]
    EmptySeparator,

    #[error("Invalid options JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

// ============================================================================
// SORTING
// ============================================================================

/// Sort order for row or column labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SortOrder {
    /// Natural order: numeric runs compare by value.
    Ascending,
    /// Reversed natural order.
    Descending,
    /// Order of first appearance in the result.
    DataSourceOrder,
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder::Ascending
    }
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Ascending => "asc",
            SortOrder::Descending => "desc",
            SortOrder::DataSourceOrder => "source",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = OptionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Ascending),
            "desc" | "descending" => Ok(SortOrder::Descending),
            "source" | "datasourceorder" => Ok(SortOrder::DataSourceOrder),
            _ => Err(OptionsError::InvalidSortMode(s.to_string())),
        }
    }
}

impl TryFrom<String> for SortOrder {
    type Error = OptionsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SortOrder> for String {
    fn from(order: SortOrder) -> Self {
        order.as_str().to_string()
    }
}

// ============================================================================
// OPTIONS
// ============================================================================

fn default_key_separator() -> String {
    " - ".to_string()
}

/// Render options for a heatmap matrix build.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawMatrixOptions")]
pub struct MatrixOptions {
    /// Ordering of row labels.
    pub row_sort: SortOrder,

    /// Ordering of column labels.
    pub column_sort: SortOrder,

    /// Joins multi-level keys into one label, and a column label with its
    /// metric when several metrics are active.
    pub key_separator: String,
}

/// Options as they appear in stored configuration, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
struct RawMatrixOptions {
    #[serde(default)]
    row_sort: Option<String>,
    #[serde(default)]
    column_sort: Option<String>,
    #[serde(default)]
    key_separator: Option<String>,
}

impl TryFrom<RawMatrixOptions> for MatrixOptions {
    type Error = OptionsError;

    fn try_from(raw: RawMatrixOptions) -> Result<Self, Self::Error> {
        let row_sort = match raw.row_sort {
            Some(s) => s.parse()?,
            None => SortOrder::default(),
        };
        let column_sort = match raw.column_sort {
            Some(s) => s.parse()?,
            None => SortOrder::default(),
        };
        let options = MatrixOptions {
            row_sort,
            column_sort,
            key_separator: raw.key_separator.unwrap_or_else(default_key_separator),
        };
        options.validate()?;
        Ok(options)
    }
}

impl Default for MatrixOptions {
    fn default() -> Self {
        MatrixOptions {
            row_sort: SortOrder::Ascending,
            column_sort: SortOrder::Ascending,
            key_separator: default_key_separator(),
        }
    }
}

impl MatrixOptions {
    /// Parses and validates options from JSON.
    /// Syntax errors map to `Parse`; contract violations keep their own variant.
    pub fn from_json(json: &str) -> Result<Self, OptionsError> {
        let raw: RawMatrixOptions = serde_json::from_str(json)?;
        MatrixOptions::try_from(raw)
    }

    /// Checks the options contract.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.key_separator.is_empty() {
            return Err(OptionsError::EmptySeparator);
        }
        Ok(())
    }

    /// Joins key parts with the configured separator.
    pub fn join_key<S: AsRef<str>>(&self, parts: &[S]) -> String {
        let mut label = String::new();
        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                label.push_str(&self.key_separator);
            }
            label.push_str(part.as_ref());
        }
        label
    }
}
