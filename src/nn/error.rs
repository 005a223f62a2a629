//! Error types for readout stages.

use thiserror::Error;

/// Errors raised by readout stages during a forward pass.
///
/// [`ReadoutModule`](super::ReadoutModule) never wraps these: whatever a
/// stage returns is what the caller sees.
#[derive(Debug, Error)]
pub enum Error {
    /// A stage received a tensor with the wrong number of columns.
    #[error("{stage} expects {expected} input features, found {found}")]
    FeatureMismatch {
        /// Name of the stage that rejected its input.
        stage: &'static str,
        /// Required column count.
        expected: usize,
        /// Actual column count.
        found: usize,
    },

    /// A stage received a tensor with the wrong number of rows.
    #[error("{stage} expects {expected} input rows, found {found}")]
    RowMismatch {
        /// Name of the stage that rejected its input.
        stage: &'static str,
        /// Required row count.
        expected: usize,
        /// Actual row count.
        found: usize,
    },

    /// Charge equilibration received a zero hardness, which leaves the
    /// charges undefined.
    #[error("atom {row} has zero hardness")]
    ZeroHardness {
        /// Input row of the offending atom.
        row: usize,
    },

    /// An operation that averages over its input received no values.
    #[error("cannot evaluate over an empty tensor")]
    EmptyInput,

    /// An ndarray shape operation failed.
    #[error("tensor shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    /// Failure reported by a stage implemented outside this crate.
    #[error("stage failed: {0}")]
    Stage(String),
}

impl Error {
    /// Creates a [`FeatureMismatch`](Error::FeatureMismatch) error.
    pub fn feature_mismatch(stage: &'static str, expected: usize, found: usize) -> Self {
        Self::FeatureMismatch {
            stage,
            expected,
            found,
        }
    }

    /// Creates a [`RowMismatch`](Error::RowMismatch) error.
    pub fn row_mismatch(stage: &'static str, expected: usize, found: usize) -> Self {
        Self::RowMismatch {
            stage,
            expected,
            found,
        }
    }
}
