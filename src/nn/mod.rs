//! Readout heads and the stages they are built from.
//!
//! A [`ReadoutModule`] maps the atom features of a molecule (or batch) to a
//! prediction in three steps:
//!
//! 1. a [`PoolingLayer`] gathers atom features into the rows being
//!    predicted on (atoms for [`PoolAtomFeatures`], bonds for
//!    [`PoolBondFeatures`]);
//! 2. a [`Sequential`] stack of dense [`Layer`]s transforms those rows;
//! 3. an optional [`PostprocessLayer`] such as [`ComputePartialCharges`]
//!    turns the dense output into the final quantity.
//!
//! [`ReadoutModel`] groups named heads built from a
//! [`ModelConfig`](crate::config::ModelConfig), and [`evaluate`] scores
//! predictions with a [`MetricType`](crate::config::MetricType).

mod activation;
mod error;
mod layer;
mod metric;
mod pooling;
mod postprocess;
mod readout;

use ndarray::Array2;

/// Dense row-major tensor passed between stages.
pub type Tensor = Array2<f64>;

pub use error::Error;
pub use layer::{Layer, Linear, Sequential};
pub use metric::evaluate;
pub use pooling::{PoolAtomFeatures, PoolBondFeatures, PoolingLayer};
pub use postprocess::{ComputePartialCharges, PostprocessLayer};
pub use readout::{ReadoutModel, ReadoutModule};
