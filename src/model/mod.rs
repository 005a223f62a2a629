//! Molecular graphs consumed by readout stages.
//!
//! - [`molecule`] – A single molecule with atom features, bonds and formal charges.
//! - [`batch`] – Several molecules merged into one disconnected graph.
//! - [`graph`] – The [`MolecularGraph`](graph::MolecularGraph) view shared by both.
//!
//! Producing the atom features (featurization and graph convolution) happens
//! upstream; these types only carry them, together with the structure that
//! pooling and postprocessing stages need.

pub mod batch;
pub mod error;
pub mod graph;
pub mod molecule;
