//! Strictly validated training configuration and composable readout heads for
//! graph neural networks that predict molecular properties.
//!
//! A graph convolution produces one feature vector per atom. This crate covers
//! what happens after that: which datasets and targets a model is trained
//! against, and how per-atom features are turned into predictions.
//!
//! # Features
//!
//! - **Strict configuration** – [`DataConfig`] and [`ModelConfig`] reject
//!   unknown keys at every level and report every violation at once, each
//!   with a field path such as `training.targets[0].metric`
//! - **Multiple formats** – JSON, TOML and YAML documents validated by the same
//!   code path
//! - **Readout heads** – [`ReadoutModule`] chains a pooling stage, dense
//!   layers and an optional postprocessing stage such as partial-charge
//!   equilibration
//! - **Batching** – [`MoleculeBatch`] merges molecules into one disconnected
//!   graph while keeping per-molecule boundaries and total charges
//!
//! # Quick Start
//!
//! ```
//! use mol_readout::config::Schema;
//! use mol_readout::nn::ReadoutModel;
//! use mol_readout::{Bond, DataConfig, MetricType, ModelConfig, Molecule};
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//! use serde_json::json;
//!
//! let data = DataConfig::from_value(&json!({
//!     "training": {
//!         "sources": ["train.parquet"],
//!         "targets": [{"column": "charges-am1bcc", "readout": "charges", "metric": "rmse"}],
//!         "batch_size": 256
//!     }
//! }))?;
//! assert_eq!(data.training.targets[0].metric, MetricType::Rmse);
//!
//! let model = ModelConfig::from_value(&json!({
//!     "readouts": {
//!         "charges": {
//!             "pooling": "atom",
//!             "forward": {"hidden_feats": [16, 2]},
//!             "postprocess": "charges"
//!         }
//!     }
//! }))?;
//! mol_readout::config::check_readouts(&data, &model)?;
//!
//! // Hydroxide with four features per atom.
//! let ion = Molecule::new(
//!     ndarray::Array2::from_elem((2, 4), 0.25),
//!     vec![Bond::new(0, 1)],
//!     vec![-1, 0],
//! )?;
//!
//! let heads = ReadoutModel::from_config(&model, 4, &mut StdRng::seed_from_u64(0));
//! let predictions = heads.forward(&ion)?;
//! assert_eq!(predictions["charges"].dim(), (2, 1));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Module Organization
//!
//! - [`config`] – Data and model schemas, validation, loading and saving
//! - [`nn`] – Pooling, dense and postprocessing stages, readout heads and metrics
//!
//! # Data Types
//!
//! ## Configuration
//!
//! - [`DataConfig`] – Training, validation and test datasets
//! - [`Dataset`] – Sources, targets and batch size of one split
//! - [`Target`] – Column, readout and metric of one objective
//! - [`MetricType`] – RMSE, MSE or MAE
//! - [`ModelConfig`] – Named readout heads
//!
//! ## Molecules
//!
//! - [`Molecule`] – Atom features, bonds and formal charges of one molecule
//! - [`MoleculeBatch`] – Several molecules stacked into one graph
//! - [`Bond`] – Undirected bond between two atom rows
//! - [`MolecularGraph`] – Read-only view shared by molecules and batches
//!
//! ## Readouts
//!
//! - [`ReadoutModule`] – Pooling, dense layers and optional postprocessing
//!
//! ## Errors
//!
//! - [`ConfigError`] – Loading, parsing or saving a configuration failed
//! - [`SchemaError`] – A configuration record broke its schema
//! - [`MoleculeError`] – A molecule or batch could not be assembled
//! - [`ReadoutError`] – A readout stage rejected its input

pub mod config;
pub mod nn;

mod model;

pub use model::batch::MoleculeBatch;
pub use model::error::MoleculeError;
pub use model::graph::MolecularGraph;
pub use model::molecule::{Bond, Molecule};

pub use config::{
    DataConfig, Dataset, FieldPath, Format, MetricType, ModelConfig, SchemaError, Split, Target,
    Violation, ViolationKind,
};

pub use nn::ReadoutModule;

pub use config::Error as ConfigError;
pub use nn::Error as ReadoutError;
