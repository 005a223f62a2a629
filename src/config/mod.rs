//! Configuration schemas for training data and readout heads.
//!
//! Configuration documents are hand-authored, so every schema in this module
//! is closed: an unknown key anywhere in the tree is an error rather than
//! being silently ignored. Validation is aggregating: a broken document is
//! reported once with every [`Violation`] found, each located by a
//! [`FieldPath`] such as `training.targets[0].metric`.
//!
//! # Overview
//!
//! - [`DataConfig`] – Training, validation and test [`Dataset`]s
//! - [`Target`] – One column / readout / [`MetricType`] objective
//! - [`ModelConfig`] – Named [`ReadoutConfig`] heads
//! - [`Schema`] – Loading from values, strings and files in any [`Format`]
//! - [`check_readouts`] – Cross-check target readout names against a model

mod data;
mod error;
mod format;
mod model;
mod validate;

pub use data::{DataConfig, Dataset, MetricType, Split, Target};
pub use error::{Error, FieldPath, SchemaError, Violation, ViolationKind};
pub use format::Format;
pub use model::{
    Activation, ForwardConfig, ModelConfig, PoolingType, PostprocessType, ReadoutConfig,
};

use std::fs;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use validate::Validator;

/// A strictly validated configuration record.
///
/// Implementors only provide [`from_value`](Schema::from_value); text and
/// file loading go through a generic [`serde_json::Value`] first so that
/// every format is validated by the same code.
pub trait Schema: Serialize + Sized {
    /// Validates a generic record, reporting every violation.
    fn from_value(value: &Value) -> Result<Self, SchemaError>;

    /// Parses and validates a document in `format`.
    fn from_str_as(text: &str, format: Format) -> Result<Self, Error> {
        let value = format.parse_value(text)?;
        Ok(Self::from_value(&value)?)
    }

    /// Reads, parses and validates a file, inferring its format from the
    /// extension.
    fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let format = Format::from_path(path)?;
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        log::debug!("loading {} configuration from '{}'", format, path.display());
        Self::from_str_as(&text, format)
    }

    /// Renders the record in `format`.
    fn to_string_as(&self, format: Format) -> Result<String, Error> {
        format.render(self)
    }

    /// Writes the record to a file, inferring its format from the extension.
    fn save(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let path = path.as_ref();
        let text = self.to_string_as(Format::from_path(path)?)?;
        fs::write(path, text).map_err(|e| Error::io(path, e))
    }
}

/// Parses a data configuration record.
///
/// Equivalent to [`DataConfig::from_value`]: fails with a [`SchemaError`]
/// listing every missing field, unknown key, wrong type, invalid metric,
/// non-positive batch size and empty name in the record.
pub fn parse(raw: &Value) -> Result<DataConfig, SchemaError> {
    DataConfig::from_value(raw)
}

/// Checks that every target in `data` names a readout defined in `model`.
///
/// Unresolved names are reported at `<split>.targets[<i>].readout`.
///
/// ```
/// use mol_readout::config::{check_readouts, DataConfig, ModelConfig, Schema};
/// use serde_json::json;
///
/// let data = DataConfig::from_value(&json!({"training": {
///     "sources": ["a.csv"],
///     "targets": [{"column": "q", "readout": "charges", "metric": "rmse"}]
/// }}))?;
/// let model = ModelConfig::from_value(&json!({"readouts": {
///     "wbo": {"pooling": "bond", "forward": {"hidden_feats": [1]}}
/// }}))?;
///
/// let err = check_readouts(&data, &model).unwrap_err();
/// assert!(err.has_violation_at("training.targets[0].readout"));
/// # Ok::<(), mol_readout::config::SchemaError>(())
/// ```
pub fn check_readouts(data: &DataConfig, model: &ModelConfig) -> Result<(), SchemaError> {
    let mut v = Validator::new();

    for (split, dataset) in data.datasets() {
        let path = FieldPath::root().key(split.key()).key("targets");
        for (i, target) in dataset.targets.iter().enumerate() {
            if !model.readouts.contains_key(&target.readout) {
                v.report(
                    &path.index(i).key("readout"),
                    ViolationKind::UnknownReference {
                        kind: "readout",
                        name: target.readout.clone(),
                    },
                );
            }
        }
    }

    v.finish(Some(()))
}
