//! Train / validation / test dataset definitions.

use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Schema;
use super::error::{FieldPath, SchemaError};
use super::validate::Validator;

/// Metric used to compare a target column with a model readout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricType {
    /// Root mean squared error.
    Rmse,
    /// Mean squared error.
    Mse,
    /// Mean absolute error.
    Mae,
}

impl MetricType {
    pub const CHOICES: &'static [&'static str] = &["rmse", "mse", "mae"];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::Rmse => "rmse",
            MetricType::Mse => "mse",
            MetricType::Mae => "mae",
        }
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rmse" => Ok(MetricType::Rmse),
            "mse" => Ok(MetricType::Mse),
            "mae" => Ok(MetricType::Mae),
            _ => Err(format!("unknown metric '{s}'")),
        }
    }
}

/// A particular target to train / evaluate against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Target {
    /// The column in the source data that contains the target values.
    pub column: String,
    /// The name of the model readout that predicts the target values.
    pub readout: String,
    /// The metric used when comparing target values with the readout.
    pub metric: MetricType,
}

impl Target {
    const FIELDS: &'static [&'static str] = &["column", "readout", "metric"];

    pub fn new(column: impl Into<String>, readout: impl Into<String>, metric: MetricType) -> Self {
        Self {
            column: column.into(),
            readout: readout.into(),
            metric,
        }
    }

    fn validate(v: &mut Validator, value: &Value, path: &FieldPath) -> Option<Self> {
        let map = v.object(value, path, Self::FIELDS)?;

        let column = v
            .required(map, "column", path)
            .and_then(|c| v.string(c, &path.key("column")));
        let readout = v
            .required(map, "readout", path)
            .and_then(|r| v.string(r, &path.key("readout")));
        let metric = v
            .required(map, "metric", path)
            .and_then(|m| v.choice(m, &path.key("metric"), MetricType::CHOICES));

        Some(Self {
            column: column?,
            readout: readout?,
            metric: metric?,
        })
    }
}

/// The targets to train / evaluate against during one stage (training,
/// validation or test).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dataset {
    /// Paths to the source data, in load order.
    pub sources: Vec<String>,
    /// Batch size; `None` leaves the choice to the caller.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<NonZeroUsize>,
    /// The targets to train / evaluate against.
    pub targets: Vec<Target>,
}

impl Dataset {
    const FIELDS: &'static [&'static str] = &["sources", "targets", "batch_size"];

    fn validate(v: &mut Validator, value: &Value, path: &FieldPath) -> Option<Self> {
        let map = v.object(value, path, Self::FIELDS)?;

        let sources = v
            .required(map, "sources", path)
            .and_then(|s| v.string_list(s, &path.key("sources")));
        let targets = v
            .required(map, "targets", path)
            .and_then(|t| Self::validate_targets(v, t, &path.key("targets")));
        let batch_size = match v.optional(map, "batch_size") {
            Some(b) => Some(v.positive_int(b, &path.key("batch_size"))?),
            None => None,
        };

        Some(Self {
            sources: sources?,
            batch_size,
            targets: targets?,
        })
    }

    fn validate_targets(v: &mut Validator, value: &Value, path: &FieldPath) -> Option<Vec<Target>> {
        let items = v.list(value, path)?;
        let targets: Vec<_> = items
            .iter()
            .enumerate()
            .map(|(i, item)| Target::validate(v, item, &path.index(i)))
            .collect();
        targets.into_iter().collect()
    }
}

/// The dataset splits a model can be fit and evaluated on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Split {
    Training,
    Validation,
    Test,
}

impl Split {
    pub fn key(&self) -> &'static str {
        match self {
            Split::Training => "training",
            Split::Validation => "validation",
            Split::Test => "test",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// The training, validation and test data sets.
///
/// Built from an external record with [`DataConfig::from_value`] (or any of
/// the [`Schema`] loaders), which rejects unknown keys at every level and
/// reports all violations at once.
///
/// # Examples
///
/// ```
/// use mol_readout::config::{DataConfig, MetricType, Schema};
/// use serde_json::json;
///
/// let config = DataConfig::from_value(&json!({
///     "training": {
///         "sources": ["a.csv"],
///         "targets": [{"column": "energy", "readout": "head1", "metric": "rmse"}]
///     }
/// }))?;
///
/// assert_eq!(config.training.sources, vec!["a.csv"]);
/// assert_eq!(config.training.targets[0].metric, MetricType::Rmse);
/// assert!(config.validation.is_none());
/// assert!(config.test.is_none());
/// # Ok::<(), mol_readout::config::SchemaError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct DataConfig {
    /// The training data.
    pub training: Dataset,
    /// The validation data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<Dataset>,
    /// The test data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test: Option<Dataset>,
}

impl DataConfig {
    const FIELDS: &'static [&'static str] = &["training", "validation", "test"];

    /// Returns the dataset for `split`, if configured.
    pub fn dataset(&self, split: Split) -> Option<&Dataset> {
        match split {
            Split::Training => Some(&self.training),
            Split::Validation => self.validation.as_ref(),
            Split::Test => self.test.as_ref(),
        }
    }

    /// Iterates the configured splits in training, validation, test order.
    pub fn datasets(&self) -> impl Iterator<Item = (Split, &Dataset)> {
        [Split::Training, Split::Validation, Split::Test]
            .into_iter()
            .filter_map(|split| self.dataset(split).map(|d| (split, d)))
    }

    fn validate_optional(
        v: &mut Validator,
        map: &Map<String, Value>,
        key: &str,
        path: &FieldPath,
    ) -> Option<Option<Dataset>> {
        match v.optional(map, key) {
            Some(value) => Dataset::validate(v, value, &path.key(key)).map(Some),
            None => Some(None),
        }
    }
}

impl Schema for DataConfig {
    fn from_value(value: &Value) -> Result<Self, SchemaError> {
        let mut v = Validator::new();
        let root = FieldPath::root();

        let config = v.object(value, &root, Self::FIELDS).and_then(|map| {
            let training = v
                .required(map, "training", &root)
                .and_then(|t| Dataset::validate(&mut v, t, &root.key("training")));
            let validation = Self::validate_optional(&mut v, map, "validation", &root);
            let test = Self::validate_optional(&mut v, map, "test", &root);

            Some(Self {
                training: training?,
                validation: validation?,
                test: test?,
            })
        });

        let result = v.finish(config);
        if let Ok(config) = &result {
            log::debug!(
                "validated data config with {} dataset(s)",
                config.datasets().count()
            );
        }
        result
    }
}

impl TryFrom<Value> for DataConfig {
    type Error = SchemaError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Format, ViolationKind};
    use serde_json::json;

    fn target(column: &str) -> Value {
        json!({"column": column, "readout": "head1", "metric": "rmse"})
    }

    fn minimal() -> Value {
        json!({
            "training": {
                "sources": ["a.csv"],
                "targets": [target("energy")]
            }
        })
    }

    #[test]
    fn parses_minimal_config() {
        let config = DataConfig::from_value(&minimal()).unwrap();
        assert_eq!(config.training.sources, vec!["a.csv".to_string()]);
        assert_eq!(
            config.training.targets,
            vec![Target::new("energy", "head1", MetricType::Rmse)]
        );
        assert_eq!(config.training.batch_size, None);
        assert!(config.validation.is_none());
        assert!(config.test.is_none());
    }

    #[test]
    fn parses_full_config_preserving_order() {
        let raw = json!({
            "training": {
                "sources": ["c.csv", "a.csv", "b.csv"],
                "targets": [
                    target("charges"),
                    {"column": "wbo", "readout": "bond-head", "metric": "mae"}
                ],
                "batch_size": 256
            },
            "validation": {
                "sources": ["val.csv"],
                "targets": [{"column": "charges", "readout": "head1", "metric": "mse"}]
            },
            "test": {"sources": [], "targets": []}
        });

        let config = DataConfig::from_value(&raw).unwrap();
        assert_eq!(config.training.sources, vec!["c.csv", "a.csv", "b.csv"]);
        assert_eq!(config.training.targets[1].column, "wbo");
        assert_eq!(config.training.targets[1].metric, MetricType::Mae);
        assert_eq!(config.training.batch_size, NonZeroUsize::new(256));

        let validation = config.validation.as_ref().unwrap();
        assert_eq!(validation.targets[0].metric, MetricType::Mse);

        let test = config.test.as_ref().unwrap();
        assert!(test.sources.is_empty());
        assert!(test.targets.is_empty());

        let splits: Vec<_> = config.datasets().map(|(s, _)| s).collect();
        assert_eq!(splits, vec![Split::Training, Split::Validation, Split::Test]);
    }

    #[test]
    fn null_optional_fields_are_absent() {
        let raw = json!({
            "training": {
                "sources": ["a.csv"],
                "targets": [],
                "batch_size": null
            },
            "validation": null,
            "test": null
        });

        let config = DataConfig::from_value(&raw).unwrap();
        assert!(config.training.batch_size.is_none());
        assert!(config.validation.is_none());
        assert!(config.test.is_none());
        assert_eq!(config.datasets().count(), 1);
    }

    #[test]
    fn missing_training_fails() {
        let err =
            DataConfig::from_value(&json!({"validation": minimal()["training"]})).unwrap_err();
        assert_eq!(err.violations().len(), 1);
        assert!(err.has_violation_at("training"));
        assert_eq!(err.violations()[0].kind, ViolationKind::Missing);
    }

    #[test]
    fn unknown_key_in_target_is_rejected() {
        let mut raw = minimal();
        raw["training"]["targets"][0]["foo"] = json!(1);

        let err = DataConfig::from_value(&raw).unwrap_err();
        assert!(err.has_violation_at("training.targets[0].foo"));
        assert!(matches!(
            err.violations()[0].kind,
            ViolationKind::Unknown { .. }
        ));
    }

    #[test]
    fn unknown_keys_rejected_at_every_level() {
        for pointer in ["", "/training"] {
            let mut raw = minimal();
            raw.pointer_mut(pointer)
                .unwrap()
                .as_object_mut()
                .unwrap()
                .insert("typo".into(), json!(true));
            assert!(DataConfig::from_value(&raw).is_err(), "accepted extra key at '{pointer}'");
        }
    }

    #[test]
    fn invalid_metric_is_rejected() {
        for metric in ["r2", "RMSE", "", "rmse "] {
            let mut raw = minimal();
            raw["training"]["targets"][0]["metric"] = json!(metric);

            let err = DataConfig::from_value(&raw).unwrap_err();
            assert!(err.has_violation_at("training.targets[0].metric"));
        }

        let mut raw = minimal();
        raw["training"]["targets"][0]["metric"] = json!(3);
        assert!(DataConfig::from_value(&raw).is_err());
    }

    #[test]
    fn batch_size_must_be_positive_integer() {
        for batch_size in [json!(0), json!(-1), json!(1.5), json!("32"), json!(true)] {
            let mut raw = minimal();
            raw["training"]["batch_size"] = batch_size.clone();

            let err = DataConfig::from_value(&raw).unwrap_err();
            assert!(
                err.has_violation_at("training.batch_size"),
                "accepted batch_size {batch_size}"
            );
        }
    }

    #[test]
    fn sources_must_be_list_of_strings() {
        let mut raw = minimal();
        raw["training"]["sources"] = json!("a.csv");
        let err = DataConfig::from_value(&raw).unwrap_err();
        assert!(err.has_violation_at("training.sources"));

        let mut raw = minimal();
        raw["training"]["sources"] = json!(["a.csv", 7]);
        let err = DataConfig::from_value(&raw).unwrap_err();
        assert!(err.has_violation_at("training.sources[1]"));
    }

    #[test]
    fn empty_column_and_readout_are_rejected() {
        let mut raw = minimal();
        raw["training"]["targets"][0]["column"] = json!("");
        raw["training"]["targets"][0]["readout"] = json!("");

        let err = DataConfig::from_value(&raw).unwrap_err();
        assert!(err.has_violation_at("training.targets[0].column"));
        assert!(err.has_violation_at("training.targets[0].readout"));
    }

    #[test]
    fn aggregates_violations_across_document() {
        let raw = json!({
            "training": {
                "sources": ["a.csv"],
                "targets": [
                    {"column": "x", "metric": "bad"},
                    {"column": "y", "readout": "h", "metric": "mse", "weight": 2}
                ],
                "batch_size": 0
            },
            "test": {"targets": []},
            "extra": {}
        });

        let err = DataConfig::from_value(&raw).unwrap_err();
        for path in [
            "training.targets[0].readout",
            "training.targets[0].metric",
            "training.targets[1].weight",
            "training.batch_size",
            "test.sources",
            "extra",
        ] {
            assert!(err.has_violation_at(path), "missing violation at {path}: {err}");
        }
        assert_eq!(err.violations().len(), 6);
    }

    #[test]
    fn non_object_root_is_rejected() {
        let err = DataConfig::from_value(&json!(["training"])).unwrap_err();
        assert!(err.has_violation_at("<root>"));
    }

    #[test]
    fn deserialize_goes_through_validation() {
        let config: DataConfig = serde_json::from_value(minimal()).unwrap();
        assert_eq!(config.training.targets[0].readout, "head1");

        let mut raw = minimal();
        raw["training"]["oops"] = json!(1);
        let err = serde_json::from_value::<DataConfig>(raw).unwrap_err();
        assert!(err.to_string().contains("training.oops"));
    }

    #[test]
    fn serialized_config_parses_back_identically() {
        let raw = json!({
            "training": {
                "sources": ["a.csv", "b.csv"],
                "targets": [target("energy")],
                "batch_size": 8
            },
            "test": {"sources": ["t.csv"], "targets": [target("energy")]}
        });
        let config = DataConfig::from_value(&raw).unwrap();

        for format in [Format::Json, Format::Toml, Format::Yaml] {
            let text = config.to_string_as(format).unwrap();
            let reparsed = DataConfig::from_str_as(&text, format).unwrap();
            assert_eq!(reparsed, config, "{format} output did not parse back");
        }
    }

    #[test]
    fn metric_from_str_matches_choices() {
        for choice in MetricType::CHOICES {
            let metric: MetricType = choice.parse().unwrap();
            assert_eq!(metric.as_str(), *choice);
        }
        assert!("RMSE".parse::<MetricType>().is_err());
    }
}
