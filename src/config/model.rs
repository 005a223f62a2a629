//! Readout head definitions.
//!
//! A [`ModelConfig`] names every readout a model exposes; [`Target`]s in a
//! [`DataConfig`] refer to these names. Each [`ReadoutConfig`] describes
//! how a readout is assembled: which pooling stage feeds it, the widths and
//! activations of its dense layers, and an optional postprocessing stage.
//!
//! [`Target`]: super::Target
//! [`DataConfig`]: super::DataConfig

use std::collections::BTreeMap;
use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Schema;
use super::error::{FieldPath, SchemaError, ViolationKind};
use super::validate::Validator;

/// How node features are pooled before the dense layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoolingType {
    /// One row per atom.
    Atom,
    /// One row per bond, symmetric in the bond's two atoms.
    Bond,
}

impl PoolingType {
    pub const CHOICES: &'static [&'static str] = &["atom", "bond"];
}

impl FromStr for PoolingType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "atom" => Ok(PoolingType::Atom),
            "bond" => Ok(PoolingType::Bond),
            _ => Err(format!("unknown pooling type '{s}'")),
        }
    }
}

impl fmt::Display for PoolingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolingType::Atom => write!(f, "atom"),
            PoolingType::Bond => write!(f, "bond"),
        }
    }
}

/// Optional final transformation of a readout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostprocessType {
    /// Partial charges from per-atom electronegativity and hardness.
    Charges,
}

impl PostprocessType {
    pub const CHOICES: &'static [&'static str] = &["charges"];

    /// Number of columns the postprocess stage expects as input.
    pub fn input_width(&self) -> usize {
        match self {
            PostprocessType::Charges => 2,
        }
    }

    /// Pooling whose rows the postprocess stage interprets.
    pub fn pooling(&self) -> PoolingType {
        match self {
            PostprocessType::Charges => PoolingType::Atom,
        }
    }
}

impl FromStr for PostprocessType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "charges" => Ok(PostprocessType::Charges),
            _ => Err(format!("unknown postprocess type '{s}'")),
        }
    }
}

impl fmt::Display for PostprocessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostprocessType::Charges => write!(f, "charges"),
        }
    }
}

/// Element-wise activation applied after a dense layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Activation {
    #[default]
    #[serde(rename = "relu")]
    ReLU,
    #[serde(rename = "leaky_relu")]
    LeakyReLU,
    #[serde(rename = "sigmoid")]
    Sigmoid,
    #[serde(rename = "tanh")]
    Tanh,
    #[serde(rename = "identity")]
    Identity,
}

impl Activation {
    pub const CHOICES: &'static [&'static str] =
        &["relu", "leaky_relu", "sigmoid", "tanh", "identity"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Activation::ReLU => "relu",
            Activation::LeakyReLU => "leaky_relu",
            Activation::Sigmoid => "sigmoid",
            Activation::Tanh => "tanh",
            Activation::Identity => "identity",
        }
    }
}

impl FromStr for Activation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "relu" => Ok(Activation::ReLU),
            "leaky_relu" => Ok(Activation::LeakyReLU),
            "sigmoid" => Ok(Activation::Sigmoid),
            "tanh" => Ok(Activation::Tanh),
            "identity" => Ok(Activation::Identity),
            _ => Err(format!("unknown activation '{s}'")),
        }
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dense layers of a readout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForwardConfig {
    /// Output width of each dense layer, in order. The last entry is the
    /// width of the readout.
    pub hidden_feats: Vec<NonZeroUsize>,
    /// Activation after each dense layer; same length as `hidden_feats`.
    pub activation: Vec<Activation>,
}

impl ForwardConfig {
    const FIELDS: &'static [&'static str] = &["hidden_feats", "activation"];

    /// Builds a config with `relu` on every layer except the last, which is
    /// left linear.
    pub fn with_default_activations(hidden_feats: Vec<NonZeroUsize>) -> Self {
        let n = hidden_feats.len();
        let activation = (0..n)
            .map(|i| {
                if i + 1 == n {
                    Activation::Identity
                } else {
                    Activation::ReLU
                }
            })
            .collect();
        Self {
            hidden_feats,
            activation,
        }
    }

    /// Width of the final layer.
    pub fn out_feats(&self) -> usize {
        self.hidden_feats.last().map_or(0, |n| n.get())
    }

    fn validate(v: &mut Validator, value: &Value, path: &FieldPath) -> Option<Self> {
        let map = v.object(value, path, Self::FIELDS)?;

        let hidden_path = path.key("hidden_feats");
        let hidden_feats = v.required(map, "hidden_feats", path).and_then(|h| {
            let items = v.list(h, &hidden_path)?;
            if items.is_empty() {
                v.report(&hidden_path, ViolationKind::Empty);
                return None;
            }
            let feats: Vec<_> = items
                .iter()
                .enumerate()
                .map(|(i, item)| v.positive_int(item, &hidden_path.index(i)))
                .collect();
            feats.into_iter().collect::<Option<Vec<_>>>()
        });

        let activation_path = path.key("activation");
        let activation = match v.optional(map, "activation") {
            Some(a) => v.list(a, &activation_path).and_then(|items| {
                let parsed: Vec<_> = items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| {
                        v.choice::<Activation>(item, &activation_path.index(i), Activation::CHOICES)
                    })
                    .collect();
                parsed.into_iter().collect::<Option<Vec<_>>>()
            }),
            None => None,
        };

        let hidden_feats = hidden_feats?;
        match activation {
            Some(activation) if activation.len() != hidden_feats.len() => {
                v.report(
                    &activation_path,
                    ViolationKind::LengthMismatch {
                        other: "hidden_feats",
                        expected: hidden_feats.len(),
                        found: activation.len(),
                    },
                );
                None
            }
            Some(activation) => Some(Self {
                hidden_feats,
                activation,
            }),
            None if v.optional(map, "activation").is_some() => None,
            None => Some(Self::with_default_activations(hidden_feats)),
        }
    }
}

/// How a single readout head is assembled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadoutConfig {
    /// Pooling stage feeding the dense layers.
    pub pooling: PoolingType,
    /// Optional postprocessing stage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postprocess: Option<PostprocessType>,
    /// Dense layers.
    pub forward: ForwardConfig,
}

impl ReadoutConfig {
    const FIELDS: &'static [&'static str] = &["pooling", "forward", "postprocess"];

    fn validate(v: &mut Validator, value: &Value, path: &FieldPath) -> Option<Self> {
        let map = v.object(value, path, Self::FIELDS)?;

        let pooling = v
            .required(map, "pooling", path)
            .and_then(|p| v.choice(p, &path.key("pooling"), PoolingType::CHOICES));
        let forward = v
            .required(map, "forward", path)
            .and_then(|f| ForwardConfig::validate(v, f, &path.key("forward")));
        let postprocess = match v.optional(map, "postprocess") {
            Some(p) => Some(v.choice::<PostprocessType>(
                p,
                &path.key("postprocess"),
                PostprocessType::CHOICES,
            )?),
            None => None,
        };

        let mut consistent = true;
        if let (Some(post), Some(pooling)) = (postprocess, pooling) {
            if post.pooling() != pooling {
                v.report(
                    &path.key("postprocess"),
                    ViolationKind::Constraint(format!(
                        "'{}' postprocessing requires '{}' pooling, found '{}'",
                        post,
                        post.pooling(),
                        pooling
                    )),
                );
                consistent = false;
            }
        }

        let forward = forward?;
        if let Some(post) = postprocess {
            if forward.out_feats() != post.input_width() {
                v.report(
                    &path.key("forward").key("hidden_feats"),
                    ViolationKind::Constraint(format!(
                        "'{}' postprocessing requires a final layer width of {}, found {}",
                        post,
                        post.input_width(),
                        forward.out_feats()
                    )),
                );
                consistent = false;
            }
        }

        if !consistent {
            return None;
        }

        Some(Self {
            pooling: pooling?,
            postprocess,
            forward,
        })
    }
}

/// The readout heads exposed by a model, keyed by name.
///
/// # Examples
///
/// ```
/// use mol_readout::config::{ModelConfig, PoolingType, Schema};
/// use serde_json::json;
///
/// let config = ModelConfig::from_value(&json!({
///     "readouts": {
///         "am1bcc-charges": {
///             "pooling": "atom",
///             "forward": {"hidden_feats": [16, 2]},
///             "postprocess": "charges"
///         }
///     }
/// }))?;
///
/// let head = &config.readouts["am1bcc-charges"];
/// assert_eq!(head.pooling, PoolingType::Atom);
/// assert_eq!(head.forward.out_feats(), 2);
/// # Ok::<(), mol_readout::config::SchemaError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct ModelConfig {
    pub readouts: BTreeMap<String, ReadoutConfig>,
}

impl ModelConfig {
    const FIELDS: &'static [&'static str] = &["readouts"];
}

impl Schema for ModelConfig {
    fn from_value(value: &Value) -> Result<Self, SchemaError> {
        let mut v = Validator::new();
        let root = FieldPath::root();

        let config = v.object(value, &root, Self::FIELDS).and_then(|map| {
            let path = root.key("readouts");
            let entries = v.required(map, "readouts", &root)?;
            let entries = v.map(entries, &path)?;
            if entries.is_empty() {
                v.report(&path, ViolationKind::Empty);
                return None;
            }

            let readouts: Vec<_> = entries
                .iter()
                .map(|(name, readout)| {
                    ReadoutConfig::validate(&mut v, readout, &path.key(name.as_str()))
                        .map(|r| (name.clone(), r))
                })
                .collect();

            Some(Self {
                readouts: readouts.into_iter().collect::<Option<_>>()?,
            })
        });

        let result = v.finish(config);
        if let Ok(config) = &result {
            log::debug!("validated model config with {} readout(s)", config.readouts.len());
        }
        result
    }
}

impl TryFrom<Value> for ModelConfig {
    type Error = SchemaError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Format;
    use serde_json::json;

    fn charges_head() -> Value {
        json!({
            "pooling": "atom",
            "forward": {
                "hidden_feats": [32, 32, 2],
                "activation": ["relu", "tanh", "identity"]
            },
            "postprocess": "charges"
        })
    }

    fn nz(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn parses_multiple_readouts() {
        let raw = json!({
            "readouts": {
                "charges": charges_head(),
                "wbo": {"pooling": "bond", "forward": {"hidden_feats": [8, 1]}}
            }
        });

        let config = ModelConfig::from_value(&raw).unwrap();
        assert_eq!(config.readouts.len(), 2);

        let charges = &config.readouts["charges"];
        assert_eq!(charges.postprocess, Some(PostprocessType::Charges));
        assert_eq!(charges.forward.hidden_feats, vec![nz(32), nz(32), nz(2)]);
        assert_eq!(
            charges.forward.activation,
            vec![Activation::ReLU, Activation::Tanh, Activation::Identity]
        );

        let wbo = &config.readouts["wbo"];
        assert_eq!(wbo.pooling, PoolingType::Bond);
        assert!(wbo.postprocess.is_none());
    }

    #[test]
    fn default_activations_leave_last_layer_linear() {
        let forward = ForwardConfig::with_default_activations(vec![nz(4), nz(4), nz(1)]);
        assert_eq!(
            forward.activation,
            vec![Activation::ReLU, Activation::ReLU, Activation::Identity]
        );
        assert_eq!(forward.out_feats(), 1);
    }

    #[test]
    fn rejects_empty_readouts_and_hidden_feats() {
        let err = ModelConfig::from_value(&json!({"readouts": {}})).unwrap_err();
        assert!(err.has_violation_at("readouts"));

        let err = ModelConfig::from_value(&json!({
            "readouts": {"a": {"pooling": "atom", "forward": {"hidden_feats": []}}}
        }))
        .unwrap_err();
        assert!(err.has_violation_at("readouts.a.forward.hidden_feats"));
    }

    #[test]
    fn rejects_activation_length_mismatch() {
        let err = ModelConfig::from_value(&json!({
            "readouts": {"a": {
                "pooling": "atom",
                "forward": {"hidden_feats": [4, 1], "activation": ["relu"]}
            }}
        }))
        .unwrap_err();

        assert!(err.has_violation_at("readouts.a.forward.activation"));
        assert!(matches!(
            err.violations()[0].kind,
            ViolationKind::LengthMismatch { expected: 2, found: 1, .. }
        ));
    }

    #[test]
    fn charges_postprocess_requires_two_outputs() {
        let mut head = charges_head();
        head["forward"] = json!({"hidden_feats": [16, 3]});

        let err = ModelConfig::from_value(&json!({"readouts": {"q": head}})).unwrap_err();
        assert!(err.has_violation_at("readouts.q.forward.hidden_feats"));
    }

    #[test]
    fn charges_postprocess_requires_atom_pooling() {
        let mut head = charges_head();
        head["pooling"] = json!("bond");
        head["forward"] = json!({"hidden_feats": [2]});

        let err = ModelConfig::from_value(&json!({"readouts": {"q": head}})).unwrap_err();
        assert_eq!(err.violations().len(), 1);
        assert!(err.has_violation_at("readouts.q.postprocess"));
        assert!(matches!(err.violations()[0].kind, ViolationKind::Constraint(_)));
    }

    #[test]
    fn bond_pooling_with_wrong_width_reports_both_problems() {
        let mut head = charges_head();
        head["pooling"] = json!("bond");
        head["forward"] = json!({"hidden_feats": [3]});

        let err = ModelConfig::from_value(&json!({"readouts": {"q": head}})).unwrap_err();
        assert!(err.has_violation_at("readouts.q.postprocess"));
        assert!(err.has_violation_at("readouts.q.forward.hidden_feats"));
    }

    #[test]
    fn rejects_unknown_choices_and_keys() {
        let err = ModelConfig::from_value(&json!({
            "readouts": {"a": {
                "pooling": "angle",
                "forward": {"hidden_feats": [0], "activation": ["gelu"], "dropout": 0.1},
                "postprocess": "dipole"
            }},
            "optimizer": "adam"
        }))
        .unwrap_err();

        for path in [
            "optimizer",
            "readouts.a.pooling",
            "readouts.a.forward.dropout",
            "readouts.a.forward.hidden_feats[0]",
            "readouts.a.forward.activation[0]",
            "readouts.a.postprocess",
        ] {
            assert!(err.has_violation_at(path), "missing violation at {path}: {err}");
        }
    }

    #[test]
    fn serialized_config_parses_back_identically() {
        let config = ModelConfig::from_value(&json!({
            "readouts": {
                "charges": charges_head(),
                "wbo": {"pooling": "bond", "forward": {"hidden_feats": [8, 1]}}
            }
        }))
        .unwrap();

        for format in [Format::Json, Format::Toml, Format::Yaml] {
            let text = config.to_string_as(format).unwrap();
            assert_eq!(ModelConfig::from_str_as(&text, format).unwrap(), config);
        }
    }

    #[test]
    fn activation_names_round_trip() {
        for choice in Activation::CHOICES {
            let act: Activation = choice.parse().unwrap();
            assert_eq!(act.to_string(), *choice);
            assert_eq!(serde_json::to_value(act).unwrap(), json!(choice));
        }
    }
}
