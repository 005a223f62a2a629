//! Strict, aggregating validation of generic configuration records.
//!
//! Every schema in this crate is checked by walking a [`serde_json::Value`]
//! with a [`Validator`]. Checks never stop at the first problem: each helper
//! records its violations and returns `None` for values it could not accept,
//! so callers can keep walking siblings and report the whole document at
//! once.

use std::num::NonZeroUsize;
use std::str::FromStr;

use serde_json::{Map, Value};

use super::error::{FieldPath, SchemaError, Violation, ViolationKind};

#[derive(Debug, Default)]
pub(crate) struct Validator {
    violations: Vec<Violation>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, path: &FieldPath, kind: ViolationKind) {
        self.violations.push(Violation {
            path: path.clone(),
            kind,
        });
    }

    /// Converts the walk into a result. `value` is only returned when no
    /// violation was recorded anywhere in the document.
    pub fn finish<T>(self, value: Option<T>) -> Result<T, SchemaError> {
        match value {
            Some(value) if self.violations.is_empty() => Ok(value),
            _ => {
                let mut violations = self.violations;
                if violations.is_empty() {
                    violations.push(Violation {
                        path: FieldPath::root(),
                        kind: ViolationKind::Constraint("document could not be validated".into()),
                    });
                }
                Err(SchemaError::new(violations))
            }
        }
    }

    /// Accepts `value` if it is an object whose keys are all in `allowed`.
    ///
    /// Unknown keys are reported but the object is still returned so that
    /// declared fields get checked too.
    pub fn object<'a>(
        &mut self,
        value: &'a Value,
        path: &FieldPath,
        allowed: &'static [&'static str],
    ) -> Option<&'a Map<String, Value>> {
        let Some(map) = value.as_object() else {
            self.wrong_type(path, "an object", value);
            return None;
        };

        for key in map.keys() {
            if !allowed.contains(&key.as_str()) {
                self.report(&path.key(key.as_str()), ViolationKind::Unknown { allowed });
            }
        }

        Some(map)
    }

    /// Accepts `value` if it is an object, without restricting its keys.
    pub fn map<'a>(
        &mut self,
        value: &'a Value,
        path: &FieldPath,
    ) -> Option<&'a Map<String, Value>> {
        let map = value.as_object();
        if map.is_none() {
            self.wrong_type(path, "an object", value);
        }
        map
    }

    /// Looks up a required field, reporting it as missing if absent.
    pub fn required<'a>(
        &mut self,
        map: &'a Map<String, Value>,
        key: &str,
        path: &FieldPath,
    ) -> Option<&'a Value> {
        let value = map.get(key);
        if value.is_none() {
            self.report(&path.key(key), ViolationKind::Missing);
        }
        value
    }

    /// Looks up an optional field; an explicit `null` counts as absent.
    pub fn optional<'a>(&self, map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
        map.get(key).filter(|v| !v.is_null())
    }

    /// Accepts a non-empty string.
    pub fn string(&mut self, value: &Value, path: &FieldPath) -> Option<String> {
        match value.as_str() {
            Some("") => {
                self.report(path, ViolationKind::Empty);
                None
            }
            Some(s) => Some(s.to_string()),
            None => {
                self.wrong_type(path, "a string", value);
                None
            }
        }
    }

    /// Accepts a list, returning its elements.
    pub fn list<'a>(&mut self, value: &'a Value, path: &FieldPath) -> Option<&'a [Value]> {
        let list = value.as_array().map(Vec::as_slice);
        if list.is_none() {
            self.wrong_type(path, "a list", value);
        }
        list
    }

    /// Accepts a list of strings. Elements may be empty strings.
    pub fn string_list(&mut self, value: &Value, path: &FieldPath) -> Option<Vec<String>> {
        let items = self.list(value, path)?;
        let mut out = Vec::with_capacity(items.len());
        let mut ok = true;
        for (i, item) in items.iter().enumerate() {
            match item.as_str() {
                Some(s) => out.push(s.to_string()),
                None => {
                    self.wrong_type(&path.index(i), "a string", item);
                    ok = false;
                }
            }
        }
        ok.then_some(out)
    }

    /// Accepts a strictly positive integer.
    pub fn positive_int(&mut self, value: &Value, path: &FieldPath) -> Option<NonZeroUsize> {
        let Value::Number(n) = value else {
            self.wrong_type(path, "a positive integer", value);
            return None;
        };

        if let Some(u) = n.as_u64() {
            if let Some(nz) = usize::try_from(u).ok().and_then(NonZeroUsize::new) {
                return Some(nz);
            }
            if u != 0 {
                self.report(
                    path,
                    ViolationKind::Constraint(format!("integer {u} is too large")),
                );
                return None;
            }
        }

        if n.is_i64() || n.is_u64() {
            self.report(
                path,
                ViolationKind::NotPositive {
                    value: n.to_string(),
                },
            );
        } else {
            self.wrong_type(path, "a positive integer", value);
        }
        None
    }

    /// Accepts a string from a closed set of literals.
    pub fn choice<T: FromStr>(
        &mut self,
        value: &Value,
        path: &FieldPath,
        allowed: &'static [&'static str],
    ) -> Option<T> {
        let Some(s) = value.as_str() else {
            self.wrong_type(path, "a string", value);
            return None;
        };

        let parsed = s.parse::<T>().ok();
        if parsed.is_none() {
            self.report(
                path,
                ViolationKind::InvalidChoice {
                    value: s.to_string(),
                    allowed,
                },
            );
        }
        parsed
    }

    fn wrong_type(&mut self, path: &FieldPath, expected: &'static str, found: &Value) {
        self.report(
            path,
            ViolationKind::WrongType {
                expected,
                found: describe(found),
            },
        );
    }
}

/// Short description of a value's shape for diagnostics.
pub(crate) fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "an integer",
        Value::Number(_) => "a float",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn root() -> FieldPath {
        FieldPath::root()
    }

    #[test]
    fn object_reports_unknown_keys_but_returns_map() {
        let mut v = Validator::new();
        let value = json!({"a": 1, "b": 2});
        let map = v.object(&value, &root(), &["a"]);
        assert!(map.is_some());

        let err = v.finish(Some(())).unwrap_err();
        assert_eq!(err.violations().len(), 1);
        assert_eq!(err.violations()[0].path.to_string(), "b");
    }

    #[test]
    fn object_rejects_non_objects() {
        let mut v = Validator::new();
        assert!(v.object(&json!([1, 2]), &root(), &[]).is_none());

        let err = v.finish(Some(())).unwrap_err();
        assert_eq!(
            err.violations()[0].kind,
            ViolationKind::WrongType {
                expected: "an object",
                found: "a list"
            }
        );
    }

    #[test]
    fn optional_treats_null_as_absent() {
        let v = Validator::new();
        let value = json!({"a": null});
        let map = value.as_object().unwrap();
        assert!(v.optional(map, "a").is_none());
        assert!(v.optional(map, "b").is_none());
    }

    #[test]
    fn positive_int_accepts_positive_integers() {
        let mut v = Validator::new();
        assert_eq!(
            v.positive_int(&json!(32), &root()),
            NonZeroUsize::new(32)
        );
        assert!(v.finish(Some(())).is_ok());
    }

    #[test]
    fn positive_int_rejects_zero_negative_and_float() {
        let mut v = Validator::new();
        assert!(v.positive_int(&json!(0), &root().key("a")).is_none());
        assert!(v.positive_int(&json!(-4), &root().key("b")).is_none());
        assert!(v.positive_int(&json!(2.5), &root().key("c")).is_none());
        assert!(v.positive_int(&json!("8"), &root().key("d")).is_none());

        let err = v.finish(Some(())).unwrap_err();
        let kinds: Vec<_> = err.violations().iter().map(|v| &v.kind).collect();
        assert_eq!(
            kinds[0],
            &ViolationKind::NotPositive { value: "0".into() }
        );
        assert_eq!(
            kinds[1],
            &ViolationKind::NotPositive { value: "-4".into() }
        );
        assert!(matches!(kinds[2], ViolationKind::WrongType { found: "a float", .. }));
        assert!(matches!(kinds[3], ViolationKind::WrongType { found: "a string", .. }));
    }

    #[test]
    fn string_list_reports_each_bad_element() {
        let mut v = Validator::new();
        let out = v.string_list(&json!(["a", 1, "c", false]), &root().key("sources"));
        assert!(out.is_none());

        let err = v.finish(Some(())).unwrap_err();
        let paths: Vec<_> = err
            .violations()
            .iter()
            .map(|v| v.path.to_string())
            .collect();
        assert_eq!(paths, vec!["sources[1]", "sources[3]"]);
    }

    #[test]
    fn string_rejects_empty() {
        let mut v = Validator::new();
        assert!(v.string(&json!(""), &root()).is_none());
        let err = v.finish(Some(())).unwrap_err();
        assert_eq!(err.violations()[0].kind, ViolationKind::Empty);
    }

    #[test]
    fn finish_without_value_and_violations_still_errors() {
        let v = Validator::new();
        assert!(v.finish::<()>(None).is_err());
    }

    #[test]
    fn describe_distinguishes_integers_and_floats() {
        assert_eq!(describe(&json!(1)), "an integer");
        assert_eq!(describe(&json!(1.5)), "a float");
        assert_eq!(describe(&json!(null)), "null");
    }
}
