//! Configuration schemas
//!
//! Each operator declares the shape of its configuration block as a [`Schema`].
//! The pipeline merges it with the base fragment shared by all operators and
//! validates every block before building anything, so a bad value is reported
//! with its full path instead of surfacing halfway through a corpus.
//!
//! Objects are closed: properties that are not declared are rejected.

use serde_json::Value;

use crate::error::{PrepError, PrepResult};

#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    String,
    /// String restricted to a fixed set of values
    Enum(&'static [&'static str]),
    Boolean,
    Integer { minimum: i64 },
    Number { minimum: f64, maximum: f64 },
    /// Object with arbitrary keys and string values
    StringMap,
    Object(Vec<(&'static str, Schema)>),
}

impl Schema {
    /// Number in [0, 1]
    pub fn probability() -> Self {
        Schema::Number {
            minimum: 0.0,
            maximum: 1.0,
        }
    }

    pub fn object<I>(properties: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, Schema)>,
    {
        Schema::Object(properties.into_iter().collect())
    }

    /// Fragment every operator block accepts
    pub fn operator_base() -> Self {
        Schema::object([
            ("op", Schema::String),
            ("name", Schema::String),
            ("verbose", Schema::Boolean),
        ])
    }

    /// Add the properties of `other` to this object schema. Properties of
    /// `other` win on name clashes. Non-object schemas are replaced.
    pub fn merge(self, other: Schema) -> Schema {
        match (self, other) {
            (Schema::Object(mut base), Schema::Object(extra)) => {
                for (name, schema) in extra {
                    match base.iter_mut().find(|(existing, _)| *existing == name) {
                        Some(slot) => slot.1 = schema,
                        None => base.push((name, schema)),
                    }
                }
                Schema::Object(base)
            }
            (_, other) => other,
        }
    }

    pub fn validate(&self, value: &Value) -> PrepResult<()> {
        self.check(value, "")
    }

    fn check(&self, value: &Value, path: &str) -> PrepResult<()> {
        let at = if path.is_empty() { "<root>" } else { path };
        match self {
            Schema::String => {
                value
                    .as_str()
                    .ok_or_else(|| mismatch(at, "a string", value))?;
            }
            Schema::Enum(allowed) => {
                let s = value
                    .as_str()
                    .ok_or_else(|| mismatch(at, "a string", value))?;
                if !allowed.contains(&s) {
                    return Err(PrepError::config(format!(
                        "{}: '{}' is not one of {}",
                        at,
                        s,
                        allowed.join(", ")
                    )));
                }
            }
            Schema::Boolean => {
                value
                    .as_bool()
                    .ok_or_else(|| mismatch(at, "a boolean", value))?;
            }
            Schema::Integer { minimum } => {
                let n = value
                    .as_i64()
                    .ok_or_else(|| mismatch(at, "an integer", value))?;
                if n < *minimum {
                    return Err(PrepError::config(format!(
                        "{}: {} is less than the minimum of {}",
                        at, n, minimum
                    )));
                }
            }
            Schema::Number { minimum, maximum } => {
                let n = value
                    .as_f64()
                    .ok_or_else(|| mismatch(at, "a number", value))?;
                if n < *minimum {
                    return Err(PrepError::config(format!(
                        "{}: {} is less than the minimum of {}",
                        at, value, minimum
                    )));
                }
                if n > *maximum {
                    return Err(PrepError::config(format!(
                        "{}: {} is greater than the maximum of {}",
                        at, value, maximum
                    )));
                }
            }
            Schema::StringMap => {
                let map = value
                    .as_object()
                    .ok_or_else(|| mismatch(at, "an object", value))?;
                for (key, entry) in map {
                    Schema::String.check(entry, &join(path, key))?;
                }
            }
            Schema::Object(properties) => {
                let map = value
                    .as_object()
                    .ok_or_else(|| mismatch(at, "an object", value))?;
                for (key, entry) in map {
                    let schema = properties
                        .iter()
                        .find(|(name, _)| name == key)
                        .map(|(_, schema)| schema)
                        .ok_or_else(|| {
                            PrepError::config(format!("{}: unknown property '{}'", at, key))
                        })?;
                    schema.check(entry, &join(path, key))?;
                }
            }
        }
        Ok(())
    }
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

fn mismatch(path: &str, expected: &str, value: &Value) -> PrepError {
    PrepError::config(format!("{}: expected {}, got {}", path, expected, value))
}
