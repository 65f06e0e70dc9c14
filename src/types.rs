use serde_json::Value as JsonValue;

use crate::error::FluentDbError;

/// Values that can be stored in a database row, bound as a statement parameter,
/// or carried in a pending payload.
///
/// The same enum is used for insert/update payloads, select results and the
/// single-field `get_field`/`set_value` calls:
/// ```rust
/// use fluent_sqlite::prelude::*;
///
/// let values = vec![
///     RowValues::Int(1),
///     RowValues::Text("alice".into()),
///     RowValues::Null,
/// ];
/// # let _ = values;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum RowValues {
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Binary data
    Blob(Vec<u8>),
    /// NULL value
    Null,
}

impl RowValues {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        if let RowValues::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let RowValues::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self.as_int() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            RowValues::Float(value) => Some(*value),
            #[allow(clippy::cast_precision_loss)]
            RowValues::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let RowValues::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }

    /// Column type inferred from the runtime kind of a sample value.
    ///
    /// Used by `create_table`: integers map to `INTEGER`, floats to `REAL`,
    /// everything else to `TEXT`.
    #[must_use]
    pub fn column_type(&self) -> &'static str {
        match self {
            RowValues::Int(_) => "INTEGER",
            RowValues::Float(_) => "REAL",
            RowValues::Text(_) | RowValues::Blob(_) | RowValues::Null => "TEXT",
        }
    }

    /// Convert a decoded JSON scalar or container into a row value.
    ///
    /// Booleans become `0`/`1`, numbers become `Int` when they fit in an `i64`
    /// and `Float` otherwise, nested arrays and objects are kept as JSON text.
    ///
    /// # Errors
    ///
    /// Returns `FluentDbError::ParameterError` for a number that is neither an
    /// `i64` nor representable as an `f64`.
    pub fn from_json(value: &JsonValue) -> Result<Self, FluentDbError> {
        match value {
            JsonValue::Null => Ok(RowValues::Null),
            JsonValue::Bool(b) => Ok(RowValues::Int(i64::from(*b))),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(RowValues::Int(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(RowValues::Float(f))
                } else {
                    Err(FluentDbError::ParameterError(format!(
                        "unsupported JSON number: {n}"
                    )))
                }
            }
            JsonValue::String(s) => Ok(RowValues::Text(s.clone())),
            JsonValue::Array(_) | JsonValue::Object(_) => Ok(RowValues::Text(value.to_string())),
        }
    }

    /// JSON form of this value; blobs become arrays of bytes.
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        match self {
            RowValues::Int(i) => JsonValue::from(*i),
            RowValues::Float(f) => JsonValue::from(*f),
            RowValues::Text(s) => JsonValue::from(s.as_str()),
            RowValues::Blob(b) => JsonValue::from(b.clone()),
            RowValues::Null => JsonValue::Null,
        }
    }
}

impl From<i64> for RowValues {
    fn from(value: i64) -> Self {
        RowValues::Int(value)
    }
}

impl From<i32> for RowValues {
    fn from(value: i32) -> Self {
        RowValues::Int(i64::from(value))
    }
}

impl From<bool> for RowValues {
    fn from(value: bool) -> Self {
        RowValues::Int(i64::from(value))
    }
}

impl From<f64> for RowValues {
    fn from(value: f64) -> Self {
        RowValues::Float(value)
    }
}

impl From<&str> for RowValues {
    fn from(value: &str) -> Self {
        RowValues::Text(value.to_owned())
    }
}

impl From<String> for RowValues {
    fn from(value: String) -> Self {
        RowValues::Text(value)
    }
}

impl From<Vec<u8>> for RowValues {
    fn from(value: Vec<u8>) -> Self {
        RowValues::Blob(value)
    }
}

impl<T: Into<RowValues>> From<Option<T>> for RowValues {
    fn from(value: Option<T>) -> Self {
        value.map_or(RowValues::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn infers_column_types_from_sample_values() {
        assert_eq!(RowValues::Int(3).column_type(), "INTEGER");
        assert_eq!(RowValues::Float(1.5).column_type(), "REAL");
        assert_eq!(RowValues::Text("x".into()).column_type(), "TEXT");
        assert_eq!(RowValues::Blob(vec![1]).column_type(), "TEXT");
        assert_eq!(RowValues::Null.column_type(), "TEXT");
    }

    #[test]
    fn converts_json_scalars() {
        assert_eq!(RowValues::from_json(&json!(30)).unwrap(), RowValues::Int(30));
        assert_eq!(RowValues::from_json(&json!(2.5)).unwrap(), RowValues::Float(2.5));
        assert_eq!(RowValues::from_json(&json!(true)).unwrap(), RowValues::Int(1));
        assert_eq!(RowValues::from_json(&json!(null)).unwrap(), RowValues::Null);
        assert_eq!(
            RowValues::from_json(&json!({"a": 1})).unwrap(),
            RowValues::Text("{\"a\":1}".into())
        );
    }

    #[test]
    fn option_maps_to_null() {
        let none: Option<i64> = None;
        assert!(RowValues::from(none).is_null());
        assert_eq!(RowValues::from(Some("a")), RowValues::Text("a".into()));
    }
}
