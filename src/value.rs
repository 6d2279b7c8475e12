//! Column values
//!
//! Every cell in a record graph holds a [`Value`]. The set of variants is
//! closed so that coercion happens in exactly one place: the connector that
//! turns values into SQL literals and decodes rows back into values.

use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};
use std::fmt;

/// Format used when a datetime is rendered or parsed as text.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single scalar stored in a column.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// SQL `NULL`, also used for values that are not known yet
    #[default]
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
    DateTime(NaiveDateTime),
}

impl Value {
    /// Check if this is SQL `NULL`
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check if the value carries no usable key: `NULL` or empty text.
    ///
    /// A record constructed with a blank primary key is treated as new.
    pub fn is_blank(&self) -> bool {
        self.is_null() || self.as_str().is_some_and(|s| s.trim().is_empty())
    }

    /// Check if the value has an exact SQL literal (finite reals only)
    pub fn is_writable(&self) -> bool {
        match self {
            Value::Real(r) => r.is_finite(),
            _ => true,
        }
    }

    /// Get the text payload, if any
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Parse a literal typed on the command line.
    ///
    /// `null` (any case) becomes `Null`, integers and floats become numbers,
    /// `YYYY-MM-DD HH:MM:SS` becomes a datetime and everything else is text.
    /// Wrapping the literal in single quotes forces text.
    pub fn parse_literal(raw: &str) -> Value {
        let trimmed = raw.trim();

        if let Some(inner) = trimmed
            .strip_prefix('\'')
            .and_then(|s| s.strip_suffix('\''))
        {
            return Value::Text(inner.to_string());
        }
        if trimmed.eq_ignore_ascii_case("null") {
            return Value::Null;
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return Value::Integer(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            if f.is_finite() {
                return Value::Real(f);
            }
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, DATETIME_FORMAT) {
            return Value::DateTime(dt);
        }
        Value::Text(raw.to_string())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Real(r) => write!(f, "{}", r),
            Value::Text(s) => write!(f, "{}", s),
            Value::Blob(b) => {
                for byte in b {
                    write!(f, "{:02x}", byte)?;
                }
                Ok(())
            }
            Value::DateTime(dt) => write!(f, "{}", dt.format(DATETIME_FORMAT)),
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Real(r) => serializer.serialize_f64(*r),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Blob(b) => serializer.serialize_bytes(b),
            Value::DateTime(dt) => {
                serializer.serialize_str(&dt.format(DATETIME_FORMAT).to_string())
            }
        }
    }
}

macro_rules! impl_from_integer {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Integer(i64::from(v))
                }
            }
        )*
    };
}

impl_from_integer!(i8, i16, i32, i64, u8, u16, u32, bool);

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Real(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Blob(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::DateTime(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_values() {
        assert!(Value::Null.is_blank());
        assert!(Value::from("").is_blank());
        assert!(Value::from("  ").is_blank());
        assert!(!Value::from(0).is_blank());
        assert!(!Value::from("5").is_blank());
    }

    #[test]
    fn test_writable_values() {
        assert!(Value::Real(1.5).is_writable());
        assert!(Value::Null.is_writable());
        assert!(!Value::Real(f64::NAN).is_writable());
        assert!(!Value::Real(f64::INFINITY).is_writable());
    }

    #[test]
    fn test_parse_literal() {
        assert_eq!(Value::parse_literal("42"), Value::Integer(42));
        assert_eq!(Value::parse_literal("-1.5"), Value::Real(-1.5));
        assert_eq!(Value::parse_literal("NULL"), Value::Null);
        assert_eq!(Value::parse_literal("'42'"), Value::Text("42".to_string()));
        assert_eq!(Value::parse_literal("Title 1"), Value::Text("Title 1".to_string()));

        let dt = Value::parse_literal("2024-01-02 03:04:05");
        assert!(matches!(dt, Value::DateTime(_)));
        assert_eq!(dt.to_string(), "2024-01-02 03:04:05");
    }

    #[test]
    fn test_display_and_json() {
        assert_eq!(Value::Blob(vec![0xde, 0xad]).to_string(), "dead");
        assert_eq!(Value::Null.to_string(), "NULL");

        let json = serde_json::to_string(&vec![
            Value::Integer(1),
            Value::Null,
            Value::from("a"),
        ])
        .unwrap();
        assert_eq!(json, r#"[1,null,"a"]"#);
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::Text("x".to_string()));
    }
}
