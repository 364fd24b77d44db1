//! Values exchanged with the query engine.

use std::fmt;

use chrono::NaiveDateTime;

/// Wire format of timestamps: second precision, no time zone.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A decoded result cell or a literal headed for generated SQL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    /// Absent value; also what an empty wire cell decodes to.
    Null,
    /// `int` / `bigint` value.
    Integer(i64),
    /// Text value.
    String(String),
    /// `boolean` value.
    Boolean(bool),
    /// Naive timestamp, second precision on the wire.
    Timestamp(NaiveDateTime),
}

impl Value {
    /// True for `Value::Null`.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Variant name used in coercion errors.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Integer(_) => "integer",
            Self::String(_) => "string",
            Self::Boolean(_) => "boolean",
            Self::Timestamp(_) => "timestamp",
        }
    }

    /// The integer, if this is one.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        if let Self::Integer(n) = self {
            Some(*n)
        } else {
            None
        }
    }

    /// The text, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        if let Self::String(text) = self {
            Some(text.as_str())
        } else {
            None
        }
    }

    /// The flag, if this is a boolean.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        if let Self::Boolean(flag) = self {
            Some(*flag)
        } else {
            None
        }
    }

    /// The timestamp, if this is one.
    #[must_use]
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        if let Self::Timestamp(at) = self {
            Some(*at)
        } else {
            None
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::String(text) => f.write_str(text),
            Self::Boolean(flag) => write!(f, "{flag}"),
            Self::Timestamp(at) => write!(f, "{}", at.format(TIMESTAMP_FORMAT)),
        }
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Integer(i64::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<bool> for Value {
    fn from(flag: bool) -> Self {
        Self::Boolean(flag)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Self::String(text.to_owned())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Self::String(text)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(at: NaiveDateTime) -> Self {
        Self::Timestamp(at)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_accessors_match_variant() {
        let count = Value::from(42);
        assert_eq!(count.as_i64(), Some(42));
        assert_eq!(count.as_str(), None);
        assert_eq!(count.kind(), "integer");

        let country = Value::from("mx");
        assert_eq!(country.as_str(), Some("mx"));
        assert_eq!(country.as_bool(), None);
    }

    #[test]
    fn test_optional_values() {
        assert!(Value::from(None::<i64>).is_null());
        assert_eq!(Value::from(Some(true)), Value::Boolean(true));
        assert_eq!(Value::Null.to_string(), "NULL");
    }

    #[test]
    fn test_timestamp_display() {
        let at = NaiveDate::from_ymd_opt(2020, 5, 4)
            .unwrap()
            .and_hms_opt(11, 19, 3)
            .unwrap();
        assert_eq!(Value::from(at).to_string(), "2020-05-04 11:19:03");
        assert_eq!(Value::from(at).as_timestamp(), Some(at));
    }
}
