//! Column type tokens.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::QuarryError;

/// Declared type of a table column.
///
/// The well-known variants have serializers in the type registry. Any other
/// engine type (`double`, `array<string>`, `map<string,int>`, ...) is kept
/// verbatim in [`ColumnType::Other`] so it can still be rendered into DDL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ColumnType {
    /// 32-bit integer (`int`).
    Int,
    /// 64-bit integer (`bigint`).
    BigInt,
    /// Variable length text (`string`).
    String,
    /// Boolean (`boolean`).
    Boolean,
    /// Timestamp without time zone (`timestamp`).
    Timestamp,
    /// Any other engine type token, rendered as given.
    Other(String),
}

impl ColumnType {
    /// Returns the token used in DDL statements.
    #[must_use]
    pub fn as_sql(&self) -> &str {
        match self {
            Self::Int => "int",
            Self::BigInt => "bigint",
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Timestamp => "timestamp",
            Self::Other(token) => token,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for ColumnType {
    type Err = QuarryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        if token.is_empty() {
            return Err(QuarryError::invalid_argument("empty column type"));
        }

        Ok(match token.to_ascii_lowercase().as_str() {
            "int" | "integer" => Self::Int,
            "bigint" => Self::BigInt,
            "string" => Self::String,
            "boolean" => Self::Boolean,
            "timestamp" => Self::Timestamp,
            _ => Self::Other(token.to_string()),
        })
    }
}

impl TryFrom<String> for ColumnType {
    type Error = QuarryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ColumnType> for String {
    fn from(value: ColumnType) -> Self {
        value.as_sql().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_types() {
        assert_eq!("int".parse::<ColumnType>().unwrap(), ColumnType::Int);
        assert_eq!("INTEGER".parse::<ColumnType>().unwrap(), ColumnType::Int);
        assert_eq!(" bigint ".parse::<ColumnType>().unwrap(), ColumnType::BigInt);
        assert_eq!("Timestamp".parse::<ColumnType>().unwrap(), ColumnType::Timestamp);
    }

    #[test]
    fn test_other_types_kept_verbatim() {
        let ty: ColumnType = "array<string>".parse().unwrap();
        assert_eq!(ty, ColumnType::Other("array<string>".to_string()));
        assert_eq!(ty.to_string(), "array<string>");
    }

    #[test]
    fn test_empty_type_rejected() {
        assert!("   ".parse::<ColumnType>().is_err());
    }
}
