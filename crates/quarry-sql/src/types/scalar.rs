//! Serializers for integers, strings, booleans and opaque values.

use quarry_common::{QuarryError, QuarryResult, Value};

use super::TypeSerializer;

/// Quotes text as a SQL string literal, doubling embedded single quotes.
pub(crate) fn quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

/// Serializer for `int` and `bigint` columns.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerSerializer;

impl IntegerSerializer {
    fn integer(self, value: &Value) -> QuarryResult<i64> {
        value
            .as_i64()
            .ok_or_else(|| QuarryError::value_coercion(value, self.type_name()))
    }
}

impl TypeSerializer for IntegerSerializer {
    fn type_name(&self) -> &'static str {
        "integer"
    }

    fn literal(&self, value: &Value) -> QuarryResult<String> {
        self.integer(value).map(|i| i.to_string())
    }

    fn dump(&self, value: &Value) -> QuarryResult<String> {
        self.integer(value).map(|i| i.to_string())
    }

    fn load(&self, text: &str) -> QuarryResult<Value> {
        text.parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| QuarryError::coercion(text, self.type_name()))
    }
}

/// Serializer for `string` columns.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringSerializer;

impl StringSerializer {
    fn text<'a>(self, value: &'a Value) -> QuarryResult<&'a str> {
        value
            .as_str()
            .ok_or_else(|| QuarryError::value_coercion(value, self.type_name()))
    }
}

impl TypeSerializer for StringSerializer {
    fn type_name(&self) -> &'static str {
        "string"
    }

    fn literal(&self, value: &Value) -> QuarryResult<String> {
        self.text(value).map(quote)
    }

    fn dump(&self, value: &Value) -> QuarryResult<String> {
        self.text(value).map(str::to_string)
    }

    fn load(&self, text: &str) -> QuarryResult<Value> {
        Ok(Value::String(text.to_string()))
    }
}

/// Serializer for `boolean` columns.
///
/// Only the two boolean values are accepted; the wire form is the lowercase
/// tokens `true` / `false`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanSerializer;

impl BooleanSerializer {
    const TRUE_LITERAL: &'static str = "TRUE";
    const FALSE_LITERAL: &'static str = "FALSE";
    const TRUE_VALUE: &'static str = "true";
    const FALSE_VALUE: &'static str = "false";

    fn boolean(self, value: &Value) -> QuarryResult<bool> {
        value
            .as_bool()
            .ok_or_else(|| QuarryError::value_coercion(value, self.type_name()))
    }
}

impl TypeSerializer for BooleanSerializer {
    fn type_name(&self) -> &'static str {
        "boolean"
    }

    fn literal(&self, value: &Value) -> QuarryResult<String> {
        let literal = if self.boolean(value)? {
            Self::TRUE_LITERAL
        } else {
            Self::FALSE_LITERAL
        };
        Ok(literal.to_string())
    }

    fn dump(&self, value: &Value) -> QuarryResult<String> {
        let token = if self.boolean(value)? {
            Self::TRUE_VALUE
        } else {
            Self::FALSE_VALUE
        };
        Ok(token.to_string())
    }

    fn load(&self, text: &str) -> QuarryResult<Value> {
        match text {
            Self::TRUE_VALUE => Ok(Value::Boolean(true)),
            Self::FALSE_VALUE => Ok(Value::Boolean(false)),
            _ => Err(QuarryError::coercion(text, self.type_name())),
        }
    }
}

/// Passthrough serializer for types without a dedicated one.
///
/// Any value is rendered through its text form; loading never fails and
/// yields the raw text.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSerializer;

impl TypeSerializer for DefaultSerializer {
    fn type_name(&self) -> &'static str {
        "default"
    }

    fn literal(&self, value: &Value) -> QuarryResult<String> {
        Ok(quote(&value.to_string()))
    }

    fn dump(&self, value: &Value) -> QuarryResult<String> {
        Ok(value.to_string())
    }

    fn load(&self, text: &str) -> QuarryResult<Value> {
        Ok(Value::String(text.to_string()))
    }
}
