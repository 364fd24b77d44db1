//! Null-aware serializer combinator.

use quarry_common::{QuarryResult, Value};

use super::TypeSerializer;

/// SQL literal of a null value.
pub const NULL_LITERAL: &str = "NULL";

/// Wraps any serializer and intercepts null input on all three operations.
///
/// `literal(Null)` is `NULL`, `dump(Null)` is `None`, and `load` of an absent
/// or empty cell is `Null`. The inner serializer is not called in any of
/// these cases.
#[derive(Debug, Clone)]
pub struct Nullable<S> {
    inner: S,
}

impl<S: TypeSerializer> Nullable<S> {
    /// Wraps a serializer.
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    /// Returns the wrapped serializer.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Name of the handled type.
    pub fn type_name(&self) -> &'static str {
        self.inner.type_name()
    }

    /// Renders the value as a SQL literal.
    pub fn literal(&self, value: &Value) -> QuarryResult<String> {
        if value.is_null() {
            return Ok(NULL_LITERAL.to_string());
        }
        self.inner.literal(value)
    }

    /// Renders the value in wire form, `None` for null.
    pub fn dump(&self, value: &Value) -> QuarryResult<Option<String>> {
        if value.is_null() {
            return Ok(None);
        }
        self.inner.dump(value).map(Some)
    }

    /// Parses a wire cell; absent and empty cells are null.
    pub fn load(&self, text: Option<&str>) -> QuarryResult<Value> {
        match text {
            None | Some("") => Ok(Value::Null),
            Some(text) => self.inner.load(text),
        }
    }
}
