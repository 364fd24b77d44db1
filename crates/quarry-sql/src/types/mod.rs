//! Type serialization registry.
//!
//! Every column type maps to a serializer that converts between a typed
//! [`Value`], its SQL literal form (inlined into generated statements) and
//! its wire form (the text found in query result files).
//!
//! Serializers handed out by the [`TypeRegistry`] are always wrapped in
//! [`Nullable`], so the concrete serializers below never see nulls.

mod nullable;
mod registry;
mod scalar;
mod timestamp;

pub use nullable::{Nullable, NULL_LITERAL};
pub use registry::{Serializer, TypeRegistry};
pub use scalar::{BooleanSerializer, DefaultSerializer, IntegerSerializer, StringSerializer};
pub use timestamp::TimestampSerializer;

pub(crate) use scalar::quote;

use std::fmt;

use quarry_common::{QuarryResult, Value};

/// Conversion between a non-null value and its SQL and wire forms.
pub trait TypeSerializer: Send + Sync + fmt::Debug {
    /// Name of the handled type, used in error messages.
    fn type_name(&self) -> &'static str;

    /// Renders the value as a SQL literal.
    fn literal(&self, value: &Value) -> QuarryResult<String>;

    /// Renders the value in wire form.
    fn dump(&self, value: &Value) -> QuarryResult<String>;

    /// Parses a value from wire form.
    fn load(&self, text: &str) -> QuarryResult<Value>;
}

impl<S: TypeSerializer + ?Sized> TypeSerializer for Box<S> {
    fn type_name(&self) -> &'static str {
        (**self).type_name()
    }

    fn literal(&self, value: &Value) -> QuarryResult<String> {
        (**self).literal(value)
    }

    fn dump(&self, value: &Value) -> QuarryResult<String> {
        (**self).dump(value)
    }

    fn load(&self, text: &str) -> QuarryResult<Value> {
        (**self).load(text)
    }
}
