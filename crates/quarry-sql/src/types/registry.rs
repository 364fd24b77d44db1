//! Serializer lookup by declared column type.

use quarry_common::{ColumnType, QuarryError, QuarryResult, TypeFallback, Value};

use super::{
    BooleanSerializer, DefaultSerializer, IntegerSerializer, Nullable, StringSerializer,
    TimestampSerializer, TypeSerializer,
};

/// A null-aware serializer as handed out by the registry.
pub type Serializer = Nullable<Box<dyn TypeSerializer>>;

/// Maps column types to serializers.
///
/// The registry is a pure function of its fallback policy and is safe to
/// share between threads.
///
/// # Example
///
/// ```rust
/// use quarry_common::{ColumnType, Value};
/// use quarry_sql::types::TypeRegistry;
///
/// let registry = TypeRegistry::strict();
/// let serializer = registry.serializer_for(&ColumnType::String).unwrap();
/// assert_eq!(serializer.literal(&Value::from("it's")).unwrap(), "'it''s'");
/// assert_eq!(serializer.literal(&Value::Null).unwrap(), "NULL");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypeRegistry {
    fallback: TypeFallback,
}

impl TypeRegistry {
    /// Creates a registry with the given fallback policy.
    pub fn new(fallback: TypeFallback) -> Self {
        Self { fallback }
    }

    /// Registry that rejects unknown types.
    pub fn strict() -> Self {
        Self::new(TypeFallback::Strict)
    }

    /// Registry that serves unknown types with the passthrough serializer.
    pub fn passthrough() -> Self {
        Self::new(TypeFallback::Passthrough)
    }

    /// Returns the fallback policy.
    pub fn fallback(&self) -> TypeFallback {
        self.fallback
    }

    /// Returns the serializer for a column type.
    pub fn serializer_for(&self, column_type: &ColumnType) -> QuarryResult<Serializer> {
        let inner: Box<dyn TypeSerializer> = match column_type {
            ColumnType::Int | ColumnType::BigInt => Box::new(IntegerSerializer),
            ColumnType::String => Box::new(StringSerializer),
            ColumnType::Boolean => Box::new(BooleanSerializer),
            ColumnType::Timestamp => Box::new(TimestampSerializer),
            ColumnType::Other(token) => match self.fallback {
                TypeFallback::Strict => {
                    return Err(QuarryError::UnsupportedType {
                        column_type: token.clone(),
                    })
                }
                TypeFallback::Passthrough => Box::new(DefaultSerializer),
            },
        };
        Ok(Nullable::new(inner))
    }

    /// Returns the serializer matching the runtime kind of a value.
    ///
    /// Used where values are inlined without a declared column type, such as
    /// partition specifications.
    pub fn serializer_for_value(value: &Value) -> Serializer {
        let inner: Box<dyn TypeSerializer> = match value {
            Value::Integer(_) => Box::new(IntegerSerializer),
            Value::String(_) => Box::new(StringSerializer),
            Value::Boolean(_) => Box::new(BooleanSerializer),
            Value::Timestamp(_) => Box::new(TimestampSerializer),
            Value::Null => Box::new(DefaultSerializer),
        };
        Nullable::new(inner)
    }

    /// Returns the passthrough serializer.
    pub fn default_serializer() -> Serializer {
        Nullable::new(Box::new(DefaultSerializer))
    }
}
