use std::fmt::{Display, Formatter};

/// A primitive value living on the evaluation stack.
///
/// These are the only values that can flow between the literals of a
/// [`crate::Program`] and the functions registered in a [`crate::FunctionRegistry`].
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

impl Value {
    #[inline]
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::String(_) => ValueKind::String,
            Self::Integer(_) => ValueKind::Integer,
            Self::Float(_) => ValueKind::Float,
            Self::Boolean(_) => ValueKind::Boolean,
        }
    }
}

impl Display for Value {
    fn fmt(&self, formatter: &mut Formatter) -> std::fmt::Result {
        match self {
            Self::String(value) => write!(formatter, "{value:?}"),
            Self::Integer(value) => write!(formatter, "{value}"),
            Self::Float(value) => write!(formatter, "{value:?}"),
            Self::Boolean(value) => write!(formatter, "{value}"),
        }
    }
}

/// The type of a [`Value`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ValueKind {
    String,
    Integer,
    Float,
    Boolean,
}

impl Display for ValueKind {
    fn fmt(&self, formatter: &mut Formatter) -> std::fmt::Result {
        match self {
            Self::String => write!(formatter, "string"),
            Self::Integer => write!(formatter, "integer"),
            Self::Float => write!(formatter, "float"),
            Self::Boolean => write!(formatter, "boolean"),
        }
    }
}

/// A Rust type that maps one to one onto a [`ValueKind`].
///
/// There is no coercion between kinds: an `i64` parameter only ever accepts
/// [`Value::Integer`], never a float or a string.
pub trait Primitive: Sized {
    const KIND: ValueKind;

    fn from_value(value: Value) -> Option<Self>;

    fn into_value(self) -> Value;
}

impl Primitive for String {
    const KIND: ValueKind = ValueKind::String;

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::String(value) => Some(value),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::String(self)
    }
}

impl Primitive for i64 {
    const KIND: ValueKind = ValueKind::Integer;

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Integer(value) => Some(value),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Integer(self)
    }
}

impl Primitive for f64 {
    const KIND: ValueKind = ValueKind::Float;

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Float(value) => Some(value),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Float(self)
    }
}

impl Primitive for bool {
    const KIND: ValueKind = ValueKind::Boolean;

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Boolean(value) => Some(value),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Boolean(self)
    }
}
