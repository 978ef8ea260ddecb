//! Value trait implementations: constructors, predicates, extractors, From traits, PartialEq

use std::sync::Arc;

use super::*;
use crate::object::Object;

// ═══════════════════════════════════════════════════════════════════
// Convenience Constructors
// ═══════════════════════════════════════════════════════════════════

impl Value {
    /// Create a string value
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(Arc::new(s.into()))
    }

    /// Create a byte string value
    pub fn bytes(b: impl Into<Vec<u8>>) -> Self {
        Value::Bytes(Arc::new(b.into()))
    }

    /// Create a list value
    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Arc::new(items))
    }

    /// Create a map value
    pub fn map(entries: IndexMap<String, Value>) -> Self {
        Value::Map(Arc::new(entries))
    }

    /// Create a non-owning object reference
    pub fn object(obj: &Object) -> Self {
        Value::Object(obj.downgrade())
    }

    // ═══════════════════════════════════════════════════════════════════
    // Type Predicates
    // ═══════════════════════════════════════════════════════════════════

    /// Check if this is the empty value
    pub fn is_invalid(&self) -> bool {
        matches!(self, Value::Invalid)
    }

    /// Check if value holds something
    pub fn is_valid(&self) -> bool {
        !self.is_invalid()
    }

    /// Check if value is any integer type
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            Value::I32(_) | Value::I64(_) | Value::U32(_) | Value::U64(_)
        )
    }

    /// Runtime type name of the held value
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Invalid => "<invalid>",
            Value::Bool(_) => "bool",
            Value::Char(_) => "char",
            Value::I32(_) => "i32",
            Value::I64(_) => "i64",
            Value::U32(_) => "u32",
            Value::U64(_) => "u64",
            Value::F64(_) => "f64",
            Value::String(_) => "String",
            Value::Bytes(_) => "Vec<u8>",
            Value::List(_) => "Vec",
            Value::Map(_) => "Map",
            Value::Object(_) => "Object",
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Extractors (return Option for safe access)
    // ═══════════════════════════════════════════════════════════════════

    /// Extract boolean value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Extract as i64 (converts from narrower integer types)
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I32(n) => Some(*n as i64),
            Value::I64(n) => Some(*n),
            Value::U32(n) => Some(*n as i64),
            Value::U64(n) => (*n).try_into().ok(),
            _ => None,
        }
    }

    /// Extract as f64 (integers widen)
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::F64(n) => Some(*n),
            _ => self.as_i64().map(|n| n as f64),
        }
    }

    /// Extract string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Extract list as slice
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    /// Upgrade an object reference, if it still points at a live object
    pub fn as_object(&self) -> Option<Object> {
        match self {
            Value::Object(obj) => obj.upgrade(),
            _ => None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════
// PartialEq Implementation
// ═══════════════════════════════════════════════════════════════════

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Invalid, Value::Invalid) => true,

            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::I32(a), Value::I32(b)) => a == b,
            (Value::I64(a), Value::I64(b)) => a == b,
            (Value::U32(a), Value::U32(b)) => a == b,
            (Value::U64(a), Value::U64(b)) => a == b,
            // Any NaN equals any other NaN
            (Value::F64(a), Value::F64(b)) => (a.is_nan() && b.is_nan()) || a == b,

            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,

            // Object references are equal if they name the same object
            (Value::Object(a), Value::Object(b)) => a.id() == b.id(),

            // Different types are never equal
            _ => false,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════
// From Trait Implementations
// ═══════════════════════════════════════════════════════════════════

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::Char(c)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::I32(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::I64(n)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::U32(n)
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::U64(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::F64(n)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::string(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::list(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_invalid() {
        assert!(Value::default().is_invalid());
        assert!(!Value::default().is_valid());
    }

    #[test]
    fn test_string_constructor() {
        let v = Value::string("hello");
        assert!(matches!(v, Value::String(_)));
        assert_eq!(v.as_str(), Some("hello"));
    }

    #[test]
    fn test_integer_widening() {
        assert_eq!(Value::I32(-4).as_i64(), Some(-4));
        assert_eq!(Value::U64(u64::MAX).as_i64(), None);
        assert_eq!(Value::I64(3).as_f64(), Some(3.0));
    }

    #[test]
    fn test_option_none_is_invalid() {
        let v: Value = None::<i64>.into();
        assert!(v.is_invalid());
        let v: Value = Some(7i64).into();
        assert_eq!(v, Value::I64(7));
    }

    #[test]
    fn test_different_types_not_equal() {
        assert_ne!(Value::I32(1), Value::I64(1));
        assert_ne!(Value::Invalid, Value::Bool(false));
    }

    #[test]
    fn test_nan_equals_nan() {
        assert_eq!(Value::F64(f64::NAN), Value::F64(f64::NAN));
        assert_ne!(Value::F64(f64::NAN), Value::F64(0.0));
        assert_eq!(Value::F64(0.0), Value::F64(-0.0));
    }

    #[test]
    fn test_display_invalid_is_empty() {
        assert_eq!(Value::Invalid.to_string(), "");
        assert_eq!(Value::string("x").to_string(), "x");
        assert_eq!(format!("{:?}", Value::string("x")), "\"x\"");
    }
}
