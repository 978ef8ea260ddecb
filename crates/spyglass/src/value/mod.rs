//! Dynamically typed property values

mod display;
mod impls;

use std::sync::Arc;

use indexmap::IndexMap;

use crate::object::WeakObject;

/// A property value read from, or written to, a reflected object.
///
/// `Invalid` is the empty value: it is what a read produces when there is
/// nothing to read from, and what an unset field holds.
#[derive(Clone, Default)]
pub enum Value {
    // ═══════════════════════════════════════════════════════════════════
    // Empty
    // ═══════════════════════════════════════════════════════════════════
    /// No value
    #[default]
    Invalid,

    // ═══════════════════════════════════════════════════════════════════
    // Inline Primitives
    // ═══════════════════════════════════════════════════════════════════
    /// Boolean
    Bool(bool),

    /// Unicode scalar value
    Char(char),

    /// 32-bit signed integer
    I32(i32),
    /// 64-bit signed integer
    I64(i64),
    /// 32-bit unsigned integer
    U32(u32),
    /// 64-bit unsigned integer
    U64(u64),

    /// 64-bit floating point
    F64(f64),

    // ═══════════════════════════════════════════════════════════════════
    // Shared Compound Types
    // ═══════════════════════════════════════════════════════════════════
    /// Heap-allocated string
    String(Arc<String>),

    /// Byte string
    Bytes(Arc<Vec<u8>>),

    /// Ordered list of values
    List(Arc<Vec<Value>>),

    /// String-keyed map preserving insertion order
    Map(Arc<IndexMap<String, Value>>),

    // ═══════════════════════════════════════════════════════════════════
    // Object References
    // ═══════════════════════════════════════════════════════════════════
    /// Non-owning reference to another live object
    Object(WeakObject),
}
