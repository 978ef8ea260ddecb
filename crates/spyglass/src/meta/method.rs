//! Method descriptors: signals, slots and plain invokables

use std::fmt;
use std::rc::Rc;

use crate::object::Object;
use crate::value::Value;

/// Native body of a slot or invokable method
pub type InvokeFn = Rc<dyn Fn(&Object, &[Value])>;

/// What kind of method a descriptor names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    /// Emitted by the object, connectable
    Signal,
    /// Connectable target
    Slot,
    /// Invokable but not intended as a connection target
    Method,
}

/// Static descriptor for one method of a type.
#[derive(Clone)]
pub struct MetaMethod {
    pub(super) signature: String,
    pub(super) kind: MethodKind,
    pub(super) index: usize,
    pub(super) invoker: Option<InvokeFn>,
}

impl MetaMethod {
    /// Normalized signature, e.g. `valueChanged(i64)`
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Name without the parameter list
    pub fn name(&self) -> &str {
        self.signature
            .split_once('(')
            .map_or(self.signature.as_str(), |(name, _)| name)
    }

    /// Declared parameter types
    pub fn parameter_types(&self) -> Vec<&str> {
        let inner = self
            .signature
            .split_once('(')
            .and_then(|(_, rest)| rest.strip_suffix(')'))
            .unwrap_or("");
        inner.split(',').filter(|p| !p.is_empty()).collect()
    }

    /// Method kind
    pub fn kind(&self) -> MethodKind {
        self.kind
    }

    /// Check if this is a signal
    pub fn is_signal(&self) -> bool {
        self.kind == MethodKind::Signal
    }

    /// Global index across the inheritance chain
    pub fn index(&self) -> usize {
        self.index
    }

    /// Run the native body, if there is one.
    pub fn invoke(&self, target: &Object, args: &[Value]) -> bool {
        match &self.invoker {
            Some(f) => {
                f(target, args);
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for MetaMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetaMethod")
            .field("signature", &self.signature)
            .field("kind", &self.kind)
            .field("index", &self.index)
            .finish()
    }
}

/// Strip whitespace so `"changed( i64 )"` and `"changed(i64)"` compare equal.
pub fn normalize_signature(signature: &str) -> String {
    signature.chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn method(signature: &str) -> MetaMethod {
        MetaMethod {
            signature: normalize_signature(signature),
            kind: MethodKind::Signal,
            index: 0,
            invoker: None,
        }
    }

    #[test]
    fn test_name_strips_parameters() {
        assert_eq!(method("valueChanged(i64)").name(), "valueChanged");
        assert_eq!(method("destroyed()").name(), "destroyed");
    }

    #[test]
    fn test_parameter_types() {
        assert_eq!(method("moved(i64, i64)").parameter_types(), vec!["i64", "i64"]);
        assert!(method("clicked()").parameter_types().is_empty());
    }

    #[test]
    fn test_normalize_signature() {
        assert_eq!(normalize_signature(" resized( u32 , u32 ) "), "resized(u32,u32)");
    }
}
