//! Lexical environment frames.
//!
//! A [`Frame`] is a shared, mutable scope with an optional parent. Blocks,
//! calls and loop iterations each get a child frame; closures keep the frame
//! they were created in alive, so later calls see later assignments.

use crate::error::{EvalError, EvalResult};
use crate::value::Value;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use zyra_types::ast::TypeAnnotation;

/// One name in a frame.
#[derive(Debug, Clone)]
pub struct Binding {
    pub value: Value,
    pub mutable: bool,
    /// Declared type; assignments are coerced to it.
    pub declared: Option<TypeAnnotation>,
}

impl Binding {
    pub fn new(value: Value, mutable: bool, declared: Option<TypeAnnotation>) -> Self {
        Self {
            value,
            mutable,
            declared,
        }
    }
}

#[derive(Default)]
struct Scope {
    bindings: BTreeMap<String, Binding>,
    parent: Option<Frame>,
}

/// Saved bindings of a single frame.
pub type FrameSnapshot = BTreeMap<String, Binding>;

#[derive(Clone, Default)]
pub struct Frame(Rc<RefCell<Scope>>);

impl Frame {
    /// A frame with no parent.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn child(&self) -> Self {
        Frame(Rc::new(RefCell::new(Scope {
            bindings: BTreeMap::new(),
            parent: Some(self.clone()),
        })))
    }

    /// Introduce a name in this frame. Shadowing an outer frame is allowed;
    /// redefining a name in the same frame is not.
    pub fn define(
        &self,
        name: &str,
        value: Value,
        mutable: bool,
        declared: Option<TypeAnnotation>,
    ) -> EvalResult<()> {
        let mut scope = self.0.borrow_mut();
        if scope.bindings.contains_key(name) {
            return Err(EvalError::DuplicateDefinition(format!(
                "'{name}' is already defined in this scope"
            )));
        }
        scope
            .bindings
            .insert(name.to_string(), Binding::new(value, mutable, declared));
        Ok(())
    }

    /// Install or replace a binding without the duplicate check.
    pub(crate) fn insert(&self, name: &str, binding: Binding) {
        self.0.borrow_mut().bindings.insert(name.to_string(), binding);
    }

    /// Nearest binding of `name`, walking outward.
    pub fn binding(&self, name: &str) -> Option<Binding> {
        let mut frame = self.clone();
        loop {
            let parent = {
                let scope = frame.0.borrow();
                if let Some(binding) = scope.bindings.get(name) {
                    return Some(binding.clone());
                }
                scope.parent.clone()
            };
            frame = parent?;
        }
    }

    pub fn lookup(&self, name: &str) -> EvalResult<Value> {
        self.binding(name)
            .map(|b| b.value)
            .ok_or_else(|| EvalError::UndefinedName(name.to_string()))
    }

    /// Rebind the nearest `name`. The new value is passed through `coerce`
    /// when the binding has a declared type.
    pub fn assign(
        &self,
        name: &str,
        value: Value,
        coerce: impl FnOnce(&TypeAnnotation, Value) -> EvalResult<Value>,
    ) -> EvalResult<()> {
        let owner = self
            .owner_of(name)
            .ok_or_else(|| EvalError::UndefinedName(name.to_string()))?;
        let (mutable, declared) = {
            let scope = owner.0.borrow();
            match scope.bindings.get(name) {
                Some(b) => (b.mutable, b.declared.clone()),
                None => return Err(EvalError::UndefinedName(name.to_string())),
            }
        };
        if !mutable {
            return Err(EvalError::ImmutableAssignment(name.to_string()));
        }
        let value = match &declared {
            Some(ty) => coerce(ty, value)?,
            None => value,
        };
        if let Some(binding) = owner.0.borrow_mut().bindings.get_mut(name) {
            binding.value = value;
        }
        Ok(())
    }

    fn owner_of(&self, name: &str) -> Option<Frame> {
        let mut frame = self.clone();
        loop {
            let parent = {
                let scope = frame.0.borrow();
                if scope.bindings.contains_key(name) {
                    break;
                }
                scope.parent.clone()
            };
            frame = parent?;
        }
        Some(frame)
    }

    pub fn has_local(&self, name: &str) -> bool {
        self.0.borrow().bindings.contains_key(name)
    }

    /// Names bound directly in this frame, sorted.
    pub fn local_names(&self) -> Vec<String> {
        self.0.borrow().bindings.keys().cloned().collect()
    }

    pub fn snapshot(&self) -> FrameSnapshot {
        self.0.borrow().bindings.clone()
    }

    pub fn restore(&self, snapshot: FrameSnapshot) {
        self.0.borrow_mut().bindings = snapshot;
    }
}

// Frames reach themselves through the closures they hold.
impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("names", &self.local_names())
            .field("has_parent", &self.0.borrow().parent.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zyra_types::ast::TypeKind;
    use zyra_types::{IntType, Span};

    fn keep(_: &TypeAnnotation, v: Value) -> EvalResult<Value> {
        Ok(v)
    }

    #[test]
    fn test_lookup_walks_parents() {
        let root = Frame::root();
        root.define("x", Value::from(1), true, None).unwrap();
        let inner = root.child().child();
        assert_eq!(inner.lookup("x").unwrap(), Value::from(1));
        assert!(matches!(inner.lookup("y"), Err(EvalError::UndefinedName(_))));
    }

    #[test]
    fn test_shadowing_and_duplicates() {
        let root = Frame::root();
        root.define("x", Value::from(1), true, None).unwrap();
        let inner = root.child();
        inner.define("x", Value::from(2), true, None).unwrap();
        assert_eq!(inner.lookup("x").unwrap(), Value::from(2));
        assert_eq!(root.lookup("x").unwrap(), Value::from(1));
        assert!(matches!(
            root.define("x", Value::Null, true, None),
            Err(EvalError::DuplicateDefinition(_))
        ));
    }

    #[test]
    fn test_assign_updates_owner() {
        let root = Frame::root();
        root.define("count", Value::from(0), true, None).unwrap();
        let inner = root.child();
        inner.assign("count", Value::from(5), keep).unwrap();
        assert_eq!(root.lookup("count").unwrap(), Value::from(5));
    }

    #[test]
    fn test_assign_const_fails() {
        let root = Frame::root();
        root.define("k", Value::from(1), false, None).unwrap();
        assert!(matches!(
            root.assign("k", Value::from(2), keep),
            Err(EvalError::ImmutableAssignment(_))
        ));
        assert!(matches!(
            root.assign("missing", Value::from(2), keep),
            Err(EvalError::UndefinedName(_))
        ));
    }

    #[test]
    fn test_assign_coerces_declared_type() {
        let root = Frame::root();
        let ty = TypeAnnotation::new(TypeKind::Int(IntType::U8), Span::SYNTHETIC);
        root.define("b", Value::from(1), true, Some(ty)).unwrap();
        root.assign("b", Value::from(300), |_, v| {
            Ok(Value::int(v.as_integer().cloned().unwrap_or_default(), IntType::U8))
        })
        .unwrap();
        assert_eq!(root.lookup("b").unwrap().to_string(), "44");
    }

    #[test]
    fn test_snapshot_restore() {
        let root = Frame::root();
        root.define("a", Value::from(1), true, None).unwrap();
        let saved = root.snapshot();
        root.define("b", Value::from(2), true, None).unwrap();
        root.assign("a", Value::from(9), keep).unwrap();
        root.restore(saved);
        assert_eq!(root.lookup("a").unwrap(), Value::from(1));
        assert!(!root.has_local("b"));
    }
}
