use std::{any::TypeId, cell::RefCell, collections::HashMap, fmt, rc::Rc};

use super::foreign::ForeignValue;

/// Shared handle to a sequence of values.
pub type ListRef = Rc<RefCell<Vec<Value>>>;

/// Shared handle to a string-keyed mapping.
pub type MapRef = Rc<RefCell<HashMap<String, Value>>>;

/// A primitive carried behind a shared handle.
///
/// The identity-bearing analog of a boxed primitive wrapper; the serializer
/// unboxes it to its literal value before any identity bookkeeping.
#[derive(Debug, Clone, PartialEq)]
pub enum Boxed {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

/// A node in a value graph.
///
/// Composite variants hold shared handles: cloning a `Value` shares the
/// underlying list, map or foreign instance, which is how callers express
/// repeated references and cycles.
///
/// `PartialEq` and `Debug` walk the graph structurally and must not be used
/// on cyclic values.
#[derive(Clone)]
pub enum Value {
    /// Explicit absence of a value; distinct from `Null`.
    Absent,
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// A primitive wrapper with its own identity.
    Boxed(Rc<Boxed>),
    List(ListRef),
    Map(MapRef),
    /// A user-defined runtime instance.
    Foreign(Rc<dyn ForeignValue>),
}

impl Value {
    /// Creates an empty shared list.
    pub fn list() -> Self {
        Value::List(Rc::new(RefCell::new(Vec::new())))
    }

    /// Creates a shared list from the given items.
    pub fn list_from(items: impl IntoIterator<Item = Value>) -> Self {
        Value::List(Rc::new(RefCell::new(items.into_iter().collect())))
    }

    /// Creates an empty shared mapping.
    pub fn map() -> Self {
        Value::Map(Rc::new(RefCell::new(HashMap::new())))
    }

    /// Creates a shared mapping from the given entries.
    pub fn map_from<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Map(Rc::new(RefCell::new(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value))
                .collect(),
        )))
    }

    /// Wraps a foreign instance.
    pub fn foreign<T: ForeignValue>(value: T) -> Self {
        Value::Foreign(Rc::new(value))
    }

    /// Wraps a primitive behind an identity-bearing handle.
    pub fn boxed(value: Boxed) -> Self {
        Value::Boxed(Rc::new(value))
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_list(&self) -> Option<&ListRef> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&MapRef> {
        match self {
            Value::Map(fields) => Some(fields),
            _ => None,
        }
    }

    /// Downcasts a `Foreign` value to its concrete type.
    pub fn downcast_foreign<T: 'static>(&self) -> Option<&T> {
        match self {
            Value::Foreign(foreign) => foreign.as_any().downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Field of a `Map` value, cloned out of the shared handle.
    pub fn field(&self, key: &str) -> Option<Value> {
        self.as_map().and_then(|fields| fields.borrow().get(key).cloned())
    }

    /// Element of a `List` value, cloned out of the shared handle.
    pub fn item(&self, index: usize) -> Option<Value> {
        self.as_list().and_then(|items| items.borrow().get(index).cloned())
    }

    /// Inserts into a `Map` value; returns `false` for other variants.
    pub fn insert(&self, key: impl Into<String>, value: Value) -> bool {
        match self {
            Value::Map(fields) => {
                fields.borrow_mut().insert(key.into(), value);
                true
            }
            _ => false,
        }
    }

    /// Appends to a `List` value; returns `false` for other variants.
    pub fn push(&self, value: Value) -> bool {
        match self {
            Value::List(items) => {
                items.borrow_mut().push(value);
                true
            }
            _ => false,
        }
    }

    /// Intrinsic runtime type name, as carried in wire envelopes.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Absent => "Absent",
            Value::Null => "Null",
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Int",
            Value::Float(_) => "Float",
            Value::Str(_) => "Str",
            Value::Boxed(_) => "Boxed",
            Value::List(_) => "List",
            Value::Map(_) => "Map",
            Value::Foreign(foreign) => foreign.type_name(),
        }
    }

    /// Identity key of a composite value, stable while the handle lives.
    ///
    /// Two values share an identity exactly when they share a handle;
    /// structurally equal but distinct composites never do.
    pub fn identity(&self) -> Option<usize> {
        match self {
            Value::List(items) => Some(Rc::as_ptr(items) as usize),
            Value::Map(fields) => Some(Rc::as_ptr(fields) as usize),
            Value::Foreign(foreign) => Some(Rc::as_ptr(foreign) as *const () as usize),
            _ => None,
        }
    }

    /// True when both values are composites sharing the same handle.
    pub fn same_identity(a: &Value, b: &Value) -> bool {
        matches!((a.identity(), b.identity()), (Some(x), Some(y)) if x == y)
    }

    /// Runtime type of the instance for registry lookup purposes.
    ///
    /// Primitives and boxed primitives resolve to their representation
    /// type; lists, maps and the null-likes have no registrable type.
    pub(crate) fn runtime_type_id(&self) -> Option<TypeId> {
        match self {
            Value::Foreign(foreign) => Some(foreign.as_any().type_id()),
            Value::Bool(_) => Some(TypeId::of::<bool>()),
            Value::Int(_) => Some(TypeId::of::<i64>()),
            Value::Float(_) => Some(TypeId::of::<f64>()),
            Value::Str(_) => Some(TypeId::of::<String>()),
            Value::Boxed(boxed) => Some(match boxed.as_ref() {
                Boxed::Bool(_) => TypeId::of::<bool>(),
                Boxed::Int(_) => TypeId::of::<i64>(),
                Boxed::Float(_) => TypeId::of::<f64>(),
                Boxed::Str(_) => TypeId::of::<String>(),
            }),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Absent, Value::Absent) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Boxed(a), Value::Boxed(b)) => a == b,
            (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow(),
            (Value::Map(a), Value::Map(b)) => Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow(),
            (Value::Foreign(a), Value::Foreign(b)) => a.eq_foreign(b.as_ref()),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Absent => write!(f, "Absent"),
            Value::Null => write!(f, "Null"),
            Value::Bool(v) => write!(f, "Bool({v})"),
            Value::Int(v) => write!(f, "Int({v})"),
            Value::Float(v) => write!(f, "Float({v})"),
            Value::Str(v) => write!(f, "Str({v:?})"),
            Value::Boxed(v) => write!(f, "Boxed({:?})", v.as_ref()),
            Value::List(items) => f.debug_tuple("List").field(&*items.borrow()).finish(),
            Value::Map(fields) => f.debug_tuple("Map").field(&*fields.borrow()).finish(),
            Value::Foreign(foreign) => write!(f, "Foreign({})", foreign.type_name()),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Cloning a composite shares its handle and therefore its identity.
    #[test]
    fn test_clone_shares_identity() {
        let list = Value::list_from(vec![Value::Int(1)]);
        let alias = list.clone();
        assert!(Value::same_identity(&list, &alias));

        alias.push(Value::Int(2));
        assert_eq!(list.item(1), Some(Value::Int(2)));
    }

    /// Structurally equal but distinct composites never share an identity.
    #[test]
    fn test_distinct_composites_have_distinct_identity() {
        let a = Value::map_from(vec![("x", Value::Int(1))]);
        let b = Value::map_from(vec![("x", Value::Int(1))]);
        assert_eq!(a, b);
        assert!(!Value::same_identity(&a, &b));
    }

    /// Primitives carry no identity at all.
    #[test]
    fn test_primitives_have_no_identity() {
        assert!(Value::Int(5).identity().is_none());
        assert!(Value::from("foo").identity().is_none());
        assert!(Value::Null.identity().is_none());
    }

    #[test]
    fn test_absent_and_null_are_distinct() {
        assert_ne!(Value::Absent, Value::Null);
        assert!(Value::Absent.is_absent());
        assert!(!Value::Null.is_absent());
    }

    /// Boxed primitives resolve to their representation type.
    #[test]
    fn test_boxed_runtime_type() {
        let boxed = Value::boxed(Boxed::Int(42));
        assert_eq!(boxed.runtime_type_id(), Some(TypeId::of::<i64>()));
    }
}
