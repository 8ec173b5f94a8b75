use std::any::{self, Any};

use chrono::{DateTime, Utc};
use serde_json::Value as Json;

/// A user-defined runtime instance embedded in a value graph.
///
/// Foreign values are opaque to the structural rules of the serializer: they
/// are converted through a registered [`TypeDescriptor`] hook or, failing
/// that, through the instance's own [`to_plain`] conversion. A registered
/// hook always wins over [`to_plain`]. An instance with neither serializes
/// to absence.
///
/// [`TypeDescriptor`]: crate::registry::TypeDescriptor
/// [`to_plain`]: ForeignValue::to_plain
pub trait ForeignValue: Any {
    /// Short runtime type name, carried in wire envelopes.
    fn type_name(&self) -> &'static str {
        short_type_name(any::type_name::<Self>())
    }

    /// Upcast used for downcasting to the concrete type.
    fn as_any(&self) -> &dyn Any;

    /// Native conversion to plain data, used when no hook is registered.
    fn to_plain(&self) -> Option<Json> {
        None
    }

    /// Structural comparison against another foreign instance.
    ///
    /// The default treats distinct instances as unequal; override it for
    /// types whose round-tripped copies should compare equal.
    fn eq_foreign(&self, _other: &dyn ForeignValue) -> bool {
        false
    }
}

impl ForeignValue for DateTime<Utc> {
    fn type_name(&self) -> &'static str {
        "DateTime"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn eq_foreign(&self, other: &dyn ForeignValue) -> bool {
        other
            .as_any()
            .downcast_ref::<DateTime<Utc>>()
            .is_some_and(|other| other == self)
    }
}

/// Strips the module path and generic parameters from a full type path.
pub(crate) fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Plainless;

    impl ForeignValue for Plainless {
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    /// The default type name is the short path segment of the concrete type.
    #[test]
    fn test_default_type_name_is_short() {
        assert_eq!(Plainless.type_name(), "Plainless");
    }

    #[test]
    fn test_short_type_name_strips_path_and_generics() {
        assert_eq!(short_type_name("a::b::Widget"), "Widget");
        assert_eq!(short_type_name("a::b::Widget<c::d::Inner>"), "Widget");
        assert_eq!(short_type_name("Widget"), "Widget");
    }

    /// Date instances compare structurally, other foreigns by the default.
    #[test]
    fn test_eq_foreign() {
        let a = Utc::now();
        let b = a;
        assert!(a.eq_foreign(&b));
        assert!(!Plainless.eq_foreign(&Plainless));
    }
}
