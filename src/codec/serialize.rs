use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};
use tracing::trace;

use super::{wire, Serializer};
use crate::{
    error::{SerializeError, SerializeResult},
    registry::{TypeDescriptor, TypeSelector},
    value::{Boxed, Value},
};

/// Options recognized by [`Serializer::serialize`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerializeOptions {
    /// Emit identity envelopes; required for shared-reference and cycle
    /// support.
    pub wrap: bool,
    /// Permit true cycles; only effective together with `wrap`.
    pub support_circular_dependency: bool,
    /// Omit absent fields from mappings instead of keeping `null` slots.
    pub skip_undefined: bool,
}

/// Scratch state scoped to one top-level serialize call.
///
/// Threaded through every recursive step and discarded at call return;
/// never shared between calls.
#[derive(Default)]
struct SerializeContext {
    next_id: u64,
    /// Identity of every composite seen so far, with its assigned id.
    ids: HashMap<usize, u64>,
    /// Identities on the current descent branch.
    branch: Vec<usize>,
}

impl SerializeContext {
    fn assign(&mut self, identity: usize) -> u64 {
        self.next_id += 1;
        self.ids.insert(identity, self.next_id);
        self.next_id
    }
}

impl Serializer {
    /// Converts a value graph into a plain JSON tree.
    ///
    /// Returns `Ok(None)` when the value has no serialized form: explicit
    /// absence, or an unconvertible foreign instance. Fails with
    /// [`SerializeError::CircularDependency`] when a value is reachable from
    /// itself and cycle support is not enabled.
    pub fn serialize(
        &self,
        value: &Value,
        options: &SerializeOptions,
    ) -> SerializeResult<Option<Json>> {
        let mut ctx = SerializeContext::default();
        self.serialize_node(value, options, &mut ctx)
    }

    fn serialize_node(
        &self,
        value: &Value,
        options: &SerializeOptions,
        ctx: &mut SerializeContext,
    ) -> SerializeResult<Option<Json>> {
        match value {
            Value::Absent => Ok(None),
            Value::Null => Ok(Some(Json::Null)),
            Value::Bool(v) => Ok(Some(Json::from(*v))),
            Value::Int(v) => Ok(Some(Json::from(*v))),
            Value::Float(v) => Ok(Some(float_to_json(*v))),
            Value::Str(v) => Ok(Some(Json::from(v.as_str()))),
            // primitive wrappers decay to their literal, identity and all
            Value::Boxed(boxed) => Ok(Some(match boxed.as_ref() {
                Boxed::Bool(v) => Json::from(*v),
                Boxed::Int(v) => Json::from(*v),
                Boxed::Float(v) => float_to_json(*v),
                Boxed::Str(v) => Json::from(v.as_str()),
            })),
            Value::List(_) | Value::Map(_) | Value::Foreign(_) => {
                self.serialize_composite(value, options, ctx)
            }
        }
    }

    fn serialize_composite(
        &self,
        value: &Value,
        options: &SerializeOptions,
        ctx: &mut SerializeContext,
    ) -> SerializeResult<Option<Json>> {
        let descriptor = self.registry().resolve(TypeSelector::Instance(value));

        // values nothing knows how to convert serialize to absence, before
        // any identity is assigned
        if let Value::Foreign(foreign) = value {
            let has_hook = descriptor.is_some_and(|d| d.to_external().is_some());
            if !has_hook && foreign.to_plain().is_none() {
                return Ok(None);
            }
        }

        let identity = value
            .identity()
            .expect("composite values always carry an identity");

        if let Some(&id) = ctx.ids.get(&identity) {
            if ctx.branch.contains(&identity)
                && !(options.wrap && options.support_circular_dependency)
            {
                return Err(SerializeError::CircularDependency);
            }
            if options.wrap {
                trace!(id, "emitting reference to an already serialized value");
                return Ok(Some(wire::reference(id)));
            }
            // without wrapping, a repeated instance is re-serialized as an
            // independent structural copy
        }

        let id = ctx.assign(identity);
        ctx.branch.push(identity);
        trace!(id, type_name = value.type_name(), "assigned identity");

        let payload = self.convert(value, descriptor, options, ctx)?;

        ctx.branch.pop();

        if options.wrap {
            Ok(Some(wire::envelope(id, value.type_name(), payload)))
        } else {
            Ok(Some(payload))
        }
    }

    /// Conversion dispatch: registered hook, then the instance's native
    /// conversion, then the structural rules.
    fn convert(
        &self,
        value: &Value,
        descriptor: Option<&TypeDescriptor>,
        options: &SerializeOptions,
        ctx: &mut SerializeContext,
    ) -> SerializeResult<Json> {
        if let Some(hook) = descriptor.and_then(TypeDescriptor::to_external) {
            return hook(value, options, self);
        }
        match value {
            Value::Foreign(foreign) => Ok(foreign.to_plain().unwrap_or(Json::Null)),
            Value::List(items) => {
                let items = items.borrow();
                let mut out = Vec::with_capacity(items.len());
                for item in items.iter() {
                    // absent elements stay as explicit empty slots
                    let slot = self.serialize_node(item, options, ctx)?.unwrap_or(Json::Null);
                    out.push(slot);
                }
                Ok(Json::Array(out))
            }
            Value::Map(fields) => {
                let fields = fields.borrow();
                let mut out = Map::with_capacity(fields.len());
                for (key, field) in fields.iter() {
                    match self.serialize_node(field, options, ctx)? {
                        Some(json) => {
                            out.insert(key.clone(), json);
                        }
                        None if options.skip_undefined => {}
                        None => {
                            out.insert(key.clone(), Json::Null);
                        }
                    }
                }
                Ok(Json::Object(out))
            }
            // non-composites never reach conversion
            _ => Ok(Json::Null),
        }
    }
}

/// JSON cannot carry NaN or infinities; they collapse to `null`.
fn float_to_json(value: f64) -> Json {
    serde_json::Number::from_f64(value).map_or(Json::Null, Json::Number)
}

#[cfg(test)]
mod tests {
    use std::any::Any;

    use serde_json::json;

    use super::*;
    use crate::value::ForeignValue;

    struct Opaque;

    impl ForeignValue for Opaque {
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn serialize(value: &Value, options: &SerializeOptions) -> Option<Json> {
        Serializer::new().serialize(value, options).unwrap()
    }

    /// Absence propagates as absence, null as null.
    #[test]
    fn test_absence_and_null() {
        let options = SerializeOptions::default();
        assert_eq!(serialize(&Value::Absent, &options), None);
        assert_eq!(serialize(&Value::Null, &options), Some(Json::Null));
    }

    /// A foreign instance with neither hook nor native conversion is
    /// absence, not an error.
    #[test]
    fn test_unconvertible_foreign_is_absent() {
        let options = SerializeOptions::default();
        assert_eq!(serialize(&Value::foreign(Opaque), &options), None);

        let wrapped = SerializeOptions {
            wrap: true,
            ..SerializeOptions::default()
        };
        assert_eq!(serialize(&Value::foreign(Opaque), &wrapped), None);
    }

    /// Unconvertible members disappear from containers: empty slots in
    /// lists, kept-as-null fields in maps.
    #[test]
    fn test_absent_members_in_containers() {
        let options = SerializeOptions::default();
        let list = Value::list_from(vec![Value::Int(1), Value::Absent, Value::Int(3)]);
        assert_eq!(serialize(&list, &options), Some(json!([1, null, 3])));

        let map = Value::map_from(vec![("foo", Value::from("bar")), ("baz", Value::Absent)]);
        assert_eq!(
            serialize(&map, &options),
            Some(json!({"foo": "bar", "baz": null}))
        );
    }

    /// Non-finite floats have no JSON form and collapse to null.
    #[test]
    fn test_non_finite_floats() {
        let options = SerializeOptions::default();
        assert_eq!(serialize(&Value::Float(f64::NAN), &options), Some(Json::Null));
        assert_eq!(
            serialize(&Value::Float(f64::INFINITY), &options),
            Some(Json::Null)
        );
    }
}
