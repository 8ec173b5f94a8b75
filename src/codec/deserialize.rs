use std::{
    cell::RefCell,
    collections::{HashMap, HashSet},
    rc::Rc,
};

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use tracing::trace;

use super::{wire, Serializer};
use crate::{
    error::{DeserializeError, DeserializeResult},
    registry::{TypeDescriptor, TypeSelector},
    value::{ListRef, MapRef, Value},
};

/// Options recognized by [`Serializer::deserialize`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeserializeOptions {
    /// Interpret identity envelopes; off means plain structural conversion.
    pub unwrap: bool,
}

/// Outcome of rebuilding one wire node.
///
/// `Pending` stands in for a value whose envelope has not finished building
/// yet (a forward or cyclic reference); the real value arrives through a
/// deferred patch once the whole tree is materialized.
enum Resolution {
    Resolved(Value),
    Pending(u64),
}

/// Where a deferred patch writes its resolved value.
enum PatchSlot {
    ListIndex(ListRef, usize),
    MapKey(MapRef, String),
}

struct Patch {
    slot: PatchSlot,
    id: u64,
}

/// Scratch state scoped to one top-level deserialize call.
#[derive(Default)]
struct DeserializeContext {
    /// Ids declared by envelopes anywhere in the tree (pre-scan).
    declared: HashSet<u64>,
    /// Instances finished so far, by id.
    instances: HashMap<u64, Value>,
    /// Deferred writes, flushed once in registration order.
    patches: Vec<Patch>,
}

impl DeserializeContext {
    /// Runs every deferred patch exactly once, in registration order, so
    /// each one writes into a fully constructed target.
    fn flush(&mut self) -> DeserializeResult<()> {
        trace!(count = self.patches.len(), "flushing deferred patches");
        let patches = std::mem::take(&mut self.patches);
        for patch in patches {
            let value = self
                .instances
                .get(&patch.id)
                .cloned()
                .ok_or(DeserializeError::UnresolvedRef(patch.id))?;
            match patch.slot {
                PatchSlot::ListIndex(items, index) => items.borrow_mut()[index] = value,
                PatchSlot::MapKey(fields, key) => {
                    fields.borrow_mut().insert(key, value);
                }
            }
        }
        Ok(())
    }
}

impl Serializer {
    /// Rebuilds a value graph from a plain JSON tree.
    ///
    /// Shared references resolve to the same reconstructed instance; cycles
    /// are restored through deferred patches that run only after the whole
    /// tree is built. Malformed envelopes and dangling references fail fast.
    pub fn deserialize(
        &self,
        tree: &Json,
        options: &DeserializeOptions,
    ) -> DeserializeResult<Value> {
        if !options.unwrap {
            return Ok(plain_to_value(tree));
        }
        let mut ctx = DeserializeContext::default();
        wire::collect_declared_ids(tree, &mut ctx.declared);
        match self.deserialize_node(tree, &mut ctx)? {
            Resolution::Resolved(value) => {
                ctx.flush()?;
                Ok(value)
            }
            Resolution::Pending(id) => Err(DeserializeError::MalformedNode(format!(
                "the root node is a bare reference to id {id}"
            ))),
        }
    }

    fn deserialize_node(
        &self,
        node: &Json,
        ctx: &mut DeserializeContext,
    ) -> DeserializeResult<Resolution> {
        // nodes without identity markers are plain data by definition
        if !wire::is_marked(node) {
            return Ok(Resolution::Resolved(plain_to_value(node)));
        }
        let fields = node.as_object().expect("marked nodes are objects");

        if let Some(reference) = fields.get(wire::REF_KEY) {
            let id = reference.as_u64().ok_or_else(|| {
                DeserializeError::MalformedNode(
                    "reference id must be an unsigned integer".to_string(),
                )
            })?;
            if let Some(instance) = ctx.instances.get(&id) {
                return Ok(Resolution::Resolved(instance.clone()));
            }
            if ctx.declared.contains(&id) {
                trace!(id, "forward reference, deferring resolution");
                return Ok(Resolution::Pending(id));
            }
            return Err(DeserializeError::UnknownRef(id));
        }

        // an envelope must carry all three of its declared members
        let id = fields
            .get(wire::ID_KEY)
            .and_then(Json::as_u64)
            .ok_or_else(|| {
                DeserializeError::MalformedNode("envelope is missing a numeric `_xId`".to_string())
            })?;
        let type_name = fields
            .get(wire::TYPE_KEY)
            .and_then(Json::as_str)
            .ok_or_else(|| {
                DeserializeError::MalformedNode("envelope is missing a string `_xt`".to_string())
            })?;
        let payload = fields.get(wire::VALUE_KEY).ok_or_else(|| {
            DeserializeError::MalformedNode("envelope is missing its `_xv` payload".to_string())
        })?;

        let descriptor = self.registry().resolve(TypeSelector::Name(type_name));
        let instance = if let Some(hook) = descriptor.and_then(TypeDescriptor::to_internal) {
            // the hook owns full reconstruction of its payload
            hook(payload)?
        } else {
            match payload {
                Json::Array(items) => self.build_list(items, ctx)?,
                Json::Object(payload_fields) => self.build_map(payload_fields, ctx)?,
                primitive => plain_to_value(primitive),
            }
        };

        // record before returning so later references share this instance
        // and self-referential patches find their target
        ctx.instances.insert(id, instance.clone());
        Ok(Resolution::Resolved(instance))
    }

    fn build_list(
        &self,
        items: &[Json],
        ctx: &mut DeserializeContext,
    ) -> DeserializeResult<Value> {
        let handle: ListRef = Rc::new(RefCell::new(Vec::with_capacity(items.len())));
        for (index, item) in items.iter().enumerate() {
            match self.deserialize_node(item, ctx)? {
                Resolution::Resolved(value) => handle.borrow_mut().push(value),
                Resolution::Pending(id) => {
                    // the placeholder keeps sibling indices stable until the
                    // patch overwrites it
                    handle.borrow_mut().push(Value::Absent);
                    ctx.patches.push(Patch {
                        slot: PatchSlot::ListIndex(handle.clone(), index),
                        id,
                    });
                }
            }
        }
        Ok(Value::List(handle))
    }

    fn build_map(
        &self,
        payload: &serde_json::Map<String, Json>,
        ctx: &mut DeserializeContext,
    ) -> DeserializeResult<Value> {
        let handle: MapRef = Rc::new(RefCell::new(HashMap::with_capacity(payload.len())));
        for (key, field) in payload {
            match self.deserialize_node(field, ctx)? {
                Resolution::Resolved(value) => {
                    handle.borrow_mut().insert(key.clone(), value);
                }
                Resolution::Pending(id) => {
                    handle.borrow_mut().insert(key.clone(), Value::Absent);
                    ctx.patches.push(Patch {
                        slot: PatchSlot::MapKey(handle.clone(), key.clone()),
                        id,
                    });
                }
            }
        }
        Ok(Value::Map(handle))
    }
}

/// Structural conversion of plain JSON with no envelope interpretation.
fn plain_to_value(node: &Json) -> Value {
    match node {
        Json::Null => Value::Null,
        Json::Bool(v) => Value::Bool(*v),
        Json::Number(number) => number
            .as_i64()
            .map(Value::Int)
            .or_else(|| number.as_f64().map(Value::Float))
            .unwrap_or(Value::Null),
        Json::String(v) => Value::Str(v.clone()),
        Json::Array(items) => Value::list_from(items.iter().map(plain_to_value)),
        Json::Object(fields) => Value::map_from(
            fields
                .iter()
                .map(|(key, field)| (key.clone(), plain_to_value(field))),
        ),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn unwrap_options() -> DeserializeOptions {
        DeserializeOptions { unwrap: true }
    }

    /// Without `unwrap` the tree converts structurally, markers included.
    #[test]
    fn test_pass_through_mode() {
        let serializer = Serializer::new();
        let tree = json!({"foo": [1, 2.5, "bar", null]});
        let value = serializer
            .deserialize(&tree, &DeserializeOptions::default())
            .unwrap();
        assert_eq!(
            value.field("foo").unwrap(),
            Value::list_from(vec![
                Value::Int(1),
                Value::Float(2.5),
                Value::from("bar"),
                Value::Null,
            ])
        );
    }

    /// An envelope with a missing member is rejected outright.
    #[test]
    fn test_malformed_envelope_fails_fast() {
        let serializer = Serializer::new();
        for tree in [
            json!({"_xId": 1, "_xt": "Map"}),
            json!({"_xId": "one", "_xt": "Map", "_xv": {}}),
            json!({"_xt": "Map", "_xv": {}}),
            json!({"_xId": 1, "_xv": {}}),
        ] {
            let err = serializer.deserialize(&tree, &unwrap_options()).unwrap_err();
            assert!(matches!(err, DeserializeError::MalformedNode(_)), "{tree}");
        }
    }

    /// A reference to an id no envelope declares is a defect in the input.
    #[test]
    fn test_unknown_reference_fails_fast() {
        let serializer = Serializer::new();
        let tree = json!({"_xId": 1, "_xt": "Map", "_xv": {"dangling": {"_xIdRef": 42}}});
        let err = serializer.deserialize(&tree, &unwrap_options()).unwrap_err();
        assert!(matches!(err, DeserializeError::UnknownRef(42)));
    }

    /// A bare reference at the root has no envelope to resolve against.
    #[test]
    fn test_bare_reference_root_is_malformed() {
        let serializer = Serializer::new();
        let err = serializer
            .deserialize(&json!({"_xIdRef": 1}), &unwrap_options())
            .unwrap_err();
        assert!(matches!(err, DeserializeError::UnknownRef(1)));
    }

    /// Numbers split into integers and floats on the graph side.
    #[test]
    fn test_plain_number_conversion() {
        assert_eq!(plain_to_value(&json!(7)), Value::Int(7));
        assert_eq!(plain_to_value(&json!(7.5)), Value::Float(7.5));
    }
}
