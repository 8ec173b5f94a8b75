//! Wire-node shapes: identity envelopes and references.
//!
//! An envelope declares an identity once: `{"_xId": 3, "_xt": "Map",
//! "_xv": {…}}`. A reference points at a declared identity from anywhere
//! else in the tree: `{"_xIdRef": 3}`. Nodes carrying none of these keys
//! are plain data.

use std::collections::HashSet;

use serde_json::{Map, Value as Json};

/// Envelope key carrying the assigned identity.
pub const ID_KEY: &str = "_xId";
/// Envelope key carrying the intrinsic type name.
pub const TYPE_KEY: &str = "_xt";
/// Envelope key carrying the converted payload.
pub const VALUE_KEY: &str = "_xv";
/// Reference key pointing at a previously assigned identity.
pub const REF_KEY: &str = "_xIdRef";

/// True when the node carries any identity marker.
pub fn is_marked(node: &Json) -> bool {
    node.as_object().is_some_and(|fields| {
        fields.contains_key(ID_KEY)
            || fields.contains_key(TYPE_KEY)
            || fields.contains_key(VALUE_KEY)
            || fields.contains_key(REF_KEY)
    })
}

/// True when the node is a reference.
pub fn is_reference(node: &Json) -> bool {
    node.as_object().is_some_and(|fields| fields.contains_key(REF_KEY))
}

/// Builds an envelope node.
pub fn envelope(id: u64, type_name: &str, payload: Json) -> Json {
    let mut fields = Map::new();
    fields.insert(ID_KEY.to_string(), Json::from(id));
    fields.insert(TYPE_KEY.to_string(), Json::from(type_name));
    fields.insert(VALUE_KEY.to_string(), payload);
    Json::Object(fields)
}

/// Builds a reference node.
pub fn reference(id: u64) -> Json {
    let mut fields = Map::new();
    fields.insert(REF_KEY.to_string(), Json::from(id));
    Json::Object(fields)
}

/// Collects every id declared by an envelope reachable through payload
/// chains.
///
/// Only envelope payloads are walked: references may legally point nowhere
/// else, and unmarked containers are plain data by definition.
pub(crate) fn collect_declared_ids(node: &Json, ids: &mut HashSet<u64>) {
    let Some(fields) = node.as_object() else {
        return;
    };
    if let Some(id) = fields.get(ID_KEY).and_then(Json::as_u64) {
        ids.insert(id);
    }
    match fields.get(VALUE_KEY) {
        Some(Json::Array(items)) => {
            for item in items {
                collect_declared_ids(item, ids);
            }
        }
        Some(Json::Object(payload)) => {
            for field in payload.values() {
                collect_declared_ids(field, ids);
            }
        }
        _ => {}
    }
}
