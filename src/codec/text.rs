use serde_json::Value as Json;

use super::{DeserializeOptions, SerializeOptions, Serializer};
use crate::{
    error::{DeserializeResult, SerializeResult},
    value::Value,
};

impl Serializer {
    /// Serializes a value graph and encodes the tree as JSON text.
    ///
    /// Absence has no text form and yields `None`.
    pub fn to_text(
        &self,
        value: &Value,
        options: &SerializeOptions,
    ) -> SerializeResult<Option<String>> {
        match self.serialize(value, options)? {
            Some(tree) => Ok(Some(serde_json::to_string(&tree)?)),
            None => Ok(None),
        }
    }

    /// Decodes JSON text and rebuilds the value graph.
    pub fn from_text(&self, text: &str, options: &DeserializeOptions) -> DeserializeResult<Value> {
        let tree: Json = serde_json::from_str(text)?;
        self.deserialize(&tree, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Text round trip through both engines.
    #[test]
    fn test_text_roundtrip() {
        let serializer = Serializer::new();
        let value = Value::map_from(vec![
            ("num", Value::Int(123)),
            ("items", Value::list_from(vec![Value::from("a"), Value::Null])),
        ]);

        let wrap = SerializeOptions {
            wrap: true,
            ..SerializeOptions::default()
        };
        let text = serializer.to_text(&value, &wrap).unwrap().unwrap();
        let back = serializer
            .from_text(&text, &DeserializeOptions { unwrap: true })
            .unwrap();
        assert_eq!(back, value);
    }

    /// Absence has no text form.
    #[test]
    fn test_absent_has_no_text() {
        let serializer = Serializer::new();
        let text = serializer
            .to_text(&Value::Absent, &SerializeOptions::default())
            .unwrap();
        assert_eq!(text, None);
    }

    /// Broken text surfaces as a decode error.
    #[test]
    fn test_invalid_text_fails() {
        let serializer = Serializer::new();
        let result = serializer.from_text("{not json", &DeserializeOptions::default());
        assert!(result.is_err());
    }
}
