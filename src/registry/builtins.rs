use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value as Json;

use super::descriptor::TypeDescriptor;
use crate::{
    error::{DeserializeError, SerializeError},
    value::Value,
};

/// Built-in descriptor for date/time values.
///
/// Dates travel as millisecond timestamps; sub-millisecond precision is not
/// preserved.
pub(crate) fn datetime_descriptor() -> TypeDescriptor {
    TypeDescriptor::of::<DateTime<Utc>>()
        .named("DateTime")
        .with_to_external(|value, _options, _serializer| {
            let date = value.downcast_foreign::<DateTime<Utc>>().ok_or_else(|| {
                SerializeError::Hook("DateTime hook applied to a non-date value".to_string())
            })?;
            Ok(Json::from(date.timestamp_millis()))
        })
        .with_to_internal(|payload| {
            let millis = payload.as_i64().ok_or_else(|| {
                DeserializeError::MalformedNode(
                    "DateTime payload must be a millisecond timestamp".to_string(),
                )
            })?;
            let date = Utc.timestamp_millis_opt(millis).single().ok_or_else(|| {
                DeserializeError::MalformedNode(format!("timestamp {millis} is out of range"))
            })?;
            Ok(Value::foreign(date))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Timestamps convert both ways through the built-in hooks.
    #[test]
    fn test_datetime_hooks_roundtrip() {
        let descriptor = datetime_descriptor();
        let date = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();

        let serializer = crate::codec::Serializer::new();
        let options = crate::codec::SerializeOptions::default();
        let out = descriptor.to_external().unwrap()(&Value::foreign(date), &options, &serializer)
            .unwrap();
        assert_eq!(out, Json::from(1_700_000_000_123_i64));

        let back = descriptor.to_internal().unwrap()(&out).unwrap();
        assert_eq!(back.downcast_foreign::<DateTime<Utc>>(), Some(&date));
    }

    /// A non-numeric payload is rejected instead of producing a bogus date.
    #[test]
    fn test_datetime_rejects_bad_payload() {
        let descriptor = datetime_descriptor();
        let err = descriptor.to_internal().unwrap()(&Json::from("soon")).unwrap_err();
        assert!(matches!(err, DeserializeError::MalformedNode(_)));
    }
}
