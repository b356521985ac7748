//! Side channels for vendor data that has no canonical field
//!
//! The canonical schema is intentionally narrower than any single vendor.
//! Everything it cannot express travels here as an opaque serialized JSON
//! document under a string key, and is decoded again with a typed helper on
//! the way back out.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use super::vendor::Vendor;
use crate::error::TranscodeError;

/// Serialized JSON document carried without interpretation
///
/// The text is always normalized (compact, object keys sorted), so two
/// opaques holding equal JSON compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Opaque(String);

impl Opaque {
    /// Serialize a value into an opaque document
    pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Self, TranscodeError> {
        Ok(Self(serde_json::to_value(value)?.to_string()))
    }

    /// Wrap an already-parsed JSON value
    pub fn from_value(value: &Value) -> Self {
        Self(value.to_string())
    }

    /// Deserialize the document into a typed value
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, TranscodeError> {
        Ok(serde_json::from_str(&self.0)?)
    }

    /// Parse the document back into a JSON value
    pub fn to_value(&self) -> Result<Value, TranscodeError> {
        self.decode()
    }

    /// Normalized JSON text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[cfg(test)]
    pub(crate) fn from_text_unchecked(text: &str) -> Self {
        Self(text.to_owned())
    }
}

impl Serialize for Opaque {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let value: Value = serde_json::from_str(&self.0).map_err(serde::ser::Error::custom)?;
        value.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Opaque {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(|value| Self::from_value(&value))
    }
}

/// String-keyed bag of opaque values
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Extras(BTreeMap<String, Opaque>);

impl Extras {
    /// Create an empty bag
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether no keys are set
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of keys set
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Store an already-encoded value
    pub fn insert(&mut self, key: impl Into<String>, value: Opaque) {
        self.0.insert(key.into(), value);
    }

    /// Encode and store a value
    ///
    /// An encoding failure is logged and the key is left unset.
    pub fn insert_value<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) {
        match Opaque::encode(value) {
            Ok(opaque) => {
                self.0.insert(key.to_owned(), opaque);
            }
            Err(error) => tracing::warn!(field = key, %error, "dropping extra that failed to encode"),
        }
    }

    /// Encode and store a value when present
    pub fn insert_opt<T: Serialize>(&mut self, key: &str, value: Option<&T>) {
        if let Some(value) = value {
            self.insert_value(key, value);
        }
    }

    /// Raw access to a stored value
    pub fn get(&self, key: &str) -> Option<&Opaque> {
        self.0.get(key)
    }

    /// Decode a stored value
    ///
    /// A value that does not decode into `T` is logged and treated as absent.
    pub fn get_value<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let opaque = self.0.get(key)?;
        match opaque.decode() {
            Ok(value) => Some(value),
            Err(error) => {
                tracing::warn!(field = key, %error, "ignoring extra that failed to decode");
                None
            }
        }
    }

    /// Remove and return a stored value
    pub fn remove(&mut self, key: &str) -> Option<Opaque> {
        self.0.remove(key)
    }

    /// Whether a key is set
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Iterate over keys and values in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Opaque)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, Opaque)> for Extras {
    fn from_iter<I: IntoIterator<Item = (String, Opaque)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Vendor-specific request fields with no canonical equivalent
///
/// Only constructible non-empty, so a set of extras always names its vendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorExtras {
    /// Vendor the values were captured from
    pub source: Vendor,
    /// Captured values
    pub values: Extras,
}

impl VendorExtras {
    /// Wrap captured values, returning `None` when nothing was captured
    pub fn new(source: Vendor, values: Extras) -> Option<Self> {
        if values.is_empty() {
            None
        } else {
            Some(Self { source, values })
        }
    }

    /// Values captured from `vendor`, if that is where they came from
    pub fn values_for(&self, vendor: Vendor) -> Option<&Extras> {
        (self.source == vendor).then_some(&self.values)
    }
}

/// An original vendor structure captured for lossless replay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorRaw {
    /// Vendor whose wire shape `data` holds
    pub vendor: Vendor,
    /// The serialized structure
    pub data: Opaque,
}

impl VendorRaw {
    /// Capture a wire structure, logging and returning `None` on failure
    pub fn capture<T: Serialize + ?Sized>(vendor: Vendor, value: &T) -> Option<Self> {
        match Opaque::encode(value) {
            Ok(data) => Some(Self { vendor, data }),
            Err(error) => {
                tracing::warn!(%vendor, %error, "failed to capture raw vendor structure");
                None
            }
        }
    }

    /// Decode the captured structure when it belongs to `vendor`
    ///
    /// Returns `None` for another vendor's structure, and for a structure that
    /// no longer decodes (logged), so callers fall back to rebuilding.
    pub fn replay<T: DeserializeOwned>(raw: Option<&Self>, vendor: Vendor) -> Option<T> {
        let raw = raw.filter(|raw| raw.vendor == vendor)?;
        match raw.data.decode() {
            Ok(value) => Some(value),
            Err(error) => {
                tracing::warn!(%vendor, %error, "captured raw structure did not decode, rebuilding");
                None
            }
        }
    }
}

/// Per-vendor namespaced extension bags attached to stream events
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Extensions(BTreeMap<Vendor, Extras>);

impl Extensions {
    /// Whether no namespace holds any value
    pub fn is_empty(&self) -> bool {
        self.0.values().all(Extras::is_empty)
    }

    /// Store a value under a vendor namespace
    pub fn insert(&mut self, vendor: Vendor, key: impl Into<String>, value: Opaque) {
        self.0.entry(vendor).or_default().insert(key, value);
    }

    /// The bag for one vendor
    pub fn vendor(&self, vendor: Vendor) -> Option<&Extras> {
        self.0.get(&vendor)
    }

    /// Decode a value stored under a vendor namespace
    pub fn get_value<T: DeserializeOwned>(&self, vendor: Vendor, key: &str) -> Option<T> {
        self.0.get(&vendor)?.get_value(key)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn opaque_equality_ignores_key_order() {
        let a = Opaque::from_value(&json!({"b": 1, "a": [true, null]}));
        let b: Opaque = serde_json::from_str(r#"{"a":[true,null],"b":1}"#).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), r#"{"a":[true,null],"b":1}"#);
    }

    #[test]
    fn opaque_serializes_as_embedded_json() {
        let mut extras = Extras::new();
        extras.insert_value("cache_control", &json!({"type": "ephemeral"}));
        let out = serde_json::to_value(&extras).unwrap();
        assert_eq!(out, json!({"cache_control": {"type": "ephemeral"}}));
    }

    #[test]
    fn get_value_with_wrong_type_is_absent() {
        let mut extras = Extras::new();
        extras.insert_value("count", &"not a number");
        assert_eq!(extras.get_value::<u32>("count"), None);
        assert_eq!(extras.get_value::<String>("count").as_deref(), Some("not a number"));
    }

    #[test]
    fn vendor_extras_never_empty() {
        assert!(VendorExtras::new(Vendor::Anthropic, Extras::new()).is_none());

        let mut values = Extras::new();
        values.insert_value("service_tier", &"auto");
        let extras = VendorExtras::new(Vendor::Anthropic, values).unwrap();
        assert!(extras.values_for(Vendor::Anthropic).is_some());
        assert!(extras.values_for(Vendor::OpenAi).is_none());
    }

    #[test]
    fn raw_replay_respects_vendor() {
        let raw = VendorRaw::capture(Vendor::Anthropic, &json!({"type": "text", "text": "hi"}));
        let replayed: Option<Value> = VendorRaw::replay(raw.as_ref(), Vendor::Anthropic);
        assert_eq!(replayed, Some(json!({"type": "text", "text": "hi"})));

        let other: Option<Value> = VendorRaw::replay(raw.as_ref(), Vendor::OpenAi);
        assert!(other.is_none());
    }

    #[test]
    fn extensions_namespace_by_vendor() {
        let mut extensions = Extensions::default();
        assert!(extensions.is_empty());
        extensions.insert(Vendor::Anthropic, "message", Opaque::from_value(&json!({"id": "msg_1"})));
        let message: Option<Value> = extensions.get_value(Vendor::Anthropic, "message");
        assert_eq!(message, Some(json!({"id": "msg_1"})));
        assert!(extensions.vendor(Vendor::OpenAi).is_none());
        assert_eq!(
            serde_json::to_value(&extensions).unwrap(),
            json!({"anthropic": {"message": {"id": "msg_1"}}})
        );
    }
}
