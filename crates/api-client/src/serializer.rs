//! Wire encoding of lookups and results
//!
//! Families map their typed lookups to a [`serde_json::Value`] tree and hand
//! it to a [`Serializer`] for the bytes on the wire. Swapping the serializer
//! changes the encoding without touching the family types.

use crate::error::{ApiError, ApiResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Converts value trees to and from wire payloads
pub trait Serializer: Send + Sync {
    /// Encode `value` into a request body
    fn serialize(&self, value: &Value) -> ApiResult<Vec<u8>>;

    /// Decode a response body
    fn deserialize(&self, payload: &[u8]) -> ApiResult<Value>;
}

/// Compact JSON encoding
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl Serializer for JsonSerializer {
    fn serialize(&self, value: &Value) -> ApiResult<Vec<u8>> {
        if value.is_null() {
            return Err(ApiError::serialization("the object to be serialized is nil"));
        }
        Ok(serde_json::to_vec(value)?)
    }

    fn deserialize(&self, payload: &[u8]) -> ApiResult<Value> {
        if payload.iter().all(u8::is_ascii_whitespace) {
            return Err(ApiError::serialization("the payload is empty"));
        }
        serde_json::from_slice(payload)
            .map_err(|e| ApiError::serialization(format!("malformed payload: {e}")))
    }
}

/// Encode a typed value through `serializer`
pub fn encode<T: Serialize + ?Sized>(serializer: &dyn Serializer, value: &T) -> ApiResult<Vec<u8>> {
    let tree = serde_json::to_value(value)
        .map_err(|e| ApiError::serialization(format!("unsupported value: {e}")))?;
    serializer.serialize(&tree)
}

/// Decode a payload through `serializer` into a typed value
pub fn decode<T: DeserializeOwned>(serializer: &dyn Serializer, payload: &[u8]) -> ApiResult<T> {
    let tree = serializer.deserialize(payload)?;
    serde_json::from_value(tree)
        .map_err(|e| ApiError::serialization(format!("unexpected response shape: {e}")))
}
