//! Thin wrappers around [ciborium] so the rest of the crate deals with a
//! single CBOR error type.

use std::io::Cursor;

use serde::{de::DeserializeOwned, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum CborError {
    #[error("cbor encoding failed: {0}")]
    Encode(String),
    #[error("cbor decoding failed: {0}")]
    Decode(String),
}

/// Encode `value` as CBOR, preserving the field and map order of the
/// serialized value.
pub fn to_vec<T>(value: &T) -> Result<Vec<u8>, CborError>
where
    T: Serialize + ?Sized,
{
    let mut buf = Vec::new();
    ciborium::ser::into_writer(value, &mut buf).map_err(|e| CborError::Encode(e.to_string()))?;
    Ok(buf)
}

pub fn from_slice<T>(slice: &[u8]) -> Result<T, CborError>
where
    T: DeserializeOwned,
{
    ciborium::de::from_reader(Cursor::new(slice)).map_err(|e| CborError::Decode(e.to_string()))
}

/// Convert any serializable value into a [ciborium::Value] tree.
pub fn to_value<T>(value: &T) -> Result<ciborium::Value, CborError>
where
    T: Serialize + ?Sized,
{
    ciborium::Value::serialized(value).map_err(|e| CborError::Encode(e.to_string()))
}
