use ciborium::tag::Required;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_bytes::ByteBuf;

use crate::cbor::{self, CborError};

/// CBOR tag number for an embedded CBOR data item (RFC 8949 §3.4.5.1).
pub const ENCODED_CBOR_TAG: u64 = 24;

/// A value together with its exact CBOR encoding, serialized as
/// `#6.24(bstr .cbor T)`.
///
/// The encoding is computed once, when the value is wrapped, and reused
/// verbatim afterwards. Digests taken over the serialized form therefore
/// stay valid for as long as the wrapper lives.
#[derive(Debug, Clone, PartialEq)]
pub struct Tag24<T> {
    inner: T,
    inner_bytes: Vec<u8>,
}

impl<T: Serialize> Tag24<T> {
    pub fn new(inner: T) -> Result<Self, CborError> {
        let inner_bytes = cbor::to_vec(&inner)?;
        Ok(Self { inner, inner_bytes })
    }
}

impl<T> Tag24<T> {
    /// The bytes carried inside the tagged byte string.
    pub fn inner_bytes(&self) -> &[u8] {
        &self.inner_bytes
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T> AsRef<T> for Tag24<T> {
    fn as_ref(&self) -> &T {
        &self.inner
    }
}

impl<T> Serialize for Tag24<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Required::<&serde_bytes::Bytes, ENCODED_CBOR_TAG>(serde_bytes::Bytes::new(
            &self.inner_bytes,
        ))
        .serialize(serializer)
    }
}

impl<'de, T: de::DeserializeOwned> Deserialize<'de> for Tag24<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let Required(bytes) = Required::<ByteBuf, ENCODED_CBOR_TAG>::deserialize(deserializer)?;
        let inner_bytes = bytes.into_vec();
        let inner = cbor::from_slice(&inner_bytes).map_err(de::Error::custom)?;
        Ok(Self { inner, inner_bytes })
    }
}
