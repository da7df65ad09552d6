pub mod tag24;

pub use tag24::Tag24;

/// CBOR byte string.
pub type ByteStr = serde_bytes::ByteBuf;

/// Map that serializes its entries in insertion order.
///
/// Digests over encoded maps depend on entry order, so anything that flows
/// into an mdoc keeps the order it was produced in.
pub type OrderedMap<K, V> = indexmap::IndexMap<K, V>;
