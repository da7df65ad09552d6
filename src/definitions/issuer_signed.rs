use serde::{Deserialize, Serialize};

use crate::definitions::{
    helpers::{ByteStr, OrderedMap, Tag24},
    DigestId,
};

/// A single data element as committed to by the MSO.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuerSignedItem {
    #[serde(rename = "digestID")]
    pub digest_id: DigestId,
    pub random: ByteStr,
    pub element_identifier: String,
    pub element_value: ciborium::Value,
}

/// The exact form hashed into the MSO value digests.
pub type IssuerSignedItemBytes = Tag24<IssuerSignedItem>;

/// A disclosed attribute as emitted in `nameSpaces`: a single-entry map from
/// the digest id to the item that digest covers.
pub type DisclosedAttribute = OrderedMap<DigestId, IssuerSignedItem>;

pub type DisclosedAttributeBytes = Tag24<DisclosedAttribute>;

/// Disclosed attributes per namespace, in the order they were produced.
pub type IssuerNamespaces = OrderedMap<String, Vec<DisclosedAttributeBytes>>;

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuerSigned {
    pub name_spaces: IssuerNamespaces,
    pub issuer_auth: ByteStr,
}
