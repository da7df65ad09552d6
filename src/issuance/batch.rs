//! Normalization of issuance input: single documents versus batches, and
//! the device key info that accompanies them.

use coset::{AsCborValue, CoseKey};
use serde::{Deserialize, Serialize};

use crate::definitions::helpers::OrderedMap;
use crate::issuance::Error;

/// Attribute values per namespace, in caller order.
pub type Namespaces = OrderedMap<String, OrderedMap<String, ciborium::Value>>;

/// One document to issue.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DocumentInput {
    #[serde(rename = "doctype", default)]
    pub doc_type: Option<String>,
    pub data: Namespaces,
}

impl DocumentInput {
    pub fn new(doc_type: impl Into<String>, data: Namespaces) -> Self {
        Self {
            doc_type: Some(doc_type.into()),
            data,
        }
    }
}

/// Either a bare set of namespaces, whose doctype is given separately, or a
/// list of documents each carrying its own doctype.
#[derive(Clone, Copy, Debug)]
pub enum DocumentBatch<'a> {
    Single(&'a Namespaces),
    Many(&'a [DocumentInput]),
}

/// A normalized batch element, borrowed from the caller's input.
#[derive(Clone, Copy, Debug)]
pub struct DocumentRef<'a> {
    pub doc_type: Option<&'a str>,
    pub data: &'a Namespaces,
}

impl<'a> DocumentBatch<'a> {
    /// Flatten into an ordered sequence. `doc_type` only applies to the
    /// single form and may be absent.
    pub fn normalize(self, doc_type: Option<&'a str>) -> Vec<DocumentRef<'a>> {
        match self {
            DocumentBatch::Single(data) => vec![DocumentRef { doc_type, data }],
            DocumentBatch::Many(documents) => documents
                .iter()
                .map(|doc| DocumentRef {
                    doc_type: doc.doc_type.as_deref(),
                    data: &doc.data,
                })
                .collect(),
        }
    }
}

impl<'a> From<&'a Namespaces> for DocumentBatch<'a> {
    fn from(data: &'a Namespaces) -> Self {
        DocumentBatch::Single(data)
    }
}

impl<'a> From<&'a [DocumentInput]> for DocumentBatch<'a> {
    fn from(documents: &'a [DocumentInput]) -> Self {
        DocumentBatch::Many(documents)
    }
}

impl<'a> From<&'a Vec<DocumentInput>> for DocumentBatch<'a> {
    fn from(documents: &'a Vec<DocumentInput>) -> Self {
        DocumentBatch::Many(documents.as_slice())
    }
}

/// The holder's device key, as a raw `COSE_Key` map or an already parsed
/// key.
#[derive(Clone, Debug)]
pub enum DeviceKeyMaterial {
    Parameters(ciborium::Value),
    Canonical(CoseKey),
}

impl DeviceKeyMaterial {
    pub fn normalize(self) -> Result<CoseKey, Error> {
        match self {
            DeviceKeyMaterial::Parameters(params) => CoseKey::from_cbor_value(params)
                .map_err(|e| Error::InvalidDeviceKey(format!("{e:?}"))),
            DeviceKeyMaterial::Canonical(key) => Ok(key),
        }
    }
}

impl From<ciborium::Value> for DeviceKeyMaterial {
    fn from(params: ciborium::Value) -> Self {
        DeviceKeyMaterial::Parameters(params)
    }
}

impl From<CoseKey> for DeviceKeyMaterial {
    fn from(key: CoseKey) -> Self {
        DeviceKeyMaterial::Canonical(key)
    }
}
