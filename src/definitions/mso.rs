use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::definitions::{helpers::ByteStr, DeviceKeyInfo, ValidityInfo};

/// The Mobile Security Object, signed by the issuer inside `issuerAuth`.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Mso {
    pub version: String,
    pub digest_algorithm: DigestAlgorithm,
    pub value_digests: BTreeMap<String, DigestIds>,
    pub device_key_info: DeviceKeyInfo,
    pub doc_type: String,
    pub validity_info: ValidityInfo,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DigestAlgorithm {
    #[default]
    #[serde(rename = "SHA-256")]
    SHA256,
    #[serde(rename = "SHA-384")]
    SHA384,
    #[serde(rename = "SHA-512")]
    SHA512,
}

impl DigestAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            DigestAlgorithm::SHA256 => "SHA-256",
            DigestAlgorithm::SHA384 => "SHA-384",
            DigestAlgorithm::SHA512 => "SHA-512",
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = String;

    /// Accepts the MSO spelling (`SHA-256`) as well as the bare hash name
    /// (`sha256`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('-', "").as_str() {
            "SHA256" => Ok(DigestAlgorithm::SHA256),
            "SHA384" => Ok(DigestAlgorithm::SHA384),
            "SHA512" => Ok(DigestAlgorithm::SHA512),
            _ => Err(format!("unsupported digest algorithm: '{s}'")),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DigestId(i32);

impl DigestId {
    pub fn new(i: i32) -> DigestId {
        DigestId(i)
    }

    pub fn value(&self) -> i32 {
        self.0
    }
}

impl From<DigestId> for i32 {
    fn from(id: DigestId) -> i32 {
        id.0
    }
}

pub type DigestIds = BTreeMap<DigestId, ByteStr>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_algorithm_spellings() {
        assert_eq!("SHA-384".parse(), Ok(DigestAlgorithm::SHA384));
        assert_eq!("sha512".parse(), Ok(DigestAlgorithm::SHA512));
        assert!("md5".parse::<DigestAlgorithm>().is_err());
    }

    #[test]
    fn digest_algorithm_encodes_as_text() {
        let bytes = crate::cbor::to_vec(&DigestAlgorithm::SHA256).unwrap();
        let value: ciborium::Value = crate::cbor::from_slice(&bytes).unwrap();
        assert_eq!(value, ciborium::Value::Text("SHA-256".into()));
    }
}
