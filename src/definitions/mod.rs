mod device_key;
mod envelope;
mod issuer_signed;
mod mso;
mod validity_info;

pub mod helpers;

pub use device_key::DeviceKeyInfo;
pub use envelope::{IssuanceEnvelope, IssuedDocument, DEFAULT_VERSION, STATUS_OK};
pub use issuer_signed::{
    DisclosedAttribute, DisclosedAttributeBytes, IssuerNamespaces, IssuerSigned,
    IssuerSignedItem, IssuerSignedItemBytes,
};
pub use mso::{DigestAlgorithm, DigestId, DigestIds, Mso};
pub use validity_info::{format_tdate, ValidityInfo};
