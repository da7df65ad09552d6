use serde::Serialize;

use crate::definitions::IssuerSigned;

pub const DEFAULT_VERSION: &str = "1.0";
pub const STATUS_OK: u64 = 0;

/// One issued mdoc. `deviceSigned` is produced at presentation time and is
/// not part of an issued document.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedDocument {
    pub doc_type: Option<String>,
    pub issuer_signed: IssuerSigned,
}

/// Result of one issuance call.
#[derive(Clone, Debug, Serialize)]
pub struct IssuanceEnvelope {
    pub version: String,
    pub documents: Vec<IssuedDocument>,
    pub status: u64,
}
