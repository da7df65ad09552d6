//! Issuance of ISO/IEC 18013-5 mobile documents.
//!
//! [issuance::MdocIssuer] takes one document or a batch, has each one's
//! Mobile Security Object signed by an [issuance::MsoIssuer], and assembles
//! the issuer-signed documents into an envelope that can be written out as
//! CBOR or hex.

pub use ciborium;
pub use coset;

pub mod cbor;
pub mod cose;
pub mod definitions;
pub mod issuance;
