pub mod batch;
pub mod disclosure;
pub mod key;
pub mod mdoc;
pub mod mso;
pub mod x5chain;

pub use batch::{DeviceKeyMaterial, DocumentBatch, DocumentInput, Namespaces};
pub use key::{EcKey, KeyMaterial, SigningKey};
pub use mdoc::{Builder, MdocIssuer};
pub use mso::{DefaultMsoIssuer, DisclosureMap, MsoIssuer, MsoSettings, SignedMso};
pub use x5chain::X5Chain;

use crate::cbor::CborError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("missing signing key: {0}")]
    MissingSigningKey(String),
    #[error("invalid device key info: {0}")]
    InvalidDeviceKey(String),
    /// Raised by the MSO issuer; passed through untouched.
    #[error(transparent)]
    Collaborator(anyhow::Error),
    #[error(transparent)]
    Encoding(#[from] CborError),
    #[error("no mdoc has been issued yet")]
    UnsignedEnvelopeRead,
}
