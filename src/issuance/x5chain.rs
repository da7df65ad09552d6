use anyhow::{anyhow, bail, Result};
use ciborium::Value;
use x509_cert::{
    der::{Decode, Encode},
    Certificate,
};

/// COSE header parameter for an X.509 certificate chain (RFC 9360).
pub const X5CHAIN_HEADER_LABEL: i64 = 33;

/// Issuer certificate chain, leaf first, kept in DER form.
#[derive(Debug, Clone, PartialEq)]
pub struct X5Chain(Vec<Vec<u8>>);

impl X5Chain {
    /// Build from DER certificates, checking that each one parses.
    pub fn from_der(certificates: Vec<Vec<u8>>) -> Result<Self> {
        if certificates.is_empty() {
            bail!("at least one certificate required in x5chain");
        }
        for der in &certificates {
            Certificate::from_der(der)
                .map_err(|e| anyhow!("unable to parse certificate: {}", e))?;
        }
        Ok(Self(certificates))
    }

    /// Build from a concatenation of PEM certificates.
    pub fn from_pem(pem: &[u8]) -> Result<Self> {
        let certificates = Certificate::load_pem_chain(pem)
            .map_err(|e| anyhow!("unable to parse pem chain: {}", e))?
            .iter()
            .map(|cert| {
                cert.to_der()
                    .map_err(|e| anyhow!("unable to encode certificate: {}", e))
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_der(certificates)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// A single certificate is encoded as a bare byte string, a longer chain
    /// as an array of byte strings.
    pub fn to_cbor(&self) -> Value {
        match self.0.as_slice() {
            [single] => Value::Bytes(single.clone()),
            chain => Value::Array(chain.iter().cloned().map(Value::Bytes).collect()),
        }
    }
}
