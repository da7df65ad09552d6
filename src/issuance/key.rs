//! Normalization of the accepted signing-key shapes into one [SigningKey].

use std::fmt;

use coset::{iana, AsCborValue, CborSerializable, CoseKey, CoseKeyBuilder, KeyType, Label};
use p256::elliptic_curve::{
    sec1::{EncodedPoint, ModulusSize, ToEncodedPoint},
    Curve, FieldBytesSize,
};
use signature::Signer;

use crate::cose::SignatureAlgorithm;
use crate::issuance::Error;

/// An elliptic-curve private key in its native representation.
#[derive(Clone)]
pub enum EcKey {
    P256(p256::SecretKey),
    P384(p384::SecretKey),
}

/// Every key shape an issuer can be constructed from.
pub enum KeyMaterial {
    /// A raw `COSE_Key` parameter map with integer labels.
    Parameters(ciborium::Value),
    EllipticCurve(EcKey),
    Canonical(SigningKey),
}

#[derive(Clone)]
enum EcSigner {
    P256(p256::ecdsa::SigningKey),
    P384(p384::ecdsa::SigningKey),
}

/// Canonical issuer signing key: a validated EC2 `COSE_Key` together with
/// the signer derived from it.
#[derive(Clone)]
pub struct SigningKey {
    cose_key: CoseKey,
    signer: EcSigner,
}

impl KeyMaterial {
    /// Turn any accepted key shape into the canonical [SigningKey].
    pub fn normalize(self) -> Result<SigningKey, Error> {
        match self {
            KeyMaterial::Parameters(params) => {
                tracing::debug!("normalizing signing key from COSE_Key parameters");
                let cose_key = CoseKey::from_cbor_value(params)
                    .map_err(|e| Error::MissingSigningKey(format!("not a COSE_Key: {e:?}")))?;
                SigningKey::try_from(cose_key)
            }
            KeyMaterial::EllipticCurve(ec_key) => {
                tracing::debug!("normalizing signing key from an elliptic-curve key");
                // Go through the wire form so both key shapes end up identical.
                let bytes = ec_key
                    .to_cose_key()?
                    .to_vec()
                    .map_err(|e| Error::MissingSigningKey(format!("unable to encode key: {e:?}")))?;
                let cose_key = CoseKey::from_slice(&bytes)
                    .map_err(|e| Error::MissingSigningKey(format!("unable to decode key: {e:?}")))?;
                SigningKey::try_from(cose_key)
            }
            KeyMaterial::Canonical(key) => Ok(key),
        }
    }
}

impl EcKey {
    /// Encode as an EC2 private `COSE_Key`.
    pub fn to_cose_key(&self) -> Result<CoseKey, Error> {
        let (curve, alg, (x, y), d) = match self {
            EcKey::P256(sk) => (
                iana::EllipticCurve::P_256,
                iana::Algorithm::ES256,
                affine_coordinates::<p256::NistP256>(
                    sk.public_key().to_encoded_point(false),
                )?,
                sk.to_bytes().to_vec(),
            ),
            EcKey::P384(sk) => (
                iana::EllipticCurve::P_384,
                iana::Algorithm::ES384,
                affine_coordinates::<p384::NistP384>(
                    sk.public_key().to_encoded_point(false),
                )?,
                sk.to_bytes().to_vec(),
            ),
        };
        Ok(CoseKeyBuilder::new_ec2_priv_key(curve, x, y, d)
            .algorithm(alg)
            .build())
    }
}

fn affine_coordinates<C>(point: EncodedPoint<C>) -> Result<(Vec<u8>, Vec<u8>), Error>
where
    C: Curve,
    FieldBytesSize<C>: ModulusSize,
{
    match (point.x(), point.y()) {
        (Some(x), Some(y)) => Ok((x.to_vec(), y.to_vec())),
        _ => Err(Error::MissingSigningKey(
            "public point has no affine coordinates".into(),
        )),
    }
}

impl SigningKey {
    pub fn cose_key(&self) -> &CoseKey {
        &self.cose_key
    }

    /// Key id from the `COSE_Key`, empty if none was provided.
    pub fn key_id(&self) -> &[u8] {
        &self.cose_key.key_id
    }

    /// Sign `payload` with deterministic ECDSA, returning the fixed-size
    /// `r || s` encoding COSE expects.
    pub fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, signature::Error> {
        match &self.signer {
            EcSigner::P256(key) => {
                let sig: p256::ecdsa::Signature = key.try_sign(payload)?;
                Ok(sig.to_vec())
            }
            EcSigner::P384(key) => {
                let sig: p384::ecdsa::Signature = key.try_sign(payload)?;
                Ok(sig.to_vec())
            }
        }
    }
}

impl SignatureAlgorithm for SigningKey {
    fn algorithm(&self) -> iana::Algorithm {
        match self.signer {
            EcSigner::P256(_) => iana::Algorithm::ES256,
            EcSigner::P384(_) => iana::Algorithm::ES384,
        }
    }
}

impl TryFrom<CoseKey> for SigningKey {
    type Error = Error;

    fn try_from(cose_key: CoseKey) -> Result<Self, Self::Error> {
        if cose_key.kty != KeyType::Assigned(iana::KeyType::EC2) {
            return Err(Error::MissingSigningKey(format!(
                "expected an EC2 key, found {:?}",
                cose_key.kty
            )));
        }

        let curve = match param(&cose_key, iana::Ec2KeyParameter::Crv) {
            Some(ciborium::Value::Integer(i)) => i128::from(*i),
            _ => return Err(Error::MissingSigningKey("missing parameter: 'crv'".into())),
        };
        let d = match param(&cose_key, iana::Ec2KeyParameter::D) {
            Some(ciborium::Value::Bytes(d)) => d.clone(),
            _ => return Err(Error::MissingSigningKey("missing parameter: 'd'".into())),
        };

        let signer = match curve {
            c if c == iana::EllipticCurve::P_256 as i128 => {
                p256::ecdsa::SigningKey::from_slice(&d).map(EcSigner::P256)
            }
            c if c == iana::EllipticCurve::P_384 as i128 => {
                p384::ecdsa::SigningKey::from_slice(&d).map(EcSigner::P384)
            }
            _ => {
                return Err(Error::MissingSigningKey(format!(
                    "unsupported curve: {curve}"
                )))
            }
        };
        let signer = signer.map_err(|e: ecdsa::Error| {
            Error::MissingSigningKey(format!("invalid private key: {e}"))
        })?;

        Ok(SigningKey { cose_key, signer })
    }
}

fn param(key: &CoseKey, label: iana::Ec2KeyParameter) -> Option<&ciborium::Value> {
    let label = Label::Int(label as i64);
    key.params
        .iter()
        .find_map(|(l, v)| (*l == label).then_some(v))
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("algorithm", &self.algorithm())
            .field("key_id", &hex::encode(self.key_id()))
            .finish_non_exhaustive()
    }
}

impl From<ciborium::Value> for KeyMaterial {
    fn from(params: ciborium::Value) -> Self {
        KeyMaterial::Parameters(params)
    }
}

impl From<EcKey> for KeyMaterial {
    fn from(key: EcKey) -> Self {
        KeyMaterial::EllipticCurve(key)
    }
}

impl From<p256::SecretKey> for KeyMaterial {
    fn from(key: p256::SecretKey) -> Self {
        KeyMaterial::EllipticCurve(EcKey::P256(key))
    }
}

impl From<p384::SecretKey> for KeyMaterial {
    fn from(key: p384::SecretKey) -> Self {
        KeyMaterial::EllipticCurve(EcKey::P384(key))
    }
}

impl From<SigningKey> for KeyMaterial {
    fn from(key: SigningKey) -> Self {
        KeyMaterial::Canonical(key)
    }
}
