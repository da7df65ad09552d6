//! Construction and signing of the Mobile Security Object.
//!
//! The issuance pipeline only depends on [MsoIssuer]: whatever signs the MSO
//! hands back a [SignedMso] carrying the encoded `COSE_Sign1` and the items
//! each value digest covers. [DefaultMsoIssuer] is the in-process
//! implementation.

use std::collections::{BTreeMap, HashSet};

use anyhow::{anyhow, bail, Result};
use coset::{CoseSign1, TaggedCborSerializable};
use rand::{seq::SliceRandom, Rng, RngCore};
use sha2::{Digest, Sha256, Sha384, Sha512};
use time::{Duration, OffsetDateTime};

use crate::cose::SignatureAlgorithm;
use crate::definitions::{
    helpers::{OrderedMap, Tag24},
    DeviceKeyInfo, DigestAlgorithm, DigestId, DigestIds, IssuerSignedItem, Mso, ValidityInfo,
    DEFAULT_VERSION,
};
use crate::issuance::{
    batch::Namespaces,
    key::SigningKey,
    x5chain::{X5Chain, X5CHAIN_HEADER_LABEL},
};

/// Per namespace, the item behind every digest id, in the order produced.
pub type DisclosureMap = OrderedMap<String, OrderedMap<DigestId, IssuerSignedItem>>;

/// Builds and signs an MSO over a set of namespaces.
pub trait MsoIssuer: Send + Sync {
    /// `doc_type` is the MSO `docType`; implementations may fall back to
    /// something else when it is absent.
    fn issue(&self, doc_type: Option<&str>, data: &Namespaces, key: &SigningKey)
        -> Result<SignedMso>;
}

/// A signed MSO along with the disclosures its digests commit to.
#[derive(Debug, Clone)]
pub struct SignedMso {
    mso: Mso,
    issuer_auth: CoseSign1,
    disclosure_map: DisclosureMap,
}

impl SignedMso {
    pub fn new(mso: Mso, issuer_auth: CoseSign1, disclosure_map: DisclosureMap) -> Self {
        Self {
            mso,
            issuer_auth,
            disclosure_map,
        }
    }

    pub fn mso(&self) -> &Mso {
        &self.mso
    }

    pub fn issuer_auth(&self) -> &CoseSign1 {
        &self.issuer_auth
    }

    pub fn disclosure_map(&self) -> &DisclosureMap {
        &self.disclosure_map
    }

    /// The tagged `COSE_Sign1` encoding.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.issuer_auth
            .clone()
            .to_tagged_vec()
            .map_err(|e| anyhow!("unable to encode issuerAuth: {:?}", e))
    }
}

pub const DEFAULT_EXPIRY_HOURS: u32 = 24 * 365 * 5;
const DECOY_PREIMAGE_LENGTH: usize = 512;
pub const DEFAULT_SALT_LENGTH: usize = 32;

const ENV_DIGEST_ALGORITHM: &str = "MDOC_DIGEST_ALGORITHM";
const ENV_EXPIRY_HOURS: &str = "MDOC_EXPIRY_HOURS";
const ENV_SALT_LENGTH: &str = "MDOC_DIGEST_SALT_LENGTH";
const ENV_DECOY_DIGESTS: &str = "MDOC_DECOY_DIGESTS";

#[derive(Debug, Clone)]
pub struct MsoSettings {
    digest_algorithm: DigestAlgorithm,
    valid_from: Option<OffsetDateTime>,
    expiry_hours: u32,
    salt_length: usize,
    enable_decoy_digests: bool,
    x5chain: Option<X5Chain>,
}

impl Default for MsoSettings {
    fn default() -> Self {
        Self {
            digest_algorithm: DigestAlgorithm::default(),
            valid_from: None,
            expiry_hours: DEFAULT_EXPIRY_HOURS,
            salt_length: DEFAULT_SALT_LENGTH,
            enable_decoy_digests: true,
            x5chain: None,
        }
    }
}

impl MsoSettings {
    /// Defaults overridden by whichever `MDOC_*` environment variables are
    /// set.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [MsoSettings::from_env], reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut settings = Self::default();
        if let Some(alg) = var(ENV_DIGEST_ALGORITHM) {
            settings.digest_algorithm = alg
                .parse()
                .map_err(|e| anyhow!("{}: {}", ENV_DIGEST_ALGORITHM, e))?;
        }
        if let Some(hours) = var(ENV_EXPIRY_HOURS) {
            settings.expiry_hours = hours
                .parse()
                .map_err(|e| anyhow!("{}: {}", ENV_EXPIRY_HOURS, e))?;
        }
        if let Some(length) = var(ENV_SALT_LENGTH) {
            settings.salt_length = length
                .parse()
                .map_err(|e| anyhow!("{}: {}", ENV_SALT_LENGTH, e))?;
        }
        if let Some(decoys) = var(ENV_DECOY_DIGESTS) {
            settings.enable_decoy_digests = decoys
                .parse()
                .map_err(|e| anyhow!("{}: {}", ENV_DECOY_DIGESTS, e))?;
        }
        Ok(settings)
    }

    /// Set the digest algorithm to be used for hashing the data elements.
    pub fn digest_algorithm(mut self, digest_algorithm: DigestAlgorithm) -> Self {
        self.digest_algorithm = digest_algorithm;
        self
    }

    /// Start of validity. Defaults to the signing time.
    pub fn valid_from(mut self, valid_from: OffsetDateTime) -> Self {
        self.valid_from = Some(valid_from);
        self
    }

    /// Validity period, counted from the signing time.
    pub fn expiry_hours(mut self, expiry_hours: u32) -> Self {
        self.expiry_hours = expiry_hours;
        self
    }

    pub fn salt_length(mut self, salt_length: usize) -> Self {
        self.salt_length = salt_length;
        self
    }

    /// Enable the use of decoy digests.
    pub fn enable_decoy_digests(mut self, enable_decoy_digests: bool) -> Self {
        self.enable_decoy_digests = enable_decoy_digests;
        self
    }

    /// Certificate chain placed in the unprotected header.
    pub fn x5chain(mut self, x5chain: X5Chain) -> Self {
        self.x5chain = Some(x5chain);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct DefaultMsoIssuer {
    settings: MsoSettings,
}

impl DefaultMsoIssuer {
    pub fn new(settings: MsoSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &MsoSettings {
        &self.settings
    }
}

impl MsoIssuer for DefaultMsoIssuer {
    fn issue(
        &self,
        doc_type: Option<&str>,
        data: &Namespaces,
        key: &SigningKey,
    ) -> Result<SignedMso> {
        let settings = &self.settings;
        if data.is_empty() {
            bail!("at least one namespace required");
        }

        let mut rng = rand::thread_rng();
        let mut disclosure_map = DisclosureMap::new();
        let mut value_digests = BTreeMap::new();
        for (name, elements) in data.iter() {
            if elements.is_empty() {
                bail!("at least one element required in each namespace");
            }

            // Item order must not leak the order of the source record.
            let mut elements: Vec<_> = elements.iter().collect();
            elements.shuffle(&mut rng);

            let mut used_ids = HashSet::new();
            let mut digests = DigestIds::new();
            let mut disclosed = OrderedMap::new();
            for (identifier, value) in elements {
                let mut random = vec![0u8; settings.salt_length];
                rng.fill_bytes(&mut random);
                let item = IssuerSignedItem {
                    digest_id: unique_digest_id(&mut used_ids, &mut rng),
                    random: random.into(),
                    element_identifier: identifier.clone(),
                    element_value: value.clone(),
                };
                let bytes = Tag24::new(&item)
                    .and_then(|tagged| crate::cbor::to_vec(&tagged))
                    .map_err(|e| anyhow!("unable to encode IssuerSignedItem as cbor: {}", e))?;
                digests.insert(item.digest_id, digest(settings.digest_algorithm, &bytes).into());
                disclosed.insert(item.digest_id, item);
            }

            if settings.enable_decoy_digests {
                for _ in 0..rng.gen_range(5..10) {
                    let mut preimage = [0u8; DECOY_PREIMAGE_LENGTH];
                    rng.fill_bytes(&mut preimage);
                    digests.insert(
                        unique_digest_id(&mut used_ids, &mut rng),
                        digest(settings.digest_algorithm, &preimage).into(),
                    );
                }
            }

            value_digests.insert(name.clone(), digests);
            disclosure_map.insert(name.clone(), disclosed);
        }

        let doc_type = doc_type
            .map(str::to_string)
            .or_else(|| data.keys().next().cloned())
            .ok_or_else(|| anyhow!("missing parameter: 'doc_type'"))?;

        let signed = OffsetDateTime::now_utc();
        let valid_until = signed
            .checked_add(Duration::hours(i64::from(settings.expiry_hours)))
            .ok_or_else(|| {
                anyhow!(
                    "validity period of {} hours is out of range",
                    settings.expiry_hours
                )
            })?;
        let validity_info = ValidityInfo {
            signed,
            valid_from: settings.valid_from.unwrap_or(signed),
            valid_until,
        };

        let mso = Mso {
            version: DEFAULT_VERSION.to_string(),
            digest_algorithm: settings.digest_algorithm,
            value_digests,
            device_key_info: DeviceKeyInfo::default(),
            doc_type,
            validity_info,
        };

        let issuer_auth = sign_mso(&mso, key, settings.x5chain.as_ref())?;
        Ok(SignedMso::new(mso, issuer_auth, disclosure_map))
    }
}

fn sign_mso(mso: &Mso, key: &SigningKey, x5chain: Option<&X5Chain>) -> Result<CoseSign1> {
    let mso_bytes = crate::cbor::to_vec(&Tag24::new(mso)?)?;

    let mut protected = coset::HeaderBuilder::new().algorithm(key.algorithm());
    if !key.key_id().is_empty() {
        protected = protected.key_id(key.key_id().to_vec());
    }
    let mut unprotected = coset::HeaderBuilder::new();
    if let Some(x5chain) = x5chain {
        unprotected = unprotected.value(X5CHAIN_HEADER_LABEL, x5chain.to_cbor());
    }

    let sign1 = coset::CoseSign1Builder::new()
        .protected(protected.build())
        .unprotected(unprotected.build())
        .payload(mso_bytes)
        .try_create_signature(&[], |payload| key.sign(payload))
        .map_err(|e| anyhow!("error signing cosesign1: {}", e))?
        .build();
    Ok(sign1)
}

/// Hash `bytes` with the MSO digest algorithm.
pub fn digest(digest_algorithm: DigestAlgorithm, bytes: &[u8]) -> Vec<u8> {
    match digest_algorithm {
        DigestAlgorithm::SHA256 => Sha256::digest(bytes).to_vec(),
        DigestAlgorithm::SHA384 => Sha384::digest(bytes).to_vec(),
        DigestAlgorithm::SHA512 => Sha512::digest(bytes).to_vec(),
    }
}

fn unique_digest_id(used_ids: &mut HashSet<DigestId>, rng: &mut impl Rng) -> DigestId {
    loop {
        let digest_id = DigestId::new(rng.gen());
        if used_ids.insert(digest_id) {
            return digest_id;
        }
    }
}
