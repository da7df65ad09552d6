use crate::definitions::{
    IssuanceEnvelope, IssuedDocument, IssuerNamespaces, IssuerSigned, DEFAULT_VERSION, STATUS_OK,
};
use crate::issuance::{
    batch::{DeviceKeyMaterial, DocumentBatch, DocumentRef},
    disclosure::to_issuer_namespaces,
    key::{KeyMaterial, SigningKey},
    mso::{DefaultMsoIssuer, MsoIssuer},
    Error,
};

/// Issues batches of mdocs under a single signing key.
///
/// The last successful issuance is kept and can be serialized with
/// [MdocIssuer::to_bytes] or [MdocIssuer::to_hex]. A failed issuance leaves
/// it untouched.
pub struct MdocIssuer {
    signing_key: SigningKey,
    version: String,
    status: u64,
    mso_issuer: Box<dyn MsoIssuer>,
    envelope: Option<IssuanceEnvelope>,
}

#[derive(Default)]
pub struct Builder {
    version: Option<String>,
    status: Option<u64>,
    mso_issuer: Option<Box<dyn MsoIssuer>>,
}

impl MdocIssuer {
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Issuer with the default version, status and MSO issuer.
    pub fn new(key: impl Into<KeyMaterial>) -> Result<Self, Error> {
        Self::builder().build(key)
    }

    pub fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }

    /// The result of the last successful call to [MdocIssuer::issue].
    pub fn envelope(&self) -> Option<&IssuanceEnvelope> {
        self.envelope.as_ref()
    }

    /// Sign every document in `batch` and replace the stored envelope with
    /// the result.
    ///
    /// `doc_type` is only used when `batch` is a bare set of namespaces.
    /// `device_key_info` is validated but not yet bound into the documents.
    pub fn issue<'a>(
        &mut self,
        batch: impl Into<DocumentBatch<'a>>,
        device_key_info: impl Into<DeviceKeyMaterial>,
        doc_type: Option<&'a str>,
    ) -> Result<&IssuanceEnvelope, Error> {
        let device_key = device_key_info.into().normalize()?;
        tracing::debug!(kty = ?device_key.kty, "accepted device key info");

        let documents = batch
            .into()
            .normalize(doc_type)
            .into_iter()
            .map(|doc| self.issue_document(doc))
            .collect::<Result<Vec<_>, _>>()?;

        let envelope = IssuanceEnvelope {
            version: self.version.clone(),
            documents,
            status: self.status,
        };
        tracing::info!(documents = envelope.documents.len(), "issued mdoc envelope");
        Ok(self.envelope.insert(envelope))
    }

    fn issue_document(&self, doc: DocumentRef<'_>) -> Result<IssuedDocument, Error> {
        match doc.doc_type {
            Some(doc_type) => tracing::debug!(doc_type, "issuing document"),
            None => tracing::warn!("issuing document without a doctype"),
        }

        let signed = self
            .mso_issuer
            .issue(doc.doc_type, doc.data, &self.signing_key)
            .map_err(Error::Collaborator)?;
        let issuer_auth = signed.to_bytes().map_err(Error::Collaborator)?;
        let name_spaces = to_issuer_namespaces(signed.disclosure_map())?;

        Ok(compose_document(doc.doc_type, name_spaces, issuer_auth))
    }

    /// CBOR encoding of the current envelope.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        let envelope = self.envelope.as_ref().ok_or(Error::UnsignedEnvelopeRead)?;
        Ok(crate::cbor::to_vec(envelope)?)
    }

    /// Lowercase hex of [MdocIssuer::to_bytes].
    pub fn to_hex(&self) -> Result<String, Error> {
        self.to_bytes().map(hex::encode)
    }
}

/// Assemble an issuer-signed document. No `deviceSigned` part is produced
/// at issuance.
pub fn compose_document(
    doc_type: Option<&str>,
    name_spaces: IssuerNamespaces,
    issuer_auth: Vec<u8>,
) -> IssuedDocument {
    IssuedDocument {
        doc_type: doc_type.map(str::to_string),
        issuer_signed: IssuerSigned {
            name_spaces,
            issuer_auth: issuer_auth.into(),
        },
    }
}

impl Builder {
    /// Set the envelope version.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Set the envelope status code.
    pub fn status(mut self, status: u64) -> Self {
        self.status = Some(status);
        self
    }

    /// Set the MSO issuer used to sign each document.
    pub fn mso_issuer(mut self, mso_issuer: impl MsoIssuer + 'static) -> Self {
        self.mso_issuer = Some(Box::new(mso_issuer));
        self
    }

    pub fn build(self, key: impl Into<KeyMaterial>) -> Result<MdocIssuer, Error> {
        let signing_key = key.into().normalize()?;
        tracing::debug!(?signing_key, "normalized issuer signing key");

        Ok(MdocIssuer {
            signing_key,
            version: self.version.unwrap_or_else(|| DEFAULT_VERSION.to_string()),
            status: self.status.unwrap_or(STATUS_OK),
            mso_issuer: self
                .mso_issuer
                .unwrap_or_else(|| Box::new(DefaultMsoIssuer::default())),
            envelope: None,
        })
    }
}
