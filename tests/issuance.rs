use ciborium::Value;
use coset::{iana, AsCborValue, CoseKeyBuilder, CoseSign1, TaggedCborSerializable};
use mdoc_issuer::{
    cbor,
    definitions::helpers::OrderedMap,
    issuance::{DocumentInput, EcKey, KeyMaterial, MdocIssuer, Namespaces, SigningKey},
};
use sha2::{Digest, Sha256};

const MDL_DOCTYPE: &str = "org.iso.18013.5.1.mDL";
const MDL_NAMESPACE: &str = "org.iso.18013.5.1";

fn secret_key() -> p256::SecretKey {
    p256::SecretKey::from_slice(&hex::decode(
        "c9afa9d845ba75166b5c215767b1d6934e50c3db36e89b127b8a622b120f6721",
    )
    .unwrap())
    .unwrap()
}

fn device_key() -> Value {
    let point = p256::elliptic_curve::sec1::ToEncodedPoint::to_encoded_point(
        &secret_key().public_key(),
        false,
    );
    CoseKeyBuilder::new_ec2_pub_key(
        iana::EllipticCurve::P_256,
        point.x().unwrap().to_vec(),
        point.y().unwrap().to_vec(),
    )
    .build()
    .to_cbor_value()
    .unwrap()
}

fn namespaces(attrs: &[(&str, Value)]) -> Namespaces {
    let attrs: OrderedMap<String, Value> = attrs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect();
    [(MDL_NAMESPACE.to_string(), attrs)].into_iter().collect()
}

fn field<'a>(map: &'a Value, name: &str) -> &'a Value {
    let Value::Map(entries) = map else {
        panic!("expected a map, found {map:?}");
    };
    entries
        .iter()
        .find_map(|(k, v)| (k == &Value::Text(name.into())).then_some(v))
        .unwrap_or_else(|| panic!("missing field {name}"))
}

fn decode_tag24(value: &Value) -> Value {
    let Value::Tag(24, inner) = value else {
        panic!("expected tag 24, found {value:?}");
    };
    let Value::Bytes(bytes) = inner.as_ref() else {
        panic!("expected a byte string");
    };
    cbor::from_slice(bytes).unwrap()
}

#[test]
fn single_mdl_document() {
    let mut issuer = MdocIssuer::new(secret_key()).unwrap();
    let data = namespaces(&[("given_name", Value::Text("ALICE".into()))]);
    let envelope = issuer
        .issue(&data, device_key(), Some(MDL_DOCTYPE))
        .unwrap();

    assert_eq!(envelope.version, "1.0");
    assert_eq!(envelope.status, 0);
    assert_eq!(envelope.documents.len(), 1);
    let doc = &envelope.documents[0];
    assert_eq!(doc.doc_type.as_deref(), Some(MDL_DOCTYPE));

    let entries = doc
        .issuer_signed
        .name_spaces
        .get(MDL_NAMESPACE)
        .unwrap();
    assert_eq!(entries.len(), 1);
    let disclosed = entries[0].as_ref();
    assert_eq!(disclosed.len(), 1);
    let (digest_id, item) = disclosed.iter().next().unwrap();
    assert_eq!(*digest_id, item.digest_id);
    assert_eq!(item.element_identifier, "given_name");
    assert_eq!(item.element_value, Value::Text("ALICE".into()));

    let hex = issuer.to_hex().unwrap();
    assert!(!hex.is_empty());
    assert_eq!(hex.len() % 2, 0);
    assert_eq!(hex, hex.to_lowercase());
    assert_eq!(hex::decode(&hex).unwrap(), issuer.to_bytes().unwrap());
}

#[test]
fn emitted_entries_hash_to_committed_digests() {
    let mut issuer = MdocIssuer::new(secret_key()).unwrap();
    let data = namespaces(&[
        ("family_name", Value::Text("SMITH".into())),
        ("given_name", Value::Text("ALICE".into())),
        ("age_in_years", Value::Integer(42.into())),
        ("portrait", Value::Bytes(vec![0xff, 0xd8, 0xff])),
    ]);
    issuer.issue(&data, device_key(), Some(MDL_DOCTYPE)).unwrap();

    let envelope: Value = cbor::from_slice(&issuer.to_bytes().unwrap()).unwrap();
    let Value::Array(documents) = field(&envelope, "documents") else {
        panic!("documents is not an array");
    };
    let issuer_signed = field(&documents[0], "issuerSigned");

    let Value::Bytes(issuer_auth) = field(issuer_signed, "issuerAuth") else {
        panic!("issuerAuth is not a byte string");
    };
    let sign1 = CoseSign1::from_tagged_slice(issuer_auth).unwrap();
    let verifying_key = *p256::ecdsa::SigningKey::from(secret_key()).verifying_key();
    sign1
        .verify_signature(&[], |sig, data| {
            use signature::Verifier;
            let sig = p256::ecdsa::Signature::from_slice(sig)?;
            verifying_key.verify(data, &sig)
        })
        .unwrap();

    let payload: Value = cbor::from_slice(sign1.payload.as_ref().unwrap()).unwrap();
    let mso = decode_tag24(&payload);
    assert_eq!(field(&mso, "digestAlgorithm"), &Value::Text("SHA-256".into()));
    assert_eq!(field(&mso, "docType"), &Value::Text(MDL_DOCTYPE.into()));
    let digests = field(field(&mso, "valueDigests"), MDL_NAMESPACE);
    let Value::Map(digests) = digests else {
        panic!("valueDigests entry is not a map");
    };

    let Value::Array(entries) = field(field(issuer_signed, "nameSpaces"), MDL_NAMESPACE) else {
        panic!("namespace entries are not an array");
    };
    assert_eq!(entries.len(), 4);
    for entry in entries {
        let Value::Map(disclosed) = decode_tag24(entry) else {
            panic!("disclosed attribute is not a map");
        };
        assert_eq!(disclosed.len(), 1);
        let (digest_id, item) = &disclosed[0];
        assert_eq!(field(item, "digestID"), digest_id);

        let item_bytes = cbor::to_vec(item).unwrap();
        let tagged = cbor::to_vec(&Value::Tag(24, Box::new(Value::Bytes(item_bytes)))).unwrap();
        let expected = digests
            .iter()
            .find_map(|(id, d)| (id == digest_id).then_some(d))
            .unwrap();
        assert_eq!(expected, &Value::Bytes(Sha256::digest(&tagged).to_vec()));
    }
}

#[test]
fn batch_order_is_preserved() {
    let mut issuer = MdocIssuer::new(secret_key()).unwrap();
    let doctypes = ["org.example.one", "org.example.two", "org.example.three"];
    let batch: Vec<DocumentInput> = doctypes
        .iter()
        .map(|dt| DocumentInput::new(*dt, namespaces(&[("id", Value::Text(dt.to_string()))])))
        .collect();

    let envelope = issuer.issue(&batch, device_key(), None).unwrap();
    let issued: Vec<_> = envelope
        .documents
        .iter()
        .map(|d| d.doc_type.as_deref())
        .collect();
    assert_eq!(issued, doctypes.map(Some));
}

#[test]
fn empty_batch_issues_no_documents() {
    let mut issuer = MdocIssuer::new(secret_key()).unwrap();
    let envelope = issuer.issue(&Vec::<DocumentInput>::new(), device_key(), None).unwrap();
    assert!(envelope.documents.is_empty());

    let encoded: Value = cbor::from_slice(&issuer.to_bytes().unwrap()).unwrap();
    assert_eq!(field(&encoded, "documents"), &Value::Array(vec![]));
    assert_eq!(field(&encoded, "version"), &Value::Text("1.0".into()));
    assert_eq!(field(&encoded, "status"), &Value::Integer(0.into()));
}

#[test]
fn serialization_is_idempotent() {
    let mut issuer = MdocIssuer::new(secret_key()).unwrap();
    let data = namespaces(&[("given_name", Value::Text("ALICE".into()))]);
    issuer.issue(&data, device_key(), Some(MDL_DOCTYPE)).unwrap();

    assert_eq!(issuer.to_bytes().unwrap(), issuer.to_bytes().unwrap());
    assert_eq!(issuer.to_hex().unwrap(), issuer.to_hex().unwrap());
}

#[test]
fn second_issue_replaces_the_first() {
    let mut issuer = MdocIssuer::new(secret_key()).unwrap();
    let a = vec![
        DocumentInput::new("a1", namespaces(&[("x", Value::Bool(true))])),
        DocumentInput::new("a2", namespaces(&[("x", Value::Bool(true))])),
    ];
    let b = vec![DocumentInput::new("b1", namespaces(&[("x", Value::Bool(false))]))];

    issuer.issue(&a, device_key(), None).unwrap();
    let envelope = issuer.issue(&b, device_key(), None).unwrap();
    assert_eq!(envelope.documents.len(), b.len());
}

#[test]
fn key_shapes_sign_identically() {
    let ec = EcKey::P256(secret_key());
    let params = ec.to_cose_key().unwrap().to_cbor_value().unwrap();

    let from_params = KeyMaterial::from(params).normalize().unwrap();
    let from_ec = KeyMaterial::from(ec).normalize().unwrap();
    let canonical: SigningKey = from_ec.clone();
    let issuer = MdocIssuer::new(canonical).unwrap();

    let payload = b"attribute data";
    let expected = from_params.sign(payload).unwrap();
    assert_eq!(from_ec.sign(payload).unwrap(), expected);
    assert_eq!(issuer.signing_key().sign(payload).unwrap(), expected);
}

#[test]
fn bad_key_shape_is_rejected() {
    let res = MdocIssuer::new(Value::Array(vec![]));
    assert!(matches!(
        res,
        Err(mdoc_issuer::issuance::Error::MissingSigningKey(_))
    ));
}

#[test]
fn batch_from_json() {
    let batch: Vec<DocumentInput> = serde_json::from_str(
        r#"[
            {"doctype": "org.iso.18013.5.1.mDL",
             "data": {"org.iso.18013.5.1": {"given_name": "ALICE", "age_over_18": true}}},
            {"data": {"org.iso.18013.5.1": {"given_name": "BOB"}}}
        ]"#,
    )
    .unwrap();
    let mut issuer = MdocIssuer::new(secret_key()).unwrap();
    let envelope = issuer.issue(&batch, device_key(), None).unwrap();
    assert_eq!(envelope.documents[0].doc_type.as_deref(), Some(MDL_DOCTYPE));
    assert_eq!(envelope.documents[1].doc_type, None);
}
