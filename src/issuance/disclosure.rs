use crate::cbor::CborError;
use crate::definitions::{helpers::Tag24, DisclosedAttribute, IssuerNamespaces};
use crate::issuance::mso::DisclosureMap;

/// Wrap every disclosed item as `#6.24(bstr .cbor {digestID: item})`.
///
/// Namespaces and items keep the order the MSO issuer produced them in.
pub fn to_issuer_namespaces(disclosure_map: &DisclosureMap) -> Result<IssuerNamespaces, CborError> {
    disclosure_map
        .iter()
        .map(|(name, items)| {
            items
                .iter()
                .map(|(digest_id, item)| {
                    let attribute: DisclosedAttribute =
                        [(*digest_id, item.clone())].into_iter().collect();
                    Tag24::new(attribute)
                })
                .collect::<Result<Vec<_>, _>>()
                .map(|entries| (name.clone(), entries))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::{helpers::OrderedMap, DigestId, IssuerSignedItem};
    use ciborium::Value;

    fn item(id: i32, name: &str, value: Value) -> IssuerSignedItem {
        IssuerSignedItem {
            digest_id: DigestId::new(id),
            random: vec![0xAA; 16].into(),
            element_identifier: name.into(),
            element_value: value,
        }
    }

    fn disclosures() -> DisclosureMap {
        let mdl: OrderedMap<_, _> = [
            (DigestId::new(9), item(9, "given_name", Value::Text("ALICE".into()))),
            (DigestId::new(2), item(2, "age_in_years", Value::Integer(30.into()))),
        ]
        .into_iter()
        .collect();
        let aamva: OrderedMap<_, _> = [(DigestId::new(4), item(4, "sex", Value::Integer(2.into())))]
            .into_iter()
            .collect();
        [
            ("org.iso.18013.5.1".to_string(), mdl),
            ("org.iso.18013.5.1.aamva".to_string(), aamva),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn order_is_preserved() {
        let namespaces = to_issuer_namespaces(&disclosures()).unwrap();
        let names: Vec<&str> = namespaces.keys().map(String::as_str).collect();
        assert_eq!(names, ["org.iso.18013.5.1", "org.iso.18013.5.1.aamva"]);

        let ids: Vec<i32> = namespaces["org.iso.18013.5.1"]
            .iter()
            .flat_map(|entry| entry.as_ref().keys().map(DigestId::value).collect::<Vec<_>>())
            .collect();
        assert_eq!(ids, [9, 2]);
    }

    #[test]
    fn entry_is_a_tagged_singleton_map() {
        let namespaces = to_issuer_namespaces(&disclosures()).unwrap();
        let entry = &namespaces.get("org.iso.18013.5.1").unwrap()[0];

        let encoded = crate::cbor::to_vec(entry).unwrap();
        let Value::Tag(24, inner) = crate::cbor::from_slice::<Value>(&encoded).unwrap() else {
            panic!("expected tag 24");
        };
        let Value::Bytes(inner) = *inner else {
            panic!("expected a byte string");
        };
        let Value::Map(map) = crate::cbor::from_slice::<Value>(&inner).unwrap() else {
            panic!("expected a map");
        };
        assert_eq!(map.len(), 1);
        assert_eq!(map[0].0, Value::Integer(9.into()));
    }

    #[test]
    fn integers_are_not_retyped() {
        let namespaces = to_issuer_namespaces(&disclosures()).unwrap();
        let entry = &namespaces.get("org.iso.18013.5.1").unwrap()[1];
        let decoded: DisclosedAttribute = crate::cbor::from_slice(entry.inner_bytes()).unwrap();
        let item = decoded.get(&DigestId::new(2)).unwrap();
        assert_eq!(item.element_value, Value::Integer(30.into()));
        assert_eq!(crate::cbor::to_vec(&decoded).unwrap(), entry.inner_bytes());
    }
}
