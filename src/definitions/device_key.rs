use coset::{AsCborValue, CoseKey};
use serde::{ser, Serialize, Serializer};

/// Device key binding carried by the MSO.
///
/// Issuance leaves the key unset, which encodes as `{"deviceKey": null}`.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceKeyInfo {
    #[serde(serialize_with = "cose_key")]
    pub device_key: Option<CoseKey>,
}

fn cose_key<S: Serializer>(key: &Option<CoseKey>, serializer: S) -> Result<S::Ok, S::Error> {
    match key {
        Some(key) => key
            .clone()
            .to_cbor_value()
            .map_err(|e| ser::Error::custom(format!("unable to encode device key: {e:?}")))?
            .serialize(serializer),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ciborium::Value;

    #[test]
    fn absent_key_is_null() {
        let bytes = crate::cbor::to_vec(&DeviceKeyInfo::default()).unwrap();
        let value: Value = crate::cbor::from_slice(&bytes).unwrap();
        assert_eq!(
            value,
            Value::Map(vec![(Value::Text("deviceKey".into()), Value::Null)])
        );
    }
}
