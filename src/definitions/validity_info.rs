use serde::{ser, Serialize, Serializer};
use time::{format_description::FormatItem, macros::format_description, OffsetDateTime};

/// `tdate` layout used for the MSO validity fields, always in UTC and
/// without fractional seconds.
const TDATE: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]Z");

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidityInfo {
    #[serde(serialize_with = "tdate")]
    pub signed: OffsetDateTime,
    #[serde(serialize_with = "tdate")]
    pub valid_from: OffsetDateTime,
    #[serde(serialize_with = "tdate")]
    pub valid_until: OffsetDateTime,
}

/// Format a timestamp as RFC 3339 text, converted to UTC first.
pub fn format_tdate(dt: &OffsetDateTime) -> Result<String, time::error::Format> {
    dt.to_offset(time::UtcOffset::UTC).format(TDATE)
}

fn tdate<S: Serializer>(dt: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error> {
    let text = format_tdate(dt).map_err(ser::Error::custom)?;
    ciborium::tag::Required::<String, 0>(text).serialize(serializer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ciborium::Value;
    use time::macros::datetime;

    #[test]
    fn fields_encode_as_tag_zero_text() {
        let info = ValidityInfo {
            signed: datetime!(2024-01-02 03:04:05.678 UTC),
            valid_from: datetime!(2024-01-02 03:04:05 UTC),
            valid_until: datetime!(2029-01-02 05:04:05 +02:00),
        };
        let bytes = crate::cbor::to_vec(&info).unwrap();
        let value: Value = crate::cbor::from_slice(&bytes).unwrap();
        let Value::Map(entries) = value else {
            panic!("expected a map");
        };
        assert_eq!(entries[0].0, Value::Text("signed".into()));
        assert_eq!(
            entries[0].1,
            Value::Tag(0, Box::new(Value::Text("2024-01-02T03:04:05Z".into())))
        );
        assert_eq!(
            entries[2].1,
            Value::Tag(0, Box::new(Value::Text("2029-01-02T03:04:05Z".into())))
        );
    }
}
