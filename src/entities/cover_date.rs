use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use derive_more::{From, Into};
use serde::de;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

const WIRE_FORMAT: &str = "%Y-%m-%d";

/// Cover date of an issue. On the wire it is strictly `YYYY-MM-DD`;
/// storage keeps it as a full timestamp at midnight UTC.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, From, Into)]
pub struct CoverDate(NaiveDate);

impl CoverDate {
    pub fn to_datetime(self) -> DateTime<Utc> {
        Utc.from_utc_datetime(&self.0.and_time(NaiveTime::MIN))
    }

    pub fn from_datetime(datetime: DateTime<Utc>) -> Self {
        CoverDate(datetime.date_naive())
    }
}

impl Serialize for CoverDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.format(WIRE_FORMAT).to_string())
    }
}

impl<'de> Deserialize<'de> for CoverDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        // chrono parses numeric fields leniently ("2011-2-3" would pass);
        // the wire format is exactly ten characters, zero-padded.
        let date = if s.len() == 10 {
            NaiveDate::parse_from_str(&s, WIRE_FORMAT).ok()
        } else {
            None
        }
        .ok_or_else(|| de::Error::custom(format!("cover date must be YYYY-MM-DD, got {:?}", s)))?;
        Ok(CoverDate(date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_on_the_wire() {
        let date: CoverDate = serde_json::from_str(r#""2011-02-03""#).unwrap();
        assert_eq!(serde_json::to_string(&date).unwrap(), r#""2011-02-03""#);
    }

    #[test]
    fn rejects_other_separators() {
        assert!(serde_json::from_str::<CoverDate>(r#""2011/02/03""#).is_err());
    }

    #[test]
    fn rejects_a_bare_year() {
        assert!(serde_json::from_str::<CoverDate>(r#""2011""#).is_err());
    }

    #[test]
    fn rejects_unpadded_components() {
        assert!(serde_json::from_str::<CoverDate>(r#""2011-2-3""#).is_err());
        assert!(serde_json::from_str::<CoverDate>(r#""2011-02-3""#).is_err());
    }

    #[test]
    fn survives_the_datetime_representation() {
        let date: CoverDate = serde_json::from_str(r#""1986-09-01""#).unwrap();
        assert_eq!(CoverDate::from_datetime(date.to_datetime()), date);
    }
}
