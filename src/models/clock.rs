//! `HH:MM` wall-clock times as used by bookings and events

use chrono::NaiveTime;
use serde::{Deserialize, Deserializer, Serializer, de::Error};

const FORMAT: &str = "%H:%M";

pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&time.format(FORMAT))
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
    let raw = String::deserialize(deserializer)?;
    NaiveTime::parse_from_str(&raw, FORMAT)
        .map_err(|_| D::Error::custom(format!("expected HH:MM, got {:?}", raw)))
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Serialize, Deserialize)]
    struct Slot {
        #[serde(with = "super")]
        at: NaiveTime,
    }

    #[test]
    fn test_minutes_precision_both_ways() {
        let slot: Slot = serde_json::from_str(r#"{"at":"09:30"}"#).unwrap();
        assert_eq!(slot.at, NaiveTime::from_hms_opt(9, 30, 0).unwrap());
        assert_eq!(serde_json::to_string(&slot).unwrap(), r#"{"at":"09:30"}"#);
    }

    #[test]
    fn test_other_formats_are_rejected() {
        assert!(serde_json::from_str::<Slot>(r#"{"at":"9.30"}"#).is_err());
        assert!(serde_json::from_str::<Slot>(r#"{"at":"25:00"}"#).is_err());
    }
}
