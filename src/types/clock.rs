//! `"HH:MM"` wire format for wall-clock times
//!
//! Use with `#[serde(with = "crate::types::clock::hhmm")]` on `NaiveTime`
//! fields and `crate::types::clock::hhmm_option` on `Option<NaiveTime>`.

pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::services::scheduling::time::{format_hhmm, parse_hhmm};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_hhmm(*time))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_hhmm(&raw).map_err(serde::de::Error::custom)
    }
}

pub mod hhmm_option {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::services::scheduling::time::{format_hhmm, parse_hhmm};

    pub fn serialize<S: Serializer>(time: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error> {
        match time {
            Some(t) => serializer.serialize_some(&format_hhmm(*t)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveTime>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            Some(s) if !s.is_empty() => parse_hhmm(&s).map(Some).map_err(serde::de::Error::custom),
            _ => Ok(None),
        }
    }
}
