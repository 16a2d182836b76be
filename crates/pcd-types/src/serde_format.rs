//! Serde adapters for the compact JSON shapes shared with the web UI.
//!
//! Artifacts written by earlier runs (and the seed dictionary) carry ids and
//! effective times as strings, while the terminology browser returns some of
//! them as numbers. Readers accept both; writers always emit strings.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serializer};

use crate::{EffectiveTime, SctId};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(u64),
    String(String),
}

impl NumberOrString {
    fn into_u64<E: serde::de::Error>(self) -> Result<u64, E> {
        match self {
            Self::Number(n) => Ok(n),
            Self::String(s) => s
                .trim()
                .parse::<u64>()
                .map_err(|_| E::custom(format!("expected a numeric string, found {s:?}"))),
        }
    }
}

/// `YYYYMMDD` effective times, written as strings.
pub mod effective_time {
    use super::*;

    pub fn serialize<S: Serializer>(value: &EffectiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<EffectiveTime, D::Error> {
        let raw = NumberOrString::deserialize(deserializer)?.into_u64::<D::Error>()?;
        EffectiveTime::try_from(raw)
            .map_err(|_| D::Error::custom(format!("effective time out of range: {raw}")))
    }
}

/// Boolean flags stored as `1` when set and omitted otherwise.
pub mod flag {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawFlag {
        Bool(bool),
        Number(u64),
    }

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        Ok(match RawFlag::deserialize(deserializer)? {
            RawFlag::Bool(b) => b,
            RawFlag::Number(n) => n != 0,
        })
    }

    pub fn is_unset(value: &bool) -> bool {
        !*value
    }
}

/// A single SCTID, written as a string.
pub mod sctid {
    use super::*;

    pub fn serialize<S: Serializer>(value: &SctId, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SctId, D::Error> {
        NumberOrString::deserialize(deserializer)?.into_u64::<D::Error>()
    }
}

/// Lists of SCTIDs, written as strings so JavaScript never rounds them.
pub mod sctid_list {
    use super::*;

    pub fn serialize<S: Serializer>(values: &[SctId], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(values.iter().map(|v| v.to_string()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<SctId>, D::Error> {
        Vec::<NumberOrString>::deserialize(deserializer)?
            .into_iter()
            .map(NumberOrString::into_u64::<D::Error>)
            .collect()
    }
}
