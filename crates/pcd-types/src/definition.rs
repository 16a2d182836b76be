//! The compact "best term" record shared by the dictionary, the definitions
//! artifact and the unknown-code cache.

use serde::{Deserialize, Serialize};

use crate::serde_format::{effective_time, flag};
use crate::EffectiveTime;

/// A single description reduced to what the UI needs.
///
/// Serialized as `{"t": term, "e": "YYYYMMDD", "a": 1, "m": 1}` where `a`
/// and `m` are omitted when false.
///
/// # Example
///
/// ```
/// use pcd_types::SimpleDefinition;
///
/// let def = SimpleDefinition {
///     term: "Aspirin".to_string(),
///     effective_time: 20200101,
///     is_active: true,
///     is_main: false,
/// };
///
/// let json = serde_json::to_string(&def).unwrap();
/// assert_eq!(json, r#"{"t":"Aspirin","e":"20200101","a":1}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleDefinition {
    /// Display term.
    #[serde(rename = "t")]
    pub term: String,
    /// Effective time of the row the term came from.
    #[serde(rename = "e", with = "effective_time")]
    pub effective_time: EffectiveTime,
    /// Whether the description was active.
    #[serde(
        rename = "a",
        default,
        with = "flag",
        skip_serializing_if = "flag::is_unset"
    )]
    pub is_active: bool,
    /// Whether the description is the Fully Specified Name.
    #[serde(
        rename = "m",
        default,
        with = "flag",
        skip_serializing_if = "flag::is_unset"
    )]
    pub is_main: bool,
}
