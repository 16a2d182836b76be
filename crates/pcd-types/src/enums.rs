//! SNOMED CT enumeration types.
//!
//! Only the description type matters for the refset dictionary: it decides
//! whether a description is the concept's Fully Specified Name ("main") or
//! one of its synonyms.

use crate::SctId;

/// How a description takes part in term selection.
///
/// Anything that is not a Fully Specified Name, textual definitions
/// included, is treated as a synonym.
///
/// # Examples
///
/// ```
/// use pcd_types::DescriptionType;
///
/// assert_eq!(DescriptionType::from_id(900000000000003001), DescriptionType::Fsn);
/// assert_eq!(DescriptionType::from_id(900000000000550004), DescriptionType::Synonym);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum DescriptionType {
    /// Fully Specified Name - unambiguous description with semantic tag.
    Fsn,
    /// Any other acceptable term for the concept.
    Synonym,
}

impl DescriptionType {
    /// SCTID for Fully Specified Name type.
    pub const FSN_ID: SctId = 900000000000003001;
    /// SCTID for Synonym type.
    pub const SYNONYM_ID: SctId = 900000000000013009;

    /// Classifies a description `typeId`.
    pub fn from_id(id: SctId) -> Self {
        if id == Self::FSN_ID {
            Self::Fsn
        } else {
            Self::Synonym
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_description_type_conversion() {
        assert_eq!(DescriptionType::from_id(900000000000003001), DescriptionType::Fsn);
        assert_eq!(DescriptionType::from_id(900000000000013009), DescriptionType::Synonym);
        assert_eq!(DescriptionType::from_id(12345), DescriptionType::Synonym);
    }
}
