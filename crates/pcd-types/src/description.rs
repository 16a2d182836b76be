//! SNOMED CT Description type.
//!
//! This module provides the `Rf2Description` struct representing a description
//! from an RF2 Description file.

use crate::{DescriptionType, EffectiveTime, SctId, SimpleDefinition};

/// A SNOMED CT description from the RF2 Description file.
///
/// Represents a row from `sct2_Description_*.txt` files in an RF2 release.
/// Full releases carry every historical row, so the same `id` may appear
/// several times with increasing `effective_time`.
///
/// # Examples
///
/// ```
/// use pcd_types::{Rf2Description, DescriptionType};
///
/// let description = Rf2Description {
///     id: 754786011,
///     effective_time: 20020131,
///     active: true,
///     module_id: 999000011000001104,
///     concept_id: 73211009,
///     language_code: "en".to_string(),
///     type_id: 900000000000003001, // FSN
///     term: "Diabetes mellitus (disorder)".to_string(),
///     case_significance_id: 900000000000448009,
/// };
///
/// assert_eq!(description.description_type(), DescriptionType::Fsn);
/// assert!(description.to_definition().is_main);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rf2Description {
    /// Unique identifier for this description (SCTID).
    pub id: SctId,
    /// Effective date in YYYYMMDD format.
    pub effective_time: EffectiveTime,
    /// Whether this description is active.
    pub active: bool,
    /// The module containing this description.
    pub module_id: SctId,
    /// The concept this description belongs to.
    pub concept_id: SctId,
    /// ISO language code (e.g., "en").
    pub language_code: String,
    /// Type of description (FSN, Synonym, etc.).
    pub type_id: SctId,
    /// The description text/term.
    pub term: String,
    /// Case significance rules for this term.
    pub case_significance_id: SctId,
}

impl Rf2Description {
    /// Classifies this row for term selection.
    pub fn description_type(&self) -> DescriptionType {
        DescriptionType::from_id(self.type_id)
    }

    /// Returns true if this is a Fully Specified Name.
    pub fn is_fsn(&self) -> bool {
        self.description_type() == DescriptionType::Fsn
    }

    /// Converts this row into its compact dictionary form.
    ///
    /// The flags are taken from this row alone.
    pub fn to_definition(&self) -> SimpleDefinition {
        SimpleDefinition {
            term: self.term.clone(),
            effective_time: self.effective_time,
            is_active: self.active,
            is_main: self.is_fsn(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_description(type_id: SctId, active: bool) -> Rf2Description {
        Rf2Description {
            id: 754786011,
            effective_time: 20020131,
            active,
            module_id: 999000011000001104,
            concept_id: 73211009,
            language_code: "en".to_string(),
            type_id,
            term: "Diabetes mellitus (disorder)".to_string(),
            case_significance_id: 900000000000448009,
        }
    }

    #[test]
    fn test_rf2_description_fsn() {
        let desc = make_description(DescriptionType::FSN_ID, true);
        assert!(desc.is_fsn());
        assert_eq!(desc.description_type(), DescriptionType::Fsn);
    }

    #[test]
    fn test_rf2_description_synonym() {
        let desc = make_description(DescriptionType::SYNONYM_ID, true);
        assert!(!desc.is_fsn());
        assert_eq!(desc.description_type(), DescriptionType::Synonym);
    }

    #[test]
    fn test_to_definition_flags() {
        let def = make_description(DescriptionType::FSN_ID, false).to_definition();
        assert_eq!(def.term, "Diabetes mellitus (disorder)");
        assert_eq!(def.effective_time, 20020131);
        assert!(def.is_main);
        assert!(!def.is_active);

        let def = make_description(900000000000550004, true).to_definition();
        assert!(!def.is_main);
        assert!(def.is_active);
    }
}
