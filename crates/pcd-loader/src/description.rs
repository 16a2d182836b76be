//! Rows of the Full `sct2_Description_*` file.

use pcd_types::Rf2Description;

use crate::parser::{Fields, Rf2Record};
use crate::types::Rf2Result;

impl Rf2Record for Rf2Description {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "effectiveTime",
        "active",
        "moduleId",
        "conceptId",
        "languageCode",
        "typeId",
        "term",
        "caseSignificanceId",
    ];

    // conceptId
    const KEY_COLUMN: usize = 4;

    fn from_fields(fields: Fields<'_>) -> Rf2Result<Self> {
        Ok(Rf2Description {
            id: fields.sctid(0)?,
            effective_time: fields.effective_time(1)?,
            active: fields.flag(2)?,
            module_id: fields.sctid(3)?,
            concept_id: fields.sctid(4)?,
            language_code: fields.text(5),
            type_id: fields.sctid(6)?,
            term: fields.text(7),
            case_significance_id: fields.sctid(8)?,
        })
    }
}
