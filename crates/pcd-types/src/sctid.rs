//! SNOMED CT Identifier (SCTID) type.

/// A SNOMED CT identifier (SCTID).
///
/// SCTIDs are 64-bit unsigned integers that uniquely identify components
/// within SNOMED CT: concepts, descriptions, reference sets and reference
/// set members alike.
///
/// # Examples
///
/// ```
/// use pcd_types::SctId;
///
/// let concept_id: SctId = 1322781000000102;
/// let fsn_type: SctId = 900000000000003001;
/// ```
pub type SctId = u64;

/// Effective time of an RF2 row, as a `YYYYMMDD` integer.
///
/// Integer ordering matches chronological ordering, which is all the
/// "latest row wins" rules need.
pub type EffectiveTime = u32;
