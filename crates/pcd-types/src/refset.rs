//! SNOMED CT simple reference set membership.
//!
//! A simple refset row says "component X is (or is no longer) a member of
//! refset R". Primary Care Domain code-lists are published as simple refsets
//! whose own concept id names the list.
//!
//! # Example
//!
//! ```
//! use pcd_types::Rf2SimpleRefsetMember;
//!
//! let member = Rf2SimpleRefsetMember {
//!     id: 12345678901,
//!     effective_time: 20200101,
//!     active: true,
//!     module_id: 999000011000230102,
//!     refset_id: 999012891000230104,
//!     referenced_component_id: 1322781000000102,
//! };
//!
//! assert!(member.active);
//! ```

use crate::{EffectiveTime, SctId};
use serde::{Deserialize, Serialize};

/// A simple reference set member from RF2 SimpleRefset files.
///
/// # RF2 Columns
///
/// | Column | Type | Description |
/// |--------|------|-------------|
/// | id | SCTID | Unique identifier for this member |
/// | effectiveTime | Integer | Date in YYYYMMDD format |
/// | active | Boolean | Whether this membership is active |
/// | moduleId | SCTID | Module containing this member |
/// | refsetId | SCTID | The reference set this member belongs to |
/// | referencedComponentId | SCTID | The component that is a member |
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rf2SimpleRefsetMember {
    /// Unique identifier for this reference set member.
    pub id: SctId,
    /// Effective time as YYYYMMDD integer.
    pub effective_time: EffectiveTime,
    /// Whether this membership is currently active.
    pub active: bool,
    /// Module this member belongs to.
    pub module_id: SctId,
    /// The reference set this member belongs to.
    pub refset_id: SctId,
    /// The concept that is a member of the refset.
    pub referenced_component_id: SctId,
}
