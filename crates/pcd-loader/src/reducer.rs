//! Latest-version-wins reduction shared by every RF2 table.
//!
//! RF2 Full files are append-only change logs: each row id can appear once
//! per release in which it changed. Both tables the pipeline builds keep
//! only the most recent row per id, with the same tie rule (an equal
//! effective time never replaces what is already stored).

use std::collections::BTreeMap;

use pcd_types::{EffectiveTime, SimpleDefinition};

use crate::types::Rf2Result;

/// A record that has several versions distinguished by effective time.
pub trait Versioned: Sized {
    /// Effective time of this version.
    fn effective_time(&self) -> EffectiveTime;

    /// Checks an incoming version of the same id against the stored one.
    ///
    /// Runs before the effective times are compared, so an older row that
    /// contradicts the stored one is still rejected.
    fn check_consistent(&self, _incoming: &Self) -> Rf2Result<()> {
        Ok(())
    }

    /// Replaces this version with a newer one.
    fn supersede(&mut self, incoming: Self) {
        *self = incoming;
    }
}

/// What [`upsert_latest`] did with a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    /// The id had not been seen before.
    Inserted,
    /// The row was newer and replaced the stored version.
    Superseded,
    /// The row was not newer and was dropped.
    Ignored,
}

/// Inserts `incoming` under `key`, or replaces the stored version if
/// `incoming` is strictly newer.
pub fn upsert_latest<K: Ord, R: Versioned>(
    table: &mut BTreeMap<K, R>,
    key: K,
    incoming: R,
) -> Rf2Result<Upsert> {
    match table.get_mut(&key) {
        None => {
            table.insert(key, incoming);
            Ok(Upsert::Inserted)
        }
        Some(existing) => {
            existing.check_consistent(&incoming)?;
            if incoming.effective_time() > existing.effective_time() {
                existing.supersede(incoming);
                Ok(Upsert::Superseded)
            } else {
                Ok(Upsert::Ignored)
            }
        }
    }
}

impl Versioned for SimpleDefinition {
    fn effective_time(&self) -> EffectiveTime {
        self.effective_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Rf2Error;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        et: EffectiveTime,
        owner: u64,
        value: &'static str,
    }

    impl Versioned for Row {
        fn effective_time(&self) -> EffectiveTime {
            self.et
        }

        fn check_consistent(&self, incoming: &Self) -> Rf2Result<()> {
            if self.owner != incoming.owner {
                return Err(Rf2Error::DataIntegrity {
                    member_id: 0,
                    refset_id: 0,
                    previous: self.owner,
                    found: incoming.owner,
                });
            }
            Ok(())
        }
    }

    fn row(et: EffectiveTime, value: &'static str) -> Row {
        Row { et, owner: 1, value }
    }

    #[test]
    fn test_newer_row_replaces_older() {
        let mut table = BTreeMap::new();
        assert_eq!(upsert_latest(&mut table, 1, row(20200101, "a")).unwrap(), Upsert::Inserted);
        assert_eq!(upsert_latest(&mut table, 1, row(20210101, "b")).unwrap(), Upsert::Superseded);
        assert_eq!(table[&1].value, "b");
    }

    #[test]
    fn test_older_and_equal_rows_are_ignored() {
        let mut table = BTreeMap::new();
        upsert_latest(&mut table, 1, row(20210101, "b")).unwrap();
        assert_eq!(upsert_latest(&mut table, 1, row(20200101, "a")).unwrap(), Upsert::Ignored);
        assert_eq!(upsert_latest(&mut table, 1, row(20210101, "c")).unwrap(), Upsert::Ignored);
        assert_eq!(table[&1].value, "b");
    }

    #[test]
    fn test_consistency_checked_even_for_older_rows() {
        let mut table = BTreeMap::new();
        upsert_latest(&mut table, 1, row(20210101, "b")).unwrap();
        let stale_conflict = Row {
            et: 20000101,
            owner: 2,
            value: "x",
        };
        assert!(matches!(
            upsert_latest(&mut table, 1, stale_conflict),
            Err(Rf2Error::DataIntegrity { previous: 1, found: 2, .. })
        ));
    }
}
