//! Table Catalog Snapshot
//!
//! Read-only view of the dining tables used during one matching pass.
//! Pairing is a symmetric relation carried by a shared `pair_group` id;
//! building the snapshot validates the relation so the matcher never sees
//! an asymmetric or dangling pairing.

use shared::models::DiningTable;
use std::collections::BTreeMap;

use super::EngineError;

/// A validated pair of combinable tables
#[derive(Debug, Clone)]
pub struct PairGroup {
    pub group_id: i64,
    /// Members ordered by id
    pub members: [DiningTable; 2],
}

impl PairGroup {
    pub fn total_capacity(&self) -> i32 {
        self.members[0].capacity + self.members[1].capacity
    }

    /// Both table ids, ascending
    pub fn table_ids(&self) -> [i64; 2] {
        [self.members[0].id, self.members[1].id]
    }

    pub fn min_id(&self) -> i64 {
        self.members[0].id
    }

    /// A pair is only offered as a whole: one inactive member disables it
    pub fn usable(&self) -> bool {
        self.members[0].is_active && self.members[1].is_active
    }
}

/// Catalog snapshot partitioned for matching
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    standalone: Vec<DiningTable>,
    pairs: Vec<PairGroup>,
}

impl Catalog {
    /// Build a snapshot from raw catalog rows.
    ///
    /// Rows must include inactive tables: a deactivated partner makes its
    /// group unusable, while a group with one or more than two rows total is
    /// a catalog inconsistency fault.
    pub fn from_tables(tables: Vec<DiningTable>) -> Result<Self, EngineError> {
        let mut standalone = Vec::new();
        let mut groups: BTreeMap<i64, Vec<DiningTable>> = BTreeMap::new();

        for table in tables {
            match table.pair_group {
                Some(group_id) => groups.entry(group_id).or_default().push(table),
                None => {
                    if table.is_active {
                        standalone.push(table);
                    }
                }
            }
        }

        let mut pairs = Vec::with_capacity(groups.len());
        for (group_id, members) in groups {
            match <[DiningTable; 2]>::try_from(members) {
                Ok(mut members) => {
                    members.sort_by_key(|t| t.id);
                    pairs.push(PairGroup { group_id, members });
                }
                Err(members) => {
                    return Err(EngineError::Catalog(format!(
                        "pair group {} has {} member(s), expected 2",
                        group_id,
                        members.len()
                    )));
                }
            }
        }

        standalone.sort_by_key(|t| t.id);
        Ok(Self { standalone, pairs })
    }

    /// Active tables with no pairing relation, ascending id
    pub fn standalone(&self) -> &[DiningTable] {
        &self.standalone
    }

    /// Pair groups with both members active
    pub fn usable_pairs(&self) -> impl Iterator<Item = &PairGroup> {
        self.pairs.iter().filter(|p| p.usable())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(id: i64, capacity: i32, pair_group: Option<i64>, is_active: bool) -> DiningTable {
        DiningTable {
            id,
            name: format!("T{id}"),
            capacity,
            pair_group,
            is_active,
        }
    }

    #[test]
    fn partitions_standalone_and_pairs() {
        let catalog = Catalog::from_tables(vec![
            table(1, 2, Some(7), true),
            table(2, 2, Some(7), true),
            table(3, 4, None, true),
        ])
        .unwrap();
        assert_eq!(catalog.standalone().len(), 1);
        assert_eq!(catalog.usable_pairs().count(), 1);
        let pair = catalog.usable_pairs().next().unwrap();
        assert_eq!(pair.table_ids(), [1, 2]);
        assert_eq!(pair.total_capacity(), 4);
    }

    #[test]
    fn inactive_standalone_is_dropped() {
        let catalog = Catalog::from_tables(vec![table(3, 4, None, false)]).unwrap();
        assert!(catalog.standalone().is_empty());
    }

    #[test]
    fn pair_with_inactive_member_is_unusable_not_a_fault() {
        let catalog = Catalog::from_tables(vec![
            table(1, 2, Some(7), true),
            table(2, 2, Some(7), false),
        ])
        .unwrap();
        assert_eq!(catalog.usable_pairs().count(), 0);
    }

    #[test]
    fn dangling_pair_group_is_a_fault() {
        let err = Catalog::from_tables(vec![table(1, 2, Some(7), true)]).unwrap_err();
        assert!(matches!(err, EngineError::Catalog(_)));
    }

    #[test]
    fn overfull_pair_group_is_a_fault() {
        let err = Catalog::from_tables(vec![
            table(1, 2, Some(7), true),
            table(2, 2, Some(7), true),
            table(3, 2, Some(7), true),
        ])
        .unwrap_err();
        assert!(matches!(err, EngineError::Catalog(_)));
    }
}
