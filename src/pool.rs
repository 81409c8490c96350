//! Object Pools (C4): typed, keyed containers with part-scoped lookup and
//! score fallback (spec.md §4.4).
//!
//! A pool is a mapping `(part, cmper[, cmper2], [inci]) -> record`, kept in
//! a `BTreeMap` so enumeration order is the key order — deterministic
//! across loads of the same bytes (spec.md §8 "Pool determinism"), the way
//! the teacher's `domain::score` keeps its staff/measure collections in
//! insertion-stable `Vec`s rather than a hash map whose iteration order
//! would vary.

use std::collections::BTreeMap;

use crate::ids::{Cmper, EntryNumber, Inci, PartId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PoolKey {
    pub part: PartId,
    pub cmper: Cmper,
    pub cmper2: Cmper,
    pub inci: Inci,
}

impl PoolKey {
    pub fn new(part: PartId, cmper: Cmper) -> Self {
        Self { part, cmper, cmper2: Cmper(0), inci: Inci(0) }
    }

    pub fn with_cmper2(mut self, cmper2: Cmper) -> Self {
        self.cmper2 = cmper2;
        self
    }

    pub fn with_inci(mut self, inci: Inci) -> Self {
        self.inci = inci;
        self
    }

    fn scored(self, part: PartId) -> Self {
        Self { part, ..self }
    }
}

/// A typed, keyed container for one record type (spec.md §4.4).
#[derive(Debug, Clone)]
pub struct Pool<T> {
    records: BTreeMap<PoolKey, T>,
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self { records: BTreeMap::new() }
    }
}

impl<T> Pool<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insertion during load; a later `add` with the same key replaces the
    /// earlier one, signalling a part override (spec.md §4.4 "add").
    pub fn add(&mut self, key: PoolKey, record: T) {
        self.records.insert(key, record);
    }

    /// Part-scoped lookup with score fallback (spec.md §3 "Part-scoped
    /// lookup invariant", §4.4 "get").
    pub fn get(&self, key: PoolKey) -> Option<&T> {
        self.records.get(&key).or_else(|| {
            if key.part == crate::ids::SCORE_PARTID {
                None
            } else {
                self.records.get(&key.scored(crate::ids::SCORE_PARTID))
            }
        })
    }

    /// Exact-key mutable lookup, no score fallback — used by the linker's
    /// forwarding resolvers, which always write the same key they read
    /// (spec.md §4.5, §3 "Lifecycle" runtime-computed forwarding fields).
    pub fn get_mut(&mut self, key: PoolKey) -> Option<&mut T> {
        self.records.get_mut(&key)
    }

    /// All records for `part` in key order; falls back to every score
    /// record if the part has none of its own (spec.md §4.4 "getArray").
    pub fn get_array(&self, part: PartId) -> Vec<&T> {
        let own: Vec<&T> = self.records.iter().filter(|(k, _)| k.part == part).map(|(_, v)| v).collect();
        if !own.is_empty() || part == crate::ids::SCORE_PARTID {
            return own;
        }
        self.records
            .iter()
            .filter(|(k, _)| k.part == crate::ids::SCORE_PARTID)
            .map(|(_, v)| v)
            .collect()
    }

    /// All records in the pool regardless of part, in key order — used by
    /// resolvers that need to see every part's overrides (spec.md §4.5).
    pub fn iter(&self) -> impl Iterator<Item = (&PoolKey, &T)> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// The Staff pool additionally exposes `getRawStaff`, bypassing the deep
/// clone that `StaffComposite::create_current` performs (spec.md §4.4
/// "getRawStaff" — "used only by the composite engine").
impl Pool<crate::record::others::Staff> {
    pub fn get_raw_staff(&self, part: PartId, cmper: Cmper) -> Option<&crate::record::others::Staff> {
        self.get(PoolKey::new(part, cmper))
    }
}

/// The entries pool is keyed solely by `EntryNumber`, in insertion (file)
/// order (spec.md §4.4 "For the entry pool...").
#[derive(Debug, Clone, Default)]
pub struct EntryPool {
    order: Vec<EntryNumber>,
    by_number: std::collections::HashMap<EntryNumber, crate::record::entries::Entry>,
}

impl EntryPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, entry: crate::record::entries::Entry) {
        let number = entry.number;
        if !self.by_number.contains_key(&number) {
            self.order.push(number);
        }
        self.by_number.insert(number, entry);
    }

    pub fn get(&self, number: EntryNumber) -> Option<&crate::record::entries::Entry> {
        self.by_number.get(&number)
    }

    /// All entries in file/insertion order (spec.md §4.4).
    pub fn get_array(&self) -> Vec<&crate::record::entries::Entry> {
        self.order.iter().filter_map(|n| self.by_number.get(n)).collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// A details pool keyed by `(part, entnum)` rather than `(cmper1, cmper2)` —
/// `TupletDef`, `SecondaryBeamBreak`, `LyricAssign` attach to a specific
/// entry (spec.md §6 "Details | cmper1, cmper2 or entnum").
#[derive(Debug, Clone, Default)]
pub struct EntryKeyedPool<T> {
    records: BTreeMap<(PartId, EntryNumber), Vec<T>>,
}

impl<T> EntryKeyedPool<T> {
    pub fn new() -> Self {
        Self { records: BTreeMap::new() }
    }

    pub fn add(&mut self, part: PartId, entry: EntryNumber, record: T) {
        self.records.entry((part, entry)).or_default().push(record);
    }

    /// All records attached to `entry`, part-scoped with score fallback.
    pub fn get(&self, part: PartId, entry: EntryNumber) -> &[T] {
        if let Some(records) = self.records.get(&(part, entry)) {
            return records;
        }
        if part != crate::ids::SCORE_PARTID {
            if let Some(records) = self.records.get(&(crate::ids::SCORE_PARTID, entry)) {
                return records;
            }
        }
        &[]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::others::Staff;

    #[test]
    fn part_scoped_get_falls_back_to_score() {
        let mut pool = Pool::<Staff>::new();
        pool.add(PoolKey::new(crate::ids::SCORE_PARTID, Cmper(1)), Staff { cmper: Cmper(1), ..Default::default() });

        let part = PartId(2);
        assert!(pool.get(PoolKey::new(part, Cmper(1))).is_some());
        assert!(pool.get(PoolKey::new(part, Cmper(99))).is_none());
    }

    #[test]
    fn part_override_takes_precedence() {
        let mut pool = Pool::<Staff>::new();
        let part = PartId(2);
        pool.add(PoolKey::new(crate::ids::SCORE_PARTID, Cmper(1)), Staff {
            cmper: Cmper(1),
            full_name: "Score".into(),
            ..Default::default()
        });
        pool.add(PoolKey::new(part, Cmper(1)), Staff { cmper: Cmper(1), full_name: "Part".into(), ..Default::default() });

        assert_eq!(pool.get(PoolKey::new(part, Cmper(1))).unwrap().full_name, "Part");
        assert_eq!(pool.get(PoolKey::new(crate::ids::SCORE_PARTID, Cmper(1))).unwrap().full_name, "Score");
    }

    #[test]
    fn get_array_is_key_ordered_and_deterministic() {
        let mut pool = Pool::<Staff>::new();
        for cmper in [3u16, 1, 2] {
            pool.add(
                PoolKey::new(crate::ids::SCORE_PARTID, Cmper(cmper)),
                Staff { cmper: Cmper(cmper), ..Default::default() },
            );
        }
        let array = pool.get_array(crate::ids::SCORE_PARTID);
        let cmpers: Vec<u16> = array.iter().map(|s| s.cmper.value()).collect();
        assert_eq!(cmpers, vec![1, 2, 3]);
    }

    #[test]
    fn entry_pool_preserves_insertion_order() {
        let mut pool = EntryPool::new();
        for n in [EntryNumber(5), EntryNumber(2), EntryNumber(8)] {
            pool.add(crate::record::entries::Entry { number: n, ..Default::default() });
        }
        let numbers: Vec<u32> = pool.get_array().iter().map(|e| e.number.0).collect();
        assert_eq!(numbers, vec![5, 2, 8]);
    }
}
