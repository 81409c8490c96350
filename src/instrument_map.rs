//! Instrument-Map Builder (C10): three-pass grouping of staves into
//! instruments (spec.md §4.10).

use std::collections::{BTreeMap, BTreeSet};

use crate::document::Document;
use crate::ids::{Cmper, PartId};

/// One instrument's staves, keyed by the staff that names the instrument
/// in the map (spec.md §4.10 "keyed by the top staff").
#[derive(Debug, Clone, Default)]
pub struct InstrumentInfo {
    pub top_staff: Cmper,
    /// Staff id -> 0-based sequence position within the instrument, top to
    /// bottom.
    pub staves: BTreeMap<Cmper, u32>,
    pub staff_group_id: Option<Cmper>,
    pub multistaff_group_id: Option<Cmper>,
}

impl InstrumentInfo {
    pub fn is_multi_staff(&self) -> bool {
        self.staves.len() > 1
    }
}

/// Runs the three detection passes over `part`'s scroll-view staves
/// (spec.md §4.10 steps 1-3).
pub fn build_instrument_map(doc: &Document, part: PartId) -> BTreeMap<Cmper, InstrumentInfo> {
    let mut staves: Vec<Cmper> = doc.staves.get_array(part).iter().map(|s| s.cmper).collect();
    staves.sort_unstable();

    let mut claimed: BTreeSet<Cmper> = BTreeSet::new();
    let mut map: BTreeMap<Cmper, InstrumentInfo> = BTreeMap::new();

    // Pass 1: defined multi-staff instruments.
    for &staff_id in &staves {
        if claimed.contains(&staff_id) {
            continue;
        }
        let Some(staff) = doc.staves.get(crate::pool::PoolKey::new(part, staff_id)) else { continue };
        let Some(group_id) = staff.multi_staff_inst_id else { continue };
        let Some(group) = doc.multi_staff_instrument_groups.get(crate::pool::PoolKey::new(part, group_id)) else { continue };
        if group.staves.is_empty() {
            continue;
        }
        let top = group.staves[0];
        if claimed.contains(&top) {
            continue;
        }
        let mut info = InstrumentInfo { top_staff: top, multistaff_group_id: Some(group_id), ..Default::default() };
        for (index, &member) in group.staves.iter().enumerate() {
            info.staves.insert(member, index as u32);
            claimed.insert(member);
        }
        map.insert(top, info);
    }

    // Pass 2: visual brackets — a staff group whose members all share a
    // non-blank instUuid, none of them already claimed.
    for (_, group) in doc.staff_groups.iter() {
        let members = doc.staff_group_staves(part, group.cmper);
        if members.is_empty() {
            continue;
        }
        if members.iter().any(|s| claimed.contains(s)) {
            continue;
        }
        let uuids: Vec<&str> = members
            .iter()
            .filter_map(|s| doc.staves.get(crate::pool::PoolKey::new(part, *s)))
            .map(|s| s.inst_uuid.as_str())
            .collect();
        if uuids.len() != members.len() {
            continue;
        }
        let first = uuids[0];
        if first.is_empty() || !uuids.iter().all(|u| *u == first) {
            continue;
        }
        let top = members[0];
        let mut info = InstrumentInfo { top_staff: top, staff_group_id: Some(group.cmper), ..Default::default() };
        for (index, &member) in members.iter().enumerate() {
            info.staves.insert(member, index as u32);
            claimed.insert(member);
        }
        map.insert(top, info);
    }

    // Pass 3: singleton fallback.
    for &staff_id in &staves {
        if claimed.contains(&staff_id) {
            continue;
        }
        let mut info = InstrumentInfo { top_staff: staff_id, ..Default::default() };
        info.staves.insert(staff_id, 0);
        claimed.insert(staff_id);
        map.insert(staff_id, info);
    }

    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SCORE_PARTID;
    use crate::pool::PoolKey;
    use crate::record::others::{MultiStaffInstrumentGroup, Staff};

    #[test]
    fn defined_multi_staff_instrument_groups_its_staves() {
        let mut doc = Document::empty();
        doc.staves.add(PoolKey::new(SCORE_PARTID, Cmper(1)), Staff { cmper: Cmper(1), multi_staff_inst_id: Some(Cmper(10)), ..Default::default() });
        doc.staves.add(PoolKey::new(SCORE_PARTID, Cmper(2)), Staff { cmper: Cmper(2), multi_staff_inst_id: Some(Cmper(10)), ..Default::default() });
        doc.multi_staff_instrument_groups.add(
            PoolKey::new(SCORE_PARTID, Cmper(10)),
            MultiStaffInstrumentGroup { cmper: Cmper(10), staves: vec![Cmper(1), Cmper(2)], ..Default::default() },
        );

        let map = build_instrument_map(&doc, SCORE_PARTID);
        assert_eq!(map.len(), 1);
        let info = &map[&Cmper(1)];
        assert!(info.is_multi_staff());
        assert_eq!(info.staves.get(&Cmper(2)), Some(&1));
    }

    #[test]
    fn unclaimed_staves_become_singletons() {
        let mut doc = Document::empty();
        doc.staves.add(PoolKey::new(SCORE_PARTID, Cmper(5)), Staff { cmper: Cmper(5), ..Default::default() });

        let map = build_instrument_map(&doc, SCORE_PARTID);
        assert_eq!(map.len(), 1);
        assert!(!map[&Cmper(5)].is_multi_staff());
    }

    #[test]
    fn bracketed_run_with_shared_uuid_forms_one_instrument() {
        let mut doc = Document::empty();
        doc.staves.add(PoolKey::new(SCORE_PARTID, Cmper(3)), Staff { cmper: Cmper(3), inst_uuid: "piano".into(), ..Default::default() });
        doc.staves.add(PoolKey::new(SCORE_PARTID, Cmper(4)), Staff { cmper: Cmper(4), inst_uuid: "piano".into(), ..Default::default() });
        doc.staff_groups.add(
            PoolKey::new(SCORE_PARTID, Cmper(20)),
            crate::record::details::StaffGroup { cmper: Cmper(20), ..Default::default() },
        );
        doc.set_staff_group_staves(SCORE_PARTID, Cmper(20), vec![Cmper(3), Cmper(4)]);

        let map = build_instrument_map(&doc, SCORE_PARTID);
        assert_eq!(map.len(), 1);
        assert!(map[&Cmper(3)].is_multi_staff());
    }
}
