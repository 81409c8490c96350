//! Staff Composite Engine (C7): overlay time-scoped staff-style
//! assignments onto a base staff (spec.md §4.7).

use crate::document::Document;
use crate::error::MusxError;
use crate::ids::{Cmper, Edu, PartId};
use crate::record::others::{Staff, StaffStyleMask};

/// A deep copy of the raw staff augmented with whichever `StaffStyle`
/// records overlap the requested instant (spec.md §4.7).
#[derive(Debug, Clone, Default)]
pub struct StaffComposite {
    pub staff: Staff,
    /// Tracks which override groups have been applied, so a later
    /// assignment overrides an earlier one bit-for-bit (spec.md §4.7
    /// step 4, §8 "Composite override monotonicity").
    pub mask: StaffStyleMask,
    /// Custom staff-line positions from the winning `StaffStyle`, ascending
    /// (spec.md §8 scenario 4, "customStaff"). Lives here rather than on
    /// `Staff` itself: it's overlay-only data, never present on a raw staff.
    pub custom_staff: Vec<i32>,
    /// Name of the last-applied `StaffStyle`, if any (spec.md §8 scenario 4,
    /// "styleName"). Distinct from `staff.full_name`: a style can carry a
    /// name of its own without its `FULL_NAME` mask bit being set.
    pub style_name: String,
}

impl StaffComposite {
    /// Builds the effective staff at `(part, staff, measure, edu)` (spec.md
    /// §4.7 steps 1-5).
    pub fn create_current(doc: &Document, part: PartId, staff: Cmper, measure: i32, edu: Edu) -> Result<Self, MusxError> {
        let raw = doc
            .staves
            .get_raw_staff(part, staff)
            .ok_or_else(|| doc.staff_not_in_part(part, staff))?;

        let mut composite = StaffComposite { staff: raw.clone(), ..Default::default() };

        let mut assignments: Vec<_> = doc
            .staff_style_assigns_for_staff(part, staff)
            .into_iter()
            .filter(|assign| assign.contains(measure, edu))
            .collect();
        // Assignment-order is the order they were registered in the
        // document (spec.md §4.7 step 4, "For each assignment in
        // assignment-order"); that's their `inci` order, which matches
        // the pool's key order already.
        assignments.sort_by_key(|a| a.inci);

        for assignment in assignments {
            let Some(style) = doc.staff_styles.get(crate::pool::PoolKey::new(part, assignment.style_id)) else {
                continue;
            };
            composite.apply_style(style);
        }

        Ok(composite)
    }

    fn apply_style(&mut self, style: &crate::record::others::StaffStyle) {
        if style.mask.contains(StaffStyleMask::STAFF_TYPE) {
            self.staff.notation_style = style.notation_style;
            self.mask = self.mask | StaffStyleMask::STAFF_TYPE;
        }
        if style.mask.contains(StaffStyleMask::TRANSPOSITION) {
            self.staff.transposition = style.transposition;
            self.mask = self.mask | StaffStyleMask::TRANSPOSITION;
        }
        if style.mask.contains(StaffStyleMask::FULL_NAME) {
            self.staff.full_name = style.full_name.clone();
            self.mask = self.mask | StaffStyleMask::FULL_NAME;
        }
        if style.mask.contains(StaffStyleMask::ABBREVIATED_NAME) {
            self.staff.abbreviated_name = style.abbreviated_name.clone();
            self.mask = self.mask | StaffStyleMask::ABBREVIATED_NAME;
        }
        if style.mask.contains(StaffStyleMask::CUSTOM_STAFF) {
            self.custom_staff = style.custom_staff.clone();
            self.mask = self.mask | StaffStyleMask::CUSTOM_STAFF;
        }
        if style.mask.contains(StaffStyleMask::NOTATION_STYLE) {
            self.staff.notation_style = style.notation_style;
            self.mask = self.mask | StaffStyleMask::NOTATION_STYLE;
        }

        // The mask does not gate `instUuid` or `styleName`: a non-blank
        // style UUID or name always wins, regardless of mask bits (spec.md
        // §4.7 "Contract").
        if !style.inst_uuid.is_empty() {
            self.staff.inst_uuid = style.inst_uuid.clone();
        }
        if !style.style_name.is_empty() {
            self.style_name = style.style_name.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{Inci, SCORE_PARTID};
    use crate::pool::PoolKey;
    use crate::record::others::{StaffStyle, StaffStyleAssign};

    fn build_doc_with_overlay() -> Document {
        Document::empty()
    }

    #[test]
    fn no_assignments_means_composite_equals_raw() {
        let mut doc = build_doc_with_overlay();
        doc.staves.add(PoolKey::new(SCORE_PARTID, Cmper(6)), Staff { cmper: Cmper(6), full_name: "Violin".into(), ..Default::default() });

        let composite = StaffComposite::create_current(&doc, SCORE_PARTID, Cmper(6), 2, 0).unwrap();
        assert_eq!(composite.staff.full_name, "Violin");
        assert_eq!(composite.mask, StaffStyleMask::default());
    }

    #[test]
    fn overlapping_style_overrides_masked_fields_only() {
        let mut doc = build_doc_with_overlay();
        doc.staves.add(PoolKey::new(SCORE_PARTID, Cmper(6)), Staff { cmper: Cmper(6), full_name: "Violin".into(), ..Default::default() });
        doc.staff_styles.add(
            PoolKey::new(SCORE_PARTID, Cmper(1)),
            StaffStyle {
                cmper: Cmper(1),
                mask: StaffStyleMask::FULL_NAME,
                full_name: "Names and Stems".into(),
                ..Default::default()
            },
        );
        doc.staff_style_assigns.add(
            PoolKey::new(SCORE_PARTID, Cmper(6)).with_inci(Inci(0)),
            StaffStyleAssign {
                part: SCORE_PARTID,
                staff_cmper: Cmper(6),
                style_id: Cmper(1),
                inci: Inci(0),
                start_measure: 1,
                start_edu: 512,
                end_measure: 4,
                end_edu: Edu::MAX,
            },
        );

        let composite = StaffComposite::create_current(&doc, SCORE_PARTID, Cmper(6), 2, 0).unwrap();
        assert_eq!(composite.staff.full_name, "Names and Stems");
        assert!(composite.mask.contains(StaffStyleMask::FULL_NAME));
        assert!(!composite.mask.contains(StaffStyleMask::TRANSPOSITION));
    }
}
