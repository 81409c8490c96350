//! Seed scenario: a staff style overlay carrying custom staff lines
//! (spec.md §8 scenario 4).

use musx_dom::document::Document;
use musx_dom::ids::{Cmper, Edu, Inci, SCORE_PARTID};
use musx_dom::pool::PoolKey;
use musx_dom::record::others::{Staff, StaffStyle, StaffStyleAssign, StaffStyleMask};
use musx_dom::staff_composite::StaffComposite;

#[test]
fn overlapping_style_carries_its_name_and_custom_staff_lines() {
    let mut doc = Document::empty();
    doc.staves.add(PoolKey::new(SCORE_PARTID, Cmper(6)), Staff { cmper: Cmper(6), full_name: "Violin".into(), ..Default::default() });

    doc.staff_styles.add(
        PoolKey::new(SCORE_PARTID, Cmper(1)),
        StaffStyle {
            cmper: Cmper(1),
            mask: StaffStyleMask::STAFF_TYPE | StaffStyleMask::CUSTOM_STAFF,
            style_name: "Names and Stems".into(),
            custom_staff: vec![11, 13],
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
    assert_eq!(composite.style_name, "Names and Stems");
    assert_eq!(composite.custom_staff, vec![11, 13]);
    assert!(composite.mask.contains(StaffStyleMask::STAFF_TYPE));
}

#[test]
fn assignment_outside_its_measure_range_does_not_apply() {
    let mut doc = Document::empty();
    doc.staves.add(PoolKey::new(SCORE_PARTID, Cmper(6)), Staff { cmper: Cmper(6), full_name: "Violin".into(), ..Default::default() });

    doc.staff_styles.add(
        PoolKey::new(SCORE_PARTID, Cmper(1)),
        StaffStyle { cmper: Cmper(1), mask: StaffStyleMask::CUSTOM_STAFF, custom_staff: vec![11, 13], ..Default::default() },
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

    let composite = StaffComposite::create_current(&doc, SCORE_PARTID, Cmper(6), 10, 0).unwrap();
    assert!(composite.custom_staff.is_empty());
    assert!(composite.style_name.is_empty());
}
