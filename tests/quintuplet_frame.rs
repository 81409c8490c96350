//! Seed scenario: a quintuplet frame — five notes scaled 4/5 against a
//! nominal eighth note, closing at the point the sixth, untupleted, entry
//! begins (spec.md §8 scenario 2).

use musx_dom::document::Document;
use musx_dom::entry_frame::build_entry_frame;
use musx_dom::fraction::Fraction;
use musx_dom::ids::{Cmper, EntryNumber, SCORE_PARTID};
use musx_dom::pool::PoolKey;
use musx_dom::record::details::{GFrameHold, TupletDef};
use musx_dom::record::entries::Entry;
use musx_dom::record::others::Frame;

fn build_document() -> Document {
    let mut doc = Document::empty();
    let part = SCORE_PARTID;

    doc.frames.add(
        PoolKey::new(part, Cmper(1)),
        Frame { part, cmper: Cmper(1), start_entry: Some(EntryNumber(1)), end_entry: Some(EntryNumber(6)), start_time: None },
    );

    let mut hold = GFrameHold { part, staff_cmper: Cmper(1), measure_cmper: Cmper(1), ..Default::default() };
    hold.layer_frames[0] = Cmper(1);
    doc.gframe_holds.add(PoolKey::new(part, Cmper(1)).with_cmper2(Cmper(1)), hold);

    for i in 1..=5u32 {
        doc.entries.add(Entry {
            number: EntryNumber(i),
            prev: if i > 1 { Some(EntryNumber(i - 1)) } else { None },
            next: Some(EntryNumber(i + 1)),
            duration: 512,
            ..Default::default()
        });
    }
    doc.entries.add(Entry { number: EntryNumber(6), prev: Some(EntryNumber(5)), next: None, duration: 2048, ..Default::default() });

    doc.tuplet_defs.add(
        part,
        EntryNumber(1),
        TupletDef { part, entry: EntryNumber(1), display_duration: 2560, display_number: 4, in_the_time_of_number: 5 },
    );

    doc
}

#[test]
fn six_entries_one_quintuplet_tuplet_spanning_the_first_five() {
    let doc = build_document();
    let frame = build_entry_frame(&doc, SCORE_PARTID, Cmper(1), Cmper(1), 0).unwrap();

    assert_eq!(frame.entries.len(), 6);
    for entry in &frame.entries[0..5] {
        assert_eq!(entry.actual_duration, Fraction::new(1, 10));
    }
    assert_eq!(frame.entries[5].actual_duration, Fraction::new(1, 2));

    assert_eq!(frame.tuplets.len(), 1);
    let tuplet = frame.tuplets[0];
    assert_eq!(tuplet.start_index, 0);
    assert_eq!(tuplet.end_index, 4);
    assert_eq!(tuplet.start_dura, Fraction::ZERO);
    assert_eq!(tuplet.end_dura, Fraction::new(1, 2));
}

#[test]
fn frame_for_a_staff_with_no_hold_is_empty() {
    let doc = build_document();
    let frame = build_entry_frame(&doc, SCORE_PARTID, Cmper(9), Cmper(9), 0).unwrap();
    assert!(frame.entries.is_empty());
    assert!(frame.tuplets.is_empty());
}
