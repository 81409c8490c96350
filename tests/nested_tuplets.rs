//! Seed scenario: nested tuplets — an outer tuplet spanning entries 1..8
//! with two sibling inner tuplets nested inside it, each inheriting the
//! enclosing scale so actual durations compound (spec.md §8 scenario 3,
//! §4.8 step 5 "Nested tuplets stack").

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
        Frame { part, cmper: Cmper(1), start_entry: Some(EntryNumber(1)), end_entry: Some(EntryNumber(9)), start_time: None },
    );
    let mut hold = GFrameHold { part, staff_cmper: Cmper(1), measure_cmper: Cmper(1), ..Default::default() };
    hold.layer_frames[0] = Cmper(1);
    doc.gframe_holds.add(PoolKey::new(part, Cmper(1)).with_cmper2(Cmper(1)), hold);

    doc.entries.add(Entry { number: EntryNumber(1), prev: None, next: Some(EntryNumber(2)), duration: 2048, ..Default::default() });
    for i in 2..=9u32 {
        doc.entries.add(Entry {
            number: EntryNumber(i),
            prev: Some(EntryNumber(i - 1)),
            next: if i < 9 { Some(EntryNumber(i + 1)) } else { None },
            duration: 512,
            ..Default::default()
        });
    }

    // Outer tuplet (2 in the time of 3) opens together with the first inner
    // tuplet on entry 2 (frame index 1); the LIFO open-tuplet stack closes
    // the inner one first.
    doc.tuplet_defs.add(
        part,
        EntryNumber(2),
        TupletDef { part, entry: EntryNumber(2), display_duration: 3072, display_number: 2, in_the_time_of_number: 3 },
    );
    doc.tuplet_defs.add(
        part,
        EntryNumber(2),
        TupletDef { part, entry: EntryNumber(2), display_duration: 1024, display_number: 2, in_the_time_of_number: 3 },
    );
    // Second inner tuplet opens on entry 5 (frame index 4), nested inside
    // the still-open outer tuplet.
    doc.tuplet_defs.add(
        part,
        EntryNumber(5),
        TupletDef { part, entry: EntryNumber(5), display_duration: 1024, display_number: 2, in_the_time_of_number: 3 },
    );

    doc
}

#[test]
fn nine_entries_with_stacked_nested_tuplet_scaling() {
    let doc = build_document();
    let frame = build_entry_frame(&doc, SCORE_PARTID, Cmper(1), Cmper(1), 0).unwrap();

    assert_eq!(frame.entries.len(), 9);
    assert_eq!(frame.entries[0].actual_duration, Fraction::new(1, 2));
    for entry in &frame.entries[1..7] {
        assert_eq!(entry.actual_duration, Fraction::new(1, 18));
    }
    for entry in &frame.entries[7..9] {
        assert_eq!(entry.actual_duration, Fraction::new(1, 12));
    }

    assert_eq!(frame.tuplets.len(), 3);
    let mut by_start: Vec<_> = frame.tuplets.clone();
    by_start.sort_by_key(|t| (t.start_index, t.end_index));

    assert_eq!((by_start[0].start_index, by_start[0].end_index), (1, 3));
    assert_eq!((by_start[1].start_index, by_start[1].end_index), (1, 8));
    assert_eq!((by_start[2].start_index, by_start[2].end_index), (4, 6));

    let outer = by_start.iter().find(|t| t.end_index == 8).unwrap();
    assert_eq!(outer.start_dura, Fraction::new(1, 2));
    assert_eq!(outer.end_dura, Fraction::new(1, 1));
}
