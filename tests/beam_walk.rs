//! Seed scenario: beam walk with hidden entries — a layer-1 beam group
//! has a hidden note and an interleaved layer-2 note in between its ends
//! (spec.md §8 scenario 5).

use musx_dom::document::Document;
use musx_dom::entry_frame::{build_entry_frame, calc_is_beam_start, entries_in_beam};
use musx_dom::ids::{Cmper, EntryNumber, SCORE_PARTID};
use musx_dom::pool::PoolKey;
use musx_dom::record::details::GFrameHold;
use musx_dom::record::entries::Entry;
use musx_dom::record::others::Frame;

fn build_document() -> Document {
    let mut doc = Document::empty();
    let part = SCORE_PARTID;

    doc.frames.add(
        PoolKey::new(part, Cmper(1)),
        Frame { part, cmper: Cmper(1), start_entry: Some(EntryNumber(1)), end_entry: Some(EntryNumber(4)), start_time: None },
    );
    let mut hold = GFrameHold { part, staff_cmper: Cmper(1), measure_cmper: Cmper(1), ..Default::default() };
    hold.layer_frames[0] = Cmper(1);
    doc.gframe_holds.add(PoolKey::new(part, Cmper(1)).with_cmper2(Cmper(1)), hold);

    // entry 1: layer-1 eighth note, visible, beam start.
    doc.entries.add(Entry { number: EntryNumber(1), prev: None, next: Some(EntryNumber(2)), duration: 512, ..Default::default() });
    // entry 2: layer-1 eighth note, hidden.
    doc.entries.add(Entry {
        number: EntryNumber(2),
        prev: Some(EntryNumber(1)),
        next: Some(EntryNumber(3)),
        duration: 512,
        invisible_in_score: true,
        ..Default::default()
    });
    // entry 3: a layer-2 ("v2") eighth note interleaved at this chain
    // position — a different voice, so it's not part of layer 1's beam.
    doc.entries.add(Entry {
        number: EntryNumber(3),
        prev: Some(EntryNumber(2)),
        next: Some(EntryNumber(4)),
        duration: 512,
        voice2: true,
        v2_launch: true,
        ..Default::default()
    });
    // entry 4: layer-1 eighth note, visible.
    doc.entries.add(Entry { number: EntryNumber(4), prev: Some(EntryNumber(3)), next: None, duration: 512, ..Default::default() });

    doc
}

#[test]
fn hidden_and_other_voice_entries_are_excluded_but_do_not_break_the_beam() {
    let doc = build_document();
    let frame = build_entry_frame(&doc, SCORE_PARTID, Cmper(1), Cmper(1), 0).unwrap();
    assert_eq!(frame.entries.len(), 4);

    assert!(calc_is_beam_start(&frame, &doc, 0, false));

    assert_eq!(entries_in_beam(&frame, &doc, SCORE_PARTID, 0, false), vec![0, 3]);
    assert_eq!(entries_in_beam(&frame, &doc, SCORE_PARTID, 0, true), vec![0, 1, 3]);
}
