//! Criterion benchmarks for entry-frame construction.
//!
//! Tests how `build_entry_frame` scales with the number of entries in a
//! single measure's layer chain.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use musx_dom::document::Document;
use musx_dom::entry_frame::build_entry_frame;
use musx_dom::ids::{Cmper, EntryNumber, SCORE_PARTID};
use musx_dom::pool::PoolKey;
use musx_dom::record::details::GFrameHold;
use musx_dom::record::entries::Entry;
use musx_dom::record::others::Frame;

/// Builds a single-layer frame of `count` eighth notes.
fn build_document(count: u32) -> Document {
    let mut doc = Document::empty();
    let part = SCORE_PARTID;

    doc.frames.add(
        PoolKey::new(part, Cmper(1)),
        Frame { part, cmper: Cmper(1), start_entry: Some(EntryNumber(1)), end_entry: Some(EntryNumber(count)), start_time: None },
    );
    let mut hold = GFrameHold { part, staff_cmper: Cmper(1), measure_cmper: Cmper(1), ..Default::default() };
    hold.layer_frames[0] = Cmper(1);
    doc.gframe_holds.add(PoolKey::new(part, Cmper(1)).with_cmper2(Cmper(1)), hold);

    for i in 1..=count {
        doc.entries.add(Entry {
            number: EntryNumber(i),
            prev: if i > 1 { Some(EntryNumber(i - 1)) } else { None },
            next: if i < count { Some(EntryNumber(i + 1)) } else { None },
            duration: 512,
            ..Default::default()
        });
    }

    doc
}

fn bench_entry_frame_50_entries(c: &mut Criterion) {
    let doc = build_document(50);
    c.bench_function("entry_frame_50_entries", |b| {
        b.iter(|| build_entry_frame(black_box(&doc), SCORE_PARTID, Cmper(1), Cmper(1), 0));
    });
}

fn bench_entry_frame_500_entries(c: &mut Criterion) {
    let doc = build_document(500);
    c.bench_function("entry_frame_500_entries", |b| {
        b.iter(|| build_entry_frame(black_box(&doc), SCORE_PARTID, Cmper(1), Cmper(1), 0));
    });
}

fn bench_entry_frame_5000_entries(c: &mut Criterion) {
    let doc = build_document(5000);
    c.bench_function("entry_frame_5000_entries", |b| {
        b.iter(|| build_entry_frame(black_box(&doc), SCORE_PARTID, Cmper(1), Cmper(1), 0));
    });
}

criterion_group!(benches, bench_entry_frame_50_entries, bench_entry_frame_500_entries, bench_entry_frame_5000_entries);
criterion_main!(benches);
