//! Entry Frame Builder (C8): iterates entry chains, computes
//! tuplets/beams/grace-groups/voices (spec.md §4.8).

use crate::document::Document;
use crate::error::{LogicError, MusxError};
use crate::fraction::Fraction;
use crate::ids::{Cmper, EntryNumber, PartId};
use crate::pool::PoolKey;
use crate::record::entries::Entry;

/// Positional metadata for one entry within a built frame (spec.md §4.8).
#[derive(Debug, Clone)]
pub struct EntryInfo {
    pub entry: EntryNumber,
    pub layer: u8,
    pub elapsed_duration: Fraction,
    pub actual_duration: Fraction,
    pub is_voice2: bool,
    /// 1-based index within a contiguous grace-note run, forward and
    /// reverse (spec.md §4.8 "Grace-note indexing").
    pub grace_index: Option<u32>,
    pub grace_index_reverse: Option<u32>,
    pub is_rest: bool,
}

impl EntryInfo {
    /// True if the entry is a rest, or (reserved for future
    /// Alternate-Notation-layer support) hidden by a layer override
    /// (spec.md §4.8 "calcDisplaysAsRest").
    pub fn calc_displays_as_rest(&self) -> bool {
        self.is_rest
    }
}

/// Span metadata for one tuplet within a frame (spec.md §4.8 step 5,
/// glossary "TupletInfo").
#[derive(Debug, Clone, Copy)]
pub struct TupletInfo {
    pub start_index: usize,
    pub end_index: usize,
    pub start_dura: Fraction,
    pub end_dura: Fraction,
}

impl TupletInfo {
    /// A tremolo iff the display/in-time-of ratio is a power of two
    /// within a single beam group (spec.md §4.8 "Tremolos"). The beam
    /// group constraint is enforced by the caller, which has the entry
    /// range; this checks only the ratio.
    pub fn is_tremolo_ratio(display_number: i64, in_the_time_of: i64) -> bool {
        if in_the_time_of == 0 {
            return false;
        }
        let (mut n, mut d) = (display_number.max(1), in_the_time_of.max(1));
        while d % 2 == 0 && n % 2 == 0 {
            n /= 2;
            d /= 2;
        }
        d == 1 && n.is_power_of_two()
    }
}

#[derive(Debug, Clone, Default)]
pub struct EntryFrame {
    pub entries: Vec<EntryInfo>,
    pub tuplets: Vec<TupletInfo>,
}

struct OpenTuplet {
    start_index: usize,
    start_dura: Fraction,
    end_target: Fraction,
    scale: Fraction,
}

/// Builds the `EntryFrame` for `(part, staff, measure, layer)` (spec.md
/// §4.8 algorithm steps 1-6).
pub fn build_entry_frame(doc: &Document, part: PartId, staff: Cmper, measure: Cmper, layer: u8) -> Result<EntryFrame, MusxError> {
    let Some(hold) = doc.gframe_hold(part, staff, measure) else {
        return Ok(EntryFrame::default());
    };
    let frame_cmper = hold.layer_frames[layer as usize];
    if frame_cmper.value() == 0 {
        return Ok(EntryFrame::default());
    }
    let Some(frame) = doc.frames.get(PoolKey::new(part, frame_cmper)) else {
        return Err(LogicError::MalformedFrame { cmper: frame_cmper.value() as i32 }.into());
    };
    let Some(start) = frame.start_entry else {
        return Ok(EntryFrame::default());
    };

    let mut result = EntryFrame::default();
    let mut v1_accum = Fraction::ZERO;
    let mut v2_accum = Fraction::ZERO;
    let mut open_tuplets: Vec<OpenTuplet> = Vec::new();
    let mut current = Some(start);

    while let Some(number) = current {
        let Some(entry) = doc.entries.get(number) else {
            return Err(LogicError::MalformedFrame { cmper: frame_cmper.value() as i32 }.into());
        };

        if entry.voice2 && entry.v2_launch {
            v2_accum = v1_accum;
        }
        let elapsed = if entry.voice2 { v2_accum } else { v1_accum };

        let index = result.entries.len();
        for tuplet_def in doc.tuplet_defs_for(part, number) {
            let scale = Fraction::new(tuplet_def.display_number as i64, tuplet_def.in_the_time_of_number.max(1) as i64);
            open_tuplets.push(OpenTuplet {
                start_index: index,
                start_dura: elapsed,
                end_target: elapsed + tuplet_def.display_span(),
                scale,
            });
        }

        let scale_product = open_tuplets.iter().fold(Fraction::new(1, 1), |acc, t| acc * t.scale);
        let nominal = Fraction::from_edu(entry.duration);
        let actual = nominal * scale_product;

        result.entries.push(EntryInfo {
            entry: number,
            layer,
            elapsed_duration: elapsed,
            actual_duration: actual,
            is_voice2: entry.voice2,
            grace_index: None,
            grace_index_reverse: None,
            is_rest: entry.is_rest,
        });

        if entry.voice2 {
            v2_accum = v2_accum + actual;
        } else {
            v1_accum = v1_accum + actual;
        }
        let next_elapsed = if entry.voice2 { v2_accum } else { v1_accum };

        while let Some(top) = open_tuplets.last() {
            if next_elapsed >= top.end_target {
                let closed = open_tuplets.pop().unwrap();
                result.tuplets.push(TupletInfo {
                    start_index: closed.start_index,
                    end_index: index,
                    start_dura: closed.start_dura,
                    end_dura: closed.end_target,
                });
            } else {
                break;
            }
        }

        current = entry.next;
        if current == Some(start) {
            break;
        }
        if let Some(end) = frame.end_entry {
            if number == end {
                break;
            }
        }
    }

    assign_grace_indices(&mut result.entries);
    Ok(result)
}

/// Contiguous grace entries (zero duration) are indexed 1..N within a
/// group that resets on the next non-grace entry; a reverse index 1..N is
/// computed over the same run (spec.md §4.8 step 6).
fn assign_grace_indices(entries: &mut [EntryInfo]) {
    let mut run_start = None;
    for i in 0..entries.len() {
        let is_grace = entries[i].actual_duration.is_zero();
        if is_grace {
            if run_start.is_none() {
                run_start = Some(i);
            }
        } else if let Some(start) = run_start.take() {
            assign_run(entries, start, i);
        }
    }
    if let Some(start) = run_start {
        let end = entries.len();
        assign_run(entries, start, end);
    }
}

fn assign_run(entries: &mut [EntryInfo], start: usize, end: usize) {
    let len = end - start;
    for (offset, entry) in entries[start..end].iter_mut().enumerate() {
        entry.grace_index = Some(offset as u32 + 1);
        entry.grace_index_reverse = Some((len - offset) as u32);
    }
}

/// Is this entry eligible to start a beam (spec.md §4.8 "Beam detection")?
/// `include_hidden` controls whether hidden-rest/no-stems entries still
/// count as beam participants.
pub fn calc_is_beam_start(frame: &EntryFrame, doc: &Document, index: usize, include_hidden: bool) -> bool {
    let Some(info) = frame.entries.get(index) else { return false };
    let Some(entry) = doc.entries.get(info.entry) else { return false };
    if !entry.is_flaggable() {
        return false;
    }
    if !include_hidden && entry.invisible_in_score {
        return false;
    }
    match index.checked_sub(1).and_then(|i| frame.entries.get(i)) {
        None => true,
        Some(prev) => doc
            .entries
            .get(prev.entry)
            .map(|prev_entry| !prev_entry.is_flaggable())
            .unwrap_or(true),
    }
}

/// The last flaggable entry before a break, walking forward from
/// `start_index` (spec.md §4.8 "The beam-end"). Entries belonging to the
/// other voice accumulator (spec.md §9 "Entry iteration over voices")
/// are interleaved in frame-index order but are not part of this beam;
/// they're skipped over rather than treated as a break. Hidden entries
/// likewise don't themselves break a beam — they still occupy rhythmic
/// space and keep the group physically connected; `include_hidden` in
/// [`entries_in_beam`] only governs which indices get reported, not
/// where the walk stops.
pub fn find_beam_end(frame: &EntryFrame, doc: &Document, part: PartId, start_index: usize) -> Option<usize> {
    let start_voice2 = frame.entries.get(start_index)?.is_voice2;
    let mut end = start_index;
    for index in (start_index + 1)..frame.entries.len() {
        let info = &frame.entries[index];
        if info.is_voice2 != start_voice2 {
            continue;
        }
        let Some(entry) = doc.entries.get(info.entry) else { break };
        if !entry.is_flaggable() {
            break;
        }
        let break_level = doc.secondary_beam_breaks_for(part, info.entry).first().map(|b| b.lowest_broken_level());
        end = index;
        if break_level.is_some() {
            break;
        }
    }
    Some(end)
}

/// The indices of `start_index`'s beam group, filtered by voice and
/// visibility (spec.md §8 "Beam walk with hidden entries"). The group's
/// extent is always computed structurally; only the reported membership
/// changes with `include_hidden`.
pub fn entries_in_beam(frame: &EntryFrame, doc: &Document, part: PartId, start_index: usize, include_hidden: bool) -> Vec<usize> {
    let Some(start_voice2) = frame.entries.get(start_index).map(|info| info.is_voice2) else { return Vec::new() };
    let Some(end) = find_beam_end(frame, doc, part, start_index) else { return Vec::new() };
    (start_index..=end)
        .filter(|&index| {
            let info = &frame.entries[index];
            if info.is_voice2 != start_voice2 {
                return false;
            }
            include_hidden
                || doc
                    .entries
                    .get(info.entry)
                    .map(|entry| !entry.invisible_in_score)
                    .unwrap_or(true)
        })
        .collect()
}

/// Detects a feathered beam: the left-Y and right-Y of the beam differ
/// (spec.md §4.8 "Feathered beams"). Geometry (actual staff-position Y) is
/// out of the data model carried here; this takes the two Y values as
/// already-resolved inputs from the caller's layout pass.
pub fn calc_is_feathered_beam_start(left_y: f64, right_y: f64) -> Option<(f64, f64)> {
    if (left_y - right_y).abs() > f64::EPSILON {
        Some((left_y, right_y))
    } else {
        None
    }
}

/// A frame is a cue iff every entry in it is invisible-in-score (or, if
/// `include_part_invisible`, invisible-in-the-current-part) — spec.md
/// §4.8 "Cue detection", §9 open question (b): both modes preserved.
pub fn calc_is_cue_frame(frame: &EntryFrame, doc: &Document, include_part_invisible: bool) -> bool {
    if frame.entries.is_empty() {
        return false;
    }
    frame.entries.iter().all(|info| {
        doc.entries
            .get(info.entry)
            .map(|e| e.invisible_in_score || (include_part_invisible && e.invisible_in_part))
            .unwrap_or(false)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tremolo_ratio_detects_power_of_two() {
        assert!(TupletInfo::is_tremolo_ratio(2, 1));
        assert!(TupletInfo::is_tremolo_ratio(4, 1));
        assert!(!TupletInfo::is_tremolo_ratio(5, 4));
    }

    #[test]
    fn grace_run_indexes_forward_and_reverse() {
        let mut entries = vec![
            EntryInfo {
                entry: EntryNumber(1),
                layer: 0,
                elapsed_duration: Fraction::ZERO,
                actual_duration: Fraction::ZERO,
                is_voice2: false,
                grace_index: None,
                grace_index_reverse: None,
                is_rest: false,
            },
            EntryInfo {
                entry: EntryNumber(2),
                layer: 0,
                elapsed_duration: Fraction::ZERO,
                actual_duration: Fraction::ZERO,
                is_voice2: false,
                grace_index: None,
                grace_index_reverse: None,
                is_rest: false,
            },
            EntryInfo {
                entry: EntryNumber(3),
                layer: 0,
                elapsed_duration: Fraction::ZERO,
                actual_duration: Fraction::new(1, 4),
                is_voice2: false,
                grace_index: None,
                grace_index_reverse: None,
                is_rest: false,
            },
        ];
        assign_grace_indices(&mut entries);
        assert_eq!(entries[0].grace_index, Some(1));
        assert_eq!(entries[1].grace_index, Some(2));
        assert_eq!(entries[0].grace_index_reverse, Some(2));
        assert_eq!(entries[1].grace_index_reverse, Some(1));
        assert!(entries[2].grace_index.is_none());
    }
}
