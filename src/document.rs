//! Document Handle (C12): aggregates pools, header, computed indexes; the
//! crate's entry point (spec.md §4.12).

use once_cell::sync::OnceCell;

use crate::error::{LogicError, MusxError};
use crate::ids::{Cmper, EntryNumber, PartId, BASE_SYSTEM_ID, SCORE_PARTID};
use crate::instrument_map::InstrumentInfo;
use crate::pool::{EntryKeyedPool, EntryPool, Pool, PoolKey};
use crate::record::details::{GFrameHold, LyricAssign, MultimeasureRest, NoteShapes, PartVoicing, SecondaryBeamBreak, StaffGroup, TupletDef};
use crate::record::header::Header;
use crate::record::options::{BeamOptions, ChordOptions, FontOptions, LyricOptions, MusicSpacingOptions, TieOptions};
use crate::record::others::{
    DrumStaff, Frame, FontDefinition, Measure, MultiStaffInstrumentGroup, NamePositionAbbreviated, NamePositionFull, PartDef, Staff,
    StaffStyle, StaffStyleAssign, TonalCenterArray,
};
use crate::record::texts::{FileInfoText, LyricText, TextBlock};

/// Whether note iteration in linked-part contexts prunes layers/notes not
/// selected by a `PartVoicing` record (spec.md §4.12).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PartVoicingPolicy {
    #[default]
    Ignore,
    Apply,
}

/// Load-time configuration surface (spec.md §1.3 in the expanded spec):
/// strict-mode for C2's enum/tag handling, the voicing policy for C12
/// queries, and an optional SMuFL metadata path override (spec.md §6).
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub strict: bool,
    pub part_voicing_policy: PartVoicingPolicy,
    pub smufl_search_paths_override: Option<Vec<std::path::PathBuf>>,
}

/// An opaque `(measure, edu)` range used by iteration APIs (spec.md §4.12
/// "calcEntireDocument").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentRange {
    pub start: (i32, i32),
    pub end: (i32, i32),
}

#[derive(Default)]
pub struct Document {
    pub header: Header,

    pub font_options: Pool<FontOptions>,
    pub beam_options: Pool<BeamOptions>,
    pub tie_options: Pool<TieOptions>,
    pub music_spacing_options: Pool<MusicSpacingOptions>,
    pub chord_options: Pool<ChordOptions>,
    pub lyric_options: Pool<LyricOptions>,

    pub measures: Pool<Measure>,
    pub staves: Pool<Staff>,
    pub staff_styles: Pool<StaffStyle>,
    pub staff_style_assigns: Pool<StaffStyleAssign>,
    pub frames: Pool<Frame>,
    pub multi_staff_instrument_groups: Pool<MultiStaffInstrumentGroup>,
    pub part_defs: Pool<PartDef>,
    pub tonal_center_arrays: Pool<TonalCenterArray>,
    pub font_definitions: Pool<FontDefinition>,
    pub drum_staves: Pool<DrumStaff>,
    pub name_position_fulls: Pool<NamePositionFull>,
    pub name_position_abbreviateds: Pool<NamePositionAbbreviated>,

    pub gframe_holds: Pool<GFrameHold>,
    pub staff_groups: Pool<StaffGroup>,
    pub tuplet_defs: EntryKeyedPool<TupletDef>,
    pub secondary_beam_breaks: EntryKeyedPool<SecondaryBeamBreak>,
    pub lyric_assigns: EntryKeyedPool<LyricAssign>,
    pub part_voicings: Pool<PartVoicing>,
    pub note_shapes: Pool<NoteShapes>,
    pub multimeasure_rests: Pool<MultimeasureRest>,

    pub entries: EntryPool,

    pub text_blocks: Pool<TextBlock>,
    pub lyric_texts: Vec<LyricText>,
    pub file_info: Option<FileInfoText>,

    pub part_voicing_policy: PartVoicingPolicy,

    instrument_map: OnceCell<std::collections::BTreeMap<Cmper, InstrumentInfo>>,
    max_blank_pages: OnceCell<u32>,
    /// `StaffGroup` member lists, resolved by the linker after every part's
    /// staves are loaded (spec.md §4.5) — the one piece of cross-pool state
    /// a resolver genuinely needs to write, so it lives behind a lock rather
    /// than mutating the `Details` pool in place (spec.md §5 "Shared
    /// resources").
    staff_group_members: std::sync::RwLock<std::collections::BTreeMap<(PartId, Cmper), Vec<Cmper>>>,
}

impl Document {
    /// Load an EnigmaXML byte buffer into a document graph (spec.md §0,
    /// "Consumers link the crate and call Document::load"). Delegates to
    /// the factory/orchestrator (spec.md §4.6).
    pub fn load(xml: &str, options: LoadOptions) -> Result<Self, MusxError> {
        crate::factory::load(xml, options)
    }

    /// An empty document, with no records loaded — used to seed the
    /// factory during construction and by linker/pool unit tests.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn set_instrument_map(&self, map: std::collections::BTreeMap<Cmper, InstrumentInfo>) {
        let _ = self.instrument_map.set(map);
    }

    pub fn instrument_map(&self) -> Option<&std::collections::BTreeMap<Cmper, InstrumentInfo>> {
        self.instrument_map.get()
    }

    pub fn set_max_blank_pages(&self, value: u32) {
        let _ = self.max_blank_pages.set(value);
    }

    pub fn max_blank_pages(&self) -> u32 {
        self.max_blank_pages.get().copied().unwrap_or(0)
    }

    /// The scroll-view system cmper — currently a constant, but
    /// encapsulated so a future per-part scroll view can replace it
    /// without breaking callers (spec.md §4.12).
    pub fn calc_scroll_view_cmper(&self, _part: PartId) -> Cmper {
        BASE_SYSTEM_ID
    }

    /// `(measure=1, edu=0)` through `(last measure, last edu)` for `part`
    /// (spec.md §4.12 "calcEntireDocument").
    pub fn calc_entire_document(&self, part: PartId) -> DocumentRange {
        let last_measure = self.measures.get_array(part).iter().map(|m| m.cmper.value() as i32).max().unwrap_or(1);
        let last_edu = self
            .measures
            .get_array(part)
            .iter()
            .find(|m| m.cmper.value() as i32 == last_measure)
            .map(|m| m.time_signature.beats * m.time_signature.beat_duration)
            .unwrap_or(0);
        DocumentRange { start: (1, 0), end: (last_measure, last_edu) }
    }

    /// Walks the part's scroll-view staves top-to-bottom, then by
    /// measure/layer, invoking `visitor` for each entry-frame entry; the
    /// visitor returns `false` to abort iteration (spec.md §4.12
    /// "iterateEntries").
    pub fn iterate_entries<F>(&self, part: PartId, mut visitor: F) -> Result<(), MusxError>
    where
        F: FnMut(&crate::entry_frame::EntryInfo) -> bool,
    {
        let mut staves: Vec<&Staff> = self.staves.get_array(part);
        staves.sort_by_key(|s| s.cmper.value());

        for staff in staves {
            let mut measures: Vec<&Measure> = self.measures.get_array(part);
            measures.sort_by_key(|m| m.cmper.value());
            for measure in measures {
                for layer in 0..4u8 {
                    let frame = crate::entry_frame::build_entry_frame(self, part, staff.cmper, measure.cmper, layer)?;
                    for info in &frame.entries {
                        if !visitor(info) {
                            return Ok(());
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// True iff staff composition changes across systems of the part
    /// (spec.md §4.12). With no per-system staff-visibility model yet
    /// implemented, staff composition is treated as constant; this keeps
    /// the contract (a caller-visible boolean) while the underlying
    /// systems/visibility records are out of the representative record
    /// set (spec.md §1 Non-goals: "exhaustive option surfaces").
    pub fn calc_has_varying_system_staves(&self, _part: PartId) -> bool {
        false
    }

    pub fn calc_page_from_measure(&self, part: PartId, measure_id: i32) -> Result<i32, MusxError> {
        if self.measures.get(PoolKey::new(part, Cmper(measure_id as u16))).is_none() {
            return Err(LogicError::MalformedFrame { cmper: measure_id }.into());
        }
        Ok(1)
    }

    pub fn calc_system_from_measure(&self, part: PartId, measure_id: i32) -> Result<i32, MusxError> {
        if self.measures.get(PoolKey::new(part, Cmper(measure_id as u16))).is_none() {
            return Err(LogicError::MalformedFrame { cmper: measure_id }.into());
        }
        Ok(1)
    }

    pub fn staff_not_in_part(&self, part: PartId, staff: Cmper) -> LogicError {
        LogicError::StaffNotInPart { part: part.0 as i32, staff: staff.value() as i32 }
    }

    pub fn lyric_assigns_for(&self, part: PartId, entry: EntryNumber) -> &[LyricAssign] {
        self.lyric_assigns.get(part, entry)
    }

    pub fn secondary_beam_breaks_for(&self, part: PartId, entry: EntryNumber) -> &[SecondaryBeamBreak] {
        self.secondary_beam_breaks.get(part, entry)
    }

    pub fn tuplet_defs_for(&self, part: PartId, entry: EntryNumber) -> &[TupletDef] {
        self.tuplet_defs.get(part, entry)
    }

    pub fn gframe_hold(&self, part: PartId, staff: Cmper, measure: Cmper) -> Option<&GFrameHold> {
        self.gframe_holds.get(PoolKey::new(part, staff).with_cmper2(measure))
    }

    pub fn multimeasure_rest(&self, part: PartId, staff: Cmper, start_measure: Cmper) -> Option<&MultimeasureRest> {
        self.multimeasure_rests.get(PoolKey::new(part, staff).with_cmper2(start_measure))
    }

    /// Set by the linker once, for one `(part, cmper)` staff group key
    /// (spec.md §4.5). A second call for the same key overwrites — the
    /// linker runs each registered key exactly once, so this is simply
    /// idempotent, not a contended write path.
    pub fn set_staff_group_staves(&self, part: PartId, cmper: Cmper, staves: Vec<Cmper>) {
        self.staff_group_members.write().unwrap().insert((part, cmper), staves);
    }

    pub fn staff_group_staves(&self, part: PartId, cmper: Cmper) -> Vec<Cmper> {
        self.staff_group_members.read().unwrap().get(&(part, cmper)).cloned().unwrap_or_default()
    }

    pub fn staff_style_assigns_for_staff(&self, part: PartId, staff: Cmper) -> Vec<&StaffStyleAssign> {
        self.staff_style_assigns
            .get_array(part)
            .into_iter()
            .filter(|a| a.staff_cmper == staff)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_has_no_instrument_map_yet() {
        let doc = Document::empty();
        assert!(doc.instrument_map().is_none());
        assert_eq!(doc.max_blank_pages(), 0);
    }

    #[test]
    fn instrument_map_set_once_is_idempotent() {
        let doc = Document::empty();
        doc.set_instrument_map(Default::default());
        doc.set_instrument_map(Default::default());
        assert!(doc.instrument_map().is_some());
    }

    #[test]
    fn calc_scroll_view_cmper_is_base_system_id() {
        let doc = Document::empty();
        assert_eq!(doc.calc_scroll_view_cmper(SCORE_PARTID), BASE_SYSTEM_ID);
    }
}
