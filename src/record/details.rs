//! Details (C3): records keyed by `(part, cmper1, cmper2[, inci])` or
//! `(part, entnum)` — GFrameHold, staff groups, tuplet defs, secondary
//! beam breaks, beam stub directions, lyric assignments, part voicing
//! (spec.md §3 "Details").

use crate::error::{IntegrityError, MusxError};
use crate::fraction::Fraction;
use crate::ids::{Cmper, EntryNumber, Inci, PartId};
use crate::record::DetailsBase;
use crate::xml::{text_as_bool, text_as_i64, XmlElement};

macro_rules! bitflags_beam_mask {
    (
        pub struct $name:ident: $repr:ty {
            $(const $variant:ident = $value:expr;)*
        }
    ) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
        pub struct $name($repr);

        impl $name {
            $(pub const $variant: $name = $name($value);)*

            pub fn from_bits_truncate(bits: $repr) -> Self {
                let mut known = 0;
                $(known |= $value;)*
                $name(bits & known)
            }

            pub fn bits(&self) -> $repr {
                self.0
            }
        }
    };
}

/// Anchors a frame to a `(staff, measure)`, carrying the active clef and
/// the four per-layer frame cmpers (spec.md §3 "GFrameHold", §4.8 step 1).
#[derive(Debug, Clone, Default)]
pub struct GFrameHold {
    pub part: PartId,
    pub staff_cmper: Cmper,
    pub measure_cmper: Cmper,
    pub clef_id: Option<i32>,
    pub clef_list_id: Option<i32>,
    pub clef_mode: Option<ClefMode>,
    pub layer_frames: [Cmper; 4],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClefMode {
    Normal,
    ClefList,
}

impl DetailsBase for GFrameHold {
    fn part(&self) -> PartId {
        self.part
    }
    fn cmper1(&self) -> Cmper {
        self.staff_cmper
    }
    fn cmper2(&self) -> Cmper {
        self.measure_cmper
    }
}

impl GFrameHold {
    pub fn populate<'a, El: XmlElement<'a>>(node: &El, part: PartId) -> Result<Self, MusxError> {
        let staff_cmper = Cmper(
            node.attribute("cmper1")
                .and_then(|a| a.as_i64().ok())
                .unwrap_or_default() as u16,
        );
        let measure_cmper = Cmper(
            node.attribute("cmper2")
                .and_then(|a| a.as_i64().ok())
                .unwrap_or_default() as u16,
        );
        let mut hold = GFrameHold { part, staff_cmper, measure_cmper, ..Default::default() };

        if let Some(n) = node.first_child(Some("clefID")) {
            hold.clef_id = Some(text_as_i64(&n)? as i32);
        }
        if let Some(n) = node.first_child(Some("clefListID")) {
            hold.clef_list_id = Some(text_as_i64(&n)? as i32);
        }
        if hold.clef_id.is_some() && hold.clef_list_id.is_some() {
            return Err(IntegrityError::GFrameHoldDualClef {
                cmper1: staff_cmper.value() as i32,
                cmper2: measure_cmper.value() as i32,
            }
            .into());
        }
        hold.clef_mode = match (hold.clef_id, hold.clef_list_id) {
            (Some(_), None) => Some(ClefMode::Normal),
            (None, Some(_)) => Some(ClefMode::ClefList),
            (None, None) => None,
            (Some(_), Some(_)) => unreachable!("rejected above"),
        };

        let mut layers_present = 0usize;
        for (layer, tag) in ["frame1", "frame2", "frame3", "frame4"].iter().enumerate() {
            if let Some(n) = node.first_child(Some(tag)) {
                hold.layer_frames[layer] = Cmper(text_as_i64(&n)? as u16);
                layers_present += 1;
            }
        }
        if layers_present != 4 {
            return Err(IntegrityError::LayerCountMismatch {
                staff: staff_cmper.value() as i32,
                measure: measure_cmper.value() as i32,
                found: layers_present,
            }
            .into());
        }

        Ok(hold)
    }

    /// `IntegrityError::GFrameHoldMissingClefMode` if every layer is empty
    /// yet the hold carries no clef at all (spec.md §7).
    pub fn check_integrity(&self) -> Result<(), MusxError> {
        let has_layers = self.layer_frames.iter().any(|c| c.value() != 0);
        if has_layers && self.clef_mode.is_none() {
            return Err(IntegrityError::GFrameHoldMissingClefMode {
                cmper1: self.staff_cmper.value() as i32,
                cmper2: self.measure_cmper.value() as i32,
            }
            .into());
        }
        Ok(())
    }
}

/// Marks that a staff carries its own note-shape set, rather than
/// inheriting the document default (spec.md §3 "Lifecycle" —
/// `Staff::note_shapes_id` forwarding). Only the record's existence is
/// consulted by the forwarding pass (spec.md §3, grounded on
/// `examples/original_source/src/musx/dom/Staff.cpp`'s
/// `calcAllRuntimeValues`, which likewise only checks for presence).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoteShapes {
    pub part: PartId,
    pub staff_cmper: Cmper,
}

impl DetailsBase for NoteShapes {
    fn part(&self) -> PartId {
        self.part
    }
    fn cmper1(&self) -> Cmper {
        self.staff_cmper
    }
    fn cmper2(&self) -> Cmper {
        Cmper(0)
    }
}

impl NoteShapes {
    pub fn populate<'a, El: XmlElement<'a>>(_node: &El, part: PartId, staff_cmper: Cmper) -> Result<Self, MusxError> {
        Ok(NoteShapes { part, staff_cmper })
    }
}

/// A collapsed run of identical rests, spanning `measure_span` measures
/// starting at `cmper2` (spec.md §7 "a zero-span multi-measure rest is a
/// documented integrity failure").
#[derive(Debug, Clone, Copy, Default)]
pub struct MultimeasureRest {
    pub part: PartId,
    pub staff_cmper: Cmper,
    pub start_measure: Cmper,
    pub measure_span: i32,
}

impl DetailsBase for MultimeasureRest {
    fn part(&self) -> PartId {
        self.part
    }
    fn cmper1(&self) -> Cmper {
        self.staff_cmper
    }
    fn cmper2(&self) -> Cmper {
        self.start_measure
    }
}

impl MultimeasureRest {
    pub fn populate<'a, El: XmlElement<'a>>(
        node: &El,
        part: PartId,
        staff_cmper: Cmper,
        start_measure: Cmper,
    ) -> Result<Self, MusxError> {
        let mut rest = MultimeasureRest { part, staff_cmper, start_measure, measure_span: 1 };
        if let Some(n) = node.first_child(Some("numdMeas")) {
            rest.measure_span = text_as_i64(&n)? as i32;
        }
        if rest.measure_span <= 0 {
            return Err(IntegrityError::ZeroSpanMultimeasureRest { measure: start_measure.value() as i32 }.into());
        }
        Ok(rest)
    }
}

/// Groups a contiguous run of staves under a shared bracket/name (spec.md
/// §4.10 pass 2). Its member staff list is not stored here: it's resolved
/// by the linker into `Document::staff_group_staves` by intersecting
/// `(startInst, endInst)` with the part's scroll-view list (spec.md §4.5),
/// since a `Details` record can't be mutated in place once pooled.
#[derive(Debug, Clone, Default)]
pub struct StaffGroup {
    pub part: PartId,
    pub cmper: Cmper,
    pub start_inst: Cmper,
    pub end_inst: Cmper,
}

impl DetailsBase for StaffGroup {
    fn part(&self) -> PartId {
        self.part
    }
    fn cmper1(&self) -> Cmper {
        self.cmper
    }
    fn cmper2(&self) -> Cmper {
        Cmper(0)
    }
}

impl StaffGroup {
    pub fn populate<'a, El: XmlElement<'a>>(node: &El, part: PartId) -> Result<Self, MusxError> {
        let cmper = Cmper(
            node.attribute("cmper1")
                .and_then(|a| a.as_i64().ok())
                .unwrap_or_default() as u16,
        );
        let mut group = StaffGroup { part, cmper, ..Default::default() };
        if let Some(n) = node.first_child(Some("startInst")) {
            group.start_inst = Cmper(text_as_i64(&n)? as u16);
        }
        if let Some(n) = node.first_child(Some("endInst")) {
            group.end_inst = Cmper(text_as_i64(&n)? as u16);
        }
        Ok(group)
    }
}

/// A tuplet attached to a specific entry (spec.md §3 "TupletDef", §4.8
/// step 5).
#[derive(Debug, Clone, Copy, Default)]
pub struct TupletDef {
    pub part: PartId,
    pub entry: EntryNumber,
    pub display_duration: i32,
    pub display_number: i32,
    pub in_the_time_of_number: i32,
}

impl DetailsBase for TupletDef {
    fn part(&self) -> PartId {
        self.part
    }
    fn cmper1(&self) -> Cmper {
        Cmper(0)
    }
    fn cmper2(&self) -> Cmper {
        Cmper(0)
    }
}

impl TupletDef {
    pub fn populate<'a, El: XmlElement<'a>>(node: &El, part: PartId, entry: EntryNumber) -> Result<Self, MusxError> {
        let mut def = TupletDef { part, entry, ..Default::default() };
        if let Some(n) = node.first_child(Some("dura")) {
            def.display_duration = text_as_i64(&n)? as i32;
        }
        if let Some(n) = node.first_child(Some("numSymbolic")) {
            def.display_number = text_as_i64(&n)? as i32;
        }
        if let Some(n) = node.first_child(Some("numberOfNotes")) {
            def.in_the_time_of_number = text_as_i64(&n)? as i32;
        }
        Ok(def)
    }

    /// `displayDuration × displayNumber / inTheTimeOfNumber` (spec.md §3,
    /// §8 "Tuplet arithmetic").
    pub fn display_span(&self) -> Fraction {
        Fraction::from_edu(self.display_duration) * Fraction::new(self.display_number as i64, self.in_the_time_of_number.max(1) as i64)
    }
}

bitflags_beam_mask! {
    pub struct BeamBreakMask: u32 {
        const EIGHTH = 1 << 0;
        const SIXTEENTH = 1 << 1;
        const THIRTY_SECOND = 1 << 2;
        const SIXTY_FOURTH = 1 << 3;
        const ONE_TWENTY_EIGHTH = 1 << 4;
        const TWO_FIFTY_SIXTH = 1 << 5;
        const FIVE_TWELVTH = 1 << 6;
        const FOUR_THOUSAND_NINETY_SIXTH = 1 << 7;
    }
}

/// Which beam levels terminate at a given entry (spec.md §4.8 "Secondary
/// beam breaks"). Open question (a) from spec.md §9: the source's
/// empty-mask branch returns beam level 2; preserved here pending
/// verification against real documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecondaryBeamBreak {
    pub part: PartId,
    pub entry: EntryNumber,
    pub mask: BeamBreakMask,
}

impl DetailsBase for SecondaryBeamBreak {
    fn part(&self) -> PartId {
        self.part
    }
    fn cmper1(&self) -> Cmper {
        Cmper(0)
    }
    fn cmper2(&self) -> Cmper {
        Cmper(0)
    }
}

impl SecondaryBeamBreak {
    pub fn populate<'a, El: XmlElement<'a>>(node: &El, part: PartId, entry: EntryNumber) -> Result<Self, MusxError> {
        let mut brk = SecondaryBeamBreak { part, entry, ..Default::default() };
        if let Some(n) = node.first_child(Some("mask")) {
            brk.mask = BeamBreakMask::from_bits_truncate(text_as_i64(&n)? as u32);
        }
        Ok(brk)
    }

    /// Empty mask falls back to beam level 2, per the open question above.
    pub fn lowest_broken_level(&self) -> u32 {
        if self.mask.bits() == 0 {
            return 2;
        }
        self.mask.bits().trailing_zeros()
    }
}

/// Connects a lyric verse/chorus/section record to a note or chord
/// (spec.md §4.11 "Lyric assignments").
#[derive(Debug, Clone, Copy, Default)]
pub struct LyricAssign {
    pub part: PartId,
    pub entry: EntryNumber,
    pub lyric_number: Cmper,
}

impl DetailsBase for LyricAssign {
    fn part(&self) -> PartId {
        self.part
    }
    fn cmper1(&self) -> Cmper {
        Cmper(0)
    }
    fn cmper2(&self) -> Cmper {
        Cmper(0)
    }
}

impl LyricAssign {
    pub fn populate<'a, El: XmlElement<'a>>(node: &El, part: PartId, entry: EntryNumber) -> Result<Self, MusxError> {
        let mut assign = LyricAssign { part, entry, ..Default::default() };
        if let Some(n) = node.first_child(Some("lyricNumber")) {
            assign.lyric_number = Cmper(text_as_i64(&n)? as u16);
        }
        Ok(assign)
    }
}

/// Selects which layers/notes of a linked part are voiced, pruning the
/// rest from note iteration when `PartVoicingPolicy::Apply` is in effect
/// (spec.md §4.12).
#[derive(Debug, Clone, Default)]
pub struct PartVoicing {
    pub part: PartId,
    pub staff_cmper: Cmper,
    pub selected_layers: [bool; 4],
}

impl DetailsBase for PartVoicing {
    fn part(&self) -> PartId {
        self.part
    }
    fn cmper1(&self) -> Cmper {
        self.staff_cmper
    }
    fn cmper2(&self) -> Cmper {
        Cmper(0)
    }
}

impl PartVoicing {
    pub fn populate<'a, El: XmlElement<'a>>(node: &El, part: PartId, staff_cmper: Cmper) -> Result<Self, MusxError> {
        let mut voicing = PartVoicing { part, staff_cmper, selected_layers: [true; 4] };
        for (layer, tag) in ["layer1", "layer2", "layer3", "layer4"].iter().enumerate() {
            if let Some(n) = node.first_child(Some(tag)) {
                voicing.selected_layers[layer] = text_as_bool(&n).unwrap_or(true);
            }
        }
        Ok(voicing)
    }
}
