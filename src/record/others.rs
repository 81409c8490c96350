//! Others (C3): records keyed by `(part, cmper[, inci])` — measures,
//! staves, staff styles, frames, pages, fonts, multi-staff instrument
//! groups, part definitions, and the custom key-signature arrays (spec.md
//! §3 "Others", §4.9).

use crate::error::{IntegrityError, MusxError};
use crate::ids::{Cmper, Edu, Inci, PartId};
use crate::key_signature::KeySignature;
use crate::record::OthersBase;
use crate::registry::EnumTable;
use crate::xml::{text_as_bool, text_as_i64, text_as_string, XmlElement};

/// A tiny local substitute for the `bitflags` crate's macro shape, kept
/// dependency-free since only this one mask type needs it (the teacher
/// reaches for hand-rolled bit constants the same way in
/// `domain/events/note.rs` for accidental/tie flags).
macro_rules! bitflags_mask {
    (
        $(#[$meta:meta])*
        pub struct $name:ident: $repr:ty {
            $(const $variant:ident = $value:expr;)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
        pub struct $name($repr);

        impl $name {
            $(pub const $variant: $name = $name($value);)*

            pub fn from_bits_truncate(bits: $repr) -> Self {
                let mut known = 0;
                $(known |= $value;)*
                $name(bits & known)
            }

            pub fn contains(&self, other: $name) -> bool {
                (self.0 & other.0) == other.0
            }

            pub fn bits(&self) -> $repr {
                self.0
            }
        }

        impl std::ops::BitOr for $name {
            type Output = $name;
            fn bitor(self, rhs: $name) -> $name {
                $name(self.0 | rhs.0)
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotationStyle {
    #[default]
    Standard,
    Percussion,
    Tablature,
}

/// Token table for the single-child `<notationStyle>` enum, shared by
/// `Staff` and `StaffStyle` (spec.md §4.2 "Enum round-tripping").
const NOTATION_STYLE_TABLE: EnumTable<NotationStyle> = EnumTable::new(
    &[
        ("standard", NotationStyle::Standard),
        ("percussion", NotationStyle::Percussion),
        ("tablature", NotationStyle::Tablature),
    ],
    NotationStyle::Standard,
);

#[derive(Debug, Clone, Copy, Default)]
pub enum Transposition {
    #[default]
    None,
    Chromatic {
        interval: i32,
        key_adjustment: i32,
    },
    KeySignature {
        interval: i32,
        key_adjustment: i32,
        simplify: bool,
    },
    Clef {
        clef_index: i32,
    },
}

#[derive(Debug, Clone, Default)]
pub struct Staff {
    pub part: PartId,
    pub cmper: Cmper,
    pub inst_uuid: String,
    pub full_name: String,
    pub abbreviated_name: String,
    pub notation_style: NotationStyle,
    pub transposition: Transposition,
    pub multi_staff_inst_id: Option<Cmper>,
    pub auto_numbering_style: AutoNumberingStyle,
    /// Assigned by the factory's auto-numbering pass across the score's
    /// scroll view, once every staff is loaded (spec.md §3 "Lifecycle",
    /// §4.7 "Auto-numbering"). `None` once that pass runs means this
    /// staff takes no number at all.
    pub auto_number_value: Option<u32>,
    /// Forwarded from the document's `DrumStaff`/`NoteShapes`/name-position
    /// records during linking (spec.md §3 "Lifecycle" — runtime-computed
    /// forwarding fields).
    pub percussion_map_id: Option<Cmper>,
    pub note_shapes_id: Option<Cmper>,
    pub full_name_pos_id: Option<Cmper>,
    pub abrv_name_pos_id: Option<Cmper>,
}

impl OthersBase for Staff {
    fn part(&self) -> PartId {
        self.part
    }
    fn cmper(&self) -> Cmper {
        self.cmper
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AffixStyle {
    #[default]
    Arabic,
    Roman,
    Ordinal,
    Alpha,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AutoNumberingStyle {
    pub affix: AffixStyle,
    pub prefix: bool,
    /// Whether this staff's instUuid participates in auto-numbering at
    /// all; absent in the XML defaults to enabled (spec.md §4.7).
    pub enabled: bool,
}

/// Token table for `<autoNumberingStyle>`, combining an affix shape with
/// prefix/suffix placement — the five variants the original enumerates as
/// one flat enum (`examples/original_source/src/musx/dom/Staff.cpp`
/// `calcAutoNumberingAffix`) collapse onto `(AffixStyle, is_prefix)` here.
const AUTO_NUMBERING_STYLE_TABLE: EnumTable<(AffixStyle, bool)> = EnumTable::new(
    &[
        ("arabicSuffix", (AffixStyle::Arabic, false)),
        ("romanSuffix", (AffixStyle::Roman, false)),
        ("ordinalPrefix", (AffixStyle::Ordinal, true)),
        ("alphaSuffix", (AffixStyle::Alpha, false)),
        ("arabicPrefix", (AffixStyle::Arabic, true)),
    ],
    (AffixStyle::Arabic, false),
);

fn to_roman(mut number: u32) -> String {
    const TABLE: [(u32, &str); 13] = [
        (1000, "M"), (900, "CM"), (500, "D"), (400, "CD"),
        (100, "C"), (90, "XC"), (50, "L"), (40, "XL"),
        (10, "X"), (9, "IX"), (5, "V"), (4, "IV"), (1, "I"),
    ];
    let mut out = String::new();
    for (value, symbol) in TABLE {
        while number >= value {
            out.push_str(symbol);
            number -= value;
        }
    }
    out
}

fn to_alphabetic(mut number: u32) -> String {
    let mut out = Vec::new();
    while number > 0 {
        number -= 1;
        out.push((b'A' + (number % 26) as u8) as char);
        number /= 26;
    }
    out.iter().rev().collect()
}

fn ordinal_prefix(number: u32) -> String {
    let last_two = number % 100;
    let last = number % 10;
    if (11..=13).contains(&last_two) {
        return format!("{number}th");
    }
    match last {
        1 => format!("{number}st"),
        2 => format!("{number}nd"),
        3 => format!("{number}rd"),
        _ => format!("{number}th"),
    }
}

impl Staff {
    pub fn populate<'a, El: XmlElement<'a>>(node: &El, part: PartId, strict: bool) -> Result<Self, MusxError> {
        let cmper = Cmper(
            node.attribute("cmper")
                .and_then(|a| a.as_i64().ok())
                .unwrap_or_default() as u16,
        );
        let mut staff = Staff { part, cmper, ..Default::default() };
        if let Some(n) = node.first_child(Some("instUuid")) {
            staff.inst_uuid = text_as_string(&n);
        }
        if let Some(n) = node.first_child(Some("fullName")) {
            staff.full_name = text_as_string(&n);
        }
        if let Some(n) = node.first_child(Some("abbrvName")) {
            staff.abbreviated_name = text_as_string(&n);
        }
        if let Some(n) = node.first_child(Some("multiStaffInstId")) {
            let value = text_as_i64(&n)?;
            if value != 0 {
                staff.multi_staff_inst_id = Some(Cmper(value as u16));
            }
        }
        if let Some(n) = node.first_child(Some("notationStyle")) {
            let token = text_as_string(&n);
            staff.notation_style = NOTATION_STYLE_TABLE.decode(&token, strict, &format!("staff {cmper} notation style"))?;
        }
        staff.auto_numbering_style.enabled = match node.first_child(Some("useAutoNumbering")) {
            Some(n) => text_as_bool(&n).unwrap_or(true),
            None => true,
        };
        if let Some(n) = node.first_child(Some("autoNumberingStyle")) {
            let token = text_as_string(&n);
            let (affix, prefix) = AUTO_NUMBERING_STYLE_TABLE.decode(&token, strict, &format!("staff {cmper} auto-numbering style"))?;
            staff.auto_numbering_style.affix = affix;
            staff.auto_numbering_style.prefix = prefix;
        }
        Ok(staff)
    }

    /// The rendered affix text and whether it's a prefix, or `None` if this
    /// staff takes no auto-number (spec.md §4.7 "The affix ... is applied
    /// by the name-rendering path").
    pub fn calc_auto_numbering_affix(&self) -> Option<(String, bool)> {
        let number = self.auto_number_value?;
        Some(match self.auto_numbering_style.affix {
            AffixStyle::Arabic if self.auto_numbering_style.prefix => (format!("{number}. "), true),
            AffixStyle::Arabic => (format!(" {number}"), false),
            AffixStyle::Roman => (format!(" {}", to_roman(number)), false),
            AffixStyle::Ordinal => (format!("{} ", ordinal_prefix(number)), true),
            AffixStyle::Alpha => (format!(" {}", to_alphabetic(number)), false),
        })
    }

    /// Applies the auto-numbering affix to `plain_name`, or returns it
    /// unchanged if this staff takes no number.
    pub fn add_auto_numbering(&self, plain_name: &str) -> String {
        match self.calc_auto_numbering_affix() {
            Some((affix, true)) => format!("{affix}{plain_name}"),
            Some((affix, false)) => format!("{plain_name}{affix}"),
            None => plain_name.to_string(),
        }
    }
}

bitflags_mask! {
    /// Which field groups a `StaffStyle` overrides (spec.md §9
    /// "template-and-mask dispatch").
    pub struct StaffStyleMask: u32 {
        const STAFF_TYPE = 1 << 0;
        const TRANSPOSITION = 1 << 1;
        const FULL_NAME = 1 << 2;
        const ABBREVIATED_NAME = 1 << 3;
        const CUSTOM_STAFF = 1 << 4;
        const NOTATION_STYLE = 1 << 5;
    }
}

#[derive(Debug, Clone, Default)]
pub struct StaffStyle {
    pub part: PartId,
    pub cmper: Cmper,
    pub mask: StaffStyleMask,
    pub style_name: String,
    pub inst_uuid: String,
    pub full_name: String,
    pub abbreviated_name: String,
    pub notation_style: NotationStyle,
    pub transposition: Transposition,
    /// Custom staff-line positions, in ascending order (spec.md §8 scenario
    /// 4, "customStaff").
    pub custom_staff: Vec<i32>,
}

impl OthersBase for StaffStyle {
    fn part(&self) -> PartId {
        self.part
    }
    fn cmper(&self) -> Cmper {
        self.cmper
    }
}

impl StaffStyle {
    pub fn populate<'a, El: XmlElement<'a>>(node: &El, part: PartId, strict: bool) -> Result<Self, MusxError> {
        let cmper = Cmper(
            node.attribute("cmper")
                .and_then(|a| a.as_i64().ok())
                .unwrap_or_default() as u16,
        );
        let mut style = StaffStyle { part, cmper, ..Default::default() };
        if let Some(n) = node.first_child(Some("styleName")) {
            style.style_name = text_as_string(&n);
        }
        if let Some(n) = node.first_child(Some("instUuid")) {
            style.inst_uuid = text_as_string(&n);
        }
        if let Some(mask) = node.first_child(Some("mask")) {
            style.mask = StaffStyleMask::from_bits_truncate(text_as_i64(&mask)? as u32);
        }
        if style.mask.contains(StaffStyleMask::NOTATION_STYLE) {
            if let Some(n) = node.first_child(Some("notationStyle")) {
                let token = text_as_string(&n);
                style.notation_style = NOTATION_STYLE_TABLE.decode(&token, strict, &format!("staff style {cmper} notation style"))?;
            }
        }
        if style.mask.contains(StaffStyleMask::FULL_NAME) {
            if let Some(n) = node.first_child(Some("fullName")) {
                style.full_name = text_as_string(&n);
            }
        }
        if style.mask.contains(StaffStyleMask::ABBREVIATED_NAME) {
            if let Some(n) = node.first_child(Some("abbrvName")) {
                style.abbreviated_name = text_as_string(&n);
            }
        }
        if style.mask.contains(StaffStyleMask::CUSTOM_STAFF) {
            if let Some(lines) = node.first_child(Some("lines")) {
                let mut values: Vec<i32> = lines
                    .children(Some("line"))
                    .map(|l| text_as_i64(&l).map(|v| v as i32))
                    .collect::<Result<_, _>>()?;
                values.sort_unstable();
                style.custom_staff = values;
            }
        }
        Ok(style)
    }
}

/// Binds a `StaffStyle` to a `(staff, measure-edu range)` (spec.md §3,
/// §4.7). Keyed in the details pool by `(part, staff-cmper, style-cmper,
/// inci)`, so it lives here as a standalone "other" referenced by both
/// sides rather than embedded in either.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaffStyleAssign {
    pub part: PartId,
    pub staff_cmper: Cmper,
    pub style_id: Cmper,
    pub inci: Inci,
    pub start_measure: i32,
    pub start_edu: Edu,
    pub end_measure: i32,
    pub end_edu: Edu,
}

impl OthersBase for StaffStyleAssign {
    fn part(&self) -> PartId {
        self.part
    }
    fn cmper(&self) -> Cmper {
        self.staff_cmper
    }
    fn inci(&self) -> Option<Inci> {
        Some(self.inci)
    }
}

impl StaffStyleAssign {
    pub fn populate<'a, El: XmlElement<'a>>(
        node: &El,
        part: PartId,
        staff_cmper: Cmper,
        inci: Inci,
    ) -> Result<Self, MusxError> {
        let mut assign = StaffStyleAssign {
            part,
            staff_cmper,
            inci,
            end_edu: Edu::MAX,
            ..Default::default()
        };
        if let Some(n) = node.first_child(Some("styleId")) {
            assign.style_id = Cmper(text_as_i64(&n)? as u16);
        }
        if let Some(n) = node.first_child(Some("startMeas")) {
            assign.start_measure = text_as_i64(&n)? as i32;
        }
        if let Some(n) = node.first_child(Some("startEdu")) {
            assign.start_edu = text_as_i64(&n)? as Edu;
        }
        if let Some(n) = node.first_child(Some("endMeas")) {
            assign.end_measure = text_as_i64(&n)? as i32;
        } else {
            assign.end_measure = i32::MAX;
        }
        if let Some(n) = node.first_child(Some("endEdu")) {
            assign.end_edu = text_as_i64(&n)? as Edu;
        }
        Ok(assign)
    }

    /// Does this assignment's measure/edu range contain `(measure, edu)`
    /// (spec.md §4.7 step 3)?
    pub fn contains(&self, measure: i32, edu: Edu) -> bool {
        let after_start = measure > self.start_measure || (measure == self.start_measure && edu >= self.start_edu);
        let before_end = measure < self.end_measure || (measure == self.end_measure && edu <= self.end_edu);
        after_start && before_end
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TimeSignature {
    pub beats: i32,
    pub beat_duration: Edu,
}

#[derive(Debug, Clone, Default)]
pub struct Measure {
    pub part: PartId,
    pub cmper: Cmper,
    pub time_signature: TimeSignature,
    pub key_signature: KeySignature,
    /// One cmper per layer (0..3), 0 meaning "no frame in this layer".
    pub frame_cmpers: [Cmper; 4],
}

impl OthersBase for Measure {
    fn part(&self) -> PartId {
        self.part
    }
    fn cmper(&self) -> Cmper {
        self.cmper
    }
}

impl Measure {
    pub fn populate<'a, El: XmlElement<'a>>(node: &El, part: PartId) -> Result<Self, MusxError> {
        let cmper = Cmper(
            node.attribute("cmper")
                .and_then(|a| a.as_i64().ok())
                .unwrap_or_default() as u16,
        );
        let mut measure = Measure { part, cmper, ..Default::default() };
        if let Some(ts) = node.first_child(Some("timeSig")) {
            if let Some(beats) = ts.first_child(Some("beats")) {
                measure.time_signature.beats = text_as_i64(&beats)? as i32;
            }
            if let Some(dur) = ts.first_child(Some("beatDuration")) {
                measure.time_signature.beat_duration = text_as_i64(&dur)? as Edu;
            }
        }
        Ok(measure)
    }
}

/// A contiguous slice of the entry chain, or a start-time placeholder, for
/// one `(staff, measure, layer)` (spec.md §3 "Frame", §4.8 step 3).
#[derive(Debug, Clone, Copy, Default)]
pub struct Frame {
    pub part: PartId,
    pub cmper: Cmper,
    pub start_entry: Option<crate::ids::EntryNumber>,
    pub end_entry: Option<crate::ids::EntryNumber>,
    pub start_time: Option<Edu>,
}

impl OthersBase for Frame {
    fn part(&self) -> PartId {
        self.part
    }
    fn cmper(&self) -> Cmper {
        self.cmper
    }
}

impl Frame {
    pub fn populate<'a, El: XmlElement<'a>>(node: &El, part: PartId) -> Result<Self, MusxError> {
        let cmper = Cmper(
            node.attribute("cmper")
                .and_then(|a| a.as_i64().ok())
                .unwrap_or_default() as u16,
        );
        let mut frame = Frame { part, cmper, ..Default::default() };
        if let Some(n) = node.first_child(Some("startEntry")) {
            frame.start_entry = Some(crate::ids::EntryNumber(text_as_i64(&n)? as u32));
        }
        if let Some(n) = node.first_child(Some("endEntry")) {
            frame.end_entry = Some(crate::ids::EntryNumber(text_as_i64(&n)? as u32));
        }
        if let Some(n) = node.first_child(Some("startTime")) {
            frame.start_time = Some(text_as_i64(&n)? as Edu);
        }
        if frame.start_time.is_some() && (frame.start_entry.is_some() || frame.end_entry.is_some()) {
            return Err(IntegrityError::Other(format!(
                "Frame {} has both a start/end entry range and a start-time placeholder",
                frame.cmper
            ))
            .into());
        }
        Ok(frame)
    }
}

/// A run of staves that a multi-staff instrument (e.g. piano, organ) owns
/// (spec.md §4.10 pass 1).
#[derive(Debug, Clone, Default)]
pub struct MultiStaffInstrumentGroup {
    pub part: PartId,
    pub cmper: Cmper,
    pub staves: Vec<Cmper>,
}

impl OthersBase for MultiStaffInstrumentGroup {
    fn part(&self) -> PartId {
        self.part
    }
    fn cmper(&self) -> Cmper {
        self.cmper
    }
}

impl MultiStaffInstrumentGroup {
    pub fn populate<'a, El: XmlElement<'a>>(node: &El, part: PartId) -> Result<Self, MusxError> {
        let cmper = Cmper(
            node.attribute("cmper")
                .and_then(|a| a.as_i64().ok())
                .unwrap_or_default() as u16,
        );
        let staves = node
            .children(Some("staffNum"))
            .map(|n| text_as_i64(&n).map(|v| Cmper(v as u16)))
            .collect::<Result<_, _>>()?;
        Ok(MultiStaffInstrumentGroup { part, cmper, staves })
    }
}

/// A part or score definition: `cmper` names the part (0 = score).
#[derive(Debug, Clone, Default)]
pub struct PartDef {
    pub part: PartId,
    pub cmper: Cmper,
    pub name: String,
    pub number_of_pages: u32,
    pub number_of_leading_blank_pages: u32,
}

impl OthersBase for PartDef {
    fn part(&self) -> PartId {
        self.part
    }
    fn cmper(&self) -> Cmper {
        self.cmper
    }
}

impl PartDef {
    pub fn populate<'a, El: XmlElement<'a>>(node: &El) -> Result<Self, MusxError> {
        let cmper = Cmper(
            node.attribute("cmper")
                .and_then(|a| a.as_i64().ok())
                .unwrap_or_default() as u16,
        );
        let mut part_def = PartDef { part: PartId(cmper.0), cmper, ..Default::default() };
        if let Some(n) = node.first_child(Some("partName")) {
            part_def.name = text_as_string(&n);
        }
        if let Some(n) = node.first_child(Some("numPages")) {
            part_def.number_of_pages = text_as_i64(&n)? as u32;
        }
        if let Some(n) = node.first_child(Some("numberOfLeadingBlankPages")) {
            part_def.number_of_leading_blank_pages = text_as_i64(&n)? as u32;
        }
        Ok(part_def)
    }
}

/// Which drum library a percussion-notation staff maps onto (spec.md §3
/// "Lifecycle" — source for `Staff::percussion_map_id` forwarding).
/// Grounded on `examples/original_source/src/musx/dom/Staff.cpp`'s
/// `calcAllRuntimeValues`, which reads this record's `whichDrumLib` field;
/// the record's own shape wasn't in the retrieved source window, so only
/// the one field the forwarding pass needs is modeled here.
#[derive(Debug, Clone, Copy, Default)]
pub struct DrumStaff {
    pub part: PartId,
    pub cmper: Cmper,
    pub which_drum_lib: Cmper,
}

impl OthersBase for DrumStaff {
    fn part(&self) -> PartId {
        self.part
    }
    fn cmper(&self) -> Cmper {
        self.cmper
    }
}

impl DrumStaff {
    pub fn populate<'a, El: XmlElement<'a>>(node: &El, part: PartId) -> Result<Self, MusxError> {
        let cmper = Cmper(
            node.attribute("cmper")
                .and_then(|a| a.as_i64().ok())
                .unwrap_or_default() as u16,
        );
        let mut drum_staff = DrumStaff { part, cmper, ..Default::default() };
        if let Some(n) = node.first_child(Some("whichDrumLib")) {
            drum_staff.which_drum_lib = Cmper(text_as_i64(&n)? as u16);
        }
        Ok(drum_staff)
    }
}

/// Presence of either record marks that a staff carries an explicit
/// full-name or abbreviated-name position override; only existence is
/// consulted by the forwarding pass, so no position fields are modeled
/// (spec.md §3 "Lifecycle" — `fullNamePosId`/`abrvNamePosId` forwarding).
#[derive(Debug, Clone, Copy, Default)]
pub struct NamePositionFull {
    pub part: PartId,
    pub cmper: Cmper,
}

impl OthersBase for NamePositionFull {
    fn part(&self) -> PartId {
        self.part
    }
    fn cmper(&self) -> Cmper {
        self.cmper
    }
}

impl NamePositionFull {
    pub fn populate<'a, El: XmlElement<'a>>(node: &El, part: PartId) -> Result<Self, MusxError> {
        let cmper = Cmper(
            node.attribute("cmper")
                .and_then(|a| a.as_i64().ok())
                .unwrap_or_default() as u16,
        );
        Ok(NamePositionFull { part, cmper })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NamePositionAbbreviated {
    pub part: PartId,
    pub cmper: Cmper,
}

impl OthersBase for NamePositionAbbreviated {
    fn part(&self) -> PartId {
        self.part
    }
    fn cmper(&self) -> Cmper {
        self.cmper
    }
}

impl NamePositionAbbreviated {
    pub fn populate<'a, El: XmlElement<'a>>(node: &El, part: PartId) -> Result<Self, MusxError> {
        let cmper = Cmper(
            node.attribute("cmper")
                .and_then(|a| a.as_i64().ok())
                .unwrap_or_default() as u16,
        );
        Ok(NamePositionAbbreviated { part, cmper })
    }
}

/// `TonalCenterSharps`/`TonalCenterFlats` custom arrays for a non-standard
/// key signature (spec.md §4.9).
#[derive(Debug, Clone, Default)]
pub struct TonalCenterArray {
    pub part: PartId,
    pub cmper: Cmper,
    pub centers: Vec<i32>,
}

impl OthersBase for TonalCenterArray {
    fn part(&self) -> PartId {
        self.part
    }
    fn cmper(&self) -> Cmper {
        self.cmper
    }
}

impl TonalCenterArray {
    pub fn populate<'a, El: XmlElement<'a>>(node: &El, part: PartId) -> Result<Self, MusxError> {
        let cmper = Cmper(
            node.attribute("cmper")
                .and_then(|a| a.as_i64().ok())
                .unwrap_or_default() as u16,
        );
        let centers = node
            .children(Some("step"))
            .map(|n| text_as_i64(&n).map(|v| v as i32))
            .collect::<Result<_, _>>()?;
        Ok(TonalCenterArray { part, cmper, centers })
    }
}

/// A named font face/size/style used by Options/Others records that refer
/// to fonts by `fontId` (SMuFL classification lives in `smufl.rs`).
#[derive(Debug, Clone, Default)]
pub struct FontDefinition {
    pub part: PartId,
    pub cmper: Cmper,
    pub name: String,
    pub is_smufl: bool,
}

impl OthersBase for FontDefinition {
    fn part(&self) -> PartId {
        self.part
    }
    fn cmper(&self) -> Cmper {
        self.cmper
    }
}

impl FontDefinition {
    pub fn populate<'a, El: XmlElement<'a>>(node: &El, part: PartId) -> Result<Self, MusxError> {
        let cmper = Cmper(
            node.attribute("cmper")
                .and_then(|a| a.as_i64().ok())
                .unwrap_or_default() as u16,
        );
        let mut font = FontDefinition { part, cmper, ..Default::default() };
        if let Some(n) = node.first_child(Some("fontName")) {
            font.name = text_as_string(&n);
        }
        if let Some(n) = node.first_child(Some("isSmuflFont")) {
            font.is_smufl = text_as_bool(&n).unwrap_or(false);
        }
        Ok(font)
    }
}

