//! Options (C3): document-wide singleton records — font defaults, beam,
//! tie, music-spacing, chord, and lyric punctuation options (spec.md §3
//! "Options"). A representative set: spec.md §1 names "exhaustive option
//! surfaces" as out of core scope.

use crate::error::MusxError;
use crate::ids::PartId;
use crate::record::OptionsBase;
use crate::xml::{text_as_bool, text_as_i64, text_as_string, XmlElement};

macro_rules! options_base_impl {
    ($name:ident) => {
        impl OptionsBase for $name {
            fn part(&self) -> PartId {
                self.part
            }
        }
    };
}

#[derive(Debug, Clone, Default)]
pub struct FontOptions {
    pub part: PartId,
    pub music_font_id: u16,
    pub default_text_font_id: u16,
}
options_base_impl!(FontOptions);

impl FontOptions {
    pub fn populate<'a, El: XmlElement<'a>>(node: &El, part: PartId) -> Result<Self, MusxError> {
        let mut opts = FontOptions { part, ..Default::default() };
        if let Some(n) = node.first_child(Some("musicFontId")) {
            opts.music_font_id = text_as_i64(&n)? as u16;
        }
        if let Some(n) = node.first_child(Some("defaultTextFontId")) {
            opts.default_text_font_id = text_as_i64(&n)? as u16;
        }
        Ok(opts)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BeamOptions {
    pub part: PartId,
    pub beam_together_with_notes_in_chord: bool,
    pub break_beams_at_barline: bool,
}
options_base_impl!(BeamOptions);

impl BeamOptions {
    pub fn populate<'a, El: XmlElement<'a>>(node: &El, part: PartId) -> Result<Self, MusxError> {
        let mut opts = BeamOptions { part, ..Default::default() };
        if let Some(n) = node.first_child(Some("beamTogetherWithNotesInChord")) {
            opts.beam_together_with_notes_in_chord = text_as_bool(&n).unwrap_or(false);
        }
        if let Some(n) = node.first_child(Some("breakBeamsAtBarline")) {
            opts.break_beams_at_barline = text_as_bool(&n).unwrap_or(false);
        }
        Ok(opts)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TieOptions {
    pub part: PartId,
    pub avoid_staff_lines: bool,
}
options_base_impl!(TieOptions);

impl TieOptions {
    pub fn populate<'a, El: XmlElement<'a>>(node: &El, part: PartId) -> Result<Self, MusxError> {
        let mut opts = TieOptions { part, ..Default::default() };
        if let Some(n) = node.first_child(Some("avoidStaffLines")) {
            opts.avoid_staff_lines = text_as_bool(&n).unwrap_or(false);
        }
        Ok(opts)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MusicSpacingOptions {
    pub part: PartId,
    pub minimum_width: i32,
}
options_base_impl!(MusicSpacingOptions);

impl MusicSpacingOptions {
    pub fn populate<'a, El: XmlElement<'a>>(node: &El, part: PartId) -> Result<Self, MusxError> {
        let mut opts = MusicSpacingOptions { part, ..Default::default() };
        if let Some(n) = node.first_child(Some("minWidth")) {
            opts.minimum_width = text_as_i64(&n)? as i32;
        }
        Ok(opts)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ChordOptions {
    pub part: PartId,
    pub show_roots_in_brackets: bool,
}
options_base_impl!(ChordOptions);

impl ChordOptions {
    pub fn populate<'a, El: XmlElement<'a>>(node: &El, part: PartId) -> Result<Self, MusxError> {
        let mut opts = ChordOptions { part, ..Default::default() };
        if let Some(n) = node.first_child(Some("showRootsInBrackets")) {
            opts.show_roots_in_brackets = text_as_bool(&n).unwrap_or(false);
        }
        Ok(opts)
    }
}

/// `LyricOptions::lyricPunctuationToIgnore`, consulted by the syllable
/// splitter in `record::texts` (spec.md §4.11).
#[derive(Debug, Clone, Default)]
pub struct LyricOptions {
    pub part: PartId,
    pub lyric_punctuation_to_ignore: String,
}
options_base_impl!(LyricOptions);

impl LyricOptions {
    pub fn populate<'a, El: XmlElement<'a>>(node: &El, part: PartId) -> Result<Self, MusxError> {
        let mut opts = LyricOptions { part, ..Default::default() };
        if let Some(n) = node.first_child(Some("lyricPunctuationToIgnore")) {
            opts.lyric_punctuation_to_ignore = text_as_string(&n);
        }
        Ok(opts)
    }
}
