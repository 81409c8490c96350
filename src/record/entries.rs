//! Entries (C3): notes/chords keyed by `EntryNumber`, forming a doubly
//! linked chain via `prev`/`next` (spec.md §3 "Entries").

use crate::error::MusxError;
use crate::ids::{Edu, EntryNumber};
use crate::xml::{text_as_bool, text_as_i64, XmlElement};

#[derive(Debug, Clone, Copy, Default)]
pub struct Note {
    /// Raw pitch-class/octave encoding as stored (the notation-style-aware
    /// interpretation lives in `key_signature::Transposer`).
    pub harmonic_index: i32,
    pub octave: i32,
    pub tied_left: bool,
    pub tied_right: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Entry {
    pub number: EntryNumber,
    pub prev: Option<EntryNumber>,
    pub next: Option<EntryNumber>,
    pub duration: Edu,
    pub is_rest: bool,
    pub is_grace: bool,
    /// Layer 2 "voice 2" flag; a set `v2Launch` restarts the elapsed-time
    /// accumulator at the prior layer-1 entry's start (spec.md §4.8 step
    /// 4, §9 "Entry iteration over voices").
    pub voice2: bool,
    pub v2_launch: bool,
    pub invisible_in_score: bool,
    pub invisible_in_part: bool,
    pub notes: Vec<Note>,
}

impl Entry {
    pub fn populate<'a, El: XmlElement<'a>>(node: &El) -> Result<Self, MusxError> {
        let number = EntryNumber(
            node.attribute("entnum")
                .and_then(|a| a.as_i64().ok())
                .unwrap_or_default() as u32,
        );
        let mut entry = Entry { number, ..Default::default() };

        if let Some(n) = node.attribute("prev") {
            let value = n.as_i64()?;
            if value != 0 {
                entry.prev = Some(EntryNumber(value as u32));
            }
        }
        if let Some(n) = node.attribute("next") {
            let value = n.as_i64()?;
            if value != 0 {
                entry.next = Some(EntryNumber(value as u32));
            }
        }
        if let Some(n) = node.first_child(Some("dura")) {
            entry.duration = text_as_i64(&n)? as Edu;
        }
        if let Some(n) = node.first_child(Some("isRest")) {
            entry.is_rest = text_as_bool(&n).unwrap_or(false);
        }
        if let Some(n) = node.first_child(Some("graceNote")) {
            entry.is_grace = text_as_bool(&n).unwrap_or(false);
        }
        if let Some(n) = node.first_child(Some("voice2")) {
            entry.voice2 = text_as_bool(&n).unwrap_or(false);
        }
        if let Some(n) = node.first_child(Some("v2Launch")) {
            entry.v2_launch = text_as_bool(&n).unwrap_or(false);
        }
        if let Some(n) = node.first_child(Some("hidden")) {
            entry.invisible_in_score = text_as_bool(&n).unwrap_or(false);
        }
        for note_node in node.children(Some("note")) {
            let mut note = Note::default();
            if let Some(n) = note_node.first_child(Some("harmLev")) {
                note.harmonic_index = text_as_i64(&n)? as i32;
            }
            if let Some(n) = note_node.first_child(Some("tieStart")) {
                note.tied_right = text_as_bool(&n).unwrap_or(false);
            }
            if let Some(n) = note_node.first_child(Some("tieEnd")) {
                note.tied_left = text_as_bool(&n).unwrap_or(false);
            }
            entry.notes.push(note);
        }

        Ok(entry)
    }

    /// True if the entry carries flaggable duration (shorter than a
    /// quarter note) and is therefore eligible to start/continue a beam
    /// (spec.md §4.8 "Beam detection").
    pub fn is_flaggable(&self) -> bool {
        self.duration > 0 && self.duration < crate::ids::EDU_PER_QUARTER
    }

    pub fn displays_as_rest(&self) -> bool {
        self.is_rest
    }
}
