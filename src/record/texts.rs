//! Texts (C3): block/expression/smart-shape/lyrics text, keyed by `cmper`
//! within each subtype (spec.md §3 "Texts").

use crate::error::MusxError;
use crate::ids::Cmper;
use crate::record::TextsBase;
use crate::xml::{text_as_string, XmlElement};

#[derive(Debug, Clone, Default)]
pub struct TextBlock {
    pub cmper: Cmper,
    pub raw_text: String,
}

impl TextsBase for TextBlock {
    fn cmper(&self) -> Cmper {
        self.cmper
    }
}

impl TextBlock {
    pub fn populate<'a, El: XmlElement<'a>>(node: &El) -> Result<Self, MusxError> {
        let cmper = Cmper(
            node.attribute("number")
                .and_then(|a| a.as_i64().ok())
                .unwrap_or_default() as u16,
        );
        let raw_text = node.first_child(Some("text")).map(|n| text_as_string(&n)).unwrap_or_default();
        Ok(TextBlock { cmper, raw_text })
    }
}

/// A single lyric syllable, delimited by whitespace/hyphen in the raw
/// lyric text (spec.md §4.11 "LyricsVerse/Chorus/Section").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Syllable {
    pub text: String,
    pub has_hyphen_before: bool,
    pub has_hyphen_after: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LyricKind {
    Verse,
    Chorus,
    Section,
}

#[derive(Debug, Clone)]
pub struct LyricText {
    pub cmper: Cmper,
    pub kind: LyricKind,
    pub raw_text: String,
    pub syllables: Vec<Syllable>,
}

impl TextsBase for LyricText {
    fn cmper(&self) -> Cmper {
        self.cmper
    }
}

impl LyricText {
    pub fn populate<'a, El: XmlElement<'a>>(
        node: &El,
        kind: LyricKind,
        punctuation_to_ignore: &str,
    ) -> Result<Self, MusxError> {
        let cmper = Cmper(
            node.attribute("number")
                .and_then(|a| a.as_i64().ok())
                .unwrap_or_default() as u16,
        );
        let raw_text = node.first_child(Some("text")).map(|n| text_as_string(&n)).unwrap_or_default();
        let syllables = split_syllables(&raw_text, punctuation_to_ignore);
        Ok(LyricText { cmper, kind, raw_text, syllables })
    }
}

/// Splits raw lyric text on whitespace and hyphen, treating characters in
/// `punctuation_to_ignore` as non-delimiting (spec.md §4.11).
pub fn split_syllables(text: &str, punctuation_to_ignore: &str) -> Vec<Syllable> {
    let mut syllables = Vec::new();
    let mut current = String::new();
    let mut hyphen_before = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '-' {
            if !current.is_empty() {
                syllables.push(Syllable { text: std::mem::take(&mut current), has_hyphen_before: hyphen_before, has_hyphen_after: true });
            } else if let Some(last) = syllables.last_mut() {
                last.has_hyphen_after = true;
            }
            hyphen_before = true;
            continue;
        }
        if c.is_whitespace() {
            if !current.is_empty() {
                syllables.push(Syllable { text: std::mem::take(&mut current), has_hyphen_before: hyphen_before, has_hyphen_after: false });
                hyphen_before = false;
            }
            continue;
        }
        if c.is_ascii_punctuation() && !punctuation_to_ignore.contains(c) {
            if !current.is_empty() {
                syllables.push(Syllable { text: std::mem::take(&mut current), has_hyphen_before: hyphen_before, has_hyphen_after: false });
                hyphen_before = false;
            }
            continue;
        }
        current.push(c);
    }
    if !current.is_empty() {
        syllables.push(Syllable { text: current, has_hyphen_before: hyphen_before, has_hyphen_after: false });
    }
    syllables
}

/// File-level document info (creator, title), occasionally consulted by
/// diagnostics but never by the core compositors.
#[derive(Debug, Clone, Default)]
pub struct FileInfoText {
    pub cmper: Cmper,
    pub value: String,
}

impl TextsBase for FileInfoText {
    fn cmper(&self) -> Cmper {
        self.cmper
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hyphenated_word_marks_both_sides_of_the_break() {
        let syllables = split_syllables("foo-bar", "");
        assert_eq!(syllables.len(), 2);
        assert_eq!(syllables[0].text, "foo");
        assert!(!syllables[0].has_hyphen_before);
        assert!(syllables[0].has_hyphen_after);
        assert_eq!(syllables[1].text, "bar");
        assert!(syllables[1].has_hyphen_before);
        assert!(!syllables[1].has_hyphen_after);
    }

    #[test]
    fn whitespace_separated_words_carry_no_hyphen_flags() {
        let syllables = split_syllables("hello world", "");
        assert_eq!(syllables.len(), 2);
        assert!(!syllables[0].has_hyphen_after);
        assert!(!syllables[1].has_hyphen_before);
    }

    #[test]
    fn ignored_punctuation_does_not_delimit() {
        let syllables = split_syllables("don't stop", "'");
        assert_eq!(syllables[0].text, "don't");
    }
}
