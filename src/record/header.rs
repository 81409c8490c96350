//! Header (C3): word order, text encoding, creation/modification metadata
//! (spec.md §3 "Header", §6 "Textual encodings").

use crate::error::MusxError;
use crate::xml::{text_as_string, XmlElement};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WordOrder {
    #[default]
    LoEndian,
    HiEndian,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextEncoding {
    Mac,
    Windows,
    #[default]
    Other,
}

#[derive(Debug, Clone, Default)]
pub struct Header {
    pub word_order: WordOrder,
    pub text_encoding: TextEncoding,
    pub program_name: String,
    pub program_version: String,
}

impl Header {
    pub fn populate<'a, El: XmlElement<'a>>(node: &El) -> Result<Self, MusxError> {
        let mut header = Header::default();
        let Some(data) = node.first_child(Some("headerData")) else {
            return Ok(header);
        };
        if let Some(wo) = data.first_child(Some("wordOrder")) {
            header.word_order = match text_as_string(&wo).as_str() {
                "hi-endian" => WordOrder::HiEndian,
                _ => WordOrder::LoEndian,
            };
        }
        if let Some(enc) = data.first_child(Some("textEncoding")) {
            header.text_encoding = match text_as_string(&enc).as_str() {
                "Mac" => TextEncoding::Mac,
                "Windows" => TextEncoding::Windows,
                _ => TextEncoding::Other,
            };
        }
        if let Some(name) = data.first_child(Some("programName")) {
            header.program_name = text_as_string(&name);
        }
        if let Some(version) = data.first_child(Some("programVersion")) {
            header.program_version = text_as_string(&version);
        }
        Ok(header)
    }
}
