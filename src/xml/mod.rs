//! XML Façade (C1): an abstract tree/attribute reader with pluggable
//! backends, so the rest of the crate never names a concrete XML library.
//!
//! Grounded on `original_source/src/musx/xml/XmlInterface.h`, which defines
//! the same three capabilities (`Document`/`Element`/`Attribute`) over four
//! interchangeable C++ backends (pugixml/tinyxml2/rapidxml/Qt). We ship one
//! concrete backend (`quick_xml_backend`, built on the teacher's `quick-xml`
//! dependency) and keep the trait boundary so a second backend could be
//! added without touching any caller.

pub mod quick_xml_backend;

use crate::error::ParseError;

/// A parsed XML document. Implementations own their backing storage; the
/// façade never exposes it.
pub trait XmlDocument {
    type Elem<'a>: XmlElement<'a>
    where
        Self: 'a;

    /// The document's root element, or `None` for an empty document.
    fn root<'a>(&'a self) -> Option<Self::Elem<'a>>;
}

/// A single XML element: tag name, text content, and navigation to
/// siblings/children/parent/attributes.
pub trait XmlElement<'a>: Clone {
    type Attr: XmlAttribute;

    fn tag_name(&self) -> &str;

    /// Direct text content of this element (concatenation of text nodes,
    /// trimmed of surrounding whitespace — spec.md §4.1).
    fn text(&self) -> Option<String>;

    /// First child, optionally filtered by tag name.
    fn first_child(&self, tag: Option<&str>) -> Option<Self>
    where
        Self: Sized;

    /// Next sibling, optionally filtered by tag name.
    fn next_sibling(&self, tag: Option<&str>) -> Option<Self>
    where
        Self: Sized;

    /// Previous sibling, optionally filtered by tag name.
    fn prev_sibling(&self, tag: Option<&str>) -> Option<Self>
    where
        Self: Sized;

    fn parent(&self) -> Option<Self>
    where
        Self: Sized;

    fn first_attribute(&self) -> Option<Self::Attr>;

    fn attribute(&self, name: &str) -> Option<Self::Attr>;

    /// Iterate children, optionally filtered by tag name, in document order.
    fn children(&self, tag: Option<&str>) -> ChildIter<'_, 'a, Self>
    where
        Self: Sized,
    {
        ChildIter {
            next: self.first_child(tag),
            tag: tag.map(|t| t.to_string()),
            _marker: std::marker::PhantomData,
        }
    }
}

pub struct ChildIter<'e, 'a, E: XmlElement<'a>> {
    next: Option<E>,
    tag: Option<String>,
    _marker: std::marker::PhantomData<(&'e (), &'a ())>,
}

impl<'e, 'a, E: XmlElement<'a>> Iterator for ChildIter<'e, 'a, E> {
    type Item = E;

    fn next(&mut self) -> Option<E> {
        let current = self.next.take()?;
        self.next = current.next_sibling(self.tag.as_deref());
        Some(current)
    }
}

/// A single XML attribute: name, raw value, and typed extraction.
pub trait XmlAttribute: Clone {
    fn name(&self) -> &str;

    fn value(&self) -> &str;

    fn next_attribute(&self) -> Option<Self>
    where
        Self: Sized;

    fn as_i64(&self) -> Result<i64, ParseError> {
        parse_trimmed_int(self.value())
    }

    fn as_f64(&self) -> Result<f64, ParseError> {
        self.value()
            .trim()
            .parse()
            .map_err(|_| ParseError::NotAFloat { value: self.value().to_string() })
    }

    fn as_bool(&self) -> Result<bool, ParseError> {
        parse_trimmed_bool(self.value())
    }

    fn as_char(&self) -> Result<char, ParseError> {
        let trimmed = self.value().trim();
        let mut chars = trimmed.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(ParseError::NotACodepoint { value: self.value().to_string() }),
        }
    }
}

pub(crate) fn parse_trimmed_int(raw: &str) -> Result<i64, ParseError> {
    raw.trim()
        .parse()
        .map_err(|_| ParseError::NotAnInteger { value: raw.to_string() })
}

pub(crate) fn parse_trimmed_bool(raw: &str) -> Result<bool, ParseError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseError::NotABool { value: raw.to_string() }),
    }
}

/// Helper for typed text extraction shared by every record populator
/// (spec.md §4.1's "typed attribute/text extraction").
pub fn text_as_i64<'a, E: XmlElement<'a>>(elem: &E) -> Result<i64, ParseError> {
    let text = elem.text().unwrap_or_default();
    parse_trimmed_int(&text)
}

pub fn text_as_bool<'a, E: XmlElement<'a>>(elem: &E) -> Result<bool, ParseError> {
    let text = elem.text().unwrap_or_default();
    parse_trimmed_bool(&text)
}

pub fn text_as_string<'a, E: XmlElement<'a>>(elem: &E) -> String {
    elem.text().unwrap_or_default()
}
