//! Concrete XML façade backend built on `quick-xml`.
//!
//! `quick-xml` is a streaming (SAX-style) reader with no parent/sibling
//! back-references, but the façade (`xml::XmlElement`) needs tree
//! navigation — first/next/previous child, parent, first attribute — the
//! way `original_source`'s `PugiXmlImpl.h` wraps a DOM tree. We bridge the
//! gap the way the teacher's `parser.rs` already reads `quick_xml::Reader`
//! events in a loop, generalized here to materialize an arena of nodes
//! (indices into a `Vec`) with parent/child/sibling links recorded as we go,
//! rather than discarding structure as each element is consumed.

use std::rc::Rc;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::LoadError;
use crate::xml::{XmlAttribute, XmlDocument, XmlElement};

#[derive(Debug)]
struct NodeData {
    tag: String,
    text: Option<String>,
    attrs: Vec<(String, String)>,
    parent: Option<usize>,
    first_child: Option<usize>,
    last_child: Option<usize>,
    next_sibling: Option<usize>,
    prev_sibling: Option<usize>,
}

#[derive(Debug)]
struct Arena {
    nodes: Vec<NodeData>,
}

/// A parsed EnigmaXML document, materialized as an arena tree.
#[derive(Clone)]
pub struct QuickXmlDocument {
    arena: Rc<Arena>,
    root: Option<usize>,
}

impl QuickXmlDocument {
    pub fn parse(xml: &str) -> Result<Self, LoadError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut arena = Arena { nodes: Vec::new() };
        // Stack of currently-open element indices.
        let mut stack: Vec<usize> = Vec::new();
        let mut root: Option<usize> = None;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    let idx = push_node(&mut arena, &e, &stack, &mut root)?;
                    stack.push(idx);
                }
                Ok(Event::Empty(e)) => {
                    let idx = push_node(&mut arena, &e, &stack, &mut root)?;
                    let _ = idx;
                }
                Ok(Event::End(_)) => {
                    stack.pop();
                }
                Ok(Event::Text(t)) => {
                    if let Some(&current) = stack.last() {
                        let text = t
                            .unescape()
                            .map_err(|e| LoadError::Malformed(e.to_string()))?
                            .trim()
                            .to_string();
                        if !text.is_empty() {
                            let node = &mut arena.nodes[current];
                            node.text = Some(match node.text.take() {
                                Some(mut existing) => {
                                    existing.push_str(&text);
                                    existing
                                }
                                None => text,
                            });
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(LoadError::Malformed(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        Ok(Self { arena: Rc::new(arena), root })
    }
}

fn push_node(
    arena: &mut Arena,
    e: &quick_xml::events::BytesStart<'_>,
    stack: &[usize],
    root: &mut Option<usize>,
) -> Result<usize, LoadError> {
    let tag = String::from_utf8_lossy(e.name().as_ref()).to_string();
    let mut attrs = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|e| LoadError::Malformed(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr
            .unescape_value()
            .map_err(|e| LoadError::Malformed(e.to_string()))?
            .to_string();
        attrs.push((key, value));
    }

    let idx = arena.nodes.len();
    let parent = stack.last().copied();
    arena.nodes.push(NodeData {
        tag,
        text: None,
        attrs,
        parent,
        first_child: None,
        last_child: None,
        next_sibling: None,
        prev_sibling: None,
    });

    if let Some(parent_idx) = parent {
        let prev_last = arena.nodes[parent_idx].last_child;
        arena.nodes[parent_idx].last_child = Some(idx);
        if let Some(prev_last) = prev_last {
            arena.nodes[prev_last].next_sibling = Some(idx);
            arena.nodes[idx].prev_sibling = Some(prev_last);
        } else {
            arena.nodes[parent_idx].first_child = Some(idx);
        }
    } else if root.is_none() {
        *root = Some(idx);
    }

    Ok(idx)
}

impl XmlDocument for QuickXmlDocument {
    type Elem<'a>
        = QuickXmlElement
    where
        Self: 'a;

    fn root<'a>(&'a self) -> Option<Self::Elem<'a>> {
        self.root.map(|idx| QuickXmlElement { arena: self.arena.clone(), idx })
    }
}

#[derive(Clone)]
pub struct QuickXmlElement {
    arena: Rc<Arena>,
    idx: usize,
}

impl QuickXmlElement {
    fn node(&self) -> &NodeData {
        &self.arena.nodes[self.idx]
    }

    fn sibling_matching(&self, mut idx: Option<usize>, tag: Option<&str>, forward: bool) -> Option<Self> {
        loop {
            let candidate = idx?;
            let data = &self.arena.nodes[candidate];
            if tag.is_none_or(|t| data.tag == t) {
                return Some(Self { arena: self.arena.clone(), idx: candidate });
            }
            idx = if forward { data.next_sibling } else { data.prev_sibling };
        }
    }
}

impl<'a> XmlElement<'a> for QuickXmlElement {
    type Attr = QuickXmlAttribute;

    fn tag_name(&self) -> &str {
        &self.node().tag
    }

    fn text(&self) -> Option<String> {
        self.node().text.clone()
    }

    fn first_child(&self, tag: Option<&str>) -> Option<Self> {
        self.sibling_matching(self.node().first_child, tag, true)
    }

    fn next_sibling(&self, tag: Option<&str>) -> Option<Self> {
        self.sibling_matching(self.node().next_sibling, tag, true)
    }

    fn prev_sibling(&self, tag: Option<&str>) -> Option<Self> {
        self.sibling_matching(self.node().prev_sibling, tag, false)
    }

    fn parent(&self) -> Option<Self> {
        self.node().parent.map(|idx| Self { arena: self.arena.clone(), idx })
    }

    fn first_attribute(&self) -> Option<Self::Attr> {
        if self.node().attrs.is_empty() {
            None
        } else {
            Some(QuickXmlAttribute { arena: self.arena.clone(), node_idx: self.idx, attr_idx: 0 })
        }
    }

    fn attribute(&self, name: &str) -> Option<Self::Attr> {
        self.node()
            .attrs
            .iter()
            .position(|(k, _)| k == name)
            .map(|attr_idx| QuickXmlAttribute { arena: self.arena.clone(), node_idx: self.idx, attr_idx })
    }
}

#[derive(Clone)]
pub struct QuickXmlAttribute {
    arena: Rc<Arena>,
    node_idx: usize,
    attr_idx: usize,
}

impl QuickXmlAttribute {
    fn pair(&self) -> &(String, String) {
        &self.arena.nodes[self.node_idx].attrs[self.attr_idx]
    }
}

impl XmlAttribute for QuickXmlAttribute {
    fn name(&self) -> &str {
        &self.pair().0
    }

    fn value(&self) -> &str {
        &self.pair().1
    }

    fn next_attribute(&self) -> Option<Self> {
        let next_idx = self.attr_idx + 1;
        if next_idx < self.arena.nodes[self.node_idx].attrs.len() {
            Some(Self { arena: self.arena.clone(), node_idx: self.node_idx, attr_idx: next_idx })
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_tree_with_attributes_and_text() {
        let xml = r#"<finale><others><measure cmper="1"><width>100</width></measure></others></finale>"#;
        let doc = QuickXmlDocument::parse(xml).unwrap();
        let root = doc.root().unwrap();
        assert_eq!(root.tag_name(), "finale");
        let others = root.first_child(None).unwrap();
        assert_eq!(others.tag_name(), "others");
        let measure = others.first_child(Some("measure")).unwrap();
        assert_eq!(measure.attribute("cmper").unwrap().value(), "1");
        let width = measure.first_child(Some("width")).unwrap();
        assert_eq!(width.text().as_deref(), Some("100"));
    }

    #[test]
    fn sibling_navigation_skips_non_matching_tags() {
        let xml = r#"<root><a/><b/><a/></root>"#;
        let doc = QuickXmlDocument::parse(xml).unwrap();
        let root = doc.root().unwrap();
        let first_a = root.first_child(Some("a")).unwrap();
        let second_a = first_a.next_sibling(Some("a")).unwrap();
        assert_eq!(second_a.prev_sibling(Some("a")).unwrap().idx, first_a.idx);
        assert!(second_a.next_sibling(Some("a")).is_none());
    }

    #[test]
    fn malformed_xml_is_an_error() {
        let xml = r#"<finale><unterminated>"#;
        // quick-xml treats an unterminated tag at EOF as missing a close tag; this should
        // still parse without panicking (an unclosed stack is fine for a read-only facade)
        // but a mismatched closing tag must surface an error.
        let bad = r#"<finale><a></b></finale>"#;
        assert!(QuickXmlDocument::parse(xml).is_ok());
        assert!(QuickXmlDocument::parse(bad).is_err());
    }
}
