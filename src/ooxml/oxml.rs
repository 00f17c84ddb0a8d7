//! Owned XML element tree for the parts this crate edits.
//!
//! Slide, layout, master and presentation parts are parsed into an `Element`
//! tree once at load time, queried and edited in place, and serialized back
//! when the package is saved. Lookups match on local name, so `p:spTree` is
//! found as `spTree` regardless of the prefix a producer chose.

use crate::common::xml::{escape_xml, resolve_entity};
use crate::ooxml::error::{OoxmlError, Result};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// XML declaration written ahead of every serialized part.
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// A child of an element.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An element with its qualified name, attributes in document order and
/// children.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    name: String,
    attrs: Vec<(String, String)>,
    children: Vec<Node>,
}

/// Local part of a qualified name: `spTree` for `p:spTree`.
#[inline]
pub fn local_name(qname: &str) -> &str {
    qname.rsplit_once(':').map_or(qname, |(_, local)| local)
}

impl Element {
    /// Create an empty element with qualified name `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder form of [`Element::set_attr`].
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Builder form of [`Element::push`].
    pub fn with_child(mut self, child: Element) -> Self {
        self.push(child);
        self
    }

    /// Parse a document and return its root element.
    ///
    /// Comments, processing instructions and the XML declaration are
    /// dropped. Whitespace-only text is dropped when it sits between
    /// elements and kept when it is an element's entire content.
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        let mut buf = Vec::new();
        let mut stack: Vec<Element> = Vec::new();
        let mut pending = String::new();
        let mut root = None;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    Self::flush_text(&mut stack, &mut pending, false);
                    stack.push(Self::from_start(&e)?);
                },
                Event::Empty(e) => {
                    Self::flush_text(&mut stack, &mut pending, false);
                    let element = Self::from_start(&e)?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(Node::Element(element)),
                        None => root = Some(element),
                    }
                },
                Event::End(_) => {
                    Self::flush_text(&mut stack, &mut pending, true);
                    let element = stack
                        .pop()
                        .ok_or_else(|| OoxmlError::Xml("unbalanced end tag".to_string()))?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(Node::Element(element)),
                        None => root = Some(element),
                    }
                },
                Event::Text(e) => {
                    let text =
                        std::str::from_utf8(&e).map_err(|e| OoxmlError::Xml(e.to_string()))?;
                    pending.push_str(text);
                },
                Event::CData(e) => {
                    let text =
                        std::str::from_utf8(&e).map_err(|e| OoxmlError::Xml(e.to_string()))?;
                    pending.push_str(text);
                },
                Event::GeneralRef(e) => {
                    let name =
                        std::str::from_utf8(&e).map_err(|e| OoxmlError::Xml(e.to_string()))?;
                    match resolve_entity(name) {
                        Some(ch) => pending.push(ch),
                        None => {
                            return Err(OoxmlError::Xml(format!("unknown entity '&{};'", name)));
                        },
                    }
                },
                Event::Eof => break,
                _ => {},
            }
            buf.clear();
        }

        if !stack.is_empty() {
            return Err(OoxmlError::Xml(format!(
                "unexpected end of document inside <{}>",
                stack[stack.len() - 1].name
            )));
        }
        root.ok_or_else(|| OoxmlError::Xml("document has no root element".to_string()))
    }

    fn from_start(e: &BytesStart<'_>) -> Result<Self> {
        let name = std::str::from_utf8(e.name().as_ref())
            .map_err(|e| OoxmlError::Xml(e.to_string()))?
            .to_string();
        let mut element = Self::new(name);
        for attr in e.attributes() {
            let attr = attr?;
            let key = std::str::from_utf8(attr.key.as_ref())
                .map_err(|e| OoxmlError::Xml(e.to_string()))?
                .to_string();
            let value = attr.unescape_value()?.into_owned();
            element.attrs.push((key, value));
        }
        Ok(element)
    }

    fn flush_text(stack: &mut [Element], pending: &mut String, closing: bool) {
        if pending.is_empty() {
            return;
        }
        let text = std::mem::take(pending);
        if let Some(parent) = stack.last_mut() {
            let whitespace = text.trim().is_empty();
            let mixed = !closing || parent.child_elements().next().is_some();
            if !(whitespace && mixed) {
                parent.children.push(Node::Text(text));
            }
        }
    }

    /// Qualified name, e.g. `p:sp`.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Local name, e.g. `sp` for `p:sp`.
    #[inline]
    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    /// Value of the attribute with qualified name `name`.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute, replacing an existing value in place.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name, value)),
        }
    }

    /// Attributes in document order.
    pub fn attrs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[inline]
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Child elements in document order.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// Mutable child elements in document order.
    pub fn child_elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|node| match node {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// First child element with local name `local`.
    pub fn find(&self, local: &str) -> Option<&Element> {
        self.child_elements().find(|e| e.local_name() == local)
    }

    /// Mutable first child element with local name `local`.
    pub fn find_mut(&mut self, local: &str) -> Option<&mut Element> {
        self.child_elements_mut().find(|e| e.local_name() == local)
    }

    /// All child elements with local name `local`.
    pub fn find_all<'a>(&'a self, local: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.child_elements().filter(move |e| e.local_name() == local)
    }

    /// Follow a path of local names, e.g. `["cSld", "spTree"]`.
    pub fn find_path(&self, path: &[&str]) -> Option<&Element> {
        path.iter().try_fold(self, |element, local| element.find(local))
    }

    /// Mutable form of [`Element::find_path`].
    pub fn find_path_mut(&mut self, path: &[&str]) -> Option<&mut Element> {
        let mut element = self;
        for local in path {
            element = element.find_mut(local)?;
        }
        Some(element)
    }

    /// Index into `children()` of the first child element with local name
    /// `local`.
    pub fn position(&self, local: &str) -> Option<usize> {
        self.children.iter().position(|node| match node {
            Node::Element(e) => e.local_name() == local,
            Node::Text(_) => false,
        })
    }

    /// Append a child element.
    pub fn push(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    /// Insert a child element at `index` into `children()`.
    pub fn insert(&mut self, index: usize, child: Element) {
        self.children.insert(index, Node::Element(child));
    }

    /// Remove every child element with local name `local`.
    pub fn remove_all(&mut self, local: &str) {
        self.children.retain(|node| match node {
            Node::Element(e) => e.local_name() != local,
            Node::Text(_) => true,
        });
    }

    /// Move out every child element matching `pred`, keeping the rest.
    pub fn drain_elements<F>(&mut self, mut pred: F) -> Vec<Element>
    where
        F: FnMut(&Element) -> bool,
    {
        let mut taken = Vec::new();
        let mut kept = Vec::with_capacity(self.children.len());
        for node in self.children.drain(..) {
            match node {
                Node::Element(e) if pred(&e) => taken.push(e),
                other => kept.push(other),
            }
        }
        self.children = kept;
        taken
    }

    /// Concatenated text of this element and its descendants.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                Node::Text(t) => out.push_str(t),
                Node::Element(e) => e.collect_text(out),
            }
        }
    }

    /// Serialize this element (without an XML declaration).
    pub fn to_xml(&self) -> String {
        let mut out = String::with_capacity(1024);
        self.write_to(&mut out);
        out
    }

    /// Serialize as a standalone document, declaration first.
    pub fn to_xml_document(&self) -> String {
        let mut out = String::with_capacity(2048);
        out.push_str(XML_DECLARATION);
        out.push('\n');
        self.write_to(&mut out);
        out
    }

    fn write_to(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (key, value) in &self.attrs {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(&escape_xml(value));
            out.push('"');
        }
        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for node in &self.children {
            match node {
                Node::Text(t) => out.push_str(&escape_xml(t)),
                Node::Element(e) => e.write_to(out),
            }
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLIDE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
  <!-- comment -->
  <p:cSld name="Agenda">
    <p:spTree>
      <p:sp><p:txBody><a:p><a:r><a:t>Q&amp;A &lt;live&gt;</a:t></a:r></a:p></p:txBody></p:sp>
      <p:sp><p:txBody><a:p><a:r><a:t> </a:t></a:r></a:p></p:txBody></p:sp>
    </p:spTree>
  </p:cSld>
</p:sld>"#;

    #[test]
    fn test_parse_and_query() {
        let root = Element::parse(SLIDE.as_bytes()).unwrap();
        assert_eq!(root.name(), "p:sld");
        assert_eq!(root.local_name(), "sld");
        assert_eq!(root.find("cSld").unwrap().attr("name"), Some("Agenda"));

        let sp_tree = root.find_path(&["cSld", "spTree"]).unwrap();
        let shapes: Vec<&Element> = sp_tree.find_all("sp").collect();
        assert_eq!(shapes.len(), 2);
        assert_eq!(shapes[0].text(), "Q&A <live>");
        assert_eq!(shapes[1].text(), " ");
    }

    #[test]
    fn test_serialize_round_trip() {
        let root = Element::parse(SLIDE.as_bytes()).unwrap();
        let xml = root.to_xml_document();
        assert!(xml.starts_with(XML_DECLARATION));
        assert!(xml.contains("Q&amp;A &lt;live&gt;"));
        assert!(!xml.contains("comment"));

        let again = Element::parse(xml.as_bytes()).unwrap();
        assert_eq!(again, root);
    }

    #[test]
    fn test_edit_attributes_and_children() {
        let mut el = Element::new("p:cNvPr").with_attr("id", "1").with_attr("name", "");
        el.set_attr("id", "5");
        assert_eq!(el.attr("id"), Some("5"));
        assert_eq!(el.attrs().count(), 2);
        assert_eq!(el.to_xml(), r#"<p:cNvPr id="5" name=""/>"#);

        let mut tree = Element::new("p:spTree")
            .with_child(Element::new("p:nvGrpSpPr"))
            .with_child(Element::new("p:sp"))
            .with_child(Element::new("p:pic"));
        let taken = tree.drain_elements(|e| e.local_name() != "nvGrpSpPr");
        assert_eq!(taken.len(), 2);
        assert_eq!(tree.child_elements().count(), 1);
        assert_eq!(tree.position("nvGrpSpPr"), Some(0));
    }

    #[test]
    fn test_malformed_documents() {
        assert!(Element::parse(b"").is_err());
        assert!(Element::parse(b"<a><b></a>").is_err());
        assert!(Element::parse(b"<a>&bogus;</a>").is_err());
    }
}
