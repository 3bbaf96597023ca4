//! Owned XML tree built with quick-xml, plus the lookup helpers the entity
//! descriptors rely on.
//!
//! The management service answers `info` calls with one XML document per
//! entity (or batch of entities). The documents are small, so the whole body
//! is materialized into an [`Element`] tree once and queried by tag name
//! afterwards. String values routinely arrive wrapped in CDATA sections.

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::OcaError;

/// One XML element: tag name, accumulated text content, ordered children.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    /// Tag name as it appears on the wire (e.g. `HOST`, `VMS`, `ID`).
    pub name: String,
    /// Concatenated text and CDATA content, trimmed.
    pub text: String,
    /// Child elements in document order.
    pub children: Vec<Element>,
}

impl Element {
    /// First direct child with the given tag name.
    pub fn child(&self, tag: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == tag)
    }

    /// All direct children with the given tag name, in document order.
    pub fn children_named<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == tag)
    }

    /// Text content of the first direct child with the given tag name.
    pub fn text_of(&self, tag: &str) -> Option<&str> {
        self.child(tag).map(|c| c.text.as_str())
    }

    /// Text content of a mandatory child tag.
    pub fn require_text(&self, tag: &str) -> Result<&str, OcaError> {
        self.text_of(tag)
            .ok_or_else(|| OcaError::Parse(format!("missing <{tag}> in <{}>", self.name)))
    }

    /// Integer content of a mandatory child tag.
    pub fn require_int(&self, tag: &str) -> Result<i64, OcaError> {
        parse_int(tag, self.require_text(tag)?)
    }

    /// Integer content of an optional child tag. An absent tag yields `None`;
    /// a present tag with non-numeric content is still a parse error.
    pub fn opt_int(&self, tag: &str) -> Result<Option<i64>, OcaError> {
        match self.text_of(tag) {
            Some(text) => parse_int(tag, text).map(Some),
            None => Ok(None),
        }
    }
}

pub(crate) fn parse_int(tag: &str, text: &str) -> Result<i64, OcaError> {
    text.trim()
        .parse::<i64>()
        .map_err(|_| OcaError::Parse(format!("<{tag}> is not an integer: '{text}'")))
}

/// Parse one XML document into its root [`Element`].
pub fn parse(xml: &str) -> Result<Element, OcaError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                stack.push(Element {
                    name: String::from_utf8_lossy(e.name().as_ref()).to_string(),
                    ..Element::default()
                });
            }
            Ok(Event::Empty(e)) => {
                let element = Element {
                    name: String::from_utf8_lossy(e.name().as_ref()).to_string(),
                    ..Element::default()
                };
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::Text(t)) => {
                let text = t
                    .unescape()
                    .map_err(|err| OcaError::Parse(format!("xml: {err}")))?;
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(text.trim());
                }
            }
            Ok(Event::CData(t)) => {
                let bytes = t.into_inner();
                let text = String::from_utf8_lossy(&bytes);
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(text.trim());
                }
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| OcaError::Parse("unbalanced closing tag".into()))?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::Eof) => break,
            Err(err) => return Err(OcaError::Parse(format!("xml: {err}"))),
            _ => {}
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(OcaError::Parse("unclosed element at end of document".into()));
    }
    root.ok_or_else(|| OcaError::Parse("empty document".into()))
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), OcaError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        Ok(())
    } else if root.is_none() {
        *root = Some(element);
        Ok(())
    } else {
        Err(OcaError::Parse("multiple root elements".into()))
    }
}
