//! # XML Element Tree
//!
//! A small owned tree between quick-xml's event stream and the typed
//! representations. Element names are local names; the resolved namespace is
//! kept so the root can be checked. Attributes bound to the XML Schema
//! instance namespace are normalised to the `xsi:` prefix, all other prefixes
//! are dropped.

use super::values::XmlValue;
use super::{XmlCodec, NAMESPACE, XSI_NAMESPACE};
use crate::domain::errors::RepresentationError;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::reader::Reader;
use quick_xml::writer::Writer;

const XSI_PREFIX: &str = "xsi:";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    /// Namespace the element name resolved to when parsed.
    pub namespace: Option<String>,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlElement>,
    /// Character content; only kept for elements without children.
    pub text: Option<String>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    // -------------------------------------------------------------------------
    // Building
    // -------------------------------------------------------------------------

    pub fn attr<V: XmlValue>(mut self, key: &str, value: &V) -> Self {
        self.attributes.push((key.to_string(), value.to_xml_value()));
        self
    }

    pub fn opt_attr<V: XmlValue>(self, key: &str, value: Option<&V>) -> Self {
        match value {
            Some(value) => self.attr(key, value),
            None => self,
        }
    }

    pub fn text<V: XmlValue>(mut self, value: &V) -> Self {
        self.text = Some(value.to_xml_value());
        self
    }

    pub fn child(mut self, child: XmlElement) -> Self {
        self.children.push(child);
        self
    }

    pub fn opt_child(self, child: Option<XmlElement>) -> Self {
        match child {
            Some(child) => self.child(child),
            None => self,
        }
    }

    /// Child element holding a single value as text.
    pub fn leaf<V: XmlValue>(self, name: &str, value: &V) -> Self {
        self.child(XmlElement::new(name).text(value))
    }

    pub fn opt_leaf<V: XmlValue>(self, name: &str, value: Option<&V>) -> Self {
        match value {
            Some(value) => self.leaf(name, value),
            None => self,
        }
    }

    pub fn leaves<V: XmlValue>(mut self, name: &str, values: &[V]) -> Self {
        for value in values {
            self = self.leaf(name, value);
        }
        self
    }

    pub fn record<T: XmlCodec>(self, name: &str, value: &T) -> Self {
        self.child(value.to_xml(name))
    }

    pub fn opt_record<T: XmlCodec>(self, name: &str, value: Option<&T>) -> Self {
        match value {
            Some(value) => self.record(name, value),
            None => self,
        }
    }

    pub fn records<T: XmlCodec>(mut self, name: &str, values: &[T]) -> Self {
        for value in values {
            self = self.record(name, value);
        }
        self
    }

    // -------------------------------------------------------------------------
    // Reading
    // -------------------------------------------------------------------------

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn required_attr<V: XmlValue>(&self, key: &str) -> Result<V, RepresentationError> {
        let raw = self.attribute(key).ok_or_else(|| {
            RepresentationError::schema(&self.name, key, "missing required attribute")
        })?;
        V::from_xml_value(raw, &self.name, key)
    }

    pub fn optional_attr<V: XmlValue>(&self, key: &str) -> Result<Option<V>, RepresentationError> {
        self.attribute(key)
            .map(|raw| V::from_xml_value(raw, &self.name, key))
            .transpose()
    }

    /// Text content, empty for an empty element.
    pub fn text_content(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    pub fn value<V: XmlValue>(&self) -> Result<V, RepresentationError> {
        V::from_xml_value(self.text_content(), &self.name, "text()")
    }

    /// Fail unless this element is named `name`.
    pub fn expect_name(&self, name: &str) -> Result<(), RepresentationError> {
        if self.name == name {
            Ok(())
        } else {
            Err(RepresentationError::schema(
                &self.name,
                "name",
                format!("expected <{name}>"),
            ))
        }
    }

    fn uses_xsi(&self) -> bool {
        self.attributes.iter().any(|(k, _)| k.starts_with(XSI_PREFIX))
            || self.children.iter().any(XmlElement::uses_xsi)
    }
}

// =============================================================================
// PARSING
// =============================================================================

struct OpenElement {
    element: XmlElement,
    text: String,
    declared: Vec<(String, String)>,
}

/// Parse a complete document into its root element.
pub fn parse(input: &[u8]) -> Result<XmlElement, RepresentationError> {
    let mut reader = Reader::from_reader(input);
    let mut stack: Vec<OpenElement> = Vec::new();
    let mut root = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf).map_err(RepresentationError::xml)? {
            Event::Start(start) => {
                let open = open_element(&start, &stack)?;
                stack.push(open);
            }
            Event::Empty(start) => {
                let open = open_element(&start, &stack)?;
                close_element(open, &mut stack, &mut root)?;
            }
            Event::End(_) => {
                let open = stack
                    .pop()
                    .ok_or_else(|| RepresentationError::Xml("unbalanced end tag".into()))?;
                close_element(open, &mut stack, &mut root)?;
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(RepresentationError::xml)?;
                match stack.last_mut() {
                    Some(open) => open.text.push_str(&text),
                    None if text.trim().is_empty() => {}
                    None => {
                        return Err(RepresentationError::Xml(
                            "character data outside the root element".into(),
                        ))
                    }
                }
            }
            Event::CData(data) => {
                let data = std::str::from_utf8(&data).map_err(RepresentationError::xml)?;
                if let Some(open) = stack.last_mut() {
                    open.text.push_str(data);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(RepresentationError::Xml("unexpected end of document".into()));
    }
    root.ok_or_else(|| RepresentationError::Xml("document has no root element".into()))
}

fn open_element(
    start: &BytesStart<'_>,
    stack: &[OpenElement],
) -> Result<OpenElement, RepresentationError> {
    let qname = utf8(start.name().into_inner())?;
    let (prefix, local) = split_qname(qname);

    let mut declared = Vec::new();
    let mut raw_attributes = Vec::new();
    for attribute in start.attributes() {
        let attribute = attribute.map_err(RepresentationError::xml)?;
        let key = utf8(attribute.key.as_ref())?.to_string();
        let value = attribute
            .unescape_value()
            .map_err(RepresentationError::xml)?
            .into_owned();
        if key == "xmlns" {
            declared.push((String::new(), value));
        } else if let Some(declared_prefix) = key.strip_prefix("xmlns:") {
            declared.push((declared_prefix.to_string(), value));
        } else {
            raw_attributes.push((key, value));
        }
    }

    let namespace = resolve(prefix.unwrap_or(""), &declared, stack);
    let attributes = raw_attributes
        .into_iter()
        .map(|(key, value)| match split_qname(&key) {
            (Some(p), local)
                if resolve(p, &declared, stack).as_deref() == Some(XSI_NAMESPACE) =>
            {
                (format!("{XSI_PREFIX}{local}"), value)
            }
            (_, local) => (local.to_string(), value),
        })
        .collect();

    Ok(OpenElement {
        element: XmlElement {
            name: local.to_string(),
            namespace,
            attributes,
            children: Vec::new(),
            text: None,
        },
        text: String::new(),
        declared,
    })
}

fn close_element(
    open: OpenElement,
    stack: &mut [OpenElement],
    root: &mut Option<XmlElement>,
) -> Result<(), RepresentationError> {
    let OpenElement {
        mut element, text, ..
    } = open;
    if element.children.is_empty() && !text.is_empty() {
        element.text = Some(text);
    }
    match stack.last_mut() {
        Some(parent) => parent.element.children.push(element),
        None if root.is_some() => {
            return Err(RepresentationError::Xml("more than one root element".into()))
        }
        None => *root = Some(element),
    }
    Ok(())
}

fn resolve(prefix: &str, declared: &[(String, String)], stack: &[OpenElement]) -> Option<String> {
    std::iter::once(declared)
        .chain(stack.iter().rev().map(|open| open.declared.as_slice()))
        .flat_map(|scope| scope.iter())
        .find(|(p, _)| p == prefix)
        .map(|(_, uri)| uri.clone())
}

fn split_qname(qname: &str) -> (Option<&str>, &str) {
    match qname.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, qname),
    }
}

fn utf8(bytes: &[u8]) -> Result<&str, RepresentationError> {
    std::str::from_utf8(bytes).map_err(RepresentationError::xml)
}

// =============================================================================
// WRITING
// =============================================================================

/// Write `root` as a standalone UTF-8 document in the Digipost namespace.
pub fn write(root: &XmlElement) -> Result<Vec<u8>, RepresentationError> {
    let mut writer = Writer::new(Vec::new());
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
        .map_err(RepresentationError::xml)?;
    write_element(&mut writer, root, true)?;
    Ok(writer.into_inner())
}

fn write_element(
    writer: &mut Writer<Vec<u8>>,
    element: &XmlElement,
    is_root: bool,
) -> Result<(), RepresentationError> {
    let mut start = BytesStart::new(element.name.as_str());
    if is_root {
        start.push_attribute(("xmlns", NAMESPACE));
        if element.uses_xsi() {
            start.push_attribute(("xmlns:xsi", XSI_NAMESPACE));
        }
    }
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() && element.text.is_none() {
        return writer
            .write_event(Event::Empty(start))
            .map_err(RepresentationError::xml);
    }

    writer
        .write_event(Event::Start(start))
        .map_err(RepresentationError::xml)?;
    if let Some(text) = &element.text {
        writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(RepresentationError::xml)?;
    }
    for child in &element.children {
        write_element(writer, child, false)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .map_err(RepresentationError::xml)
}
