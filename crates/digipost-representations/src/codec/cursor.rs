//! # Sequence Cursor
//!
//! Walks the children of an element in schema order. Each representation
//! reads its fields in declaration order and finishes with [`Children::finish`],
//! so misplaced, missing and unexpected elements all fail fast.
//!
//! Children must be in the v7 namespace or unqualified. An element from any
//! other namespace never matches a schema field; only [`Children::next_open`]
//! takes it, for `xs:any` content.

use super::tree::XmlElement;
use super::values::XmlValue;
use super::{XmlCodec, NAMESPACE};
use crate::domain::errors::RepresentationError;

pub struct Children<'a> {
    parent: &'a XmlElement,
    position: usize,
}

impl<'a> Children<'a> {
    pub fn new(parent: &'a XmlElement) -> Self {
        Self {
            parent,
            position: 0,
        }
    }

    pub fn peek(&self) -> Option<&'a XmlElement> {
        self.parent.children.get(self.position)
    }

    /// Take the next schema child whatever its name. Used for choices.
    pub fn next_any(&mut self) -> Option<&'a XmlElement> {
        let next = self.peek().filter(|child| in_schema(child))?;
        self.position += 1;
        Some(next)
    }

    /// Take the next child whatever its name and namespace.
    pub fn next_open(&mut self) -> Option<&'a XmlElement> {
        let next = self.peek()?;
        self.position += 1;
        Some(next)
    }

    pub fn optional(&mut self, name: &str) -> Option<&'a XmlElement> {
        match self.peek() {
            Some(child) if child.name == name && in_schema(child) => {
                self.position += 1;
                Some(child)
            }
            _ => None,
        }
    }

    pub fn required(&mut self, name: &str) -> Result<&'a XmlElement, RepresentationError> {
        self.optional(name).ok_or_else(|| {
            let reason = match self.peek() {
                Some(found) => format!("expected <{name}>, found <{}>", describe(found)),
                None => format!("missing required <{name}>"),
            };
            RepresentationError::schema(&self.parent.name, name, reason)
        })
    }

    pub fn repeated(&mut self, name: &str) -> Vec<&'a XmlElement> {
        let mut found = Vec::new();
        while let Some(child) = self.optional(name) {
            found.push(child);
        }
        found
    }

    pub fn leaf<V: XmlValue>(&mut self, name: &str) -> Result<V, RepresentationError> {
        self.required(name)?.value()
    }

    pub fn opt_leaf<V: XmlValue>(&mut self, name: &str) -> Result<Option<V>, RepresentationError> {
        self.optional(name).map(XmlElement::value::<V>).transpose()
    }

    pub fn leaves<V: XmlValue>(&mut self, name: &str) -> Result<Vec<V>, RepresentationError> {
        self.repeated(name).into_iter().map(XmlElement::value::<V>).collect()
    }

    pub fn record<T: XmlCodec>(&mut self, name: &str) -> Result<T, RepresentationError> {
        T::from_xml(self.required(name)?)
    }

    pub fn opt_record<T: XmlCodec>(&mut self, name: &str) -> Result<Option<T>, RepresentationError> {
        self.optional(name).map(T::from_xml).transpose()
    }

    pub fn records<T: XmlCodec>(&mut self, name: &str) -> Result<Vec<T>, RepresentationError> {
        self.repeated(name).into_iter().map(T::from_xml).collect()
    }

    /// Fail if any child was not consumed.
    pub fn finish(self) -> Result<(), RepresentationError> {
        match self.peek() {
            None => Ok(()),
            Some(extra) => Err(RepresentationError::schema(
                &self.parent.name,
                &extra.name,
                format!("unexpected element <{}>", describe(extra)),
            )),
        }
    }
}

fn in_schema(element: &XmlElement) -> bool {
    element
        .namespace
        .as_deref()
        .map_or(true, |namespace| namespace == NAMESPACE)
}

fn describe(element: &XmlElement) -> String {
    match element.namespace.as_deref() {
        Some(namespace) if namespace != NAMESPACE => format!("{} xmlns=\"{namespace}\"", element.name),
        _ => element.name.clone(),
    }
}
