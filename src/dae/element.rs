//! Small helpers over `xmltree::Element` used by every block builder.

use std::collections::HashSet;

use xmltree::{Element, XMLNode};

use crate::util::{Error, Result};

/// Attributes whose `#id` values must resolve inside the document.
const REFERENCE_ATTRIBUTES: [&str; 2] = ["source", "url"];

/// Builder-style additions to `xmltree::Element`.
pub trait ElementExt: Sized {
    /// Set an attribute, returning the element.
    fn with_attr(self, key: &str, value: impl ToString) -> Self;

    /// Replace the text content, returning the element.
    fn with_text(self, text: impl Into<String>) -> Self;

    /// Append a child element, returning the element.
    fn with_child(self, child: Element) -> Self;

    /// Append a child element.
    fn push(&mut self, child: Element);

    /// Attribute value by name.
    fn attr(&self, key: &str) -> Option<&str>;

    /// Direct element children, skipping text nodes.
    fn child_elements(&self) -> Box<dyn Iterator<Item = &Element> + '_>;

    /// This element and all element descendants in document order.
    fn descendants(&self) -> Vec<&Element>;
}

impl ElementExt for Element {
    fn with_attr(mut self, key: &str, value: impl ToString) -> Self {
        self.attributes.insert(key.to_string(), value.to_string());
        self
    }

    fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.retain(|n| !matches!(n, XMLNode::Text(_)));
        let text = text.into();
        if !text.is_empty() {
            self.children.push(XMLNode::Text(text));
        }
        self
    }

    fn with_child(mut self, child: Element) -> Self {
        self.push(child);
        self
    }

    fn push(&mut self, child: Element) {
        self.children.push(XMLNode::Element(child));
    }

    fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    fn child_elements(&self) -> Box<dyn Iterator<Item = &Element> + '_> {
        Box::new(self.children.iter().filter_map(|n| match n {
            XMLNode::Element(e) => Some(e),
            _ => None,
        }))
    }

    fn descendants(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(e) = stack.pop() {
            out.push(e);
            let children: Vec<&Element> = e.child_elements().collect();
            stack.extend(children.into_iter().rev());
        }
        out
    }
}

/// `#id` fragment reference to `id`.
#[inline]
pub fn fragment(id: &str) -> String {
    format!("#{}", id)
}

/// An `<input>` binding a semantic to a source, with optional interleave offset.
pub fn input(semantic: &str, source_id: &str, offset: Option<u32>) -> Element {
    let e = Element::new("input")
        .with_attr("semantic", semantic)
        .with_attr("source", fragment(source_id));
    match offset {
        Some(offset) => e.with_attr("offset", offset),
        None => e,
    }
}

/// A `<matrix>` element with the given sid and already formatted tokens.
pub fn matrix_element(sid: &str, tokens: String) -> Element {
    Element::new("matrix").with_attr("sid", sid).with_text(tokens)
}

/// Collect every `#id` reference that has no matching `id` in the tree.
///
/// Checks `source` and `url` attributes plus `<skeleton>` text.
pub fn dangling_references(root: &Element) -> Vec<String> {
    let all = root.descendants();
    let ids: HashSet<&str> = all.iter().filter_map(|e| e.attr("id")).collect();

    let mut dangling = Vec::new();
    for e in &all {
        let attr_refs = REFERENCE_ATTRIBUTES.iter().filter_map(|k| e.attr(k));
        let text_ref = if e.name == "skeleton" {
            e.children.iter().find_map(|n| match n {
                XMLNode::Text(t) => Some(t.trim()),
                _ => None,
            })
        } else {
            None
        };
        for r in attr_refs.chain(text_ref) {
            if let Some(id) = r.strip_prefix('#') {
                if !ids.contains(id) {
                    dangling.push(r.to_string());
                }
            }
        }
    }
    dangling
}

/// Fail with the first dangling reference, if any.
pub fn check_references(root: &Element) -> Result<()> {
    match dangling_references(root).into_iter().next() {
        Some(r) => Err(Error::DanglingReference(r)),
        None => Ok(()),
    }
}
