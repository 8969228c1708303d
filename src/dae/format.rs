//! Document Formatter: tab indentation injected as text nodes.
//!
//! Every element with element children gets a newline plus `depth + 1`
//! tabs before each child and a newline plus `depth` tabs after the last
//! one. Whitespace-only text already present between children is dropped
//! first, so formatting a formatted tree changes nothing.

use xmltree::{Element, XMLNode};

fn indent(depth: usize) -> String {
    let mut s = String::with_capacity(depth + 1);
    s.push('\n');
    s.extend(std::iter::repeat('\t').take(depth));
    s
}

fn is_whitespace_text(node: &XMLNode) -> bool {
    matches!(node, XMLNode::Text(t) if t.chars().all(char::is_whitespace))
}

/// Pretty-print `root` in place. Iterative pre-order, no recursion.
pub fn format_document(root: &mut Element) {
    let mut stack: Vec<(&mut Element, usize)> = vec![(root, 0)];

    while let Some((element, depth)) = stack.pop() {
        if !element.children.iter().any(|n| matches!(n, XMLNode::Element(_))) {
            continue;
        }

        let old = std::mem::take(&mut element.children);
        let mut children = Vec::with_capacity(old.len() * 2 + 1);
        for node in old.into_iter().filter(|n| !is_whitespace_text(n)) {
            children.push(XMLNode::Text(indent(depth + 1)));
            children.push(node);
        }
        children.push(XMLNode::Text(indent(depth)));
        element.children = children;

        for node in element.children.iter_mut().rev() {
            if let XMLNode::Element(child) = node {
                stack.push((child, depth + 1));
            }
        }
    }
}
