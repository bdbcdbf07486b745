//! Navigation primitives over the read-only element tree.
//!
//! Only element nodes take part in navigation; text and comment nodes are
//! skipped everywhere. Attribute reads never fail: an absent attribute reads
//! as the empty string. Numeric parsers are total and map empty or malformed
//! text to zero; the `try_` variants are reserved for the few call sites that
//! need to tell "absent" from "malformed".

use std::num::ParseIntError;

use roxmltree::Node;

/// Direct element children of `node`, in document order.
pub fn child_elements<'a, 'input: 'a>(
    node: Node<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|child| child.is_element())
}

/// First direct child element whose tag equals `name`.
pub fn first_child_named<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|child| child.is_element() && child.tag_name().name() == name)
}

/// First node whose attribute `attr_name` equals `attr_value` exactly.
pub fn first_with_attribute<'a, 'input, I>(
    nodes: I,
    attr_name: &str,
    attr_value: &str,
) -> Option<Node<'a, 'input>>
where
    I: IntoIterator<Item = Node<'a, 'input>>,
{
    nodes
        .into_iter()
        .find(|node| node.attribute(attr_name) == Some(attr_value))
}

/// Attribute text, or the empty string when the attribute is absent.
pub fn attribute<'a>(node: Node<'a, '_>, name: &str) -> &'a str {
    node.attribute(name).unwrap_or("")
}

/// Elements named `name`, searched one branch at a time.
///
/// If `root` has direct children with that tag, those children are the
/// result. Otherwise the children of `root` are searched recursively in
/// document order and the first subtree yielding a match wins; later
/// siblings are not visited even if they would match too. Returns `None`
/// when no branch matches, never `Some` of an empty list.
pub fn descendants_named<'a, 'input>(
    root: Node<'a, 'input>,
    name: &str,
) -> Option<Vec<Node<'a, 'input>>> {
    let direct: Vec<_> = child_elements(root)
        .filter(|child| child.tag_name().name() == name)
        .collect();
    if !direct.is_empty() {
        return Some(direct);
    }

    child_elements(root).find_map(|child| descendants_named(child, name))
}

/// First element of [`descendants_named`].
pub fn first_descendant_named<'a, 'input>(
    root: Node<'a, 'input>,
    name: &str,
) -> Option<Node<'a, 'input>> {
    descendants_named(root, name).and_then(|nodes| nodes.into_iter().next())
}

/// Concatenated text of all descendant text nodes.
pub fn text_content(node: Node<'_, '_>) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}

/// `"1"` (after trimming) is true, everything else false.
pub fn parse_flag(text: &str) -> bool {
    text.trim() == "1"
}

/// Parses a decimal `i32`; empty or malformed text yields 0.
pub fn parse_int(text: &str) -> i32 {
    try_parse_int(text)
        .unwrap_or_else(|err| {
            log::debug!("treating malformed integer '{}' as 0: {}", text, err);
            None
        })
        .unwrap_or(0)
}

/// Parses a decimal `i64`; empty or malformed text yields 0.
pub fn parse_long(text: &str) -> i64 {
    try_parse_long(text)
        .unwrap_or_else(|err| {
            log::debug!("treating malformed integer '{}' as 0: {}", text, err);
            None
        })
        .unwrap_or(0)
}

/// Parses a non-negative count; empty, malformed or negative text yields 0.
pub fn parse_count(text: &str) -> u64 {
    u64::try_from(parse_long(text)).unwrap_or(0)
}

/// Parses a decimal `f64`; empty or malformed text yields 0.0.
///
/// A decimal comma is accepted in place of the decimal point.
pub fn parse_double(text: &str) -> f64 {
    try_parse_double(text).unwrap_or(0.0)
}

/// Parses a decimal `i32`, `Ok(None)` for empty or whitespace-only text.
pub fn try_parse_int(text: &str) -> Result<Option<i32>, ParseIntError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed.parse::<i32>().map(Some)
}

/// Parses a decimal `i64`, `Ok(None)` for empty or whitespace-only text.
pub fn try_parse_long(text: &str) -> Result<Option<i64>, ParseIntError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed.parse::<i64>().map(Some)
}

/// Parses a decimal `f64`, `None` for empty or malformed text.
pub fn try_parse_double(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.replace(',', ".").parse::<f64>().ok()
}

/// Parses hexadecimal text as `i64`; empty text yields 0.
pub fn parse_hex(text: &str) -> Result<i64, ParseIntError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    i64::from_str_radix(trimmed, 16)
}
