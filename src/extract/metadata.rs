//! User comments and the flattened original-metadata table.

use std::collections::BTreeMap;

use roxmltree::Node;

use super::nav::{attribute, child_elements, descendants_named, text_content};

/// Elements that never contribute a key segment.
const TRANSPARENT_ELEMENTS: [&str; 3] = ["Element", "Attachment", "LMSDataContainerHeader"];

/// Raw tick words are decoded into timestamps instead.
const TICK_WORDS: [&str; 2] = ["HighInteger", "LowInteger"];

/// Text of every `User-Comment` element, found with the single-branch search.
pub fn extract_user_comments(image: Node<'_, '_>) -> Vec<String> {
    descendants_named(image, "User-Comment")
        .unwrap_or_default()
        .into_iter()
        .map(text_content)
        .collect()
}

/// Flattens every attributed element below (and including) `root`.
///
/// Keys are the names of the attributed ancestors joined with `|`, followed
/// by the attribute name. Elements carrying an `Identifier` (or
/// `Description`) together with a `Variant` produce numbered list entries
/// `key #n` instead of one entry per attribute.
pub fn flatten_original_metadata(root: Node<'_, '_>) -> BTreeMap<String, String> {
    let mut flattener = Flattener::default();
    flattener.visit(root);
    flattener.entries
}

#[derive(Default)]
struct Flattener {
    path: Vec<String>,
    entries: BTreeMap<String, String>,
    list_lengths: BTreeMap<String, usize>,
}

impl Flattener {
    fn visit(&mut self, node: Node<'_, '_>) {
        let name = node.tag_name().name();
        let keyed = node.attributes().next().is_some() && !TRANSPARENT_ELEMENTS.contains(&name);

        if keyed {
            self.path.push(name.to_string());
            self.record(node);
        }

        for child in child_elements(node) {
            self.visit(child);
        }

        if keyed {
            self.path.pop();
        }
    }

    fn record(&mut self, node: Node<'_, '_>) {
        let prefix: String = self.path.iter().map(|segment| format!("{segment}|")).collect();

        let mut suffix = attribute(node, "Identifier");
        if suffix.trim().is_empty() {
            suffix = attribute(node, "Description");
        }
        let variant = attribute(node, "Variant");

        if !suffix.is_empty() && !variant.is_empty() && !TICK_WORDS.contains(&suffix) {
            let base = format!("{prefix}{suffix}");
            let length = self.list_lengths.entry(base.clone()).or_insert(0);
            *length += 1;
            self.entries.insert(format!("{base} #{length}"), variant.to_string());
            return;
        }

        for attr in node.attributes() {
            if TICK_WORDS.contains(&attr.name()) {
                continue;
            }
            self.entries
                .insert(format!("{prefix}{}", attr.name()), attr.value().to_string());
        }
    }
}
