//! Text outline of a dump file with paging

use crate::xml::{Document, NodeId, NodeKind};

/// Lines shown when no limit is given
pub const DEFAULT_LIMIT: usize = 150;

const MAX_VALUE_CHARS: usize = 80;

/// Indented outline of the element tree.
///
/// Leaf elements show their text, `name` attributes are shown inline and
/// multilingual fields are folded to `lang: content` pairs.
pub fn outline(doc: &Document) -> Vec<String> {
    let mut lines = Vec::new();
    outline_node(doc, doc.root(), 0, &mut lines);
    lines
}

fn outline_node(doc: &Document, id: NodeId, depth: usize, lines: &mut Vec<String>) {
    let Some(el) = doc.element(id) else {
        if let Some(NodeKind::Comment(text)) = doc.kind(id) {
            lines.push(format!("{}# {}", "  ".repeat(depth), shorten(text.trim())));
        }
        return;
    };

    let mut line = format!("{}{}", "  ".repeat(depth), el.local_name());
    if let Some(name) = el.attribute("name") {
        line.push_str(&format!(" [{name}]"));
    }

    let items = doc.multilingual_items(id);
    let has_elements = doc.child_elements(id).next().is_some();
    if !items.is_empty() && items.len() == doc.child_elements(id).count() {
        let folded: Vec<String> = items
            .iter()
            .map(|(lang, content)| format!("{lang}: {content}"))
            .collect();
        line.push_str(&format!(" = {}", shorten(&folded.join("; "))));
        lines.push(line);
        return;
    }

    if !has_elements {
        let text = el.trimmed_text();
        if !text.is_empty() {
            line.push_str(&format!(" = {}", shorten(&text)));
        }
    }
    lines.push(line);
    for &child in doc.children(id) {
        outline_node(doc, child, depth + 1, lines);
    }
}

fn shorten(text: &str) -> String {
    let single_line = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if single_line.chars().count() <= MAX_VALUE_CHARS {
        return single_line;
    }
    let cut: String = single_line.chars().take(MAX_VALUE_CHARS).collect();
    format!("{cut}...")
}

/// Apply `limit`/`offset` paging to report lines.
///
/// A `limit` of zero shows everything after `offset`.
pub fn paginate(lines: &[String], limit: usize, offset: usize) -> String {
    let total = lines.len();
    if offset > 0 && offset >= total {
        return format!("[INFO] Offset {offset} exceeds total lines ({total}). Nothing to show.");
    }

    let rest = lines.get(offset..).unwrap_or_default();
    let trailer = (limit > 0 && rest.len() > limit).then(|| {
        format!(
            "[TRUNCATED] Shown {limit} of {total} lines. Use --offset {} to continue.",
            offset + limit
        )
    });
    let mut out: Vec<&str> = rest.iter().map(String::as_str).collect();
    if let Some(trailer) = &trailer {
        out.truncate(limit);
        out.push(trailer);
    }
    out.join("\n")
}
