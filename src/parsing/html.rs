use scraper::{Html, Node};

/// Elements whose text never belongs to the readable document. `ix:header`
/// holds the hidden XBRL facts of an inline XBRL filing.
const SKIPPED_ELEMENTS: &[&str] = &["head", "script", "style", "ix:header"];

/// Reduces an HTML or inline XBRL document to its visible text, one text node
/// per line.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut parts: Vec<&str> = Vec::new();

    for node in document.tree.root().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        if text.trim().is_empty() {
            continue;
        }
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| SKIPPED_ELEMENTS.contains(&el.name()))
        });
        if !hidden {
            parts.push(text);
        }
    }

    parts.join("\n")
}
