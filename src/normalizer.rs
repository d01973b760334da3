use log::warn;
use regex::Regex;
use scraper::ego_tree::NodeRef;
use scraper::{Html, Node};

use crate::error::ConfigError;

/// Elements whose content never renders and must not influence the
/// fingerprint.
const EXCLUDED_ELEMENTS: [&str; 6] = ["script", "style", "noscript", "template", "meta", "link"];

/// Reduces a fetched document to canonical text.
///
/// Order matters: volatile markup is dropped first, then visible text is
/// extracted, then volatile substrings are stripped, and finally
/// whitespace is collapsed. Without the stripping steps the detector
/// degenerates into a clock; without the collapse, reflowed-but-unchanged
/// pages would false-positive.
pub struct Normalizer {
    volatile: Vec<Regex>,
}

impl Normalizer {
    /// Build a normalizer from a set of volatile regex patterns.
    pub fn new(patterns: &[String]) -> Result<Self, ConfigError> {
        let volatile = patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern {
                    pattern: pattern.clone(),
                    message: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { volatile })
    }

    /// Reduce raw fetched bytes to canonical text.
    ///
    /// Idempotent and deterministic: running the result through again
    /// yields the same string.
    pub fn normalize(&self, raw: &[u8]) -> String {
        // Malformed input degrades to a lossy text extraction rather than
        // failing the check cycle.
        let text = match std::str::from_utf8(raw) {
            Ok(text) => text.to_string(),
            Err(_) => {
                warn!("document is not valid UTF-8, decoding lossily");
                String::from_utf8_lossy(raw).into_owned()
            }
        };

        let visible = extract_visible_text(&text);

        let mut stripped = visible;
        for pattern in &self.volatile {
            stripped = pattern.replace_all(&stripped, " ").into_owned();
        }

        collapse_whitespace(&stripped)
    }
}

/// Parse as HTML and pull out the text a reader would see, skipping
/// scripts, styles, non-rendering metadata and comments.
fn extract_visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut out = String::new();
    collect_text(document.tree.root(), &mut out);
    out
}

fn collect_text(node: NodeRef<'_, Node>, out: &mut String) {
    match node.value() {
        Node::Element(element) => {
            if EXCLUDED_ELEMENTS.contains(&element.name()) {
                return;
            }
        }
        Node::Text(text) => {
            out.push_str(&text.text);
            out.push(' ');
        }
        Node::Comment(_) | Node::Doctype(_) | Node::ProcessingInstruction(_) => return,
        _ => {}
    }
    for child in node.children() {
        collect_text(child, out);
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
