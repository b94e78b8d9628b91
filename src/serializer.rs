//! Markup serializer for sanitized trees
//!
//! Writes the content of a parsed document back out as markup, skipping the
//! implied document shell (see [`DocumentShell`]) and the doctype:
//!
//! - empty HTML void elements and empty SVG/MathML elements self-close: `<br />`
//! - other elements always get an end tag: `<a></a>`
//! - text is escaped (`&`, `<`, `>`) except inside raw-text elements such as
//!   `<style>`, whose content the browser never decodes
//! - attribute values are double-quoted and escaped (`&`, `"`, `<`, `>`)
//!
//! The walk uses an explicit stack, so tree depth is bounded by memory only.
//!
//! # Examples
//!
//! ```rust
//! use html_sanitizer::parser::parse_html;
//! use html_sanitizer::serializer::serialize_document;
//!
//! let dom = parse_html("<p>one<br>two</p>").unwrap();
//! assert_eq!(serialize_document(&dom), "<p>one<br />two</p>");
//! ```

use markup5ever_rcdom::{Handle, NodeData, RcDom};

use crate::parser::{DocumentShell, HTML_NAMESPACE};

/// HTML elements that never have content
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "basefont", "bgsound", "br", "col", "embed", "frame", "hr", "img", "input",
    "keygen", "link", "meta", "param", "source", "track", "wbr",
];

/// HTML elements whose text content is written verbatim
///
/// `noscript` is included because html5ever parses it as raw text with
/// scripting enabled, which is its default.
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "iframe", "noembed", "noframes", "noscript", "plaintext", "script", "style", "xmp",
];

/// HTML elements whose first newline the parser drops
const NEWLINE_DROPPING_ELEMENTS: &[&str] = &["pre", "textarea", "listing"];

enum Step {
    Enter { node: Handle, raw_text: bool },
    Leave(String),
    /// After `plaintext` the parser reads everything as text, end tags included
    Stop,
}

/// Serialize the caller-visible content of `dom`
pub fn serialize_document(dom: &RcDom) -> String {
    let shell = DocumentShell::locate(dom);
    let mut out = String::new();
    let mut stack = Vec::new();
    push_children(&mut stack, &dom.document, false);

    while let Some(step) = stack.pop() {
        let (node, raw_text) = match step {
            Step::Leave(tag) => {
                out.push_str("</");
                out.push_str(&tag);
                out.push('>');
                continue;
            }
            Step::Enter { node, raw_text } => (node, raw_text),
            Step::Stop => break,
        };

        match node.data {
            NodeData::Document => push_children(&mut stack, &node, false),
            NodeData::Element {
                ref name,
                ref attrs,
                ref template_contents,
                ..
            } => {
                if shell.contains(&node) {
                    push_children(&mut stack, &node, false);
                    continue;
                }

                let tag = name.local.to_string();
                let is_html = &*name.ns == HTML_NAMESPACE;

                out.push('<');
                out.push_str(&tag);
                for attr in attrs.borrow().iter() {
                    out.push(' ');
                    if let Some(prefix) = &attr.name.prefix {
                        out.push_str(prefix);
                        out.push(':');
                    }
                    out.push_str(&attr.name.local);
                    out.push_str("=\"");
                    escape_attribute(&mut out, &attr.value);
                    out.push('"');
                }

                let content = template_contents
                    .borrow()
                    .clone()
                    .unwrap_or_else(|| node.clone());
                let is_empty = content.children.borrow().is_empty();

                if is_empty && (!is_html || VOID_ELEMENTS.contains(&tag.as_str())) {
                    out.push_str(" />");
                    continue;
                }

                out.push('>');
                if is_html
                    && NEWLINE_DROPPING_ELEMENTS.contains(&tag.as_str())
                    && starts_with_newline(&content)
                {
                    out.push('\n');
                }

                let raw_text = is_html && RAW_TEXT_ELEMENTS.contains(&tag.as_str());
                if is_html && tag == "plaintext" {
                    stack.push(Step::Stop);
                } else {
                    stack.push(Step::Leave(tag));
                }
                push_children(&mut stack, &content, raw_text);
            }
            NodeData::Text { ref contents } => {
                let text = contents.borrow();
                if raw_text {
                    out.push_str(&text);
                } else {
                    escape_text(&mut out, &text);
                }
            }
            NodeData::Comment { ref contents } => {
                out.push_str("<!--");
                out.push_str(contents);
                out.push_str("-->");
            }
            NodeData::ProcessingInstruction {
                ref target,
                ref contents,
            } => {
                out.push_str("<?");
                out.push_str(target);
                out.push(' ');
                out.push_str(contents);
                out.push('>');
            }
            NodeData::Doctype { .. } => {}
        }
    }

    out
}

/// Remove a leading `<?...?>` declaration from serialized output
///
/// When `output` (ignoring leading whitespace) starts with `<?` and contains
/// `?>`, everything up to and including the first `?>` is dropped. Any other
/// string, including the empty string, is returned unchanged.
///
/// ```rust
/// use html_sanitizer::serializer::strip_declaration;
///
/// assert_eq!(strip_declaration("<?xml version=\"1.0\"?><p>x</p>"), "<p>x</p>");
/// assert_eq!(strip_declaration("<p>x</p>"), "<p>x</p>");
/// assert_eq!(strip_declaration(""), "");
/// ```
pub fn strip_declaration(output: &str) -> &str {
    if !output.trim_start().starts_with("<?") {
        return output;
    }
    match output.find("?>") {
        Some(at) => &output[at + 2..],
        None => output,
    }
}

fn push_children(stack: &mut Vec<Step>, node: &Handle, raw_text: bool) {
    for child in node.children.borrow().iter().rev() {
        stack.push(Step::Enter {
            node: child.clone(),
            raw_text,
        });
    }
}

/// True if the first child of `node` is text beginning with a line feed
fn starts_with_newline(node: &Handle) -> bool {
    match node.children.borrow().first().map(|child| &child.data) {
        Some(NodeData::Text { contents }) => contents.borrow().starts_with('\n'),
        _ => false,
    }
}

fn escape_text(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

fn escape_attribute(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}
