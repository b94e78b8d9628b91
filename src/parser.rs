//! HTML5 parser using html5ever
//!
//! This module is the parse collaborator of the sanitizer. It turns arbitrary,
//! possibly malformed markup into an [`RcDom`] tree following the WHATWG
//! parsing algorithm, the same way a browser would see it.
//!
//! # Document shell
//!
//! html5ever always produces a full document: fragments such as `<b>x</b>`
//! are wrapped in implied `html`, `head` and `body` elements. Those shell
//! elements are not part of the caller's markup, so the sanitizer neither
//! applies policy to them nor serializes them. [`DocumentShell`] identifies
//! them in a parsed tree.
//!
//! # Examples
//!
//! ```rust
//! use html_sanitizer::parser::{parse_html, DocumentShell};
//!
//! let dom = parse_html("<b>Hello").expect("malformed markup still parses");
//! let shell = DocumentShell::locate(&dom);
//! assert!(shell.body().is_some());
//! ```

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use std::rc::Rc;

use crate::charset::decode_html;
use crate::error::SanitizeError;

/// Parse an HTML string into a DOM tree
///
/// # Errors
///
/// - `SanitizeError::InvalidInput`: the input is empty
///
/// html5ever is total over UTF-8 text, so no other failure is possible here.
pub fn parse_html(html: &str) -> Result<RcDom, SanitizeError> {
    if html.is_empty() {
        return Err(SanitizeError::InvalidInput(
            "HTML input is empty".to_string(),
        ));
    }

    let dom = parse_document(RcDom::default(), Default::default()).one(html);

    Ok(dom)
}

/// Parse HTML bytes into a DOM tree, decoding them first
///
/// The encoding is resolved from a byte order mark, the optional Content-Type
/// header value, a `<meta>` declaration, or defaults to UTF-8 (see
/// [`crate::charset`]).
///
/// # Errors
///
/// - `SanitizeError::InvalidInput`: the input is empty
/// - `SanitizeError::EncodingError`: the bytes are invalid for the resolved
///   charset, or the declared charset is unknown
pub fn parse_html_bytes(html: &[u8], content_type: Option<&str>) -> Result<RcDom, SanitizeError> {
    if html.is_empty() {
        return Err(SanitizeError::InvalidInput(
            "HTML input is empty".to_string(),
        ));
    }

    let text = decode_html(html, content_type)?;
    parse_html(&text)
}

/// The `html`, `head` and `body` elements at the top of a parsed document
#[derive(Default)]
pub struct DocumentShell {
    html: Option<Handle>,
    head: Option<Handle>,
    body: Option<Handle>,
}

impl DocumentShell {
    /// Find the shell elements of `dom`
    pub fn locate(dom: &RcDom) -> Self {
        let mut shell = DocumentShell::default();

        shell.html = dom
            .document
            .children
            .borrow()
            .iter()
            .find(|child| element_name(child) == Some("html"))
            .cloned();

        if let Some(html) = &shell.html {
            for child in html.children.borrow().iter() {
                match element_name(child) {
                    Some("head") if shell.head.is_none() => shell.head = Some(child.clone()),
                    Some("body") if shell.body.is_none() => shell.body = Some(child.clone()),
                    _ => {}
                }
            }
        }

        shell
    }

    /// True if `node` is one of the shell elements
    pub fn contains(&self, node: &Handle) -> bool {
        [&self.html, &self.head, &self.body]
            .into_iter()
            .flatten()
            .any(|shell| Rc::ptr_eq(shell, node))
    }

    pub fn head(&self) -> Option<&Handle> {
        self.head.as_ref()
    }

    pub fn body(&self) -> Option<&Handle> {
        self.body.as_ref()
    }
}

/// Local name of an HTML-namespace element, or `None` for other nodes
fn element_name(node: &Handle) -> Option<&str> {
    match node.data {
        NodeData::Element { ref name, .. } if &*name.ns == HTML_NAMESPACE => {
            Some(name.local.as_ref())
        }
        _ => None,
    }
}

pub(crate) const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";
pub(crate) const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";
pub(crate) const MATHML_NAMESPACE: &str = "http://www.w3.org/1998/Math/MathML";
