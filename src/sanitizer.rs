//! Allow-list HTML sanitizer
//!
//! [`Sanitizer`] owns an [`AllowList`] of element names and rewrites parsed
//! documents in place:
//!
//! 1. **Element policy**: an element whose name is not allowed is detached
//!    together with everything beneath it
//! 2. **Style blocks**: an allowed `<style>` whose CSS carries an
//!    `expression` or script-link marker is detached
//! 3. **Attributes**: on every surviving element, `on*` attributes, `style`
//!    attributes carrying either marker, and any attribute whose value carries
//!    a script link are removed
//!
//! Text, comments and other non-element nodes are left as they are.
//!
//! # Examples
//!
//! ```rust
//! use html_sanitizer::{sanitize_html, Sanitizer, SanitizerConfig};
//!
//! let clean = sanitize_html(r#"<b onclick="x()">hi</b><script>evil()</script>"#, &["b"]).unwrap();
//! assert_eq!(clean, "<b>hi</b>");
//!
//! let sanitizer = Sanitizer::new(&SanitizerConfig::with_whitelist("a|img"));
//! let clean = sanitizer.sanitize(r#"<a href="javascript:alert(1)">x</a>"#).unwrap();
//! assert_eq!(clean, "<a>x</a>");
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use html5ever::Attribute;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use tracing::debug;

use crate::allow_list::AllowList;
use crate::config::SanitizerConfig;
use crate::error::SanitizeError;
use crate::markers::{css_has_markers, value_has_script_link};
use crate::parser::{
    DocumentShell, HTML_NAMESPACE, MATHML_NAMESPACE, SVG_NAMESPACE, parse_html, parse_html_bytes,
};
use crate::serializer::{serialize_document, strip_declaration};

/// Counts of what a sanitization pass removed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SanitizeStats {
    /// Elements detached, including `<style>` blocks with markers. Descendants
    /// of a detached element are not counted separately.
    pub elements_removed: usize,
    /// Attributes removed from surviving elements
    pub attributes_removed: usize,
}

/// Allow-list based HTML sanitizer
///
/// An instance can be reused for any number of documents; the allow-list is
/// only read during [`sanitize`](Self::sanitize).
#[derive(Debug, Clone, Default)]
pub struct Sanitizer {
    allow_list: AllowList,
}

impl Sanitizer {
    /// Create a sanitizer from configuration
    ///
    /// A configuration without a `whitelist` setting yields an empty
    /// allow-list, which removes every element.
    pub fn new(config: &SanitizerConfig) -> Self {
        Self::with_allow_list(config.allow_list())
    }

    /// Create a sanitizer with an explicit allow-list
    pub fn with_allow_list(allow_list: AllowList) -> Self {
        Self { allow_list }
    }

    pub fn allow_list(&self) -> &AllowList {
        &self.allow_list
    }

    /// Mutable access to the allow-list for subsequent calls
    pub fn allow_list_mut(&mut self) -> &mut AllowList {
        &mut self.allow_list
    }

    /// Sanitize `html` with the current allow-list
    ///
    /// Empty input produces empty output.
    pub fn sanitize(&self, html: &str) -> Result<String, SanitizeError> {
        sanitize_with_list(&self.allow_list, html)
    }

    /// Sanitize `html`, replacing the allow-list for this call only
    ///
    /// A non-empty `override_names` replaces (does not extend) the instance
    /// allow-list; the instance itself is not modified. An empty slice uses
    /// the instance allow-list.
    pub fn sanitize_with<S: AsRef<str>>(
        &self,
        html: &str,
        override_names: &[S],
    ) -> Result<String, SanitizeError> {
        if override_names.is_empty() {
            return self.sanitize(html);
        }

        let allow_list: AllowList = override_names.iter().collect();
        sanitize_with_list(&allow_list, html)
    }

    /// Decode and sanitize raw bytes
    ///
    /// The encoding is resolved from a BOM, `content_type`, a `<meta>`
    /// declaration, or defaults to UTF-8.
    ///
    /// # Errors
    ///
    /// `SanitizeError::EncodingError` if the bytes cannot be decoded.
    pub fn sanitize_bytes(
        &self,
        html: &[u8],
        content_type: Option<&str>,
    ) -> Result<String, SanitizeError> {
        if html.is_empty() {
            return Ok(String::new());
        }

        let dom = parse_html_bytes(html, content_type)?;
        Ok(finish(&self.allow_list, &dom))
    }

    /// Apply the removal policy to an already parsed document in place
    pub fn sanitize_dom(&self, dom: &RcDom) -> SanitizeStats {
        TreePass::new(&self.allow_list).run(dom)
    }
}

/// Sanitize `html` keeping only the elements named in `allowed_names`
///
/// Builds a transient [`Sanitizer`]; no state is shared between calls.
/// An empty `allowed_names` removes every element.
///
/// ```rust
/// use html_sanitizer::sanitize_html;
///
/// let clean = sanitize_html("<P>kept <i>dropped</i></P>", &["p"]).unwrap();
/// assert_eq!(clean, "<p>kept </p>");
/// ```
pub fn sanitize_html<S: AsRef<str>>(
    html: &str,
    allowed_names: &[S],
) -> Result<String, SanitizeError> {
    Sanitizer::default().sanitize_with(html, allowed_names)
}

fn sanitize_with_list(allow_list: &AllowList, html: &str) -> Result<String, SanitizeError> {
    if html.is_empty() {
        return Ok(String::new());
    }

    let dom = parse_html(html)?;
    Ok(finish(allow_list, &dom))
}

fn finish(allow_list: &AllowList, dom: &RcDom) -> String {
    TreePass::new(allow_list).run(dom);
    let serialized = serialize_document(dom);
    strip_declaration(&serialized).to_string()
}

/// What the parser would make of a child element, judged by its parent
///
/// Serialized markup is re-parsed by the browser. An element that the parser
/// could not have placed under its current parent is re-parsed somewhere else,
/// possibly in another namespace, which changes how its text is tokenized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Parent {
    /// HTML element, the document, or a template's contents
    Html,
    /// `foreignObject`, `desc` or `title` in SVG
    SvgIntegrationPoint,
    Svg,
    /// `mi`, `mo`, `mn`, `ms` or `mtext`
    MathText,
    /// `annotation-xml`; `html` if its encoding makes it an HTML integration point
    MathAnnotation { html: bool },
    Math,
}

impl Parent {
    fn of(ns: &str, local: &str, attrs: &[Attribute]) -> Self {
        match ns {
            SVG_NAMESPACE => match local.to_ascii_lowercase().as_str() {
                "foreignobject" | "desc" | "title" => Parent::SvgIntegrationPoint,
                _ => Parent::Svg,
            },
            MATHML_NAMESPACE => match local {
                "mi" | "mo" | "mn" | "ms" | "mtext" => Parent::MathText,
                "annotation-xml" => Parent::MathAnnotation {
                    html: attrs.iter().any(|attr| {
                        &*attr.name.local == "encoding"
                            && (attr.value.eq_ignore_ascii_case("text/html")
                                || attr.value.eq_ignore_ascii_case("application/xhtml+xml"))
                    }),
                },
                _ => Parent::Math,
            },
            _ => Parent::Html,
        }
    }

    /// True if an element `local` in namespace `ns` would be re-parsed
    /// differently under this parent
    fn misplaces(self, ns: &str, local: &str) -> bool {
        match ns {
            HTML_NAMESPACE => match self {
                Parent::Html
                | Parent::SvgIntegrationPoint
                | Parent::MathAnnotation { html: true } => false,
                Parent::MathText => matches!(local, "mglyph" | "malignmark"),
                Parent::Svg | Parent::Math | Parent::MathAnnotation { html: false } => true,
            },
            SVG_NAMESPACE => match self {
                Parent::Svg => false,
                Parent::Math => true,
                _ => local != "svg",
            },
            MATHML_NAMESPACE => match self {
                Parent::Math | Parent::MathAnnotation { html: false } => false,
                Parent::MathText => !matches!(local, "math" | "mglyph" | "malignmark"),
                Parent::Svg => true,
                _ => local != "math",
            },
            _ => true,
        }
    }
}

/// A node waiting to be visited, with what its ancestors imply for it
struct Visit {
    node: Handle,
    parent: Parent,
    in_form: bool,
}

/// One removal pass over a document
struct TreePass<'a> {
    allow_list: &'a AllowList,
    stats: SanitizeStats,
}

impl<'a> TreePass<'a> {
    fn new(allow_list: &'a AllowList) -> Self {
        Self {
            allow_list,
            stats: SanitizeStats::default(),
        }
    }

    fn run(mut self, dom: &RcDom) -> SanitizeStats {
        let shell = DocumentShell::locate(dom);

        // Children are snapshotted onto the stack before any of them is
        // visited, so detaching a node never disturbs a pending sibling.
        let mut pending: Vec<Visit> = Vec::new();
        push_children(&mut pending, &dom.document, Parent::Html, false);

        while let Some(Visit {
            node,
            parent,
            in_form,
        }) = pending.pop()
        {
            let NodeData::Element {
                ref name,
                ref attrs,
                ref template_contents,
                ..
            } = node.data
            else {
                continue;
            };

            if shell.contains(&node) {
                push_children(&mut pending, &node, Parent::Html, false);
                continue;
            }

            let local: &str = &name.local;
            let ns: &str = &name.ns;
            let tag = local.to_ascii_lowercase();

            if !self.allow_list.contains(&tag) {
                debug!(element = %tag, "removed element outside allow-list");
                self.remove(&node);
                continue;
            }

            if parent.misplaces(ns, local) {
                debug!(
                    element = %tag,
                    namespace = ns,
                    "removed element that would re-parse elsewhere"
                );
                self.remove(&node);
                continue;
            }

            let is_form = ns == HTML_NAMESPACE && tag == "form";
            if is_form && in_form {
                debug!(element = %tag, "removed nested form");
                self.remove(&node);
                continue;
            }

            if tag == "style" && css_has_markers(&text_content(&node)) {
                debug!(element = %tag, "removed style block with script markers");
                self.remove(&node);
                continue;
            }

            self.scrub_attributes(&tag, attrs);

            let child_parent = Parent::of(ns, local, &attrs.borrow());
            push_children(&mut pending, &node, child_parent, in_form || is_form);
            if let Some(contents) = template_contents.borrow().as_ref() {
                push_children(&mut pending, contents, Parent::Html, false);
            }
        }

        debug!(
            elements_removed = self.stats.elements_removed,
            attributes_removed = self.stats.attributes_removed,
            "sanitized document"
        );
        self.stats
    }

    fn remove(&mut self, node: &Handle) {
        detach(node);
        self.stats.elements_removed += 1;
    }

    fn scrub_attributes(&mut self, tag: &str, attrs: &RefCell<Vec<Attribute>>) {
        let mut attrs = attrs.borrow_mut();

        for index in (0..attrs.len()).rev() {
            let attr = &attrs[index];
            let local: &str = &attr.name.local;
            let name = local.to_ascii_lowercase();

            let reason = if name.starts_with("on") {
                "event handler"
            } else if name == "style" && css_has_markers(&attr.value) {
                "style expression"
            } else if value_has_script_link(&attr.value) {
                "script link"
            } else {
                continue;
            };

            debug!(element = tag, attribute = %name, reason, "removed attribute");
            attrs.remove(index);
            self.stats.attributes_removed += 1;
        }
    }
}

/// Push `node`'s children so they pop last-to-first
fn push_children(pending: &mut Vec<Visit>, node: &Handle, parent: Parent, in_form: bool) {
    pending.extend(node.children.borrow().iter().map(|child| Visit {
        node: child.clone(),
        parent,
        in_form,
    }));
}

/// Unlink `node` from its parent's child list
fn detach(node: &Handle) {
    let Some(parent) = node.parent.take().and_then(|weak| weak.upgrade()) else {
        return;
    };
    parent
        .children
        .borrow_mut()
        .retain(|child| !Rc::ptr_eq(child, node));
}

/// Concatenated text of all descendants
fn text_content(node: &Handle) -> String {
    let mut text = String::new();
    let mut pending = vec![node.clone()];

    while let Some(current) = pending.pop() {
        if let NodeData::Text { ref contents } = current.data {
            text.push_str(&contents.borrow());
        }
        pending.extend(current.children.borrow().iter().rev().cloned());
    }

    text
}
