//! Property tests for the sanitizer over generated markup
//!
//! Fragments are built from well-nested phrasing elements so the parser
//! keeps their structure, which makes the expected output computable.
//! Block documents mix raw-text, RCDATA and newline-sensitive elements,
//! where only idempotence is checked.

use html_sanitizer::markers::{css_has_markers, value_has_script_link};
use html_sanitizer::parser::{DocumentShell, parse_html};
use html_sanitizer::sanitize_html;
use markup5ever_rcdom::NodeData;
use proptest::prelude::*;

const TAGS: &[&str] = &["b", "i", "em", "span", "script"];
const ATTR_NAMES: &[&str] = &["title", "onclick", "href", "style", "data-x"];
const ATTR_VALUES: &[&str] = &[
    "ok",
    "javascript:x()",
    "color:red",
    "width:expression(1)",
    "JAVA script:y",
];

#[derive(Debug, Clone)]
enum Fragment {
    Text(String),
    Element {
        tag: &'static str,
        attr: Option<(&'static str, &'static str)>,
        children: Vec<Fragment>,
    },
}

fn fragment() -> impl Strategy<Value = Fragment> {
    let leaf = "[a-z][a-z ]{0,7}".prop_map(Fragment::Text);
    leaf.prop_recursive(4, 32, 4, |inner| {
        (
            prop::sample::select(TAGS),
            prop::option::of((
                prop::sample::select(ATTR_NAMES),
                prop::sample::select(ATTR_VALUES),
            )),
            prop::collection::vec(inner, 0..4),
        )
            .prop_map(|(tag, attr, children)| Fragment::Element {
                tag,
                attr,
                children,
            })
    })
}

fn document() -> impl Strategy<Value = Vec<Fragment>> {
    prop::collection::vec(fragment(), 1..5)
}

const BLOCK_TAGS: &[&str] = &["pre", "textarea", "listing", "xmp", "style", "div"];
const BLOCK_INNER: &[&str] = &["", "x", "<b>x</b>", "a<i>b</i>", "\n"];

fn block() -> impl Strategy<Value = String> {
    (
        prop::sample::select(BLOCK_TAGS),
        0..=2usize,
        prop::sample::select(BLOCK_INNER),
    )
        .prop_map(|(tag, newlines, inner)| {
            format!("<{tag}>{}{inner}</{tag}>", "\n".repeat(newlines))
        })
}

fn block_document() -> impl Strategy<Value = String> {
    (
        prop::collection::vec(block(), 1..4),
        prop::option::of(prop::sample::select(BLOCK_INNER)),
    )
        .prop_map(|(blocks, plaintext)| {
            let mut html = blocks.concat();
            if let Some(text) = plaintext {
                html.push_str("<plaintext>");
                html.push_str(text);
                html.push_str("</plaintext><b>after</b>");
            }
            html
        })
}

fn block_allowed() -> impl Strategy<Value = Vec<&'static str>> {
    let all: Vec<&'static str> = BLOCK_TAGS
        .iter()
        .copied()
        .chain(["b", "i", "plaintext"])
        .collect();
    let len = all.len();
    prop::sample::subsequence(all, 0..=len)
}

fn allowed_subset() -> impl Strategy<Value = Vec<&'static str>> {
    prop::sample::subsequence(&TAGS[..4], 0..=4)
}

fn is_dangerous(name: &str, value: &str) -> bool {
    name.starts_with("on")
        || (name == "style" && css_has_markers(value))
        || value_has_script_link(value)
}

/// Markup for `fragments`; `safe_only` renders what the sanitizer should keep
/// when every tag except `script` is allowed.
fn render(fragments: &[Fragment], safe_only: bool, out: &mut String) {
    for fragment in fragments {
        match fragment {
            Fragment::Text(text) => out.push_str(text),
            Fragment::Element {
                tag,
                attr,
                children,
            } => {
                if safe_only && *tag == "script" {
                    continue;
                }
                out.push('<');
                out.push_str(tag);
                if let Some((name, value)) = attr {
                    if !(safe_only && is_dangerous(name, value)) {
                        out.push_str(&format!(" {name}=\"{value}\""));
                    }
                }
                out.push('>');
                if *tag == "script" {
                    // Raw text: children are rendered but never parsed as tags.
                    let mut inner = String::new();
                    render(children, safe_only, &mut inner);
                    out.push_str(&inner.replace('<', " "));
                } else {
                    render(children, safe_only, out);
                }
                out.push_str(&format!("</{tag}>"));
            }
        }
    }
}

fn to_html(fragments: &[Fragment], safe_only: bool) -> String {
    let mut out = String::new();
    render(fragments, safe_only, &mut out);
    out
}

/// Every element below the shell, with its attributes
fn elements(html: &str) -> Vec<(String, Vec<(String, String)>)> {
    let Ok(dom) = parse_html(html) else {
        return Vec::new();
    };
    let shell = DocumentShell::locate(&dom);
    let mut found = Vec::new();
    let mut pending = vec![dom.document.clone()];

    while let Some(node) = pending.pop() {
        if let NodeData::Element {
            ref name,
            ref attrs,
            ..
        } = node.data
        {
            if !shell.contains(&node) {
                let attrs = attrs
                    .borrow()
                    .iter()
                    .map(|a| (a.name.local.to_string(), a.value.to_string()))
                    .collect();
                found.push((name.local.to_string(), attrs));
            }
        }
        pending.extend(node.children.borrow().iter().cloned());
    }

    found
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_only_allowed_elements_survive(doc in document(), allowed in allowed_subset()) {
        let out = sanitize_html(&to_html(&doc, false), allowed.as_slice()).unwrap();

        for (name, attrs) in elements(&out) {
            prop_assert!(allowed.iter().any(|a| *a == name), "{name} survived in {out}");
            for (attr, value) in attrs {
                prop_assert!(!is_dangerous(&attr, &value), "{attr}={value} survived in {out}");
            }
        }
    }

    #[test]
    fn prop_sanitize_is_idempotent(doc in document(), allowed in allowed_subset()) {
        let once = sanitize_html(&to_html(&doc, false), allowed.as_slice()).unwrap();
        let twice = sanitize_html(&once, allowed.as_slice()).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_block_sanitize_is_idempotent(html in block_document(), allowed in block_allowed()) {
        let once = sanitize_html(&html, allowed.as_slice()).unwrap();
        let twice = sanitize_html(&once, allowed.as_slice()).unwrap();
        prop_assert_eq!(once, twice, "input: {:?}", html);
    }

    #[test]
    fn prop_allow_list_is_case_insensitive(doc in document(), allowed in allowed_subset()) {
        let html = to_html(&doc, false);
        let upper: Vec<String> = allowed.iter().map(|n| n.to_ascii_uppercase()).collect();
        prop_assert_eq!(
            sanitize_html(&html, allowed.as_slice()).unwrap(),
            sanitize_html(&html, upper.as_slice()).unwrap()
        );
    }

    #[test]
    fn prop_safe_markup_passes_through(doc in document()) {
        let out = sanitize_html(&to_html(&doc, false), &TAGS[..4]).unwrap();
        prop_assert_eq!(out, to_html(&doc, true));
    }
}
