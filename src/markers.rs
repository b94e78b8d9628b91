//! Marker detection for script-capable attribute and style values
//!
//! The two predicates are plain substring checks over an already lower-cased
//! string. They are a blunt heuristic: an attribute whose text merely contains
//! the word "expression" is removed too. The normalization helpers undo the
//! cheap obfuscations a browser would undo itself before the predicates run:
//!
//! - case variation (`JaVaScRiPt:`)
//! - whitespace and control characters inside a URL scheme (`java\tscript:`)
//! - CSS comments and backslash escapes (`expr/**/ession`, `e\78 pression`)
//!
//! Character references (`&#106;avascript:`) are already decoded by the
//! parser before values reach this module.

/// URL schemes that execute script when navigated to
const SCRIPT_SCHEMES: &[&str] = &["javascript:", "vbscript:"];

/// Legacy IE CSS construct that evaluates script
const EXPRESSION_MARKER: &str = "expression";

/// Largest code point a CSS escape may denote
const MAX_CODE_POINT: u32 = 0x10FFFF;

/// True if `value` contains `javascript:` or `vbscript:`
///
/// # Examples
///
/// ```
/// use html_sanitizer::markers::has_script_link;
///
/// assert!(has_script_link("javascript:alert(1)"));
/// assert!(has_script_link("url(vbscript:msgbox(1))"));
/// assert!(!has_script_link("https://example.com/javascript"));
/// ```
pub fn has_script_link(value: &str) -> bool {
    SCRIPT_SCHEMES.iter().any(|scheme| value.contains(scheme))
}

/// True if `value` contains `expression`
///
/// # Examples
///
/// ```
/// use html_sanitizer::markers::has_expression_link;
///
/// assert!(has_expression_link("width:expression(alert(1))"));
/// assert!(!has_expression_link("width:100px"));
/// ```
pub fn has_expression_link(value: &str) -> bool {
    value.contains(EXPRESSION_MARKER)
}

/// Lower-case `value` and drop ASCII whitespace and control characters
pub fn normalize_value(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_control())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Normalize a CSS fragment: drop comments, decode escapes, then
/// [`normalize_value`]
pub fn normalize_css(css: &str) -> String {
    normalize_value(&decode_css_escapes(&strip_css_comments(css)))
}

/// True if an attribute value carries a script link after normalization
pub fn value_has_script_link(value: &str) -> bool {
    has_script_link(&normalize_value(value))
}

/// True if CSS text (a `style` attribute or `<style>` block) carries either
/// marker after normalization
pub fn css_has_markers(css: &str) -> bool {
    let normalized = normalize_css(css);
    has_expression_link(&normalized) || has_script_link(&normalized)
}

/// Remove `/* ... */` comments; an unterminated comment runs to the end
fn strip_css_comments(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut rest = css;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            None => return out,
        }
    }
    out.push_str(rest);
    out
}

/// Decode CSS backslash escapes
///
/// `\` followed by up to six hex digits denotes a code point and swallows one
/// trailing whitespace character; `\` followed by a newline is a line
/// continuation; `\` followed by anything else is that character.
fn decode_css_escapes(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut chars = css.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        let mut code_point: u32 = 0;
        let mut digits = 0;
        while digits < 6 {
            match chars.peek().and_then(|d| d.to_digit(16)) {
                Some(d) => {
                    code_point = code_point * 16 + d;
                    digits += 1;
                    chars.next();
                }
                None => break,
            }
        }

        if digits > 0 {
            if matches!(chars.peek(), Some(' ' | '\t' | '\n' | '\r' | '\x0c')) {
                chars.next();
            }
            let decoded = if code_point == 0 || code_point > MAX_CODE_POINT {
                char::REPLACEMENT_CHARACTER
            } else {
                char::from_u32(code_point).unwrap_or(char::REPLACEMENT_CHARACTER)
            };
            out.push(decoded);
            continue;
        }

        match chars.next() {
            Some('\n' | '\r' | '\x0c') => {}
            Some(other) => out.push(other),
            None => {}
        }
    }

    out
}
