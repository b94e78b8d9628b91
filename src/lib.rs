//! HTML Sanitizer
//!
//! This library removes script injection vectors from untrusted HTML while
//! keeping a configurable allow-list of element names. Markup is parsed with
//! html5ever, rewritten in place, and serialized back with self-closing void
//! elements.
//!
//! # Architecture
//!
//! The library is structured into several modules:
//! - `sanitizer`: the `Sanitizer` type and the tree removal pass
//! - `allow_list`: case-insensitive set of allowed element names
//! - `config`: the `whitelist` setting and its sources
//! - `markers`: script-link and CSS-expression detection
//! - `parser`: HTML5 parsing using html5ever
//! - `serializer`: markup output and declaration stripping
//! - `charset`: encoding resolution for byte input
//! - `ffi`: C-compatible interface
//!
//! # Examples
//!
//! ```rust
//! use html_sanitizer::sanitize_html;
//!
//! let clean = sanitize_html(r#"<p onclick="steal()">Hi<br><script>x()</script></p>"#, &["p", "br"])
//!     .expect("sanitization succeeds");
//! assert_eq!(clean, "<p>Hi<br /></p>");
//! ```

// Module declarations
pub mod allow_list;
pub mod charset;
pub mod config;
pub mod error;
pub mod ffi;
pub mod markers;
pub mod parser;
pub mod sanitizer;
pub mod serializer;

// Re-export main types for convenience
pub use allow_list::AllowList;
pub use config::SanitizerConfig;
pub use error::SanitizeError;
pub use sanitizer::{SanitizeStats, Sanitizer, sanitize_html};
