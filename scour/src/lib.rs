//! # Scour
//!
//! Allowlist-based HTML sanitization for untrusted input.
//!
//! ## Features
//!
//! - ✅ **Tag allowlisting** - Disallowed tags stripped or escaped to text
//! - ✅ **Attribute allowlisting** - Per-tag and wildcard attribute sets
//! - ✅ **Protocol filtering** - URL-bearing attributes checked by scheme
//! - ✅ **Inline-style filtering** - CSS property allowlist via `scour-css`
//! - ✅ **Tag-soup repair** - Crossed and dangling tags auto-closed
//! - ✅ **Tolerant parsing** - No input fails; malformed markup degrades
//!
//! ## Quick Start
//!
//! ```rust
//! use scour::{sanitize, Policy};
//!
//! let policy = Policy::default();
//! let clean = sanitize("<script>alert('XSS')</script><b>bold</b>", &policy);
//! assert_eq!(clean, "&lt;script&gt;alert('XSS')&lt;/script&gt;<b>bold</b>");
//! ```
//!
//! ## Strip mode
//!
//! With `strip_tags`, disallowed markup is removed instead of escaped;
//! text children are kept:
//!
//! ```rust
//! use scour::{sanitize, Policy};
//!
//! let policy = Policy::builder()
//!     .with_allowed_tags(vec!["p".to_string()])
//!     .with_strip_tags(true)
//!     .build()
//!     .unwrap();
//!
//! let clean = sanitize("<p>Hello</p><script>alert(1)</script>", &policy);
//! assert_eq!(clean, "<p>Hello</p>alert(1)");
//! ```
//!
//! ## Protocol filtering
//!
//! A disallowed scheme drops the attribute, never the tag:
//!
//! ```rust
//! use scour::{sanitize, Policy};
//!
//! let policy = Policy::default();
//! let clean = sanitize(r#"<a href="javascript:evil()">link</a>"#, &policy);
//! assert_eq!(clean, "<a>link</a>");
//! ```
//!
//! ## Inline styles
//!
//! ```rust
//! use scour::{sanitize, CssSanitizer, Policy};
//! use std::collections::HashMap;
//!
//! let policy = Policy::builder()
//!     .with_allowed_tags(vec!["li".to_string()])
//!     .with_allowed_attributes(HashMap::from([(
//!         "li".to_string(),
//!         vec!["style".to_string()],
//!     )]))
//!     .with_css_sanitizer(CssSanitizer::new(vec!["color".to_string()]))
//!     .build()
//!     .unwrap();
//!
//! let clean = sanitize(r#"<li style="color: white; position: absolute">x</li>"#, &policy);
//! assert_eq!(clean, r#"<li style="color: white">x</li>"#);
//! ```
//!
//! Sanitization never returns an error; the only fallible operation is
//! policy construction, which rejects contradictory configuration at
//! [`PolicyBuilder::build`].

pub mod entities;
pub mod error;
pub mod policy;
pub mod sanitizer;

mod rewriter;
mod serializer;
mod tokenizer;

pub use error::{PolicyError, Result};
pub use policy::{
    AttributePolicy, Policy, PolicyBuilder, TagPolicy, DEFAULT_ALLOWED_PROTOCOLS,
    DEFAULT_ALLOWED_TAGS,
};
pub use sanitizer::{sanitize, Sanitizer};
pub use scour_css::{sanitize_css, CssSanitizer};
