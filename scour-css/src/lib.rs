//! # Scour CSS
//!
//! Inline-style declaration filtering for the Scour HTML sanitizer.
//!
//! A `style` attribute is a `;`-separated block of `property: value`
//! declarations. This crate keeps the declarations whose property name is
//! on an allowlist and drops everything else, including declarations whose
//! value smuggles executable content (`expression(...)`, `url(...)` with a
//! disallowed protocol scheme). Malformed declarations never fail the
//! call; they are dropped silently.
//!
//! ## Quick Start
//!
//! ```rust
//! use scour_css::CssSanitizer;
//!
//! let css = CssSanitizer::new(vec!["color".to_string()]);
//! let clean = css.sanitize("color: white; position: absolute");
//! assert_eq!(clean, "color: white");
//! ```
//!
//! ## Dangerous values
//!
//! ```rust
//! use scour_css::CssSanitizer;
//!
//! let css = CssSanitizer::new(vec!["background".to_string()]);
//!
//! // An allowed property does not rescue a dangerous value.
//! assert_eq!(css.sanitize("background: url(javascript:alert(1))"), "");
//! assert_eq!(css.sanitize("background: expression(alert(1))"), "");
//!
//! // Relative and https urls are fine.
//! assert_eq!(
//!     css.sanitize("background: url(/img/dot.png)"),
//!     "background: url(/img/dot.png)"
//! );
//! ```

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static EXPRESSION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)expression\s*\(").unwrap());

static URL_SCHEME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)url\s*\(\s*['"]?\s*([a-z][a-z0-9+.-]*)\s*:"#).unwrap()
});

/// CSS declaration filter backed by a property-name allowlist.
///
/// Property names are compared case-insensitively after trimming. Values
/// are never rewritten; a declaration either survives verbatim or is
/// dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CssSanitizer {
    allowed_properties: HashSet<String>,
    allowed_protocols: HashSet<String>,
}

impl CssSanitizer {
    /// Create a filter allowing the given property names.
    ///
    /// `url(...)` values are restricted to `http` and `https`; use
    /// [`with_allowed_protocols`](Self::with_allowed_protocols) to change
    /// that set.
    pub fn new(allowed_properties: Vec<String>) -> Self {
        Self {
            allowed_properties: allowed_properties
                .into_iter()
                .map(|p| p.trim().to_ascii_lowercase())
                .collect(),
            allowed_protocols: ["http", "https"].iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Set the protocol schemes permitted inside `url(...)` values.
    pub fn with_allowed_protocols(mut self, protocols: Vec<String>) -> Self {
        self.allowed_protocols = protocols
            .into_iter()
            .map(|p| p.trim().to_ascii_lowercase())
            .collect();
        self
    }

    /// The property names this filter keeps.
    pub fn allowed_properties(&self) -> &HashSet<String> {
        &self.allowed_properties
    }

    /// Filter a raw `style` attribute value.
    ///
    /// Surviving declarations are reassembled as `name: value` joined by
    /// `"; "`, with no trailing semicolon. Returns an empty string when
    /// nothing survives.
    pub fn sanitize(&self, value: &str) -> String {
        let mut kept: Vec<String> = Vec::new();
        for declaration in value.split(';') {
            let Some((name, val)) = declaration.split_once(':') else {
                continue;
            };
            let name = name.trim();
            let val = val.trim();
            if name.is_empty() || val.is_empty() {
                continue;
            }
            if !self.allowed_properties.contains(&name.to_ascii_lowercase()) {
                tracing::debug!("Dropping disallowed CSS property: {}", name);
                continue;
            }
            if self.is_dangerous_value(val) {
                tracing::debug!("Dropping CSS declaration with dangerous value: {}", name);
                continue;
            }
            kept.push(format!("{}: {}", name, val));
        }
        kept.join("; ")
    }

    fn is_dangerous_value(&self, value: &str) -> bool {
        if EXPRESSION_PATTERN.is_match(value) {
            return true;
        }
        for captures in URL_SCHEME_PATTERN.captures_iter(value) {
            let scheme = captures[1].to_ascii_lowercase();
            if !self.allowed_protocols.contains(&scheme) {
                return true;
            }
        }
        false
    }
}

/// Filter a `style` attribute value against a property-name allowlist.
///
/// Convenience wrapper over [`CssSanitizer`] with the default protocol
/// set.
pub fn sanitize_css(value: &str, allowed_properties: &HashSet<String>) -> String {
    CssSanitizer::new(allowed_properties.iter().cloned().collect()).sanitize(value)
}
