//! Sanitization policy: what survives and what happens to the rest.
//!
//! A [`Policy`] is an immutable value built once by [`PolicyBuilder`] and
//! then shared freely across sanitize calls. All validation happens in
//! [`PolicyBuilder::build`]; the engine core never re-checks configuration
//! at runtime.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;
use scour_css::CssSanitizer;
use serde::{Deserialize, Serialize};

use crate::error::{PolicyError, Result};

static SCHEME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*$").unwrap());

/// Tags kept when no explicit allowlist is configured.
pub const DEFAULT_ALLOWED_TAGS: &[&str] = &[
    "a", "abbr", "acronym", "b", "blockquote", "code", "em", "i", "li", "ol", "strong", "ul",
];

/// Protocol schemes kept on URL-bearing attributes by default.
pub const DEFAULT_ALLOWED_PROTOCOLS: &[&str] = &["http", "https", "mailto"];

/// Tag allowlist, or the everything-goes sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TagPolicy {
    /// Every tag is allowed (mutually exclusive with `strip_tags`).
    All,
    /// Only the named tags are allowed; names lowercase.
    Only(HashSet<String>),
}

/// Attribute allowlist keyed by tag name, or the everything-goes sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributePolicy {
    /// Every attribute is allowed on every tag.
    All,
    /// Per-tag allowlists; the `"*"` key applies to every tag.
    PerTag(HashMap<String, HashSet<String>>),
}

/// Immutable sanitization configuration.
///
/// Obtain one from [`Policy::builder`] or [`Policy::default`]. The default
/// mirrors the classic conservative allowlist: a handful of inline markup
/// tags, `href`/`title` on links, http(s) and mailto schemes, comments
/// stripped, disallowed tags escaped rather than removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    tags: TagPolicy,
    attributes: AttributePolicy,
    protocols: HashSet<String>,
    strip_tags: bool,
    strip_comments: bool,
    css: Option<CssSanitizer>,
    strip_content_tags: HashSet<String>,
}

impl Policy {
    /// Start building a policy from the defaults.
    pub fn builder() -> PolicyBuilder {
        PolicyBuilder::new()
    }

    pub fn allows_tag(&self, name: &str) -> bool {
        match &self.tags {
            TagPolicy::All => true,
            TagPolicy::Only(tags) => tags.contains(name),
        }
    }

    pub fn allows_attribute(&self, tag: &str, attribute: &str) -> bool {
        match &self.attributes {
            AttributePolicy::All => true,
            AttributePolicy::PerTag(map) => {
                map.get(tag).is_some_and(|set| set.contains(attribute))
                    || map.get("*").is_some_and(|set| set.contains(attribute))
            }
        }
    }

    pub fn allows_protocol(&self, scheme: &str) -> bool {
        self.protocols.contains(scheme)
    }

    /// Whether disallowed tags are removed (`true`) or escaped to visible
    /// text (`false`).
    pub fn strip_tags(&self) -> bool {
        self.strip_tags
    }

    pub fn strip_comments(&self) -> bool {
        self.strip_comments
    }

    /// The inline-style filter, when one is configured.
    pub fn css(&self) -> Option<&CssSanitizer> {
        self.css.as_ref()
    }

    /// Whether a stripped `name` tag takes its whole subtree with it.
    pub fn strips_content(&self, name: &str) -> bool {
        self.strip_content_tags.contains(name)
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            tags: TagPolicy::Only(lowered(DEFAULT_ALLOWED_TAGS.iter().map(|s| s.to_string()))),
            attributes: AttributePolicy::PerTag(default_attributes()),
            protocols: lowered(DEFAULT_ALLOWED_PROTOCOLS.iter().map(|s| s.to_string())),
            strip_tags: false,
            strip_comments: true,
            css: None,
            strip_content_tags: HashSet::new(),
        }
    }
}

fn default_attributes() -> HashMap<String, HashSet<String>> {
    let mut map = HashMap::new();
    map.insert(
        "a".to_string(),
        ["href", "title"].iter().map(|s| s.to_string()).collect(),
    );
    map.insert(
        "abbr".to_string(),
        ["title"].iter().map(|s| s.to_string()).collect(),
    );
    map.insert(
        "acronym".to_string(),
        ["title"].iter().map(|s| s.to_string()).collect(),
    );
    map
}

fn lowered(values: impl IntoIterator<Item = String>) -> HashSet<String> {
    values.into_iter().map(|v| v.to_ascii_lowercase()).collect()
}

/// Chained-setter builder for [`Policy`].
#[derive(Debug, Clone)]
pub struct PolicyBuilder {
    tags: TagPolicy,
    attributes: AttributePolicy,
    protocols: Vec<String>,
    strip_tags: bool,
    strip_comments: bool,
    css_sanitizer: Option<CssSanitizer>,
    allowed_styles: Option<Vec<String>>,
    strip_content_tags: Vec<String>,
}

impl PolicyBuilder {
    pub fn new() -> Self {
        Self {
            tags: TagPolicy::Only(lowered(DEFAULT_ALLOWED_TAGS.iter().map(|s| s.to_string()))),
            attributes: AttributePolicy::PerTag(default_attributes()),
            protocols: DEFAULT_ALLOWED_PROTOCOLS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            strip_tags: false,
            strip_comments: true,
            css_sanitizer: None,
            allowed_styles: None,
            strip_content_tags: Vec::new(),
        }
    }

    /// Replace the tag allowlist. An empty list means no tag survives.
    pub fn with_allowed_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = TagPolicy::Only(lowered(tags));
        self
    }

    /// Allow every tag. Contradicts [`with_strip_tags`](Self::with_strip_tags)
    /// and is rejected by [`build`](Self::build) when combined with it.
    pub fn allow_all_tags(mut self) -> Self {
        self.tags = TagPolicy::All;
        self
    }

    /// Replace the per-tag attribute allowlists. The `"*"` key applies to
    /// every tag.
    pub fn with_allowed_attributes(mut self, attributes: HashMap<String, Vec<String>>) -> Self {
        self.attributes = AttributePolicy::PerTag(
            attributes
                .into_iter()
                .map(|(tag, attrs)| (tag.to_ascii_lowercase(), lowered(attrs)))
                .collect(),
        );
        self
    }

    /// Set the attributes allowed on every tag (the `"*"` entry).
    pub fn with_generic_attributes(mut self, attributes: Vec<String>) -> Self {
        let generic = lowered(attributes);
        match &mut self.attributes {
            AttributePolicy::PerTag(map) => {
                map.insert("*".to_string(), generic);
            }
            AttributePolicy::All => {
                let mut map = HashMap::new();
                map.insert("*".to_string(), generic);
                self.attributes = AttributePolicy::PerTag(map);
            }
        }
        self
    }

    /// Allow every attribute on every tag. URL-bearing attributes are
    /// still protocol-checked.
    pub fn allow_all_attributes(mut self) -> Self {
        self.attributes = AttributePolicy::All;
        self
    }

    /// Replace the protocol-scheme allowlist for URL-bearing attributes.
    pub fn with_allowed_protocols(mut self, protocols: Vec<String>) -> Self {
        self.protocols = protocols;
        self
    }

    /// Remove disallowed tags instead of escaping them to text.
    pub fn with_strip_tags(mut self, strip: bool) -> Self {
        self.strip_tags = strip;
        self
    }

    /// Drop comment nodes (`true`, the default) or pass them through.
    pub fn with_strip_comments(mut self, strip: bool) -> Self {
        self.strip_comments = strip;
        self
    }

    /// Filter `style` attribute values through the given CSS sanitizer.
    pub fn with_css_sanitizer(mut self, css: CssSanitizer) -> Self {
        self.css_sanitizer = Some(css);
        self
    }

    /// Legacy flat list of allowed CSS property names.
    #[deprecated(
        since = "0.1.0",
        note = "use with_css_sanitizer instead; allowed_styles is the legacy list option"
    )]
    pub fn with_allowed_styles(mut self, styles: Vec<String>) -> Self {
        self.allowed_styles = Some(styles);
        self
    }

    /// Tags whose whole subtree is removed when the tag itself is
    /// disallowed and stripped (rather than promoting the children).
    /// Typically `script` and `style`. Only meaningful in strip mode.
    pub fn with_strip_content_tags(mut self, tags: Vec<String>) -> Self {
        self.strip_content_tags = tags;
        self
    }

    /// Validate and freeze the policy.
    ///
    /// Fails on a contradictory configuration (all tags allowed while
    /// `strip_tags` is set) or a syntactically invalid protocol scheme.
    /// When both a CSS sanitizer and the legacy style list are given, the
    /// CSS sanitizer wins and the legacy list is ignored with a warning.
    pub fn build(self) -> Result<Policy> {
        if matches!(self.tags, TagPolicy::All) && self.strip_tags {
            return Err(PolicyError::ContradictoryTagPolicy);
        }
        for scheme in &self.protocols {
            if !SCHEME_PATTERN.is_match(scheme) {
                return Err(PolicyError::InvalidProtocol(scheme.clone()));
            }
        }
        let css = match (self.css_sanitizer, self.allowed_styles) {
            (Some(css), Some(_)) => {
                tracing::warn!(
                    "allowed_styles is ignored since css_sanitizer is favoured over allowed_styles"
                );
                Some(css)
            }
            (Some(css), None) => Some(css),
            (None, Some(styles)) => Some(CssSanitizer::new(styles)),
            (None, None) => None,
        };
        Ok(Policy {
            tags: self.tags,
            attributes: self.attributes,
            protocols: lowered(self.protocols),
            strip_tags: self.strip_tags,
            strip_comments: self.strip_comments,
            css,
            strip_content_tags: lowered(self.strip_content_tags),
        })
    }
}

impl Default for PolicyBuilder {
    fn default() -> Self {
        Self::new()
    }
}
