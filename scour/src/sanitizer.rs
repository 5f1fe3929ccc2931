//! Public sanitize entry points.

use crate::policy::Policy;
use crate::{rewriter, serializer, tokenizer};

/// Reusable sanitizer holding a [`Policy`].
///
/// Sanitization is a pure, synchronous transformation: each call
/// allocates its own token buffer and open-tag stack and discards them on
/// return, so a `Sanitizer` can be shared across threads freely.
#[derive(Debug, Clone, Default)]
pub struct Sanitizer {
    policy: Policy,
}

impl Sanitizer {
    pub fn new(policy: Policy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Sanitize an HTML fragment.
    ///
    /// Never fails: malformed markup degrades to escaped or stripped
    /// output and unclosed tags are auto-closed. The returned string is
    /// safe to embed in a document body under this sanitizer's policy.
    pub fn sanitize(&self, html: &str) -> String {
        sanitize(html, &self.policy)
    }
}

/// Sanitize `html` under `policy`. See [`Sanitizer::sanitize`].
pub fn sanitize(html: &str, policy: &Policy) -> String {
    let tokens = tokenizer::tokenize(html);
    let tokens = rewriter::rewrite(tokens, policy);
    serializer::serialize(&tokens)
}
