//! Policy application over the token stream.
//!
//! Consumes the tokenizer's output and produces a filtered stream that
//! the serializer can render blindly: every surviving start tag is
//! allowed, every attribute on it is allowed and protocol-checked, and
//! tag nesting is repaired so the output never has crossed boundaries.

use std::collections::HashSet;

use once_cell::sync::Lazy;

use crate::policy::Policy;
use crate::serializer::is_void_element;
use crate::tokenizer::Token;

static URL_ATTRIBUTES: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ["href", "src", "action", "cite", "longdesc"].into_iter().collect());

/// Elements whose start tag implicitly closes an open sibling, per the
/// HTML optional-end-tag rules. Enough to keep list/table soup well
/// nested without a full tree builder.
fn closes_previous(new_tag: &str, open: &str) -> bool {
    match new_tag {
        "li" => open == "li",
        "p" => open == "p",
        "dt" | "dd" => open == "dt" || open == "dd",
        "td" | "th" => open == "td" || open == "th",
        "tr" => open == "tr",
        "option" => open == "option",
        _ => false,
    }
}

pub fn rewrite(tokens: Vec<Token>, policy: &Policy) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    let mut stack: Vec<String> = Vec::new();
    // (tag, depth) while skipping the subtree of a stripped content tag.
    let mut skipping: Option<(String, usize)> = None;

    for token in tokens {
        if let Some((tag, depth)) = &mut skipping {
            match &token {
                Token::StartTag {
                    name, self_closing, ..
                } if name == tag.as_str() && !*self_closing => {
                    *depth += 1;
                }
                Token::EndTag(name) if name == tag.as_str() => {
                    *depth -= 1;
                    if *depth == 0 {
                        skipping = None;
                    }
                }
                _ => {}
            }
            continue;
        }

        match token {
            Token::Text(text) => out.push(Token::Text(text)),

            Token::Comment(content) => {
                if policy.strip_comments() {
                    tracing::debug!("Stripping comment");
                } else {
                    out.push(Token::Comment(content));
                }
            }

            Token::StartTag {
                name,
                attributes,
                self_closing,
            } => {
                if policy.allows_tag(&name) {
                    if let Some(top) = stack.last() {
                        if closes_previous(&name, top) {
                            out.push(Token::EndTag(top.clone()));
                            stack.pop();
                        }
                    }
                    let attributes = filter_attributes(&name, attributes, policy);
                    if !is_void_element(&name) {
                        stack.push(name.clone());
                    }
                    out.push(Token::StartTag {
                        name,
                        attributes,
                        self_closing,
                    });
                } else if policy.strip_tags() {
                    tracing::debug!("Stripping disallowed tag: {}", name);
                    if policy.strips_content(&name) && !self_closing && !is_void_element(&name) {
                        skipping = Some((name, 1));
                    }
                } else {
                    out.push(Token::Text(raw_tag(&name, &attributes, self_closing)));
                }
            }

            Token::EndTag(name) => {
                if !policy.allows_tag(&name) {
                    if policy.strip_tags() {
                        tracing::debug!("Stripping disallowed end tag: {}", name);
                    } else {
                        out.push(Token::Text(format!("</{}>", name)));
                    }
                } else if is_void_element(&name) {
                    // Void elements have no end tag; `</br>` is noise.
                } else if let Some(position) = stack.iter().rposition(|open| *open == name) {
                    while stack.len() > position {
                        let Some(open) = stack.pop() else { break };
                        out.push(Token::EndTag(open));
                    }
                } else {
                    tracing::debug!("Dropping stray end tag: {}", name);
                }
            }
        }
    }

    while let Some(open) = stack.pop() {
        out.push(Token::EndTag(open));
    }
    out
}

fn filter_attributes(
    tag: &str,
    attributes: Vec<(String, Option<String>)>,
    policy: &Policy,
) -> Vec<(String, Option<String>)> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut kept: Vec<(String, Option<String>)> = Vec::new();
    for (name, value) in attributes {
        if !seen.insert(name.clone()) {
            continue;
        }
        if !policy.allows_attribute(tag, &name) {
            tracing::debug!("Dropping disallowed attribute {} on <{}>", name, tag);
            continue;
        }
        if URL_ATTRIBUTES.contains(name.as_str()) {
            if let Some(url) = value.as_deref() {
                if !scheme_allowed(url, policy) {
                    tracing::debug!(
                        "Dropping attribute {} with disallowed protocol on <{}>",
                        name,
                        tag
                    );
                    continue;
                }
            }
        }
        if name == "style" {
            if let (Some(css), Some(style)) = (policy.css(), value.as_deref()) {
                let filtered = css.sanitize(style);
                if filtered.is_empty() {
                    continue;
                }
                kept.push((name, Some(filtered)));
                continue;
            }
        }
        kept.push((name, value));
    }
    kept
}

/// Decide whether a URL-bearing attribute value passes the protocol
/// allowlist. Relative URLs (no scheme) always pass. The scheme is read
/// from a scratch copy with ASCII whitespace and control characters
/// removed, so `java\nscript:` cannot sneak past.
fn scheme_allowed(value: &str, policy: &Policy) -> bool {
    let cleaned: String = value
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_ascii_control())
        .collect();
    for (index, ch) in cleaned.char_indices() {
        match ch {
            ':' => {
                let scheme = cleaned[..index].to_ascii_lowercase();
                return policy.allows_protocol(&scheme);
            }
            '/' | '?' | '#' => return true,
            _ => {}
        }
    }
    true
}

/// Reconstruct a disallowed tag's source so escape mode can emit it as
/// visible text. The serializer's text escaping handles the rest.
fn raw_tag(name: &str, attributes: &[(String, Option<String>)], self_closing: bool) -> String {
    let mut source = String::with_capacity(name.len() + 2);
    source.push('<');
    source.push_str(name);
    for (attr, value) in attributes {
        source.push(' ');
        source.push_str(attr);
        if let Some(value) = value {
            source.push_str("=\"");
            source.push_str(value);
            source.push('"');
        }
    }
    if self_closing {
        source.push_str("/>");
    } else {
        source.push('>');
    }
    source
}
