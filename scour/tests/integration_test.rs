//! Integration tests for scour

use std::collections::HashMap;

use scour::{sanitize, CssSanitizer, Policy, PolicyError, Sanitizer};

/// Strip mode over a small list allowlist, comments removed.
fn strip_policy() -> Policy {
    Policy::builder()
        .with_allowed_tags(
            ["a", "ul", "li"].iter().map(|t| t.to_string()).collect(),
        )
        .with_strip_tags(true)
        .with_strip_comments(true)
        .build()
        .unwrap()
}

/// Escape mode with nothing allowed: every tag becomes visible text.
fn escape_policy() -> Policy {
    Policy::builder()
        .with_allowed_tags(Vec::new())
        .build()
        .unwrap()
}

/// Link policy with https-only protocols, as a form field would configure
/// it for untrusted profiles.
fn link_policy() -> Policy {
    Policy::builder()
        .with_allowed_tags(vec!["a".to_string()])
        .with_allowed_attributes(HashMap::from([(
            "a".to_string(),
            vec!["href".to_string(), "title".to_string()],
        )]))
        .with_allowed_protocols(vec!["https".to_string()])
        .with_strip_tags(false)
        .build()
        .unwrap()
}

#[test]
fn test_empty_input() {
    assert_eq!(sanitize("", &strip_policy()), "");
    assert_eq!(sanitize("", &escape_policy()), "");
}

#[test]
fn test_plain_text_is_untouched() {
    assert_eq!(sanitize("No tags here", &strip_policy()), "No tags here");
    assert_eq!(sanitize("No tags here", &escape_policy()), "No tags here");
}

#[test]
fn test_strip_removes_tags_but_keeps_text() {
    let policy = Policy::builder()
        .with_allowed_tags(Vec::new())
        .with_strip_tags(true)
        .build()
        .unwrap();
    assert_eq!(sanitize("<h1>Heading</h1>", &policy), "Heading");
}

#[test]
fn test_escape_mode_makes_tags_visible() {
    assert_eq!(
        sanitize("<h1>Heading</h1>", &escape_policy()),
        "&lt;h1&gt;Heading&lt;/h1&gt;"
    );
}

#[test]
fn test_comment_and_script_are_both_neutralized() {
    let input = "<!-- script here --><script>alert(\"Hello World\")</script>";
    assert_eq!(sanitize(input, &strip_policy()), "alert(\"Hello World\")");
}

#[test]
fn test_allowed_list_markup_survives_strip_mode() {
    let input = "<ul><li>one</li><li>two</li></ul>";
    assert_eq!(sanitize(input, &strip_policy()), input);
}

#[test]
fn test_disallowed_attributes_are_dropped() {
    let input = r#"<a href="https://x.com" target="_blank">t</a>"#;
    assert_eq!(
        sanitize(input, &link_policy()),
        r#"<a href="https://x.com">t</a>"#
    );
}

#[test]
fn test_allowed_attributes_are_kept() {
    let input = r#"<a href="https://www.google.com" title="Google">google.com</a>"#;
    assert_eq!(sanitize(input, &link_policy()), input);
}

#[test]
fn test_disallowed_protocol_drops_attribute_not_tag() {
    let input = r#"<a href="javascript:evil()">t</a>"#;
    assert_eq!(sanitize(input, &link_policy()), "<a>t</a>");
}

#[test]
fn test_mixed_protocols() {
    let input = "<a href=\"http://www.google.com\" target=\"_blank\">google.com</a>\
                 <a href=\"https://www.google.com\">google.com</a>";
    assert_eq!(
        sanitize(input, &link_policy()),
        "<a>google.com</a><a href=\"https://www.google.com\">google.com</a>"
    );
}

#[test]
fn test_class_attributes_stripped_from_lists() {
    let input = "<ul class=\"our-list\"><li class=\"list-item\">one</li><li>two</li></ul>";
    assert_eq!(
        sanitize(input, &strip_policy()),
        "<ul><li>one</li><li>two</li></ul>"
    );
}

#[test]
fn test_malformed_nesting_is_repaired() {
    assert_eq!(
        sanitize("<ul><li>one<li>two</ul>", &strip_policy()),
        "<ul><li>one</li><li>two</li></ul>"
    );
}

#[test]
fn test_unclosed_tags_are_closed_at_end_of_input() {
    assert_eq!(
        sanitize("<ul><li>dangling", &strip_policy()),
        "<ul><li>dangling</li></ul>"
    );
}

#[test]
fn test_style_attribute_is_filtered() {
    let policy = Policy::builder()
        .with_allowed_tags(vec!["li".to_string()])
        .with_allowed_attributes(HashMap::from([(
            "li".to_string(),
            vec!["style".to_string()],
        )]))
        .with_css_sanitizer(CssSanitizer::new(vec!["color".to_string()]))
        .build()
        .unwrap();
    assert_eq!(
        sanitize(r#"<li style="color: white; position: absolute">item</li>"#, &policy),
        r#"<li style="color: white">item</li>"#
    );
    // An emptied style value drops the whole attribute.
    assert_eq!(
        sanitize(r#"<li style="position: absolute">item</li>"#, &policy),
        "<li>item</li>"
    );
}

#[test]
#[allow(deprecated)]
fn test_legacy_allowed_styles_option() {
    let policy = Policy::builder()
        .with_allowed_tags(vec!["li".to_string()])
        .with_allowed_attributes(HashMap::from([(
            "li".to_string(),
            vec!["style".to_string()],
        )]))
        .with_allowed_styles(vec!["color".to_string()])
        .build()
        .unwrap();
    assert_eq!(
        sanitize(r#"<li style="color: white; position: absolute">item</li>"#, &policy),
        r#"<li style="color: white">item</li>"#
    );
}

#[test]
#[allow(deprecated)]
fn test_css_sanitizer_wins_over_legacy_styles() {
    let policy = Policy::builder()
        .with_allowed_tags(vec!["li".to_string()])
        .with_allowed_attributes(HashMap::from([(
            "li".to_string(),
            vec!["style".to_string()],
        )]))
        .with_allowed_styles(vec!["position".to_string()])
        .with_css_sanitizer(CssSanitizer::new(vec!["color".to_string()]))
        .build()
        .unwrap();
    assert_eq!(
        sanitize(r#"<li style="color: red; position: absolute">item</li>"#, &policy),
        r#"<li style="color: red">item</li>"#
    );
}

#[test]
fn test_contradictory_policy_is_a_build_error() {
    let result = Policy::builder().allow_all_tags().with_strip_tags(true).build();
    assert_eq!(result.unwrap_err(), PolicyError::ContradictoryTagPolicy);
}

#[test]
fn test_all_tags_allowed_in_escape_mode() {
    let policy = Policy::builder()
        .allow_all_tags()
        .with_allowed_attributes(HashMap::new())
        .build()
        .unwrap();
    assert_eq!(
        sanitize("<marquee>zoom</marquee>", &policy),
        "<marquee>zoom</marquee>"
    );
    // Attributes are still filtered even when every tag is allowed.
    assert_eq!(
        sanitize(r#"<img src="x" onerror="alert(1)">"#, &policy),
        "<img>"
    );
}

#[test]
fn test_strip_content_tags() {
    let policy = Policy::builder()
        .with_allowed_tags(vec!["p".to_string()])
        .with_strip_tags(true)
        .with_strip_content_tags(vec!["script".to_string(), "style".to_string()])
        .build()
        .unwrap();
    assert_eq!(
        sanitize("<p>keep</p><script>alert(1)</script><style>p{}</style>", &policy),
        "<p>keep</p>"
    );
}

#[test]
fn test_comments_pass_through_when_allowed() {
    let policy = Policy::builder().with_strip_comments(false).build().unwrap();
    assert_eq!(sanitize("a<!-- note -->b", &policy), "a<!-- note -->b");
    // Unterminated comments are closed on output.
    assert_eq!(sanitize("a<!-- oops", &policy), "a<!-- oops-->");
}

#[test]
fn test_ampersands_are_not_double_escaped() {
    let policy = strip_policy();
    assert_eq!(sanitize("fish & chips", &policy), "fish &amp; chips");
    assert_eq!(sanitize("fish &amp; chips", &policy), "fish &amp; chips");
    assert_eq!(sanitize("&lt;b&gt;", &policy), "&lt;b&gt;");
}

#[test]
fn test_numeric_references_cannot_smuggle_markup() {
    // `&#60;script&#62;` decodes to literal angle brackets in text, which
    // must come back out escaped, never as a live tag.
    let out = sanitize("&#60;script&#62;alert(1)&#60;/script&#62;", &strip_policy());
    assert_eq!(out, "&lt;script&gt;alert(1)&lt;/script&gt;");
}

#[test]
fn test_entity_encoded_protocol_is_still_caught() {
    let input = "<a href=\"&#106;avascript:alert(1)\">x</a>";
    assert_eq!(sanitize(input, &link_policy()), "<a>x</a>");
}

#[test]
fn test_adversarial_fragments_never_panic() {
    let policy = strip_policy();
    let fragments = [
        "<",
        "</",
        "<!",
        "<!--",
        "<a href=",
        "<a href=\"unterminated",
        "<<<>>>",
        "</ div>",
        "<?php echo 1; ?>",
        "<![CDATA[x]]>",
        "\u{0}\u{1}\u{2}",
        "<a\u{a0}b>",
    ];
    for fragment in fragments {
        let _ = sanitize(fragment, &policy);
    }
}

#[test]
fn test_sanitizer_is_reusable_and_cloneable() {
    let sanitizer = Sanitizer::new(strip_policy());
    let clone = sanitizer.clone();
    assert_eq!(sanitizer.sanitize("<b>x</b>"), "x");
    assert_eq!(clone.sanitize("<b>x</b>"), "x");
    assert!(sanitizer.policy().strip_tags());
}

#[test]
fn test_idempotence_on_fixed_cases() {
    let inputs = [
        "<h1>Heading</h1>",
        "<ul><li>one<li>two</ul>",
        "<a href=\"javascript:x\" href=\"https://ok\">t",
        "fish & chips &amp; more",
        "<!-- c --><script>s</script>",
        "<b><i>crossed</b></i>",
        "text with \"quotes\" and 'apostrophes'",
    ];
    for policy in [strip_policy(), escape_policy(), link_policy(), Policy::default()] {
        for input in inputs {
            let once = sanitize(input, &policy);
            let twice = sanitize(&once, &policy);
            assert_eq!(twice, once, "not idempotent for {input:?}");
        }
    }
}

#[test]
fn test_policy_serde_round_trip() {
    let policy = link_policy();
    let json = serde_json::to_string(&policy).unwrap();
    let back: Policy = serde_json::from_str(&json).unwrap();
    assert_eq!(back, policy);
    assert_eq!(
        sanitize("<a href=\"https://x\">t</a>", &back),
        sanitize("<a href=\"https://x\">t</a>", &policy)
    );
}
