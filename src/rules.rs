// src/rules.rs
//
// Declarative rule table: each rule pairs a match predicate (tag name and/or
// class-value substring, with exclusions) with a mutation action. One generic
// engine applies the table; the rules themselves carry no code beyond the
// action variants below.
//
// Every action is idempotent: applied to a tag already in the desired state
// it returns None and the engine counts nothing.

use crate::tag::{attr_value, contains_ci, find_attr, has_class_token, insert_point, parse_tag};

/// How a matched tag is rewritten.
#[derive(Clone, Copy, Debug)]
pub enum Action {
    /// Append a bare attribute unless an attribute of that name exists
    /// (`<details>` → `<details open>`).
    EnsureBareAttr { attr: &'static str },
    /// Replace an attribute value, matched case-insensitively
    /// (`aria-expanded="false"` → `aria-expanded="true"`).
    ReplaceAttrValue {
        attr: &'static str,
        from: &'static str,
        to: &'static str,
    },
    /// Append a class token unless one of `satisfied_by` is already present
    /// as a whole token; synthesizes a `class` attribute when none exists.
    EnsureClassToken {
        token: &'static str,
        satisfied_by: &'static [&'static str],
    },
    /// Strip a class token (cleanup of state classes wrongly carried by
    /// answer-role elements).
    RemoveClassToken { token: &'static str },
}

/// A declarative match+mutate unit applied to start tags.
#[derive(Clone, Copy, Debug)]
pub struct Rule {
    pub name: &'static str,
    /// Tag name the rule is limited to; None matches any start tag.
    pub tag: Option<&'static str>,
    /// Substring the `class` value must contain (case-insensitive).
    pub class_contains: Option<&'static str>,
    /// Substrings that disqualify a `class` value even when it matched.
    pub class_excludes: &'static [&'static str],
    pub action: Action,
}

impl Rule {
    /// Surface-syntax match: does this start tag fall under the rule?
    pub fn matches(&self, tag: &str) -> bool {
        if let Some(want) = self.tag {
            if !parse_tag(tag).name.eq_ignore_ascii_case(want) {
                return false;
            }
        }
        if let Some(needle) = self.class_contains {
            let Some(class) = attr_value(tag, "class") else {
                return false;
            };
            if !contains_ci(class, needle) {
                return false;
            }
            for ex in self.class_excludes {
                if contains_ci(class, ex) {
                    return false;
                }
            }
        }
        true
    }

    /// Rewrite the tag if it is not already in the desired state.
    /// Returns None when nothing needs to change.
    pub fn apply(&self, tag: &str) -> Option<String> {
        match self.action {
            Action::EnsureBareAttr { attr } => {
                if find_attr(tag, attr).is_some() {
                    return None;
                }
                let ip = insert_point(tag);
                Some(format!("{} {}{}", tag[..ip].trim_end(), attr, &tag[ip..]))
            }
            Action::ReplaceAttrValue { attr, from, to } => {
                let a = find_attr(tag, attr)?;
                let range = a.value?;
                if !tag[range.clone()].eq_ignore_ascii_case(from) {
                    return None;
                }
                Some(format!("{}{}{}", &tag[..range.start], to, &tag[range.end..]))
            }
            Action::EnsureClassToken {
                token,
                satisfied_by,
            } => match find_attr(tag, "class") {
                Some(a) => {
                    let range = a.value?;
                    let class = &tag[range.clone()];
                    if satisfied_by.iter().any(|t| has_class_token(class, t)) {
                        return None;
                    }
                    let new_class = if class.trim().is_empty() {
                        token.to_string()
                    } else {
                        format!("{class} {token}")
                    };
                    Some(format!(
                        "{}{}{}",
                        &tag[..range.start],
                        new_class,
                        &tag[range.end..]
                    ))
                }
                None => {
                    let ip = insert_point(tag);
                    Some(format!(
                        "{} class=\"{}\"{}",
                        tag[..ip].trim_end(),
                        token,
                        &tag[ip..]
                    ))
                }
            },
            Action::RemoveClassToken { token } => {
                let a = find_attr(tag, "class")?;
                let range = a.value?;
                let class = &tag[range.clone()];
                if !has_class_token(class, token) {
                    return None;
                }
                let kept: Vec<&str> = class
                    .split_ascii_whitespace()
                    .filter(|t| !t.eq_ignore_ascii_case(token))
                    .collect();
                Some(format!(
                    "{}{}{}",
                    &tag[..range.start],
                    kept.join(" "),
                    &tag[range.end..]
                ))
            }
        }
    }
}

/// The accordion/FAQ expansion rule set. Within one tag, rules apply in
/// table order; across tags and files order does not matter.
pub const DEFAULT_RULES: &[Rule] = &[
    Rule {
        name: "details-open",
        tag: Some("details"),
        class_contains: None,
        class_excludes: &[],
        action: Action::EnsureBareAttr { attr: "open" },
    },
    Rule {
        name: "aria-expanded",
        tag: None,
        class_contains: None,
        class_excludes: &[],
        action: Action::ReplaceAttrValue {
            attr: "aria-expanded",
            from: "false",
            to: "true",
        },
    },
    Rule {
        name: "panel-show",
        tag: Some("div"),
        class_contains: Some("ac-panel"),
        class_excludes: &[],
        action: Action::EnsureClassToken {
            token: "kst-show",
            satisfied_by: &["kst-show", "show"],
        },
    },
    Rule {
        name: "faq-active",
        tag: Some("div"),
        class_contains: Some("faq"),
        class_excludes: &["answer"],
        action: Action::EnsureClassToken {
            token: "kst-active",
            satisfied_by: &["kst-active", "active"],
        },
    },
    Rule {
        name: "answer-cleanup",
        tag: Some("div"),
        class_contains: Some("faq-answer"),
        class_excludes: &[],
        action: Action::RemoveClassToken { token: "kst-active" },
    },
];
