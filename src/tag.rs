// src/tag.rs
//
// Byte-level, quote-aware scanning of HTML tags.
//
// This is deliberately not a DOM parse: tags are located and rewritten in
// place and every byte outside a rewritten tag is left untouched. Attribute
// matching is structural (parsed name/value pairs, whole class tokens), so
// attributes spanning multiple lines, single-quoted values, and unusual
// attribute ordering are all handled without line-based pattern matching.

use std::ops::Range;

#[inline]
fn is_ws(b: u8) -> bool {
    b == b' ' || b == b'\t' || b == b'\n' || b == b'\r'
}

#[inline]
fn is_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b':'
}

/// Find the '>' closing a tag that starts at `i` (`s[i] == '<'`), skipping
/// quoted attribute values.
pub fn find_tag_end(s: &[u8], mut i: usize) -> Option<usize> {
    let n = s.len();
    i += 1;
    let mut quote: u8 = 0;
    while i < n {
        let b = s[i];
        if quote != 0 {
            if b == quote {
                quote = 0;
            }
        } else if b == b'"' || b == b'\'' {
            quote = b;
        } else if b == b'>' {
            return Some(i);
        }
        i += 1;
    }
    None
}

/// Parsed surface of one `<...>` span. `name` is empty for doctypes and
/// other non-element markup, which callers pass through verbatim.
#[derive(Clone, Copy, Debug)]
pub struct TagInfo<'a> {
    pub name: &'a str,
    pub is_end: bool,
}

/// Extract tag name and end flag from a raw `<...>` slice.
pub fn parse_tag(tag: &str) -> TagInfo<'_> {
    let bytes = tag.as_bytes();
    let n = bytes.len();
    let mut i = 1;

    let mut is_end = false;
    if i < n && bytes[i] == b'/' {
        is_end = true;
        i += 1;
    }
    while i < n && is_ws(bytes[i]) {
        i += 1;
    }
    let start = i;
    while i < n && is_name_char(bytes[i]) {
        i += 1;
    }
    TagInfo {
        name: &tag[start..i],
        is_end,
    }
}

/// One attribute inside a start tag. Ranges index into the raw tag slice;
/// `value` excludes the surrounding quotes when the value is quoted.
#[derive(Clone, Debug)]
pub struct Attr {
    pub name: Range<usize>,
    pub value: Option<Range<usize>>,
}

/// Iterator over the attributes of a start tag: `[name] ('=' [value])?`,
/// where the value may be double-quoted, single-quoted, or unquoted.
pub struct Attrs<'a> {
    tag: &'a [u8],
    i: usize,
}

/// Iterate the attributes of a raw `<...>` slice, skipping the tag name.
pub fn attrs(tag: &str) -> Attrs<'_> {
    let bytes = tag.as_bytes();
    let mut i = 1usize;
    let n = bytes.len();
    if i < n && bytes[i] == b'/' {
        i += 1;
    }
    while i < n && is_ws(bytes[i]) {
        i += 1;
    }
    while i < n && is_name_char(bytes[i]) {
        i += 1;
    }
    Attrs { tag: bytes, i }
}

impl<'a> Iterator for Attrs<'a> {
    type Item = Attr;

    fn next(&mut self) -> Option<Attr> {
        let tag = self.tag;
        let n = tag.len();
        let mut i = self.i;

        loop {
            while i < n && (is_ws(tag[i]) || tag[i] == b'/') {
                i += 1;
            }
            if i >= n || tag[i] == b'>' {
                self.i = i;
                return None;
            }
            if !is_name_char(tag[i]) {
                // Not a valid name start; advance to avoid infinite loops.
                i += 1;
                continue;
            }

            let name_start = i;
            while i < n && is_name_char(tag[i]) {
                i += 1;
            }
            let name = name_start..i;

            while i < n && is_ws(tag[i]) {
                i += 1;
            }

            let mut value = None;
            if i < n && tag[i] == b'=' {
                i += 1;
                while i < n && is_ws(tag[i]) {
                    i += 1;
                }
                if i < n && (tag[i] == b'"' || tag[i] == b'\'') {
                    let q = tag[i];
                    i += 1;
                    let v_start = i;
                    while i < n && tag[i] != q {
                        i += 1;
                    }
                    value = Some(v_start..i);
                    if i < n {
                        i += 1; // past the closing quote
                    }
                } else {
                    let v_start = i;
                    while i < n && !is_ws(tag[i]) && tag[i] != b'>' {
                        i += 1;
                    }
                    value = Some(v_start..i);
                }
            }

            self.i = i;
            return Some(Attr { name, value });
        }
    }
}

/// Locate an attribute by name (ASCII case-insensitive).
pub fn find_attr(tag: &str, name: &str) -> Option<Attr> {
    attrs(tag).find(|a| tag[a.name.clone()].eq_ignore_ascii_case(name))
}

/// The value of an attribute, if present with a value.
pub fn attr_value<'t>(tag: &'t str, name: &str) -> Option<&'t str> {
    let attr = find_attr(tag, name)?;
    attr.value.map(|r| &tag[r])
}

/// Index just before the closing '>' (before a trailing '/' for `.../>`),
/// where new attribute text can be spliced in.
pub fn insert_point(tag: &str) -> usize {
    let bytes = tag.as_bytes();
    let mut i = bytes.len();
    if i > 0 && bytes[i - 1] == b'>' {
        i -= 1;
    }
    if i > 0 && bytes[i - 1] == b'/' {
        i -= 1;
    }
    i
}

/// Whole-token membership test on a space-separated class value
/// (ASCII case-insensitive).
pub fn has_class_token(value: &str, token: &str) -> bool {
    value
        .split_ascii_whitespace()
        .any(|t| t.eq_ignore_ascii_case(token))
}

/// ASCII case-insensitive substring test, used for the deliberately loose
/// class-value match patterns (`ac-panel`, `faq`, ...).
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    let h = haystack.as_bytes();
    let n = needle.as_bytes();
    if n.is_empty() {
        return true;
    }
    if h.len() < n.len() {
        return false;
    }
    h.windows(n.len()).any(|w| w.eq_ignore_ascii_case(n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_end_skips_quoted_gt() {
        let s = br#"<div title="a > b" class="x">text"#;
        let end = find_tag_end(s, 0).unwrap();
        assert_eq!(s[end], b'>');
        assert_eq!(end, s.len() - 5);
    }

    #[test]
    fn parse_start_and_end_tags() {
        let t = parse_tag("<details open>");
        assert_eq!(t.name, "details");
        assert!(!t.is_end);

        let t = parse_tag("</ div>");
        assert_eq!(t.name, "div");
        assert!(t.is_end);

        let t = parse_tag("<!doctype html>");
        assert_eq!(t.name, "");
    }

    #[test]
    fn attrs_over_multiple_lines_and_quote_styles() {
        let tag = "<div\n  id='q1'\n  class=\"kst-faq\"\n  aria-expanded = false>";
        let pairs: Vec<(String, Option<String>)> = attrs(tag)
            .map(|a| {
                (
                    tag[a.name].to_string(),
                    a.value.map(|r| tag[r].to_string()),
                )
            })
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("id".to_string(), Some("q1".to_string())),
                ("class".to_string(), Some("kst-faq".to_string())),
                ("aria-expanded".to_string(), Some("false".to_string())),
            ]
        );
    }

    #[test]
    fn bare_attribute_has_no_value() {
        let tag = "<details open>";
        let attr = find_attr(tag, "open").unwrap();
        assert!(attr.value.is_none());
        assert_eq!(attr_value(tag, "open"), None);
    }

    #[test]
    fn attr_name_is_not_a_substring_match() {
        // "opened" must not satisfy a lookup for "open".
        assert!(find_attr("<details opened=\"x\">", "open").is_none());
    }

    #[test]
    fn insert_point_handles_self_closing() {
        assert_eq!(insert_point("<details>"), 8);
        assert_eq!(insert_point("<br/>"), 3);
    }

    #[test]
    fn class_tokens_are_whole_words() {
        assert!(has_class_token("ac-panel kst-show", "kst-show"));
        assert!(has_class_token("ac-panel SHOW", "show"));
        // "kst-show" contains "show" as a substring but not as a token.
        assert!(!has_class_token("ac-panel kst-show", "show"));
    }

    #[test]
    fn substring_match_is_case_insensitive() {
        assert!(contains_ci("KST-FAQ-Answer", "faq-answer"));
        assert!(!contains_ci("kst-ac-item", "faq"));
    }
}
