// src/engine.rs
//
// One pass over a document: locate tags (quote-aware), apply every matching
// rule to each start tag, and emit everything else verbatim. Comments and
// raw-text element bodies (script, style, textarea, xmp) are copied through
// untouched so markup-looking text inside them is never rewritten.
//
// Counters are explicit return values (FileOutcome), not ambient state.

use std::collections::BTreeMap;

use memchr::{memchr, memmem};

use crate::rules::{Action, Rule};
use crate::tag::{find_tag_end, parse_tag};

/// Counter key for the toggle-glyph rewrite; not a table rule because it
/// edits a text node, not a tag.
pub const TOGGLE_GLYPH: &str = "toggle-glyph";

/// How far past an expanded trigger tag the engine will look for its
/// `<span>+</span>` toggle glyph.
const GLYPH_WINDOW: usize = 300;

/// Per-document result: mutation counts keyed by rule name, plus whether
/// any byte changed.
#[derive(Debug, Default)]
pub struct FileOutcome {
    pub counts: BTreeMap<&'static str, u64>,
    pub changed: bool,
}

impl FileOutcome {
    fn bump(&mut self, name: &'static str) {
        *self.counts.entry(name).or_insert(0) += 1;
        self.changed = true;
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }
}

fn is_raw_text(name: &str) -> bool {
    ["script", "style", "textarea", "xmp"]
        .iter()
        .any(|&s| name.eq_ignore_ascii_case(s))
}

/// Copy bytes verbatim from `from` up to and including the matching
/// `</name>` end tag. Returns the index after the end tag, or the document
/// length if the element never closes.
fn copy_raw_text(src: &str, from: usize, name: &str, out: &mut String) -> usize {
    let bytes = src.as_bytes();
    let mut j = from;
    while let Some(off) = memchr(b'<', &bytes[j..]) {
        let lt = j + off;
        if bytes.get(lt + 1) == Some(&b'/') {
            if let Some(gt) = find_tag_end(bytes, lt) {
                let info = parse_tag(&src[lt..=gt]);
                if info.is_end && info.name.eq_ignore_ascii_case(name) {
                    out.push_str(&src[from..=gt]);
                    return gt + 1;
                }
            }
        }
        j = lt + 1;
    }
    out.push_str(&src[from..]);
    src.len()
}

/// Match a toggle glyph after a `<span>` tag ending at `span_tag_end`: a text
/// node whose sole content is `+` (or fullwidth `＋`) followed by `</span>`.
/// Returns (start of the closing tag, index past it).
fn match_glyph(src: &str, span_tag_end: usize) -> Option<(usize, usize)> {
    let bytes = src.as_bytes();
    let text_start = span_tag_end + 1;
    let off = memchr(b'<', &bytes[text_start..])?;
    let text_end = text_start + off;
    let text = src[text_start..text_end].trim();
    if text != "+" && text != "＋" {
        return None;
    }
    if bytes.get(text_end + 1) != Some(&b'/') {
        return None;
    }
    let close_gt = find_tag_end(bytes, text_end)?;
    let close = parse_tag(&src[text_end..=close_gt]);
    if !close.is_end || !close.name.eq_ignore_ascii_case("span") {
        return None;
    }
    Some((text_end, close_gt + 1))
}

/// Apply the rule table to one document, returning the rewritten text and
/// per-rule mutation counts. Applying the result a second time yields the
/// same text and an all-zero outcome.
pub fn apply_rules(src: &str, rules: &[Rule]) -> (String, FileOutcome) {
    let bytes = src.as_bytes();
    let n = bytes.len();
    let mut out = String::with_capacity(n + n / 16 + 64);
    let mut outcome = FileOutcome::default();

    // Absolute byte limit of an active toggle-glyph search, if any.
    let mut glyph_hunt: Option<usize> = None;

    let mut i = 0usize;
    while i < n {
        let Some(off) = memchr(b'<', &bytes[i..]) else {
            out.push_str(&src[i..]);
            break;
        };
        let lt = i + off;
        out.push_str(&src[i..lt]);

        if let Some(limit) = glyph_hunt {
            if lt >= limit {
                glyph_hunt = None;
            }
        }

        // Comments pass through whole.
        if src[lt..].starts_with("<!--") {
            match memmem::find(&bytes[lt + 4..], b"-->") {
                Some(p) => {
                    let end = lt + 4 + p + 3;
                    out.push_str(&src[lt..end]);
                    i = end;
                    continue;
                }
                None => {
                    out.push_str(&src[lt..]);
                    break;
                }
            }
        }

        let Some(gt) = find_tag_end(bytes, lt) else {
            // Unterminated tag; emit the rest verbatim.
            out.push_str(&src[lt..]);
            break;
        };
        let tag = &src[lt..=gt];
        let info = parse_tag(tag);

        // End tags, doctypes, and processing instructions pass through.
        if info.is_end || info.name.is_empty() {
            out.push_str(tag);
            i = gt + 1;
            continue;
        }

        // Rule application; later rules see earlier rules' rewrites.
        let mut current = String::new();
        let mut rewritten = false;
        let mut expanded_now = false;
        for rule in rules {
            let view = if rewritten { current.as_str() } else { tag };
            if !rule.matches(view) {
                continue;
            }
            if let Some(new_tag) = rule.apply(view) {
                current = new_tag;
                rewritten = true;
                outcome.bump(rule.name);
                if matches!(
                    rule.action,
                    Action::ReplaceAttrValue {
                        attr: "aria-expanded",
                        ..
                    }
                ) {
                    expanded_now = true;
                }
            }
        }
        let final_tag = if rewritten { current.as_str() } else { tag };
        out.push_str(final_tag);

        // Pending toggle-glyph search: a `<span>` holding a lone `+`.
        if glyph_hunt.is_some() && info.name.eq_ignore_ascii_case("span") {
            if let Some((close_start, resume)) = match_glyph(src, gt) {
                out.push_str("−");
                out.push_str(&src[close_start..resume]);
                outcome.bump(TOGGLE_GLYPH);
                glyph_hunt = None;
                i = resume;
                continue;
            }
        }

        // Only a trigger expanded on this run arms the glyph search; an
        // already-true trigger keeps whatever glyph it has.
        if expanded_now {
            glyph_hunt = Some(gt + 1 + GLYPH_WINDOW);
        }

        i = gt + 1;

        if is_raw_text(info.name) {
            i = copy_raw_text(src, i, info.name, &mut out);
            glyph_hunt = None;
        }
    }

    (out, outcome)
}
