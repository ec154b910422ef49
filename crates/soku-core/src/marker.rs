//! Slot marker scanner.
//!
//! Template markup is opaque text with embedded markers of the form `<<k>>`:
//! `<<`, optional whitespace, one or more decimal digits, optional whitespace,
//! `>>`. There is no escaping. A digit run too large for `usize` is not a
//! marker and stays literal text.

use std::collections::BTreeSet;
use winnow::ascii::{digit1, multispace0};
use winnow::combinator::delimited;
use winnow::prelude::*;

/// A marker occurrence inside a markup string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker {
    /// Byte offset of the opening `<<`.
    pub start: usize,
    /// Byte offset one past the closing `>>`.
    pub end: usize,
    /// The zero-based slot index the marker refers to.
    pub index: usize,
}

fn parse_marker(input: &mut &str) -> ModalResult<usize> {
    delimited(
        ("<<", multispace0),
        digit1.try_map(str::parse::<usize>),
        (multispace0, ">>"),
    )
    .parse_next(input)
}

/// Find every marker in `markup`, left to right, non-overlapping.
pub fn find_markers(markup: &str) -> Vec<Marker> {
    let mut markers = Vec::new();
    let mut offset = 0;

    while let Some(rel) = markup[offset..].find("<<") {
        let start = offset + rel;
        let mut rest = &markup[start..];
        match parse_marker.parse_next(&mut rest) {
            Ok(index) => {
                let end = markup.len() - rest.len();
                markers.push(Marker { start, end, index });
                offset = end;
            }
            // `<` is ASCII, so stepping one byte stays on a char boundary
            Err(_) => offset = start + 1,
        }
    }

    markers
}

/// Whether `markup` contains at least one marker.
pub fn has_markers(markup: &str) -> bool {
    !find_markers(markup).is_empty()
}

/// The set of slot indices referenced by `markup`.
pub fn referenced_indices(markup: &str) -> BTreeSet<usize> {
    find_markers(markup).into_iter().map(|m| m.index).collect()
}

/// The largest slot index referenced by `markup`, if any.
pub fn max_index(markup: &str) -> Option<usize> {
    find_markers(markup).into_iter().map(|m| m.index).max()
}

/// Replace every marker in a single pass.
///
/// `substitute` receives the marker's slot index; returning `None` leaves the
/// marker text untouched. Substituted text is never rescanned, so a value that
/// itself looks like a marker is emitted verbatim.
pub fn replace_markers<F>(markup: &str, mut substitute: F) -> String
where
    F: FnMut(usize) -> Option<String>,
{
    let markers = find_markers(markup);
    if markers.is_empty() {
        return markup.to_string();
    }

    let mut out = String::with_capacity(markup.len() + markers.len() * 16);
    let mut cursor = 0;
    for marker in markers {
        out.push_str(&markup[cursor..marker.start]);
        match substitute(marker.index) {
            Some(text) => out.push_str(&text),
            None => out.push_str(&markup[marker.start..marker.end]),
        }
        cursor = marker.end;
    }
    out.push_str(&markup[cursor..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_plain_markers() {
        let markers = find_markers(r"\frac{<<0>>}{<<1>>}");
        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].index, 0);
        assert_eq!(markers[1].index, 1);
        assert_eq!(markers[0].start, 6);
        assert_eq!(markers[0].end, 11);
    }

    #[test]
    fn allows_whitespace_inside_marker() {
        let markers = find_markers("<< 3 >> + <<\t12\n>>");
        let indices: Vec<usize> = markers.iter().map(|m| m.index).collect();
        assert_eq!(indices, vec![3, 12]);
    }

    #[test]
    fn rejects_malformed_markers() {
        assert!(find_markers("<<>>").is_empty());
        assert!(find_markers("<<a>>").is_empty());
        assert!(find_markers("<<1>").is_empty());
        assert!(find_markers("< <1>>").is_empty());
        assert!(find_markers("<<-1>>").is_empty());
    }

    #[test]
    fn recovers_after_stray_angle_brackets() {
        let markers = find_markers("a <<< <<<2>> b");
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].index, 2);
    }

    #[test]
    fn overflowing_index_is_literal() {
        let huge = "<<99999999999999999999999999>>";
        assert!(find_markers(huge).is_empty());
        assert_eq!(replace_markers(huge, |_| Some("x".into())), huge);
    }

    #[test]
    fn replace_leaves_unresolved_markers() {
        let out = replace_markers("<<0>> and <<5>>", |k| (k == 0).then(|| "a".to_string()));
        assert_eq!(out, "a and <<5>>");
    }

    #[test]
    fn replace_does_not_rescan_substitutions() {
        let out = replace_markers("<<0>><<1>>", |k| Some(format!("<<{}>>", k + 1)));
        assert_eq!(out, "<<1>><<2>>");
    }

    #[test]
    fn referenced_and_max_index() {
        let src = "<<2>> <<0>> <<2>>";
        assert_eq!(referenced_indices(src).into_iter().collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(max_index(src), Some(2));
        assert_eq!(max_index("x^2"), None);
        assert!(!has_markers("x^2"));
    }

    #[test]
    fn non_ascii_markup_is_scanned_safely() {
        let out = replace_markers("α<<0>>β", |_| Some("γ".into()));
        assert_eq!(out, "αγβ");
    }
}
