//! UTF-16 grapheme and emoji helpers.
//!
//! Text field offsets are UTF-16 code unit indices. These helpers segment a
//! UTF-16 slice into extended grapheme clusters (via `unicode-segmentation`)
//! and answer boundary questions in code units, so edits never split a
//! surrogate pair or an emoji sequence.
//!
//! Unpaired surrogates decode to U+FFFD, which is itself one code unit long,
//! so cluster offsets always line up with the original slice.

use std::ops::Range;

use unicode_segmentation::UnicodeSegmentation;

const ZERO_WIDTH_JOINER: char = '\u{200D}';
const VARIATION_SELECTOR_16: char = '\u{FE0F}';
const COMBINING_KEYCAP: char = '\u{20E3}';

/// Code units segmented on each side of an index before widening.
const CLUSTER_WINDOW: usize = 32;

/// Encodes `text` as UTF-16.
pub fn to_utf16(text: &str) -> Vec<u16> {
    text.encode_utf16().collect()
}

/// Decodes UTF-16, replacing unpaired surrogates with U+FFFD.
pub fn from_utf16(units: &[u16]) -> String {
    String::from_utf16_lossy(units)
}

/// Code unit ranges of every grapheme cluster in `text`, in order.
pub fn cluster_ranges(text: &[u16]) -> Vec<Range<usize>> {
    let decoded = from_utf16(text);
    let mut ranges = Vec::new();
    let mut offset = 0;
    for grapheme in decoded.graphemes(true) {
        let len = grapheme.encode_utf16().count();
        ranges.push(offset..offset + len);
        offset += len;
    }
    ranges
}

/// Returns `true` if `index` falls between two clusters (or at either end).
pub fn is_cluster_boundary(text: &[u16], index: usize) -> bool {
    if index == 0 || index >= text.len() {
        return index <= text.len();
    }
    cluster_at(text, index).is_none_or(|range| range.start == index)
}

/// Returns `true` unless `index` sits between a high and a low surrogate.
pub fn is_code_point_boundary(text: &[u16], index: usize) -> bool {
    if index == 0 || index >= text.len() {
        return true;
    }
    !(is_high_surrogate(text[index - 1]) && is_low_surrogate(text[index]))
}

fn is_high_surrogate(unit: u16) -> bool {
    (0xD800..=0xDBFF).contains(&unit)
}

fn is_low_surrogate(unit: u16) -> bool {
    (0xDC00..=0xDFFF).contains(&unit)
}

/// The cluster that starts at or contains `index`.
///
/// Only a window around `index` is segmented. Its edges sit where two plain
/// Latin characters meet, which is always a cluster boundary; when none is
/// found nearby the window runs to that end of the buffer.
pub fn cluster_at(text: &[u16], index: usize) -> Option<Range<usize>> {
    if index >= text.len() {
        return None;
    }
    let from = window_start(text, index);
    let to = window_end(text, index + 1);
    cluster_ranges(&text[from..to])
        .into_iter()
        .map(|range| range.start + from..range.end + from)
        .find(|range| range.start <= index && index < range.end)
}

fn window_start(text: &[u16], index: usize) -> usize {
    let near = index.saturating_sub(CLUSTER_WINDOW);
    let far = index.saturating_sub(2 * CLUSTER_WINDOW);
    (far..=near)
        .rev()
        .find(|&at| is_plain_break(text, at))
        .unwrap_or(0)
}

fn window_end(text: &[u16], index: usize) -> usize {
    let near = index.saturating_add(CLUSTER_WINDOW).min(text.len());
    let far = index.saturating_add(2 * CLUSTER_WINDOW).min(text.len());
    (near..=far)
        .find(|&at| is_plain_break(text, at))
        .unwrap_or(text.len())
}

/// `true` between two printable Latin characters, or at either end.
fn is_plain_break(text: &[u16], at: usize) -> bool {
    if at == 0 || at >= text.len() {
        return true;
    }
    let plain = |unit: u16| (0x20..0x300).contains(&unit);
    plain(text[at - 1]) && plain(text[at])
}

/// The cluster that ends at or contains `index`, i.e. the one holding the
/// code unit just before `index`.
pub fn cluster_before(text: &[u16], index: usize) -> Option<Range<usize>> {
    if index == 0 {
        return None;
    }
    cluster_at(text, index - 1)
}

/// Largest cluster boundary not greater than `index`.
pub fn floor_boundary(text: &[u16], index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    cluster_at(text, index).map_or(index, |range| range.start)
}

/// Smallest cluster boundary not less than `index`.
pub fn ceil_boundary(text: &[u16], index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    match cluster_at(text, index) {
        Some(range) if range.start == index => index,
        Some(range) => range.end,
        None => index,
    }
}

/// Length of the longest cluster-aligned prefix of `text` that fits in
/// `max_units` code units.
pub fn boundary_prefix_len(text: &[u16], max_units: usize) -> usize {
    if max_units >= text.len() {
        return text.len();
    }
    floor_boundary(text, max_units)
}

/// Resolves `[start, start + length)` onto cluster boundaries.
///
/// An edge that falls inside a cluster moves outward (taking the whole
/// cluster) when the matching `include_*_half` flag is set, inward otherwise.
pub fn sub_range(
    text: &[u16],
    start: usize,
    length: usize,
    include_start_half: bool,
    include_end_half: bool,
) -> Range<usize> {
    let start = start.min(text.len());
    let end = start.saturating_add(length).min(text.len());
    let start = if include_start_half {
        floor_boundary(text, start)
    } else {
        ceil_boundary(text, start)
    };
    let end = if include_end_half {
        ceil_boundary(text, end)
    } else {
        floor_boundary(text, end)
    };
    start..end.max(start)
}

/// Length in code units of the cluster after (`forward`) or before `index`.
pub fn grapheme_cluster_length(text: &[u16], index: usize, forward: bool) -> usize {
    let cluster = if forward {
        cluster_at(text, index)
    } else {
        cluster_before(text, index)
    };
    cluster.map_or(0, |range| range.len())
}

fn is_emoji_char(c: char) -> bool {
    matches!(
        c as u32,
        0x00A9
            | 0x00AE
            | 0x203C
            | 0x2049
            | 0x2122
            | 0x2139
            | 0x2194..=0x21AA
            | 0x231A..=0x23FF
            | 0x24C2
            | 0x25AA..=0x25FE
            | 0x2600..=0x27BF
            | 0x2934..=0x2935
            | 0x2B05..=0x2B55
            | 0x3030
            | 0x303D
            | 0x3297
            | 0x3299
            | 0x1F000..=0x1FAFF
            | 0xE0020..=0xE007F
    ) || matches!(c, ZERO_WIDTH_JOINER | VARIATION_SELECTOR_16 | COMBINING_KEYCAP)
}

/// Returns `true` if the cluster contains an emoji scalar or an emoji
/// presentation/joiner mark.
pub fn is_emoji_cluster(cluster: &[u16]) -> bool {
    char::decode_utf16(cluster.iter().copied())
        .filter_map(Result::ok)
        .any(is_emoji_char)
}

/// `true` if the cluster starting at or containing `index` is an emoji.
pub fn is_index_before_or_in_emoji(text: &[u16], index: usize) -> bool {
    cluster_at(text, index).is_some_and(|range| is_emoji_cluster(&text[range]))
}

/// `true` if the cluster ending at or containing `index` is an emoji.
pub fn is_index_after_or_in_emoji(text: &[u16], index: usize) -> bool {
    cluster_before(text, index).is_some_and(|range| is_emoji_cluster(&text[range]))
}
