//! The text buffer of a field and the filtering applied to every edit.

use std::{
    ops::Range,
    sync::{Arc, Weak},
};

use tracing::{debug, info};

use super::{
    ai::{AI_TEXT_RANGE, AnalysisWindow},
    emoji::{self, from_utf16, to_utf16},
    host::TextEditHost,
    input_filter::{FilterOutcome, FilterSettings, TextInputType, filter_text},
};

/// Code units inspected on each side of an index for emoji membership.
const EMOJI_RANGE: usize = 150;

/// Owns the UTF-16 buffer of one field.
///
/// Every mutation goes through the host's [`FilterSettings`]: duplicate
/// `@`/`.` handling, the input-type or custom allow-list, and the max-length
/// cut, which never splits a grapheme cluster. Characters dropped by an
/// allow-list are reported through [`TextEditHost::on_input_filter_error`].
pub struct ContentController {
    content: Vec<u16>,
    insert_value: Vec<u16>,
    host: Weak<dyn TextEditHost>,
    truncated: bool,
}

impl ContentController {
    /// Creates an empty buffer bound to `host`.
    pub fn new(host: Weak<dyn TextEditHost>) -> Self {
        Self {
            content: Vec::new(),
            insert_value: Vec::new(),
            host,
            truncated: false,
        }
    }

    fn settings(&self) -> Option<(Arc<dyn TextEditHost>, FilterSettings)> {
        let Some(host) = self.host.upgrade() else {
            debug!("text edit host dropped, skipping filters");
            return None;
        };
        let settings = host.filter_settings();
        Some((host, settings))
    }

    /// Orders two indices and clamps them into the buffer.
    pub fn format_index(&self, start: i32, end: i32) -> (usize, usize) {
        let len = self.content.len() as i32;
        let start = start.clamp(0, len) as usize;
        let end = end.clamp(0, len) as usize;
        (start.min(end), start.max(end))
    }

    fn snap_to_clusters(&self, start: i32, end: i32) -> (usize, usize) {
        let (start, end) = self.format_index(start, end);
        let snapped = emoji::floor_boundary(&self.content, start);
        if start == end {
            return (snapped, snapped);
        }
        (snapped, emoji::ceil_boundary(&self.content, end))
    }

    /// Inserts `value` at `index`. Same as replacing an empty selection.
    pub fn insert_value(&mut self, index: i32, value: &str) -> bool {
        self.replace_selected_value(index, index, value)
    }

    /// Replaces `[start, end)` with `value`, running the filter pipeline.
    ///
    /// Returns `true` if non-empty text was inserted. A single keystroke that
    /// the filters eat restores the previous buffer and returns `false`.
    pub fn replace_selected_value(&mut self, start: i32, end: i32, value: &str) -> bool {
        let (start, end) = self.snap_to_clusters(start, end);
        let value = to_utf16(value);
        self.truncated = false;
        let processed = self.preprocess_string(start, end, &value);

        let previous = self.content.clone();
        self.content.splice(start..end, processed.iter().copied());
        let spliced_len = self.content.len();
        self.filter_value();
        self.insert_value = processed;

        if value.len() == 1 && self.content.len() < spliced_len {
            debug!(index = start, "single character rejected, restoring buffer");
            self.content = previous;
            self.insert_value.clear();
        }
        !self.insert_value.is_empty()
    }

    fn preprocess_string(&mut self, start: usize, end: usize, value: &[u16]) -> Vec<u16> {
        let Some((_, settings)) = self.settings() else {
            return value.to_vec();
        };
        let mut processed = value.to_vec();

        if settings.input_filter.is_none() {
            let unique = match settings.input_type {
                TextInputType::NumberDecimal => Some(u16::from(b'.')),
                TextInputType::EmailAddress => Some(u16::from(b'@')),
                _ => None,
            };
            if let Some(unit) = unique {
                let outside = self.content[..start].contains(&unit)
                    || self.content[end..].contains(&unit);
                if outside {
                    processed.retain(|&candidate| candidate != unit);
                }
            }
        }

        if let Some(max_length) = settings.max_length {
            let allowed = (max_length + (end - start)).saturating_sub(self.content.len());
            if processed.len() > allowed {
                let cut = emoji::boundary_prefix_len(&processed, allowed);
                processed.truncate(cut);
                self.truncated = true;
            }
        }
        processed
    }

    /// Re-runs the filters over the whole buffer, then enforces the max
    /// length. Idempotent on already-filtered content.
    pub fn filter_value(&mut self) {
        let Some((host, settings)) = self.settings() else {
            return;
        };
        let text = from_utf16(&self.content);
        let outcome = filter_text(&text, &settings);
        if !outcome.rejected.is_empty() {
            report_rejected(host.as_ref(), &settings, &outcome.rejected);
        }
        if outcome.text != text {
            self.content = to_utf16(&outcome.text);
        }

        if let Some(max_length) = settings.max_length {
            if self.content.len() > max_length {
                let cut = emoji::boundary_prefix_len(&self.content, max_length);
                self.content.truncate(cut);
                self.truncated = true;
            }
        }
    }

    /// Filters a candidate string without touching the buffer or firing
    /// events.
    pub fn filter_value_type(&self, value: &str) -> FilterOutcome {
        match self.settings() {
            Some((_, settings)) => filter_text(value, &settings),
            None => FilterOutcome {
                text: value.to_owned(),
                rejected: String::new(),
            },
        }
    }

    /// Text in `[start, end)`, widened to whole clusters when either end
    /// falls inside one.
    pub fn get_selected_value(&self, start: i32, end: i32) -> String {
        from_utf16(&self.content[self.cluster_range(start, end)])
    }

    fn cluster_range(&self, start: i32, end: i32) -> Range<usize> {
        let (start, end) = self.format_index(start, end);
        if emoji::is_cluster_boundary(&self.content, start)
            && emoji::is_cluster_boundary(&self.content, end)
        {
            return start..end;
        }
        emoji::sub_range(&self.content, start, end - start, true, true)
    }

    /// Removes up to `length` code units at `start`, widened so a surrogate
    /// pair is never split.
    pub fn erase(&mut self, start: i32, length: i32) {
        let len = self.content.len() as i32;
        if start < 0 || start >= len || length <= 0 {
            return;
        }
        let mut from = start as usize;
        let mut to = (start.saturating_add(length)).min(len) as usize;
        if !emoji::is_code_point_boundary(&self.content, from) {
            from -= 1;
        }
        if !emoji::is_code_point_boundary(&self.content, to) {
            to += 1;
        }
        self.content.drain(from..to);
    }

    /// Deletes `length` code units before (`is_backward`) or after `start`,
    /// taking whole clusters when the range cuts one. Returns the number of
    /// code units removed.
    pub fn delete(&mut self, start: i32, length: i32, is_backward: bool) -> i32 {
        if length <= 0 || self.content.is_empty() {
            return 0;
        }
        let len = self.content.len();
        let start = start.clamp(0, len as i32) as usize;
        let length = length as usize;
        let (from, to) = if is_backward {
            (start.saturating_sub(length), start)
        } else {
            (start, start.saturating_add(length).min(len))
        };
        if from == to {
            return 0;
        }
        let range = if emoji::is_cluster_boundary(&self.content, from)
            && emoji::is_cluster_boundary(&self.content, to)
        {
            from..to
        } else {
            emoji::sub_range(&self.content, from, to - from, true, true)
        };
        let deleted = range.len();
        self.content.drain(range);
        deleted as i32
    }

    /// `true` if the cluster at `index` is an emoji. Only a window around
    /// `index` is segmented.
    pub fn is_index_before_or_in_emoji(&self, index: i32) -> bool {
        let len = self.content.len();
        let Ok(index) = usize::try_from(index) else {
            return false;
        };
        if index >= len {
            return false;
        }
        let from = index.saturating_sub(EMOJI_RANGE);
        let to = (index + EMOJI_RANGE).min(len);
        emoji::is_index_before_or_in_emoji(&self.content[from..to], index - from)
    }

    /// The text around `index` handed to AI analysis, with its absolute
    /// start so local results can be mapped back.
    pub fn selected_limit_value(&self, index: i32) -> AnalysisWindow {
        let len = self.content.len() as i32;
        let index = index.clamp(0, len);
        let start = (index - AI_TEXT_RANGE).max(0) as usize;
        let end = (index + AI_TEXT_RANGE).min(len) as usize;
        let range = emoji::sub_range(&self.content, start, end - start, true, true);
        AnalysisWindow {
            text: self.content[range.clone()].to_vec(),
            start: range.start as i32,
            local_index: index - range.start as i32,
        }
    }

    /// Replaces the whole buffer and filters it.
    pub fn set_text_value(&mut self, value: &str) {
        self.content = to_utf16(value);
        self.insert_value.clear();
        self.truncated = false;
        self.filter_value();
    }

    /// Writes `value` over `[start, end)` with no filtering. Used for IME
    /// preview text, which is committed through the regular path later.
    /// Returns the range the value now occupies.
    pub fn splice_unfiltered(&mut self, start: i32, end: i32, value: &str) -> Range<usize> {
        let (start, end) = self.snap_to_clusters(start, end);
        let value = to_utf16(value);
        let inserted = start..start + value.len();
        self.content.splice(start..end, value);
        inserted
    }

    /// The buffer as a `String`.
    pub fn text_value(&self) -> String {
        from_utf16(&self.content)
    }

    /// The raw UTF-16 buffer.
    pub fn wide_text(&self) -> &[u16] {
        &self.content
    }

    /// Length in code units.
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// `true` when the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Clears the buffer.
    pub fn reset(&mut self) {
        self.content.clear();
        self.insert_value.clear();
        self.truncated = false;
    }

    /// The text the last insertion actually added.
    pub fn insert_value_text(&self) -> String {
        from_utf16(&self.insert_value)
    }

    /// `true` if the last edit was cut short by the max length.
    pub fn was_truncated(&self) -> bool {
        self.truncated
    }

    /// Text before `index`, ending on a cluster boundary.
    pub fn get_value_before_index(&self, index: i32) -> String {
        let (index, _) = self.format_index(index, index);
        let index = emoji::floor_boundary(&self.content, index);
        from_utf16(&self.content[..index])
    }

    /// Text from `index` on, starting on a cluster boundary.
    pub fn get_value_after_index(&self, index: i32) -> String {
        let (index, _) = self.format_index(index, index);
        let index = emoji::floor_boundary(&self.content, index);
        from_utf16(&self.content[index..])
    }
}

fn report_rejected(host: &dyn TextEditHost, settings: &FilterSettings, rejected: &str) {
    if settings.input_type.is_password() {
        info!(
            target: "arkui_components::text_field",
            rejected_len = rejected.encode_utf16().count(),
            "input rejected by filter"
        );
    } else {
        info!(
            target: "arkui_components::text_field",
            rejected,
            "input rejected by filter"
        );
    }
    host.on_input_filter_error(rejected);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text_field::{
        input_filter::InputFilter,
        test_support::{TestHost, controller_for},
    };

    #[test]
    fn test_decimal_keeps_single_dot() {
        let host = TestHost::with_type(TextInputType::NumberDecimal);
        let mut controller = controller_for(&host);
        assert!(controller.insert_value(0, "12.3.4"));
        assert_eq!(controller.text_value(), "12.34");
    }

    #[test]
    fn test_max_length_rejects_extra_character() {
        let host = TestHost::new();
        host.update_settings(|settings| settings.max_length = Some(3));
        let mut controller = controller_for(&host);
        controller.set_text_value("abc");
        assert!(!controller.insert_value(3, "d"));
        assert_eq!(controller.text_value(), "abc");
        assert!(controller.was_truncated());
    }

    #[test]
    fn test_max_length_never_splits_emoji() {
        let host = TestHost::new();
        host.update_settings(|settings| settings.max_length = Some(4));
        let mut controller = controller_for(&host);
        controller.set_text_value("abc");
        assert!(!controller.insert_value(3, "\u{1F600}"));
        assert_eq!(controller.text_value(), "abc");

        controller.set_text_value("ab");
        assert!(controller.insert_value(2, "\u{1F600}x"));
        assert_eq!(controller.text_value(), "ab\u{1F600}");
        assert_eq!(controller.len(), 4);
    }

    #[test]
    fn test_insert_inside_emoji_snaps_to_cluster_start() {
        let host = TestHost::new();
        let mut controller = controller_for(&host);
        controller.set_text_value("\u{1F600}");
        assert!(controller.insert_value(1, "a"));
        assert_eq!(controller.text_value(), "a\u{1F600}");
    }

    #[test]
    fn test_delete_forward_removes_whole_emoji() {
        let host = TestHost::new();
        let mut controller = controller_for(&host);
        controller.set_text_value("\u{1F600}");
        assert_eq!(controller.delete(0, 1, false), 2);
        assert!(controller.is_empty());
    }

    #[test]
    fn test_delete_backward_removes_whole_emoji() {
        let host = TestHost::new();
        let mut controller = controller_for(&host);
        controller.set_text_value("a\u{1F600}b");
        assert_eq!(controller.delete(3, 1, true), 2);
        assert_eq!(controller.text_value(), "ab");
        assert_eq!(controller.delete(2, 1, true), 1);
        assert_eq!(controller.text_value(), "a");
        assert_eq!(controller.delete(0, 1, true), 0);
    }

    #[test]
    fn test_email_duplicate_at_is_dropped() {
        let host = TestHost::with_type(TextInputType::EmailAddress);
        let mut controller = controller_for(&host);
        controller.set_text_value("a@b");
        assert!(!controller.insert_value(1, "@"));
        assert_eq!(controller.text_value(), "a@b");
    }

    #[test]
    fn test_rejected_single_character_rolls_back() {
        let host = TestHost::with_type(TextInputType::Number);
        let mut controller = controller_for(&host);
        controller.set_text_value("12");
        assert!(!controller.insert_value(1, "x"));
        assert_eq!(controller.text_value(), "12");
        assert_eq!(host.rejected(), vec!["x".to_owned()]);

        assert!(controller.insert_value(1, "5"));
        assert_eq!(controller.text_value(), "152");
        assert_eq!(controller.insert_value_text(), "5");
    }

    #[test]
    fn test_rejected_character_keeps_selected_text() {
        let host = TestHost::with_type(TextInputType::Number);
        let mut controller = controller_for(&host);
        controller.set_text_value("123");
        assert!(!controller.replace_selected_value(0, 2, "x"));
        assert_eq!(controller.text_value(), "123");
        assert_eq!(controller.insert_value_text(), "");
    }

    #[test]
    fn test_supplementary_character_grows_by_its_utf16_length() {
        let host = TestHost::new();
        let mut controller = controller_for(&host);
        controller.set_text_value("ab");
        assert!(controller.insert_value(1, "\u{1F600}"));
        assert_eq!(controller.len(), 4);
        assert_eq!(controller.text_value(), "a\u{1F600}b");
        assert_eq!(controller.insert_value_text(), "\u{1F600}");
    }

    #[test]
    fn test_batch_insert_is_filtered_not_rolled_back() {
        let host = TestHost::with_type(TextInputType::Number);
        let mut controller = controller_for(&host);
        controller.set_text_value("12");
        assert!(controller.insert_value(2, "a3b"));
        assert_eq!(controller.text_value(), "123");
        assert!(controller.insert_value(3, "xy"));
        assert_eq!(controller.text_value(), "123");
    }

    #[test]
    fn test_custom_filter_reports_rejections() {
        let host = TestHost::new();
        host.update_settings(|settings| {
            settings.input_filter = Some(InputFilter::new("[a-z]").unwrap());
        });
        let mut controller = controller_for(&host);
        assert!(controller.insert_value(0, "aB1c"));
        assert_eq!(controller.text_value(), "ac");
        assert_eq!(host.rejected(), vec!["B1".to_owned()]);
    }

    #[test]
    fn test_filter_value_is_idempotent() {
        let host = TestHost::with_type(TextInputType::EmailAddress);
        let mut controller = controller_for(&host);
        controller.set_text_value("x@@y z");
        let once = controller.text_value();
        controller.filter_value();
        assert_eq!(controller.text_value(), once);
    }

    #[test]
    fn test_filter_value_type_does_not_touch_buffer() {
        let host = TestHost::with_type(TextInputType::Number);
        let mut controller = controller_for(&host);
        controller.set_text_value("1");
        let outcome = controller.filter_value_type("4a2");
        assert_eq!(outcome.text, "42");
        assert_eq!(controller.text_value(), "1");
        assert!(host.rejected().is_empty());
    }

    #[test]
    fn test_selected_value_widens_to_clusters() {
        let host = TestHost::new();
        let mut controller = controller_for(&host);
        controller.set_text_value("a\u{1F600}b");
        assert_eq!(controller.get_selected_value(2, 4), "\u{1F600}b");
        assert_eq!(controller.get_selected_value(4, 0), "a\u{1F600}b");
        assert_eq!(controller.get_value_before_index(2), "a");
        assert_eq!(controller.get_value_after_index(3), "b");
    }

    #[test]
    fn test_erase_keeps_surrogates_whole() {
        let host = TestHost::new();
        let mut controller = controller_for(&host);
        controller.set_text_value("a\u{1F600}b");
        controller.erase(2, 1);
        assert_eq!(controller.text_value(), "ab");
        controller.erase(5, 1);
        assert_eq!(controller.text_value(), "ab");
    }

    #[test]
    fn test_emoji_window_and_limit_value() {
        let host = TestHost::new();
        let mut controller = controller_for(&host);
        let text = format!("{}\u{1F600}{}", "a".repeat(200), "b".repeat(200));
        controller.set_text_value(&text);
        assert!(controller.is_index_before_or_in_emoji(200));
        assert!(controller.is_index_before_or_in_emoji(201));
        assert!(!controller.is_index_before_or_in_emoji(10));

        let window = controller.selected_limit_value(100);
        assert_eq!(window.start, 50);
        assert_eq!(window.local_index, 50);
        assert_eq!(window.text.len(), 100);
        assert_eq!(window.to_absolute(window.local_index), 100);
    }

    #[test]
    fn test_dropped_host_skips_filters() {
        let host = TestHost::with_type(TextInputType::Number);
        let mut controller = controller_for(&host);
        drop(host);
        assert!(controller.insert_value(0, "abc"));
        assert_eq!(controller.text_value(), "abc");
    }

    #[test]
    fn test_insert_sequences_stay_within_max_length() {
        let host = TestHost::new();
        host.update_settings(|settings| settings.max_length = Some(5));
        let mut controller = controller_for(&host);
        let inserts = ["ab", "\u{1F600}", "\u{1F468}\u{200D}\u{1F469}", "c", "de"];
        for (step, value) in inserts.iter().enumerate() {
            let index = (step as i32) % (controller.len() as i32 + 1);
            controller.insert_value(index, value);
            assert!(controller.len() <= 5);
            assert!(String::from_utf16(controller.wide_text()).is_ok());
            if step % 2 == 1 {
                controller.delete(controller.len() as i32, 1, true);
                assert!(String::from_utf16(controller.wide_text()).is_ok());
            }
        }
    }
}
