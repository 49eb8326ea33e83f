//! Counter and error text shown under a field.

use derive_setters::Setters;

/// How the character counter is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Setters)]
pub struct CounterOptions {
    /// Percentage of the max length, in `1..=100`, from which the counter
    /// appears. `None` shows it all the time.
    #[setters(strip_option)]
    pub threshold_percentage: Option<u32>,
    /// Turns the counter and border into the error color when an edit is
    /// cut by the max length.
    pub highlight_border: bool,
}

impl Default for CounterOptions {
    fn default() -> Self {
        Self {
            threshold_percentage: None,
            highlight_border: true,
        }
    }
}

/// Rendered counter state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CounterState {
    /// Counter text, `"len/max"`.
    pub text: String,
    /// Whether the counter is drawn.
    pub visible: bool,
    /// Whether the counter is drawn in the error color.
    pub error: bool,
}

/// Computes the counter of a field with a max length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CounterDecorator {
    options: CounterOptions,
}

impl CounterDecorator {
    /// Creates a decorator for `options`.
    pub fn new(options: CounterOptions) -> Self {
        Self { options }
    }

    /// The options in use.
    pub fn options(&self) -> CounterOptions {
        self.options
    }

    /// Counter state for `len` characters. Without a max length nothing is
    /// shown. An out-of-range threshold counts as no threshold.
    pub fn update(&self, len: usize, max_length: Option<usize>, truncated: bool) -> CounterState {
        let Some(max) = max_length else {
            return CounterState::default();
        };
        let visible = match self.options.threshold_percentage {
            Some(threshold @ 1..=100) => len * 100 >= max * threshold as usize,
            _ => true,
        };
        CounterState {
            text: format!("{len}/{max}"),
            visible,
            error: visible && truncated && self.options.highlight_border,
        }
    }
}

/// Error text shown under a field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorDecorator {
    text: Option<String>,
}

impl ErrorDecorator {
    /// Sets or clears the error text. Returns `true` when it changed.
    pub fn set_text(&mut self, text: Option<String>) -> bool {
        let text = text.filter(|text| !text.is_empty());
        if self.text == text {
            return false;
        }
        self.text = text;
        true
    }

    /// The error text, if any.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Whether an error is shown.
    pub fn is_visible(&self) -> bool {
        self.text.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_needs_max_length() {
        let decorator = CounterDecorator::default();
        assert_eq!(decorator.update(3, None, false), CounterState::default());
        let state = decorator.update(3, Some(10), false);
        assert_eq!(state.text, "3/10");
        assert!(state.visible);
        assert!(!state.error);
    }

    #[test]
    fn test_counter_threshold() {
        let decorator = CounterDecorator::new(CounterOptions::default().threshold_percentage(50));
        assert!(!decorator.update(4, Some(10), false).visible);
        assert!(decorator.update(5, Some(10), false).visible);

        let out_of_range = CounterDecorator::new(CounterOptions::default().threshold_percentage(0));
        assert!(out_of_range.update(0, Some(10), false).visible);
    }

    #[test]
    fn test_counter_error_needs_highlight() {
        let highlighted = CounterDecorator::default();
        assert!(highlighted.update(10, Some(10), true).error);
        let plain = CounterDecorator::new(CounterOptions::default().highlight_border(false));
        assert!(!plain.update(10, Some(10), true).error);
    }

    #[test]
    fn test_error_text_changes() {
        let mut decorator = ErrorDecorator::default();
        assert!(!decorator.set_text(Some(String::new())));
        assert!(decorator.set_text(Some("too short".into())));
        assert!(!decorator.set_text(Some("too short".into())));
        assert_eq!(decorator.text(), Some("too short"));
        assert!(decorator.set_text(None));
        assert!(!decorator.is_visible());
    }
}
