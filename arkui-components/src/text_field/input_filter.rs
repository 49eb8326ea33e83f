//! Input types and the character filters applied to every edit.
//!
//! A field either carries a custom [`InputFilter`] (an allow-list regex whose
//! matches are kept) or relies on the built-in allow-list of its
//! [`TextInputType`]. Characters that do not survive are reported back in
//! [`FilterOutcome::rejected`].

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Keyboard/content type of a text field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextInputType {
    /// No restriction.
    #[default]
    Unspecified,
    /// Free text.
    Text,
    /// Free text with line breaks.
    Multiline,
    /// Digits only.
    Number,
    /// Digits and phone punctuation.
    Phone,
    /// Date/time text.
    Datetime,
    /// E-mail address characters, single `@`.
    EmailAddress,
    /// URL text.
    Url,
    /// Password shown in clear, ASCII only.
    VisiblePassword,
    /// Digits-only password.
    NumberPassword,
    /// Lock screen password, ASCII only.
    ScreenLockPassword,
    /// User name.
    UserName,
    /// New password, ASCII only.
    NewPassword,
    /// Digits with a single decimal point.
    NumberDecimal,
}

impl TextInputType {
    /// Returns `true` for every password flavor.
    pub fn is_password(self) -> bool {
        matches!(
            self,
            Self::VisiblePassword
                | Self::NumberPassword
                | Self::ScreenLockPassword
                | Self::NewPassword
        )
    }
}

/// Errors raised while building an [`InputFilter`].
#[derive(Debug, Error)]
pub enum InputFilterError {
    /// The pattern is not a valid regular expression.
    #[error("invalid input filter pattern `{pattern}`")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Compiler error.
        #[source]
        source: regex::Error,
    },
}

/// A compiled custom allow-list. Every match of the pattern is kept, the
/// text between matches is rejected.
#[derive(Debug, Clone)]
pub struct InputFilter {
    pattern: String,
    regex: Regex,
}

impl PartialEq for InputFilter {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
    }
}

impl InputFilter {
    /// Compiles `pattern`.
    pub fn new(pattern: impl Into<String>) -> Result<Self, InputFilterError> {
        let pattern = pattern.into();
        match Regex::new(&pattern) {
            Ok(regex) => Ok(Self { pattern, regex }),
            Err(source) => Err(InputFilterError::InvalidPattern { pattern, source }),
        }
    }

    /// The source pattern.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Keeps the matches of this filter in `text`.
    pub fn apply(&self, text: &str) -> FilterOutcome {
        keep_matches(&self.regex, text)
    }
}

/// Result of running a filter over a string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOutcome {
    /// Surviving text.
    pub text: String,
    /// Characters dropped by an allow-list, in order.
    pub rejected: String,
}

impl FilterOutcome {
    fn unchanged(text: &str) -> Self {
        Self {
            text: text.to_owned(),
            rejected: String::new(),
        }
    }

    fn then(self, next: FilterOutcome) -> Self {
        let mut rejected = self.rejected;
        rejected.push_str(&next.rejected);
        Self {
            text: next.text,
            rejected,
        }
    }
}

/// Everything a buffer needs to know to filter an edit.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSettings {
    /// Input type driving the built-in allow-list.
    pub input_type: TextInputType,
    /// Custom allow-list, replacing the built-in one.
    pub input_filter: Option<InputFilter>,
    /// Maximum length in UTF-16 code units.
    pub max_length: Option<usize>,
    /// Host API level. Levels up to [`COMPAT_REFILTER_API_VERSION`] re-apply
    /// the built-in filter after a custom one.
    pub api_version: u32,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            input_type: TextInputType::Unspecified,
            input_filter: None,
            max_length: None,
            api_version: DEFAULT_API_VERSION,
        }
    }
}

/// API level assumed when the host does not say otherwise.
pub const DEFAULT_API_VERSION: u32 = 12;
/// Highest API level with the legacy custom-then-builtin filtering.
pub const COMPAT_REFILTER_API_VERSION: u32 = 11;

static DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("static regex"));
static DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9.]+").expect("static regex"));
static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9 +\-*#()]+").expect("static regex"));
static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9!#$%&'*+/=?^_`{|}~.@\-]+").expect("static regex")
});
static ASCII: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\x00-\x7F]+").expect("static regex"));

fn keep_matches(regex: &Regex, text: &str) -> FilterOutcome {
    let mut kept = String::with_capacity(text.len());
    let mut rejected = String::new();
    let mut last = 0;
    for found in regex.find_iter(text) {
        rejected.push_str(&text[last..found.start()]);
        kept.push_str(found.as_str());
        last = found.end();
    }
    rejected.push_str(&text[last..]);
    FilterOutcome {
        text: kept,
        rejected,
    }
}

/// Keeps the first `symbol` and drops every later one.
pub fn keep_first_occurrence(text: &str, symbol: char) -> String {
    let mut seen = false;
    text.chars()
        .filter(|&c| {
            if c != symbol {
                return true;
            }
            let keep = !seen;
            seen = true;
            keep
        })
        .collect()
}

/// Applies the built-in allow-list of `input_type`.
///
/// Duplicate `@`/`.` removed by the structural rules are not counted as
/// rejected input.
pub fn filter_builtin(input_type: TextInputType, text: &str) -> FilterOutcome {
    match input_type {
        TextInputType::Number | TextInputType::NumberPassword => keep_matches(&DIGITS, text),
        TextInputType::Phone => keep_matches(&PHONE, text),
        TextInputType::EmailAddress => {
            let mut outcome = keep_matches(&EMAIL, text);
            outcome.text = keep_first_occurrence(&outcome.text, '@');
            outcome
        }
        TextInputType::NumberDecimal => {
            let mut outcome = keep_matches(&DECIMAL, text);
            outcome.text = keep_first_occurrence(&outcome.text, '.');
            outcome
        }
        TextInputType::VisiblePassword
        | TextInputType::NewPassword
        | TextInputType::ScreenLockPassword => keep_matches(&ASCII, text),
        _ => FilterOutcome::unchanged(text),
    }
}

/// Runs the full filter pipeline for `settings` over `text`.
///
/// A custom filter replaces the built-in one, except on legacy API levels
/// where the built-in filter runs again afterwards.
pub fn filter_text(text: &str, settings: &FilterSettings) -> FilterOutcome {
    match &settings.input_filter {
        Some(filter) => {
            let outcome = filter.apply(text);
            if settings.api_version <= COMPAT_REFILTER_API_VERSION {
                let builtin = filter_builtin(settings.input_type, &outcome.text);
                outcome.then(builtin)
            } else {
                outcome
            }
        }
        None => filter_builtin(settings.input_type, text),
    }
}
