//! Label languages.

use std::{fmt, str::FromStr};

/// Language offered by the map language picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    /// Code used in `name:<code>` label properties, or `default`.
    pub code: &'static str,
    /// Human readable name.
    pub name: &'static str,
}

/// Languages offered to the user. [`crate::apply_language_preference`] accepts other codes too.
pub const SUPPORTED_LANGUAGES: &[Language] = &[
    Language::new("default", "Default"),
    Language::new("ar", "Arabic"),
    Language::new("de", "German"),
    Language::new("en", "English"),
    Language::new("es", "Spanish"),
    Language::new("fr", "French"),
    Language::new("he", "Hebrew"),
    Language::new("it", "Italian"),
    Language::new("ja", "Japanese"),
    Language::new("ko", "Korean"),
    Language::new("pt", "Portuguese"),
    Language::new("ru", "Russian"),
    Language::new("zh", "Chinese"),
    Language::new("vi", "Vietnamese"),
];

impl Language {
    const fn new(code: &'static str, name: &'static str) -> Self {
        Self { code, name }
    }

    /// Find a supported language by its code.
    pub fn find(code: &str) -> Option<&'static Self> {
        SUPPORTED_LANGUAGES
            .iter()
            .find(|language| language.code == code)
    }
}

/// Whether labels in this language are what the fetched styles show already, so there is nothing
/// to rewrite.
pub fn is_identity(code: &str) -> bool {
    matches!(code, "default" | "en")
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("invalid language code: '{0}'")]
pub struct InvalidLanguageCode(pub String);

/// Language code as it appears in `name:<code>` label properties, e.g. `ja` or `zh-Hant`. Only
/// ASCII letters, hyphens and underscores are allowed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LanguageCode(String);

impl LanguageCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the feature property holding labels in this language.
    pub fn property(&self) -> String {
        format!("name:{}", self.0)
    }
}

impl FromStr for LanguageCode {
    type Err = InvalidLanguageCode;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        let valid = !code.is_empty()
            && code
                .chars()
                .all(|c| c.is_ascii_alphabetic() || c == '-' || c == '_');

        if valid {
            Ok(Self(code.to_owned()))
        } else {
            Err(InvalidLanguageCode(code.to_owned()))
        }
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
