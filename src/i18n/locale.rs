//! Locale type: validated locale representation.
//!
//! A `Locale` can only be constructed from a code present and enabled in the
//! registry, so holding one is proof the site is published in it.

use crate::i18n::{LocaleConfig, LocaleRegistry};
use anyhow::{bail, Result};
use serde::{Serialize, Serializer};
use std::fmt;

/// A validated locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Locale {
    /// Two-letter locale code (e.g., "en", "sv")
    code: &'static str,
}

impl Locale {
    /// English, the default locale.
    pub const ENGLISH: Locale = Locale { code: "en" };

    /// Swedish.
    pub const SWEDISH: Locale = Locale { code: "sv" };

    /// Look up a locale by code.
    ///
    /// Returns `None` when the code is unknown or disabled. This is the
    /// building block of every "is this path segment a locale?" check.
    pub fn parse(code: &str) -> Option<Locale> {
        LocaleRegistry::get()
            .get_by_code(code)
            .filter(|config| config.enabled)
            .map(|config| Locale { code: config.code })
    }

    /// Create a Locale from user input, with a descriptive error.
    ///
    /// # Example
    /// ```ignore
    /// let swedish = Locale::from_code("sv")?;
    /// ```
    pub fn from_code(code: &str) -> Result<Locale> {
        match LocaleRegistry::get().get_by_code(code) {
            Some(config) if config.enabled => Ok(Locale { code: config.code }),
            Some(_) => bail!("Locale '{}' is not enabled", code),
            None => bail!("Unknown locale code: '{}'", code),
        }
    }

    /// Parse a locale, falling back to the default for anything unsupported.
    pub fn parse_or_default(code: Option<&str>) -> Locale {
        code.and_then(Locale::parse).unwrap_or_default()
    }

    /// All enabled locales, in registry order.
    pub fn all() -> Vec<Locale> {
        LocaleRegistry::get()
            .list_enabled()
            .into_iter()
            .map(|config| Locale { code: config.code })
            .collect()
    }

    /// The locale code (e.g., "en").
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Full configuration from the registry.
    ///
    /// # Panics
    /// Panics if the code is missing from the registry, which cannot happen
    /// for a Locale built through `parse`, `from_code` or the constants.
    pub fn config(&self) -> &'static LocaleConfig {
        LocaleRegistry::get()
            .get_by_code(self.code)
            .expect("Locale code should always be valid")
    }

    /// English name of the language.
    pub fn name(&self) -> &'static str {
        self.config().name
    }

    /// Native name of the language (shown in the language switcher).
    pub fn native_name(&self) -> &'static str {
        self.config().native_name
    }

    /// Check if this is the default locale.
    pub fn is_default(&self) -> bool {
        self.config().is_default
    }
}

impl Default for Locale {
    fn default() -> Self {
        Locale {
            code: LocaleRegistry::get().default_locale().code,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code)
    }
}

impl Serialize for Locale {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert_eq!(Locale::ENGLISH.code(), "en");
        assert_eq!(Locale::SWEDISH.code(), "sv");
        assert!(Locale::ENGLISH.is_default());
        assert!(!Locale::SWEDISH.is_default());
    }

    #[test]
    fn test_parse_supported() {
        assert_eq!(Locale::parse("sv"), Some(Locale::SWEDISH));
        assert_eq!(Locale::parse("en"), Some(Locale::ENGLISH));
    }

    #[test]
    fn test_parse_unsupported() {
        assert_eq!(Locale::parse("fr"), None);
        assert_eq!(Locale::parse(""), None);
        assert_eq!(Locale::parse("about"), None);
    }

    #[test]
    fn test_from_code_invalid() {
        let result = Locale::from_code("fr");
        assert!(result.unwrap_err().to_string().contains("Unknown"));
    }

    #[test]
    fn test_parse_or_default() {
        assert_eq!(Locale::parse_or_default(Some("sv")), Locale::SWEDISH);
        assert_eq!(Locale::parse_or_default(Some("xx")), Locale::ENGLISH);
        assert_eq!(Locale::parse_or_default(None), Locale::ENGLISH);
    }

    #[test]
    fn test_default_is_english() {
        assert_eq!(Locale::default(), Locale::ENGLISH);
    }

    #[test]
    fn test_all_lists_enabled_locales() {
        assert_eq!(Locale::all(), vec![Locale::ENGLISH, Locale::SWEDISH]);
    }

    #[test]
    fn test_display_and_serialize() {
        assert_eq!(Locale::SWEDISH.to_string(), "sv");
        assert_eq!(serde_json::to_string(&Locale::SWEDISH).unwrap(), "\"sv\"");
    }

    #[test]
    fn test_native_name() {
        assert_eq!(Locale::SWEDISH.native_name(), "Svenska");
        assert_eq!(Locale::ENGLISH.name(), "English");
    }
}
