//! Internationalization (i18n) module for locale-prefixed content.
//!
//! All locale-related logic lives here so that handlers and content
//! resolution never parse locales out of paths on their own.
//!
//! # Architecture
//!
//! - `registry`: Single source of truth for all supported locales and the default
//! - `locale`: Type-safe `Locale` value validated against the registry
//! - `router`: Request-phase guard that enforces a locale prefix on every path
//!
//! # Example
//!
//! ```rust,ignore
//! use content_front::i18n::{route, Locale, LocaleRoute};
//!
//! let swedish = Locale::parse("sv").unwrap();
//! assert_eq!(route("/about"), LocaleRoute::Redirect("/en/about".to_string()));
//! ```

mod locale;
mod registry;
mod router;

pub use locale::Locale;
pub use registry::{LocaleConfig, LocaleRegistry};
pub use router::{locale_from_path, localized_path, replace_locale, route, LocaleRoute};
