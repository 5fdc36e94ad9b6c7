//! Locale router: the request-phase guard that enforces locale-prefixed paths.
//!
//! Every user-facing route starts with a supported locale segment. Paths
//! without one are redirected to the default-locale equivalent. Assets and
//! API routes are left alone.

use crate::i18n::Locale;

/// Path prefixes that never carry a locale.
const RESERVED_PREFIXES: &[&str] = &["api", "_next", "static", "assets"];

/// Outcome of routing a request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocaleRoute {
    /// The path already has a locale prefix, or is exempt from prefixing.
    PassThrough,
    /// The path must be redirected to this target.
    Redirect(String),
}

/// Decide whether `path` passes through or is redirected.
///
/// This is a total function: every string routes to exactly one outcome, and
/// routing a redirect target always passes through.
pub fn route(path: &str) -> LocaleRoute {
    if is_exempt(path) {
        return LocaleRoute::PassThrough;
    }

    let first = segments(path).next().unwrap_or("");
    if Locale::parse(first).is_some() {
        return LocaleRoute::PassThrough;
    }

    let default = Locale::default();
    let rest = path.trim_start_matches('/');
    let target = if rest.is_empty() {
        format!("/{}", default)
    } else {
        format!("/{}/{}", default, rest)
    };
    LocaleRoute::Redirect(target)
}

/// The locale a path belongs to, or the default when it has none.
pub fn locale_from_path(path: &str) -> Locale {
    Locale::parse_or_default(segments(path).next())
}

/// Swap the locale segment of `path` for `locale`, inserting one if absent.
pub fn replace_locale(path: &str, locale: Locale) -> String {
    let mut parts: Vec<&str> = segments(path).collect();
    match parts.first() {
        Some(first) if Locale::parse(first).is_some() => parts[0] = locale.code(),
        _ => parts.insert(0, locale.code()),
    }
    format!("/{}", parts.join("/"))
}

/// Build the public path for an internal slug ("" is the locale root).
pub fn localized_path(locale: Locale, slug: &str) -> String {
    let slug = slug.trim_matches('/');
    if slug.is_empty() {
        format!("/{}", locale)
    } else {
        format!("/{}/{}", locale, slug)
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

/// Assets (last segment has an extension) and reserved prefixes skip routing.
fn is_exempt(path: &str) -> bool {
    let mut parts = segments(path);
    if let Some(first) = parts.next() {
        if RESERVED_PREFIXES.contains(&first) {
            return true;
        }
    }

    segments(path)
        .last()
        .map(|last| last.contains('.'))
        .unwrap_or(false)
}
