use crate::api::{is_absolute_url, ApiClient, FetchOptions};
use crate::error::Result;
use crate::i18n::{localized_path, Locale};
use crate::schema::{validate_nav_groups, RawNavEntry, RawNavGroup};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::{debug, info};

/// Navigation groups endpoint, relative to the API base.
pub const NAVIGATION_PATH: &str = "/navigation/";

static REGION_LOCALE_REGEX: OnceLock<Regex> = OnceLock::new();

/// A resolved, renderable navigation item.
///
/// Internal items carry a `slug` ("" is the site root) and no `url`;
/// external items carry a `url` and no `slug`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavItem {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub external: bool,
    pub new_tab: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<NavItem>>,
}

impl NavItem {
    /// Internal link to `slug`.
    pub fn internal(label: &str, slug: &str) -> Self {
        Self {
            label: label.to_string(),
            slug: Some(slug.to_string()),
            url: None,
            external: false,
            new_tab: false,
            order: None,
            children: None,
        }
    }

    /// Where the item links to for a page rendered in `locale`.
    pub fn href(&self, locale: Locale) -> String {
        match (&self.url, &self.slug) {
            (Some(url), _) if self.external => url.clone(),
            (_, Some(slug)) => localized_path(locale, slug),
            _ => localized_path(locale, ""),
        }
    }
}

/// Fetch the navigation groups for `locale` and resolve the `menu_slug` menu.
///
/// A menu that is not configured resolves to an empty list. Fetch and
/// validation errors propagate; choosing a fallback is up to the caller.
pub async fn resolve_menu(client: &ApiClient, locale: Locale, menu_slug: &str) -> Result<Vec<NavItem>> {
    let raw = client
        .fetch(NAVIGATION_PATH, locale, &FetchOptions::detail())
        .await?;
    let groups = validate_nav_groups(&raw)?;

    let items = select_menu(&groups, menu_slug);
    info!(
        "Resolved menu '{}' for {}: {} items",
        menu_slug,
        locale,
        items.len()
    );
    Ok(items)
}

/// Pick the group matching `menu_slug` (case-insensitive) and resolve it.
pub fn select_menu(groups: &[RawNavGroup], menu_slug: &str) -> Vec<NavItem> {
    let wanted = menu_slug.trim();
    match groups
        .iter()
        .find(|group| group.slug.trim().eq_ignore_ascii_case(wanted))
    {
        Some(group) => resolve_entries(&group.entries),
        None => {
            debug!("No navigation group named '{}'", wanted);
            Vec::new()
        }
    }
}

/// Order entries (explicit order ascending, unordered last, ties stable)
/// and resolve each one, dropping malformed entries.
pub fn resolve_entries(entries: &[RawNavEntry]) -> Vec<NavItem> {
    let mut ordered: Vec<&RawNavEntry> = entries.iter().collect();
    ordered.sort_by_key(|entry| (entry.order.is_none(), entry.order));
    ordered.into_iter().filter_map(resolve_entry).collect()
}

/// Resolve a single entry; `None` when its label or url is blank.
pub fn resolve_entry(entry: &RawNavEntry) -> Option<NavItem> {
    let label = entry.label.trim();
    let url = entry.url.trim();
    if label.is_empty() || url.is_empty() {
        debug!("Dropping malformed navigation entry: {:?}", entry);
        return None;
    }

    let external = is_absolute_url(url);
    let children = if entry.children.is_empty() {
        None
    } else {
        Some(resolve_entries(&entry.children))
    };

    Some(NavItem {
        label: label.to_string(),
        slug: (!external).then(|| internal_slug(url)),
        url: external.then(|| url.to_string()),
        external,
        new_tab: entry.new_tab,
        order: entry.order,
        children,
    })
}

/// Slug for a site-relative URL: path segments without a leading locale.
///
/// `/en` is the root (""), `/sv/writing/post` is `writing/post`.
pub fn internal_slug(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    let rest = match segments.first() {
        Some(first) if is_locale_segment(first) => &segments[1..],
        _ => &segments[..],
    };
    rest.join("/")
}

/// A supported locale code (`en`, `SV`) or any region-tagged code (`pt-BR`).
///
/// Bare two-letter segments outside the registry (`/cv`, `/go`) are ordinary
/// paths.
fn is_locale_segment(segment: &str) -> bool {
    Locale::parse(&segment.to_ascii_lowercase()).is_some()
        || REGION_LOCALE_REGEX
            .get_or_init(|| Regex::new(r"(?i)^[a-z]{2}-[a-z]{2}$").expect("valid regex"))
            .is_match(segment)
}
