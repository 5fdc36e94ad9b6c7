//! Normalization of validated items into the canonical view models.
//!
//! Every field goes through the same fallback chain: flat value, then the
//! best translation (requested locale, default locale, first available),
//! then a derived or literal default. Functions here are pure.

use crate::error::truncate_chars;
use crate::i18n::Locale;
use crate::schema::{ContentId, LocalizedFields, LooseItem, Translations};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Characters kept in a derived excerpt.
pub const EXCERPT_BUDGET: usize = 180;

/// Characters kept in a derived meta description.
pub const META_DESCRIPTION_BUDGET: usize = 140;

/// Title used when an item has neither a title nor a slug.
pub const UNTITLED: &str = "(Untitled)";

static HTML_TAG_REGEX: OnceLock<Regex> = OnceLock::new();
static LOOKS_LIKE_HTML_REGEX: OnceLock<Regex> = OnceLock::new();

/// Canonical page consumed by the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub id: ContentId,
    pub slug: String,
    /// Never empty
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seo_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seo_description: Option<String>,
}

impl Page {
    /// Document title: SEO title when the CMS sets one.
    pub fn meta_title(&self) -> &str {
        self.seo_title.as_deref().unwrap_or(&self.title)
    }

    /// Meta description: SEO description, else the start of the body text.
    pub fn meta_description(&self) -> Option<String> {
        self.seo_description.clone().or_else(|| {
            self.content_html
                .as_deref()
                .and_then(|html| html_to_excerpt(html, META_DESCRIPTION_BUDGET))
        })
    }
}

/// Canonical post consumed by the rendering layer and the feeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: ContentId,
    pub slug: String,
    /// Never empty
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    pub published_at: Option<String>,
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seo_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seo_description: Option<String>,
}

impl Post {
    pub fn meta_title(&self) -> &str {
        self.seo_title.as_deref().unwrap_or(&self.title)
    }

    /// Meta description: SEO description, excerpt, then the body text.
    pub fn meta_description(&self) -> Option<String> {
        self.seo_description
            .clone()
            .or_else(|| {
                self.excerpt
                    .as_deref()
                    .map(|excerpt| truncate_chars(excerpt, META_DESCRIPTION_BUDGET))
            })
            .or_else(|| {
                self.content_html
                    .as_deref()
                    .and_then(|html| html_to_excerpt(html, META_DESCRIPTION_BUDGET))
            })
    }

    /// Publication time, when the API sent one in RFC 3339 or RFC 2822 form.
    pub fn published_at_utc(&self) -> Option<DateTime<Utc>> {
        let raw = self.published_at.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .or_else(|_| DateTime::parse_from_rfc2822(raw))
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// The localized records an item offers for one locale, in precedence order.
struct Localized<'a> {
    flat: Option<&'a LocalizedFields>,
    translation: Option<&'a LocalizedFields>,
}

impl<'a> Localized<'a> {
    fn resolve(item: &'a LooseItem, locale: Locale) -> Self {
        Self {
            flat: item.shape.flat(),
            translation: item
                .shape
                .translations()
                .and_then(|translations| pick_translation(translations, locale)),
        }
    }

    /// First value of `field` in flat, then translation.
    fn field(&self, field: fn(&LocalizedFields) -> &Option<String>) -> Option<&'a str> {
        self.flat
            .and_then(|fields| field(fields).as_deref())
            .or_else(|| self.translation.and_then(|fields| field(fields).as_deref()))
    }

    fn title(&self, slug: &'a str) -> String {
        self.field(|f| &f.title)
            .or_else(|| Some(slug).filter(|s| !s.trim().is_empty()))
            .unwrap_or(UNTITLED)
            .to_string()
    }

    fn content_html(&self) -> Option<String> {
        self.field(|f| &f.body_html)
            .map(String::from)
            .or_else(|| self.field(|f| &f.body_md).map(to_html))
    }
}

/// Translation for `locale`, else the default locale, else the first one sent.
pub fn pick_translation(translations: &Translations, locale: Locale) -> Option<&LocalizedFields> {
    translations
        .get(locale.code())
        .or_else(|| translations.get(Locale::default().code()))
        .or_else(|| translations.first())
}

/// Normalize a validated item into a `Page`.
pub fn normalize_page(item: &LooseItem, locale: Locale) -> Page {
    let localized = Localized::resolve(item, locale);

    Page {
        id: item.id.clone(),
        slug: item.slug.clone(),
        title: localized.title(&item.slug),
        content_html: localized.content_html(),
        cover_image: item.hero_image.clone(),
        seo_title: localized.field(|f| &f.seo_title).map(String::from),
        seo_description: localized.field(|f| &f.seo_desc).map(String::from),
    }
}

/// Normalize a validated item into a `Post`.
pub fn normalize_post(item: &LooseItem, locale: Locale) -> Post {
    let localized = Localized::resolve(item, locale);
    let content_html = localized.content_html();

    let excerpt = localized
        .field(|f| &f.excerpt)
        .or_else(|| localized.field(|f| &f.summary))
        .map(String::from)
        .or_else(|| {
            content_html
                .as_deref()
                .and_then(|html| html_to_excerpt(html, EXCERPT_BUDGET))
        });

    Post {
        id: item.id.clone(),
        slug: item.slug.clone(),
        title: localized.title(&item.slug),
        excerpt,
        content_html,
        cover_image: item.hero_image.clone(),
        published_at: item.published_at.clone(),
        tags: item.tags.clone(),
        seo_title: localized.field(|f| &f.seo_title).map(String::from),
        seo_description: localized.field(|f| &f.seo_desc).map(String::from),
    }
}

/// Heuristic: does the string contain at least one HTML tag?
pub fn looks_like_html(s: &str) -> bool {
    LOOKS_LIKE_HTML_REGEX
        .get_or_init(|| Regex::new(r"(?i)</?[a-z][\s\S]*>").expect("valid regex"))
        .is_match(s)
}

/// Pass HTML through; wrap plain text or markdown in a paragraph.
pub fn to_html(body: &str) -> String {
    if looks_like_html(body) {
        body.to_string()
    } else {
        format!("<p>{}</p>", body)
    }
}

/// Strip tags, collapse whitespace and truncate to `max` characters.
pub fn html_to_excerpt(html: &str, max: usize) -> Option<String> {
    let stripped = HTML_TAG_REGEX
        .get_or_init(|| Regex::new(r"<[^>]+>").expect("valid regex"))
        .replace_all(html, " ");
    let text = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    let excerpt = truncate_chars(&text, max).trim_end().to_string();

    if excerpt.is_empty() {
        None
    } else {
        Some(excerpt)
    }
}
