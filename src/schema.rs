//! Defensive validation of raw content API payloads.
//!
//! The upstream schema differs between endpoints and has changed over time.
//! Validation here is deliberately loose: only the identity fields (`id`,
//! `slug`) are required, wrongly-typed optional fields are dropped, and
//! unknown fields are kept in `extra`. The two historical shapes (a flat,
//! already-localized record and a `translations` map keyed by locale) are
//! recorded in `ContentShape` but not resolved; that is the normalizer's job.

use crate::error::SchemaError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;
use tracing::debug;

/// Fields understood by the validator; anything else lands in `LooseItem::extra`.
const KNOWN_FIELDS: &[&str] = &[
    "id",
    "slug",
    "title",
    "summary",
    "excerpt",
    "body_html",
    "body_md",
    "seo_title",
    "seo_desc",
    "translations",
    "tags",
    "published_at",
    "hero_image",
];

/// Content identifier; the API has used both numeric and string ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentId {
    Number(Number),
    Text(String),
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentId::Number(n) => write!(f, "{}", n),
            ContentId::Text(s) => f.write_str(s),
        }
    }
}

/// Localizable text fields, shared by the flat shape and translation records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalizedFields {
    pub title: Option<String>,
    pub body_html: Option<String>,
    pub body_md: Option<String>,
    pub summary: Option<String>,
    pub excerpt: Option<String>,
    pub seo_title: Option<String>,
    pub seo_desc: Option<String>,
}

impl LocalizedFields {
    fn from_object(obj: &Map<String, Value>) -> Self {
        Self {
            title: text_field(obj, "title"),
            body_html: text_field(obj, "body_html"),
            body_md: text_field(obj, "body_md"),
            summary: text_field(obj, "summary"),
            excerpt: text_field(obj, "excerpt"),
            seo_title: text_field(obj, "seo_title"),
            seo_desc: text_field(obj, "seo_desc"),
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Translation records keyed by locale code, in upstream order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Translations(Vec<(String, LocalizedFields)>);

impl Translations {
    pub fn get(&self, code: &str) -> Option<&LocalizedFields> {
        self.0
            .iter()
            .find(|(locale, _)| locale == code)
            .map(|(_, fields)| fields)
    }

    /// The first record the API sent.
    pub fn first(&self) -> Option<&LocalizedFields> {
        self.0.first().map(|(_, fields)| fields)
    }

    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(locale, _)| locale.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, LocalizedFields)> for Translations {
    fn from_iter<I: IntoIterator<Item = (String, LocalizedFields)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Which historical response shape an item arrived in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentShape {
    /// Public detail instance: fields already localized by the API.
    Flat(LocalizedFields),
    /// List/admin shape: every locale under `translations`.
    Translated(Translations),
    /// Both at once; flat fields take precedence.
    Hybrid {
        flat: LocalizedFields,
        translations: Translations,
    },
    /// Identity only, no localized text at all.
    Bare,
}

impl ContentShape {
    fn from_parts(flat: LocalizedFields, translations: Translations) -> Self {
        match (flat.is_empty(), translations.is_empty()) {
            (true, true) => ContentShape::Bare,
            (false, true) => ContentShape::Flat(flat),
            (true, false) => ContentShape::Translated(translations),
            (false, false) => ContentShape::Hybrid { flat, translations },
        }
    }

    pub fn flat(&self) -> Option<&LocalizedFields> {
        match self {
            ContentShape::Flat(flat) | ContentShape::Hybrid { flat, .. } => Some(flat),
            _ => None,
        }
    }

    pub fn translations(&self) -> Option<&Translations> {
        match self {
            ContentShape::Translated(translations) | ContentShape::Hybrid { translations, .. } => {
                Some(translations)
            }
            _ => None,
        }
    }
}

/// A content item validated for identity only.
#[derive(Debug, Clone, PartialEq)]
pub struct LooseItem {
    pub id: ContentId,
    pub slug: String,
    pub shape: ContentShape,
    /// Empty when absent or not a list of strings
    pub tags: Vec<String>,
    pub published_at: Option<String>,
    /// Only the plain string form of `hero_image`; media objects are dropped
    pub hero_image: Option<String>,
    /// Unknown fields, kept for forward compatibility
    pub extra: Map<String, Value>,
}

/// A paginated API response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Paginated<T> {
    /// Transform every result while keeping the pagination cursors.
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Paginated<U> {
        Paginated {
            count: self.count,
            next: self.next,
            previous: self.previous,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}

/// A navigation group as returned by `/navigation/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawNavGroup {
    /// Menu identifier ("main", "footer", ...)
    pub slug: String,
    pub entries: Vec<RawNavEntry>,
}

/// A navigation entry before resolution. Missing strings are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawNavEntry {
    pub label: String,
    pub url: String,
    pub order: Option<i64>,
    pub new_tab: bool,
    pub children: Vec<RawNavEntry>,
}

/// Validate a single content item.
pub fn validate_item(raw: &Value) -> Result<LooseItem, SchemaError> {
    item_from_value(raw).map_err(|reason| SchemaError::new("Content item", reason, raw))
}

/// Validate a list response.
///
/// Accepts the paginated envelope (`count`/`next`/`previous`/`results`) and,
/// for endpoints that skip pagination, a bare JSON array.
pub fn validate_page(raw: &Value) -> Result<Paginated<LooseItem>, SchemaError> {
    let fail = |reason: String| SchemaError::new("Content list", reason, raw);

    let (items, count, next, previous) = match raw {
        Value::Array(items) => (items, None, None, None),
        Value::Object(obj) => {
            let items = obj
                .get("results")
                .and_then(Value::as_array)
                .ok_or_else(|| fail("missing required array `results`".to_string()))?;
            (
                items,
                obj.get("count").and_then(Value::as_u64),
                text_field(obj, "next"),
                text_field(obj, "previous"),
            )
        }
        _ => return Err(fail("expected an object or an array".to_string())),
    };

    let results = items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            item_from_value(item).map_err(|reason| fail(format!("results[{}]: {}", index, reason)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Paginated {
        count: count.unwrap_or(results.len() as u64),
        next,
        previous,
        results,
    })
}

/// Validate the navigation groups payload.
///
/// Groups without a usable slug are skipped rather than rejected.
pub fn validate_nav_groups(raw: &Value) -> Result<Vec<RawNavGroup>, SchemaError> {
    let groups = match raw {
        Value::Array(groups) => groups,
        Value::Object(obj) => obj
            .get("results")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                SchemaError::new("Navigation", "expected an array of menu groups", raw)
            })?,
        _ => {
            return Err(SchemaError::new(
                "Navigation",
                "expected an array of menu groups",
                raw,
            ))
        }
    };

    Ok(groups
        .iter()
        .filter_map(|group| {
            let obj = group.as_object()?;
            let slug = text_field(obj, "slug")?;
            let entries = array_field(obj, &["items", "entries"])
                .map(|items| items.iter().filter_map(nav_entry_from_value).collect())
                .unwrap_or_default();
            Some(RawNavGroup { slug, entries })
        })
        .collect())
}

fn item_from_value(raw: &Value) -> Result<LooseItem, String> {
    let obj = raw
        .as_object()
        .ok_or_else(|| "expected a JSON object".to_string())?;

    let id = match obj.get("id") {
        Some(Value::Number(n)) => ContentId::Number(n.clone()),
        Some(Value::String(s)) => ContentId::Text(s.clone()),
        Some(_) => return Err("`id` must be a string or number".to_string()),
        None => return Err("missing required field `id`".to_string()),
    };

    let slug = match obj.get("slug") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(_) => return Err("`slug` must be a string or number".to_string()),
        None => return Err("missing required field `slug`".to_string()),
    };

    let flat = LocalizedFields::from_object(obj);
    let translations = match obj.get("translations") {
        Some(Value::Object(map)) => map
            .iter()
            .filter_map(|(locale, record)| match record.as_object() {
                Some(fields) => Some((locale.clone(), LocalizedFields::from_object(fields))),
                None => {
                    debug!("Ignoring non-object translation '{}' on '{}'", locale, slug);
                    None
                }
            })
            .collect(),
        Some(Value::Null) | None => Translations::default(),
        Some(_) => {
            debug!("Ignoring malformed `translations` on '{}'", slug);
            Translations::default()
        }
    };

    let tags = match obj.get("tags") {
        Some(Value::Array(items)) => items
            .iter()
            .map(|tag| tag.as_str().map(String::from))
            .collect::<Option<Vec<_>>>()
            .unwrap_or_default(),
        _ => Vec::new(),
    };

    let extra = obj
        .iter()
        .filter(|(key, _)| !KNOWN_FIELDS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    Ok(LooseItem {
        id,
        slug,
        shape: ContentShape::from_parts(flat, translations),
        tags,
        published_at: text_field(obj, "published_at"),
        hero_image: text_field(obj, "hero_image"),
        extra,
    })
}

fn nav_entry_from_value(raw: &Value) -> Option<RawNavEntry> {
    let obj = raw.as_object()?;

    let order = obj.get("order").and_then(|v| {
        v.as_i64()
            .or_else(|| v.as_f64().map(|f| f.round() as i64))
    });

    Some(RawNavEntry {
        label: obj
            .get("label")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        url: obj
            .get("url")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        order,
        new_tab: obj.get("new_tab").and_then(Value::as_bool).unwrap_or(false),
        children: array_field(obj, &["children", "children_list"])
            .map(|items| items.iter().filter_map(nav_entry_from_value).collect())
            .unwrap_or_default(),
    })
}

/// A non-blank string field; anything else counts as absent.
fn text_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        Some(Value::String(_)) | Some(Value::Null) | None => None,
        Some(other) => {
            debug!("Ignoring `{}` of unexpected type: {}", key, other);
            None
        }
    }
}

/// The first of `keys` holding an array.
fn array_field<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Vec<Value>> {
    keys.iter().find_map(|key| obj.get(*key).and_then(Value::as_array))
}
