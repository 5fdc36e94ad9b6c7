//! Content API client: URL building, locale headers, status checks and the
//! read cache.

use crate::cache::RevalidateCache;
use crate::config::Config;
use crate::error::{truncate_chars, ContentError, Result, BODY_EXCERPT_LIMIT};
use crate::i18n::Locale;
use regex::Regex;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE};
use reqwest::Url;
use serde_json::Value;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::{debug, warn};

/// Revalidate window for slow-changing content (pages, navigation, post details).
pub const DEFAULT_REVALIDATE: u64 = 300;

/// Revalidate window for frequently changing content (post listings).
pub const LISTING_REVALIDATE: u64 = 60;

static ABSOLUTE_URL_REGEX: OnceLock<Regex> = OnceLock::new();

/// Whether `s` is an absolute http(s) URL.
pub fn is_absolute_url(s: &str) -> bool {
    ABSOLUTE_URL_REGEX
        .get_or_init(|| Regex::new(r"(?i)^https?://").expect("valid regex"))
        .is_match(s)
}

/// Per-request options for `ApiClient::fetch`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Seconds a cached response stays fresh; `Some(0)` disables caching,
    /// `None` uses `DEFAULT_REVALIDATE`
    pub revalidate: Option<u64>,
    /// Append `lang` and `site` query parameters when missing
    pub add_query_params: bool,
}

impl FetchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options used for single items and navigation.
    pub fn detail() -> Self {
        Self {
            revalidate: Some(DEFAULT_REVALIDATE),
            add_query_params: true,
        }
    }

    /// Options used for post listings.
    pub fn listing() -> Self {
        Self {
            revalidate: Some(LISTING_REVALIDATE),
            add_query_params: true,
        }
    }

    pub fn with_revalidate(mut self, seconds: u64) -> Self {
        self.revalidate = Some(seconds);
        self
    }

    pub fn with_query_params(mut self, enabled: bool) -> Self {
        self.add_query_params = enabled;
        self
    }

    fn revalidate_secs(&self) -> u64 {
        self.revalidate.unwrap_or(DEFAULT_REVALIDATE)
    }
}

/// HTTP client for the headless content API.
///
/// Cheap to clone; clones share the connection pool and the read cache.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    site_slug: Option<String>,
    cache: Arc<RevalidateCache>,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_base(
            &config.api_base,
            config.site_slug.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn with_base(base: &str, site_slug: Option<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("content-front/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ContentError::InvalidUrl {
                url: base.to_string(),
                reason: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            http,
            base: normalize_base(base)?,
            site_slug,
            cache: Arc::new(RevalidateCache::new()),
        })
    }

    /// Replace the read cache, e.g. with a different capacity.
    pub fn with_cache(mut self, cache: RevalidateCache) -> Self {
        self.cache = Arc::new(cache);
        self
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn cache(&self) -> &RevalidateCache {
        &self.cache
    }

    /// Resolve `path` against the base and attach locale/site parameters.
    ///
    /// Absolute URLs (e.g. pagination cursors) are used unchanged apart from
    /// the query parameters.
    pub fn build_url(&self, path: &str, locale: Locale, options: &FetchOptions) -> Result<Url> {
        if path.trim().is_empty() {
            return Err(ContentError::InvalidUrl {
                url: path.to_string(),
                reason: "path must be provided".to_string(),
            });
        }

        let parsed = if is_absolute_url(path) {
            Url::parse(path)
        } else {
            self.base.join(path.trim_start_matches('/'))
        };
        let mut url = parsed.map_err(|e| ContentError::InvalidUrl {
            url: path.to_string(),
            reason: e.to_string(),
        })?;

        if options.add_query_params {
            if !has_query_param(&url, "lang") {
                url.query_pairs_mut().append_pair("lang", locale.code());
            }
            if let Some(site) = &self.site_slug {
                if !has_query_param(&url, "site") {
                    url.query_pairs_mut().append_pair("site", site);
                }
            }
        }

        Ok(url)
    }

    /// Fetch a JSON document from the content API.
    ///
    /// Single attempt; resilience comes from the read cache and edge caching.
    pub async fn fetch(&self, path: &str, locale: Locale, options: &FetchOptions) -> Result<Value> {
        let url = self.build_url(path, locale, options)?;
        let revalidate = options.revalidate_secs();
        let cache_key = format!("{}|{}", locale, url);

        if revalidate > 0 {
            if let Some(value) = self.cache.get(&cache_key, Duration::from_secs(revalidate)) {
                debug!("Cache hit: {}", url);
                return Ok(value);
            }
        }

        debug!("GET {} (Accept-Language: {})", url, locale);
        let response = self
            .http
            .get(url.clone())
            .header(ACCEPT, "application/json")
            .header(ACCEPT_LANGUAGE, locale.code())
            .send()
            .await
            .map_err(|e| {
                warn!("Request to {} failed: {}", url, e);
                ContentError::Fetch {
                    status: None,
                    url: url.to_string(),
                    body: e.to_string(),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Content API returned {} for {}", status, url);
            return Err(ContentError::Fetch {
                status: Some(status.as_u16()),
                url: url.to_string(),
                body: truncate_chars(&body, BODY_EXCERPT_LIMIT),
            });
        }

        let bytes = response.bytes().await.map_err(|e| ContentError::Fetch {
            status: Some(status.as_u16()),
            url: url.to_string(),
            body: e.to_string(),
        })?;

        let value: Value = serde_json::from_slice(&bytes).map_err(|source| ContentError::Parse {
            url: url.to_string(),
            source,
        })?;

        if revalidate > 0 {
            self.cache
                .insert(cache_key, value.clone(), Duration::from_secs(revalidate));
        }

        Ok(value)
    }
}

/// Strip whitespace and make sure the base ends in `/` so joins append to it.
fn normalize_base(raw: &str) -> Result<Url> {
    let cleaned: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let with_slash = if cleaned.ends_with('/') {
        cleaned
    } else {
        format!("{}/", cleaned)
    };

    Url::parse(&with_slash).map_err(|e| ContentError::InvalidUrl {
        url: raw.to_string(),
        reason: format!("invalid API base URL: {}", e),
    })
}

fn has_query_param(url: &Url, name: &str) -> bool {
    url.query_pairs().any(|(key, _)| key == name)
}
