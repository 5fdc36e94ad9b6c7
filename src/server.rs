//! HTTP surface: locale redirects, content JSON, navigation, feeds.

use crate::api::ApiClient;
use crate::config::Config;
use crate::content::{self, MAX_LIST_PAGES};
use crate::error::ContentError;
use crate::feed::{self, RESERVED_PAGE_SLUGS};
use crate::i18n::{route, Locale, LocaleRoute};
use crate::navigation::{resolve_menu, NavItem};
use crate::normalize::{Page, Post};
use crate::schema::Paginated;
use axum::{
    extract::{Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Json, Redirect, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, warn};

/// Edge caching for a successfully resolved menu.
pub const NAV_CACHE_CONTROL: &str = "s-maxage=300, stale-while-revalidate=60";

/// Header marking a degraded navigation response.
pub const NAV_FALLBACK_HEADER: &str = "x-nav-fallback";

const HEALTH_PATH: &str = "/health";
const DEFAULT_MENU: &str = "main";

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub client: ApiClient,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(client: ApiClient, config: Config) -> Self {
        Self {
            client,
            config: Arc::new(config),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(HEALTH_PATH, get(health))
        .route("/api/nav", get(api_nav))
        .route("/rss.xml", get(rss_xml))
        .route("/sitemap.xml", get(sitemap_xml))
        .route("/:locale", get(home))
        .route("/:locale/writing", get(list_writing))
        .route("/:locale/writing/:slug", get(writing_detail))
        .route("/:locale/projects", get(list_projects))
        .route("/:locale/projects/:slug", get(project_detail))
        .route("/:locale/about", get(about))
        .route("/:locale/contact", get(contact))
        .route("/:locale/page/:slug", get(page_with_menu))
        .fallback(not_found)
        .with_state(state)
        .layer(middleware::from_fn(locale_redirect))
        .layer(TraceLayer::new_for_http())
}

/// The menu served when the navigation API is unavailable.
pub fn fallback_menu() -> Vec<NavItem> {
    vec![
        NavItem::internal("Home", ""),
        NavItem::internal("About", "about"),
        NavItem::internal("Writing", "writing"),
        NavItem::internal("Projects", "projects"),
        NavItem::internal("Contact", "contact"),
    ]
}

impl IntoResponse for ContentError {
    fn into_response(self) -> Response {
        let status = match &self {
            ContentError::NotFound { .. } => StatusCode::NOT_FOUND,
            ContentError::Fetch { .. } | ContentError::Parse { .. } => StatusCode::BAD_GATEWAY,
            ContentError::Schema(_) | ContentError::InvalidUrl { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if status == StatusCode::NOT_FOUND {
            debug!("{}", self);
        } else {
            error!("Request failed ({}): {}", self.kind(), self);
        }

        let body = json!({"error": self.kind(), "message": self.to_string()});
        (status, Json(body)).into_response()
    }
}

// --- Middleware ---

/// Redirect paths without a locale prefix to the default-locale equivalent.
async fn locale_redirect(request: Request, next: Next) -> Response {
    let path = request.uri().path();
    if path == HEALTH_PATH {
        return next.run(request).await;
    }

    match route(path) {
        LocaleRoute::PassThrough => next.run(request).await,
        LocaleRoute::Redirect(target) => {
            let location = match request.uri().query() {
                Some(query) => format!("{}?{}", target, query),
                None => target,
            };
            debug!("Redirecting {} to {}", path, location);
            Redirect::permanent(&location).into_response()
        }
    }
}

// --- Handlers ---

#[derive(Debug, Deserialize)]
struct NavQuery {
    locale: Option<String>,
    menu: Option<String>,
}

#[derive(Debug, Serialize)]
struct HomeView {
    locale: Locale,
    menu: Vec<NavItem>,
    posts: Paginated<Post>,
}

#[derive(Debug, Serialize)]
struct ContactView {
    locale: Locale,
    menu: Vec<NavItem>,
}

#[derive(Debug, Serialize)]
struct PageView {
    page: Page,
    menu: Vec<NavItem>,
}

async fn health() -> &'static str {
    "ok"
}

async fn api_nav(State(state): State<AppState>, Query(query): Query<NavQuery>) -> Response {
    let locale = Locale::parse_or_default(query.locale.as_deref());
    let menu = query
        .menu
        .map(|m| m.trim().to_lowercase())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| DEFAULT_MENU.to_string());

    match resolve_menu(&state.client, locale, &menu).await {
        Ok(items) => ([(header::CACHE_CONTROL.as_str(), NAV_CACHE_CONTROL)], Json(items)).into_response(),
        Err(e) => {
            warn!("Navigation '{}' for {} unavailable, serving fallback: {}", menu, locale, e);
            (
                [
                    (header::CACHE_CONTROL.as_str(), "no-store"),
                    (NAV_FALLBACK_HEADER, "1"),
                ],
                Json(fallback_menu()),
            )
                .into_response()
        }
    }
}

async fn home(State(state): State<AppState>, Path(locale): Path<String>) -> Result<Json<HomeView>, ContentError> {
    let locale = locale_param(&locale)?;
    let (posts, menu) = tokio::join!(
        content::list_posts(&state.client, locale),
        menu_or_fallback(&state.client, locale)
    );

    Ok(Json(HomeView {
        locale,
        menu,
        posts: posts?,
    }))
}

async fn list_writing(
    State(state): State<AppState>,
    Path(locale): Path<String>,
) -> Result<Json<Paginated<Post>>, ContentError> {
    let locale = locale_param(&locale)?;
    Ok(Json(content::list_posts(&state.client, locale).await?))
}

async fn writing_detail(
    State(state): State<AppState>,
    Path((locale, slug)): Path<(String, String)>,
) -> Result<Json<Post>, ContentError> {
    let locale = locale_param(&locale)?;
    Ok(Json(content::get_post(&state.client, &slug, locale).await?))
}

async fn list_projects(
    State(state): State<AppState>,
    Path(locale): Path<String>,
) -> Result<Json<Paginated<Page>>, ContentError> {
    let locale = locale_param(&locale)?;
    let mut pages = content::list_pages(&state.client, locale).await?;

    let before = pages.results.len();
    pages
        .results
        .retain(|page| !RESERVED_PAGE_SLUGS.contains(&page.slug.as_str()));
    pages.count = pages
        .count
        .saturating_sub((before - pages.results.len()) as u64);

    Ok(Json(pages))
}

async fn project_detail(
    State(state): State<AppState>,
    Path((locale, slug)): Path<(String, String)>,
) -> Result<Json<Page>, ContentError> {
    let locale = locale_param(&locale)?;
    Ok(Json(content::get_page(&state.client, &slug, locale).await?))
}

async fn about(State(state): State<AppState>, Path(locale): Path<String>) -> Result<Json<Page>, ContentError> {
    let locale = locale_param(&locale)?;
    Ok(Json(content::get_page(&state.client, "about", locale).await?))
}

async fn contact(State(state): State<AppState>, Path(locale): Path<String>) -> Result<Json<ContactView>, ContentError> {
    let locale = locale_param(&locale)?;
    let menu = menu_or_fallback(&state.client, locale).await;
    Ok(Json(ContactView { locale, menu }))
}

async fn page_with_menu(
    State(state): State<AppState>,
    Path((locale, slug)): Path<(String, String)>,
) -> Result<Json<PageView>, ContentError> {
    let locale = locale_param(&locale)?;
    let (page, menu) = tokio::join!(
        content::get_page(&state.client, &slug, locale),
        menu_or_fallback(&state.client, locale)
    );

    Ok(Json(PageView { page: page?, menu }))
}

async fn rss_xml(State(state): State<AppState>) -> Result<Response, ContentError> {
    let posts = feed::posts_by_locale(&state.client, MAX_LIST_PAGES).await?;
    let channels: Vec<_> = posts
        .iter()
        .map(|(locale, posts)| feed::rss_channel(&state.config.site_url, *locale, posts))
        .collect();

    Ok((
        [(header::CONTENT_TYPE, "application/rss+xml; charset=utf-8")],
        feed::rss_document(&channels),
    )
        .into_response())
}

async fn sitemap_xml(State(state): State<AppState>) -> Result<Response, ContentError> {
    let (posts, pages) = tokio::try_join!(
        feed::posts_by_locale(&state.client, MAX_LIST_PAGES),
        feed::pages_by_locale(&state.client)
    )?;

    Ok((
        [(header::CONTENT_TYPE, "application/xml; charset=utf-8")],
        feed::sitemap(&state.config.site_url, &posts, &pages),
    )
        .into_response())
}

async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"error": "not_found", "message": "No route for this path"})),
    )
        .into_response()
}

// --- Helpers ---

fn locale_param(code: &str) -> Result<Locale, ContentError> {
    Locale::parse(code).ok_or_else(|| ContentError::NotFound {
        kind: "Locale",
        slug: code.to_string(),
    })
}

async fn menu_or_fallback(client: &ApiClient, locale: Locale) -> Vec<NavItem> {
    match resolve_menu(client, locale, DEFAULT_MENU).await {
        Ok(items) => items,
        Err(e) => {
            warn!("Main menu for {} unavailable, using fallback: {}", locale, e);
            fallback_menu()
        }
    }
}
