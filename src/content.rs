//! Page and post lookups: fetch, validate, normalize.

use crate::api::{ApiClient, FetchOptions};
use crate::error::{ContentError, Result};
use crate::i18n::Locale;
use crate::normalize::{normalize_page, normalize_post, Page, Post};
use crate::schema::{validate_item, validate_page, Paginated};
use tracing::{debug, info, warn};

pub const POSTS_PATH: &str = "/content/posts/";
pub const PAGES_PATH: &str = "/content/pages/";

/// Upper bound on pages followed by `list_all_posts`.
pub const MAX_LIST_PAGES: usize = 20;

/// First page of posts for `locale`.
pub async fn list_posts(client: &ApiClient, locale: Locale) -> Result<Paginated<Post>> {
    list_posts_at(client, POSTS_PATH, locale).await
}

/// A page of posts at `path`, which may be an absolute `next` cursor.
pub async fn list_posts_at(client: &ApiClient, path: &str, locale: Locale) -> Result<Paginated<Post>> {
    let raw = client.fetch(path, locale, &FetchOptions::listing()).await?;
    let page = validate_page(&raw)?;
    Ok(page.map(|item| normalize_post(&item, locale)))
}

/// Every post for `locale`, following `next` cursors up to `max_pages` pages.
pub async fn list_all_posts(client: &ApiClient, locale: Locale, max_pages: usize) -> Result<Vec<Post>> {
    let mut posts = Vec::new();
    let mut cursor = Some(POSTS_PATH.to_string());
    let mut fetched = 0;

    while let Some(path) = cursor.take() {
        if fetched >= max_pages {
            warn!(
                "Stopped following post pagination for {} after {} pages",
                locale, max_pages
            );
            break;
        }

        let page = list_posts_at(client, &path, locale).await?;
        fetched += 1;
        posts.extend(page.results);
        cursor = page.next;
    }

    info!("Fetched {} posts for {} in {} pages", posts.len(), locale, fetched);
    Ok(posts)
}

/// A single post by slug.
///
/// Tries the detail route first. Deployments that do not expose it answer
/// 404/405, in which case the list endpoint is queried by slug. An empty
/// result is `ContentError::NotFound`.
pub async fn get_post(client: &ApiClient, slug: &str, locale: Locale) -> Result<Post> {
    let detail_path = format!("{}{}/", POSTS_PATH, urlencoding::encode(slug));

    match client.fetch(&detail_path, locale, &FetchOptions::detail()).await {
        Ok(raw) => {
            let item = validate_item(&raw)?;
            return Ok(normalize_post(&item, locale));
        }
        Err(e) if e.is_not_found_status() => {
            debug!("Post detail for '{}' unavailable, querying list by slug", slug);
        }
        Err(e) => return Err(e),
    }

    let query_path = format!("{}?slug={}", POSTS_PATH, urlencoding::encode(slug));
    let raw = client.fetch(&query_path, locale, &FetchOptions::detail()).await?;
    let page = validate_page(&raw)?;

    let position = page
        .results
        .iter()
        .position(|item| item.slug == slug)
        .or_else(|| (!page.results.is_empty()).then_some(0));

    match position {
        Some(index) => Ok(normalize_post(&page.results[index], locale)),
        None => Err(ContentError::NotFound {
            kind: "Post",
            slug: slug.to_string(),
        }),
    }
}

/// First page of pages for `locale`.
pub async fn list_pages(client: &ApiClient, locale: Locale) -> Result<Paginated<Page>> {
    let raw = client.fetch(PAGES_PATH, locale, &FetchOptions::detail()).await?;
    let page = validate_page(&raw)?;
    Ok(page.map(|item| normalize_page(&item, locale)))
}

/// A single page by slug; an upstream 404/405 becomes `ContentError::NotFound`.
pub async fn get_page(client: &ApiClient, slug: &str, locale: Locale) -> Result<Page> {
    let path = format!("{}{}/", PAGES_PATH, urlencoding::encode(slug));

    let raw = match client.fetch(&path, locale, &FetchOptions::detail()).await {
        Ok(raw) => raw,
        Err(e) if e.is_not_found_status() => {
            return Err(ContentError::NotFound {
                kind: "Page",
                slug: slug.to_string(),
            })
        }
        Err(e) => return Err(e),
    };

    let item = validate_item(&raw)?;
    Ok(normalize_page(&item, locale))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::RevalidateCache;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::{
        matchers::{method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    fn client(base: &str) -> ApiClient {
        ApiClient::with_base(base, None, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_list_posts_normalizes_results() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/content/posts/"))
            .and(query_param("lang", "sv"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 1,
                "next": null,
                "previous": null,
                "results": [{
                    "id": 1,
                    "slug": "hej",
                    "translations": {"sv": {"title": "Hej", "body_md": "Text"}}
                }]
            })))
            .mount(&mock_server)
            .await;

        let page = list_posts(&client(&mock_server.uri()), Locale::SWEDISH).await.unwrap();

        assert_eq!(page.count, 1);
        assert_eq!(page.results[0].title, "Hej");
        assert_eq!(page.results[0].content_html.as_deref(), Some("<p>Text</p>"));
        assert_eq!(page.results[0].excerpt.as_deref(), Some("Text"));
    }

    #[tokio::test]
    async fn test_list_posts_schema_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/content/posts/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{"slug": "missing-id"}]
            })))
            .mount(&mock_server)
            .await;

        let err = list_posts(&client(&mock_server.uri()), Locale::ENGLISH).await.unwrap_err();
        assert!(matches!(err, ContentError::Schema(_)));
    }

    #[tokio::test]
    async fn test_list_all_posts_follows_next() {
        let mock_server = MockServer::start().await;
        let next = format!("{}/content/posts/?page=2", mock_server.uri());

        Mock::given(method("GET"))
            .and(path("/content/posts/"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 2, "next": null, "previous": null,
                "results": [{"id": 2, "slug": "b"}]
            })))
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/content/posts/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 2, "next": next, "previous": null,
                "results": [{"id": 1, "slug": "a"}]
            })))
            .mount(&mock_server)
            .await;

        let posts = list_all_posts(&client(&mock_server.uri()), Locale::ENGLISH, MAX_LIST_PAGES)
            .await
            .unwrap();

        let slugs: Vec<_> = posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_list_all_posts_respects_page_bound() {
        let mock_server = MockServer::start().await;
        let next = format!("{}/content/posts/?page=2", mock_server.uri());

        Mock::given(method("GET"))
            .and(path("/content/posts/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 99, "next": next, "previous": null,
                "results": [{"id": 1, "slug": "a"}]
            })))
            .mount(&mock_server)
            .await;

        let posts = list_all_posts(&client(&mock_server.uri()), Locale::ENGLISH, 1)
            .await
            .unwrap();
        assert_eq!(posts.len(), 1);
    }

    #[tokio::test]
    async fn test_get_post_detail_route() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/content/posts/hello/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 5, "slug": "hello", "title": "Hello", "body_html": "<p>Hi</p>",
                "active_locale": "en"
            })))
            .mount(&mock_server)
            .await;

        let post = get_post(&client(&mock_server.uri()), "hello", Locale::ENGLISH)
            .await
            .unwrap();

        assert_eq!(post.title, "Hello");
        assert_eq!(post.excerpt.as_deref(), Some("Hi"));
    }

    #[tokio::test]
    async fn test_get_post_falls_back_to_slug_query() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/content/posts/hello/"))
            .respond_with(ResponseTemplate::new(405))
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/content/posts/"))
            .and(query_param("slug", "hello"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 2, "next": null, "previous": null,
                "results": [
                    {"id": 1, "slug": "other", "title": "Other"},
                    {"id": 2, "slug": "hello", "title": "Hello"}
                ]
            })))
            .mount(&mock_server)
            .await;

        let post = get_post(&client(&mock_server.uri()), "hello", Locale::ENGLISH)
            .await
            .unwrap();

        assert_eq!(post.title, "Hello");
    }

    #[tokio::test]
    async fn test_get_post_slug_is_percent_encoded() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/content/posts/a%20b%2Fc/"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/content/posts/"))
            .and(query_param("slug", "a b/c"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 1, "next": null, "previous": null,
                "results": [{"id": 3, "slug": "a b/c", "title": "Spaced"}]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let post = get_post(&client(&mock_server.uri()), "a b/c", Locale::ENGLISH)
            .await
            .unwrap();

        assert_eq!(post.title, "Spaced");
    }

    #[tokio::test]
    async fn test_get_post_not_found() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/content/posts/nope/"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/content/posts/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 0, "next": null, "previous": null, "results": []
            })))
            .mount(&mock_server)
            .await;

        let err = get_post(&client(&mock_server.uri()), "nope", Locale::ENGLISH)
            .await
            .unwrap_err();

        assert!(matches!(err, ContentError::NotFound { kind: "Post", .. }));
    }

    #[tokio::test]
    async fn test_unknown_slugs_do_not_grow_cache_past_capacity() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/content/posts/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 0, "next": null, "previous": null, "results": []
            })))
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let api = client(&mock_server.uri()).with_cache(RevalidateCache::with_capacity(8));
        for i in 0..40 {
            let err = get_post(&api, &format!("missing-{}", i), Locale::ENGLISH)
                .await
                .unwrap_err();
            assert!(matches!(err, ContentError::NotFound { .. }));
        }

        assert_eq!(api.cache().len(), 8);
    }

    #[tokio::test]
    async fn test_get_post_server_error_propagates() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/content/posts/hello/"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let err = get_post(&client(&mock_server.uri()), "hello", Locale::ENGLISH)
            .await
            .unwrap_err();

        assert!(matches!(err, ContentError::Fetch { status: Some(502), .. }));
    }

    #[tokio::test]
    async fn test_get_page_and_not_found() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/content/pages/about/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 1, "slug": "about",
                "translations": {"en": {"title": "About", "body_md": "Me"}}
            })))
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/content/pages/missing/"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let api = client(&mock_server.uri());
        let page = get_page(&api, "about", Locale::SWEDISH).await.unwrap();
        assert_eq!(page.title, "About");
        assert_eq!(page.content_html.as_deref(), Some("<p>Me</p>"));

        let err = get_page(&api, "missing", Locale::ENGLISH).await.unwrap_err();
        assert!(matches!(err, ContentError::NotFound { kind: "Page", .. }));
    }

    #[tokio::test]
    async fn test_list_pages() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/content/pages/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "slug": "about", "title": "About"},
                {"id": 2, "slug": "climate", "hero_image": "/c.jpg"}
            ])))
            .mount(&mock_server)
            .await;

        let pages = list_pages(&client(&mock_server.uri()), Locale::ENGLISH).await.unwrap();

        assert_eq!(pages.count, 2);
        assert_eq!(pages.results[1].title, "climate");
        assert_eq!(pages.results[1].cover_image.as_deref(), Some("/c.jpg"));
    }
}
