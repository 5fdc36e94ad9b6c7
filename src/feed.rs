//! RSS and sitemap documents derived from normalized content.

use crate::api::ApiClient;
use crate::content::{list_all_posts, list_pages};
use crate::error::Result;
use crate::i18n::Locale;
use crate::normalize::{Page, Post};
use futures::future::try_join_all;
use rss::{Category, Channel, Guid, Item};
use std::fmt::Write;
use tracing::info;

/// Static sections listed in the sitemap for every locale ("" is the root,
/// served at `/{locale}` without a trailing slash).
pub const STATIC_SECTIONS: &[&str] = &["", "/writing", "/projects", "/about", "/contact"];

/// Page slugs that have their own section and are not listed under projects.
pub const RESERVED_PAGE_SLUGS: &[&str] = &["about"];

/// Posts for every enabled locale, fetched concurrently.
pub async fn posts_by_locale(client: &ApiClient, max_pages: usize) -> Result<Vec<(Locale, Vec<Post>)>> {
    let locales = Locale::all();
    let posts = try_join_all(
        locales
            .iter()
            .map(|locale| list_all_posts(client, *locale, max_pages)),
    )
    .await?;

    Ok(locales.into_iter().zip(posts).collect())
}

/// First page of pages for every enabled locale, fetched concurrently.
pub async fn pages_by_locale(client: &ApiClient) -> Result<Vec<(Locale, Vec<Page>)>> {
    let locales = Locale::all();
    let pages = try_join_all(locales.iter().map(|locale| list_pages(client, *locale))).await?;

    Ok(locales
        .into_iter()
        .zip(pages.into_iter().map(|page| page.results))
        .collect())
}

/// One RSS channel of posts for `locale`.
pub fn rss_channel(site_url: &str, locale: Locale, posts: &[Post]) -> Channel {
    let site_url = site_url.trim_end_matches('/');

    let items = posts
        .iter()
        .map(|post| {
            let link = format!("{}/{}/writing/{}", site_url, locale, post.slug);

            let mut guid = Guid::default();
            guid.set_value(link.clone());
            guid.set_permalink(true);

            let mut item = Item::default();
            item.set_title(post.title.clone());
            item.set_link(link);
            item.set_guid(guid);
            item.set_description(post.excerpt.clone().unwrap_or_default());
            item.set_pub_date(post.published_at_utc().map(|dt| dt.to_rfc2822()));
            item.set_categories(
                post.tags
                    .iter()
                    .map(|tag| {
                        let mut category = Category::default();
                        category.set_name(tag.clone());
                        category
                    })
                    .collect::<Vec<_>>(),
            );
            item
        })
        .collect::<Vec<_>>();

    let mut channel = Channel::default();
    channel.set_title(format!("Writing ({})", locale.code().to_uppercase()));
    channel.set_link(format!("{}/{}/writing", site_url, locale));
    channel.set_description("Essays and notes");
    channel.set_language(locale.code().to_string());
    channel.set_items(items);
    channel
}

/// A single RSS 2.0 document holding every channel, in order.
pub fn rss_document(channels: &[Channel]) -> String {
    let body: String = channels
        .iter()
        .filter_map(|channel| {
            let xml = channel.to_string();
            let start = xml.find("<channel>")?;
            let end = xml.rfind("</channel>")? + "</channel>".len();
            Some(xml[start..end].to_string())
        })
        .collect();

    info!("Rendered RSS document with {} channels", channels.len());
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?><rss version=\"2.0\">{}</rss>",
        body
    )
}

/// Sitemap listing static sections, posts and pages for every locale.
pub fn sitemap(
    site_url: &str,
    posts_by_locale: &[(Locale, Vec<Post>)],
    pages_by_locale: &[(Locale, Vec<Page>)],
) -> String {
    let site_url = site_url.trim_end_matches('/');
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );

    for locale in Locale::all() {
        for &section in STATIC_SECTIONS {
            let loc = format!("{}/{}{}", site_url, locale, section);
            let priority = if section.is_empty() { 1.0 } else { 0.6 };
            push_url(&mut xml, &loc, None, "weekly", priority);
        }
    }

    for (locale, posts) in posts_by_locale {
        for post in posts {
            let loc = format!("{}/{}/writing/{}", site_url, locale, post.slug);
            let lastmod = post
                .published_at_utc()
                .map(|dt| dt.format("%Y-%m-%d").to_string());
            push_url(&mut xml, &loc, lastmod.as_deref(), "monthly", 0.7);
        }
    }

    for (locale, pages) in pages_by_locale {
        for page in pages
            .iter()
            .filter(|page| !RESERVED_PAGE_SLUGS.contains(&page.slug.as_str()))
        {
            let loc = format!("{}/{}/projects/{}", site_url, locale, page.slug);
            push_url(&mut xml, &loc, None, "monthly", 0.5);
        }
    }

    xml.push_str("</urlset>\n");
    xml
}

fn push_url(xml: &mut String, loc: &str, lastmod: Option<&str>, changefreq: &str, priority: f32) {
    // Writing to a String cannot fail
    let _ = write!(xml, "  <url><loc>{}</loc>", escape_xml(loc));
    if let Some(lastmod) = lastmod {
        let _ = write!(xml, "<lastmod>{}</lastmod>", lastmod);
    }
    let _ = writeln!(
        xml,
        "<changefreq>{}</changefreq><priority>{:.1}</priority></url>",
        changefreq, priority
    );
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
