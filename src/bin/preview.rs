//! Preview binary - resolves content against the live API and prints the result
//!
//! Usage:
//!   cargo run --bin preview -- nav [--menu footer] [--locale sv]
//!   cargo run --bin preview -- posts [--all] [--locale sv]
//!   cargo run --bin preview -- post <slug> [--locale sv]
//!   cargo run --bin preview -- pages [--locale sv]
//!   cargo run --bin preview -- page <slug> [--locale sv]
//!   cargo run --bin preview -- rss
//!   cargo run --bin preview -- sitemap
//!
//! Required environment variables:
//! - NEXT_PUBLIC_API_BASE (or API_BASE)
//!
//! Optional:
//! - SITE_SLUG
//! - SITE_URL (used by rss/sitemap)

use anyhow::{bail, Context, Result};
use content_front::content::{self, MAX_LIST_PAGES};
use content_front::{feed, navigation, ApiClient, Config, Locale};
use serde::Serialize;
use tracing::info;

/// Parsed command line
struct PreviewArgs {
    command: String,
    slug: Option<String>,
    locale: Locale,
    menu: String,
    all: bool,
}

impl PreviewArgs {
    fn parse(args: &[String]) -> Result<Self> {
        let mut positional = Vec::new();
        let mut locale = Locale::default();
        let mut menu = "main".to_string();
        let mut all = false;

        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--locale" => {
                    let code = iter.next().context("--locale needs a value")?;
                    locale = Locale::from_code(code)?;
                }
                "--menu" => {
                    menu = iter.next().context("--menu needs a value")?.clone();
                }
                "--all" => all = true,
                other => positional.push(other.to_string()),
            }
        }

        let mut positional = positional.into_iter();
        let command = positional
            .next()
            .context("Missing command (nav, posts, post, pages, page, rss, sitemap)")?;

        Ok(Self {
            command,
            slug: positional.next(),
            locale,
            menu,
            all,
        })
    }

    fn require_slug(&self) -> Result<&str> {
        self.slug
            .as_deref()
            .with_context(|| format!("'{}' needs a slug", self.command))
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("content_front=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    // Load environment from .env file
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let args = PreviewArgs::parse(&args)?;

    info!("Loading configuration...");
    let config = Config::from_env()?;
    let client = ApiClient::new(&config)?;
    let locale = args.locale;

    match args.command.as_str() {
        "nav" => {
            let items = navigation::resolve_menu(&client, locale, &args.menu).await?;
            print_json(&items)?;
        }
        "posts" if args.all => {
            let posts = content::list_all_posts(&client, locale, MAX_LIST_PAGES).await?;
            print_json(&posts)?;
        }
        "posts" => print_json(&content::list_posts(&client, locale).await?)?,
        "post" => print_json(&content::get_post(&client, args.require_slug()?, locale).await?)?,
        "pages" => print_json(&content::list_pages(&client, locale).await?)?,
        "page" => print_json(&content::get_page(&client, args.require_slug()?, locale).await?)?,
        "rss" => {
            let posts = feed::posts_by_locale(&client, MAX_LIST_PAGES).await?;
            let channels: Vec<_> = posts
                .iter()
                .map(|(locale, posts)| feed::rss_channel(&config.site_url, *locale, posts))
                .collect();
            println!("{}", feed::rss_document(&channels));
        }
        "sitemap" => {
            let (posts, pages) = tokio::try_join!(
                feed::posts_by_locale(&client, MAX_LIST_PAGES),
                feed::pages_by_locale(&client)
            )?;
            print!("{}", feed::sitemap(&config.site_url, &posts, &pages));
        }
        other => bail!("Unknown command: '{}'", other),
    }

    Ok(())
}
