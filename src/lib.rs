//! Locale-aware content resolution for a headless CMS front-end.
//!
//! Raw API payloads flow through `api` (fetch), `schema` (loose validation)
//! and `normalize` (locale fallback into canonical models). `content`,
//! `navigation` and `feed` compose those steps; `server` exposes them over HTTP.

pub mod api;
pub mod cache;
pub mod config;
pub mod content;
pub mod error;
pub mod feed;
pub mod i18n;
pub mod navigation;
pub mod normalize;
pub mod schema;
pub mod server;

pub use api::{ApiClient, FetchOptions};
pub use config::Config;
pub use error::{ContentError, SchemaError};
pub use i18n::Locale;
pub use navigation::NavItem;
pub use normalize::{Page, Post};
