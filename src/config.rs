use anyhow::{bail, Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    // Environment (development, production)
    pub environment: String,

    // Content API
    pub api_base: String,
    pub site_slug: Option<String>,
    pub request_timeout_secs: u64,

    // Public site
    pub site_url: String,

    // Server
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Called once at process start; everything downstream receives the
    /// resulting struct instead of reading the environment itself.
    pub fn from_env() -> Result<Self> {
        let api_base = std::env::var("NEXT_PUBLIC_API_BASE")
            .or_else(|_| std::env::var("API_BASE"))
            .context("API base URL is not configured (API_BASE / NEXT_PUBLIC_API_BASE)")?;

        let config = Self {
            environment: std::env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),

            // Content API
            api_base,
            site_slug: std::env::var("SITE_SLUG")
                .or_else(|_| std::env::var("NEXT_PUBLIC_SITE_SLUG"))
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),

            // Public site
            site_url: std::env::var("SITE_URL")
                .or_else(|_| std::env::var("NEXT_PUBLIC_SITE_URL"))
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),

            // Server
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that cannot possibly reach the content API.
    pub fn validate(&self) -> Result<()> {
        let base = self.api_base.trim();
        if base.is_empty() {
            bail!("API_BASE must not be empty");
        }
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            bail!("API_BASE must be an http(s) URL, got: {}", base);
        }
        if self.request_timeout_secs == 0 {
            bail!("REQUEST_TIMEOUT_SECS must be greater than zero");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "ENVIRONMENT",
        "API_BASE",
        "NEXT_PUBLIC_API_BASE",
        "SITE_SLUG",
        "NEXT_PUBLIC_SITE_SLUG",
        "SITE_URL",
        "NEXT_PUBLIC_SITE_URL",
        "REQUEST_TIMEOUT_SECS",
        "PORT",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_from_env_requires_api_base() {
        clear_env();

        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("API_BASE"));
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();
        std::env::set_var("API_BASE", "https://cms.example.com/api/v1");

        let config = Config::from_env().expect("config should load");

        assert_eq!(config.api_base, "https://cms.example.com/api/v1");
        assert_eq!(config.environment, "development");
        assert_eq!(config.site_slug, None);
        assert_eq!(config.site_url, "http://localhost:8080");
        assert_eq!(config.request_timeout_secs, 10);
        assert_eq!(config.port, 8080);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_fallback_names_and_overrides() {
        clear_env();
        std::env::set_var("NEXT_PUBLIC_API_BASE", "https://cms.example.com/");
        std::env::set_var("NEXT_PUBLIC_SITE_SLUG", "amare");
        std::env::set_var("SITE_URL", "https://example.com/");
        std::env::set_var("PORT", "3000");
        std::env::set_var("ENVIRONMENT", "production");

        let config = Config::from_env().expect("config should load");

        assert_eq!(config.api_base, "https://cms.example.com/");
        assert_eq!(config.site_slug.as_deref(), Some("amare"));
        assert_eq!(config.site_url, "https://example.com");
        assert_eq!(config.port, 3000);
        assert_eq!(config.environment, "production");

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_public_api_base_takes_precedence() {
        clear_env();
        std::env::set_var("API_BASE", "https://internal.example.com");
        std::env::set_var("NEXT_PUBLIC_API_BASE", "https://cms.example.com");

        let config = Config::from_env().expect("config should load");
        assert_eq!(config.api_base, "https://cms.example.com");

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_blank_site_slug_is_none() {
        clear_env();
        std::env::set_var("API_BASE", "https://cms.example.com");
        std::env::set_var("SITE_SLUG", "   ");

        let config = Config::from_env().expect("config should load");
        assert_eq!(config.site_slug, None);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_non_http_base() {
        clear_env();
        std::env::set_var("API_BASE", "ftp://cms.example.com");

        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("http(s)"));

        clear_env();
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = Config {
            environment: "test".to_string(),
            api_base: "https://cms.example.com".to_string(),
            site_slug: None,
            request_timeout_secs: 0,
            site_url: "https://example.com".to_string(),
            port: 8080,
        };

        assert!(config.validate().is_err());
    }
}
