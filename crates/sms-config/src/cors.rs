//! Origins allowed to call the service from a browser.
//!
//! `ALLOWED_ORIGINS` is a comma-separated list. Credentials (the token and
//! anti-forgery cookies) are allowed, so a wildcard is never used.

use std::env;

const DEFAULT_ORIGINS: &str = "http://localhost:3000,http://localhost:8080";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    pub fn from_env() -> Self {
        let origins = env::var("ALLOWED_ORIGINS").unwrap_or_else(|_| DEFAULT_ORIGINS.to_string());
        Self::parse(&origins)
    }

    fn parse(origins: &str) -> Self {
        Self {
            allowed_origins: origins
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty() && *s != "*")
                .map(str::to_string)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_and_skips_blanks() {
        let config = CorsConfig::parse(" http://a.test , ,http://b.test,");
        assert_eq!(config.allowed_origins, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn test_parse_drops_wildcard() {
        let config = CorsConfig::parse("*,http://a.test");
        assert_eq!(config.allowed_origins, vec!["http://a.test"]);
    }

    #[test]
    fn test_default_origins() {
        let config = CorsConfig::parse(DEFAULT_ORIGINS);
        assert_eq!(config.allowed_origins.len(), 2);
    }
}
