use anyhow::{bail, Result};
use clap::Parser;

pub const DEFAULT_API_BASE: &str = "https://hn.algolia.com/api/v1";
pub const DEFAULT_QUERY: &str = "redux";
pub const DEFAULT_HITS_PER_PAGE: u32 = 100;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const MAX_HITS_PER_PAGE: u32 = 1000;

#[derive(Debug, Clone, Parser)]
#[command(name = "hn-search-browser", version, about = "Browse Hacker News search results")]
pub struct Config {
    /// Base URL of the search API
    #[arg(long, env = "HN_SEARCH_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Number of stories requested per page
    #[arg(long, env = "HN_SEARCH_HITS_PER_PAGE", default_value_t = DEFAULT_HITS_PER_PAGE)]
    pub hits_per_page: u32,

    /// Search term submitted on startup
    #[arg(long, env = "HN_SEARCH_QUERY", default_value = DEFAULT_QUERY)]
    pub query: String,

    /// Per-request timeout in seconds
    #[arg(long, env = "HN_SEARCH_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            hits_per_page: DEFAULT_HITS_PER_PAGE,
            query: DEFAULT_QUERY.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.api_base.trim().is_empty() {
            bail!("api base URL must not be empty");
        }
        if !(1..=MAX_HITS_PER_PAGE).contains(&self.hits_per_page) {
            bail!(
                "hits per page must be between 1 and {}, got {}",
                MAX_HITS_PER_PAGE,
                self.hits_per_page
            );
        }
        if self.timeout_secs == 0 {
            bail!("timeout must be at least one second");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_parsed_defaults() {
        let parsed = Config::try_parse_from(["hn-search-browser"]).unwrap();
        let default = Config::default();
        assert_eq!(parsed.hits_per_page, default.hits_per_page);
        assert_eq!(parsed.timeout_secs, default.timeout_secs);
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn flags_override_defaults() {
        let config = Config::try_parse_from([
            "hn-search-browser",
            "--query",
            "tokio",
            "--hits-per-page",
            "20",
        ])
        .unwrap();
        assert_eq!(config.query, "tokio");
        assert_eq!(config.hits_per_page, 20);
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        let too_many = Config {
            hits_per_page: 5000,
            ..Config::default()
        };
        assert!(too_many.validate().is_err());

        let zero_timeout = Config {
            timeout_secs: 0,
            ..Config::default()
        };
        assert!(zero_timeout.validate().is_err());

        let no_base = Config {
            api_base: "  ".to_string(),
            ..Config::default()
        };
        assert!(no_base.validate().is_err());
    }
}
