use anyhow::{Context, anyhow};
use marquee_core::{
    FinalizeOptions,
    fetch::{DEFAULT_LISTING_URL, DEFAULT_USER_AGENT},
};
use std::{env, net::SocketAddr, path::PathBuf, str::FromStr};

/// Server and ingest configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    // Server settings
    pub server_host: String,
    pub server_port: u16,

    // Snapshot storage
    pub data_dir: PathBuf,

    // Listing source
    pub listing_url: String,
    pub user_agent: String,
    pub listing_limit: usize,
    pub dedupe: bool,

    // CORS settings; `*` allows any origin
    pub cors_allowed_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".to_string(),
            server_port: 3000,
            data_dir: PathBuf::from("./data"),
            listing_url: DEFAULT_LISTING_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            listing_limit: 20,
            dedupe: true,
            cors_allowed_origins: vec!["*".to_string()],
        }
    }
}

impl Config {
    /// Load from the process environment, reading `.env` first if present.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unset keys take their defaults;
    /// set keys that fail to parse are errors.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            server_host: lookup("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: parse_var(&lookup, "SERVER_PORT")?.unwrap_or(defaults.server_port),

            data_dir: lookup("MARQUEE_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),

            listing_url: lookup("MARQUEE_LISTING_URL").unwrap_or(defaults.listing_url),
            user_agent: lookup("MARQUEE_USER_AGENT").unwrap_or(defaults.user_agent),
            listing_limit: parse_var(&lookup, "MARQUEE_LISTING_LIMIT")?
                .unwrap_or(defaults.listing_limit),
            dedupe: parse_var(&lookup, "MARQUEE_DEDUPE")?.unwrap_or(defaults.dedupe),

            cors_allowed_origins: lookup("CORS_ALLOWED_ORIGINS")
                .map(|raw| {
                    raw.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or(defaults.cors_allowed_origins),
        })
    }

    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.server_host, self.server_port)
            .parse()
            .with_context(|| {
                format!(
                    "invalid bind address {}:{}",
                    self.server_host, self.server_port
                )
            })
    }

    pub fn allows_any_origin(&self) -> bool {
        self.cors_allowed_origins.is_empty() || self.cors_allowed_origins.iter().any(|o| o == "*")
    }

    /// Cap and dedupe settings for an ingest run. `limit` overrides the
    /// configured cap.
    pub fn finalize_options(&self, limit: Option<usize>) -> FinalizeOptions {
        FinalizeOptions {
            limit: Some(limit.unwrap_or(self.listing_limit)),
            dedupe: self.dedupe,
        }
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|err| anyhow!("invalid value {raw:?} for {key}: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.listing_limit, 20);
        assert!(config.dedupe);
        assert!(config.allows_any_origin());
    }

    #[test]
    fn overrides_are_applied() {
        let config = Config::from_lookup(lookup_from(&[
            ("SERVER_HOST", "127.0.0.1"),
            ("SERVER_PORT", "8080"),
            ("MARQUEE_DATA_DIR", "/var/lib/marquee"),
            ("MARQUEE_LISTING_LIMIT", "5"),
            ("MARQUEE_DEDUPE", "false"),
            ("CORS_ALLOWED_ORIGINS", "http://a.test, http://b.test"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr().unwrap(), "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/marquee"));
        assert_eq!(config.listing_limit, 5);
        assert!(!config.dedupe);
        assert_eq!(config.cors_allowed_origins, ["http://a.test", "http://b.test"]);
        assert!(!config.allows_any_origin());
    }

    #[test]
    fn invalid_values_are_errors() {
        let err = Config::from_lookup(lookup_from(&[("SERVER_PORT", "eighty")])).unwrap_err();
        assert!(err.to_string().contains("SERVER_PORT"));

        assert!(Config::from_lookup(lookup_from(&[("MARQUEE_DEDUPE", "yes")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("MARQUEE_LISTING_LIMIT", "-1")])).is_err());
    }

    #[test]
    fn cli_limit_overrides_configured_cap() {
        let config = Config::default();
        assert_eq!(config.finalize_options(None).limit, Some(20));
        assert_eq!(config.finalize_options(Some(3)).limit, Some(3));
        assert!(config.finalize_options(None).dedupe);
    }
}
