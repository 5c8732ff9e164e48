//! Protocol constants and environment-driven settings.
//!
//! Every option is read from an `MTG_*` key. Empty values count as unset, so
//! `MTG_FORMAT=` behaves the same as leaving the variable out.

use crate::credentials::Credentials;
use crate::error::{Result, WishlistError};
use crate::report::OutputFormat;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_DOMAIN: &str = "https://www.cardkingdom.com";
pub const LOGIN_PATH: &str = "/customer_login";
pub const WISHLIST_PATH: &str = "/myaccount/wishlist";
pub const PROFILE_PATH: &str = "/myaccount/profile";

/// Cookie carrying the server-side session identifier.
pub const SESSION_COOKIE: &str = "laravel_session";

/// Stock marker text that maps to [`Availability::Available`](crate::models::Availability).
pub const IN_STOCK: &str = "In Stock";

pub const EMAIL_FIELD: &str = "email";
pub const PASSWORD_FIELD: &str = "password";

// curl's default User-Agent is rejected by the origin
pub const DEFAULT_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:108.0) Gecko/20100101 Firefox/108.0";

pub const DEFAULT_TIMEOUT_SECS: f64 = 10.0;
pub const DEFAULT_THRESHOLD: u64 = 599;

pub const ENV_DOMAIN: &str = "MTG_DOMAIN";
pub const ENV_AGENT: &str = "MTG_AGENT";
pub const ENV_LIMIT: &str = "MTG_LIMIT";
pub const ENV_PAGES: &str = "MTG_PAGES";
pub const ENV_CENTS: &str = "MTG_CENTS";
pub const ENV_FORMAT: &str = "MTG_FORMAT";
pub const ENV_COOKIE: &str = "MTG_COOKIE";
pub const ENV_SECRET: &str = "MTG_SECRET";
/// Older name for [`ENV_SECRET`], read only when `MTG_SECRET` is unset.
pub const ENV_CREDENTIALS: &str = "MTG_CREDENTIALS";
pub const ENV_CREDENTIALS_FILE: &str = "MTG_CREDENTIALS_FILE";

/// Default location of the appended `identity:secret` file.
pub fn default_credentials_file() -> PathBuf {
    if let Some(dir) = dirs::config_dir() {
        dir.join("mtg-wishlist").join("credentials")
    } else {
        PathBuf::from(".mtg-wishlist-credentials")
    }
}

/// Runtime options for one invocation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub base_url: String,
    pub user_agent: String,
    pub timeout: Duration,
    /// Pagination cap; `0` pages until an empty page.
    pub max_pages: u32,
    /// Affordability cutoff in cents.
    pub threshold: u64,
    pub format: OutputFormat,
    /// Pre-existing session token; skips authentication when set.
    pub session: Option<String>,
    pub credentials: Option<Credentials>,
    pub credentials_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_DOMAIN.to_string(),
            user_agent: DEFAULT_AGENT.to_string(),
            timeout: Duration::from_secs_f64(DEFAULT_TIMEOUT_SECS),
            max_pages: 0,
            threshold: DEFAULT_THRESHOLD,
            format: OutputFormat::Text,
            session: None,
            credentials: None,
            credentials_file: default_credentials_file(),
        }
    }
}

impl Settings {
    /// Load settings from the process environment.
    ///
    /// The binary loads `.env` into the environment before calling this.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings from an arbitrary key lookup.
    ///
    /// Unset or empty keys keep their defaults. A value that does not parse
    /// yields [`WishlistError::Configuration`] naming the key.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut settings = Self::default();

        if let Some(domain) = get(ENV_DOMAIN) {
            settings.base_url = domain.trim().trim_end_matches('/').to_string();
        }
        if let Some(agent) = get(ENV_AGENT) {
            settings.user_agent = agent;
        }
        if let Some(limit) = get(ENV_LIMIT) {
            let secs: f64 = parse_option(ENV_LIMIT, &limit)?;
            if !secs.is_finite() || secs <= 0.0 {
                return Err(WishlistError::Configuration(format!(
                    "{} must be a positive number of seconds, got {:?}",
                    ENV_LIMIT, limit
                )));
            }
            settings.timeout = Duration::from_secs_f64(secs);
        }
        if let Some(pages) = get(ENV_PAGES) {
            settings.max_pages = parse_option(ENV_PAGES, &pages)?;
        }
        if let Some(cents) = get(ENV_CENTS) {
            settings.threshold = parse_option(ENV_CENTS, &cents)?;
        }
        if let Some(format) = get(ENV_FORMAT) {
            settings.format = format.parse()?;
        }
        settings.session = get(ENV_COOKIE).map(|c| c.trim().to_string());
        if let Some(secret) = get(ENV_SECRET).or_else(|| get(ENV_CREDENTIALS)) {
            settings.credentials = Some(Credentials::parse(&secret));
        }
        if let Some(path) = get(ENV_CREDENTIALS_FILE) {
            settings.credentials_file = PathBuf::from(path);
        }

        Ok(settings)
    }
}

fn parse_option<T: FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim().parse().map_err(|_| {
        WishlistError::Configuration(format!("invalid value for {}: {:?}", key, raw))
    })
}
