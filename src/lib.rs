//! Card Kingdom wishlist scraper.
//!
//! Logs in through the site's session-cookie form, pages through the
//! wishlist, classifies every card as buy / watch / out-of-stock against a
//! price threshold, and renders a text, CSV or JSON report.
//!
//! # Quick start
//!
//! ```no_run
//! use mtg_wishlist::{OutputFormat, WishlistClient};
//!
//! let client = WishlistClient::builder().build().unwrap();
//!
//! // Obtain a session token (the server issues one even for bad credentials)
//! let token = client.auth().login_verified("me@example.com", "hunter2").unwrap();
//!
//! // Scrape, classify and print
//! let mut out = std::io::stdout();
//! let mut err = std::io::stderr();
//! let totals = client
//!     .report(&token, 0, OutputFormat::Text, 599, &mut out, &mut err)
//!     .unwrap();
//! ```

pub mod auth;
pub mod classify;
pub mod config;
pub mod credentials;
pub mod error;
pub mod listing;
pub mod models;
pub mod report;
pub mod transport;

pub use auth::SessionAuthenticator;
pub use classify::{classify, Classification, Totals};
pub use config::Settings;
pub use credentials::{CredentialStore, Credentials};
pub use error::{Result, WishlistError};
pub use listing::{Listing, ListingScraper};
pub use models::{money, parse_price, Availability, WishlistItem, MAX_PRICE_CENTS};
pub use report::{OutputFormat, Report};
pub use transport::{HttpTransport, Response, Transport};

use std::fmt;
use std::io::Write;
use std::time::Duration;

// ---------------------------------------------------------------------------
// WishlistClientBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`WishlistClient`].
///
/// Use [`WishlistClient::builder()`] to obtain a builder, chain configuration
/// methods, and call [`build()`](WishlistClientBuilder::build).
pub struct WishlistClientBuilder {
    base_url: String,
    user_agent: String,
    timeout: Duration,
    transport: Option<Box<dyn Transport>>,
}

impl Default for WishlistClientBuilder {
    fn default() -> Self {
        Self {
            base_url: config::DEFAULT_DOMAIN.to_string(),
            user_agent: config::DEFAULT_AGENT.to_string(),
            timeout: Duration::from_secs_f64(config::DEFAULT_TIMEOUT_SECS),
            transport: None,
        }
    }
}

impl WishlistClientBuilder {
    /// Origin for every endpoint. A trailing slash is dropped.
    pub fn base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Override the User-Agent header.
    ///
    /// The origin rejects the default user agents of HTTP client libraries.
    pub fn user_agent(mut self, agent: &str) -> Self {
        self.user_agent = agent.to_string();
        self
    }

    /// Per-request timeout. Defaults to 10 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Use a custom transport instead of the `reqwest` one.
    ///
    /// `user_agent` and `timeout` are ignored when a transport is supplied.
    pub fn transport<T: Transport + 'static>(mut self, transport: T) -> Self {
        self.transport = Some(Box::new(transport));
        self
    }

    /// Copy base URL, user agent and timeout from loaded [`Settings`].
    pub fn settings(self, settings: &Settings) -> Self {
        self.base_url(&settings.base_url)
            .user_agent(&settings.user_agent)
            .timeout(settings.timeout)
    }

    pub fn build(self) -> Result<WishlistClient> {
        let transport = match self.transport {
            Some(t) => t,
            None => Box::new(HttpTransport::new(&self.user_agent, self.timeout)?),
        };
        Ok(WishlistClient {
            base_url: self.base_url,
            transport,
        })
    }
}

// ---------------------------------------------------------------------------
// WishlistClient
// ---------------------------------------------------------------------------

/// Entry point: owns the transport and hands out borrowing component
/// wrappers.
pub struct WishlistClient {
    base_url: String,
    transport: Box<dyn Transport>,
}

impl WishlistClient {
    pub fn builder() -> WishlistClientBuilder {
        WishlistClientBuilder::default()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Access the login handshake.
    pub fn auth(&self) -> SessionAuthenticator<'_> {
        SessionAuthenticator::new(self.transport.as_ref(), &self.base_url)
    }

    /// Access the wishlist pager.
    pub fn scraper(&self) -> ListingScraper<'_> {
        ListingScraper::new(self.transport.as_ref(), &self.base_url)
    }

    /// Scrape the wishlist for `token`, classify every item and render the
    /// report to `out` / `diag`.
    ///
    /// No report is opened until the first item arrives: a wishlist that
    /// yields nothing fails with [`WishlistError::InvalidSession`] without
    /// writing a header or footer. A failure on a later page still closes the
    /// report (lines already written stand) and is returned.
    pub fn report(
        &self,
        token: &str,
        max_pages: u32,
        format: OutputFormat,
        threshold: u64,
        out: &mut dyn Write,
        diag: &mut dyn Write,
    ) -> Result<Totals> {
        if token.is_empty() {
            return Err(WishlistError::InvalidSession("empty session token".into()));
        }
        let mut items = self.scraper().scrape(token, max_pages);
        let first = match items.next() {
            Some(item) => item?,
            None => {
                return Err(WishlistError::InvalidSession(
                    "bad session or nothing in wishlist".into(),
                ))
            }
        };

        let mut report = Report::open(format, threshold, out, diag)?;
        report.visit(&first)?;
        let mut count = 1;
        for item in items.by_ref() {
            report.visit(&item?)?;
            count += 1;
        }
        tracing::info!(
            "Visited {} wishlist items over {} pages",
            count,
            items.pages_fetched()
        );
        report.finish()
    }
}

impl fmt::Display for WishlistClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WishlistClient(base_url={})", self.base_url)
    }
}
