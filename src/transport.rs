//! Blocking HTTP transport.
//!
//! [`Transport`] is the seam between the protocol logic and the network:
//! the authenticator and the listing scraper only ever see a [`Response`]
//! (status, body, cookies set by that response). [`HttpTransport`] is the
//! `reqwest` implementation used in production.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{COOKIE, USER_AGENT};

use crate::config;
use crate::error::{Result, WishlistError};

/// A fully-read HTTP response.
#[derive(Debug, Clone, Default)]
pub struct Response {
    pub status: u16,
    pub body: String,
    /// Cookies set by this response, by name.
    pub cookies: HashMap<String, String>,
}

impl Response {
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }
}

/// Minimal request surface needed by the login handshake and the scraper.
///
/// Implementations must turn non-2xx statuses into
/// [`WishlistError::Status`] rather than returning them as a `Response`.
pub trait Transport {
    /// GET `url`, carrying `session` as the session cookie when given.
    fn get(&self, url: &str, session: Option<&str>) -> Result<Response>;

    /// POST `fields` as `application/x-www-form-urlencoded`.
    fn post_form(&self, url: &str, fields: &BTreeMap<String, String>) -> Result<Response>;
}

/// `reqwest`-backed transport with a cookie store, fixed User-Agent and
/// per-request timeout.
///
/// The cookie store lets the login GET and POST share whatever session seed
/// the server hands out on the first request.
pub struct HttpTransport {
    client: Client,
    user_agent: String,
}

impl HttpTransport {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self {
            client,
            user_agent: user_agent.to_string(),
        })
    }

    fn finish(url: &str, resp: reqwest::blocking::Response) -> Result<Response> {
        let status = resp.status();
        if !status.is_success() {
            return Err(WishlistError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let cookies = resp
            .cookies()
            .map(|c| (c.name().to_string(), c.value().to_string()))
            .collect();
        let body = resp.text()?;
        Ok(Response {
            status: status.as_u16(),
            body,
            cookies,
        })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str, session: Option<&str>) -> Result<Response> {
        tracing::debug!("GET {}", url);
        let mut req = self.client.get(url).header(USER_AGENT, &self.user_agent);
        if let Some(token) = session {
            req = req.header(COOKIE, format!("{}={}", config::SESSION_COOKIE, token));
        }
        let resp = req.send()?;
        Self::finish(url, resp)
    }

    fn post_form(&self, url: &str, fields: &BTreeMap<String, String>) -> Result<Response> {
        tracing::debug!("POST {} ({} fields)", url, fields.len());
        let resp = self
            .client
            .post(url)
            .header(USER_AGENT, &self.user_agent)
            .form(fields)
            .send()?;
        Self::finish(url, resp)
    }
}
