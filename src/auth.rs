//! Two-step session-cookie login.
//!
//! 1. GET the login page and harvest every hidden `<input>` inside any
//!    `<form>`. The anti-forgery field names change per page load, so they are
//!    collected generically instead of into a fixed struct.
//! 2. POST the harvested fields plus `email`/`password` back to the same URL
//!    and read the session cookie off the response.
//!
//! The server hands out a session cookie even for wrong credentials. Use
//! [`SessionAuthenticator::verify`] to find out whether the token is actually
//! logged in.

use std::collections::BTreeMap;

use scraper::{Html, Selector};

use crate::config;
use crate::error::{Result, WishlistError};
use crate::transport::Transport;

/// Collect `name -> value` for every hidden input across all forms.
///
/// Inputs without a `name` are skipped; a missing `value` is recorded as
/// the empty string. Later duplicates overwrite earlier ones.
pub fn harvest_hidden_fields(html: &str) -> BTreeMap<String, String> {
    let document = Html::parse_document(html);
    let mut fields = BTreeMap::new();
    let Ok(forms) = Selector::parse("form") else {
        return fields;
    };
    let Ok(inputs) = Selector::parse("input") else {
        return fields;
    };

    for form in document.select(&forms) {
        for input in form.select(&inputs) {
            let attrs = input.value();
            let hidden = attrs
                .attr("type")
                .is_some_and(|t| t.eq_ignore_ascii_case("hidden"));
            if !hidden {
                continue;
            }
            if let Some(name) = attrs.attr("name") {
                fields.insert(name.to_string(), attrs.attr("value").unwrap_or("").to_string());
            }
        }
    }
    fields
}

/// True if the document contains at least one `<form>` element.
pub fn has_form(html: &str) -> bool {
    let document = Html::parse_document(html);
    match Selector::parse("form") {
        Ok(sel) => document.select(&sel).next().is_some(),
        Err(_) => false,
    }
}

// ---------------------------------------------------------------------------
// SessionAuthenticator
// ---------------------------------------------------------------------------

/// Performs the login handshake against `base_url`.
pub struct SessionAuthenticator<'a> {
    transport: &'a dyn Transport,
    base_url: &'a str,
}

impl<'a> SessionAuthenticator<'a> {
    pub fn new(transport: &'a dyn Transport, base_url: &'a str) -> Self {
        Self {
            transport,
            base_url,
        }
    }

    fn login_url(&self) -> String {
        format!("{}{}", self.base_url, config::LOGIN_PATH)
    }

    /// Exchange credentials for a session token.
    ///
    /// Returns an empty string when the POST response carries no session
    /// cookie. A non-empty token does **not** mean the credentials were
    /// accepted.
    pub fn authenticate(&self, identity: &str, secret: &str) -> Result<String> {
        if identity.trim().is_empty() {
            return Err(WishlistError::Configuration("missing account email".into()));
        }
        if secret.is_empty() {
            return Err(WishlistError::Configuration("missing account password".into()));
        }

        let url = self.login_url();
        let page = self.transport.get(&url, None)?;
        let mut fields = harvest_hidden_fields(&page.body);
        tracing::debug!("Harvested {} hidden login fields", fields.len());

        fields.insert(config::EMAIL_FIELD.to_string(), identity.to_string());
        fields.insert(config::PASSWORD_FIELD.to_string(), secret.to_string());

        let out = self.transport.post_form(&url, &fields)?;
        match out.cookie(config::SESSION_COOKIE) {
            Some(token) => Ok(token.to_string()),
            None => {
                tracing::warn!("Login response set no {} cookie", config::SESSION_COOKIE);
                Ok(String::new())
            }
        }
    }

    /// Check whether `token` is logged in.
    ///
    /// Fetches the profile page; an authenticated session sees no login form
    /// there.
    pub fn verify(&self, token: &str) -> Result<bool> {
        if token.is_empty() {
            return Ok(false);
        }
        let url = format!("{}{}", self.base_url, config::PROFILE_PATH);
        let page = self.transport.get(&url, Some(token))?;
        Ok(!has_form(&page.body))
    }

    /// [`authenticate`](Self::authenticate) followed by [`verify`](Self::verify).
    ///
    /// Fails with [`WishlistError::InvalidSession`] for an empty token or a
    /// profile page that still shows a login form.
    pub fn login_verified(&self, identity: &str, secret: &str) -> Result<String> {
        let token = self.authenticate(identity, secret)?;
        if token.is_empty() {
            return Err(WishlistError::InvalidSession(
                "login returned no session cookie".into(),
            ));
        }
        if !self.verify(&token)? {
            return Err(WishlistError::InvalidSession(format!(
                "login form still present for {}",
                identity
            )));
        }
        Ok(token)
    }
}
