//! Shared test fixtures for the wishlist integration tests.
//!
//! Provides `FakeTransport`, an in-memory [`Transport`] that serves canned
//! pages by URL and records every request, plus HTML builders for login and
//! wishlist pages.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use mtg_wishlist::{Response, Result, Transport, WishlistClient, WishlistError};

pub const BASE: &str = "https://ck.test";

/// One request seen by the fake transport.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: &'static str,
    pub url: String,
    pub session: Option<String>,
    pub form: BTreeMap<String, String>,
}

#[derive(Clone)]
enum Route {
    Page(Response),
    Status(u16),
}

/// Serves canned responses keyed by `"METHOD url"`. Unknown routes are 404.
#[derive(Clone, Default)]
pub struct FakeTransport {
    routes: HashMap<String, Route>,
    pub log: Rc<RefCell<Vec<Request>>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_get(mut self, url: &str, body: &str) -> Self {
        self.routes.insert(
            format!("GET {}", url),
            Route::Page(Response {
                status: 200,
                body: body.to_string(),
                cookies: HashMap::new(),
            }),
        );
        self
    }

    pub fn on_post(mut self, url: &str, body: &str, cookies: &[(&str, &str)]) -> Self {
        self.routes.insert(
            format!("POST {}", url),
            Route::Page(Response {
                status: 200,
                body: body.to_string(),
                cookies: cookies
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            }),
        );
        self
    }

    pub fn on_fail(mut self, method: &str, url: &str, status: u16) -> Self {
        self.routes.insert(format!("{} {}", method, url), Route::Status(status));
        self
    }

    /// Requests seen so far, in order.
    pub fn requests(&self) -> Vec<Request> {
        self.log.borrow().clone()
    }

    pub fn urls(&self) -> Vec<String> {
        self.log.borrow().iter().map(|r| r.url.clone()).collect()
    }

    fn respond(&self, method: &'static str, url: &str) -> Result<Response> {
        match self.routes.get(&format!("{} {}", method, url)) {
            Some(Route::Page(resp)) => Ok(resp.clone()),
            Some(Route::Status(status)) => Err(WishlistError::Status {
                status: *status,
                url: url.to_string(),
            }),
            None => Err(WishlistError::Status {
                status: 404,
                url: url.to_string(),
            }),
        }
    }
}

impl Transport for FakeTransport {
    fn get(&self, url: &str, session: Option<&str>) -> Result<Response> {
        self.log.borrow_mut().push(Request {
            method: "GET",
            url: url.to_string(),
            session: session.map(str::to_string),
            form: BTreeMap::new(),
        });
        self.respond("GET", url)
    }

    fn post_form(&self, url: &str, fields: &BTreeMap<String, String>) -> Result<Response> {
        self.log.borrow_mut().push(Request {
            method: "POST",
            url: url.to_string(),
            session: None,
            form: fields.clone(),
        });
        self.respond("POST", url)
    }
}

/// Build a client over `transport`, keeping a handle to its request log.
pub fn client(transport: FakeTransport) -> (WishlistClient, FakeTransport) {
    let handle = transport.clone();
    let client = WishlistClient::builder()
        .base_url(BASE)
        .transport(transport)
        .build()
        .unwrap();
    (client, handle)
}

pub fn login_url() -> String {
    format!("{}/customer_login", BASE)
}

pub fn profile_url() -> String {
    format!("{}/myaccount/profile", BASE)
}

pub fn page_url(page: u32) -> String {
    format!("{}/myaccount/wishlist?page={}", BASE, page)
}

/// Login page with two forms, hidden anti-forgery fields and visible inputs.
pub const LOGIN_PAGE: &str = r#"
<html><body>
  <form action="/search" method="get">
    <input type="hidden" name="search_token" value="s-123">
    <input type="text" name="q" value="">
  </form>
  <form action="/customer_login" method="post">
    <input type="hidden" name="_token" value="csrf-abc">
    <input type="HIDDEN" name="redirect" value="/myaccount">
    <input type="hidden" value="no-name">
    <input type="email" name="email" value="">
    <input type="password" name="password" value="">
  </form>
  <input type="hidden" name="outside" value="ignored">
</body></html>
"#;

pub const PROFILE_LOGGED_IN: &str = "<html><body><h1>My Account</h1></body></html>";

pub const PROFILE_LOGGED_OUT: &str = r#"<html><body>
  <form action="/customer_login"><input type="email" name="email"></form>
</body></html>"#;

/// A wishlist row as `(href, name, price, stock)`.
pub type Row<'a> = (&'a str, &'a str, &'a str, &'a str);

pub fn wishlist_page(rows: &[Row<'_>]) -> String {
    let mut html = String::from("<html><body><div class=\"wishlist\">\n");
    for (href, name, price, stock) in rows {
        html.push_str(&format!(
            "<div class=\"row\">\
               <a href=\"{}\"> {} </a>\
               <span class=\"price\">{}</span>\
               <span class=\"stock\"> {} </span>\
             </div>\n",
            href, name, price, stock
        ));
    }
    html.push_str("</div></body></html>");
    html
}

pub fn empty_page() -> String {
    wishlist_page(&[])
}
