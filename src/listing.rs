//! Paginated wishlist scraping.
//!
//! [`ListingScraper::scrape`] returns a [`Listing`], a forward-only iterator
//! that fetches page N+1 only after every row of page N has been yielded.
//! Iteration ends at the first page with no rows, or after `max_pages` pages
//! when that is non-zero. An empty first page means either a bad session or
//! an empty wishlist; the two are not told apart here.

use std::collections::VecDeque;

use scraper::{ElementRef, Html, Selector};

use crate::config;
use crate::error::{Result, WishlistError};
use crate::models::{parse_price, Availability, WishlistItem};
use crate::transport::Transport;

const ROW_SELECTOR: &str = "div.row";
const LINK_SELECTOR: &str = "a";
const PRICE_SELECTOR: &str = "span.price";
const STOCK_SELECTOR: &str = "span.stock";

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| WishlistError::Parse(format!("bad selector {:?}: {}", css, e)))
}

fn element_text(el: &ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Parse every row of a listing page, in document order.
///
/// Each row is parsed independently so that a malformed row does not hide
/// the rows before it. An empty vector means the page had no rows.
pub fn parse_listing_page(html: &str, base_url: &str) -> Result<Vec<Result<WishlistItem>>> {
    let rows = selector(ROW_SELECTOR)?;
    let link = selector(LINK_SELECTOR)?;
    let price = selector(PRICE_SELECTOR)?;
    let stock = selector(STOCK_SELECTOR)?;

    let document = Html::parse_document(html);
    Ok(document
        .select(&rows)
        .map(|row| parse_row(&row, base_url, &link, &price, &stock))
        .collect())
}

fn parse_row(
    row: &ElementRef<'_>,
    base_url: &str,
    link: &Selector,
    price: &Selector,
    stock: &Selector,
) -> Result<WishlistItem> {
    let anchor = row
        .select(link)
        .next()
        .ok_or_else(|| WishlistError::Parse("wishlist row has no link".into()))?;
    let href = anchor
        .value()
        .attr("href")
        .ok_or_else(|| WishlistError::Parse("wishlist link has no href".into()))?;

    // Fall back to the whole row when the sub-element is missing
    let price_text = row
        .select(price)
        .next()
        .map(|el| element_text(&el))
        .unwrap_or_else(|| element_text(row));
    let stock_text = row
        .select(stock)
        .next()
        .map(|el| element_text(&el))
        .unwrap_or_else(|| element_text(row));

    Ok(WishlistItem {
        link: format!("{}{}", base_url, href),
        label: element_text(&anchor),
        availability: Availability::from_marker(&stock_text, config::IN_STOCK),
        price: parse_price(&price_text)?,
    })
}

fn wishlist_url(base_url: &str, page: u32) -> String {
    format!("{}{}?page={}", base_url, config::WISHLIST_PATH, page)
}

// ---------------------------------------------------------------------------
// ListingScraper
// ---------------------------------------------------------------------------

/// Fetches wishlist pages for a session token.
pub struct ListingScraper<'a> {
    transport: &'a dyn Transport,
    base_url: &'a str,
}

impl<'a> ListingScraper<'a> {
    pub fn new(transport: &'a dyn Transport, base_url: &'a str) -> Self {
        Self {
            transport,
            base_url,
        }
    }

    /// URL of the 1-based `page` of the wishlist.
    pub fn page_url(&self, page: u32) -> String {
        wishlist_url(self.base_url, page)
    }

    /// Lazily iterate wishlist items.
    ///
    /// `max_pages == 0` keeps paging until a page has no rows.
    pub fn scrape(&self, token: &'a str, max_pages: u32) -> Listing<'a> {
        Listing {
            transport: self.transport,
            base_url: self.base_url,
            token,
            max_pages,
            next_page: 1,
            buffered: VecDeque::new(),
            done: false,
        }
    }
}

/// Cursor over the wishlist: one fetched page buffered at a time.
///
/// Yields `Err` at most once; the iterator is exhausted afterwards.
pub struct Listing<'a> {
    transport: &'a dyn Transport,
    base_url: &'a str,
    token: &'a str,
    max_pages: u32,
    next_page: u32,
    buffered: VecDeque<Result<WishlistItem>>,
    done: bool,
}

impl Listing<'_> {
    /// Number of pages fetched so far.
    pub fn pages_fetched(&self) -> u32 {
        self.next_page - 1
    }

    fn fetch_next_page(&mut self) -> Result<()> {
        let page = self.next_page;
        let url = wishlist_url(self.base_url, page);
        let resp = self.transport.get(&url, Some(self.token))?;
        self.next_page += 1;

        let rows = parse_listing_page(&resp.body, self.base_url)?;
        tracing::debug!("Wishlist page {} has {} rows", page, rows.len());
        if rows.is_empty() {
            self.done = true;
        }
        self.buffered.extend(rows);
        Ok(())
    }

    fn exhausted_pages(&self) -> bool {
        self.max_pages > 0 && self.pages_fetched() >= self.max_pages
    }
}

impl Iterator for Listing<'_> {
    type Item = Result<WishlistItem>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.buffered.pop_front() {
                if item.is_err() {
                    self.done = true;
                    self.buffered.clear();
                }
                return Some(item);
            }
            if self.done || self.exhausted_pages() {
                return None;
            }
            if let Err(e) = self.fetch_next_page() {
                self.done = true;
                return Some(Err(e));
            }
        }
    }
}
