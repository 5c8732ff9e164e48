//! Report rendering in text, CSV or JSON.
//!
//! A [`Report`] is a scoped session: [`Report::open`] writes the header,
//! [`Report::visit`] classifies and renders one item, and the footer is
//! written exactly once, either by [`Report::finish`] or when the report is
//! dropped on an early return.
//!
//! | format | stdout | stderr |
//! |---|---|---|
//! | text | one line per item | timestamp header, summary footer |
//! | csv  | `icon,usd,name,href` header, one row per item | nothing |
//! | json | one object at the end | nothing |

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use serde::Serialize;

use crate::classify::{Classification, Totals};
use crate::error::{Result, WishlistError};
use crate::models::{JsonItem, WishlistItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Csv,
    Json,
}

impl FromStr for OutputFormat {
    type Err = WishlistError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "text" => Ok(OutputFormat::Text),
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            other => Err(WishlistError::Configuration(format!(
                "unknown output format {:?} (expected text, csv or json)",
                other
            ))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputFormat::Text => "text",
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        })
    }
}

/// The single object emitted by the JSON format.
#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    #[serde(rename = "//")]
    summary: String,
    wishlist: &'a [JsonItem],
}

fn csv_field(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// An open formatting session over a primary and a diagnostic stream.
pub struct Report<'w> {
    format: OutputFormat,
    totals: Totals,
    visited: Vec<JsonItem>,
    out: &'w mut dyn Write,
    diag: &'w mut dyn Write,
    closed: bool,
}

impl<'w> Report<'w> {
    /// Open a report and write its header.
    pub fn open(
        format: OutputFormat,
        threshold: u64,
        out: &'w mut dyn Write,
        diag: &'w mut dyn Write,
    ) -> Result<Self> {
        let mut report = Self {
            format,
            totals: Totals::new(threshold),
            visited: Vec::new(),
            out,
            diag,
            closed: false,
        };
        report.header()?;
        Ok(report)
    }

    fn header(&mut self) -> Result<()> {
        match self.format {
            OutputFormat::Text => {
                let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.6f");
                writeln!(self.diag, "# executed @ {}", now)?;
            }
            OutputFormat::Csv => writeln!(self.out, "icon,usd,name,href")?,
            OutputFormat::Json => {}
        }
        Ok(())
    }

    /// Classify `item`, update the totals and render it.
    pub fn visit(&mut self, item: &WishlistItem) -> Result<Classification> {
        let class = self.totals.classify(item);
        match self.format {
            OutputFormat::Text => writeln!(
                self.out,
                " {} {:>8}: {:36} {}",
                item.availability.glyph(),
                item.usd(),
                item.label,
                item.link
            )?,
            OutputFormat::Csv => {
                let usd = item.usd();
                let row = [class.csv_tag(), usd.as_str(), item.label.as_str(), item.link.as_str()]
                    .iter()
                    .map(|s| csv_field(s))
                    .collect::<Vec<_>>()
                    .join(",");
                writeln!(self.out, "{}", row)?;
            }
            OutputFormat::Json => self.visited.push(JsonItem::from(item)),
        }
        Ok(class)
    }

    /// Counters accumulated so far.
    pub fn totals(&self) -> Totals {
        self.totals
    }

    fn footer(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        let summary = self.totals.summary();
        match self.format {
            OutputFormat::Text => writeln!(self.diag, "{}", summary)?,
            OutputFormat::Csv => {}
            OutputFormat::Json => {
                let report = JsonReport {
                    summary,
                    wishlist: &self.visited,
                };
                serde_json::to_writer(&mut *self.out, &report)?;
                writeln!(self.out)?;
            }
        }
        self.out.flush()?;
        Ok(())
    }

    /// Write the footer and return the final totals.
    pub fn finish(mut self) -> Result<Totals> {
        self.footer()?;
        Ok(self.totals)
    }
}

impl Drop for Report<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.footer() {
            tracing::warn!("Failed to write report footer: {}", e);
        }
    }
}
