// src/services/parser/mod.rs

//! Feed page parsers.
//!
//! Each parser turns one page body into a [`ParsedPage`]. Individual entries
//! are tolerated independently (tombstones and entries without an identifier
//! are dropped), while a page that is not a well-formed document of the
//! expected kind fails the whole crawl.

mod atom;
mod listing;
mod oai;
pub(crate) mod xml;

pub use atom::parse_atom_page;
pub use listing::parse_listing_page;
pub use oai::parse_oai_page;

use crate::error::Result;
use crate::models::RawRecord;

/// Records recovered from one feed page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPage {
    /// Entries present on the page, dropped ones included
    pub entries: usize,
    /// Surviving records, in page order
    pub records: Vec<RawRecord>,
    /// Continuation token, when the feed returned a non-blank one
    pub token: Option<String>,
}

impl ParsedPage {
    /// Count an entry and keep it unless it is a tombstone or has no identifier.
    pub fn accept(&mut self, record: RawRecord) {
        self.entries += 1;
        if record.deleted {
            log::debug!("Dropping deleted record '{}'", record.raw_id);
            return;
        }
        if record.normalized_id().is_empty() {
            log::warn!(
                "Dropping record without identifier (title: '{}')",
                record.title
            );
            return;
        }
        self.records.push(record);
    }

    /// Store a continuation token, ignoring blank ones.
    pub fn set_token(&mut self, token: &str) {
        let token = token.trim();
        self.token = (!token.is_empty()).then(|| token.to_string());
    }
}

/// Page format, one per feed protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordParser {
    OaiPmh,
    Atom,
    Listing,
}

impl RecordParser {
    /// Parse one page body fetched from `uri`.
    pub fn parse(&self, body: &str, uri: &str) -> Result<ParsedPage> {
        match self {
            RecordParser::OaiPmh => parse_oai_page(body, uri),
            RecordParser::Atom => parse_atom_page(body, uri),
            RecordParser::Listing => parse_listing_page(body, uri),
        }
    }
}
