// src/services/parser/oai.rs

//! OAI-PMH `ListRecords` pages in the `arXiv` metadata format.

use chrono::{DateTime, NaiveDate, Utc};

use super::ParsedPage;
use super::xml::{self, Node, attr};
use crate::error::{AppError, Result};
use crate::models::RawRecord;
use crate::utils::text::normalize_whitespace;

/// OAI error code meaning "the query matched nothing".
const NO_RECORDS_MATCH: &str = "noRecordsMatch";

#[derive(Default)]
struct RecordBuilder {
    header_id: String,
    meta_id: String,
    title: String,
    abstract_text: String,
    authors: Vec<String>,
    created: Option<DateTime<Utc>>,
    deleted: bool,
}

impl RecordBuilder {
    fn build(self) -> RawRecord {
        let raw_id = if self.meta_id.trim().is_empty() {
            self.header_id
        } else {
            self.meta_id
        };
        RawRecord {
            raw_id: raw_id.trim().to_string(),
            title: self.title,
            abstract_text: self.abstract_text,
            authors: self.authors,
            created: self.created,
            deleted: self.deleted,
        }
    }
}

#[derive(Default)]
struct AuthorParts {
    keyname: String,
    forenames: String,
    suffix: String,
}

impl AuthorParts {
    fn display(&self) -> String {
        normalize_whitespace(&format!("{} {} {}", self.forenames, self.keyname, self.suffix))
    }
}

/// Parse a `ListRecords` response.
///
/// `noRecordsMatch` yields an empty page; any other OAI error is fatal.
pub fn parse_oai_page(body: &str, uri: &str) -> Result<ParsedPage> {
    let mut page = ParsedPage::default();
    let mut current: Option<RecordBuilder> = None;
    let mut author = AuthorParts::default();
    let mut error: Option<(String, String)> = None;

    xml::walk(body, uri, "OAI-PMH", |path, node| {
        let parent = path.last().map(String::as_str);
        match node {
            Node::Open { name, attrs } => match name {
                "record" => current = Some(RecordBuilder::default()),
                "header" => {
                    if let Some(record) = current.as_mut() {
                        record.deleted = attr(attrs, "status") == Some("deleted");
                    }
                }
                "author" => author = AuthorParts::default(),
                "error" if parent == Some("OAI-PMH") => {
                    let code = attr(attrs, "code").unwrap_or("unknown").to_string();
                    error = Some((code, String::new()));
                }
                _ => {}
            },
            Node::Close { name, text } => {
                if name == "resumptionToken" {
                    page.set_token(&text);
                    return Ok(());
                }
                if name == "error" && parent == Some("OAI-PMH") {
                    if let Some((_, message)) = error.as_mut() {
                        *message = normalize_whitespace(&text);
                    }
                    return Ok(());
                }
                if name == "record" {
                    if let Some(record) = current.take() {
                        page.accept(record.build());
                    }
                    return Ok(());
                }

                let Some(record) = current.as_mut() else {
                    return Ok(());
                };
                match (parent, name) {
                    (Some("header"), "identifier") => record.header_id = text,
                    (Some("arXiv"), "id") => record.meta_id = text,
                    (Some("arXiv"), "title") => record.title = normalize_whitespace(&text),
                    (Some("arXiv"), "abstract") => {
                        record.abstract_text = normalize_whitespace(&text)
                    }
                    (Some("arXiv"), "created") => record.created = parse_date(&text),
                    (Some("author"), "keyname") => author.keyname = text,
                    (Some("author"), "forenames") => author.forenames = text,
                    (Some("author"), "suffix") => author.suffix = text,
                    (Some("authors"), "author") => {
                        let display = author.display();
                        if !display.is_empty() {
                            record.authors.push(display);
                        }
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    })?;

    match error {
        Some((code, _)) if code == NO_RECORDS_MATCH => {
            log::debug!("No records match {uri}");
            Ok(ParsedPage::default())
        }
        Some((code, message)) => Err(AppError::feed(uri, format!("{code}: {message}"))),
        None => Ok(page),
    }
}

fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
