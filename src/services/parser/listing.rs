// src/services/parser/listing.rs

//! HTML "new submissions" listing pages.
//!
//! The listing is a `<dl>` of `<dt>` (links) / `<dd>` (metadata) pairs. It is
//! parsed leniently and always fits on one page.

use scraper::{ElementRef, Html, Selector};

use super::ParsedPage;
use crate::error::{AppError, Result};
use crate::models::RawRecord;
use crate::utils::text::normalize_whitespace;

const ITEM_SELECTOR: &str = "dl dt";
const ABSTRACT_LINK_SELECTOR: &str = "a[title=Abstract]";
const TITLE_SELECTOR: &str = "div.list-title";
const AUTHORS_SELECTOR: &str = "div.list-authors";
const ABSTRACT_SELECTOR: &str = "p.mathjax";

struct ListingSelectors {
    item: Selector,
    link: Selector,
    title: Selector,
    authors: Selector,
    abstract_text: Selector,
}

impl ListingSelectors {
    fn new() -> Result<Self> {
        Ok(Self {
            item: parse_selector(ITEM_SELECTOR)?,
            link: parse_selector(ABSTRACT_LINK_SELECTOR)?,
            title: parse_selector(TITLE_SELECTOR)?,
            authors: parse_selector(AUTHORS_SELECTOR)?,
            abstract_text: parse_selector(ABSTRACT_SELECTOR)?,
        })
    }
}

/// Parse a listing page.
pub fn parse_listing_page(body: &str, _uri: &str) -> Result<ParsedPage> {
    let selectors = ListingSelectors::new()?;
    let document = Html::parse_document(body);
    let mut page = ParsedPage::default();

    for dt in document.select(&selectors.item) {
        let Some(dd) = next_dd(&dt) else {
            continue;
        };
        page.accept(parse_item(&dt, &dd, &selectors));
    }
    Ok(page)
}

fn parse_item(dt: &ElementRef<'_>, dd: &ElementRef<'_>, selectors: &ListingSelectors) -> RawRecord {
    let raw_id = dt
        .select(&selectors.link)
        .next()
        .and_then(|a| a.value().attr("href"))
        .unwrap_or_default()
        .to_string();

    let title = labelled_text(dd, &selectors.title, "Title:");
    let authors = labelled_text(dd, &selectors.authors, "Authors:")
        .split(',')
        .map(normalize_whitespace)
        .filter(|name| !name.is_empty())
        .collect();
    let abstract_text = dd
        .select(&selectors.abstract_text)
        .next()
        .map(|p| normalize_whitespace(&p.text().collect::<String>()))
        .unwrap_or_default();

    RawRecord {
        raw_id,
        title,
        abstract_text,
        authors,
        created: None,
        deleted: false,
    }
}

/// The `<dd>` paired with a `<dt>`: its next element sibling.
fn next_dd<'a>(dt: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    dt.next_siblings()
        .filter_map(ElementRef::wrap)
        .next()
        .filter(|el| el.value().name() == "dd")
}

fn labelled_text(scope: &ElementRef<'_>, selector: &Selector, label: &str) -> String {
    scope
        .select(selector)
        .next()
        .map(|el| {
            let text = normalize_whitespace(&el.text().collect::<String>());
            text.strip_prefix(label).unwrap_or(&text).trim().to_string()
        })
        .unwrap_or_default()
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}
