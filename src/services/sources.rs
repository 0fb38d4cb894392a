// src/services/sources.rs

//! Feed sources: "fetch one page of records for (category, window, cursor)".
//!
//! - `OaiPmhSource`: OAI-PMH `ListRecords`, continuation by resumption token
//! - `QuerySource`: Atom query API, offset pagination
//! - `ListingSource`: HTML listing of new submissions, a single page

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use url::Url;

use crate::config::CrawlContext;
use crate::error::Result;
use crate::models::{CategoryQuery, FeedConfig, FeedProtocol, TimeWindow, Zone};
use crate::services::categories::CategorySetMapper;
use crate::services::feed_client::FeedClient;
use crate::services::parser::{ParsedPage, RecordParser};

/// Position in a paginated walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageCursor {
    Offset { offset: usize, page_size: usize },
    /// `None` requests the first page
    Token(Option<String>),
}

/// How a source continues past its first page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pagination {
    Offset { page_size: usize },
    Token,
}

impl Pagination {
    pub fn first_cursor(&self) -> PageCursor {
        match self {
            Pagination::Offset { page_size } => PageCursor::Offset {
                offset: 0,
                page_size: *page_size,
            },
            Pagination::Token => PageCursor::Token(None),
        }
    }
}

/// A remote feed able to serve one page of a category's records at a time.
#[async_trait]
pub trait FeedSource: Send + Sync {
    fn protocol(&self) -> FeedProtocol;

    fn pagination(&self) -> Pagination;

    /// Address a category code, or `None` when the code is malformed.
    fn address(&self, code: &str) -> Option<CategoryQuery> {
        CategorySetMapper::new(self.protocol()).map(code)
    }

    async fn fetch_page(
        &self,
        query: &CategoryQuery,
        window: &TimeWindow,
        cursor: &PageCursor,
    ) -> Result<ParsedPage>;
}

/// Build the source selected by `feed.protocol`.
pub fn build_source(
    feed: &FeedConfig,
    context: &CrawlContext,
    client: FeedClient,
) -> Result<Box<dyn FeedSource>> {
    let base_url = Url::parse(&feed.base_url)?;
    let source: Box<dyn FeedSource> = match feed.protocol {
        FeedProtocol::OaiPmh => Box::new(OaiPmhSource {
            client,
            base_url,
            metadata_prefix: feed.metadata_prefix.clone(),
            zone: context.feed_zone,
        }),
        FeedProtocol::Query => Box::new(QuerySource {
            client,
            base_url,
            page_size: feed.page_size,
            zone: context.feed_zone,
        }),
        FeedProtocol::Listing => Box::new(ListingSource { client, base_url }),
    };
    Ok(source)
}

async fn fetch_and_parse(client: &FeedClient, uri: &str, parser: RecordParser) -> Result<ParsedPage> {
    let body = client.get(uri).await?.into_body(uri)?;
    let page = parser.parse(&body, uri)?;
    log::debug!(
        "{uri}: {} entries, {} kept, token {:?}",
        page.entries,
        page.records.len(),
        page.token
    );
    Ok(page)
}

/// OAI-PMH `ListRecords` source.
#[derive(Debug, Clone)]
pub struct OaiPmhSource {
    client: FeedClient,
    base_url: Url,
    metadata_prefix: String,
    zone: Zone,
}

impl OaiPmhSource {
    pub fn new(client: FeedClient, base_url: Url, metadata_prefix: &str, zone: Zone) -> Self {
        Self {
            client,
            base_url,
            metadata_prefix: metadata_prefix.to_string(),
            zone,
        }
    }

    /// Reference-zone days whose midnight falls inside the window.
    ///
    /// Consecutive windows get disjoint ranges, so a record datestamped on
    /// a given day is requested by exactly one run. `None` when the window
    /// contains no midnight.
    pub fn day_range(&self, window: &TimeWindow) -> Option<(NaiveDate, NaiveDate)> {
        let tick = Duration::nanoseconds(1);
        let start_day = self.zone.date_of(window.start());
        let first = if self.zone.date_of(window.start() - tick) == start_day {
            start_day.succ_opt()?
        } else {
            start_day
        };
        let last = self.zone.date_of(window.end() - tick);
        (first <= last).then_some((first, last))
    }

    /// Build the request for a page, or `None` when the window maps to no
    /// day at all.
    ///
    /// Continuation requests carry only the token, as the protocol requires.
    pub fn request_url(
        &self,
        query: &CategoryQuery,
        window: &TimeWindow,
        cursor: &PageCursor,
    ) -> Option<String> {
        let mut url = self.base_url.clone();
        if let PageCursor::Token(Some(token)) = cursor {
            url.query_pairs_mut()
                .append_pair("verb", "ListRecords")
                .append_pair("resumptionToken", token);
            return Some(url.to_string());
        }

        let (from, until) = self.day_range(window)?;
        url.query_pairs_mut()
            .append_pair("verb", "ListRecords")
            .append_pair("metadataPrefix", &self.metadata_prefix)
            .append_pair("set", &query.set)
            .append_pair("from", &from.format("%Y-%m-%d").to_string())
            .append_pair("until", &until.format("%Y-%m-%d").to_string());
        Some(url.to_string())
    }
}

#[async_trait]
impl FeedSource for OaiPmhSource {
    fn protocol(&self) -> FeedProtocol {
        FeedProtocol::OaiPmh
    }

    fn pagination(&self) -> Pagination {
        Pagination::Token
    }

    async fn fetch_page(
        &self,
        query: &CategoryQuery,
        window: &TimeWindow,
        cursor: &PageCursor,
    ) -> Result<ParsedPage> {
        let Some(uri) = self.request_url(query, window, cursor) else {
            log::debug!("{query}: no {} midnight in {window}, nothing to request", self.zone);
            return Ok(ParsedPage::default());
        };
        fetch_and_parse(&self.client, &uri, RecordParser::OaiPmh).await
    }
}

/// Atom query API source.
#[derive(Debug, Clone)]
pub struct QuerySource {
    client: FeedClient,
    base_url: Url,
    page_size: usize,
    zone: Zone,
}

impl QuerySource {
    pub fn new(client: FeedClient, base_url: Url, page_size: usize, zone: Zone) -> Self {
        Self {
            client,
            base_url,
            page_size,
            zone,
        }
    }

    /// Build the request for a page. The submitted-date range is inclusive,
    /// so it ends one minute before the window does.
    pub fn request_url(
        &self,
        query: &CategoryQuery,
        window: &TimeWindow,
        cursor: &PageCursor,
    ) -> String {
        let (offset, page_size) = match cursor {
            PageCursor::Offset { offset, page_size } => (*offset, *page_size),
            PageCursor::Token(_) => (0, self.page_size),
        };
        let start = self.zone.localize(window.start());
        let end = self.zone.localize(window.end() - Duration::minutes(1));
        let search = format!(
            "{} AND submittedDate:[{} TO {}]",
            query.set,
            start.format("%Y%m%d%H%M"),
            end.format("%Y%m%d%H%M")
        );

        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("search_query", &search)
            .append_pair("start", &offset.to_string())
            .append_pair("max_results", &page_size.to_string())
            .append_pair("sortBy", "submittedDate")
            .append_pair("sortOrder", "ascending");
        url.to_string()
    }
}

#[async_trait]
impl FeedSource for QuerySource {
    fn protocol(&self) -> FeedProtocol {
        FeedProtocol::Query
    }

    fn pagination(&self) -> Pagination {
        Pagination::Offset {
            page_size: self.page_size,
        }
    }

    async fn fetch_page(
        &self,
        query: &CategoryQuery,
        window: &TimeWindow,
        cursor: &PageCursor,
    ) -> Result<ParsedPage> {
        let uri = self.request_url(query, window, cursor);
        fetch_and_parse(&self.client, &uri, RecordParser::Atom).await
    }
}

/// HTML listing source. The page shows the latest announcement, so the
/// window is not part of the request.
#[derive(Debug, Clone)]
pub struct ListingSource {
    client: FeedClient,
    base_url: Url,
}

impl ListingSource {
    pub fn new(client: FeedClient, base_url: Url) -> Self {
        Self { client, base_url }
    }

    pub fn request_url(&self, query: &CategoryQuery) -> String {
        format!(
            "{}/{}/new",
            self.base_url.as_str().trim_end_matches('/'),
            query.set
        )
    }
}

#[async_trait]
impl FeedSource for ListingSource {
    fn protocol(&self) -> FeedProtocol {
        FeedProtocol::Listing
    }

    fn pagination(&self) -> Pagination {
        Pagination::Token
    }

    async fn fetch_page(
        &self,
        query: &CategoryQuery,
        _window: &TimeWindow,
        _cursor: &PageCursor,
    ) -> Result<ParsedPage> {
        let uri = self.request_url(query);
        fetch_and_parse(&self.client, &uri, RecordParser::Listing).await
    }
}
