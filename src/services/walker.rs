// src/services/walker.rs

//! Walks every page of one category within one window.

use crate::error::Result;
use crate::models::{CategoryQuery, RawRecord, TimeWindow};
use crate::services::parser::ParsedPage;
use crate::services::sources::{FeedSource, PageCursor};
use crate::utils::Pacer;

/// Where a walk stands between two requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkState {
    Fetching(PageCursor),
    Done,
}

/// Decide what follows `page`, fetched at `cursor`.
///
/// Termination looks at the entries the page carried, dropped ones included,
/// so a page thinned out by tombstones does not end an offset walk early.
pub fn next_state(cursor: &PageCursor, page: &ParsedPage) -> WalkState {
    if page.entries == 0 {
        return WalkState::Done;
    }
    match cursor {
        PageCursor::Offset { offset, page_size } => {
            if page.entries < *page_size {
                WalkState::Done
            } else {
                WalkState::Fetching(PageCursor::Offset {
                    offset: offset + page_size,
                    page_size: *page_size,
                })
            }
        }
        PageCursor::Token(_) => match &page.token {
            Some(token) => WalkState::Fetching(PageCursor::Token(Some(token.clone()))),
            None => WalkState::Done,
        },
    }
}

/// Drives a [`FeedSource`] from its first page to the last.
pub struct PaginationWalker<'a> {
    source: &'a dyn FeedSource,
    pacer: Pacer,
}

impl<'a> PaginationWalker<'a> {
    pub fn new(source: &'a dyn FeedSource, pacer: Pacer) -> Self {
        Self { source, pacer }
    }

    /// All surviving records for `query` in `window`, in page order.
    /// Any page failure aborts the walk.
    pub async fn walk(&self, query: &CategoryQuery, window: &TimeWindow) -> Result<Vec<RawRecord>> {
        let mut state = WalkState::Fetching(self.source.pagination().first_cursor());
        let mut records = Vec::new();
        let mut pages = 0usize;

        while let WalkState::Fetching(cursor) = state {
            if pages > 0 {
                self.pacer.pause().await;
            }
            let page = self.source.fetch_page(query, window, &cursor).await?;
            pages += 1;
            state = next_state(&cursor, &page);
            records.extend(page.records);
        }

        log::debug!("{query}: {pages} page(s), {} record(s)", records.len());
        Ok(records)
    }
}
