// src/services/merge.rs

//! Cross-category deduplication.

use std::collections::HashSet;

use crate::models::Paper;

/// Papers keyed by normalized identifier, in first-seen order.
///
/// The first paper inserted for an identifier wins; later copies (the same
/// paper cross-listed in another category, or another version) are ignored.
#[derive(Debug, Default)]
pub struct MergedIndex {
    seen: HashSet<String>,
    papers: Vec<Paper>,
}

impl MergedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a paper, returning whether it was new.
    pub fn insert(&mut self, paper: Paper) -> bool {
        if !self.seen.insert(paper.id().to_string()) {
            return false;
        }
        self.papers.push(paper);
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    pub fn len(&self) -> usize {
        self.papers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.papers.is_empty()
    }

    pub fn into_papers(self) -> Vec<Paper> {
        self.papers
    }
}

impl Extend<Paper> for MergedIndex {
    fn extend<I: IntoIterator<Item = Paper>>(&mut self, iter: I) {
        for paper in iter {
            self.insert(paper);
        }
    }
}
