//! Paper data structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::text::normalize_id;

/// A feed entry as parsed, before identifier normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    /// Identifier in whatever wrapper the feed uses
    pub raw_id: String,
    pub title: String,
    pub abstract_text: String,
    /// Author display names in feed order
    pub authors: Vec<String>,
    pub created: Option<DateTime<Utc>>,
    /// Tombstoned by the source
    pub deleted: bool,
}

impl RawRecord {
    /// Canonical, version-free identifier.
    pub fn normalized_id(&self) -> String {
        normalize_id(&self.raw_id)
    }
}

/// A normalized paper ready for the digest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Paper {
    id: String,
    title: String,
    authors: String,
    abstract_text: String,
    url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    published: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ai_summary: Option<String>,
}

impl Paper {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        authors: impl Into<String>,
        abstract_text: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            authors: authors.into(),
            abstract_text: abstract_text.into(),
            url: url.into(),
            published: None,
            ai_summary: None,
        }
    }

    /// Build a paper from a parsed record, linking it under `abs_url_base`.
    ///
    /// Returns `None` when the record has no usable identifier.
    pub fn from_record(record: RawRecord, abs_url_base: &str) -> Option<Self> {
        let id = record.normalized_id();
        if id.is_empty() {
            return None;
        }
        let url = format!("{abs_url_base}{id}");
        Some(Self {
            url,
            title: record.title,
            authors: record.authors.join(", "),
            abstract_text: record.abstract_text,
            published: record.created,
            ai_summary: None,
            id,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn authors(&self) -> &str {
        &self.authors
    }

    pub fn abstract_text(&self) -> &str {
        &self.abstract_text
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn published(&self) -> Option<DateTime<Utc>> {
        self.published
    }

    pub fn ai_summary(&self) -> Option<&str> {
        self.ai_summary.as_deref()
    }

    /// Attach the generated summary. Only the summarization step calls this.
    pub fn set_ai_summary(&mut self, summary: impl Into<String>) {
        self.ai_summary = Some(summary.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> RawRecord {
        RawRecord {
            raw_id: "oai:arXiv.org:2405.00001".into(),
            title: "Attention Again".into(),
            abstract_text: "We revisit attention.".into(),
            authors: vec!["Ada Lovelace".into(), "Alan Turing".into()],
            created: None,
            deleted: false,
        }
    }

    #[test]
    fn test_from_record() {
        let paper = Paper::from_record(sample_record(), "https://arxiv.org/abs/").unwrap();
        assert_eq!(paper.id(), "2405.00001");
        assert_eq!(paper.url(), "https://arxiv.org/abs/2405.00001");
        assert_eq!(paper.authors(), "Ada Lovelace, Alan Turing");
        assert!(paper.ai_summary().is_none());
    }

    #[test]
    fn test_from_record_without_id() {
        let record = RawRecord {
            raw_id: "   ".into(),
            ..sample_record()
        };
        assert!(Paper::from_record(record, "https://arxiv.org/abs/").is_none());
    }

    #[test]
    fn test_summary_is_omitted_from_json_until_set() {
        let mut paper = Paper::new("1", "t", "a", "abs", "u");
        let json = serde_json::to_string(&paper).unwrap();
        assert!(!json.contains("ai_summary"));

        paper.set_ai_summary("short");
        let json = serde_json::to_string(&paper).unwrap();
        assert!(json.contains("\"ai_summary\":\"short\""));
    }
}
