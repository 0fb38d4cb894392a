// src/services/categories.rs

//! Category code to feed selector mapping.

use crate::models::{CategoryQuery, FeedProtocol};

/// Translates category codes such as `cs.AI` into a protocol's selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategorySetMapper {
    protocol: FeedProtocol,
}

impl CategorySetMapper {
    pub fn new(protocol: FeedProtocol) -> Self {
        Self { protocol }
    }

    /// Map a code, or `None` when it lacks the `archive.SUBJECT` shape.
    pub fn map(&self, code: &str) -> Option<CategoryQuery> {
        let code = code.trim();
        let (archive, subject) = code.split_once('.')?;
        if archive.is_empty() || subject.is_empty() {
            return None;
        }

        let set = match self.protocol {
            FeedProtocol::OaiPmh => format!("{archive}:{archive}:{subject}"),
            FeedProtocol::Query => format!("cat:{code}"),
            FeedProtocol::Listing => code.to_string(),
        };
        Some(CategoryQuery {
            code: code.to_string(),
            set,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_per_protocol() {
        let oai = CategorySetMapper::new(FeedProtocol::OaiPmh).map("cs.AI").unwrap();
        assert_eq!(oai.set, "cs:cs:AI");
        assert_eq!(oai.code, "cs.AI");

        let query = CategorySetMapper::new(FeedProtocol::Query).map(" cs.CL ").unwrap();
        assert_eq!(query.set, "cat:cs.CL");
        assert_eq!(query.code, "cs.CL");

        let listing = CategorySetMapper::new(FeedProtocol::Listing).map("math.CO").unwrap();
        assert_eq!(listing.set, "math.CO");
    }

    #[test]
    fn test_malformed_codes() {
        let mapper = CategorySetMapper::new(FeedProtocol::OaiPmh);
        assert!(mapper.map("hep-th").is_none());
        assert!(mapper.map(".AI").is_none());
        assert!(mapper.map("cs.").is_none());
    }
}
