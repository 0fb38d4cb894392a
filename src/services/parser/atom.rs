// src/services/parser/atom.rs

//! Atom pages from the arXiv query API.

use chrono::{DateTime, Utc};

use super::ParsedPage;
use super::xml::{self, Node};
use crate::error::{AppError, Result};
use crate::models::RawRecord;
use crate::utils::text::normalize_whitespace;

/// Path fragment of the ids the API uses for error entries.
const API_ERROR_MARKER: &str = "/api/errors";

/// Parse an Atom feed page. Offset-paginated, so no token is produced.
pub fn parse_atom_page(body: &str, uri: &str) -> Result<ParsedPage> {
    let mut page = ParsedPage::default();
    let mut current: Option<RawRecord> = None;
    let mut api_error: Option<String> = None;

    xml::walk(body, uri, "feed", |path, node| {
        let parent = path.last().map(String::as_str);
        match node {
            Node::Open { name, .. } => {
                if name == "entry" && parent == Some("feed") {
                    current = Some(RawRecord::default());
                }
            }
            Node::Close { name, text } => {
                if name == "entry" && parent == Some("feed") {
                    if let Some(record) = current.take() {
                        if record.raw_id.contains(API_ERROR_MARKER) {
                            api_error = Some(record.abstract_text);
                        } else {
                            page.accept(record);
                        }
                    }
                    return Ok(());
                }

                let Some(record) = current.as_mut() else {
                    return Ok(());
                };
                match (parent, name) {
                    (Some("entry"), "id") => record.raw_id = text.trim().to_string(),
                    (Some("entry"), "title") => record.title = normalize_whitespace(&text),
                    (Some("entry"), "summary") => {
                        record.abstract_text = normalize_whitespace(&text)
                    }
                    (Some("entry"), "published") => {
                        record.created = DateTime::parse_from_rfc3339(text.trim())
                            .ok()
                            .map(|dt| dt.with_timezone(&Utc));
                    }
                    (Some("author"), "name") => {
                        let name = normalize_whitespace(&text);
                        if !name.is_empty() {
                            record.authors.push(name);
                        }
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    })?;

    match api_error {
        Some(message) => Err(AppError::feed(uri, message)),
        None => Ok(page),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom" xmlns:opensearch="http://a9.com/-/spec/opensearch/1.1/" xmlns:arxiv="http://arxiv.org/schemas/atom">
  <title type="html">ArXiv Query: search_query=cat:cs.AI</title>
  <id>http://arxiv.org/api/cHxbiOdZaP56ODnBPIenZhzg5f8</id>
  <opensearch:totalResults>2</opensearch:totalResults>
  <entry>
    <id>http://arxiv.org/abs/2405.00001v2</id>
    <updated>2024-05-02T10:00:00Z</updated>
    <published>2024-04-30T17:59:59Z</published>
    <title>Graph
      Reasoning</title>
    <summary>  A summary.  </summary>
    <author><name>Grace Hopper</name></author>
    <author><name>Edsger Dijkstra</name><arxiv:affiliation>TU/e</arxiv:affiliation></author>
    <link href="http://arxiv.org/abs/2405.00001v2" rel="alternate" type="text/html"/>
    <arxiv:primary_category term="cs.AI" scheme="http://arxiv.org/schemas/atom"/>
  </entry>
  <entry>
    <title>Missing id</title>
  </entry>
</feed>"#;

    #[test]
    fn test_parse_entries() {
        let page = parse_atom_page(PAGE, "http://feed/api/query").unwrap();
        assert_eq!(page.entries, 2);
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.token, None);

        let record = &page.records[0];
        assert_eq!(record.normalized_id(), "2405.00001");
        assert_eq!(record.title, "Graph Reasoning");
        assert_eq!(record.abstract_text, "A summary.");
        assert_eq!(record.authors, vec!["Grace Hopper", "Edsger Dijkstra"]);
        assert_eq!(
            record.created.unwrap().to_rfc3339(),
            "2024-04-30T17:59:59+00:00"
        );
    }

    #[test]
    fn test_feed_id_is_not_an_entry() {
        let body = r#"<feed><id>http://arxiv.org/api/xyz</id></feed>"#;
        let page = parse_atom_page(body, "u").unwrap();
        assert_eq!(page.entries, 0);
    }

    #[test]
    fn test_api_error_entry_is_fatal() {
        let body = r#"<feed><entry>
            <id>http://arxiv.org/api/errors#incorrect_id_format_for_1234</id>
            <title>Error</title>
            <summary>incorrect id format for 1234</summary>
          </entry></feed>"#;
        let err = parse_atom_page(body, "http://feed/api/query").unwrap_err();
        assert!(matches!(err, AppError::Feed { .. }));
        assert!(err.to_string().contains("incorrect id format"));
    }

    #[test]
    fn test_html_error_page_is_malformed() {
        let err = parse_atom_page("<html><body>Rate limited</body></html>", "u").unwrap_err();
        assert!(matches!(err, AppError::MalformedPage { .. }));
    }
}
