// src/services/parser/xml.rs

//! Minimal element walker over quick-xml events.
//!
//! Reports each element as an `Open` (with attributes) and a `Close` (with the
//! element's full text content, descendants included), together with the
//! local names of its ancestors. Namespace prefixes are ignored.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{AppError, Result};

pub(crate) enum Node<'a> {
    Open {
        name: &'a str,
        attrs: &'a [(String, String)],
    },
    Close {
        name: &'a str,
        text: String,
    },
}

/// Look up an attribute by local name.
pub(crate) fn attr<'a>(attrs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

/// Walk a whole document whose root element must be `root`.
///
/// Any well-formedness problem is reported as [`AppError::MalformedPage`].
pub(crate) fn walk<F>(xml: &str, uri: &str, root: &str, mut visit: F) -> Result<()>
where
    F: FnMut(&[String], Node<'_>) -> Result<()>,
{
    let mut reader = Reader::from_str(xml);
    let mut path: Vec<String> = Vec::new();
    let mut texts: Vec<String> = Vec::new();
    let mut seen_root = false;

    loop {
        let position = reader.buffer_position();
        let event = reader
            .read_event()
            .map_err(|e| AppError::malformed(uri, format!("at byte {position}: {e}")))?;

        match event {
            Event::Start(e) => {
                let (name, attrs) = open_element(&e, uri)?;
                check_root(&path, &mut seen_root, &name, root, uri)?;
                visit(&path, Node::Open { name: &name, attrs: &attrs })?;
                path.push(name);
                texts.push(String::new());
            }
            Event::Empty(e) => {
                let (name, attrs) = open_element(&e, uri)?;
                check_root(&path, &mut seen_root, &name, root, uri)?;
                visit(&path, Node::Open { name: &name, attrs: &attrs })?;
                visit(&path, Node::Close { name: &name, text: String::new() })?;
            }
            Event::End(_) => {
                let name = path
                    .pop()
                    .ok_or_else(|| AppError::malformed(uri, "unmatched closing tag"))?;
                let text = texts.pop().unwrap_or_default();
                if let Some(parent) = texts.last_mut() {
                    parent.push_str(&text);
                }
                visit(&path, Node::Close { name: &name, text })?;
            }
            Event::Text(t) => {
                let text = t
                    .unescape()
                    .map_err(|e| AppError::malformed(uri, format!("bad text: {e}")))?;
                match texts.last_mut() {
                    Some(top) => top.push_str(&text),
                    None if text.trim().is_empty() => {}
                    None => return Err(AppError::malformed(uri, "text outside the root element")),
                }
            }
            Event::CData(c) => {
                if let Some(top) = texts.last_mut() {
                    top.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = path.last() {
        return Err(AppError::malformed(
            uri,
            format!("document ended inside <{open}>"),
        ));
    }
    if !seen_root {
        return Err(AppError::malformed(uri, "no root element"));
    }
    Ok(())
}

fn open_element(e: &BytesStart<'_>, uri: &str) -> Result<(String, Vec<(String, String)>)> {
    let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
    let mut attrs = Vec::new();
    for a in e.attributes() {
        let a = a.map_err(|err| AppError::malformed(uri, format!("bad attribute: {err}")))?;
        let key = String::from_utf8_lossy(a.key.local_name().as_ref()).into_owned();
        let value = a
            .unescape_value()
            .map_err(|err| AppError::malformed(uri, format!("bad attribute value: {err}")))?
            .into_owned();
        attrs.push((key, value));
    }
    Ok((name, attrs))
}

fn check_root(
    path: &[String],
    seen_root: &mut bool,
    name: &str,
    root: &str,
    uri: &str,
) -> Result<()> {
    if !path.is_empty() {
        return Ok(());
    }
    if *seen_root {
        return Err(AppError::malformed(uri, "more than one root element"));
    }
    if name != root {
        return Err(AppError::malformed(
            uri,
            format!("expected <{root}> root, found <{name}>"),
        ));
    }
    *seen_root = true;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(xml: &str) -> Result<Vec<String>> {
        let mut seen = Vec::new();
        walk(xml, "test://page", "root", |path, node| {
            if let Node::Close { name, text } = node {
                seen.push(format!("{}/{}={}", path.join("/"), name, text.trim()));
            }
            Ok(())
        })?;
        Ok(seen)
    }

    #[test]
    fn test_reports_nested_text_with_parents() {
        let seen = collect("<x:root xmlns:x='urn:x'><a>one <b>&amp; two</b></a><c/></x:root>").unwrap();
        assert_eq!(seen[0], "root/a/b=& two");
        assert_eq!(seen[1], "root/a=one & two");
        assert_eq!(seen[2], "root/c=");
    }

    #[test]
    fn test_rejects_truncated_document() {
        let err = collect("<root><a>text</a>").unwrap_err();
        assert!(matches!(err, AppError::MalformedPage { .. }));
    }

    #[test]
    fn test_rejects_mismatched_tags() {
        assert!(collect("<root><a></b></root>").is_err());
    }

    #[test]
    fn test_rejects_wrong_root_and_empty_body() {
        assert!(collect("<html><body/></html>").is_err());
        assert!(collect("").is_err());
        assert!(collect("Service Unavailable").is_err());
    }
}
