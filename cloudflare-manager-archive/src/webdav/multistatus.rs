//! `PROPFIND` multistatus (RFC 4918 §13) parsing.

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::ArchiveError;

/// One `<d:response>` entry of a multistatus body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DavEntry {
    /// Percent-decoded href path.
    pub href: String,
    /// Whether `<d:resourcetype>` contains `<d:collection/>`.
    pub is_collection: bool,
}

impl DavEntry {
    /// Last non-empty path segment of the href.
    pub fn file_name(&self) -> Option<&str> {
        self.href.rsplit('/').find(|s| !s.is_empty())
    }
}

/// Parse a multistatus document into its entries.
///
/// Namespace prefixes are ignored (servers use `d:`, `D:` or none at all).
pub(crate) fn parse_multistatus(xml: &str, backend: &str) -> Result<Vec<DavEntry>, ArchiveError> {
    let parse_error = |detail: String| ArchiveError::ParseError {
        backend: backend.to_string(),
        detail,
    };

    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut entries = Vec::new();
    let mut current: Option<DavEntry> = None;
    let mut in_href = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"response" => {
                    current = Some(DavEntry {
                        href: String::new(),
                        is_collection: false,
                    });
                }
                b"href" => in_href = true,
                b"collection" => {
                    if let Some(entry) = current.as_mut() {
                        entry.is_collection = true;
                    }
                }
                _ => {}
            },
            Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"collection" {
                    if let Some(entry) = current.as_mut() {
                        entry.is_collection = true;
                    }
                }
            }
            Ok(Event::Text(t)) => {
                if in_href {
                    if let Some(entry) = current.as_mut() {
                        let text = t
                            .unescape()
                            .map_err(|e| parse_error(format!("invalid href text: {e}")))?;
                        entry.href.push_str(&text);
                    }
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"href" => in_href = false,
                b"response" => {
                    if let Some(mut entry) = current.take() {
                        entry.href = decode_href(&entry.href);
                        entries.push(entry);
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(parse_error(format!(
                    "malformed multistatus at position {}: {e}",
                    reader.buffer_position()
                )));
            }
        }
    }

    Ok(entries)
}

/// Strip scheme/host from an absolute href and percent-decode it.
fn decode_href(raw: &str) -> String {
    let path = raw
        .split_once("://")
        .and_then(|(_, rest)| rest.find('/').map(|i| &rest[i..]))
        .unwrap_or(raw);
    urlencoding::decode(path).map_or_else(|_| path.to_string(), |s| s.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<d:multistatus xmlns:d="DAV:">
  <d:response>
    <d:href>/dav/cloudflare-manager/</d:href>
    <d:propstat><d:prop><d:resourcetype><d:collection/></d:resourcetype></d:prop>
    <d:status>HTTP/1.1 200 OK</d:status></d:propstat>
  </d:response>
  <d:response>
    <d:href>/dav/cloudflare-manager/cloudflare_backup_20240101_120000.json</d:href>
    <d:propstat><d:prop><d:resourcetype/></d:prop>
    <d:status>HTTP/1.1 200 OK</d:status></d:propstat>
  </d:response>
  <d:response>
    <d:href>https://dav.example.com/dav/cloudflare-manager/my%20notes.txt</d:href>
    <d:propstat><d:prop><d:resourcetype/></d:prop>
    <d:status>HTTP/1.1 200 OK</d:status></d:propstat>
  </d:response>
</d:multistatus>"#;

    #[test]
    fn parses_entries_and_collections() {
        let entries = parse_multistatus(LISTING, "webdav").unwrap();
        assert_eq!(entries.len(), 3);
        assert!(entries[0].is_collection);
        assert!(!entries[1].is_collection);
        assert_eq!(
            entries[1].file_name(),
            Some("cloudflare_backup_20240101_120000.json")
        );
    }

    #[test]
    fn absolute_hrefs_are_decoded() {
        let entries = parse_multistatus(LISTING, "webdav").unwrap();
        assert_eq!(entries[2].href, "/dav/cloudflare-manager/my notes.txt");
        assert_eq!(entries[2].file_name(), Some("my notes.txt"));
    }

    #[test]
    fn unprefixed_namespace_is_accepted() {
        let xml = r#"<multistatus xmlns="DAV:"><response><href>/a/b.json</href>
            <propstat><prop><resourcetype></resourcetype></prop></propstat></response></multistatus>"#;
        let entries = parse_multistatus(xml, "webdav").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].file_name(), Some("b.json"));
    }

    #[test]
    fn collection_trailing_slash_name() {
        let entry = DavEntry {
            href: "/dav/folder/".to_string(),
            is_collection: true,
        };
        assert_eq!(entry.file_name(), Some("folder"));
    }

    #[test]
    fn malformed_xml_is_parse_error() {
        let result = parse_multistatus("<d:multistatus><d:response></d:multistatus>", "webdav");
        assert!(
            matches!(result, Err(ArchiveError::ParseError { .. })),
            "unexpected result: {result:?}"
        );
    }
}
