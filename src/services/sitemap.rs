// src/services/sitemap.rs

//! Sitemap XML parsing.
//!
//! Both document kinds share one shape: a root element whose children are
//! records (`<sitemap>` in an index, `<url>` in a urlset), each holding
//! `<loc>` and optionally `<lastmod>`. Only elements in the sitemap
//! namespace count; anything else is skipped.
//!
//! Parsing is strict: mismatched or unclosed tags, a second root element,
//! or a document with no root at all are errors.

use quick_xml::NsReader;
use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};

use crate::error::{AppError, Result};
use crate::models::SitemapEntry;

/// Namespace of the sitemaps.org protocol.
pub const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Child sitemap URLs listed by a sitemap index, in document order.
pub fn parse_sitemap_index(xml: &[u8]) -> Result<Vec<String>> {
    let records = parse_records(xml, b"sitemap")?;
    Ok(records
        .into_iter()
        .filter_map(|r| r.loc)
        .filter(|loc| !loc.is_empty())
        .collect())
}

/// `<url>` records of a child sitemap that carry both `<loc>` and `<lastmod>`.
pub fn parse_urlset(xml: &[u8]) -> Result<Vec<SitemapEntry>> {
    let records = parse_records(xml, b"url")?;
    Ok(records
        .into_iter()
        .filter_map(|r| match (r.loc, r.lastmod) {
            (Some(loc), Some(lastmod)) if !loc.is_empty() => Some(SitemapEntry::new(loc, lastmod)),
            _ => None,
        })
        .collect())
}

#[derive(Debug, Default)]
struct Record {
    loc: Option<String>,
    lastmod: Option<String>,
}

impl Record {
    fn slot(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Loc => &mut self.loc,
            Field::Lastmod => &mut self.lastmod,
        }
    }

    fn append(&mut self, field: Field, text: &str) {
        self.slot(field).get_or_insert_with(String::new).push_str(text);
    }

    fn finish(mut self) -> Self {
        for field in [Field::Loc, Field::Lastmod] {
            if let Some(value) = self.slot(field) {
                *value = value.trim().to_string();
            }
        }
        self
    }
}

#[derive(Debug, Clone, Copy)]
enum Field {
    Loc,
    Lastmod,
}

impl Field {
    fn from_local_name(name: &[u8]) -> Option<Self> {
        match name {
            b"loc" => Some(Self::Loc),
            b"lastmod" => Some(Self::Lastmod),
            _ => None,
        }
    }
}

/// Walk the document and collect depth-2 records named `record_name`.
///
/// Depth 1 is the root, depth 2 the records, depth 3 their fields.
fn parse_records(xml: &[u8], record_name: &[u8]) -> Result<Vec<Record>> {
    let mut reader = NsReader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut depth = 0usize;
    let mut seen_root = false;
    let mut current: Option<Record> = None;
    let mut field: Option<Field> = None;
    let mut records = Vec::new();

    loop {
        let (ns, event) = reader.read_resolved_event_into(&mut buf)?;
        let in_ns = matches!(ns, ResolveResult::Bound(Namespace(n)) if n == SITEMAP_NS.as_bytes());

        match event {
            Event::Start(e) => {
                if depth == 0 {
                    if seen_root {
                        return Err(AppError::malformed("more than one root element"));
                    }
                    seen_root = true;
                }
                depth += 1;

                let local = e.local_name();
                if depth == 2 && in_ns && local.as_ref() == record_name {
                    current = Some(Record::default());
                } else if depth == 3 && in_ns && current.is_some() {
                    field = Field::from_local_name(local.as_ref());
                }
            }
            Event::Empty(e) => {
                if depth == 0 {
                    if seen_root {
                        return Err(AppError::malformed("more than one root element"));
                    }
                    seen_root = true;
                }
                // `<lastmod/>` inside a record: present but empty.
                if depth == 2 && in_ns {
                    if let (Some(record), Some(f)) =
                        (current.as_mut(), Field::from_local_name(e.local_name().as_ref()))
                    {
                        record.slot(f).get_or_insert_with(String::new);
                    }
                }
            }
            Event::Text(t) => {
                if let (Some(record), Some(f)) = (current.as_mut(), field) {
                    record.append(f, &t.unescape()?);
                }
            }
            Event::CData(c) => {
                if let (Some(record), Some(f)) = (current.as_mut(), field) {
                    let bytes = c.into_inner();
                    let text = std::str::from_utf8(&bytes)
                        .map_err(|e| AppError::malformed(format!("CDATA is not UTF-8: {e}")))?;
                    record.append(f, text);
                }
            }
            Event::End(_) => {
                match depth {
                    3 => field = None,
                    2 => {
                        if let Some(record) = current.take() {
                            records.push(record.finish());
                        }
                    }
                    _ => {}
                }
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| AppError::malformed("closing tag without opening tag"))?;
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if depth != 0 {
        return Err(AppError::malformed(format!(
            "document ended with {depth} unclosed element(s)"
        )));
    }
    if !seen_root {
        return Err(AppError::malformed("document has no root element"));
    }

    Ok(records)
}
