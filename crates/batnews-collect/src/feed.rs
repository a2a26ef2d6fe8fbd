//! RSS item extraction.

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::CollectError;
use crate::intake::RawEntry;
use crate::normalize::{clean_text, split_publisher_tail};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Link,
    Description,
    PubDate,
    Source,
    Other,
}

impl Field {
    fn from_tag(name: &[u8]) -> Self {
        match name {
            b"title" => Field::Title,
            b"link" => Field::Link,
            b"description" => Field::Description,
            b"pubDate" => Field::PubDate,
            b"source" => Field::Source,
            _ => Field::Other,
        }
    }
}

/// Parse `<item>` elements from an RSS document, in document order.
///
/// A trailing `" - Publisher"` is split off each title; the `<source>`
/// element wins over that suffix when both are present.
///
/// # Errors
///
/// Returns [`CollectError::Xml`] if the document is not well-formed.
pub fn parse_rss_items(xml: &str) -> Result<Vec<RawEntry>, CollectError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut current: Option<RawEntry> = None;
    let mut field = Field::Other;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.name();
                if name.as_ref() == b"item" {
                    current = Some(RawEntry::default());
                    field = Field::Other;
                } else if current.is_some() {
                    field = Field::from_tag(name.as_ref());
                }
            }
            Ok(Event::End(e)) => {
                if e.name().as_ref() == b"item" {
                    if let Some(entry) = current.take() {
                        entries.push(finish_entry(entry));
                    }
                }
                field = Field::Other;
            }
            Ok(Event::Text(e)) => {
                if let Some(entry) = current.as_mut() {
                    let text = e.unescape().unwrap_or_default();
                    append(entry, field, &text);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(entry) = current.as_mut() {
                    let text = String::from_utf8_lossy(e.as_ref());
                    append(entry, field, &text);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(CollectError::Xml(e)),
            _ => {}
        }
    }

    Ok(entries)
}

fn append(entry: &mut RawEntry, field: Field, text: &str) {
    let target = match field {
        Field::Title => &mut entry.title,
        Field::Link => &mut entry.link,
        Field::Description => &mut entry.description,
        Field::PubDate => &mut entry.published,
        Field::Source => entry.source.get_or_insert_with(String::new),
        Field::Other => return,
    };
    if !target.is_empty() {
        target.push(' ');
    }
    target.push_str(text);
}

fn finish_entry(mut entry: RawEntry) -> RawEntry {
    let (title, tail) = split_publisher_tail(&clean_text(&entry.title));
    entry.title = title;
    entry.source = entry
        .source
        .map(|s| clean_text(&s))
        .filter(|s| !s.is_empty())
        .or(tail);
    entry
}
