//! RSS 2.0 document parsing.
//!
//! Only the fields the aggregator stores are extracted: channel
//! title/link/description and, per `<item>`, title/link/description/pubDate.
//! Namespaced elements (`atom:link`, `dc:date`, …) are ignored because they
//! never match the plain element names.

use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::Reader;

use crate::error::FeedError;

/// Channel-level metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelInfo {
    pub title: String,
    pub link: String,
    pub description: String,
}

/// One `<item>` as found in the document.
///
/// `description` is XML-decoded but still HTML-escaped; `None` means the
/// element was absent, `Some("")` that it was present and empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFeedItem {
    pub title: String,
    pub link: String,
    pub pub_date: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFeed {
    pub channel: ChannelInfo,
    pub items: Vec<ParsedFeedItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    ChannelTitle,
    ChannelLink,
    ChannelDescription,
    ItemTitle,
    ItemLink,
    ItemDescription,
    ItemPubDate,
}

// Element depths: <rss>=0, <channel>=1, channel fields and <item>=2, item fields=3.
const CHANNEL_DEPTH: usize = 1;
const CHANNEL_CHILD_DEPTH: usize = 2;
const ITEM_CHILD_DEPTH: usize = 3;

#[derive(Default)]
struct ParseState {
    stack: Vec<Vec<u8>>,
    saw_root: bool,
    in_channel: bool,
    channel: Option<ChannelInfo>,
    item: Option<ParsedFeedItem>,
    items: Vec<ParsedFeedItem>,
    field: Option<(Field, usize)>,
    text: String,
}

impl ParseState {
    fn open(&mut self, name: &[u8]) -> Result<(), FeedError> {
        let depth = self.stack.len();

        if depth == 0 {
            if name != b"rss" {
                return Err(FeedError::Malformed(format!(
                    "root element is <{}>, expected <rss>",
                    String::from_utf8_lossy(name)
                )));
            }
            self.saw_root = true;
            return Ok(());
        }

        if self.field.is_some() {
            // Markup nested inside a field; its text is collected by the field.
            return Ok(());
        }

        match depth {
            CHANNEL_DEPTH if name == b"channel" && self.channel.is_none() => {
                self.in_channel = true;
                self.channel = Some(ChannelInfo::default());
            }
            CHANNEL_CHILD_DEPTH if self.in_channel => match name {
                b"item" => self.item = Some(ParsedFeedItem::default()),
                b"title" => self.begin(Field::ChannelTitle, depth),
                b"link" => self.begin(Field::ChannelLink, depth),
                b"description" => self.begin(Field::ChannelDescription, depth),
                _ => {}
            },
            ITEM_CHILD_DEPTH if self.in_channel && self.item.is_some() => match name {
                b"title" => self.begin(Field::ItemTitle, depth),
                b"link" => self.begin(Field::ItemLink, depth),
                b"description" => self.begin(Field::ItemDescription, depth),
                b"pubDate" => self.begin(Field::ItemPubDate, depth),
                _ => {}
            },
            _ => {}
        }

        Ok(())
    }

    /// Handle the end of the element `name` that was opened at `depth`.
    fn close(&mut self, name: &[u8], depth: usize) {
        if let Some((field, field_depth)) = self.field {
            if field_depth == depth {
                self.finish(field);
            }
            return;
        }

        match depth {
            CHANNEL_CHILD_DEPTH if name == b"item" => {
                if let Some(item) = self.item.take() {
                    self.items.push(item);
                }
            }
            CHANNEL_DEPTH if name == b"channel" => self.in_channel = false,
            _ => {}
        }
    }

    fn begin(&mut self, field: Field, depth: usize) {
        self.field = Some((field, depth));
        self.text.clear();
    }

    fn push_text(&mut self, text: &str) {
        if self.field.is_some() {
            self.text.push_str(text);
        }
    }

    fn finish(&mut self, field: Field) {
        self.field = None;
        let raw = std::mem::take(&mut self.text);

        match field {
            Field::ChannelTitle | Field::ChannelLink | Field::ChannelDescription => {
                let Some(channel) = self.channel.as_mut() else {
                    return;
                };
                let value = unescape_html(raw.trim());
                match field {
                    Field::ChannelTitle => channel.title = value,
                    Field::ChannelLink => channel.link = value,
                    _ => channel.description = value,
                }
            }
            _ => {
                let Some(item) = self.item.as_mut() else {
                    return;
                };
                match field {
                    Field::ItemTitle => item.title = unescape_html(raw.trim()),
                    Field::ItemLink => item.link = raw.trim().to_string(),
                    Field::ItemPubDate => item.pub_date = raw.trim().to_string(),
                    _ => item.description = Some(raw),
                }
            }
        }
    }
}

/// Parse an RSS 2.0 document.
///
/// # Errors
///
/// Returns [`FeedError::Xml`] if the payload is not well-formed XML,
/// [`FeedError::Malformed`] if the root element is not `<rss>` or the
/// document ends early, and [`FeedError::MissingChannel`] if there is no
/// `<channel>` under the root.
pub fn parse_feed(bytes: &[u8]) -> Result<ParsedFeed, FeedError> {
    let mut reader = Reader::from_reader(bytes);
    let mut state = ParseState::default();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = element_name(&e);
                state.open(&name)?;
                state.stack.push(name);
            }
            Event::Empty(e) => {
                let name = element_name(&e);
                state.open(&name)?;
                let depth = state.stack.len();
                state.close(&name, depth);
            }
            Event::End(_) => {
                if let Some(name) = state.stack.pop() {
                    let depth = state.stack.len();
                    state.close(&name, depth);
                }
            }
            Event::Text(e) => state.push_text(&decode_text(&e)),
            Event::CData(e) => state.push_text(&String::from_utf8_lossy(&e)),
            Event::Eof => break,
            _ => {}
        }
    }

    if !state.saw_root {
        return Err(FeedError::Malformed("document has no root element".to_string()));
    }
    if let Some(open) = state.stack.last() {
        return Err(FeedError::Malformed(format!(
            "document ended inside <{}>",
            String::from_utf8_lossy(open)
        )));
    }

    let channel = state.channel.ok_or(FeedError::MissingChannel)?;
    Ok(ParsedFeed {
        channel,
        items: state.items,
    })
}

fn element_name(e: &BytesStart<'_>) -> Vec<u8> {
    e.name().as_ref().to_vec()
}

/// XML-decode a text node. Entities XML does not know (`&nbsp;`, `&rsquo;`)
/// make the strict decoder fail; the raw text is kept so the HTML pass can
/// resolve them.
fn decode_text(e: &BytesText<'_>) -> String {
    match e.unescape() {
        Ok(text) => text.into_owned(),
        Err(_) => String::from_utf8_lossy(e).into_owned(),
    }
}

/// Resolve HTML character references. Input that is not valid HTML escaping
/// (a bare `&`, say) is returned unchanged.
pub(crate) fn unescape_html(s: &str) -> String {
    htmlescape::decode_html(s).unwrap_or_else(|_| s.to_string())
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
