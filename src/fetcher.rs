use chrono::{DateTime, Utc};
use feed_rs::parser;
use quick_xml::events::Event;
use quick_xml::Reader;
use reqwest::Client;
use tracing::{debug, info};

use crate::config::Config;
use crate::entry::FeedEntry;
use crate::error::FeedError;
use crate::normalize::{
    clean_title, estimate_read_time, extract_excerpt, format_published, infer_categories,
    resolve_image_url,
};

/// A feed item before any heuristics run. Missing fields are already defaulted.
#[derive(Debug, Clone, PartialEq)]
pub struct RawItem {
    pub title: String,
    pub link: String,
    pub published: Option<DateTime<Utc>>,
    pub content: String,
    pub author: Option<String>,
}

/// Text feed_rs doesn't expose, gathered from the raw XML of one `<item>`.
#[derive(Debug, Default)]
struct ItemText {
    all: String,
    encoded: String,
    creator: String,
    link: String,
}

pub struct Fetcher {
    client: Client,
    request_url: String,
    default_author: String,
}

impl Fetcher {
    pub fn new(config: &Config) -> Result<Self, FeedError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent("FolioFeed/1.0 (Blog Reader)")
            .build()?;

        Ok(Self {
            client,
            request_url: format!("{}{}", config.relay_url, config.feed_url),
            default_author: config.default_author.clone(),
        })
    }

    /// The relay prefix followed by the feed address.
    pub fn request_url(&self) -> &str {
        &self.request_url
    }

    /// One GET through the relay, parsed and normalized. No retries.
    pub async fn fetch_entries(&self) -> Result<Vec<FeedEntry>, FeedError> {
        info!("Fetching feed: {}", self.request_url);

        let response = self.client.get(&self.request_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }
        let bytes = response.bytes().await?;

        let items = parse_feed(&bytes)?;
        let entries = normalize_items(items, &self.default_author, Utc::now());

        info!("Parsed {} posts from feed", entries.len());
        Ok(entries)
    }
}

/// Parse an RSS document into raw items, in source order.
///
/// The document must be well-formed XML and hold at least one item.
pub fn parse_feed(bytes: &[u8]) -> Result<Vec<RawItem>, FeedError> {
    let texts = scan_items(bytes)?;
    let parsed = parser::parse(bytes)?;

    if parsed.entries.is_empty() {
        return Err(FeedError::NoItems);
    }

    let items = parsed
        .entries
        .into_iter()
        .enumerate()
        .map(|(i, entry)| {
            let raw = texts.get(i);

            let title = entry
                .title
                .map(|t| t.content)
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "Untitled".to_string());

            // feed_rs normalizes hrefs; keep the link exactly as the feed wrote it
            let link = raw
                .map(|r| r.link.trim().to_string())
                .filter(|l| !l.is_empty())
                .or_else(|| entry.links.first().map(|l| l.href.clone()))
                .unwrap_or_default();

            // content:encoded, then description, then whatever text the item holds
            let content = entry
                .content
                .and_then(|c| c.body)
                .filter(|c| !c.is_empty())
                .or_else(|| {
                    raw.map(|r| r.encoded.clone())
                        .filter(|c| !c.is_empty())
                })
                .or_else(|| {
                    entry
                        .summary
                        .map(|s| s.content)
                        .filter(|c| !c.is_empty())
                })
                .or_else(|| raw.map(|r| r.all.clone()))
                .unwrap_or_default();

            let author = entry
                .authors
                .into_iter()
                .map(|p| p.name)
                .find(|n| !n.trim().is_empty())
                .or_else(|| {
                    raw.map(|r| r.creator.trim().to_string())
                        .filter(|c| !c.is_empty())
                });

            RawItem {
                title,
                link,
                published: entry.published,
                content,
                author,
            }
        })
        .collect();

    Ok(items)
}

/// Walk the document once, rejecting anything that is not well-formed and
/// collecting per-item text.
fn scan_items(bytes: &[u8]) -> Result<Vec<ItemText>, FeedError> {
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();
    let mut open: Vec<Vec<u8>> = Vec::new();
    let mut items = Vec::new();
    let mut current: Option<ItemText> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let name = e.name().as_ref().to_vec();
                if name == b"item" {
                    current = Some(ItemText::default());
                }
                open.push(name);
            }
            Event::End(e) => {
                open.pop();
                if e.name().as_ref() == b"item" {
                    if let Some(item) = current.take() {
                        items.push(item);
                    }
                }
            }
            Event::Text(t) => {
                if let Some(item) = current.as_mut() {
                    let text = t
                        .unescape()
                        .map(|c| c.into_owned())
                        .unwrap_or_else(|_| String::from_utf8_lossy(&t).into_owned());
                    item.push(open.last().map(Vec::as_slice), &text);
                }
            }
            Event::CData(c) => {
                if let Some(item) = current.as_mut() {
                    let text = String::from_utf8_lossy(&c).into_owned();
                    item.push(open.last().map(Vec::as_slice), &text);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if let Some(name) = open.last() {
        return Err(FeedError::Xml(format!(
            "unclosed element <{}>",
            String::from_utf8_lossy(name)
        )));
    }

    Ok(items)
}

impl ItemText {
    fn push(&mut self, element: Option<&[u8]>, text: &str) {
        self.all.push_str(text);
        match element {
            Some(b"content:encoded") => self.encoded.push_str(text),
            Some(b"dc:creator") => self.creator.push_str(text),
            Some(b"link") => self.link.push_str(text),
            _ => {}
        }
    }
}

/// Derive the display fields of one item.
pub fn normalize_item(
    index: usize,
    item: RawItem,
    default_author: &str,
    fetched_at: DateTime<Utc>,
) -> FeedEntry {
    debug!(
        title = %item.title.chars().take(50).collect::<String>(),
        content_length = item.content.len(),
        "Processing post"
    );

    let combined = format!("{} {}", item.content, item.title);
    let image_url = resolve_image_url(&combined);
    debug!(image_url = %image_url, "Resolved post image");

    FeedEntry {
        id: format!("post-{}-{}", index, fetched_at.timestamp_millis()),
        title: clean_title(&item.title),
        excerpt: extract_excerpt(&item.content),
        published_display: format_published(item.published),
        read_time_display: estimate_read_time(&item.content),
        categories: infer_categories(&combined),
        image_url,
        source_url: item.link,
        author: item.author.unwrap_or_else(|| default_author.to_string()),
        content: item.content,
    }
}

pub fn normalize_items(
    items: Vec<RawItem>,
    default_author: &str,
    fetched_at: DateTime<Utc>,
) -> Vec<FeedEntry> {
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| normalize_item(i, item, default_author, fetched_at))
        .collect()
}
