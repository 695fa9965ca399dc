//! Heuristics that turn a raw feed item into display fields.
//!
//! Every function here is pure and total: whatever the input, a usable value
//! comes back, so the page never has to deal with a missing field.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

pub const EXCERPT_MAX_CHARS: usize = 150;
pub const WORDS_PER_MINUTE: usize = 200;

pub const AUTONOMY_IMAGE: &str = "/static/blog-1.jpeg";
pub const AI_IMAGE: &str = "/static/blog-2.jpeg";
pub const HEALTHCARE_IMAGE: &str = "/static/blog-3.jpeg";
pub const DATA_IMAGE: &str = "/static/blog-1.jpeg";
pub const DEFAULT_IMAGE: &str = "/static/blog-1.jpeg";

pub const GENERIC_CATEGORY: &str = "Technology";

static MEDIUM_CDN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)https://miro\.medium\.com/[^"'\s)]+"#).unwrap());
static IMG_SRC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)<img[^>]+src=["']([^"']+)["'][^>]*>"#).unwrap());
static LEGACY_CDN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)https://cdn-images-\d+\.medium\.com/[^"'\s)]+"#).unwrap());
static IMAGE_EXT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)https://[^"'\s)]*\.(?:jpg|jpeg|png|webp|gif)[^"'\s)]*"#).unwrap()
});
static RESIZE_SEGMENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"/resize:[^/]+/").unwrap());
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());
static ENTITY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"&[^;]+;").unwrap());
static BRACKETED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[.*?\]").unwrap());

const CATEGORY_KEYWORDS: [(&str, &[&str]); 5] = [
    ("Autonomous Vehicles", &["autonomous", "vehicle", "car"]),
    (
        "Artificial Intelligence",
        &["ai", "artificial intelligence", "machine learning", "gpt"],
    ),
    ("Healthcare", &["health", "medical", "asthma"]),
    ("Data Engineering", &["data", "pipeline", "engineering"]),
    ("Cloud Computing", &["cloud", "aws", "azure"]),
];

// Scanned in order; the first hit picks the image
const IMAGE_KEYWORDS: [(&[&str], &str); 4] = [
    (&["autonomous", "vehicle"], AUTONOMY_IMAGE),
    (&["ai", "gpt"], AI_IMAGE),
    (&["health", "asthma"], HEALTHCARE_IMAGE),
    (&["data", "engineering"], DATA_IMAGE),
];

/// Pick a representative image for a post.
///
/// Literal URLs in the text win over keyword defaults. Medium CDN URLs are
/// rewritten to the 720px webp variant.
pub fn resolve_image_url(text: &str) -> String {
    let found = MEDIUM_CDN_RE
        .find(text)
        .map(|m| m.as_str())
        .or_else(|| {
            IMG_SRC_RE
                .captures(text)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str())
        })
        .or_else(|| LEGACY_CDN_RE.find(text).map(|m| m.as_str()))
        .or_else(|| IMAGE_EXT_RE.find(text).map(|m| m.as_str()));

    if let Some(url) = found {
        if url.contains("miro.medium.com") {
            return RESIZE_SEGMENT_RE
                .replace(url, "/resize:fit:720/format:webp/")
                .into_owned();
        }
        return url.to_string();
    }

    let lower = text.to_lowercase();
    IMAGE_KEYWORDS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(_, image)| image.to_string())
        .unwrap_or_else(|| DEFAULT_IMAGE.to_string())
}

fn strip_tags(content: &str) -> String {
    TAG_RE.replace_all(content, "").into_owned()
}

/// Plain-text summary of at most `EXCERPT_MAX_CHARS` characters plus an ellipsis.
pub fn extract_excerpt(content: &str) -> String {
    let without_tags = strip_tags(content);
    let plain = ENTITY_RE.replace_all(&without_tags, " ");

    if plain.chars().count() > EXCERPT_MAX_CHARS {
        let head: String = plain.chars().take(EXCERPT_MAX_CHARS).collect();
        format!("{}...", head.trim())
    } else {
        plain.trim().to_string()
    }
}

/// Reading time at `WORDS_PER_MINUTE`, never less than one minute.
pub fn estimate_read_time(content: &str) -> String {
    let words = strip_tags(content).split_whitespace().count();
    let minutes = words.div_ceil(WORDS_PER_MINUTE).max(1);
    format!("{} min read", minutes)
}

/// Topic labels whose keywords appear anywhere in the text (case-insensitive).
pub fn infer_categories(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let categories: Vec<String> = CATEGORY_KEYWORDS
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(label, _)| label.to_string())
        .collect();

    if categories.is_empty() {
        vec![GENERIC_CATEGORY.to_string()]
    } else {
        categories
    }
}

pub fn clean_title(title: &str) -> String {
    BRACKETED_RE.replace_all(title, "").trim().to_string()
}

pub fn format_published(published: Option<DateTime<Utc>>) -> String {
    match published {
        Some(date) => date.format("%B %-d, %Y").to_string(),
        None => "Recent".to_string(),
    }
}
