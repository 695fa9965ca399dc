use std::collections::BTreeSet;
use std::sync::Arc;

use askama::Template;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::entry::FeedEntry;
use crate::error::AppError;
use crate::loader::{BlogFeed, EntrySource, FeedState};

const POSTS_PER_PAGE: usize = 6;
const ALL_CATEGORIES: &str = "All";

pub struct AppState {
    pub feed: BlogFeed,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/posts", get(api_posts))
        .route("/refresh", post(refresh))
        .route("/health", get(health))
        .nest_service("/static", ServeDir::new("static"))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// Template structs
#[derive(Template)]
#[template(path = "blog.html")]
pub struct BlogTemplate {
    pub entries: Vec<FeedEntry>,
    pub chips: Vec<CategoryChip>,
    pub pages: Vec<PageLink>,
    pub loading: bool,
    pub has_error: bool,
    pub live: bool,
    pub has_prev: bool,
    pub prev_href: String,
    pub has_next: bool,
    pub next_href: String,
}

pub struct CategoryChip {
    pub name: String,
    pub href: String,
    pub active: bool,
}

pub struct PageLink {
    pub number: usize,
    pub href: String,
    pub current: bool,
}

// Wrapper for HTML responses
struct HtmlTemplate<T>(T);

impl<T: Template> IntoResponse for HtmlTemplate<T> {
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to render template: {}", err),
            )
                .into_response(),
        }
    }
}

#[derive(Deserialize)]
pub struct ListingQuery {
    #[serde(default = "default_category")]
    pub category: String,
    // Kept as text so a malformed page falls back to the first one
    #[serde(default)]
    pub page: Option<String>,
}

impl ListingQuery {
    pub fn page_number(&self) -> usize {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(1)
    }
}

fn default_category() -> String {
    ALL_CATEGORIES.to_string()
}

fn listing_href(category: &str, page: usize) -> Result<String, AppError> {
    let page = page.to_string();
    let query = serde_urlencoded::to_string([("category", category), ("page", page.as_str())])?;
    Ok(format!("/?{}", query))
}

/// "All" followed by every category in use, sorted.
pub fn category_names(entries: &[FeedEntry]) -> Vec<String> {
    let unique: BTreeSet<&str> = entries
        .iter()
        .flat_map(|e| e.categories.iter().map(String::as_str))
        .collect();

    std::iter::once(ALL_CATEGORIES)
        .chain(unique)
        .map(str::to_string)
        .collect()
}

pub fn filter_by_category<'a>(entries: &'a [FeedEntry], category: &str) -> Vec<&'a FeedEntry> {
    entries
        .iter()
        .filter(|e| category == ALL_CATEGORIES || e.categories.iter().any(|c| c == category))
        .collect()
}

/// Number of pages for `count` posts; an empty listing still has one page.
pub fn page_count(count: usize) -> usize {
    count.div_ceil(POSTS_PER_PAGE).max(1)
}

fn build_listing(state: FeedState, query: ListingQuery) -> Result<BlogTemplate, AppError> {
    let chips = category_names(&state.entries)
        .into_iter()
        .map(|name| {
            Ok(CategoryChip {
                href: listing_href(&name, 1)?,
                active: name == query.category,
                name,
            })
        })
        .collect::<Result<Vec<_>, AppError>>()?;

    let filtered = filter_by_category(&state.entries, &query.category);
    let total_pages = page_count(filtered.len());
    let page = query.page_number().clamp(1, total_pages);

    let entries = filtered
        .into_iter()
        .skip((page - 1) * POSTS_PER_PAGE)
        .take(POSTS_PER_PAGE)
        .cloned()
        .collect();

    let pages = (1..=total_pages)
        .map(|number| {
            Ok(PageLink {
                number,
                href: listing_href(&query.category, number)?,
                current: number == page,
            })
        })
        .collect::<Result<Vec<_>, AppError>>()?;

    Ok(BlogTemplate {
        entries,
        chips,
        pages,
        loading: state.loading,
        has_error: state.error.is_some() && !state.loading,
        live: state.source == EntrySource::Live && state.error.is_none() && !state.loading,
        has_prev: page > 1,
        prev_href: listing_href(&query.category, page.saturating_sub(1).max(1))?,
        has_next: page < total_pages,
        next_href: listing_href(&query.category, (page + 1).min(total_pages))?,
    })
}

// Route handlers
pub async fn index(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListingQuery>,
) -> Result<impl IntoResponse, AppError> {
    let snapshot = state.feed.snapshot().await;
    Ok(HtmlTemplate(build_listing(snapshot, query)?))
}

pub async fn api_posts(State(state): State<Arc<AppState>>) -> Json<FeedState> {
    Json(state.feed.snapshot().await)
}

/// Manual retry: a fresh mount with its own delayed fetch.
pub async fn refresh(State(state): State<Arc<AppState>>) -> Redirect {
    state.feed.remount().await;
    Redirect::to("/")
}

pub async fn health() -> impl IntoResponse {
    Html("OK")
}
