//! Folio Feed - the blog section of a portfolio site
//!
//! This crate ingests a Medium RSS feed through a CORS relay, normalizes each
//! post for display, and falls back to curated posts whenever the feed can't be used.

pub mod config;
pub mod entry;
pub mod error;
pub mod fetcher;
pub mod loader;
pub mod normalize;
pub mod routes;
