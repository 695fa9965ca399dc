use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use folio_feed::config::Config;
use folio_feed::fetcher::Fetcher;
use folio_feed::loader::BlogFeed;
use folio_feed::routes::{self, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "folio_feed=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::load("blog.toml")?;
    info!("Loaded configuration for feed {}", config.feed_url);

    // Fallback posts are served right away; the feed is fetched after the delay
    let fetcher = Arc::new(Fetcher::new(&config)?);
    let feed = BlogFeed::mount(fetcher, config.fetch_delay());

    let state = Arc::new(AppState { feed });
    let app = routes::router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!("Server starting on http://{}", config.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
