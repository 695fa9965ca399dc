use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::entry::{fallback_entries, FeedEntry};
use crate::fetcher::Fetcher;

/// Where the current entries came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntrySource {
    Fallback,
    Live,
}

/// What the blog listing observes: never an empty entry list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedState {
    pub entries: Vec<FeedEntry>,
    pub loading: bool,
    pub error: Option<String>,
    pub source: EntrySource,
}

impl FeedState {
    pub fn fallback() -> Self {
        Self {
            entries: fallback_entries(),
            loading: false,
            error: None,
            source: EntrySource::Fallback,
        }
    }
}

struct Shared {
    // Bumped on every unmount; a fetch cycle only writes while its generation is current
    generation: u64,
    state: FeedState,
}

/// The blog feed for one mount: fallback content right away, live content
/// after a single delayed fetch.
pub struct BlogFeed {
    fetcher: Arc<Fetcher>,
    delay: Duration,
    shared: Arc<RwLock<Shared>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl BlogFeed {
    pub fn mount(fetcher: Arc<Fetcher>, delay: Duration) -> Self {
        let shared = Arc::new(RwLock::new(Shared {
            generation: 0,
            state: FeedState::fallback(),
        }));
        let task = spawn_cycle(fetcher.clone(), shared.clone(), 0, delay);

        Self {
            fetcher,
            delay,
            shared,
            task: Mutex::new(Some(task)),
        }
    }

    pub async fn snapshot(&self) -> FeedState {
        self.shared.read().await.state.clone()
    }

    /// Cancel the pending fetch. Results of a fetch already in flight are discarded.
    pub async fn unmount(&self) {
        if let Some(task) = self.task.lock().await.take() {
            task.abort();
        }
        let mut shared = self.shared.write().await;
        shared.generation += 1;
        shared.state.loading = false;
    }

    /// Start a fresh mount: fallback content again, one more delayed fetch.
    pub async fn remount(&self) {
        let mut task = self.task.lock().await;
        if let Some(old) = task.take() {
            old.abort();
        }

        let generation = {
            let mut shared = self.shared.write().await;
            shared.generation += 1;
            shared.state = FeedState::fallback();
            shared.generation
        };

        info!("Remounting blog feed");
        *task = Some(spawn_cycle(
            self.fetcher.clone(),
            self.shared.clone(),
            generation,
            self.delay,
        ));
    }
}

impl Drop for BlogFeed {
    fn drop(&mut self) {
        if let Some(task) = self.task.get_mut().take() {
            task.abort();
        }
    }
}

fn spawn_cycle(
    fetcher: Arc<Fetcher>,
    shared: Arc<RwLock<Shared>>,
    generation: u64,
    delay: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        run_cycle(&fetcher, &shared, generation).await;
    })
}

async fn run_cycle(fetcher: &Fetcher, shared: &RwLock<Shared>, generation: u64) {
    {
        let mut shared = shared.write().await;
        if shared.generation != generation {
            return;
        }
        shared.state.loading = true;
        shared.state.error = None;
    }

    let result = fetcher.fetch_entries().await;

    let mut shared = shared.write().await;
    if shared.generation != generation {
        info!("Discarding feed result for a detached mount");
        return;
    }

    match result {
        Ok(entries) if !entries.is_empty() => {
            shared.state.entries = entries;
            shared.state.source = EntrySource::Live;
        }
        Ok(_) => {
            shared.state.error = Some("Failed to fetch blog posts".to_string());
            shared.state.entries = fallback_entries();
            shared.state.source = EntrySource::Fallback;
        }
        Err(e) => {
            error!("Error fetching blog posts: {}", e);
            shared.state.error = Some(e.to_string());
            shared.state.entries = fallback_entries();
            shared.state.source = EntrySource::Fallback;
        }
    }
    shared.state.loading = false;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn unreachable_fetcher() -> Arc<Fetcher> {
        // Port 9 (discard) on localhost refuses connections
        let config = Config::from_str(
            r#"
                feed_url = "feed"
                relay_url = "http://127.0.0.1:9/"
                request_timeout_secs = 2
            "#,
        )
        .unwrap();
        Arc::new(Fetcher::new(&config).unwrap())
    }

    #[tokio::test]
    async fn test_mount_starts_with_fallback() {
        let feed = BlogFeed::mount(unreachable_fetcher(), Duration::from_secs(60));

        let state = feed.snapshot().await;
        assert_eq!(state, FeedState::fallback());
        assert!(!state.loading);
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn test_network_failure_keeps_fallback() {
        let feed = BlogFeed::mount(unreachable_fetcher(), Duration::ZERO);

        let mut state = feed.snapshot().await;
        for _ in 0..250 {
            if state.error.is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
            state = feed.snapshot().await;
        }

        assert!(state.error.is_some());
        assert!(!state.loading);
        assert_eq!(state.entries, fallback_entries());
        assert_eq!(state.source, EntrySource::Fallback);
    }

    #[tokio::test]
    async fn test_unmount_before_delay_leaves_state_alone() {
        let feed = BlogFeed::mount(unreachable_fetcher(), Duration::from_millis(50));
        feed.unmount().await;

        tokio::time::sleep(Duration::from_millis(150)).await;

        let state = feed.snapshot().await;
        assert!(state.error.is_none());
        assert!(!state.loading);
        assert_eq!(state.entries, fallback_entries());
    }

    #[tokio::test]
    async fn test_remount_resets_state() {
        let feed = BlogFeed::mount(unreachable_fetcher(), Duration::from_secs(60));
        {
            let mut shared = feed.shared.write().await;
            shared.state.error = Some("stale".to_string());
        }

        feed.remount().await;

        let state = feed.snapshot().await;
        assert!(state.error.is_none());
        assert_eq!(state.entries, fallback_entries());
        assert_eq!(feed.shared.read().await.generation, 1);
    }

    #[tokio::test]
    async fn test_stale_generation_does_not_write() {
        let fetcher = unreachable_fetcher();
        let shared = RwLock::new(Shared {
            generation: 3,
            state: FeedState::fallback(),
        });

        run_cycle(&fetcher, &shared, 2).await;

        let shared = shared.read().await;
        assert!(shared.state.error.is_none());
        assert!(!shared.state.loading);
    }
}
