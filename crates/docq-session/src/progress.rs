//! Polling watcher for GraphRAG index builds
//!
//! Index builds run server-side with no completion callback, so the only way
//! to know one finished is to poll the status endpoint. The watcher compares
//! each status against the `last_modified` snapshot taken before the build:
//! the index is ready once it exists with a newer modification time. Polling
//! stops at the deadline regardless, a build that takes longer has failed in
//! practice.

use std::pin::Pin;
use std::time::{Duration, Instant};

use async_stream::stream;
use docq_api::{Client, IndexStatus};
use tokio_stream::Stream;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// How the watcher paces itself
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Delay between status polls
    pub interval: Duration,
    /// Give up after this long
    pub timeout: Duration,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            timeout: Duration::from_secs(20 * 60),
        }
    }
}

/// Progress of a watched index build
#[derive(Debug, Clone)]
pub enum BuildProgress {
    /// A poll completed and the build is still running
    Building { elapsed: Duration, status: IndexStatus },
    /// The index exists and is newer than when the watch started
    Ready { status: IndexStatus },
    /// The deadline passed without the index appearing
    TimedOut { elapsed: Duration },
}

impl BuildProgress {
    /// Check if this is the watcher's final word
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BuildProgress::Ready { .. } | BuildProgress::TimedOut { .. }
        )
    }
}

/// A stream of build progress updates
pub type BuildProgressStream = Pin<Box<dyn Stream<Item = BuildProgress> + Send>>;

/// Poll index status until the build completes, times out, or is cancelled
///
/// `baseline` is the `last_modified` of the index before the build was
/// requested (`None` when no index existed). Cancellation ends the stream
/// without a terminal item. Poll errors are logged and the poll continues;
/// transient failures while the server is busy indexing are expected.
pub fn watch_build(
    client: Client,
    baseline: Option<f64>,
    config: WatchConfig,
    cancel: CancellationToken,
) -> BuildProgressStream {
    Box::pin(stream! {
        let started = Instant::now();
        loop {
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = tokio::time::sleep(config.interval) => {}
            }

            let elapsed = started.elapsed();
            match client.index_status().await {
                Ok(status) => {
                    if index_is_fresh(&status, baseline) {
                        yield BuildProgress::Ready { status };
                        return;
                    }
                    yield BuildProgress::Building { elapsed, status };
                }
                Err(err) => {
                    warn!("index status poll failed: {err}");
                }
            }

            if elapsed >= config.timeout {
                yield BuildProgress::TimedOut { elapsed };
                return;
            }
        }
    })
}

/// Whether a status reflects an index produced after the baseline snapshot.
fn index_is_fresh(status: &IndexStatus, baseline: Option<f64>) -> bool {
    if !status.index_exists {
        return false;
    }
    match (baseline, status.last_modified) {
        (None, _) => true,
        (Some(before), Some(now)) => now > before,
        (Some(_), None) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(exists: bool, modified: Option<f64>) -> IndexStatus {
        IndexStatus {
            graphrag_available: true,
            api_key_configured: true,
            index_exists: exists,
            workspace_path: "/srv/graphrag_workspace".into(),
            artifact_count: exists.then_some(12),
            last_modified: modified,
        }
    }

    #[test]
    fn test_first_build_ready_as_soon_as_index_exists() {
        assert!(index_is_fresh(&status(true, Some(100.0)), None));
        assert!(index_is_fresh(&status(true, None), None));
        assert!(!index_is_fresh(&status(false, None), None));
    }

    #[test]
    fn test_rebuild_requires_newer_timestamp() {
        assert!(!index_is_fresh(&status(true, Some(100.0)), Some(100.0)));
        assert!(!index_is_fresh(&status(true, Some(90.0)), Some(100.0)));
        assert!(index_is_fresh(&status(true, Some(101.0)), Some(100.0)));
    }

    #[test]
    fn test_rebuild_without_timestamp_stays_pending() {
        assert!(!index_is_fresh(&status(true, None), Some(100.0)));
    }

    #[tokio::test]
    async fn test_cancel_ends_stream_without_terminal() {
        use futures::StreamExt;

        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut stream = watch_build(
            Client::new("http://localhost:1"),
            None,
            WatchConfig::default(),
            cancel,
        );
        assert!(stream.next().await.is_none());
    }
}
