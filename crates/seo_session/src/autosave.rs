use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use seo_core::{Result, AUTOSAVE_DRAFT_KEY};
use seo_storage::DocumentStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

pub const DEFAULT_AUTOSAVE_INTERVAL: Duration = Duration::from_secs(120);

/// Reads the draft left by a previous session, if any. A corrupted draft is
/// cleared and reported as absent.
pub fn recover_draft(store: &DocumentStore) -> Result<Option<String>> {
    let draft: Option<String> = store.read_or_reset(AUTOSAVE_DRAFT_KEY)?;
    Ok(draft.filter(|text| !text.is_empty()))
}

/// One autosave pass: writes `text` as the draft unless it is blank.
/// Returns the write time, or `None` when nothing was written.
pub fn autosave_tick(store: &DocumentStore, text: &str) -> Result<Option<DateTime<Utc>>> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    store.write(AUTOSAVE_DRAFT_KEY, text)?;
    Ok(Some(Utc::now()))
}

/// Periodically persists the current draft text in the background.
///
/// The text is observed through a watch channel, so each tick sees the
/// latest value. The time of the last successful write is published on a
/// second watch channel for observers to subscribe to.
pub struct DraftAutosave {
    store: DocumentStore,
    text: watch::Receiver<String>,
    last_saved: Arc<watch::Sender<Option<DateTime<Utc>>>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl DraftAutosave {
    /// Spawns the timer on the current tokio runtime. The first tick fires
    /// one full `period` after start.
    pub fn start(
        store: DocumentStore,
        text: watch::Receiver<String>,
        last_saved: Option<DateTime<Utc>>,
        period: Duration,
    ) -> Self {
        let (sender, _) = watch::channel(last_saved);
        let last_saved = Arc::new(sender);

        let task = {
            let store = store.clone();
            let text = text.clone();
            let last_saved = last_saved.clone();
            tokio::spawn(async move {
                let mut ticker = interval_at(Instant::now() + period, period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    ticker.tick().await;
                    let current = text.borrow().clone();
                    match autosave_tick(&store, &current) {
                        Ok(Some(at)) => {
                            tracing::debug!("Autosaved draft ({} chars)", current.len());
                            last_saved.send_replace(Some(at));
                        }
                        Ok(None) => {}
                        Err(e) => tracing::warn!("⚠️ Autosave failed, retrying next tick: {}", e),
                    }
                }
            })
        };
        tracing::info!("⏱️ Draft autosave every {}s", period.as_secs());

        Self {
            store,
            text,
            last_saved,
            task: Mutex::new(Some(task)),
        }
    }

    /// Runs one tick immediately.
    pub fn flush(&self) -> Result<Option<DateTime<Utc>>> {
        let current = self.text.borrow().clone();
        let saved = autosave_tick(&self.store, &current)?;
        if saved.is_some() {
            self.last_saved.send_replace(saved);
        }
        Ok(saved)
    }

    pub fn last_saved(&self) -> Option<DateTime<Utc>> {
        *self.last_saved.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<DateTime<Utc>>> {
        self.last_saved.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.task.lock().as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Cancels the timer. Calling it again is harmless.
    pub fn stop(&self) {
        if let Some(task) = self.task.lock().take() {
            task.abort();
            tracing::debug!("Draft autosave stopped");
        }
    }
}

impl Drop for DraftAutosave {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seo_core::KeyValueStore;
    use seo_storage::MemoryStore;

    fn store() -> (Arc<MemoryStore>, DocumentStore) {
        let backend = Arc::new(MemoryStore::new());
        (backend.clone(), DocumentStore::new(backend))
    }

    #[test]
    fn test_tick_writes_non_empty_text() {
        let (_, store) = store();
        let at = autosave_tick(&store, "  draft with padding ").unwrap();
        assert!(at.is_some());
        assert_eq!(
            store.read::<String>(AUTOSAVE_DRAFT_KEY).unwrap().as_deref(),
            Some("  draft with padding ")
        );
    }

    #[test]
    fn test_tick_skips_blank_text() {
        let (_, store) = store();
        autosave_tick(&store, "kept").unwrap();

        assert_eq!(autosave_tick(&store, " \n\t ").unwrap(), None);
        assert_eq!(autosave_tick(&store, "").unwrap(), None);
        assert_eq!(store.read::<String>(AUTOSAVE_DRAFT_KEY).unwrap().as_deref(), Some("kept"));
    }

    #[test]
    fn test_recover_draft() {
        let (backend, store) = store();
        assert_eq!(recover_draft(&store).unwrap(), None);

        store.write(AUTOSAVE_DRAFT_KEY, "").unwrap();
        assert_eq!(recover_draft(&store).unwrap(), None);

        store.write(AUTOSAVE_DRAFT_KEY, "previous session").unwrap();
        assert_eq!(recover_draft(&store).unwrap().as_deref(), Some("previous session"));

        backend.set(AUTOSAVE_DRAFT_KEY, "raw, not json").unwrap();
        assert_eq!(recover_draft(&store).unwrap(), None);
        assert_eq!(backend.get(AUTOSAVE_DRAFT_KEY).unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_saves_latest_text() {
        let (_, store) = store();
        let (text_tx, text_rx) = watch::channel(String::new());
        let autosave = DraftAutosave::start(store.clone(), text_rx, None, DEFAULT_AUTOSAVE_INTERVAL);
        let mut events = autosave.subscribe();

        text_tx.send_replace("first".to_string());
        text_tx.send_replace("second".to_string());
        tokio::time::sleep(Duration::from_secs(119)).await;
        assert_eq!(store.read::<String>(AUTOSAVE_DRAFT_KEY).unwrap(), None);
        assert_eq!(autosave.last_saved(), None);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(store.read::<String>(AUTOSAVE_DRAFT_KEY).unwrap().as_deref(), Some("second"));
        assert!(events.has_changed().unwrap());
        let saved_at = *events.borrow_and_update();
        assert!(saved_at.is_some());

        text_tx.send_replace("   ".to_string());
        tokio::time::sleep(DEFAULT_AUTOSAVE_INTERVAL).await;
        assert_eq!(store.read::<String>(AUTOSAVE_DRAFT_KEY).unwrap().as_deref(), Some("second"));
        assert_eq!(autosave.last_saved(), saved_at);
        assert!(!events.has_changed().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_cancels_timer() {
        let (_, store) = store();
        let (text_tx, text_rx) = watch::channel("before stop".to_string());
        let autosave = DraftAutosave::start(store.clone(), text_rx, None, Duration::from_secs(10));
        assert!(autosave.is_running());

        autosave.stop();
        autosave.stop();
        tokio::task::yield_now().await;
        assert!(!autosave.is_running());

        text_tx.send_replace("after stop".to_string());
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(store.read::<String>(AUTOSAVE_DRAFT_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn test_flush_publishes_timestamp() {
        let (_, store) = store();
        let (_text_tx, text_rx) = watch::channel("flushed".to_string());
        let autosave = DraftAutosave::start(store.clone(), text_rx, None, DEFAULT_AUTOSAVE_INTERVAL);

        let at = autosave.flush().unwrap();
        assert!(at.is_some());
        assert_eq!(autosave.last_saved(), at);
        assert_eq!(store.read::<String>(AUTOSAVE_DRAFT_KEY).unwrap().as_deref(), Some("flushed"));
    }
}
