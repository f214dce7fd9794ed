use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde_json::Value;
use seo_core::{AnalysisResult, LoadedArticle, Result, SavedArticle};
use seo_storage::{create_store, DocumentStore};
use std::fmt;
use tokio::sync::watch;

use crate::autosave::{recover_draft, DraftAutosave};
use crate::repository::{ArticleRepository, ImportMode};
use crate::SessionConfig;

/// Everything one editing session owns: the store, the saved-article
/// collection, the current draft text and its autosave timer.
///
/// Collection operations take the repository lock for their whole
/// read-modify-write pass, so concurrent callers cannot interleave writes.
pub struct Session {
    store: DocumentStore,
    repository: Mutex<ArticleRepository>,
    text: watch::Sender<String>,
    autosave: DraftAutosave,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("store", &self.store)
            .field("articles", &self.repository.lock().len())
            .field("last_autosave", &self.autosave.last_saved())
            .finish()
    }
}

impl Session {
    /// Hydrates from `store` and starts the autosave timer. Must be called
    /// from within a tokio runtime.
    pub fn open(store: DocumentStore, config: &SessionConfig) -> Result<Self> {
        config.validate()?;
        let repository = ArticleRepository::hydrate(store.clone())?;

        let draft = recover_draft(&store)?;
        let recovered_at = draft.as_ref().map(|_| Utc::now());
        if let Some(text) = &draft {
            tracing::info!("📝 Recovered autosaved draft ({} chars)", text.len());
        }

        let (text, text_rx) = watch::channel(draft.unwrap_or_default());
        let autosave = DraftAutosave::start(store.clone(), text_rx, recovered_at, config.autosave_interval);

        Ok(Self {
            store,
            repository: Mutex::new(repository),
            text,
            autosave,
        })
    }

    /// Builds the configured backend and opens a session on it.
    pub fn from_config(config: &SessionConfig) -> Result<Self> {
        let backend = create_store(&config.storage)?;
        Self::open(DocumentStore::new(backend), config)
    }

    pub fn text(&self) -> String {
        self.text.borrow().clone()
    }

    pub fn set_text(&self, text: impl Into<String>) {
        self.text.send_replace(text.into());
    }

    pub fn last_autosave(&self) -> Option<DateTime<Utc>> {
        self.autosave.last_saved()
    }

    pub fn subscribe_autosave(&self) -> watch::Receiver<Option<DateTime<Utc>>> {
        self.autosave.subscribe()
    }

    /// Writes the current draft now instead of waiting for the next tick.
    pub fn flush_draft(&self) -> Result<Option<DateTime<Utc>>> {
        self.autosave.flush()
    }

    pub fn articles(&self) -> Vec<SavedArticle> {
        self.repository.lock().list().to_vec()
    }

    pub fn article_count(&self) -> usize {
        self.repository.lock().len()
    }

    /// Saves `result` with the current draft as its original text.
    pub fn save(&self, result: AnalysisResult, override_html: Option<&str>) -> Result<SavedArticle> {
        let original_text = self.text();
        self.save_with_text(result, &original_text, override_html)
    }

    pub fn save_with_text(
        &self,
        result: AnalysisResult,
        original_text: &str,
        override_html: Option<&str>,
    ) -> Result<SavedArticle> {
        self.repository.lock().save(result, original_text, override_html)
    }

    /// Loads a saved article and puts its original text back into the draft.
    pub fn load(&self, id: &str) -> Result<LoadedArticle> {
        let loaded = self.repository.lock().load(id)?;
        self.set_text(loaded.original_text.clone());
        Ok(loaded)
    }

    pub fn get(&self, id: &str) -> Option<SavedArticle> {
        self.repository.lock().get(id).cloned()
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        self.repository.lock().delete(id)
    }

    pub fn export(&self) -> Result<Value> {
        self.repository.lock().export_all()
    }

    pub fn export_pretty(&self) -> Result<String> {
        self.repository.lock().export_pretty()
    }

    /// Returns the size of the collection after the import.
    pub fn import(&self, document: Value, mode: ImportMode) -> Result<usize> {
        let mut repository = self.repository.lock();
        Ok(repository.import_all(document, mode)?.len())
    }

    pub fn import_str(&self, raw: &str, mode: ImportMode) -> Result<usize> {
        let mut repository = self.repository.lock();
        Ok(repository.import_str(raw, mode)?.len())
    }

    /// Saves the draft one last time and cancels the autosave timer.
    pub fn shutdown(&self) {
        if let Err(e) = self.autosave.flush() {
            tracing::warn!("⚠️ Final draft save failed: {}", e);
        }
        self.autosave.stop();
        tracing::info!("👋 Session closed");
    }

    pub fn is_autosave_running(&self) -> bool {
        self.autosave.is_running()
    }
}
