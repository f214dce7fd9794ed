use crate::Result;

/// Key holding the JSON array of saved articles.
pub const SAVED_ARTICLES_KEY: &str = "seo-optimizer-saved-articles";

/// Key holding the autosaved draft as a JSON string.
pub const AUTOSAVE_DRAFT_KEY: &str = "cosmonet-autosave-draft";

/// A synchronous, string-keyed medium for whole documents.
///
/// Implementations must return promptly; callers hold locks across these calls.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

