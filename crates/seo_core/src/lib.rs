pub mod error;
pub mod models;
pub mod storage;
pub mod types;

pub use error::{Error, GatewayError, Result, StorageError};
pub use models::AnalysisGateway;
pub use storage::{KeyValueStore, AUTOSAVE_DRAFT_KEY, SAVED_ARTICLES_KEY};
pub use types::{
    dedup_sources, AnalysisResult, ChecklistItem, ChecklistStatus, GroundingSource, LoadedArticle,
    ReadabilityItem, ReadabilityStatus, SavedArticle,
};
