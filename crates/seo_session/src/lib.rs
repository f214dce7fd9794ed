pub mod autosave;
pub mod config;
pub mod repository;
pub mod session;

pub use autosave::{autosave_tick, recover_draft, DraftAutosave, DEFAULT_AUTOSAVE_INTERVAL};
pub use config::SessionConfig;
pub use repository::{ArticleRepository, ImportMode};
pub use session::Session;

pub mod prelude {
    pub use super::{ArticleRepository, ImportMode, Session, SessionConfig};
    pub use seo_core::{AnalysisResult, Error, LoadedArticle, Result, SavedArticle};
}

#[cfg(test)]
pub(crate) mod test_support {
    use seo_core::{AnalysisResult, ChecklistItem, ChecklistStatus, ReadabilityItem, ReadabilityStatus};

    pub fn sample_result(title: &str) -> AnalysisResult {
        AnalysisResult {
            key_phrase: "autosave".to_string(),
            title: title.to_string(),
            description: "How drafts survive a crash".to_string(),
            slug: title.to_lowercase().replace(' ', "-"),
            html_content: format!("<h1>{}</h1><p>Body</p>", title),
            tags: "autosave, drafts, local storage".to_string(),
            categories: "Guides".to_string(),
            social_media_post: format!("New: {}", title),
            seo_checklist: vec![ChecklistItem {
                item: "Key phrase in title".to_string(),
                status: ChecklistStatus::Fail,
                details: "Add the key phrase".to_string(),
            }],
            readability: vec![ReadabilityItem {
                criteria: "Parole di transizione".to_string(),
                status: ReadabilityStatus::Good,
                score: "30%".to_string(),
                message: "Fine".to_string(),
            }],
            grounding_sources: None,
        }
    }
}
