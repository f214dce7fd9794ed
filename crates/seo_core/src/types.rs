use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChecklistStatus {
    Pass,
    Fail,
    ManualAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub item: String,
    pub status: ChecklistStatus,
    pub details: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadabilityStatus {
    Good,
    Ok,
    NeedsImprovement,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadabilityItem {
    /// e.g. "Parole di transizione", "Forme passive"
    pub criteria: String,
    pub status: ReadabilityStatus,
    /// Free-form score as reported by the model ("30%", "2 trovate").
    pub score: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingSource {
    pub title: String,
    pub uri: String,
}

/// Structured output of one optimization request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub key_phrase: String,
    pub title: String,
    /// Meta description.
    pub description: String,
    pub slug: String,
    /// Article body as an HTML fragment.
    pub html_content: String,
    /// Comma-joined.
    pub tags: String,
    /// Comma-joined.
    pub categories: String,
    pub social_media_post: String,
    pub seo_checklist: Vec<ChecklistItem>,
    pub readability: Vec<ReadabilityItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grounding_sources: Option<Vec<GroundingSource>>,
}

impl AnalysisResult {
    /// Checks that every required textual field is non-empty.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("keyPhrase", &self.key_phrase),
            ("title", &self.title),
            ("description", &self.description),
            ("slug", &self.slug),
            ("htmlContent", &self.html_content),
            ("tags", &self.tags),
            ("categories", &self.categories),
            ("socialMediaPost", &self.social_media_post),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(Error::Validation(format!("field `{}` must not be empty", field)));
            }
        }
        Ok(())
    }

    pub fn tag_list(&self) -> Vec<&str> {
        split_joined(&self.tags)
    }

    pub fn category_list(&self) -> Vec<&str> {
        split_joined(&self.categories)
    }

    pub fn sources(&self) -> &[GroundingSource] {
        self.grounding_sources.as_deref().unwrap_or_default()
    }
}

fn split_joined(value: &str) -> Vec<&str> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Deduplicates sources by uri. A later duplicate replaces the earlier entry
/// in place, so the first-seen position is kept.
pub fn dedup_sources<I>(sources: I) -> Vec<GroundingSource>
where
    I: IntoIterator<Item = GroundingSource>,
{
    let mut unique: Vec<GroundingSource> = Vec::new();
    for source in sources {
        match unique.iter_mut().find(|s| s.uri == source.uri) {
            Some(existing) => *existing = source,
            None => unique.push(source),
        }
    }
    unique
}

/// An analysis result kept by the user, together with the text that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedArticle {
    pub id: String,
    pub original_article_text: String,
    #[serde(flatten)]
    pub result: AnalysisResult,
}

impl SavedArticle {
    /// Builds a record with a fresh identifier. Identifiers are UUIDv7, so
    /// they sort by creation time and do not collide within one clock tick.
    pub fn new(result: AnalysisResult, original_article_text: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            original_article_text: original_article_text.into(),
            result,
        }
    }

    /// Splits the record into the part that is displayed and the input text.
    pub fn into_parts(self) -> LoadedArticle {
        LoadedArticle {
            result: self.result,
            original_text: self.original_article_text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadedArticle {
    pub result: AnalysisResult,
    pub original_text: String,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn sample_result(title: &str) -> AnalysisResult {
        AnalysisResult {
            key_phrase: "rust storage".to_string(),
            title: title.to_string(),
            description: "A description".to_string(),
            slug: "rust-storage".to_string(),
            html_content: "<h1>Rust</h1>".to_string(),
            tags: "rust, storage , ,serde".to_string(),
            categories: "Tech,Programming".to_string(),
            social_media_post: "Read this".to_string(),
            seo_checklist: vec![ChecklistItem {
                item: "Title length".to_string(),
                status: ChecklistStatus::ManualAction,
                details: "Under 60 chars".to_string(),
            }],
            readability: vec![ReadabilityItem {
                criteria: "Forme passive".to_string(),
                status: ReadabilityStatus::NeedsImprovement,
                score: "2 trovate".to_string(),
                message: "Use active voice".to_string(),
            }],
            grounding_sources: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::sample_result;
    use super::*;

    #[test]
    fn test_saved_article_serializes_flat_camel_case() {
        let saved = SavedArticle::new(sample_result("Title"), "original");
        let value = serde_json::to_value(&saved).unwrap();

        assert_eq!(value["originalArticleText"], "original");
        assert_eq!(value["keyPhrase"], "rust storage");
        assert_eq!(value["seoChecklist"][0]["status"], "manual_action");
        assert_eq!(value["readability"][0]["status"], "needs_improvement");
        assert!(value.get("result").is_none());
        assert!(value.get("groundingSources").is_none());
    }

    #[test]
    fn test_missing_slug_is_rejected() {
        let saved = SavedArticle::new(sample_result("Title"), "original");
        let mut value = serde_json::to_value(&saved).unwrap();
        value.as_object_mut().unwrap().remove("slug");

        assert!(serde_json::from_value::<SavedArticle>(value).is_err());
    }

    #[test]
    fn test_validate_rejects_blank_fields() {
        let mut result = sample_result("Title");
        assert!(result.validate().is_ok());

        result.title = "   ".to_string();
        let err = result.validate().unwrap_err();
        assert!(matches!(err, Error::Validation(msg) if msg.contains("title")));
    }

    #[test]
    fn test_tag_and_category_lists() {
        let result = sample_result("Title");
        assert_eq!(result.tag_list(), vec!["rust", "storage", "serde"]);
        assert_eq!(result.category_list(), vec!["Tech", "Programming"]);
    }

    #[test]
    fn test_dedup_sources_keeps_first_position() {
        let source = |title: &str, uri: &str| GroundingSource {
            title: title.to_string(),
            uri: uri.to_string(),
        };
        let sources = dedup_sources(vec![
            source("A", "https://a"),
            source("B", "https://b"),
            source("A2", "https://a"),
        ]);

        assert_eq!(sources, vec![source("A2", "https://a"), source("B", "https://b")]);
    }

    #[test]
    fn test_ids_are_unique() {
        let first = SavedArticle::new(sample_result("One"), "x");
        let second = SavedArticle::new(sample_result("Two"), "x");
        assert_ne!(first.id, second.id);
    }
}
