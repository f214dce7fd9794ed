use async_trait::async_trait;
use seo_core::{
    dedup_sources, AnalysisGateway, AnalysisResult, ChecklistItem, ChecklistStatus, Error,
    GroundingSource, ReadabilityItem, ReadabilityStatus, Result,
};
use std::fmt;

const TITLE_LIMIT: usize = 60;
const DESCRIPTION_LIMIT: usize = 155;
const MAX_TAGS: usize = 10;

/// Offline model that derives a deterministic analysis from the text itself.
pub struct DummyModel;

impl fmt::Debug for DummyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummyModel").finish()
    }
}

impl DummyModel {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DummyModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AnalysisGateway for DummyModel {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn analyze(&self, article_text: &str) -> Result<AnalysisResult> {
        if article_text.trim().is_empty() {
            return Err(Error::Validation("article text is empty".to_string()));
        }

        let mut lines = article_text.lines().map(str::trim).filter(|l| !l.is_empty());
        let first_line = lines.next().unwrap_or_default();
        let title_ok = first_line.chars().count() <= TITLE_LIMIT;
        let title = truncate(first_line, TITLE_LIMIT);
        let body: Vec<&str> = lines.collect();

        let words: Vec<&str> = article_text.split_whitespace().collect();
        let key_phrase = words
            .iter()
            .take(3)
            .map(|w| w.to_lowercase())
            .collect::<Vec<_>>()
            .join(" ");
        let description = truncate(&words.join(" "), DESCRIPTION_LIMIT);

        let mut tags: Vec<String> = Vec::new();
        for word in &words {
            let word: String = word.chars().filter(|c| c.is_alphanumeric()).collect::<String>().to_lowercase();
            if word.chars().count() >= 5 && !tags.contains(&word) {
                tags.push(word);
            }
            if tags.len() == MAX_TAGS {
                break;
            }
        }
        if tags.is_empty() {
            tags.push(key_phrase.clone());
        }

        let mut html_content = format!("<h1>{}</h1>", escape_html(&title));
        for paragraph in &body {
            html_content.push_str(&format!("<p>{}</p>", escape_html(paragraph)));
        }

        let average_sentence = average_sentence_words(article_text);

        Ok(AnalysisResult {
            social_media_post: format!("{} #{}", title, tags[0].replace(' ', "")),
            slug: slugify(&title),
            key_phrase,
            title,
            description,
            html_content,
            tags: tags.join(", "),
            categories: "Generale".to_string(),
            seo_checklist: vec![
                ChecklistItem {
                    item: "Title length".to_string(),
                    status: if title_ok { ChecklistStatus::Pass } else { ChecklistStatus::Fail },
                    details: format!("At most {} characters", TITLE_LIMIT),
                },
                ChecklistItem {
                    item: "Internal links".to_string(),
                    status: ChecklistStatus::ManualAction,
                    details: "Link related articles from the site".to_string(),
                },
            ],
            readability: vec![ReadabilityItem {
                criteria: "Sentence length".to_string(),
                status: match average_sentence {
                    n if n <= 20 => ReadabilityStatus::Good,
                    n if n <= 25 => ReadabilityStatus::Ok,
                    _ => ReadabilityStatus::NeedsImprovement,
                },
                score: format!("{} words", average_sentence),
                message: "Keep sentences under 20 words".to_string(),
            }],
            grounding_sources: Some(Vec::new()),
        })
    }

    async fn deepen(&self, current: &AnalysisResult, original_text: &str) -> Result<AnalysisResult> {
        let mut result = current.clone();
        let excerpt = truncate(&original_text.split_whitespace().collect::<Vec<_>>().join(" "), 200);
        result.html_content.push_str(&format!(
            "<h2>Approfondimento</h2><p>{}</p>",
            escape_html(&excerpt)
        ));
        let extra = GroundingSource {
            title: "Dummy reference".to_string(),
            uri: format!("https://example.com/{}", current.slug),
        };
        result.grounding_sources = Some(dedup_sources(current.sources().iter().cloned().chain([extra])));
        Ok(result)
    }
}

fn truncate(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect::<String>().trim_end().to_string()
}

fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "articolo".to_string()
    } else {
        slug.to_string()
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn average_sentence_words(text: &str) -> usize {
    let sentences: Vec<&str> = text
        .split(|c: char| c == '.' || c == '!' || c == '?')
        .filter(|s| !s.trim().is_empty())
        .collect();
    if sentences.is_empty() {
        return 0;
    }
    let words: usize = sentences.iter().map(|s| s.split_whitespace().count()).sum();
    words / sentences.len()
}
