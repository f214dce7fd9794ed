use serde::Deserialize;
use serde_json::Value;
use seo_core::{AnalysisResult, Error, LoadedArticle, Result, SavedArticle, SAVED_ARTICLES_KEY};
use seo_storage::DocumentStore;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// How an imported document is combined with the current collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    /// The collection becomes exactly the imported document.
    #[default]
    Replace,
    /// Imported records whose id is not already present are appended in order.
    Merge,
}

impl FromStr for ImportMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "replace" => Ok(Self::Replace),
            "merge" => Ok(Self::Merge),
            other => Err(Error::Validation(format!("Unknown import mode: {}", other))),
        }
    }
}

impl fmt::Display for ImportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Replace => f.write_str("replace"),
            Self::Merge => f.write_str("merge"),
        }
    }
}

/// The saved-article collection and its persistence.
///
/// The in-memory collection always matches what was last written: a
/// mutation whose write fails is rolled back before the error is returned.
#[derive(Debug)]
pub struct ArticleRepository {
    store: DocumentStore,
    articles: Vec<SavedArticle>,
}

impl ArticleRepository {
    /// Loads the collection from storage. A document that is not a JSON
    /// array is cleared and the repository starts empty. Inside a valid
    /// array, records that are not well-formed saved articles are skipped
    /// and the rest are kept.
    pub fn hydrate(store: DocumentStore) -> Result<Self> {
        let records: Vec<Value> = store.read_or_reset(SAVED_ARTICLES_KEY)?.unwrap_or_default();
        let total = records.len();

        let articles: Vec<SavedArticle> = records
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| match parse_record(record) {
                Ok(article) => Some(article),
                Err(e) => {
                    tracing::warn!("⚠️ Skipping stored article {}: {}", index, e);
                    None
                }
            })
            .collect();

        if articles.len() < total {
            tracing::warn!("⚠️ Kept {} of {} stored articles", articles.len(), total);
        }
        tracing::info!("📚 Loaded {} saved articles", articles.len());
        Ok(Self { store, articles })
    }

    pub fn list(&self) -> &[SavedArticle] {
        &self.articles
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&SavedArticle> {
        self.articles.iter().find(|a| a.id == id)
    }

    /// Saves `result` with the text that produced it. A non-blank
    /// `override_html` replaces the result's body, for output the user
    /// edited before saving.
    pub fn save(
        &mut self,
        mut result: AnalysisResult,
        original_text: &str,
        override_html: Option<&str>,
    ) -> Result<SavedArticle> {
        if let Some(html) = override_html.filter(|html| !html.trim().is_empty()) {
            result.html_content = html.to_string();
        }
        result.validate()?;
        let article = SavedArticle::new(result, original_text);
        self.articles.push(article.clone());

        if let Err(e) = self.persist() {
            self.articles.pop();
            return Err(e);
        }
        tracing::info!("💾 Saved article {} ({})", article.result.title, article.id);
        Ok(article)
    }

    pub fn load(&self, id: &str) -> Result<LoadedArticle> {
        self.get(id)
            .cloned()
            .map(SavedArticle::into_parts)
            .ok_or_else(|| Error::NotFound(format!("saved article {}", id)))
    }

    /// Removes the article with `id`. Unknown ids are ignored.
    pub fn delete(&mut self, id: &str) -> Result<()> {
        let Some(index) = self.articles.iter().position(|a| a.id == id) else {
            tracing::debug!("Delete of unknown article {} ignored", id);
            return Ok(());
        };
        let removed = self.articles.remove(index);

        if let Err(e) = self.persist() {
            self.articles.insert(index, removed);
            return Err(e);
        }
        tracing::info!("🗑️ Deleted article {}", id);
        Ok(())
    }

    /// The whole collection as a JSON array, for backups.
    pub fn export_all(&self) -> Result<Value> {
        Ok(serde_json::to_value(&self.articles)?)
    }

    pub fn export_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.articles)?)
    }

    /// Validates `document` completely, then combines it with the collection
    /// according to `mode` and persists. An invalid document leaves the
    /// collection untouched.
    pub fn import_all(&mut self, document: Value, mode: ImportMode) -> Result<&[SavedArticle]> {
        let incoming = validate_document(document)?;
        let count = incoming.len();

        let previous = match mode {
            ImportMode::Replace => std::mem::replace(&mut self.articles, incoming),
            ImportMode::Merge => {
                let previous = self.articles.clone();
                let mut known: HashSet<String> = self.articles.iter().map(|a| a.id.clone()).collect();
                for article in incoming {
                    if known.insert(article.id.clone()) {
                        self.articles.push(article);
                    }
                }
                previous
            }
        };

        if let Err(e) = self.persist() {
            self.articles = previous;
            return Err(e);
        }
        tracing::info!(
            "📥 Imported {} articles ({}), collection now holds {}",
            count,
            mode,
            self.articles.len()
        );
        Ok(&self.articles)
    }

    /// Parses `raw` as JSON and imports it. Unparsable input is a
    /// validation failure.
    pub fn import_str(&mut self, raw: &str, mode: ImportMode) -> Result<&[SavedArticle]> {
        let document: Value = serde_json::from_str(raw)
            .map_err(|e| Error::Validation(format!("import document is not valid JSON: {}", e)))?;
        self.import_all(document, mode)
    }

    fn persist(&self) -> Result<()> {
        self.store.write(SAVED_ARTICLES_KEY, &self.articles)
    }
}

fn validate_document(document: Value) -> Result<Vec<SavedArticle>> {
    let Value::Array(records) = document else {
        return Err(Error::Validation(
            "import document must be a JSON array of saved articles".to_string(),
        ));
    };

    let mut seen = HashSet::with_capacity(records.len());
    let mut articles = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        let article = parse_record(record).map_err(|e| match e {
            Error::Validation(msg) => Error::Validation(format!("record {}: {}", index, msg)),
            other => other,
        })?;
        if !seen.insert(article.id.clone()) {
            return Err(Error::Validation(format!(
                "record {}: duplicate id {}",
                index, article.id
            )));
        }
        articles.push(article);
    }
    Ok(articles)
}

/// One saved article with a non-empty id and every required field set.
fn parse_record(record: Value) -> Result<SavedArticle> {
    let article: SavedArticle =
        serde_json::from_value(record).map_err(|e| Error::Validation(e.to_string()))?;
    if article.id.trim().is_empty() {
        return Err(Error::Validation("empty id".to_string()));
    }
    article.result.validate()?;
    Ok(article)
}
