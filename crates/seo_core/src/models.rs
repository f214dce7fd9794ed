use async_trait::async_trait;
use std::fmt;

use crate::types::AnalysisResult;
use crate::Result;

/// The remote service that turns article text into an SEO analysis.
#[async_trait]
pub trait AnalysisGateway: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Analyze raw article text.
    async fn analyze(&self, article_text: &str) -> Result<AnalysisResult>;

    /// Expand a previous result with more data, links and taxonomy.
    async fn deepen(&self, current: &AnalysisResult, original_text: &str) -> Result<AnalysisResult>;
}
