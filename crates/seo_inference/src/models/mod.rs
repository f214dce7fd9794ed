use seo_core::{AnalysisGateway, Result};
use std::sync::Arc;

use crate::{InferenceConfig, ModelKind};

pub mod dummy;
pub mod gemini;

pub use dummy::DummyModel;
pub use gemini::GeminiModel;

pub fn create_model(config: &InferenceConfig) -> Result<Arc<dyn AnalysisGateway>> {
    let model: Arc<dyn AnalysisGateway> = match config.model {
        ModelKind::Gemini => Arc::new(GeminiModel::new(config)?),
        ModelKind::Dummy => Arc::new(DummyModel::new()),
    };
    tracing::info!("🧠 Analysis gateway initialized (using {})", model.name());
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use seo_core::Error;

    #[test]
    fn test_create_model() {
        let dummy = InferenceConfig {
            model: ModelKind::Dummy,
            ..InferenceConfig::default()
        };
        assert_eq!(create_model(&dummy).unwrap().name(), "Dummy");

        let gemini_without_key = InferenceConfig::default();
        assert!(matches!(create_model(&gemini_without_key), Err(Error::Config(_))));
    }
}
