use seo_core::{Error, Result};
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

pub mod models;
pub mod prompts;

pub use models::create_model;
pub use seo_core::AnalysisGateway;

pub const DEFAULT_MODEL_NAME: &str = "gemini-3-flash-preview";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelKind {
    #[default]
    Gemini,
    Dummy,
}

impl FromStr for ModelKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "dummy" => Ok(Self::Dummy),
            other => Err(Error::Config(format!(
                "Unknown model: {} (available: gemini, dummy)",
                other
            ))),
        }
    }
}

#[derive(Clone)]
pub struct InferenceConfig {
    pub model: ModelKind,
    pub api_key: Option<String>,
    pub model_name: String,
    pub base_url: Url,
    pub timeout: Duration,
}

impl fmt::Debug for InferenceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InferenceConfig")
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("model_name", &self.model_name)
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            model: ModelKind::default(),
            api_key: None,
            model_name: DEFAULT_MODEL_NAME.to_string(),
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base url is valid"),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl InferenceConfig {
    /// Reads `SEO_MODEL`, `GEMINI_API_KEY` (or `API_KEY`), `GEMINI_MODEL` and
    /// `GEMINI_BASE_URL`.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(model) = env::var("SEO_MODEL") {
            config.model = model.parse()?;
        }
        config.api_key = env::var("GEMINI_API_KEY")
            .or_else(|_| env::var("API_KEY"))
            .ok()
            .filter(|key| !key.trim().is_empty());
        if let Ok(name) = env::var("GEMINI_MODEL") {
            config.model_name = name;
        }
        if let Ok(base_url) = env::var("GEMINI_BASE_URL") {
            config = config.with_base_url(&base_url)?;
        }
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        self.base_url = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("Invalid base url {}: {}", base_url, e)))?;
        Ok(self)
    }
}

pub mod prelude {
    pub use super::models::create_model;
    pub use super::{InferenceConfig, ModelKind};
    pub use seo_core::{AnalysisGateway, AnalysisResult, Error, GatewayError, Result};
}
