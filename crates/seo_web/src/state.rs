use seo_core::AnalysisGateway;
use seo_session::Session;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub session: Arc<Session>,
    pub gateway: Arc<dyn AnalysisGateway>,
}

impl AppState {
    pub fn new(session: Arc<Session>, gateway: Arc<dyn AnalysisGateway>) -> Self {
        Self { session, gateway }
    }
}
