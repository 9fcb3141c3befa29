use std::sync::Arc;

use crate::config::Config;
use crate::customization::CustomizationSession;
use crate::export::ExportSettings;
use crate::guided::ConversationSession;
use crate::intake::PageTextSource;
use crate::llm_client::ModelGateway;
use crate::sessions::SessionRegistry;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// The one gateway built at startup; every new session gets a clone of this handle.
    pub gateway: Arc<dyn ModelGateway>,
    /// Page-by-page text extraction for uploaded resumes.
    pub text_source: Arc<dyn PageTextSource>,
    pub export: Arc<ExportSettings>,
    pub conversations: Arc<SessionRegistry<ConversationSession>>,
    pub customizations: Arc<SessionRegistry<CustomizationSession>>,
}
