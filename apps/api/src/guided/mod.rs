// Guided writing: interview the job seeker, then synthesize a resume from the transcript.
// All model calls go through llm_client, never a direct HTTP call.

pub mod handlers;
pub mod models;
pub mod prompts;
pub mod session;

pub use session::ConversationSession;
