// JD customization: tailor a base resume to a job description and draft a greeting message.
// All model calls go through llm_client, never a direct HTTP call.

pub mod handlers;
pub mod models;
pub mod prompts;
pub mod session;

pub use session::CustomizationSession;
