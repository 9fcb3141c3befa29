//! Customization Session: one-shot tailoring of a base resume to a job description.
//!
//! Holds the current base resume (typed, or extracted from an upload), the last
//! job description, and the last result. `submit` validates locally, then makes
//! exactly one structured model call; failures yield the fallback result.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use crate::customization::models::{
    CustomizationRequest, CustomizationResult, CUSTOMIZATION_SCHEMA,
};
use crate::customization::prompts::build_customization_prompt;
use crate::llm_client::{generate_structured, recover, GenerationRequest, Generated, ModelGateway};
use crate::sessions::{InFlight, SessionError};

#[derive(Debug, Default)]
struct CustomizationState {
    base_resume: String,
    /// File name when the base resume came from an upload.
    base_resume_source: Option<String>,
    job_description: String,
    result: Option<CustomizationResult>,
}

/// Read-only view of a customization session for the UI.
#[derive(Debug, Clone, Serialize)]
pub struct CustomizationSnapshot {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub base_resume: String,
    pub base_resume_source: Option<String>,
    pub job_description: String,
    pub result: Option<CustomizationResult>,
    pub in_flight: bool,
}

pub struct CustomizationSession {
    id: Uuid,
    started_at: DateTime<Utc>,
    gateway: Arc<dyn ModelGateway>,
    in_flight: InFlight,
    state: Mutex<CustomizationState>,
}

impl CustomizationSession {
    pub fn new(gateway: Arc<dyn ModelGateway>) -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            gateway,
            in_flight: InFlight::default(),
            state: Mutex::new(CustomizationState::default()),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Replaces the base resume with typed text.
    pub async fn set_base_resume(&self, text: String) {
        let mut state = self.state.lock().await;
        state.base_resume = text;
        state.base_resume_source = None;
    }

    /// Replaces the base resume with text extracted from an uploaded file. Never merges.
    pub async fn load_base_resume(&self, file_name: String, text: String) {
        let mut state = self.state.lock().await;
        state.base_resume = text;
        state.base_resume_source = Some(file_name);
    }

    pub async fn clear_base_resume(&self) {
        let mut state = self.state.lock().await;
        state.base_resume.clear();
        state.base_resume_source = None;
    }

    /// Tailors the resume to `job_description`.
    ///
    /// `base_resume = None` uses the stored base resume. Blank effective inputs
    /// fail validation without any model call. On success the result replaces
    /// the previous one in full.
    pub async fn submit(
        &self,
        base_resume: Option<String>,
        job_description: String,
    ) -> Result<Generated<CustomizationResult>, SessionError> {
        let request = {
            let state = self.state.lock().await;
            let base_resume = base_resume.unwrap_or_else(|| state.base_resume.clone());
            CustomizationRequest::new(base_resume, job_description)
        };
        request.validate()?;
        let _guard = self.in_flight.acquire()?;

        {
            let mut state = self.state.lock().await;
            if state.base_resume != request.base_resume {
                state.base_resume = request.base_resume.clone();
                state.base_resume_source = None;
            }
            state.job_description = request.job_description.clone();
        }

        let generation =
            GenerationRequest::structured(build_customization_prompt(&request), CUSTOMIZATION_SCHEMA);
        let gateway = self.gateway.as_ref();
        let result = recover(
            "resume_customization",
            generate_structured::<CustomizationResult>(gateway, &generation),
        )
        .await;

        self.state.lock().await.result = Some(result.value().clone());
        info!(
            session_id = %self.id,
            company = %result.value().company_name,
            position = %result.value().position_name,
            fallback = result.is_fallback(),
            "Resume customized"
        );
        Ok(result)
    }

    pub async fn result(&self) -> Option<CustomizationResult> {
        self.state.lock().await.result.clone()
    }

    pub async fn snapshot(&self) -> CustomizationSnapshot {
        let state = self.state.lock().await;
        CustomizationSnapshot {
            session_id: self.id,
            started_at: self.started_at,
            base_resume: state.base_resume.clone(),
            base_resume_source: state.base_resume_source.clone(),
            job_description: state.job_description.clone(),
            result: state.result.clone(),
            in_flight: self.in_flight.is_set(),
        }
    }
}
