//! Conversation Session: the guided-writing state machine.
//!
//! Unstarted --select_situation--> Active --send_user_message--> Active ...
//!
//! `synthesize` is orthogonal: it reads the transcript and never changes it.
//! Every operation that calls the model first claims the session's in-flight
//! flag, so a concurrent attempt is rejected with `SessionError::Busy`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use crate::guided::models::{
    CoachReply, DialogueTurn, Situation, SynthesizedDocument, Transcript,
    MIN_TURNS_FOR_SYNTHESIS, WELCOME_TEXT,
};
use crate::guided::prompts::{
    build_follow_up_prompt, build_initial_question_prompt, build_synthesis_prompt,
};
use crate::llm_client::{
    generate_text, recover, GenerationRequest, Generated, ModelGateway, Thinking,
};
use crate::sessions::{InFlight, SessionError};

#[derive(Debug, Default)]
struct ConversationState {
    situation: Option<Situation>,
    transcript: Transcript,
    document: Option<SynthesizedDocument>,
}

/// Read-only view of a conversation for the UI.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationSnapshot {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub situation: Option<Situation>,
    pub transcript: Transcript,
    pub document: Option<SynthesizedDocument>,
    pub in_flight: bool,
    pub can_synthesize: bool,
}

pub struct ConversationSession {
    id: Uuid,
    started_at: DateTime<Utc>,
    gateway: Arc<dyn ModelGateway>,
    in_flight: InFlight,
    state: Mutex<ConversationState>,
}

impl ConversationSession {
    pub fn new(gateway: Arc<dyn ModelGateway>) -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            gateway,
            in_flight: InFlight::default(),
            state: Mutex::new(ConversationState::default()),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Starts a fresh transcript for `situation`: welcome turn, then the generated opening question.
    ///
    /// Selecting again discards the previous transcript and document.
    pub async fn select_situation(
        &self,
        situation: Situation,
    ) -> Result<Generated<String>, SessionError> {
        let _guard = self.in_flight.acquire()?;

        {
            let mut state = self.state.lock().await;
            state.situation = Some(situation);
            state.transcript = Transcript::new();
            state.transcript.push(DialogueTurn::assistant(WELCOME_TEXT));
            state.document = None;
        }
        info!(session_id = %self.id, ?situation, "Guided session started");

        let request = GenerationRequest::text(build_initial_question_prompt(situation))
            .with_thinking(Thinking::Disabled);
        let reply = self.ask("initial_question", request).await;

        self.state
            .lock()
            .await
            .transcript
            .push(DialogueTurn::assistant(reply.value().as_str()));
        Ok(reply)
    }

    /// Appends the user's message and the coach's follow-up question.
    ///
    /// Blank messages, messages before a situation is chosen, and messages
    /// sent while another request is in flight leave the transcript untouched.
    pub async fn send_user_message(&self, text: &str) -> Result<Generated<String>, SessionError> {
        if text.trim().is_empty() {
            return Err(SessionError::EmptyMessage);
        }
        let _guard = self.in_flight.acquire()?;

        let transcript = {
            let mut state = self.state.lock().await;
            if state.situation.is_none() {
                return Err(SessionError::NotStarted);
            }
            state.transcript.push(DialogueTurn::user(text));
            state.transcript.clone()
        };

        let request = GenerationRequest::text(build_follow_up_prompt(&transcript))
            .with_thinking(Thinking::Disabled);
        let reply = self.ask("follow_up_question", request).await;

        let mut state = self.state.lock().await;
        state
            .transcript
            .push(DialogueTurn::assistant(reply.value().as_str()));
        info!(
            session_id = %self.id,
            turns = state.transcript.len(),
            "Guided session advanced"
        );
        Ok(reply)
    }

    /// Derives a resume from the current transcript, replacing any earlier one.
    pub async fn synthesize(&self) -> Result<Generated<SynthesizedDocument>, SessionError> {
        let _guard = self.in_flight.acquire()?;

        let transcript = {
            let state = self.state.lock().await;
            if !state.transcript.supports_synthesis() {
                return Err(SessionError::TranscriptTooShort {
                    required: MIN_TURNS_FOR_SYNTHESIS,
                    actual: state.transcript.len(),
                });
            }
            state.transcript.clone()
        };

        let request = GenerationRequest::text(build_synthesis_prompt(&transcript));
        let gateway = self.gateway.as_ref();
        let document = recover("resume_synthesis", async {
            generate_text(gateway, &request)
                .await
                .map(|markdown| SynthesizedDocument { markdown })
        })
        .await;

        self.state.lock().await.document = Some(document.value().clone());
        info!(
            session_id = %self.id,
            fallback = document.is_fallback(),
            "Resume synthesized from transcript"
        );
        Ok(document)
    }

    pub async fn snapshot(&self) -> ConversationSnapshot {
        let state = self.state.lock().await;
        ConversationSnapshot {
            session_id: self.id,
            started_at: self.started_at,
            situation: state.situation,
            transcript: state.transcript.clone(),
            document: state.document.clone(),
            in_flight: self.in_flight.is_set(),
            can_synthesize: state.transcript.supports_synthesis(),
        }
    }

    async fn ask(&self, operation: &'static str, request: GenerationRequest) -> Generated<String> {
        let gateway = self.gateway.as_ref();
        recover(operation, async {
            generate_text(gateway, &request).await.map(CoachReply)
        })
        .await
        .map(|reply| reply.0)
    }
}
