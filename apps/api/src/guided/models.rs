//! Data model of a guided-writing conversation.

use serde::{Deserialize, Serialize};

use crate::llm_client::Fallback;

/// Assistant turn appended before the first generated question.
pub const WELCOME_TEXT: &str = "你好！很高兴能帮助你梳理经历。我们从哪里开始呢？";

/// Substituted for a question when the model call fails.
pub const REPLY_FALLBACK_TEXT: &str = "抱歉，我好像遇到了一些问题。请稍后再试。";

/// Substituted for the resume body when synthesis fails.
pub const SYNTHESIS_FALLBACK_TEXT: &str = "生成简历时出错，请检查对话内容并重试。";

/// Fewest turns a transcript needs before synthesis is offered.
pub const MIN_TURNS_FOR_SYNTHESIS: usize = 3;

/// The job seeker's context, chosen once per conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Situation {
    SameRoleJobChange,
    CareerChange,
    StudentInternship,
    GraduateFirstJob,
}

impl Situation {
    pub const ALL: [Situation; 4] = [
        Situation::SameRoleJobChange,
        Situation::CareerChange,
        Situation::StudentInternship,
        Situation::GraduateFirstJob,
    ];

    /// Label shown to the user and embedded in the opening prompt.
    pub fn label(&self) -> &'static str {
        match self {
            Situation::SameRoleJobChange => "同岗位涨薪跳槽",
            Situation::CareerChange => "转行转岗跳槽",
            Situation::StudentInternship => "在校生找实习",
            Situation::GraduateFirstJob => "应届生找第一份工作",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    User,
    Assistant,
}

impl Speaker {
    /// Prefix used when a transcript is replayed into a prompt.
    pub fn prompt_label(&self) -> &'static str {
        match self {
            Speaker::User => "User",
            Speaker::Assistant => "AI",
        }
    }
}

/// One utterance. Fields are private so a turn cannot change after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueTurn {
    speaker: Speaker,
    text: String,
}

impl DialogueTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Assistant,
            text: text.into(),
        }
    }

    pub fn speaker(&self) -> Speaker {
        self.speaker
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Append-only, ordered record of a conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Transcript {
    turns: Vec<DialogueTurn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: DialogueTurn) {
        self.turns.push(turn);
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn turns(&self) -> &[DialogueTurn] {
        &self.turns
    }

    pub fn supports_synthesis(&self) -> bool {
        self.turns.len() >= MIN_TURNS_FOR_SYNTHESIS
    }

    /// Renders the transcript as `Speaker: text` lines, in order.
    pub fn to_prompt_block(&self) -> String {
        self.turns
            .iter()
            .map(|t| format!("{}: {}", t.speaker.prompt_label(), t.text))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Assistant text produced by an interview turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoachReply(pub String);

impl Fallback for CoachReply {
    fn fallback() -> Self {
        CoachReply(REPLY_FALLBACK_TEXT.to_string())
    }
}

/// Markdown resume body derived from a transcript. Replaced wholesale on regeneration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesizedDocument {
    pub markdown: String,
}

impl Fallback for SynthesizedDocument {
    fn fallback() -> Self {
        SynthesizedDocument {
            markdown: SYNTHESIS_FALLBACK_TEXT.to_string(),
        }
    }
}
