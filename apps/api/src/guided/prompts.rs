//! Prompt builders for the guided-writing flow.
//!
//! Pure functions: the same inputs always produce the same prompt text.

use crate::guided::models::{Situation, Transcript};
use crate::llm_client::prompts::{render_template, COACH_PERSONA, RESPOND_IN_CHINESE};

/// Opening question. Slots: `{persona}`, `{situation}`, `{language}`.
const INITIAL_QUESTION_TEMPLATE: &str = r#"{persona} Your goal is to help a job seeker write their resume by asking guiding questions.

The user is in the following situation: "{situation}".

Start the conversation. Your first message should be encouraging and ask an open-ended question to get them started talking about their experiences related to their situation. Keep your first message concise, friendly, and under 50 words. Reply with plain text only. {language}"#;

/// Follow-up turn. Slots: `{persona}`, `{transcript}`, `{language}`.
const FOLLOW_UP_TEMPLATE: &str = r#"{persona} You are in a conversation with a job seeker to help them write their resume.

Here is the conversation history so far:
{transcript}

Your task is to:
1. Acknowledge and validate the user's last message.
2. Provide a short, encouraging sentence.
3. Ask one follow-up question that digs deeper into their experience, asks for specific examples, or prompts them to reflect on their skills and achievements.
4. Keep your response concise and conversational, in plain text. {language}"#;

/// Resume synthesis. Slots: `{transcript}`, `{language}`.
const SYNTHESIS_TEMPLATE: &str = r#"You are an expert resume writer. You will be given a conversation transcript between a career coach AI and a job seeker.

Your task is to analyze the entire conversation and synthesize the information into a professional, well-structured resume.

- Extract key responsibilities, achievements, and skills.
- Quantify achievements with numbers and metrics wherever possible, even if you have to make reasonable assumptions based on the context.
- Use action verbs to start bullet points.
- Organize the information into logical sections (e.g., Summary, Work Experience, Projects, Skills).
- The output should be a single block of text formatted with Markdown (use ### for section headers and * for bullet points). Do not include any introductory or concluding sentences outside of the resume content itself. {language}

Conversation History:
{transcript}"#;

pub fn build_initial_question_prompt(situation: Situation) -> String {
    render_template(
        INITIAL_QUESTION_TEMPLATE,
        &[
            ("persona", COACH_PERSONA),
            ("situation", situation.label()),
            ("language", RESPOND_IN_CHINESE),
        ],
    )
}

pub fn build_follow_up_prompt(transcript: &Transcript) -> String {
    render_template(
        FOLLOW_UP_TEMPLATE,
        &[
            ("persona", COACH_PERSONA),
            ("transcript", &transcript.to_prompt_block()),
            ("language", RESPOND_IN_CHINESE),
        ],
    )
}

pub fn build_synthesis_prompt(transcript: &Transcript) -> String {
    render_template(
        SYNTHESIS_TEMPLATE,
        &[
            ("transcript", &transcript.to_prompt_block()),
            ("language", RESPOND_IN_CHINESE),
        ],
    )
}
