//! Inputs and outputs of the customization flow.

use serde::{Deserialize, Serialize};

use crate::llm_client::{Fallback, OutputSchema, SchemaField};
use crate::sessions::SessionError;

pub const FALLBACK_RESUME_TEXT: &str = "生成定制化简历时出错，请检查输入内容并重试。";
pub const FALLBACK_GREETING_TEXT: &str = "生成打招呼消息时出错，请稍后重试。";
pub const FALLBACK_COMPANY_NAME: &str = "未知公司";
pub const FALLBACK_POSITION_NAME: &str = "未知岗位";

/// The fixed four-field contract the model must fill in a single response.
pub const CUSTOMIZATION_SCHEMA: OutputSchema = OutputSchema::new(&[
    SchemaField {
        name: "customizedResume",
        description: "The full text of the customized resume, formatted in Markdown. (in Chinese)",
    },
    SchemaField {
        name: "greetingMessage",
        description: "A compelling greeting message for the application, following the specified template. (in Chinese)",
    },
    SchemaField {
        name: "companyName",
        description: "The name of the company from the job description. (in Chinese)",
    },
    SchemaField {
        name: "positionName",
        description: "The name of the job position from the job description. (in Chinese)",
    },
]);

/// Both texts a customization needs. Neither may be blank.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CustomizationRequest {
    pub base_resume: String,
    pub job_description: String,
}

impl CustomizationRequest {
    pub fn new(base_resume: impl Into<String>, job_description: impl Into<String>) -> Self {
        Self {
            base_resume: base_resume.into(),
            job_description: job_description.into(),
        }
    }

    /// Rejects blank inputs before any model call is made.
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.base_resume.trim().is_empty() {
            return Err(SessionError::Validation(
                "Base resume cannot be empty".to_string(),
            ));
        }
        if self.job_description.trim().is_empty() {
            return Err(SessionError::Validation(
                "Job description cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Tailored resume plus greeting, produced atomically by one model call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomizationResult {
    pub customized_resume: String,
    pub greeting_message: String,
    pub company_name: String,
    pub position_name: String,
}

impl Fallback for CustomizationResult {
    fn fallback() -> Self {
        CustomizationResult {
            customized_resume: FALLBACK_RESUME_TEXT.to_string(),
            greeting_message: FALLBACK_GREETING_TEXT.to_string(),
            company_name: FALLBACK_COMPANY_NAME.to_string(),
            position_name: FALLBACK_POSITION_NAME.to_string(),
        }
    }
}
