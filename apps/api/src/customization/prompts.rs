//! Prompt for resume customization and greeting generation.

use crate::customization::models::CustomizationRequest;
use crate::llm_client::prompts::{render_template, RESPOND_IN_CHINESE};

/// Outreach message the model fills in. Brackets mark the blanks.
pub const GREETING_TEMPLATE: &str = "您好，看了贵公司的岗位JD，对您发布的[岗位名称]岗位很感兴趣。我有[年限]的[核心经验]经验，具备[核心能力1]、[核心能力2]，擅长[技能]，有[项目/成就]的经验。与贵公司的岗位匹配度高，如果您觉得合适，可以回复一下，给您发我的简历和作品集，谢谢!";

/// Slots: `{language}`, `{base_resume}`, `{job_description}`, `{greeting_template}`.
const CUSTOMIZATION_TEMPLATE: &str = r#"You are an expert HR specialist and resume writer. Your task is to tailor a job applicant's resume for a specific role and write a compelling greeting message. {language}

**Base Resume:**
---
{base_resume}
---

**Job Description:**
---
{job_description}
---

**Instructions:**
1. **Extract Company and Position:** First, identify the company name and the specific position/job title from the Job Description.
2. **Customize Resume:** Analyze the Job Description and rewrite the Base Resume. The new resume must:
    - Emphasize the skills and experiences from the Base Resume that are most relevant to the Job Description.
    - Integrate keywords and terminology from the Job Description naturally.
    - Rephrase bullet points to highlight achievements and impact, aligning them with the requirements of the new role.
    - Maintain a professional tone and format.
    - The output should be a single block of text formatted with Markdown.
3. **Write Greeting Message:** Based on the tailored resume and the Job Description, write a greeting message following this template:
    "{greeting_template}"
    - Fill in the bracketed parts using information from the Job Description and the candidate's resume. The message must be concise, professional, and under 150 words.

Return a JSON object with exactly these fields: customizedResume, greetingMessage, companyName, positionName."#;

pub fn build_customization_prompt(request: &CustomizationRequest) -> String {
    render_template(
        CUSTOMIZATION_TEMPLATE,
        &[
            ("language", RESPOND_IN_CHINESE),
            ("base_resume", &request.base_resume),
            ("job_description", &request.job_description),
            ("greeting_template", GREETING_TEMPLATE),
        ],
    )
}
