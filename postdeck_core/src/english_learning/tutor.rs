use anyhow::{anyhow, Result};
use reqwest::Client;

use super::{
    dto::{find_topic, ChatMessage, ChatRequest, ChatResponse, TutorAnswer},
    prompt::system_prompt,
};
use crate::helpers::env;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
const MAX_QUESTION_CHARS: usize = 2000;

/// Client for an OpenAI-compatible chat completions endpoint.
#[derive(Clone)]
pub struct EnglishTutor {
    http: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl EnglishTutor {
    pub fn new(api_key: String, base_url: String, model: String) -> Self {
        Self {
            http: Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        }
    }

    /// `None` when `OPENAI_API_KEY` is not set; the feature is then disabled.
    pub fn from_env() -> Option<Self> {
        let api_key = env::optional("OPENAI_API_KEY")?;
        Some(Self::new(
            api_key,
            env::or_default("OPENAI_BASE_URL", DEFAULT_BASE_URL),
            env::or_default("OPENAI_MODEL", DEFAULT_MODEL),
        ))
    }

    pub async fn ask(&self, question: &str, topic: Option<&str>) -> Result<TutorAnswer> {
        let question = question.trim();
        if question.is_empty() {
            return Err(anyhow!("Question must not be empty"));
        }
        if question.chars().count() > MAX_QUESTION_CHARS {
            return Err(anyhow!(
                "Question is too long (max {} characters)",
                MAX_QUESTION_CHARS
            ));
        }

        let system = system_prompt(topic);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &system,
                },
                ChatMessage {
                    role: "user",
                    content: question,
                },
            ],
            temperature: 0.4,
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            log::error!("Tutor request failed ({}): {}", status, body);
            return Err(anyhow!("Tutor service returned {}", status));
        }

        let body: ChatResponse = response.json().await?;
        let answer = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| anyhow!("Tutor returned an empty answer"))?;

        Ok(TutorAnswer {
            answer: answer.trim().to_string(),
            topic: topic.and_then(find_topic).map(|t| t.id.to_string()),
            model: self.model.clone(),
        })
    }
}
