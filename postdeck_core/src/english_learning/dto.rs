use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AskRequest {
    pub question: String,
    #[serde(default)]
    pub topic: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TutorAnswer {
    pub answer: String,
    pub topic: Option<String>,
    pub model: String,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, ToSchema)]
pub struct Topic {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
}

pub const TOPICS: &[Topic] = &[
    Topic {
        id: "grammar",
        title: "Grammar",
        description: "Tenses, articles, prepositions and sentence structure",
    },
    Topic {
        id: "vocabulary",
        title: "Vocabulary",
        description: "Word meanings, synonyms and collocations",
    },
    Topic {
        id: "pronunciation",
        title: "Pronunciation",
        description: "Sounds, stress and intonation",
    },
    Topic {
        id: "idioms",
        title: "Idioms",
        description: "Common expressions and phrasal verbs",
    },
    Topic {
        id: "business",
        title: "Business English",
        description: "Emails, meetings and professional writing",
    },
    Topic {
        id: "writing",
        title: "Writing",
        description: "Style, clarity and social media copy",
    },
];

pub fn find_topic(id: &str) -> Option<&'static Topic> {
    TOPICS.iter().find(|t| t.id.eq_ignore_ascii_case(id))
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    pub temperature: f32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatChoice {
    pub message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatChoiceMessage {
    pub content: Option<String>,
}
