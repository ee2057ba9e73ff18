use super::dto::find_topic;

const BASE_PROMPT: &str = "You are a patient English tutor for people who write social media posts. \
Answer in clear, simple English. Give a short explanation, then two or three example sentences. \
When the learner's question contains a mistake, point it out and show the corrected version. \
Keep answers under 250 words.";

pub fn system_prompt(topic: Option<&str>) -> String {
    match topic.and_then(find_topic) {
        Some(topic) => format!(
            "{}\n\nThe learner is studying {}: {}.",
            BASE_PROMPT,
            topic.title,
            topic.description.to_lowercase()
        ),
        None => BASE_PROMPT.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_is_appended() {
        let prompt = system_prompt(Some("idioms"));
        assert!(prompt.starts_with(BASE_PROMPT));
        assert!(prompt.contains("Idioms"));
        assert_eq!(system_prompt(Some("unknown")), BASE_PROMPT);
        assert_eq!(system_prompt(None), BASE_PROMPT);
    }
}
