use crate::advice::prompts::{
    build_extraction_prompt, build_general_advice_prompt, build_product_advice_prompt,
    ADVICE_SYSTEM, CONVERSATION_SYSTEM, CONVERSATION_WINDOW, EXTRACTION_SYSTEM,
};
use crate::advice::{AdviceGenerator, AdviceRequest, AttributeExtractor, Turn};
use crate::error::{FitError, Result};
use crate::types::config::LlmConfig;
use crate::types::profile::UserProfile;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

/// Chat-completions client for OpenAI-compatible endpoints.
pub struct OpenAiClient {
    client: reqwest::blocking::Client,
    endpoint: String,
    model: String,
    api_key: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl OpenAiClient {
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            FitError::Llm(format!(
                "environment variable {} is not set",
                config.api_key_env
            ))
        })?;
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    /// Configured values win over the per-call defaults.
    fn complete(
        &self,
        messages: Vec<Value>,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String> {
        let body = json!({
            "model": self.model,
            "messages": messages,
            "temperature": self.temperature.unwrap_or(temperature),
            "max_tokens": self.max_tokens.unwrap_or(max_tokens),
        });
        debug!(endpoint = %self.endpoint, model = %self.model, "sending chat completion");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    FitError::Llm(format!("request to {} timed out", self.endpoint))
                } else {
                    FitError::Http(e)
                }
            })?;

        let status = response.status();
        let text = response.text()?;
        if !status.is_success() {
            return Err(FitError::Llm(format!(
                "{} returned {}: {}",
                self.endpoint,
                status,
                truncate(&text, 200)
            )));
        }
        parse_completion(&text)
    }
}

fn truncate(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

/// Pulls `choices[0].message.content` out of a chat-completions response.
pub fn parse_completion(body: &str) -> Result<String> {
    let value: Value = serde_json::from_str(body)?;
    value["choices"][0]["message"]["content"]
        .as_str()
        .map(|content| content.trim().to_string())
        .ok_or_else(|| FitError::Llm("no content in completion response".to_string()))
}

/// Models often wrap JSON in a fenced code block.
pub fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn message(role: &str, content: &str) -> Value {
    json!({ "role": role, "content": content })
}

impl AttributeExtractor for OpenAiClient {
    /// Transport or parse failures degrade to an empty update.
    fn extract(&self, text: &str) -> Result<UserProfile> {
        let messages = vec![
            message("system", EXTRACTION_SYSTEM),
            message("user", &build_extraction_prompt(text)),
        ];
        let content = match self.complete(messages, 0.3, 200) {
            Ok(content) => content,
            Err(e) => {
                warn!(error = %e, "attribute extraction failed");
                return Ok(UserProfile::default());
            }
        };
        match serde_json::from_str::<UserProfile>(strip_code_fence(&content)) {
            Ok(profile) => Ok(profile),
            Err(e) => {
                warn!(error = %e, "extraction response was not valid profile json");
                Ok(UserProfile::default())
            }
        }
    }
}

impl AdviceGenerator for OpenAiClient {
    fn advise(&self, request: &AdviceRequest<'_>) -> Result<String> {
        let prompt = match request.product {
            Some(product) => {
                build_product_advice_prompt(request.profile, request.recommendation, product)
            }
            None => build_general_advice_prompt(
                request.profile,
                request.recommendation,
                request.history,
            ),
        };
        let messages = vec![message("system", ADVICE_SYSTEM), message("user", &prompt)];
        self.complete(messages, 0.7, 300)
    }

    fn converse(&self, _profile: &UserProfile, history: &[Turn]) -> Result<String> {
        let mut messages = vec![message("system", CONVERSATION_SYSTEM)];
        messages.extend(
            history
                .iter()
                .skip(history.len().saturating_sub(CONVERSATION_WINDOW))
                .map(|turn| message(turn.role.as_str(), &turn.content)),
        );
        self.complete(messages, 0.8, 200)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::measurement::MeasurementKind;

    #[test]
    fn parse_completion_reads_first_choice() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"  Go with M.  "}}]}"#;
        assert_eq!(parse_completion(body).expect("content should parse"), "Go with M.");
    }

    #[test]
    fn parse_completion_rejects_missing_content() {
        let err = parse_completion(r#"{"choices":[]}"#).expect_err("missing content should fail");
        assert!(matches!(err, FitError::Llm(_)));
    }

    #[test]
    fn fenced_json_is_unwrapped_and_parsed() {
        let content = "```json\n{\"height_cm\": 180, \"body_type\": \"slim\", \"measurements\": {\"chest\": 97}}\n```";
        let profile: UserProfile =
            serde_json::from_str(strip_code_fence(content)).expect("profile should parse");
        assert_eq!(profile.height_cm, Some(180.0));
        assert_eq!(profile.body_type.as_deref(), Some("slim"));
        assert_eq!(profile.measurements.get(MeasurementKind::Chest), Some(97.0));
    }

    #[test]
    fn missing_api_key_is_reported() {
        let config = LlmConfig {
            api_key_env: "FITSIZE_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..LlmConfig::default()
        };
        let err = OpenAiClient::from_config(&config)
            .err()
            .expect("client should not build without a key");
        assert!(err.to_string().contains("FITSIZE_TEST_KEY_THAT_IS_NEVER_SET"));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("ok", 10), "ok");
    }
}
