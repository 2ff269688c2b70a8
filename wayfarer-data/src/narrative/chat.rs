//! OpenAI-compatible chat-completions client producing narrative itineraries.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::runtime::Runtime;
use url::Url;
use wayfarer_core::{NarrativeItinerary, Point, RecommendationError, RecommendationProvider};

use crate::blocking;
use crate::routing::{DEFAULT_USER_AGENT, ProviderBuildError, RetryPolicy};

/// Default model requested from the completions endpoint.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default narrative request timeout.
pub const DEFAULT_NARRATIVE_TIMEOUT: Duration = Duration::from_secs(20);

const SYSTEM_PROMPT: &str = "You plan sightseeing itineraries. Reply only with lines of the form \
`Day N` followed by `HH:MM-HH:MM Spot name`, using 24-hour times. \
Visit every listed spot once, start days at 09:00 and finish by 20:00.";

/// Configuration for [`ChatNarrativeProvider`].
#[derive(Clone, PartialEq, Eq)]
pub struct ChatNarrativeConfig {
    /// API base URL; `/chat/completions` is appended.
    pub base_url: String,
    /// Model name.
    pub model: String,
    /// Bearer token, if the endpoint needs one.
    pub api_key: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
    /// User agent string.
    pub user_agent: String,
    /// Retry schedule for transient failures.
    pub retry: RetryPolicy,
}

impl std::fmt::Debug for ChatNarrativeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatNarrativeConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("retry", &self.retry)
            .finish()
    }
}

impl Default for ChatNarrativeConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_owned(),
            model: DEFAULT_MODEL.to_owned(),
            api_key: None,
            timeout: DEFAULT_NARRATIVE_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            retry: RetryPolicy::new(2, Duration::from_millis(200), Duration::from_secs(1)),
        }
    }
}

impl ChatNarrativeConfig {
    /// Configuration pointing at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Set the model name.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the bearer token.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry policy.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// Narrative provider calling `POST {base}/chat/completions`.
pub struct ChatNarrativeProvider {
    client: Client,
    endpoint: String,
    config: ChatNarrativeConfig,
    runtime: Runtime,
}

impl std::fmt::Debug for ChatNarrativeProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatNarrativeProvider")
            .field("endpoint", &self.endpoint)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ChatNarrativeProvider {
    /// Provider with explicit configuration.
    ///
    /// # Errors
    /// Returns [`ProviderBuildError`] if the URL is invalid or the client or
    /// runtime fails to build.
    pub fn with_config(config: ChatNarrativeConfig) -> Result<Self, ProviderBuildError> {
        let base = Url::parse(&config.base_url).map_err(|err| ProviderBuildError::InvalidBaseUrl {
            url: config.base_url.clone(),
            message: err.to_string(),
        })?;
        let endpoint = format!("{}/chat/completions", base.as_str().trim_end_matches('/'));
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(ProviderBuildError::HttpClient)?;
        let runtime = blocking::owned_runtime().map_err(ProviderBuildError::Runtime)?;
        Ok(Self {
            client,
            endpoint,
            config,
            runtime,
        })
    }

    /// Full completions URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn complete(&self, prompt: &str) -> Result<String, RecommendationError> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: 0.3,
        };
        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }
        let response = request
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(&err))?;
        let parsed: ChatResponse =
            response
                .json()
                .await
                .map_err(|err| RecommendationError::ParseError {
                    message: err.to_string(),
                })?;
        first_content(parsed)
    }

    fn convert_reqwest_error(&self, error: &reqwest::Error) -> RecommendationError {
        let url = self.endpoint.clone();
        if error.is_timeout() {
            return RecommendationError::Timeout {
                url,
                timeout_secs: self.config.timeout.as_secs(),
            };
        }
        if let Some(status) = error.status() {
            return RecommendationError::HttpError {
                url,
                status: status.as_u16(),
                message: error.to_string(),
            };
        }
        RecommendationError::NetworkError {
            url,
            message: error.to_string(),
        }
    }
}

fn first_content(response: ChatResponse) -> Result<String, RecommendationError> {
    response
        .choices
        .into_iter()
        .find_map(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or(RecommendationError::EmptyResponse)
}

/// User prompt listing the spots to cover.
pub(crate) fn user_prompt(points: &[Point], city: &str) -> String {
    let mut prompt = format!("Plan a visit to {city} covering these spots:\n");
    for point in points {
        prompt.push_str("- ");
        prompt.push_str(&point.name);
        if let Some(address) = &point.address {
            prompt.push_str(" (");
            prompt.push_str(address);
            prompt.push(')');
        } else if let Some(location) = point.location {
            prompt.push_str(&format!(" ({:.5}, {:.5})", location.y, location.x));
        }
        if let Some(minutes) = point.visit_minutes {
            prompt.push_str(&format!(", about {minutes} minutes"));
        }
        prompt.push('\n');
    }
    prompt
}

impl RecommendationProvider for ChatNarrativeProvider {
    fn narrative_itinerary(
        &self,
        points: &[Point],
        city: &str,
    ) -> Result<NarrativeItinerary, RecommendationError> {
        let prompt_text = user_prompt(points, city);
        let prompt = prompt_text.as_str();
        log::info!("requesting narrative itinerary for {city} from {}", self.endpoint);
        let future = self.config.retry.run(
            "narrative",
            RecommendationError::is_transient,
            move || self.complete(prompt),
        );
        let text = blocking::block_on(&self.runtime, future)?;
        Ok(NarrativeItinerary::from_text(&text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use wayfarer_core::test_support::{point, unresolved_point};

    #[rstest]
    #[case("http://llm.test/v1", "http://llm.test/v1/chat/completions")]
    #[case("http://llm.test/v1/", "http://llm.test/v1/chat/completions")]
    #[case("http://llm.test", "http://llm.test/chat/completions")]
    fn endpoint_appends_chat_completions(#[case] base: &str, #[case] expected: &str) {
        let provider =
            ChatNarrativeProvider::with_config(ChatNarrativeConfig::new(base)).expect("provider");
        assert_eq!(provider.endpoint(), expected);
    }

    #[rstest]
    fn prompt_lists_every_spot() {
        let points = [
            point(1, 135.72, 35.03).with_visit_minutes(90),
            unresolved_point(2),
        ];
        let prompt = user_prompt(&points, "Kyoto");
        assert!(prompt.starts_with("Plan a visit to Kyoto"));
        assert!(prompt.contains("- Spot 1 (35.03000, 135.72000), about 90 minutes"));
        assert!(prompt.contains("- Spot 2 (address unknown)"));
    }

    #[rstest]
    fn first_non_empty_choice_wins() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"content":"Day 1\n09:00-10:00 Castle"}}]}"#,
        )
        .expect("decode");
        assert_eq!(
            first_content(response).as_deref(),
            Ok("Day 1\n09:00-10:00 Castle")
        );
    }

    #[rstest]
    #[case(r#"{"choices":[]}"#)]
    #[case(r#"{"choices":[{"message":{"content":"   "}}]}"#)]
    #[case(r#"{"choices":[{"message":{"content":null}}]}"#)]
    #[case("{}")]
    fn blank_replies_are_empty_responses(#[case] body: &str) {
        let response: ChatResponse = serde_json::from_str(body).expect("decode");
        assert_eq!(
            first_content(response),
            Err(RecommendationError::EmptyResponse)
        );
    }

    #[rstest]
    fn api_key_is_redacted_in_debug_output() {
        let config = ChatNarrativeConfig::new("http://llm.test").with_api_key("sk-secret");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
