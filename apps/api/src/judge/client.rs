//! HTTP judge: sends listing batches to a text-generation provider and parses
//! the verdicts back into score/classification results.
//!
//! Two envelopes are supported (see [`ProviderKind`]): OpenAI-style chat
//! completions for local servers and Gemini `generateContent` for the cloud.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::judge::prompts::{build_hiring_prompt, build_score_prompt, JUDGE_SYSTEM};
use crate::judge::provider::{ProviderKind, ResolvedProvider};
use crate::judge::{Judge, JudgeError};
use crate::models::{Criteria, Listing, ScoreResult};
use crate::scoring::PASS_THRESHOLD;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const MAX_ATTEMPTS: u32 = 2;
const RETRY_BACKOFF: Duration = Duration::from_millis(250);
const TEMPERATURE: f32 = 0.2;

// ── local chat completions ──────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    stream: bool,
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
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

// ── cloud generateContent ───────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// `{"error": {"message": ...}}`, shared by both providers.
#[derive(Debug, Deserialize)]
struct ProviderError {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
}

// ── verdicts ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ScoreVerdict {
    index: Option<usize>,
    score: f64,
    #[serde(default)]
    reasons: Vec<String>,
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HiringVerdict {
    index: Option<usize>,
    is_hiring_post: bool,
}

/// Judge backed by a remote text-generation endpoint.
#[derive(Clone)]
pub struct HttpJudge {
    client: Client,
    provider: ResolvedProvider,
}

impl HttpJudge {
    pub fn new(client: Client, provider: ResolvedProvider) -> Self {
        Self { client, provider }
    }

    /// Builds the shared outbound HTTP client.
    pub fn build_client() -> Result<Client, JudgeError> {
        Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(JudgeError::Http)
    }

    pub fn provider(&self) -> &ResolvedProvider {
        &self.provider
    }

    fn request(&self, prompt: &str) -> RequestBuilder {
        match self.provider.kind {
            ProviderKind::LocalChat => {
                let body = ChatRequest {
                    model: &self.provider.model,
                    messages: vec![
                        ChatMessage {
                            role: "system",
                            content: JUDGE_SYSTEM,
                        },
                        ChatMessage {
                            role: "user",
                            content: prompt,
                        },
                    ],
                    temperature: TEMPERATURE,
                    stream: false,
                };
                let mut request = self.client.post(chat_url(&self.provider.base_url)).json(&body);
                if let Some(key) = &self.provider.api_key {
                    request = request.bearer_auth(key);
                }
                request
            }
            ProviderKind::CloudGenerative => {
                let url = format!(
                    "{}/models/{}:generateContent",
                    self.provider.base_url, self.provider.model
                );
                let body = json!({
                    "systemInstruction": { "parts": [{ "text": JUDGE_SYSTEM }] },
                    "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
                    "generationConfig": { "temperature": TEMPERATURE },
                });
                self.client
                    .post(url)
                    .query(&[("key", self.provider.api_key.as_deref().unwrap_or_default())])
                    .json(&body)
            }
        }
    }

    /// Sends one prompt and returns the generated text.
    /// Retries once on 429 and 5xx responses.
    async fn complete(&self, prompt: &str) -> Result<String, JudgeError> {
        let mut last_error: Option<JudgeError> = None;

        for attempt in 0..MAX_ATTEMPTS {
            if attempt > 0 {
                warn!(
                    "Judge call to {} failed, retrying after {}ms...",
                    self.provider.name,
                    RETRY_BACKOFF.as_millis()
                );
                tokio::time::sleep(RETRY_BACKOFF).await;
            }

            let response = match self.request(prompt).send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(JudgeError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Judge provider {} returned {}: {}", self.provider.name, status, body);
                last_error = Some(JudgeError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ProviderError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(JudgeError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let body = response.text().await.map_err(JudgeError::Http)?;
            let text = match self.provider.kind {
                ProviderKind::LocalChat => serde_json::from_str::<ChatResponse>(&body)?
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|c| c.message.content),
                ProviderKind::CloudGenerative => serde_json::from_str::<GenerateResponse>(&body)?
                    .candidates
                    .into_iter()
                    .next()
                    .and_then(|c| c.content)
                    .and_then(|c| c.parts.into_iter().find_map(|p| p.text)),
            };

            debug!("Judge call to {} succeeded", self.provider.name);
            return text.filter(|t| !t.trim().is_empty()).ok_or(JudgeError::EmptyContent);
        }

        Err(last_error.unwrap_or(JudgeError::RetriesExhausted {
            attempts: MAX_ATTEMPTS,
        }))
    }
}

#[async_trait]
impl Judge for HttpJudge {
    fn name(&self) -> &str {
        &self.provider.name
    }

    async fn score_chunk(
        &self,
        listings: &[Listing],
        criteria: &Criteria,
    ) -> Result<Vec<Option<ScoreResult>>, JudgeError> {
        let text = self.complete(&build_score_prompt(listings, criteria)).await?;
        let verdicts = parse_verdicts::<ScoreVerdict>(&text, listings.len(), |v| v.index)?;
        Ok(verdicts
            .into_iter()
            .map(|v| v.and_then(|v| normalize_score(v, &self.provider.name)))
            .collect())
    }

    async fn classify_chunk(&self, listings: &[Listing]) -> Result<Vec<Option<bool>>, JudgeError> {
        let text = self.complete(&build_hiring_prompt(listings)).await?;
        let verdicts = parse_verdicts::<HiringVerdict>(&text, listings.len(), |v| v.index)?;
        Ok(verdicts
            .into_iter()
            .map(|v| v.map(|v| v.is_hiring_post))
            .collect())
    }
}

fn chat_url(base_url: &str) -> String {
    if base_url.ends_with("/v1") {
        format!("{base_url}/chat/completions")
    } else {
        format!("{base_url}/v1/chat/completions")
    }
}

/// Clamps and rounds a provider score; `passes` always follows the local threshold.
fn normalize_score(verdict: ScoreVerdict, provider: &str) -> Option<ScoreResult> {
    if !verdict.score.is_finite() {
        return None;
    }
    let score = verdict.score.clamp(0.0, 100.0).round() as u8;

    let mut reasons = verdict.reasons;
    if reasons.is_empty() {
        reasons.extend(verdict.reason.filter(|r| !r.trim().is_empty()));
    }
    if reasons.is_empty() {
        reasons.push(format!("Scored by {provider}"));
    }

    Some(ScoreResult {
        score,
        reasons,
        passes: score >= PASS_THRESHOLD,
    })
}

/// Parses the model's JSON array into one slot per listing.
///
/// Items are placed by their `index` (falling back to array position); items that
/// fail to deserialize, or point outside the chunk, leave their slot empty.
fn parse_verdicts<T: DeserializeOwned>(
    text: &str,
    expected: usize,
    index_of: impl Fn(&T) -> Option<usize>,
) -> Result<Vec<Option<T>>, JudgeError> {
    let array = extract_json_array(text).ok_or_else(|| {
        JudgeError::MalformedResponse("no JSON array in provider output".to_string())
    })?;
    let items: Vec<Value> = serde_json::from_str(array)?;

    let mut slots: Vec<Option<T>> = (0..expected).map(|_| None).collect();
    for (position, item) in items.into_iter().enumerate() {
        let Ok(verdict) = serde_json::from_value::<T>(item) else {
            continue;
        };
        let index = index_of(&verdict).unwrap_or(position);
        if let Some(slot) = slots.get_mut(index) {
            if slot.is_none() {
                *slot = Some(verdict);
            }
        }
    }
    Ok(slots)
}

/// Strips code fences and surrounding prose, returning the outermost `[...]`.
fn extract_json_array(text: &str) -> Option<&str> {
    let text = strip_json_fences(text);
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    (start < end).then(|| &text[start..=end])
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let inner = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"));
    match inner {
        Some(stripped) => {
            let stripped = stripped.trim_start();
            stripped
                .strip_suffix("```")
                .map(str::trim)
                .unwrap_or(stripped)
        }
        None => text,
    }
}
