//! Gateway to the hosted Gemini models. Chat requests carry the persona
//! instruction and the structured response schema; image requests carry the
//! photographic styling wrapper. Failures never escape this module: chat
//! errors degrade to a fallback chat reply, image errors degrade to `None`.

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::constants::{self, PLACEHOLDER_API_KEY};
use crate::domain::{AiResponse, Cuisine, FitnessGoal, FitnessProfile, HealthCondition, Mood};
use crate::prompt;

/// Shown when the API key was never configured, so the user can tell it
/// apart from a transient failure.
pub const NOT_CONFIGURED_MESSAGE: &str = "عفوًا، يبدو أن مفتاح API غير مهيأ. يرجى التأكد من إعداده بشكل صحيح للمتابعة. أنا هنا للمساعدة بمجرد أن يكون كل شيء جاهزًا!";

/// Shown on any transport, service, or parse failure.
pub const SERVICE_ERROR_MESSAGE: &str = "عفوًا، حدث خطأ ما. ربما الشبكة فيها مشكل أو الشواية تحرقات. حاول مرة أخرى!";

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("provider returned {status}: {body}")]
    Service {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("no candidate text in provider response")]
    EmptyCandidate,
    #[error("invalid response payload: {0}")]
    Parse(#[from] serde_json::Error),
}

pub struct GeminiClient {
    http: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn from_env() -> Self {
        Self::new(
            constants::GEMINI_API_KEY.clone(),
            constants::GEMINI_API_BASE.clone(),
        )
    }

    /// Explicit key and base URL, used by tests to target a mock server.
    pub fn new(api_key: String, base_url: String) -> Self {
        Self {
            http: Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key != PLACEHOLDER_API_KEY
    }

    /// Asks the chat model for a reply to the user's text under the current
    /// filter selections. Always returns a usable result: on any failure the
    /// reply is a fallback chat message and nothing else.
    pub async fn get_response(
        &self,
        user_text: &str,
        cuisine: Option<Cuisine>,
        mood: Option<Mood>,
        health_conditions: &[HealthCondition],
        fitness_goal: Option<FitnessGoal>,
        profile: &FitnessProfile,
    ) -> AiResponse {
        let full_prompt = prompt::compose(
            user_text,
            cuisine,
            mood,
            health_conditions,
            fitness_goal,
            profile,
        );
        match self.request_chat(&full_prompt).await {
            Ok(response) => response,
            Err(e) => {
                error!("Gemini chat request failed: {e}");
                if self.is_configured() {
                    AiResponse::chat_only(SERVICE_ERROR_MESSAGE)
                } else {
                    AiResponse::chat_only(NOT_CONFIGURED_MESSAGE)
                }
            }
        }
    }

    async fn request_chat(&self, full_prompt: &str) -> Result<AiResponse, GatewayError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url,
            *constants::CHAT_MODEL
        );
        let body = json!({
            "contents": [{ "parts": [{ "text": full_prompt }] }],
            "systemInstruction": { "parts": [{ "text": prompt::SYSTEM_INSTRUCTION }] },
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": prompt::response_schema(),
                "temperature": 0.8,
            },
        });

        debug!(%url, "Sending chat request to Gemini");
        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(GatewayError::Service { status, body: text });
        }

        let envelope: GenerateContentResponse = serde_json::from_str(&text)?;
        let candidate_text = envelope.first_text().ok_or(GatewayError::EmptyCandidate)?;
        parse_ai_response(&candidate_text)
    }

    /// Requests an illustrative image for a recipe prompt. Returns the first
    /// inline base64 payload found, or `None` when the response carries no
    /// image or the call fails. Absence is the only failure signal.
    pub async fn generate_image(&self, image_prompt: &str) -> Option<String> {
        match self.request_image(image_prompt).await {
            Ok(data) => data,
            Err(e) => {
                warn!("Gemini image request failed: {e}");
                None
            }
        }
    }

    async fn request_image(&self, image_prompt: &str) -> Result<Option<String>, GatewayError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url,
            *constants::IMAGE_MODEL
        );
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt::image_instruction(image_prompt) }] }],
            "generationConfig": { "responseModalities": ["IMAGE"] },
        });

        debug!(%url, "Sending image request to Gemini");
        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(GatewayError::Service { status, body: text });
        }

        let envelope: GenerateContentResponse = serde_json::from_str(&text)?;
        Ok(envelope.first_inline_data())
    }
}

/// Resolves the image URL for a recipe card: an empty prompt short-circuits
/// to the deterministic placeholder without any network call; otherwise the
/// generated image is inlined as a data URL, falling back to the placeholder.
pub async fn recipe_image_url(
    client: &GeminiClient,
    recipe_name: &str,
    image_prompt: &str,
) -> String {
    if image_prompt.trim().is_empty() {
        return fallback_image_url(recipe_name);
    }
    match client.generate_image(image_prompt).await {
        Some(data) => format!("data:image/png;base64,{data}"),
        None => fallback_image_url(recipe_name),
    }
}

/// Deterministic placeholder image, keyed by the sum of the recipe name's
/// character codes at a fixed 800x600 resolution. The sum wraps: the name is
/// client-supplied and may be arbitrarily long.
pub fn fallback_image_url(recipe_name: &str) -> String {
    let seed = recipe_name
        .chars()
        .fold(0u32, |acc, c| acc.wrapping_add(c as u32));
    format!("https://picsum.photos/seed/{seed}/800/600")
}

fn parse_ai_response(text: &str) -> Result<AiResponse, GatewayError> {
    let trimmed = text.trim();
    match serde_json::from_str::<AiResponse>(trimmed) {
        Ok(parsed) => Ok(parsed),
        Err(e) => {
            // The model occasionally wraps the JSON object in prose despite
            // the JSON-only directive; salvage the first object if there is one.
            if let Some(object) = extract_first_json_object(trimmed) {
                if let Ok(parsed) = serde_json::from_str::<AiResponse>(&object) {
                    return Ok(parsed);
                }
            }
            Err(GatewayError::Parse(e))
        }
    }
}

/// Extracts the first top-level `{...}` substring, tracking brace depth.
fn extract_first_json_object(s: &str) -> Option<String> {
    let bytes = s.as_bytes();
    let mut start = None;
    let mut depth = 0usize;

    for (i, &b) in bytes.iter().enumerate() {
        if b == b'{' {
            if start.is_none() {
                start = Some(i);
            }
            depth += 1;
        } else if b == b'}' && depth > 0 {
            depth -= 1;
            if depth == 0 {
                if let Some(st) = start {
                    return Some(s[st..=i].to_string());
                }
            }
        }
    }
    None
}

// Minimal wire structs for the generateContent response envelope.
#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    inline_data: Option<InlineData>,
}

#[derive(Deserialize)]
struct InlineData {
    #[serde(default)]
    data: String,
}

impl GenerateContentResponse {
    fn first_text(&self) -> Option<String> {
        self.candidates
            .iter()
            .filter_map(|c| c.content.as_ref())
            .flat_map(|content| content.parts.iter())
            .find_map(|part| part.text.clone())
    }

    fn first_inline_data(&self) -> Option<String> {
        self.candidates
            .iter()
            .filter_map(|c| c.content.as_ref())
            .flat_map(|content| content.parts.iter())
            .find_map(|part| part.inline_data.as_ref().map(|d| d.data.clone()))
    }
}
