use crate::domain::model::{Modification, Vehicle};
use crate::domain::ports::NoteGenerator;
use crate::utils::error::{ModCalcError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://api.mistral.ai/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "mistral-medium-latest";

const SYSTEM_PROMPT: &str = "You are a cautious automotive tuner. \
Given car specs and a list of mods, provide conservative notes about compounding effects, heat, and tune requirements. \
Return strictly JSON with keys: {notes: string[]}. Avoid inventing power numbers.";

#[derive(Debug, Clone)]
pub struct MistralSettings {
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    r#type: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct NotesPayload {
    notes: Vec<String>,
}

/// Qualitative notes from a Mistral-compatible chat completions endpoint.
pub struct MistralNotes {
    client: Client,
    settings: MistralSettings,
}

impl MistralNotes {
    pub fn new(settings: MistralSettings) -> Result<Self> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self { client, settings })
    }

    fn user_content(vehicle: &Vehicle, mods: &[Modification]) -> String {
        let mods: Vec<serde_json::Value> = mods
            .iter()
            .map(|m| {
                serde_json::json!({
                    "name": m.label(),
                    "category": m.category,
                    "avg_hp_gain": m.avg_hp_gain,
                    "avg_tq_gain": m.avg_tq_gain,
                    "avg_weight_delta_lbs": m.avg_weight_delta_lbs,
                    "needs_tune": m.needs_tune,
                })
            })
            .collect();

        serde_json::json!({
            "car": {
                "name": vehicle.display_name(),
                "drivetrain": vehicle.drivetrain,
                "stock_hp": vehicle.stock_hp,
                "stock_tq": vehicle.stock_tq,
                "curb_weight_lbs": vehicle.curb_weight_lbs,
            },
            "mods": mods,
        })
        .to_string()
    }
}

/// 解析模型回覆；任何格式問題都視為沒有備註
pub fn parse_notes_content(content: &str) -> Result<Vec<String>> {
    if content.trim().is_empty() {
        return Err(ModCalcError::ProcessingError {
            message: "AI response had no content".to_string(),
        });
    }
    let payload: NotesPayload = serde_json::from_str(content)?;
    Ok(payload
        .notes
        .into_iter()
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .collect())
}

#[async_trait]
impl NoteGenerator for MistralNotes {
    async fn generate_notes(
        &self,
        vehicle: &Vehicle,
        mods: &[Modification],
    ) -> Result<Vec<String>> {
        let body = ChatRequest {
            model: &self.settings.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: Self::user_content(vehicle, mods),
                },
            ],
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
            response_format: ResponseFormat {
                r#type: "json_object",
            },
        };

        tracing::debug!("Requesting AI notes from {}", self.settings.endpoint);
        let response = self
            .client
            .post(&self.settings.endpoint)
            .bearer_auth(&self.settings.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ModCalcError::BackendError {
                status: status.as_u16(),
                message: "AI completion request failed".to_string(),
            });
        }

        let data: ChatResponse = response.json().await?;
        let content = data
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .map(|m| m.content)
            .unwrap_or_default();

        let notes = parse_notes_content(&content)?;
        tracing::debug!("AI returned {} notes", notes.len());
        Ok(notes)
    }
}
