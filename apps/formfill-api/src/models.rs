//! Wire types for the FormFill API

use formfill_engine::{FallbackReason, FieldPrompt};
use serde::{Deserialize, Serialize};
use shared_types::{FormField, FormSection, Language};

/// Request body for POST /api/upload
#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    pub file_name: String,
    /// Base64-encoded document bytes
    pub data_base64: String,
    /// Language the user wants to interact in; defaults to English
    #[serde(default)]
    pub interaction_language: Option<String>,
}

/// Response body for POST /api/upload, mirroring the inferred FormModel
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub session_id: String,
    pub form_title: String,
    pub fields: Vec<FormField>,
    pub sections: Vec<FormSection>,
    pub language: Language,
    pub total_fields: usize,
    /// True when extraction degraded to the canonical fallback model
    pub used_fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<FallbackReason>,
}

/// Request body for POST /api/chat
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub session_id: String,
    /// Answer text for the field being asked; empty to just fetch the prompt
    #[serde(default)]
    pub message: String,
    /// Field the answer targets; defaults to the field currently asked
    #[serde(default)]
    pub field_id: Option<String>,
    /// Jump to this field before handling the message
    #[serde(default)]
    pub navigate_to: Option<String>,
}

/// Response body for POST /api/chat
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    /// Assistant text shown to the user
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_field: Option<FieldPrompt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
    pub complete: bool,
}

/// Request body for POST /api/translate
#[derive(Debug, Deserialize)]
pub struct TranslateRequest {
    pub text: String,
    #[serde(default = "default_source_language")]
    pub source_language: String,
    #[serde(default = "default_target_language")]
    pub target_language: String,
}

fn default_source_language() -> String {
    "auto".to_string()
}

fn default_target_language() -> String {
    "en".to_string()
}

/// Response body for POST /api/translate
#[derive(Debug, Serialize)]
pub struct TranslateResponse {
    pub translated_text: String,
    pub source_language: String,
    pub target_language: String,
}

/// Request body for POST /api/generate
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub session_id: String,
    #[serde(default)]
    pub template_id: Option<String>,
}

/// Response body for POST /api/generate
#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub success: bool,
    pub download_url: String,
    pub file_size: usize,
}

/// Response body for GET /api/health
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub active_sessions: usize,
}
