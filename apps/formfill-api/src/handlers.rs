//! HTTP handlers for the FormFill API
//!
//! Maps the wire contract onto the engine: upload builds a FormModel and a
//! session, chat drives the fill state machine, translate/generate hand off
//! to the collaborator adapters.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use formfill_engine::{Prompt, SessionEngine, SessionState};
use shared_types::Language;

use crate::error::ApiError;
use crate::extract;
use crate::models::*;
use crate::state::AppState;

/// Handler: GET /api/health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "formfill-api",
        version: env!("CARGO_PKG_VERSION"),
        active_sessions: state.session_count().await,
    })
}

/// Handler: POST /api/upload
///
/// Extraction and inference never 500 here: every degraded path resolves to
/// the canonical fallback model and a usable session.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UploadRequest>,
) -> Result<Json<UploadResponse>, ApiError> {
    let data = BASE64
        .decode(&req.data_base64)
        .map_err(|e| ApiError::InvalidRequest(format!("Invalid base64 payload: {}", e)))?;

    extract::validate_upload(&req.file_name, data.len())
        .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;

    let interaction_language = match req.interaction_language.as_deref() {
        Some(code) => {
            Language::parse(code).map_err(|e| ApiError::InvalidRequest(e.to_string()))?
        }
        None => Language::En,
    };

    let text = extract::extract_text(&req.file_name, &data);
    let inference = state.inferencer.infer(&text, &[]).await;
    let fallback_reason = inference.fallback;

    let model = Arc::new(inference.model);
    let engine = SessionEngine::new(
        Arc::clone(&model),
        interaction_language,
        Arc::clone(&state.translator),
    );
    let session_id = state.insert_session(engine).await;

    tracing::info!(
        "Uploaded {}: {} fields, language {}, fallback {:?}, session {}",
        req.file_name,
        model.total_fields(),
        model.language,
        fallback_reason,
        session_id
    );

    Ok(Json(UploadResponse {
        success: true,
        session_id: session_id.to_string(),
        form_title: model.title.clone(),
        fields: model.fields.clone(),
        sections: model.sections.clone(),
        language: model.language,
        total_fields: model.total_fields(),
        used_fallback: fallback_reason.is_some(),
        fallback_reason,
    }))
}

/// Handler: POST /api/chat
///
/// Empty message fetches the current prompt; a non-empty message is an
/// answer for the field being asked (or `field_id`, surfacing a
/// FIELD_MISMATCH when it targets the wrong field); `navigate_to` jumps
/// before the message is handled.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let id = parse_session_id(&req.session_id)?;
    let entry = state
        .session(&id)
        .await
        .ok_or_else(|| ApiError::SessionNotFound(req.session_id.clone()))?;
    let mut entry = entry.lock().await;
    let session = &mut entry.engine;

    if let Some(target) = &req.navigate_to {
        session.navigate(target)?;
    }

    let mut ack = None;
    let message = req.message.trim();
    if !message.is_empty() {
        let target = match (&req.field_id, session.state()) {
            (Some(field_id), _) => Some(field_id.clone()),
            (None, SessionState::AwaitingField(current)) => Some(current),
            // Free-form chatter on a completed session; nothing to submit
            (None, _) => None,
        };
        if let Some(field_id) = target {
            let outcome = session.submit_answer(&field_id, message).await?;
            let label = session
                .model()
                .field(&outcome.field_id)
                .map(|f| f.label.clone())
                .unwrap_or(outcome.field_id);
            ack = Some(format!("Recorded {}.", label));
        }
    }

    let response = match session.next_prompt().await? {
        Prompt::Completed(text) => ChatResponse {
            response: prepend_ack(ack, text),
            next_field: None,
            suggestions: None,
            complete: true,
        },
        Prompt::Field(prompt) => {
            let suggestions: Vec<String> = session.suggestions()?.collect();
            ChatResponse {
                response: prepend_ack(ack, prompt.text.clone()),
                next_field: Some(prompt),
                suggestions: Some(suggestions),
                complete: false,
            }
        }
    };

    Ok(Json(response))
}

fn prepend_ack(ack: Option<String>, text: String) -> String {
    match ack {
        Some(ack) => format!("{} {}", ack, text),
        None => text,
    }
}

/// Handler: POST /api/translate
pub async fn translate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TranslateRequest>,
) -> Result<Json<TranslateResponse>, ApiError> {
    let source = parse_wire_language(&req.source_language)?;
    let target = parse_wire_language(&req.target_language)?;

    let translated_text = state
        .translator
        .translate(&req.text, source, target)
        .await
        .map_err(|e| ApiError::CollaboratorUnavailable(e.to_string()))?;

    Ok(Json(TranslateResponse {
        translated_text,
        source_language: req.source_language,
        target_language: req.target_language,
    }))
}

/// Handler: POST /api/generate
pub async fn generate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let id = parse_session_id(&req.session_id)?;
    let entry = state
        .session(&id)
        .await
        .ok_or_else(|| ApiError::SessionNotFound(req.session_id.clone()))?;
    let mut entry = entry.lock().await;

    // Gate on completion; maps to NOT_COMPLETE / SESSION_CLOSED
    entry.engine.summary()?;

    if let Some(template_id) = &req.template_id {
        tracing::debug!("Generate with template {}", template_id);
    }

    let artifact = state
        .renderer
        .render(entry.engine.model(), &entry.engine.fill_state().values)
        .await
        .map_err(|e| ApiError::CollaboratorUnavailable(e.to_string()))?;

    let file_size = artifact.data.len();
    entry.artifact = Some(artifact);

    tracing::info!("Generated document for session {} ({} bytes)", id, file_size);

    Ok(Json(GenerateResponse {
        success: true,
        download_url: format!("/api/download/{}", id),
        file_size,
    }))
}

/// Handler: GET /api/download/:id
pub async fn download(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<(StatusCode, [(String, String); 2], Vec<u8>), ApiError> {
    let session_id = parse_session_id(&id)?;
    let entry = state
        .session(&session_id)
        .await
        .ok_or_else(|| ApiError::SessionNotFound(id.clone()))?;
    let response = {
        let entry = entry.lock().await;
        let artifact = entry.artifact.as_ref().ok_or_else(|| {
            ApiError::InvalidRequest("No document generated for this session".into())
        })?;
        (
            StatusCode::OK,
            [
                ("Content-Type".to_string(), artifact.mime_type.clone()),
                (
                    "Content-Disposition".to_string(),
                    format!("attachment; filename=\"{}\"", artifact.file_name),
                ),
            ],
            artifact.data.clone(),
        )
    };

    // Download ends the session lifecycle; the fill state is discarded
    state.remove_session(&session_id).await;
    tracing::info!("Session {} downloaded and evicted", session_id);

    Ok(response)
}

/// Handler: DELETE /api/session/:id — external cancellation
pub async fn cancel_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let session_id = parse_session_id(&id)?;
    let entry = state
        .remove_session(&session_id)
        .await
        .ok_or_else(|| ApiError::SessionNotFound(id.clone()))?;
    entry.lock().await.engine.cancel();

    tracing::info!("Session {} cancelled and evicted", session_id);
    Ok(Json(json!({ "success": true })))
}

fn parse_session_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw)
        .map_err(|_| ApiError::InvalidRequest(format!("Invalid session id: {}", raw)))
}

/// "auto" is accepted wherever the remote translator can detect the source
fn parse_wire_language(code: &str) -> Result<Language, ApiError> {
    if code.eq_ignore_ascii_case("auto") {
        return Ok(Language::Mixed);
    }
    Language::parse(code).map_err(|e| ApiError::InvalidRequest(e.to_string()))
}
