//! Collaborator adapter implementations
//!
//! HTTP-backed inference and translation clients plus the local plain-text
//! renderer. Every remote call carries an explicit timeout; degradation
//! policy lives in the engine, these clients just surface errors.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use formfill_engine::{DocumentRenderer, InferenceClient, RenderedDocument, Translator};
use serde::Deserialize;
use serde_json::json;
use shared_types::{FormModel, Language};

/// Bound on a single translation call
const TRANSLATE_TIMEOUT: Duration = Duration::from_secs(10);

/// Bound on a single inference call; the engine applies its own 30s bound
/// on top, this keeps a dead TCP connection from eating the whole budget
const INFERENCE_HTTP_TIMEOUT: Duration = Duration::from_secs(28);

/// Inference collaborator speaking a plain prompt/output JSON contract
pub struct HttpInferenceClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpInferenceClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[derive(Deserialize)]
struct InferenceReply {
    output: String,
}

#[async_trait]
impl InferenceClient for HttpInferenceClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let reply: InferenceReply = self
            .client
            .post(&self.endpoint)
            .timeout(INFERENCE_HTTP_TIMEOUT)
            .json(&json!({ "prompt": prompt }))
            .send()
            .await
            .context("inference request failed")?
            .error_for_status()
            .context("inference service returned an error status")?
            .json()
            .await
            .context("inference reply was not the expected JSON shape")?;
        Ok(reply.output)
    }
}

/// Translation collaborator
pub struct HttpTranslator {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTranslator {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[derive(Deserialize)]
struct TranslateReply {
    translated_text: String,
}

/// The remote service auto-detects when the source is ambiguous
fn wire_code(lang: Language) -> &'static str {
    match lang {
        Language::Mixed => "auto",
        other => other.code(),
    }
}

#[async_trait]
impl Translator for HttpTranslator {
    async fn translate(&self, text: &str, source: Language, target: Language) -> Result<String> {
        let reply: TranslateReply = self
            .client
            .post(&self.endpoint)
            .timeout(TRANSLATE_TIMEOUT)
            .json(&json!({
                "text": text,
                "source_language": wire_code(source),
                "target_language": wire_code(target),
            }))
            .send()
            .await
            .context("translation request failed")?
            .error_for_status()
            .context("translation service returned an error status")?
            .json()
            .await
            .context("translation reply was not the expected JSON shape")?;
        Ok(reply.translated_text)
    }
}

/// Local renderer producing a deterministic plain-text document
pub struct TextRenderer;

#[async_trait]
impl DocumentRenderer for TextRenderer {
    async fn render(
        &self,
        model: &FormModel,
        values: &HashMap<String, String>,
    ) -> Result<RenderedDocument> {
        let mut out = String::new();
        out.push_str(&model.title);
        out.push('\n');
        out.push_str(&"=".repeat(model.title.chars().count()));
        out.push_str("\n\n");

        for section in &model.sections {
            out.push_str(&section.title);
            out.push('\n');
            for field_id in &section.field_ids {
                if let Some(field) = model.field(field_id) {
                    let value = values.get(field_id).map(String::as_str).unwrap_or("-");
                    out.push_str(&format!("  {}: {}\n", field.label, value));
                }
            }
            out.push('\n');
        }

        // Fields outside any section
        for field in model.fields.iter().filter(|f| f.section.is_none()) {
            let value = values.get(&field.id).map(String::as_str).unwrap_or("-");
            out.push_str(&format!("{}: {}\n", field.label, value));
        }

        Ok(RenderedDocument {
            file_name: format!(
                "{}.txt",
                formfill_engine::normalizer::slugify(&model.title)
            ),
            data: out.into_bytes(),
            mime_type: "text/plain; charset=utf-8".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formfill_engine::inference::fallback_model;

    #[tokio::test]
    async fn test_text_renderer_is_deterministic() {
        let model = fallback_model();
        let values: HashMap<String, String> = [
            ("name", "Jane Doe"),
            ("father_name", "John Doe"),
            ("address", "123 Main St"),
            ("phone", "5551234"),
            ("purpose", "RTI request"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let a = TextRenderer.render(&model, &values).await.unwrap();
        let b = TextRenderer.render(&model, &values).await.unwrap();
        assert_eq!(a.data, b.data);
        assert_eq!(a.file_name, "government_application_form.txt");

        let text = String::from_utf8(a.data).unwrap();
        assert!(text.contains("Government Application Form"));
        assert!(text.contains("Personal Information"));
        assert!(text.contains("Full Name: Jane Doe"));
    }

    #[test]
    fn test_wire_code_maps_mixed_to_auto() {
        assert_eq!(wire_code(Language::Mixed), "auto");
        assert_eq!(wire_code(Language::Hi), "hi");
    }
}
