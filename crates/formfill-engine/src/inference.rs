//! Structure inference
//!
//! Turns raw extracted text and table rows into a validated [`FormModel`]
//! via an external model-inference call. Every failure path (client error,
//! timeout, unparsable output) resolves to the canonical fallback model
//! with a recorded reason; this component never raises to its caller, so
//! the upload flow cannot hard-fail on a bad extraction.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use shared_types::{FieldType, FormField, FormModel, FormSection, Language};
use tracing::warn;

use crate::adapters::InferenceClient;
use crate::normalizer::{slugify, NormalizerBatch};

/// Default bound on the inference call
pub const INFERENCE_TIMEOUT: Duration = Duration::from_secs(30);

/// How much raw text is embedded in the prompt
const MAX_PROMPT_TEXT: usize = 8_000;

/// Why inference fell back to the canonical model.
///
/// Observability only; the returned model is the same constant regardless
/// of which reason fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// Uploaded document produced no usable text
    EmptyDocument,
    /// The inference collaborator returned an error
    ClientError,
    /// The inference call exceeded its timeout
    Timeout,
    /// Output could not be parsed into the expected shape
    MalformedOutput,
}

/// Inference result: a model that is always usable, plus the fallback
/// reason when the model is the canonical constant rather than inferred.
#[derive(Debug, Clone)]
pub struct Inference {
    pub model: FormModel,
    pub fallback: Option<FallbackReason>,
}

/// Canonical fallback model used whenever inference is unavailable or its
/// output is untrustworthy. A fixed constant, byte-identical across calls.
pub fn fallback_model() -> FormModel {
    let text_field = |id: &str, label: &str, section: &str| FormField {
        id: id.to_string(),
        label: label.to_string(),
        field_type: FieldType::Text,
        required: true,
        options: Vec::new(),
        section: Some(section.to_string()),
    };

    FormModel {
        title: "Government Application Form".to_string(),
        language: Language::Mixed,
        fields: vec![
            text_field("name", "Full Name", "personal_information"),
            text_field(
                "father_name",
                "Father's/Guardian's Name",
                "personal_information",
            ),
            text_field("address", "Address", "personal_information"),
            text_field("phone", "Phone Number", "application_details"),
            text_field("purpose", "Purpose of Application", "application_details"),
        ],
        sections: vec![
            FormSection {
                id: "personal_information".to_string(),
                title: "Personal Information".to_string(),
                field_ids: vec![
                    "name".to_string(),
                    "father_name".to_string(),
                    "address".to_string(),
                ],
            },
            FormSection {
                id: "application_details".to_string(),
                title: "Application Details".to_string(),
                field_ids: vec!["phone".to_string(), "purpose".to_string()],
            },
        ],
    }
}

/// Loose shapes accepted from the model before validation

#[derive(Debug, Deserialize)]
struct InferredForm {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    fields: Vec<InferredField>,
    #[serde(default)]
    sections: Vec<InferredSection>,
}

#[derive(Debug, Deserialize)]
struct InferredField {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    label: String,
    #[serde(default, rename = "type")]
    field_type: Option<String>,
    #[serde(default)]
    required: Option<bool>,
    #[serde(default)]
    options: Vec<String>,
    #[serde(default)]
    section: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InferredSection {
    #[serde(default)]
    title: String,
    #[serde(default)]
    field_ids: Vec<String>,
}

/// Structure inferencer over an injected inference client
pub struct StructureInferencer {
    client: Arc<dyn InferenceClient>,
    timeout: Duration,
}

impl StructureInferencer {
    pub fn new(client: Arc<dyn InferenceClient>) -> Self {
        Self {
            client,
            timeout: INFERENCE_TIMEOUT,
        }
    }

    pub fn with_timeout(client: Arc<dyn InferenceClient>, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Infer a FormModel from raw extracted text and table rows.
    ///
    /// Never fails: degraded paths return the canonical fallback model with
    /// the reason recorded on the result.
    pub async fn infer(&self, raw_text: &str, tables: &[Vec<String>]) -> Inference {
        if raw_text.trim().is_empty() && tables.is_empty() {
            return Inference {
                model: fallback_model(),
                fallback: Some(FallbackReason::EmptyDocument),
            };
        }

        let prompt = build_prompt(raw_text, tables);

        let output = match tokio::time::timeout(self.timeout, self.client.complete(&prompt)).await
        {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                warn!("Inference call failed, using fallback model: {}", e);
                return Inference {
                    model: fallback_model(),
                    fallback: Some(FallbackReason::ClientError),
                };
            }
            Err(_elapsed) => {
                warn!(
                    "Inference call timed out after {:?}, using fallback model",
                    self.timeout
                );
                return Inference {
                    model: fallback_model(),
                    fallback: Some(FallbackReason::Timeout),
                };
            }
        };

        match parse_inferred(&output).map(validate) {
            Some(model) if !model.fields.is_empty() => Inference {
                model,
                fallback: None,
            },
            _ => {
                warn!("Inference output unparsable or empty, using fallback model");
                Inference {
                    model: fallback_model(),
                    fallback: Some(FallbackReason::MalformedOutput),
                }
            }
        }
    }
}

/// Build the inference prompt with the explicit output-shape contract
fn build_prompt(raw_text: &str, tables: &[Vec<String>]) -> String {
    let excerpt: String = raw_text.chars().take(MAX_PROMPT_TEXT).collect();

    let mut prompt = String::from(
        "You are given the raw text of a government form. Identify its \
         fillable fields and sections.\n\
         Respond with a single JSON object and nothing else, shaped as:\n\
         {\"title\": string, \"language\": iso-639-1 code or \"mixed\",\n \
         \"fields\": [{\"label\": string, \"type\": \"text\"|\"choice\"|\"checkbox\"|\"date\",\n  \
         \"required\": bool, \"options\": [string], \"section\": string|null}],\n \
         \"sections\": [{\"id\": string, \"title\": string, \"field_ids\": [string]}]}\n\n\
         Form text:\n",
    );
    prompt.push_str(&excerpt);

    if !tables.is_empty() {
        prompt.push_str("\n\nDetected table rows:\n");
        for row in tables {
            prompt.push_str(&row.join(" | "));
            prompt.push('\n');
        }
    }

    prompt
}

/// Extract the first JSON object from raw model output, tolerating code
/// fences and surrounding prose
fn parse_inferred(output: &str) -> Option<InferredForm> {
    let start = output.find('{')?;
    let end = output.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&output[start..=end]).ok()
}

/// Validate an inferred structure into a well-formed FormModel.
///
/// Every field passes through the normalizer so ids are unique and
/// slug-shaped even when the model supplied its own; empty-label fields are
/// dropped; dangling section references are removed, not fatal.
fn validate(inferred: InferredForm) -> FormModel {
    let mut batch = NormalizerBatch::new();
    // Maps ids the model used (supplied id or label slug) to final ids
    let mut id_map: HashMap<String, String> = HashMap::new();
    let mut fields = Vec::new();

    for raw in inferred.fields {
        let Some(mut field) = batch.normalize(&raw.label, raw.field_type.as_deref()) else {
            continue;
        };
        if let Some(required) = raw.required {
            field.required = required;
        }
        field.options = raw
            .options
            .into_iter()
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();
        if field.field_type != FieldType::Choice {
            field.options.clear();
        }
        field.section = raw.section.map(|s| slugify(&s));

        if let Some(supplied) = raw.id {
            id_map.insert(supplied, field.id.clone());
        }
        id_map.insert(slugify(&raw.label), field.id.clone());
        fields.push(field);
    }

    let mut sections = Vec::new();
    for raw in inferred.sections {
        if raw.title.trim().is_empty() {
            continue;
        }
        // Section ids are re-derived from titles; model-supplied ids only
        // matter for resolving field references
        let id = batch.unique_id(&slugify(&raw.title));
        let field_ids: Vec<String> = raw
            .field_ids
            .iter()
            .filter_map(|fid| id_map.get(fid).cloned())
            .filter(|fid| fields.iter().any(|f| &f.id == fid))
            .collect();
        sections.push(FormSection {
            id,
            title: raw.title.trim().to_string(),
            field_ids,
        });
    }

    // A field belongs to at most one section
    let mut claimed: HashMap<String, String> = HashMap::new();
    for section in &mut sections {
        section
            .field_ids
            .retain(|fid| claimed.insert(fid.clone(), section.id.clone()).is_none());
    }

    // Field-side section hints fill in memberships the section list missed
    for field in &fields {
        if claimed.contains_key(&field.id) {
            continue;
        }
        if let Some(hint) = &field.section {
            if let Some(section) = sections.iter_mut().find(|s| &s.id == hint) {
                section.field_ids.push(field.id.clone());
                claimed.insert(field.id.clone(), section.id.clone());
            }
        }
    }

    // Section pointers must agree with the repaired membership lists
    for field in &mut fields {
        field.section = claimed.get(&field.id).cloned();
    }

    let language = inferred
        .language
        .as_deref()
        .map(Language::parse_or_mixed)
        .unwrap_or(Language::Mixed);

    FormModel {
        title: inferred
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "Untitled Form".to_string()),
        language,
        fields,
        sections,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    struct CannedClient(String);

    #[async_trait]
    impl InferenceClient for CannedClient {
        async fn complete(&self, _prompt: &str) -> anyhow::Result<String> {
            Ok(self.0.clone())
        }
    }

    struct FailingClient;

    #[async_trait]
    impl InferenceClient for FailingClient {
        async fn complete(&self, _prompt: &str) -> anyhow::Result<String> {
            Err(anyhow!("connection refused"))
        }
    }

    struct SlowClient;

    #[async_trait]
    impl InferenceClient for SlowClient {
        async fn complete(&self, _prompt: &str) -> anyhow::Result<String> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok("{}".to_string())
        }
    }

    #[test]
    fn test_fallback_model_is_deterministic() {
        let a = serde_json::to_vec(&fallback_model()).unwrap();
        let b = serde_json::to_vec(&fallback_model()).unwrap();
        assert_eq!(a, b);
        let model = fallback_model();
        assert_eq!(model.fields.len(), 5);
        assert_eq!(model.sections.len(), 2);
        assert!(model.fields.iter().all(|f| f.required));
        assert_eq!(model.language, Language::Mixed);
        assert_eq!(model.title, "Government Application Form");
    }

    #[tokio::test]
    async fn test_client_error_falls_back() {
        let inferencer = StructureInferencer::new(Arc::new(FailingClient));
        let result = inferencer.infer("Name: ____", &[]).await;
        assert_eq!(result.fallback, Some(FallbackReason::ClientError));
        assert_eq!(result.model, fallback_model());
    }

    #[tokio::test]
    async fn test_timeout_falls_back() {
        let inferencer =
            StructureInferencer::with_timeout(Arc::new(SlowClient), Duration::from_millis(20));
        let result = inferencer.infer("Name: ____", &[]).await;
        assert_eq!(result.fallback, Some(FallbackReason::Timeout));
        assert_eq!(result.model, fallback_model());
    }

    #[tokio::test]
    async fn test_empty_document_short_circuits() {
        // Client would fail, but empty input never reaches it
        let inferencer = StructureInferencer::new(Arc::new(FailingClient));
        let result = inferencer.infer("   \n ", &[]).await;
        assert_eq!(result.fallback, Some(FallbackReason::EmptyDocument));
    }

    #[tokio::test]
    async fn test_garbage_output_falls_back() {
        let inferencer =
            StructureInferencer::new(Arc::new(CannedClient("not json at all".to_string())));
        let result = inferencer.infer("Name: ____", &[]).await;
        assert_eq!(result.fallback, Some(FallbackReason::MalformedOutput));
    }

    #[tokio::test]
    async fn test_valid_output_is_normalized() {
        let output = r#"Here is the structure:
        {"title": "Ration Card Application", "language": "hi",
         "fields": [
            {"id": "f1", "label": "Full Name:", "type": "text"},
            {"label": "Full Name", "type": "text"},
            {"label": "", "type": "text"},
            {"label": "Date of Birth"},
            {"label": "Category", "type": "choice", "options": ["APL", "BPL", " "]}
         ],
         "sections": [
            {"id": "s1", "title": "Applicant", "field_ids": ["f1", "nonexistent"]}
         ]}"#;
        let inferencer = StructureInferencer::new(Arc::new(CannedClient(output.to_string())));
        let result = inferencer.infer("some form text", &[]).await;

        assert!(result.fallback.is_none());
        let model = result.model;
        assert_eq!(model.title, "Ration Card Application");
        assert_eq!(model.language, Language::Hi);
        // Empty label dropped, duplicate suffixed
        assert_eq!(model.fields.len(), 4);
        assert_eq!(model.fields[0].id, "full_name");
        assert_eq!(model.fields[1].id, "full_name_2");
        assert_eq!(model.fields[2].field_type, FieldType::Date);
        assert_eq!(model.fields[3].options, vec!["APL", "BPL"]);
        // Dangling reference repaired, section kept
        assert_eq!(model.sections.len(), 1);
        assert_eq!(model.sections[0].field_ids, vec!["full_name"]);
        assert_eq!(model.fields[0].section.as_deref(), Some("applicant"));
        assert_eq!(model.fields[1].section, None);
    }

    #[tokio::test]
    async fn test_output_with_no_fields_falls_back() {
        let output = r#"{"title": "Empty", "fields": [], "sections": []}"#;
        let inferencer = StructureInferencer::new(Arc::new(CannedClient(output.to_string())));
        let result = inferencer.infer("text", &[]).await;
        assert_eq!(result.fallback, Some(FallbackReason::MalformedOutput));
    }

    #[test]
    fn test_prompt_embeds_tables() {
        let tables = vec![vec!["Name".to_string(), "____".to_string()]];
        let prompt = build_prompt("header text", &tables);
        assert!(prompt.contains("header text"));
        assert!(prompt.contains("Name | ____"));
        assert!(prompt.contains("\"fields\""));
    }

    #[test]
    fn test_field_section_hint_joins_section() {
        let inferred = InferredForm {
            title: Some("T".to_string()),
            language: None,
            fields: vec![InferredField {
                id: None,
                label: "Alpha".to_string(),
                field_type: None,
                required: None,
                options: vec![],
                section: Some("Details".to_string()),
            }],
            sections: vec![InferredSection {
                title: "Details".to_string(),
                field_ids: vec![],
            }],
        };
        let model = validate(inferred);
        assert_eq!(model.sections[0].field_ids, vec!["alpha"]);
        assert_eq!(model.fields[0].section.as_deref(), Some("details"));
    }

    #[test]
    fn test_field_claimed_by_one_section_only() {
        let inferred = InferredForm {
            title: Some("T".to_string()),
            language: None,
            fields: vec![InferredField {
                id: Some("a".to_string()),
                label: "Alpha".to_string(),
                field_type: None,
                required: None,
                options: vec![],
                section: None,
            }],
            sections: vec![
                InferredSection {
                    title: "One".to_string(),
                    field_ids: vec!["a".to_string()],
                },
                InferredSection {
                    title: "Two".to_string(),
                    field_ids: vec!["a".to_string()],
                },
            ],
        };
        let model = validate(inferred);
        assert_eq!(model.sections[0].field_ids, vec!["alpha"]);
        assert!(model.sections[1].field_ids.is_empty());
        assert_eq!(model.fields[0].section.as_deref(), Some("one"));
    }
}
