//! Fill-session state machine
//!
//! Walks a user through a [`FormModel`] one field at a time. The engine
//! exclusively owns the session's [`FillState`] and transcript; callers must
//! serialize access (one logical session per user interaction).
//!
//! Translation policy: prompts are emitted in the session's interaction
//! language; submitted values are translated back to the form's native
//! language before storage, so stored values are language-stable regardless
//! of how they were collected. Translator failures degrade to pass-through
//! and never block progress.

use std::sync::Arc;

use chrono::Utc;
use shared_types::{ChatRole, ChatTurn, FieldType, FillState, FormField, FormModel, Language};
use tracing::warn;

use crate::adapters::Translator;
use crate::error::EngineError;
use crate::suggestions;

/// Observable session state, derived from fill contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    AwaitingField(String),
    Complete,
    Abandoned,
}

/// Description of the field currently being asked
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct FieldPrompt {
    pub field_id: String,
    /// Label in the session's interaction language
    pub label: String,
    pub field_type: FieldType,
    pub required: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    /// Full prompt text shown to the user
    pub text: String,
}

/// Result of `next_prompt`
#[derive(Debug, Clone, PartialEq)]
pub enum Prompt {
    Field(FieldPrompt),
    /// Every required field is answered; carries the confirmation summary
    Completed(String),
}

/// Result of a successful `submit_answer`
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitOutcome {
    pub field_id: String,
    /// Value as stored (after back-translation and normalization)
    pub stored_value: String,
    /// Next field awaited, `None` once the session is complete
    pub next_field_id: Option<String>,
}

/// One line of the completion summary
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct SummaryEntry {
    pub field_id: String,
    pub label: String,
    pub value: String,
}

pub struct SessionEngine {
    model: Arc<FormModel>,
    fill: FillState,
    interaction_language: Language,
    translator: Arc<dyn Translator>,
    transcript: Vec<ChatTurn>,
    abandoned: bool,
}

impl SessionEngine {
    pub fn new(
        model: Arc<FormModel>,
        interaction_language: Language,
        translator: Arc<dyn Translator>,
    ) -> Self {
        let mut fill = FillState::new(slug_title(&model.title));
        // Fill starts at the first required field in presentation order
        fill.current_field_id = model
            .fields
            .iter()
            .find(|f| f.required)
            .map(|f| f.id.clone());

        Self {
            model,
            fill,
            interaction_language,
            translator,
            transcript: Vec::new(),
            abandoned: false,
        }
    }

    pub fn model(&self) -> &FormModel {
        &self.model
    }

    pub fn fill_state(&self) -> &FillState {
        &self.fill
    }

    pub fn transcript(&self) -> &[ChatTurn] {
        &self.transcript
    }

    pub fn interaction_language(&self) -> Language {
        self.interaction_language
    }

    /// Current state, recomputed from fill contents
    pub fn state(&self) -> SessionState {
        if self.abandoned {
            SessionState::Abandoned
        } else if let Some(id) = &self.fill.current_field_id {
            SessionState::AwaitingField(id.clone())
        } else {
            SessionState::Complete
        }
    }

    /// True once every required field holds a non-empty value
    pub fn is_complete(&self) -> bool {
        self.model
            .fields
            .iter()
            .filter(|f| f.required)
            .all(|f| self.has_value(&f.id))
    }

    fn has_value(&self, field_id: &str) -> bool {
        self.fill
            .values
            .get(field_id)
            .map(|v| !v.trim().is_empty())
            .unwrap_or(false)
    }

    /// Describe the field currently awaited, or the completion summary.
    ///
    /// Labels are translated into the interaction language when it differs
    /// from the form's language; translator failure degrades to the
    /// untranslated label.
    pub async fn next_prompt(&self) -> Result<Prompt, EngineError> {
        if self.abandoned {
            return Err(EngineError::SessionClosed);
        }

        let Some(field_id) = self.fill.current_field_id.clone() else {
            let lines: Vec<String> = self
                .summary()?
                .into_iter()
                .map(|e| format!("{}: {}", e.label, e.value))
                .collect();
            return Ok(Prompt::Completed(format!(
                "All required fields are filled. Please confirm:\n{}",
                lines.join("\n")
            )));
        };

        let field = self
            .model
            .field(&field_id)
            .ok_or_else(|| EngineError::UnknownField(field_id.clone()))?;

        let label = self.to_interaction_language(&field.label).await;
        let mut text = format!("Please provide: {}", label);
        if !field.required {
            text.push_str(" (optional)");
        }
        match field.field_type {
            FieldType::Choice if !field.options.is_empty() => {
                text.push_str(&format!(" [{}]", field.options.join(" / ")));
            }
            FieldType::Checkbox => text.push_str(" [yes/no]"),
            FieldType::Date => text.push_str(" (date)"),
            _ => {}
        }

        Ok(Prompt::Field(FieldPrompt {
            field_id: field.id.clone(),
            label,
            field_type: field.field_type,
            required: field.required,
            options: field.options.clone(),
            text,
        }))
    }

    /// Submit a value for the field currently being asked.
    ///
    /// Submissions must target the current field; anything else is a
    /// protocol error and leaves the session untouched.
    pub async fn submit_answer(
        &mut self,
        field_id: &str,
        raw_value: &str,
    ) -> Result<SubmitOutcome, EngineError> {
        if self.abandoned {
            return Err(EngineError::SessionClosed);
        }

        let current = self
            .fill
            .current_field_id
            .clone()
            .ok_or_else(|| EngineError::FieldMismatch {
                expected: "<none>".to_string(),
                got: field_id.to_string(),
            })?;
        if current != field_id {
            return Err(EngineError::FieldMismatch {
                expected: current,
                got: field_id.to_string(),
            });
        }

        let model = Arc::clone(&self.model);
        let field = model
            .field(field_id)
            .ok_or_else(|| EngineError::UnknownField(field_id.to_string()))?;

        let value = validate_value(field, raw_value)?;
        let stored = self.to_form_language(&value, field.field_type).await;

        self.fill.values.insert(field.id.clone(), stored.clone());
        self.push_turn(ChatRole::User, raw_value, Some(&field.id));
        self.push_turn(
            ChatRole::Assistant,
            &format!("Recorded {}.", field.label),
            Some(&field.id),
        );

        self.advance();

        Ok(SubmitOutcome {
            field_id: field_id.to_string(),
            stored_value: stored,
            next_field_id: self.fill.current_field_id.clone(),
        })
    }

    /// Jump to any field of the model, filled or not. Values are kept, so a
    /// previously answered field can be corrected by resubmitting.
    pub fn navigate(&mut self, target_field_id: &str) -> Result<(), EngineError> {
        if self.abandoned {
            return Err(EngineError::SessionClosed);
        }
        if !self.model.contains_field(target_field_id) {
            return Err(EngineError::UnknownField(target_field_id.to_string()));
        }
        if let Some(previous) = self.fill.current_field_id.take() {
            self.fill.history.push(previous);
        }
        self.fill.current_field_id = Some(target_field_id.to_string());
        Ok(())
    }

    /// Short free-text hints for the current field; no state effect
    pub fn suggestions(&self) -> Result<impl Iterator<Item = String>, EngineError> {
        if self.abandoned {
            return Err(EngineError::SessionClosed);
        }
        let hints = self
            .fill
            .current_field_id
            .as_deref()
            .and_then(|id| self.model.field(id))
            .map(suggestions::for_field)
            .unwrap_or_default();
        Ok(hints.into_iter())
    }

    /// Full collected values paired with labels, in presentation order.
    /// Only valid once every required field is answered.
    pub fn summary(&self) -> Result<Vec<SummaryEntry>, EngineError> {
        if self.abandoned {
            return Err(EngineError::SessionClosed);
        }
        if !self.is_complete() {
            return Err(EngineError::NotComplete);
        }
        Ok(self
            .model
            .fields
            .iter()
            .filter_map(|f| {
                self.fill.values.get(&f.id).map(|v| SummaryEntry {
                    field_id: f.id.clone(),
                    label: f.label.clone(),
                    value: v.clone(),
                })
            })
            .collect())
    }

    /// External cancellation; terminal
    pub fn cancel(&mut self) {
        self.abandoned = true;
    }

    /// Advance to the next unfilled field in presentation order, or complete
    /// once no required field is missing. Completion is recomputed from the
    /// stored values, never cached.
    fn advance(&mut self) {
        if self.is_complete() {
            if let Some(previous) = self.fill.current_field_id.take() {
                self.fill.history.push(previous);
            }
            return;
        }
        let next = self
            .model
            .fields
            .iter()
            .find(|f| !self.fill.values.contains_key(&f.id))
            .map(|f| f.id.clone());
        if let Some(previous) = self.fill.current_field_id.take() {
            self.fill.history.push(previous);
        }
        self.fill.current_field_id = next;
    }

    fn push_turn(&mut self, role: ChatRole, text: &str, field_id: Option<&str>) {
        self.transcript.push(ChatTurn {
            role,
            text: text.to_string(),
            related_field_id: field_id.map(str::to_string),
            at: Utc::now(),
        });
    }

    async fn to_interaction_language(&self, text: &str) -> String {
        self.translate(text, self.model.language, self.interaction_language)
            .await
    }

    async fn to_form_language(&self, value: &str, field_type: FieldType) -> String {
        // Checkbox values are normalized markers, never translated
        if field_type == FieldType::Checkbox {
            return value.to_string();
        }
        self.translate(value, self.interaction_language, self.model.language)
            .await
    }

    /// Translate between concrete languages, passing through when either
    /// side is `Mixed`, the languages match, or the collaborator fails
    async fn translate(&self, text: &str, source: Language, target: Language) -> String {
        if source == target || source == Language::Mixed || target == Language::Mixed {
            return text.to_string();
        }
        match self.translator.translate(text, source, target).await {
            Ok(translated) => translated,
            Err(e) => {
                warn!("Translation {}->{} failed, passing through: {}", source, target, e);
                text.to_string()
            }
        }
    }
}

fn slug_title(title: &str) -> String {
    crate::normalizer::slugify(title)
}

/// Validate a raw submission against the field's constraints
fn validate_value(field: &FormField, raw_value: &str) -> Result<String, EngineError> {
    let trimmed = raw_value.trim();

    if trimmed.is_empty() {
        if field.required {
            return Err(EngineError::ValidationFailed {
                field_id: field.id.clone(),
                reason: "a value is required".to_string(),
            });
        }
        return Ok(String::new());
    }

    match field.field_type {
        FieldType::Choice => {
            if !field.options.iter().any(|o| o == trimmed) {
                return Err(EngineError::ValidationFailed {
                    field_id: field.id.clone(),
                    reason: format!(
                        "'{}' is not one of: {}",
                        trimmed,
                        field.options.join(", ")
                    ),
                });
            }
            Ok(trimmed.to_string())
        }
        FieldType::Checkbox => match checkbox_value(trimmed) {
            Some(v) => Ok(v.to_string()),
            None => Err(EngineError::ValidationFailed {
                field_id: field.id.clone(),
                reason: "answer yes or no".to_string(),
            }),
        },
        _ => Ok(trimmed.to_string()),
    }
}

/// Normalize a checkbox answer to `yes`/`no`
fn checkbox_value(raw: &str) -> Option<&'static str> {
    match raw.to_lowercase().as_str() {
        "yes" | "y" | "true" | "1" | "haan" | "han" | "हाँ" | "हां" => Some("yes"),
        "no" | "n" | "false" | "0" | "nahi" | "नहीं" => Some("no"),
        _ => None,
    }
}
