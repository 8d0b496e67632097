//! Collaborator boundaries
//!
//! The engine consumes three external services through these traits:
//! model inference for structure extraction, translation for language-aware
//! prompting, and document rendering for the final artifact. Implementations
//! are constructed once at process start and passed in `Arc`'d, so tests can
//! substitute deterministic stubs.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use shared_types::{FormModel, Language};

/// External model-inference service (structure extraction)
#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// Run one completion request and return the raw model output
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// External translation service
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` from `source` to `target`.
    ///
    /// The engine trusts the output as-is; callers that cannot tolerate an
    /// unreachable service must handle the error, session paths degrade to
    /// pass-through instead.
    async fn translate(&self, text: &str, source: Language, target: Language) -> Result<String>;
}

/// Rendered document artifact handed back from the renderer
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub file_name: String,
    pub data: Vec<u8>,
    pub mime_type: String,
}

/// External document renderer (sink for completed sessions)
#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    async fn render(
        &self,
        model: &FormModel,
        values: &HashMap<String, String>,
    ) -> Result<RenderedDocument>;
}

/// Identity translator for tests and single-language deployments
pub struct IdentityTranslator;

#[async_trait]
impl Translator for IdentityTranslator {
    async fn translate(&self, text: &str, _source: Language, _target: Language) -> Result<String> {
        Ok(text.to_string())
    }
}
