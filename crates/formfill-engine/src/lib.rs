//! Form extraction and fill-session engine
//!
//! Turns raw extracted document text into a typed [`FormModel`] and drives
//! an interactive, language-aware session that collects one field at a time:
//!
//! - [`normalizer`] — canonical field descriptors from raw labels
//! - [`inference`] — structure inference with a guaranteed fallback model
//! - [`session`] — the per-user fill state machine
//! - [`adapters`] — collaborator boundaries (inference, translation, render)
//!
//! The engine never owns network plumbing; collaborators are passed in as
//! capability objects constructed once at process start.

pub mod adapters;
pub mod error;
pub mod inference;
pub mod normalizer;
pub mod session;
pub mod suggestions;

pub use adapters::{
    DocumentRenderer, IdentityTranslator, InferenceClient, RenderedDocument, Translator,
};
pub use error::EngineError;
pub use inference::{FallbackReason, Inference, StructureInferencer};
pub use session::{FieldPrompt, Prompt, SessionEngine, SessionState, SubmitOutcome, SummaryEntry};

pub use shared_types::{
    ChatRole, ChatTurn, FieldType, FillState, FormField, FormModel, FormSection, Language,
};
