//! Field normalization
//!
//! Maps raw detected labels into canonical [`FormField`] descriptors with
//! deterministic slug ids, cleaned display labels, and heuristic types.
//! One [`NormalizerBatch`] covers one FormModel construction so that id
//! collisions get stable numeric suffixes in order of first appearance.

use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;
use shared_types::{FieldType, FormField};

/// Maximum length of a derived field id
const MAX_ID_LEN: usize = 48;

/// Keywords that mark a label as a date field
pub const DATE_KEYWORDS: &[&str] = &[
    "date",
    "dob",
    "birth",
    "expiry",
    "expires",
    "issued",
    "valid until",
    "जन्म",
    "दिनांक",
    "तारीख",
    "तिथि",
];

/// Yes/no context markers that turn a question label into a checkbox
pub const YES_NO_KEYWORDS: &[&str] = &[
    "yes/no",
    "yes / no",
    "y/n",
    "(yes)",
    "(no)",
    "हाँ/नहीं",
    "हां/नहीं",
];

lazy_static! {
    static ref NON_ALNUM_RUN: Regex = Regex::new(r"[^a-z0-9]+").unwrap();
}

/// Derive a slug id from a label: lowercase, non-alphanumeric runs collapsed
/// to `_`, bounded length. Empty derivations fall back to `field`.
pub fn slugify(label: &str) -> String {
    let lower = label.to_lowercase();
    let slug = NON_ALNUM_RUN.replace_all(&lower, "_");
    let slug = slug.trim_matches('_');
    let mut slug: String = slug.chars().take(MAX_ID_LEN).collect();
    slug = slug.trim_end_matches('_').to_string();
    if slug.is_empty() {
        "field".to_string()
    } else {
        slug
    }
}

/// Strip surrounding whitespace and one trailing colon from a display label
fn clean_label(raw: &str) -> String {
    let trimmed = raw.trim();
    let trimmed = trimmed
        .strip_suffix(':')
        .or_else(|| trimmed.strip_suffix('：'))
        .unwrap_or(trimmed);
    trimmed.trim_end().to_string()
}

/// Guess a field type from label content
fn infer_type(label: &str) -> FieldType {
    let lower = label.to_lowercase();
    if DATE_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        return FieldType::Date;
    }
    let is_question = lower.trim_end().ends_with('?');
    let has_yes_no = YES_NO_KEYWORDS.iter().any(|kw| lower.contains(kw));
    if has_yes_no || (is_question && !lower.contains("which") && !lower.contains("what")) {
        return FieldType::Checkbox;
    }
    FieldType::Text
}

/// Parse an explicit type hint; unknown hints fall back to heuristics
fn parse_hint(hint: &str) -> Option<FieldType> {
    match hint.trim().to_lowercase().as_str() {
        "text" | "string" => Some(FieldType::Text),
        "choice" | "select" | "radio" | "dropdown" => Some(FieldType::Choice),
        "checkbox" | "boolean" | "bool" => Some(FieldType::Checkbox),
        "date" => Some(FieldType::Date),
        _ => None,
    }
}

/// Normalizes one batch of raw labels into fields with unique ids
pub struct NormalizerBatch {
    seen_ids: HashSet<String>,
}

impl NormalizerBatch {
    pub fn new() -> Self {
        Self {
            seen_ids: HashSet::new(),
        }
    }

    /// Produce a FormField from a raw label and optional type hint.
    ///
    /// Returns `None` when the label is empty after cleanup; such rows carry
    /// no usable descriptor and are dropped by the inferencer.
    pub fn normalize(&mut self, raw_label: &str, type_hint: Option<&str>) -> Option<FormField> {
        let label = clean_label(raw_label);
        if label.is_empty() {
            return None;
        }

        let field_type = type_hint
            .and_then(parse_hint)
            .unwrap_or_else(|| infer_type(&label));

        let id = self.unique_id(&slugify(&label));

        Some(FormField {
            id,
            label,
            field_type,
            required: true,
            options: Vec::new(),
            section: None,
        })
    }

    /// Reserve an id, suffixing `_2`, `_3`, ... on collision
    pub fn unique_id(&mut self, base: &str) -> String {
        if self.seen_ids.insert(base.to_string()) {
            return base.to_string();
        }
        let mut n = 2;
        loop {
            let candidate = format!("{}_{}", base, n);
            if self.seen_ids.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}

impl Default for NormalizerBatch {
    fn default() -> Self {
        Self::new()
    }
}
