use std::collections::HashMap;

use crate::language::Language;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Choice,
    Checkbox,
    Date,
}

impl Default for FieldType {
    fn default() -> Self {
        FieldType::Text
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FormField {
    /// Slug id, unique within the owning FormModel
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub required: bool,
    /// Allowed values; only meaningful for `Choice` fields
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    /// Id of the owning section, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FormSection {
    pub id: String,
    pub title: String,
    /// Ordered member field ids; every entry resolves to a field in the model
    pub field_ids: Vec<String>,
}

/// Canonical structured representation of one uploaded form.
///
/// Built once by the structure inferencer and read-only afterwards; `fields`
/// order is the fill order the session walks absent explicit navigation.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FormModel {
    pub title: String,
    pub language: Language,
    pub fields: Vec<FormField>,
    pub sections: Vec<FormSection>,
}

impl FormModel {
    pub fn field(&self, id: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn contains_field(&self, id: &str) -> bool {
        self.field(id).is_some()
    }

    pub fn total_fields(&self) -> usize {
        self.fields.len()
    }
}

/// Per-session record of answered fields.
///
/// Mutated exclusively by the session engine; discarded when the session
/// ends. Values are stored in the form's native language.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FillState {
    pub form_id: String,
    pub values: HashMap<String, String>,
    /// Field awaiting input; `None` once every required field is answered
    pub current_field_id: Option<String>,
    /// Past current-field transitions, newest last
    pub history: Vec<String>,
}

impl FillState {
    pub fn new(form_id: impl Into<String>) -> Self {
        Self {
            form_id: form_id.into(),
            values: HashMap::new(),
            current_field_id: None,
            history: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// Append-only transcript entry owned by the session engine
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_field_id: Option<String>,
    pub at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_model() -> FormModel {
        FormModel {
            title: "Test Form".to_string(),
            language: Language::En,
            fields: vec![
                FormField {
                    id: "name".to_string(),
                    label: "Name".to_string(),
                    field_type: FieldType::Text,
                    required: true,
                    options: vec![],
                    section: None,
                },
                FormField {
                    id: "gender".to_string(),
                    label: "Gender".to_string(),
                    field_type: FieldType::Choice,
                    required: false,
                    options: vec!["Male".to_string(), "Female".to_string()],
                    section: None,
                },
            ],
            sections: vec![],
        }
    }

    #[test]
    fn test_field_lookup() {
        let model = sample_model();
        assert!(model.contains_field("name"));
        assert!(!model.contains_field("missing"));
        assert_eq!(model.field("gender").unwrap().options.len(), 2);
        assert_eq!(model.total_fields(), 2);
    }

    #[test]
    fn test_field_type_serde_tag() {
        let field = sample_model().fields[0].clone();
        let json = serde_json::to_value(&field).unwrap();
        assert_eq!(json["type"], "text");
        // Empty options are omitted from the wire form
        assert!(json.get("options").is_none());
    }

    #[test]
    fn test_fill_state_starts_empty() {
        let state = FillState::new("form-1");
        assert!(state.values.is_empty());
        assert!(state.current_field_id.is_none());
        assert!(state.history.is_empty());
    }
}
