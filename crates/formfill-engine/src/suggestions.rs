//! Per-field input hints
//!
//! Short free-text suggestions shown next to a prompt. Purely advisory:
//! nothing here affects session state or validation.

use shared_types::{FieldType, FormField};

/// Hints for one field, finite and in a stable order
pub fn for_field(field: &FormField) -> Vec<String> {
    match field.field_type {
        FieldType::Date => vec![
            "Use DD/MM/YYYY, e.g. 15/08/1990".to_string(),
            "Write the date as it appears on your ID document".to_string(),
        ],
        FieldType::Choice => {
            let mut hints: Vec<String> = field
                .options
                .iter()
                .map(|o| format!("Option: {}", o))
                .collect();
            if hints.is_empty() {
                hints.push("Pick one of the listed options".to_string());
            }
            hints
        }
        FieldType::Checkbox => vec!["Answer yes or no".to_string()],
        FieldType::Text => {
            let lower = field.label.to_lowercase();
            if lower.contains("phone") || lower.contains("mobile") {
                vec!["Enter a 10-digit number without spaces, e.g. 9876543210".to_string()]
            } else if lower.contains("address") {
                vec!["Include house number, street, city and PIN code".to_string()]
            } else if lower.contains("name") {
                vec!["Write the name exactly as on your ID document".to_string()]
            } else {
                vec![format!("Enter {}", field.label.to_lowercase())]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(label: &str, field_type: FieldType, options: Vec<&str>) -> FormField {
        FormField {
            id: "f".to_string(),
            label: label.to_string(),
            field_type,
            required: true,
            options: options.into_iter().map(str::to_string).collect(),
            section: None,
        }
    }

    #[test]
    fn test_date_hints_show_format() {
        let hints = for_field(&field("Date of Birth", FieldType::Date, vec![]));
        assert!(hints[0].contains("DD/MM/YYYY"));
    }

    #[test]
    fn test_choice_hints_list_options() {
        let hints = for_field(&field("Category", FieldType::Choice, vec!["APL", "BPL"]));
        assert_eq!(hints, vec!["Option: APL", "Option: BPL"]);
    }

    #[test]
    fn test_hints_are_restartable() {
        let f = field("Phone Number", FieldType::Text, vec![]);
        assert_eq!(for_field(&f), for_field(&f));
        assert!(!for_field(&f).is_empty());
    }
}
