pub mod language;
pub mod types;

pub use language::Language;
pub use types::{
    ChatRole, ChatTurn, FieldType, FillState, FormField, FormModel, FormSection,
};
