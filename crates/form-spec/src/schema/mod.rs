pub mod field;
pub mod form;
pub mod rule;

pub use field::{FieldSchema, FieldType, GridProps, SelectOption};
pub use form::{FormLayout, FormSchema, FormStyling, ResponsiveColumns, SpacingStyle};
pub use rule::{RuleKind, ValidationRule, VisibilityOperator, VisibilityRule};
