#![allow(missing_docs)]

pub mod answers_schema;
pub mod cache;
pub mod controller;
pub mod error;
pub mod messages;
pub mod plan;
pub mod schema;
pub mod state;
pub mod validate;
pub mod values;
pub mod visibility;

pub use answers_schema::generate as answers_schema;
pub use cache::SchemaCache;
pub use controller::{ExternalValidator, FieldBinding, FormController, FormOptions, initial_values};
pub use error::{ExternalValidationError, SchemaError};
pub use plan::{BaseKind, Check, Constraint, FieldPlan};
pub use schema::{
    FieldSchema, FieldType, FormSchema, RuleKind, SelectOption, ValidationRule,
    VisibilityOperator, VisibilityRule,
};
pub use state::{FormAction, FormState, Transition, ValidationMode, reduce};
pub use validate::{CompiledSchema, DuplicateName, ValidationReport, compile, compile_strict};
pub use values::{ErrorMap, FormData};
pub use visibility::{
    OperatorMode, VisibilityMap, fields_to_clear, is_disabled, is_visible, is_visible_with,
    resolve_visibility,
};
