use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Closed set of validation rule tags understood by the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum RuleKind {
    Required,
    Min,
    Max,
    MinLength,
    MaxLength,
    Length,
    Email,
    Url,
    Pattern,
    Step,
    Regex,
    Custom,
    FileSize,
    FileType,
    MinDate,
    MaxDate,
    Integer,
    Positive,
    Negative,
    NonZero,
}

impl RuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::Required => "required",
            RuleKind::Min => "min",
            RuleKind::Max => "max",
            RuleKind::MinLength => "minLength",
            RuleKind::MaxLength => "maxLength",
            RuleKind::Length => "length",
            RuleKind::Email => "email",
            RuleKind::Url => "url",
            RuleKind::Pattern => "pattern",
            RuleKind::Step => "step",
            RuleKind::Regex => "regex",
            RuleKind::Custom => "custom",
            RuleKind::FileSize => "fileSize",
            RuleKind::FileType => "fileType",
            RuleKind::MinDate => "minDate",
            RuleKind::MaxDate => "maxDate",
            RuleKind::Integer => "integer",
            RuleKind::Positive => "positive",
            RuleKind::Negative => "negative",
            RuleKind::NonZero => "nonZero",
        }
    }
}

/// One declarative constraint attached to a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationRule {
    #[serde(rename = "type")]
    pub kind: RuleKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ValidationRule {
    pub fn new(kind: RuleKind) -> Self {
        Self {
            kind,
            value: None,
            message: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Comparison applied by a [`VisibilityRule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum VisibilityOperator {
    Eq,
    Neq,
    In,
    Nin,
    Contains,
    Gt,
    Lt,
    Changed,
}

/// Condition over another field's current value.
///
/// Used for `visibilityRules`, `disableRules` and `clearValueRules`; a list of
/// rules is always combined with AND.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VisibilityRule {
    pub field: String,
    pub operator: VisibilityOperator,
    #[serde(default)]
    pub value: Value,
}
