use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::rule::{RuleKind, ValidationRule, VisibilityRule};

/// Input widget family of a field. Drives the compiled base validator kind.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    Text,
    Email,
    Url,
    Tel,
    Number,
    Password,
    Textarea,
    Select,
    Autocomplete,
    Date,
    Time,
    Datetime,
    Daterange,
    Checkbox,
    Switch,
    Radio,
    File,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Email => "email",
            FieldType::Url => "url",
            FieldType::Tel => "tel",
            FieldType::Number => "number",
            FieldType::Password => "password",
            FieldType::Textarea => "textarea",
            FieldType::Select => "select",
            FieldType::Autocomplete => "autocomplete",
            FieldType::Date => "date",
            FieldType::Time => "time",
            FieldType::Datetime => "datetime",
            FieldType::Daterange => "daterange",
            FieldType::Checkbox => "checkbox",
            FieldType::Switch => "switch",
            FieldType::Radio => "radio",
            FieldType::File => "file",
        }
    }

    pub fn is_date_like(&self) -> bool {
        matches!(
            self,
            FieldType::Date | FieldType::Time | FieldType::Datetime | FieldType::Daterange
        )
    }
}

/// One entry of a choice field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SelectOption {
    pub label: String,
    pub value: Value,
}

/// Grid placement hints. Columns are on a 12-column grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GridProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub col_span: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xs: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sm: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub md: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lg: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_span: Option<u32>,
}

/// One form field definition.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldSchema {
    pub id: String,
    /// Flat key into the form data, e.g. `account.username`.
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FieldType,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub helper_text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiple: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accept: Option<String>,
    /// Maximum size in bytes of each uploaded file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_files: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_extensions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid: Option<GridProps>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validation: Vec<ValidationRule>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub visibility_rules: Vec<VisibilityRule>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub disable_rules: Vec<VisibilityRule>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub clear_value_rules: Vec<VisibilityRule>,
}

impl FieldSchema {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        kind: FieldType,
        label: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            label: label.into(),
            ..Default::default()
        }
    }

    pub fn with_rule(mut self, rule: ValidationRule) -> Self {
        self.validation.push(rule);
        self
    }

    pub fn with_visibility(mut self, rule: VisibilityRule) -> Self {
        self.visibility_rules.push(rule);
        self
    }

    pub fn required_rule(&self) -> Option<&ValidationRule> {
        self.validation
            .iter()
            .find(|rule| rule.kind == RuleKind::Required)
    }
}
