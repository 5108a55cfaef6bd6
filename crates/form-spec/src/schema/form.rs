use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::schema::field::FieldSchema;

/// Grid settings for the whole form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct FormLayout {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gap: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SpacingStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_padding: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_gap: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_gap: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct ResponsiveColumns {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<FormLayout>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tablet: Option<FormLayout>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desktop: Option<FormLayout>,
}

/// Presentation hints. Carried through untouched by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct FormStyling {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spacing: Option<SpacingStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsive: Option<ResponsiveColumns>,
}

/// Top-level form definition.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct FormSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub fields: Vec<FieldSchema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<FormLayout>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styling: Option<FormStyling>,
}

impl FormSchema {
    pub fn new(fields: Vec<FieldSchema>) -> Self {
        Self {
            fields,
            ..Default::default()
        }
    }
}
