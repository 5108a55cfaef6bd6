use handlebars::{Handlebars, RenderError};
use serde_json::{Value, json};

use crate::schema::{FieldSchema, RuleKind};
use crate::values::display_value;

/// Renders rule messages. Author-supplied messages may use `{{value}}`,
/// `{{field}}` and `{{label}}`.
pub struct MessageRenderer {
    registry: Handlebars<'static>,
}

impl Default for MessageRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageRenderer {
    pub fn new() -> Self {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(handlebars::no_escape);
        Self { registry }
    }

    pub fn render(
        &self,
        template: &str,
        field: &FieldSchema,
        value: Option<&Value>,
    ) -> Result<String, RenderError> {
        if !template.contains("{{") {
            return Ok(template.to_string());
        }
        let data = json!({
            "field": field.name,
            "label": field.label,
            "value": value.map(display_value).unwrap_or_default(),
        });
        self.registry.render_template(template, &data)
    }
}

/// Message used when a rule carries no `message` of its own.
pub fn default_message(kind: RuleKind, value: Option<&Value>) -> String {
    let shown = value.map(display_value).unwrap_or_default();
    match kind {
        RuleKind::Required => "Required".into(),
        RuleKind::Min => format!("Min value is {shown}"),
        RuleKind::Max => format!("Max value is {shown}"),
        RuleKind::MinLength => format!("Min length is {shown}"),
        RuleKind::MaxLength => format!("Max length is {shown}"),
        RuleKind::Length => format!("Length must be exactly {shown}"),
        RuleKind::Email => "Invalid email".into(),
        RuleKind::Url => "Invalid URL".into(),
        RuleKind::Pattern | RuleKind::Regex | RuleKind::Custom => "Invalid format".into(),
        RuleKind::Step => format!("Must be multiple of {shown}"),
        RuleKind::FileSize => format!("File size must be at most {shown} bytes"),
        RuleKind::FileType => "File type is not allowed".into(),
        RuleKind::MinDate => format!("Date must be on or after {shown}"),
        RuleKind::MaxDate => format!("Date must be on or before {shown}"),
        RuleKind::Integer => "Must be an integer".into(),
        RuleKind::Positive => "Must be positive".into(),
        RuleKind::Negative => "Must be negative".into(),
        RuleKind::NonZero => "Must not be zero".into(),
    }
}

/// Message for the `maxSize` attribute of file fields.
pub fn max_size_message(max_bytes: u64) -> String {
    format!(
        "File size must be less than {:.2} MB",
        max_bytes as f64 / 1024.0 / 1024.0
    )
}
