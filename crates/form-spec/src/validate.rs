use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::error::SchemaError;
use crate::messages::MessageRenderer;
use crate::plan::{BaseKind, Check, FieldPlan, parse_date, plan_field};
use crate::schema::FormSchema;
use crate::values::{ErrorMap, FormData, is_empty_value};
use crate::visibility::{OperatorMode, rules_hold};

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_'+\-.]*[A-Za-z0-9_+\-]@([A-Za-z0-9][A-Za-z0-9\-]*\.)+[A-Za-z]{2,}$")
        .expect("email pattern is valid")
});

/// A name claimed by more than one non-hidden field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateName {
    pub name: String,
    /// Id of the field whose validator was replaced.
    pub replaced: String,
    /// Id of the field whose validator is kept.
    pub kept: String,
}

/// Outcome of a whole-form pass, in the shape the CLI reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: ErrorMap,
    pub unknown_fields: Vec<String>,
}

/// Per-field validators keyed by field name.
#[derive(Debug, Clone)]
pub struct CompiledSchema {
    fields: BTreeMap<String, FieldPlan>,
    duplicates: Vec<DuplicateName>,
}

/// Compiles every non-hidden field. Duplicate names keep the last
/// declaration and are reported through [`CompiledSchema::duplicate_names`].
pub fn compile(schema: &FormSchema) -> Result<CompiledSchema, SchemaError> {
    let messages = MessageRenderer::new();
    let mut fields = BTreeMap::new();
    let mut duplicates = Vec::new();

    for field in schema.fields.iter().filter(|field| !field.hidden) {
        let plan = plan_field(field, &messages)?;
        if let Some(previous) = fields.insert(field.name.clone(), plan) {
            tracing::warn!(
                field_name = %field.name,
                replaced = %previous.field_id,
                kept = %field.id,
                "duplicate field name; last declaration wins"
            );
            duplicates.push(DuplicateName {
                name: field.name.clone(),
                replaced: previous.field_id,
                kept: field.id.clone(),
            });
        }
    }

    Ok(CompiledSchema { fields, duplicates })
}

/// Like [`compile`], but a duplicate field name is an error.
pub fn compile_strict(schema: &FormSchema) -> Result<CompiledSchema, SchemaError> {
    let compiled = compile(schema)?;
    match compiled.duplicates.first() {
        Some(duplicate) => Err(SchemaError::DuplicateName {
            name: duplicate.name.clone(),
            first: duplicate.replaced.clone(),
            second: duplicate.kept.clone(),
        }),
        None => Ok(compiled),
    }
}

impl CompiledSchema {
    /// First failing message for `name`, or `None` when valid or unknown.
    pub fn validate_field(&self, name: &str, value: Option<&Value>) -> Option<String> {
        self.fields
            .get(name)
            .and_then(|plan| plan.first_failure(value))
            .map(str::to_string)
    }

    /// Runs every field validator; one message per failing field.
    pub fn validate_all(&self, data: &FormData) -> ErrorMap {
        self.collect(data, |_| true)
    }

    /// Like [`validate_all`](Self::validate_all), skipping fields whose
    /// visibility rules do not hold for `data`.
    pub fn validate_visible(&self, data: &FormData, mode: OperatorMode) -> ErrorMap {
        self.collect(data, |plan| rules_hold(&plan.visibility_rules, data, mode))
    }

    pub fn report(&self, data: &FormData, visible_only: Option<OperatorMode>) -> ValidationReport {
        let errors = match visible_only {
            Some(mode) => self.validate_visible(data, mode),
            None => self.validate_all(data),
        };
        let unknown_fields: Vec<String> = data
            .keys()
            .filter(|key| !self.fields.contains_key(*key))
            .cloned()
            .collect();
        ValidationReport {
            valid: errors.is_empty(),
            errors,
            unknown_fields,
        }
    }

    pub fn plan(&self, name: &str) -> Option<&FieldPlan> {
        self.fields.get(name)
    }

    pub fn plans(&self) -> impl Iterator<Item = &FieldPlan> {
        self.fields.values()
    }

    pub fn duplicate_names(&self) -> &[DuplicateName] {
        &self.duplicates
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn collect(&self, data: &FormData, include: impl Fn(&FieldPlan) -> bool) -> ErrorMap {
        self.fields
            .iter()
            .filter(|(_, plan)| include(*plan))
            .filter_map(|(name, plan)| {
                plan.first_failure(data.get(name))
                    .map(|message| (name.clone(), message.to_string()))
            })
            .collect()
    }
}

impl FieldPlan {
    /// Message of the first failing constraint.
    pub fn first_failure(&self, value: Option<&Value>) -> Option<&str> {
        let value = match value {
            Some(value) if !is_empty_value(Some(value)) => value,
            _ => return self.required.as_deref(),
        };

        if let Some(message) = type_mismatch(self.kind, value) {
            return Some(message);
        }

        self.constraints
            .iter()
            .find(|constraint| !constraint.check.passes(value))
            .map(|constraint| constraint.message.as_str())
    }
}

fn type_mismatch(kind: BaseKind, value: &Value) -> Option<&'static str> {
    match kind {
        BaseKind::String if !value.is_string() => Some("Expected string"),
        BaseKind::Number if !value.is_number() => Some("Expected number"),
        BaseKind::Boolean if !value.is_boolean() => Some("Expected boolean"),
        _ => None,
    }
}

impl Check {
    /// Whether `value` satisfies this check. Values of a shape the check does
    /// not inspect pass.
    pub fn passes(&self, value: &Value) -> bool {
        match self {
            Check::MinLength(min) => text_len(value).is_none_or(|len| len >= *min),
            Check::MaxLength(max) => text_len(value).is_none_or(|len| len <= *max),
            Check::Length(exact) => text_len(value).is_none_or(|len| len == *exact),
            Check::Pattern(regex) => value.as_str().is_none_or(|text| regex.is_match(text)),
            Check::Email => value.as_str().is_none_or(is_email),
            Check::Url => value
                .as_str()
                .is_none_or(|text| url::Url::parse(text).is_ok()),
            Check::Min(min) => value.as_f64().is_none_or(|number| number >= *min),
            Check::Max(max) => value.as_f64().is_none_or(|number| number <= *max),
            Check::Step(step) => value.as_f64().is_none_or(|number| is_multiple(number, *step)),
            Check::Integer => value.as_f64().is_none_or(|number| number.fract() == 0.0),
            Check::Positive => value.as_f64().is_none_or(|number| number > 0.0),
            Check::Negative => value.as_f64().is_none_or(|number| number < 0.0),
            Check::NonZero => value.as_f64().is_none_or(|number| number != 0.0),
            Check::MaxFileSize(max) => files(value)
                .iter()
                .all(|file| file.get("size").and_then(Value::as_u64).is_none_or(|size| size <= *max)),
            Check::FileType(matcher) => files(value).iter().all(|file| {
                let name = file.get("name").and_then(Value::as_str);
                let mime_type = file.get("type").and_then(Value::as_str);
                (name.is_none() && mime_type.is_none()) || matcher.accepts(name, mime_type)
            }),
            Check::MinDate(min) => dates(value).iter().all(|date| date >= min),
            Check::MaxDate(max) => dates(value).iter().all(|date| date <= max),
        }
    }
}

/// Length in UTF-16 code units, the unit browsers report for `value.length`.
fn text_len(value: &Value) -> Option<usize> {
    value.as_str().map(|text| text.encode_utf16().count())
}

fn is_email(text: &str) -> bool {
    !text.starts_with('.') && !text.contains("..") && EMAIL.is_match(text)
}

fn is_multiple(number: f64, step: f64) -> bool {
    let ratio = number / step;
    (ratio - ratio.round()).abs() < 1e-9
}

/// A single file object or an array of them.
fn files(value: &Value) -> Vec<&serde_json::Map<String, Value>> {
    match value {
        Value::Object(file) => vec![file],
        Value::Array(items) => items.iter().filter_map(Value::as_object).collect(),
        _ => Vec::new(),
    }
}

/// A date string, an array of them (date ranges) or `{start, end}`.
/// Unparseable entries are skipped.
fn dates(value: &Value) -> Vec<chrono::NaiveDate> {
    let parse = |value: &Value| value.as_str().and_then(parse_date);
    match value {
        Value::String(_) => parse(value).into_iter().collect(),
        Value::Array(items) => items.iter().filter_map(parse).collect(),
        Value::Object(range) => ["start", "end"]
            .iter()
            .filter_map(|key| range.get(*key).and_then(parse))
            .collect(),
        _ => Vec::new(),
    }
}
