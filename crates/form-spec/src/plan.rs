//! Backend-neutral constraint plans.
//!
//! A [`FieldPlan`] is the ordered list of semantic checks derived from one
//! field. The runtime validator and the JSON Schema generator both consume
//! plans, so the (field type, rule) mapping lives only here.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use regex::Regex;
use serde_json::Value;

use crate::error::SchemaError;
use crate::messages::{MessageRenderer, default_message, max_size_message};
use crate::schema::{FieldSchema, FieldType, RuleKind, ValidationRule, VisibilityRule};

/// Value shape a field's validator expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseKind {
    String,
    Number,
    Boolean,
    Any,
}

impl BaseKind {
    pub fn for_field(kind: FieldType) -> Self {
        match kind {
            FieldType::Text
            | FieldType::Email
            | FieldType::Url
            | FieldType::Tel
            | FieldType::Password
            | FieldType::Textarea
            | FieldType::Select
            | FieldType::Radio
            | FieldType::Autocomplete => BaseKind::String,
            FieldType::Number => BaseKind::Number,
            FieldType::Checkbox | FieldType::Switch => BaseKind::Boolean,
            FieldType::Date
            | FieldType::Time
            | FieldType::Datetime
            | FieldType::Daterange
            | FieldType::File => BaseKind::Any,
        }
    }
}

/// Accept patterns for uploaded files. `.ext` entries match the file name,
/// everything else (`image/*`, `application/pdf`) matches the MIME type.
#[derive(Debug, Clone)]
pub struct FileTypeMatcher {
    pub patterns: Vec<String>,
    names: GlobSet,
    mime_types: GlobSet,
}

impl FileTypeMatcher {
    pub fn new(field: &str, patterns: Vec<String>) -> Result<Self, SchemaError> {
        let mut names = GlobSetBuilder::new();
        let mut mime_types = GlobSetBuilder::new();
        for pattern in &patterns {
            let (target, glob) = match pattern.strip_prefix('.') {
                Some(extension) => (&mut names, format!("*.{extension}")),
                None => (&mut mime_types, pattern.clone()),
            };
            let glob = GlobBuilder::new(&glob)
                .case_insensitive(true)
                .build()
                .map_err(|source| SchemaError::InvalidFileType {
                    field: field.to_string(),
                    pattern: pattern.clone(),
                    source,
                })?;
            target.add(glob);
        }
        let build = |builder: GlobSetBuilder| {
            builder.build().map_err(|source| SchemaError::InvalidFileType {
                field: field.to_string(),
                pattern: patterns.join(","),
                source,
            })
        };
        Ok(Self {
            names: build(names)?,
            mime_types: build(mime_types)?,
            patterns,
        })
    }

    pub fn accepts(&self, name: Option<&str>, mime_type: Option<&str>) -> bool {
        name.is_some_and(|name| self.names.is_match(name))
            || mime_type.is_some_and(|mime_type| self.mime_types.is_match(mime_type))
    }
}

/// One semantic check. Which value shapes it applies to follows from the
/// plan's [`BaseKind`].
#[derive(Debug, Clone)]
pub enum Check {
    MinLength(usize),
    MaxLength(usize),
    Length(usize),
    Pattern(Regex),
    Email,
    Url,
    Min(f64),
    Max(f64),
    Step(f64),
    Integer,
    Positive,
    Negative,
    NonZero,
    MaxFileSize(u64),
    FileType(FileTypeMatcher),
    MinDate(NaiveDate),
    MaxDate(NaiveDate),
}

#[derive(Debug, Clone)]
pub struct Constraint {
    pub check: Check,
    pub message: String,
}

/// Everything needed to validate one field, in evaluation order.
#[derive(Debug, Clone)]
pub struct FieldPlan {
    pub field_id: String,
    pub name: String,
    pub kind: BaseKind,
    pub constraints: Vec<Constraint>,
    /// Message reported for an empty value; `None` makes the field optional.
    pub required: Option<String>,
    pub visibility_rules: Vec<VisibilityRule>,
}

impl FieldPlan {
    pub fn is_required(&self) -> bool {
        self.required.is_some()
    }
}

/// Builds the plan for one field.
pub fn plan_field(field: &FieldSchema, messages: &MessageRenderer) -> Result<FieldPlan, SchemaError> {
    let kind = BaseKind::for_field(field.kind);
    let mut constraints = Vec::new();

    if field.kind == FieldType::Email {
        constraints.push(Constraint {
            check: Check::Email,
            message: "Invalid email address".into(),
        });
    }

    for rule in &field.validation {
        match build_check(kind, field, rule)? {
            Some(check) => constraints.push(Constraint {
                check,
                message: rule_message(field, rule, messages)?,
            }),
            None if !matches!(rule.kind, RuleKind::Required | RuleKind::Custom) => {
                tracing::debug!(
                    field = %field.name,
                    rule = rule.kind.as_str(),
                    field_type = field.kind.as_str(),
                    "validation rule does not apply to field; ignoring"
                );
            }
            None => {}
        }
    }

    if field.kind == FieldType::File
        && let Some(max_size) = field.max_size
    {
        constraints.push(Constraint {
            check: Check::MaxFileSize(max_size),
            message: max_size_message(max_size),
        });
    }

    let required = field
        .required_rule()
        .map(|rule| rule_message(field, rule, messages))
        .transpose()?;

    Ok(FieldPlan {
        field_id: field.id.clone(),
        name: field.name.clone(),
        kind,
        constraints,
        required,
        visibility_rules: field.visibility_rules.clone(),
    })
}

fn rule_message(
    field: &FieldSchema,
    rule: &ValidationRule,
    messages: &MessageRenderer,
) -> Result<String, SchemaError> {
    match &rule.message {
        Some(template) => messages
            .render(template, field, rule.value.as_ref())
            .map_err(|source| SchemaError::InvalidMessage {
                field: field.name.clone(),
                rule: rule.kind.as_str(),
                source: Box::new(source),
            }),
        None => Ok(default_message(rule.kind, rule.value.as_ref())),
    }
}

/// Dispatch table over (base kind, rule). Unlisted pairs and values of the
/// wrong shape yield `None`.
fn build_check(
    kind: BaseKind,
    field: &FieldSchema,
    rule: &ValidationRule,
) -> Result<Option<Check>, SchemaError> {
    let value = rule.value.as_ref();
    let check = match (kind, rule.kind) {
        (BaseKind::String, RuleKind::MinLength) => as_usize(value).map(Check::MinLength),
        (BaseKind::String, RuleKind::MaxLength) => as_usize(value).map(Check::MaxLength),
        (BaseKind::String, RuleKind::Length) => as_usize(value).map(Check::Length),
        (BaseKind::String, RuleKind::Pattern | RuleKind::Regex) => {
            match value.and_then(Value::as_str) {
                Some(pattern) => Some(Check::Pattern(Regex::new(pattern).map_err(|source| {
                    SchemaError::InvalidPattern {
                        field: field.name.clone(),
                        rule: rule.kind.as_str(),
                        pattern: pattern.to_string(),
                        source,
                    }
                })?)),
                None => None,
            }
        }
        (BaseKind::String, RuleKind::Email) => Some(Check::Email),
        (BaseKind::String, RuleKind::Url) => Some(Check::Url),
        (BaseKind::Number, RuleKind::Min) => value.and_then(Value::as_f64).map(Check::Min),
        (BaseKind::Number, RuleKind::Max) => value.and_then(Value::as_f64).map(Check::Max),
        (BaseKind::Number, RuleKind::Step) => value
            .and_then(Value::as_f64)
            .filter(|step| *step > 0.0)
            .map(Check::Step),
        (BaseKind::Number, RuleKind::Integer) => Some(Check::Integer),
        (BaseKind::Number, RuleKind::Positive) => Some(Check::Positive),
        (BaseKind::Number, RuleKind::Negative) => Some(Check::Negative),
        (BaseKind::Number, RuleKind::NonZero) => Some(Check::NonZero),
        (BaseKind::Any, RuleKind::FileSize) if field.kind == FieldType::File => {
            value.and_then(Value::as_u64).map(Check::MaxFileSize)
        }
        (BaseKind::Any, RuleKind::FileType) if field.kind == FieldType::File => {
            match accept_patterns(value) {
                Some(patterns) => Some(Check::FileType(FileTypeMatcher::new(
                    &field.name,
                    patterns,
                )?)),
                None => None,
            }
        }
        (BaseKind::Any, RuleKind::MinDate) if field.kind.is_date_like() => value
            .and_then(Value::as_str)
            .and_then(parse_date)
            .map(Check::MinDate),
        (BaseKind::Any, RuleKind::MaxDate) if field.kind.is_date_like() => value
            .and_then(Value::as_str)
            .and_then(parse_date)
            .map(Check::MaxDate),
        _ => None,
    };
    Ok(check)
}

/// Non-negative whole numbers, including float spellings such as `5.0`.
fn as_usize(value: Option<&Value>) -> Option<usize> {
    let value = value?;
    let whole = match value.as_u64() {
        Some(number) => number,
        None => value
            .as_f64()
            .filter(|number| *number >= 0.0 && number.fract() == 0.0 && *number <= u64::MAX as f64)
            .map(|number| number as u64)?,
    };
    usize::try_from(whole).ok()
}

/// `"image/*,.pdf"` or `["image/*", ".pdf"]`.
fn accept_patterns(value: Option<&Value>) -> Option<Vec<String>> {
    let patterns: Vec<String> = match value? {
        Value::String(list) => list.split(',').map(str::to_string).collect(),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => return None,
    };
    let patterns: Vec<String> = patterns
        .into_iter()
        .map(|pattern| pattern.trim().to_string())
        .filter(|pattern| !pattern.is_empty())
        .collect();
    (!patterns.is_empty()).then_some(patterns)
}

/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps and `YYYY-MM-DDTHH:MM`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|at| at.date_naive()))
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
                .ok()
                .map(|at| at.date())
        })
}
