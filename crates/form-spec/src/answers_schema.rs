use serde_json::{Map, Value, json};

use crate::plan::{BaseKind, Check, FieldPlan};
use crate::validate::CompiledSchema;

/// JSON Schema (draft 2020-12) describing form data accepted by `compiled`.
///
/// Date and file checks have no standard keyword and are emitted as `x-`
/// annotations.
pub fn generate(compiled: &CompiledSchema) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for plan in compiled.plans() {
        properties.insert(plan.name.clone(), field_schema(plan));
        if plan.is_required() {
            required.push(Value::String(plan.name.clone()));
        }
    }

    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": true,
    })
}

fn field_schema(plan: &FieldPlan) -> Value {
    let mut schema = Map::new();
    match plan.kind {
        BaseKind::String => {
            schema.insert("type".into(), json!("string"));
        }
        BaseKind::Number => {
            schema.insert("type".into(), json!("number"));
        }
        BaseKind::Boolean => {
            schema.insert("type".into(), json!("boolean"));
        }
        BaseKind::Any => {}
    }

    // Checks that cannot share a keyword with an earlier one land in `allOf`.
    let mut all_of = Vec::new();
    for constraint in &plan.constraints {
        match &constraint.check {
            Check::MinLength(min) => raise(&mut schema, "minLength", *min),
            Check::MaxLength(max) => lower(&mut schema, "maxLength", *max),
            Check::Length(exact) => {
                raise(&mut schema, "minLength", *exact);
                lower(&mut schema, "maxLength", *exact);
            }
            Check::Pattern(regex) => {
                keyword_or_all_of(&mut schema, &mut all_of, "pattern", json!(regex.as_str()))
            }
            Check::Email => keyword_or_all_of(&mut schema, &mut all_of, "format", json!("email")),
            Check::Url => keyword_or_all_of(&mut schema, &mut all_of, "format", json!("uri")),
            Check::Min(min) => fold_number(&mut schema, "minimum", *min, f64::max),
            Check::Max(max) => fold_number(&mut schema, "maximum", *max, f64::min),
            Check::Step(step) => {
                keyword_or_all_of(&mut schema, &mut all_of, "multipleOf", json!(step))
            }
            Check::Integer => {
                schema.insert("type".into(), json!("integer"));
            }
            Check::Positive => {
                schema.insert("exclusiveMinimum".into(), json!(0));
            }
            Check::Negative => {
                schema.insert("exclusiveMaximum".into(), json!(0));
            }
            Check::NonZero => {
                schema.insert("not".into(), json!({ "const": 0 }));
            }
            Check::MaxFileSize(max) => {
                let next = schema
                    .get("x-maxFileSize")
                    .and_then(Value::as_u64)
                    .map_or(*max, |current| current.min(*max));
                schema.insert("x-maxFileSize".into(), json!(next));
            }
            Check::FileType(matcher) => {
                keyword_or_all_of(&mut schema, &mut all_of, "x-accept", json!(matcher.patterns))
            }
            // ISO dates order lexicographically.
            Check::MinDate(date) => fold_date(&mut schema, "x-minDate", date.to_string(), true),
            Check::MaxDate(date) => fold_date(&mut schema, "x-maxDate", date.to_string(), false),
        }
    }

    if !all_of.is_empty() {
        schema.insert("allOf".into(), Value::Array(all_of));
    }

    if plan.is_required() {
        match plan.kind {
            BaseKind::String => raise(&mut schema, "minLength", 1),
            // Number and Boolean already exclude null and "" through `type`.
            BaseKind::Any => {
                schema.insert("not".into(), json!({ "enum": [null, ""] }));
            }
            BaseKind::Number | BaseKind::Boolean => {}
        }
        Value::Object(schema)
    } else {
        json!({
            "anyOf": [Value::Object(schema), { "type": "null" }, { "const": "" }]
        })
    }
}

/// Sets `key` on first use; later values of the same keyword become an
/// `allOf` entry so every check survives.
fn keyword_or_all_of(
    schema: &mut Map<String, Value>,
    all_of: &mut Vec<Value>,
    key: &str,
    value: Value,
) {
    match schema.get(key) {
        None => {
            schema.insert(key.into(), value);
        }
        Some(existing) if *existing == value => {}
        Some(_) => {
            let mut entry = Map::new();
            entry.insert(key.into(), value);
            all_of.push(Value::Object(entry));
        }
    }
}

fn fold_number(
    schema: &mut Map<String, Value>,
    key: &str,
    candidate: f64,
    pick: fn(f64, f64) -> f64,
) {
    let next = schema
        .get(key)
        .and_then(Value::as_f64)
        .map_or(candidate, |current| pick(current, candidate));
    schema.insert(key.into(), json!(next));
}

fn fold_date(schema: &mut Map<String, Value>, key: &str, candidate: String, latest: bool) {
    let keep_current = schema
        .get(key)
        .and_then(Value::as_str)
        .is_some_and(|current| {
            if latest {
                current >= candidate.as_str()
            } else {
                current <= candidate.as_str()
            }
        });
    if !keep_current {
        schema.insert(key.into(), Value::String(candidate));
    }
}

fn raise(schema: &mut Map<String, Value>, key: &str, candidate: usize) {
    let current = schema.get(key).and_then(Value::as_u64).unwrap_or(0);
    schema.insert(key.into(), json!(current.max(candidate as u64)));
}

fn lower(schema: &mut Map<String, Value>, key: &str, candidate: usize) {
    let next = schema
        .get(key)
        .and_then(Value::as_u64)
        .map_or(candidate as u64, |current| current.min(candidate as u64));
    schema.insert(key.into(), json!(next));
}
