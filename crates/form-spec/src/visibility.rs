use std::cmp::Ordering;
use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::{FieldSchema, FormSchema, VisibilityOperator, VisibilityRule};
use crate::values::{FormData, is_empty_value, strict_eq};

/// Field id to visibility flag.
pub type VisibilityMap = BTreeMap<String, bool>;

/// How operators beyond `eq`/`neq`/`in`/`nin` are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum OperatorMode {
    /// `contains`, `gt`, `lt` and `changed` always pass.
    #[default]
    Permissive,
    /// `contains`, `gt` and `lt` are evaluated; `changed` still passes.
    Extended,
}

impl VisibilityRule {
    /// Evaluates this rule against one data snapshot.
    pub fn evaluate(&self, data: &FormData, mode: OperatorMode) -> bool {
        let actual = data.get(&self.field);
        match (self.operator, mode) {
            (VisibilityOperator::Eq, _) => matches_value(actual, &self.value),
            (VisibilityOperator::Neq, _) => !matches_value(actual, &self.value),
            (VisibilityOperator::In, _) => self
                .value
                .as_array()
                .is_some_and(|candidates| contains(candidates, actual)),
            (VisibilityOperator::Nin, _) => self
                .value
                .as_array()
                .is_some_and(|candidates| !contains(candidates, actual)),
            (VisibilityOperator::Contains, OperatorMode::Extended) => match actual {
                Some(Value::String(text)) => self
                    .value
                    .as_str()
                    .is_some_and(|needle| text.contains(needle)),
                Some(Value::Array(items)) => contains(items, Some(&self.value)),
                _ => false,
            },
            (VisibilityOperator::Gt, OperatorMode::Extended) => {
                compare(actual, &self.value) == Some(Ordering::Greater)
            }
            (VisibilityOperator::Lt, OperatorMode::Extended) => {
                compare(actual, &self.value) == Some(Ordering::Less)
            }
            _ => true,
        }
    }
}

fn matches_value(actual: Option<&Value>, expected: &Value) -> bool {
    actual.is_some_and(|value| strict_eq(value, expected))
}

fn contains(candidates: &[Value], actual: Option<&Value>) -> bool {
    candidates
        .iter()
        .any(|candidate| matches_value(actual, candidate))
}

fn compare(actual: Option<&Value>, expected: &Value) -> Option<Ordering> {
    match (actual?, expected) {
        (Value::Number(left), Value::Number(right)) => {
            left.as_f64()?.partial_cmp(&right.as_f64()?)
        }
        (Value::String(left), Value::String(right)) => Some(left.as_str().cmp(right.as_str())),
        _ => None,
    }
}

/// AND over all rules. An empty list holds.
pub fn rules_hold(rules: &[VisibilityRule], data: &FormData, mode: OperatorMode) -> bool {
    rules.iter().all(|rule| rule.evaluate(data, mode))
}

/// Whether `field` is shown for the current data, using permissive operators.
pub fn is_visible(field: &FieldSchema, data: &FormData) -> bool {
    is_visible_with(field, data, OperatorMode::Permissive)
}

pub fn is_visible_with(field: &FieldSchema, data: &FormData, mode: OperatorMode) -> bool {
    if field.hidden {
        return false;
    }
    rules_hold(&field.visibility_rules, data, mode)
}

/// Static `disabled` flag, or every `disableRules` entry holding.
pub fn is_disabled(field: &FieldSchema, data: &FormData, mode: OperatorMode) -> bool {
    field.disabled
        || (!field.disable_rules.is_empty() && rules_hold(&field.disable_rules, data, mode))
}

pub fn resolve_visibility(schema: &FormSchema, data: &FormData, mode: OperatorMode) -> VisibilityMap {
    schema
        .fields
        .iter()
        .map(|field| (field.id.clone(), is_visible_with(field, data, mode)))
        .collect()
}

/// Names of fields that currently hold a value and whose `clearValueRules`
/// all hold. Fields without clear rules are never reported.
pub fn fields_to_clear(schema: &FormSchema, data: &FormData, mode: OperatorMode) -> Vec<String> {
    schema
        .fields
        .iter()
        .filter(|field| !field.clear_value_rules.is_empty())
        .filter(|field| !is_empty_value(data.get(&field.name)))
        .filter(|field| rules_hold(&field.clear_value_rules, data, mode))
        .map(|field| field.name.clone())
        .collect()
}
