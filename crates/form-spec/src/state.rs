use std::collections::BTreeSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::values::{ErrorMap, FormData};

/// When field changes trigger a whole-form validation pass. Submit always
/// validates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum ValidationMode {
    #[default]
    OnSubmit,
    OnChange,
    OnBlur,
}

/// Snapshot of one form instance.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormState {
    pub values: FormData,
    pub errors: ErrorMap,
    pub touched: BTreeSet<String>,
    pub submit_count: u32,
    pub is_submitting: bool,
    /// Bumped by every transition.
    pub version: u64,
}

impl FormState {
    pub fn new(values: FormData) -> Self {
        Self {
            values,
            ..Default::default()
        }
    }

    pub fn is_submitted(&self) -> bool {
        self.submit_count > 0
    }
}

/// Input events understood by [`reduce`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FormAction {
    SetFieldValue {
        name: String,
        value: Value,
        #[serde(default)]
        validate: bool,
    },
    Blur {
        name: String,
    },
    Submit,
    Reset,
}

/// Read-only collaborators of a transition.
pub struct FormEnv<'a> {
    pub mode: ValidationMode,
    pub initial_values: &'a FormData,
    pub validate: &'a dyn Fn(&FormData) -> ErrorMap,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: FormState,
    /// Values handed to the submit callback; set only for an unblocked submit.
    pub submitted: Option<FormData>,
}

/// Computes the state following `action`. `state` is left untouched.
pub fn reduce(state: &FormState, action: FormAction, env: &FormEnv<'_>) -> Transition {
    let mut next = state.clone();
    let mut submitted = None;

    match action {
        FormAction::SetFieldValue {
            name,
            value,
            validate,
        } => {
            next.values.insert(name.clone(), value);
            next.touched.insert(name);
            if validate || env.mode == ValidationMode::OnChange {
                next.errors = (env.validate)(&next.values);
            }
        }
        FormAction::Blur { name } => {
            next.touched.insert(name);
            if matches!(env.mode, ValidationMode::OnBlur | ValidationMode::OnChange) {
                next.errors = (env.validate)(&next.values);
            }
        }
        FormAction::Submit => {
            next.errors = (env.validate)(&next.values);
            next.touched.extend(next.errors.keys().cloned());
            next.submit_count += 1;
            if next.errors.is_empty() {
                submitted = Some(next.values.clone());
            }
        }
        FormAction::Reset => {
            next = FormState::new(env.initial_values.clone());
        }
    }

    next.version = state.version + 1;
    Transition {
        state: next,
        submitted,
    }
}
