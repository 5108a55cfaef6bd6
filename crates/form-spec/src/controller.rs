use std::collections::BTreeSet;
use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ExternalValidationError, SchemaError};
use crate::schema::FormSchema;
use crate::state::{FormAction, FormEnv, FormState, ValidationMode, reduce};
use crate::validate::{CompiledSchema, compile};
use crate::values::{ErrorMap, FormData};
use crate::visibility::OperatorMode;

/// Secondary validation source supplied by the host. Its messages override
/// the compiled schema's for the same key.
pub trait ExternalValidator {
    fn validate(&self, values: &FormData) -> Result<ErrorMap, ExternalValidationError>;
}

impl<F> ExternalValidator for F
where
    F: Fn(&FormData) -> Result<ErrorMap, ExternalValidationError>,
{
    fn validate(&self, values: &FormData) -> Result<ErrorMap, ExternalValidationError> {
        self(values)
    }
}

/// Controller configuration, loadable from JSON.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct FormOptions {
    pub mode: ValidationMode,
    /// Overrides schema `defaultValue`s.
    pub initial_values: FormData,
    pub operator_mode: OperatorMode,
    /// Skip validation of fields whose visibility rules do not hold.
    pub skip_hidden_fields: bool,
}

/// Schema defaults, overridden by `supplied`.
pub fn initial_values(schema: &FormSchema, supplied: &FormData) -> FormData {
    let mut values = supplied.clone();
    for field in &schema.fields {
        if let Some(default) = &field.default_value
            && !values.contains_key(&field.name)
        {
            values.insert(field.name.clone(), default.clone());
        }
    }
    values
}

/// Everything a host needs to bind one input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldBinding {
    pub name: String,
    pub value: Option<Value>,
    pub error: Option<String>,
    pub touched: bool,
}

impl FieldBinding {
    pub fn change(&self, form: &mut FormController, value: Value) {
        form.set_field_value(&self.name, value, false);
    }

    pub fn blur(&self, form: &mut FormController) {
        form.handle_blur(&self.name);
    }

    /// The error, once the field has been touched.
    pub fn shown_error(&self) -> Option<&str> {
        self.error.as_deref().filter(|_| self.touched)
    }
}

type SubmitHandler = Box<dyn FnMut(&FormData)>;

/// Owns one form instance's state and drives [`reduce`].
pub struct FormController {
    compiled: Option<Arc<CompiledSchema>>,
    external: Option<Box<dyn ExternalValidator>>,
    on_submit: Option<SubmitHandler>,
    options: FormOptions,
    initial_values: FormData,
    state: FormState,
}

impl FormController {
    /// Compiles `schema` and seeds values from its defaults and
    /// `options.initial_values`.
    pub fn new(schema: &FormSchema, options: FormOptions) -> Result<Self, SchemaError> {
        let compiled = Arc::new(compile(schema)?);
        let values = initial_values(schema, &options.initial_values);
        Ok(Self::from_parts(Some(compiled), values, options))
    }

    /// Builds a controller around an already compiled (possibly cached)
    /// schema, or none when only an external validator is used.
    pub fn from_parts(
        compiled: Option<Arc<CompiledSchema>>,
        initial_values: FormData,
        options: FormOptions,
    ) -> Self {
        Self {
            compiled,
            external: None,
            on_submit: None,
            options,
            state: FormState::new(initial_values.clone()),
            initial_values,
        }
    }

    pub fn with_external_validator(mut self, validator: impl ExternalValidator + 'static) -> Self {
        self.external = Some(Box::new(validator));
        self
    }

    pub fn on_submit(mut self, handler: impl FnMut(&FormData) + 'static) -> Self {
        self.on_submit = Some(Box::new(handler));
        self
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn values(&self) -> &FormData {
        &self.state.values
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.state.values.get(name)
    }

    pub fn errors(&self) -> &ErrorMap {
        &self.state.errors
    }

    pub fn touched(&self) -> &BTreeSet<String> {
        &self.state.touched
    }

    pub fn submit_count(&self) -> u32 {
        self.state.submit_count
    }

    pub fn is_submitting(&self) -> bool {
        self.state.is_submitting
    }

    pub fn is_submitted(&self) -> bool {
        self.state.is_submitted()
    }

    pub fn mode(&self) -> ValidationMode {
        self.options.mode
    }

    pub fn set_field_value(&mut self, name: &str, value: Value, validate_now: bool) {
        self.dispatch(FormAction::SetFieldValue {
            name: name.to_string(),
            value,
            validate: validate_now,
        });
    }

    pub fn handle_blur(&mut self, name: &str) {
        self.dispatch(FormAction::Blur {
            name: name.to_string(),
        });
    }

    /// Validates everything and calls the submit handler when no errors
    /// remain. Returns whether the handler ran.
    pub fn handle_submit(&mut self) -> bool {
        self.dispatch(FormAction::Submit)
    }

    pub fn reset(&mut self) {
        self.dispatch(FormAction::Reset);
    }

    pub fn register(&self, name: &str) -> FieldBinding {
        FieldBinding {
            name: name.to_string(),
            value: self.state.values.get(name).cloned(),
            error: self.state.errors.get(name).cloned(),
            touched: self.state.touched.contains(name),
        }
    }

    /// Applies one action. Returns `true` when it was a submit that reached
    /// the submit handler.
    pub fn dispatch(&mut self, action: FormAction) -> bool {
        let is_submit = matches!(action, FormAction::Submit);
        if is_submit {
            tracing::debug!(submit_count = self.state.submit_count, "submit triggered");
            self.state.is_submitting = true;
        }

        let transition = {
            let validate = |values: &FormData| self.run_validation(values);
            let env = FormEnv {
                mode: self.options.mode,
                initial_values: &self.initial_values,
                validate: &validate,
            };
            reduce(&self.state, action, &env)
        };
        self.state = transition.state;

        let delivered = match transition.submitted {
            Some(values) => {
                if let Some(handler) = self.on_submit.as_mut() {
                    handler(&values);
                }
                true
            }
            None => {
                if is_submit {
                    tracing::warn!(
                        errors = self.state.errors.len(),
                        fields = ?self.state.errors.keys().collect::<Vec<_>>(),
                        "submit blocked by validation errors"
                    );
                }
                false
            }
        };

        self.state.is_submitting = false;
        delivered
    }

    fn run_validation(&self, values: &FormData) -> ErrorMap {
        let mut errors = match &self.compiled {
            Some(compiled) if self.options.skip_hidden_fields => {
                compiled.validate_visible(values, self.options.operator_mode)
            }
            Some(compiled) => compiled.validate_all(values),
            None => ErrorMap::new(),
        };

        if let Some(external) = &self.external {
            match external.validate(values) {
                Ok(extra) => errors.extend(extra),
                Err(error) => {
                    tracing::error!(%error, "external validator failed; ignoring its result");
                }
            }
        }

        errors
    }
}
