use std::cell::RefCell;
use std::rc::Rc;

use serde_json::{Value, json};

use form_spec::{
    ErrorMap, ExternalValidationError, FieldSchema, FieldType, FormController, FormData,
    FormOptions, FormSchema, RuleKind, ValidationMode, ValidationRule,
};

fn signup() -> FormSchema {
    serde_json::from_str(include_str!("fixtures/signup_form.json")).expect("deserialize")
}

fn one_required(name: &str) -> FormSchema {
    FormSchema::new(vec![
        FieldSchema::new("f1", name, FieldType::Text, "Field")
            .with_rule(ValidationRule::new(RuleKind::Required)),
    ])
}

fn options(mode: ValidationMode) -> FormOptions {
    FormOptions {
        mode,
        ..Default::default()
    }
}

type Submissions = Rc<RefCell<Vec<FormData>>>;

fn recording(schema: &FormSchema, mode: ValidationMode) -> (FormController, Submissions) {
    let submissions: Submissions = Rc::default();
    let sink = Rc::clone(&submissions);
    let controller = FormController::new(schema, options(mode))
        .expect("compile")
        .on_submit(move |values| sink.borrow_mut().push(values.clone()));
    (controller, submissions)
}

#[test]
fn on_change_mode_revalidates_synchronously() {
    let schema = FormSchema::new(vec![
        FieldSchema::new("f1", "x", FieldType::Text, "X")
            .with_rule(ValidationRule::new(RuleKind::MinLength).with_value(3)),
    ]);
    let (mut form, _) = recording(&schema, ValidationMode::OnChange);

    form.set_field_value("x", json!("ab"), false);
    assert_eq!(form.errors()["x"], "Min length is 3");

    form.set_field_value("x", json!("abc"), false);
    assert!(!form.errors().contains_key("x"));
}

#[test]
fn on_submit_mode_defers_validation_unless_asked() {
    let (mut form, _) = recording(&one_required("x"), ValidationMode::OnSubmit);

    form.set_field_value("x", json!(""), false);
    assert!(form.errors().is_empty());
    assert!(form.touched().contains("x"));

    form.set_field_value("x", json!(""), true);
    assert_eq!(form.errors()["x"], "Required");
}

#[test]
fn change_revalidates_the_whole_form() {
    let schema = FormSchema::new(vec![
        FieldSchema::new("a", "a", FieldType::Text, "A")
            .with_rule(ValidationRule::new(RuleKind::Required)),
        FieldSchema::new("b", "b", FieldType::Text, "B"),
    ]);
    let (mut form, _) = recording(&schema, ValidationMode::OnChange);

    form.set_field_value("b", json!("anything"), false);
    assert_eq!(form.errors()["a"], "Required");
    assert!(!form.touched().contains("a"));
}

#[test]
fn blur_marks_touched_and_validates_in_blur_mode() {
    let (mut form, _) = recording(&one_required("x"), ValidationMode::OnBlur);
    form.handle_blur("x");
    assert!(form.touched().contains("x"));
    assert_eq!(form.errors()["x"], "Required");

    let (mut quiet, _) = recording(&one_required("x"), ValidationMode::OnSubmit);
    quiet.handle_blur("x");
    assert!(quiet.errors().is_empty());
}

#[test]
fn submit_blocked_then_unblocked() {
    let (mut form, submissions) = recording(&one_required("x"), ValidationMode::OnSubmit);

    assert!(!form.handle_submit());
    assert!(submissions.borrow().is_empty());
    assert_eq!(form.errors().len(), 1);
    assert_eq!(form.submit_count(), 1);
    assert!(form.touched().contains("x"));
    assert!(form.is_submitted());
    assert!(!form.is_submitting());

    form.set_field_value("x", json!("done"), false);
    assert!(form.handle_submit());

    let submissions = submissions.borrow();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0]["x"], json!("done"));
    assert_eq!(form.submit_count(), 2);
    assert!(form.errors().is_empty());
}

#[test]
fn blocked_submit_keeps_values() {
    let (mut form, _) = recording(&signup(), ValidationMode::OnSubmit);
    form.set_field_value("account.username", json!("x"), false);
    let before = form.values().clone();
    assert!(!form.handle_submit());
    assert_eq!(form.values(), &before);
}

#[test]
fn defaults_seed_values_and_supplied_initials_override() {
    let mut opts = options(ValidationMode::OnSubmit);
    opts.initial_values = json!({ "profile.role": "designer", "account.username": "ada" })
        .as_object()
        .cloned()
        .expect("object");
    let form = FormController::new(&signup(), opts).expect("compile");

    assert_eq!(form.value("profile.role"), Some(&json!("designer")));
    assert_eq!(form.value("prefs.newsletter"), Some(&json!(false)));
    assert_eq!(form.value("account.username"), Some(&json!("ada")));
    assert_eq!(form.value("account.email"), None);
}

#[test]
fn reset_restores_initial_state() {
    let (mut form, _) = recording(&signup(), ValidationMode::OnChange);
    let initial = form.values().clone();

    form.set_field_value("profile.role", json!("other"), false);
    form.handle_blur("account.email");
    form.handle_submit();
    assert!(!form.errors().is_empty());

    form.reset();
    assert_eq!(form.values(), &initial);
    assert!(form.errors().is_empty());
    assert!(form.touched().is_empty());
    assert_eq!(form.submit_count(), 0);
    assert!(!form.is_submitted());
}

#[test]
fn external_validator_overrides_and_failures_are_ignored() {
    let schema = one_required("x");
    let external = |values: &FormData| -> Result<ErrorMap, ExternalValidationError> {
        match values.get("x") {
            Some(Value::String(text)) if text == "boom" => {
                Err(ExternalValidationError::new("lookup service down"))
            }
            Some(Value::String(text)) if text == "taken" => {
                Ok(ErrorMap::from([("x".to_string(), "Already taken".to_string())]))
            }
            _ => Ok(ErrorMap::new()),
        }
    };
    let mut form = FormController::new(&schema, options(ValidationMode::OnChange))
        .expect("compile")
        .with_external_validator(external);

    form.set_field_value("x", json!("taken"), false);
    assert_eq!(form.errors()["x"], "Already taken");

    form.set_field_value("x", json!("boom"), false);
    assert!(form.errors().is_empty());

    form.set_field_value("x", json!(""), false);
    assert_eq!(form.errors()["x"], "Required");
}

#[test]
fn skip_hidden_fields_ignores_rule_hidden_requirements() {
    let mut opts = options(ValidationMode::OnSubmit);
    opts.skip_hidden_fields = true;
    let mut form = FormController::new(&signup(), opts).expect("compile");
    form.set_field_value("account.username", json!("ada_l"), false);
    form.set_field_value("account.email", json!("ada@example.com"), false);

    assert!(form.handle_submit());

    form.set_field_value("profile.role", json!("other"), false);
    assert!(!form.handle_submit());
    assert_eq!(form.errors()["profile.otherRole"], "Tell us your role");
}

#[test]
fn field_binding_round_trips_through_the_controller() {
    let (mut form, _) = recording(&one_required("x"), ValidationMode::OnChange);
    let binding = form.register("x");
    assert_eq!(binding.name, "x");
    assert_eq!(binding.value, None);
    assert_eq!(binding.shown_error(), None);

    binding.change(&mut form, json!(""));
    let binding = form.register("x");
    assert_eq!(binding.value, Some(json!("")));
    assert_eq!(binding.shown_error(), Some("Required"));

    binding.change(&mut form, json!("ok"));
    binding.blur(&mut form);
    let binding = form.register("x");
    assert!(binding.touched);
    assert_eq!(binding.error, None);
}

#[test]
fn versions_advance_per_operation() {
    let (mut form, _) = recording(&one_required("x"), ValidationMode::OnSubmit);
    assert_eq!(form.state().version, 0);
    form.set_field_value("x", json!("a"), false);
    form.handle_blur("x");
    form.handle_submit();
    form.reset();
    assert_eq!(form.state().version, 4);
}

#[test]
fn options_deserialize_with_defaults() {
    let opts: FormOptions = serde_json::from_value(json!({
        "mode": "onBlur",
        "initialValues": { "x": 1 }
    }))
    .expect("deserialize");
    assert_eq!(opts.mode, ValidationMode::OnBlur);
    assert_eq!(opts.initial_values["x"], json!(1));
    assert!(!opts.skip_hidden_fields);
}
