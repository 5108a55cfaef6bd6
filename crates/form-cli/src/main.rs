use clap::{Parser, Subcommand};
use form_spec::{
    CompiledSchema, FormAction, FormController, FormData, FormOptions, FormSchema, OperatorMode,
    answers_schema, compile, compile_strict, fields_to_clear, initial_values, is_disabled,
    resolve_visibility,
};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

const LOG_ENV: &str = "FORMSTACK_LOG";

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Form schema helper",
    long_about = "Checks form schemas, validates form data, evaluates visibility rules and replays form sessions"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile a schema and report authoring problems.
    Check {
        /// Path to the FormSchema JSON.
        #[arg(long, value_name = "SCHEMA")]
        schema: PathBuf,
        /// Treat duplicate field names as errors.
        #[arg(long)]
        strict: bool,
    },
    /// Validate form data against a schema.
    Validate {
        /// Path to the FormSchema JSON.
        #[arg(long, value_name = "SCHEMA")]
        schema: PathBuf,
        /// Path to a flat JSON object of field values.
        #[arg(long, value_name = "DATA")]
        data: PathBuf,
        /// Validate a single field instead of the whole form.
        #[arg(long, value_name = "NAME")]
        field: Option<String>,
        /// Skip fields hidden by their visibility rules.
        #[arg(long)]
        visible_only: bool,
        /// Evaluate contains/gt/lt visibility operators.
        #[arg(long, requires = "visible_only")]
        extended: bool,
    },
    /// Print visibility, disabled and clear-value state for form data.
    Visibility {
        /// Path to the FormSchema JSON.
        #[arg(long, value_name = "SCHEMA")]
        schema: PathBuf,
        /// Path to a flat JSON object of field values.
        #[arg(long, value_name = "DATA")]
        data: PathBuf,
        /// Evaluate contains/gt/lt visibility operators.
        #[arg(long)]
        extended: bool,
    },
    /// Print the JSON Schema describing valid form data.
    AnswersSchema {
        /// Path to the FormSchema JSON.
        #[arg(long, value_name = "SCHEMA")]
        schema: PathBuf,
    },
    /// Print the JSON Schema of the FormSchema document format.
    ModelSchema,
    /// Replay a JSON array of form actions and print the final state.
    Replay {
        /// Path to the FormSchema JSON.
        #[arg(long, value_name = "SCHEMA")]
        schema: PathBuf,
        /// Path to a JSON array of actions.
        #[arg(long, value_name = "EVENTS")]
        events: PathBuf,
        /// Optional FormOptions JSON (mode, initialValues, ...).
        #[arg(long, value_name = "CONFIG")]
        config: Option<PathBuf>,
    },
}

fn main() -> CliResult<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Command::Check { schema, strict } => run_check(schema, strict),
        Command::Validate {
            schema,
            data,
            field,
            visible_only,
            extended,
        } => run_validate(schema, data, field, visible_only, operator_mode(extended)),
        Command::Visibility {
            schema,
            data,
            extended,
        } => run_visibility(schema, data, operator_mode(extended)),
        Command::AnswersSchema { schema } => run_answers_schema(schema),
        Command::ModelSchema => run_model_schema(),
        Command::Replay {
            schema,
            events,
            config,
        } => run_replay(schema, events, config),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn operator_mode(extended: bool) -> OperatorMode {
    if extended {
        OperatorMode::Extended
    } else {
        OperatorMode::Permissive
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> CliResult<T> {
    tracing::debug!(path = %path.display(), "reading json input");
    let raw = fs::read_to_string(path)
        .map_err(|err| format!("failed to read {}: {}", path.display(), err))?;
    serde_json::from_str(&raw)
        .map_err(|err| format!("failed to parse {}: {}", path.display(), err).into())
}

fn read_data(path: &Path) -> CliResult<FormData> {
    match read_json::<Value>(path)? {
        Value::Object(map) => Ok(map),
        other => Err(format!(
            "{} must contain a JSON object of field values, found {}",
            path.display(),
            json_kind(&other)
        )
        .into()),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn print_json(value: &Value) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run_check(schema_path: PathBuf, strict: bool) -> CliResult<()> {
    let schema: FormSchema = read_json(&schema_path)?;
    let compiled = if strict {
        compile_strict(&schema)?
    } else {
        compile(&schema)?
    };
    describe_compiled(&schema, &compiled);
    Ok(())
}

fn describe_compiled(schema: &FormSchema, compiled: &CompiledSchema) {
    println!(
        "Schema OK: {} of {} fields compiled",
        compiled.len(),
        schema.fields.len()
    );
    for duplicate in compiled.duplicate_names() {
        println!(
            "  warning: '{}' declared by '{}' and '{}'; using '{}'",
            duplicate.name, duplicate.replaced, duplicate.kept, duplicate.kept
        );
    }
}

fn run_validate(
    schema_path: PathBuf,
    data_path: PathBuf,
    field: Option<String>,
    visible_only: bool,
    mode: OperatorMode,
) -> CliResult<()> {
    let schema: FormSchema = read_json(&schema_path)?;
    let data = read_data(&data_path)?;
    let compiled = compile(&schema)?;

    if let Some(name) = field {
        if compiled.plan(&name).is_none() {
            return Err(format!("unknown field '{}'", name).into());
        }
        return match compiled.validate_field(&name, data.get(&name)) {
            Some(message) => {
                println!("{}: {}", name, message);
                Err("validation failed".into())
            }
            None => {
                println!("{}: valid", name);
                Ok(())
            }
        };
    }

    let report = compiled.report(&data, visible_only.then_some(mode));
    print_json(&serde_json::to_value(&report)?)?;
    if report.valid {
        Ok(())
    } else {
        Err("validation failed".into())
    }
}

fn run_visibility(schema_path: PathBuf, data_path: PathBuf, mode: OperatorMode) -> CliResult<()> {
    let schema: FormSchema = read_json(&schema_path)?;
    let data = read_data(&data_path)?;
    let disabled: Vec<&str> = schema
        .fields
        .iter()
        .filter(|field| is_disabled(field, &data, mode))
        .map(|field| field.id.as_str())
        .collect();

    print_json(&json!({
        "visible": resolve_visibility(&schema, &data, mode),
        "disabled": disabled,
        "clear": fields_to_clear(&schema, &data, mode),
    }))
}

fn run_answers_schema(schema_path: PathBuf) -> CliResult<()> {
    let schema: FormSchema = read_json(&schema_path)?;
    let compiled = compile(&schema)?;
    print_json(&answers_schema(&compiled))
}

fn run_model_schema() -> CliResult<()> {
    let schema = schemars::schema_for!(FormSchema);
    print_json(&serde_json::to_value(&schema)?)
}

fn run_replay(
    schema_path: PathBuf,
    events_path: PathBuf,
    config_path: Option<PathBuf>,
) -> CliResult<()> {
    let schema: FormSchema = read_json(&schema_path)?;
    let events: Vec<FormAction> = read_json(&events_path)?;
    let options: FormOptions = match config_path {
        Some(path) => read_json(&path)?,
        None => FormOptions::default(),
    };

    let compiled = Arc::new(compile(&schema)?);
    let values = initial_values(&schema, &options.initial_values);
    let submissions: Rc<RefCell<Vec<FormData>>> = Rc::default();
    let sink = Rc::clone(&submissions);
    let mut form = FormController::from_parts(Some(compiled), values, options)
        .on_submit(move |values| sink.borrow_mut().push(values.clone()));

    for event in events {
        form.dispatch(event);
    }

    let state = serde_json::to_value(form.state())?;
    let submissions = submissions.borrow().clone();
    print_json(&json!({
        "state": state,
        "isSubmitted": form.is_submitted(),
        "submissions": submissions,
    }))
}
