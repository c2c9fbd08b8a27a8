use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::{json, Value};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

use cfxml::ops::{self, command_interface, CommandInterface, InterfaceOp};
use cfxml::report::{self, DEFAULT_LIMIT};
use cfxml::{ChildObjectKind, Document, EditSummary, FormPurpose, WriteConfig};

#[derive(Debug, Parser)]
#[command(
    name = "cfxml",
    version,
    about = "Edit 1C:Enterprise configuration dump XML without reformatting it"
)]
struct Cli {
    /// Print the edited document to stdout instead of saving it
    #[arg(long, global = true)]
    no_write: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Edit a CommandInterface.xml file
    Interface(InterfaceArgs),
    /// Register or remove forms, templates, attributes and other child objects
    #[command(subcommand)]
    Child(ChildCommand),
    /// Edit subsystem content and nested subsystems
    Subsystem(SubsystemArgs),
    /// Set an object property
    Property(PropertyArgs),
    /// Show an outline of a dump file
    Info(InfoArgs),
    /// Verify that a file is written back byte for byte
    Check(CheckArgs),
}

#[derive(Debug, Args)]
struct InterfaceArgs {
    /// Path to CommandInterface.xml
    path: PathBuf,
    /// hide, show, place, order, subsystem-order or group-order
    #[arg(long, required_unless_present = "definition")]
    operation: Option<String>,
    /// Command name, JSON array or JSON object, depending on the operation
    #[arg(long, default_value = "")]
    value: String,
    /// JSON file with one operation or an array of operations
    #[arg(long, conflicts_with = "operation")]
    definition: Option<PathBuf>,
    /// Start from an empty command interface when the file does not exist
    #[arg(long)]
    create_if_missing: bool,
}

#[derive(Debug, Subcommand)]
enum ChildCommand {
    /// Register a child object
    Add(ChildArgs),
    /// Remove a child object and clear properties that refer to it
    Remove(ChildArgs),
}

#[derive(Debug, Args)]
struct ChildArgs {
    /// Path to the object's XML file
    path: PathBuf,
    /// Form, Template, Command, Attribute, ...
    #[arg(long)]
    kind: ChildObjectKind,
    #[arg(long)]
    name: String,
    /// Form purpose: object, list, choice or record
    #[arg(long)]
    purpose: Option<FormPurpose>,
    /// Make the form the default for its purpose
    #[arg(long)]
    set_default: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SubsystemAction {
    AddContent,
    RemoveContent,
    AddChild,
    RemoveChild,
}

#[derive(Debug, Args)]
struct SubsystemArgs {
    /// Path to the subsystem's XML file
    path: PathBuf,
    #[arg(value_enum)]
    action: SubsystemAction,
    /// Object references (Catalog.Goods) or subsystem names
    #[arg(required = true)]
    values: Vec<String>,
}

#[derive(Debug, Args)]
struct PropertyArgs {
    path: PathBuf,
    #[arg(long)]
    name: String,
    /// New value; list properties take `;;`-separated values
    #[arg(long, allow_hyphen_values = true)]
    value: String,
}

#[derive(Debug, Args)]
struct InfoArgs {
    path: PathBuf,
    /// Lines to show, 0 for all
    #[arg(long, default_value_t = DEFAULT_LIMIT)]
    limit: usize,
    #[arg(long, default_value_t = 0)]
    offset: usize,
}

#[derive(Debug, Args)]
struct CheckArgs {
    path: PathBuf,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();

    if let Err(e) = run(Cli::parse()) {
        error!("{e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Interface(args) => interface(args, cli.no_write),
        Command::Child(command) => child(command, cli.no_write),
        Command::Subsystem(args) => subsystem(args, cli.no_write),
        Command::Property(args) => property(args, cli.no_write),
        Command::Info(args) => show_info(&args),
        Command::Check(args) => check(&args.path),
    }
}

fn interface(args: InterfaceArgs, no_write: bool) -> Result<()> {
    let operations = match &args.definition {
        Some(file) => read_definition(file)?,
        None => {
            let operation = args.operation.as_deref().unwrap_or_default();
            vec![interface_op(operation, Value::String(args.value.clone()))?]
        }
    };

    let created = args.create_if_missing && !args.path.exists();
    let mut doc = if created {
        info!("Creating {}", args.path.display());
        cfxml::from_str(&command_interface::empty_document_source())?
    } else {
        load(&args.path)?
    };

    let mut summary = EditSummary::default();
    let mut ci = CommandInterface::new(&mut doc)?;
    for op in &operations {
        summary += ci.apply(op)?;
    }
    finish(&doc, &args.path, no_write, summary, created)
}

fn read_definition(path: &Path) -> Result<Vec<InterfaceOp>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read definition file {}", path.display()))?;
    let parsed: Value = serde_json::from_str(text.trim_start_matches('\u{feff}'))
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    let entries = match parsed {
        Value::Array(entries) => entries,
        single => vec![single],
    };
    entries
        .into_iter()
        .map(|mut entry| {
            let operation = entry
                .get("operation")
                .and_then(Value::as_str)
                .map(str::to_string)
                .context("definition entry without \"operation\"")?;
            let value = entry
                .get_mut("value")
                .map(Value::take)
                .unwrap_or_else(|| Value::String(String::new()));
            interface_op(&operation, value)
        })
        .collect()
}

/// Build an operation from its name and a value given as text or JSON.
///
/// `hide`/`show` accept a single command name or a JSON array; the other
/// operations take JSON.
fn interface_op(operation: &str, value: Value) -> Result<InterfaceOp> {
    let value = match (operation, value) {
        ("hide" | "show", Value::String(raw)) => command_list(&raw)?,
        (_, Value::String(raw)) => serde_json::from_str(&raw)
            .with_context(|| format!("{operation}: value is not valid JSON"))?,
        (_, value) => value,
    };
    serde_json::from_value(json!({ "operation": operation, "value": value }))
        .with_context(|| format!("invalid operation: {operation}"))
}

fn command_list(raw: &str) -> Result<Value> {
    let raw = raw.trim();
    if raw.starts_with('[') {
        return serde_json::from_str(raw).context("command list is not valid JSON");
    }
    if raw.is_empty() {
        return Ok(Value::Array(Vec::new()));
    }
    Ok(json!([raw]))
}

fn child(command: ChildCommand, no_write: bool) -> Result<()> {
    let (args, adding) = match command {
        ChildCommand::Add(args) => (args, true),
        ChildCommand::Remove(args) => (args, false),
    };
    let mut doc = load(&args.path)?;
    let summary = if !adding {
        ops::unregister_child(&mut doc, args.kind, &args.name)?
    } else if args.kind == ChildObjectKind::Form {
        let purpose = args.purpose.unwrap_or_default();
        ops::add_form(&mut doc, &args.name, purpose, args.set_default)?
    } else {
        if args.purpose.is_some() || args.set_default {
            warn!("--purpose and --set-default apply to forms only");
        }
        ops::register_child(&mut doc, args.kind, &args.name)?
    };
    finish(&doc, &args.path, no_write, summary, false)
}

fn subsystem(args: SubsystemArgs, no_write: bool) -> Result<()> {
    let mut doc = load(&args.path)?;
    let summary = match args.action {
        SubsystemAction::AddContent => ops::add_content(&mut doc, &args.values)?,
        SubsystemAction::RemoveContent => ops::remove_content(&mut doc, &args.values)?,
        SubsystemAction::AddChild => {
            let mut summary = EditSummary::default();
            for name in &args.values {
                summary += ops::add_child_subsystem(&mut doc, name)?;
            }
            summary
        }
        SubsystemAction::RemoveChild => {
            let mut summary = EditSummary::default();
            for name in &args.values {
                summary += ops::remove_child_subsystem(&mut doc, name)?;
            }
            summary
        }
    };
    finish(&doc, &args.path, no_write, summary, false)
}

fn property(args: PropertyArgs, no_write: bool) -> Result<()> {
    let mut doc = load(&args.path)?;
    let summary = ops::set_property(&mut doc, &args.name, &args.value)?;
    finish(&doc, &args.path, no_write, summary, false)
}

fn show_info(args: &InfoArgs) -> Result<()> {
    let doc = load(&args.path)?;
    let lines = report::outline(&doc);
    let mut page = report::paginate(&lines, args.limit, args.offset);
    page.push('\n');
    io::stdout()
        .write_all(page.as_bytes())
        .context("failed to write stdout")
}

fn check(path: &Path) -> Result<()> {
    let original = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let doc = load(path)?;

    if cfxml::to_string(&doc).as_bytes() == original.as_slice() {
        info!("Round-trip OK: {}", path.display());
        return Ok(());
    }

    let verbatim = cfxml::to_string_with(&doc, &WriteConfig::verbatim());
    let source = original.strip_prefix("\u{feff}".as_bytes()).unwrap_or(&original);
    if verbatim.as_bytes() == source {
        warn!(
            "{} round-trips, but saving will apply dump conventions (BOM, declaration, CRLF)",
            path.display()
        );
        return Ok(());
    }

    let offset = verbatim
        .bytes()
        .zip(source.iter())
        .position(|(a, &b)| a != b)
        .unwrap_or_else(|| verbatim.len().min(source.len()));
    bail!("{}: written output differs at byte {offset}", path.display())
}

fn load(path: &Path) -> Result<Document> {
    cfxml::load(path).with_context(|| format!("failed to load {}", path.display()))
}

fn finish(
    doc: &Document,
    path: &Path,
    no_write: bool,
    summary: EditSummary,
    created: bool,
) -> Result<()> {
    if no_write {
        io::stdout()
            .write_all(cfxml::to_string(doc).as_bytes())
            .context("failed to write stdout")?;
    } else if summary.is_empty() && !created {
        info!("No changes");
    } else {
        if created {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
        }
        cfxml::save(doc, path).with_context(|| format!("failed to save {}", path.display()))?;
        info!("Saved: {}", path.display());
    }
    info!("{summary}");
    Ok(())
}
