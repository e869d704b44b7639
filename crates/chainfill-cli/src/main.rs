use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chainfill_config::{load_for_workspace, ChainfillConfig};
use chainfill_format::ChainFormatter;
use chainfill_refactor::{CompleteBuilderMethods, Document, InvokeOutcome};
use chainfill_syntax::{parse_java, NodeId, TextSize};
use chainfill_types::TypeTable;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "chainfill", version, about = "Complete builder method chains in Java sources")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Append every public builder method to the construction at an offset
    Complete(CompleteArgs),
    /// Report whether completion applies at an offset
    Available(TargetArgs),
    /// Print the parse tree and parse errors of a file
    Parse(ParseArgs),
}

#[derive(Args)]
struct TargetArgs {
    /// Java source file
    file: PathBuf,
    /// Byte offset of the cursor
    #[arg(long)]
    offset: u32,
    /// Extra Java sources (files or directories) declaring builder types
    #[arg(long = "types", value_name = "PATH")]
    types: Vec<PathBuf>,
    /// Config file (defaults to discovery from the file's directory)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args)]
struct CompleteArgs {
    #[command(flatten)]
    target: TargetArgs,
    /// Rewrite the file in place instead of printing the result
    #[arg(long)]
    write: bool,
    /// Emit JSON suitable for editor integrations
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ParseArgs {
    /// Java source file
    file: PathBuf,
}

#[derive(Serialize)]
struct CompleteReport {
    applied: bool,
    calls: usize,
    terminated: bool,
    text: String,
}

fn main() {
    let cli = Cli::parse();
    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            2
        }
    };

    std::process::exit(exit_code);
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Command::Complete(args) => complete(args),
        Command::Available(args) => {
            let session = Session::open(&args, true)?;
            let available = session.action.is_available(&session.document, session.anchor);
            println!("{available}");
            Ok(if available { 0 } else { 1 })
        }
        Command::Parse(args) => {
            let text = read_source(&args.file)?;
            let result = parse_java(&text);
            print!("{}", result.tree.debug_dump(result.tree.root()));
            for error in &result.errors {
                eprintln!(
                    "{}:{}: {}",
                    args.file.display(),
                    u32::from(error.range.start()),
                    error.message
                );
            }
            Ok(if result.errors.is_empty() { 0 } else { 1 })
        }
    }
}

fn complete(args: CompleteArgs) -> Result<i32> {
    let writable = !args.write || !is_read_only(&args.target.file)?;
    let mut session = Session::open(&args.target, writable)?;
    let outcome = session
        .action
        .invoke(&mut session.document, session.anchor)
        .with_context(|| format!("failed to complete {}", args.target.file.display()))?;

    let (applied, calls, terminated) = match outcome {
        InvokeOutcome::Completed {
            calls, terminated, ..
        } => (true, calls, terminated),
        InvokeOutcome::NotApplicable => (false, 0, false),
        InvokeOutcome::ReadOnly => bail!("{} is read-only", args.target.file.display()),
    };
    let text = session.document.text();

    if args.write && applied {
        std::fs::write(&args.target.file, &text)
            .with_context(|| format!("failed to write {}", args.target.file.display()))?;
    }
    if args.json {
        let report = CompleteReport {
            applied,
            calls,
            terminated,
            text,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if !args.write {
        print!("{text}");
    } else if !applied {
        eprintln!("no builder construction at offset {}", args.target.offset);
    }
    Ok(if applied { 0 } else { 1 })
}

struct Session {
    action: CompleteBuilderMethods<TypeTable>,
    document: Document,
    anchor: NodeId,
}

impl Session {
    fn open(args: &TargetArgs, writable: bool) -> Result<Self> {
        let config = load_config(args)?;
        chainfill_config::init_tracing(&config.logging);

        let text = read_source(&args.file)?;
        let mut types = TypeTable::new();
        types.add_java_source(&text);
        for path in &args.types {
            add_type_sources(&mut types, path)?;
        }
        tracing::debug!(target: "chainfill.cli", types = types.len(), "indexed type declarations");

        let document = Document::parse(&text).with_writable(writable);
        let anchor = document
            .tree()
            .anchor_at(TextSize::from(args.offset))
            .with_context(|| {
                format!(
                    "offset {} is outside of {} ({} bytes)",
                    args.offset,
                    args.file.display(),
                    text.len()
                )
            })?;

        let action =
            CompleteBuilderMethods::with_formatter(types, ChainFormatter::new(config.format));
        Ok(Self {
            action,
            document,
            anchor,
        })
    }
}

fn load_config(args: &TargetArgs) -> Result<ChainfillConfig> {
    if let Some(path) = &args.config {
        return ChainfillConfig::load_from_path(path)
            .with_context(|| format!("failed to load config {}", path.display()));
    }
    let root = args
        .file
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let (config, _) = load_for_workspace(root)?;
    Ok(config)
}

fn add_type_sources(types: &mut TypeTable, path: &Path) -> Result<()> {
    if path.is_dir() {
        for entry in walkdir::WalkDir::new(path).sort_by_file_name() {
            let entry = entry.with_context(|| format!("failed to walk {}", path.display()))?;
            let is_java = entry.path().extension().is_some_and(|ext| ext == "java");
            if entry.file_type().is_file() && is_java {
                types.add_java_source(&read_source(entry.path())?);
            }
        }
    } else {
        types.add_java_source(&read_source(path)?);
    }
    Ok(())
}

fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn is_read_only(path: &Path) -> Result<bool> {
    let metadata =
        std::fs::metadata(path).with_context(|| format!("failed to stat {}", path.display()))?;
    Ok(metadata.permissions().readonly())
}
