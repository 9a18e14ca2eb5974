use std::fs;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use param_tree_core::{ParamTree, TraceAction, TraceEvent};
use tracing_subscriber::EnvFilter;

/// Output format for the `parse` and `show` subcommands.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Json,
    Listing,
}

#[derive(Debug, Parser)]
#[command(name = "param-inspect")]
#[command(about = "Inspect, ingest, and check typed parameter trees")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Ingest command line tokens into a tree and print it.
    Parse(ParseArgs),
    /// Print a tree stored as JSON as a section-aware listing.
    Show(ShowArgs),
    /// Check a tree against a defaults tree and report mismatches.
    Check(CheckArgs),
}

#[derive(Debug, Args)]
struct ParseArgs {
    /// Path prefix the ingested flags are stored under.
    #[arg(long, default_value = "")]
    prefix: String,
    /// Output format (default: json).
    #[arg(long, default_value = "json")]
    format: OutputFormat,
    /// Tokens to ingest, e.g. `-- -in a.raw -out b.txt`.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    tokens: Vec<String>,
}

#[derive(Debug, Args)]
struct ShowArgs {
    /// JSON file holding the tree.
    #[arg(long)]
    input: PathBuf,
    /// Only show the subtree at this section path.
    #[arg(long)]
    section: Option<String>,
    /// Output format (default: listing).
    #[arg(long, default_value = "listing")]
    format: OutputFormat,
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// JSON file holding the tree to check.
    #[arg(long)]
    input: PathBuf,
    /// JSON file holding the defaults tree.
    #[arg(long)]
    defaults: PathBuf,
    /// Tool name used in warning messages.
    #[arg(long, default_value = "tool")]
    tool: String,
    /// Defaults-side path prefix.
    #[arg(long, default_value = "")]
    prefix: String,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Parse(args) => run_parse(args),
        Command::Show(args) => run_show(args),
        Command::Check(args) => run_check(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run_parse(args: ParseArgs) -> Result<(), String> {
    let mut tree = ParamTree::new();
    // parse_command_line skips the program token; supply one for the raw
    // token list given on our own command line.
    let argv = std::iter::once("param-inspect".to_string()).chain(args.tokens);
    tree.parse_command_line(argv, &args.prefix);

    print!("{}", render_tree(&tree, args.format)?);
    Ok(())
}

fn run_show(args: ShowArgs) -> Result<(), String> {
    let tree = load_tree(&args.input)?;
    let tree = match &args.section {
        Some(section) => {
            if !tree.has_section(section) {
                return Err(format!("no section '{section}' in {}", args.input.display()));
            }
            tree.copy_subtree(section, false)
        }
        None => tree,
    };

    print!("{}", render_tree(&tree, args.format)?);
    Ok(())
}

fn run_check(args: CheckArgs) -> Result<(), String> {
    let tree = load_tree(&args.input)?;
    let defaults = load_tree(&args.defaults)?;

    let warnings = tree.check_defaults(&args.tool, &defaults, &args.prefix);
    if warnings.is_empty() {
        println!("OK: {} parameters checked", tree.size());
        return Ok(());
    }
    for warning in &warnings {
        println!("{warning}");
    }
    Err(format!("{} problem(s) found", warnings.len()))
}

fn load_tree(path: &PathBuf) -> Result<ParamTree, String> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    let tree: ParamTree =
        serde_json::from_str(&text).map_err(|e| format!("failed to parse {}: {e}", path.display()))?;
    tracing::debug!(path = %path.display(), entries = tree.size(), "loaded parameter tree");
    Ok(tree)
}

fn render_tree(tree: &ParamTree, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(tree)
            .map(|s| format!("{s}\n"))
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Listing => Ok(render_listing(tree)),
    }
}

/// Renders a section-aware listing driven purely by the iterator trace.
fn render_listing(tree: &ParamTree) -> String {
    let mut out = String::new();
    let mut depth = 0usize;
    let mut iter = tree.iter();

    for visited in iter.by_ref() {
        emit_boundaries(&mut out, &mut depth, &visited.trace);
        out.push_str(&"  ".repeat(depth));
        out.push_str(&format!(
            "{} = {}",
            visited.entry.name,
            visited.entry.value.to_display_string(true)
        ));
        if !visited.entry.description.is_empty() {
            out.push_str(&format!("  # {}", visited.entry.description));
        }
        out.push('\n');
    }
    emit_boundaries(&mut out, &mut depth, iter.closing_trace());

    out
}

fn emit_boundaries(out: &mut String, depth: &mut usize, events: &[TraceEvent]) {
    for event in events {
        match event.action {
            TraceAction::Opened => {
                out.push_str(&"  ".repeat(*depth));
                out.push_str(&event.name);
                if !event.description.is_empty() {
                    out.push_str(&format!("  # {}", event.description));
                }
                out.push('\n');
                *depth += 1;
            }
            TraceAction::Closed => {
                *depth -= 1;
            }
        }
    }
}
