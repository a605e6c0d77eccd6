use crate::invoker::{CommandRunner, Invoker};
use crate::model::{
    default_features, parse_features, JobRequest, DEFAULT_FLAVOR, DEFAULT_GLYPHS,
    DEFAULT_OUTPUT_NAME, DEFAULT_SUBSETTER,
};
use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Debug, Parser, Clone)]
#[command(
    name = "fontsub",
    version,
    about = "Collect subsetting parameters and run pyftsubset"
)]
pub struct Cli {
    /// Subsetting executable: a name looked up on PATH, or a path
    #[arg(long, global = true, default_value = DEFAULT_SUBSETTER)]
    pub subsetter: String,

    #[command(subcommand)]
    pub command: Option<Mode>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Mode {
    /// Ask for each parameter on the console (default)
    Prompt,
    /// Full-screen form with file and directory pickers
    Form {
        /// Colour scheme
        #[arg(long, value_enum, default_value_t = Theme::Dark)]
        theme: Theme,

        /// Directory the pickers open in when a field gives no hint
        #[arg(long)]
        start_dir: Option<PathBuf>,
    },
    /// Subset once from flags, without prompting
    Run(RunArgs),
}

/// Colour scheme for the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

#[derive(Debug, Args, Clone)]
pub struct RunArgs {
    /// Source font
    #[arg(long)]
    pub input: PathBuf,

    /// Output directory [default: the input's directory]
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Output file name
    #[arg(long, default_value = DEFAULT_OUTPUT_NAME)]
    pub output_name: String,

    /// Characters to keep [default: ASCII letters, digits, punctuation and space]
    #[arg(long)]
    pub glyphs: Option<String>,

    /// Comma-separated layout features [default: cv11,cv02,cv03,cv04]
    #[arg(long)]
    pub features: Option<String>,

    /// Output font format
    #[arg(long, default_value = DEFAULT_FLAVOR)]
    pub flavor: String,

    /// Replace the output file if it already exists
    #[arg(long)]
    pub force: bool,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,

    /// Also write the run report as JSON to this path
    #[arg(long)]
    pub export_json: Option<PathBuf>,
}

pub fn run(args: Cli) -> Result<()> {
    let invoker = Invoker::new(args.subsetter.clone());
    match args.command.unwrap_or(Mode::Prompt) {
        Mode::Prompt => crate::prompt::run(&invoker),
        Mode::Form { theme, start_dir } => run_form(&invoker, theme, start_dir),
        Mode::Run(run_args) => run_direct(&invoker, &run_args),
    }
}

#[cfg(feature = "tui")]
fn run_form<C: CommandRunner>(
    invoker: &Invoker<C>,
    theme: Theme,
    start_dir: Option<PathBuf>,
) -> Result<()> {
    crate::tui::run(crate::tui::FormConfig { theme, start_dir }, invoker)
}

#[cfg(not(feature = "tui"))]
fn run_form<C: CommandRunner>(
    invoker: &Invoker<C>,
    _theme: Theme,
    _start_dir: Option<PathBuf>,
) -> Result<()> {
    // Fallback when built without TUI support.
    log::warn!("built without the form; falling back to prompts");
    crate::prompt::run(invoker)
}

/// Build a `JobRequest` from `run` flags.
pub fn build_request(args: &RunArgs) -> JobRequest {
    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| input_dir(&args.input));
    JobRequest {
        input_path: args.input.clone(),
        output_path: output_dir.join(&args.output_name),
        glyph_set: args
            .glyphs
            .clone()
            .unwrap_or_else(|| DEFAULT_GLYPHS.to_string()),
        layout_features: args
            .features
            .as_deref()
            .map(parse_features)
            .unwrap_or_else(default_features),
        flavor: args.flavor.clone(),
    }
}

fn input_dir(input: &Path) -> PathBuf {
    match input.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn run_direct<C: CommandRunner>(invoker: &Invoker<C>, args: &RunArgs) -> Result<()> {
    let req = build_request(args);

    if req.writes_over_input() {
        bail!(
            "output {} is the input font; choose another output name or directory",
            req.output_path.display()
        );
    }

    let report = if req.output_path.exists() {
        if !args.force {
            bail!(
                "{} already exists (pass --force to overwrite)",
                req.output_path.display()
            );
        }
        invoker.invoke_replacing(&req)?
    } else {
        invoker.invoke(&req)?
    };

    if let Some(p) = args.export_json.as_deref() {
        crate::storage::export_json(p, &report)?;
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for line in crate::text_summary::build_outcome(&Ok(report)).lines {
            println!("{line}");
        }
    }
    Ok(())
}
