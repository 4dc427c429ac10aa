mod test_runner;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, anyhow, bail};
use clap::{Parser, Subcommand};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};

use converter::{Config, Conversion, Converter};
use manuscript::Document;
use manuscript::reader::{self, InputFormat};

const SUBCOMMANDS: &[&str] = &["convert", "test", "help"];

/// Options that take the next argument as their value.
const VALUE_OPTIONS: &[&str] = &["-o", "--output", "-c", "--config"];

#[derive(Parser)]
#[command(
    name = "doc2rpy",
    version,
    about = "Convert styled manuscripts into Ren'Py scripts"
)]
struct Cli {
    /// Disable colored diagnostics
    #[arg(long, global = true)]
    no_color: bool,

    /// Log every conversion stage to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a .docx or markdown manuscript
    Convert(ConvertArgs),

    /// Run .test.md fixture files
    Test(TestArgs),
}

#[derive(clap::Args)]
struct ConvertArgs {
    /// Manuscript to convert (.docx, .md, .markdown)
    input: PathBuf,

    /// Output script path (same as -o)
    #[arg(conflicts_with = "output")]
    target: Option<PathBuf>,

    /// Output script path; the script goes to stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// TOML file with style rules and script options
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Fail when any warning was reported
    #[arg(long)]
    strict: bool,
}

#[derive(clap::Args)]
struct TestArgs {
    /// Path to a .test.md file or directory containing them
    path: String,

    /// Run only tests in these categories (subfolder names). Repeatable.
    #[arg(short = 'C', long)]
    category: Vec<String>,

    /// List available categories and exit
    #[arg(long)]
    list_categories: bool,
}

fn main() {
    // `doc2rpy in.docx out.rpy` works like `doc2rpy convert in.docx out.rpy`.
    // The subcommand goes first so options given before the input still
    // reach `convert`.
    let mut args: Vec<String> = std::env::args().collect();
    if let Some(pos) = first_positional(&args) {
        if !SUBCOMMANDS.contains(&args[pos].as_str()) {
            args.insert(1, "convert".to_string());
        }
    }

    let cli = Cli::parse_from(&args);
    init_tracing(cli.verbose);

    let exit_code = match cli.command {
        Command::Convert(convert_args) => match do_convert(&convert_args, cli.no_color) {
            Ok(code) => code,
            Err(error) => {
                eprintln!("conversion failed: {:#}", error);
                1
            }
        },
        Command::Test(test_args) => {
            let path = Path::new(&test_args.path);
            if test_args.list_categories {
                test_runner::list_categories(path);
                return;
            }
            test_runner::run_tests(path, cli.no_color, &test_args.category)
        }
    };
    process::exit(exit_code);
}

/// Index of the first argument that is neither an option nor an option's
/// value. A `--` separator counts as positional.
fn first_positional(args: &[String]) -> Option<usize> {
    let mut takes_value = false;
    for (i, arg) in args.iter().enumerate().skip(1) {
        if takes_value {
            takes_value = false;
        } else if arg == "--" || !arg.starts_with('-') {
            return Some(i);
        } else {
            takes_value = VALUE_OPTIONS.contains(&arg.as_str());
        }
    }
    None
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn do_convert(args: &ConvertArgs, no_color: bool) -> anyhow::Result<i32> {
    let input = &args.input;
    if !input.is_file() {
        bail!("input file '{}' does not exist", input.display());
    }
    let format = InputFormat::from_path(input).ok_or_else(|| {
        anyhow!(
            "unsupported input '{}': expected a .docx, .md or .markdown file",
            input.display()
        )
    })?;

    let config = load_config(args.config.as_deref())?;
    let converter = Converter::new(config)?;

    let bytes =
        std::fs::read(input).with_context(|| format!("cannot read '{}'", input.display()))?;
    let document = reader::read(format, bytes)
        .with_context(|| format!("cannot read manuscript '{}'", input.display()))?;
    tracing::debug!(blocks = document.len(), ?format, "read manuscript");

    let conversion = converter.convert(&document)?;
    emit_diagnostics(input, &document, &conversion, no_color);

    if args.strict && conversion.has_warnings() {
        eprintln!(
            "error: {} warning(s) reported and --strict is set",
            conversion.diagnostics.len()
        );
        return Ok(1);
    }

    match args.output.as_ref().or(args.target.as_ref()) {
        Some(path) => {
            std::fs::write(path, &conversion.script)
                .with_context(|| format!("cannot write '{}'", path.display()))?;
            eprintln!("Conversion successful: {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(conversion.script.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(0)
}

/// Default configuration, or the TOML file at `path`.
fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read config '{}'", path.display()))?;
    Config::from_toml(&source).with_context(|| format!("in config '{}'", path.display()))
}

fn emit_diagnostics(input: &Path, document: &Document, conversion: &Conversion, no_color: bool) {
    let color_choice = if no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };
    let writer = StandardStream::stderr(color_choice);
    let config = term::Config::default();

    let mut files = SimpleFiles::new();
    let file_id = files.add(input.display().to_string(), document.source.clone());

    for diagnostic in &conversion.diagnostics {
        let report = diagnostic.to_diagnostic(file_id, document);
        let _ = term::emit_to_write_style(&mut writer.lock(), &config, &files, &report);
    }
}
