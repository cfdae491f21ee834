use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{debug, info};

use hunkscan_diff::{with_shared_pool, InternPool, ParseOptions, Parser as DiffParser};
use hunkscan_types::{ConfigFile, DiffReport, OutputFormat};

mod config_loader;
mod report;

use config_loader::{default_config_text, resolve_config, DEFAULT_CONFIG_NAME};
use report::{build_report, render_name_status, render_text};

#[derive(Parser)]
#[command(name = "hunkscan")]
#[command(about = "Fast unified diff parser", long_about = None)]
struct Cli {
    /// Enable verbose (info-level) logging to stderr.
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Enable debug-level logging to stderr.
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a diff and print a report of its files, hunks and lines.
    Parse(ParseArgs),

    /// List changed files with their status, like `git diff --name-status`.
    Files(FilesArgs),

    /// Write a hunkscan.toml with every setting at its default.
    Init(InitArgs),
}

/// Where the diff bytes come from.
#[derive(Args, Debug, Clone, Default)]
struct InputArgs {
    /// Read the diff from a file; `-` reads stdin.
    #[arg(long, conflicts_with_all = ["base", "staged"])]
    diff_file: Option<PathBuf>,

    /// Diff `<base>...<head>` with git.
    #[arg(long)]
    base: Option<String>,

    /// Head ref for `--base`.
    #[arg(long, default_value = "HEAD")]
    head: String,

    /// Diff the index against HEAD (`git diff --cached`).
    #[arg(long, conflicts_with = "base")]
    staged: bool,

    /// Path to hunkscan.toml. Defaults to ./hunkscan.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Json,
    Text,
}

impl From<FormatArg> for OutputFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Text => OutputFormat::Text,
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
struct ParseArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Report format (overrides `defaults.format`).
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// Include every hunk line in the report.
    #[arg(long)]
    lines: bool,

    /// Decode paths through the process-wide intern pool.
    #[arg(long)]
    shared_pool: bool,

    /// Expected number of diff lines, used to size the arena.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    capacity_hint: Option<u64>,

    /// Write the report to a file instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, Default)]
struct FilesArgs {
    #[command(flatten)]
    input: InputArgs,
}

#[derive(Args, Debug, Clone)]
struct InitArgs {
    /// Where to write the configuration.
    #[arg(long, short = 'o', default_value = DEFAULT_CONFIG_NAME)]
    output: PathBuf,

    /// Overwrite an existing file.
    #[arg(long)]
    force: bool,
}

/// Config values with command-line flags applied on top.
#[derive(Debug, Clone, PartialEq)]
struct Settings {
    format: OutputFormat,
    include_lines: bool,
    shared_pool: bool,
    capacity_hint: Option<usize>,
    seed_paths: Vec<String>,
}

impl Settings {
    fn resolve(config: ConfigFile, args: &ParseArgs) -> Self {
        let defaults = config.defaults;
        Self {
            format: args
                .format
                .map(OutputFormat::from)
                .or(defaults.format)
                .unwrap_or(OutputFormat::Json),
            include_lines: args.lines || defaults.include_lines.unwrap_or(false),
            shared_pool: args.shared_pool || defaults.shared_pool.unwrap_or(false),
            capacity_hint: args
                .capacity_hint
                .map(|hint| usize::try_from(hint).unwrap_or(usize::MAX))
                .or(defaults.capacity_hint),
            seed_paths: config.intern.seed_paths,
        }
    }
}

fn main() -> std::process::ExitCode {
    match run_with_args(std::env::args_os()) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:?}");
            std::process::ExitCode::from(1)
        }
    }
}

fn run_with_args<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    init_logging(cli.verbose, cli.debug);

    match cli.command {
        Commands::Parse(args) => cmd_parse(args),
        Commands::Files(args) => cmd_files(args),
        Commands::Init(args) => cmd_init(args),
    }
}

fn init_logging(verbose: bool, debug: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        "warn"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    debug!("Logging initialized at level: {}", level);
}

fn cmd_parse(args: ParseArgs) -> Result<()> {
    let config = load_config(&args.input)?;
    let settings = Settings::resolve(config, &args);
    debug!("Effective settings: {:?}", settings);

    let bytes = read_input(&args.input)?;
    let report = parse_to_report(&bytes, &settings);
    info!(
        "Parsed {} file(s), {} hunk(s), {} line(s)",
        report.stats.files_found, report.stats.hunks_found, report.stats.lines_found
    );

    let rendered = match settings.format {
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(&report).context("serialize report")?;
            json.push('\n');
            json
        }
        OutputFormat::Text => render_text(&report),
    };

    match &args.out {
        Some(path) => {
            write_text(path, &rendered)?;
            info!("Wrote report to {}", path.display());
        }
        None => print_stdout(&rendered)?,
    }
    Ok(())
}

fn cmd_files(args: FilesArgs) -> Result<()> {
    let config = load_config(&args.input)?;
    let settings = Settings::resolve(config, &ParseArgs::default());

    let bytes = read_input(&args.input)?;
    let report = parse_to_report(&bytes, &settings);
    print_stdout(&render_name_status(&report))
}

fn cmd_init(args: InitArgs) -> Result<()> {
    let output_path = &args.output;

    if output_path.exists() && !args.force {
        bail!(
            "{} already exists (use --force to overwrite)",
            output_path.display()
        );
    }

    write_text(output_path, &default_config_text())?;
    println!("Created {}.", output_path.display());
    Ok(())
}

fn load_config(input: &InputArgs) -> Result<ConfigFile> {
    let cwd = std::env::current_dir().context("resolve current directory")?;
    resolve_config(input.config.as_deref(), &cwd)
}

fn parse_to_report(bytes: &[u8], settings: &Settings) -> DiffReport {
    let parser = DiffParser::new(ParseOptions {
        capacity_hint: settings.capacity_hint,
    });

    if settings.shared_pool {
        with_shared_pool(|pool| {
            for seed in &settings.seed_paths {
                pool.intern(seed);
            }
            let mut result = parser.parse(bytes, pool);
            build_report(&mut result, settings.include_lines)
        })
    } else {
        let pool = InternPool::with_seeds(settings.seed_paths.iter().cloned());
        let mut result = parser.parse(bytes, pool);
        build_report(&mut result, settings.include_lines)
    }
}

fn read_input(input: &InputArgs) -> Result<Vec<u8>> {
    match (&input.diff_file, &input.base) {
        (Some(path), _) if path.as_os_str() == "-" => read_stdin(),
        (Some(path), _) => {
            debug!("Reading diff from '{}'", path.display());
            std::fs::read(path).with_context(|| format!("read diff file {}", path.display()))
        }
        (None, Some(base)) => git_diff(base, &input.head),
        (None, None) if input.staged => git_staged_diff(),
        (None, None) => read_stdin(),
    }
}

fn read_stdin() -> Result<Vec<u8>> {
    debug!("Reading diff from stdin");
    let mut bytes = Vec::new();
    io::stdin()
        .lock()
        .read_to_end(&mut bytes)
        .context("read diff from stdin")?;
    Ok(bytes)
}

fn git_diff(base: &str, head: &str) -> Result<Vec<u8>> {
    let range = format!("{base}...{head}");
    debug!("Running git diff {}", range);

    let output = Command::new("git")
        .args(["diff", &range])
        .output()
        .context("run git diff")?;

    if !output.status.success() {
        bail!(
            "git diff failed (exit={}): {}",
            output.status,
            String::from_utf8_lossy(&output.stderr)
        );
    }

    Ok(output.stdout)
}

fn git_staged_diff() -> Result<Vec<u8>> {
    let output = Command::new("git")
        .args(["diff", "--cached"])
        .output()
        .context("run git diff --cached")?;

    if !output.status.success() {
        bail!(
            "git diff --cached failed (exit={}): {}",
            output.status,
            String::from_utf8_lossy(&output.stderr)
        );
    }

    Ok(output.stdout)
}

fn print_stdout(text: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(text.as_bytes())
        .context("write to stdout")?;
    stdout.flush().context("flush stdout")
}

fn write_text(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create dir {}", parent.display()))?;
        }
    }

    std::fs::write(path, text).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
