use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tcompare_common::{
    ensure_config, load_config, CompareMode, ComparisonOptions, ComparisonResult, TextStats,
};
use tcompare_core::{
    calculate_stats, format_percentage, highlight_segments, highlight_spans, normalize_text,
    render_markdown_report, HighlightSpan, TextComparator, TextLoader,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tcompare")]
#[command(author = "TCompare Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Compare two texts by character, word or line", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two texts and highlight the differences
    Compare {
        /// Left input file ("-" reads stdin)
        left: PathBuf,

        /// Right input file ("-" reads stdin)
        right: PathBuf,

        /// Comparison granularity (defaults to the configured mode)
        #[arg(short, long, value_enum)]
        mode: Option<ModeArg>,

        /// Ignore case differences
        #[arg(short = 'i', long, overrides_with = "no_ignore_case")]
        ignore_case: bool,

        /// Compare case exactly, even if the config ignores it
        #[arg(long, overrides_with = "ignore_case")]
        no_ignore_case: bool,

        /// Ignore whitespace differences
        #[arg(short = 'w', long, overrides_with = "no_ignore_whitespace")]
        ignore_whitespace: bool,

        /// Compare whitespace exactly, even if the config ignores it
        #[arg(long, overrides_with = "ignore_whitespace")]
        no_ignore_whitespace: bool,

        /// Exchange the left and right inputs before comparing
        #[arg(short, long)]
        swap: bool,

        /// Output results as JSON
        #[arg(long)]
        json: bool,

        /// Write a markdown report to this path
        #[arg(short, long)]
        report: Option<PathBuf>,

        /// Disable ANSI colors in output
        #[arg(long)]
        no_color: bool,

        /// Maximum accepted input size in bytes
        #[arg(long)]
        max_size: Option<u64>,
    },
    /// Print character, word and line counts for a text
    Stats {
        /// Input file ("-" reads stdin)
        file: PathBuf,

        /// Output results as JSON
        #[arg(long)]
        json: bool,

        /// Maximum accepted input size in bytes
        #[arg(long)]
        max_size: Option<u64>,
    },
    /// Show the active configuration file
    Config {
        /// Write a default configuration file if none exists
        #[arg(long)]
        init: bool,

        /// Use a config file next to the executable
        #[arg(long)]
        portable: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Character,
    Word,
    Line,
}

impl From<ModeArg> for CompareMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Character => CompareMode::Character,
            ModeArg::Word => CompareMode::Word,
            ModeArg::Line => CompareMode::Line,
        }
    }
}

enum InputSource {
    Stdin,
    File { path: PathBuf },
}

impl InputSource {
    fn from_arg(path: &Path) -> Self {
        if path.as_os_str() == "-" {
            InputSource::Stdin
        } else {
            InputSource::File {
                path: path.to_path_buf(),
            }
        }
    }

    fn label(&self) -> String {
        match self {
            InputSource::Stdin => String::from("<stdin>"),
            InputSource::File { path } => path.display().to_string(),
        }
    }

    fn load(&self, loader: &TextLoader) -> anyhow::Result<String> {
        match self {
            InputSource::Stdin => loader
                .load_reader(std::io::stdin().lock())
                .context("Failed to read stdin"),
            InputSource::File { path } => loader
                .load_file(path)
                .with_context(|| format!("Failed to load {}", path.display())),
        }
    }
}

struct CompareArgs {
    left: PathBuf,
    right: PathBuf,
    mode: Option<ModeArg>,
    ignore_case: bool,
    no_ignore_case: bool,
    ignore_whitespace: bool,
    no_ignore_whitespace: bool,
    swap: bool,
    json: bool,
    report: Option<PathBuf>,
    no_color: bool,
    max_size: Option<u64>,
}

fn main() {
    // Initialize tracing to stderr (so JSON output can go cleanly to stdout)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Compare {
            left,
            right,
            mode,
            ignore_case,
            no_ignore_case,
            ignore_whitespace,
            no_ignore_whitespace,
            swap,
            json,
            report,
            no_color,
            max_size,
        } => run_compare(CompareArgs {
            left,
            right,
            mode,
            ignore_case,
            no_ignore_case,
            ignore_whitespace,
            no_ignore_whitespace,
            swap,
            json,
            report,
            no_color,
            max_size,
        })
        .context("Compare failed"),
        Commands::Stats {
            file,
            json,
            max_size,
        } => run_stats(&file, json, max_size).context("Stats failed"),
        Commands::Config { init, portable } => {
            run_config(init, portable).context("Config failed")
        }
    };

    if let Err(e) = outcome {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run_compare(args: CompareArgs) -> anyhow::Result<()> {
    let loaded = load_config(false)?;
    let config = loaded.config;

    let mut options = config.comparison_options();
    if let Some(mode) = args.mode {
        options.compare_mode = mode.into();
    }
    options.ignore_case = resolve_flag(args.ignore_case, args.no_ignore_case, options.ignore_case);
    options.ignore_whitespace = resolve_flag(
        args.ignore_whitespace,
        args.no_ignore_whitespace,
        options.ignore_whitespace,
    );

    let mut left = InputSource::from_arg(&args.left);
    let mut right = InputSource::from_arg(&args.right);
    if matches!(left, InputSource::Stdin) && matches!(right, InputSource::Stdin) {
        bail!("Only one side can be read from stdin");
    }
    if args.swap {
        std::mem::swap(&mut left, &mut right);
    }

    let loader = TextLoader::with_max_size(args.max_size.unwrap_or(config.max_file_size));
    let left_text = left.load(&loader)?;
    let right_text = right.load(&loader)?;

    info!("Comparing:");
    info!("  Left:  {}", left.label());
    info!("  Right: {}", right.label());

    let comparator = TextComparator::with_options(options);
    let result = comparator.compare(&left_text, &right_text);

    if let Some(report_path) = &args.report {
        let report = render_markdown_report(&left_text, &right_text, &result);
        fs::write(report_path, report)
            .with_context(|| format!("Failed to write report {}", report_path.display()))?;
        info!("Report written to {}", report_path.display());
    }

    if args.json {
        let report = build_json_report(left.label(), right.label(), options, &result);
        let output = serde_json::to_string_pretty(&report)?;
        println!("{output}");
        return Ok(());
    }

    let use_color = !args.no_color && config.color && std::io::stdout().is_terminal();

    // Highlight offsets refer to the normalized texts, so render those
    let left_shown = normalize_text(&left_text, &options);
    let right_shown = normalize_text(&right_text, &options);

    println!("\n{}", "=".repeat(80));
    println!("Comparison Results ({} mode)", options.compare_mode);
    println!("{}", "=".repeat(80));
    println!("Difference: {}", format_percentage(result.diff_percentage));
    println!();
    println!("{}", stats_line("Left ", &left.label(), &result.left_stats));
    println!("{}", stats_line("Right", &right.label(), &result.right_stats));

    println!("\n{}", "-".repeat(80));
    println!("Left:");
    println!(
        "{}",
        render_highlighted(&left_shown, &result.left_highlights, Side::Left, use_color)
    );
    println!("{}", "-".repeat(80));
    println!("Right:");
    println!(
        "{}",
        render_highlighted(&right_shown, &result.right_highlights, Side::Right, use_color)
    );
    println!("{}", "=".repeat(80));

    Ok(())
}

/// Pick a boolean from an `--x`/`--no-x` flag pair, falling back to the
/// configured value when neither is given.
fn resolve_flag(enable: bool, disable: bool, configured: bool) -> bool {
    if enable {
        true
    } else if disable {
        false
    } else {
        configured
    }
}

fn run_stats(file: &Path, json: bool, max_size: Option<u64>) -> anyhow::Result<()> {
    let loaded = load_config(false)?;
    let loader = TextLoader::with_max_size(max_size.unwrap_or(loaded.config.max_file_size));

    let source = InputSource::from_arg(file);
    let text = source.load(&loader)?;
    let stats = calculate_stats(&text);

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("Characters: {}", stats.characters);
    println!("Words:      {}", stats.words);
    println!("Lines:      {}", stats.lines);
    Ok(())
}

fn run_config(init: bool, portable: bool) -> anyhow::Result<()> {
    let loaded = if init {
        ensure_config(portable)?
    } else {
        load_config(portable)?
    };

    let status = if init && !loaded.exists {
        "created"
    } else if loaded.exists {
        "found"
    } else {
        "not found, using defaults"
    };
    println!("Config file: {} ({})", loaded.path.display(), status);
    println!();
    print!("{}", toml::to_string_pretty(&loaded.config)?);
    Ok(())
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

fn stats_line(side: &str, label: &str, stats: &TextStats) -> String {
    format!(
        "{} {}: {} characters, {} words, {} lines",
        side, label, stats.characters, stats.words, stats.lines
    )
}

/// Render `text` with its highlighted runs marked. Colored output uses
/// inverse red (left) or green (right); plain output wraps runs in
/// `[-...-]` (left) or `{+...+}` (right).
fn render_highlighted(text: &str, highlights: &[usize], side: Side, use_color: bool) -> String {
    let (open, close) = match (side, use_color) {
        (Side::Left, true) => ("\x1b[7;31m", "\x1b[0m"),
        (Side::Right, true) => ("\x1b[7;32m", "\x1b[0m"),
        (Side::Left, false) => ("[-", "-]"),
        (Side::Right, false) => ("{+", "+}"),
    };

    let mut out = String::with_capacity(text.len());
    for (segment, highlighted) in highlight_segments(text, highlights) {
        if highlighted {
            out.push_str(open);
            out.push_str(&segment);
            out.push_str(close);
        } else {
            out.push_str(&segment);
        }
    }
    out
}

#[derive(Serialize)]
struct JsonReport<'a> {
    left: String,
    right: String,
    options: ComparisonOptions,
    difference: String,
    #[serde(flatten)]
    result: &'a ComparisonResult,
    left_spans: Vec<HighlightSpan>,
    right_spans: Vec<HighlightSpan>,
}

fn build_json_report(
    left: String,
    right: String,
    options: ComparisonOptions,
    result: &ComparisonResult,
) -> JsonReport<'_> {
    JsonReport {
        left,
        right,
        options,
        difference: format_percentage(result.diff_percentage),
        result,
        left_spans: highlight_spans(&result.left_highlights),
        right_spans: highlight_spans(&result.right_highlights),
    }
}
