use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use miette::{Context, IntoDiagnostic, Result};

use covdrift_core::{CovdriftConfig, CoverageData, OutputFormat};
use covdrift_diffmap::{git, BlockCache, DiffMapper};
use covdrift_report::{ReportOptions, SummaryReporter};

#[derive(Parser)]
#[command(
    name = "covdrift",
    version,
    about = "Diff-aware coverage reporting for pull requests",
    long_about = "Covdrift reports coverage relative to a base branch, so a pull request is\n\
                   judged on the missing coverage it introduced rather than the repository's\n\
                   historical debt.\n\n\
                   Examples:\n  \
                     covdrift report                          Text summary of coverage.json\n  \
                     covdrift report --format diff --base main --show-missing\n  \
                     covdrift report --format markdown --skip-covered\n  \
                     covdrift blocks --base main              Inspect the unchanged-block map\n  \
                     covdrift init                            Create a .covdrift.toml config file"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file (default: .covdrift.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        global = true,
        long_help = "Output format for command results.\n\n\
                       Formats:\n  \
                         text      Human-readable table (default)\n  \
                         markdown  GitHub-flavored Markdown table\n  \
                         diff      Bounded HTML report for pull-request comments\n  \
                         total     Bare coverage percentage"
    )]
    format: Option<OutputFormat>,

    /// When to use colors
    #[arg(long, global = true, default_value = "auto")]
    color: ColorChoice,
}

#[derive(Subcommand)]
enum Command {
    /// Summarize a coverage report in the configured format
    #[command(long_about = "Summarize a coverage report in the configured format.\n\n\
        Reads a coverage JSON file and renders a per-file table. With --format diff,\n\
        combines the coverage with 'git diff --unified=0 <base>' to link missing\n\
        ranges to the pull request's diff view and to fold files whose missing\n\
        coverage predates the change.\n\n\
        Examples:\n  covdrift report\n  covdrift report --format diff --base origin/main --show-missing\n  covdrift report --sort -miss --skip-covered")]
    Report {
        /// Coverage JSON file to report on
        #[arg(long, default_value = "coverage.json")]
        coverage: PathBuf,

        /// Base revision to diff the working tree against
        #[arg(long)]
        base: Option<String>,

        /// Show per-file missing line ranges
        #[arg(long)]
        show_missing: bool,

        /// Skip files with 100% coverage
        #[arg(long)]
        skip_covered: bool,

        /// Skip files with no statements
        #[arg(long)]
        skip_empty: bool,

        /// Sort column, with optional +/- prefix for direction
        #[arg(
            long,
            long_help = "Sort rows by a column.\n\n\
                Columns: name, stmts, miss, branch, brpart, cover, diff.\n\
                Prefix with '-' for descending order, e.g. --sort -miss."
        )]
        sort: Option<String>,

        /// Repository path the coverage was measured in
        #[arg(long, default_value = ".")]
        repo: PathBuf,
    },
    /// Show the unchanged-block map for a base revision
    #[command(long_about = "Show the unchanged-block map for a base revision.\n\n\
        Runs 'git diff --unified=0 <base>' and prints, per changed file, the\n\
        aligned (base offset, current offset, length) blocks the diff report\n\
        uses to carry coverage classifications across revisions.\n\n\
        Examples:\n  covdrift blocks --base main\n  covdrift blocks --base origin/main --format json")]
    Blocks {
        /// Base revision to diff the working tree against
        #[arg(long)]
        base: Option<String>,

        /// Repository path (default: current directory)
        #[arg(long, default_value = ".")]
        repo: PathBuf,

        /// Print the block map as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a default .covdrift.toml configuration file
    #[command(long_about = "Create a default .covdrift.toml configuration file.\n\n\
        Generates a commented-out template with all available options.\n\
        Fails if .covdrift.toml already exists.")]
    Init,
    /// Generate shell completion scripts
    #[command(hide = true)]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Clone, PartialEq, Eq, ValueEnum)]
enum ColorChoice {
    /// Auto-detect based on terminal
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

fn print_welcome(use_color: bool) {
    let version = env!("CARGO_PKG_VERSION");

    if use_color {
        println!("\x1b[1m\x1b[33m∆\x1b[0m \x1b[1mcovdrift\x1b[0m v{version} — coverage that judges your change, not your history\n");

        println!("Quick start:");
        println!("  \x1b[36mcovdrift init\x1b[0m                 Create a .covdrift.toml config file");
        println!("  \x1b[36mcovdrift report\x1b[0m               Summarize coverage.json as a table");
        println!("  \x1b[36mcovdrift report --format diff\x1b[0m Render a pull-request comment\n");

        println!("All commands:");
        println!("  \x1b[32mreport\x1b[0m       Coverage summary (text, markdown, diff, total)");
        println!("  \x1b[32mblocks\x1b[0m       Inspect the unchanged-block map for a base revision");
        println!("  \x1b[32minit\x1b[0m         Create default configuration\n");
    } else {
        println!("covdrift v{version} — coverage that judges your change, not your history\n");

        println!("Quick start:");
        println!("  covdrift init                 Create a .covdrift.toml config file");
        println!("  covdrift report               Summarize coverage.json as a table");
        println!("  covdrift report --format diff Render a pull-request comment\n");

        println!("All commands:");
        println!("  report       Coverage summary (text, markdown, diff, total)");
        println!("  blocks       Inspect the unchanged-block map for a base revision");
        println!("  init         Create default configuration\n");
    }

    println!("Run 'covdrift <command> --help' for details.");
}

fn load_config(cli: &Cli) -> Result<CovdriftConfig> {
    match &cli.config {
        Some(path) => CovdriftConfig::from_file(path)
            .into_diagnostic()
            .wrap_err(format!("loading {}", path.display())),
        None => {
            let default_path = std::path::Path::new(".covdrift.toml");
            if default_path.exists() {
                CovdriftConfig::from_file(default_path)
                    .into_diagnostic()
                    .wrap_err("loading .covdrift.toml")
            } else {
                Ok(CovdriftConfig::default())
            }
        }
    }
}

fn load_coverage(path: &std::path::Path) -> Result<CoverageData> {
    if !path.exists() {
        miette::bail!(miette::miette!(
            help = "Point --coverage at a coverage JSON file, e.g. one produced with 'coverage json'",
            "Coverage file not found: {}",
            path.display()
        ));
    }
    let content = std::fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err(format!("reading {}", path.display()))?;
    serde_json::from_str(&content)
        .into_diagnostic()
        .wrap_err(format!("parsing {}", path.display()))
}

fn ensure_git_repo(path: &std::path::Path) -> Result<()> {
    if !path.join(".git").exists() && git2::Repository::discover(path).is_err() {
        miette::bail!(miette::miette!(
            help = "Run covdrift from inside a git repository, or specify --repo to one",
            "Not a git repository: {}",
            path.display()
        ));
    }
    Ok(())
}

const DEFAULT_CONFIG: &str = r#"# Covdrift Configuration
# See: https://github.com/covdrift/covdrift

[report]
# Output format: text, markdown, diff, total
# format = "text"

# Base revision the diff report compares against
# base_revision = "main"

# Show per-file missing line ranges
# show_missing = false

# Skip fully covered / empty files
# skip_covered = false
# skip_empty = false

# Sort column with optional +/- prefix: name, stmts, miss, branch, brpart, cover, diff
# sort = "name"

# Decimal places in coverage percentages
# precision = 0
"#;

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .expect("miette handler");
    human_panic::setup_panic!();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let use_color = match cli.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => std::io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    };

    match cli.command {
        None => {
            print_welcome(use_color);
            return Ok(());
        }
        Some(Command::Report {
            ref coverage,
            ref base,
            show_missing,
            skip_covered,
            skip_empty,
            ref sort,
            ref repo,
        }) => {
            let data = load_coverage(coverage)?;

            let mut options = ReportOptions::from_config(&config.report);
            if let Some(format) = cli.format {
                options.format = format;
            }
            if let Some(base) = base {
                options.base_revision = base.clone();
            }
            if let Some(sort) = sort {
                options.sort = sort.clone();
            }
            options.show_missing |= show_missing;
            options.skip_covered |= skip_covered;
            options.skip_empty |= skip_empty;

            if options.format == OutputFormat::Diff {
                ensure_git_repo(repo)?;
            }

            let mut reporter = SummaryReporter::new(options);
            let output = reporter.report(&data, repo).into_diagnostic()?;
            print!("{output}");
        }
        Some(Command::Blocks {
            ref base,
            ref repo,
            json,
        }) => {
            ensure_git_repo(repo)?;

            let base = base
                .clone()
                .unwrap_or_else(|| config.report.base_revision.clone());
            let mapper = DiffMapper::new(repo.clone());
            let mut cache = BlockCache::new();
            let blocks = mapper.compute(&base, &mut cache).into_diagnostic()?;

            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(blocks).into_diagnostic()?
                );
            } else {
                if blocks.is_empty() {
                    println!("No files changed relative to {base}");
                }
                for (name, file_blocks) in blocks {
                    let base_lines = git::show_at_revision(repo, &base, name)
                        .into_diagnostic()?
                        .map(|content| content.lines().count());
                    let curr_lines = git::current_line_count(repo, name);
                    println!(
                        "{name} (base: {}, current: {} lines)",
                        base_lines
                            .map(|n| n.to_string())
                            .unwrap_or_else(|| "?".to_string()),
                        curr_lines
                            .map(|n| n.to_string())
                            .unwrap_or_else(|| "?".to_string()),
                    );
                    for block in file_blocks {
                        println!(
                            "  base {:>6}  curr {:>6}  len {:>6}",
                            block.base_offset, block.curr_offset, block.length
                        );
                    }
                }
            }
        }
        Some(Command::Init) => {
            let path = std::path::Path::new(".covdrift.toml");
            if path.exists() {
                miette::bail!(".covdrift.toml already exists");
            }
            std::fs::write(path, DEFAULT_CONFIG).into_diagnostic()?;
            println!("Created .covdrift.toml with default configuration");
        }
        Some(Command::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "covdrift", &mut std::io::stdout());
        }
    }

    Ok(())
}
