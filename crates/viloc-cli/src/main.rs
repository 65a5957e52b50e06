use clap::{Args, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::Result;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};
use viloc_config::VilocConfig;

mod commands;
mod ui;

#[derive(Parser)]
#[command(
    name = "viloc",
    version,
    about = "Vietnamese/English catalog toolkit for Odoo modules"
)]
struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Only warnings and errors on the console (the log file keeps everything)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Where the translations come from and how languages are recognised.
/// Unset flags fall back to `[translate]` in viloc.toml.
#[derive(Args, Debug, Clone, Default)]
pub struct TranslateArgs {
    /// google | glossary
    #[arg(long)]
    pub provider: Option<String>,
    /// TOML file with [vi_en] and [en_vi] tables (glossary provider)
    #[arg(long)]
    pub glossary: Option<PathBuf>,
    #[arg(long)]
    pub endpoint: Option<String>,
    #[arg(long)]
    pub timeout_ms: Option<u64>,
    /// charset | detect | hybrid
    #[arg(long)]
    pub classifier: Option<String>,
    /// Pause between catalog entries
    #[arg(long)]
    pub delay_ms: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Swap Vietnamese msgids to English, fill empty msgstrs and update the sources
    Format {
        /// Module root
        #[arg(default_value = ".")]
        module: PathBuf,
        /// Catalog path (defaults to <module>/i18n/vi_VN.po)
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// Keep a copy of the catalog next to it before writing
        #[arg(long, default_value_t = false)]
        backup: bool,
        /// Only rewrite the catalog
        #[arg(long, default_value_t = false)]
        no_propagate: bool,
        #[arg(long, default_value_t = false)]
        dry_run: bool,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        #[command(flatten)]
        translate: TranslateArgs,
    },

    /// Replace every translated msgstr found in the sources by its msgid
    Replace {
        #[arg(default_value = ".")]
        module: PathBuf,
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// Lines ignored at the top of the catalog
        #[arg(long)]
        skip_header_lines: Option<usize>,
        #[arg(long, default_value_t = false)]
        dry_run: bool,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Rename one literal across the module sources
    Propagate {
        #[arg(default_value = ".")]
        module: PathBuf,
        /// Text to look for
        #[arg(long = "from")]
        old: String,
        /// Replacement text
        #[arg(long = "to")]
        new: String,
        #[arg(long, default_value_t = false)]
        dry_run: bool,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Wrap hard-coded literals in _()
    Mark {
        #[command(subcommand)]
        target: MarkTarget,
    },
}

#[derive(Subcommand, Debug)]
pub enum MarkTarget {
    /// raise ValidationError(msg) -> raise ValidationError(_(msg))
    Validation {
        #[arg(default_value = ".")]
        module: PathBuf,
        #[arg(long, default_value_t = false)]
        dry_run: bool,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// 'name': 'Text' -> 'name': _('Text')
    Names {
        #[arg(default_value = ".")]
        module: PathBuf,
        #[arg(long, default_value_t = false)]
        dry_run: bool,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Vietnamese text in <b>/<span>/<p class="text-danger"> and title=/message= arguments
    Markup {
        file: PathBuf,
        /// charset | detect | hybrid
        #[arg(long)]
        classifier: Option<String>,
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
}

/// State shared by every command.
pub struct Ctx {
    pub cfg: VilocConfig,
    pub use_color: bool,
}

trait Runnable {
    fn run(self, ctx: &Ctx) -> Result<()>;
}

impl Runnable for Commands {
    fn run(self, ctx: &Ctx) -> Result<()> {
        let cmd_name = match &self {
            Commands::Format { .. } => "format",
            Commands::Replace { .. } => "replace",
            Commands::Propagate { .. } => "propagate",
            Commands::Mark { .. } => "mark",
        };
        debug!(event = "command_args", cmd = cmd_name, args = ?self);
        info!(event = "command_start", cmd = cmd_name);

        let result = match self {
            Commands::Format {
                module,
                catalog,
                backup,
                no_propagate,
                dry_run,
                format,
                translate,
            } => commands::format::run_format(
                ctx,
                commands::format::FormatArgs {
                    module,
                    catalog,
                    backup,
                    no_propagate,
                    dry_run,
                    translate,
                },
                format,
            ),
            Commands::Replace {
                module,
                catalog,
                skip_header_lines,
                dry_run,
                format,
            } => commands::replace::run_replace(
                ctx,
                &module,
                catalog,
                skip_header_lines,
                dry_run,
                format,
            ),
            Commands::Propagate {
                module,
                old,
                new,
                dry_run,
                format,
            } => commands::propagate::run_propagate(ctx, &module, &old, &new, dry_run, format),
            Commands::Mark { target } => commands::mark::run_mark(ctx, target),
        };

        match &result {
            Ok(_) => info!(event = "command_done", cmd = cmd_name),
            Err(e) => error!(event = "command_failed", cmd = cmd_name, error = ?e),
        }
        result
    }
}

/// Console layer on stderr plus an append-only log file. The returned guard
/// must live until exit or buffered lines are lost.
fn init_tracing(log_dir: &Path, log_file: &str, quiet: bool) -> Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;
    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(log_file)
        .build(log_dir)?;
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let console_filter = if quiet {
        EnvFilter::new("warn")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let console_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(console_filter);

    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_writer(file_writer)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
    Ok(guard)
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let cfg = viloc_config::load_config()?;
    let (log_dir, log_file) = cfg.log_path();
    let _guard = init_tracing(&log_dir, &log_file, cli.quiet)?;

    let use_color = !cli.no_color
        && std::io::stdout().is_terminal()
        && std::env::var_os("NO_COLOR").is_none();

    let ctx = Ctx { cfg, use_color };
    cli.cmd.run(&ctx)
}
