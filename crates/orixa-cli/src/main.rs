// crates/orixa-cli/src/main.rs
// ============================================================================
// Module: Orixa CLI Entry Point
// Description: Command dispatcher for config, catalog, and replay workflows.
// Purpose: Provide a localized, offline CLI over the Orixa engines.
// Dependencies: clap, orixa-cli, orixa-config, serde_jcs, serde_json, thiserror
// ============================================================================

//! ## Overview
//! `orixa` validates configuration files, prints the resolved catalogs, and
//! replays JSON command scripts against a fresh engine workspace. JSON output
//! is canonical (RFC 8785) so replays diff cleanly. All user-facing strings
//! go through the i18n catalog.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use orixa_cli::i18n::Locale;
use orixa_cli::i18n::set_locale;
use orixa_cli::script::ReplayReport;
use orixa_cli::script::Script;
use orixa_cli::script::Workspace;
use orixa_cli::t;
use orixa_config::CONFIG_ENV_VAR;
use orixa_config::DEFAULT_CONFIG_NAME;
use orixa_config::OrixaConfig;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum replay script size in bytes.
const MAX_SCRIPT_BYTES: usize = 16 * 1024 * 1024;
/// Environment variable for CLI locale selection.
const LANG_ENV: &str = "ORIXA_LANG";

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "orixa", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Preferred output language (overrides `ORIXA_LANG`).
    #[arg(long, value_enum, value_name = "LANG", global = true)]
    lang: Option<LangArg>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Catalog utilities.
    Catalog {
        /// Selected catalog subcommand.
        #[command(subcommand)]
        command: CatalogCommand,
    },
    /// Replay a JSON command script and print the resulting state.
    Replay(ReplayCommand),
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate an orixa configuration file.
    Validate(ConfigValidateCommand),
}

/// Catalog subcommands.
#[derive(Subcommand, Debug)]
enum CatalogCommand {
    /// Print the resolved catalogs as canonical JSON.
    Show(CatalogShowCommand),
}

/// Arguments for config validation.
#[derive(Args, Debug)]
struct ConfigValidateCommand {
    /// Config file path (defaults to orixa.toml or `ORIXA_CONFIG`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Arguments for catalog display.
#[derive(Args, Debug)]
struct CatalogShowCommand {
    /// Config file path (defaults to orixa.toml or `ORIXA_CONFIG`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Print only one catalog section.
    #[arg(long, value_enum)]
    section: Option<CatalogSection>,
}

/// Arguments for script replay.
#[derive(Args, Debug)]
struct ReplayCommand {
    /// Path to the JSON replay script.
    #[arg(long, value_name = "PATH")]
    script: PathBuf,
    /// Config file path (defaults to orixa.toml or `ORIXA_CONFIG`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Catalog sections selectable for display.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum CatalogSection {
    /// Domain concepts.
    Concepts,
    /// Adoption ladder options.
    Ladder,
    /// Opportunity trigger options.
    Triggers,
    /// Column mapping fields and aliases.
    Mapping,
}

/// Supported CLI language selections.
#[derive(ValueEnum, Copy, Clone, Debug)]
enum LangArg {
    /// English.
    En,
    /// Catalan.
    Ca,
}

impl From<LangArg> for Locale {
    fn from(value: LangArg) -> Self {
        match value {
            LangArg::En => Self::En,
            LangArg::Ca => Self::Ca,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for localized error messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a localized message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    let env_lang = std::env::var(LANG_ENV).ok();
    let locale = resolve_locale(cli.lang, env_lang.as_deref())?;
    set_locale(locale);
    if locale != Locale::En {
        write_stderr_line(&t!("i18n.disclaimer.machine_translated"))
            .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    }

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&t!("main.version", version = version))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Config {
            command,
        } => command_config(command),
        Commands::Catalog {
            command,
        } => command_catalog(command),
        Commands::Replay(command) => command_replay(&command),
    }
}

/// Prints top-level help.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(())
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands.
fn command_config(command: ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate(command) => command_config_validate(&command),
    }
}

/// Executes the config validation command.
fn command_config_validate(command: &ConfigValidateCommand) -> CliResult<ExitCode> {
    let config = OrixaConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    config.catalogs().map_err(|err| CliError::new(t!("catalog.load_failed", error = err)))?;
    write_stdout_line(&t!("config.validate.ok")).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Catalog Commands
// ============================================================================

/// Dispatches catalog subcommands.
fn command_catalog(command: CatalogCommand) -> CliResult<ExitCode> {
    match command {
        CatalogCommand::Show(command) => command_catalog_show(&command),
    }
}

/// Prints the resolved catalogs, or one section of them.
fn command_catalog_show(command: &CatalogShowCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.as_deref())?;
    let catalogs = config.catalogs().map_err(|err| CliError::new(t!("catalog.load_failed", error = err)))?;
    match command.section {
        None => write_json(&catalogs)?,
        Some(CatalogSection::Concepts) => write_json(&catalogs.concepts)?,
        Some(CatalogSection::Ladder) => write_json(&catalogs.ladder)?,
        Some(CatalogSection::Triggers) => write_json(&catalogs.triggers)?,
        Some(CatalogSection::Mapping) => write_json(&catalogs.mapping)?,
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Replay Command
// ============================================================================

/// Replays a script against a fresh workspace and prints the report.
fn command_replay(command: &ReplayCommand) -> CliResult<ExitCode> {
    let bytes = read_bytes_with_limit(&command.script, MAX_SCRIPT_BYTES)
        .map_err(|err| CliError::new(read_limit_message(&err, &t!("input.kind.script"), &command.script)))?;
    let script =
        Script::from_json(&bytes).map_err(|err| CliError::new(t!("replay.parse_failed", error = err)))?;
    let config = load_config(command.config.as_deref())?;
    let mut workspace =
        Workspace::from_config(&config).map_err(|err| CliError::new(t!("replay.failed", error = err)))?;
    let steps = workspace.replay(script).map_err(|err| CliError::new(t!("replay.failed", error = err)))?;
    write_json(&ReplayReport {
        steps,
        state: workspace.snapshot(),
    })?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Input Helpers
// ============================================================================

/// Loads configuration, falling back to defaults when no file is named and
/// the default file is absent.
fn load_config(path: Option<&Path>) -> CliResult<OrixaConfig> {
    let implicit = path.is_none() && std::env::var_os(CONFIG_ENV_VAR).is_none();
    if implicit && !Path::new(DEFAULT_CONFIG_NAME).exists() {
        return Ok(OrixaConfig::default());
    }
    OrixaConfig::load(path).map_err(|err| CliError::new(t!("config.load_failed", error = err)))
}

/// Errors returned by bounded file reads.
#[derive(Debug)]
enum ReadLimitError {
    /// File I/O failure.
    Io(std::io::Error),
    /// File size exceeds the configured limit.
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Allowed limit in bytes.
        limit: usize,
    },
}

/// Reads a file from disk while enforcing a hard size limit.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path).map_err(ReadLimitError::Io)?;
    let size = file.metadata().map_err(ReadLimitError::Io)?.len();
    let limit = u64::try_from(max_bytes).unwrap_or(u64::MAX);
    if size > limit {
        return Err(ReadLimitError::TooLarge {
            size,
            limit: max_bytes,
        });
    }
    let mut bytes = Vec::new();
    file.take(limit.saturating_add(1)).read_to_end(&mut bytes).map_err(ReadLimitError::Io)?;
    if bytes.len() > max_bytes {
        return Err(ReadLimitError::TooLarge {
            size: u64::try_from(bytes.len()).unwrap_or(u64::MAX),
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

/// Formats a localized message for a bounded read failure.
fn read_limit_message(error: &ReadLimitError, kind: &str, path: &Path) -> String {
    match error {
        ReadLimitError::Io(err) => t!("input.read_failed", kind = kind, path = path.display(), error = err),
        ReadLimitError::TooLarge {
            size,
            limit,
        } => t!("input.read_too_large", kind = kind, path = path.display(), size = size, limit = limit),
    }
}

/// Resolves the CLI locale from flags or environment.
fn resolve_locale(lang: Option<LangArg>, env_lang: Option<&str>) -> CliResult<Locale> {
    if let Some(lang) = lang {
        return Ok(lang.into());
    }
    if let Some(value) = env_lang {
        return Locale::parse(value)
            .ok_or_else(|| CliError::new(t!("i18n.lang.invalid_env", env = LANG_ENV, value = value)));
    }
    Ok(Locale::En)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Serializes `value` as canonical JSON.
fn canonical_json_bytes<T: Serialize>(value: &T) -> CliResult<Vec<u8>> {
    serde_jcs::to_vec(value).map_err(|err| CliError::new(t!("output.json_failed", error = err)))
}

/// Writes `value` to stdout as canonical JSON followed by a newline.
fn write_json<T: Serialize>(value: &T) -> CliResult<()> {
    let mut bytes = canonical_json_bytes(value)?;
    bytes.push(b'\n');
    let mut stdout = std::io::stdout();
    stdout.write_all(&bytes).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Formats a localized output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
