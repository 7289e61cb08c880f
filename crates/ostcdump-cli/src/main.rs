use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glob::glob;
use ostcdump_core::{
    DecodedDump, DumpCodec, SettingsDocument, decode_dump_file, format_version,
    make_settings_document,
};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("OSTCDUMP_BUILD_COMMIT"),
    " ",
    env!("OSTCDUMP_BUILD_DATE"),
    ", ",
    env!("OSTCDUMP_BUILD_PROFILE"),
    ")"
);

const DUMP_EXTENSIONS: &[&str] = &["bin", "dmp", "dump"];

#[derive(Parser, Debug)]
#[command(name = "ostcdump")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    about = "Decode and re-encode dive-computer settings dumps.",
    long_about = None,
    after_help = "Examples:\n  ostcdump dump decode ostc.bin -o settings.json\n  ostcdump dump encode ostc.bin --settings settings.json -o edited.bin\n  ostcdump protocols"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Operations on raw memory dumps.
    Dump {
        #[command(subcommand)]
        command: DumpCommands,
    },
    /// List the known protocol revisions.
    Protocols,
}

#[derive(Subcommand, Debug)]
enum DumpCommands {
    /// Decode a dump into a JSON settings document.
    #[command(
        after_help = "Examples:\n  ostcdump dump decode ostc.bin -o settings.json\n  ostcdump dump decode ostc.bin --stdout --pretty\n  ostcdump dump decode ostc.bin --stdout --protocol mk2-1.80"
    )]
    Decode {
        /// Path to a raw dump (.bin, .dmp or .dump)
        input: PathBuf,

        /// Output settings path (JSON)
        #[arg(short = 'o', long, required_unless_present = "stdout")]
        output: Option<PathBuf>,

        /// Write JSON settings to stdout
        #[arg(long, conflicts_with = "output")]
        stdout: bool,

        /// Pretty-print JSON output
        #[arg(long, conflicts_with = "compact")]
        pretty: bool,

        /// Compact JSON output (default)
        #[arg(long)]
        compact: bool,

        /// Protocol revision to use instead of the embedded firmware version
        #[arg(long, value_name = "NAME")]
        protocol: Option<String>,

        /// Suppress non-error output
        #[arg(long)]
        quiet: bool,

        /// Exit with a non-zero code if any device value was normalized
        #[arg(long)]
        strict: bool,

        /// List normalized fields after decoding
        #[arg(long)]
        list_normalized: bool,
    },
    /// Apply a settings document to a dump and write the result.
    #[command(
        after_help = "Examples:\n  ostcdump dump encode ostc.bin --settings settings.json -o edited.bin"
    )]
    Encode {
        /// Original dump; bytes no setting owns are copied from it
        input: PathBuf,

        /// Settings document (JSON) as produced by `dump decode`
        #[arg(short = 's', long)]
        settings: PathBuf,

        /// Output dump path
        #[arg(short = 'o', long)]
        output: PathBuf,

        /// Protocol revision to use instead of the one named in the document
        #[arg(long, value_name = "NAME")]
        protocol: Option<String>,

        /// Suppress non-error output
        #[arg(long)]
        quiet: bool,
    },
}

struct DecodeArgs {
    input: PathBuf,
    output: Option<PathBuf>,
    stdout: bool,
    pretty: bool,
    compact: bool,
    protocol: Option<String>,
    quiet: bool,
    strict: bool,
    list_normalized: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Dump { command } => match command {
            DumpCommands::Decode {
                input,
                output,
                stdout,
                pretty,
                compact,
                protocol,
                quiet,
                strict,
                list_normalized,
            } => cmd_dump_decode(DecodeArgs {
                input,
                output,
                stdout,
                pretty,
                compact,
                protocol,
                quiet,
                strict,
                list_normalized,
            }),
            DumpCommands::Encode {
                input,
                settings,
                output,
                protocol,
                quiet,
            } => cmd_dump_encode(input, settings, output, protocol, quiet),
        },
        Commands::Protocols => cmd_protocols(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{err:#}"), None)
    }
}

fn codec() -> Result<DumpCodec, CliError> {
    DumpCodec::mk2()
        .context("protocol registry is misconfigured")
        .map_err(Into::into)
}

fn cmd_dump_decode(args: DecodeArgs) -> Result<(), CliError> {
    let input = resolve_input_path(&args.input)?;
    validate_dump_file(&input)?;
    if args.pretty && args.compact {
        return Err(CliError::new(
            "cannot use --pretty and --compact together",
            Some("choose one output format".to_string()),
        ));
    }
    let output = if args.stdout {
        None
    } else {
        Some(args.output.ok_or_else(|| {
            CliError::new(
                "missing output path",
                Some("use -o/--output or --stdout".to_string()),
            )
        })?)
    };
    if let Some(output) = output.as_ref() {
        ensure_distinct(&input, output)?;
    }

    let codec = codec()?;
    let decoded = decode_dump_file(&codec, &input, args.protocol.as_deref())
        .with_context(|| format!("failed to decode {}", input.display()))
        .map_err(|err| with_protocol_hint(err, args.protocol.is_some()))?;
    log::debug!(
        "decoded {} with {} ({} normalized)",
        input.display(),
        decoded.revision.name(),
        decoded.normalized.len()
    );
    let document = make_settings_document(&decoded);
    let json = serialize_document(&document, args.pretty)?;

    match output {
        None => print!("{}", json),
        Some(output) => {
            create_parent_dir(&output)?;
            fs::write(&output, json)
                .with_context(|| format!("Failed to write settings: {}", output.display()))?;
            if !args.quiet {
                eprintln!(
                    "OK: {} (firmware {}) -> {}",
                    decoded.revision.name(),
                    format_version(decoded.firmware_version),
                    output.display()
                );
            }
        }
    }

    if args.list_normalized && !args.quiet {
        print_normalized(&decoded);
    }
    if args.strict && !decoded.normalized.is_empty() {
        return Err(CliError::new(
            format!(
                "{} device value(s) were normalized",
                decoded.normalized.len()
            ),
            Some("use --list-normalized to inspect".to_string()),
        ));
    }
    Ok(())
}

fn cmd_dump_encode(
    input: PathBuf,
    settings: PathBuf,
    output: PathBuf,
    protocol: Option<String>,
    quiet: bool,
) -> Result<(), CliError> {
    let input = resolve_input_path(&input)?;
    validate_dump_file(&input)?;
    ensure_distinct(&input, &output)?;
    if !settings.is_file() {
        return Err(CliError::new(
            format!("settings file not found: {}", settings.display()),
            Some("produce one with `ostcdump dump decode`".to_string()),
        ));
    }

    let text = fs::read_to_string(&settings)
        .with_context(|| format!("Failed to read settings: {}", settings.display()))?;
    let document: SettingsDocument = serde_json::from_str(&text)
        .with_context(|| format!("Invalid settings document: {}", settings.display()))?;
    let revision_name = protocol.unwrap_or_else(|| document.protocol.name.clone());

    let codec = codec()?;
    let original = fs::read(&input)
        .with_context(|| format!("Failed to read input dump: {}", input.display()))?;
    let decoded = codec
        .decode_with_hint(&original, Some(&revision_name))
        .with_context(|| format!("failed to decode {}", input.display()))
        .map_err(|err| with_protocol_hint(err, true))?;
    let settings_map = document
        .to_settings(&decoded.revision)
        .context("settings do not match the protocol revision")?;
    let dump = codec
        .encode(&settings_map, &decoded.revision, Some(&original))
        .context("failed to encode settings")?;

    log::debug!(
        "encoding {} setting(s) with {} into {}",
        settings_map.len(),
        decoded.revision.name(),
        output.display()
    );
    create_parent_dir(&output)?;
    fs::write(&output, &dump)
        .with_context(|| format!("Failed to write dump: {}", output.display()))?;
    if !quiet {
        eprintln!(
            "OK: {} setting(s) applied with {} -> {}",
            settings_map.len(),
            decoded.revision.name(),
            output.display()
        );
    }
    Ok(())
}

fn cmd_protocols() -> Result<(), CliError> {
    let codec = codec()?;
    for revision in codec.registry().revisions() {
        let parent = revision
            .parent()
            .map(|parent| parent.name())
            .unwrap_or("-");
        println!(
            "{}\t{}\t{} features\textends {}",
            revision.name(),
            revision.firmware_versions(),
            revision.features().len(),
            parent
        );
    }
    Ok(())
}

fn with_protocol_hint(err: anyhow::Error, hinted: bool) -> CliError {
    let hint = if hinted {
        "run `ostcdump protocols` to list valid revision names"
    } else {
        "pass --protocol to force a revision"
    };
    CliError::new(format!("{err:#}"), Some(hint.to_string()))
}

fn serialize_document(document: &SettingsDocument, pretty: bool) -> Result<String, CliError> {
    let json = if pretty {
        serde_json::to_string_pretty(document)
    } else {
        serde_json::to_string(document)
    };
    json.context("JSON serialization failed").map_err(Into::into)
}

fn print_normalized(decoded: &DecodedDump) {
    eprintln!("Normalized fields:");
    for note in &decoded.normalized {
        eprintln!("  {}", note);
    }
}

fn create_parent_dir(path: &Path) -> Result<(), CliError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }
    Ok(())
}

fn ensure_distinct(input: &Path, output: &Path) -> Result<(), CliError> {
    let input_abs = fs::canonicalize(input)
        .with_context(|| format!("Failed to resolve input path: {}", input.display()))?;
    let Some(name) = output.file_name() else {
        return Err(CliError::new(
            format!("invalid output path: {}", output.display()),
            None,
        ));
    };
    let parent = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    // A parent that does not exist yet cannot contain the input.
    if let Ok(parent_abs) = fs::canonicalize(parent) {
        if parent_abs.join(name) == input_abs {
            return Err(CliError::new(
                format!("output path must differ from input: {}", output.display()),
                Some("choose a different output path".to_string()),
            ));
        }
    }
    Ok(())
}

fn validate_dump_file(input: &Path) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("use a raw dump (.bin, .dmp or .dump)".to_string()),
        ));
    }
    if !input.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("use a raw dump (.bin, .dmp or .dump)".to_string()),
        ));
    }
    let ext = input
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    if !DUMP_EXTENSIONS.contains(&ext.as_str()) {
        return Err(CliError::new(
            format!("unsupported input format '{}'", input.display()),
            Some("expected a .bin, .dmp or .dump file".to_string()),
        ));
    }
    Ok(())
}

fn resolve_input_path(input: &Path) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.to_path_buf());
    }

    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    let mut matches = Vec::new();
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    match matches.len() {
        0 => Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern".to_string()),
        )),
        1 => Ok(matches.remove(0)),
        count => {
            let listed = matches
                .iter()
                .take(3)
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            let more = if count > 3 { ", ..." } else { "" };
            Err(CliError::new(
                format!(
                    "multiple files match pattern '{}' ({} matches); matches: {}{}",
                    pattern, count, listed, more
                ),
                Some("pass a single dump, or run once per file".to_string()),
            ))
        }
    }
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
