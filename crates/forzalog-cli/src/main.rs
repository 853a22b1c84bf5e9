use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{ArgAction, Parser, ValueEnum};
use forzalog_core::{
    OutputFormat, PacketFormat, RecordError, RecordOptions, SourceError, field_names,
    validate_selection,
};
use tracing_subscriber::EnvFilter;

mod config;

use config::{FileConfig, FlagValues, Settings};

#[derive(Parser, Debug)]
#[command(name = "forzalog")]
#[command(version)]
#[command(
    about = "Record Forza \"Data Out\" UDP telemetry to a TSV or CSV file.",
    long_about = None,
    after_help = "Examples:\n  forzalog 5300 laps.tsv\n  forzalog -v -f csv -p fh4 5300 laps.csv\n  forzalog --fields timestamp_ms,speed,gear 5300 laps.tsv\n  forzalog -c forzalog.toml"
)]
struct Cli {
    /// Port number to listen on
    port: Option<u16>,

    /// Path to the output file
    output: Option<PathBuf>,

    /// Write informational output (repeat for debug output)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Append to the output file; no header row is written
    #[arg(short, long)]
    append: bool,

    /// Output format (default: tsv)
    #[arg(short = 'f', long = "format", value_enum)]
    format: Option<FormatArg>,

    /// Packet format sent by the game (default: dash)
    #[arg(short = 'p', long = "packet-format", value_enum)]
    packet_format: Option<PacketFormatArg>,

    /// TOML configuration file; its values take precedence over flags
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Comma-separated columns to write, in order (add wall_clock for a local timestamp)
    #[arg(long, value_delimiter = ',')]
    fields: Option<Vec<String>>,

    /// Print the columns of the packet format and exit
    #[arg(long)]
    list_fields: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Tsv,
    Csv,
}

impl From<FormatArg> for OutputFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Tsv => OutputFormat::Tsv,
            FormatArg::Csv => OutputFormat::Csv,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PacketFormatArg {
    /// Forza Motorsport 7 "sled" (232 bytes)
    Sled,
    /// Forza Motorsport 7 "car dash" (311 bytes)
    Dash,
    /// Forza Horizon 4 (323 bytes)
    Fh4,
}

impl From<PacketFormatArg> for PacketFormat {
    fn from(value: PacketFormatArg) -> Self {
        match value {
            PacketFormatArg::Sled => PacketFormat::Sled,
            PacketFormatArg::Dash => PacketFormat::Dash,
            PacketFormatArg::Fh4 => PacketFormat::Fh4,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cmd_record(cli) {
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

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
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

fn cmd_record(cli: Cli) -> Result<(), CliError> {
    let file = match cli.config.as_ref() {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let flags = FlagValues {
        port: cli.port,
        output: cli.output,
        output_format: cli.format.map(Into::into),
        append: cli.append,
        packet_format: cli.packet_format.map(Into::into),
        fields: cli.fields,
    };
    let settings = Settings::merge(flags, file);

    if cli.list_fields {
        for name in field_names(settings.packet_format) {
            println!("{name}");
        }
        return Ok(());
    }

    if let Some(fields) = settings.fields.as_deref() {
        validate_selection(settings.packet_format, fields).map_err(|err| {
            CliError::new(
                err.to_string(),
                Some(format!(
                    "use --list-fields -p {} to see the available columns",
                    settings.packet_format
                )),
            )
        })?;
    }

    let port = settings.port.ok_or_else(|| {
        CliError::new(
            "missing port number",
            Some("pass PORT or set `port` in the config file".to_string()),
        )
    })?;
    let output = settings.output.clone().ok_or_else(|| {
        CliError::new(
            "missing output path",
            Some("pass OUTPUT or set `output` in the config file".to_string()),
        )
    })?;

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }

    let options = RecordOptions {
        format: settings.packet_format,
        fields: settings.fields,
        append: settings.append,
    };

    let output_format = settings.output_format;
    let append = settings.append;
    forzalog_core::run(
        port,
        || forzalog_core::open_file_sink(&output, output_format, append),
        options,
    )
    .map_err(|err| record_error(err, port, &output))
}

fn record_error(err: RecordError, port: u16, output: &Path) -> CliError {
    match err {
        RecordError::Source(SourceError::Bind { .. }) => CliError::new(
            err.to_string(),
            Some(format!(
                "port {port} is in use or needs privileges; free it or pick another port"
            )),
        ),
        RecordError::Sink(_) => CliError::new(
            format!("{err} ({})", output.display()),
            Some("check free disk space and write permissions".to_string()),
        ),
        _ => CliError::new(err.to_string(), None),
    }
}
