use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use forzalog_core::{OutputFormat, PacketFormat};
use serde::Deserialize;

/// Optional TOML configuration. Every key present here overrides the
/// matching command-line flag.
///
/// ```toml
/// port = 5300
/// output = "laps.tsv"
/// output_format = "tsv"
/// append = false
/// packet_format = "dash"
/// fields = ["timestamp_ms", "speed", "gear"]
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub port: Option<u16>,
    pub output: Option<PathBuf>,
    pub output_format: Option<OutputFormat>,
    pub append: Option<bool>,
    pub packet_format: Option<PacketFormat>,
    pub fields: Option<Vec<String>>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}

/// Values taken from the command line before merging.
#[derive(Debug, Default)]
pub struct FlagValues {
    pub port: Option<u16>,
    pub output: Option<PathBuf>,
    pub output_format: Option<OutputFormat>,
    pub append: bool,
    pub packet_format: Option<PacketFormat>,
    pub fields: Option<Vec<String>>,
}

/// Fully resolved recording settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub port: Option<u16>,
    pub output: Option<PathBuf>,
    pub output_format: OutputFormat,
    pub append: bool,
    pub packet_format: PacketFormat,
    pub fields: Option<Vec<String>>,
}

impl Settings {
    pub fn merge(flags: FlagValues, file: FileConfig) -> Self {
        Self {
            port: file.port.or(flags.port),
            output: file.output.or(flags.output),
            output_format: file.output_format.or(flags.output_format).unwrap_or_default(),
            append: file.append.unwrap_or(flags.append),
            packet_format: file.packet_format.or(flags.packet_format).unwrap_or_default(),
            fields: file.fields.or(flags.fields),
        }
    }
}
