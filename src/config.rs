use directories_next::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load config file: {0}")]
    Io(#[from] io::Error),

    #[error("failed to deserialize config file: {0}")]
    Deserialize(#[from] toml::de::Error),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// The machine code.
    #[default]
    Binary,
    /// A line per instruction with its address, opcode and mnemonic.
    Listing,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AssemblerConfig {
    /// Address of the first instruction.
    pub base: u16,
    /// Report every failing statement instead of stopping at the first.
    pub keep_going: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Extension of the binary written next to the input when no output is given.
    pub extension: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { format: OutputFormat::Binary, extension: "gb".to_string() }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub assembler: AssemblerConfig,
    pub output: OutputConfig,
}

impl Config {
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        Self::parse(&fs::read_to_string(path)?)
    }

    /// 'config.toml' in the user's config directory.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "gbasm").map(|project| project.config_dir().join("config.toml"))
    }

    /// Load the config file from the default path. Falls back to the default config if there
    /// isn't one or it fails to load.
    pub fn from_default_file() -> Self {
        let Some(path) = Self::default_path() else {
            warn!("failed to find config directory");
            return Self::default();
        };
        if !path.exists() {
            debug!("no config file at '{}'", path.display());
            return Self::default();
        }
        match Self::from_file(&path) {
            Ok(config) => {
                debug!("loaded config file '{}'", path.display());
                config
            }
            Err(err) => {
                warn!("ignoring config file '{}': {err}", path.display());
                Self::default()
            }
        }
    }
}

#[test]
fn full() {
    let config = Config::parse(
        r#"
        [assembler]
        base = 0x150
        keep_going = true

        [output]
        format = "listing"
        extension = "bin"
        "#,
    )
    .unwrap();
    assert_eq!(config.assembler, AssemblerConfig { base: 0x150, keep_going: true });
    assert_eq!(config.output.format, OutputFormat::Listing);
    assert_eq!(config.output.extension, "bin");
}

#[test]
fn defaults() {
    assert_eq!(Config::parse("").unwrap(), Config::default());

    let config = Config::parse("[output]\nformat = \"binary\"").unwrap();
    assert_eq!(config.assembler.base, 0);
    assert_eq!(config.output.extension, "gb");
}

#[test]
fn malformed() {
    assert!(matches!(
        Config::parse("[output]\nformat = \"hex\""),
        Err(ConfigError::Deserialize(_)),
    ));
    assert!(matches!(
        Config::parse("[assembler]\nbase = 0x10000"),
        Err(ConfigError::Deserialize(_)),
    ));
}

#[test]
fn missing_file() {
    let path = Path::new("this/config/does/not/exist.toml");
    assert!(matches!(Config::from_file(path), Err(ConfigError::Io(_))));
}
