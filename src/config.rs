//! Front-end configuration: defaults, then a JSON file, then `GRAYHUFF_*`
//! environment variables, then command-line flags.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CodecError, Result};

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "GRAYHUFF_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Directory that receives `.bin` / `_codes.json` / `_stats.json` artifacts
    pub output_dir: PathBuf,
    /// Decompress right after compressing and compare against the input
    pub verify_roundtrip: bool,
    /// Indent the code table JSON
    pub pretty_code_table: bool,
    /// Write the `_stats.json` sidecar
    pub write_stats: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("test/output"),
            verify_roundtrip: false,
            pretty_code_table: false,
            write_stats: true,
        }
    }
}

impl CodecConfig {
    pub fn validate(&self) -> Result<()> {
        if self.output_dir.as_os_str().is_empty() {
            return Err(CodecError::configuration("output_dir must not be empty"));
        }
        Ok(())
    }

    /// Apply `{prefix}OUTPUT_DIR`, `{prefix}VERIFY`, `{prefix}PRETTY_CODES`
    /// and `{prefix}WRITE_STATS` on top of `self`.
    pub fn with_env_prefix(mut self, prefix: &str) -> Result<Self> {
        if let Ok(dir) = std::env::var(format!("{}OUTPUT_DIR", prefix)) {
            self.output_dir = PathBuf::from(dir);
        }
        self.verify_roundtrip = parse_env_bool(&format!("{}VERIFY", prefix), self.verify_roundtrip);
        self.pretty_code_table =
            parse_env_bool(&format!("{}PRETTY_CODES", prefix), self.pretty_code_table);
        self.write_stats = parse_env_bool(&format!("{}WRITE_STATS", prefix), self.write_stats);
        self.validate()?;
        Ok(self)
    }

    pub fn from_env() -> Result<Self> {
        Self::default().with_env_prefix(ENV_PREFIX)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let serialized = serde_json::to_string_pretty(self).map_err(|e| {
            CodecError::configuration(format!("Failed to serialize config: {}", e))
        })?;
        std::fs::write(path, serialized).map_err(|e| {
            CodecError::configuration(format!("Failed to write config file: {}", e))
        })?;
        Ok(())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CodecError::configuration(format!("Failed to read config file: {}", e))
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            CodecError::configuration(format!("Failed to parse config file: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }
}

/// Parse an environment variable, keeping `default` when unset or unparsable
pub fn parse_env_var<T: FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

/// Accepts `1/0`, `true/false`, `yes/no`, `on/off`
pub fn parse_env_bool(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(value) => match value.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}
