//! Run configuration: host sources, retrieval parameters, output selection.
//!
//! Hosts come from exactly one of three sources: an inline comma-separated
//! list, a newline-separated domains file (with an optional line window), or
//! a YAML config file with a top-level `hosts:` list. Validation happens
//! before anything is dialed, so a malformed entry fails the run up front
//! with its position in the input.
//!
//! # Example Configuration File
//!
//! ```yaml
//! hosts:
//!   - example.com
//!   - example.com:8443
//!   - "[2001:db8::1]:443"
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::checker::{CheckOptions, DEFAULT_TIMEOUT_SECS};
use crate::host::HostDescriptor;
use crate::output::OutputFormat;

/// YAML configuration file contents.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// List of hosts to check
    pub hosts: Vec<String>,
}

impl Config {
    /// Loads a `hosts:` list from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "config file path cannot be empty".to_string(),
            ));
        }
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        let config: Config =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        if config.hosts.is_empty() {
            return Err(ConfigError::Validation(
                "config file does not define any hosts".to_string(),
            ));
        }
        Ok(config)
    }
}

/// Splits a comma-separated host list, dropping empty entries.
pub fn parse_domains_from_string(input: &str) -> Result<Vec<String>, ConfigError> {
    let entries: Vec<String> = input
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(String::from)
        .collect();
    if entries.is_empty() {
        return Err(ConfigError::Validation(
            "no domains found in input".to_string(),
        ));
    }
    for entry in &entries {
        HostDescriptor::parse(entry).map_err(|e| ConfigError::Validation(e.to_string()))?;
    }
    Ok(entries)
}

/// Reads one host per line from a file.
pub fn parse_domains_from_file<P: AsRef<Path>>(path: P) -> Result<Vec<String>, ConfigError> {
    parse_domains_from_file_range(path, 0, 0)
}

/// Reads hosts from a window of a file's lines: the first `skip` lines are
/// ignored and at most `limit` lines are considered afterwards (0 meaning no
/// limit). Blank lines inside the window are dropped; an invalid entry is
/// reported with its original line number.
pub fn parse_domains_from_file_range<P: AsRef<Path>>(
    path: P,
    skip: usize,
    limit: usize,
) -> Result<Vec<String>, ConfigError> {
    let path = path.as_ref();
    if path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "domains file path cannot be empty".to_string(),
        ));
    }
    let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;

    let mut domains = Vec::new();
    for (line_number, line) in content.lines().enumerate().skip(skip) {
        if limit > 0 && line_number >= skip + limit {
            break;
        }
        let entry = line.trim();
        if entry.is_empty() {
            continue;
        }
        HostDescriptor::parse(entry).map_err(|e| {
            ConfigError::Validation(format!("line {}: {}", line_number + 1, e))
        })?;
        domains.push(entry.to_string());
    }

    if domains.is_empty() {
        return Err(ConfigError::Validation(
            "no valid domains found in the selected range".to_string(),
        ));
    }
    Ok(domains)
}

/// Fully resolved invocation parameters, assembled by the CLI layer.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub config_file: Option<PathBuf>,
    pub domains: Option<String>,
    pub domains_file: Option<PathBuf>,
    pub domains_file_skip: usize,
    pub domains_file_limit: usize,
    /// Per-host dial-and-handshake timeout in whole seconds.
    pub timeout_secs: u64,
    /// Skip chain and hostname verification.
    pub insecure: bool,
    /// Requested output format; empty means table.
    pub output_format: String,
    pub output_file: Option<PathBuf>,
    pub prometheus: bool,
    pub prometheus_address: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            config_file: None,
            domains: None,
            domains_file: None,
            domains_file_skip: 0,
            domains_file_limit: 0,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            insecure: false,
            output_format: String::new(),
            output_file: None,
            prometheus: false,
            prometheus_address: "http://localhost:9091".to_string(),
        }
    }
}

impl AppConfig {
    /// Checks the cross-field rules before any host is parsed or dialed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sources = [
            self.config_file.is_some(),
            self.domains.is_some(),
            self.domains_file.is_some(),
        ]
        .iter()
        .filter(|present| **present)
        .count();
        if sources == 0 {
            return Err(ConfigError::Validation(
                "one of --config, --domains or --domains-file is required".to_string(),
            ));
        }
        if sources > 1 {
            return Err(ConfigError::Validation(
                "--config, --domains and --domains-file are mutually exclusive".to_string(),
            ));
        }
        if (self.domains_file_skip > 0 || self.domains_file_limit > 0)
            && self.domains_file.is_none()
        {
            return Err(ConfigError::Validation(
                "--domains-file-skip and --domains-file-limit require --domains-file".to_string(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "timeout must be greater than zero".to_string(),
            ));
        }
        self.resolved_output_format()?;
        Ok(())
    }

    /// Resolves the configured host source into the ordered input list.
    pub fn hosts(&self) -> Result<Vec<HostDescriptor>, ConfigError> {
        let raw = if let Some(path) = &self.config_file {
            Config::from_file(path)?.hosts
        } else if let Some(domains) = &self.domains {
            parse_domains_from_string(domains)?
        } else if let Some(path) = &self.domains_file {
            parse_domains_from_file_range(path, self.domains_file_skip, self.domains_file_limit)?
        } else {
            return Err(ConfigError::Validation(
                "no host source configured".to_string(),
            ));
        };

        let mut hosts = Vec::with_capacity(raw.len());
        for entry in &raw {
            hosts.push(
                HostDescriptor::parse(entry)
                    .map_err(|e| ConfigError::Validation(e.to_string()))?,
            );
        }
        if hosts.is_empty() {
            return Err(ConfigError::Validation("host list is empty".to_string()));
        }
        Ok(hosts)
    }

    pub fn resolved_output_format(&self) -> Result<OutputFormat, ConfigError> {
        if self.output_format.is_empty() {
            return Ok(OutputFormat::Table);
        }
        self.output_format.parse().map_err(|_| {
            ConfigError::Validation(format!(
                "unsupported output format: {}",
                self.output_format
            ))
        })
    }

    pub fn check_options(&self) -> CheckOptions {
        CheckOptions {
            timeout: Duration::from_secs(self.timeout_secs),
            insecure: self.insecure,
        }
    }
}

/// Errors that can occur while assembling the run configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error (file not found, permission denied, etc.)
    Io(String),
    /// YAML parsing error
    Parse(String),
    /// Cross-field or per-entry validation error
    Validation(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "IO Error: {}", msg),
            ConfigError::Parse(msg) => write!(f, "Parse Error: {}", msg),
            ConfigError::Validation(msg) => write!(f, "Validation Error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
