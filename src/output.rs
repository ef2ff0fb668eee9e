//! Rendering of check reports: table, JSON, or YAML, to stdout or a file.

use std::fmt;
use std::fs;
use std::io::Write;
use std::path::Path;

use chrono::SecondsFormat;
use comfy_table::Table;
use strum_macros::{Display, EnumString};
use tempfile::NamedTempFile;

use crate::checker::CheckReport;

/// Supported report renderings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Yaml,
}

/// Renders the report in the requested format.
///
/// The returned string always ends with a newline. Table output contains
/// only the certificate rows; failures are the caller's concern (they go to
/// stderr, see [`write_report`]).
pub fn render(report: &CheckReport, format: OutputFormat) -> Result<String, OutputError> {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(report)
            .map_err(|e| OutputError::Render(e.to_string()))?,
        OutputFormat::Yaml => {
            serde_yaml::to_string(report).map_err(|e| OutputError::Render(e.to_string()))?
        }
        OutputFormat::Table => render_table(report),
    };
    Ok(ensure_trailing_newline(rendered))
}

/// Renders the report and writes it to stdout, or to `output_file` when
/// given. In table mode any failures are listed on stderr afterwards.
pub fn write_report(
    report: &CheckReport,
    format: OutputFormat,
    output_file: Option<&Path>,
) -> Result<(), OutputError> {
    let rendered = render(report, format)?;
    match output_file {
        None => print!("{rendered}"),
        Some(path) => write_output_file(path, rendered.as_bytes())?,
    }

    if format == OutputFormat::Table && report.has_failures() {
        eprintln!("\nErrors encountered:");
        for failure in &report.errors {
            eprintln!("  {}: {}", failure.host, failure.error);
        }
        eprintln!();
    }
    Ok(())
}

fn render_table(report: &CheckReport) -> String {
    let mut table = Table::new();
    table.set_header(vec![
        "Host",
        "Common Name",
        "DNS Names",
        "Not Before",
        "Not After",
        "PublicKeyAlgorithm",
        "Issuer",
    ]);
    for cert in &report.certificates {
        table.add_row(vec![
            cert.host.clone(),
            cert.common_name.clone(),
            cert.dns_names.join("\n"),
            cert.not_before.to_rfc3339_opts(SecondsFormat::Secs, true),
            cert.not_after.to_rfc3339_opts(SecondsFormat::Secs, true),
            cert.public_key_algorithm.clone(),
            cert.issuer.clone(),
        ]);
    }
    table.to_string()
}

/// Replaces `path` atomically: the rendered report lands in a temporary
/// file in the same directory which is then renamed over the destination.
/// An existing destination keeps its permission bits.
fn write_output_file(path: &Path, data: &[u8]) -> Result<(), OutputError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| OutputError::Io(e.to_string()))?;

    match fs::metadata(path) {
        Ok(meta) => {
            fs::set_permissions(tmp.path(), meta.permissions())
                .map_err(|e| OutputError::Io(e.to_string()))?;
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            set_default_mode(tmp.as_file())?;
        }
        Err(e) => return Err(OutputError::Io(e.to_string())),
    }

    tmp.write_all(data).map_err(|e| OutputError::Io(e.to_string()))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| OutputError::Io(e.to_string()))?;
    tmp.persist(path)
        .map_err(|e| OutputError::Io(e.error.to_string()))?;
    Ok(())
}

#[cfg(unix)]
fn set_default_mode(file: &fs::File) -> Result<(), OutputError> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(0o644))
        .map_err(|e| OutputError::Io(e.to_string()))
}

#[cfg(not(unix))]
fn set_default_mode(_file: &fs::File) -> Result<(), OutputError> {
    Ok(())
}

fn ensure_trailing_newline(mut content: String) -> String {
    if !content.ends_with('\n') {
        content.push('\n');
    }
    content
}

/// Errors raised while rendering or writing a report.
#[derive(Debug)]
pub enum OutputError {
    /// Serialization failed
    Render(String),
    /// The output file could not be written
    Io(String),
}

impl fmt::Display for OutputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputError::Render(msg) => write!(f, "error rendering output: {}", msg),
            OutputError::Io(msg) => write!(f, "error writing output file: {}", msg),
        }
    }
}

impl std::error::Error for OutputError {}
