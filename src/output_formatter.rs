use crate::errors::Result;
use crate::replacer::{PassMode, PassReport};
use serde::Serialize;
use std::io::Write;

/// Defines the possible formats for pass summaries.
#[derive(clap::ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// A single human-readable sentence.
    #[default]
    Text,
    /// One JSON object per pass, suitable for machine processing.
    Json,
}

/// Handles the formatting of pass summaries.
///
/// The preview diff itself is always written by the replacer; this only covers the
/// line (or JSON object) that closes each pass and the abort notice.
pub struct OutputFormatter {
    format: OutputFormat,
    tool_name: String,
    tool_version: String,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            tool_name: "sar".to_string(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Writes the summary of a finished pass.
    pub fn write_summary<W: Write>(&self, writer: &mut W, report: &PassReport) -> Result<()> {
        let output = match self.format {
            OutputFormat::Text => self.format_text(report),
            OutputFormat::Json => self.format_json(report)?,
        };
        writeln!(writer, "{output}")?;
        Ok(())
    }

    /// Writes the notice shown when the operator declines the previewed changes.
    pub fn write_declined<W: Write>(&self, writer: &mut W) -> Result<()> {
        if self.format == OutputFormat::Text {
            writeln!(writer, "Aborted. No files were changed.")?;
        }
        Ok(())
    }

    fn format_text(&self, report: &PassReport) -> String {
        let count = report.match_count();
        match (report.mode, count) {
            (PassMode::Preview, 0) => "No files would be changed.".to_string(),
            (PassMode::Preview, n) => format!("Preview complete. {n} files would be changed."),
            (PassMode::Write, 0) => "No files were changed.".to_string(),
            (PassMode::Write, n) => format!("Write complete. {n} files have been changed."),
        }
    }

    fn format_json(&self, report: &PassReport) -> Result<String> {
        #[derive(Serialize)]
        struct JsonSummary<'a> {
            tool: ToolInfo<'a>,
            mode: PassMode,
            files_changed: usize,
            files_visited: usize,
            binary_skipped: usize,
            files: Vec<String>,
        }

        #[derive(Serialize)]
        struct ToolInfo<'a> {
            name: &'a str,
            version: &'a str,
        }

        let summary = JsonSummary {
            tool: ToolInfo {
                name: &self.tool_name,
                version: &self.tool_version,
            },
            mode: report.mode,
            files_changed: report.match_count(),
            files_visited: report.files_visited,
            binary_skipped: report.binary_skipped,
            files: report
                .changed_files
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
        };

        Ok(serde_json::to_string(&summary)?)
    }
}
