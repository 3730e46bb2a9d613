use crate::application::use_cases::DeviceScanOutcome;
use crate::shared::Result;
use crate::vulnerability_scanning::domain::{ScanReport, ScanTarget, Severity, Vulnerability};
use owo_colors::OwoColorize;
use serde::Serialize;

/// Markdown-style table header for findings
const TABLE_HEADER: &str = "| Severity | CVE ID | CVSS | Confidence | Sources | Finding |\n";

const TABLE_SEPARATOR: &str = "|----------|--------|------|------------|---------|---------|\n";

/// Output format for CLI reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
}

#[derive(Serialize)]
struct BatchEntry<'a> {
    device: &'a ScanTarget,
    attempts: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<&'a ScanReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

/// ReportPrinter renders scan reports for the terminal
///
/// Text output is a short header followed by a findings table; colors are
/// only emitted when `color` is set. JSON output is the serialized report.
pub struct ReportPrinter {
    format: ReportFormat,
    color: bool,
}

impl ReportPrinter {
    pub fn new(format: ReportFormat, color: bool) -> Self {
        Self { format, color }
    }

    fn escape_table_cell(text: &str) -> String {
        text.replace('|', "\\|").replace('\n', " ")
    }

    fn severity_label(&self, severity: Severity) -> String {
        let label = severity.as_str().to_uppercase();
        if !self.color {
            return label;
        }
        match severity {
            Severity::Critical => label.red().bold().to_string(),
            Severity::High => label.red().to_string(),
            Severity::Medium => label.yellow().to_string(),
            Severity::Low => label.cyan().to_string(),
            Severity::Informational => label.dimmed().to_string(),
        }
    }

    fn heading(&self, text: &str) -> String {
        if self.color {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn finding_row(&self, vulnerability: &Vulnerability) -> String {
        let sources: Vec<String> = vulnerability.sources.iter().map(|s| s.to_string()).collect();
        format!(
            "| {} | {} | {} | {:.2} | {} | {} |\n",
            self.severity_label(vulnerability.severity),
            vulnerability
                .cve_id
                .as_ref()
                .map(|c| c.as_str())
                .unwrap_or("-"),
            vulnerability
                .cvss_score
                .map(|s| format!("{:.1}", s.value()))
                .unwrap_or_else(|| "-".to_string()),
            vulnerability.confidence,
            sources.join(", "),
            Self::escape_table_cell(&vulnerability.name),
        )
    }

    /// Renders one device's report
    pub fn render_report(&self, target: &ScanTarget, report: &ScanReport) -> Result<String> {
        if self.format == ReportFormat::Json {
            return Ok(serde_json::to_string_pretty(report)?);
        }

        let mut out = String::new();
        out.push_str(&self.heading(&format!("Scan report: {}", target.label())));
        out.push('\n');
        out.push_str(&format!(
            "Method: {}  Confidence: {:.2}\n",
            report.method, report.confidence_score
        ));
        if !report.degraded_sources.is_empty() {
            let warning = format!("Degraded sources: {}", report.degraded_sources.join(", "));
            if self.color {
                out.push_str(&warning.yellow().to_string());
            } else {
                out.push_str(&warning);
            }
            out.push('\n');
        }
        out.push('\n');

        if report.has_vulnerabilities() {
            out.push_str(TABLE_HEADER);
            out.push_str(TABLE_SEPARATOR);
            for vulnerability in &report.vulnerabilities {
                out.push_str(&self.finding_row(vulnerability));
            }
            out.push('\n');
        }

        out.push_str(&format!("{}\n", report.summary));
        if !report.recommendations.is_empty() {
            out.push('\n');
            out.push_str(&self.heading("Recommendations:"));
            out.push('\n');
            for recommendation in &report.recommendations {
                out.push_str(&format!("  - {}\n", recommendation));
            }
        }
        Ok(out)
    }

    /// Renders every outcome of a batch, failures included
    pub fn render_batch(&self, outcomes: &[DeviceScanOutcome]) -> Result<String> {
        if self.format == ReportFormat::Json {
            let entries: Vec<BatchEntry<'_>> = outcomes
                .iter()
                .map(|outcome| BatchEntry {
                    device: &outcome.target,
                    attempts: outcome.attempts,
                    report: outcome.result.as_ref().ok(),
                    error: outcome.result.as_ref().err().map(String::as_str),
                })
                .collect();
            return Ok(serde_json::to_string_pretty(&entries)?);
        }

        let mut out = String::new();
        for outcome in outcomes {
            match &outcome.result {
                Ok(report) => out.push_str(&self.render_report(&outcome.target, report)?),
                Err(error) => {
                    out.push_str(&self.heading(&format!("Scan report: {}", outcome.target.label())));
                    out.push('\n');
                    let line = format!("Scan failed after {} attempts: {}", outcome.attempts, error);
                    if self.color {
                        out.push_str(&line.red().to_string());
                    } else {
                        out.push_str(&line);
                    }
                    out.push('\n');
                }
            }
            out.push('\n');
        }
        Ok(out)
    }
}
