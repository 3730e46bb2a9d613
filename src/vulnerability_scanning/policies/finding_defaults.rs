use crate::vulnerability_scanning::domain::{ScanMethod, ScanReport, Severity, Vulnerability};

/// FindingDefaults policy for filling gaps in findings before they are
/// reported or persisted.
///
/// Local records and AI answers are often incomplete; persisted scan results
/// and catalog entries always carry a description, a remediation and an
/// affected-software field.
pub struct FindingDefaults;

impl FindingDefaults {
    pub const REMEDIATION: &'static str = "No remediation provided.";
    pub const AFFECTED_SOFTWARE: &'static str = "Not specified.";
    pub const DESCRIPTION: &'static str = "No description provided.";

    pub fn remediation(vulnerability: &Vulnerability) -> String {
        non_blank(vulnerability.remediation.as_deref()).unwrap_or_else(|| Self::REMEDIATION.to_string())
    }

    pub fn affected_software(vulnerability: &Vulnerability) -> String {
        non_blank(vulnerability.affected_software.as_deref())
            .unwrap_or_else(|| Self::AFFECTED_SOFTWARE.to_string())
    }

    pub fn description(vulnerability: &Vulnerability) -> String {
        non_blank(Some(vulnerability.description.as_str()))
            .unwrap_or_else(|| Self::DESCRIPTION.to_string())
    }

    /// One-line summary used when the AI did not supply one
    pub fn summary(target_label: &str, vulnerabilities: &[Vulnerability], method: ScanMethod) -> String {
        if vulnerabilities.is_empty() {
            return format!("No known vulnerabilities found for {}", target_label);
        }

        let count = |severity: Severity| {
            vulnerabilities
                .iter()
                .filter(|v| v.severity == severity)
                .count()
        };
        format!(
            "Found {} vulnerabilities for {} via {} ({} critical, {} high, {} medium, {} low)",
            vulnerabilities.len(),
            target_label,
            method,
            count(Severity::Critical),
            count(Severity::High),
            count(Severity::Medium),
            count(Severity::Low),
        )
    }

    /// Recommendations used when the AI did not supply any
    pub fn recommendations(report: &ScanReport) -> Vec<String> {
        match report.highest_severity() {
            Some(Severity::Critical) | Some(Severity::High) => vec![
                "Apply the vendor's security patches or upgrade the firmware immediately".to_string(),
                "Restrict management interfaces to trusted networks until patched".to_string(),
            ],
            Some(_) => vec![
                "Schedule a firmware upgrade during the next maintenance window".to_string(),
            ],
            None => Vec::new(),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
