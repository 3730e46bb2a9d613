use crate::shared::error::VulnTrackError;
use crate::shared::Result;
use crate::vulnerability_scanning::domain::{AiAnalysis, ScanTarget, WebHit};

/// Number of filtered hits included in the analysis prompt
pub const MAX_PROMPT_HITS: usize = 5;

/// Builds the analysis prompt for the knowledge service.
pub fn build_prompt(target: &ScanTarget, hits: &[WebHit]) -> String {
    let mut evidence = String::new();
    for (index, hit) in hits.iter().take(MAX_PROMPT_HITS).enumerate() {
        evidence.push_str(&format!(
            "{}. {}\n   {}\n   Source: {}\n",
            index + 1,
            hit.title,
            hit.description,
            hit.url
        ));
    }

    format!(
        r#"You are a network security analyst. Analyze the search results below for known vulnerabilities affecting this device.

Device:
- Brand: {brand}
- Model: {model}
- Firmware version: {version}

Search results:
{evidence}
Only report vulnerabilities that affect this exact model and firmware version. Discard results about other models or versions and count them as false positives.

Respond with pure JSON only, no markdown, using this structure:
{{
  "vulnerability_found": true,
  "confidence_score": 0.0,
  "vulnerabilities": [
    {{"cve_id": "CVE-YYYY-NNNN", "severity": "critical|high|medium|low", "description": "...", "source_url": "...", "remediation": "..."}}
  ],
  "summary": "...",
  "recommendations": ["..."],
  "false_positives_filtered": 0
}}"#,
        brand = target.brand,
        model = target.model,
        version = target.version,
        evidence = evidence,
    )
}

/// Strips a surrounding markdown code fence (```json or ```) if present.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the info string ("json") on the opening fence line
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

/// Parses the model's text answer into an [`AiAnalysis`].
///
/// The confidence score is clamped to `[0, 1]`.
pub fn parse_analysis(text: &str) -> Result<AiAnalysis> {
    let json = strip_code_fences(text);
    let mut analysis: AiAnalysis = serde_json::from_str(json).map_err(|e| {
        VulnTrackError::external("AI analysis", format!("unparseable model response: {}", e))
    })?;

    analysis.confidence_score = analysis.confidence_score.map(|c| c.clamp(0.0, 1.0));
    Ok(analysis)
}
