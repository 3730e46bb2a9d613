use crate::vulnerability_scanning::domain::{CveRecord, ScanTarget};
use crate::shared::Result;
use regex::Regex;

/// Maximum number of records returned for a brand/model/version match
pub const MAX_DEVICE_MATCHES: usize = 50;

/// Maximum number of records returned for a keyword search
pub const MAX_KEYWORD_MATCHES: usize = 30;

/// Case-insensitive literal matcher for a user-supplied term
fn literal_pattern(term: &str) -> Result<Regex> {
    Ok(Regex::new(&format!("(?i){}", regex::escape(term.trim())))?)
}

/// Vendor and product names in NVD feeds use underscores for spaces
fn field_text(value: &str) -> String {
    value.replace('_', " ")
}

/// CveMatcher - Matches local CVE records against a device.
///
/// A record matches only when brand, model and version all match. Brand and
/// model may appear in the description or in the vendor/product fields; the
/// version may appear in the description or must equal one of the listed
/// affected versions.
#[derive(Debug)]
pub struct CveMatcher {
    brand: Regex,
    model: Regex,
    version: Regex,
    version_literal: String,
}

impl CveMatcher {
    pub fn for_target(target: &ScanTarget) -> Result<Self> {
        Ok(Self {
            brand: literal_pattern(&target.brand)?,
            model: literal_pattern(&target.model)?,
            version: literal_pattern(&target.version)?,
            version_literal: target.version.trim().to_lowercase(),
        })
    }

    pub fn matches(&self, record: &CveRecord) -> bool {
        let brand = self.brand.is_match(&record.description)
            || record
                .vendors
                .iter()
                .any(|v| self.brand.is_match(&field_text(v)));
        let model = self.model.is_match(&record.description)
            || record
                .products
                .iter()
                .any(|p| self.model.is_match(&field_text(p)));
        let version = self.version.is_match(&record.description)
            || record
                .versions
                .iter()
                .any(|v| v.trim().to_lowercase() == self.version_literal);

        brand && model && version
    }

    /// Returns up to [`MAX_DEVICE_MATCHES`] matching records, in input order.
    pub fn match_device<'a, I>(target: &ScanTarget, records: I) -> Result<Vec<CveRecord>>
    where
        I: IntoIterator<Item = &'a CveRecord>,
    {
        let matcher = Self::for_target(target)?;
        Ok(records
            .into_iter()
            .filter(|record| matcher.matches(record))
            .take(MAX_DEVICE_MATCHES)
            .cloned()
            .collect())
    }

    /// Returns up to [`MAX_KEYWORD_MATCHES`] records whose description
    /// contains any of the keywords. Blank keywords are ignored.
    pub fn match_keywords<'a, I>(keywords: &[String], records: I) -> Result<Vec<CveRecord>>
    where
        I: IntoIterator<Item = &'a CveRecord>,
    {
        let patterns = keywords
            .iter()
            .filter(|k| !k.trim().is_empty())
            .map(|k| literal_pattern(k))
            .collect::<Result<Vec<_>>>()?;

        if patterns.is_empty() {
            return Ok(Vec::new());
        }

        Ok(records
            .into_iter()
            .filter(|record| patterns.iter().any(|p| p.is_match(&record.description)))
            .take(MAX_KEYWORD_MATCHES)
            .cloned()
            .collect())
    }
}
