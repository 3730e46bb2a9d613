pub mod ai_response;
mod cve_matcher;
mod result_merger;
mod web_hit_filter;

pub use cve_matcher::{CveMatcher, MAX_DEVICE_MATCHES, MAX_KEYWORD_MATCHES};
pub use result_merger::{
    ResultMerger, ScanEvidence, CORROBORATED_CONFIDENCE, DEFAULT_AI_CONFIDENCE, LOCAL_CONFIDENCE,
    WEB_CORROBORATION_BONUS,
};
pub use web_hit_filter::{extract_cve_ids, FilteredHits, WebHitFilter};
