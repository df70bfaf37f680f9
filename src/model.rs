use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One row scraped from a county clerk search-results table, immutable once
/// received. Recorded dates are normalized to ISO dates (or null) upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSearchResult {
    pub grantor: Option<String>,
    pub grantee: Option<String>,
    pub doc_type: Option<String>,
    pub recorded_date: Option<NaiveDate>,
    pub doc_number: Option<String>,
    pub book_vol_page: Option<String>,
    pub legal_description: Option<String>,
    pub doc_link: Option<String>,
    pub search_term: Option<String>,
    pub source_county: String,
}

/// Structured fields extracted from one legal-description string.
///
/// `misc_legal` holds whatever text the classifier could not place, plus
/// `st: <phrase>` breadcrumbs for noise phrases stripped from the survey
/// name. It never duplicates text extracted into another field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedLegalFields {
    #[serde(rename = "abstract_num")]
    pub abstract_number: Option<String>,
    pub survey_name: Option<String>,
    pub acreage: Option<f64>,
    pub subdivision: Option<String>,
    pub case_number: Option<String>,
    pub misc_legal: Option<String>,
}

/// A raw result joined with its parsed fields, not yet prioritized.
#[derive(Debug, Clone)]
pub struct ParsedRecord {
    pub raw: RawSearchResult,
    pub legal: ParsedLegalFields,
}

/// Final pipeline output: priority 1 (exact abstract match) through 8
/// (catch-all), assigned once and never re-scored. Tier 6 and above are
/// candidates for the downstream OCR re-extraction pass.
#[derive(Debug, Clone, Serialize)]
pub struct RankedRecord {
    #[serde(flatten)]
    pub raw: RawSearchResult,
    #[serde(flatten)]
    pub legal: ParsedLegalFields,
    pub priority: u8,
    pub needs_ocr_escalation: bool,
}

/// Per-investigation matching criteria, read-only during ranking.
#[derive(Debug, Clone)]
pub struct TargetCriteria {
    pub abstract_number: String,
    pub survey_name: String,
    pub previous_ownership_date: Option<NaiveDate>,
    pub next_ownership_date: Option<NaiveDate>,
}
