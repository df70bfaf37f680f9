use std::cmp::Reverse;
use std::collections::BTreeSet;

use chrono::NaiveDate;
use strsim::normalized_levenshtein;
use tracing::warn;

use crate::model::{ParsedRecord, RankedRecord, TargetCriteria};

/// Instrument types that rank in the judgment/affidavit tier when nothing
/// stronger matched.
const JUDGMENT_DOC_TYPE_KEYWORDS: [&str; 4] = ["JUDGMENT", "AFFIDAVIT", "HEIRSHIP", "CC JUDGMT"];

/// Records at or above this tier are handed to the OCR collaborator for
/// re-extraction after download.
pub const OCR_ESCALATION_TIER: u8 = 6;

/// Assigns each record a confidence tier against the target abstract/survey
/// and produces the batch download order.
pub struct DocumentRanker {
    target_abstract: String,
    target_survey: String,
}

impl DocumentRanker {
    pub fn new(criteria: &TargetCriteria) -> Self {
        Self {
            target_abstract: criteria.abstract_number.trim().to_uppercase(),
            target_survey: criteria.survey_name.trim().to_uppercase(),
        }
    }

    /// Scores and orders a batch. The output always has the same length as
    /// the input; low-confidence records are flagged, never dropped.
    pub fn rank(&self, records: Vec<ParsedRecord>) -> Vec<RankedRecord> {
        let mut ranked = records
            .into_iter()
            .map(|record| {
                let priority = self.priority_for(&record);
                RankedRecord {
                    raw: record.raw,
                    legal: record.legal,
                    priority,
                    needs_ocr_escalation: priority >= OCR_ESCALATION_TIER,
                }
            })
            .collect::<Vec<RankedRecord>>();

        let unclassified = ranked.iter().filter(|r| r.priority == 8).count();
        if unclassified > 0 {
            warn!(
                count = unclassified,
                "records fell into the catch-all tier; classification rules may not cover this county's formats"
            );
        }

        // Three successive stable sorts, least significant key first:
        // recency, then deed-type precedence, then confidence tier.
        ranked.sort_by_key(|r| Reverse(r.raw.recorded_date.unwrap_or(NaiveDate::MIN)));
        ranked.sort_by_key(|r| u8::from(!is_deed_type(r.raw.doc_type.as_deref())));
        ranked.sort_by_key(|r| r.priority);

        ranked
    }

    fn priority_for(&self, record: &ParsedRecord) -> u8 {
        let legal = &record.legal;
        let abstract_number = normalize_field(legal.abstract_number.as_deref());
        let survey_name = normalize_field(legal.survey_name.as_deref());

        // Tier 1: exact abstract number match.
        if !abstract_number.is_empty()
            && !self.target_abstract.is_empty()
            && abstract_number == self.target_abstract
        {
            return 1;
        }

        if !survey_name.is_empty() && !self.target_survey.is_empty() {
            // Tier 2: one survey name contains the other.
            if survey_name.contains(&self.target_survey)
                || self.target_survey.contains(&survey_name)
            {
                return 2;
            }

            // Tiers 3-5: fuzzy survey match; below 80 falls through.
            let ratio = token_set_ratio(&survey_name, &self.target_survey);
            if ratio >= 95 {
                return 3;
            }
            if ratio >= 90 {
                return 4;
            }
            if ratio >= 80 {
                return 5;
            }
        }

        // Tier 6: nothing identifies the parcel at all.
        let has_identifier = legal.abstract_number.is_some()
            || legal.subdivision.is_some()
            || legal.case_number.is_some()
            || legal.survey_name.is_some();
        if !has_identifier {
            return 6;
        }

        // Tier 7: judgment/affidavit/heirship instruments.
        let doc_type = normalize_field(record.raw.doc_type.as_deref());
        if JUDGMENT_DOC_TYPE_KEYWORDS
            .iter()
            .any(|keyword| doc_type.contains(keyword))
        {
            return 7;
        }

        8
    }
}

fn normalize_field(value: Option<&str>) -> String {
    value.unwrap_or_default().trim().to_uppercase()
}

fn is_deed_type(doc_type: Option<&str>) -> bool {
    normalize_field(doc_type).contains("DEED")
}

/// Token-set similarity in [0, 100]: compares the sorted token
/// intersection against each side's sorted token union, scoring pairs with
/// normalized Levenshtein. Word order and duplicate tokens do not matter.
fn token_set_ratio(a: &str, b: &str) -> u32 {
    let tokens_a = a.split_whitespace().collect::<BTreeSet<&str>>();
    let tokens_b = b.split_whitespace().collect::<BTreeSet<&str>>();

    let intersection = tokens_a
        .intersection(&tokens_b)
        .copied()
        .collect::<Vec<&str>>()
        .join(" ");
    let joined_a = join_tokens(&intersection, tokens_a.difference(&tokens_b).copied());
    let joined_b = join_tokens(&intersection, tokens_b.difference(&tokens_a).copied());

    let score = [
        normalized_levenshtein(&intersection, &joined_a),
        normalized_levenshtein(&intersection, &joined_b),
        normalized_levenshtein(&joined_a, &joined_b),
    ]
    .into_iter()
    .fold(0.0_f64, f64::max);

    (score * 100.0).round() as u32
}

fn join_tokens<'a>(base: &str, rest: impl Iterator<Item = &'a str>) -> String {
    let tail = rest.collect::<Vec<&str>>().join(" ");
    if base.is_empty() {
        tail
    } else if tail.is_empty() {
        base.to_string()
    } else {
        format!("{base} {tail}")
    }
}
