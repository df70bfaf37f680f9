use std::ops::Range;

use anyhow::{Context, Result};
use regex::Regex;
use tracing::{debug, warn};

use crate::acreage;
use crate::model::ParsedLegalFields;

/// Descriptions that carry no parcel information at all. Matching one of
/// these flags the record as low-information instead of mis-parsing it.
const UNINFORMATIVE_PHRASES: [&str; 7] = [
    "MULTIPLE TRACTS SEE INSTRUMENT",
    "MULTIPLE TRACTS",
    "SEE INSTRUMENT",
    "SEE DOCUMENT",
    "N/A",
    "NA",
    "NONE",
];

const ABSTRACT_PATTERNS: [&str; 4] = [
    r"(?i)\bAB\s*#?\s*(\d+)\b",
    r"(?i)\bABST(?:RACT)?\.?\s*(?:NO\.?\s*)?#?\s*(\d+)\b",
    r"(?i)\bA\s*-\s*(\d+)\b",
    r"(?i)\bSURVEY\s*[:#]\s*(\d+)\b",
];

// Number-first forms before the "Acres:" label form; within the
// number-first forms, mixed before fraction before decimal before whole so
// a mixed number is never truncated to its trailing fraction.
const ACREAGE_PATTERNS: [&str; 5] = [
    r"(?i)\(?\s*(\d+\s+\d+\s*/\s*\d+)\s*(?:ACRES|ACRE|ACS|AC)\b\.?\s*\)?",
    r"(?i)\(?\s*(\d+\s*/\s*\d+)\s*(?:ACRES|ACRE|ACS|AC)\b\.?\s*\)?",
    r"(?i)\(?\s*(\d*\.\d+)\s*(?:ACRES|ACRE|ACS|AC)\b\.?\s*\)?",
    r"(?i)\(?\s*(\d+)\s*(?:ACRES|ACRE|ACS|AC)\b\.?\s*\)?",
    r"(?i)\bACRES?\s*[:=]\s*(\d+(?:\s+\d+)?(?:\s*/\s*\d+)?(?:\.\d+)?)",
];

const SUBDIVISION_PATTERNS: [&str; 6] = [
    r"(?i)\bADD(?:N|ITION)\b",
    r"(?i)\bSUBD(?:IVISION)?\b",
    r"(?i)\bLOTS?\s*\d+",
    r"(?i)\b(?:BLK|BLOCK)\s*\d+",
    r"(?i)\bUNIT\s*\d+",
    r"^\s*\d{3,}\b",
];

const SURVEY_PREFIX_PATTERN: &str = r"(?i)SURVEY\s*-?\s*NAME\s*:?\s*(.+)$";
const SURVEY_SUFFIX_PATTERN: &str = r"(?i)^\s*(.*?\b(?:LEAGUE|SURVEY|SUR|GRANT))\b";

// Labels and suffix words stripped out of a matched survey name. Each
// stripped phrase is preserved in misc_legal as a "st: <phrase>" breadcrumb.
const SURVEY_NOISE_PHRASES: [(&str, &str); 5] = [
    ("SURVEY- NAME:", r"(?i)SURVEY\s*-?\s*NAME\s*:?"),
    ("SURVEY", r"(?i)\bSURVEY\b"),
    ("LEAGUE", r"(?i)\bLEAGUE\b"),
    ("GRANT", r"(?i)\bGRANT\b"),
    ("SUR", r"(?i)\bSUR\b"),
];

/// Classifies one free-text legal description into structured fields using
/// fixed-precedence pattern tables. Each matched substring is removed from
/// the working text so later stages never re-classify it.
pub struct LegalDescriptionParser {
    abstract_patterns: Vec<Regex>,
    acreage_patterns: Vec<Regex>,
    subdivision_patterns: Vec<Regex>,
    survey_prefix: Regex,
    survey_suffix: Regex,
    survey_noise: Vec<(&'static str, Regex)>,
}

impl LegalDescriptionParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            abstract_patterns: compile_table(&ABSTRACT_PATTERNS, "abstract number")?,
            acreage_patterns: compile_table(&ACREAGE_PATTERNS, "acreage")?,
            subdivision_patterns: compile_table(&SUBDIVISION_PATTERNS, "subdivision")?,
            survey_prefix: compile_pattern(SURVEY_PREFIX_PATTERN, "survey prefix")?,
            survey_suffix: compile_pattern(SURVEY_SUFFIX_PATTERN, "survey suffix")?,
            survey_noise: SURVEY_NOISE_PHRASES
                .iter()
                .map(|(label, pattern)| Ok((*label, compile_pattern(pattern, "survey noise")?)))
                .collect::<Result<Vec<(&'static str, Regex)>>>()?,
        })
    }

    pub fn parse(&self, legal_description: Option<&str>, doc_type: Option<&str>) -> ParsedLegalFields {
        let mut fields = ParsedLegalFields::default();

        let description = legal_description.map(str::trim).unwrap_or_default();
        if description.is_empty() {
            return fields;
        }

        // Judgment instruments record a cause number in the legal field, not
        // a land description.
        if is_judgment_doc_type(doc_type) {
            fields.case_number = Some(description.to_string());
            return fields;
        }

        if is_uninformative(description) {
            fields.misc_legal = Some(description.to_string());
            return fields;
        }

        let mut working = description.to_string();
        let mut breadcrumbs: Vec<String> = Vec::new();

        for pattern in &self.abstract_patterns {
            let Some(caps) = pattern.captures(&working) else {
                continue;
            };
            if let (Some(full), Some(group)) = (caps.get(0), caps.get(1)) {
                let digits = group
                    .as_str()
                    .chars()
                    .filter(char::is_ascii_digit)
                    .collect::<String>();
                let range = full.range();
                if !digits.is_empty() {
                    fields.abstract_number = Some(digits);
                }
                remove_range(&mut working, range);
            }
            break;
        }

        for pattern in &self.acreage_patterns {
            let Some(caps) = pattern.captures(&working) else {
                continue;
            };
            if let (Some(full), Some(group)) = (caps.get(0), caps.get(1)) {
                match acreage::normalize(group.as_str()) {
                    Ok(Some(value)) => fields.acreage = Some(value),
                    Ok(None) => {
                        debug!(text = group.as_str(), "acreage phrase matched but no numeric form found");
                    }
                    Err(error) => {
                        warn!(text = group.as_str(), error = %error, "malformed acreage expression");
                    }
                }
                let range = full.range();
                remove_range(&mut working, range);
            }
            break;
        }

        // Subdivision classification is terminal: the whole remaining text
        // is the subdivision and survey extraction never runs.
        if self
            .subdivision_patterns
            .iter()
            .any(|pattern| pattern.is_match(&working))
        {
            let remaining = tidy(&working);
            if !remaining.is_empty() {
                fields.subdivision = Some(remaining);
            }
            return fields;
        }

        let mut survey_raw: Option<String> = None;
        if let Some(caps) = self.survey_prefix.captures(&working) {
            if let (Some(full), Some(group)) = (caps.get(0), caps.get(1)) {
                survey_raw = Some(format!("SURVEY- NAME: {}", group.as_str()));
                let range = full.range();
                remove_range(&mut working, range);
            }
        } else if let Some(caps) = self.survey_suffix.captures(&working) {
            if let (Some(full), Some(group)) = (caps.get(0), caps.get(1)) {
                survey_raw = Some(group.as_str().to_string());
                let range = full.range();
                remove_range(&mut working, range);
            }
        } else if fields.abstract_number.is_some() || fields.acreage.is_some() {
            // A record naming an abstract or acreage without an explicit
            // survey suffix is assumed to be naming a survey.
            let remaining = tidy(&working);
            if !remaining.is_empty() {
                survey_raw = Some(remaining);
                working.clear();
            }
        }

        if let Some(raw) = survey_raw {
            let mut name = raw.to_uppercase();
            for (label, pattern) in &self.survey_noise {
                if pattern.is_match(&name) {
                    name = pattern.replace_all(&name, " ").into_owned();
                    breadcrumbs.push(format!("st: {label}"));
                }
            }
            let name = tidy(&name);
            if !name.is_empty() {
                fields.survey_name = Some(name);
            }
        }

        let leftover = tidy(&working);
        let mut misc_parts: Vec<String> = Vec::new();
        if !leftover.is_empty() {
            misc_parts.push(leftover);
        }
        misc_parts.extend(breadcrumbs);
        if !misc_parts.is_empty() {
            fields.misc_legal = Some(misc_parts.join("; "));
        }

        fields
    }
}

fn compile_table(patterns: &[&str], table: &str) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|pattern| compile_pattern(pattern, table))
        .collect()
}

fn compile_pattern(pattern: &str, table: &str) -> Result<Regex> {
    Regex::new(pattern).with_context(|| format!("failed to compile {table} pattern: {pattern}"))
}

fn is_judgment_doc_type(doc_type: Option<&str>) -> bool {
    doc_type
        .map(|value| value.to_uppercase().contains("JUDG"))
        .unwrap_or(false)
}

fn is_uninformative(description: &str) -> bool {
    let normalized = collapse_whitespace(&description.to_uppercase());
    UNINFORMATIVE_PHRASES
        .iter()
        .any(|phrase| normalized == *phrase)
}

fn remove_range(working: &mut String, range: Range<usize>) {
    working.replace_range(range, " ");
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<&str>>().join(" ")
}

/// Collapses whitespace and trims stray separators left behind by pattern
/// removal.
fn tidy(text: &str) -> String {
    collapse_whitespace(text)
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, ',' | '.' | ';' | ':' | '-' | '(' | ')'))
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> LegalDescriptionParser {
        LegalDescriptionParser::new().expect("pattern tables compile")
    }

    #[test]
    fn extracts_abstract_acreage_and_survey() {
        let fields = parser().parse(Some("AB#123 5.44 ACRES SMITH SURVEY"), Some("Warranty Deed"));

        assert_eq!(fields.abstract_number.as_deref(), Some("123"));
        assert_eq!(fields.acreage, Some(5.44));
        assert!(fields.survey_name.as_deref().unwrap_or_default().contains("SMITH"));
        assert!(fields.subdivision.is_none());
        assert!(fields.case_number.is_none());
    }

    #[test]
    fn judgment_doc_type_claims_whole_string_as_case_number() {
        let fields = parser().parse(Some("Cause No. 12-345"), Some("ABSTRACT JUDGEMT"));

        assert_eq!(fields.case_number.as_deref(), Some("Cause No. 12-345"));
        assert!(fields.abstract_number.is_none());
        assert!(fields.survey_name.is_none());
        assert!(fields.acreage.is_none());
        assert!(fields.subdivision.is_none());
        assert!(fields.misc_legal.is_none());
    }

    #[test]
    fn judgment_doc_type_takes_precedence_over_uninformative_phrases() {
        let fields = parser().parse(Some("MULTIPLE TRACTS SEE INSTRUMENT"), Some("CC JUDGMT"));
        assert_eq!(fields.case_number.as_deref(), Some("MULTIPLE TRACTS SEE INSTRUMENT"));
        assert!(fields.misc_legal.is_none());
    }

    #[test]
    fn uninformative_phrase_goes_to_misc_legal_unparsed() {
        for doc_type in ["Warranty Deed", "Deed Of Trust", "Release"] {
            let fields = parser().parse(Some("MULTIPLE TRACTS SEE INSTRUMENT"), Some(doc_type));
            assert_eq!(fields.misc_legal.as_deref(), Some("MULTIPLE TRACTS SEE INSTRUMENT"));
            assert!(fields.abstract_number.is_none());
            assert!(fields.survey_name.is_none());
            assert!(fields.acreage.is_none());
            assert!(fields.subdivision.is_none());
            assert!(fields.case_number.is_none());
        }
    }

    #[test]
    fn subdivision_match_is_terminal_and_takes_remaining_text() {
        let fields = parser().parse(Some("AB 55 OAKRIDGE ADDN LOT 12"), Some("Warranty Deed"));

        assert_eq!(fields.abstract_number.as_deref(), Some("55"));
        assert_eq!(fields.subdivision.as_deref(), Some("OAKRIDGE ADDN LOT 12"));
        assert!(fields.survey_name.is_none());
        assert!(fields.misc_legal.is_none());
    }

    #[test]
    fn remaining_text_becomes_survey_name_when_abstract_present() {
        let fields = parser().parse(Some("A-123 JOHN DOE"), Some("Warranty Deed"));

        assert_eq!(fields.abstract_number.as_deref(), Some("123"));
        assert_eq!(fields.survey_name.as_deref(), Some("JOHN DOE"));
    }

    #[test]
    fn parenthesized_mixed_acreage_with_sur_suffix() {
        let fields = parser().parse(Some("(1 1/2 ACS) WM SMITH SUR"), Some("Warranty Deed"));

        assert_eq!(fields.acreage, Some(1.5));
        assert_eq!(fields.survey_name.as_deref(), Some("WM SMITH"));
        assert_eq!(fields.misc_legal.as_deref(), Some("st: SUR"));
    }

    #[test]
    fn survey_name_label_is_stripped_with_breadcrumb() {
        let fields = parser().parse(Some("Survey- Name: Jane Roe"), Some("Warranty Deed"));

        assert_eq!(fields.survey_name.as_deref(), Some("JANE ROE"));
        let misc = fields.misc_legal.unwrap_or_default();
        assert!(misc.contains("st: SURVEY- NAME:"));
    }

    #[test]
    fn unmatched_tail_is_preserved_in_misc_legal() {
        let fields = parser().parse(Some("AB#123 SMITH SURVEY TRACT 9"), Some("Warranty Deed"));

        assert_eq!(fields.abstract_number.as_deref(), Some("123"));
        assert_eq!(fields.survey_name.as_deref(), Some("SMITH"));
        let misc = fields.misc_legal.unwrap_or_default();
        assert!(misc.contains("TRACT 9"));
        assert!(misc.contains("st: SURVEY"));
    }

    #[test]
    fn empty_or_missing_description_yields_all_absent() {
        assert_eq!(parser().parse(None, Some("Warranty Deed")), ParsedLegalFields::default());
        assert_eq!(parser().parse(Some("   "), Some("Warranty Deed")), ParsedLegalFields::default());
    }

    #[test]
    fn acreage_label_form_is_recognized() {
        let fields = parser().parse(Some("Acres: 5.44 SMITH SURVEY"), Some("Warranty Deed"));
        assert_eq!(fields.acreage, Some(5.44));
        assert_eq!(fields.survey_name.as_deref(), Some("SMITH"));
    }

    #[test]
    fn survey_colon_number_is_an_abstract_reference() {
        let fields = parser().parse(Some("Survey: 123"), Some("Warranty Deed"));
        assert_eq!(fields.abstract_number.as_deref(), Some("123"));
    }
}
