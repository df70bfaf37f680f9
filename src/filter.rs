use chrono::NaiveDate;

use crate::model::{ParsedRecord, RawSearchResult};

/// Tests whether a record's recorded date falls inside an (optionally
/// open-ended) ownership window. Undated instruments always pass; absence
/// of a date is not a rejection reason.
pub fn in_range(
    record: &RawSearchResult,
    lower_bound: Option<NaiveDate>,
    upper_bound: Option<NaiveDate>,
) -> bool {
    let Some(recorded) = record.recorded_date else {
        return true;
    };

    if let Some(lower) = lower_bound {
        if recorded < lower {
            return false;
        }
    }
    if let Some(upper) = upper_bound {
        if recorded > upper {
            return false;
        }
    }

    true
}

/// Stable filter: survivors keep their relative order.
pub fn filter_documents(
    records: Vec<ParsedRecord>,
    lower_bound: Option<NaiveDate>,
    upper_bound: Option<NaiveDate>,
) -> Vec<ParsedRecord> {
    records
        .into_iter()
        .filter(|record| in_range(&record.raw, lower_bound, upper_bound))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ParsedLegalFields;

    fn record(recorded_date: Option<NaiveDate>) -> RawSearchResult {
        RawSearchResult {
            grantor: None,
            grantee: None,
            doc_type: Some("Warranty Deed".to_string()),
            recorded_date,
            doc_number: None,
            book_vol_page: None,
            legal_description: None,
            doc_link: None,
            search_term: None,
            source_county: "Freestone".to_string(),
        }
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    #[test]
    fn record_inside_window_passes() {
        let r = record(Some(date(2020, 6, 1)));
        assert!(in_range(&r, Some(date(2019, 1, 1)), Some(date(2021, 1, 1))));
    }

    #[test]
    fn record_after_upper_bound_is_rejected() {
        let r = record(Some(date(2020, 6, 1)));
        assert!(!in_range(&r, Some(date(2019, 1, 1)), Some(date(2019, 12, 31))));
    }

    #[test]
    fn record_before_lower_bound_is_rejected() {
        let r = record(Some(date(2018, 6, 1)));
        assert!(!in_range(&r, Some(date(2019, 1, 1)), None));
    }

    #[test]
    fn undated_record_passes_any_bounds() {
        let r = record(None);
        assert!(in_range(&r, Some(date(2019, 1, 1)), Some(date(2019, 12, 31))));
        assert!(in_range(&r, None, None));
    }

    #[test]
    fn filter_preserves_relative_order_of_survivors() {
        let records = vec![
            ParsedRecord { raw: record(Some(date(2020, 1, 1))), legal: ParsedLegalFields::default() },
            ParsedRecord { raw: record(Some(date(2015, 1, 1))), legal: ParsedLegalFields::default() },
            ParsedRecord { raw: record(Some(date(2020, 3, 1))), legal: ParsedLegalFields::default() },
            ParsedRecord { raw: record(None), legal: ParsedLegalFields::default() },
        ];

        let kept = filter_documents(records, Some(date(2019, 1, 1)), None);
        let dates = kept.iter().map(|r| r.raw.recorded_date).collect::<Vec<_>>();
        assert_eq!(
            dates,
            vec![Some(date(2020, 1, 1)), Some(date(2020, 3, 1)), None]
        );
    }
}
