use anyhow::{Context, Result};
use tracing::info;

use crate::cli::TriageArgs;
use crate::commands::read_batch;
use crate::db;
use crate::filter;
use crate::legal::LegalDescriptionParser;
use crate::model::{ParsedRecord, TargetCriteria};
use crate::rank::DocumentRanker;
use crate::util::write_json_pretty;

pub fn run(args: TriageArgs) -> Result<()> {
    let records = read_batch(&args.input)?;
    let total = records.len();

    let criteria = TargetCriteria {
        abstract_number: args.target_abstract.clone(),
        survey_name: args.target_survey.clone(),
        previous_ownership_date: args.after,
        next_ownership_date: args.before,
    };

    let parser = LegalDescriptionParser::new()?;
    let parsed = records
        .into_iter()
        .map(|raw| {
            let legal = parser.parse(raw.legal_description.as_deref(), raw.doc_type.as_deref());
            ParsedRecord { raw, legal }
        })
        .collect::<Vec<ParsedRecord>>();

    let filtered = filter::filter_documents(
        parsed,
        criteria.previous_ownership_date,
        criteria.next_ownership_date,
    );
    let dropped = total - filtered.len();

    let ranker = DocumentRanker::new(&criteria);
    let ranked = ranker.rank(filtered);

    let mut tier_counts = [0usize; 8];
    for record in &ranked {
        if let Some(slot) = tier_counts.get_mut(record.priority as usize - 1) {
            *slot += 1;
        }
    }
    let escalation = ranked.iter().filter(|r| r.needs_ocr_escalation).count();

    info!(
        total,
        dropped_by_date_window = dropped,
        ranked = ranked.len(),
        tiers = ?tier_counts,
        ocr_escalation = escalation,
        "batch triaged"
    );

    if let Some(output) = &args.output {
        write_json_pretty(output, &ranked)?;
        info!(output = %output.display(), "ordered batch written");
    } else {
        let rendered =
            serde_json::to_string_pretty(&ranked).context("failed to serialize ranked batch")?;
        println!("{rendered}");
    }

    if let Some(db_path) = &args.db_path {
        let mut connection = db::open(db_path)?;
        let counts = db::upsert_ranked_records(&mut connection, &ranked)?;
        info!(
            db_path = %db_path.display(),
            upserted = counts.upserted,
            skipped = counts.skipped,
            "ranked batch stored"
        );
    }

    Ok(())
}
