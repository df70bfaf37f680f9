use anyhow::Result;
use tracing::{info, warn};

use crate::cli::StatusArgs;
use crate::db;

pub fn run(args: StatusArgs) -> Result<()> {
    if !args.db_path.exists() {
        warn!(path = %args.db_path.display(), "database file missing");
        return Ok(());
    }

    let connection = db::open(&args.db_path)?;
    let counts = db::status_counts(&connection)?;

    info!(
        path = %args.db_path.display(),
        documents = counts.documents,
        parties = counts.parties,
        undated = counts.undated_documents,
        ocr_escalation_pending = counts.escalation_pending,
        "database status"
    );

    for (county, count) in &counts.by_county {
        info!(county = %county, documents = count, "county breakdown");
    }
    for (priority, count) in &counts.by_priority {
        info!(priority, documents = count, "priority breakdown");
    }

    Ok(())
}
