use anyhow::Result;
use tracing::info;

use crate::cli::IngestArgs;
use crate::commands::read_batch;
use crate::db;

pub fn run(args: IngestArgs) -> Result<()> {
    let records = read_batch(&args.input)?;
    info!(
        input = %args.input.display(),
        records = records.len(),
        "loaded search-result batch"
    );

    let mut connection = db::open(&args.db_path)?;
    let counts = db::upsert_raw_records(&mut connection, &records)?;

    info!(
        db_path = %args.db_path.display(),
        upserted = counts.upserted,
        skipped = counts.skipped,
        "batch stored"
    );
    Ok(())
}
