use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, Transaction, params};
use tracing::warn;

use crate::model::{ParsedLegalFields, RankedRecord, RawSearchResult};
use crate::util::{ensure_directory, now_utc_string, sha256_hex};

/// Opens (creating if needed) the clerk database. Connections are owned by
/// the calling command and passed down explicitly; nothing in the parsing or
/// ranking layers ever touches the database.
pub fn open(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        ensure_directory(parent)?;
    }

    let connection = Connection::open(path)
        .with_context(|| format!("failed to open database: {}", path.display()))?;
    configure_connection(&connection)?;
    ensure_schema(&connection)?;
    Ok(connection)
}

fn configure_connection(connection: &Connection) -> Result<()> {
    connection
        .pragma_update(None, "journal_mode", "WAL")
        .context("failed to set journal_mode=WAL")?;
    connection
        .pragma_update(None, "synchronous", "NORMAL")
        .context("failed to set synchronous=NORMAL")?;
    connection
        .pragma_update(None, "foreign_keys", "ON")
        .context("failed to set foreign_keys=ON")?;
    Ok(())
}

fn ensure_schema(connection: &Connection) -> Result<()> {
    connection
        .execute_batch(
            "
            CREATE TABLE IF NOT EXISTS documents_header (
              id INTEGER PRIMARY KEY,
              search_term TEXT,
              doc_type TEXT,
              recorded_date TEXT,
              doc_number TEXT NOT NULL,
              book_vol_page TEXT,
              legal_description TEXT,
              source_county TEXT NOT NULL,
              doc_link TEXT,
              abstract_num TEXT,
              survey_name TEXT,
              acreage REAL,
              subdivision TEXT,
              case_number TEXT,
              misc_legal TEXT,
              priority INTEGER,
              source_hash TEXT NOT NULL,
              scraped_at TEXT NOT NULL,
              UNIQUE(doc_number, source_county)
            );

            CREATE TABLE IF NOT EXISTS party_names (
              id INTEGER PRIMARY KEY,
              name TEXT NOT NULL UNIQUE
            );

            CREATE TABLE IF NOT EXISTS document_parties (
              document_id INTEGER NOT NULL,
              party_id INTEGER NOT NULL,
              role TEXT NOT NULL,
              PRIMARY KEY (document_id, party_id, role),
              FOREIGN KEY (document_id) REFERENCES documents_header(id),
              FOREIGN KEY (party_id) REFERENCES party_names(id)
            );
            ",
        )
        .context("failed to create clerk schema")?;
    Ok(())
}

#[derive(Debug, Default)]
pub struct UpsertCounts {
    pub upserted: usize,
    pub skipped: usize,
}

/// Idempotent upsert of raw (unranked) search results, keyed by
/// `(doc_number, source_county)`. Parsed-field columns are left untouched so
/// a raw re-ingest never erases a prior triage pass.
pub fn upsert_raw_records(
    connection: &mut Connection,
    records: &[RawSearchResult],
) -> Result<UpsertCounts> {
    let tx = connection
        .transaction()
        .context("failed to begin upsert transaction")?;
    let mut counts = UpsertCounts::default();

    for record in records {
        match upsert_document(&tx, record, None)? {
            Some(_) => counts.upserted += 1,
            None => counts.skipped += 1,
        }
    }

    tx.commit().context("failed to commit upsert transaction")?;
    Ok(counts)
}

/// Upsert of triaged records: raw columns plus parsed fields and priority.
pub fn upsert_ranked_records(
    connection: &mut Connection,
    records: &[RankedRecord],
) -> Result<UpsertCounts> {
    let tx = connection
        .transaction()
        .context("failed to begin upsert transaction")?;
    let mut counts = UpsertCounts::default();

    for record in records {
        match upsert_document(&tx, &record.raw, Some((&record.legal, record.priority)))? {
            Some(_) => counts.upserted += 1,
            None => counts.skipped += 1,
        }
    }

    tx.commit().context("failed to commit upsert transaction")?;
    Ok(counts)
}

fn upsert_document(
    tx: &Transaction<'_>,
    raw: &RawSearchResult,
    parsed: Option<(&ParsedLegalFields, u8)>,
) -> Result<Option<i64>> {
    let Some(doc_number) = raw.doc_number.as_deref().map(str::trim).filter(|v| !v.is_empty())
    else {
        warn!(
            county = %raw.source_county,
            doc_type = raw.doc_type.as_deref().unwrap_or_default(),
            "skipping record without a document number"
        );
        return Ok(None);
    };

    let source_hash = sha256_hex(&[
        raw.grantor.as_deref(),
        raw.grantee.as_deref(),
        raw.doc_type.as_deref(),
        raw.book_vol_page.as_deref(),
        raw.legal_description.as_deref(),
        raw.doc_link.as_deref(),
    ]);
    let scraped_at = now_utc_string();

    let document_id: i64 = tx
        .query_row(
            "
            INSERT INTO documents_header
              (search_term, doc_type, recorded_date, doc_number, book_vol_page,
               legal_description, source_county, doc_link, source_hash, scraped_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT (doc_number, source_county) DO UPDATE SET
              search_term = excluded.search_term,
              doc_type = excluded.doc_type,
              recorded_date = excluded.recorded_date,
              book_vol_page = excluded.book_vol_page,
              legal_description = excluded.legal_description,
              doc_link = excluded.doc_link,
              source_hash = excluded.source_hash,
              scraped_at = excluded.scraped_at
            RETURNING id
            ",
            params![
                raw.search_term,
                raw.doc_type,
                raw.recorded_date,
                doc_number,
                raw.book_vol_page,
                raw.legal_description,
                raw.source_county,
                raw.doc_link,
                source_hash,
                scraped_at,
            ],
            |row| row.get(0),
        )
        .with_context(|| format!("failed to upsert document {doc_number}"))?;

    if let Some((legal, priority)) = parsed {
        tx.execute(
            "
            UPDATE documents_header SET
              abstract_num = ?1,
              survey_name = ?2,
              acreage = ?3,
              subdivision = ?4,
              case_number = ?5,
              misc_legal = ?6,
              priority = ?7
            WHERE id = ?8
            ",
            params![
                legal.abstract_number,
                legal.survey_name,
                legal.acreage,
                legal.subdivision,
                legal.case_number,
                legal.misc_legal,
                priority,
                document_id,
            ],
        )
        .with_context(|| format!("failed to store parsed fields for document {doc_number}"))?;
    }

    for (role, name) in [("grantor", &raw.grantor), ("grantee", &raw.grantee)] {
        let Some(name) = name.as_deref().map(str::trim).filter(|v| !v.is_empty()) else {
            continue;
        };
        link_party(tx, document_id, name, role)
            .with_context(|| format!("failed to link {role} for document {doc_number}"))?;
    }

    Ok(Some(document_id))
}

fn link_party(tx: &Transaction<'_>, document_id: i64, name: &str, role: &str) -> Result<()> {
    tx.execute(
        "INSERT INTO party_names (name) VALUES (?1) ON CONFLICT (name) DO NOTHING",
        params![name],
    )?;
    let party_id: i64 = tx.query_row(
        "SELECT id FROM party_names WHERE name = ?1",
        params![name],
        |row| row.get(0),
    )?;
    tx.execute(
        "
        INSERT INTO document_parties (document_id, party_id, role)
        VALUES (?1, ?2, ?3)
        ON CONFLICT DO NOTHING
        ",
        params![document_id, party_id, role],
    )?;
    Ok(())
}

#[derive(Debug)]
pub struct StatusCounts {
    pub documents: i64,
    pub parties: i64,
    pub undated_documents: i64,
    pub escalation_pending: i64,
    pub by_county: Vec<(String, i64)>,
    pub by_priority: Vec<(i64, i64)>,
}

pub fn status_counts(connection: &Connection) -> Result<StatusCounts> {
    let documents = query_count(connection, "SELECT COUNT(*) FROM documents_header")?;
    let parties = query_count(connection, "SELECT COUNT(*) FROM party_names")?;
    let undated_documents = query_count(
        connection,
        "SELECT COUNT(*) FROM documents_header WHERE recorded_date IS NULL",
    )?;
    let escalation_pending = query_count(
        connection,
        "SELECT COUNT(*) FROM documents_header WHERE priority >= 6",
    )?;

    let mut by_county = Vec::new();
    let mut stmt = connection.prepare(
        "SELECT source_county, COUNT(*) FROM documents_header GROUP BY source_county ORDER BY source_county",
    )?;
    let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
    for row in rows {
        by_county.push(row?);
    }

    let mut by_priority = Vec::new();
    let mut stmt = connection.prepare(
        "SELECT priority, COUNT(*) FROM documents_header WHERE priority IS NOT NULL GROUP BY priority ORDER BY priority",
    )?;
    let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
    for row in rows {
        by_priority.push(row?);
    }

    Ok(StatusCounts {
        documents,
        parties,
        undated_documents,
        escalation_pending,
        by_county,
        by_priority,
    })
}

fn query_count(connection: &Connection, sql: &str) -> Result<i64> {
    let count = connection.query_row(sql, [], |row| row.get(0))?;
    Ok(count)
}
