use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::HealthRecord;

pub fn insert_health_record(conn: &Connection, record: &HealthRecord) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO health_records (id, user_id, condition_id, since, document_url,
         ai_summary, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            record.id.to_string(),
            record.user_id.to_string(),
            record.condition_id.to_string(),
            record.since.to_string(),
            record.document_url,
            record.ai_summary,
            record.created_at.to_string(),
        ],
    )?;
    Ok(())
}

pub fn get_health_record(
    conn: &Connection,
    id: &Uuid,
) -> Result<Option<HealthRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, condition_id, since, document_url, ai_summary, created_at
         FROM health_records WHERE id = ?1",
    )?;

    let mut rows = stmt.query_map(params![id.to_string()], |row| Ok(record_row(row)))?;

    match rows.next() {
        Some(row) => Ok(Some(record_from_row(row??)?)),
        None => Ok(None),
    }
}

pub fn list_records_for_user(
    conn: &Connection,
    user_id: &Uuid,
) -> Result<Vec<HealthRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, condition_id, since, document_url, ai_summary, created_at
         FROM health_records WHERE user_id = ?1 ORDER BY created_at DESC",
    )?;

    let rows = stmt.query_map(params![user_id.to_string()], |row| Ok(record_row(row)))?;

    let mut records = Vec::new();
    for row in rows {
        records.push(record_from_row(row??)?);
    }
    Ok(records)
}

// Internal row type for HealthRecord mapping
struct RecordRow {
    id: String,
    user_id: String,
    condition_id: String,
    since: String,
    document_url: String,
    ai_summary: String,
    created_at: String,
}

fn record_row(row: &rusqlite::Row<'_>) -> Result<RecordRow, rusqlite::Error> {
    Ok(RecordRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        condition_id: row.get(2)?,
        since: row.get(3)?,
        document_url: row.get(4)?,
        ai_summary: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn record_from_row(row: RecordRow) -> Result<HealthRecord, DatabaseError> {
    Ok(HealthRecord {
        id: parse_uuid(&row.id)?,
        user_id: parse_uuid(&row.user_id)?,
        condition_id: parse_uuid(&row.condition_id)?,
        since: NaiveDate::parse_from_str(&row.since, "%Y-%m-%d").unwrap_or_default(),
        document_url: row.document_url,
        ai_summary: row.ai_summary,
        created_at: NaiveDateTime::parse_from_str(&row.created_at, "%Y-%m-%d %H:%M:%S%.f")
            .unwrap_or_default(),
    })
}

pub(crate) fn parse_uuid(s: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(s).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))
}
