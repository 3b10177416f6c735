use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use uuid::Uuid;

use super::record::parse_uuid;
use crate::db::DatabaseError;
use crate::models::{ConditionEntry, MedicationEntry, ParameterEntry, RecommendationEntry};

/// Insert a batch of parameter entries. All-or-nothing within the batch.
pub fn insert_parameter_entries(
    conn: &Connection,
    entries: &[ParameterEntry],
) -> Result<usize, DatabaseError> {
    let mut stmt = conn.prepare(
        "INSERT INTO parameter_entries (id, record_id, user_id, name, value, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;
    for entry in entries {
        stmt.execute(params![
            entry.id.to_string(),
            entry.record_id.to_string(),
            entry.user_id.to_string(),
            entry.name,
            entry.value,
            entry.created_at.to_string(),
        ])?;
    }
    Ok(entries.len())
}

pub fn insert_condition_entries(
    conn: &Connection,
    entries: &[ConditionEntry],
) -> Result<usize, DatabaseError> {
    let mut stmt = conn.prepare(
        "INSERT INTO condition_entries (id, record_id, user_id, name, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    for entry in entries {
        stmt.execute(params![
            entry.id.to_string(),
            entry.record_id.to_string(),
            entry.user_id.to_string(),
            entry.name,
            entry.created_at.to_string(),
        ])?;
    }
    Ok(entries.len())
}

pub fn insert_medication_entries(
    conn: &Connection,
    entries: &[MedicationEntry],
) -> Result<usize, DatabaseError> {
    let mut stmt = conn.prepare(
        "INSERT INTO medication_entries (id, record_id, user_id, name, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    for entry in entries {
        stmt.execute(params![
            entry.id.to_string(),
            entry.record_id.to_string(),
            entry.user_id.to_string(),
            entry.name,
            entry.created_at.to_string(),
        ])?;
    }
    Ok(entries.len())
}

pub fn insert_recommendation_entries(
    conn: &Connection,
    entries: &[RecommendationEntry],
) -> Result<usize, DatabaseError> {
    let mut stmt = conn.prepare(
        "INSERT INTO recommendation_entries (id, record_id, user_id, text, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    for entry in entries {
        stmt.execute(params![
            entry.id.to_string(),
            entry.record_id.to_string(),
            entry.user_id.to_string(),
            entry.text,
            entry.created_at.to_string(),
        ])?;
    }
    Ok(entries.len())
}

pub fn get_parameters_for_record(
    conn: &Connection,
    record_id: &Uuid,
) -> Result<Vec<ParameterEntry>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, record_id, user_id, name, value, created_at
         FROM parameter_entries WHERE record_id = ?1 ORDER BY name",
    )?;
    let rows = stmt.query_map(params![record_id.to_string()], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, String>(5)?,
        ))
    })?;

    let mut entries = Vec::new();
    for row in rows {
        let (id, record_id, user_id, name, value, created_at) = row?;
        entries.push(ParameterEntry {
            id: parse_uuid(&id)?,
            record_id: parse_uuid(&record_id)?,
            user_id: parse_uuid(&user_id)?,
            name,
            value,
            created_at: parse_datetime(&created_at),
        });
    }
    Ok(entries)
}

pub fn get_conditions_for_record(
    conn: &Connection,
    record_id: &Uuid,
) -> Result<Vec<ConditionEntry>, DatabaseError> {
    named_entries(conn, "condition_entries", record_id)?
        .into_iter()
        .map(|(id, record_id, user_id, name, created_at)| {
            Ok(ConditionEntry {
                id: parse_uuid(&id)?,
                record_id: parse_uuid(&record_id)?,
                user_id: parse_uuid(&user_id)?,
                name,
                created_at: parse_datetime(&created_at),
            })
        })
        .collect()
}

pub fn get_medications_for_record(
    conn: &Connection,
    record_id: &Uuid,
) -> Result<Vec<MedicationEntry>, DatabaseError> {
    named_entries(conn, "medication_entries", record_id)?
        .into_iter()
        .map(|(id, record_id, user_id, name, created_at)| {
            Ok(MedicationEntry {
                id: parse_uuid(&id)?,
                record_id: parse_uuid(&record_id)?,
                user_id: parse_uuid(&user_id)?,
                name,
                created_at: parse_datetime(&created_at),
            })
        })
        .collect()
}

pub fn get_recommendations_for_record(
    conn: &Connection,
    record_id: &Uuid,
) -> Result<Vec<RecommendationEntry>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, record_id, user_id, text, created_at
         FROM recommendation_entries WHERE record_id = ?1",
    )?;
    let rows = stmt.query_map(params![record_id.to_string()], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
        ))
    })?;

    let mut entries = Vec::new();
    for row in rows {
        let (id, record_id, user_id, text, created_at) = row?;
        entries.push(RecommendationEntry {
            id: parse_uuid(&id)?,
            record_id: parse_uuid(&record_id)?,
            user_id: parse_uuid(&user_id)?,
            text,
            created_at: parse_datetime(&created_at),
        });
    }
    Ok(entries)
}

// condition_entries and medication_entries share a column layout.
#[allow(clippy::type_complexity)]
fn named_entries(
    conn: &Connection,
    table: &str,
    record_id: &Uuid,
) -> Result<Vec<(String, String, String, String, String)>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT id, record_id, user_id, name, created_at
         FROM {table} WHERE record_id = ?1"
    ))?;
    let rows = stmt.query_map(params![record_id.to_string()], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
        ))
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

fn parse_datetime(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f").unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::record::insert_health_record;
    use crate::db::sqlite::open_memory_database;
    use crate::models::HealthRecord;
    use chrono::NaiveDate;

    fn setup_record(conn: &Connection) -> HealthRecord {
        let record = HealthRecord {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            condition_id: Uuid::new_v4(),
            since: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            document_url: "/files/x/y.txt".into(),
            ai_summary: String::new(),
            created_at: chrono::Local::now().naive_local(),
        };
        insert_health_record(conn, &record).unwrap();
        record
    }

    fn parameter(record: &HealthRecord, name: &str, value: &str) -> ParameterEntry {
        ParameterEntry {
            id: Uuid::new_v4(),
            record_id: record.id,
            user_id: record.user_id,
            name: name.into(),
            value: value.into(),
            created_at: record.created_at,
        }
    }

    #[test]
    fn batch_insert_and_read_parameters() {
        let conn = open_memory_database().unwrap();
        let record = setup_record(&conn);

        let entries = vec![
            parameter(&record, "BP", "120/80"),
            parameter(&record, "HbA1c", "7.2%"),
        ];
        assert_eq!(insert_parameter_entries(&conn, &entries).unwrap(), 2);

        let loaded = get_parameters_for_record(&conn, &record.id).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].name, "BP");
        assert_eq!(loaded[0].value, "120/80");
    }

    #[test]
    fn conditions_and_medications_roundtrip() {
        let conn = open_memory_database().unwrap();
        let record = setup_record(&conn);

        insert_condition_entries(
            &conn,
            &[ConditionEntry {
                id: Uuid::new_v4(),
                record_id: record.id,
                user_id: record.user_id,
                name: "Hypertension".into(),
                created_at: record.created_at,
            }],
        )
        .unwrap();
        insert_medication_entries(
            &conn,
            &[MedicationEntry {
                id: Uuid::new_v4(),
                record_id: record.id,
                user_id: record.user_id,
                name: "Metformin 500mg".into(),
                created_at: record.created_at,
            }],
        )
        .unwrap();

        let conditions = get_conditions_for_record(&conn, &record.id).unwrap();
        assert_eq!(conditions.len(), 1);
        assert_eq!(conditions[0].name, "Hypertension");

        let medications = get_medications_for_record(&conn, &record.id).unwrap();
        assert_eq!(medications.len(), 1);
        assert_eq!(medications[0].name, "Metformin 500mg");
    }

    #[test]
    fn recommendation_roundtrip() {
        let conn = open_memory_database().unwrap();
        let record = setup_record(&conn);

        insert_recommendation_entries(
            &conn,
            &[RecommendationEntry {
                id: Uuid::new_v4(),
                record_id: record.id,
                user_id: record.user_id,
                text: "Repeat HbA1c in 3 months".into(),
                created_at: record.created_at,
            }],
        )
        .unwrap();

        let loaded = get_recommendations_for_record(&conn, &record.id).unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(loaded[0].text.contains("HbA1c"));
    }

    #[test]
    fn entry_without_record_violates_foreign_key() {
        let conn = open_memory_database().unwrap();
        let orphan = ParameterEntry {
            id: Uuid::new_v4(),
            record_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "BP".into(),
            value: "120/80".into(),
            created_at: chrono::Local::now().naive_local(),
        };
        assert!(insert_parameter_entries(&conn, &[orphan]).is_err());
    }

    #[test]
    fn deleting_record_cascades_to_entries() {
        let conn = open_memory_database().unwrap();
        let record = setup_record(&conn);
        insert_parameter_entries(&conn, &[parameter(&record, "BP", "120/80")]).unwrap();

        conn.execute(
            "DELETE FROM health_records WHERE id = ?1",
            params![record.id.to_string()],
        )
        .unwrap();

        let remaining: i64 = conn
            .query_row("SELECT COUNT(*) FROM parameter_entries", [], |r| r.get(0))
            .unwrap();
        assert_eq!(remaining, 0);
    }
}
