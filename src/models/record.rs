use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Storage-layer length bounds. Values longer than these are truncated
/// before insert, never rejected.
pub const SUMMARY_MAX_LEN: usize = 1000;
pub const ENTRY_NAME_MAX_LEN: usize = 200;
pub const ENTRY_VALUE_MAX_LEN: usize = 500;
pub const ENTRY_TEXT_MAX_LEN: usize = 1000;

/// One uploaded document plus its user-chosen condition and date.
/// Created exactly once per confirmed upload; never mutated by the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub condition_id: Uuid,
    pub since: NaiveDate,
    pub document_url: String,
    pub ai_summary: String,
    pub created_at: NaiveDateTime,
}

/// A single extracted lab value or vital, owned by one record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterEntry {
    pub id: Uuid,
    pub record_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub value: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionEntry {
    pub id: Uuid,
    pub record_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicationEntry {
    pub id: Uuid,
    pub record_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationEntry {
    pub id: Uuid,
    pub record_id: Uuid,
    pub user_id: Uuid,
    pub text: String,
    pub created_at: NaiveDateTime,
}

/// Truncate a string to at most `max_len` characters, never splitting a
/// code point.
pub fn truncate_to(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        s.chars().take(max_len).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_short_string_unchanged() {
        assert_eq!(truncate_to("HbA1c: 7.2%", 100), "HbA1c: 7.2%");
    }

    #[test]
    fn truncate_long_string_bounded() {
        let long = "x".repeat(2000);
        let out = truncate_to(&long, SUMMARY_MAX_LEN);
        assert_eq!(out.chars().count(), SUMMARY_MAX_LEN);
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let s = "température élevée: 39.2°C";
        let out = truncate_to(s, 12);
        assert_eq!(out.chars().count(), 12);
        assert!(s.starts_with(&out));
    }

    #[test]
    fn truncate_empty_string() {
        assert_eq!(truncate_to("", 10), "");
    }
}
