//! Normalization engine: coerce whatever the model returned into the
//! canonical `ExtractionResult` shape.
//!
//! The upstream model is a natural-language system, not a contract-bound
//! API — its structured-output mode can still emit a string where a list
//! was requested, nest JSON inside a string, or omit fields entirely. This
//! module is the single trust boundary absorbing that variance: it is pure,
//! total, and never fails. Every consumer downstream may assume the fixed
//! shape unconditionally.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sentinel stored when the model emitted an explicit null for a parameter.
const MISSING_VALUE: &str = "N/A";

static NULL: Value = Value::Null;

/// Canonical extraction output. Every field is always present and of the
/// stated type, regardless of what the model returned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub parameters: BTreeMap<String, String>,
    pub conditions: Vec<String>,
    pub medications: Vec<String>,
    pub recommendations: String,
    pub summary: String,
}

impl ExtractionResult {
    /// The fixed result substituted when the analysis service cannot be
    /// reached: empty structured fields, explanatory summary. The upload
    /// itself proceeds normally.
    pub fn unavailable_placeholder() -> Self {
        Self {
            summary: "Automatic analysis was not available for this document. \
                      The original file is stored and can be analyzed later."
                .to_string(),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
            && self.conditions.is_empty()
            && self.medications.is_empty()
            && self.recommendations.is_empty()
            && self.summary.is_empty()
    }
}

/// Normalize raw gateway output text. Unparseable input yields the
/// all-empty result — extraction variance is not data loss.
pub fn normalize_text(raw: &str) -> ExtractionResult {
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => normalize(&value),
        Err(_) => ExtractionResult::default(),
    }
}

/// Normalize a parsed gateway payload. Pure and total.
pub fn normalize(raw: &Value) -> ExtractionResult {
    let raw = reparse_embedded(raw);
    let analysis = analysis_section(&raw);

    ExtractionResult {
        parameters: normalize_parameters(raw.get("parameters").unwrap_or(&NULL)),
        conditions: coerce_list(field(&raw, &analysis, "conditions")),
        medications: coerce_list(field(&raw, &analysis, "medications")),
        recommendations: coerce_text(field(&raw, &analysis, "recommendations")),
        summary: coerce_text(field(&raw, &analysis, "summary")),
    }
}

/// The four analysis fields live under `aiAnalysis` on the wire; tolerate
/// payloads that carry them at the top level instead.
fn analysis_section(raw: &Value) -> Value {
    match raw.get("aiAnalysis") {
        Some(section) => reparse_embedded(section),
        None => Value::Null,
    }
}

fn field<'a>(raw: &'a Value, analysis: &'a Value, key: &str) -> &'a Value {
    analysis
        .get(key)
        .filter(|v| !v.is_null())
        .or_else(|| raw.get(key))
        .unwrap_or(&NULL)
}

/// A value that is itself a JSON document serialized into a string is
/// unwrapped once (the model sometimes double-encodes whole sections).
fn reparse_embedded(value: &Value) -> Value {
    if let Value::String(s) = value {
        if let Ok(parsed @ Value::Object(_)) = serde_json::from_str::<Value>(s) {
            return parsed;
        }
    }
    value.clone()
}

fn normalize_parameters(value: &Value) -> BTreeMap<String, String> {
    let value = reparse_embedded(value);
    let Value::Object(map) = value else {
        return BTreeMap::new();
    };

    map.iter()
        .map(|(name, v)| {
            let rendered = match v {
                Value::Null => MISSING_VALUE.to_string(),
                other => display_string(other),
            };
            (name.clone(), rendered)
        })
        .collect()
}

/// Resolve a value into an ordered list of non-empty strings.
fn coerce_list(value: &Value) -> Vec<String> {
    let items: Vec<Value> = match value {
        Value::Array(items) => items.clone(),
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            // Embedded JSON sequence
            Ok(Value::Array(items)) => items,
            Ok(Value::Null) => vec![],
            // Anything else: the whole string is a single element
            _ => vec![Value::String(s.clone())],
        },
        // Non-sequence object: take its values in order
        Value::Object(map) => map.values().cloned().collect(),
        Value::Null => vec![],
        scalar => vec![scalar.clone()],
    };

    items
        .iter()
        .filter(|v| !v.is_null())
        .map(display_string)
        .filter(|s| !s.trim().is_empty())
        .collect()
}

/// Resolve a value into a single text field.
fn coerce_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Array(items) => join_lines(items.iter()),
        Value::Object(map) => join_lines(map.values()),
        scalar => display_string(scalar),
    }
}

fn join_lines<'a>(values: impl Iterator<Item = &'a Value>) -> String {
    values
        .filter(|v| !v.is_null())
        .map(display_string)
        .filter(|s| !s.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Stringify a non-null value: strings as-is, scalars via Display,
/// containers as compact JSON.
fn display_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}
