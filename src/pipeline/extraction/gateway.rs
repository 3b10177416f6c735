use serde_json::{json, Value};

use super::format::{detect_category, FileCategory};
use super::llm::LlmClient;
use super::pdf::extract_pdf_text;
use super::prompt::{build_extraction_prompt, EXTRACTION_SYSTEM_PROMPT};
use super::sanitize::sanitize_extracted_text;
use super::ExtractionError;
use crate::models::UploadedFile;

/// Server-side extraction gateway: document in, model-derived JSON out.
///
/// Dispatches by content category, extracts raw text, prompts the model,
/// and reshapes the reply into the wire contract
/// `{ parameters, aiAnalysis: { conditions, medications, recommendations,
/// summary } }`. Value TYPES are passed through untouched — coercing the
/// model's loosely-shaped output is the normalization engine's job.
pub struct DocumentGateway {
    llm: Box<dyn LlmClient>,
}

impl DocumentGateway {
    pub fn new(llm: Box<dyn LlmClient>) -> Self {
        Self { llm }
    }

    /// Pre-flight: can the model be called at all?
    pub fn analysis_available(&self) -> bool {
        self.llm.is_configured()
    }

    pub fn extract(&self, file: &UploadedFile) -> Result<Value, ExtractionError> {
        let category = detect_category(&file.bytes);
        tracing::info!(
            file = %file.name,
            category = category.as_str(),
            size = file.bytes.len(),
            "extraction requested"
        );

        let text = match category {
            FileCategory::Pdf => extract_pdf_text(&file.bytes)?,
            FileCategory::PlainText => String::from_utf8(file.bytes.clone())
                .map_err(|e| ExtractionError::Encoding(e.to_string()))?,
            FileCategory::Image => {
                return Err(ExtractionError::UnsupportedMedia(
                    "image analysis is not offered".into(),
                ));
            }
            FileCategory::Unsupported => {
                return Err(ExtractionError::UnsupportedMedia(format!(
                    "unrecognized file content (declared as {})",
                    file.content_type
                )));
            }
        };

        let text = sanitize_extracted_text(&text);
        if text.is_empty() {
            return Err(ExtractionError::NoTextContent);
        }

        let prompt = build_extraction_prompt(&text);
        let raw = self.llm.complete(EXTRACTION_SYSTEM_PROMPT, &prompt)?;

        let value = parse_model_json(&raw)?;
        tracing::info!(file = %file.name, "extraction complete");
        Ok(to_wire_shape(&value))
    }
}

/// Parse the model's reply as JSON, tolerating Markdown code fences.
fn parse_model_json(raw: &str) -> Result<Value, ExtractionError> {
    let stripped = strip_code_fences(raw);
    serde_json::from_str(stripped)
        .map_err(|e| ExtractionError::MalformedResponse(format!("{e}: {}", snippet(stripped))))
}

fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
    else {
        return trimmed;
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn snippet(s: &str) -> String {
    let short: String = s.chars().take(80).collect();
    if short.len() < s.len() {
        format!("{short}…")
    } else {
        short
    }
}

/// Reshape the parsed model output into the gateway wire contract without
/// touching value types. Fields already nested under `aiAnalysis` win over
/// top-level duplicates.
fn to_wire_shape(value: &Value) -> Value {
    let ai = value.get("aiAnalysis");
    let pick = |key: &str| {
        ai.and_then(|section| section.get(key))
            .or_else(|| value.get(key))
            .cloned()
            .unwrap_or(Value::Null)
    };

    json!({
        "parameters": value.get("parameters").cloned().unwrap_or_else(|| json!({})),
        "aiAnalysis": {
            "conditions": pick("conditions"),
            "medications": pick("medications"),
            "recommendations": pick("recommendations"),
            "summary": pick("summary"),
        }
    })
}
