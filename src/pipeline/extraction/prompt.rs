pub const EXTRACTION_SYSTEM_PROMPT: &str = r#"
You are a health-record structuring assistant. Your ONLY role is to convert
raw health-record text into a fixed JSON schema. You extract and organize
information that is explicitly present in the document.

RULES — ABSOLUTE, NO EXCEPTIONS:
1. Extract ONLY information explicitly stated in the document.
2. NEVER add interpretation, diagnosis, advice, or clinical opinion.
3. Preserve exact values (doses, lab values, units) verbatim.
4. If a field has no content in the document, output an empty value.
5. Respond with a SINGLE JSON object and nothing else. No prose,
   no code fences, no trailing commentary.
"#;

/// Build the extraction prompt for a document's text.
pub fn build_extraction_prompt(raw_text: &str) -> String {
    format!(
        r#"<document>
{raw_text}
</document>

Extract the lab values/vitals, medical conditions, medications, and
recommendations from the above document. Respond with a single JSON object
of exactly this shape:

{{
  "parameters": {{ "measurement name": "value with unit" }},
  "conditions": ["condition name"],
  "medications": ["medication with dose"],
  "recommendations": "follow-up and lifestyle guidance as one text",
  "summary": "two or three sentences describing the document"
}}
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_contains_document_text() {
        let prompt = build_extraction_prompt("Metformin 500mg");
        assert!(prompt.contains("Metformin 500mg"));
        assert!(prompt.contains("<document>"));
        assert!(prompt.contains("</document>"));
    }

    #[test]
    fn prompt_names_all_schema_keys() {
        let prompt = build_extraction_prompt("x");
        for key in [
            "parameters",
            "conditions",
            "medications",
            "recommendations",
            "summary",
        ] {
            assert!(prompt.contains(key), "missing schema key {key}");
        }
    }

    #[test]
    fn system_prompt_demands_single_json_object() {
        assert!(EXTRACTION_SYSTEM_PROMPT.contains("SINGLE JSON object"));
        assert!(EXTRACTION_SYSTEM_PROMPT.contains("ONLY"));
    }
}
