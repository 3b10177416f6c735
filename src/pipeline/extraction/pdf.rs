use super::ExtractionError;

/// Extract the embedded text layer from a digital PDF.
///
/// Handles text-bearing PDFs only. A structurally valid PDF whose pages
/// yield no text (scanned pages, image-only) fails with `NoTextContent`.
pub fn extract_pdf_text(pdf_bytes: &[u8]) -> Result<String, ExtractionError> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(pdf_bytes)
        .map_err(|e| ExtractionError::PdfParsing(e.to_string()))?;

    let text = pages
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");

    if text.trim().is_empty() {
        return Err(ExtractionError::NoTextContent);
    }

    Ok(text)
}

/// Generate a valid PDF with text using lopdf (the library that
/// pdf-extract uses internally). Test fixture shared across the pipeline.
#[cfg(test)]
pub(crate) fn make_test_pdf(text: &str) -> Vec<u8> {
    use lopdf::dictionary;
    use lopdf::{Document, Object, Stream};

    let mut doc = Document::with_version("1.4");

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    // Page content stream: BT /F1 12 Tf (text) Tj ET
    let content = if text.is_empty() {
        "BT ET".to_string()
    } else {
        format!("BT /F1 12 Tf 100 700 Td ({text}) Tj ET")
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));

    let resources = dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    };

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        "Contents" => content_id,
        "Resources" => resources,
    });

    let pages_id = doc.add_object(dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
    });

    if let Ok(Object::Dictionary(ref mut dict)) = doc.get_object_mut(page_id) {
        dict.set("Parent", pages_id);
    }

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });

    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_text_from_digital_pdf() {
        let pdf = make_test_pdf("Metformin 500mg twice daily");
        let text = extract_pdf_text(&pdf).unwrap();
        assert!(
            text.contains("Metformin") || text.contains("500mg"),
            "Expected embedded text, got: {text}"
        );
    }

    #[test]
    fn invalid_pdf_fails_parsing() {
        let result = extract_pdf_text(b"not a pdf at all");
        assert!(matches!(result, Err(ExtractionError::PdfParsing(_))));
    }

    #[test]
    fn textless_pdf_yields_no_text_content() {
        let pdf = make_test_pdf("");
        let result = extract_pdf_text(&pdf);
        assert!(matches!(result, Err(ExtractionError::NoTextContent)));
    }
}
