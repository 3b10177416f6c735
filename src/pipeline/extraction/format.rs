/// Broad content categories the gateway dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileCategory {
    Pdf,
    PlainText,
    Image,
    Unsupported,
}

impl FileCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::PlainText => "plain_text",
            Self::Image => "image",
            Self::Unsupported => "unsupported",
        }
    }
}

/// Detect the content category from magic bytes (NOT file extensions).
/// Magic bytes don't lie — extensions and declared content types can.
pub fn detect_category(bytes: &[u8]) -> FileCategory {
    match bytes {
        // PDF: starts with %PDF
        [0x25, 0x50, 0x44, 0x46, ..] => FileCategory::Pdf,
        // JPEG: starts with FF D8 FF
        [0xFF, 0xD8, 0xFF, ..] => FileCategory::Image,
        // PNG: starts with 89 50 4E 47
        [0x89, 0x50, 0x4E, 0x47, ..] => FileCategory::Image,
        // TIFF: little-endian (49 49 2A 00) or big-endian (4D 4D 00 2A)
        [0x49, 0x49, 0x2A, 0x00, ..] | [0x4D, 0x4D, 0x00, 0x2A, ..] => FileCategory::Image,
        // HEIC/HEIF: "ftyp" at offset 4
        _ if bytes.len() >= 12 && &bytes[4..8] == b"ftyp" => FileCategory::Image,
        _ => {
            if is_likely_text(bytes) {
                FileCategory::PlainText
            } else {
                FileCategory::Unsupported
            }
        }
    }
}

/// Check if content is likely plain text (valid UTF-8, mostly printable).
fn is_likely_text(bytes: &[u8]) -> bool {
    if bytes.is_empty() {
        return false;
    }

    let sample = &bytes[..bytes.len().min(4096)];
    let text = match std::str::from_utf8(sample) {
        Ok(t) => t,
        // The sample may end mid code point; accept a short valid prefix.
        Err(e) if sample.len() - e.valid_up_to() < 4 && e.valid_up_to() > 0 => {
            match std::str::from_utf8(&sample[..e.valid_up_to()]) {
                Ok(t) => t,
                Err(_) => return false,
            }
        }
        Err(_) => return false,
    };

    let total = text.chars().count();
    if total == 0 {
        return false;
    }
    let printable = text
        .chars()
        .filter(|c| !c.is_control() || c.is_whitespace())
        .count();
    printable * 100 / total >= 80
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_magic_detected() {
        assert_eq!(detect_category(b"%PDF-1.7 rest of file"), FileCategory::Pdf);
    }

    #[test]
    fn jpeg_and_png_are_images() {
        assert_eq!(
            detect_category(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10]),
            FileCategory::Image
        );
        assert_eq!(
            detect_category(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]),
            FileCategory::Image
        );
    }

    #[test]
    fn tiff_both_endians_are_images() {
        assert_eq!(
            detect_category(&[0x49, 0x49, 0x2A, 0x00, 0x08]),
            FileCategory::Image
        );
        assert_eq!(
            detect_category(&[0x4D, 0x4D, 0x00, 0x2A, 0x08]),
            FileCategory::Image
        );
    }

    #[test]
    fn heic_ftyp_is_image() {
        let mut bytes = vec![0x00, 0x00, 0x00, 0x18];
        bytes.extend_from_slice(b"ftypheic");
        bytes.extend_from_slice(&[0u8; 8]);
        assert_eq!(detect_category(&bytes), FileCategory::Image);
    }

    #[test]
    fn utf8_text_detected() {
        let text = "Blood pressure: 120/80 mmHg\nHbA1c: 7.2%\n";
        assert_eq!(detect_category(text.as_bytes()), FileCategory::PlainText);
    }

    #[test]
    fn accented_text_detected() {
        let text = "Température: 38.5°C — contrôle régulier";
        assert_eq!(detect_category(text.as_bytes()), FileCategory::PlainText);
    }

    #[test]
    fn binary_garbage_unsupported() {
        let bytes: Vec<u8> = (0..255u8).cycle().take(512).collect();
        assert_eq!(detect_category(&bytes), FileCategory::Unsupported);
    }

    #[test]
    fn empty_content_unsupported() {
        assert_eq!(detect_category(b""), FileCategory::Unsupported);
    }

    #[test]
    fn extension_is_not_trusted() {
        // Content decides, not the name — a PNG is an image however it's named
        let png = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        assert_eq!(detect_category(&png), FileCategory::Image);
    }
}
