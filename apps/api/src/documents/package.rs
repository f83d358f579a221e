//! Packaging of processed text into an email attachment.

use bytes::Bytes;
use docx_rs::{Docx, Paragraph, Run};

use crate::documents::DocumentKind;
use crate::errors::AppError;

/// A ready-to-send file.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub filename: String,
    pub content: Bytes,
    pub content_type: &'static str,
}

/// Builds the attachment for `processed` text, mirroring the format of the
/// original upload. Plain text and `.doc` uploads come back as `.txt`.
pub fn build_attachment(processed: &str, original_filename: &str) -> Result<Attachment, AppError> {
    let kind = DocumentKind::from_filename(original_filename)?;
    let content = match kind {
        DocumentKind::PlainText => Bytes::copy_from_slice(processed.as_bytes()),
        DocumentKind::Docx => Bytes::from(pack_docx(processed)?),
    };

    Ok(Attachment {
        filename: format!("processed_{}.{}", file_stem(original_filename), kind.extension()),
        content,
        content_type: kind.content_type(),
    })
}

/// One paragraph per `\n`-separated line, no styling.
fn pack_docx(text: &str) -> Result<Vec<u8>, AppError> {
    let docx = text.split('\n').fold(Docx::new(), |docx, line| {
        docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(line)))
    });

    let mut buf = std::io::Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buf)
        .map_err(|e| AppError::Packaging(format!("docx pack failed: {e}")))?;
    Ok(buf.into_inner())
}

/// Basename with its last extension removed: `dir/offer.v2.docx` → `offer.v2`.
fn file_stem(filename: &str) -> &str {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    match base.rsplit_once('.') {
        Some((stem, ext)) if !ext.is_empty() => stem,
        _ => base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::extract::extract_text;
    use crate::documents::Upload;

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("offer.docx"), "offer");
        assert_eq!(file_stem("offer.v2.docx"), "offer.v2");
        assert_eq!(file_stem("uploads/letter.txt"), "letter");
        assert_eq!(file_stem("C:\\docs\\letter.doc"), "letter");
        assert_eq!(file_stem("noext"), "noext");
    }

    #[test]
    fn test_plain_text_attachment() {
        let att = build_attachment("Hi _Bo_!", "greeting.TXT").unwrap();
        assert_eq!(att.filename, "processed_greeting.txt");
        assert_eq!(att.content_type, "text/plain");
        assert_eq!(&att.content[..], b"Hi _Bo_!");
    }

    #[test]
    fn test_doc_upload_comes_back_as_txt() {
        let att = build_attachment("body", "legacy.doc").unwrap();
        assert_eq!(att.filename, "processed_legacy.txt");
        assert_eq!(att.content_type, "text/plain");
    }

    #[test]
    fn test_docx_attachment_round_trips_lines() {
        let processed = "Dear _Jo_,\n\nYour order ships ____.";
        let att = build_attachment(processed, "offer.docx").unwrap();
        assert_eq!(att.filename, "processed_offer.docx");
        assert_eq!(
            att.content_type,
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        );
        assert!(att.content.starts_with(b"PK"));

        let reread = extract_text(&Upload {
            filename: att.filename.clone(),
            content: att.content.clone(),
        })
        .unwrap();
        assert_eq!(reread, processed);
    }

    #[test]
    fn test_unsupported_original_is_rejected() {
        assert!(matches!(
            build_attachment("x", "a.pdf"),
            Err(AppError::UnsupportedFileType(_))
        ));
    }
}
