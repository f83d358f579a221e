//! Text extraction from uploaded documents.
//!
//! A .docx file is a ZIP archive of XML parts. docx-rs parses it into a typed
//! tree and we walk Document → Paragraph/Table → Run → Text, dropping formatting.
//! Each paragraph, including every table cell paragraph, becomes one line.
//! Plain text uploads are decoded as UTF-8 without any binary parsing.

use docx_rs::{
    read_docx, DocumentChild, InsertChild, Paragraph, ParagraphChild, Run, RunChild,
    StructuredDataTag, StructuredDataTagChild, Table, TableCellContent, TableChild, TableRowChild,
};
use tracing::debug;

use crate::documents::{DocumentKind, Upload};
use crate::errors::AppError;

/// Returns the body text of `upload`, one line per paragraph for .docx.
pub fn extract_text(upload: &Upload) -> Result<String, AppError> {
    let kind = DocumentKind::from_filename(&upload.filename)?;
    let text = match kind {
        DocumentKind::Docx => extract_docx_text(&upload.content, &upload.filename)?,
        DocumentKind::PlainText => String::from_utf8_lossy(&upload.content).into_owned(),
    };
    debug!(
        "Extracted {} chars from '{}' ({:?})",
        text.chars().count(),
        upload.filename,
        kind
    );
    Ok(text)
}

fn extract_docx_text(bytes: &[u8], filename: &str) -> Result<String, AppError> {
    let docx = read_docx(bytes)
        .map_err(|e| AppError::Extraction(format!("docx parse error in '{filename}': {e:?}")))?;

    let mut lines = Vec::new();
    for child in &docx.document.children {
        match child {
            DocumentChild::Paragraph(para) => lines.push(paragraph_text(para)),
            DocumentChild::Table(table) => table_lines(table, &mut lines),
            DocumentChild::StructuredDataTag(tag) => tag_lines(tag, &mut lines),
            _ => {}
        }
    }

    Ok(lines.join("\n"))
}

/// Every cell paragraph becomes its own line, row by row. Nested tables are
/// flattened in place.
fn table_lines(table: &Table, lines: &mut Vec<String>) {
    for TableChild::TableRow(row) in &table.rows {
        for TableRowChild::TableCell(cell) in &row.cells {
            for content in &cell.children {
                match content {
                    TableCellContent::Paragraph(para) => lines.push(paragraph_text(para)),
                    TableCellContent::Table(inner) => table_lines(inner, lines),
                    TableCellContent::StructuredDataTag(tag) => tag_lines(tag, lines),
                    _ => {}
                }
            }
        }
    }
}

/// Block-level content control. Loose runs between blocks form one line.
fn tag_lines(tag: &StructuredDataTag, lines: &mut Vec<String>) {
    let mut pending: Option<String> = None;
    for child in &tag.children {
        if let StructuredDataTagChild::Run(run) = child {
            run_text(run, pending.get_or_insert_with(String::new));
            continue;
        }
        lines.extend(pending.take());
        match child {
            StructuredDataTagChild::Paragraph(para) => lines.push(paragraph_text(para)),
            StructuredDataTagChild::Table(table) => table_lines(table, lines),
            StructuredDataTagChild::StructuredDataTag(inner) => tag_lines(inner, lines),
            _ => {}
        }
    }
    lines.extend(pending);
}

/// Concatenates the runs of one paragraph. Runs are fragments of the same
/// line, so no separator goes between them.
fn paragraph_text(para: &Paragraph) -> String {
    let mut text = String::new();
    inline_text(&para.children, &mut text);
    text
}

/// Hyperlinks, tracked insertions and inline content controls contribute
/// their runs. Tracked deletions do not.
fn inline_text(children: &[ParagraphChild], text: &mut String) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => run_text(run, text),
            ParagraphChild::Hyperlink(link) => inline_text(&link.children, text),
            ParagraphChild::Insert(insert) => {
                for ic in &insert.children {
                    if let InsertChild::Run(run) = ic {
                        run_text(run, text);
                    }
                }
            }
            ParagraphChild::StructuredDataTag(tag) => inline_tag_text(tag, text),
            _ => {}
        }
    }
}

fn inline_tag_text(tag: &StructuredDataTag, text: &mut String) {
    for child in &tag.children {
        match child {
            StructuredDataTagChild::Run(run) => run_text(run, text),
            StructuredDataTagChild::StructuredDataTag(inner) => inline_tag_text(inner, text),
            _ => {}
        }
    }
}

fn run_text(run: &Run, text: &mut String) {
    for rc in &run.children {
        match rc {
            RunChild::Text(t) => text.push_str(&t.text),
            RunChild::Tab(_) => text.push('\t'),
            RunChild::Break(_) => text.push('\n'),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use docx_rs::{BreakType, Docx, Hyperlink, HyperlinkType, Insert, TableCell, TableRow};

    fn upload(filename: &str, content: impl Into<Bytes>) -> Upload {
        Upload {
            filename: filename.to_string(),
            content: content.into(),
        }
    }

    fn pack(docx: Docx) -> Vec<u8> {
        let mut buf = std::io::Cursor::new(Vec::new());
        docx.build().pack(&mut buf).unwrap();
        buf.into_inner()
    }

    fn docx_bytes(paragraphs: &[&[&str]]) -> Vec<u8> {
        let mut docx = Docx::new();
        for runs in paragraphs {
            let mut para = Paragraph::new();
            for run in *runs {
                para = para.add_run(Run::new().add_text(*run));
            }
            docx = docx.add_paragraph(para);
        }
        pack(docx)
    }

    fn text_para(text: &str) -> Paragraph {
        Paragraph::new().add_run(Run::new().add_text(text))
    }

    #[test]
    fn test_plain_text_is_read_verbatim() {
        let text = extract_text(&upload("letter.txt", "Dear {{name}},\r\nHi")).unwrap();
        assert_eq!(text, "Dear {{name}},\r\nHi");
    }

    #[test]
    fn test_doc_is_treated_as_plain_text() {
        let text = extract_text(&upload("legacy.DOC", "Hello {{ who }}")).unwrap();
        assert_eq!(text, "Hello {{ who }}");
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let text = extract_text(&upload("a.txt", vec![b'o', b'k', 0xff])).unwrap();
        assert_eq!(text, "ok\u{fffd}");
    }

    #[test]
    fn test_unsupported_extension_is_rejected() {
        let err = extract_text(&upload("scan.pdf", "%PDF-1.4")).unwrap_err();
        assert!(matches!(err, AppError::UnsupportedFileType(_)));
    }

    #[test]
    fn test_docx_paragraphs_become_lines() {
        let bytes = docx_bytes(&[&["Dear {{name}},"], &["Order #", "{{order}}", "."]]);
        let text = extract_text(&upload("offer.docx", bytes)).unwrap();
        assert_eq!(text, "Dear {{name}},\nOrder #{{order}}.");
    }

    #[test]
    fn test_corrupt_docx_is_extraction_error() {
        let err = extract_text(&upload("broken.docx", "not a zip archive")).unwrap_err();
        assert!(matches!(err, AppError::Extraction(_)));
    }

    #[test]
    fn test_docx_table_cells_become_lines() {
        let table = Table::new(vec![
            TableRow::new(vec![
                TableCell::new().add_paragraph(text_para("Amount: {{amount}}")),
                TableCell::new().add_paragraph(text_para("Due: {{due}}")),
            ]),
            TableRow::new(vec![
                TableCell::new().add_paragraph(text_para("Total")),
                TableCell::new().add_paragraph(text_para("{{amount}}")),
            ]),
        ]);
        let docx = Docx::new()
            .add_paragraph(text_para("Dear {{name}}"))
            .add_table(table)
            .add_paragraph(text_para("Regards"));

        let text = extract_text(&upload("invoice.docx", pack(docx))).unwrap();
        assert_eq!(
            text,
            "Dear {{name}}\nAmount: {{amount}}\nDue: {{due}}\nTotal\n{{amount}}\nRegards"
        );
        assert_eq!(
            crate::template::extract_variables(&text),
            vec!["name", "amount", "due"]
        );
    }

    #[test]
    fn test_docx_hyperlink_text_is_kept() {
        let para = text_para("See").add_hyperlink(
            Hyperlink::new("terms", HyperlinkType::Anchor).add_run(Run::new().add_text("{{link}}")),
        );
        let text = extract_text(&upload("offer.docx", pack(Docx::new().add_paragraph(para)))).unwrap();
        assert_eq!(text, "See{{link}}");
    }

    #[test]
    fn test_docx_tracked_insertion_is_kept() {
        let para = text_para("Signed:").add_insert(Insert::new(Run::new().add_text("{{signer}}")));
        let text = extract_text(&upload("offer.docx", pack(Docx::new().add_paragraph(para)))).unwrap();
        assert_eq!(text, "Signed:{{signer}}");
    }

    #[test]
    fn test_docx_line_break_and_tab() {
        let run = Run::new()
            .add_text("Name:")
            .add_tab()
            .add_text("{{name}}")
            .add_break(BreakType::TextWrapping)
            .add_text("Date:");
        let docx = Docx::new().add_paragraph(Paragraph::new().add_run(run));
        let text = extract_text(&upload("form.docx", pack(docx))).unwrap();
        assert_eq!(text, "Name:\t{{name}}\nDate:");
    }
}
