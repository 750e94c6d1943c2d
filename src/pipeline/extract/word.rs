//! Word-processing document extraction via `docx-rs`.
//!
//! Paragraph text is emitted one paragraph per line; table rows become one
//! line each with cells separated by tabs. Legacy binary `.doc` files (OLE
//! compound documents) are routed here too but cannot be parsed; they yield
//! an empty string.

use super::ExtractError;
use docx_rs::{DocumentChild, Paragraph, ParagraphChild, Run, RunChild, Table};
use tracing::warn;

/// OLE compound-file magic used by legacy `.doc`.
const OLE_MAGIC: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Extract the body text of a Word document. Returns an empty string on failure.
pub async fn extract_word_text(bytes: &[u8]) -> String {
    let bytes = bytes.to_vec();
    let result = tokio::task::spawn_blocking(move || extract_blocking(&bytes))
        .await
        .map_err(ExtractError::from)
        .and_then(|r| r);

    match result {
        Ok(text) => text,
        Err(e) => {
            warn!("Word extraction failed: {}", e);
            String::new()
        }
    }
}

fn extract_blocking(bytes: &[u8]) -> Result<String, ExtractError> {
    if bytes.is_empty() {
        return Err(ExtractError::Empty);
    }
    if bytes.starts_with(&OLE_MAGIC) {
        return Err(ExtractError::LegacyWord);
    }

    let docx = docx_rs::read_docx(bytes).map_err(|e| ExtractError::Docx(e.to_string()))?;

    let mut lines: Vec<String> = Vec::new();
    for child in &docx.document.children {
        match child {
            DocumentChild::Paragraph(para) => lines.push(paragraph_text(para)),
            DocumentChild::Table(table) => table_lines(table, &mut lines),
            _ => {}
        }
    }

    Ok(lines
        .iter()
        .map(|l| l.trim_end())
        .filter(|l| !l.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n"))
}

fn paragraph_text(para: &Paragraph) -> String {
    let mut out = String::new();
    for child in &para.children {
        match child {
            ParagraphChild::Run(run) => push_run(run, &mut out),
            ParagraphChild::Hyperlink(link) => {
                for inner in &link.children {
                    if let ParagraphChild::Run(run) = inner {
                        push_run(run, &mut out);
                    }
                }
            }
            _ => {}
        }
    }
    out
}

fn push_run(run: &Run, out: &mut String) {
    for child in &run.children {
        match child {
            RunChild::Text(t) => out.push_str(&t.text),
            RunChild::Tab(_) => out.push('\t'),
            RunChild::Break(_) => out.push('\n'),
            _ => {}
        }
    }
}

fn table_lines(table: &Table, lines: &mut Vec<String>) {
    for row in &table.rows {
        let docx_rs::TableChild::TableRow(tr) = row;
        let mut cells: Vec<String> = Vec::new();
        for cell in &tr.cells {
            let docx_rs::TableRowChild::TableCell(tc) = cell;
            let mut text = String::new();
            for content in &tc.children {
                if let docx_rs::TableCellContent::Paragraph(para) = content {
                    if !text.is_empty() {
                        text.push(' ');
                    }
                    text.push_str(paragraph_text(para).trim());
                }
            }
            cells.push(text);
        }
        lines.push(cells.join("\t"));
    }
}
