//! Excel mirroring — writes the full expense table to an `.xlsx` workbook.
//!
//! An `.xlsx` file is a zip container of OOXML parts. The table here is a
//! single flat sheet with a header row, so the workbook is assembled
//! directly: content types, relationship parts, one workbook part, one
//! worksheet part. Text cells use inline strings (no shared-string table),
//! numbers are written as raw `<v>` values so Excel treats them as numeric.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use zip::write::{FileOptions, ZipWriter};

use crate::error::AppError;
use crate::ledger::Entry;

/// Column headers, matching the `expenses` table column order.
const HEADERS: [&str; 10] = [
    "id", "timestamp", "user", "entry_type", "name", "amount", "category", "note",
    "payment_method", "account_type",
];

const SHEET_NAME: &str = "Expenses";

/// Write `entries` to an Excel workbook at `path`, replacing any previous
/// file. The workbook is written to a sibling temp file first and renamed
/// into place; a partial write would otherwise leave a corrupt zip behind.
pub fn write_xlsx(path: &Path, entries: &[Entry]) -> Result<(), AppError> {
    let tmp_path = path.with_extension("xlsx.tmp");
    let file = File::create(&tmp_path)
        .map_err(|e| AppError::Export(format!("create {}: {e}", tmp_path.display())))?;

    let mut zip = ZipWriter::new(file);
    let parts: [(&str, String); 5] = [
        ("[Content_Types].xml", content_types_xml()),
        ("_rels/.rels", root_rels_xml()),
        ("xl/workbook.xml", workbook_xml()),
        ("xl/_rels/workbook.xml.rels", workbook_rels_xml()),
        ("xl/worksheets/sheet1.xml", worksheet_xml(entries)),
    ];
    for (name, content) in parts {
        zip.start_file::<_, ()>(name, FileOptions::default())
            .map_err(|e| AppError::Export(format!("start {name}: {e}")))?;
        zip.write_all(content.as_bytes())
            .map_err(|e| AppError::Export(format!("write {name}: {e}")))?;
    }
    zip.finish()
        .map_err(|e| AppError::Export(format!("finish workbook: {e}")))?;

    fs::rename(&tmp_path, path)
        .map_err(|e| AppError::Export(format!("rename into {}: {e}", path.display())))?;
    Ok(())
}

// ── OOXML parts ──────────────────────────────────────────────────────────────

fn content_types_xml() -> String {
    concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
        r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
        r#"<Default Extension="xml" ContentType="application/xml"/>"#,
        r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
        r#"<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
        r#"</Types>"#,
    )
    .to_string()
}

fn root_rels_xml() -> String {
    concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>"#,
        r#"</Relationships>"#,
    )
    .to_string()
}

fn workbook_xml() -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" "#,
            r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
            r#"<sheets><sheet name="{name}" sheetId="1" r:id="rId1"/></sheets>"#,
            r#"</workbook>"#,
        ),
        name = SHEET_NAME,
    )
}

fn workbook_rels_xml() -> String {
    concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>"#,
        r#"</Relationships>"#,
    )
    .to_string()
}

fn worksheet_xml(entries: &[Entry]) -> String {
    let mut xml = String::from(concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
        r#"<sheetData>"#,
    ));

    xml.push_str("<row r=\"1\">");
    for (col, header) in HEADERS.iter().enumerate() {
        push_text_cell(&mut xml, col, 1, header);
    }
    xml.push_str("</row>");

    for (i, entry) in entries.iter().enumerate() {
        let row = i + 2;
        xml.push_str(&format!("<row r=\"{row}\">"));
        push_number_cell(&mut xml, 0, row, entry.id as f64);
        push_text_cell(&mut xml, 1, row, &entry.timestamp);
        push_text_cell(&mut xml, 2, row, &entry.user);
        push_text_cell(&mut xml, 3, row, &entry.entry_type);
        push_text_cell(&mut xml, 4, row, &entry.name);
        push_number_cell(&mut xml, 5, row, entry.amount);
        push_text_cell(&mut xml, 6, row, &entry.category);
        push_text_cell(&mut xml, 7, row, &entry.note);
        push_text_cell(&mut xml, 8, row, &entry.payment_method);
        push_text_cell(&mut xml, 9, row, &entry.account_type);
        xml.push_str("</row>");
    }

    xml.push_str("</sheetData></worksheet>");
    xml
}

// ── cells ────────────────────────────────────────────────────────────────────

fn push_text_cell(xml: &mut String, col: usize, row: usize, value: &str) {
    xml.push_str(&format!(
        "<c r=\"{}{row}\" t=\"inlineStr\"><is><t>{}</t></is></c>",
        column_letter(col),
        escape_xml(value),
    ));
}

fn push_number_cell(xml: &mut String, col: usize, row: usize, value: f64) {
    xml.push_str(&format!("<c r=\"{}{row}\"><v>{value}</v></c>", column_letter(col)));
}

/// 0-based column index to a spreadsheet column label (`0 -> A`, `26 -> AA`).
fn column_letter(mut col: usize) -> String {
    let mut label = String::new();
    loop {
        label.insert(0, (b'A' + (col % 26) as u8) as char);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    label
}

fn escape_xml(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
