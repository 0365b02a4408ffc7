//! Export of table rows to CSV, XLSX and PDF
//!
//! Exports use the visible data columns of a table and raw cell values.
//! Custom renderers only affect what is drawn on screen.

use crate::model::column::{Column, Record};
use crate::model::table::TableState;
use crate::model::value::Value;
use log::info;
use printpdf::{BuiltinFont, Mm, PdfDocument};
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("XLSX export failed: {0}")]
    Xlsx(#[from] XlsxError),
    #[error("PDF export failed: {0}")]
    Pdf(#[from] printpdf::Error),
    #[error("failed to write export: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Xlsx,
    Pdf,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Csv, ExportFormat::Xlsx, ExportFormat::Pdf];

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Pdf => "pdf",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "CSV",
            ExportFormat::Xlsx => "Excel (XLSX)",
            ExportFormat::Pdf => "PDF",
        }
    }
}

/// Which rows an export covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportScope {
    /// Every filtered row (the held page in server mode)
    All,
    Selected,
}

impl ExportScope {
    fn file_stem(&self) -> &'static str {
        match self {
            ExportScope::All => "data",
            ExportScope::Selected => "selected-data",
        }
    }

    fn sheet_name(&self) -> &'static str {
        match self {
            ExportScope::All => "Data",
            ExportScope::Selected => "Selected",
        }
    }
}

/// Export a table's rows into `dir`.
///
/// Returns the written path, or `None` when a selection export has nothing
/// selected.
pub fn export_table<R: Record>(
    table: &TableState<R>,
    format: ExportFormat,
    scope: ExportScope,
    dir: &Path,
) -> Result<Option<PathBuf>, ExportError> {
    let rows = match scope {
        ExportScope::All => table.filtered_rows(),
        ExportScope::Selected => table.selected_rows(),
    };
    if scope == ExportScope::Selected && rows.is_empty() {
        return Ok(None);
    }

    let columns = table.export_columns();
    let bytes = match format {
        ExportFormat::Csv => {
            let mut buffer = Vec::new();
            write_csv(&mut buffer, &columns, &rows)?;
            buffer
        }
        ExportFormat::Xlsx => xlsx_bytes(&columns, &rows, scope.sheet_name())?,
        ExportFormat::Pdf => pdf_bytes(&columns, &rows)?,
    };

    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.{}", scope.file_stem(), format.extension()));
    fs::write(&path, bytes)?;
    info!("Exported {} rows to {}", rows.len(), path.display());
    Ok(Some(path))
}

fn headers<R>(columns: &[&Column<R>]) -> Vec<String> {
    columns.iter().map(|c| c.label.clone()).collect()
}

/// Write rows as CSV with a header line
pub fn write_csv<R: Record, W: Write>(
    writer: W,
    columns: &[&Column<R>],
    rows: &[&R],
) -> Result<(), ExportError> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(headers(columns))?;
    for row in rows {
        csv.write_record(columns.iter().map(|c| c.raw(row).to_string()))?;
    }
    csv.flush()?;
    Ok(())
}

/// Build an XLSX workbook with a single sheet
pub fn xlsx_bytes<R: Record>(
    columns: &[&Column<R>],
    rows: &[&R],
    sheet_name: &str,
) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name(sheet_name)?;

    for (col, header) in headers(columns).iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, header, &bold)?;
    }

    for (r, row) in rows.iter().enumerate() {
        let line = r as u32 + 1;
        for (c, column) in columns.iter().enumerate() {
            let col = c as u16;
            match column.raw(row) {
                Value::Null => {}
                Value::Int(i) => {
                    sheet.write_number(line, col, i as f64)?;
                }
                Value::Float(f) => {
                    sheet.write_number(line, col, f)?;
                }
                Value::Bool(b) => {
                    sheet.write_boolean(line, col, b)?;
                }
                other => {
                    sheet.write_string(line, col, other.to_string())?;
                }
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

// A4 landscape
const PAGE_WIDTH: f32 = 297.0;
const PAGE_HEIGHT: f32 = 210.0;
const MARGIN: f32 = 12.0;
const LINE_HEIGHT: f32 = 6.0;
const FONT_SIZE: f32 = 8.0;
// rough width of one Helvetica glyph at FONT_SIZE
const CHAR_WIDTH: f32 = 1.5;

fn fit(text: &str, width: f32) -> String {
    let max = ((width / CHAR_WIDTH) as usize).max(1);
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Render rows as a paginated landscape table with a bold header on every page
pub fn pdf_bytes<R: Record>(columns: &[&Column<R>], rows: &[&R]) -> Result<Vec<u8>, ExportError> {
    let (doc, first_page, first_layer) =
        PdfDocument::new("Export", Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
    let header_font = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;
    let body_font = doc.add_builtin_font(BuiltinFont::Helvetica)?;

    let column_width = (PAGE_WIDTH - 2.0 * MARGIN) / columns.len().max(1) as f32;
    let rows_per_page = (((PAGE_HEIGHT - 2.0 * MARGIN) / LINE_HEIGHT) as usize)
        .saturating_sub(1)
        .max(1);
    let header = headers(columns);

    let mut chunks: Vec<&[&R]> = rows.chunks(rows_per_page).collect();
    if chunks.is_empty() {
        chunks.push(&[]);
    }

    for (index, chunk) in chunks.iter().enumerate() {
        let layer = if index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page, layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
            doc.get_page(page).get_layer(layer)
        };

        let mut y = PAGE_HEIGHT - MARGIN;
        for (c, label) in header.iter().enumerate() {
            let x = MARGIN + c as f32 * column_width;
            layer.use_text(fit(label, column_width), FONT_SIZE, Mm(x), Mm(y), &header_font);
        }

        for row in chunk.iter() {
            y -= LINE_HEIGHT;
            for (c, column) in columns.iter().enumerate() {
                let x = MARGIN + c as f32 * column_width;
                let text = column.raw(row).to_string();
                layer.use_text(fit(&text, column_width), FONT_SIZE, Mm(x), Mm(y), &body_font);
            }
        }
    }

    Ok(doc.save_to_bytes()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::user::{user_columns, User};
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn user(id: i64, name: &str) -> User {
        User {
            id,
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone: String::new(),
            address: String::new(),
            country: "Norway".to_string(),
            avatar: String::new(),
            language: "English".to_string(),
            city: "Oslo".to_string(),
            company: String::new(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
        }
    }

    fn table() -> TableState<User> {
        TableState::client(
            user_columns(),
            vec![user(1, "John"), user(2, "Amy"), user(3, "Joanna")],
            10,
        )
        .with_selection()
        .with_row_actions()
    }

    #[test]
    fn test_csv_uses_raw_values_and_visible_columns() {
        let mut table = table();
        table.toggle_column_visibility("address");
        let dir = TempDir::new().unwrap();

        let path = export_table(&table, ExportFormat::Csv, ExportScope::All, dir.path())
            .unwrap()
            .unwrap();
        assert_eq!(path.file_name().unwrap(), "data.csv");

        let text = fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("ID,Name,Email"));
        assert!(!header.contains("Address"));
        assert!(!header.contains("Avatar"));
        // raw name, not the rendered badge
        assert!(lines.next().unwrap().starts_with("1,John,john@example.com"));
        assert_eq!(text.lines().count(), 4);
    }

    #[test]
    fn test_empty_selection_writes_nothing() {
        let table = table();
        let dir = TempDir::new().unwrap();
        for format in ExportFormat::ALL {
            let out = export_table(&table, format, ExportScope::Selected, dir.path()).unwrap();
            assert!(out.is_none());
        }
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_selected_export_only_has_selected_rows() {
        let mut table = table();
        table.toggle_row(3);
        let dir = TempDir::new().unwrap();
        let path = export_table(&table, ExportFormat::Csv, ExportScope::Selected, dir.path())
            .unwrap()
            .unwrap();
        assert_eq!(path.file_name().unwrap(), "selected-data.csv");
        let text = fs::read_to_string(path).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("Joanna"));
    }

    #[test]
    fn test_binary_formats_write_files() {
        let table = table();
        let dir = TempDir::new().unwrap();

        let xlsx = export_table(&table, ExportFormat::Xlsx, ExportScope::All, dir.path())
            .unwrap()
            .unwrap();
        assert!(fs::read(xlsx).unwrap().starts_with(b"PK"));

        let pdf = export_table(&table, ExportFormat::Pdf, ExportScope::All, dir.path())
            .unwrap()
            .unwrap();
        assert!(fs::read(pdf).unwrap().starts_with(b"%PDF"));
    }

    #[test]
    fn test_pdf_paginates_long_tables() {
        let rows: Vec<User> = (0..120).map(|i| user(i, "Row")).collect();
        let refs: Vec<&User> = rows.iter().collect();
        let columns = user_columns();
        let column_refs: Vec<&Column<User>> = columns.iter().collect();
        let bytes = pdf_bytes(&column_refs, &refs).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_fit_truncates() {
        assert_eq!(fit("short", 100.0), "short");
        let cut = fit("a fairly long piece of text", 7.5);
        assert_eq!(cut.chars().count(), 5);
        assert!(cut.ends_with('…'));
    }
}
