//! Spreadsheet I/O: the grid loader (calamine) and the report writer
//! (rust_xlsxwriter). Both ends are in-memory; the caller owns the bytes.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, DataType, Reader};
use rust_xlsxwriter::{Format, FormatAlign, Workbook, XlsxError};

use crate::error::ExtractError;
use crate::types::Cell;

/// Load the first sheet of a workbook as a rectangular grid of strings.
/// No header interpretation; empty/missing cells become "". Rows keep the
/// sheet's own widths, so indexing past a row's end is the caller's concern.
pub fn load_grid(bytes: &[u8]) -> Result<Vec<Vec<String>>, ExtractError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(ExtractError::NoSheet)??;
    let grid = range
        .rows()
        .map(|row| {
            row.iter()
                .map(|c| c.as_string().unwrap_or_default())
                .collect()
        })
        .collect();
    Ok(grid)
}

/// Remove characters that can corrupt the sheet XML. Drops control chars
/// (except tab, newline, CR); replaces & < > so raw XML is never broken.
fn sanitize_cell(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        let u = c as u32;
        if c == '\t' || c == '\n' || c == '\r' {
            out.push(c);
        } else if u < 0x20 || u == 0x7F || u == 0xFFFE || u == 0xFFFF {
            // skip control and invalid
        } else {
            match c {
                '&' => out.push_str(" and "),
                '<' => out.push(' '),
                '>' => out.push(' '),
                _ => out.push(c),
            }
        }
    }
    out
}

/// Estimate column width from text length (char count × 1.2, clamped 10–50).
fn estimate_text_width(text: &str) -> f64 {
    let w = text.chars().count() as f64 * 1.2;
    w.clamp(10.0, 50.0)
}

const MONEY_WIDTH: f64 = 14.0;

/// Per-column widths: max of header width and cell widths; money columns
/// fixed at 14.
fn column_widths(headers: &[String], rows: &[Vec<Cell>]) -> Vec<f64> {
    let mut widths: Vec<f64> = headers.iter().map(|h| estimate_text_width(h)).collect();
    for row in rows {
        for (col, cell) in row.iter().enumerate() {
            if col >= widths.len() {
                continue;
            }
            match cell {
                Cell::Text(text) => {
                    let w = estimate_text_width(text);
                    if w > widths[col] {
                        widths[col] = w.min(50.0);
                    }
                }
                Cell::Money(_) => widths[col] = MONEY_WIDTH,
                _ => {}
            }
        }
    }
    widths
}

/// Render the projected record set as a single-sheet workbook and return the
/// serialized bytes: header row in the house style, one data row per line,
/// money cells as right-aligned numbers, frozen header pane.
pub fn write_report(headers: &[String], rows: &[Vec<Cell>]) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Order Lines")?;

    let header_format = Format::new()
        .set_bold()
        .set_background_color(rust_xlsxwriter::Color::RGB(0x2563EB))
        .set_font_color(rust_xlsxwriter::Color::RGB(0xFFFFFF));
    let text_format = Format::new();
    let money_format = Format::new()
        .set_num_format("#,##0.00")
        .set_align(FormatAlign::Right);

    for (col, &w) in column_widths(headers, rows).iter().enumerate() {
        worksheet.set_column_width(col as u16, w)?;
    }

    for (col, header) in headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, &sanitize_cell(header), &header_format)?;
    }

    for (row_idx, row) in rows.iter().enumerate() {
        let out_row = (row_idx + 1) as u32;
        for (col_idx, cell) in row.iter().enumerate() {
            let col = col_idx as u16;
            match cell {
                Cell::Text(text) => {
                    worksheet.write_string_with_format(
                        out_row,
                        col,
                        &sanitize_cell(text),
                        &text_format,
                    )?;
                }
                Cell::Int(n) => {
                    worksheet.write_number_with_format(out_row, col, *n as f64, &text_format)?;
                }
                Cell::Number(n) => {
                    worksheet.write_number_with_format(out_row, col, *n, &text_format)?;
                }
                Cell::Money(n) => {
                    worksheet.write_number_with_format(out_row, col, *n, &money_format)?;
                }
                Cell::Empty => {}
            }
        }
    }

    let _ = worksheet.set_freeze_panes(1, 0);
    workbook.save_to_buffer()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn load_grid_rejects_garbage_bytes() {
        assert!(matches!(
            load_grid(b"definitely not a workbook"),
            Err(ExtractError::Load(_))
        ));
    }

    #[test]
    fn report_round_trips_through_loader() {
        let headers = vec!["Model/Color".to_string(), "Confirmed".to_string()];
        let rows = vec![
            vec![Cell::Text("BV1021-109".to_string()), Cell::Int(3)],
            vec![Cell::Text("DM0001-001".to_string()), Cell::Int(5)],
        ];
        let bytes = write_report(&headers, &rows).unwrap();

        let grid = load_grid(&bytes).unwrap();
        assert_eq!(grid[0], vec!["Model/Color", "Confirmed"]);
        assert_eq!(grid[1][0], "BV1021-109");
        assert_eq!(grid[1][1], "3");
        assert_eq!(grid[2][1], "5");
    }

    #[test]
    fn sanitize_strips_control_and_xml_chars() {
        assert_eq!(sanitize_cell("a\u{0}b"), "ab");
        assert_eq!(sanitize_cell("a<b>c&d"), "a b c and d");
        assert_eq!(sanitize_cell("line1\nline2"), "line1\nline2");
    }

    #[test]
    fn money_columns_get_fixed_width() {
        let headers = vec!["Final price".to_string()];
        let rows = vec![vec![Cell::Money(1770.0)]];
        assert_eq!(column_widths(&headers, &rows), vec![MONEY_WIDTH]);
    }
}
