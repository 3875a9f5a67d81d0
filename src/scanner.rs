//! Block-scanning extractor: a single-pass, line-oriented scan over the raw
//! cell grid that reconstructs article metadata, locates each article's
//! size table, and emits one raw line per size row.
//!
//! The grid carries no headers; everything is keyed off exact label strings
//! at hand-identified positions (the value sits in the cell immediately to
//! the right of its label). Size and barcode columns are positional: 0 and 1.

use crate::types::{Article, Quantities, QuantityKind};

const MODEL_COLOR_LABEL: &str = "Model/Color:";
const WHOLESALE_LABEL: &str = "Wholesale:";
const SIZE_HEADER_LABEL: &str = "Size";
const TABLE_END_PREFIX: &str = "Total qty";

const SIZE_COL: usize = 0;
const BARCODE_COL: usize = 1;

/// Article metadata fields settable from a label row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MetaField {
    ModelName,
    ColorDescription,
    ProductType,
    Wholesale,
    Retail,
}

/// Label -> field lookup, tested in order. First matching label wins.
const METADATA_LABELS: &[(&str, MetaField)] = &[
    ("Model name:", MetaField::ModelName),
    ("Color description:", MetaField::ColorDescription),
    ("Product type:", MetaField::ProductType),
    (WHOLESALE_LABEL, MetaField::Wholesale),
    ("Suggested retail:", MetaField::Retail),
];

/// Column positions of one size table, rediscovered at every header row.
/// A `None` quantity column means that kind reads as zero for the whole table.
#[derive(Debug, Clone, Default)]
pub struct TableLayout {
    pub quantity_cols: [Option<usize>; QuantityKind::ALL.len()],
}

/// Scanner state threaded through the row loop, one immutable step at a time.
#[derive(Debug, Clone, Default)]
pub struct ScanState {
    pub article: Option<Article>,
    pub layout: Option<TableLayout>,
    pub in_table: bool,
}

/// One size row paired with a snapshot of its article's metadata. All-zero
/// lines are emitted here on purpose; the pipeline removes them afterwards.
#[derive(Debug, Clone)]
pub struct RawLine {
    pub article: Article,
    pub size: String,
    pub barcode: String,
    pub quantities: Quantities,
}

/// What a row is, tested in priority order. A row belongs to exactly one
/// category; whether the category has any effect still depends on state
/// (a size header without an active article is ignored).
#[derive(Debug, Clone, PartialEq)]
enum RowKind<'a> {
    ArticleStart {
        model_color: &'a str,
        wholesale: Option<&'a str>,
    },
    Metadata {
        field: MetaField,
        value: &'a str,
    },
    SizeHeader,
    TableEnd,
    Other,
}

fn cell<'a>(row: &'a [String], idx: usize) -> &'a str {
    row.get(idx).map(String::as_str).unwrap_or("")
}

/// Index of the first cell exactly equal to `label` after trimming.
/// Exact equality, never substring: "Total Model/Color:" must not match.
fn find_label(row: &[String], label: &str) -> Option<usize> {
    row.iter().position(|c| c.trim() == label)
}

fn classify<'a>(row: &'a [String]) -> RowKind<'a> {
    if let Some(idx) = find_label(row, MODEL_COLOR_LABEL) {
        // Some exports put the wholesale price on the same row as the
        // article-start marker; capture it opportunistically.
        let wholesale = find_label(row, WHOLESALE_LABEL).map(|w| cell(row, w + 1));
        return RowKind::ArticleStart {
            model_color: cell(row, idx + 1),
            wholesale,
        };
    }
    for &(label, field) in METADATA_LABELS {
        if let Some(idx) = find_label(row, label) {
            return RowKind::Metadata {
                field,
                value: cell(row, idx + 1),
            };
        }
    }
    let first = cell(row, 0).trim();
    if first == SIZE_HEADER_LABEL {
        return RowKind::SizeHeader;
    }
    if first.starts_with(TABLE_END_PREFIX) {
        return RowKind::TableEnd;
    }
    RowKind::Other
}

/// Discover quantity columns from a header row. The recorded data column for
/// a kind is the column index of its label cell itself; the size table's data
/// rows carry their values in that same column.
fn discover_layout(row: &[String]) -> TableLayout {
    let mut layout = TableLayout::default();
    for kind in QuantityKind::ALL {
        layout.quantity_cols[kind.index()] = find_label(row, kind.header_label());
    }
    layout
}

/// Advance the scanner by one row. Pure: consumes the previous state and
/// returns the next one, plus at most one emitted line.
pub fn step(state: ScanState, row: &[String]) -> (ScanState, Option<RawLine>) {
    let ScanState {
        mut article,
        mut layout,
        mut in_table,
    } = state;

    match classify(row) {
        RowKind::ArticleStart {
            model_color,
            wholesale,
        } => {
            let mut fresh = Article::new(model_color.trim().to_string());
            if let Some(raw) = wholesale {
                fresh.wholesale_price = to_money(raw);
            }
            article = Some(fresh);
            layout = None;
            in_table = false;
        }
        RowKind::Metadata { field, value } => {
            // Stray metadata before the first article-start is ignored.
            if let Some(ref mut art) = article {
                let value = value.trim();
                match field {
                    MetaField::ModelName => art.model_name = value.to_string(),
                    MetaField::ColorDescription => art.color_description = value.to_string(),
                    MetaField::ProductType => art.product_type = value.to_string(),
                    MetaField::Wholesale => art.wholesale_price = to_money(value),
                    MetaField::Retail => art.retail_price = to_money(value),
                }
            }
        }
        RowKind::SizeHeader => {
            if article.is_some() {
                layout = Some(discover_layout(row));
                in_table = true;
            }
        }
        RowKind::TableEnd => {
            in_table = false;
        }
        RowKind::Other => {
            if in_table {
                if let (Some(art), Some(lay)) = (article.as_ref(), layout.as_ref()) {
                    let size = cell(row, SIZE_COL).trim();
                    if !size.is_empty() {
                        let mut quantities = Quantities::default();
                        for kind in QuantityKind::ALL {
                            if let Some(col) = lay.quantity_cols[kind.index()] {
                                quantities.set(kind, to_int(cell(row, col)));
                            }
                        }
                        let line = RawLine {
                            article: art.clone(),
                            size: size.to_string(),
                            barcode: cell(row, BARCODE_COL).trim().to_string(),
                            quantities,
                        };
                        return (
                            ScanState {
                                article,
                                layout,
                                in_table,
                            },
                            Some(line),
                        );
                    }
                }
            }
        }
    }

    (
        ScanState {
            article,
            layout,
            in_table,
        },
        None,
    )
}

/// Run the scanner over the whole grid.
pub fn scan_grid(grid: &[Vec<String>]) -> Vec<RawLine> {
    let mut state = ScanState::default();
    let mut lines = Vec::new();
    for row in grid {
        let (next, line) = step(state, row);
        state = next;
        lines.extend(line);
    }
    tracing::debug!(rows = grid.len(), lines = lines.len(), "grid scan complete");
    lines
}

/// Parse a money cell like "1.770,00 €": drop the currency symbol and all
/// whitespace (including NBSP), drop "." thousands separators, use "," as the
/// decimal separator. Unparsable input reads as 0.0; source documents carry
/// stray formatting and a bad cell must not abort the pass.
pub fn to_money(raw: &str) -> f64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '€')
        .collect();
    cleaned
        .replace('.', "")
        .replace(',', ".")
        .parse()
        .unwrap_or(0.0)
}

/// Parse a quantity cell: comma as decimal separator, truncated to integer.
/// Unparsable input reads as 0.
pub fn to_int(raw: &str) -> i64 {
    raw.trim()
        .replace(',', ".")
        .parse::<f64>()
        .map(|v| v as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn money_parsing() {
        assert_eq!(to_money("1.770,00 €"), 1770.00);
        assert_eq!(to_money("55,00 €"), 55.00);
        assert_eq!(to_money(""), 0.0);
        assert_eq!(to_money("garbage"), 0.0);
        assert_eq!(to_money("120,5"), 120.5);
        // NBSP between amount and symbol
        assert_eq!(to_money("89,90\u{a0}€"), 89.90);
    }

    #[test]
    fn int_parsing() {
        assert_eq!(to_int("12,0"), 12);
        assert_eq!(to_int("abc"), 0);
        assert_eq!(to_int(" 3 "), 3);
        assert_eq!(to_int(""), 0);
    }

    #[test]
    fn label_match_is_exact_not_substring() {
        let r = row(&["Total Model/Color: stuff", "x"]);
        assert_eq!(find_label(&r, MODEL_COLOR_LABEL), None);
        let r = row(&["", " Model/Color: ", "BV1021-109"]);
        assert_eq!(find_label(&r, MODEL_COLOR_LABEL), Some(1));
    }

    #[test]
    fn article_start_resets_state() {
        let header = row(&["Size", "UPC", "", "Open:", "", "Shipped:"]);
        let (state, _) = step(
            ScanState::default(),
            &row(&["Model/Color:", "BV1021-109"]),
        );
        let (state, _) = step(state, &header);
        assert!(state.in_table);

        let (state, _) = step(state, &row(&["Model/Color:", "DM0001-001"]));
        assert!(!state.in_table);
        assert!(state.layout.is_none());
        let art = state.article.unwrap();
        assert_eq!(art.model_color, "DM0001-001");
        assert_eq!(art.model_name, "");
    }

    #[test]
    fn wholesale_captured_on_article_start_row() {
        let (state, _) = step(
            ScanState::default(),
            &row(&["Model/Color:", "BV1021-109", "", "Wholesale:", "55,00 €"]),
        );
        assert_eq!(state.article.unwrap().wholesale_price, 55.0);
    }

    #[test]
    fn metadata_rows_fill_article_fields() {
        let (state, _) = step(
            ScanState::default(),
            &row(&["Model/Color:", "BV1021-109"]),
        );
        let (state, _) = step(state, &row(&["Model name:", "Court Vision Lo"]));
        let (state, _) = step(state, &row(&["Color description:", "White/Black"]));
        let (state, _) = step(state, &row(&["Product type:", "Footwear"]));
        let (state, _) = step(state, &row(&["Suggested retail:", "89,90 €"]));
        let art = state.article.unwrap();
        assert_eq!(art.model_name, "Court Vision Lo");
        assert_eq!(art.color_description, "White/Black");
        assert_eq!(art.product_type, "Footwear");
        assert_eq!(art.retail_price, 89.9);
    }

    #[test]
    fn metadata_before_first_article_is_ignored() {
        let (state, _) = step(ScanState::default(), &row(&["Model name:", "Stray"]));
        assert!(state.article.is_none());
    }

    #[test]
    fn header_records_label_cell_column_as_data_column() {
        let layout = discover_layout(&row(&[
            "Size", "UPC", "Requested:", "4", "", "Open:", "3", "Shipped:",
        ]));
        assert_eq!(
            layout.quantity_cols[QuantityKind::Requested.index()],
            Some(2)
        );
        assert_eq!(
            layout.quantity_cols[QuantityKind::Confirmed.index()],
            Some(5)
        );
        assert_eq!(layout.quantity_cols[QuantityKind::Shipped.index()], Some(7));
    }

    #[test]
    fn missing_quantity_label_reads_as_zero() {
        let grid = vec![
            row(&["Model/Color:", "BV1021-109"]),
            row(&["Size", "UPC", "", "Shipped:"]),
            row(&["42", "00883412740135", "", "7"]),
        ];
        let lines = scan_grid(&grid);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantities.shipped, 7);
        assert_eq!(lines[0].quantities.confirmed, 0);
        assert_eq!(lines[0].quantities.requested, 0);
    }

    #[test]
    fn size_rows_outside_table_are_skipped() {
        let grid = vec![
            row(&["42", "00883412740135", "2"]),
            row(&["Model/Color:", "BV1021-109"]),
            row(&["43", "00883412740136", "1"]),
        ];
        assert!(scan_grid(&grid).is_empty());
    }

    #[test]
    fn table_end_stops_size_rows_until_next_header() {
        let grid = vec![
            row(&["Model/Color:", "BV1021-109"]),
            row(&["Size", "UPC", "", "Open:"]),
            row(&["42", "00883412740135", "", "2"]),
            row(&["Total qty: 2"]),
            row(&["43", "00883412740136", "", "9"]),
        ];
        let lines = scan_grid(&grid);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].size, "42");
    }

    #[test]
    fn blank_separator_rows_inside_table_are_skipped() {
        let grid = vec![
            row(&["Model/Color:", "BV1021-109"]),
            row(&["Size", "UPC", "", "Open:"]),
            row(&["", "", "", ""]),
            row(&["42", "00883412740135", "", "2"]),
        ];
        assert_eq!(scan_grid(&grid).len(), 1);
    }

    #[test]
    fn all_zero_size_rows_are_still_emitted() {
        // Zero-quantity lines are removed by the pipeline, not the scanner.
        let grid = vec![
            row(&["Model/Color:", "BV1021-109"]),
            row(&["Size", "UPC", "", "Open:"]),
            row(&["42", "00883412740135", "", "0"]),
        ];
        let lines = scan_grid(&grid);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].quantities.is_zero());
    }

    #[test]
    fn line_count_matches_non_blank_size_rows_per_block() {
        let grid = vec![
            row(&["Model/Color:", "BV1021-109"]),
            row(&["Size", "UPC", "", "Open:", "", "Shipped:"]),
            row(&["40", "00883412740130", "", "1", "", "0"]),
            row(&["41", "00883412740131", "", "0", "", "2"]),
            row(&["42", "00883412740132", "", "3", "", "3"]),
            row(&["Total qty: 9"]),
            row(&["Model/Color:", "DM0001-001"]),
            row(&["Size", "UPC", "", "Open:"]),
            row(&["S", "00883412999001", "", "4"]),
            row(&["M", "00883412999002", "", "5"]),
        ];
        let lines = scan_grid(&grid);
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[3].article.model_color, "DM0001-001");
        assert_eq!(lines[4].size, "M");
        assert_eq!(lines[4].quantities.confirmed, 5);
    }

    #[test]
    fn grid_without_article_markers_yields_nothing() {
        let grid = vec![
            row(&["Order summary"]),
            row(&["Size", "UPC"]),
            row(&["42", "00883412740135"]),
        ];
        assert!(scan_grid(&grid).is_empty());
    }
}
