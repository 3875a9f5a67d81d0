//! Price list ingestion and per-line wholesale price resolution.
//!
//! The price list is an optional second upload (CSV or spreadsheet). Key and
//! price columns are found by name against a priority list, falling back to
//! structural heuristics. A list with no usable columns is a warning, never
//! an error: extraction proceeds with an empty map.

use std::collections::HashMap;

use crate::excel;

/// Raw bytes of an uploaded price list.
#[derive(Debug, Clone, Copy)]
pub enum PriceSource<'a> {
    Csv(&'a [u8]),
    Workbook(&'a [u8]),
}

/// Key -> unit wholesale price. Keys are full model/color strings
/// ("BV1021-109") or bare model codes ("BV1021"), whichever the list carries.
pub type PriceMap = HashMap<String, f64>;

const KEY_COLUMNS: &[&str] = &["Model/Color", "Model", "StyleColor", "SKU", "Item Code", "Code"];
const PRICE_COLUMNS: &[&str] = &["Wholesale", "Wholesale price", "WHS", "price", "Price"];

/// Parse one price-list cell. Unlike the scanner's `to_money`, failure here
/// must be distinguishable from an actual zero, so this returns `None` for
/// anything non-numeric.
fn parse_price(raw: &str) -> Option<f64> {
    let s = raw.trim().replace('€', "").replace("EUR", "");
    let s = s.trim().replace(',', ".");
    if s.is_empty() {
        return None;
    }
    s.parse().ok()
}

/// Pick a column by header name against a priority list, first match wins.
fn find_column(headers: &[String], priority: &[&str]) -> Option<usize> {
    for name in priority {
        if let Some(idx) = headers.iter().position(|h| h.trim() == *name) {
            return Some(idx);
        }
    }
    None
}

/// Fallback price column: the one with the most numeric-parsable cells.
fn most_numeric_column(headers: &[String], rows: &[Vec<String>]) -> Option<usize> {
    let mut best: Option<(usize, usize)> = None;
    for col in 0..headers.len() {
        let numeric = rows
            .iter()
            .filter(|r| r.get(col).map(String::as_str).and_then(parse_price).is_some())
            .count();
        if numeric > 0 && best.map(|(_, n)| numeric > n).unwrap_or(true) {
            best = Some((col, numeric));
        }
    }
    best.map(|(col, _)| col)
}

fn read_csv(bytes: &[u8]) -> Result<(Vec<String>, Vec<Vec<String>>), csv::Error> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(bytes);
    let headers = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(record?.iter().map(|c| c.to_string()).collect());
    }
    Ok((headers, rows))
}

fn read_table(source: &PriceSource<'_>) -> Option<(Vec<String>, Vec<Vec<String>>)> {
    match source {
        PriceSource::Csv(bytes) => match read_csv(bytes) {
            Ok(table) => Some(table),
            Err(err) => {
                tracing::warn!(%err, "could not read price list CSV; prices unresolved");
                None
            }
        },
        PriceSource::Workbook(bytes) => match excel::load_grid(bytes) {
            Ok(grid) => {
                let mut rows = grid.into_iter();
                let headers: Vec<String> =
                    rows.next()?.iter().map(|h| h.trim().to_string()).collect();
                Some((headers, rows.collect()))
            }
            Err(err) => {
                tracing::warn!(%err, "could not read price list workbook; prices unresolved");
                None
            }
        },
    }
}

/// Build the price map from an uploaded list. Never fails outward: any
/// problem degrades to an empty map with a warning.
pub fn build_price_map(source: Option<&PriceSource<'_>>) -> PriceMap {
    let Some(source) = source else {
        return PriceMap::new();
    };
    let Some((headers, rows)) = read_table(source) else {
        return PriceMap::new();
    };
    if headers.is_empty() {
        tracing::warn!("price list has no header row; prices unresolved");
        return PriceMap::new();
    }

    let key_col = find_column(&headers, KEY_COLUMNS).unwrap_or(0);
    let price_col = match find_column(&headers, PRICE_COLUMNS)
        .or_else(|| most_numeric_column(&headers, &rows))
    {
        Some(col) => col,
        None => {
            tracing::warn!("price list has no usable price column; prices unresolved");
            return PriceMap::new();
        }
    };

    let mut map = PriceMap::new();
    for row in &rows {
        let key = row.get(key_col).map(|k| k.trim()).unwrap_or("");
        if key.is_empty() {
            continue;
        }
        if let Some(price) = row.get(price_col).map(String::as_str).and_then(parse_price) {
            map.insert(key.to_string(), price);
        }
    }
    tracing::debug!(entries = map.len(), "price map built");
    map
}

/// Resolve a unit wholesale price for one line: full model/color key first,
/// bare code second, configured default third, else unresolved.
pub fn resolve(
    map: &PriceMap,
    model_color: &str,
    code: &str,
    default_wholesale: Option<f64>,
) -> Option<f64> {
    map.get(model_color)
        .or_else(|| map.get(code))
        .copied()
        .or(default_wholesale)
}
