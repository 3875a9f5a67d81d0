//! Post-scan pipeline: turn raw scanned lines into the final record set and
//! workbook. Splitting, zero-filtering, price enrichment, view filtering and
//! column projection run once over the whole scan result; nothing here
//! mutates a line after its derived fields are appended.

use regex::Regex;

use crate::error::ExtractError;
use crate::excel;
use crate::pricing::{self, PriceSource};
use crate::scanner::{self, RawLine};
use crate::types::{Cell, ExtractOptions, OrderLine, PricingMode, ProcessedOrder};

/// Order id from a source filename: first run of digits surrounded by
/// underscores, e.g. "Order_123456_Details.xlsx" -> "123456".
pub fn order_id_from_filename(filename: &str) -> String {
    let re = Regex::new(r"_(\d+)_").expect("order id regex");
    re.captures(filename)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Suggested name for the output artifact: "{stem}_processed.xlsx".
pub fn processed_filename(original: &str) -> String {
    let stem = original.rsplit_once('.').map(|(s, _)| s).unwrap_or(original);
    format!("{stem}_processed.xlsx")
}

/// Split "BV1021-109" into code "BV1021" and color "109". No separator means
/// the whole string is the code and the color is empty.
pub fn split_code_color(model_color: &str) -> (String, String) {
    match model_color.split_once('-') {
        Some((code, color)) => (code.to_string(), color.to_string()),
        None => (model_color.to_string(), String::new()),
    }
}

fn enrich(raw: RawLine, opts: &ExtractOptions, price_map: &pricing::PriceMap) -> OrderLine {
    let (code, color) = split_code_color(&raw.article.model_color);
    let (wholesale_price, retail_price, discount_percentage) = match &opts.pricing {
        PricingMode::PriceList {
            discount_percentage,
            default_wholesale,
        } => {
            let wholesale = pricing::resolve(
                price_map,
                &raw.article.model_color,
                &code,
                *default_wholesale,
            );
            (wholesale, None, *discount_percentage)
        }
        PricingMode::Document => (
            Some(raw.article.wholesale_price),
            Some(raw.article.retail_price),
            0.0,
        ),
    };
    let final_price = match &opts.pricing {
        PricingMode::PriceList { .. } => {
            wholesale_price.map(|w| w * (1.0 - discount_percentage / 100.0))
        }
        PricingMode::Document => None,
    };

    OrderLine {
        model_color: raw.article.model_color,
        code,
        color,
        size: raw.size,
        barcode: raw.barcode,
        model_name: raw.article.model_name,
        color_description: raw.article.color_description,
        product_type: raw.article.product_type,
        order_id: opts.order_id.clone(),
        quantities: raw.quantities,
        wholesale_price,
        retail_price,
        discount_percentage,
        final_price,
    }
}

/// Projected column names: identity/metadata first, the selected quantity,
/// then the price columns for the active pricing mode.
pub fn projected_headers(opts: &ExtractOptions) -> Vec<String> {
    let mut headers: Vec<String> = [
        "Model/Color",
        "Color description",
        "Code",
        "Model name",
        "Product type",
        "Color",
        "Size",
        "Barcode (UPC)",
        "Order ID",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    headers.push(opts.view.column_name().to_string());
    match opts.pricing {
        PricingMode::PriceList { .. } => {
            headers.push("Wholesale price".to_string());
            headers.push("Discount %".to_string());
            headers.push("Final price".to_string());
            headers.push(opts.view.total_column_name().to_string());
        }
        PricingMode::Document => {
            headers.push("Wholesale price".to_string());
            headers.push("Retail price".to_string());
        }
    }
    headers
}

fn project_line(line: &OrderLine, opts: &ExtractOptions) -> Vec<Cell> {
    let quantity = line.quantities.get(opts.view);
    let mut row = vec![
        Cell::Text(line.model_color.clone()),
        Cell::Text(line.color_description.clone()),
        Cell::Text(line.code.clone()),
        Cell::Text(line.model_name.clone()),
        Cell::Text(line.product_type.clone()),
        Cell::Text(line.color.clone()),
        Cell::Text(line.size.clone()),
        Cell::Text(line.barcode.clone()),
        Cell::Text(line.order_id.clone()),
        Cell::Int(quantity),
    ];
    match opts.pricing {
        PricingMode::PriceList { .. } => {
            row.push(line.wholesale_price.map(Cell::Money).unwrap_or(Cell::Empty));
            row.push(Cell::Number(line.discount_percentage));
            row.push(line.final_price.map(Cell::Money).unwrap_or(Cell::Empty));
            row.push(
                line.final_price
                    .map(|p| Cell::Money(p * quantity as f64))
                    .unwrap_or(Cell::Empty),
            );
        }
        PricingMode::Document => {
            row.push(line.wholesale_price.map(Cell::Money).unwrap_or(Cell::Empty));
            row.push(line.retail_price.map(Cell::Money).unwrap_or(Cell::Empty));
        }
    }
    row
}

/// Run the full post-scan pipeline over raw scanned lines.
fn finalize(
    raw_lines: Vec<RawLine>,
    price_map: &pricing::PriceMap,
    opts: &ExtractOptions,
) -> Result<ProcessedOrder, ExtractError> {
    // Two phases on purpose: lines with every kind at zero were still
    // constructed by the scanner and are only dropped here.
    let lines: Vec<OrderLine> = raw_lines
        .into_iter()
        .filter(|raw| !raw.quantities.is_zero())
        .map(|raw| enrich(raw, opts, price_map))
        .filter(|line| line.quantities.get(opts.view) > 0)
        .collect();

    if lines.is_empty() {
        return Err(ExtractError::Empty);
    }

    let headers = projected_headers(opts);
    let rows: Vec<Vec<Cell>> = lines.iter().map(|l| project_line(l, opts)).collect();
    let xlsx = excel::write_report(&headers, &rows)?;

    tracing::debug!(lines = lines.len(), "order processed");
    Ok(ProcessedOrder {
        headers,
        lines,
        xlsx,
    })
}

/// One complete extraction run: load the grid from the uploaded workbook
/// bytes, scan it, build the price map from the optional price list, and
/// produce the filtered record set plus the output workbook bytes.
pub fn process_order_details(
    bytes: &[u8],
    price_list: Option<&PriceSource<'_>>,
    opts: &ExtractOptions,
) -> Result<ProcessedOrder, ExtractError> {
    let grid = excel::load_grid(bytes)?;
    let raw_lines = scanner::scan_grid(&grid);
    let price_map = pricing::build_price_map(price_list);
    finalize(raw_lines, &price_map, opts)
}
