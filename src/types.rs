use serde::{Deserialize, Serialize};

/// Tracked order-quantity categories. Data column positions are discovered
/// per size-table header, not fixed globally; adding a kind only touches this
/// enum and its label tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuantityKind {
    Requested,
    Confirmed,
    Shipped,
}

impl QuantityKind {
    pub const ALL: [QuantityKind; 3] = [
        QuantityKind::Requested,
        QuantityKind::Confirmed,
        QuantityKind::Shipped,
    ];

    /// Label as it appears in the size-table header row.
    pub fn header_label(self) -> &'static str {
        match self {
            QuantityKind::Requested => "Requested:",
            QuantityKind::Confirmed => "Open:",
            QuantityKind::Shipped => "Shipped:",
        }
    }

    /// Column name in the exported report.
    pub fn column_name(self) -> &'static str {
        match self {
            QuantityKind::Requested => "Requested",
            QuantityKind::Confirmed => "Confirmed",
            QuantityKind::Shipped => "Shipped",
        }
    }

    pub fn total_column_name(self) -> &'static str {
        match self {
            QuantityKind::Requested => "Total requested",
            QuantityKind::Confirmed => "Total confirmed",
            QuantityKind::Shipped => "Total shipped",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            QuantityKind::Requested => 0,
            QuantityKind::Confirmed => 1,
            QuantityKind::Shipped => 2,
        }
    }
}

/// Quantities per kind for one size row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quantities {
    pub requested: i64,
    pub confirmed: i64,
    pub shipped: i64,
}

impl Quantities {
    pub fn get(&self, kind: QuantityKind) -> i64 {
        match kind {
            QuantityKind::Requested => self.requested,
            QuantityKind::Confirmed => self.confirmed,
            QuantityKind::Shipped => self.shipped,
        }
    }

    pub fn set(&mut self, kind: QuantityKind, value: i64) {
        match kind {
            QuantityKind::Requested => self.requested = value,
            QuantityKind::Confirmed => self.confirmed = value,
            QuantityKind::Shipped => self.shipped = value,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.requested == 0 && self.confirmed == 0 && self.shipped == 0
    }
}

/// Metadata of the article block currently being scanned. Reset in full at
/// every article-start marker; fields fill in as their labels are found.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Article {
    pub model_color: String,
    pub model_name: String,
    pub color_description: String,
    pub product_type: String,
    pub wholesale_price: f64,
    pub retail_price: f64,
}

impl Article {
    pub fn new(model_color: String) -> Self {
        Article {
            model_color,
            ..Article::default()
        }
    }
}

/// One normalized output record for a single (article, size) pair.
#[derive(Debug, Clone, Serialize)]
pub struct OrderLine {
    pub model_color: String,
    pub code: String,
    pub color: String,
    pub size: String,
    pub barcode: String,
    pub model_name: String,
    pub color_description: String,
    pub product_type: String,
    pub order_id: String,
    pub quantities: Quantities,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wholesale_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retail_price: Option<f64>,
    pub discount_percentage: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_price: Option<f64>,
}

/// Where unit prices come from. The two source variants diverge here, so the
/// choice is an explicit configuration rather than a silent merge.
#[derive(Debug, Clone, PartialEq)]
pub enum PricingMode {
    /// Resolve wholesale prices from an uploaded price list (full
    /// model/color key first, bare code second, configured default third)
    /// and compute a discounted final price plus per-kind totals.
    PriceList {
        discount_percentage: f64,
        default_wholesale: Option<f64>,
    },
    /// Carry the wholesale/retail prices embedded in the document itself;
    /// no discount computation.
    Document,
}

/// Parameters the (excluded) UI layer supplies to one extraction run.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub order_id: String,
    pub view: QuantityKind,
    pub pricing: PricingMode,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        ExtractOptions {
            order_id: String::new(),
            view: QuantityKind::Confirmed,
            pricing: PricingMode::PriceList {
                discount_percentage: 0.0,
                default_wholesale: None,
            },
        }
    }
}

/// One projected output cell. Money cells get the amount number format in
/// the export; plain numbers (discount percentage) do not.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Int(i64),
    Number(f64),
    Money(f64),
    Empty,
}

/// Result of one extraction run: the record set for preview, the projected
/// headers, and the serialized workbook bytes.
#[derive(Debug)]
pub struct ProcessedOrder {
    pub headers: Vec<String>,
    pub lines: Vec<OrderLine>,
    pub xlsx: Vec<u8>,
}
