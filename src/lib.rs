//! Extracts structured order lines (style, size, quantities, UPC, price)
//! from the semi-structured "Order Details" spreadsheet export of a
//! wholesale ordering platform, and re-emits a flattened, filtered workbook.
//!
//! The input carries no usable headers: articles appear as repeating blocks
//! of label/value cells with a variable-position size/quantity sub-table in
//! each. [`scanner`] reconstructs those blocks with a row-by-row state
//! machine; [`pipeline`] filters, prices, and projects the result;
//! [`excel`] handles workbook I/O at both ends.
//!
//! ```no_run
//! use order_extract::{process_order_details, ExtractOptions};
//!
//! let bytes = std::fs::read("Order_123456_Details.xlsx")?;
//! let opts = ExtractOptions {
//!     order_id: order_extract::order_id_from_filename("Order_123456_Details.xlsx"),
//!     ..ExtractOptions::default()
//! };
//! let result = process_order_details(&bytes, None, &opts)?;
//! std::fs::write("Order_123456_Details_processed.xlsx", &result.xlsx)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod excel;
pub mod pipeline;
pub mod pricing;
pub mod scanner;
pub mod types;

pub use error::ExtractError;
pub use pipeline::{order_id_from_filename, process_order_details, processed_filename};
pub use pricing::PriceSource;
pub use types::{
    Cell, ExtractOptions, OrderLine, PricingMode, ProcessedOrder, Quantities, QuantityKind,
};
