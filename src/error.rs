use thiserror::Error;

/// Failures that escalate to the caller. Per-cell anomalies (unparsable
/// quantities, malformed money strings) never appear here: they degrade to
/// zero or empty at the point of reading.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Input bytes are not a parsable spreadsheet.
    #[error("could not read spreadsheet: {0}")]
    Load(#[from] calamine::Error),

    /// Workbook parsed but has no first sheet.
    #[error("workbook contains no sheets")]
    NoSheet,

    /// Scan and filtering produced zero order lines. Usually the wrong
    /// document type was uploaded, or the selected view has no quantities.
    #[error("no order lines extracted; check that the file is an Order Details export")]
    Empty,

    /// Output workbook could not be serialized.
    #[error("could not write output workbook: {0}")]
    Export(#[from] rust_xlsxwriter::XlsxError),
}
