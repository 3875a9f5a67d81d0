use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};

use order_extract::{
    order_id_from_filename, process_order_details, processed_filename, ExtractOptions, PriceSource,
    PricingMode, QuantityKind,
};

#[derive(Parser)]
#[command(
    name = "order-extract",
    about = "Flatten an Order Details export into filtered order lines"
)]
struct Cli {
    /// Order Details workbook (.xlsx)
    input: PathBuf,

    /// Optional price list (.csv or .xlsx) with model/code and wholesale columns
    #[arg(long)]
    price_list: Option<PathBuf>,

    /// Quantity kind to keep in the output
    #[arg(long, value_enum, default_value = "confirmed")]
    view: View,

    /// Discount percentage applied to the wholesale price (0-100)
    #[arg(long, default_value_t = 0.0)]
    discount: f64,

    /// Wholesale price to use when the price list has no match
    #[arg(long)]
    default_price: Option<f64>,

    /// Take wholesale/retail prices embedded in the document instead of a price list
    #[arg(long)]
    document_prices: bool,

    /// Order id column value (default: extracted from the input filename)
    #[arg(long)]
    order_id: Option<String>,

    /// Output path (default: "{input}_processed.xlsx" next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the extracted lines as JSON instead of a summary
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum View {
    Requested,
    Confirmed,
    Shipped,
}

impl From<View> for QuantityKind {
    fn from(view: View) -> Self {
        match view {
            View::Requested => QuantityKind::Requested,
            View::Confirmed => QuantityKind::Confirmed,
            View::Shipped => QuantityKind::Shipped,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let input_name = cli
        .input
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();
    let bytes = std::fs::read(&cli.input)
        .with_context(|| format!("could not read {}", cli.input.display()))?;

    let price_bytes = cli
        .price_list
        .as_ref()
        .map(|p| {
            std::fs::read(p).with_context(|| format!("could not read {}", p.display()))
        })
        .transpose()?;
    let price_source = price_bytes.as_deref().map(|bytes| {
        let is_csv = cli
            .price_list
            .as_ref()
            .and_then(|p| p.extension())
            .map(|e| e.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);
        if is_csv {
            PriceSource::Csv(bytes)
        } else {
            PriceSource::Workbook(bytes)
        }
    });

    let opts = ExtractOptions {
        order_id: cli
            .order_id
            .unwrap_or_else(|| order_id_from_filename(&input_name)),
        view: cli.view.into(),
        pricing: if cli.document_prices {
            PricingMode::Document
        } else {
            PricingMode::PriceList {
                discount_percentage: cli.discount,
                default_wholesale: cli.default_price,
            }
        },
    };

    let result = process_order_details(&bytes, price_source.as_ref(), &opts)?;

    let output = cli
        .output
        .unwrap_or_else(|| cli.input.with_file_name(processed_filename(&input_name)));
    std::fs::write(&output, &result.xlsx)
        .with_context(|| format!("could not write {}", output.display()))?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result.lines)?);
    } else {
        println!("{} order lines -> {}", result.lines.len(), output.display());
    }
    Ok(())
}
