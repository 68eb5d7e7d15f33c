use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "fitsize",
    version,
    about = "Clothing size recommendations from body measurements"
)]
pub struct Cli {
    /// Chart configuration file (defaults to ./fitsize.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Recommend a size from measurements
    Recommend(RecommendCommand),
    /// Run chat messages through a single in-memory conversation
    Chat(ChatCommand),
    /// List configured size charts
    Charts,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum AdviceMode {
    None,
    Template,
    Llm,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ReportFormat {
    Json,
    Md,
}

#[derive(Args, Clone, Debug, Default)]
pub struct ProductArgs {
    /// Garment type, e.g. "t-shirt"
    #[arg(long)]
    pub product_kind: Option<String>,
    #[arg(long)]
    pub product_brand: Option<String>,
    /// Sizes the product is sold in
    #[arg(long, value_delimiter = ',')]
    pub product_sizes: Vec<String>,
}

#[derive(Args)]
pub struct RecommendCommand {
    #[arg(long)]
    pub height: Option<f64>,
    #[arg(long)]
    pub weight: Option<f64>,
    #[arg(long)]
    pub chest: Option<f64>,
    #[arg(long)]
    pub bust: Option<f64>,
    #[arg(long)]
    pub waist: Option<f64>,
    #[arg(long)]
    pub hips: Option<f64>,
    #[arg(long)]
    pub inseam: Option<f64>,
    #[arg(long, default_value = "unisex")]
    pub gender: String,
    #[arg(long, default_value = "tops")]
    pub category: String,
    #[arg(long, default_value = "average")]
    pub body_type: String,
    /// tight, regular or loose; synonyms such as "oversized" are accepted, anything else is regular
    #[arg(long, default_value = "regular")]
    pub fit: String,
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: ReportFormat,
    #[arg(long, value_enum, default_value = "none")]
    pub advice: AdviceMode,
    #[command(flatten)]
    pub product: ProductArgs,
}

#[derive(Args)]
pub struct ChatCommand {
    /// Messages sent in order, one turn each
    #[arg(required = true)]
    pub messages: Vec<String>,
    #[arg(long, default_value = "tops")]
    pub category: String,
    #[arg(short, long, value_enum, default_value = "md")]
    pub format: ReportFormat,
    #[arg(long, value_enum, default_value = "template")]
    pub advice: AdviceMode,
    #[command(flatten)]
    pub product: ProductArgs,
}
