pub mod json;
pub mod md;

use crate::error::FitError;
use crate::types::report::FitReport;

#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Json,
    Md,
}

pub fn render(report: &FitReport, format: OutputFormat) -> Result<String, FitError> {
    match format {
        OutputFormat::Json => json::to_json(report).map_err(FitError::Json),
        OutputFormat::Md => Ok(md::to_markdown(report)),
    }
}
