use crate::types::report::FitReport;

pub fn to_json(report: &FitReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}
