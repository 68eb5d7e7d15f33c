use crate::engine::FitRequest;
use crate::types::measurement::Measurements;
use crate::types::profile::{ChartSelector, FitPreference};
use crate::types::recommendation::Recommendation;
use chrono::Utc;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct RequestSummary {
    pub selector: ChartSelector,
    pub body_type: String,
    pub fit: FitPreference,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height_cm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
    #[serde(skip_serializing_if = "Measurements::is_empty")]
    pub measurements: Measurements,
}

impl From<&FitRequest> for RequestSummary {
    fn from(request: &FitRequest) -> Self {
        Self {
            selector: request.selector.clone(),
            body_type: request.body_type.clone(),
            fit: request.fit,
            height_cm: request.height_cm,
            weight_kg: request.weight_kg,
            measurements: request.measurements.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FitReport {
    pub version: String,
    pub generated_at: String,
    pub chart_digest: String,
    pub request: RequestSummary,
    pub recommendation: Recommendation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advice: Option<String>,
}

impl FitReport {
    pub fn new(
        request: &FitRequest,
        recommendation: Recommendation,
        chart_digest: String,
        advice: Option<String>,
    ) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            generated_at: Utc::now().to_rfc3339(),
            chart_digest,
            request: RequestSummary::from(request),
            recommendation,
            advice,
        }
    }
}
