use serde::Serialize;

/// Score of one size label against a measurement set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SizeScore {
    pub label: String,
    /// Mean of per-kind contributions, before the body-type adjustment.
    pub raw: f64,
    pub confidence: f64,
    pub matched_kinds: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub recommended_size: String,
    pub alternative_size: Option<String>,
    pub confidence: f64,
    pub fit_notes: String,
    pub chart: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub fallback: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub scores: Vec<SizeScore>,
}

pub fn round_confidence(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
