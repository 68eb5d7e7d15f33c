use crate::error::FitError;
use crate::types::measurement::{Interval, MeasurementKind};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

pub const BUILTIN_CONFIG: &str = include_str!("../../config/default.toml");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitConfig {
    #[serde(default)]
    pub fallback: FallbackConfig,
    #[serde(default = "default_body_types")]
    pub body_types: BTreeMap<String, f64>,
    #[serde(default)]
    pub charts: Vec<ChartConfig>,
    pub llm: Option<LlmConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackConfig {
    #[serde(default = "default_fallback_recommended")]
    pub recommended: String,
    #[serde(default = "default_fallback_alternative")]
    pub alternative: String,
    #[serde(default = "default_fallback_confidence")]
    pub confidence: f64,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            recommended: default_fallback_recommended(),
            alternative: default_fallback_alternative(),
            confidence: default_fallback_confidence(),
        }
    }
}

fn default_fallback_recommended() -> String {
    "M".to_string()
}

fn default_fallback_alternative() -> String {
    "L".to_string()
}

fn default_fallback_confidence() -> f64 {
    0.5
}

fn default_body_types() -> BTreeMap<String, f64> {
    [
        ("slim", -0.1),
        ("athletic", 0.0),
        ("average", 0.0),
        ("curvy", 0.1),
        ("plus-size", 0.2),
    ]
    .into_iter()
    .map(|(label, offset)| (label.to_string(), offset))
    .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    pub gender: String,
    pub category: String,
    #[serde(default)]
    pub default: bool,
    #[serde(default)]
    pub estimate: BTreeMap<MeasurementKind, EstimateRule>,
    /// Ordered smallest to largest; the order defines the label ladder.
    pub sizes: Vec<SizeEntry>,
}

impl ChartConfig {
    pub fn id(&self) -> String {
        format!(
            "{}_{}",
            self.gender.trim().to_lowercase(),
            self.category.trim().to_lowercase()
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SizeEntry {
    pub label: String,
    pub ranges: BTreeMap<MeasurementKind, Interval>,
}

/// Linear estimate of one measurement from height and BMI.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EstimateRule {
    pub base: f64,
    pub reference_bmi: f64,
    pub bmi_slope: f64,
    pub reference_height: f64,
    pub height_slope: f64,
}

impl EstimateRule {
    pub fn apply(&self, height_cm: f64, bmi: f64) -> f64 {
        self.base
            + (bmi - self.reference_bmi) * self.bmi_slope
            + (height_cm - self.reference_height) * self.height_slope
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: default_llm_endpoint(),
            model: default_llm_model(),
            api_key_env: default_api_key_env(),
            temperature: None,
            max_tokens: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_llm_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_llm_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

impl FitConfig {
    pub fn builtin() -> Result<Self, FitError> {
        toml::from_str(BUILTIN_CONFIG)
            .map_err(|e| FitError::ConfigParse(format!("built-in charts: {e}")))
    }

    pub fn llm(&self) -> LlmConfig {
        self.llm.clone().unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), FitError> {
        if self.charts.is_empty() {
            return Err(FitError::ConfigParse(
                "at least one [[charts]] entry is required".to_string(),
            ));
        }

        let defaults = self.charts.iter().filter(|chart| chart.default).count();
        if defaults > 1 {
            return Err(FitError::ConfigParse(format!(
                "only one chart may set default = true (found {defaults})"
            )));
        }

        let mut chart_ids = HashSet::new();
        for chart in &self.charts {
            if chart.gender.trim().is_empty() || chart.category.trim().is_empty() {
                return Err(FitError::ConfigParse(
                    "charts.gender and charts.category must be non-empty".to_string(),
                ));
            }
            let id = chart.id();
            if !chart_ids.insert(id.clone()) {
                return Err(FitError::ConfigParse(format!("duplicate chart: {id}")));
            }
            validate_chart(&id, chart)?;
        }

        for (label, offset) in &self.body_types {
            if !(-1.0..=1.0).contains(offset) {
                return Err(FitError::ConfigParse(format!(
                    "body_types.{label} must be between -1.0 and 1.0"
                )));
            }
        }

        let fallback = &self.fallback;
        if fallback.recommended.trim().is_empty() || fallback.alternative.trim().is_empty() {
            return Err(FitError::ConfigParse(
                "fallback labels must be non-empty".to_string(),
            ));
        }
        if fallback.recommended == fallback.alternative {
            return Err(FitError::ConfigParse(
                "fallback.recommended and fallback.alternative must differ".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&fallback.confidence) {
            return Err(FitError::ConfigParse(
                "fallback.confidence must be between 0.0 and 1.0".to_string(),
            ));
        }

        if let Some(llm) = &self.llm {
            if !llm.endpoint.starts_with("http://") && !llm.endpoint.starts_with("https://") {
                return Err(FitError::ConfigParse(format!(
                    "llm.endpoint must be an http(s) URL: {}",
                    llm.endpoint
                )));
            }
            if llm.model.trim().is_empty() || llm.api_key_env.trim().is_empty() {
                return Err(FitError::ConfigParse(
                    "llm.model and llm.api_key_env must be non-empty".to_string(),
                ));
            }
            if let Some(temperature) = llm.temperature {
                if !(0.0..=2.0).contains(&temperature) {
                    return Err(FitError::ConfigParse(
                        "llm.temperature must be between 0.0 and 2.0".to_string(),
                    ));
                }
            }
            if llm.max_tokens == Some(0) {
                return Err(FitError::ConfigParse(
                    "llm.max_tokens must be greater than 0".to_string(),
                ));
            }
            if llm.timeout_secs == 0 {
                return Err(FitError::ConfigParse(
                    "llm.timeout_secs must be greater than 0".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Non-fatal chart problems: lower bounds that shrink from one label to the next,
    /// and fallback labels a chart does not sell.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        for chart in &self.charts {
            for fallback in [&self.fallback.recommended, &self.fallback.alternative] {
                if !chart.sizes.iter().any(|size| &size.label == fallback) {
                    warnings.push(format!(
                        "{}: fallback size {} is not on the chart",
                        chart.id(),
                        fallback
                    ));
                }
            }
            for pair in chart.sizes.windows(2) {
                let (smaller, larger) = (&pair[0], &pair[1]);
                for (kind, interval) in &larger.ranges {
                    if let Some(previous) = smaller.ranges.get(kind) {
                        if interval.min < previous.min {
                            warnings.push(format!(
                                "{}: {} lower bound for {} ({}) is below {} ({})",
                                chart.id(),
                                kind,
                                larger.label,
                                interval.min,
                                smaller.label,
                                previous.min
                            ));
                        }
                    }
                }
            }
        }
        warnings
    }
}

fn validate_chart(id: &str, chart: &ChartConfig) -> Result<(), FitError> {
    if chart.sizes.is_empty() {
        return Err(FitError::ConfigParse(format!(
            "chart {id} must define at least one size"
        )));
    }

    let mut labels = HashSet::new();
    for size in &chart.sizes {
        let label = size.label.trim();
        if label.is_empty() {
            return Err(FitError::ConfigParse(format!(
                "chart {id} contains an empty size label"
            )));
        }
        if !labels.insert(label.to_string()) {
            return Err(FitError::ConfigParse(format!(
                "chart {id} contains duplicate size: {label}"
            )));
        }
        if size.ranges.is_empty() {
            return Err(FitError::ConfigParse(format!(
                "chart {id} size {label} has no measurement ranges"
            )));
        }
        for (kind, interval) in &size.ranges {
            if !interval.min.is_finite() || !interval.max.is_finite() || interval.min < 0.0 {
                return Err(FitError::ConfigParse(format!(
                    "chart {id} size {label} {kind} range must be finite and non-negative"
                )));
            }
            if interval.min > interval.max {
                return Err(FitError::ConfigParse(format!(
                    "chart {id} size {label} {kind} range has min > max"
                )));
            }
        }
    }

    for (kind, rule) in &chart.estimate {
        let values = [
            rule.base,
            rule.reference_bmi,
            rule.bmi_slope,
            rule.reference_height,
            rule.height_slope,
        ];
        if values.iter().any(|value| !value.is_finite()) {
            return Err(FitError::ConfigParse(format!(
                "chart {id} estimate.{kind} values must be finite"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE_CHART: &str = r#"
[[charts]]
gender = "mens"
category = "tops"

[[charts.sizes]]
label = "S"
ranges = { chest = [91, 96] }

[[charts.sizes]]
label = "M"
ranges = { chest = [96, 101] }
"#;

    #[test]
    fn builtin_config_parses_and_validates() {
        let cfg = FitConfig::builtin().expect("built-in config should parse");
        cfg.validate().expect("built-in config should validate");
        assert_eq!(cfg.charts.len(), 2);
        assert_eq!(cfg.charts[0].id(), "mens_tops");
        assert!(cfg.charts[0].default);
        assert!(cfg.warnings().is_empty());
    }

    #[test]
    fn body_types_default_when_missing() {
        let cfg: FitConfig = toml::from_str(ONE_CHART).expect("config should parse");
        assert_eq!(cfg.body_types["plus-size"], 0.2);
        assert_eq!(cfg.body_types["slim"], -0.1);
        assert!(!cfg.body_types.contains_key("muscular"));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_inverted_range() {
        let cfg: FitConfig = toml::from_str(
            r#"
[[charts]]
gender = "mens"
category = "tops"

[[charts.sizes]]
label = "S"
ranges = { chest = [96, 91] }
"#,
        )
        .expect("config should parse");
        let err = cfg.validate().expect_err("validation should fail");
        assert!(err.to_string().contains("min > max"));
    }

    #[test]
    fn validate_rejects_duplicate_labels() {
        let cfg: FitConfig = toml::from_str(
            r#"
[[charts]]
gender = "mens"
category = "tops"

[[charts.sizes]]
label = "M"
ranges = { chest = [91, 96] }

[[charts.sizes]]
label = "M"
ranges = { chest = [96, 101] }
"#,
        )
        .expect("config should parse");
        let err = cfg.validate().expect_err("validation should fail");
        assert!(err.to_string().contains("duplicate size: M"));
    }

    #[test]
    fn validate_rejects_empty_chart_list() {
        let cfg: FitConfig = toml::from_str("[fallback]\nrecommended = \"M\"").expect("parse");
        let err = cfg.validate().expect_err("validation should fail");
        assert!(err.to_string().contains("[[charts]]"));
    }

    #[test]
    fn validate_rejects_out_of_range_body_type_offset() {
        let cfg: FitConfig = toml::from_str(&format!(
            "[body_types]\nplus-size = 1.5\n{ONE_CHART}"
        ))
        .expect("config should parse");
        let err = cfg.validate().expect_err("validation should fail");
        assert!(err.to_string().contains("body_types.plus-size"));
    }

    #[test]
    fn validate_rejects_identical_fallback_labels() {
        let cfg: FitConfig = toml::from_str(&format!(
            "[fallback]\nrecommended = \"M\"\nalternative = \"M\"\n{ONE_CHART}"
        ))
        .expect("config should parse");
        let err = cfg.validate().expect_err("validation should fail");
        assert!(err.to_string().contains("must differ"));
    }

    #[test]
    fn validate_rejects_bad_llm_endpoint() {
        let cfg: FitConfig = toml::from_str(&format!(
            "[llm]\nendpoint = \"ftp://example\"\n{ONE_CHART}"
        ))
        .expect("config should parse");
        let err = cfg.validate().expect_err("validation should fail");
        assert!(err.to_string().contains("llm.endpoint"));
    }

    #[test]
    fn warnings_flag_non_monotonic_lower_bounds() {
        let cfg: FitConfig = toml::from_str(
            r#"
[[charts]]
gender = "mens"
category = "tops"

[[charts.sizes]]
label = "S"
ranges = { chest = [96, 100] }

[[charts.sizes]]
label = "M"
ranges = { chest = [94, 101] }

[[charts.sizes]]
label = "L"
ranges = { chest = [101, 106] }
"#,
        )
        .expect("config should parse");
        let warnings = cfg.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("mens_tops"));
    }

    #[test]
    fn warnings_flag_fallback_labels_missing_from_a_chart() {
        let cfg: FitConfig = toml::from_str(
            r#"
[[charts]]
gender = "unisex"
category = "hats"

[[charts.sizes]]
label = "S"
ranges = { height = [150.0, 170.0] }

[[charts.sizes]]
label = "L"
ranges = { height = [170.0, 190.0] }
"#,
        )
        .expect("config should parse");
        let warnings = cfg.warnings();
        assert_eq!(warnings, vec!["unisex_hats: fallback size M is not on the chart".to_string()]);
    }

    #[test]
    fn builtin_charts_carry_no_warnings() {
        let cfg = FitConfig::builtin().expect("built-in config should parse");
        assert!(cfg.warnings().is_empty());
    }

    #[test]
    fn estimate_rule_is_linear_in_bmi_and_height() {
        let rule = EstimateRule {
            base: 98.5,
            reference_bmi: 22.5,
            bmi_slope: 2.0,
            reference_height: 173.5,
            height_slope: 0.3,
        };
        assert!((rule.apply(173.5, 22.5) - 98.5).abs() < 1e-9);
        assert!((rule.apply(183.5, 23.5) - 103.5).abs() < 1e-9);
    }
}
