pub mod notes;
pub mod scoring;

use crate::chart::ChartBook;
use crate::error::Result;
use crate::estimate;
use crate::types::config::{FallbackConfig, FitConfig};
use crate::types::measurement::Measurements;
use crate::types::profile::{
    normalize_body_type, ChartSelector, FitPreference, UserProfile, DEFAULT_BODY_TYPE,
    DEFAULT_GENDER,
};
use crate::types::recommendation::{round_confidence, Recommendation};
use std::collections::BTreeMap;

/// Raw inputs for one recommendation, before validation and estimation.
#[derive(Debug, Clone, Default)]
pub struct FitRequest {
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub measurements: Measurements,
    pub selector: ChartSelector,
    pub body_type: String,
    pub fit: FitPreference,
}

impl FitRequest {
    pub fn from_profile(profile: &UserProfile, category: &str) -> Self {
        Self {
            height_cm: profile.height_cm,
            weight_kg: profile.weight_kg,
            measurements: profile.measurements.clone(),
            selector: ChartSelector::new(
                profile.gender.as_deref().unwrap_or(DEFAULT_GENDER),
                category,
            ),
            body_type: profile
                .body_type
                .clone()
                .unwrap_or_else(|| DEFAULT_BODY_TYPE.to_string()),
            fit: profile.preferred_fit.unwrap_or_default(),
        }
    }
}

/// Scores measurements against the configured charts. Holds no mutable state.
#[derive(Debug, Clone)]
pub struct SizeEngine {
    book: ChartBook,
    body_types: BTreeMap<String, f64>,
    fallback: FallbackConfig,
}

impl SizeEngine {
    pub fn from_config(config: &FitConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            book: ChartBook::from_config(config)?,
            body_types: config
                .body_types
                .iter()
                .map(|(label, offset)| (normalize_body_type(label), *offset))
                .collect(),
            fallback: config.fallback.clone(),
        })
    }

    pub fn book(&self) -> &ChartBook {
        &self.book
    }

    /// Unrecognized body types adjust by zero.
    pub fn body_type_adjustment(&self, body_type: &str) -> f64 {
        self.body_types
            .get(&normalize_body_type(body_type))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn recommend(
        &self,
        measurements: &Measurements,
        selector: &ChartSelector,
        body_type: &str,
        fit: FitPreference,
    ) -> Recommendation {
        let chart = self.book.select(selector);
        let adjustment = self.body_type_adjustment(body_type);
        let ranked = scoring::rank_sizes(chart, measurements, adjustment);

        let Some(top) = ranked.first() else {
            tracing::warn!(chart = %chart.id(), "no size scored; returning fallback");
            return self.fallback_result(chart.id());
        };

        let baseline_alternative = ranked
            .iter()
            .skip(1)
            .find(|score| score.label != top.label)
            .map(|score| score.label.clone());

        let ladder = chart.ladder();
        let recommended = ladder.shift(&top.label, fit).to_string();
        let alternative = match baseline_alternative {
            Some(label) if label == recommended => ladder.neighbor(&recommended).map(String::from),
            other => other,
        };

        let fit_notes = notes::fit_notes(&recommended, alternative.as_deref(), fit);
        tracing::info!(
            chart = %chart.id(),
            top = %top.label,
            recommended = %recommended,
            alternative = ?alternative,
            confidence = top.confidence,
            fit = %fit,
            "size recommended"
        );

        Recommendation {
            recommended_size: recommended,
            alternative_size: alternative,
            confidence: round_confidence(top.confidence),
            fit_notes,
            chart: chart.id(),
            fallback: false,
            scores: ranked,
        }
    }

    /// Validates and estimates measurements, then scores them.
    pub fn recommend_request(&self, request: &FitRequest) -> Result<Recommendation> {
        let chart = self.book.select(&request.selector);
        let measurements = estimate::resolve_measurements(
            request.height_cm,
            request.weight_kg,
            &request.measurements,
            chart,
        )?;
        Ok(self.recommend(
            &measurements,
            &request.selector,
            &request.body_type,
            request.fit,
        ))
    }

    fn fallback_result(&self, chart: String) -> Recommendation {
        Recommendation {
            recommended_size: self.fallback.recommended.clone(),
            alternative_size: Some(self.fallback.alternative.clone()),
            confidence: self.fallback.confidence,
            fit_notes: notes::INSUFFICIENT_DATA_NOTE.to_string(),
            chart,
            fallback: true,
            scores: Vec::new(),
        }
    }
}
