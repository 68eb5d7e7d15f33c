use crate::error::{FitError, Result};
use crate::types::config::{ChartConfig, EstimateRule, FitConfig, SizeEntry};
use crate::types::measurement::MeasurementKind;
use crate::types::profile::{normalize_gender, ChartSelector, FitPreference};
use std::collections::BTreeMap;

/// Size labels in chart order, smallest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeLadder {
    labels: Vec<String>,
}

impl SizeLadder {
    pub fn new(labels: Vec<String>) -> Self {
        Self { labels }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn position(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|candidate| candidate == label)
    }

    pub fn larger(&self, label: &str) -> Option<&str> {
        let index = self.position(label)?;
        self.labels.get(index + 1).map(String::as_str)
    }

    pub fn smaller(&self, label: &str) -> Option<&str> {
        let index = self.position(label)?;
        index
            .checked_sub(1)
            .and_then(|previous| self.labels.get(previous))
            .map(String::as_str)
    }

    /// Next larger label, or the next smaller one when `label` is the largest.
    pub fn neighbor(&self, label: &str) -> Option<&str> {
        self.larger(label).or_else(|| self.smaller(label))
    }

    /// Moves one step for loose/tight; stays put at either end of the ladder.
    pub fn shift<'a>(&'a self, label: &'a str, fit: FitPreference) -> &'a str {
        let shifted = match fit {
            FitPreference::Loose => self.larger(label),
            FitPreference::Tight => self.smaller(label),
            FitPreference::Regular => None,
        };
        shifted.unwrap_or(label)
    }
}

#[derive(Debug, Clone)]
pub struct SizeChart {
    gender: String,
    category: String,
    entries: Vec<SizeEntry>,
    estimate: BTreeMap<MeasurementKind, EstimateRule>,
    ladder: SizeLadder,
}

impl SizeChart {
    pub fn from_config(config: &ChartConfig) -> Self {
        let entries: Vec<SizeEntry> = config
            .sizes
            .iter()
            .map(|entry| SizeEntry {
                label: entry.label.trim().to_string(),
                ranges: entry.ranges.clone(),
            })
            .collect();
        let ladder = SizeLadder::new(entries.iter().map(|entry| entry.label.clone()).collect());
        Self {
            gender: normalize_gender(&config.gender),
            category: config.category.trim().to_lowercase(),
            entries,
            estimate: config.estimate.clone(),
            ladder,
        }
    }

    pub fn id(&self) -> String {
        format!("{}_{}", self.gender, self.category)
    }

    pub fn entries(&self) -> &[SizeEntry] {
        &self.entries
    }

    pub fn estimate_rules(&self) -> &BTreeMap<MeasurementKind, EstimateRule> {
        &self.estimate
    }

    pub fn ladder(&self) -> &SizeLadder {
        &self.ladder
    }

    fn matches(&self, selector: &ChartSelector) -> bool {
        self.gender == selector.gender && self.category == selector.category
    }
}

#[derive(Debug, Clone)]
pub struct ChartBook {
    charts: Vec<SizeChart>,
    default_index: usize,
}

impl ChartBook {
    pub fn from_config(config: &FitConfig) -> Result<Self> {
        if config.charts.is_empty() {
            return Err(FitError::ConfigParse(
                "at least one [[charts]] entry is required".to_string(),
            ));
        }
        let default_index = config
            .charts
            .iter()
            .position(|chart| chart.default)
            .unwrap_or(0);
        Ok(Self {
            charts: config.charts.iter().map(SizeChart::from_config).collect(),
            default_index,
        })
    }

    pub fn charts(&self) -> &[SizeChart] {
        &self.charts
    }

    pub fn default_chart(&self) -> &SizeChart {
        &self.charts[self.default_index]
    }

    pub fn find(&self, selector: &ChartSelector) -> Option<&SizeChart> {
        self.charts.iter().find(|chart| chart.matches(selector))
    }

    pub fn select(&self, selector: &ChartSelector) -> &SizeChart {
        match self.find(selector) {
            Some(chart) => chart,
            None => {
                tracing::debug!(
                    gender = %selector.gender,
                    category = %selector.category,
                    fallback = %self.default_chart().id(),
                    "no chart for selector, using default"
                );
                self.default_chart()
            }
        }
    }
}
