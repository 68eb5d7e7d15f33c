use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Body measurement kinds a size chart can constrain. All values are centimeters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum MeasurementKind {
    Height,
    Chest,
    Bust,
    Waist,
    Hips,
    Inseam,
}

impl MeasurementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeasurementKind::Height => "height",
            MeasurementKind::Chest => "chest",
            MeasurementKind::Bust => "bust",
            MeasurementKind::Waist => "waist",
            MeasurementKind::Hips => "hips",
            MeasurementKind::Inseam => "inseam",
        }
    }

    /// Accepts the canonical names plus a few singular/plural spellings seen in chat text.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "height" => Some(MeasurementKind::Height),
            "chest" => Some(MeasurementKind::Chest),
            "bust" => Some(MeasurementKind::Bust),
            "waist" => Some(MeasurementKind::Waist),
            "hips" | "hip" => Some(MeasurementKind::Hips),
            "inseam" => Some(MeasurementKind::Inseam),
            _ => None,
        }
    }
}

impl TryFrom<String> for MeasurementKind {
    type Error = String;

    fn try_from(label: String) -> Result<Self, Self::Error> {
        Self::from_label(&label).ok_or_else(|| format!("unknown measurement kind: {label}"))
    }
}

impl fmt::Display for MeasurementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed interval `[min, max]`, written as a two-element array in config files.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Interval {
    pub min: f64,
    pub max: f64,
}

impl Interval {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }

    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    /// Distance from the nearest bound; zero inside the interval.
    pub fn distance(&self, value: f64) -> f64 {
        if value < self.min {
            self.min - value
        } else if value > self.max {
            value - self.max
        } else {
            0.0
        }
    }
}

impl From<[f64; 2]> for Interval {
    fn from(bounds: [f64; 2]) -> Self {
        Self::new(bounds[0], bounds[1])
    }
}

impl From<Interval> for [f64; 2] {
    fn from(interval: Interval) -> Self {
        [interval.min, interval.max]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Measurements(BTreeMap<MeasurementKind, f64>);

impl Measurements {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, kind: MeasurementKind, value: f64) -> Self {
        self.insert(kind, value);
        self
    }

    pub fn insert(&mut self, kind: MeasurementKind, value: f64) {
        self.0.insert(kind, value);
    }

    pub fn get(&self, kind: MeasurementKind) -> Option<f64> {
        self.0.get(&kind).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MeasurementKind, f64)> + '_ {
        self.0.iter().map(|(kind, value)| (*kind, *value))
    }

    /// Values in `overrides` replace values already present.
    pub fn overlay(&mut self, overrides: &Measurements) {
        for (kind, value) in overrides.iter() {
            self.insert(kind, value);
        }
    }
}

impl FromIterator<(MeasurementKind, f64)> for Measurements {
    fn from_iter<I: IntoIterator<Item = (MeasurementKind, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
