use crate::types::measurement::Measurements;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

pub const DEFAULT_GENDER: &str = "unisex";
pub const DEFAULT_CATEGORY: &str = "tops";
pub const DEFAULT_BODY_TYPE: &str = "average";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum FitPreference {
    Tight,
    #[default]
    Regular,
    Loose,
}

impl FitPreference {
    /// Unrecognized labels behave as `Regular`.
    pub fn parse(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "tight" | "fitted" | "slim-fit" => FitPreference::Tight,
            "loose" | "oversized" | "relaxed" => FitPreference::Loose,
            _ => FitPreference::Regular,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FitPreference::Tight => "tight",
            FitPreference::Regular => "regular",
            FitPreference::Loose => "loose",
        }
    }
}

impl From<String> for FitPreference {
    fn from(label: String) -> Self {
        Self::parse(&label)
    }
}

impl fmt::Display for FitPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn normalize_body_type(label: &str) -> String {
    let lowered = label.trim().to_lowercase();
    match lowered.as_str() {
        "plus size" | "plus_size" | "plussize" | "plus" => "plus-size".to_string(),
        _ => lowered,
    }
}

/// Collapses the many ways people name a gender into the chart key form.
pub fn normalize_gender(label: &str) -> String {
    let lowered = label.trim().to_lowercase();
    match lowered.as_str() {
        "men" | "mens" | "men's" | "man" | "male" | "m" | "guy" => "mens".to_string(),
        "women" | "womens" | "women's" | "woman" | "female" | "f" | "lady" | "girl" => {
            "womens".to_string()
        }
        _ => lowered,
    }
}

/// Identifies which chart a request wants; unknown pairs fall back to the default chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartSelector {
    pub gender: String,
    pub category: String,
}

impl ChartSelector {
    pub fn new(gender: &str, category: &str) -> Self {
        Self {
            gender: normalize_gender(gender),
            category: category.trim().to_lowercase(),
        }
    }
}

impl Default for ChartSelector {
    fn default() -> Self {
        Self::new(DEFAULT_GENDER, DEFAULT_CATEGORY)
    }
}

/// Everything known about the shopper, accumulated across chat turns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height_cm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_fit: Option<FitPreference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occasion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(
        skip_serializing_if = "Measurements::is_empty",
        deserialize_with = "null_as_default"
    )]
    pub measurements: Measurements,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl UserProfile {
    /// Fields present in `update` win; absent fields keep their current value.
    pub fn merge(&mut self, update: UserProfile) {
        if update.height_cm.is_some() {
            self.height_cm = update.height_cm;
        }
        if update.weight_kg.is_some() {
            self.weight_kg = update.weight_kg;
        }
        if let Some(body_type) = update.body_type.filter(|value| !value.trim().is_empty()) {
            self.body_type = Some(normalize_body_type(&body_type));
        }
        if update.preferred_fit.is_some() {
            self.preferred_fit = update.preferred_fit;
        }
        if let Some(gender) = update.gender.filter(|value| !value.trim().is_empty()) {
            self.gender = Some(normalize_gender(&gender));
        }
        if update.age.is_some() {
            self.age = update.age;
        }
        if let Some(occasion) = update.occasion.filter(|value| !value.trim().is_empty()) {
            self.occasion = Some(occasion);
        }
        if let Some(style) = update.style.filter(|value| !value.trim().is_empty()) {
            self.style = Some(style);
        }
        self.measurements.overlay(&update.measurements);
    }

    pub fn is_empty(&self) -> bool {
        *self == UserProfile::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::measurement::MeasurementKind;

    #[test]
    fn unknown_fit_labels_are_regular() {
        assert_eq!(FitPreference::parse("LOOSE"), FitPreference::Loose);
        assert_eq!(FitPreference::parse("oversized"), FitPreference::Loose);
        assert_eq!(FitPreference::parse("tight"), FitPreference::Tight);
        assert_eq!(FitPreference::parse("baggy-ish"), FitPreference::Regular);
    }

    #[test]
    fn gender_aliases_collapse_to_chart_keys() {
        assert_eq!(normalize_gender("Male"), "mens");
        assert_eq!(normalize_gender("women's"), "womens");
        assert_eq!(normalize_gender("unisex"), "unisex");
    }

    #[test]
    fn merge_keeps_known_fields_and_overrides_new_ones() {
        let mut profile = UserProfile {
            height_cm: Some(180.0),
            body_type: Some("slim".to_string()),
            ..UserProfile::default()
        };
        profile.merge(UserProfile {
            weight_kg: Some(72.0),
            body_type: Some("Plus Size".to_string()),
            measurements: Measurements::new().with(MeasurementKind::Chest, 101.0),
            ..UserProfile::default()
        });

        assert_eq!(profile.height_cm, Some(180.0));
        assert_eq!(profile.weight_kg, Some(72.0));
        assert_eq!(profile.body_type.as_deref(), Some("plus-size"));
        assert_eq!(profile.measurements.get(MeasurementKind::Chest), Some(101.0));
    }

    #[test]
    fn profile_deserializes_lenient_fit_and_nulls() {
        let profile: UserProfile = serde_json::from_str(
            r#"{"height_cm": 170, "weight_kg": null, "preferred_fit": "oversized", "age": 31, "measurements": null}"#,
        )
        .expect("profile json should parse");
        assert_eq!(profile.height_cm, Some(170.0));
        assert_eq!(profile.weight_kg, None);
        assert_eq!(profile.preferred_fit, Some(FitPreference::Loose));
        assert_eq!(profile.age, Some(31));
        assert!(profile.measurements.is_empty());
    }
}
