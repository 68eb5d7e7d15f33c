use crate::chart::SizeChart;
use crate::error::{FitError, Result};
use crate::types::measurement::{MeasurementKind, Measurements};

pub const MIN_HEIGHT_CM: f64 = 50.0;
pub const MAX_HEIGHT_CM: f64 = 272.0;
pub const MIN_WEIGHT_KG: f64 = 2.0;
pub const MAX_WEIGHT_KG: f64 = 650.0;
pub const MAX_MEASUREMENT_CM: f64 = 400.0;

pub fn validate_height(height_cm: f64) -> Result<()> {
    if !height_cm.is_finite() || !(MIN_HEIGHT_CM..=MAX_HEIGHT_CM).contains(&height_cm) {
        return Err(FitError::InvalidMeasurement(format!(
            "height must be between {MIN_HEIGHT_CM} and {MAX_HEIGHT_CM} cm (got {height_cm})"
        )));
    }
    Ok(())
}

pub fn validate_weight(weight_kg: f64) -> Result<()> {
    if !weight_kg.is_finite() || !(MIN_WEIGHT_KG..=MAX_WEIGHT_KG).contains(&weight_kg) {
        return Err(FitError::InvalidMeasurement(format!(
            "weight must be between {MIN_WEIGHT_KG} and {MAX_WEIGHT_KG} kg (got {weight_kg})"
        )));
    }
    Ok(())
}

pub fn validate_measurements(measurements: &Measurements) -> Result<()> {
    for (kind, value) in measurements.iter() {
        if kind == MeasurementKind::Height {
            validate_height(value)?;
            continue;
        }
        if !value.is_finite() || value <= 0.0 || value > MAX_MEASUREMENT_CM {
            return Err(FitError::InvalidMeasurement(format!(
                "{kind} must be a positive value up to {MAX_MEASUREMENT_CM} cm (got {value})"
            )));
        }
    }
    Ok(())
}

pub fn bmi(height_cm: f64, weight_kg: f64) -> Result<f64> {
    validate_height(height_cm)?;
    validate_weight(weight_kg)?;
    let height_m = height_cm / 100.0;
    Ok(weight_kg / (height_m * height_m))
}

/// Estimates the chart's measurement kinds from height and weight.
pub fn estimate(height_cm: f64, weight_kg: f64, chart: &SizeChart) -> Result<Measurements> {
    let bmi = bmi(height_cm, weight_kg)?;
    let mut measurements = Measurements::new().with(MeasurementKind::Height, height_cm);
    for (kind, rule) in chart.estimate_rules() {
        measurements.insert(*kind, rule.apply(height_cm, bmi));
    }
    tracing::debug!(chart = %chart.id(), bmi, estimated = ?measurements, "estimated measurements");
    Ok(measurements)
}

/// Validates every input, then layers direct measurements over estimates.
pub fn resolve_measurements(
    height_cm: Option<f64>,
    weight_kg: Option<f64>,
    direct: &Measurements,
    chart: &SizeChart,
) -> Result<Measurements> {
    validate_measurements(direct)?;
    if let Some(weight) = weight_kg {
        validate_weight(weight)?;
    }

    let mut resolved = match (height_cm, weight_kg) {
        (Some(height), Some(weight)) => estimate(height, weight, chart)?,
        (Some(height), None) => {
            validate_height(height)?;
            Measurements::new().with(MeasurementKind::Height, height)
        }
        (None, Some(_)) => {
            tracing::debug!("weight given without height; skipping estimation");
            Measurements::new()
        }
        (None, None) => Measurements::new(),
    };
    resolved.overlay(direct);
    Ok(resolved)
}
