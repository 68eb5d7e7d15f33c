use crate::chart::SizeChart;
use crate::types::config::SizeEntry;
use crate::types::measurement::{Interval, Measurements};
use crate::types::recommendation::SizeScore;

/// Centimeters outside an interval at which a contribution reaches zero.
pub const FALLOFF_CM: f64 = 10.0;

pub fn interval_score(value: f64, interval: &Interval) -> f64 {
    if interval.contains(value) {
        1.0
    } else {
        (1.0 - interval.distance(value) / FALLOFF_CM).max(0.0)
    }
}

/// Mean contribution over the kinds both sides share, with the number of kinds used.
/// `None` when the entry and the measurements have no kind in common.
pub fn raw_score(entry: &SizeEntry, measurements: &Measurements) -> Option<(f64, usize)> {
    let contributions: Vec<f64> = entry
        .ranges
        .iter()
        .filter_map(|(kind, interval)| {
            measurements
                .get(*kind)
                .map(|value| interval_score(value, interval))
        })
        .collect();

    if contributions.is_empty() {
        return None;
    }
    let matched = contributions.len();
    Some((contributions.iter().sum::<f64>() / matched as f64, matched))
}

/// Scores every size in the chart and ranks them by confidence, keeping chart
/// order among ties. Sizes that share no kind with the input, or whose every
/// contribution fell to zero, are left out.
pub fn rank_sizes(chart: &SizeChart, measurements: &Measurements, adjustment: f64) -> Vec<SizeScore> {
    let mut scores: Vec<SizeScore> = chart
        .entries()
        .iter()
        .filter_map(|entry| {
            let (raw, matched_kinds) = raw_score(entry, measurements)?;
            if raw <= 0.0 {
                return None;
            }
            let confidence = (raw + adjustment).clamp(0.0, 1.0);
            tracing::debug!(
                chart = %chart.id(),
                size = %entry.label,
                raw,
                confidence,
                matched_kinds,
                "scored size"
            );
            Some(SizeScore {
                label: entry.label.clone(),
                raw,
                confidence,
                matched_kinds,
            })
        })
        .collect();

    scores.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    scores
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::ChartBook;
    use crate::types::config::FitConfig;
    use crate::types::measurement::MeasurementKind;
    use crate::types::profile::ChartSelector;

    fn chart(gender: &str) -> SizeChart {
        let cfg = FitConfig::builtin().expect("built-in config should parse");
        let book = ChartBook::from_config(&cfg).expect("chart book should build");
        book.select(&ChartSelector::new(gender, "tops")).clone()
    }

    fn entry<'a>(chart: &'a SizeChart, label: &str) -> &'a SizeEntry {
        chart
            .entries()
            .iter()
            .find(|entry| entry.label == label)
            .expect("label should exist")
    }

    #[test]
    fn interval_score_falls_off_linearly_on_both_sides() {
        let interval = Interval::new(96.0, 101.0);
        assert_eq!(interval_score(96.0, &interval), 1.0);
        assert_eq!(interval_score(101.0, &interval), 1.0);
        assert!((interval_score(93.0, &interval) - 0.7).abs() < 1e-9);
        assert!((interval_score(104.0, &interval) - 0.7).abs() < 1e-9);
        assert_eq!(interval_score(86.0, &interval), 0.0);
        assert_eq!(interval_score(130.0, &interval), 0.0);
    }

    #[test]
    fn midpoints_of_every_kind_score_one() {
        let chart = chart("mens");
        for entry in chart.entries() {
            let measurements: Measurements = entry
                .ranges
                .iter()
                .map(|(kind, interval)| (*kind, interval.midpoint()))
                .collect();
            let (raw, matched) = raw_score(entry, &measurements).expect("entry should score");
            assert_eq!(raw, 1.0, "size {}", entry.label);
            assert_eq!(matched, entry.ranges.len());
        }
    }

    #[test]
    fn moving_further_outside_never_raises_the_score() {
        let chart = chart("mens");
        let medium = entry(&chart, "M");
        let mut previous_below = f64::INFINITY;
        let mut previous_above = f64::INFINITY;
        for step in 0..30 {
            let offset = f64::from(step) * 0.5;
            let below = Measurements::new().with(MeasurementKind::Chest, 96.0 - offset);
            let above = Measurements::new().with(MeasurementKind::Chest, 101.0 + offset);
            let (score_below, _) = raw_score(medium, &below).expect("chest should match");
            let (score_above, _) = raw_score(medium, &above).expect("chest should match");
            assert!(score_below <= previous_below);
            assert!(score_above <= previous_above);
            previous_below = score_below;
            previous_above = score_above;
        }
    }

    #[test]
    fn kinds_missing_from_either_side_are_skipped() {
        let chart = chart("mens");
        let medium = entry(&chart, "M");
        // bust is not on the mens chart, waist is not supplied
        let measurements = Measurements::new()
            .with(MeasurementKind::Chest, 98.0)
            .with(MeasurementKind::Bust, 40.0);
        assert_eq!(raw_score(medium, &measurements), Some((1.0, 1)));
        assert_eq!(
            raw_score(medium, &Measurements::new().with(MeasurementKind::Bust, 90.0)),
            None
        );
    }

    #[test]
    fn rank_orders_by_confidence_and_keeps_chart_order_on_ties() {
        let chart = chart("mens");
        // height 175 sits inside both M and L
        let measurements = Measurements::new().with(MeasurementKind::Height, 175.0);
        let ranked = rank_sizes(&chart, &measurements, 0.0);
        assert_eq!(ranked[0].label, "M");
        assert_eq!(ranked[1].label, "L");
        assert!(ranked
            .windows(2)
            .all(|pair| pair[0].confidence >= pair[1].confidence));
    }

    #[test]
    fn adjustment_is_added_then_clamped() {
        let chart = chart("mens");
        let measurements = Measurements::new().with(MeasurementKind::Chest, 98.0);
        let boosted = rank_sizes(&chart, &measurements, 0.2);
        assert_eq!(boosted[0].label, "M");
        assert_eq!(boosted[0].raw, 1.0);
        assert_eq!(boosted[0].confidence, 1.0);

        let reduced = rank_sizes(&chart, &measurements, -0.1);
        assert!((reduced[0].confidence - 0.9).abs() < 1e-9);
    }

    #[test]
    fn sizes_with_only_zero_contributions_are_excluded() {
        let chart = chart("mens");
        let measurements = Measurements::new().with(MeasurementKind::Chest, 40.0);
        assert!(rank_sizes(&chart, &measurements, 0.2).is_empty());
    }
}
