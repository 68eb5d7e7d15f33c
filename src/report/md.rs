use crate::types::report::FitReport;

pub fn to_markdown(report: &FitReport) -> String {
    let recommendation = &report.recommendation;
    let mut output = String::new();
    output.push_str("# Fit Recommendation\n\n");
    output.push_str(&format!(
        "Recommended size: **{}**\n\n",
        recommendation.recommended_size
    ));
    output.push_str(&format!(
        "- alternative: {}\n- confidence: {:.2}\n- chart: {}\n- fit: {}\n- body type: {}\n\n",
        recommendation.alternative_size.as_deref().unwrap_or("none"),
        recommendation.confidence,
        recommendation.chart,
        report.request.fit,
        report.request.body_type
    ));

    if recommendation.fallback {
        output.push_str("> Measurements were insufficient; this is the default suggestion.\n\n");
    }

    output.push_str("## Notes\n\n");
    output.push_str(&recommendation.fit_notes);
    output.push_str("\n\n");

    if let Some(advice) = &report.advice {
        output.push_str("## Advice\n\n");
        output.push_str(advice);
        output.push_str("\n\n");
    }

    output.push_str("## Size Scores\n\n");
    if recommendation.scores.is_empty() {
        output.push_str("- none\n");
    } else {
        for score in &recommendation.scores {
            output.push_str(&format!(
                "- {}: {:.3} (raw {:.3}, {} kinds)\n",
                score.label, score.confidence, score.raw, score.matched_kinds
            ));
        }
    }

    output
}
