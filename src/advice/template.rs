use crate::advice::{AdviceGenerator, AdviceRequest, Turn};
use crate::error::Result;
use crate::types::profile::UserProfile;

/// Offline advisor built from fixed sentences keyed on confidence and body type.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateAdvisor;

pub fn confidence_sentence(confidence: f64) -> &'static str {
    if confidence > 0.9 {
        "This should fit you perfectly."
    } else if confidence > 0.7 {
        "This should fit well with minor adjustments."
    } else if confidence > 0.5 {
        "This size is recommended but consider trying both sizes."
    } else {
        "Fit may vary. Consider ordering multiple sizes."
    }
}

pub fn body_type_sentence(body_type: &str) -> Option<&'static str> {
    match body_type {
        "slim" => Some("May have a slightly relaxed fit."),
        "athletic" => Some("Should complement your build well."),
        "curvy" => Some("Consider the fit around bust/hips."),
        "plus-size" => Some("Check the brand's specific plus-size measurements."),
        _ => None,
    }
}

impl AdviceGenerator for TemplateAdvisor {
    fn advise(&self, request: &AdviceRequest<'_>) -> Result<String> {
        let recommendation = request.recommendation;
        if recommendation.fallback {
            return Ok(
                "Share your height and weight, or your chest and waist measurements, for a precise recommendation."
                    .to_string(),
            );
        }

        let mut sentences = vec![confidence_sentence(recommendation.confidence).to_string()];
        if let Some(note) = request
            .profile
            .body_type
            .as_deref()
            .and_then(body_type_sentence)
        {
            sentences.push(note.to_string());
        }
        if let Some(product) = request.product {
            if !product.sizes.is_empty()
                && !product
                    .sizes
                    .iter()
                    .any(|size| size.eq_ignore_ascii_case(&recommendation.recommended_size))
            {
                sentences.push(format!(
                    "Size {} is not listed for this product (available: {}).",
                    recommendation.recommended_size,
                    product.sizes.join(", ")
                ));
            }
        }
        Ok(sentences.join(" "))
    }

    fn converse(&self, profile: &UserProfile, _history: &[Turn]) -> Result<String> {
        if profile.height_cm.is_none() || profile.weight_kg.is_none() {
            return Ok(
                "Happy to help you find your fit! Tell me your height and weight, and how you like your clothes to fit."
                    .to_string(),
            );
        }
        Ok("Ask me about sizing whenever you're ready, for example \"what size should I get?\"".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advice::ProductContext;
    use crate::types::recommendation::Recommendation;

    fn recommendation(confidence: f64, fallback: bool) -> Recommendation {
        Recommendation {
            recommended_size: "M".to_string(),
            alternative_size: Some("L".to_string()),
            confidence,
            fit_notes: "Recommended size: M.".to_string(),
            chart: "mens_tops".to_string(),
            fallback,
            scores: Vec::new(),
        }
    }

    #[test]
    fn confidence_tiers_follow_thresholds() {
        assert_eq!(confidence_sentence(0.95), "This should fit you perfectly.");
        assert!(confidence_sentence(0.8).contains("minor adjustments"));
        assert!(confidence_sentence(0.6).contains("trying both"));
        assert!(confidence_sentence(0.5).contains("multiple sizes"));
    }

    #[test]
    fn advice_includes_body_type_note_and_missing_product_size() {
        let profile = UserProfile {
            body_type: Some("curvy".to_string()),
            ..UserProfile::default()
        };
        let rec = recommendation(1.0, false);
        let product = ProductContext {
            sizes: vec!["S".to_string(), "L".to_string()],
            ..ProductContext::default()
        };
        let advice = TemplateAdvisor
            .advise(&AdviceRequest {
                profile: &profile,
                recommendation: &rec,
                product: Some(&product),
                history: &[],
            })
            .expect("template advice never fails");
        assert!(advice.starts_with("This should fit you perfectly."));
        assert!(advice.contains("bust/hips"));
        assert!(advice.contains("not listed"));
    }

    #[test]
    fn fallback_advice_asks_for_measurements() {
        let rec = recommendation(0.5, true);
        let advice = TemplateAdvisor
            .advise(&AdviceRequest {
                profile: &UserProfile::default(),
                recommendation: &rec,
                product: None,
                history: &[],
            })
            .expect("template advice never fails");
        assert!(advice.contains("height and weight"));
    }

    #[test]
    fn converse_prompts_for_missing_basics() {
        let reply = TemplateAdvisor
            .converse(&UserProfile::default(), &[])
            .expect("template replies never fail");
        assert!(reply.contains("height and weight"));
    }
}
