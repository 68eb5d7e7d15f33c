use crate::advice::template::TemplateAdvisor;
use crate::advice::{
    AdviceGenerator, AdviceRequest, AttributeExtractor, ProductContext, Turn,
};
use crate::engine::{FitRequest, SizeEngine};
use crate::error::Result;
use crate::estimate;
use crate::types::profile::{UserProfile, DEFAULT_CATEGORY};
use crate::types::recommendation::Recommendation;
use serde::Serialize;
use tracing::{info, warn};

const SIZING_KEYWORDS: [&str; 5] = ["size", "fit", "recommend", "wear", "measurement"];

/// Height and weight assumed when a sizing question arrives before the shopper shared them.
pub const ASSUMED_HEIGHT_CM: f64 = 175.0;
pub const ASSUMED_WEIGHT_KG: f64 = 70.0;

#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub message: String,
    pub recommendation: Option<Recommendation>,
    pub profile: UserProfile,
}

pub fn is_sizing_question(message: &str) -> bool {
    let lowered = message.to_lowercase();
    SIZING_KEYWORDS
        .iter()
        .any(|keyword| lowered.contains(keyword))
}

fn validate_update(update: &UserProfile) -> Result<()> {
    if let Some(height_cm) = update.height_cm {
        estimate::validate_height(height_cm)?;
    }
    if let Some(weight_kg) = update.weight_kg {
        estimate::validate_weight(weight_kg)?;
    }
    estimate::validate_measurements(&update.measurements)
}

/// One shopper conversation held in memory; dropped when the caller is done with it.
pub struct ChatSession<'a> {
    engine: &'a SizeEngine,
    extractor: &'a dyn AttributeExtractor,
    advisor: &'a dyn AdviceGenerator,
    product: Option<ProductContext>,
    category: String,
    profile: UserProfile,
    history: Vec<Turn>,
}

impl<'a> ChatSession<'a> {
    pub fn new(
        engine: &'a SizeEngine,
        extractor: &'a dyn AttributeExtractor,
        advisor: &'a dyn AdviceGenerator,
    ) -> Self {
        Self {
            engine,
            extractor,
            advisor,
            product: None,
            category: DEFAULT_CATEGORY.to_string(),
            profile: UserProfile::default(),
            history: Vec::new(),
        }
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = category.trim().to_lowercase();
        self
    }

    /// A product category, when present, overrides `with_category`.
    pub fn with_product(mut self, product: Option<ProductContext>) -> Self {
        if let Some(category) = product.as_ref().and_then(|p| p.category.as_ref()) {
            self.category = category.trim().to_lowercase();
        }
        self.product = product.filter(|p| !p.is_empty());
        self
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    /// An update carrying an implausible value is rejected whole: neither the
    /// profile nor the history changes, so the shopper can simply correct it.
    pub fn handle(&mut self, message: &str) -> Result<ChatReply> {
        let update = self.extractor.extract(message)?;
        validate_update(&update)?;
        self.history.push(Turn::user(message));
        self.profile.merge(update);

        let (reply, recommendation) = if is_sizing_question(message) {
            let recommendation = self.recommend()?;
            let advice = self.advise(&recommendation);
            (
                format!("{}\n{}", recommendation.fit_notes, advice),
                Some(recommendation),
            )
        } else {
            (self.converse(), None)
        };

        self.history.push(Turn::assistant(reply.clone()));
        Ok(ChatReply {
            message: reply,
            recommendation,
            profile: self.profile.clone(),
        })
    }

    fn recommend(&self) -> Result<Recommendation> {
        let mut request = FitRequest::from_profile(&self.profile, &self.category);
        if request.measurements.is_empty() {
            if request.height_cm.is_none() {
                request.height_cm = Some(ASSUMED_HEIGHT_CM);
            }
            if request.weight_kg.is_none() {
                request.weight_kg = Some(ASSUMED_WEIGHT_KG);
            }
        }
        info!(
            height_cm = ?request.height_cm,
            weight_kg = ?request.weight_kg,
            body_type = %request.body_type,
            fit = %request.fit,
            "recommending from chat profile"
        );
        self.engine.recommend_request(&request)
    }

    fn advise(&self, recommendation: &Recommendation) -> String {
        let request = AdviceRequest {
            profile: &self.profile,
            recommendation,
            product: self.product.as_ref(),
            history: &self.history,
        };
        self.advisor.advise(&request).unwrap_or_else(|e| {
            warn!(error = %e, "advice generation failed; using template advice");
            TemplateAdvisor
                .advise(&request)
                .unwrap_or_default()
        })
    }

    fn converse(&self) -> String {
        self.advisor
            .converse(&self.profile, &self.history)
            .unwrap_or_else(|e| {
                warn!(error = %e, "conversation reply failed; using template reply");
                TemplateAdvisor
                    .converse(&self.profile, &self.history)
                    .unwrap_or_default()
            })
    }
}
