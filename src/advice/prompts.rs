use crate::advice::{ProductContext, Turn};
use crate::types::profile::UserProfile;
use crate::types::recommendation::Recommendation;

pub const EXTRACTION_SYSTEM: &str = "You are a JSON extractor. Only return valid JSON.";
pub const ADVICE_SYSTEM: &str = "You are a helpful fashion fit consultant.";
pub const CONVERSATION_SYSTEM: &str =
    "You are a friendly fashion and fit consultant chatbot. Help users find their perfect fit.";

/// Number of trailing turns sent with conversational requests.
pub const CONVERSATION_WINDOW: usize = 6;
/// Number of trailing turns quoted inside the general advice prompt.
pub const ADVICE_HISTORY_WINDOW: usize = 4;

pub fn build_extraction_prompt(message: &str) -> String {
    format!(
        r#"Extract the following information from this message if available and return a single JSON object:
- "height_cm": number, convert feet/inches to centimeters
- "weight_kg": number, convert pounds to kilograms
- "body_type": one of "slim", "athletic", "average", "curvy", "plus-size"
- "preferred_fit": one of "tight", "regular", "loose"
- "gender": "mens" or "womens"
- "age": integer
- "occasion": one of "casual", "formal", "sports", "work"
- "style": short text
- "measurements": object with any of "chest", "bust", "waist", "hips", "inseam" in centimeters

Use null for missing values.

Message: {message}"#
    )
}

fn or_unspecified<T: ToString>(value: Option<T>) -> String {
    value
        .map(|value| value.to_string())
        .unwrap_or_else(|| "Not specified".to_string())
}

fn recommendation_summary(recommendation: &Recommendation) -> String {
    if recommendation.fallback {
        return "The size engine could not score the measurements it was given.".to_string();
    }
    format!(
        "The size engine recommends {} (confidence {:.2}){}.",
        recommendation.recommended_size,
        recommendation.confidence,
        recommendation
            .alternative_size
            .as_deref()
            .map(|alternative| format!(", alternative {alternative}"))
            .unwrap_or_default()
    )
}

pub fn build_product_advice_prompt(
    profile: &UserProfile,
    recommendation: &Recommendation,
    product: &ProductContext,
) -> String {
    let sizes = if product.sizes.is_empty() {
        "XS, S, M, L, XL, XXL".to_string()
    } else {
        product.sizes.join(", ")
    };
    format!(
        r#"You are a professional fashion consultant specializing in fit recommendations.

User Profile:
- Height: {height}
- Weight: {weight}
- Body Type: {body_type}
- Preferred Fit: {fit}
- Gender: {gender}
- Age: {age}

Product Information:
- Type: {kind}
- Category: {category}
- Brand: {brand}
- Available Sizes: {sizes}

{summary}

Provide:
1. Recommended size
2. Fit description
3. Styling tips
4. Alternative size if between sizes
5. Any specific considerations

Keep response concise and friendly."#,
        height = or_unspecified(profile.height_cm.map(|cm| format!("{cm} cm"))),
        weight = or_unspecified(profile.weight_kg.map(|kg| format!("{kg} kg"))),
        body_type = or_unspecified(profile.body_type.as_deref()),
        fit = or_unspecified(profile.preferred_fit),
        gender = or_unspecified(profile.gender.as_deref()),
        age = or_unspecified(profile.age),
        kind = product.kind.as_deref().unwrap_or("Clothing"),
        category = product.category.as_deref().unwrap_or("General"),
        brand = product.brand.as_deref().unwrap_or("Generic"),
        summary = recommendation_summary(recommendation),
    )
}

pub fn build_general_advice_prompt(
    profile: &UserProfile,
    recommendation: &Recommendation,
    history: &[Turn],
) -> String {
    let profile_json =
        serde_json::to_string_pretty(profile).unwrap_or_else(|_| "{}".to_string());
    let recent = history
        .iter()
        .skip(history.len().saturating_sub(ADVICE_HISTORY_WINDOW))
        .map(|turn| format!("{}: {}", turn.role.as_str(), turn.content))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "User is asking about fit/sizing. Their profile:\n{profile_json}\n\n{}\n\nRecent conversation:\n{recent}\n\nProvide helpful general sizing advice.",
        recommendation_summary(recommendation)
    )
}
