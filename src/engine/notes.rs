use crate::types::profile::FitPreference;

pub const INSUFFICIENT_DATA_NOTE: &str =
    "Unable to determine exact fit: measurements were insufficient for this chart.";

pub fn fit_notes(recommended: &str, alternative: Option<&str>, fit: FitPreference) -> String {
    let mut sentences = vec![format!("Recommended size: {recommended}.")];
    let Some(alternative) = alternative else {
        return sentences.join(" ");
    };
    sentences.push(format!("Alternative size: {alternative}."));
    match fit {
        FitPreference::Loose => sentences.push(
            "Since you prefer a loose fit, consider trying the alternative size if unsure."
                .to_string(),
        ),
        FitPreference::Tight => sentences.push(
            "Since you prefer a tight fit, you may also try the alternative size.".to_string(),
        ),
        FitPreference::Regular => {}
    }
    sentences.join(" ")
}
