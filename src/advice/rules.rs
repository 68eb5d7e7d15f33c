use crate::advice::AttributeExtractor;
use crate::error::Result;
use crate::types::measurement::MeasurementKind;
use crate::types::profile::{normalize_body_type, normalize_gender, FitPreference, UserProfile};

const CM_PER_INCH: f64 = 2.54;
const CM_PER_FOOT: f64 = 30.48;
const KG_PER_POUND: f64 = 0.453_592_37;

/// Offline extractor: unit-aware keyword matching over a tokenized message.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleExtractor;

impl AttributeExtractor for RuleExtractor {
    fn extract(&self, text: &str) -> Result<UserProfile> {
        Ok(extract_profile(text))
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Word(String),
    Foot,
    Inch,
}

fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = text.to_lowercase().chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_ascii_digit() {
            let start = i;
            while i < chars.len()
                && (chars[i].is_ascii_digit()
                    || (chars[i] == '.' && chars.get(i + 1).is_some_and(char::is_ascii_digit)))
            {
                i += 1;
            }
            let literal: String = chars[start..i].iter().collect();
            if let Ok(value) = literal.parse::<f64>() {
                tokens.push(Token::Number(value));
            }
            continue;
        }
        if c.is_alphabetic() {
            let start = i;
            while i < chars.len() && (chars[i].is_alphabetic() || chars[i] == '-') {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();
            tokens.push(Token::Word(word.trim_end_matches('-').to_string()));
            continue;
        }
        match c {
            '\'' | '’' | '′' => tokens.push(Token::Foot),
            '"' | '”' | '″' => tokens.push(Token::Inch),
            _ => {}
        }
        i += 1;
    }
    tokens
}

fn word_at(tokens: &[Token], index: usize) -> Option<&str> {
    match tokens.get(index) {
        Some(Token::Word(word)) => Some(word.as_str()),
        _ => None,
    }
}

fn number_at(tokens: &[Token], index: usize) -> Option<f64> {
    match tokens.get(index) {
        Some(Token::Number(value)) => Some(*value),
        _ => None,
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Parses a height starting at the number at `index`: `175 cm`, `1.8 m`,
/// `5'10"`, `5 ft 10 in`. Returns centimeters and tokens consumed.
fn height_at(tokens: &[Token], index: usize) -> Option<(f64, usize)> {
    let value = number_at(tokens, index)?;
    match tokens.get(index + 1) {
        Some(Token::Foot) => {
            let inches = number_at(tokens, index + 2);
            let mut consumed = 2;
            if inches.is_some() {
                consumed += 1;
                if tokens.get(index + 3) == Some(&Token::Inch) {
                    consumed += 1;
                }
            }
            Some((
                round1(value * CM_PER_FOOT + inches.unwrap_or(0.0) * CM_PER_INCH),
                consumed,
            ))
        }
        Some(Token::Word(unit)) => match unit.as_str() {
            "cm" | "cms" | "centimeters" | "centimetres" => Some((value, 2)),
            "m" | "meter" | "meters" | "metre" | "metres" if value < 3.0 => {
                Some((round1(value * 100.0), 2))
            }
            "ft" | "feet" | "foot" => {
                let inches = number_at(tokens, index + 2);
                let mut consumed = 2;
                if inches.is_some() {
                    consumed += 1;
                    if matches!(word_at(tokens, index + 3), Some("in" | "inch" | "inches")) {
                        consumed += 1;
                    }
                }
                Some((
                    round1(value * CM_PER_FOOT + inches.unwrap_or(0.0) * CM_PER_INCH),
                    consumed,
                ))
            }
            _ => None,
        },
        _ => None,
    }
}

fn weight_at(tokens: &[Token], index: usize) -> Option<f64> {
    let value = number_at(tokens, index)?;
    match word_at(tokens, index + 1)? {
        "kg" | "kgs" | "kilo" | "kilos" | "kilograms" | "kilogrammes" => Some(value),
        "lb" | "lbs" | "pound" | "pounds" => Some(round1(value * KG_PER_POUND)),
        _ => None,
    }
}

fn age_at(tokens: &[Token], index: usize) -> Option<u32> {
    let value = number_at(tokens, index)?;
    match word_at(tokens, index + 1)? {
        "years" | "year" | "yrs" | "yr" | "yo" => Some(value as u32),
        _ => None,
    }
}

/// Measurement keyword followed (within two filler words) by a value.
fn measurement_at(tokens: &[Token], index: usize) -> Option<(MeasurementKind, f64, usize)> {
    let kind = MeasurementKind::from_label(word_at(tokens, index)?)?;
    let mut cursor = index + 1;
    while matches!(
        word_at(tokens, cursor),
        Some("is" | "of" | "about" | "around" | "approx" | "size")
    ) && cursor <= index + 2
    {
        cursor += 1;
    }
    if kind == MeasurementKind::Height {
        if let Some((height, consumed)) = height_at(tokens, cursor) {
            return Some((kind, height, cursor - index + consumed));
        }
        let value = number_at(tokens, cursor)?;
        return Some((kind, value, cursor - index + 1));
    }
    let value = number_at(tokens, cursor)?;
    match word_at(tokens, cursor + 1) {
        Some("in" | "inch" | "inches") => {
            Some((kind, round1(value * CM_PER_INCH), cursor - index + 2))
        }
        Some("cm" | "cms") => Some((kind, value, cursor - index + 2)),
        _ => match tokens.get(cursor + 1) {
            Some(Token::Inch) => Some((kind, round1(value * CM_PER_INCH), cursor - index + 2)),
            _ => Some((kind, value, cursor - index + 1)),
        },
    }
}

fn body_type_word(word: &str) -> Option<&'static str> {
    match word {
        "slim" | "skinny" | "thin" => Some("slim"),
        "athletic" | "muscular" => Some("athletic"),
        "average" => Some("average"),
        "curvy" => Some("curvy"),
        "plus-size" | "plussize" => Some("plus-size"),
        _ => None,
    }
}

fn fit_word(word: &str) -> Option<FitPreference> {
    match word {
        "tight" | "fitted" | "slim-fit" => Some(FitPreference::Tight),
        "regular" => Some(FitPreference::Regular),
        "loose" | "oversized" | "relaxed" | "baggy" => Some(FitPreference::Loose),
        _ => None,
    }
}

fn gender_word(word: &str) -> Option<String> {
    match word {
        "men" | "mens" | "man" | "male" | "guy" | "gentleman" | "women" | "womens" | "woman"
        | "female" | "lady" | "girl" => Some(normalize_gender(word)),
        _ => None,
    }
}

fn occasion_word(word: &str) -> Option<&'static str> {
    match word {
        "casual" | "everyday" => Some("casual"),
        "formal" | "wedding" => Some("formal"),
        "sports" | "sport" | "gym" | "running" | "workout" => Some("sports"),
        "work" | "office" => Some("work"),
        _ => None,
    }
}

/// Scans left to right; the first mention of each attribute wins.
pub fn extract_profile(text: &str) -> UserProfile {
    let tokens = tokenize(text);
    let mut profile = UserProfile::default();
    let mut index = 0;

    while index < tokens.len() {
        if let Some((kind, value, consumed)) = measurement_at(&tokens, index) {
            if kind == MeasurementKind::Height {
                profile.height_cm.get_or_insert(value);
            } else if profile.measurements.get(kind).is_none() {
                profile.measurements.insert(kind, value);
            }
            index += consumed;
            continue;
        }
        if let Some((height, consumed)) = height_at(&tokens, index) {
            profile.height_cm.get_or_insert(height);
            index += consumed;
            continue;
        }
        if let Some(weight) = weight_at(&tokens, index) {
            profile.weight_kg.get_or_insert(weight);
            index += 2;
            continue;
        }
        if let Some(age) = age_at(&tokens, index) {
            profile.age.get_or_insert(age);
            index += 2;
            continue;
        }

        if let Some(word) = word_at(&tokens, index) {
            if matches!(word, "age" | "aged") {
                if let Some(age) = number_at(&tokens, index + 1) {
                    profile.age.get_or_insert(age as u32);
                    index += 2;
                    continue;
                }
            }
            if word == "plus" && word_at(&tokens, index + 1) == Some("size") {
                profile
                    .body_type
                    .get_or_insert_with(|| "plus-size".to_string());
                index += 2;
                continue;
            }
            if let Some(body_type) = body_type_word(word) {
                profile
                    .body_type
                    .get_or_insert_with(|| normalize_body_type(body_type));
            } else if let Some(fit) = fit_word(word) {
                profile.preferred_fit.get_or_insert(fit);
            } else if let Some(gender) = gender_word(word) {
                profile.gender.get_or_insert(gender);
            } else if let Some(occasion) = occasion_word(word) {
                profile
                    .occasion
                    .get_or_insert_with(|| occasion.to_string());
            }
        }
        index += 1;
    }

    profile
}
