//! Replaceable strategies around the size engine: pulling structured
//! attributes out of free text, and turning a recommendation into prose.
//! The engine never calls into this module.

pub mod openai;
pub mod prompts;
pub mod rules;
pub mod template;

use crate::error::Result;
use crate::types::config::LlmConfig;
use crate::types::profile::UserProfile;
use crate::types::recommendation::Recommendation;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Optional description of the garment the shopper is looking at.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductContext {
    pub kind: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub sizes: Vec<String>,
}

impl ProductContext {
    pub fn is_empty(&self) -> bool {
        self.kind.is_none() && self.category.is_none() && self.brand.is_none() && self.sizes.is_empty()
    }
}

pub struct AdviceRequest<'a> {
    pub profile: &'a UserProfile,
    pub recommendation: &'a Recommendation,
    pub product: Option<&'a ProductContext>,
    pub history: &'a [Turn],
}

pub trait AttributeExtractor {
    /// Attributes found in `text`. Fields the text does not mention stay `None`.
    fn extract(&self, text: &str) -> Result<UserProfile>;
}

pub trait AdviceGenerator {
    fn advise(&self, request: &AdviceRequest<'_>) -> Result<String>;

    /// Reply to a message that is not asking for a size.
    fn converse(&self, profile: &UserProfile, history: &[Turn]) -> Result<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvisorKind {
    Template,
    Llm,
}

pub fn build_advisor(kind: AdvisorKind, llm: &LlmConfig) -> Result<Box<dyn AdviceGenerator>> {
    match kind {
        AdvisorKind::Template => Ok(Box::new(template::TemplateAdvisor)),
        AdvisorKind::Llm => Ok(Box::new(openai::OpenAiClient::from_config(llm)?)),
    }
}

pub fn build_extractor(kind: AdvisorKind, llm: &LlmConfig) -> Result<Box<dyn AttributeExtractor>> {
    match kind {
        AdvisorKind::Template => Ok(Box::new(rules::RuleExtractor)),
        AdvisorKind::Llm => Ok(Box::new(openai::OpenAiClient::from_config(llm)?)),
    }
}
