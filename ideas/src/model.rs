//! Data structures shared across the pipeline.

use serde::{Deserialize, Serialize};

/// Upper bound on ideas per request. The endpoint is asked for exactly
/// five; anything past that is discarded.
pub const MAX_IDEAS: usize = 5;

/// One generated startup suggestion.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Idea {
    /// Observed tension or insight the idea springs from.
    pub source: String,
    /// How the idea makes money.
    pub strategy: String,
    /// Positioning hook.
    pub marketing: String,
    /// Demand-signal summary.
    pub market_potential: String,
    /// Most receptive customer cohort.
    pub target_audience: String,
}

impl Idea {
    /// True once every field carries visible text.
    pub fn is_renderable(&self) -> bool {
        [
            &self.source,
            &self.strategy,
            &self.marketing,
            &self.market_potential,
            &self.target_audience,
        ]
        .iter()
        .all(|field| !field.trim().is_empty())
    }
}

/// Ordered collection of up to [`MAX_IDEAS`] ideas for one request.
///
/// Snapshots handed to the presentation layer are clones of this value;
/// the pipeline never mutates a batch it has already published.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct IdeaBatch(Vec<Idea>);

impl IdeaBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a batch from ideas in generation order, truncating at
    /// [`MAX_IDEAS`].
    pub fn from_ideas(mut ideas: Vec<Idea>) -> Self {
        ideas.truncate(MAX_IDEAS);
        Self(ideas)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Idea> {
        self.0.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Idea> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Idea] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a IdeaBatch {
    type Item = &'a Idea;
    type IntoIter = std::slice::Iter<'a, Idea>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Output language for generated ideas. Unrecognized codes fall back to
/// English.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Zh,
    Fr,
    Ja,
}

impl Language {
    /// Parse a user-supplied code, case-insensitively.
    pub fn parse(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "zh" => Language::Zh,
            "fr" => Language::Fr,
            "ja" => Language::Ja,
            _ => Language::En,
        }
    }

    pub fn as_code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Zh => "zh",
            Language::Fr => "fr",
            Language::Ja => "ja",
        }
    }
}

/// Body of one analyze call, serialized with the endpoint's field names.
#[derive(Clone, Debug, Serialize)]
pub struct AnalyzeRequest {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub image_url: String,
    pub language: Language,
}

impl AnalyzeRequest {
    pub fn new(
        user_id: impl Into<String>,
        image_url: impl Into<String>,
        language: Language,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            image_url: image_url.into(),
            language,
        }
    }
}
