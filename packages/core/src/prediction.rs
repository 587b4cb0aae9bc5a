use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Medal shown next to the first three ranked results
pub const RANK_BADGES: [&str; 3] = ["🥇", "🥈", "🥉"];

/// One class score as emitted by the classification model.
///
/// Accepts the hosted model's `className` field as an alias for `label`.
#[derive(Default, Serialize, Deserialize, JsonSchema, Clone, Debug, PartialEq)]
pub struct ClassPrediction {
    #[serde(alias = "className")]
    pub label: String,
    pub probability: f64,
}

impl ClassPrediction {
    pub fn new(label: impl Into<String>, probability: f64) -> Self {
        Self {
            label: label.into(),
            probability,
        }
    }
}

/// A ranked, display-ready prediction
#[derive(Serialize, Deserialize, JsonSchema, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RankedResult {
    /// 1-based position in the ranking
    pub rank: usize,
    /// Label as emitted by the model
    pub label: String,
    /// Image reference of the resolved catalog entry
    pub asset: String,
    /// Localized name of the resolved catalog entry
    pub display_name: String,
    /// Canonical name of the resolved catalog entry
    pub canonical_name: String,
    /// `round_half_up(probability * 100)`, never renormalized
    pub percentage: u32,
    /// Source probability the ranking was ordered by
    pub probability: f64,
    /// Whether the label missed the catalog and a fallback was substituted
    pub fallback: bool,
}

impl RankedResult {
    pub fn badge(&self) -> Option<&'static str> {
        rank_badge(self.rank)
    }
}

/// Medal for a 1-based rank, if it has one.
pub fn rank_badge(rank: usize) -> Option<&'static str> {
    rank.checked_sub(1)
        .and_then(|idx| RANK_BADGES.get(idx))
        .copied()
}
