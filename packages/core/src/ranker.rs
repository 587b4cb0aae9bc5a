//! Prediction ranking
//!
//! Turns unordered model output into an ordered, labeled, top-K list:
//! stable sort by probability (descending), truncate, resolve each label
//! through the catalog, and convert probabilities to whole percentages.

use crate::catalog::{Catalog, Resolution};
use crate::error::{ConfigError, RankError};
use crate::prediction::{ClassPrediction, RankedResult};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Bound on the number of ranked results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankLimit {
    /// At most this many results
    Top(usize),
    /// One result per predicted class
    AllClasses,
}

impl Default for RankLimit {
    fn default() -> Self {
        RankLimit::Top(3)
    }
}

impl RankLimit {
    /// Concrete `top_k` for a prediction set with `class_count` entries
    pub fn resolve(&self, class_count: usize) -> usize {
        match self {
            RankLimit::Top(k) => *k,
            RankLimit::AllClasses => class_count,
        }
    }
}

impl FromStr for RankLimit {
    type Err = ConfigError;

    /// Parses `all` or a positive integer.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("all") {
            return Ok(RankLimit::AllClasses);
        }
        match trimmed.parse::<usize>() {
            Ok(k) if k > 0 => Ok(RankLimit::Top(k)),
            _ => Err(ConfigError::invalid_value("rank limit", s)),
        }
    }
}

impl fmt::Display for RankLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankLimit::Top(k) => write!(f, "{k}"),
            RankLimit::AllClasses => write!(f, "all"),
        }
    }
}

/// `round(probability * 100)` with halves rounded up.
pub fn to_percentage(probability: f64) -> u32 {
    // `as` saturates, so out-of-range probabilities clamp instead of wrapping
    (probability * 100.0 + 0.5).floor().max(0.0) as u32
}

/// Rank `predictions` against `catalog`, keeping at most `top_k` entries.
///
/// Equal probabilities keep their input order. Unknown labels resolve to the
/// catalog fallback and are logged, never raised.
pub fn rank(
    predictions: &[ClassPrediction],
    catalog: &Catalog,
    top_k: usize,
) -> Result<Vec<RankedResult>, RankError> {
    if predictions.is_empty() {
        return Err(RankError::invalid_input("prediction set is empty"));
    }
    if top_k == 0 {
        return Err(RankError::invalid_input("top_k must be at least 1"));
    }
    if let Some(bad) = predictions.iter().find(|p| !p.probability.is_finite()) {
        return Err(RankError::invalid_input(format!(
            "probability for '{}' is not finite: {}",
            bad.label, bad.probability
        )));
    }

    let mut ordered: Vec<&ClassPrediction> = predictions.iter().collect();
    ordered.sort_by(|a, b| {
        b.probability
            .partial_cmp(&a.probability)
            .unwrap_or(Ordering::Equal)
    });
    ordered.truncate(top_k);

    Ok(ordered
        .into_iter()
        .enumerate()
        .map(|(idx, prediction)| label_prediction(idx + 1, prediction, catalog))
        .collect())
}

/// Rank every class the model reported.
pub fn rank_all(
    predictions: &[ClassPrediction],
    catalog: &Catalog,
) -> Result<Vec<RankedResult>, RankError> {
    rank(predictions, catalog, predictions.len())
}

fn label_prediction(rank: usize, prediction: &ClassPrediction, catalog: &Catalog) -> RankedResult {
    let resolution = catalog.resolve(&prediction.label);
    match resolution {
        Resolution::Exact(_) => {}
        Resolution::Fallback(entry) => tracing::warn!(
            "Unknown class name from model: {}. Using fallback '{}'",
            prediction.label,
            entry.key
        ),
        Resolution::Placeholder => tracing::warn!(
            "Unknown class name from model: {}. Catalog is empty, using placeholder",
            prediction.label
        ),
    }

    let entry = resolution.entry();
    RankedResult {
        rank,
        label: prediction.label.clone(),
        asset: entry.asset.clone(),
        display_name: entry.name_localized.clone(),
        canonical_name: entry.name_canonical.clone(),
        percentage: to_percentage(prediction.probability),
        probability: prediction.probability,
        fallback: resolution.is_fallback(),
    }
}

/// Ranker bound to a shared, read-only catalog
#[derive(Debug, Clone)]
pub struct PredictionRanker {
    catalog: Arc<Catalog>,
}

impl PredictionRanker {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn rank(
        &self,
        predictions: &[ClassPrediction],
        top_k: usize,
    ) -> Result<Vec<RankedResult>, RankError> {
        rank(predictions, &self.catalog, top_k)
    }

    pub fn rank_with_limit(
        &self,
        predictions: &[ClassPrediction],
        limit: RankLimit,
    ) -> Result<Vec<RankedResult>, RankError> {
        rank(predictions, &self.catalog, limit.resolve(predictions.len()))
    }
}
