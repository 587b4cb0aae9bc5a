//! Lookalike prediction ranking
//!
//! Turns the raw output of an image classification model into an ordered,
//! labeled result list that an upload widget can render directly.
//!
//! ```text
//!  upload ──► UploadPolicy ──► Classifier ──► PredictionRanker ──► Render
//!                                                   │
//!                                                Catalog
//!                                      (label ─► asset + display names)
//! ```
//!
//! # Usage
//!
//! ```rust
//! use lookalike::{Catalog, ClassPrediction, rank};
//!
//! let catalog = Catalog::builtin();
//! let predictions = vec![
//!     ClassPrediction::new("fox", 0.2),
//!     ClassPrediction::new("Rabbit", 0.55),
//!     ClassPrediction::new("cat", 0.25),
//! ];
//!
//! let ranked = rank(&predictions, &catalog, 3)?;
//! assert_eq!(ranked[0].display_name, "토끼");
//! assert_eq!(ranked[0].percentage, 55);
//! # Ok::<(), lookalike::RankError>(())
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod prediction;
pub mod ranker;
pub mod session;
pub mod upload;

pub use catalog::{Catalog, DisplayEntry, Resolution, normalize_key};
pub use config::WidgetConfig;
pub use error::{
    CatalogError, CatalogResult, ClassifierError, ConfigError, RankError, SessionError,
    SessionResult, UploadError,
};
pub use prediction::{ClassPrediction, RankedResult, rank_badge};
pub use ranker::{PredictionRanker, RankLimit, rank, rank_all, to_percentage};
pub use session::{ClassificationSession, Classifier, Render};
pub use upload::{Upload, UploadPolicy};
