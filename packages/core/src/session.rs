//! Per-widget classification session
//!
//! A session owns everything one upload widget needs: the classifier handle,
//! the ranker with its catalog, and the widget config. Submissions follow a
//! cancel-and-replace policy. Every submission takes a new generation, and
//! only the newest generation may publish to the output surface. Publishing
//! happens under the watch channel's lock, so two renders never interleave.

use crate::catalog::Catalog;
use crate::config::WidgetConfig;
use crate::error::{ClassifierError, SessionError, SessionResult};
use crate::prediction::{ClassPrediction, RankedResult};
use crate::ranker::PredictionRanker;
use crate::upload::Upload;
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;

/// Image classification model behind the widget
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Score every class the model knows for one image
    async fn classify(&self, upload: &Upload) -> Result<Vec<ClassPrediction>, ClassifierError>;

    /// Number of classes the model was trained on; `0` if unknown
    fn class_count(&self) -> usize;
}

#[async_trait]
impl<C: Classifier + ?Sized> Classifier for Arc<C> {
    async fn classify(&self, upload: &Upload) -> Result<Vec<ClassPrediction>, ClassifierError> {
        (**self).classify(upload).await
    }

    fn class_count(&self) -> usize {
        (**self).class_count()
    }
}

/// What the output surface shows after a successful submission
#[derive(Debug, Clone, PartialEq)]
pub struct Render {
    pub generation: u64,
    /// Name of the uploaded file, if the picker reported one
    pub source: Option<String>,
    pub results: Vec<RankedResult>,
}

pub struct ClassificationSession<C> {
    classifier: C,
    ranker: PredictionRanker,
    config: WidgetConfig,
    generation: AtomicU64,
    output: watch::Sender<Option<Arc<Render>>>,
}

impl<C: Classifier> ClassificationSession<C> {
    pub fn new(classifier: C, catalog: Arc<Catalog>, config: WidgetConfig) -> Self {
        let (output, _) = watch::channel(None);
        Self {
            classifier,
            ranker: PredictionRanker::new(catalog),
            config,
            generation: AtomicU64::new(0),
            output,
        }
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn ranker(&self) -> &PredictionRanker {
        &self.ranker
    }

    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Watch the output surface
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<Render>>> {
        self.output.subscribe()
    }

    /// What the output surface currently shows
    pub fn latest(&self) -> Option<Arc<Render>> {
        self.output.borrow().clone()
    }

    /// Validate, classify, rank and publish one upload.
    ///
    /// Returns [`SessionError::Superseded`] if a newer submission or a reset
    /// happened before this one could publish.
    pub async fn submit(&self, upload: Upload) -> SessionResult<Arc<Render>> {
        self.config.upload.validate(&upload)?;
        self.config.validate()?;

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(
            "Classifying upload {} ({}, {} bytes) as generation {}",
            upload.name.as_deref().unwrap_or("<unnamed>"),
            upload.media_type,
            upload.size(),
            generation
        );

        let predictions = self.classify(&upload).await?;
        self.ensure_current(generation)?;

        let results = self.ranker.rank(&predictions, self.top_k(&predictions))?;
        let render = Arc::new(Render {
            generation,
            source: upload.name,
            results,
        });

        let mut published = false;
        self.output.send_if_modified(|slot| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            *slot = Some(render.clone());
            published = true;
            true
        });

        if !published {
            return Err(self.superseded(generation));
        }
        tracing::info!(
            "Rendered {} results for generation {}",
            render.results.len(),
            generation
        );
        Ok(render)
    }

    /// Drop any in-flight submission and clear the output surface
    pub fn reset(&self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.output.send_modify(|slot| *slot = None);
        tracing::debug!("Session reset at generation {}", generation);
    }

    /// `AllClasses` follows the model's class count, falling back to the
    /// number of scores when the model does not report one
    fn top_k(&self, predictions: &[ClassPrediction]) -> usize {
        let class_count = match self.classifier.class_count() {
            0 => predictions.len(),
            n => n,
        };
        self.config.limit.resolve(class_count)
    }

    async fn classify(&self, upload: &Upload) -> SessionResult<Vec<ClassPrediction>> {
        match self.config.inference_timeout() {
            Some(limit) => tokio::time::timeout(limit, self.classifier.classify(upload))
                .await
                .map_err(|_| SessionError::Timeout {
                    duration_ms: limit.as_millis() as u64,
                })?
                .map_err(SessionError::from),
            None => Ok(self.classifier.classify(upload).await?),
        }
    }

    fn ensure_current(&self, generation: u64) -> SessionResult<()> {
        if self.current_generation() == generation {
            Ok(())
        } else {
            Err(self.superseded(generation))
        }
    }

    fn superseded(&self, generation: u64) -> SessionError {
        let current = self.current_generation();
        tracing::debug!(
            "Discarding generation {} in favour of {}",
            generation,
            current
        );
        SessionError::Superseded {
            generation,
            current,
        }
    }
}
