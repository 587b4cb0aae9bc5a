//! Session tests: cancel-and-replace, timeouts and the output surface
//!
//! Run: cargo test --package lookalike --test session_tests

use async_trait::async_trait;
use lookalike::{
    Catalog, ClassPrediction, ClassificationSession, Classifier, ClassifierError, RankLimit,
    SessionError, Upload, WidgetConfig,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Answers per file name after a per-file delay
struct ScriptedClassifier {
    scripts: HashMap<String, (Duration, Vec<ClassPrediction>)>,
    calls: AtomicUsize,
    class_count: usize,
}

impl ScriptedClassifier {
    fn new() -> Self {
        Self {
            scripts: HashMap::new(),
            calls: AtomicUsize::new(0),
            class_count: 0,
        }
    }

    fn classes(mut self, class_count: usize) -> Self {
        self.class_count = class_count;
        self
    }

    fn script(mut self, name: &str, delay_ms: u64, predictions: &[(&str, f64)]) -> Self {
        let predictions = predictions
            .iter()
            .map(|(label, p)| ClassPrediction::new(*label, *p))
            .collect();
        self.scripts.insert(
            name.to_string(),
            (Duration::from_millis(delay_ms), predictions),
        );
        self
    }
}

#[async_trait]
impl Classifier for ScriptedClassifier {
    async fn classify(&self, upload: &Upload) -> Result<Vec<ClassPrediction>, ClassifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let name = upload.name.as_deref().unwrap_or_default();
        let (delay, predictions) = self
            .scripts
            .get(name)
            .ok_or_else(|| ClassifierError::inference(format!("no script for {name}")))?;
        tokio::time::sleep(*delay).await;
        Ok(predictions.clone())
    }

    fn class_count(&self) -> usize {
        self.class_count
    }
}

fn upload(name: &str) -> Upload {
    Upload::new("image/jpeg", vec![0xFF, 0xD8, 0xFF]).with_name(name)
}

fn session(
    classifier: ScriptedClassifier,
    config: WidgetConfig,
) -> ClassificationSession<Arc<ScriptedClassifier>> {
    ClassificationSession::new(Arc::new(classifier), Arc::new(Catalog::builtin()), config)
}

#[tokio::test(start_paused = true)]
async fn newer_submission_replaces_slower_older_one() {
    let session = session(
        ScriptedClassifier::new()
            .script("slow.jpg", 500, &[("dog", 0.8), ("cat", 0.2)])
            .script("fast.jpg", 10, &[("fox", 0.6), ("tiger", 0.4)]),
        WidgetConfig::default(),
    );
    let mut surface = session.subscribe();

    let (slow, fast) = tokio::join!(
        session.submit(upload("slow.jpg")),
        session.submit(upload("fast.jpg"))
    );

    let fast = fast.unwrap();
    assert_eq!(fast.generation, 2);
    assert!(matches!(
        slow,
        Err(SessionError::Superseded {
            generation: 1,
            current: 2
        })
    ));

    let shown = surface.borrow_and_update().clone().unwrap();
    assert_eq!(shown.generation, 2);
    assert_eq!(shown.results[0].label, "fox");
}

#[tokio::test(start_paused = true)]
async fn reset_discards_in_flight_submission() {
    let session = session(
        ScriptedClassifier::new().script("pet.jpg", 100, &[("cat", 1.0)]),
        WidgetConfig::default(),
    );

    let (result, ()) = tokio::join!(session.submit(upload("pet.jpg")), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        session.reset();
    });

    assert!(matches!(result, Err(SessionError::Superseded { .. })));
    assert!(session.latest().is_none());
}

#[tokio::test(start_paused = true)]
async fn slow_model_times_out() {
    let config = WidgetConfig::default().with_inference_timeout(Some(Duration::from_secs(1)));
    let session = session(
        ScriptedClassifier::new().script("pet.jpg", 60_000, &[("cat", 1.0)]),
        config,
    );

    let result = session.submit(upload("pet.jpg")).await;
    assert!(matches!(
        result,
        Err(SessionError::Timeout { duration_ms: 1000 })
    ));
    assert!(session.latest().is_none());
}

#[tokio::test]
async fn classifier_failure_propagates() {
    let session = session(ScriptedClassifier::new(), WidgetConfig::default());
    let result = session.submit(upload("missing.jpg")).await;
    assert!(matches!(
        result,
        Err(SessionError::Classifier(ClassifierError::Inference { .. }))
    ));
}

#[tokio::test]
async fn rejected_upload_never_reaches_model() {
    let classifier = Arc::new(ScriptedClassifier::new().script("big.png", 0, &[("cat", 1.0)]));
    let mut config = WidgetConfig::default();
    config.upload.max_bytes = 2;
    let session =
        ClassificationSession::new(classifier.clone(), Arc::new(Catalog::builtin()), config);

    let result = session
        .submit(Upload::new("image/png", vec![0; 3]).with_name("big.png"))
        .await;
    assert!(matches!(result, Err(SessionError::Upload(_))));
    assert_eq!(classifier.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn full_breakdown_ranks_every_class() {
    let session = session(
        ScriptedClassifier::new().script(
            "pet.jpg",
            0,
            &[
                ("dog", 0.1),
                ("cat", 0.2),
                ("fox", 0.3),
                ("tiger", 0.15),
                ("rabbit", 0.25),
            ],
        ),
        WidgetConfig::full_breakdown(),
    );
    assert_eq!(session.config().limit, RankLimit::AllClasses);

    let render = session.submit(upload("pet.jpg")).await.unwrap();
    let labels: Vec<&str> = render.results.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(labels, ["fox", "rabbit", "cat", "tiger", "dog"]);
}

#[tokio::test]
async fn full_breakdown_keeps_every_score_when_model_returns_fewer() {
    let session = session(
        ScriptedClassifier::new()
            .classes(5)
            .script("pet.jpg", 0, &[("dog", 0.2), ("cat", 0.5), ("fox", 0.3)]),
        WidgetConfig::full_breakdown(),
    );

    let render = session.submit(upload("pet.jpg")).await.unwrap();
    let labels: Vec<&str> = render.results.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(labels, ["cat", "fox", "dog"]);
}

#[tokio::test]
async fn full_breakdown_bounded_by_model_class_count() {
    let session = session(
        ScriptedClassifier::new().classes(2).script(
            "pet.jpg",
            0,
            &[("dog", 0.1), ("cat", 0.4), ("fox", 0.3), ("tiger", 0.2)],
        ),
        WidgetConfig::full_breakdown(),
    );

    let render = session.submit(upload("pet.jpg")).await.unwrap();
    let labels: Vec<&str> = render.results.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(labels, ["cat", "fox"]);
}

#[tokio::test]
async fn successive_submissions_each_render() {
    let session = session(
        ScriptedClassifier::new()
            .script("a.jpg", 0, &[("cat", 0.9), ("dog", 0.1)])
            .script("b.jpg", 0, &[("dog", 0.7), ("cat", 0.3)]),
        WidgetConfig::default(),
    );

    let first = session.submit(upload("a.jpg")).await.unwrap();
    let second = session.submit(upload("b.jpg")).await.unwrap();
    assert_eq!(first.generation, 1);
    assert_eq!(second.generation, 2);
    assert_eq!(session.latest().unwrap().results[0].label, "dog");
}
