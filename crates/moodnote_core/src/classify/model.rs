//! Adapter for model-backed classification.
//!
//! # Responsibility
//! - Let an external model or service stand in for the keyword table.
//! - Translate backend labels into the closed `Category` set.
//! - Validate backend values before they can reach aggregation.
//!
//! # Invariants
//! - Backend failures surface as `ClassifyError::Backend`; a note is never
//!   silently defaulted to `(Other, 0)` because the backend was down.
//! - Timeouts and retries belong to the backend, not to this adapter.

use crate::classify::{Classification, Classifier, ClassifyError, ClassifyResult};
use crate::model::note::Category;

/// Raw prediction returned by a backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelOutput {
    /// Category label; parsed with `Category::parse`.
    pub label: String,
    pub value: f64,
}

/// Backend failure reported to the adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendFailure {
    pub message: String,
    pub retryable: bool,
}

impl BackendFailure {
    pub fn new(message: impl Into<String>, retryable: bool) -> Self {
        Self {
            message: message.into(),
            retryable,
        }
    }
}

/// Inference capability of a model or remote service.
pub trait ModelBackend: Send + Sync {
    /// Stable backend id, reported in errors and logs.
    fn backend_id(&self) -> &str;

    fn infer(&self, text: &str) -> Result<ModelOutput, BackendFailure>;
}

/// `Classifier` over any `ModelBackend`.
pub struct ModelClassifier<B: ModelBackend> {
    backend: B,
}

impl<B: ModelBackend> ModelClassifier<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }
}

impl<B: ModelBackend> Classifier for ModelClassifier<B> {
    fn classifier_id(&self) -> &str {
        self.backend.backend_id()
    }

    fn classify(&self, text: &str) -> ClassifyResult<Classification> {
        let output = self
            .backend
            .infer(text)
            .map_err(|failure| ClassifyError::Backend {
                classifier_id: self.backend.backend_id().to_string(),
                message: failure.message,
                retryable: failure.retryable,
            })?;

        let category = Category::parse(&output.label)
            .ok_or_else(|| ClassifyError::UnknownCategory(output.label.clone()))?;
        Classification::new(category, output.value)
    }
}

/// Placeholder backend until a real model is wired in. Always fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableBackend;

impl ModelBackend for UnavailableBackend {
    fn backend_id(&self) -> &str {
        "model-unavailable"
    }

    fn infer(&self, _text: &str) -> Result<ModelOutput, BackendFailure> {
        Err(BackendFailure::new("no model backend configured", false))
    }
}

#[cfg(test)]
mod tests {
    use super::{BackendFailure, ModelBackend, ModelClassifier, ModelOutput, UnavailableBackend};
    use crate::classify::{Classifier, ClassifyError};
    use crate::model::note::Category;

    struct FixedBackend {
        result: Result<ModelOutput, BackendFailure>,
    }

    impl ModelBackend for FixedBackend {
        fn backend_id(&self) -> &str {
            "fixed"
        }

        fn infer(&self, _text: &str) -> Result<ModelOutput, BackendFailure> {
            self.result.clone()
        }
    }

    fn classifier(result: Result<ModelOutput, BackendFailure>) -> ModelClassifier<FixedBackend> {
        ModelClassifier::new(FixedBackend { result })
    }

    #[test]
    fn maps_backend_label_and_value() {
        let classified = classifier(Ok(ModelOutput {
            label: "Emotion_Regulation".to_string(),
            value: 7.5,
        }))
        .classify("anything")
        .unwrap();
        assert_eq!(classified.category, Category::EmotionRegulation);
        assert_eq!(classified.value, 7.5);
    }

    #[test]
    fn backend_failure_is_surfaced_not_defaulted() {
        let error = classifier(Err(BackendFailure::new("timeout", true)))
            .classify("walk")
            .unwrap_err();
        assert_eq!(
            error,
            ClassifyError::Backend {
                classifier_id: "fixed".to_string(),
                message: "timeout".to_string(),
                retryable: true,
            }
        );
    }

    #[test]
    fn rejects_unknown_labels_and_out_of_range_values() {
        let unknown = classifier(Ok(ModelOutput {
            label: "joy".to_string(),
            value: 1.0,
        }))
        .classify("x")
        .unwrap_err();
        assert_eq!(unknown, ClassifyError::UnknownCategory("joy".to_string()));

        let out_of_range = classifier(Ok(ModelOutput {
            label: "focus".to_string(),
            value: -9.0,
        }))
        .classify("x")
        .unwrap_err();
        assert_eq!(out_of_range, ClassifyError::ValueOutOfRange(-9.0));
    }

    #[test]
    fn unavailable_backend_always_fails() {
        let classifier = ModelClassifier::new(UnavailableBackend);
        assert_eq!(classifier.classifier_id(), "model-unavailable");
        assert!(matches!(
            classifier.classify(""),
            Err(ClassifyError::Backend {
                retryable: false,
                ..
            })
        ));
    }
}
