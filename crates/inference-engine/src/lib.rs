//! Happiness Inference Engine
//!
//! Gradient boosted decision trees (gbdt) trained on labelled survey answers.

mod dataset;
mod engine;

pub use dataset::{TrainingRow, TrainingSet};
pub use engine::{Classifier, HappinessClass, HappyModel, ModelConfig, Prediction};

use thiserror::Error;

/// Errors during training or inference
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Dataset error: {0}")]
    Dataset(String),
    #[error("Training failed: {0}")]
    Training(String),
    #[error("Model load failed: {0}")]
    ModelLoadError(String),
    #[error("Model save failed: {0}")]
    ModelSaveError(String),
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
}
