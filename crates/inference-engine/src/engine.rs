//! Happiness Classifier

use crate::dataset::TrainingSet;
use crate::InferenceError;
use gbdt::config::Config;
use gbdt::decision_tree::{Data, DataVec};
use gbdt::gradient_boost::GBDT;
use serde::{Deserialize, Serialize};
use std::path::Path;
use survey_data::SurveyMeasurement;
use tracing::{debug, info, warn};

/// Class predicted by the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HappinessClass {
    Unhappy,
    Happy,
}

impl HappinessClass {
    /// Integer label as stored and returned by the API
    pub fn label(&self) -> i64 {
        match self {
            HappinessClass::Unhappy => 0,
            HappinessClass::Happy => 1,
        }
    }

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            HappinessClass::Unhappy => "unhappy",
            HappinessClass::Happy => "happy",
        }
    }
}

/// Prediction result from inference
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Predicted class
    pub class: HappinessClass,
    /// Confidence in the predicted class (0.5 to 1.0)
    pub probability: f64,
}

impl Prediction {
    /// Build from the model's probability of the happy class
    pub fn from_happy_probability(p_happy: f64) -> Self {
        let p_happy = p_happy.clamp(0.0, 1.0);
        if p_happy >= 0.5 {
            Self {
                class: HappinessClass::Happy,
                probability: p_happy,
            }
        } else {
            Self {
                class: HappinessClass::Unhappy,
                probability: 1.0 - p_happy,
            }
        }
    }
}

/// Anything that can turn a survey measurement into a prediction
pub trait Classifier: Send + Sync {
    /// Predict the happiness class of one measurement
    fn predict(&self, measurement: &SurveyMeasurement) -> Result<Prediction, InferenceError>;
}

/// Gradient boosting hyper-parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Number of boosting rounds
    pub n_estimators: usize,
    /// Shrinkage applied to every tree
    pub learning_rate: f32,
    /// Maximum tree depth
    pub max_depth: u32,
    /// Fraction of features considered per tree
    pub feature_sample_ratio: f64,
    /// Fraction of rows used per tree
    pub data_sample_ratio: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            n_estimators: 10,
            learning_rate: 0.1,
            max_depth: 3,
            feature_sample_ratio: 1.0,
            data_sample_ratio: 1.0,
        }
    }
}

const FEATURE_SIZE: usize = 6;

/// Gradient boosted happiness classifier
pub struct HappyModel {
    gbdt: GBDT,
}

impl HappyModel {
    /// Train a new model on a labelled data set
    pub fn train(data: &TrainingSet, config: &ModelConfig) -> Result<Self, InferenceError> {
        if data.is_empty() {
            return Err(InferenceError::Training("empty training set".to_string()));
        }

        let mut cfg = Config::new();
        cfg.set_feature_size(FEATURE_SIZE);
        cfg.set_max_depth(config.max_depth);
        cfg.set_iterations(config.n_estimators);
        cfg.set_shrinkage(config.learning_rate);
        cfg.set_feature_sample_ratio(config.feature_sample_ratio);
        cfg.set_data_sample_ratio(config.data_sample_ratio);
        cfg.set_loss("LogLikelyhood");
        cfg.set_debug(false);

        // Log-likelihood loss expects labels in {-1, 1}
        let mut train: DataVec = data
            .rows()
            .iter()
            .map(|row| {
                let label = if row.happiness > 0 { 1.0 } else { -1.0 };
                Data::new_training_data(features(&row.measurement()), 1.0, label, None)
            })
            .collect();

        let mut gbdt = GBDT::new(&cfg);
        gbdt.fit(&mut train);

        info!(
            "Trained happiness model: rows={}, estimators={}, depth={}",
            data.len(),
            config.n_estimators,
            config.max_depth
        );
        Ok(Self { gbdt })
    }

    /// Load a model previously written with [`HappyModel::save`]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, InferenceError> {
        let path = path.as_ref();
        let gbdt = GBDT::load_model(&path.to_string_lossy())
            .map_err(|e| InferenceError::ModelLoadError(format!("{}: {}", path.display(), e)))?;
        info!("Model loaded from {}", path.display());
        Ok(Self { gbdt })
    }

    /// Write the model to disk
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), InferenceError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| InferenceError::ModelSaveError(format!("{}: {}", parent.display(), e)))?;
            }
        }
        self.gbdt
            .save_model(&path.to_string_lossy())
            .map_err(|e| InferenceError::ModelSaveError(format!("{}: {}", path.display(), e)))
    }

    /// Load the cached model if there is one, otherwise train from the
    /// dataset and try to cache the result.
    ///
    /// A cache that cannot be read or written only produces a warning.
    pub fn load_or_train(
        dataset_path: &Path,
        model_path: Option<&Path>,
        config: &ModelConfig,
    ) -> Result<Self, InferenceError> {
        if let Some(path) = model_path.filter(|p| p.exists()) {
            match Self::load(path) {
                Ok(model) => return Ok(model),
                Err(e) => warn!("Ignoring cached model: {}", e),
            }
        }

        let data = TrainingSet::from_csv(dataset_path)?;
        let model = Self::train(&data, config)?;

        if let Some(path) = model_path {
            match model.save(path) {
                Ok(()) => info!("Model cached at {}", path.display()),
                Err(e) => warn!("Could not cache model: {}", e),
            }
        }

        Ok(model)
    }

    /// Probability that the measurement belongs to the happy class
    pub fn happy_probability(&self, measurement: &SurveyMeasurement) -> Result<f64, InferenceError> {
        let input: DataVec = vec![Data::new_test_data(features(measurement), None)];
        let output = self.gbdt.predict(&input);

        let p = output
            .first()
            .copied()
            .ok_or_else(|| InferenceError::InferenceFailed("model produced no output".to_string()))?;
        if !p.is_finite() {
            return Err(InferenceError::InferenceFailed(format!("non-finite output {}", p)));
        }
        Ok(f64::from(p))
    }
}

impl Classifier for HappyModel {
    fn predict(&self, measurement: &SurveyMeasurement) -> Result<Prediction, InferenceError> {
        let start = std::time::Instant::now();
        let prediction = Prediction::from_happy_probability(self.happy_probability(measurement)?);
        debug!(
            "Prediction: {} (p={:.3}) in {}us",
            prediction.class.as_str(),
            prediction.probability,
            start.elapsed().as_micros()
        );
        Ok(prediction)
    }
}

fn features(measurement: &SurveyMeasurement) -> Vec<f32> {
    measurement.features().iter().map(|v| *v as f32).collect()
}
