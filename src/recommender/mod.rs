//! Collaborative filtering over user–course ratings.
//!
//! The model is a bias baseline (global mean, user offset, course offset)
//! plus latent factors from a truncated SVD of the user-mean-centred rating
//! matrix. Everything here is synchronous and pure except [`engine`], which
//! owns the live model and talks to the store.

pub mod engine;
pub mod evaluation;
pub mod explain;
pub mod matrix;
pub mod model;
pub mod ranking;
pub mod svd;

use thiserror::Error;

use crate::constants::{MIN_EVAL_RATINGS, MIN_NONZERO_RESIDUALS, MIN_TRAIN_RATINGS};
use crate::store::operations::ratings::Rating;
use crate::store::StoreError;

pub use engine::RecommenderEngine;
pub use model::SvdModel;

#[derive(Debug, Error)]
pub enum RecommenderError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("not enough ratings: need {required}, have {available}")]
    NotEnoughData { required: usize, available: usize },
    #[error("model could not be trained on the training split")]
    TrainingFailed,
    #[error("no predictions generated for the test split")]
    NoPredictions,
    #[error("decomposition failed: {0}")]
    Decomposition(String),
    #[error("background task failed: {0}")]
    Task(String),
}

/// One observed rating, detached from storage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub user_id: u64,
    pub course_id: u64,
    pub score: f64,
}

impl From<&Rating> for Observation {
    fn from(rating: &Rating) -> Self {
        Self {
            user_id: rating.user_id,
            course_id: rating.course_id,
            score: f64::from(rating.score),
        }
    }
}

pub fn observations(ratings: &[Rating]) -> Vec<Observation> {
    ratings.iter().map(Observation::from).collect()
}

#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub max_factors: usize,
    pub min_train_ratings: usize,
    pub min_nonzero_residuals: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            max_factors: 50,
            min_train_ratings: MIN_TRAIN_RATINGS,
            min_nonzero_residuals: MIN_NONZERO_RESIDUALS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EvaluationConfig {
    pub top_k: usize,
    pub test_ratio: f64,
    pub seed: u64,
    pub min_ratings: usize,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            test_ratio: 0.2,
            seed: 42,
            min_ratings: MIN_EVAL_RATINGS,
        }
    }
}

impl ModelConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_factors == 0 {
            return Err("max_factors must be >= 1".to_string());
        }
        Ok(())
    }
}

impl EvaluationConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.top_k == 0 {
            return Err("top_k must be >= 1".to_string());
        }
        if !(self.test_ratio > 0.0 && self.test_ratio < 1.0) {
            return Err("test_ratio must be in (0,1)".to_string());
        }
        if self.min_ratings < 2 {
            return Err("min_ratings must be >= 2".to_string());
        }
        Ok(())
    }
}
