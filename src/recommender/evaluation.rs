use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;

use super::model::{train, SvdModel};
use super::{EvaluationConfig, ModelConfig, Observation, RecommenderError};
use crate::constants::RELEVANT_RATING;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub rmse: f64,
    pub top_k_precision: f64,
    pub k: usize,
    pub train_size: usize,
    pub test_size: usize,
}

/// Seeded shuffle, then the first `ceil(ratio · n)` rows become the test split.
pub fn train_test_split(
    observations: &[Observation],
    test_ratio: f64,
    seed: u64,
) -> (Vec<Observation>, Vec<Observation>) {
    let mut shuffled = observations.to_vec();
    let mut rng = StdRng::seed_from_u64(seed);
    shuffled.shuffle(&mut rng);

    let test_size = ((shuffled.len() as f64) * test_ratio).ceil() as usize;
    let train = shuffled.split_off(test_size.min(shuffled.len()));
    (train, shuffled)
}

pub fn rmse(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.is_empty() {
        return None;
    }
    let mse = pairs
        .iter()
        .map(|(predicted, actual)| (predicted - actual).powi(2))
        .sum::<f64>()
        / pairs.len() as f64;
    Some(mse.sqrt())
}

/// Mean over users of the share of relevant ratings among each user's `k`
/// highest-predicted test rows. 0 when there are no rows.
pub fn precision_at_k(model: &SvdModel, test: &[Observation], k: usize) -> f64 {
    let mut by_user: BTreeMap<u64, Vec<(f64, f64)>> = BTreeMap::new();
    for obs in test {
        by_user
            .entry(obs.user_id)
            .or_default()
            .push((model.predict(obs.user_id, obs.course_id), obs.score));
    }

    let precisions: Vec<f64> = by_user
        .into_values()
        .filter_map(|mut rows| {
            rows.sort_by(|a, b| b.0.total_cmp(&a.0));
            rows.truncate(k);
            if rows.is_empty() {
                return None;
            }
            let relevant = rows.iter().filter(|(_, actual)| *actual >= RELEVANT_RATING).count();
            Some(relevant as f64 / k.min(rows.len()) as f64)
        })
        .collect();

    if precisions.is_empty() {
        0.0
    } else {
        precisions.iter().sum::<f64>() / precisions.len() as f64
    }
}

pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

pub fn evaluate(
    observations: &[Observation],
    model_config: &ModelConfig,
    config: &EvaluationConfig,
) -> Result<Evaluation, RecommenderError> {
    if observations.len() < config.min_ratings {
        return Err(RecommenderError::NotEnoughData {
            required: config.min_ratings,
            available: observations.len(),
        });
    }

    let (train_split, test_split) = train_test_split(observations, config.test_ratio, config.seed);
    let model = train(&train_split, model_config).ok_or(RecommenderError::TrainingFailed)?;

    let pairs: Vec<(f64, f64)> = test_split
        .iter()
        .map(|o| (model.predict(o.user_id, o.course_id), o.score))
        .collect();
    let rmse = rmse(&pairs).ok_or(RecommenderError::NoPredictions)?;
    let precision = precision_at_k(&model, &test_split, config.top_k);

    Ok(Evaluation {
        rmse: round4(rmse),
        top_k_precision: round4(precision),
        k: config.top_k,
        train_size: train_split.len(),
        test_size: test_split.len(),
    })
}
