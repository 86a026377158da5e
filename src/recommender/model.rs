use std::collections::HashMap;

use ndarray::{Array1, Array2, Axis};

use super::matrix::{count_nonzero, RatingMatrix};
use super::svd::truncated_svd;
use super::{ModelConfig, Observation};
use crate::constants::{MAX_RATING, MIN_RATING};

/// Trained bias + latent-factor model.
///
/// `predict(u, i) = μ + (μ_u − μ) + (μ_i − μ) + p_u · q_i`, clamped to the rating scale.
#[derive(Debug, Clone)]
pub struct SvdModel {
    user_index: HashMap<u64, usize>,
    course_index: HashMap<u64, usize>,
    user_means: Array1<f64>,
    course_means: Array1<f64>,
    user_factors: Array2<f64>,
    course_factors: Array2<f64>,
    global_mean: f64,
    latent: bool,
}

impl SvdModel {
    pub fn predict(&self, user_id: u64, course_id: u64) -> f64 {
        let (Some(&u), Some(&c)) = (
            self.user_index.get(&user_id),
            self.course_index.get(&course_id),
        ) else {
            return self.global_mean;
        };

        let user_bias = self.user_means[u] - self.global_mean;
        let course_bias = self.course_means[c] - self.global_mean;
        let interaction = self
            .user_factors
            .index_axis(Axis(0), u)
            .dot(&self.course_factors.index_axis(Axis(0), c));

        let raw = self.global_mean + user_bias + course_bias + interaction;
        raw.clamp(f64::from(MIN_RATING), f64::from(MAX_RATING))
    }

    pub fn global_mean(&self) -> f64 {
        self.global_mean
    }

    pub fn knows_user(&self, user_id: u64) -> bool {
        self.user_index.contains_key(&user_id)
    }

    pub fn n_users(&self) -> usize {
        self.user_index.len()
    }

    pub fn n_courses(&self) -> usize {
        self.course_index.len()
    }

    pub fn n_factors(&self) -> usize {
        self.user_factors.ncols()
    }

    /// `false` when the factors are all zero and the model is the bias baseline.
    pub fn has_latent_factors(&self) -> bool {
        self.latent
    }
}

/// Number of latent factors for a matrix of the given shape: `min(max, min(m, n) − 1)`, at least 1.
pub fn factor_count(max_factors: usize, n_users: usize, n_courses: usize) -> usize {
    max_factors
        .min(n_users.min(n_courses).saturating_sub(1))
        .max(1)
}

/// Returns `None` while there are too few ratings to fit anything.
pub fn train(observations: &[Observation], config: &ModelConfig) -> Option<SvdModel> {
    if observations.len() < config.min_train_ratings {
        return None;
    }
    let matrix = RatingMatrix::from_observations(observations)?;
    let (n_users, n_courses) = (matrix.n_users(), matrix.n_courses());
    let k = factor_count(config.max_factors, n_users, n_courses);

    let centered = matrix.centered();
    let zero_factors = || (Array2::zeros((n_users, k)), Array2::zeros((n_courses, k)), false);

    let (user_factors, course_factors, latent) = if n_users == 1
        || count_nonzero(&centered) < config.min_nonzero_residuals
        || k >= n_users.min(n_courses)
    {
        zero_factors()
    } else {
        match truncated_svd(&centered, k) {
            Ok(svd) => {
                let root = svd.sigma.mapv(f64::sqrt);
                // U·√Σ and (√Σ·Vᵀ)ᵀ
                let users = &svd.u * &root;
                let courses = (&svd.vt.t() * &root).to_owned();
                (users, courses, true)
            }
            Err(e) => {
                tracing::warn!(error = %e, n_users, n_courses, "SVD failed, using bias-only model");
                zero_factors()
            }
        }
    };

    tracing::debug!(
        n_users,
        n_courses,
        factors = k,
        latent,
        ratings = observations.len(),
        "Model trained"
    );

    Some(SvdModel {
        user_index: matrix.user_index,
        course_index: matrix.course_index,
        user_means: matrix.user_means,
        course_means: matrix.course_means,
        user_factors,
        course_factors,
        global_mean: matrix.global_mean,
        latent,
    })
}
