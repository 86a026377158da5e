use std::collections::HashMap;

use ndarray::{Array1, Array2};

use super::Observation;

/// Dense user × course view of a set of observations.
///
/// Rows follow ascending user id, columns ascending course id. Unrated cells
/// hold 0, which is never a valid score.
#[derive(Debug, Clone)]
pub struct RatingMatrix {
    pub user_ids: Vec<u64>,
    pub course_ids: Vec<u64>,
    pub user_index: HashMap<u64, usize>,
    pub course_index: HashMap<u64, usize>,
    pub values: Array2<f64>,
    pub global_mean: f64,
    pub user_means: Array1<f64>,
    pub course_means: Array1<f64>,
}

impl RatingMatrix {
    /// Returns `None` for an empty observation set. A repeated (user, course)
    /// pair keeps its last score in the matrix, while means count every observation.
    pub fn from_observations(observations: &[Observation]) -> Option<Self> {
        if observations.is_empty() {
            return None;
        }

        let mut user_ids: Vec<u64> = observations.iter().map(|o| o.user_id).collect();
        user_ids.sort_unstable();
        user_ids.dedup();
        let mut course_ids: Vec<u64> = observations.iter().map(|o| o.course_id).collect();
        course_ids.sort_unstable();
        course_ids.dedup();

        let user_index: HashMap<u64, usize> =
            user_ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();
        let course_index: HashMap<u64, usize> =
            course_ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();

        let mut values = Array2::<f64>::zeros((user_ids.len(), course_ids.len()));
        let mut user_sums = Array1::<f64>::zeros(user_ids.len());
        let mut user_counts = Array1::<f64>::zeros(user_ids.len());
        let mut course_sums = Array1::<f64>::zeros(course_ids.len());
        let mut course_counts = Array1::<f64>::zeros(course_ids.len());
        let mut total = 0.0;

        for obs in observations {
            let u = user_index[&obs.user_id];
            let c = course_index[&obs.course_id];
            values[[u, c]] = obs.score;
            user_sums[u] += obs.score;
            user_counts[u] += 1.0;
            course_sums[c] += obs.score;
            course_counts[c] += 1.0;
            total += obs.score;
        }

        Some(Self {
            user_ids,
            course_ids,
            user_index,
            course_index,
            values,
            global_mean: total / observations.len() as f64,
            user_means: &user_sums / &user_counts,
            course_means: &course_sums / &course_counts,
        })
    }

    pub fn n_users(&self) -> usize {
        self.user_ids.len()
    }

    pub fn n_courses(&self) -> usize {
        self.course_ids.len()
    }

    /// Rated cells minus their user's mean; unrated cells stay 0.
    pub fn centered(&self) -> Array2<f64> {
        let mut centered = self.values.clone();
        for (u, mut row) in centered.outer_iter_mut().enumerate() {
            let mean = self.user_means[u];
            for cell in row.iter_mut() {
                if *cell > 0.0 {
                    *cell -= mean;
                }
            }
        }
        centered
    }
}

pub fn count_nonzero(matrix: &Array2<f64>) -> usize {
    matrix.iter().filter(|v| **v != 0.0).count()
}
