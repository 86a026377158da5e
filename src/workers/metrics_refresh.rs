//! Recomputes the held-out evaluation so `/api/metrics` is served from cache.

use crate::recommender::{RecommenderEngine, RecommenderError};

pub async fn run(engine: &RecommenderEngine) {
    tracing::debug!("Metrics refresh worker tick");

    match engine.evaluate().await {
        Ok(evaluation) => tracing::info!(
            rmse = evaluation.rmse,
            top_k_precision = evaluation.top_k_precision,
            k = evaluation.k,
            test_size = evaluation.test_size,
            "Metrics refreshed"
        ),
        Err(RecommenderError::NotEnoughData {
            required,
            available,
        }) => tracing::debug!(required, available, "Metrics refresh skipped: not enough ratings"),
        Err(e) => tracing::warn!(error = %e, "Metrics refresh failed"),
    }
}
