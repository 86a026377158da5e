//! Periodic retrain when ratings moved since the last training attempt.
//! Covers writes that bypass the HTTP handlers and retrains that failed inline.

use crate::recommender::RecommenderEngine;

pub async fn run(engine: &RecommenderEngine) {
    tracing::debug!("Model retrain worker tick");

    match engine.retrain_if_stale().await {
        Ok(true) => {
            let trained = engine.current_model().await.is_some();
            tracing::info!(trained, "Model retrain: stale model rebuilt");
        }
        Ok(false) => tracing::debug!("Model retrain: model is current"),
        Err(e) => tracing::error!(error = %e, "Model retrain failed"),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::recommender::{EvaluationConfig, ModelConfig};
    use crate::store::operations::users::NewUser;
    use crate::store::Store;

    #[tokio::test]
    async fn tick_trains_once_per_revision() {
        let tmp = tempfile::tempdir().unwrap();
        let store = Arc::new(Store::open(tmp.path().join("retrain.sled").to_str().unwrap()).unwrap());
        let engine = RecommenderEngine::new(
            store.clone(),
            ModelConfig::default(),
            EvaluationConfig::default(),
            10,
        );
        let user = store
            .create_user(NewUser {
                name: "Ada".to_string(),
                ..NewUser::default()
            })
            .unwrap();
        for course in 1..=3 {
            store.upsert_rating(user.id, course, 4).unwrap();
        }

        run(&engine).await;
        let first = engine.current_model().await.unwrap();
        run(&engine).await;
        let second = engine.current_model().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }
}
