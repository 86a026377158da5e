use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};

use super::evaluation::{self, Evaluation};
use super::explain::{explain, Explanation};
use super::model::{self, SvdModel};
use super::ranking::{self, ScoredCourse};
use super::{observations, EvaluationConfig, ModelConfig, RecommenderError};
use crate::config::RecommenderEnvConfig;
use crate::store::{Store, StoreError};

pub const ALL_RATED_MESSAGE: &str = "You have rated all available courses!";

#[derive(Debug)]
pub struct TrainedModel {
    pub model: SvdModel,
    pub revision: u64,
    pub trained_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Model,
    CategoryFallback,
    Exhausted,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecommendationSet {
    pub recommendations: Vec<ScoredCourse>,
    pub explanations: BTreeMap<u64, Explanation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub strategy: Strategy,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub trained: bool,
    pub revision: Option<u64>,
    pub current_revision: u64,
    pub stale: bool,
    pub trained_at: Option<DateTime<Utc>>,
    pub users: usize,
    pub courses: usize,
    pub factors: usize,
    pub latent: bool,
    pub global_mean: Option<f64>,
}

pub struct RecommenderEngine {
    store: Arc<Store>,
    model_config: ModelConfig,
    eval_config: EvaluationConfig,
    top_n: usize,
    current: RwLock<Option<Arc<TrainedModel>>>,
    evaluation: RwLock<Option<(u64, Evaluation)>>,
    // Revision seen by the last training attempt; serializes retrains.
    last_attempt: Mutex<Option<u64>>,
}

impl RecommenderEngine {
    pub fn new(
        store: Arc<Store>,
        model_config: ModelConfig,
        eval_config: EvaluationConfig,
        top_n: usize,
    ) -> Self {
        Self {
            store,
            model_config,
            eval_config,
            top_n,
            current: RwLock::new(None),
            evaluation: RwLock::new(None),
            last_attempt: Mutex::new(None),
        }
    }

    pub fn from_config(store: Arc<Store>, cfg: &RecommenderEnvConfig) -> Self {
        let model_config = ModelConfig {
            max_factors: cfg.max_factors,
            ..ModelConfig::default()
        };
        let eval_config = EvaluationConfig {
            top_k: cfg.metrics_top_k,
            test_ratio: cfg.metrics_test_ratio,
            seed: cfg.metrics_seed,
            ..EvaluationConfig::default()
        };
        let model_config = match model_config.validate() {
            Ok(()) => model_config,
            Err(e) => {
                tracing::warn!(error = %e, "Invalid model config, using defaults");
                ModelConfig::default()
            }
        };
        let eval_config = match eval_config.validate() {
            Ok(()) => eval_config,
            Err(e) => {
                tracing::warn!(error = %e, "Invalid metrics config, using defaults");
                EvaluationConfig::default()
            }
        };
        Self::new(store, model_config, eval_config, cfg.top_n.max(1))
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    pub async fn current_model(&self) -> Option<Arc<TrainedModel>> {
        self.current.read().await.clone()
    }

    /// Trains on every stored rating and swaps the result in. Fewer ratings
    /// than the training minimum clear the model.
    pub async fn retrain(&self) -> Result<Option<Arc<TrainedModel>>, RecommenderError> {
        let mut last_attempt = self.last_attempt.lock().await;
        let trained = self.train_snapshot().await?;
        *last_attempt = Some(trained.0);

        let next = trained.1.map(Arc::new);
        *self.current.write().await = next.clone();
        Ok(next)
    }

    /// The live model, retrained first when ratings changed since it was built.
    pub async fn ensure_model(&self) -> Result<Option<Arc<TrainedModel>>, RecommenderError> {
        let revision = self.store.ratings_revision()?;
        if let Some(current) = self.current_model().await {
            if current.revision == revision {
                return Ok(Some(current));
            }
        } else if *self.last_attempt.lock().await == Some(revision) {
            return Ok(None);
        }
        self.retrain().await
    }

    /// Retrains only when ratings moved since the last attempt. Returns whether it ran.
    pub async fn retrain_if_stale(&self) -> Result<bool, RecommenderError> {
        let revision = self.store.ratings_revision()?;
        if *self.last_attempt.lock().await == Some(revision) {
            return Ok(false);
        }
        self.retrain().await?;
        Ok(true)
    }

    pub async fn recommend(&self, user_id: u64) -> Result<RecommendationSet, RecommenderError> {
        if !self.store.user_exists(user_id)? {
            return Err(StoreError::not_found("user", user_id).into());
        }

        let catalog = self.store.list_courses()?;
        let user_ratings = self.store.ratings_for_user(user_id)?;
        let rated: HashSet<u64> = user_ratings.iter().map(|r| r.course_id).collect();

        if rated.len() >= catalog.len() {
            return Ok(RecommendationSet {
                recommendations: Vec::new(),
                explanations: BTreeMap::new(),
                message: Some(ALL_RATED_MESSAGE.to_string()),
                strategy: Strategy::Exhausted,
            });
        }

        let candidates = ranking::unrated(&catalog, &rated);
        let (scored, strategy) = match self.ensure_model().await? {
            Some(trained) => (
                ranking::rank_with_model(&trained.model, user_id, &candidates),
                Strategy::Model,
            ),
            None => (
                ranking::rank_by_category(&user_ratings, &catalog, &candidates),
                Strategy::CategoryFallback,
            ),
        };
        let top = ranking::top_n(scored, self.top_n);

        let mut explanations = BTreeMap::new();
        for rec in &top {
            if let Some(course) = catalog.iter().find(|c| c.id == rec.course_id) {
                explanations.insert(rec.course_id, explain(&self.store, course, &rated)?);
            }
        }

        tracing::debug!(
            user_id,
            count = top.len(),
            strategy = ?strategy,
            "Recommendations generated"
        );

        Ok(RecommendationSet {
            recommendations: top,
            explanations,
            message: None,
            strategy,
        })
    }

    /// Held-out RMSE and Precision@k, cached until the ratings change.
    pub async fn evaluate(&self) -> Result<Evaluation, RecommenderError> {
        let revision = self.store.ratings_revision()?;
        if let Some((cached_rev, cached)) = self.evaluation.read().await.as_ref() {
            if *cached_rev == revision {
                return Ok(cached.clone());
            }
        }

        let store = self.store.clone();
        let model_config = self.model_config.clone();
        let eval_config = self.eval_config.clone();
        let result = tokio::task::spawn_blocking(move || {
            let obs = observations(&store.all_ratings()?);
            evaluation::evaluate(&obs, &model_config, &eval_config)
        })
        .await
        .map_err(|e| RecommenderError::Task(e.to_string()))??;

        *self.evaluation.write().await = Some((revision, result.clone()));
        Ok(result)
    }

    pub async fn model_info(&self) -> Result<ModelInfo, RecommenderError> {
        let current_revision = self.store.ratings_revision()?;
        let info = match self.current_model().await {
            Some(trained) => ModelInfo {
                trained: true,
                revision: Some(trained.revision),
                current_revision,
                stale: trained.revision != current_revision,
                trained_at: Some(trained.trained_at),
                users: trained.model.n_users(),
                courses: trained.model.n_courses(),
                factors: trained.model.n_factors(),
                latent: trained.model.has_latent_factors(),
                global_mean: Some(trained.model.global_mean()),
            },
            None => ModelInfo {
                trained: false,
                revision: None,
                current_revision,
                stale: false,
                trained_at: None,
                users: 0,
                courses: 0,
                factors: 0,
                latent: false,
                global_mean: None,
            },
        };
        Ok(info)
    }

    async fn train_snapshot(&self) -> Result<(u64, Option<TrainedModel>), RecommenderError> {
        let store = self.store.clone();
        let config = self.model_config.clone();
        let start = std::time::Instant::now();

        let (revision, trained) = tokio::task::spawn_blocking(move || {
            // Read the revision first: a write racing the scan leaves the model stale, never ahead.
            let revision = store.ratings_revision()?;
            let obs = observations(&store.all_ratings()?);
            let trained = model::train(&obs, &config);
            Ok::<_, RecommenderError>((revision, trained, obs.len()))
        })
        .await
        .map_err(|e| RecommenderError::Task(e.to_string()))?
        .map(|(revision, trained, n)| {
            tracing::info!(
                revision,
                ratings = n,
                trained = trained.is_some(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Model retrained"
            );
            (revision, trained)
        })?;

        Ok((
            revision,
            trained.map(|model| TrainedModel {
                model,
                revision,
                trained_at: Utc::now(),
            }),
        ))
    }
}
