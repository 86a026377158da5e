use std::sync::Arc;

use axum::Router;
use tempfile::TempDir;
use tokio::sync::broadcast;

use course_recommender::config::{
    Config, Environment, RateLimitConfig, RecommenderEnvConfig, WorkerConfig,
};
use course_recommender::recommender::RecommenderEngine;
use course_recommender::routes::build_router;
use course_recommender::state::AppState;
use course_recommender::store::Store;

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub config: Config,
    _temp_dir: TempDir,
}

impl TestApp {
    pub fn store(&self) -> &Store {
        self.state.store()
    }
}

async fn spawn_with(api_limit: u64, seed_catalog: bool) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let sled_path = temp_dir.path().join("recommender-test.sled");

    // built directly so parallel tests never race on process env vars
    let config = Config {
        host: std::net::IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
        port: 5000,
        environment: Environment::Development,
        log_level: "info".to_string(),
        enable_file_logs: false,
        log_dir: "./logs".to_string(),
        sled_path: sled_path.to_string_lossy().to_string(),
        frontend_url: "http://localhost:3000".to_string(),
        trust_proxy: false,
        rate_limit: RateLimitConfig {
            window_secs: 60,
            max_requests: api_limit,
        },
        worker: WorkerConfig {
            is_leader: false,
            retrain_cron: String::new(),
            metrics_cron: String::new(),
        },
        recommender: RecommenderEnvConfig::default(),
    };

    let store = Arc::new(Store::open(&config.sled_path).expect("open store"));
    if seed_catalog {
        store.run_migrations().expect("run migrations");
    }

    let engine = Arc::new(RecommenderEngine::from_config(
        store.clone(),
        &config.recommender,
    ));
    let (shutdown_tx, _) = broadcast::channel::<()>(8);

    let state = AppState::new(store, engine, &config, shutdown_tx);
    let app = build_router(state.clone());

    TestApp {
        app,
        state,
        config,
        _temp_dir: temp_dir,
    }
}

/// App over a migrated store holding the built-in course catalog.
pub async fn spawn_test_app() -> TestApp {
    spawn_with(1_000, true).await
}

/// App over an empty store: no courses, no migrations.
pub async fn spawn_empty_app() -> TestApp {
    spawn_with(1_000, false).await
}

pub async fn spawn_test_app_with_limit(api_limit: u64) -> TestApp {
    spawn_with(api_limit, true).await
}
