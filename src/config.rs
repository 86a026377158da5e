use std::env;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    fn from_raw(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(self) -> bool {
        self == Self::Production
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub environment: Environment,
    pub log_level: String,
    pub enable_file_logs: bool,
    pub log_dir: String,
    pub sled_path: String,
    pub frontend_url: String,
    pub trust_proxy: bool,
    pub rate_limit: RateLimitConfig,
    pub worker: WorkerConfig,
    pub recommender: RecommenderEnvConfig,
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub window_secs: u64,
    pub max_requests: u64,
}

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub is_leader: bool,
    pub retrain_cron: String,
    pub metrics_cron: String,
}

#[derive(Debug, Clone)]
pub struct RecommenderEnvConfig {
    pub top_n: usize,
    pub max_factors: usize,
    pub metrics_top_k: usize,
    pub metrics_test_ratio: f64,
    pub metrics_seed: u64,
}

impl Default for RecommenderEnvConfig {
    fn default() -> Self {
        Self {
            top_n: 10,
            max_factors: 50,
            metrics_top_k: 5,
            metrics_test_ratio: 0.2,
            metrics_seed: 42,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = RecommenderEnvConfig::default();
        Self {
            host: env_or_parse("HOST", IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0))),
            port: env_or_parse("PORT", 5000_u16),
            environment: Environment::from_raw(&env_or("APP_ENV", "development")),
            log_level: env_or("RUST_LOG", "info"),
            enable_file_logs: env_or_bool("ENABLE_FILE_LOGS", false),
            log_dir: env_or("LOG_DIR", "./logs"),
            sled_path: env_or("SLED_PATH", "./data/recommendations.sled"),
            frontend_url: env_or("FRONTEND_URL", "http://localhost:3000"),
            trust_proxy: env_or_bool("TRUST_PROXY", false),
            rate_limit: RateLimitConfig {
                window_secs: env_or_parse("RATE_LIMIT_WINDOW_SECS", 900_u64),
                max_requests: env_or_parse("RATE_LIMIT_MAX", 500_u64),
            },
            worker: WorkerConfig {
                is_leader: env_or_bool("WORKER_LEADER", true),
                retrain_cron: env_or("MODEL_RETRAIN_CRON", "0 */10 * * * *"),
                metrics_cron: env_or("METRICS_REFRESH_CRON", "0 0 * * * *"),
            },
            recommender: RecommenderEnvConfig {
                top_n: env_or_parse("RECOMMENDER_TOP_N", defaults.top_n),
                max_factors: env_or_parse("RECOMMENDER_MAX_FACTORS", defaults.max_factors),
                metrics_top_k: env_or_parse("METRICS_TOP_K", defaults.metrics_top_k),
                metrics_test_ratio: env_or_parse("METRICS_TEST_RATIO", defaults.metrics_test_ratio),
                metrics_seed: env_or_parse("METRICS_SEED", defaults.metrics_seed),
            },
        }
    }

    /// Origins the CORS layer accepts. An empty list means "any origin".
    pub fn allowed_origins(&self) -> Vec<String> {
        if self.environment.is_production() {
            let url = self.frontend_url.trim();
            if url.is_empty() || url == "*" {
                Vec::new()
            } else {
                vec![url.to_string()]
            }
        } else {
            vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ]
        }
    }
}

pub fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn env_or_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match env::var(key) {
        Ok(raw) => match raw.parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(
                    key,
                    value = %raw,
                    "Failed to parse env var, using default"
                );
                default
            }
        },
        Err(_) => default,
    }
}

pub fn env_or_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Mutex, OnceLock};

    use super::*;

    fn env_lock() -> &'static Mutex<()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
    }

    fn managed_keys() -> &'static [&'static str] {
        &[
            "HOST",
            "PORT",
            "RUST_LOG",
            "APP_ENV",
            "FRONTEND_URL",
            "RATE_LIMIT_MAX",
            "RECOMMENDER_TOP_N",
            "METRICS_TEST_RATIO",
        ]
    }

    fn clear_keys(keys: &[&str]) {
        for key in keys {
            env::remove_var(key);
        }
    }

    #[test]
    fn loads_defaults_when_missing() {
        let _guard = env_lock().lock().expect("env lock");
        clear_keys(managed_keys());

        let cfg = Config::from_env();
        assert_eq!(cfg.port, 5000);
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.environment, Environment::Development);
        assert_eq!(cfg.rate_limit.max_requests, 500);
        assert_eq!(cfg.recommender.top_n, 10);
        assert_eq!(cfg.recommender.metrics_seed, 42);
    }

    #[test]
    fn parses_numeric_values() {
        let _guard = env_lock().lock().expect("env lock");
        clear_keys(managed_keys());

        env::set_var("PORT", "8080");
        env::set_var("RECOMMENDER_TOP_N", "3");
        env::set_var("METRICS_TEST_RATIO", "0.25");

        let cfg = Config::from_env();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.recommender.top_n, 3);
        assert!((cfg.recommender.metrics_test_ratio - 0.25).abs() < f64::EPSILON);
        clear_keys(managed_keys());
    }

    #[test]
    fn invalid_values_fall_back() {
        let _guard = env_lock().lock().expect("env lock");
        clear_keys(managed_keys());

        env::set_var("PORT", "bad");
        env::set_var("RATE_LIMIT_MAX", "x");

        let cfg = Config::from_env();
        assert_eq!(cfg.port, 5000);
        assert_eq!(cfg.rate_limit.max_requests, 500);
        clear_keys(managed_keys());
    }

    #[test]
    fn development_allows_local_frontends() {
        let _guard = env_lock().lock().expect("env lock");
        clear_keys(managed_keys());

        let cfg = Config::from_env();
        let origins = cfg.allowed_origins();
        assert!(origins.contains(&"http://localhost:3000".to_string()));
        assert!(origins.contains(&"http://127.0.0.1:3000".to_string()));
    }

    #[test]
    fn production_uses_frontend_url_only() {
        let _guard = env_lock().lock().expect("env lock");
        clear_keys(managed_keys());

        env::set_var("APP_ENV", "production");
        env::set_var("FRONTEND_URL", "https://courses.example.com");

        let cfg = Config::from_env();
        assert_eq!(cfg.allowed_origins(), vec!["https://courses.example.com".to_string()]);

        env::set_var("FRONTEND_URL", "*");
        let cfg = Config::from_env();
        assert!(cfg.allowed_origins().is_empty());
        clear_keys(managed_keys());
    }
}
