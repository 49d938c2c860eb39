use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;
use tracing::warn;

/// One upstream PDS index volume for a retired rover: a fixed URL to an
/// `edrindex.tab` file and the canonical camera short name it indexes.
/// See `pds` module for the per-row variant detection this feeds into.
#[derive(Clone, Deserialize)]
pub struct PdsVolume {
    pub camera: String,
    pub index_url: String,
}

#[derive(Clone, Deserialize)]
pub struct JsonFeedSource {
    pub feed_base_url: String,
}

#[derive(Clone, Deserialize)]
pub struct PdsSource {
    pub volumes: Vec<PdsVolume>,
}

/// Static per-rover upstream wiring. Rover identity (id, landing date, status)
/// lives in the `rovers` table, which this crate treats as externally seeded
/// (see spec §1 Non-goals) — this struct only carries where to fetch from.
#[derive(Clone, Deserialize)]
pub struct RoverSource {
    pub json_feed: Option<JsonFeedSource>,
    pub pds: Option<PdsSource>,
}

#[derive(Clone, Deserialize)]
pub struct HttpConfig {
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub backoff_base_secs: u64,
    pub circuit_breaker_threshold: u32,
    pub circuit_breaker_cooldown_secs: u64,
    pub politeness_delay_ms: u64,
}

impl HttpConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_secs(self.backoff_base_secs)
    }

    pub fn circuit_breaker_cooldown(&self) -> Duration {
        Duration::from_secs(self.circuit_breaker_cooldown_secs)
    }

    pub fn politeness_delay(&self) -> Duration {
        Duration::from_millis(self.politeness_delay_ms)
    }
}

#[derive(Clone, Deserialize)]
pub struct IngestConfig {
    pub batch_size: usize,
    pub progress_interval: usize,
}

#[derive(Clone, Deserialize)]
pub struct JobHistoryConfig {
    pub max_enumerated_items: usize,
}

#[derive(Clone, Deserialize)]
pub struct QueryConfig {
    pub default_per_page: i64,
    pub max_per_page: i64,
    pub max_compare_range_sols: i64,
    pub compare_list_cap: usize,
}

#[derive(Clone, Deserialize)]
pub struct Config {
    pub log_filter: String,
    pub http: HttpConfig,
    pub ingest: IngestConfig,
    pub job_history: JobHistoryConfig,
    pub query: QueryConfig,
    pub scrapers: std::collections::HashMap<String, RoverSource>,
}

impl Config {
    pub fn rover_source(&self, rover_name: &str) -> Option<&RoverSource> {
        self.scrapers.get(&rover_name.to_lowercase())
    }
}

/// Returns the port the HTTP server listens on. Overridable via `SERVER_PORT`
/// so deployments don't need to touch `config.toml` for this one knob.
pub fn port() -> u16 {
    const DEFAULT_PORT: u16 = 6677;
    std::env::var("SERVER_PORT")
        .ok()
        .and_then(|var| var.parse().ok())
        .unwrap_or(DEFAULT_PORT)
}

/// Returns a Postgres connection string from `POSTGRES_USER`, `POSTGRES_PASSWORD`,
/// and `POSTGRES_DB` environment variables (loaded from `.env` outside of Docker).
pub fn database_url() -> &'static str {
    static DATABASE_URL: LazyLock<String> = LazyLock::new(create_database_url);
    &DATABASE_URL
}

fn create_database_url() -> String {
    if std::env::var("DOCKER_DEPLOYMENT").is_err() {
        dotenvy::dotenv().ok();
    }
    let user = std::env::var("POSTGRES_USER").expect("POSTGRES_USER must be set");
    let password = std::env::var("POSTGRES_PASSWORD").expect("POSTGRES_PASSWORD must be set");
    let database = std::env::var("POSTGRES_DB").expect("POSTGRES_DB must be set");
    let hostname = match std::env::var("DOCKER_DEPLOYMENT") {
        Ok(_) => "host.docker.internal",
        Err(_) => "localhost",
    };
    format!("postgres://{user}:{password}@{hostname}/{database}")
}

pub fn load() -> Config {
    let config_string = std::fs::read_to_string(config_path()).unwrap_or_else(|err| {
        eprintln!("Could not read config file at {:?}: {err}", config_path());
        std::process::exit(1);
    });
    toml::from_str(&config_string).unwrap_or_else(|err| {
        eprintln!(
            "Could not parse config.toml.

       Please ensure that your config is formatted correctly, that each field name
       matches the fields in config.toml.dist exactly, and that each field value
       has the proper type. Details:\n\n{err}"
        );
        std::process::exit(1)
    })
}

fn config_path() -> PathBuf {
    if cfg!(test) {
        let manifest_dir =
            std::env::var("CARGO_MANIFEST_DIR").expect("test environment should have CARGO_MANIFEST_DIR defined");
        [&manifest_dir, "config.toml.dist"].iter().collect()
    } else if let Ok(path) = std::env::var("CONFIG_PATH") {
        PathBuf::from(path)
    } else {
        let exe_path = std::env::current_exe().unwrap_or_else(|_| PathBuf::from("."));
        let parent_path = exe_path.parent().unwrap_or(Path::new("."));
        [parent_path, Path::new("config.toml")].iter().collect()
    }
}

pub fn warn_on_invalid_env_filter(filter: &str) -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_new(filter).unwrap_or_else(|err| {
        warn!("Log filter is invalid. Some or all directives may be ignored. Details:\n{err}");
        tracing_subscriber::EnvFilter::new(filter)
    })
}
