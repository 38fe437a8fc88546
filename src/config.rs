use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Startup configuration, read once from the environment (.env is
/// loaded in main). Only DATABASE_URL is mandatory, see db.rs.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub photo_dir: PathBuf,
    pub menu_base_url: String,
    pub ingest_interval: Duration,
}

impl AppConfig {
    pub fn from_env() -> AppConfig {
        let bind_addr =
            env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let photo_dir = env::var("PHOTO_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("photos"));
        let menu_base_url = env::var("MENU_API_URL")
            .unwrap_or_else(|_| "https://app.strava.cz/api/menu".to_string());
        let ingest_interval = env::var("INGEST_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(60 * 60));

        AppConfig {
            bind_addr,
            photo_dir,
            menu_base_url,
            ingest_interval,
        }
    }
}
