//! Configuration module for the masjid site backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Password used when `SITE_ADMIN_PASSWORD` is not set.
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// Upload size ceiling (80 MiB).
pub const MAX_UPLOAD_BYTES: usize = 80 * 1024 * 1024;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// The single admin password
    pub admin_password: String,
    /// Directory holding the JSON content files and the token file
    pub data_dir: PathBuf,
    /// Directory uploaded media is written to and served from
    pub uploads_dir: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Largest accepted upload in bytes
    pub max_upload_bytes: usize,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let admin_password = env::var("SITE_ADMIN_PASSWORD")
            .ok()
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| DEFAULT_ADMIN_PASSWORD.to_string());

        let data_dir = env::var("SITE_DATA_DIR")
            .unwrap_or_else(|_| "./data".to_string())
            .into();

        let uploads_dir = env::var("SITE_UPLOADS_PATH")
            .unwrap_or_else(|_| "./uploads".to_string())
            .into();

        let bind_addr = env::var("SITE_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
            .parse()
            .expect("Invalid SITE_BIND_ADDR format");

        let log_level = env::var("SITE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Self {
            admin_password,
            data_dir,
            uploads_dir,
            bind_addr,
            log_level,
            max_upload_bytes: MAX_UPLOAD_BYTES,
        }
    }

    /// Path of the persisted admin token.
    pub fn token_path(&self) -> PathBuf {
        self.data_dir.join(".admin-token")
    }

    pub fn uses_default_password(&self) -> bool {
        self.admin_password == DEFAULT_ADMIN_PASSWORD
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use once_cell::sync::Lazy;
    use std::sync::Mutex;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const VARS: [&str; 5] = [
        "SITE_ADMIN_PASSWORD",
        "SITE_DATA_DIR",
        "SITE_UPLOADS_PATH",
        "SITE_BIND_ADDR",
        "SITE_LOG_LEVEL",
    ];

    #[test]
    fn test_default_config() {
        let _guard = ENV_LOCK.lock().unwrap();
        for var in VARS {
            env::remove_var(var);
        }

        let config = Config::from_env();

        assert_eq!(config.admin_password, "admin123");
        assert!(config.uses_default_password());
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.uploads_dir, PathBuf::from("./uploads"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:3000");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.max_upload_bytes, 80 * 1024 * 1024);
        assert_eq!(config.token_path(), PathBuf::from("./data/.admin-token"));
    }

    #[test]
    fn test_env_overrides() {
        let _guard = ENV_LOCK.lock().unwrap();
        env::set_var("SITE_ADMIN_PASSWORD", "s3cret");
        env::set_var("SITE_DATA_DIR", "/srv/site/data");
        env::set_var("SITE_BIND_ADDR", "0.0.0.0:8080");

        let config = Config::from_env();

        assert_eq!(config.admin_password, "s3cret");
        assert!(!config.uses_default_password());
        assert_eq!(config.data_dir, PathBuf::from("/srv/site/data"));
        assert_eq!(config.bind_addr.to_string(), "0.0.0.0:8080");

        for var in VARS {
            env::remove_var(var);
        }
    }
}
