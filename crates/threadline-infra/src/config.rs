//! Configuration loader for Threadline.
//!
//! Reads `config.toml` from the data directory (`~/.threadline/` by default)
//! and deserializes it into [`ChatConfig`]. Falls back to defaults when the
//! file is missing or malformed.

use std::path::{Path, PathBuf};

use threadline_types::config::ChatConfig;

/// Environment variable that overrides the data directory.
pub const DATA_DIR_ENV: &str = "THREADLINE_DATA_DIR";

/// Resolve the data directory.
///
/// Priority: `THREADLINE_DATA_DIR`, then `~/.threadline`, then
/// `./.threadline` when no home directory is available.
pub fn resolve_data_dir() -> PathBuf {
    data_dir_from(std::env::var_os(DATA_DIR_ENV).map(PathBuf::from), dirs::home_dir())
}

fn data_dir_from(env_override: Option<PathBuf>, home: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = env_override.filter(|d| !d.as_os_str().is_empty()) {
        return dir;
    }
    home.map(|h| h.join(".threadline"))
        .unwrap_or_else(|| PathBuf::from(".threadline"))
}

/// Load chat configuration from `{data_dir}/config.toml`.
///
/// - Missing file: returns [`ChatConfig::default()`].
/// - Unreadable or unparsable file: logs a warning and returns the default.
/// - Otherwise returns the parsed config; absent keys take their defaults.
pub async fn load_chat_config(data_dir: &Path) -> ChatConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return ChatConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return ChatConfig::default();
        }
    };

    match toml::from_str::<ChatConfig>(&content) {
        Ok(config) => {
            tracing::debug!(
                base_url = %config.base_url,
                poll_interval_ms = config.poll_interval_ms,
                run_timeout_secs = config.run_timeout_secs,
                "loaded {}",
                config_path.display()
            );
            config
        }
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            ChatConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use threadline_types::config::{DEFAULT_BASE_URL, DEFAULT_GREETING};

    #[tokio::test]
    async fn load_chat_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_chat_config(tmp.path()).await;
        assert_eq!(config.poll_interval_ms, 5000);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.greeting, DEFAULT_GREETING);
    }

    #[tokio::test]
    async fn load_chat_config_partial_toml_keeps_other_defaults() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join("config.toml"),
            r#"
base_url = "http://localhost:8080/v1"
poll_interval_ms = 1500
"#,
        )
        .await
        .unwrap();

        let config = load_chat_config(tmp.path()).await;
        assert_eq!(config.base_url, "http://localhost:8080/v1");
        assert_eq!(config.poll_interval_ms, 1500);
        assert_eq!(config.run_timeout_secs, 600);
        assert_eq!(config.greeting, DEFAULT_GREETING);
    }

    #[tokio::test]
    async fn load_chat_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_chat_config(tmp.path()).await;
        assert_eq!(config.poll_interval_ms, 5000);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[tokio::test]
    async fn load_chat_config_wrong_type_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "poll_interval_ms = \"fast\"")
            .await
            .unwrap();

        let config = load_chat_config(tmp.path()).await;
        assert_eq!(config.poll_interval_ms, 5000);
    }

    #[test]
    fn data_dir_prefers_env_override() {
        let dir = data_dir_from(Some(PathBuf::from("/tmp/tl")), Some(PathBuf::from("/home/u")));
        assert_eq!(dir, PathBuf::from("/tmp/tl"));
    }

    #[test]
    fn data_dir_ignores_empty_override() {
        let dir = data_dir_from(Some(PathBuf::new()), Some(PathBuf::from("/home/u")));
        assert_eq!(dir, PathBuf::from("/home/u/.threadline"));
    }

    #[test]
    fn data_dir_falls_back_to_working_directory() {
        assert_eq!(data_dir_from(None, None), PathBuf::from(".threadline"));
    }
}
