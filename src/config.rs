use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub editor: EditorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory with the editor front-end, served at `/` when set
    pub static_dir: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Undo steps kept per session
    pub history_limit: usize,
    /// Idle time after which a session is dropped
    pub session_ttl_secs: u64,
    /// How often expired sessions are swept
    pub eviction_interval_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
            static_dir: None,
        }
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: 100,
            session_ttl_secs: 3600,
            eviction_interval_secs: 60,
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, an optional config file and
    /// `FORGE_`-prefixed environment variables, in that order
    pub fn load() -> anyhow::Result<Self> {
        let mut config = config::Config::builder();

        config = config.add_source(config::Config::try_from(&AppConfig::default())?);

        config = config.add_source(config::File::with_name("config").required(false));

        // FORGE_SERVER__PORT=8080, FORGE_EDITOR__HISTORY_LIMIT=50, ...
        config = config.add_source(
            config::Environment::with_prefix("FORGE")
                .separator("__")
                .prefix_separator("_"),
        );

        let config = config.build()?;
        let app_config: AppConfig = config.try_deserialize()?;

        Ok(app_config)
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.editor.session_ttl_secs)
    }

    /// Sweep period for expired sessions, never below one second
    pub fn eviction_interval(&self) -> Duration {
        Duration::from_secs(self.editor.eviction_interval_secs.max(1))
    }
}
