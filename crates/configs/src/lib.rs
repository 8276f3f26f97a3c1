use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub switch: SwitchConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port(), worker_threads: None }
    }
}

/// Where the profile list is persisted.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_profiles_path")]
    pub profiles_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { profiles_path: default_profiles_path() }
    }
}

/// Static UI assets, served under `/web/`.
#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_web_dir")]
    pub dir: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self { dir: default_web_dir() }
    }
}

/// Command used to apply a profile. `scope` is passed straight to `git config`
/// (`--global`, `--local`, ...); an empty scope lets git pick its default.
#[derive(Debug, Clone, Deserialize)]
pub struct SwitchConfig {
    #[serde(default = "default_switch_program")]
    pub program: String,
    #[serde(default = "default_switch_scope")]
    pub scope: String,
}

impl Default for SwitchConfig {
    fn default() -> Self {
        Self { program: default_switch_program(), scope: default_switch_scope() }
    }
}

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 9000 }
fn default_profiles_path() -> String { "data/profiles.json".into() }
fn default_web_dir() -> String { "public".into() }
fn default_switch_program() -> String { "git".into() }
fn default_switch_scope() -> String { "--global".into() }

/// `CONFIG_PATH`, or `config.toml` in the working directory.
pub fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

fn is_missing_file(err: &anyhow::Error) -> bool {
    err.downcast_ref::<std::io::Error>()
        .is_some_and(|e| e.kind() == std::io::ErrorKind::NotFound)
}

impl AppConfig {
    /// Prefer `config.toml` (or `CONFIG_PATH`); fall back to defaults
    /// overridden by env vars only when that file does not exist.
    pub fn load_or_env() -> Result<Self> {
        Self::load_or_env_from(&config_path())
    }

    /// A file that exists but does not parse or validate is an error.
    pub fn load_or_env_from(path: &str) -> Result<Self> {
        let mut cfg = match load_from_file(path) {
            Ok(cfg) => cfg,
            Err(e) if is_missing_file(&e) => Self::from_env(),
            Err(e) => return Err(e.context(format!("cannot load {path}"))),
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(host) = std::env::var("SERVER_HOST") {
            cfg.server.host = host;
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            cfg.server.port = port;
        }
        cfg.server.worker_threads = std::env::var("TOKIO_WORKER_THREADS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok());
        if let Ok(path) = std::env::var("PROFILES_PATH") {
            cfg.storage.profiles_path = path;
        }
        if let Ok(dir) = std::env::var("WEB_DIR") {
            cfg.web.dir = dir;
        }
        if let Ok(program) = std::env::var("SWITCH_PROGRAM") {
            cfg.switch.program = program;
        }
        cfg
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        if self.storage.profiles_path.trim().is_empty() {
            return Err(anyhow!("storage.profiles_path must not be empty"));
        }
        if self.web.dir.trim().is_empty() {
            return Err(anyhow!("web.dir must not be empty"));
        }
        if self.switch.program.trim().is_empty() {
            return Err(anyhow!("switch.program must not be empty"));
        }
        self.switch.scope = self.switch.scope.trim().to_string();
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = default_host();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        if self.worker_threads == Some(0) {
            self.worker_threads = None;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_uses_defaults() -> Result<()> {
        let mut cfg: AppConfig = toml::from_str("")?;
        cfg.normalize_and_validate()?;
        assert_eq!(cfg.bind_addr(), "127.0.0.1:9000");
        assert_eq!(cfg.storage.profiles_path, "data/profiles.json");
        assert_eq!(cfg.web.dir, "public");
        assert_eq!(cfg.switch.program, "git");
        assert_eq!(cfg.switch.scope, "--global");
        Ok(())
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() -> Result<()> {
        let mut cfg: AppConfig = toml::from_str(
            r#"
            [server]
            port = 9100

            [switch]
            scope = ""
            "#,
        )?;
        cfg.normalize_and_validate()?;
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.port, 9100);
        assert_eq!(cfg.switch.program, "git");
        assert!(cfg.switch.scope.is_empty());
        Ok(())
    }

    #[test]
    fn zero_port_is_rejected() {
        let mut cfg = AppConfig::default();
        cfg.server.port = 0;
        assert!(cfg.normalize_and_validate().is_err());
    }

    #[test]
    fn blank_host_falls_back_to_loopback() -> Result<()> {
        let mut cfg = AppConfig::default();
        cfg.server.host = "  ".into();
        cfg.server.worker_threads = Some(0);
        cfg.normalize_and_validate()?;
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.worker_threads, None);
        Ok(())
    }

    #[test]
    fn load_from_file_reads_toml() -> Result<()> {
        let path = std::env::temp_dir().join(format!("pswitcher_config_{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "[storage]\nprofiles_path = \"/tmp/p.json\"\n")?;
        let cfg = load_from_file(path.to_str().ok_or_else(|| anyhow!("non-utf8 temp path"))?)?;
        assert_eq!(cfg.storage.profiles_path, "/tmp/p.json");
        let _ = std::fs::remove_file(&path);
        Ok(())
    }

    fn write_temp_config(content: &str) -> Result<std::path::PathBuf> {
        let path = std::env::temp_dir().join(format!("pswitcher_config_{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, content)?;
        Ok(path)
    }

    #[test]
    fn absent_config_file_falls_back_to_env_defaults() -> Result<()> {
        let cfg = AppConfig::load_or_env_from("/nonexistent-config-for-tests.toml")?;
        assert!(cfg.server.port > 0);
        assert!(!cfg.storage.profiles_path.is_empty());
        Ok(())
    }

    #[test]
    fn existing_config_file_wins_over_env() -> Result<()> {
        let path = write_temp_config("[server]\nport = 9100\n[storage]\nprofiles_path = \"/srv/custom.json\"\n")?;
        let cfg = AppConfig::load_or_env_from(path.to_str().ok_or_else(|| anyhow!("non-utf8 temp path"))?)?;
        assert_eq!(cfg.server.port, 9100);
        assert_eq!(cfg.storage.profiles_path, "/srv/custom.json");
        let _ = std::fs::remove_file(&path);
        Ok(())
    }

    #[test]
    fn malformed_config_file_is_not_replaced_by_defaults() -> Result<()> {
        let path = write_temp_config("[server\nport = 9100\n")?;
        let res = AppConfig::load_or_env_from(path.to_str().ok_or_else(|| anyhow!("non-utf8 temp path"))?);
        assert!(res.is_err());
        let _ = std::fs::remove_file(&path);
        Ok(())
    }

    #[test]
    fn invalid_config_file_is_not_replaced_by_defaults() -> Result<()> {
        let path = write_temp_config("[server]\nport = 0\n[storage]\nprofiles_path = \"/srv/custom.json\"\n")?;
        let res = AppConfig::load_or_env_from(path.to_str().ok_or_else(|| anyhow!("non-utf8 temp path"))?);
        assert!(res.is_err());
        let _ = std::fs::remove_file(&path);
        Ok(())
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_from_file("/nonexistent-config-for-tests.toml").is_err());
    }
}
