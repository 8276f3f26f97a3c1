use async_trait::async_trait;
use common::types::Profile;
use tokio::process::Command;
use tracing::debug;

use crate::errors::ServiceError;

/// Applies a profile to the user's environment.
#[async_trait]
pub trait ProfileSwitcher: Send + Sync {
    async fn apply(&self, profile: &Profile) -> Result<(), ServiceError>;
}

/// Writes `user.name` and `user.email` through `git config`.
#[derive(Debug, Clone)]
pub struct GitConfigSwitcher {
    program: String,
    scope: Option<String>,
}

impl Default for GitConfigSwitcher {
    fn default() -> Self {
        Self::new("git", "--global")
    }
}

impl GitConfigSwitcher {
    /// An empty `scope` leaves the scope flag off entirely.
    pub fn new(program: impl Into<String>, scope: impl Into<String>) -> Self {
        let scope = scope.into();
        let scope = if scope.trim().is_empty() { None } else { Some(scope) };
        Self { program: program.into(), scope }
    }

    fn args<'a>(&'a self, key: &'a str, value: &'a str) -> Vec<&'a str> {
        let mut args = vec!["config"];
        if let Some(scope) = &self.scope {
            args.push(scope);
        }
        args.push(key);
        args.push(value);
        args
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), ServiceError> {
        let output = Command::new(&self.program)
            .args(self.args(key, value))
            .output()
            .await
            .map_err(|e| ServiceError::Switch(format!("cannot start {}: {e}", self.program)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ServiceError::Switch(format!(
                "{} config {} exited with {}: {}",
                self.program,
                key,
                output.status,
                stderr.trim()
            )));
        }
        debug!(program = %self.program, %key, "config value written");
        Ok(())
    }
}

#[async_trait]
impl ProfileSwitcher for GitConfigSwitcher {
    async fn apply(&self, profile: &Profile) -> Result<(), ServiceError> {
        self.set("user.name", &profile.name).await?;
        self.set("user.email", &profile.email).await
    }
}
