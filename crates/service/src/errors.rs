use thiserror::Error;

/// Message returned when an update targets a profile name that is not stored.
pub const UPDATE_TARGET_MISSING: &str = "Can't find the profile to update";

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("storage error: {0}")]
    Storage(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Duplicate(String),
    #[error("switch failed: {0}")]
    Switch(String),
}

impl ServiceError {
    pub fn profile_not_found(name: &str) -> Self { Self::NotFound(format!("profile '{}' not found", name)) }

    pub fn update_target_missing() -> Self { Self::NotFound(UPDATE_TARGET_MISSING.to_string()) }

    pub fn duplicate_profile(name: &str) -> Self { Self::Duplicate(format!("profile '{}' already exists", name)) }
}
