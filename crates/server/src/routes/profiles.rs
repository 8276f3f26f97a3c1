use axum::{extract::State, http::StatusCode, Json};
use common::types::Profile;
use service::errors::ServiceError;
use tracing::{error, info};

use crate::errors::ApiError;
use crate::routes::extract::FormValues;
use crate::routes::AppState;

fn profile_from(form: &FormValues) -> Profile {
    Profile::new(form.value("name"), form.value("email"))
}

pub async fn list_profiles(State(state): State<AppState>) -> Result<Json<Vec<Profile>>, ApiError> {
    let profiles = state.profiles.get_profiles().await?;
    Ok(Json(profiles))
}

pub async fn add_profile(State(state): State<AppState>, form: FormValues) -> Result<StatusCode, ApiError> {
    state.profiles.add_profile(profile_from(&form), false).await?;
    Ok(StatusCode::OK)
}

pub async fn update_profile(State(state): State<AppState>, form: FormValues) -> Result<StatusCode, ApiError> {
    let profile = profile_from(&form);
    // The store re-checks existence under its write lock; this probe answers early.
    if !state.profiles.has_profile(&profile.name).await? {
        return Err(ServiceError::update_target_missing().into());
    }
    state.profiles.add_profile(profile, true).await?;
    Ok(StatusCode::OK)
}

/// Look the profile up and apply it on a tracked background task.
///
/// The response does not wait for the switch, so a failing `git config` only
/// shows up in the log. Shutdown waits for tracked tasks to finish.
pub async fn switch_profile(State(state): State<AppState>, form: FormValues) -> Result<StatusCode, ApiError> {
    let profile = state.profiles.get_profile(&form.value("name")).await?;
    let switcher = state.switcher.clone();
    state.tasks.spawn(async move {
        match switcher.apply(&profile).await {
            Ok(()) => info!(name = %profile.name, email = %profile.email, "profile switched"),
            Err(e) => error!(name = %profile.name, error = %e, "profile switch failed"),
        }
    });
    Ok(StatusCode::OK)
}

pub async fn close(State(state): State<AppState>) -> StatusCode {
    info!("shutdown requested over http");
    state.shutdown.trigger();
    StatusCode::OK
}
