use std::{path::PathBuf, sync::Arc};
use async_trait::async_trait;
use common::types::Profile;
use tracing::{debug, info};

use crate::errors::ServiceError;
use crate::profile::repository::ProfileRepository;
use crate::storage::json_file_store::JsonFileStore;

/// Profiles persisted as a JSON array of `{ "name", "email" }` objects.
///
/// The file is re-read for every call and rewritten on every mutation.
pub struct JsonProfileStore {
    store: JsonFileStore<Profile>,
}

impl JsonProfileStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Arc<Self> {
        let store = JsonFileStore::new(path);
        debug!(path = %store.path().display(), "profile store opened");
        Arc::new(Self { store })
    }
}

#[async_trait]
impl ProfileRepository for JsonProfileStore {
    async fn get_profiles(&self) -> Result<Vec<Profile>, ServiceError> {
        self.store.load().await
    }

    async fn get_profile(&self, name: &str) -> Result<Profile, ServiceError> {
        self.store
            .load()
            .await?
            .into_iter()
            .find(|p| p.name == name)
            .ok_or_else(|| ServiceError::profile_not_found(name))
    }

    async fn add_profile(&self, profile: Profile, allow_update: bool) -> Result<(), ServiceError> {
        let name = profile.name.clone();
        self.store
            .update(move |profiles| {
                match profiles.iter().position(|p| p.name == profile.name) {
                    Some(_) if !allow_update => Err(ServiceError::duplicate_profile(&profile.name)),
                    Some(idx) => {
                        profiles[idx].email = profile.email;
                        Ok(())
                    }
                    None if allow_update => Err(ServiceError::update_target_missing()),
                    None => {
                        profiles.push(profile);
                        Ok(())
                    }
                }
            })
            .await?;
        info!(%name, updated = allow_update, "profile saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_store() -> (Arc<JsonProfileStore>, PathBuf) {
        let tmp = std::env::temp_dir().join(format!("svc_profiles_{}.json", Uuid::new_v4()));
        (JsonProfileStore::new(&tmp), tmp)
    }

    #[tokio::test]
    async fn add_new_profile_is_listed_once() -> Result<(), anyhow::Error> {
        let (store, tmp) = temp_store();

        // initially empty, file not created yet
        assert!(store.get_profiles().await?.is_empty());

        store.add_profile(Profile::new("alice", "a@x.com"), false).await?;
        let profiles = store.get_profiles().await?;
        assert_eq!(profiles.iter().filter(|p| p.name == "alice").count(), 1);
        assert_eq!(profiles.len(), 1);

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn get_profile_returns_exact_record() -> Result<(), anyhow::Error> {
        let (store, tmp) = temp_store();
        store.add_profile(Profile::new("x", "a@b.com"), false).await?;
        assert_eq!(store.get_profile("x").await?, Profile::new("x", "a@b.com"));

        // lookup is case-sensitive
        assert!(matches!(store.get_profile("X").await, Err(ServiceError::NotFound(_))));

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_add_is_rejected_and_store_unchanged() -> Result<(), anyhow::Error> {
        let (store, tmp) = temp_store();
        store.add_profile(Profile::new("alice", "a@x.com"), false).await?;
        let before = tokio::fs::read(&tmp).await?;

        let res = store.add_profile(Profile::new("alice", "other@x.com"), false).await;
        assert!(matches!(res, Err(ServiceError::Duplicate(_))));
        assert_eq!(tokio::fs::read(&tmp).await?, before);
        assert_eq!(store.get_profile("alice").await?.email, "a@x.com");

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn update_changes_only_target_email() -> Result<(), anyhow::Error> {
        let (store, tmp) = temp_store();
        store.add_profile(Profile::new("alice", "a@x.com"), false).await?;
        store.add_profile(Profile::new("bob", "b@x.com"), false).await?;
        store.add_profile(Profile::new("carol", "c@x.com"), false).await?;

        store.add_profile(Profile::new("bob", "b@y.com"), true).await?;
        assert_eq!(
            store.get_profiles().await?,
            vec![
                Profile::new("alice", "a@x.com"),
                Profile::new("bob", "b@y.com"),
                Profile::new("carol", "c@x.com"),
            ]
        );

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn update_of_missing_name_fails_with_literal_message() -> Result<(), anyhow::Error> {
        let (store, tmp) = temp_store();
        store.add_profile(Profile::new("alice", "a@x.com"), false).await?;

        let err = store
            .add_profile(Profile::new("bob", "b@x.com"), true)
            .await
            .expect_err("update of missing profile must fail");
        assert_eq!(err.to_string(), "Can't find the profile to update");
        assert_eq!(store.get_profiles().await?, vec![Profile::new("alice", "a@x.com")]);
        assert!(!store.has_profile("bob").await?);

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn file_round_trip_preserves_order_and_field_names() -> Result<(), anyhow::Error> {
        let (store, tmp) = temp_store();
        store.add_profile(Profile::new("zed", "z@x.com"), false).await?;
        store.add_profile(Profile::new("amy", "a@x.com"), false).await?;

        let raw: serde_json::Value = serde_json::from_slice(&tokio::fs::read(&tmp).await?)?;
        assert_eq!(
            raw,
            serde_json::json!([
                {"name": "zed", "email": "z@x.com"},
                {"name": "amy", "email": "a@x.com"}
            ])
        );

        // reload store from disk to ensure persistence
        let reloaded = JsonProfileStore::new(&tmp);
        assert_eq!(reloaded.get_profiles().await?, store.get_profiles().await?);

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn external_edits_are_visible_without_reopen() -> Result<(), anyhow::Error> {
        let (store, tmp) = temp_store();
        store.add_profile(Profile::new("alice", "a@x.com"), false).await?;

        tokio::fs::write(&tmp, br#"[{"name":"dave","email":"d@x.com"}]"#).await?;
        assert_eq!(store.get_profiles().await?, vec![Profile::new("dave", "d@x.com")]);

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }
}
