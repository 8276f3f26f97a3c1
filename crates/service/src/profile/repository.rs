use async_trait::async_trait;
use common::types::Profile;

use crate::errors::ServiceError;

/// Storage seam for profiles. Names are unique and compared exactly.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// All profiles in stored order.
    async fn get_profiles(&self) -> Result<Vec<Profile>, ServiceError>;

    /// Exact, case-sensitive lookup by name.
    async fn get_profile(&self, name: &str) -> Result<Profile, ServiceError>;

    /// Whether a profile with exactly this name is stored.
    async fn has_profile(&self, name: &str) -> Result<bool, ServiceError> {
        Ok(self.get_profiles().await?.iter().any(|p| p.name == name))
    }

    /// Append a new profile, or with `allow_update` replace the email of an
    /// existing one. The store is left unchanged on error.
    async fn add_profile(&self, profile: Profile, allow_update: bool) -> Result<(), ServiceError>;
}
