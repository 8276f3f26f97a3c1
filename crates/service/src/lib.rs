//! Service layer for the profile switcher.
//! - File-backed profile storage behind the `ProfileRepository` seam.
//! - The `ProfileSwitcher` action that applies a profile to git.
//! - Startup environment checks.

pub mod errors;
pub mod runtime;
pub mod storage;
pub mod profile;
pub mod file;
