//! File-backed implementations of the service storage seams.

pub mod profile_store;
