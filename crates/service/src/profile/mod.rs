//! Profile domain: storage seam and the action that applies a profile.

pub mod repository;
pub mod switcher;
