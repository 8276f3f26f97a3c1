//! Storage abstractions for service layer
//!
//! Contains reusable file-backed stores shared by services that persist
//! small record lists as JSON.

pub mod json_file_store;
