//! Test helpers for seedbank integration tests.
//!
//! This module provides an in-memory repository standing in for a
//! connected database.

#[path = "helpers/memory_repo.rs"]
pub mod memory_repo;
