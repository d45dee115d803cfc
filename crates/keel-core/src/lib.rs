//! # keel-core
//!
//! Core types, ID generation, and error types for Keel.
//!
//! This crate provides the foundational pieces shared across all Keel crates:
//! - The `Decision` entity and its partial log form, `DecisionRecord`
//! - Closed enums for decision type, status, and author role
//! - Decision ID generation, validation, and normalization
//! - The state resolver that folds journal records into current state
//! - Input validation with field-level violations
//! - Cross-cutting error types and CLI response types

pub mod decision;
pub mod enums;
pub mod errors;
pub mod ids;
pub mod responses;
pub mod state;
pub mod validation;
