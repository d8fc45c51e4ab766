//! # muster-core
//!
//! Core types, person keys, and error types for Muster.
//!
//! This crate provides the foundational types shared across all Muster crates:
//! - Entity structs for people, schedule entries, sign events, drill records
//! - Category / action / status enums
//! - `PersonKey`, the `(category, id)` identity used everywhere
//! - Cross-cutting error types
//! - Snapshot record envelope for JSONL persistence
//! - Reconciliation and report response types

pub mod entities;
pub mod enums;
pub mod errors;
pub mod keys;
pub mod responses;
pub mod snapshot;
