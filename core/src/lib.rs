//! docrisk-core — document fraud-risk analysis engine.
//!
//! Takes already-extracted field/value pairs (produced by an external
//! document-understanding service) plus an optional external model
//! opinion, and turns them into validated fields, anomaly findings, and
//! one deterministic, auditable risk score.
//!
//! The core is a linear synchronous pipeline with no I/O: extraction,
//! model calls, and storage all happen outside and hand the orchestrator
//! already-resolved data.

pub mod aggregator;
pub mod analyzer;
pub mod config;
pub mod error;
pub mod rules;
pub mod types;
pub mod validators;
