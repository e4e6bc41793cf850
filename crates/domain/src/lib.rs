//! # meterhub-domain
//!
//! Pure domain model for the meterhub energy-monitoring backend.
//!
//! ## Responsibilities
//! - Foundational types: typed integer identifiers, error conventions, timestamps
//! - Define **Groups** (named hierarchy nodes owning child groups and meters)
//! - Define **Baselines** (store-computed reference values for a meter)
//! - Define **Time intervals** used by baselines
//! - Contain all invariant enforcement that does not need IO
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod baseline;
pub mod group;
pub mod interval;
