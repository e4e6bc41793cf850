//! # meterhub-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `GroupRepository`: create, look up, list, and link groups
//!   - `BaselineRepository`: insert store-computed baselines and list them
//! - Define **driving/inbound ports** as use-case structs:
//!   - `GroupService`: group hierarchy use-cases
//!   - `BaselineService`: baseline use-cases
//! - Orchestrate domain objects without knowing *how* persistence works
//!
//! ## Dependency rule
//! Depends on `meterhub-domain` only.
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod ports;
pub mod services;
