//! # meterhub-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve the JSON API under `/api` (`/api/groups`, `/api/baselines`)
//! - Map HTTP requests into application service calls (driving adapter)
//! - Map every [`MeterHubError`](meterhub_domain::error::MeterHubError) to a
//!   fixed status code with a JSON `{ "error": ... }` body
//! - Bound each request with a timeout and trace it through `tower-http`
//!
//! ## Dependency rule
//! Depends on `meterhub-app` (for port traits and services) and
//! `meterhub-domain` (for domain types used in request/response mapping).
//! Never leaks axum types into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;
