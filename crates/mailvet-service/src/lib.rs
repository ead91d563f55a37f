//! MailVet HTTP API Service.
//!
//! This crate provides the HTTP API for single-email verification:
//!
//! - `POST /v1/validation/verify-email` — verify one address, charging one
//!   credit for free-plan users
//! - `GET /v1/validation/activity` — recent verification history
//! - `POST /validate` — legacy alias for verify-email
//!
//! The verification pipeline sequences credit reservation, key acquisition
//! from the external rotator, the provider call, risk classification, and
//! audit persistence, refunding the reserved credit on every failure path
//! after the reservation.
//!
//! # Authentication
//!
//! Requests carry a Bearer JWT minted by the upstream auth gateway; this
//! service only decodes the forwarded token to recover the user id.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod pipeline;
pub mod provider;
pub mod rotator;
pub mod routes;
pub mod state;

pub use config::ServiceConfig;
pub use error::ApiError;
pub use pipeline::{Verifier, VerifyReport};
pub use provider::MailtesterClient;
pub use rotator::{KeyReservation, KeyRotatorClient};
pub use routes::create_router;
pub use state::AppState;
