//! Core types and utilities for MailVet.
//!
//! This crate provides the foundational types used throughout the MailVet
//! verification platform:
//!
//! - **Identifiers**: `UserId`, `AuditId`
//! - **Accounts**: `UserAccount`, `Plan`
//! - **Outcomes**: `ProviderResult`, `Classification`, `RiskLevel`
//! - **Audit**: `AuditRecord`
//! - **Classification**: the pure risk classifier in [`classify`]
//!
//! # Credits
//!
//! A credit meters exactly one email verification for free-plan users.
//! Paid plans (`ultimate`, `enterprise`) are unmetered: their balance is
//! never read or mutated by the verification pipeline. Balances are stored
//! as `i64` and must never go negative; the storage layer enforces this
//! with an atomic decrement-if-positive update.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod account;
pub mod audit;
pub mod classify;
pub mod email;
pub mod error;
pub mod ids;
pub mod outcome;

pub use account::{Plan, UserAccount, FREE_PLAN_INITIAL_CREDITS};
pub use audit::{AuditRecord, PROVIDER_NAME};
pub use classify::classify;
pub use error::{Result, VetError};
pub use ids::{AuditId, IdError, UserId};
pub use outcome::{Classification, ProviderResult, RiskLevel};
