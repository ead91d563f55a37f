//! MailVet Client SDK.
//!
//! This crate provides a client library for applications to call the mailvet
//! verification API on behalf of an authenticated user.
//!
//! # Example
//!
//! ```no_run
//! use mailvet_client::MailVetClient;
//!
//! # async fn example(user_jwt: &str) -> Result<(), mailvet_client::ClientError> {
//! let client = MailVetClient::new("http://mailvet.validation.svc:8080");
//!
//! let verdict = client.verify_email(user_jwt, "ceo@example.com").await?;
//! println!("{} risk: {:?}", verdict.email, verdict.risk_level);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod client;
mod error;
mod types;

pub use client::{ClientOptions, MailVetClient};
pub use error::ClientError;
pub use types::*;
