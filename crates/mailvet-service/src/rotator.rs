//! Key rotator client.
//!
//! The rotator is an external microservice that load-balances Mailtester
//! API keys and enforces per-key rate limits. This client performs a single
//! acquisition call and signals the distinct failure classes; it never
//! retries — the orchestrator decides what to do with the wait hint.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use mailvet_core::VetError;

/// A key handed out by the rotator for one verification call.
///
/// Transient: never persisted, never serialized to API callers. The key
/// expires through the rotator's own scheduling; there is no release call.
#[derive(Debug, Clone)]
pub struct KeyReservation {
    /// The usable API key, stripped of any wrapping braces.
    pub api_key: String,

    /// The rotator subscription this key belongs to.
    pub subscription_id: String,

    /// Plan of the key (not the user's plan).
    pub plan: Option<String>,

    /// Scheduling hint: milliseconds until this key may be used again.
    pub next_request_in_ms: Option<u64>,

    /// Scheduling hint: absolute time the key becomes usable again.
    pub next_request_allowed_at: Option<String>,

    /// Full rotator payload, kept for the audit trail.
    pub raw: serde_json::Value,
}

/// Rotator "available key" payload.
///
/// Scheduling hints arrive as whatever number shape the rotator felt like
/// sending (integer or fractional millis), so they are kept as raw JSON
/// numbers and coerced after parsing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RotatorPayload {
    api_key: Option<String>,
    key: Option<String>,
    subscription_id: Option<String>,
    plan: Option<String>,
    next_request_in_ms: Option<serde_json::Number>,
    next_request_allowed_at: Option<String>,
}

/// HTTP client for the key rotator.
#[derive(Debug, Clone)]
pub struct KeyRotatorClient {
    client: Client,
    base_url: String,
}

impl KeyRotatorClient {
    /// Create a new rotator client with a bounded request timeout.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built (should not happen with
    /// default settings).
    #[must_use]
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Acquire a currently-usable Mailtester key.
    ///
    /// # Errors
    ///
    /// - [`VetError::KeyRotatorBusy`] when the rotator answers 429 (all
    ///   keys rate-limited), carrying the retry hint from the body.
    /// - [`VetError::KeyRotatorUnavailable`] for any other non-2xx,
    ///   transport failure, or a 2xx body that is not key-shaped.
    /// - [`VetError::EmptyKeyFromRotator`] when a 2xx payload yields an
    ///   empty key or subscription id after brace stripping.
    pub async fn acquire(&self) -> Result<KeyReservation, VetError> {
        let response = self
            .client
            .get(&self.base_url)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let text = response.text().await.map_err(transport_error)?;
        let body: serde_json::Value =
            serde_json::from_str(&text).unwrap_or_else(|_| serde_json::json!({ "raw": text }));

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(VetError::KeyRotatorBusy {
                retry_after_ms: retry_hint(&body),
                details: body,
            });
        }

        if !status.is_success() {
            return Err(VetError::KeyRotatorUnavailable {
                status: status.as_u16(),
                details: body,
            });
        }

        // A 2xx body that is not key-shaped at all is an upstream fault,
        // not an empty key.
        let payload: RotatorPayload =
            serde_json::from_value(body.clone()).map_err(|_| VetError::KeyRotatorUnavailable {
                status: status.as_u16(),
                details: body.clone(),
            })?;

        let subscription_id = strip_braces(payload.subscription_id.as_deref().unwrap_or_default());
        // RapidAPI-style subscriptions double as keys, so fall back to the
        // subscription id when no explicit key field is present.
        let api_key = strip_braces(
            payload
                .api_key
                .as_deref()
                .or(payload.key.as_deref())
                .or(payload.subscription_id.as_deref())
                .unwrap_or_default(),
        );

        if api_key.is_empty() || subscription_id.is_empty() {
            return Err(VetError::EmptyKeyFromRotator);
        }

        tracing::debug!(
            subscription_id = %subscription_id,
            key_plan = ?payload.plan,
            "Acquired rotator key"
        );

        Ok(KeyReservation {
            api_key,
            subscription_id,
            plan: payload.plan,
            next_request_in_ms: payload.next_request_in_ms.as_ref().and_then(finite_millis),
            next_request_allowed_at: payload.next_request_allowed_at,
            raw: body,
        })
    }
}

/// Map a reqwest transport failure (connect error, timeout) to the
/// rotator's generic failure class.
fn transport_error(err: reqwest::Error) -> VetError {
    VetError::KeyRotatorUnavailable {
        status: 502,
        details: serde_json::json!({ "error": err.to_string() }),
    }
}

/// Pull the retry hint from a busy response: `retryAfterMs`, else
/// `nextRequestInMs`, whichever is present and finite.
fn retry_hint(body: &serde_json::Value) -> Option<u64> {
    ["retryAfterMs", "nextRequestInMs"]
        .iter()
        .find_map(|field| match body.get(field) {
            Some(serde_json::Value::Number(n)) => finite_millis(n),
            _ => None,
        })
}

/// Coerce a JSON number to whole milliseconds, tolerating the fractional
/// values the rotator sometimes emits. Non-finite and negative values are
/// discarded.
fn finite_millis(n: &serde_json::Number) -> Option<u64> {
    if let Some(ms) = n.as_u64() {
        return Some(ms);
    }
    let f = n.as_f64()?;
    if f.is_finite() && f >= 0.0 {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        return Some(f as u64);
    }
    None
}

/// Strip wrapping brace characters and surrounding whitespace from a
/// credential string.
fn strip_braces(value: &str) -> String {
    value
        .trim()
        .trim_matches(|c| c == '{' || c == '}')
        .trim()
        .to_string()
}
