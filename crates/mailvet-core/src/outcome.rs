//! Verification outcome types.
//!
//! [`ProviderResult`] is the raw deliverability verdict returned by the
//! Mailtester API; [`Classification`] is the set of risk flags derived from
//! it by [`crate::classify`]. Neither is mutated after creation.

use serde::{Deserialize, Serialize};

/// Raw result from the verification provider.
///
/// The provider's wire format is loose: `mx` may be a hostname string, a
/// boolean, or absent, and unknown fields come and go. Everything we do not
/// model explicitly is retained in `raw` for the audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResult {
    /// Deliverability code: `"ok"`, `"ko"`, `"mb"` (mailbox-level doubt),
    /// or something newer we do not know yet.
    #[serde(default)]
    pub code: String,

    /// Human-readable verdict message.
    #[serde(default)]
    pub message: Option<String>,

    /// MX indicator. Hostname string or boolean depending on provider
    /// version, hence a raw JSON value.
    #[serde(default)]
    pub mx: Option<serde_json::Value>,

    /// Local part echoed back by the provider.
    #[serde(default)]
    pub user: Option<String>,

    /// Domain echoed back by the provider.
    #[serde(default)]
    pub domain: Option<String>,

    /// Provider's own catch-all determination. Kept for the audit trail;
    /// the classifier derives its flag from the message (see
    /// [`crate::classify`]).
    #[serde(default)]
    pub catch_all: Option<bool>,

    /// The full provider payload as received.
    #[serde(default)]
    pub raw: serde_json::Value,
}

impl ProviderResult {
    /// Wrap a 200 response whose body failed to parse as JSON.
    ///
    /// Malformed-but-successful responses must still be observable in the
    /// audit trail, so they become a result with an empty code and the raw
    /// text preserved.
    #[must_use]
    pub fn from_unparseable(text: &str) -> Self {
        Self {
            code: String::new(),
            message: None,
            mx: None,
            user: None,
            domain: None,
            catch_all: None,
            raw: serde_json::json!({ "raw": text }),
        }
    }

    /// Whether the `mx` field carries a usable (truthy) value.
    #[must_use]
    pub fn mx_present(&self) -> bool {
        match &self.mx {
            None | Some(serde_json::Value::Null) => false,
            Some(serde_json::Value::Bool(b)) => *b,
            Some(serde_json::Value::String(s)) => !s.is_empty(),
            Some(_) => true,
        }
    }
}

/// Risk level derived from the provider result and email shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// No negative signals.
    Low,

    /// Catch-all domain, role-based address, or mailbox-level doubt.
    Medium,

    /// Disposable domain or a hard provider rejection.
    High,
}

/// Flags derived from one verification attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    /// Domain is a known disposable/throwaway provider.
    pub disposable: bool,

    /// Local part is a generic role prefix (support@, info@, ...).
    pub role_based: bool,

    /// Domain accepts mail for any local part.
    pub catch_all: bool,

    /// Domain has usable MX records.
    pub mx_records: bool,

    /// Overall risk level.
    pub risk_level: RiskLevel,
}
