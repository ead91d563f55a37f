//! The risk classifier.
//!
//! A pure function from `(email, domain, provider result)` to risk flags.
//! Rules are applied in a fixed order; disposable/hard-rejection signals are
//! evaluated first so they dominate everything else.

use crate::email;
use crate::outcome::{Classification, ProviderResult, RiskLevel};

/// Known disposable/throwaway email domains, matched exactly and
/// case-insensitively against the address domain.
const DISPOSABLE_DOMAINS: &[&str] = &[
    "10minutemail.com",
    "10minutemail.net",
    "20minutemail.com",
    "33mail.com",
    "anonbox.net",
    "burnermail.io",
    "discard.email",
    "dispostable.com",
    "emailondeck.com",
    "fakeinbox.com",
    "getairmail.com",
    "getnada.com",
    "guerrillamail.com",
    "guerrillamail.net",
    "guerrillamail.org",
    "inboxkitten.com",
    "mail-temp.com",
    "mailcatch.com",
    "maildrop.cc",
    "mailinator.com",
    "mailnesia.com",
    "mailsac.com",
    "mintemail.com",
    "mohmal.com",
    "mytemp.email",
    "sharklasers.com",
    "spamgourmet.com",
    "tempail.com",
    "temp-mail.io",
    "temp-mail.org",
    "tempmail.com",
    "tempmail.dev",
    "tempmailo.com",
    "throwawaymail.com",
    "trashmail.com",
    "yopmail.com",
];

/// Generic local-part prefixes that indicate a role address rather than a
/// person.
const ROLE_PREFIXES: &[&str] = &[
    "admin",
    "billing",
    "contact",
    "hello",
    "help",
    "info",
    "inquiries",
    "legal",
    "mail",
    "marketing",
    "office",
    "postmaster",
    "privacy",
    "sales",
    "security",
    "service",
    "support",
    "team",
    "webmaster",
];

/// Derive risk flags from a normalized email, its domain, and the raw
/// provider result.
///
/// Deterministic and side-effect free: identical inputs always produce
/// identical flags.
#[must_use]
pub fn classify(email: &str, domain: &str, result: &ProviderResult) -> Classification {
    let domain_lc = domain.to_ascii_lowercase();
    let (local, _) = email::split_parts(email);
    let local_lc = local.to_ascii_lowercase();
    let message_lc = result
        .message
        .as_deref()
        .unwrap_or_default()
        .to_ascii_lowercase();
    let code_lc = result.code.to_ascii_lowercase();

    let disposable = DISPOSABLE_DOMAINS.contains(&domain_lc.as_str());
    let role_based = ROLE_PREFIXES.contains(&local_lc.as_str());
    let catch_all = mentions_catch_all(&message_lc);
    let mx_records = result.mx_present() && !mentions_mx_failure(&message_lc);

    // Disposable domains and hard rejections dominate every other signal.
    let risk_level = if disposable || code_lc == "ko" {
        RiskLevel::High
    } else if catch_all || role_based || code_lc == "mb" {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };

    Classification {
        disposable,
        role_based,
        catch_all,
        mx_records,
        risk_level,
    }
}

/// Case-folded "catch-all" match with an optional hyphen or space between
/// the words.
fn mentions_catch_all(message_lc: &str) -> bool {
    message_lc.contains("catch-all")
        || message_lc.contains("catch all")
        || message_lc.contains("catchall")
}

/// Whether the provider message signals a missing MX record or an MX lookup
/// error.
fn mentions_mx_failure(message_lc: &str) -> bool {
    message_lc.contains("no mx") || message_lc.contains("mx error")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn result(code: &str, message: &str, mx: serde_json::Value) -> ProviderResult {
        ProviderResult {
            code: code.to_string(),
            message: Some(message.to_string()),
            mx: Some(mx),
            user: None,
            domain: None,
            catch_all: None,
            raw: serde_json::Value::Null,
        }
    }

    #[test]
    fn disposable_domain_is_high_risk_even_when_ok() {
        let flags = classify(
            "test@mailinator.com",
            "mailinator.com",
            &result("ok", "Valid", json!("mx.mailinator.com")),
        );
        assert!(flags.disposable);
        assert_eq!(flags.risk_level, RiskLevel::High);
    }

    #[test]
    fn hard_rejection_is_high_risk() {
        let flags = classify(
            "user@normal.com",
            "normal.com",
            &result("ko", "Mailbox does not exist", json!("mx.normal.com")),
        );
        assert!(!flags.disposable);
        assert_eq!(flags.risk_level, RiskLevel::High);
    }

    #[test]
    fn mailbox_doubt_is_medium_risk() {
        let flags = classify(
            "user@normal.com",
            "normal.com",
            &result("mb", "Cannot check mailbox", json!("mx.normal.com")),
        );
        assert_eq!(flags.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn clean_address_is_low_risk() {
        let flags = classify(
            "jane.doe@normal.com",
            "normal.com",
            &result("ok", "valid", json!("mx.normal.com")),
        );
        assert_eq!(
            flags,
            Classification {
                disposable: false,
                role_based: false,
                catch_all: false,
                mx_records: true,
                risk_level: RiskLevel::Low,
            }
        );
    }

    #[test]
    fn role_prefix_is_medium_risk() {
        let flags = classify(
            "support@normal.com",
            "normal.com",
            &result("ok", "valid", json!("mx.normal.com")),
        );
        assert!(flags.role_based);
        assert_eq!(flags.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn catch_all_message_variants() {
        for message in ["Catch-All domain", "catch all detected", "CatchAll"] {
            let flags = classify(
                "user@normal.com",
                "normal.com",
                &result("ok", message, json!("mx.normal.com")),
            );
            assert!(flags.catch_all, "expected catch_all for {message:?}");
            assert_eq!(flags.risk_level, RiskLevel::Medium);
        }
    }

    #[test]
    fn mx_failure_message_clears_mx_flag() {
        let flags = classify(
            "user@normal.com",
            "normal.com",
            &result("ko", "No MX record found", json!(true)),
        );
        assert!(!flags.mx_records);

        let flags = classify(
            "user@normal.com",
            "normal.com",
            &result("ko", "MX Error during lookup", json!(true)),
        );
        assert!(!flags.mx_records);
    }

    #[test]
    fn missing_mx_value_clears_mx_flag() {
        let mut r = result("ok", "valid", json!("mx.normal.com"));
        r.mx = None;
        let flags = classify("user@normal.com", "normal.com", &r);
        assert!(!flags.mx_records);
    }

    #[test]
    fn domain_match_is_case_insensitive() {
        let flags = classify(
            "test@MAILINATOR.com",
            "MAILINATOR.com",
            &result("ok", "valid", json!(true)),
        );
        assert!(flags.disposable);
    }

    #[test]
    fn classifier_is_deterministic() {
        let r = result("mb", "Catch-all domain", json!("mx.normal.com"));
        let first = classify("support@normal.com", "normal.com", &r);
        for _ in 0..10 {
            assert_eq!(classify("support@normal.com", "normal.com", &r), first);
        }
    }
}
