//! Email address helpers.
//!
//! Syntax validation happens upstream of the core; these helpers only
//! normalize and split addresses that are already RFC-shaped.

/// Normalize an email address: trim surrounding whitespace and lowercase.
#[must_use]
pub fn normalize(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

/// Split a normalized address into `(local_part, domain)`.
///
/// Splits on the last `@` so quoted local parts containing `@` still yield
/// the right domain. Returns empty parts rather than failing; callers have
/// already validated the syntax.
#[must_use]
pub fn split_parts(email: &str) -> (&str, &str) {
    match email.rsplit_once('@') {
        Some((local, domain)) => (local, domain),
        None => (email, ""),
    }
}
