//! Domain token validation.
//!
//! Purely syntactic checks; no DNS or registry lookups. Callers are
//! expected to lower-case tokens first - the validator never folds case.

/// Upper length bound for a hostname (RFC 1035 inspired).
pub const MAX_DOMAIN_LEN: usize = 253;

/// Shortest accepted domain token, e.g. `a.b`.
pub const MIN_DOMAIN_LEN: usize = 3;

/// Check whether a token is a syntactically valid lowercase domain.
///
/// Returns false instead of failing on any violation: length outside
/// [3, 253], characters outside `[a-z0-9.-]`, leading or trailing dot,
/// or an empty label (`..`).
pub fn is_valid_domain(token: &str) -> bool {
    if token.len() < MIN_DOMAIN_LEN || token.len() > MAX_DOMAIN_LEN {
        return false;
    }

    if token.starts_with('.') || token.ends_with('.') {
        return false;
    }

    if token.contains("..") {
        return false;
    }

    token
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'.' || b == b'-')
}
