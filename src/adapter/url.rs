//! Absolute URL reconstruction.
//!
//! The scheme is guessed from the `host` header alone: port `443` means
//! `https`, anything else means `http`. The real transport security is never
//! consulted, so a plaintext listener reached on port 443 resolves as
//! `https` and a TLS listener on another port resolves as `http`.

use url::Url;

/// Resolve a request-target against `host`, or against `default_origin`
/// when no usable host is present. Never fails.
pub fn resolve(target: Option<&str>, host: Option<&str>, default_origin: &Url) -> Url {
    let target = target.filter(|target| !target.is_empty()).unwrap_or("/");

    let Some(authority) = host.filter(|host| !host.is_empty()) else {
        return with_target(default_origin, target);
    };

    let scheme = infer_scheme(authority);
    match Url::parse(&format!("{scheme}://{authority}")) {
        Ok(base) if base.has_host() => with_target(&base, target),
        Ok(_) | Err(_) => {
            tracing::debug!(host = %authority, "unusable host header, using default origin");
            with_target(default_origin, target)
        }
    }
}

/// `https` when the text after the first `:` is exactly `443`.
pub fn infer_scheme(authority: &str) -> &'static str {
    match authority.split(':').nth(1) {
        Some("443") => "https",
        _ => "http",
    }
}

/// Replace path and query of `base` with the request-target.
///
/// The target is always treated as path plus query, so a target such as
/// `//other.example/x` cannot move the request to another origin.
fn with_target(base: &Url, target: &str) -> Url {
    let mut url = base.clone();
    let (path, query) = match target.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (target, None),
    };
    url.set_path(path);
    url.set_query(query);
    url.set_fragment(None);
    url
}
