//! Origin used to absolutize image URLs for one request.

use axum::http::HeaderMap;
use vitrine_core::Origin;

use super::AppState;

/// The configured public base URL when set, otherwise the scheme from
/// `X-Forwarded-Proto` (default `http`) and the request's `Host` header.
pub(super) fn request_origin(state: &AppState, headers: &HeaderMap) -> Origin {
    if let Some(base) = &state.public_base_url {
        return Origin::new(Some(base.clone()), state.media_prefix.clone());
    }

    let header = |name: &'static str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    let scheme = header("x-forwarded-proto")
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|s| s.eq_ignore_ascii_case("https") || s.eq_ignore_ascii_case("http"))
        .map_or("http", |s| if s.eq_ignore_ascii_case("https") { "https" } else { "http" });

    let base = header("host")
        .filter(|host| !host.contains(['/', ' ', '@']))
        .map(|host| format!("{scheme}://{host}"));

    Origin::new(base, state.media_prefix.clone())
}
