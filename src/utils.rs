use actix_web::HttpRequest;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Bearer token from the `Authorization` header, if any.
pub fn get_token(req: &HttpRequest) -> Option<&str> {
    let auth = req.headers().get("authorization")?.to_str().ok()?;
    let mut parts = auth.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(scheme), Some(token)) if scheme.eq_ignore_ascii_case("bearer") => Some(token),
        _ => None,
    }
}

pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(millis)
        .unwrap_or(0)
}

/// Saturates at `i64::MAX`.
fn millis(d: Duration) -> i64 {
    i64::try_from(d.as_millis()).unwrap_or(i64::MAX)
}
