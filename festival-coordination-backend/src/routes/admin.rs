use headers::authorization::Bearer;
use headers::{Authorization, HeaderMapExt as _};
use hmac::{Hmac, Mac};
use http::{HeaderMap, StatusCode};
use serde::Serialize;
use sha2::Sha256;
use tracing::{info, warn};

use super::{json, AdminResource, ApiResponse};
use crate::error::AppError;
use crate::FestivalState;

type HmacSha256 = Hmac<Sha256>;

/// Compares in constant time by checking both tokens' MACs under the
/// expected token as key.
fn token_matches(expected: &str, provided: &str) -> bool {
    let Ok(mut mac) = HmacSha256::new_from_slice(expected.as_bytes()) else {
        return false;
    };
    let reference = mac.clone().chain_update(expected.as_bytes()).finalize().into_bytes();
    mac.update(provided.as_bytes());
    mac.verify_slice(&reference).is_ok()
}

/// Admin routes are closed unless an `admin_token` is configured.
fn authorize(state: &FestivalState, headers: &HeaderMap) -> Result<(), AppError> {
    let Some(expected) = state.config.admin_token.as_deref() else {
        warn!("rejecting admin request, no admin token is configured");
        return Err(AppError::Unauthorized);
    };
    match headers.typed_get::<Authorization<Bearer>>() {
        Some(Authorization(bearer)) if token_matches(expected, bearer.token()) => Ok(()),
        _ => Err(AppError::Unauthorized),
    }
}

#[derive(Serialize)]
struct Deleted {
    deleted: i64,
}

pub async fn delete(
    state: &FestivalState,
    headers: &HeaderMap,
    resource: AdminResource,
    id: &str,
) -> Result<ApiResponse, AppError> {
    authorize(state, headers)?;
    let id: i64 = id.parse().map_err(|_| AppError::InvalidId(id.to_owned()))?;
    let (deleted, what) = match resource {
        AdminResource::Bookings => (state.gateway.try_delete_booking(id).await?, "booking"),
        AdminResource::Nominations => (
            state.gateway.try_delete_event_nomination(id).await?,
            "nomination",
        ),
        AdminResource::Bhog => (
            state.gateway.try_delete_bhog_nomination(id).await?,
            "bhog nomination",
        ),
    };
    if !deleted {
        return Err(AppError::NotFound(format!("{what} {id}")));
    }
    info!("admin deleted {what} {id}");
    json(StatusCode::OK, &Deleted { deleted: id })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_exact_token_matches() {
        assert!(token_matches("s3cret", "s3cret"));
        assert!(!token_matches("s3cret", "s3cre"));
        assert!(!token_matches("s3cret", "s3cret "));
        assert!(!token_matches("s3cret", ""));
    }
}
