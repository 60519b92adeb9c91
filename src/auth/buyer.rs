use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::debug;

use crate::errors::ServiceError;
use crate::AppState;

/// Email of the authenticated buyer.
///
/// Authentication itself happens upstream (gateway or identity proxy); this
/// extractor reads the verified email from the configured header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuyerIdentity {
    pub email: String,
}

fn parse_email(raw: &str) -> Option<String> {
    let email = raw.trim();
    let (local, domain) = email.split_once('@')?;
    if local.is_empty() || domain.is_empty() || email.len() > 254 {
        return None;
    }
    Some(email.to_ascii_lowercase())
}

#[axum::async_trait]
impl FromRequestParts<AppState> for BuyerIdentity {
    type Rejection = ServiceError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = state.config.buyer_identity_header.as_str();
        let email = parts
            .headers
            .get(header)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_email)
            .ok_or_else(|| {
                debug!(header, "Request without buyer identity");
                ServiceError::Unauthorized("buyer identity required".to_string())
            })?;

        Ok(BuyerIdentity { email })
    }
}
