use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::Duration;

use super::events::ProviderEvent;
use crate::errors::ServiceError;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the provider signature, `t=<unix>,v1=<hex>[,v1=<hex>...]`.
pub const SIGNATURE_HEADER: &str = "stripe-signature";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("signature header missing")]
    MissingHeader,
    #[error("signature header malformed")]
    MalformedHeader,
    #[error("timestamp outside tolerance window")]
    TimestampOutOfTolerance,
    #[error("no signature matches the payload")]
    NoMatchingSignature,
    #[error("webhook secret not configured")]
    MissingSecret,
    #[error("webhook secret rejected as hmac key")]
    InvalidKey,
}

impl From<SignatureError> for ServiceError {
    fn from(err: SignatureError) -> Self {
        ServiceError::InvalidSignature(err.to_string())
    }
}

struct ParsedHeader<'a> {
    timestamp: i64,
    signatures: Vec<&'a str>,
}

fn parse_header(header: &str) -> Result<ParsedHeader<'_>, SignatureError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => {
                timestamp = Some(
                    value
                        .parse::<i64>()
                        .map_err(|_| SignatureError::MalformedHeader)?,
                );
            }
            Some(("v1", value)) => signatures.push(value),
            // Other schemes (v0 test signatures etc.) are ignored
            _ => {}
        }
    }

    match timestamp {
        Some(timestamp) if !signatures.is_empty() => Ok(ParsedHeader {
            timestamp,
            signatures,
        }),
        _ => Err(SignatureError::MalformedHeader),
    }
}

fn mac_for(secret: &str, timestamp: i64, payload: &[u8]) -> Result<HmacSha256, SignatureError> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(secret.as_bytes())
        .map_err(|_| SignatureError::InvalidKey)?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
}

/// Checks `header` against `payload` at the given unix time.
pub fn verify_signature_at(
    payload: &[u8],
    header: Option<&str>,
    secret: &str,
    tolerance: Duration,
    now: i64,
) -> Result<(), SignatureError> {
    if secret.is_empty() {
        return Err(SignatureError::MissingSecret);
    }
    let header = header.ok_or(SignatureError::MissingHeader)?;
    let parsed = parse_header(header)?;

    let age = now.saturating_sub(parsed.timestamp).unsigned_abs();
    if age > tolerance.as_secs() {
        return Err(SignatureError::TimestampOutOfTolerance);
    }

    let mac = mac_for(secret, parsed.timestamp, payload)?;
    let matched = parsed.signatures.iter().any(|candidate| {
        hex::decode(candidate)
            .map(|expected| mac.clone().verify_slice(&expected).is_ok())
            .unwrap_or(false)
    });

    if matched {
        Ok(())
    } else {
        Err(SignatureError::NoMatchingSignature)
    }
}

/// Verifies the signature and parses the event body.
///
/// Signature failures map to `ServiceError::InvalidSignature`, a verified but
/// unparseable body to `ServiceError::InvalidPayload`.
pub fn construct_event(
    payload: &[u8],
    header: Option<&str>,
    secret: &str,
    tolerance: Duration,
) -> Result<ProviderEvent, ServiceError> {
    verify_signature_at(
        payload,
        header,
        secret,
        tolerance,
        chrono::Utc::now().timestamp(),
    )?;

    serde_json::from_slice(payload)
        .map_err(|e| ServiceError::InvalidPayload(format!("invalid event json: {}", e)))
}

/// Builds a signature header for `payload`. Used by tests and local tooling
/// that replays events.
pub fn sign_payload(payload: &[u8], secret: &str, timestamp: i64) -> Result<String, SignatureError> {
    let signature = hex::encode(mac_for(secret, timestamp, payload)?.finalize().into_bytes());
    Ok(format!("t={},v1={}", timestamp, signature))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const SECRET: &str = "whsec_test";
    const TOLERANCE: Duration = Duration::from_secs(300);

    #[test]
    fn accepts_valid_signature() {
        let body = br#"{"id":"evt_1"}"#;
        let header = sign_payload(body, SECRET, 1_700_000_000).unwrap();
        assert_eq!(
            verify_signature_at(body, Some(&header), SECRET, TOLERANCE, 1_700_000_010),
            Ok(())
        );
    }

    #[test]
    fn accepts_any_matching_v1_entry() {
        let body = b"{}";
        let good = sign_payload(body, SECRET, 1_700_000_000).unwrap();
        let good_sig = good.split("v1=").nth(1).unwrap();
        let header = format!("t=1700000000,v1={},v1={}", "00".repeat(32), good_sig);
        assert_eq!(
            verify_signature_at(body, Some(&header), SECRET, TOLERANCE, 1_700_000_000),
            Ok(())
        );
    }

    #[test]
    fn rejects_tampered_body() {
        let header = sign_payload(br#"{"amount":6497}"#, SECRET, 1_700_000_000).unwrap();
        assert_matches!(
            verify_signature_at(
                br#"{"amount":1}"#,
                Some(&header),
                SECRET,
                TOLERANCE,
                1_700_000_000
            ),
            Err(SignatureError::NoMatchingSignature)
        );
    }

    #[test]
    fn rejects_wrong_secret() {
        let body = b"{}";
        let header = sign_payload(body, "whsec_other", 1_700_000_000).unwrap();
        assert_matches!(
            verify_signature_at(body, Some(&header), SECRET, TOLERANCE, 1_700_000_000),
            Err(SignatureError::NoMatchingSignature)
        );
    }

    #[test]
    fn rejects_stale_timestamp() {
        let body = b"{}";
        let header = sign_payload(body, SECRET, 1_700_000_000).unwrap();
        assert_matches!(
            verify_signature_at(body, Some(&header), SECRET, TOLERANCE, 1_700_000_301),
            Err(SignatureError::TimestampOutOfTolerance)
        );
    }

    #[test]
    fn rejects_missing_or_malformed_header() {
        assert_matches!(
            verify_signature_at(b"{}", None, SECRET, TOLERANCE, 0),
            Err(SignatureError::MissingHeader)
        );
        assert_matches!(
            verify_signature_at(b"{}", Some("garbage"), SECRET, TOLERANCE, 0),
            Err(SignatureError::MalformedHeader)
        );
        assert_matches!(
            verify_signature_at(b"{}", Some("t=abc,v1=00"), SECRET, TOLERANCE, 0),
            Err(SignatureError::MalformedHeader)
        );
    }

    #[test]
    fn rejects_when_secret_unset() {
        let header = sign_payload(b"{}", "", 0).unwrap();
        assert_matches!(
            verify_signature_at(b"{}", Some(&header), "", TOLERANCE, 0),
            Err(SignatureError::MissingSecret)
        );
    }

    #[test]
    fn signing_accepts_keys_of_any_length() {
        let long_secret = "k".repeat(512);
        let header = sign_payload(b"{}", &long_secret, 1_700_000_000).unwrap();
        assert_eq!(
            verify_signature_at(b"{}", Some(&header), &long_secret, TOLERANCE, 1_700_000_000),
            Ok(())
        );
        assert!(sign_payload(b"{}", "", 0).is_ok());
    }

    #[test]
    fn key_errors_surface_as_invalid_signature() {
        assert_matches!(
            ServiceError::from(SignatureError::InvalidKey),
            ServiceError::InvalidSignature(_)
        );
    }

    #[test]
    fn construct_event_reports_bad_json_as_payload_error() {
        let body = b"not json";
        let header = sign_payload(body, SECRET, chrono::Utc::now().timestamp()).unwrap();
        assert_matches!(
            construct_event(body, Some(&header), SECRET, TOLERANCE),
            Err(ServiceError::InvalidPayload(_))
        );
    }
}
