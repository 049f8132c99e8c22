//! HMAC-signed, time-limited tokens.
//!
//! Wire format: `base64url(json_payload) "." base64url(hmac_sha256(first_segment))`.
//! The payload carries its own `exp` (UTC Unix seconds). Verification fails
//! closed: callers should surface every [`TokenError`] to clients with the same
//! generic message.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::Sha256;

use crate::types::Timestamp;

type HmacSha256 = Hmac<Sha256>;

/// Generic client-facing message for any token failure.
pub const INVALID_TOKEN_MESSAGE: &str = "Invalid or expired token";

/// A signed payload that carries an expiry.
pub trait Expiring {
    /// Expiration time as UTC Unix seconds.
    fn expires_at(&self) -> i64;
}

/// Reasons a token failed verification.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// Wrong segment count, bad base64, or undecodable payload.
    #[error("malformed token")]
    Malformed,
    /// Signature does not match the payload.
    #[error("token signature mismatch")]
    BadSignature,
    /// `exp` is at or before the verification time.
    #[error("token expired")]
    Expired,
    /// Signature is valid but the token was minted for another purpose.
    #[error("token purpose mismatch")]
    WrongPurpose,
}

/// Signs and verifies tokens with a single server secret.
#[derive(Clone)]
pub struct TokenCodec {
    secret: Vec<u8>,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec").finish_non_exhaustive()
    }
}

impl TokenCodec {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
        }
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.secret).expect("HMAC accepts any key length")
    }

    /// Serialize `payload` and append its signature.
    pub fn sign<T: Serialize>(&self, payload: &T) -> Result<String, serde_json::Error> {
        let json = serde_json::to_vec(payload)?;
        let body = URL_SAFE_NO_PAD.encode(json);

        let mut mac = self.mac();
        mac.update(body.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{body}.{signature}"))
    }

    /// Check the signature and expiry of `token` and return its payload.
    ///
    /// The signature is compared in constant time before the payload is
    /// parsed, so nothing attacker-controlled is deserialized unless it was
    /// signed with this codec's secret.
    pub fn verify<T>(&self, token: &str, now: Timestamp) -> Result<T, TokenError>
    where
        T: DeserializeOwned + Expiring,
    {
        let mut segments = token.split('.');
        let (Some(body), Some(signature), None) =
            (segments.next(), segments.next(), segments.next())
        else {
            return Err(TokenError::Malformed);
        };
        if body.is_empty() || signature.is_empty() {
            return Err(TokenError::Malformed);
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| TokenError::Malformed)?;

        let mut mac = self.mac();
        mac.update(body.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::BadSignature)?;

        let json = URL_SAFE_NO_PAD
            .decode(body)
            .map_err(|_| TokenError::Malformed)?;
        let payload: T = serde_json::from_slice(&json).map_err(|_| TokenError::Malformed)?;

        if payload.expires_at() <= now.timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{Duration, TimeZone, Utc};
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        movie_id: i64,
        exp: i64,
    }

    impl Expiring for Sample {
        fn expires_at(&self) -> i64 {
            self.exp
        }
    }

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    fn sample(ttl_secs: i64) -> Sample {
        Sample {
            movie_id: 7,
            exp: (now() + Duration::seconds(ttl_secs)).timestamp(),
        }
    }

    #[test]
    fn sign_then_verify_returns_payload() {
        let codec = TokenCodec::new("stream-secret");
        let token = codec.sign(&sample(60)).unwrap();

        let decoded: Sample = codec.verify(&token, now()).unwrap();
        assert_eq!(decoded, sample(60));
    }

    #[test]
    fn token_has_two_segments() {
        let codec = TokenCodec::new("stream-secret");
        let token = codec.sign(&sample(60)).unwrap();
        assert_eq!(token.split('.').count(), 2);
    }

    #[test]
    fn wrong_segment_count_is_malformed() {
        let codec = TokenCodec::new("stream-secret");
        let token = codec.sign(&sample(60)).unwrap();

        assert_matches!(codec.verify::<Sample>("abc", now()), Err(TokenError::Malformed));
        assert_matches!(
            codec.verify::<Sample>(&format!("{token}.extra"), now()),
            Err(TokenError::Malformed)
        );
        assert_matches!(codec.verify::<Sample>(".", now()), Err(TokenError::Malformed));
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let codec = TokenCodec::new("stream-secret");
        let token = codec.sign(&sample(60)).unwrap();
        let (_, signature) = token.split_once('.').unwrap();

        let forged_body = URL_SAFE_NO_PAD.encode(
            serde_json::to_vec(&Sample {
                movie_id: 8,
                exp: sample(60).exp,
            })
            .unwrap(),
        );
        let forged = format!("{forged_body}.{signature}");

        assert_matches!(codec.verify::<Sample>(&forged, now()), Err(TokenError::BadSignature));
    }

    #[test]
    fn tampered_signature_is_rejected() {
        let codec = TokenCodec::new("stream-secret");
        let token = codec.sign(&sample(60)).unwrap();
        let (body, _) = token.split_once('.').unwrap();
        let forged = format!("{body}.{}", URL_SAFE_NO_PAD.encode([0u8; 32]));

        assert_matches!(codec.verify::<Sample>(&forged, now()), Err(TokenError::BadSignature));
    }

    #[test]
    fn different_secret_is_rejected() {
        let token = TokenCodec::new("secret-alpha").sign(&sample(60)).unwrap();
        let result = TokenCodec::new("secret-bravo").verify::<Sample>(&token, now());
        assert_matches!(result, Err(TokenError::BadSignature));
    }

    #[test]
    fn expiry_boundary() {
        let codec = TokenCodec::new("stream-secret");

        let expired = codec.sign(&sample(-1)).unwrap();
        assert_matches!(codec.verify::<Sample>(&expired, now()), Err(TokenError::Expired));

        let at_now = codec.sign(&sample(0)).unwrap();
        assert_matches!(codec.verify::<Sample>(&at_now, now()), Err(TokenError::Expired));

        let one_second_left = codec.sign(&sample(1)).unwrap();
        assert!(codec.verify::<Sample>(&one_second_left, now()).is_ok());
    }

    #[test]
    fn signed_garbage_payload_is_malformed() {
        let codec = TokenCodec::new("stream-secret");
        let body = URL_SAFE_NO_PAD.encode(b"not json");
        let mut mac = codec.mac();
        mac.update(body.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        let token = format!("{body}.{signature}");
        assert_matches!(codec.verify::<Sample>(&token, now()), Err(TokenError::Malformed));
    }
}
