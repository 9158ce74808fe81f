//! Authenticated-envelope codec.
//!
//! Published payloads are wrapped in a MAC-protected opaque token before
//! transmission so subscribers can detect tampering. The broadcaster never
//! looks inside an envelope; it only calls through the [`EnvelopeCodec`]
//! capability.
//!
//! Wire format of a sealed token:
//!
//! ```text
//! {base64(payload)}.{base64(hmac_sha256(payload, key))}
//! ```

use std::fmt;

use ring::hmac;

/// Errors produced by envelope encode/decode.
#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    /// Token does not have the `{payload}.{mac}` shape.
    #[error("invalid token format")]
    InvalidFormat,
    /// A token segment is not valid base64.
    #[error("invalid base64 encoding")]
    InvalidBase64,
    /// Decoded payload is not valid UTF-8.
    #[error("payload is not valid utf-8")]
    InvalidUtf8,
    /// MAC verification failed.
    #[error("envelope authentication failed")]
    Mismatch,
}

impl From<ring::error::Unspecified> for EnvelopeError {
    fn from(_: ring::error::Unspecified) -> Self {
        Self::Mismatch
    }
}

/// Capability for sealing and unsealing opaque payload tokens.
pub trait EnvelopeCodec: Send + Sync + fmt::Debug {
    /// Seals `payload` into an opaque token.
    ///
    /// # Errors
    ///
    /// Returns an [`EnvelopeError`] if sealing fails.
    fn encode(&self, payload: &str) -> Result<String, EnvelopeError>;

    /// Verifies and unseals a token produced by [`encode`](Self::encode).
    ///
    /// # Errors
    ///
    /// Returns an [`EnvelopeError`] on malformed tokens or MAC mismatch.
    fn decode(&self, token: &str) -> Result<String, EnvelopeError>;
}

/// HMAC-SHA256 envelope codec.
///
/// Authenticates payloads without encrypting them; the payload segment is
/// base64 and therefore opaque on the wire but not confidential.
pub struct SealedCodec {
    key: hmac::Key,
}

impl fmt::Debug for SealedCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SealedCodec").finish_non_exhaustive()
    }
}

impl SealedCodec {
    /// Creates a codec from raw key material.
    #[must_use]
    pub fn new(key: &[u8]) -> Self {
        Self {
            key: hmac::Key::new(hmac::HMAC_SHA256, key),
        }
    }
}

impl EnvelopeCodec for SealedCodec {
    fn encode(&self, payload: &str) -> Result<String, EnvelopeError> {
        let mac = hmac::sign(&self.key, payload.as_bytes());
        Ok(format!(
            "{}.{}",
            fast32::base64::RFC4648_NOPAD.encode(payload.as_bytes()),
            fast32::base64::RFC4648_NOPAD.encode(mac.as_ref())
        ))
    }

    fn decode(&self, token: &str) -> Result<String, EnvelopeError> {
        let dot = token.rfind('.').ok_or(EnvelopeError::InvalidFormat)?;
        let (payload_b64, mac_b64) = token.split_at(dot);
        let mac_b64 = mac_b64.get(1..).ok_or(EnvelopeError::InvalidFormat)?;

        let payload = fast32::base64::RFC4648_NOPAD
            .decode_str(payload_b64)
            .map_err(|_| EnvelopeError::InvalidBase64)?;
        let mac = fast32::base64::RFC4648_NOPAD
            .decode_str(mac_b64)
            .map_err(|_| EnvelopeError::InvalidBase64)?;

        hmac::verify(&self.key, &payload, &mac)?;
        String::from_utf8(payload).map_err(|_| EnvelopeError::InvalidUtf8)
    }
}

/// Identity codec for tests and unsealed deployments.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainCodec;

impl EnvelopeCodec for PlainCodec {
    fn encode(&self, payload: &str) -> Result<String, EnvelopeError> {
        Ok(payload.to_string())
    }

    fn decode(&self, token: &str) -> Result<String, EnvelopeError> {
        Ok(token.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn seal_and_unseal_round_trip() {
        let codec = SealedCodec::new(b"test-key");
        let Ok(token) = codec.encode(r#"{"number":17,"color":"black"}"#) else {
            panic!("encode failed");
        };
        assert!(token.contains('.'));
        let Ok(payload) = codec.decode(&token) else {
            panic!("decode failed");
        };
        assert_eq!(payload, r#"{"number":17,"color":"black"}"#);
    }

    #[test]
    fn tampered_payload_fails_verification() {
        let codec = SealedCodec::new(b"test-key");
        let Ok(token) = codec.encode("spin result") else {
            panic!("encode failed");
        };
        let forged = codec.encode("forged result").map_or(String::new(), |t| t);
        let Some((_, mac)) = token.rsplit_once('.') else {
            panic!("token has a mac segment");
        };
        let Some((forged_payload, _)) = forged.rsplit_once('.') else {
            panic!("forged token has a mac segment");
        };
        let spliced = format!("{forged_payload}.{mac}");
        assert!(matches!(
            codec.decode(&spliced),
            Err(EnvelopeError::Mismatch)
        ));
    }

    #[test]
    fn wrong_key_fails_verification() {
        let codec = SealedCodec::new(b"key-one");
        let other = SealedCodec::new(b"key-two");
        let Ok(token) = codec.encode("payload") else {
            panic!("encode failed");
        };
        assert!(matches!(other.decode(&token), Err(EnvelopeError::Mismatch)));
    }

    #[test]
    fn malformed_token_is_rejected() {
        let codec = SealedCodec::new(b"test-key");
        assert!(matches!(
            codec.decode("no-dot-here"),
            Err(EnvelopeError::InvalidFormat)
        ));
        assert!(matches!(
            codec.decode("!!!.@@@"),
            Err(EnvelopeError::InvalidBase64)
        ));
    }
}
