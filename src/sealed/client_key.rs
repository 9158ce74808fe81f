//! Short-lived stream client keys.
//!
//! A client key is a sealed token handed to an authorized client out of
//! band. It names the channel the client may subscribe to and carries an
//! expiry; the SSE endpoint verifies it before registering a sink.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::envelope::EnvelopeCodec;
use crate::domain::ChannelId;
use crate::error::GatewayError;

/// Claims carried inside a sealed client key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientKeyClaims {
    /// Channel the key grants subscription access to.
    pub channel: String,
    /// Issuance timestamp.
    pub issued_at: DateTime<Utc>,
    /// Expiry timestamp; keys are rejected after this instant.
    pub expires_at: DateTime<Utc>,
}

/// Issues and verifies sealed stream client keys.
#[derive(Debug, Clone)]
pub struct ClientKeyIssuer {
    codec: Arc<dyn EnvelopeCodec>,
    ttl_secs: i64,
}

impl ClientKeyIssuer {
    /// Creates an issuer sealing keys through `codec` with the given
    /// lifetime.
    #[must_use]
    pub fn new(codec: Arc<dyn EnvelopeCodec>, ttl_secs: i64) -> Self {
        Self { codec, ttl_secs }
    }

    /// Issues a sealed key granting subscription access to `channel`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::EnvelopeError`] if sealing fails.
    pub fn issue(&self, channel: &ChannelId) -> Result<(String, DateTime<Utc>), GatewayError> {
        let issued_at = Utc::now();
        let expires_at = issued_at + chrono::Duration::seconds(self.ttl_secs);
        let claims = ClientKeyClaims {
            channel: channel.as_str().to_string(),
            issued_at,
            expires_at,
        };
        let json = serde_json::to_string(&claims)
            .map_err(|e| GatewayError::EnvelopeError(e.to_string()))?;
        let token = self
            .codec
            .encode(&json)
            .map_err(|e| GatewayError::EnvelopeError(e.to_string()))?;
        Ok((token, expires_at))
    }

    /// Verifies a sealed key against the channel being subscribed.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidClientKey`] if the token fails MAC
    /// verification, names a different channel, or has expired.
    pub fn verify(&self, token: &str, channel: &ChannelId) -> Result<ClientKeyClaims, GatewayError> {
        let json = self
            .codec
            .decode(token)
            .map_err(|e| GatewayError::InvalidClientKey(e.to_string()))?;
        let claims: ClientKeyClaims = serde_json::from_str(&json)
            .map_err(|_| GatewayError::InvalidClientKey("malformed claims".to_string()))?;

        if claims.channel != channel.as_str() {
            return Err(GatewayError::InvalidClientKey(
                "key not valid for this channel".to_string(),
            ));
        }
        if claims.expires_at < Utc::now() {
            return Err(GatewayError::InvalidClientKey("expired".to_string()));
        }
        Ok(claims)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::sealed::envelope::SealedCodec;

    fn issuer(ttl_secs: i64) -> ClientKeyIssuer {
        ClientKeyIssuer::new(Arc::new(SealedCodec::new(b"test-key")), ttl_secs)
    }

    fn channel(name: &str) -> ChannelId {
        let Ok(id) = ChannelId::new(name) else {
            panic!("valid channel");
        };
        id
    }

    #[test]
    fn issued_key_verifies_for_its_channel() {
        let issuer = issuer(3600);
        let table = channel("table-7");
        let Ok((token, expires_at)) = issuer.issue(&table) else {
            panic!("issue failed");
        };
        assert!(expires_at > Utc::now());

        let Ok(claims) = issuer.verify(&token, &table) else {
            panic!("verify failed");
        };
        assert_eq!(claims.channel, "table-7");
    }

    #[test]
    fn key_is_rejected_for_a_different_channel() {
        let issuer = issuer(3600);
        let Ok((token, _)) = issuer.issue(&channel("table-7")) else {
            panic!("issue failed");
        };
        assert!(issuer.verify(&token, &channel("table-9")).is_err());
    }

    #[test]
    fn expired_key_is_rejected() {
        let issuer = issuer(-1);
        let table = channel("table-7");
        let Ok((token, _)) = issuer.issue(&table) else {
            panic!("issue failed");
        };
        assert!(issuer.verify(&token, &table).is_err());
    }

    #[test]
    fn garbage_token_is_rejected() {
        let issuer = issuer(3600);
        assert!(issuer.verify("not-a-token", &channel("table-7")).is_err());
    }
}
