use std::time::Duration;

use livekit_api::access_token::{AccessToken, AccessTokenError, VideoGrants};
use zeroize::Zeroizing;

/// Default lifetime of issued participant tokens.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(15 * 60);

/// Issues LiveKit join tokens for a single API key pair.
#[derive(Clone)]
pub struct TokenIssuer {
    api_key: String,
    api_secret: Zeroizing<String>,
    ttl: Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenIssuer {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>, ttl: Duration) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: Zeroizing::new(api_secret.into()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Token allowing `identity` to join `room_name`, publish media and data,
    /// and subscribe to others.
    pub fn participant_token(
        &self,
        identity: &str,
        name: &str,
        room_name: &str,
    ) -> Result<String, AccessTokenError> {
        AccessToken::with_api_key(&self.api_key, &self.api_secret)
            .with_identity(identity)
            .with_name(name)
            .with_grants(VideoGrants {
                room_join: true,
                room: room_name.to_string(),
                can_publish: true,
                can_subscribe: true,
                can_publish_data: true,
                ..Default::default()
            })
            .with_ttl(self.ttl)
            .to_jwt()
    }
}
