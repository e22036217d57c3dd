use std::time::Duration;

use thiserror::Error;

use crate::livekit::RpcCallError;
use crate::session::ParticipantError;

/// Errors that can occur while delivering an illustration to the frontend.
#[derive(Debug, Error)]
pub enum IllustrationError {
    /// The session has no room attached
    #[error("couldn't access the room")]
    NoRoom,

    /// The room has no remote participant to address
    #[error("no participants found in the room")]
    NoParticipant,

    /// The requested key is not in the catalog
    #[error("unknown illustration '{0}'")]
    UnknownIllustration(String),

    /// `show` was requested without an image URL
    #[error("an image URL is required to show an illustration")]
    MissingImageUrl,

    /// The image URL is not an absolute http(s) URL
    #[error("invalid image URL '{url}': {reason}")]
    InvalidImageUrl { url: String, reason: String },

    /// The payload could not be encoded
    #[error("failed to encode illustration payload: {0}")]
    Encode(#[source] serde_json::Error),

    /// The frontend did not answer in time
    #[error("illustration RPC timed out after {0:?}")]
    Timeout(Duration),

    /// The transport failed before a response arrived
    #[error("illustration RPC failed: {0}")]
    Transport(RpcCallError),

    /// The frontend answered with something that is not a response record
    #[error("malformed response from frontend: {0}")]
    MalformedResponse(String),

    /// The frontend answered `{"ok": false}`
    #[error("frontend rejected the illustration: {0}")]
    Rejected(String),
}

impl From<ParticipantError> for IllustrationError {
    fn from(err: ParticipantError) -> Self {
        match err {
            ParticipantError::NoRoom => IllustrationError::NoRoom,
            ParticipantError::NoParticipant => IllustrationError::NoParticipant,
        }
    }
}

impl IllustrationError {
    /// True for failures that happen before any RPC is attempted.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            IllustrationError::NoRoom
                | IllustrationError::NoParticipant
                | IllustrationError::UnknownIllustration(_)
                | IllustrationError::MissingImageUrl
                | IllustrationError::InvalidImageUrl { .. }
        )
    }
}
