use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use super::error::IllustrationError;

/// Display state requested from the frontend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IllustrationState {
    Show,
    Hidden,
}

impl IllustrationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            IllustrationState::Show => "show",
            IllustrationState::Hidden => "hidden",
        }
    }
}

impl fmt::Display for IllustrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of a `client.showIllustration` request.
///
/// Serializes to `{"state":"show","image_url":"..."}` or `{"state":"hidden"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IllustrationPayload {
    pub state: IllustrationState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl IllustrationPayload {
    /// Payload that displays the image at `image_url`.
    pub fn show(image_url: &str) -> Result<Self, IllustrationError> {
        validate_image_url(image_url)?;
        Ok(Self {
            state: IllustrationState::Show,
            image_url: Some(image_url.to_string()),
        })
    }

    /// Payload that clears the current illustration.
    pub fn hidden() -> Self {
        Self {
            state: IllustrationState::Hidden,
            image_url: None,
        }
    }

    /// Build a payload for an arbitrary state. An image URL passed with
    /// `Hidden` is dropped.
    pub fn new(state: IllustrationState, image_url: Option<&str>) -> Result<Self, IllustrationError> {
        match state {
            IllustrationState::Show => {
                Self::show(image_url.ok_or(IllustrationError::MissingImageUrl)?)
            }
            IllustrationState::Hidden => Ok(Self::hidden()),
        }
    }

    /// Parse a payload the way the receiving side does.
    pub fn from_json(raw: &str) -> Result<Self, IllustrationError> {
        let parsed: IllustrationPayload = serde_json::from_str(raw)
            .map_err(|e| IllustrationError::MalformedResponse(e.to_string()))?;
        Self::new(parsed.state, parsed.image_url.as_deref())
    }

    pub fn to_json(&self) -> Result<String, IllustrationError> {
        serde_json::to_string(self).map_err(IllustrationError::Encode)
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }
}

/// Frontend answer to a `client.showIllustration` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IllustrationResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl IllustrationResponse {
    pub fn accepted() -> Self {
        Self {
            ok: true,
            error: None,
        }
    }

    pub fn rejected(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(error.into()),
        }
    }

    pub fn parse(raw: &str) -> Result<Self, IllustrationError> {
        serde_json::from_str(raw).map_err(|e| IllustrationError::MalformedResponse(e.to_string()))
    }

    /// Error text reported by the frontend, or a placeholder when it sent none.
    pub fn error_message(&self) -> &str {
        self.error.as_deref().unwrap_or("Unknown error")
    }
}

/// Check that `raw` is an absolute http(s) URL with a host.
pub fn validate_image_url(raw: &str) -> Result<Url, IllustrationError> {
    let invalid = |reason: String| IllustrationError::InvalidImageUrl {
        url: raw.to_string(),
        reason,
    };

    let parsed = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(format!(
            "scheme must be http or https, got {}",
            parsed.scheme()
        )));
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(invalid("URL must have a host".to_string()));
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    const IMAGE: &str = "https://example.com/image.png";

    #[test]
    fn test_show_payload_has_exact_shape() {
        let payload = IllustrationPayload::show(IMAGE).unwrap();
        let value: Value = serde_json::from_str(&payload.to_json().unwrap()).unwrap();
        assert_eq!(value, json!({"state": "show", "image_url": IMAGE}));
    }

    #[test]
    fn test_hidden_payload_has_no_image_url() {
        let json = IllustrationPayload::hidden().to_json().unwrap();
        assert_eq!(json, r#"{"state":"hidden"}"#);
    }

    #[test]
    fn test_new_hidden_drops_image_url() {
        let payload = IllustrationPayload::new(IllustrationState::Hidden, Some(IMAGE)).unwrap();
        assert_eq!(payload.image_url(), None);
    }

    #[test]
    fn test_new_show_requires_image_url() {
        let err = IllustrationPayload::new(IllustrationState::Show, None).unwrap_err();
        assert!(matches!(err, IllustrationError::MissingImageUrl));
    }

    #[test]
    fn test_receiver_ignores_image_url_on_hidden() {
        let payload =
            IllustrationPayload::from_json(r#"{"state":"hidden","image_url":"https://x.io/a.png"}"#)
                .unwrap();
        assert_eq!(payload, IllustrationPayload::hidden());
    }

    #[test]
    fn test_receiver_recovers_show_payload() {
        let sent = IllustrationPayload::show(IMAGE).unwrap();
        let received = IllustrationPayload::from_json(&sent.to_json().unwrap()).unwrap();
        assert_eq!(received.state, IllustrationState::Show);
        assert_eq!(received.image_url(), Some(IMAGE));
    }

    #[test]
    fn test_receiver_rejects_unknown_state() {
        let err = IllustrationPayload::from_json(r#"{"state":"blink"}"#).unwrap_err();
        assert!(matches!(err, IllustrationError::MalformedResponse(_)));
    }

    #[test]
    fn test_invalid_image_urls() {
        for url in ["not a url", "ftp://example.com/a.png", "/relative/a.png", "file:///tmp/a.png"] {
            let err = IllustrationPayload::show(url).unwrap_err();
            assert!(
                matches!(err, IllustrationError::InvalidImageUrl { .. }),
                "expected {url} to be rejected"
            );
        }
    }

    #[test]
    fn test_http_image_url_allowed() {
        assert!(IllustrationPayload::show("http://localhost:3000/diagram.svg").is_ok());
    }

    #[test]
    fn test_state_display() {
        assert_eq!(IllustrationState::Show.to_string(), "show");
        assert_eq!(IllustrationState::Hidden.to_string(), "hidden");
    }

    #[test]
    fn test_response_parse() {
        assert_eq!(
            IllustrationResponse::parse(r#"{"ok":true}"#).unwrap(),
            IllustrationResponse::accepted()
        );

        let rejected = IllustrationResponse::parse(r#"{"ok":false,"error":"not mounted"}"#).unwrap();
        assert!(!rejected.ok);
        assert_eq!(rejected.error_message(), "not mounted");

        let bare = IllustrationResponse::parse(r#"{"ok":false}"#).unwrap();
        assert_eq!(bare.error_message(), "Unknown error");

        assert!(matches!(
            IllustrationResponse::parse("success"),
            Err(IllustrationError::MalformedResponse(_))
        ));
    }
}
