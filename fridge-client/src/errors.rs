pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

/// Substrings the generative service uses when the credential is missing or wrong.
const CREDENTIAL_MARKERS: &[&str] = &[
    "requested entity was not found",
    "entity was not found",
    "api key not valid",
    "api_key_invalid",
    "permission_denied",
    "unauthenticated",
    "missing api key",
];

#[derive(thiserror::Error, Debug)]
pub enum GatewayError {
    #[error("Credential rejected: {0}")]
    Unauthorized(String),
    #[error("Generative service returned {status}: {body}")]
    Service { status: u16, body: String },
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Malformed response: {0}")]
    Malformed(String),
    #[error("Cache tier error: {0}")]
    Cache(String),
}

impl GatewayError {
    /// Classify a non-success HTTP answer from the generative service.
    pub fn from_status(status: u16, body: String) -> Self {
        if status == 401 || status == 403 || mentions_credential(&body) {
            GatewayError::Unauthorized(body)
        } else {
            GatewayError::Service { status, body }
        }
    }

    /// Whether the user should be asked for a (new) credential rather than to retry.
    ///
    /// The service does not report this reliably through status codes, so the
    /// message text is inspected as well.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, GatewayError::Unauthorized(_)) || mentions_credential(&self.to_string())
    }
}

fn mentions_credential(message: &str) -> bool {
    let message = message.to_lowercase();
    CREDENTIAL_MARKERS
        .iter()
        .any(|marker| message.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_and_messages_mark_credential_failures() {
        assert!(GatewayError::from_status(401, "nope".into()).is_unauthorized());
        assert!(GatewayError::from_status(403, String::new()).is_unauthorized());
        assert!(GatewayError::from_status(
            404,
            r#"{"error":{"message":"Requested entity was not found."}}"#.into()
        )
        .is_unauthorized());
        assert!(GatewayError::from_status(
            400,
            r#"{"error":{"message":"API key not valid. Please pass a valid API key."}}"#.into()
        )
        .is_unauthorized());
    }

    #[test]
    fn other_failures_are_retryable() {
        let err = GatewayError::from_status(500, "internal".into());
        assert!(matches!(err, GatewayError::Service { status: 500, .. }));
        assert!(!err.is_unauthorized());
        assert!(!GatewayError::Malformed("bad json".into()).is_unauthorized());
    }
}
