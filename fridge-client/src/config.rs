use fridge::Language;

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// Which model serves which kind of request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelConfig {
    pub analysis: String,
    pub tips: String,
    pub image: String,
    pub speech: String,
    pub voice: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            analysis: "gemini-3-pro-preview".into(),
            tips: "gemini-3-flash-preview".into(),
            image: "gemini-2.5-flash-image".into(),
            speech: "gemini-2.5-flash-preview-tts".into(),
            voice: "Kore".into(),
        }
    }
}

/// Everything needed to build a gateway. Build a new gateway when the credential changes.
#[derive(Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub api_key: String,
    pub endpoint: String,
    /// Base URL of the optional cache tier. `None` disables it.
    pub backend_url: Option<String>,
    pub models: ModelConfig,
}

impl GatewayConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: DEFAULT_ENDPOINT.into(),
            backend_url: None,
            models: ModelConfig::default(),
        }
    }

    /// Read the credential and endpoints from the environment (and `.env`).
    pub fn from_env() -> Self {
        let api_key = dotenvy::var("GEMINI_API_KEY")
            .or_else(|_| dotenvy::var("API_KEY"))
            .unwrap_or_default();
        let mut config = Self::new(api_key);
        if let Ok(endpoint) = dotenvy::var("GEMINI_ENDPOINT") {
            config.endpoint = endpoint;
        }
        config.backend_url = dotenvy::var("FRIDGE_BACKEND_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());
        config
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_backend_url(mut self, backend_url: Option<String>) -> Self {
        self.backend_url = backend_url;
        self
    }

    pub fn has_credential(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

// Never print the credential.
impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("api_key", &if self.has_credential() { "<set>" } else { "<missing>" })
            .field("endpoint", &self.endpoint)
            .field("backend_url", &self.backend_url)
            .field("models", &self.models)
            .finish()
    }
}

/// BCP-47 code passed to speech synthesis.
pub fn speech_language_code(language: Language) -> &'static str {
    match language {
        Language::En => "en-US",
        Language::Id => "id-ID",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_hides_the_key() {
        let config = GatewayConfig::new("secret-key");
        let printed = format!("{:?}", config);
        assert!(!printed.contains("secret-key"));
        assert!(printed.contains("<set>"));
        assert!(!GatewayConfig::new("  ").has_credential());
    }
}
