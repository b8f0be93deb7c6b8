use crate::config::{GatewayConfig, ModelConfig};
use crate::errors::GatewayResult;
use anyhow::{Context, Result};
use base64::Engine;
use fridge::{DietaryRestriction, FridgeScan, Language, Tip};
use sha2::{Digest, Sha256};
use std::path::Path;
pub mod cache;
pub mod illustrate;
pub mod llm;
pub mod prompts;
pub mod schema;
pub mod speech;

pub use cache::{CacheTier, HttpCacheTier, NoCache};
pub use illustrate::{illustrate_recipes, ImagePatch};
pub use llm::{GeminiClient, GenerativeModel};
pub use speech::{play_wav, SpeechAudio};

#[cfg(test)]
pub use cache::MockCacheTier;
#[cfg(test)]
pub use llm::MockGenerativeModel;

/// How many leading base64 characters feed the scan cache key.
const CACHE_KEY_PREFIX: usize = 100;

/// Cache key of a fridge photo: hex SHA-256 of the start of its base64 text.
pub fn scan_cache_key(image_base64: &str) -> String {
    let prefix: String = image_base64.chars().take(CACHE_KEY_PREFIX).collect();
    hex::encode(Sha256::digest(prefix.as_bytes()))
}

/// A photo ready to be sent inline.
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub mime_type: String,
    pub base64: String,
}

impl EncodedImage {
    pub fn from_bytes(bytes: &[u8], mime_type: &str) -> Self {
        Self {
            mime_type: mime_type.to_string(),
            base64: base64::engine::general_purpose::STANDARD.encode(bytes),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Could not read image {}", path.display()))?;
        let mime_type = match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("png") => "image/png",
            Some("webp") => "image/webp",
            Some("heic") => "image/heic",
            _ => "image/jpeg",
        };
        Ok(Self::from_bytes(&bytes, mime_type))
    }
}

impl std::fmt::Debug for EncodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncodedImage")
            .field("mime_type", &self.mime_type)
            .field("base64", &self.base64.len())
            .finish()
    }
}

/// Outcome of decoding the model's answer to a fridge scan.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanDecode {
    Ok(FridgeScan),
    Malformed(String),
}

pub fn decode_scan(text: &str) -> ScanDecode {
    match serde_json::from_str::<FridgeScan>(text.trim()) {
        Ok(scan) => ScanDecode::Ok(scan),
        Err(e) => ScanDecode::Malformed(e.to_string()),
    }
}

/// Every call the application makes to the generative service goes through here.
///
/// Build a new one whenever the credential changes.
pub struct AiGateway<M, C> {
    model: M,
    cache: C,
    models: ModelConfig,
}

impl AiGateway<GeminiClient, Box<dyn CacheTier>> {
    pub fn from_config(config: &GatewayConfig) -> Self {
        let cache: Box<dyn CacheTier> = match &config.backend_url {
            Some(url) => Box::new(HttpCacheTier::new(url)),
            None => Box::new(NoCache),
        };
        Self::new(GeminiClient::new(config), cache, config.models.clone())
    }
}

impl<M: GenerativeModel, C: CacheTier> AiGateway<M, C> {
    pub fn new(model: M, cache: C, models: ModelConfig) -> Self {
        Self {
            model,
            cache,
            models,
        }
    }

    /// Detect ingredients in a fridge photo and propose recipes for them.
    ///
    /// Consults the cache tier first. A response that cannot be decoded yields
    /// an empty scan; only a failed generation call is an error.
    pub async fn analyze_fridge_and_suggest_recipes(
        &self,
        image: &EncodedImage,
        dietary: &[DietaryRestriction],
        language: Language,
    ) -> GatewayResult<FridgeScan> {
        let hash = scan_cache_key(&image.base64);
        match self.cache.lookup_scan(hash.clone()).await {
            Ok(Some(scan)) => {
                tracing::info!("Fridge scan {} served from cache", hash);
                return Ok(scan);
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Cache lookup failed, analyzing anyway: {}", e),
        }

        tracing::info!("Analyzing fridge ..");
        let request =
            prompts::fridge_scan_request(&image.base64, &image.mime_type, dietary, language);
        let response = self
            .model
            .generate_content(self.models.analysis.clone(), request)
            .await?;

        let scan = match decode_scan(response.text().as_deref().unwrap_or_default()) {
            ScanDecode::Ok(scan) => scan,
            ScanDecode::Malformed(reason) => {
                tracing::warn!("Unusable fridge analysis, showing no recipes: {}", reason);
                return Ok(FridgeScan::default());
            }
        };
        tracing::info!(
            "Detected {} ingredients, {} recipes",
            scan.detected_ingredients.len(),
            scan.recipes.len()
        );

        if let Err(e) = self.cache.store_scan(hash, scan.clone()).await {
            tracing::warn!("Could not cache fridge scan: {}", e);
        }
        Ok(scan)
    }

    /// Ask for chef tips about the given ingredients. Any failure yields no tips.
    pub async fn generate_dynamic_tips(
        &self,
        ingredients: &[String],
        recipe_title: Option<&str>,
        language: Language,
    ) -> Vec<Tip> {
        let request = prompts::tips_request(ingredients, recipe_title, language);
        let text = match self
            .model
            .generate_content(self.models.tips.clone(), request)
            .await
        {
            Ok(response) => response.text().unwrap_or_default(),
            Err(e) => {
                tracing::warn!("Tip generation failed: {}", e);
                return vec![];
            }
        };
        serde_json::from_str::<Vec<Tip>>(text.trim()).unwrap_or_else(|e| {
            tracing::warn!("Discarding unparseable tips: {}", e);
            vec![]
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::llm::{Candidate, Content, GenerateResponse, Part};
    use fridge::{Difficulty, Ingredient, Nutrition, Recipe};

    pub fn text_response(text: &str) -> GenerateResponse {
        GenerateResponse {
            candidates: vec![Candidate {
                content: Content::new(vec![Part::text(text)]),
            }],
        }
    }

    pub fn inline_response(mime_type: &str, data: &str) -> GenerateResponse {
        GenerateResponse {
            candidates: vec![Candidate {
                content: Content::new(vec![Part::inline(mime_type, data)]),
            }],
        }
    }

    pub fn recipe(id: &str, title: &str, steps: &[&str]) -> Recipe {
        Recipe {
            id: id.into(),
            title: title.into(),
            summary: String::new(),
            difficulty: Difficulty::Medium,
            prep_time: "20 minutes".into(),
            calories: 350.0,
            nutrition: Nutrition::default(),
            estimated_cost: 4.5,
            ingredients: vec![
                Ingredient {
                    name: "Egg".into(),
                    amount: "2 pcs".into(),
                    owned: true,
                },
                Ingredient {
                    name: "Spinach".into(),
                    amount: "1 cup".into(),
                    owned: false,
                },
            ],
            steps: steps.iter().map(|s| s.to_string()).collect(),
            image_url: String::new(),
            image_prompt: format!("{title} on a plate"),
            default_servings: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::errors::GatewayError;
    use mockall::predicate::eq;

    fn photo() -> EncodedImage {
        EncodedImage::from_bytes(b"not really a jpeg but close enough", "image/jpeg")
    }

    fn scan() -> FridgeScan {
        FridgeScan {
            detected_ingredients: vec!["Egg".into()],
            recipes: vec![recipe("r1", "Omelette", &["Whisk", "Fry 3 minutes"])],
        }
    }

    #[test]
    fn cache_key_uses_only_the_prefix() {
        let base: String = "A".repeat(100);
        let key = scan_cache_key(&base);
        assert_eq!(key.len(), 64);
        assert_eq!(key, scan_cache_key(&format!("{base}different tail")));
        assert_ne!(key, scan_cache_key(&"B".repeat(100)));
    }

    #[test]
    fn malformed_scans_are_distinguished() {
        assert!(matches!(decode_scan("not json"), ScanDecode::Malformed(_)));
        assert!(matches!(
            decode_scan(r#"{"recipes": [{"id": 1}]}"#),
            ScanDecode::Malformed(_)
        ));
        assert_eq!(
            decode_scan(r#"{"detectedIngredients": ["Egg"], "recipes": []}"#),
            ScanDecode::Ok(FridgeScan {
                detected_ingredients: vec!["Egg".into()],
                recipes: vec![]
            })
        );
    }

    #[tokio::test]
    async fn cache_hit_skips_generation() {
        let mut model = MockGenerativeModel::new();
        model.expect_generate_content().never();
        let mut cache = MockCacheTier::new();
        let cached = scan();
        let expected = cached.clone();
        cache
            .expect_lookup_scan()
            .with(eq(scan_cache_key(&photo().base64)))
            .times(1)
            .returning(move |_| Ok(Some(cached.clone())));
        cache.expect_store_scan().never();

        let gateway = AiGateway::new(model, cache, ModelConfig::default());
        let result = gateway
            .analyze_fridge_and_suggest_recipes(&photo(), &[], Language::En)
            .await
            .unwrap();
        assert_eq!(result, expected);
    }

    #[tokio::test]
    async fn miss_generates_and_stores() {
        let payload = serde_json::to_string(&scan()).unwrap();
        let mut model = MockGenerativeModel::new();
        model
            .expect_generate_content()
            .withf(|model, _| model == "gemini-3-pro-preview")
            .times(1)
            .returning(move |_, _| Ok(text_response(&payload)));
        let mut cache = MockCacheTier::new();
        cache.expect_lookup_scan().returning(|_| Ok(None));
        cache
            .expect_store_scan()
            .withf(|_, scan| scan.recipes.len() == 1)
            .times(1)
            .returning(|_, _| Ok(()));

        let gateway = AiGateway::new(model, cache, ModelConfig::default());
        let result = gateway
            .analyze_fridge_and_suggest_recipes(&photo(), &[DietaryRestriction::Keto], Language::En)
            .await
            .unwrap();
        assert_eq!(result, scan());
    }

    #[tokio::test]
    async fn cache_failures_never_fail_the_scan() {
        let payload = serde_json::to_string(&scan()).unwrap();
        let mut model = MockGenerativeModel::new();
        model
            .expect_generate_content()
            .returning(move |_, _| Ok(text_response(&payload)));
        let mut cache = MockCacheTier::new();
        cache
            .expect_lookup_scan()
            .returning(|_| Err(GatewayError::Cache("down".into())));
        cache
            .expect_store_scan()
            .returning(|_, _| Err(GatewayError::Cache("down".into())));

        let gateway = AiGateway::new(model, cache, ModelConfig::default());
        let result = gateway
            .analyze_fridge_and_suggest_recipes(&photo(), &[], Language::En)
            .await
            .unwrap();
        assert_eq!(result.recipes.len(), 1);
    }

    #[tokio::test]
    async fn malformed_answer_is_empty_and_not_cached() {
        let mut model = MockGenerativeModel::new();
        model
            .expect_generate_content()
            .returning(|_, _| Ok(text_response("Sorry, I cannot see a fridge.")));
        let mut cache = MockCacheTier::new();
        cache.expect_lookup_scan().returning(|_| Ok(None));
        cache.expect_store_scan().never();

        let gateway = AiGateway::new(model, cache, ModelConfig::default());
        let result = gateway
            .analyze_fridge_and_suggest_recipes(&photo(), &[], Language::Id)
            .await
            .unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn generation_failure_is_surfaced() {
        let mut model = MockGenerativeModel::new();
        model.expect_generate_content().returning(|_, _| {
            Err(GatewayError::from_status(
                404,
                "Requested entity was not found.".into(),
            ))
        });
        let gateway = AiGateway::new(model, NoCache, ModelConfig::default());
        let err = gateway
            .analyze_fridge_and_suggest_recipes(&photo(), &[], Language::En)
            .await
            .unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[tokio::test]
    async fn tips_are_parsed_or_dropped() {
        let mut model = MockGenerativeModel::new();
        let mut answers = vec![
            Ok(text_response(r#"[{"title": "Rest the eggs", "content": "Room temperature whisks better."}]"#)),
            Ok(text_response(r#"{"title": "not an array"}"#)),
            Err(GatewayError::Service {
                status: 500,
                body: "boom".into(),
            }),
        ]
        .into_iter();
        model
            .expect_generate_content()
            .withf(|model, _| model == "gemini-3-flash-preview")
            .times(3)
            .returning(move |_, _| answers.next().unwrap());
        let gateway = AiGateway::new(model, NoCache, ModelConfig::default());

        let ingredients = vec!["egg".to_string()];
        let tips = gateway
            .generate_dynamic_tips(&ingredients, None, Language::En)
            .await;
        assert_eq!(tips.len(), 1);
        assert_eq!(tips[0].title, "Rest the eggs");
        assert!(gateway
            .generate_dynamic_tips(&ingredients, Some("Omelette"), Language::En)
            .await
            .is_empty());
        assert!(gateway
            .generate_dynamic_tips(&ingredients, None, Language::En)
            .await
            .is_empty());
    }
}
