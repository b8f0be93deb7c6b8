use super::{prompts, AiGateway, CacheTier, GenerativeModel};
use fridge::Recipe;
use std::sync::Arc;
use tokio::task::JoinSet;

/// A generated picture for one recipe, to be merged into whichever state still holds it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePatch {
    pub recipe_id: String,
    pub image_url: String,
}

impl<M: GenerativeModel, C: CacheTier> AiGateway<M, C> {
    /// A finished-dish photo for a recipe. `None` on any failure.
    pub async fn generate_recipe_image(&self, prompt: &str, id: Option<&str>) -> Option<String> {
        self.generate_image(format!("Professional food photography of: {prompt}"), id)
            .await
    }

    /// A how-to photo for one instruction, cached under its step id.
    pub async fn generate_step_image(&self, step_text: &str, id: Option<&str>) -> Option<String> {
        self.generate_image(format!("Cooking tutorial photo: {step_text}"), id)
            .await
    }

    async fn generate_image(&self, prompt: String, id: Option<&str>) -> Option<String> {
        if let Some(id) = id {
            match self.cache.lookup_image(id.to_string()).await {
                Ok(Some(url)) => {
                    tracing::debug!("Image {} served from cache", id);
                    return Some(url);
                }
                Ok(None) => {}
                Err(e) => tracing::warn!("Image cache lookup failed for {}: {}", id, e),
            }
        }

        let response = match self
            .model
            .generate_content(self.models.image.clone(), prompts::image_request(prompt))
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Image generation failed: {}", e);
                return None;
            }
        };
        let Some(inline) = response.first_inline_data() else {
            tracing::warn!("Image generation returned no picture");
            return None;
        };
        let mime_type = if inline.mime_type.is_empty() {
            "image/png"
        } else {
            inline.mime_type.as_str()
        };
        let url = format!("data:{};base64,{}", mime_type, inline.data);

        if let Some(id) = id {
            if let Err(e) = self.cache.store_image(id.to_string(), url.clone()).await {
                tracing::warn!("Could not cache image {}: {}", id, e);
            }
        }
        Some(url)
    }
}

/// Start one illustration task per recipe. Each finishes on its own, in no particular order.
pub fn illustrate_recipes<M, C>(
    gateway: Arc<AiGateway<M, C>>,
    recipes: &[Recipe],
) -> JoinSet<Option<ImagePatch>>
where
    M: GenerativeModel + 'static,
    C: CacheTier + 'static,
{
    let mut tasks = JoinSet::new();
    for recipe in recipes {
        let gateway = gateway.clone();
        let recipe_id = recipe.id.clone();
        let prompt = recipe.illustration_prompt().to_string();
        tasks.spawn(async move {
            let image_url = gateway
                .generate_recipe_image(&prompt, Some(&recipe_id))
                .await?;
            Some(ImagePatch {
                recipe_id,
                image_url,
            })
        });
    }
    tracing::info!("Illustrating {} recipes ..", tasks.len());
    tasks
}
