use super::llm::{
    Content, GenerateRequest, GenerationConfig, ImageConfig, Part, PrebuiltVoiceConfig,
    SpeechConfig, VoiceConfig,
};
use super::schema;
use crate::config::speech_language_code;
use fridge::{DietaryRestriction, Language};
use itertools::Itertools;

const JSON_MIME: &str = "application/json";

fn diet_line(dietary: &[DietaryRestriction]) -> String {
    let restrictions = dietary
        .iter()
        .filter(|d| **d != DietaryRestriction::None)
        .unique()
        .join(", ");
    if restrictions.is_empty() {
        String::new()
    } else {
        format!("Every recipe MUST respect these dietary restrictions: {restrictions}.")
    }
}

/// The request that turns a fridge photo into detected ingredients and recipes.
pub fn fridge_scan_request(
    image_base64: &str,
    mime_type: &str,
    dietary: &[DietaryRestriction],
    language: Language,
) -> GenerateRequest {
    let prompt_template = include_str!("../prompts/analyze-fridge.md");
    let instruction = prompt_template
        .replace("{diet}", &diet_line(dietary))
        .replace("{language}", language.prompt_name());
    tracing::debug!("System instruction: {}", instruction);
    GenerateRequest {
        system_instruction: Some(Content::new(vec![Part::text(instruction)])),
        contents: vec![Content::new(vec![
            Part::inline(mime_type, image_base64),
            Part::text("Analyze fridge and suggest recipes in JSON."),
        ])],
        generation_config: Some(GenerationConfig {
            response_mime_type: Some(JSON_MIME.into()),
            response_schema: Some(schema::fridge_scan_schema()),
            ..Default::default()
        }),
    }
}

/// A 16:9 image generation request.
pub fn image_request(prompt: String) -> GenerateRequest {
    GenerateRequest {
        generation_config: Some(GenerationConfig {
            image_config: Some(ImageConfig {
                aspect_ratio: "16:9".into(),
            }),
            ..Default::default()
        }),
        ..GenerateRequest::single(vec![Part::text(prompt)])
    }
}

pub fn tips_request(
    ingredients: &[String],
    recipe_title: Option<&str>,
    language: Language,
) -> GenerateRequest {
    let prompt_template = include_str!("../prompts/chef-tips.md");
    let dish = recipe_title
        .map(|title| format!(" The dish being cooked is {title}."))
        .unwrap_or_default();
    let prompt = prompt_template
        .replace("{ingredients}", &format!("[{}]", ingredients.join(", ")))
        .replace("{dish}", &dish)
        .replace("{language}", language.prompt_name());
    tracing::debug!("Prompt: {}", prompt);
    GenerateRequest {
        generation_config: Some(GenerationConfig {
            response_mime_type: Some(JSON_MIME.into()),
            response_schema: Some(schema::tips_schema()),
            ..Default::default()
        }),
        ..GenerateRequest::single(vec![Part::text(prompt)])
    }
}

pub fn speech_request(text: &str, voice: &str, language: Language) -> GenerateRequest {
    GenerateRequest {
        generation_config: Some(GenerationConfig {
            response_modalities: Some(vec!["AUDIO".into()]),
            speech_config: Some(SpeechConfig {
                voice_config: VoiceConfig {
                    prebuilt_voice_config: PrebuiltVoiceConfig {
                        voice_name: voice.to_string(),
                    },
                },
                language_code: Some(speech_language_code(language).into()),
            }),
            ..Default::default()
        }),
        ..GenerateRequest::single(vec![Part::text(text)])
    }
}
