use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Unknown difficulty: {0}")]
    UnknownDifficulty(String),
    #[error("Unknown language code: {0}")]
    UnknownLanguage(String),
    #[error("Unknown dietary restriction: {0}")]
    UnknownDiet(String),
}

/// Servings assumed when the service omits a usable default.
pub const DEFAULT_SERVINGS: u32 = 2;

/// A recipe exactly as the generative service proposed it.
///
/// The JSON field names follow the response schema the service is asked to
/// fill, which is why they are camelCase on the wire.
#[derive(Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    pub difficulty: Difficulty,
    pub prep_time: String,
    pub calories: f64,
    pub nutrition: Nutrition,
    #[serde(default)]
    pub estimated_cost: f64,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub image_prompt: String,
    #[serde(default = "default_servings")]
    pub default_servings: u32,
}

fn default_servings() -> u32 {
    DEFAULT_SERVINGS
}

impl Recipe {
    /// The serving count the amounts were written for, never zero.
    pub fn base_servings(&self) -> u32 {
        if self.default_servings == 0 {
            DEFAULT_SERVINGS
        } else {
            self.default_servings
        }
    }

    /// The generated image if there is one, otherwise a stock photo seeded by the id.
    pub fn display_image_url(&self) -> String {
        if self.image_url.is_empty() {
            format!("https://loremflickr.com/400/300/food,{}", self.id)
        } else {
            self.image_url.clone()
        }
    }

    /// The text handed to image generation for this recipe.
    pub fn illustration_prompt(&self) -> &str {
        if self.image_prompt.trim().is_empty() {
            &self.title
        } else {
            &self.image_prompt
        }
    }

    /// Names of the ingredients the user does not have yet.
    pub fn missing_ingredients(&self) -> impl Iterator<Item = &str> {
        self.ingredients
            .iter()
            .filter(|i| !i.owned)
            .map(|i| i.name.as_str())
    }
}

// Image urls are usually whole base64 data urls, so keep them out of debug output.
impl std::fmt::Debug for Recipe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recipe")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("difficulty", &self.difficulty)
            .field("prep_time", &self.prep_time)
            .field("calories", &self.calories)
            .field("ingredients", &self.ingredients)
            .field("steps", &self.steps.len())
            .field("image_url", &self.image_url.len())
            .field("default_servings", &self.default_servings)
            .finish()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Ingredient {
    pub name: String,
    pub amount: String,
    #[serde(default)]
    pub owned: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Default)]
pub struct Nutrition {
    pub protein: f64,
    pub fat: f64,
    pub carbs: f64,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Serialize for Difficulty {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.into())
    }
}

impl<'de> Deserialize<'de> for Difficulty {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        match label.trim().parse::<Difficulty>() {
            Ok(difficulty) => Ok(difficulty),
            Err(_) => Err(serde::de::Error::custom(ModelError::UnknownDifficulty(
                label,
            ))),
        }
    }
}

/// The two languages prompts and phrases are available in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, EnumIter, IntoStaticStr,
)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    #[strum(serialize = "en")]
    En,
    #[serde(rename = "id")]
    #[strum(serialize = "id")]
    Id,
}

impl Language {
    pub fn code(self) -> &'static str {
        self.into()
    }

    /// The name used inside prompts.
    pub fn prompt_name(self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Id => "Indonesian",
        }
    }

    /// Parse a stored code, falling back to English for anything unknown.
    pub fn from_code_or_default(code: &str) -> Self {
        code.parse().unwrap_or_default()
    }
}

impl std::str::FromStr for Language {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Language::En),
            "id" => Ok(Language::Id),
            _ => Err(ModelError::UnknownLanguage(s.to_string())),
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[strum(ascii_case_insensitive)]
pub enum DietaryRestriction {
    #[default]
    None,
    Vegetarian,
    Vegan,
    Keto,
    Paleo,
    #[serde(rename = "Gluten-Free")]
    #[strum(to_string = "Gluten-Free", serialize = "GlutenFree")]
    GlutenFree,
    #[serde(rename = "Dairy-Free")]
    #[strum(to_string = "Dairy-Free", serialize = "DairyFree")]
    DairyFree,
}

impl DietaryRestriction {
    pub fn parse(label: &str) -> Result<Self, ModelError> {
        label
            .trim()
            .parse()
            .map_err(|_| ModelError::UnknownDiet(label.to_string()))
    }
}

/// What a fridge scan produces: the ingredients seen and the recipes proposed.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct FridgeScan {
    #[serde(default)]
    pub detected_ingredients: Vec<String>,
    #[serde(default)]
    pub recipes: Vec<Recipe>,
}

impl FridgeScan {
    pub fn is_empty(&self) -> bool {
        self.detected_ingredients.is_empty() && self.recipes.is_empty()
    }
}

/// A short piece of cooking advice.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Tip {
    pub title: String,
    pub content: String,
}
