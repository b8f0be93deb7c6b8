pub mod basic_models;
pub mod cooking;
pub mod knowledge;
pub mod lists;
pub mod phrases;
pub mod scaling;
pub mod search;

pub use basic_models::{
    DietaryRestriction, Difficulty, FridgeScan, Ingredient, Language, Nutrition, Recipe, Tip,
};
