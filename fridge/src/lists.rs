use crate::basic_models::Recipe;
use serde::{Deserialize, Serialize};

/// Saved recipes, keyed by recipe id, in the order they were saved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Recipe>", into = "Vec<Recipe>")]
pub struct Favorites {
    recipes: Vec<Recipe>,
}

impl Favorites {
    pub fn new(recipes: Vec<Recipe>) -> Self {
        let mut favorites = Self::default();
        for recipe in recipes {
            if !favorites.contains(&recipe.id) {
                favorites.recipes.push(recipe);
            }
        }
        favorites
    }

    pub fn contains(&self, recipe_id: &str) -> bool {
        self.recipes.iter().any(|r| r.id == recipe_id)
    }

    /// Add the recipe if absent, remove it if present. Returns whether it is now a favorite.
    pub fn toggle(&mut self, recipe: &Recipe) -> bool {
        if self.contains(&recipe.id) {
            self.recipes.retain(|r| r.id != recipe.id);
            false
        } else {
            self.recipes.push(recipe.clone());
            true
        }
    }

    pub fn get(&self, recipe_id: &str) -> Option<&Recipe> {
        self.recipes.iter().find(|r| r.id == recipe_id)
    }

    pub fn as_slice(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}

impl From<Vec<Recipe>> for Favorites {
    fn from(recipes: Vec<Recipe>) -> Self {
        Self::new(recipes)
    }
}

impl From<Favorites> for Vec<Recipe> {
    fn from(favorites: Favorites) -> Self {
        favorites.recipes
    }
}

/// Ingredient names to buy. Behaves like a set that remembers insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct ShoppingList {
    items: Vec<String>,
}

impl ShoppingList {
    pub fn new(items: Vec<String>) -> Self {
        let mut list = Self::default();
        for item in items {
            list.add(item);
        }
        list
    }

    /// Append an item unless the exact name is already listed.
    pub fn add(&mut self, item: impl Into<String>) -> bool {
        let item = item.into();
        if self.items.contains(&item) {
            return false;
        }
        self.items.push(item);
        true
    }

    /// Remove the entry at `index`, keeping the others in order.
    pub fn remove(&mut self, index: usize) -> Option<String> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl From<Vec<String>> for ShoppingList {
    fn from(items: Vec<String>) -> Self {
        Self::new(items)
    }
}

impl From<ShoppingList> for Vec<String> {
    fn from(list: ShoppingList) -> Self {
        list.items
    }
}
