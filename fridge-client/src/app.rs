//! The application state. It is the only thing that changes recipes,
//! favorites and the shopping list, and it writes them through to storage.
use crate::ingestion::ImagePatch;
use crate::persistence::{KeyValueStore, LocalPersistence};
use fridge::knowledge::fallback_tips;
use fridge::lists::{Favorites, ShoppingList};
use fridge::search::{filter_recipes, FilterState};
use fridge::{FridgeScan, Language, Recipe, Tip};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Home,
    Recipes,
    Favorites,
    Shopping,
}

/// What tips should be about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TipsContext {
    pub ingredients: Vec<String>,
    pub recipe_title: Option<String>,
    /// What the last scan found. Only the static tips look at it.
    pub detected: Vec<String>,
}

impl TipsContext {
    /// Every string the static tips are matched against.
    pub fn keywords(&self) -> Vec<String> {
        let mut keywords = self.detected.clone();
        keywords.extend(self.ingredients.iter().cloned());
        keywords.extend(self.recipe_title.clone());
        keywords
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TipSource {
    Generated,
    Static,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayedTip {
    pub tip: Tip,
    pub source: TipSource,
}

pub struct AppState<S> {
    persistence: LocalPersistence<S>,
    language: Language,
    view: View,
    detected_ingredients: Vec<String>,
    recipes: Vec<Recipe>,
    favorites: Favorites,
    shopping_list: ShoppingList,
    active_recipe: Option<String>,
    pub filters: FilterState,
}

impl<S: KeyValueStore> AppState<S> {
    /// Initialize from whatever was persisted last time.
    pub fn load(store: S) -> Self {
        let persistence = LocalPersistence::new(store);
        Self {
            language: persistence.load_language(),
            favorites: persistence.load_favorites(),
            shopping_list: persistence.load_shopping_list(),
            persistence,
            view: View::Home,
            detected_ingredients: vec![],
            recipes: vec![],
            active_recipe: None,
            filters: FilterState::default(),
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
        self.persistence.save_language(language);
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn set_view(&mut self, view: View) {
        self.view = view;
    }

    pub fn detected_ingredients(&self) -> &[String] {
        &self.detected_ingredients
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn favorites(&self) -> &Favorites {
        &self.favorites
    }

    pub fn shopping_list(&self) -> &ShoppingList {
        &self.shopping_list
    }

    /// Replace the previous scan. Favorites keep their own copies.
    pub fn apply_scan(&mut self, scan: FridgeScan) {
        self.detected_ingredients = scan.detected_ingredients;
        self.recipes = scan.recipes;
        self.active_recipe = None;
        self.view = View::Recipes;
    }

    /// Set one recipe's picture. Patches for recipes no longer shown are ignored.
    pub fn apply_image_patch(&mut self, patch: &ImagePatch) -> bool {
        match self.recipes.iter_mut().find(|r| r.id == patch.recipe_id) {
            Some(recipe) => {
                recipe.image_url = patch.image_url.clone();
                true
            }
            None => {
                tracing::debug!("Dropping image for vanished recipe {}", patch.recipe_id);
                false
            }
        }
    }

    /// The collection a view lists recipes from.
    pub fn collection(&self, view: View) -> &[Recipe] {
        match view {
            View::Favorites => self.favorites.as_slice(),
            _ => &self.recipes,
        }
    }

    /// The recipes of a view that pass the current filters, in their original order.
    pub fn visible_recipes(&self, view: View, query: &str) -> Vec<&Recipe> {
        filter_recipes(self.collection(view), query, self.filters.max_prep_time)
    }

    fn find_recipe(&self, recipe_id: &str) -> Option<&Recipe> {
        self.recipes
            .iter()
            .find(|r| r.id == recipe_id)
            .or_else(|| self.favorites.get(recipe_id))
    }

    /// Make a recipe of the given view the active one.
    pub fn select_recipe(&mut self, view: View, recipe_id: &str) -> Option<&Recipe> {
        let found = self.collection(view).iter().any(|r| r.id == recipe_id);
        if !found {
            return None;
        }
        self.view = view;
        self.active_recipe = Some(recipe_id.to_string());
        self.active_recipe()
    }

    pub fn clear_active_recipe(&mut self) {
        self.active_recipe = None;
    }

    pub fn active_recipe(&self) -> Option<&Recipe> {
        let id = self.active_recipe.as_deref()?;
        self.collection(self.view)
            .iter()
            .find(|r| r.id == id)
            .or_else(|| self.find_recipe(id))
    }

    pub fn is_favorite(&self, recipe_id: &str) -> bool {
        self.favorites.contains(recipe_id)
    }

    /// Add or remove a recipe from favorites. Returns whether it is now a favorite.
    pub fn toggle_favorite(&mut self, recipe_id: &str) -> Option<bool> {
        let recipe = self.find_recipe(recipe_id)?.clone();
        let added = self.favorites.toggle(&recipe);
        self.persistence.save_favorites(&self.favorites);
        Some(added)
    }

    pub fn add_to_shopping_list(&mut self, item: &str) -> bool {
        let item = item.trim();
        if item.is_empty() {
            return false;
        }
        let added = self.shopping_list.add(item);
        if added {
            self.persistence.save_shopping_list(&self.shopping_list);
        }
        added
    }

    /// Add every ingredient of a recipe the user does not own. Returns how many were new.
    pub fn add_missing_ingredients(&mut self, recipe_id: &str) -> usize {
        let Some(recipe) = self.find_recipe(recipe_id) else {
            return 0;
        };
        let missing: Vec<String> = recipe.missing_ingredients().map(str::to_string).collect();
        let added = missing
            .into_iter()
            .filter(|name| self.shopping_list.add(name.clone()))
            .count();
        if added > 0 {
            self.persistence.save_shopping_list(&self.shopping_list);
        }
        added
    }

    pub fn remove_shopping_item(&mut self, index: usize) -> Option<String> {
        let removed = self.shopping_list.remove(index)?;
        self.persistence.save_shopping_list(&self.shopping_list);
        Some(removed)
    }

    pub fn clear_shopping_list(&mut self) {
        self.shopping_list.clear();
        self.persistence.save_shopping_list(&self.shopping_list);
    }

    /// The active recipe's ingredients and title, otherwise the detected ingredients.
    pub fn tips_context(&self) -> Option<TipsContext> {
        if let Some(recipe) = self.active_recipe() {
            return Some(TipsContext {
                ingredients: recipe.ingredients.iter().map(|i| i.name.clone()).collect(),
                recipe_title: Some(recipe.title.clone()),
                detected: self.detected_ingredients.clone(),
            });
        }
        if self.detected_ingredients.is_empty() {
            return None;
        }
        Some(TipsContext {
            ingredients: self.detected_ingredients.clone(),
            recipe_title: None,
            detected: Vec::new(),
        })
    }

    /// Generated tips when there are any, otherwise the static ones for the same context.
    pub fn tips_for_display(&self, context: &TipsContext, generated: Vec<Tip>) -> Vec<DisplayedTip> {
        if !generated.is_empty() {
            return generated
                .into_iter()
                .map(|tip| DisplayedTip {
                    tip,
                    source: TipSource::Generated,
                })
                .collect();
        }
        fallback_tips(&context.keywords(), self.language)
            .into_iter()
            .map(|tip| DisplayedTip {
                tip,
                source: TipSource::Static,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestion::test_support::recipe;
    use crate::persistence::{MemoryStore, FAVORITES_KEY, SHOPPING_KEY};
    use std::sync::Arc;

    /// Lets a test look inside the store after the state took ownership of it.
    #[derive(Clone, Default)]
    struct SharedStore(Arc<MemoryStore>);

    impl KeyValueStore for SharedStore {
        fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
            self.0.get(key)
        }
        fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
            self.0.set(key, value)
        }
    }

    fn scanned() -> (AppState<SharedStore>, SharedStore) {
        let store = SharedStore::default();
        let mut state = AppState::load(store.clone());
        state.apply_scan(FridgeScan {
            detected_ingredients: vec!["Egg".into(), "Tomato".into()],
            recipes: vec![
                recipe("a", "Omelette", &["Whisk"]),
                recipe("b", "Shakshuka", &["Simmer 10 minutes"]),
            ],
        });
        (state, store)
    }

    #[test]
    fn image_patches_touch_only_their_recipe() {
        let (mut state, _) = scanned();
        assert!(state.apply_image_patch(&ImagePatch {
            recipe_id: "b".into(),
            image_url: "data:image/png;base64,BB".into(),
        }));
        assert!(!state.apply_image_patch(&ImagePatch {
            recipe_id: "zzz".into(),
            image_url: "data:image/png;base64,ZZ".into(),
        }));
        assert_eq!(state.recipes()[0].image_url, "");
        assert_eq!(state.recipes()[1].image_url, "data:image/png;base64,BB");
    }

    #[test]
    fn favorites_round_trip_and_persist() {
        let (mut state, store) = scanned();
        assert_eq!(state.toggle_favorite("a"), Some(true));
        assert!(store.get(FAVORITES_KEY).unwrap().unwrap().contains("Omelette"));
        assert_eq!(state.toggle_favorite("a"), Some(false));
        assert!(state.favorites().is_empty());
        assert_eq!(state.toggle_favorite("missing"), None);

        state.toggle_favorite("b");
        let reloaded = AppState::load(store.clone());
        assert!(reloaded.is_favorite("b"));
    }

    #[test]
    fn favorites_outlive_the_scan() {
        let (mut state, _) = scanned();
        state.toggle_favorite("a");
        state.apply_scan(FridgeScan::default());
        assert!(state.recipes().is_empty());
        assert_eq!(state.visible_recipes(View::Favorites, "").len(), 1);
        assert!(state.select_recipe(View::Favorites, "a").is_some());
    }

    #[test]
    fn missing_ingredients_go_on_the_list_once() {
        let (mut state, store) = scanned();
        assert_eq!(state.add_missing_ingredients("a"), 1);
        assert_eq!(state.add_missing_ingredients("b"), 0);
        assert!(!state.add_to_shopping_list("Spinach"));
        assert!(state.add_to_shopping_list("Milk"));
        assert_eq!(state.shopping_list().items(), ["Spinach", "Milk"]);
        assert_eq!(
            store.get(SHOPPING_KEY).unwrap().as_deref(),
            Some(r#"["Spinach","Milk"]"#)
        );

        assert_eq!(state.remove_shopping_item(0).as_deref(), Some("Spinach"));
        assert_eq!(state.remove_shopping_item(5), None);
        state.clear_shopping_list();
        assert_eq!(store.get(SHOPPING_KEY).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn new_scan_clears_the_active_recipe() {
        let (mut state, _) = scanned();
        assert_eq!(state.select_recipe(View::Recipes, "b").unwrap().title, "Shakshuka");
        assert!(state.select_recipe(View::Favorites, "b").is_none());
        state.apply_scan(FridgeScan::default());
        assert!(state.active_recipe().is_none());
    }

    #[test]
    fn tips_follow_the_active_recipe() {
        let (mut state, _) = scanned();
        let context = state.tips_context().unwrap();
        assert_eq!(context.ingredients, vec!["Egg", "Tomato"]);
        assert_eq!(context.recipe_title, None);

        state.select_recipe(View::Recipes, "a");
        let context = state.tips_context().unwrap();
        assert_eq!(context.ingredients, vec!["Egg", "Spinach"]);
        assert_eq!(context.recipe_title.as_deref(), Some("Omelette"));
        assert_eq!(
            context.keywords(),
            vec!["Egg", "Tomato", "Egg", "Spinach", "Omelette"]
        );

        let empty = AppState::load(MemoryStore::default());
        assert!(empty.tips_context().is_none());
    }

    #[test]
    fn static_tips_fill_in_for_generated_ones() {
        let (state, _) = scanned();
        let context = state.tips_context().unwrap();
        let tips = state.tips_for_display(&context, vec![]);
        assert_eq!(tips.len(), 2);
        assert!(tips.iter().all(|t| t.source == TipSource::Static));

        let generated = vec![Tip {
            title: "Salt early".into(),
            content: "Season the eggs before whisking.".into(),
        }];
        let tips = state.tips_for_display(&context, generated);
        assert_eq!(tips.len(), 1);
        assert_eq!(tips[0].source, TipSource::Generated);
    }

    #[test]
    fn language_is_remembered() {
        let store = SharedStore::default();
        let mut state = AppState::load(store.clone());
        assert_eq!(state.language(), Language::En);
        state.set_language(Language::Id);
        assert_eq!(AppState::load(store).language(), Language::Id);
    }

    #[test]
    fn time_filter_applies_to_the_view() {
        let (mut state, _) = scanned();
        state.filters.set_max_prep_time(10);
        assert!(state.visible_recipes(View::Recipes, "").is_empty());
        state.filters.set_max_prep_time(120);
        assert_eq!(state.visible_recipes(View::Recipes, "tomato, shak").len(), 0);
        assert_eq!(state.visible_recipes(View::Recipes, "egg").len(), 2);
    }
}
