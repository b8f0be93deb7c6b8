//! Client-side recipe filtering: free-text query plus a maximum prep time.
use crate::basic_models::{DietaryRestriction, Recipe};
use lazy_static::lazy_static;
use regex::Regex;

/// Maximum prep time value meaning "no limit".
pub const NO_TIME_LIMIT: u32 = 120;
/// Smallest limit the prep time control offers.
pub const MIN_TIME_LIMIT: u32 = 5;

lazy_static! {
    static ref FIRST_NUMBER: Regex = Regex::new(r"[0-9]+").expect("Invalid prep time regex");
}

/// The filters the user has chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterState {
    pub dietary: DietaryRestriction,
    pub max_prep_time: u32,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            dietary: DietaryRestriction::None,
            max_prep_time: NO_TIME_LIMIT,
        }
    }
}

impl FilterState {
    /// Set the time limit, kept within the range the control offers.
    pub fn set_max_prep_time(&mut self, minutes: u32) {
        self.max_prep_time = minutes.clamp(MIN_TIME_LIMIT, NO_TIME_LIMIT);
    }

    pub fn is_time_limited(&self) -> bool {
        self.max_prep_time != NO_TIME_LIMIT
    }
}

/// Split a query into lowercase tokens on commas, pipes and whitespace.
pub fn tokenize(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split(|c: char| c == ',' || c == '|' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Minutes taken from the first run of digits in a free-text prep time.
///
/// Text without any digits counts as zero minutes, so it passes every limit.
pub fn prep_minutes(prep_time: &str) -> u32 {
    FIRST_NUMBER
        .find(prep_time)
        .map(|m| m.as_str().parse().unwrap_or(u32::MAX))
        .unwrap_or(0)
}

/// Every token must appear in the title or in some ingredient name.
pub fn matches_tokens(recipe: &Recipe, tokens: &[String]) -> bool {
    let title = recipe.title.to_lowercase();
    let names: Vec<String> = recipe
        .ingredients
        .iter()
        .map(|i| i.name.to_lowercase())
        .collect();
    tokens
        .iter()
        .all(|token| title.contains(token.as_str()) || names.iter().any(|n| n.contains(token.as_str())))
}

pub fn passes_time_limit(recipe: &Recipe, max_prep_time: u32) -> bool {
    max_prep_time == NO_TIME_LIMIT || prep_minutes(&recipe.prep_time) <= max_prep_time
}

/// Filter recipes by query and time limit, keeping their original order.
pub fn filter_recipes<'r>(recipes: &'r [Recipe], query: &str, max_prep_time: u32) -> Vec<&'r Recipe> {
    let tokens = tokenize(query);
    recipes
        .iter()
        .filter(|r| passes_time_limit(r, max_prep_time) && matches_tokens(r, &tokens))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_models::fixtures::recipe;

    fn sample() -> Vec<Recipe> {
        vec![
            recipe("1", "Garlic Chicken", "30 minutes", &["Chicken breast", "Garlic"]),
            recipe("2", "Tomato Soup", "No time given", &["Tomato", "Onion"]),
            recipe("3", "Beef Stew", "1-2 hours", &["Beef", "Carrot"]),
            recipe("4", "Chicken Soup", "90 min", &["Chicken", "Celery"]),
        ]
    }

    fn ids(found: Vec<&Recipe>) -> Vec<&str> {
        found.into_iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn prep_minutes_takes_first_integer() {
        assert_eq!(prep_minutes("20 minutes"), 20);
        assert_eq!(prep_minutes("No time given"), 0);
        assert_eq!(prep_minutes("1-2 hours"), 1);
        assert_eq!(prep_minutes("about 45"), 45);
    }

    #[test]
    fn tokenize_splits_on_commas_pipes_and_spaces() {
        assert_eq!(tokenize(" Chicken,  SOUP|garlic\t"), vec!["chicken", "soup", "garlic"]);
        assert!(tokenize(" ,| ").is_empty());
    }

    #[test]
    fn empty_query_keeps_everything_within_limit_in_order() {
        let recipes = sample();
        assert_eq!(ids(filter_recipes(&recipes, "", NO_TIME_LIMIT)), vec!["1", "2", "3", "4"]);
        assert_eq!(ids(filter_recipes(&recipes, "   ", 30)), vec!["1", "2", "3"]);
    }

    #[test]
    fn every_token_must_match_title_or_ingredient() {
        let recipes = sample();
        assert_eq!(ids(filter_recipes(&recipes, "chicken soup", NO_TIME_LIMIT)), vec!["4"]);
        assert_eq!(ids(filter_recipes(&recipes, "garlic", NO_TIME_LIMIT)), vec!["1"]);
        assert_eq!(ids(filter_recipes(&recipes, "chicken|celery", NO_TIME_LIMIT)), vec!["4"]);
        assert!(filter_recipes(&recipes, "chicken,carrot", NO_TIME_LIMIT).is_empty());
    }

    #[test]
    fn sentinel_disables_time_filter() {
        let recipes = vec![recipe("slow", "Roast", "300 minutes", &[])];
        assert_eq!(filter_recipes(&recipes, "", NO_TIME_LIMIT).len(), 1);
        assert!(filter_recipes(&recipes, "", 115).is_empty());
    }

    #[test]
    fn text_and_time_filters_combine() {
        let recipes = sample();
        assert_eq!(ids(filter_recipes(&recipes, "chicken", 60)), vec!["1"]);
    }

    #[test]
    fn filter_state_clamps_limit() {
        let mut filters = FilterState::default();
        assert!(!filters.is_time_limited());
        filters.set_max_prep_time(2);
        assert_eq!(filters.max_prep_time, MIN_TIME_LIMIT);
        filters.set_max_prep_time(500);
        assert_eq!(filters.max_prep_time, NO_TIME_LIMIT);
    }
}
