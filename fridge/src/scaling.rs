use crate::basic_models::Recipe;
use lazy_static::lazy_static;
use regex::{Captures, Regex};

pub const MIN_SERVINGS: u32 = 1;
pub const MAX_SERVINGS: u32 = 20;

lazy_static! {
    static ref QUANTITY: Regex =
        Regex::new(r"[0-9]+(?:\.[0-9]+)?").expect("Invalid quantity regex");
}

/// Rescale every number embedded in a free-text amount.
///
/// Units and descriptors are left alone. Whole results print without a
/// fraction, everything else with two decimals.
pub fn scale_amount(amount: &str, factor: f64) -> String {
    QUANTITY
        .replace_all(amount, |caps: &Captures| {
            let quantity: f64 = caps[0].parse().unwrap_or_default();
            format_quantity(quantity * factor)
        })
        .into_owned()
}

fn format_quantity(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{}", value)
    } else {
        format!("{:.2}", value)
    }
}

/// The serving count the user asked for, relative to what the recipe was written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Servings {
    base: u32,
    requested: u32,
}

impl Servings {
    /// Opens at the recipe's own count, even outside the adjustable range.
    pub fn for_recipe(recipe: &Recipe) -> Self {
        let base = recipe.base_servings();
        Self {
            base,
            requested: base,
        }
    }

    pub fn requested(&self) -> u32 {
        self.requested
    }

    /// Change the requested count, clamped to the supported range.
    pub fn set(&mut self, requested: u32) {
        self.requested = requested.clamp(MIN_SERVINGS, MAX_SERVINGS);
    }

    pub fn increment(&mut self) {
        self.set(self.requested.saturating_add(1));
    }

    pub fn decrement(&mut self) {
        self.set(self.requested.saturating_sub(1));
    }

    pub fn factor(&self) -> f64 {
        self.requested as f64 / self.base as f64
    }

    pub fn scale(&self, amount: &str) -> String {
        scale_amount(amount, self.factor())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_models::fixtures::recipe;

    #[test]
    fn scales_integers_and_decimals() {
        assert_eq!(scale_amount("2 cups", 1.5), "3 cups");
        assert_eq!(scale_amount("1.5 tsp", 2.0), "3 tsp");
        assert_eq!(scale_amount("1 cup", 1.5), "1.50 cup");
        assert_eq!(scale_amount("2-3 cloves", 0.5), "1-1.50 cloves");
    }

    #[test]
    fn text_without_digits_is_untouched() {
        assert_eq!(scale_amount("a pinch", 3.0), "a pinch");
        assert_eq!(scale_amount("", 2.0), "");
    }

    #[test]
    fn servings_clamp_to_range() {
        let mut servings = Servings::for_recipe(&recipe("r", "Rice", "10 min", &[]));
        assert_eq!(servings.requested(), 2);
        servings.set(0);
        assert_eq!(servings.requested(), MIN_SERVINGS);
        servings.decrement();
        assert_eq!(servings.requested(), MIN_SERVINGS);
        servings.set(50);
        assert_eq!(servings.requested(), MAX_SERVINGS);
        servings.increment();
        assert_eq!(servings.requested(), MAX_SERVINGS);
    }

    #[test]
    fn factor_follows_recipe_default() {
        let mut base = recipe("r", "Rice", "10 min", &[]);
        base.default_servings = 4;
        let mut servings = Servings::for_recipe(&base);
        servings.set(6);
        assert_eq!(servings.factor(), 1.5);
        assert_eq!(servings.scale("2 cups rice"), "3 cups rice");

        base.default_servings = 0;
        let servings = Servings::for_recipe(&base);
        assert_eq!(servings.factor(), 1.0);
    }

    #[test]
    fn large_recipes_open_unscaled() {
        let mut party = recipe("r", "Rice", "10 min", &[]);
        party.default_servings = 24;
        let mut servings = Servings::for_recipe(&party);
        assert_eq!(servings.requested(), 24);
        assert_eq!(servings.factor(), 1.0);
        assert_eq!(servings.scale("24 eggs"), "24 eggs");

        servings.increment();
        assert_eq!(servings.requested(), MAX_SERVINGS);
        assert_eq!(servings.scale("24 eggs"), "20 eggs");
    }
}
