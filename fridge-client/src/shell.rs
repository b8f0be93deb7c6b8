//! Command parsing and text rendering for the terminal front end.
use crate::app::{DisplayedTip, TipSource};
use anyhow::{anyhow, bail, Context, Result};
use fridge::cooking::{format_clock, CookingSequencer, StepVisual, Timer};
use fridge::knowledge::ingredient_info;
use fridge::lists::ShoppingList;
use fridge::phrases::{t, Phrase};
use fridge::scaling::Servings;
use fridge::search::NO_TIME_LIMIT;
use fridge::{Language, Recipe};
use itertools::Itertools;
use std::fmt::Write;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    List(String),
    /// `None` removes the limit.
    Time(Option<u32>),
    Show(usize),
    Serves(u32),
    Fav(usize),
    Buy(usize),
    Tips,
    Cook(usize),
    Help,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CookingCommand {
    Next,
    Back,
    Timer,
    Listen,
    Close,
}

/// Recipe numbers are shown starting at 1.
fn position(arg: Option<&str>) -> Result<usize> {
    let arg = arg.ok_or_else(|| anyhow!("Which recipe? Give its number."))?;
    let n: usize = arg
        .parse()
        .with_context(|| format!("Not a recipe number: {arg}"))?;
    if n == 0 {
        bail!("Recipe numbers start at 1");
    }
    Ok(n - 1)
}

impl SessionCommand {
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        let arg = if rest.is_empty() { None } else { Some(rest) };
        Ok(match word.to_lowercase().as_str() {
            "list" | "ls" => SessionCommand::List(rest.to_string()),
            "time" => match arg {
                None | Some("any") => SessionCommand::Time(None),
                Some(minutes) => SessionCommand::Time(Some(
                    minutes
                        .parse()
                        .with_context(|| format!("Not a number of minutes: {minutes}"))?,
                )),
            },
            "show" => SessionCommand::Show(position(arg)?),
            "serves" => SessionCommand::Serves(
                arg.ok_or_else(|| anyhow!("How many servings?"))?
                    .parse()
                    .context("Servings must be a whole number")?,
            ),
            "fav" => SessionCommand::Fav(position(arg)?),
            "buy" => SessionCommand::Buy(position(arg)?),
            "tips" => SessionCommand::Tips,
            "cook" => SessionCommand::Cook(position(arg)?),
            "help" | "?" | "" => SessionCommand::Help,
            "quit" | "exit" | "q" => SessionCommand::Quit,
            other => bail!("Unknown command: {other}"),
        })
    }
}

impl CookingCommand {
    pub fn parse(line: &str) -> Result<Self> {
        Ok(match line.trim().to_lowercase().as_str() {
            "next" | "n" | "" => CookingCommand::Next,
            "back" | "b" => CookingCommand::Back,
            "timer" | "t" => CookingCommand::Timer,
            "listen" | "l" => CookingCommand::Listen,
            "close" | "quit" | "q" => CookingCommand::Close,
            other => bail!("Unknown cooking command: {other}"),
        })
    }
}

pub const SESSION_HELP: &str = "Commands: list [query], time <minutes|any>, show <n>, serves <n>, fav <n>, buy <n>, tips, cook <n>, quit";
pub const COOKING_HELP: &str = "Cooking: next, back, timer, listen, close";

pub fn render_recipe_list(
    title: &str,
    recipes: &[&Recipe],
    is_favorite: impl Fn(&str) -> bool,
    language: Language,
) -> String {
    let mut out = format!("== {title} ==\n");
    if recipes.is_empty() {
        let _ = writeln!(out, "{}", t(language, Phrase::NoRecipes));
        return out;
    }
    for (n, recipe) in recipes.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>2}. {}{} [{}, {}, {} kcal]",
            n + 1,
            recipe.title,
            if is_favorite(&recipe.id) { " *" } else { "" },
            recipe.difficulty,
            recipe.prep_time,
            recipe.calories.round(),
        );
    }
    out
}

pub fn render_recipe(recipe: &Recipe, servings: &Servings, language: Language) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {}", recipe.title);
    if !recipe.summary.is_empty() {
        let _ = writeln!(out, "{}", recipe.summary);
    }
    let _ = writeln!(
        out,
        "{} | {} | {} kcal | P {}g F {}g C {}g | ~${:.2}",
        recipe.difficulty,
        recipe.prep_time,
        recipe.calories.round(),
        recipe.nutrition.protein,
        recipe.nutrition.fat,
        recipe.nutrition.carbs,
        recipe.estimated_cost,
    );
    let _ = writeln!(out, "{}", recipe.display_image_url());
    let _ = writeln!(out, "\n{}: {}", t(language, Phrase::Servings), servings.requested());
    for ingredient in &recipe.ingredients {
        let info = ingredient_info(&ingredient.name);
        let _ = writeln!(
            out,
            "  [{}] {} {}",
            if ingredient.owned { "x" } else { " " },
            servings.scale(&ingredient.amount),
            ingredient.name,
        );
        let _ = writeln!(
            out,
            "      {}: {}",
            t(language, Phrase::StorageTip),
            info.storage.get(language)
        );
        if let Some(substitute) = info.substitute {
            let _ = writeln!(
                out,
                "      {}: {}",
                t(language, Phrase::Substitutions),
                substitute.get(language)
            );
        }
    }
    let _ = writeln!(out);
    for (n, step) in recipe.steps.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", n + 1, step);
    }
    out
}

pub fn render_step(sequencer: &CookingSequencer, language: Language) -> String {
    let Some(text) = sequencer.current_step() else {
        return t(language, Phrase::VisualUnavailable).to_string();
    };
    let mut out = format!(
        "{} {} / {}\n{}\n",
        t(language, Phrase::Step),
        sequencer.index() + 1,
        sequencer.step_count(),
        text
    );
    match sequencer.timer() {
        Timer::Unarmed => {}
        Timer::Paused { remaining } => {
            let _ = writeln!(out, "[timer {} paused]", format_clock(remaining));
        }
        Timer::Running { remaining } => {
            let _ = writeln!(out, "[timer {} running]", format_clock(remaining));
        }
    }
    let _ = writeln!(out, "{}", render_visual(sequencer.visual(), language));
    out
}

pub fn render_visual(visual: &StepVisual, language: Language) -> String {
    match visual {
        StepVisual::Loading => t(language, Phrase::VisualLoading).to_string(),
        StepVisual::Unavailable => t(language, Phrase::VisualUnavailable).to_string(),
        StepVisual::Ready(url) if url.starts_with("data:") => {
            format!("(picture ready, {} bytes)", url.len())
        }
        StepVisual::Ready(url) => url.clone(),
    }
}

pub fn render_shopping_list(list: &ShoppingList, language: Language) -> String {
    let mut out = format!("== {} ==\n", t(language, Phrase::NavShopping));
    if list.is_empty() {
        let _ = writeln!(out, "{}", t(language, Phrase::ShoppingEmpty));
        let _ = writeln!(out, "{}", t(language, Phrase::ShoppingSubtitle));
        return out;
    }
    for (n, item) in list.items().iter().enumerate() {
        let _ = writeln!(out, "{:>2}. {}", n + 1, item);
    }
    out
}

pub fn render_tips(tips: &[DisplayedTip], language: Language) -> String {
    let mut out = format!("== {} ==\n", t(language, Phrase::ChefSecrets));
    out.push_str(
        &tips
            .iter()
            .map(|shown| {
                let marker = match shown.source {
                    TipSource::Generated => "AI",
                    TipSource::Static => "--",
                };
                format!("[{}] {}: {}", marker, shown.tip.title, shown.tip.content)
            })
            .join("\n"),
    );
    out.push('\n');
    out
}

pub fn render_time_limit(max_prep_time: u32, language: Language) -> String {
    if max_prep_time == NO_TIME_LIMIT {
        format!("{}: {}", t(language, Phrase::MaxTime), t(language, Phrase::Any))
    } else {
        format!("{}: {} min", t(language, Phrase::MaxTime), max_prep_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestion::test_support::recipe;
    use fridge::Tip;

    #[test]
    fn parses_session_commands() {
        assert_eq!(
            SessionCommand::parse("list egg, tomato").unwrap(),
            SessionCommand::List("egg, tomato".into())
        );
        assert_eq!(SessionCommand::parse("list").unwrap(), SessionCommand::List(String::new()));
        assert_eq!(SessionCommand::parse("time 30").unwrap(), SessionCommand::Time(Some(30)));
        assert_eq!(SessionCommand::parse("time any").unwrap(), SessionCommand::Time(None));
        assert_eq!(SessionCommand::parse("show 2").unwrap(), SessionCommand::Show(1));
        assert_eq!(SessionCommand::parse("COOK 1").unwrap(), SessionCommand::Cook(0));
        assert_eq!(SessionCommand::parse("serves 4").unwrap(), SessionCommand::Serves(4));
        assert_eq!(SessionCommand::parse("  quit ").unwrap(), SessionCommand::Quit);
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(SessionCommand::parse("show 0").is_err());
        assert!(SessionCommand::parse("show").is_err());
        assert!(SessionCommand::parse("fav two").is_err());
        assert!(SessionCommand::parse("dance").is_err());
        assert!(CookingCommand::parse("jump").is_err());
        assert_eq!(CookingCommand::parse("").unwrap(), CookingCommand::Next);
        assert_eq!(CookingCommand::parse("Listen").unwrap(), CookingCommand::Listen);
    }

    #[test]
    fn recipe_shows_scaled_amounts_and_storage_tips() {
        let dish = recipe("r1", "Omelette", &["Whisk"]);
        let mut servings = Servings::for_recipe(&dish);
        servings.set(4);
        let text = render_recipe(&dish, &servings, Language::En);
        assert!(text.contains("4 pcs Egg"));
        assert!(text.contains("2 cup Spinach"));
        assert!(text.contains("Storage Tip"));
        assert!(text.contains("1. Whisk"));
    }

    #[test]
    fn step_shows_progress_and_timer() {
        let dish = recipe("r1", "Soup", &["Chop", "Simmer 10 minutes"]);
        let (mut sequencer, _) = CookingSequencer::start(&dish);
        sequencer.next();
        let text = render_step(&sequencer, Language::Id);
        assert!(text.starts_with("Langkah 2 / 2"));
        assert!(text.contains("10:00 paused"));
    }

    #[test]
    fn empty_lists_say_so() {
        assert!(render_shopping_list(&ShoppingList::default(), Language::En)
            .contains("Your shopping list is empty."));
        assert!(render_recipe_list("Recipes", &[], |_| false, Language::En)
            .contains("No recipes match"));
        let tips = vec![DisplayedTip {
            tip: Tip {
                title: "Sear".into(),
                content: "Dry the meat".into(),
            },
            source: TipSource::Static,
        }];
        assert!(render_tips(&tips, Language::En).contains("[--] Sear: Dry the meat"));
        assert_eq!(render_time_limit(120, Language::En), "Max prep time: Any");
    }
}
