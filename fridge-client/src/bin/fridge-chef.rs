use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fridge::cooking::TimerEvent;
use fridge::phrases::{t, Phrase};
use fridge::scaling::Servings;
use fridge::search::NO_TIME_LIMIT;
use fridge::{DietaryRestriction, Language, Recipe};
use fridge_client::app::{AppState, View};
use fridge_client::cooking::{CookingEvent, CookingSession};
use fridge_client::ingestion::{
    illustrate_recipes, play_wav, CacheTier, EncodedImage, GenerativeModel, ImagePatch,
};
use fridge_client::persistence::{FileStore, KeyValueStore};
use fridge_client::shell::{self, CookingCommand, SessionCommand};
use fridge_client::{AiGateway, GatewayConfig};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use tracing_subscriber::EnvFilter;

/// Suggest recipes from a photo of your fridge
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Args {
    /// Where favorites, the shopping list and the language are kept
    #[arg(long, env = "FRIDGE_DATA_DIR")]
    data_dir: Option<PathBuf>,
    /// URL of the cache server
    #[arg(long, env = "FRIDGE_BACKEND_URL")]
    backend_url: Option<String>,
    /// Switch the language (en or id). It is remembered for next time.
    #[arg(long)]
    lang: Option<Language>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze a fridge photo and browse the suggested recipes
    Scan {
        /// The photo to analyze
        image: PathBuf,
        /// Dietary restriction the recipes must respect
        #[arg(long, value_parser = DietaryRestriction::parse)]
        diet: Option<DietaryRestriction>,
        /// Only list recipes ready within this many minutes
        #[arg(long)]
        max_time: Option<u32>,
    },
    /// Browse saved recipes
    Favorites,
    /// Show or change the shopping list
    Shopping {
        #[command(subcommand)]
        action: Option<ShoppingAction>,
    },
    /// Set the language (en or id)
    Language { language: Language },
}

#[derive(Subcommand, Debug)]
enum ShoppingAction {
    List,
    Add { item: Vec<String> },
    /// Remove the item with this number
    Remove { number: usize },
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let data_dir = match args.data_dir {
        Some(dir) => dir,
        None => dirs::data_dir()
            .context("No platform data directory, pass --data-dir")?
            .join("fridge-chef"),
    };
    let mut state = AppState::load(FileStore::open(&data_dir)?);
    if let Some(language) = args.lang {
        state.set_language(language);
    }
    let mut config = GatewayConfig::from_env();
    if args.backend_url.is_some() {
        config.backend_url = args.backend_url;
    }
    tracing::debug!("Using {:?}", config);

    match args.command {
        Command::Language { language } => {
            state.set_language(language);
            println!("{}: {}", t(language, Phrase::Language), language.prompt_name());
        }
        Command::Shopping { action } => {
            let language = state.language();
            match action.unwrap_or(ShoppingAction::List) {
                ShoppingAction::List => {}
                ShoppingAction::Add { item } => {
                    let item = item.join(" ");
                    if !state.add_to_shopping_list(&item) {
                        println!("Already on the list: {item}");
                    }
                }
                ShoppingAction::Remove { number } => {
                    if number == 0 || state.remove_shopping_item(number - 1).is_none() {
                        println!("No item number {number}");
                    }
                }
                ShoppingAction::Clear => {
                    state.clear_shopping_list();
                    println!("{}", t(language, Phrase::Clear));
                }
            }
            print!("{}", shell::render_shopping_list(state.shopping_list(), language));
        }
        Command::Favorites => {
            state.set_view(View::Favorites);
            let gateway = Arc::new(AiGateway::from_config(&config));
            run_session(&mut state, gateway, JoinSet::new()).await?;
        }
        Command::Scan {
            image,
            diet,
            max_time,
        } => {
            let language = state.language();
            if let Some(diet) = diet {
                state.filters.dietary = diet;
            }
            if let Some(minutes) = max_time {
                state.filters.set_max_prep_time(minutes);
            }
            let image = EncodedImage::from_path(&image)?;
            let gateway = Arc::new(AiGateway::from_config(&config));

            println!("{} ..", t(language, Phrase::ScanFridge));
            let scan = match gateway
                .analyze_fridge_and_suggest_recipes(&image, &[state.filters.dietary], language)
                .await
            {
                Ok(scan) => scan,
                Err(e) if e.is_unauthorized() => {
                    tracing::error!("Fridge analysis rejected the credential: {}", e);
                    eprintln!("{}", t(language, Phrase::SelectKeyPrompt));
                    eprintln!("{}", t(language, Phrase::BillingDoc));
                    std::process::exit(1);
                }
                Err(e) => {
                    tracing::error!("Fridge analysis failed: {}", e);
                    eprintln!("{}", t(language, Phrase::ScanFailed));
                    std::process::exit(1);
                }
            };
            state.apply_scan(scan);
            println!("Detected: {}", state.detected_ingredients().join(", "));

            let illustrations = illustrate_recipes(gateway.clone(), state.recipes());
            run_session(&mut state, gateway, illustrations).await?;
        }
    }

    Ok(())
}

fn recipe_at<S: KeyValueStore>(
    state: &AppState<S>,
    view: View,
    query: &str,
    index: usize,
) -> Option<String> {
    state
        .visible_recipes(view, query)
        .get(index)
        .map(|r| r.id.clone())
}

fn print_list<S: KeyValueStore>(state: &AppState<S>, view: View, query: &str) {
    let language = state.language();
    let title = match view {
        View::Favorites => t(language, Phrase::FavTitle),
        _ => t(language, Phrase::SuggestedTitle),
    };
    let recipes = state.visible_recipes(view, query);
    print!(
        "{}",
        shell::render_recipe_list(title, &recipes, |id| state.is_favorite(id), language)
    );
}

async fn run_session<M, C, S>(
    state: &mut AppState<S>,
    gateway: Arc<AiGateway<M, C>>,
    mut illustrations: JoinSet<Option<ImagePatch>>,
) -> Result<()>
where
    M: GenerativeModel + 'static,
    C: CacheTier + 'static,
    S: KeyValueStore,
{
    let view = state.view();
    let mut query = String::new();
    let mut servings: Option<Servings> = None;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    print_list(state, view, &query);
    println!("{}", shell::SESSION_HELP);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let command = match SessionCommand::parse(&line) {
                    Ok(command) => command,
                    Err(e) => {
                        println!("{e}");
                        continue;
                    }
                };
                let language = state.language();
                match command {
                    SessionCommand::Quit => break,
                    SessionCommand::Help => println!("{}", shell::SESSION_HELP),
                    SessionCommand::List(new_query) => {
                        query = new_query;
                        print_list(state, view, &query);
                    }
                    SessionCommand::Time(minutes) => {
                        state.filters.set_max_prep_time(minutes.unwrap_or(NO_TIME_LIMIT));
                        println!("{}", shell::render_time_limit(state.filters.max_prep_time, language));
                        print_list(state, view, &query);
                    }
                    SessionCommand::Show(index) => {
                        let Some(id) = recipe_at(state, view, &query, index) else {
                            println!("No recipe number {}", index + 1);
                            continue;
                        };
                        if let Some(recipe) = state.select_recipe(view, &id) {
                            let shown = Servings::for_recipe(recipe);
                            print!("{}", shell::render_recipe(recipe, &shown, language));
                            servings = Some(shown);
                        }
                    }
                    SessionCommand::Serves(count) => {
                        match (state.active_recipe(), servings.as_mut()) {
                            (Some(recipe), Some(shown)) => {
                                shown.set(count);
                                print!("{}", shell::render_recipe(recipe, shown, language));
                            }
                            _ => println!("Show a recipe first"),
                        }
                    }
                    SessionCommand::Fav(index) => {
                        let Some(id) = recipe_at(state, view, &query, index) else {
                            println!("No recipe number {}", index + 1);
                            continue;
                        };
                        match state.toggle_favorite(&id) {
                            Some(true) => println!("Saved to favorites"),
                            Some(false) => println!("Removed from favorites"),
                            None => {}
                        }
                    }
                    SessionCommand::Buy(index) => {
                        let Some(id) = recipe_at(state, view, &query, index) else {
                            println!("No recipe number {}", index + 1);
                            continue;
                        };
                        let added = state.add_missing_ingredients(&id);
                        println!("Added {added} ingredients");
                        print!("{}", shell::render_shopping_list(state.shopping_list(), language));
                    }
                    SessionCommand::Tips => {
                        let Some(context) = state.tips_context() else {
                            println!("Scan your fridge or pick a recipe first");
                            continue;
                        };
                        let generated = gateway
                            .generate_dynamic_tips(
                                &context.ingredients,
                                context.recipe_title.as_deref(),
                                language,
                            )
                            .await;
                        let tips = state.tips_for_display(&context, generated);
                        print!("{}", shell::render_tips(&tips, language));
                    }
                    SessionCommand::Cook(index) => {
                        let Some(id) = recipe_at(state, view, &query, index) else {
                            println!("No recipe number {}", index + 1);
                            continue;
                        };
                        let Some(recipe) = state.select_recipe(view, &id).cloned() else {
                            continue;
                        };
                        run_cooking(gateway.clone(), &recipe, language, &mut lines).await?;
                        println!("{}", shell::SESSION_HELP);
                    }
                }
            }
            Some(result) = illustrations.join_next(), if !illustrations.is_empty() => {
                match result {
                    Ok(Some(patch)) => {
                        if state.apply_image_patch(&patch) {
                            tracing::info!("Picture ready for {}", patch.recipe_id);
                        }
                    }
                    Ok(None) => {}
                    Err(e) => tracing::warn!("Illustration task failed: {}", e),
                }
            }
        }
    }
    Ok(())
}

async fn run_cooking<M, C>(
    gateway: Arc<AiGateway<M, C>>,
    recipe: &Recipe,
    language: Language,
    lines: &mut Lines<BufReader<Stdin>>,
) -> Result<()>
where
    M: GenerativeModel + 'static,
    C: CacheTier + 'static,
{
    let mut session = CookingSession::open(gateway, recipe, language);
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut playback: JoinSet<()> = JoinSet::new();

    println!("{}", shell::COOKING_HELP);
    print!("{}", shell::render_step(session.sequencer(), language));

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match CookingCommand::parse(&line) {
                    Err(e) => println!("{e}"),
                    Ok(CookingCommand::Close) => break,
                    Ok(CookingCommand::Next) => {
                        if session.next() {
                            print!("{}", shell::render_step(session.sequencer(), language));
                        }
                    }
                    Ok(CookingCommand::Back) => {
                        if session.back() {
                            print!("{}", shell::render_step(session.sequencer(), language));
                        }
                    }
                    Ok(CookingCommand::Timer) => {
                        if session.toggle_timer().is_running() {
                            ticker.reset();
                        }
                        print!("{}", shell::render_step(session.sequencer(), language));
                    }
                    Ok(CookingCommand::Listen) => {
                        if session.listen() {
                            println!("{}", t(language, Phrase::Reading));
                        }
                    }
                }
            }
            _ = ticker.tick() => {
                if let Some(TimerEvent::Done) = session.tick() {
                    println!("\x07{}", t(language, Phrase::TimerDone));
                }
            }
            Some(event) = session.next_event() => {
                let is_visual = matches!(event, CookingEvent::Visual { .. });
                if let Some(audio) = session.handle(event) {
                    playback.spawn(async move {
                        let played = match audio.to_wav() {
                            Ok(wav) => play_wav(&wav).await,
                            Err(e) => Err(e),
                        };
                        if let Err(e) = played {
                            tracing::warn!("Could not play narration: {:#}", e);
                        }
                    });
                } else if is_visual {
                    println!("{}", shell::render_visual(session.sequencer().visual(), language));
                }
            }
            Some(_) = playback.join_next(), if !playback.is_empty() => {
                session.finish_reading();
            }
        }
    }
    Ok(())
}
