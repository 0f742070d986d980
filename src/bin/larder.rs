//! larder: recipe and meal-plan CLI
//!
//! Query recipes for a pantry, generate meal plans, and look up recipe
//! details from the command line. Output is JSON.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use larder::config::file::{Config, Credential, Secrets};
use larder::providers::{GeminiClient, OpenAiClient};
use larder::{
    AiProvider, ComplexSearchQuery, FindRecipesRequest, Larder, MealGenerator, MealPlanRequest,
    Ranking, RecipeApiConfigUpdate, RecipeService, TimeFrame, UserProfile,
};
use serde::Serialize;

/// Larder CLI
#[derive(Parser)]
#[command(name = "larder")]
#[command(version)]
#[command(about = "Recipe suggestions and meal plans for your pantry")]
struct Args {
    /// Config file (default: ~/.larder/config.toml, then /etc/larder/config.toml)
    #[arg(short, long, env = "LARDER_CONFIG")]
    config: Option<PathBuf>,

    /// AI fallback provider (openai or gemini); overrides the config file
    #[arg(long)]
    ai: Option<AiProvider>,

    /// Ask the AI generator directly instead of the recipe API
    #[arg(long)]
    prefer_ai: bool,

    /// Never fall back to the AI generator
    #[arg(long, conflicts_with = "prefer_ai")]
    no_fallback: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Find recipes for the ingredients you have
    Find {
        /// Ingredients in your pantry
        #[arg(required = true)]
        ingredients: Vec<String>,
        /// Maximum number of recipes
        #[arg(short, long, default_value_t = 10)]
        number: u32,
        /// Rank by fewest missing ingredients instead of most used
        #[arg(long)]
        minimize_missing: bool,
        /// Allergen to avoid (repeatable)
        #[arg(long = "allergy")]
        allergies: Vec<String>,
        /// Dietary restriction (repeatable)
        #[arg(long = "diet")]
        diets: Vec<String>,
    },

    /// Generate a meal plan
    Plan {
        /// Plan a whole week instead of a single day
        #[arg(long)]
        week: bool,
        /// Daily calorie target
        #[arg(long)]
        calories: Option<u32>,
        /// Diet (e.g. vegetarian)
        #[arg(long)]
        diet: Option<String>,
        /// Ingredient to exclude (repeatable)
        #[arg(long)]
        exclude: Vec<String>,
        /// Pantry ingredient to prefer (repeatable)
        #[arg(long)]
        pantry: Vec<String>,
    },

    /// Show full recipe information
    Details {
        /// Recipe ids
        #[arg(required = true)]
        ids: Vec<u64>,
    },

    /// Search recipes by text and filters
    Search {
        /// Search text
        query: String,
        #[arg(long)]
        cuisine: Option<String>,
        #[arg(long)]
        diet: Option<String>,
        /// Dish type (e.g. "main course")
        #[arg(long = "type")]
        dish_type: Option<String>,
        /// Maximum preparation time in minutes
        #[arg(long)]
        max_ready_time: Option<u32>,
        #[arg(short, long, default_value_t = 10)]
        number: u32,
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialise tracing (default: warn for CLI; override with RUST_LOG).
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    let service = build_service(&args)?;

    match args.command {
        Command::Find {
            ingredients,
            number,
            minimize_missing,
            allergies,
            diets,
        } => {
            let ranking = if minimize_missing {
                Ranking::MinimizeMissing
            } else {
                Ranking::MaximizeUsed
            };
            let mut request = FindRecipesRequest::new(ingredients)
                .number(number)
                .ranking(ranking);
            if !allergies.is_empty() || !diets.is_empty() {
                request = request.profile(UserProfile {
                    allergies,
                    dietary_restrictions: diets,
                    ..Default::default()
                });
            }
            print_json(&service.find_recipes(&request).await?)?;
        }

        Command::Plan {
            week,
            calories,
            diet,
            exclude,
            pantry,
        } => {
            let time_frame = if week { TimeFrame::Week } else { TimeFrame::Day };
            let mut request = MealPlanRequest::new(time_frame);
            if let Some(calories) = calories {
                request = request.target_calories(calories);
            }
            if let Some(diet) = diet {
                request = request.diet(diet);
            }
            for item in exclude {
                request = request.exclude(item);
            }
            request.pantry = pantry;
            print_json(&service.generate_meal_plan(&request).await?)?;
        }

        Command::Details { ids } => {
            if let [id] = ids.as_slice() {
                print_json(&service.recipe_details(*id).await?)?;
            } else {
                print_json(&service.recipe_details_batch(&ids).await?)?;
            }
        }

        Command::Search {
            query,
            cuisine,
            diet,
            dish_type,
            max_ready_time,
            number,
            offset,
        } => {
            let mut search = ComplexSearchQuery::new(query).page(number, offset);
            if let Some(cuisine) = cuisine {
                search = search.cuisine(cuisine);
            }
            if let Some(diet) = diet {
                search = search.diet(diet);
            }
            if let Some(dish_type) = dish_type {
                search = search.dish_type(dish_type);
            }
            if let Some(minutes) = max_ready_time {
                search = search.max_ready_time(minutes);
            }
            print_json(&service.search_recipes(&search).await?)?;
        }
    }

    Ok(())
}

fn build_service(args: &Args) -> larder::Result<RecipeService> {
    let config = Config::load(args.config.as_deref())?;
    let secrets = Secrets::load()?;

    let mut builder = Larder::builder()
        .config(config.recipe_config())
        .cache(config.cache_config())
        .timeout(Duration::from_secs(config.spoonacular.timeout_secs));

    if let Some(key) = secrets.api_key(Credential::Spoonacular) {
        builder = builder.spoonacular(key);
        if let Some(host) = &config.spoonacular.host {
            builder = builder.spoonacular_host(host.clone());
        }
    }

    let provider = args.ai.or(config.ai.as_ref().map(|ai| ai.provider));
    if let Some(provider) = provider {
        let model = config.ai.as_ref().and_then(|ai| ai.model.clone());
        let credential = secrets.api_key(Credential::Ai(provider));
        builder = builder.meal_generator(generator(provider, credential, model));
    }

    let service = builder.build()?;

    let mut update = RecipeApiConfigUpdate::new();
    if args.prefer_ai {
        update = update.prefer_api(false);
    }
    if args.no_fallback {
        update = update.fallback_to_ai(false);
    }
    service.config().set_config(update);

    Ok(service)
}

fn generator(
    provider: AiProvider,
    credential: Option<String>,
    model: Option<String>,
) -> Arc<dyn MealGenerator> {
    match (provider, model) {
        (AiProvider::OpenAi, Some(model)) => Arc::new(OpenAiClient::new(credential).model(model)),
        (AiProvider::Gemini, Some(model)) => Arc::new(GeminiClient::new(credential).model(model)),
        (provider, None) => provider.build(credential),
    }
}

fn print_json<T: Serialize>(value: &T) -> serde_json::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
