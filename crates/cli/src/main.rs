use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use data_loader::{CsvRatingsRepository, RecipeCatalog, RecipeDetail, RecipeDetailSource, RecipeId, UserId};
use engine::{RecommendParams, RecommendationEngine, RecommendationMode};
use rand::seq::IndexedRandom;
use similarity::{DistanceMetric, Neighbor};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::info;

/// RecipeRecs - Recipe Recommendation Engine
#[derive(Parser)]
#[command(name = "recipe-recs")]
#[command(about = "Recipe recommendation engine using collaborative filtering", long_about = None)]
struct Cli {
    /// Path to the food.com interactions CSV
    #[arg(short, long, default_value = "data/RAW_interactions.csv")]
    ratings: PathBuf,

    /// JSON file with recommendation parameters; flags override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    params: ParamArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Overrides for RecommendParams
#[derive(Args)]
struct ParamArgs {
    /// Users need strictly more ratings than this
    #[arg(long, global = true)]
    min_user_votes: Option<usize>,

    /// Recipes need strictly more ratings than this
    #[arg(long, global = true)]
    min_recipe_votes: Option<usize>,

    /// Minimum rating for a recipe to seed item-based search
    #[arg(long, global = true)]
    min_rating: Option<f32>,

    /// Neighbors per similarity query
    #[arg(short, long, global = true)]
    k: Option<usize>,

    /// Maximum number of recommendations
    #[arg(long, global = true)]
    limit: Option<usize>,

    /// Distance metric: cosine, euclidean or manhattan
    #[arg(long, global = true)]
    metric: Option<String>,

    /// Random seed for seed-recipe sampling
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Never recommend recipes the user already rated
    #[arg(long, global = true)]
    exclude_rated: bool,
}

impl ParamArgs {
    /// Start from the config file (or defaults) and apply the flags given
    fn resolve(&self, config: Option<&Path>) -> Result<RecommendParams> {
        let mut params = match config {
            Some(path) => RecommendParams::from_json_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => RecommendParams::default(),
        };

        if let Some(v) = self.min_user_votes {
            params.min_user_votes = v;
        }
        if let Some(v) = self.min_recipe_votes {
            params.min_recipe_votes = v;
        }
        if let Some(v) = self.min_rating {
            params.min_rating = v;
        }
        if let Some(v) = self.k {
            params.k = v;
        }
        if let Some(v) = self.limit {
            params.max_recommendations = v;
        }
        if let Some(metric) = &self.metric {
            params.metric = metric.parse::<DistanceMetric>()?;
        }
        if let Some(v) = self.seed {
            params.rng_seed = v;
        }
        if self.exclude_rated {
            params.exclude_rated = true;
        }

        params.validate()?;
        Ok(params)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Get recipe recommendations for a user
    Recommend {
        /// User ID to get recommendations for
        #[arg(long)]
        user_id: UserId,

        /// user-based or item-based
        #[arg(long, default_value = "item-based")]
        mode: String,

        /// Recipes CSV used to show names, times and nutrition
        #[arg(long)]
        recipes: Option<PathBuf>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Find recipes similar to a recipe
    SimilarRecipes {
        #[arg(long)]
        recipe_id: RecipeId,

        #[arg(long)]
        json: bool,
    },

    /// Find users with a similar rating pattern
    SimilarUsers {
        #[arg(long)]
        user_id: UserId,

        #[arg(long)]
        json: bool,
    },

    /// Show a user's surviving ratings
    User {
        /// User ID to display
        #[arg(long)]
        user_id: UserId,
    },

    /// Run benchmark to test performance
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,

        /// Number of concurrent requests
        #[arg(long, default_value = "10")]
        concurrent: usize,

        /// user-based or item-based
        #[arg(long, default_value = "user-based")]
        mode: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let params = cli.params.resolve(cli.config.as_deref())?;

    if !cli.ratings.exists() {
        bail!("Ratings file {} not found", cli.ratings.display());
    }
    let engine = RecommendationEngine::new(Arc::new(CsvRatingsRepository::new(&cli.ratings)));

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Recommend {
            user_id,
            mode,
            recipes,
            json,
        } => handle_recommend(&engine, &params, user_id, &mode, recipes.as_deref(), json)?,
        Commands::SimilarRecipes { recipe_id, json } => {
            let neighbors = engine
                .similar_recipes(recipe_id, &params)
                .context("Failed to find similar recipes")?;
            print_neighbors("Recipes similar to", recipe_id, &neighbors, json)?;
        }
        Commands::SimilarUsers { user_id, json } => {
            let neighbors = engine
                .similar_users(user_id, &params)
                .context("Failed to find similar users")?;
            print_neighbors("Users similar to", user_id, &neighbors, json)?;
        }
        Commands::User { user_id } => handle_user(&engine, &params, user_id)?,
        Commands::Benchmark {
            requests,
            concurrent,
            mode,
        } => handle_benchmark(&engine, params, requests, concurrent, &mode).await?,
    }

    Ok(())
}

/// Handle the 'recommend' command
fn handle_recommend(
    engine: &RecommendationEngine,
    params: &RecommendParams,
    user_id: UserId,
    mode: &str,
    recipes: Option<&Path>,
    json: bool,
) -> Result<()> {
    let mode: RecommendationMode = mode.parse()?;

    let start = Instant::now();
    let recommendations = engine
        .recommend(user_id, mode, params)
        .with_context(|| format!("Failed to recommend recipes for user {}", user_id))?;
    info!(
        "Recommended {} recipes for user {} in {:?}",
        recommendations.len(),
        user_id,
        start.elapsed()
    );

    let details: Vec<RecipeDetail> = match recipes {
        Some(path) => RecipeCatalog::load_from_file(path)
            .context("Failed to load recipe catalogue")?
            .enrich(&recommendations)?,
        None => recommendations.iter().map(|&id| RecipeDetail::bare(id)).collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&details)?);
    } else {
        print_recommendations(&details, mode);
    }
    Ok(())
}

/// Handle the 'user' command
fn handle_user(engine: &RecommendationEngine, params: &RecommendParams, user_id: UserId) -> Result<()> {
    let snapshot = engine.snapshot(params.min_user_votes, params.min_recipe_votes)?;
    let ratings = snapshot.ratings().user_ratings(user_id);
    if ratings.is_empty() {
        return Err(anyhow!(
            "User {} has no ratings above the vote thresholds ({}, {})",
            user_id,
            params.min_user_votes,
            params.min_recipe_votes
        ));
    }

    println!("{}", format!("User ID: {}", user_id).bold().blue());
    let total: f32 = ratings.iter().map(|r| r.rating).sum();
    println!("{}Number of ratings: {}", "• ".cyan(), ratings.len());
    println!("{}Average rating: {:.2}", "• ".cyan(), total / ratings.len() as f32);

    let mut top_rated = ratings.clone();
    top_rated.sort_by(|a, b| b.rating.total_cmp(&a.rating).then(a.recipe_id.cmp(&b.recipe_id)));
    println!("Top rated recipes:");
    for rating in top_rated.iter().take(5) {
        println!("  - recipe {} (Rating: {})", rating.recipe_id, rating.rating);
    }

    let qualifying = ratings.iter().filter(|r| r.rating >= params.min_rating).count();
    println!(
        "{}{} recipes rated >= {} (seed candidates)",
        "• ".green(),
        qualifying,
        params.min_rating
    );
    Ok(())
}

/// Handle the 'benchmark' command
///
/// One snapshot is built and shared by every request.
async fn handle_benchmark(
    engine: &RecommendationEngine,
    params: RecommendParams,
    requests: usize,
    concurrent: usize,
    mode: &str,
) -> Result<()> {
    let mode: RecommendationMode = mode.parse()?;

    let build_start = Instant::now();
    let snapshot = engine.snapshot(params.min_user_votes, params.min_recipe_votes)?;
    info!(
        "Built snapshot {:?} in {:?}",
        snapshot.matrix().shape(),
        build_start.elapsed()
    );

    // Pick random users that survived filtering
    let user_ids = snapshot.ratings().user_ids();
    let mut rng = rand::rng();
    let picks: Vec<UserId> = (0..requests)
        .filter_map(|_| user_ids.choose(&mut rng).copied())
        .collect();
    if picks.is_empty() {
        bail!("No users to benchmark");
    }

    let semaphore = Arc::new(Semaphore::new(concurrent.max(1)));
    let wall = Instant::now();
    let mut handles = Vec::with_capacity(picks.len());
    for user in picks {
        let snapshot = Arc::clone(&snapshot);
        let params = params.clone();
        let semaphore = Arc::clone(&semaphore);
        handles.push(tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await?;
            let start = Instant::now();
            let result =
                tokio::task::spawn_blocking(move || snapshot.recommend(user, mode, &params)).await?;
            Ok::<_, anyhow::Error>((start.elapsed(), result.is_ok()))
        }));
    }

    // Wait for all tasks to complete and collect timings
    let mut timings: Vec<Duration> = Vec::with_capacity(handles.len());
    let mut failures = 0;
    for handle in handles {
        let (elapsed, ok) = handle.await??;
        timings.push(elapsed);
        if !ok {
            failures += 1;
        }
    }
    let total_time = wall.elapsed();
    info!("Benchmark finished {} requests in {:?}", timings.len(), total_time);

    timings.sort();
    let percentile = |p: f64| timings[((timings.len() as f64 * p) as usize).min(timings.len() - 1)];
    let avg_latency = timings.iter().sum::<Duration>() / timings.len() as u32;

    println!("Benchmark results ({}):", mode);
    println!("Requests: {} ({} failed)", timings.len(), failures);
    println!("Total time: {:?}", total_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!(
        "Throughput: {:.2} requests/second",
        timings.len() as f64 / total_time.as_secs_f64()
    );
    Ok(())
}

/// Helper function to format and print recommendations
fn print_recommendations(details: &[RecipeDetail], mode: RecommendationMode) {
    println!("{}", format!("Recipe Recommendations ({}):", mode).bold().blue());
    if details.is_empty() {
        println!("  (no recommendations)");
    }
    for (i, recipe) in details.iter().enumerate() {
        let name = recipe.name.as_deref().unwrap_or("(no detail)");
        let mut extras = Vec::new();
        if let Some(minutes) = recipe.preparation_minutes {
            extras.push(format!("{} min", minutes));
        }
        if let Some(nutrition) = recipe.nutrition {
            extras.push(format!("{:.0} kcal", nutrition.calories));
        }
        if !recipe.tags.is_empty() {
            extras.push(recipe.tags.iter().take(3).cloned().collect::<Vec<_>>().join(", "));
        }
        println!(
            "{}. [{}] {} {}",
            (i + 1).to_string().green(),
            recipe.id,
            name,
            if extras.is_empty() {
                String::new()
            } else {
                format!("({})", extras.join(" | "))
            }
        );
    }
}

fn print_neighbors(title: &str, query: u32, neighbors: &[Neighbor], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(neighbors)?);
        return Ok(());
    }
    println!("{}", format!("{} {}:", title, query).bold().blue());
    for (i, neighbor) in neighbors.iter().enumerate() {
        println!(
            "{}. {} (distance {:.4})",
            (i + 1).to_string().green(),
            neighbor.id,
            neighbor.distance.unwrap_or(f32::NAN)
        );
    }
    Ok(())
}
