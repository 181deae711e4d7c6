//! CLI administration tool for the movie catalog.
//!
//! Manages movies and tokens and runs database maintenance directly against
//! the storage layer.
//!
//! # Usage
//!
//! ```bash
//! # Apply pending migrations
//! cargo run --bin admin -- db migrate
//!
//! # Add and list movies
//! cargo run --bin admin -- movies add --title Casablanca --year 1942 --runtime 102 --genre drama
//! cargo run --bin admin -- movies list --title casa --sort -year
//!
//! # Issue an authentication token for user 7
//! cargo run --bin admin -- token issue 7
//!
//! # Revoke all of a user's activation tokens
//! cargo run --bin admin -- token revoke 7 --scope activation
//!
//! # Drop expired tokens
//! cargo run --bin admin -- token purge
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required, or `DB_*` components): PostgreSQL connection string
//! - `DB_QUERY_TIMEOUT_SECS`: per round-trip timeout
//! - `ACTIVATION_TOKEN_TTL_SECS`, `AUTHENTICATION_TOKEN_TTL_SECS`: token lifetimes

use movie_catalog::application::services::{AuthService, MovieService};
use movie_catalog::config::{self, Config};
use movie_catalog::domain::entities::{Movie, Runtime, TokenScope};
use movie_catalog::domain::filters::{DEFAULT_PAGE_SIZE, Filters};
use movie_catalog::{AppError, Storage, telemetry};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing the movie catalog.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage movies
    Movies {
        #[command(subcommand)]
        action: MovieAction,
    },

    /// Manage bearer tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum MovieAction {
    /// Add a movie
    Add {
        #[arg(short, long)]
        title: String,

        #[arg(short, long)]
        year: i32,

        /// Runtime in minutes
        #[arg(short, long)]
        runtime: i32,

        /// Genre; repeat for several
        #[arg(short, long = "genre")]
        genres: Vec<String>,
    },

    /// Show a movie by id
    Get { id: i64 },

    /// List movies
    List {
        /// Case-insensitive title fragment
        #[arg(short, long, default_value = "")]
        title: String,

        /// Required genre; repeat for several
        #[arg(short, long = "genre")]
        genres: Vec<String>,

        #[arg(short, long, default_value_t = 1)]
        page: i64,

        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: i64,

        /// Sort key, prefix with `-` for descending
        #[arg(short, long, default_value = "id", allow_hyphen_values = true)]
        sort: String,
    },

    /// Change fields of a movie, retrying on concurrent edits
    Update {
        id: i64,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        year: Option<i32>,

        #[arg(short, long)]
        runtime: Option<i32>,

        /// Replacement genres; repeat for several
        #[arg(short, long = "genre")]
        genres: Vec<String>,
    },

    /// Delete a movie
    Delete {
        id: i64,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum TokenAction {
    /// Issue a token for a user; the plaintext is shown once
    Issue {
        user_id: i64,

        #[arg(short, long, default_value = "authentication")]
        scope: TokenScope,
    },

    /// Delete every token of a scope held by a user
    Revoke {
        user_id: i64,

        #[arg(short, long, default_value = "authentication")]
        scope: TokenScope,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Delete expired tokens of every user and scope
    Purge,
}

#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = config::load_from_env()?;
    telemetry::init(&config.log_level, &config.log_format);
    config.print_summary();

    let pool = Arc::new(config.connect_pool().await?);

    match cli.command {
        Commands::Movies { action } => handle_movie_action(action, &config, pool).await?,
        Commands::Token { action } => handle_token_action(action, &config, pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

/// Dispatches movie commands.
async fn handle_movie_action(action: MovieAction, config: &Config, pool: Arc<PgPool>) -> Result<()> {
    let storage = Storage::postgres(pool, config.query_timeout());
    let service = MovieService::new(storage.movies);

    match action {
        MovieAction::Add {
            title,
            year,
            runtime,
            genres,
        } => {
            let movie = Movie::new(title, year, Runtime(runtime), genres);
            match service.create(movie).await {
                Ok(movie) => {
                    println!("{}", "✅ Movie added".green().bold());
                    print_movie(&movie);
                }
                Err(e) => return Err(report(e)),
            }
        }
        MovieAction::Get { id } => {
            let movie = service.show(id).await.map_err(report)?;
            print_movie(&movie);
        }
        MovieAction::List {
            title,
            genres,
            page,
            page_size,
            sort,
        } => {
            let filters = Filters::new(page, page_size, sort);
            let (movies, metadata) = service
                .list(&title, &genres, &filters)
                .await
                .map_err(report)?;
            list_movies(&movies, metadata.current_page, metadata.last_page, metadata.total_records);
        }
        MovieAction::Update {
            id,
            title,
            year,
            runtime,
            genres,
        } => {
            let movie = service
                .update_with(id, |movie| {
                    if let Some(title) = &title {
                        movie.title = title.clone();
                    }
                    if let Some(year) = year {
                        movie.year = year;
                    }
                    if let Some(runtime) = runtime {
                        movie.runtime = Runtime(runtime);
                    }
                    if !genres.is_empty() {
                        movie.genres = genres.clone();
                    }
                })
                .await
                .map_err(report)?;

            println!("{}", "✅ Movie updated".green().bold());
            print_movie(&movie);
        }
        MovieAction::Delete { id, yes } => {
            let movie = service.show(id).await.map_err(report)?;
            print_movie(&movie);

            if !yes {
                let confirmed = Confirm::new()
                    .with_prompt("Delete this movie?")
                    .default(false)
                    .interact()?;

                if !confirmed {
                    println!("{}", "❌ Cancelled".red());
                    return Ok(());
                }
            }

            service.delete(id).await.map_err(report)?;
            println!("{}", "✅ Movie deleted".green().bold());
        }
    }

    Ok(())
}

/// Dispatches token commands.
async fn handle_token_action(action: TokenAction, config: &Config, pool: Arc<PgPool>) -> Result<()> {
    let storage = Storage::postgres(pool, config.query_timeout());
    let auth = AuthService::new(
        storage.tokens,
        config.activation_ttl(),
        config.authentication_ttl(),
    );

    match action {
        TokenAction::Issue { user_id, scope } => {
            let token = match scope {
                TokenScope::Authentication => auth.issue_authentication_token(user_id).await,
                TokenScope::Activation => auth.issue_activation_token(user_id).await,
            }
            .map_err(report)?;

            println!("{}", "🔑 Token issued".bright_blue().bold());
            println!();
            println!("  User:   {}", user_id.to_string().cyan());
            println!("  Scope:  {}", scope.to_string().cyan());
            println!("  Expiry: {}", token.expiry.format("%Y-%m-%d %H:%M UTC"));
            println!("  Token:  {}", token.plaintext.bright_yellow().bold());
            println!();
            println!(
                "{}",
                "⚠️  IMPORTANT: Save this token now! You won't be able to see it again."
                    .red()
                    .bold()
            );
        }
        TokenAction::Revoke {
            user_id,
            scope,
            yes,
        } => {
            if !yes {
                let confirmed = Confirm::new()
                    .with_prompt(format!("Revoke all {scope} tokens of user {user_id}?"))
                    .default(false)
                    .interact()?;

                if !confirmed {
                    println!("{}", "❌ Cancelled".red());
                    return Ok(());
                }
            }

            let removed = auth.revoke_all(user_id, scope).await.map_err(report)?;
            println!(
                "{} {}",
                "✅ Tokens revoked:".green().bold(),
                removed.to_string().bright_white().bold()
            );
        }
        TokenAction::Purge => {
            let removed = auth.purge_expired().await.map_err(report)?;
            println!(
                "{} {}",
                "🧹 Expired tokens purged:".green().bold(),
                removed.to_string().bright_white().bold()
            );
        }
    }

    Ok(())
}

/// Handles database maintenance commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Migrate => {
            println!("{}", "🛠  Applying migrations...".bright_blue());

            sqlx::migrate!("./migrations")
                .run(pool)
                .await
                .context("Failed to apply migrations")?;

            println!("{}", "✅ Migrations applied".green().bold());
        }
    }

    Ok(())
}

/// Prints validation failures field by field and converts the error.
fn report(e: AppError) -> anyhow::Error {
    if let Some(errors) = e.validation_errors() {
        println!("{}", "❌ Validation failed".red().bold());
        for (field, message) in errors.iter() {
            println!("  {}: {}", field.yellow(), message);
        }
    }
    anyhow::Error::new(e)
}

fn print_movie(movie: &Movie) {
    println!();
    println!("  ID:      {}", movie.id.to_string().bright_black());
    println!("  Title:   {}", movie.title.cyan());
    println!("  Year:    {}", movie.year);
    println!("  Runtime: {}", movie.runtime);
    println!("  Genres:  {}", movie.genres.join(", "));
    println!("  Version: {}", movie.version.to_string().bright_black());
    println!();
}

fn list_movies(movies: &[Movie], page: i64, last_page: i64, total: i64) {
    println!("{}", "🎬 Movies".bright_blue().bold());
    println!();

    if movies.is_empty() {
        println!("{}", "  No movies found".yellow());
        return;
    }

    println!(
        "  {:<6} {:<40} {:<6} {:<10} {}",
        "ID".bright_white().bold(),
        "Title".bright_white().bold(),
        "Year".bright_white().bold(),
        "Runtime".bright_white().bold(),
        "Genres".bright_white().bold()
    );
    println!("  {}", "─".repeat(80).bright_black());

    for movie in movies {
        println!(
            "  {:<6} {:<40} {:<6} {:<10} {}",
            movie.id.to_string().bright_black(),
            movie.title.cyan(),
            movie.year,
            movie.runtime.to_string(),
            movie.genres.join(", ")
        );
    }

    println!();
    println!(
        "  Page {} of {}, {} total",
        page.to_string().bright_white().bold(),
        last_page,
        total.to_string().bright_white().bold()
    );
    println!();
}
