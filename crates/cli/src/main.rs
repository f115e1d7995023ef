use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use colored::Colorize;
use manager::{DEFAULT_SORT_KEY, Extreme, MovieManager};
use movie_store::{AttributeValue, Attributes, JsonStorage, MovieRecord, Template};
use std::fs;
use std::path::{Path, PathBuf};

type Manager = MovieManager<JsonStorage>;

/// movie-db - My Movies Database
#[derive(Parser)]
#[command(name = "movie-db")]
#[command(about = "Keep track of the movies you rated", long_about = None)]
struct Cli {
    /// Path to the JSON movie database
    #[arg(short, long, default_value = "data/movies.json")]
    db: PathBuf,

    /// Log what the storage layer is doing
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty database if none exists
    Init,

    /// List all movies with year and rating
    List {
        /// Extra attributes to show, comma separated (e.g. actors,gross)
        #[arg(long, value_delimiter = ',')]
        details: Vec<String>,
    },

    /// Add a movie
    Add {
        #[arg(long)]
        title: String,

        /// Rating (0-10)
        #[arg(long)]
        rating: f64,

        /// Release year
        #[arg(long)]
        year: i64,

        /// Actor, repeat for several
        #[arg(long = "actor")]
        actors: Vec<String>,

        #[arg(long)]
        director: Option<String>,

        #[arg(long)]
        gross: Option<f64>,

        /// Any other attribute as KEY=VALUE (VALUE is read as JSON, else text)
        #[arg(long = "set", value_parser = parse_attribute)]
        attributes: Vec<(String, AttributeValue)>,
    },

    /// Delete a movie by its exact title
    Delete {
        #[arg(long)]
        title: String,
    },

    /// Update attributes of a movie
    Update {
        /// Exact, case-sensitive title
        #[arg(long)]
        title: String,

        /// Attribute as KEY=VALUE; values of the wrong type are ignored
        #[arg(long = "set", value_parser = parse_attribute, required = true)]
        attributes: Vec<(String, AttributeValue)>,
    },

    /// Show average, median, best and worst ratings
    Stats,

    /// Pick a movie to watch tonight
    Random,

    /// Search movies by (part of) the title, case-insensitive
    Search {
        #[arg(long)]
        query: String,
    },

    /// List movies from best to worst
    Sorted {
        /// Attribute to order by
        #[arg(long, default_value = DEFAULT_SORT_KEY)]
        by: String,
    },

    /// Write a text histogram of the ratings
    Histogram {
        #[arg(long, default_value = "data/movie_ratings.txt")]
        output: PathBuf,

        /// Width of the longest bar
        #[arg(long, default_value = "40")]
        width: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    tracing::debug!("Using movie database at {}", cli.db.display());

    if let Commands::Init = cli.command {
        return handle_init(&cli.db);
    }

    let mut manager = MovieManager::new(JsonStorage::open(&cli.db)).with_context(|| {
        format!(
            "Failed to load movie database from {} (run `movie-db init` to create one)",
            cli.db.display()
        )
    })?;

    run(cli.command, &mut manager)
}

/// Dispatch to appropriate command handler
fn run(command: Commands, manager: &mut Manager) -> Result<()> {
    match command {
        Commands::Init => handle_init(manager.storage().path())?,
        Commands::List { details } => handle_list(manager, &details),
        Commands::Add {
            title,
            rating,
            year,
            actors,
            director,
            gross,
            attributes,
        } => {
            if let Some((name, _)) = attributes
                .iter()
                .find(|(name, _)| Template::REQUIRED.contains(&name.as_str()))
            {
                bail!("Set '{}' with --{} instead of --set", name, name);
            }
            let mut extra: Attributes = attributes.into_iter().collect();
            if !actors.is_empty() {
                extra.insert("actors".to_string(), actors.into());
            }
            if let Some(director) = director {
                extra.insert("director".to_string(), director.into());
            }
            if let Some(gross) = gross {
                extra.insert("gross".to_string(), gross.into());
            }
            handle_add(manager, &title, rating, year, extra)?
        }
        Commands::Delete { title } => handle_delete(manager, &title)?,
        Commands::Update { title, attributes } => {
            handle_update(manager, &title, attributes.into_iter().collect())?
        }
        Commands::Stats => handle_stats(manager)?,
        Commands::Random => handle_random(manager)?,
        Commands::Search { query } => handle_search(manager, &query),
        Commands::Sorted { by } => handle_sorted(manager, &by)?,
        Commands::Histogram { output, width } => handle_histogram(manager, &output, width)?,
    }

    Ok(())
}

/// Parse `KEY=VALUE`, reading VALUE as JSON and falling back to plain text
fn parse_attribute(s: &str) -> std::result::Result<(String, AttributeValue), String> {
    let (key, raw) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing attribute name in '{}'", s));
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| AttributeValue::Text(raw.to_string()));
    Ok((key.to_string(), value))
}

/// Handle the 'init' command
fn handle_init(db: &Path) -> Result<()> {
    JsonStorage::create_if_missing(db)
        .with_context(|| format!("Failed to create {}", db.display()))?;
    println!("{} Movie database ready at {}", "✓".green(), db.display());
    Ok(())
}

/// Handle the 'list' command
fn handle_list(manager: &Manager, details: &[String]) {
    println!("{}", format!("{} movies in total", manager.len()).bold().blue());
    for (title, record) in manager.movies().iter() {
        print_movie(title, record);
        print_details(record, details);
    }
}

/// Handle the 'add' command
fn handle_add(
    manager: &mut Manager,
    title: &str,
    rating: f64,
    year: i64,
    extra: Attributes,
) -> Result<()> {
    if manager.add_movie(title, rating, year, extra)? {
        println!("{} Movie '{}' successfully added.", "✓".green(), title);
    } else {
        println!("{} Movie '{}' already exists, nothing changed.", "!".yellow(), title);
    }
    Ok(())
}

/// Handle the 'delete' command
fn handle_delete(manager: &mut Manager, title: &str) -> Result<()> {
    if manager.delete_movie(title)? {
        println!("{} Movie '{}' successfully deleted.", "✓".green(), title);
    } else {
        println!("{} Movie '{}' doesn't exist!", "✗".red(), title);
    }
    Ok(())
}

/// Handle the 'update' command
fn handle_update(manager: &mut Manager, title: &str, attributes: Attributes) -> Result<()> {
    let skipped: Vec<String> = match manager.find_by_title(title) {
        Some(record) => attributes
            .iter()
            .filter_map(|(name, value)| skip_reason(record, name, value))
            .collect(),
        None => Vec::new(),
    };

    if manager.update_movie(title, attributes)? {
        println!("{} Movie '{}' successfully updated!", "✓".green(), title);
        for reason in &skipped {
            println!("   {} {}", "!".yellow(), reason);
        }
        if let Some(record) = manager.find_by_title(title) {
            print_movie(title, record);
            let shown: Vec<String> = Template::optional_names().map(String::from).collect();
            print_details(record, &shown);
        }
    } else {
        println!("{} Movie '{}' doesn't exist!", "✗".red(), title);
    }
    Ok(())
}

/// Why `update` will leave `name` alone, if it will
fn skip_reason(record: &MovieRecord, name: &str, value: &AttributeValue) -> Option<String> {
    match record.stored_kind(name) {
        None => Some(format!("'{}' is not a movie attribute, skipped", name)),
        Some(kind) if kind != value.kind() => Some(format!(
            "'{}' is stored as {}, skipped the {} value",
            name,
            kind,
            value.kind()
        )),
        Some(_) => None,
    }
}

/// Handle the 'stats' command
fn handle_stats(manager: &Manager) -> Result<()> {
    if manager.is_empty() {
        println!("{}", "No movies in the database yet.".yellow());
        return Ok(());
    }

    println!("{}", "Statistics:".bold().blue());
    println!("{}Average rating: {}", "• ".cyan(), manager.average_rating()?);
    println!("{}Median rating: {}", "• ".cyan(), manager.median_rating()?);

    let (best, rating) = manager.extreme_rated_movies(Extreme::Max)?;
    println!("{}Best movie(s), rated {}:", "• ".green(), rating);
    for title in best {
        println!("  - {}", title);
    }

    let (worst, rating) = manager.extreme_rated_movies(Extreme::Min)?;
    println!("{}Worst movie(s), rated {}:", "• ".red(), rating);
    for title in worst {
        println!("  - {}", title);
    }
    Ok(())
}

/// Handle the 'random' command
fn handle_random(manager: &Manager) -> Result<()> {
    let title = manager
        .random_movie(&mut rand::rng())
        .map_err(|_| anyhow!("No movies to pick from"))?;
    let record = manager
        .find_by_title(title)
        .ok_or_else(|| anyhow!("Movie '{}' vanished", title))?;
    println!(
        "Your movie for tonight: {}, it's rated {}",
        title.bold(),
        record.rating
    );
    Ok(())
}

/// Handle the 'search' command
fn handle_search(manager: &Manager, query: &str) {
    let matches = manager.find_by_title_substring(query);
    if matches.is_empty() {
        println!("No movies matching '{}' found.", query);
        return;
    }

    println!("{}", format!("Search results for '{}':", query).bold().blue());
    for title in matches {
        if let Some(record) = manager.find_by_title(title) {
            print_movie(title, record);
        }
    }
}

/// Handle the 'sorted' command
fn handle_sorted(manager: &Manager, key: &str) -> Result<()> {
    let sorted = manager.sort_by_attribute(key)?;

    println!("{}", format!("Movies by {}:", key).bold().blue());
    for (rank, (title, record)) in sorted.into_iter().enumerate() {
        print!("{}. ", (rank + 1).to_string().green());
        print_movie(title, record);
    }
    Ok(())
}

/// Handle the 'histogram' command
fn handle_histogram(manager: &Manager, output: &Path, width: usize) -> Result<()> {
    let histogram = manager.rating_histogram();

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(output, histogram.render(width))
        .with_context(|| format!("Failed to write histogram to {}", output.display()))?;

    println!("{} Histogram saved to: {}", "✓".green(), output.display());
    Ok(())
}

fn print_movie(title: &str, record: &MovieRecord) {
    println!("{} ({}): {}", title, record.year, record.rating);
}

/// Print the requested attributes that hold something worth showing
fn print_details(record: &MovieRecord, details: &[String]) {
    let mut shown = false;
    for name in details {
        let value = match record.get(name) {
            Some(value) if Some(&value) != Template::default_value(name).as_ref() => {
                value.to_string()
            }
            Some(_) => continue,
            None => match record.extra.get(name) {
                Some(value) => value.to_string(),
                None => continue,
            },
        };
        println!("   {}: {}", name.dimmed(), value);
        shown = true;
    }
    if shown {
        println!();
    }
}
